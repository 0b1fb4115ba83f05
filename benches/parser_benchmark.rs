//! 댓글 파싱 파이프라인 벤치마크
//!
//! 스냅샷 한 장에서 메타데이터와 댓글 배치를 추출하는 비용 측정
//! - 스레드 수에 따른 parse_comments 확장성
//! - parse_count / mask 단일 호출 비용

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use video_comment_crawler::domain::MarkupSnapshot;
use video_comment_crawler::infrastructure::parsing::{
    count_parser::parse_count, pii_masker::mask, CommentParser, MetadataExtractor,
};

fn synthetic_page(threads: usize) -> String {
    let body: String = (0..threads)
        .map(|i| {
            // 매 10번째 스레드는 중복 ID
            let id = if i % 10 == 9 { i - 1 } else { i };
            format!(
                r#"<ytd-comment-thread-renderer><ytd-comment-view-model>
                     <a id="author-text"><span>user{i}</span></a>
                     <span id="published-time-text"><a href="/watch?v=v&amp;lc=id{id}">1일 전</a></span>
                     <span id="content-text">comment {i} mail{i}@example.com 010-1234-{i:04}</span>
                     <span id="vote-count-middle">{i}</span>
                   </ytd-comment-view-model></ytd-comment-thread-renderer>"#
            )
        })
        .collect();

    format!(
        r#"<html><head><meta itemprop="uploadDate" content="2024-01-01"></head><body>
             <tp-yt-paper-tooltip class="ytd-watch-info-text"><div id="tooltip">조회수 1,234,567회</div></tp-yt-paper-tooltip>
             <ytd-comments id="comments"><ytd-comments-header-renderer><span class="count-text">댓글 {threads}개</span></ytd-comments-header-renderer>{body}</ytd-comments>
           </body></html>"#
    )
}

fn benchmark_parse_comments(c: &mut Criterion) {
    let parser = CommentParser::new().expect("default selectors compile");
    let mut group = c.benchmark_group("parse_comments");

    for threads in [20, 100, 500] {
        let snapshot = MarkupSnapshot::new(synthetic_page(threads));
        group.bench_with_input(BenchmarkId::from_parameter(threads), &snapshot, |b, snapshot| {
            b.iter(|| parser.parse_comments(black_box(snapshot)));
        });
    }
    group.finish();
}

fn benchmark_metadata(c: &mut Criterion) {
    let extractor = MetadataExtractor::new().expect("default selectors compile");
    let snapshot = MarkupSnapshot::new(synthetic_page(100));

    c.bench_function("extract_metadata", |b| {
        b.iter(|| extractor.extract_metadata(black_box(&snapshot)));
    });
}

fn benchmark_text_helpers(c: &mut Criterion) {
    c.bench_function("parse_count", |b| {
        b.iter(|| parse_count(black_box("조회수 1.5만회")));
    });
    c.bench_function("mask", |b| {
        b.iter(|| mask(black_box("문의 a.b@c.com / 010-1234-5678 감사합니다")));
    });
}

criterion_group!(benches, benchmark_parse_comments, benchmark_metadata, benchmark_text_helpers);
criterion_main!(benches);
