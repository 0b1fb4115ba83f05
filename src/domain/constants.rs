//! 영상 페이지 특성 및 도메인 상수들
//!
//! 동영상 시청 페이지의 고유한 DOM 구조와 추출 규칙에 관한 상수들을 정의합니다.
//! Modern Rust 2024 스타일로 구성되어 있습니다.

/// 영상 페이지 DOM 구조 상수들
pub mod page {
    /// 댓글 섹션 전체를 감싸는 최상위 컨테이너
    pub const COMMENTS_CONTAINER: &str = "ytd-comments#comments";

    /// 최상위 댓글 스레드 (댓글 하나 + 렌더링 래퍼)
    pub const COMMENT_THREAD: &str = "ytd-comment-thread-renderer";

    /// 스레드 내부의 주 댓글 뷰
    pub const COMMENT_VIEW: &str = "ytd-comment-view-model";

    /// 댓글 타임스탬프 퍼머링크 앵커
    pub const PERMALINK_ANCHOR: &str = "#published-time-text a";

    /// 작성자 텍스트
    pub const AUTHOR_TEXT: &str = "#author-text";

    /// 댓글 본문 텍스트
    pub const CONTENT_TEXT: &str = "#content-text";

    /// 좋아요 수 표시
    pub const LIKE_COUNT: &str = "#vote-count-middle";

    /// 조회수 툴팁 요소
    pub const VIEW_TOOLTIP: &str = "tp-yt-paper-tooltip.ytd-watch-info-text";

    /// 툴팁 내부 텍스트 노드
    pub const VIEW_TOOLTIP_TEXT: &str = "#tooltip";

    /// 업로드 날짜 메타 태그 (content 속성에 ISO-8601 값)
    pub const UPLOAD_DATE_META: &str = "meta[itemprop=\"uploadDate\"]";

    /// 댓글 섹션 헤더의 댓글 수 라벨
    pub const COMMENT_COUNT_LABEL: &str = "ytd-comments-header-renderer .count-text";

    /// lazy-loading 유도를 위한 스크롤 스크립트 템플릿 (y 오프셋 placeholder: {})
    pub const SCROLL_SCRIPT_TEMPLATE: &str = "window.scrollTo(0, {})";
}

/// 추출 관련 고정 토큰들
pub mod extraction {
    /// 퍼머링크 쿼리에서 댓글 ID를 뽑는 패턴
    pub const COMMENT_ID_PATTERN: &str = r"&lc=([\w.-]+)";

    /// 툴팁 문구에서 조회수 숫자열을 뽑는 패턴 (한국어 / 영어 로케일)
    pub const VIEW_PHRASE_PATTERN: &str = r"조회수\s*([\d,]+)\s*회|([\d,]+)\s+views";

    /// 좋아요 요소가 없을 때의 기본값
    pub const DEFAULT_LIKES: &str = "0";

    /// 카운트 요소가 없을 때 파서에 넘기는 기본 문자열
    pub const MISSING_COUNT_TEXT: &str = "0";

    /// 이메일 마스킹 토큰
    pub const EMAIL_PLACEHOLDER: &str = "[EMAIL_MASKED]";

    /// 전화번호 마스킹 토큰
    pub const PHONE_PLACEHOLDER: &str = "[PHONE_MASKED]";
}

/// 준비 상태 프로토콜 기본 타이밍
pub mod readiness {
    /// 댓글 컨테이너 대기 제한 (밀리초)
    pub const CONTAINER_TIMEOUT_MS: u64 = 15_000;

    /// 첫 댓글 스레드 대기 제한 (밀리초)
    pub const FIRST_THREAD_TIMEOUT_MS: u64 = 15_000;

    /// 첫 스레드 이후 DOM 안정화 대기 (밀리초)
    pub const SETTLE_DELAY_MS: u64 = 1_000;

    /// 메타데이터 수집 시 댓글 헤더 대기 제한 (밀리초)
    pub const METADATA_HEADER_TIMEOUT_MS: u64 = 10_000;

    /// lazy-loading 유도 스크롤 오프셋 (px)
    pub const SCROLL_OFFSET_PX: u32 = 500;
}

/// 수집 조건 임계값
pub mod thresholds {
    /// 댓글 수집을 시작하기 위한 최소 조회수
    pub const MIN_VIEW_COUNT: u64 = 100;

    /// 댓글 수집을 시작하기 위한 최소 댓글 수
    pub const MIN_COMMENT_COUNT: u64 = 5;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readiness_timings() {
        use readiness::*;

        // 대기 시간들이 합리적인 범위에 있는지 확인
        assert!(SETTLE_DELAY_MS < CONTAINER_TIMEOUT_MS);
        assert!(SETTLE_DELAY_MS < FIRST_THREAD_TIMEOUT_MS);
        assert!(METADATA_HEADER_TIMEOUT_MS <= CONTAINER_TIMEOUT_MS);
    }

    #[test]
    fn test_scroll_script_template() {
        assert!(page::SCROLL_SCRIPT_TEMPLATE.contains("{}"));
    }
}
