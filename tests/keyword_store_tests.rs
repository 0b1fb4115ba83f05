//! Keyword history file behaviour across store instances
use tempfile::TempDir;
use video_comment_crawler::infrastructure::keyword_store::{KeywordStore, KeywordStoreError};

#[test]
fn history_persists_between_instances() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keywords.csv");

    let first = KeywordStore::new(&path);
    first.check_and_add("브이로그").unwrap();
    first.check_and_add("asmr").unwrap();
    let stamped = first.touch("asmr").unwrap();

    let second = KeywordStore::new(&path);
    let entries = second.load_all().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].keyword_text, "브이로그");
    assert_eq!(entries[0].last_used_time, None);

    let asmr = second.lookup("asmr").unwrap().unwrap();
    assert_eq!(asmr.last_used_time, Some(stamped));
}

#[test]
fn keywords_with_commas_and_quotes_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = KeywordStore::new(dir.path().join("keywords.csv"));

    let tricky = r#"rust, "async" tips"#;
    store.check_and_add(tricky).unwrap();

    assert!(store.lookup(tricky).unwrap().is_some());
    assert_eq!(store.load_all().unwrap().len(), 1);
}

#[test]
fn touching_missing_file_reports_not_found() {
    let dir = TempDir::new().unwrap();
    let store = KeywordStore::new(dir.path().join("absent.csv"));

    assert!(matches!(store.touch("x"), Err(KeywordStoreError::NotFound(_))));
    assert!(!store.path().exists());
}
