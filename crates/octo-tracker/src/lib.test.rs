use super::*;
use std::time::Duration;

#[tokio::test]
async fn write_then_assert_can_edit_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.txt");
    let tracker = FileTracker::new();
    tracker.write(&path, "foo").await.unwrap();
    tracker.assert_can_edit(&path).await.unwrap();
}

#[tokio::test]
async fn external_modification_after_read_fails_assert_can_edit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.txt");
    tokio::fs::write(&path, "foo").await.unwrap();

    let tracker = FileTracker::new();
    tracker.read(&path).await.unwrap();

    // Force a distinguishable mtime on most filesystems' timestamp resolution.
    tokio::time::sleep(Duration::from_millis(20)).await;
    tokio::fs::write(&path, "bar").await.unwrap();

    let err = tracker.assert_can_edit(&path).await.unwrap_err();
    assert!(matches!(err, TrackerError::Outdated { .. }));
}

#[tokio::test]
async fn edit_without_prior_read_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("never-read.txt");
    tokio::fs::write(&path, "foo").await.unwrap();

    let tracker = FileTracker::new();
    let err = tracker.assert_can_edit(&path).await.unwrap_err();
    assert!(matches!(err, TrackerError::Outdated { .. }));
}

#[tokio::test]
async fn create_on_existing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.txt");
    tokio::fs::write(&path, "foo").await.unwrap();

    let tracker = FileTracker::new();
    let err = tracker.assert_can_create(&path).await.unwrap_err();
    assert!(matches!(err, TrackerError::Exists { .. }));
}

#[tokio::test]
async fn create_on_missing_path_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("new.txt");
    let tracker = FileTracker::new();
    tracker.assert_can_create(&path).await.unwrap();
}

#[tokio::test]
async fn read_records_baseline_used_by_later_edit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.txt");
    tokio::fs::write(&path, "foo").await.unwrap();

    let tracker = FileTracker::new();
    let content = tracker.read(&path).await.unwrap();
    assert_eq!(content, "foo");
    tracker.assert_can_edit(&path).await.unwrap();
}
