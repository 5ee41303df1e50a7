use diskspeed::error;
use diskspeed::io::TargetFile;
use diskspeed::DiskSpeedError;
use std::error::Error;
use std::io::ErrorKind;
use std::path::PathBuf;

#[test]
fn test_io_error_classification() {
    let denied: DiskSpeedError = std::io::Error::new(ErrorKind::PermissionDenied, "nope").into();
    assert!(matches!(denied, DiskSpeedError::PermissionDenied(_)));

    let other: DiskSpeedError = std::io::Error::new(ErrorKind::UnexpectedEof, "short").into();
    assert!(matches!(other, DiskSpeedError::IoError(_)));
    assert!(other.source().is_some());
}

#[test]
fn test_file_error_names_path_and_cause() {
    let err = DiskSpeedError::file(
        PathBuf::from("/mnt/disk/diskspeed.tmp"),
        std::io::Error::new(ErrorKind::Other, "No space left on device"),
    );

    let msg = error::user_friendly_message(&err);
    assert!(msg.contains("/mnt/disk/diskspeed.tmp"));
    assert!(msg.contains("No space left on device"));
    assert!(err.source().is_some());
}

#[test]
fn test_exit_codes() {
    assert_eq!(error::exit_code(&Ok(())), 0);
    assert_eq!(error::exit_code(&Err(DiskSpeedError::Aborted)), 0);
    assert_eq!(
        error::exit_code(&Err(DiskSpeedError::ConfigError("bad".into()))),
        1
    );
    assert!(error::is_user_abort(&DiskSpeedError::Aborted));
    assert_eq!(error::user_friendly_message(&DiskSpeedError::Aborted), "Program aborted.");
}

#[test]
fn test_unwritable_target_surfaces_file_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    // A directory cannot be opened as the benchmark file
    let result = TargetFile::create(temp_dir.path());
    assert!(matches!(result, Err(DiskSpeedError::FileError { .. })));
}

#[tokio::test]
async fn test_panicked_task_becomes_worker_error() {
    let joined = tokio::spawn(async { panic!("disk vanished") }).await;
    let err: DiskSpeedError = joined.unwrap_err().into();

    assert!(matches!(err, DiskSpeedError::WorkerError(_)));
    assert!(error::user_friendly_message(&err).contains("benchmark task failed"));
    assert_eq!(error::exit_code(&Err(err)), 1);
}
