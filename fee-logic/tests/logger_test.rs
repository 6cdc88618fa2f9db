use fee_logic::{setup_logger, LogConfig};
use tracing::Level;

// one test per binary: the global subscriber can only be installed once
#[test]
fn test_setup_logger_writes_to_directory() {
    let dir = tempfile::tempdir().unwrap();
    let log_dir = dir.path().join("logs");
    let config = LogConfig::default()
        .with_directory(&log_dir)
        .with_console_level(Level::WARN);

    let guard = setup_logger(&config).unwrap();
    tracing::info!("Gas fee COMMITTED: limit=21000");
    drop(guard);

    let files: Vec<_> = std::fs::read_dir(&log_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    assert!(files.iter().any(|f| f.starts_with("fee-editor")), "{files:?}");

    // a second install is refused rather than panicking
    assert!(setup_logger(&config).is_err());
}
