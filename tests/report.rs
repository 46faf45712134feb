use docx_table_images::{BatchReport, ERROR_LOG_FILE, ErrorLog};

#[test]
fn error_log_drops_oldest_entries() {
    let mut log = ErrorLog::with_capacity(3);
    for i in 1..=5 {
        log.push(format!("problem {i}"));
    }

    let messages: Vec<&str> = log.entries().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, ["problem 3", "problem 4", "problem 5"]);
    assert_eq!(log.dropped(), 2);
}

#[test]
fn error_log_renders_timestamped_lines() {
    let dir = tempfile::tempdir().unwrap();
    let mut log = ErrorLog::default();
    log.push("table 4 has no naming cell");

    let path = log.write_to(dir.path()).unwrap();

    assert_eq!(path, dir.path().join(ERROR_LOG_FILE));
    let text = std::fs::read_to_string(path).unwrap();
    let line = text.lines().last().unwrap();
    // [YYYY-MM-DD HH:MM:SS] message
    assert_eq!(line.find(']'), Some(20));
    assert!(line.starts_with('['));
    assert!(line.ends_with("] table 4 has no naming cell"));
}

#[test]
fn empty_error_log_says_so() {
    let text = ErrorLog::default().render();
    assert!(text.contains("No errors or warnings were recorded."));
}

#[test]
fn summary_always_reports_counts() {
    let summary = BatchReport::default().to_string();
    assert!(summary.contains("Tables found:      0"));
    assert!(summary.contains("Images written:    0"));
    assert!(summary.contains("Errors logged:     0 / 500"));
}
