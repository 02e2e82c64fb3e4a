//! Unit tests for log.rs
//!
//! Tests LogSeverity ordering and labels, LogEntry and DefaultLogger formatting.

use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
use std::time::SystemTime;

fn entry(severity: LogSeverity, message: &str) -> LogEntry {
    LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: "losgap::test".to_string(),
        message: message.to_string(),
        file: None,
        line: None,
    }
}

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_labels_are_fixed_width() {
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        assert_eq!(severity.label().len(), 5);
    }
    assert_eq!(LogSeverity::Warn.label(), "WARN ");
}

// ============================================================================
// LOG ENTRY TESTS
// ============================================================================

#[test]
fn test_log_entry_with_file_line() {
    let mut e = entry(LogSeverity::Error, "Device creation failed");
    e.file = Some("rendering_module.rs");
    e.line = Some(42);

    let cloned = e.clone();
    assert_eq!(cloned.severity, LogSeverity::Error);
    assert_eq!(cloned.file, Some("rendering_module.rs"));
    assert_eq!(cloned.line, Some(42));
}

// ============================================================================
// DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_format_plain_without_location() {
    let text = DefaultLogger::format_plain(&entry(LogSeverity::Info, "Device created"));
    assert!(text.ends_with("[INFO ] [losgap::test] Device created"));
    assert!(text.starts_with('['));
}

#[test]
fn test_format_plain_with_location() {
    let mut e = entry(LogSeverity::Error, "boom");
    e.file = Some("buffer.rs");
    e.line = Some(7);
    let text = DefaultLogger::format_plain(&e);
    assert!(text.ends_with("[ERROR] [losgap::test] boom (buffer.rs:7)"));
}

#[test]
fn test_default_logger_does_not_panic() {
    let logger = DefaultLogger;
    logger.log(&entry(LogSeverity::Trace, "trace message"));
    logger.log(&entry(LogSeverity::Warn, "warning message"));
}
