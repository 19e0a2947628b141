//! Tests for appdeploy-core reader module

use appdeploy_core::{DeployError, RawConfigMap};

// ============================================================================
// Basic Parsing Tests
// ============================================================================

#[test]
fn test_parse_key_values() {
    let text = r#"
# Comment
// Another comment
AppBaseName = HelloWorld
AppFriendlyName = "Hello World"
AppShortSummary='Single quoted'
Empty =
"#;
    let map = RawConfigMap::parse("app.conf", text).unwrap();
    assert_eq!(map.len(), 4);
    assert_eq!(map.get("AppBaseName"), Some("HelloWorld"));
    assert_eq!(map.get("AppFriendlyName"), Some("Hello World"));
    assert_eq!(map.get("AppShortSummary"), Some("Single quoted"));
    assert_eq!(map.get("Empty"), Some(""));
    assert_eq!(map.source_name(), "app.conf");
}

#[test]
fn test_keys_case_insensitive() {
    let map = RawConfigMap::parse("app.conf", "AppId = com.example").unwrap();
    assert_eq!(map.get("appid"), Some("com.example"));
    assert_eq!(map.get("APPID"), Some("com.example"));
    assert!(map.contains_key("AppID"));
    assert_eq!(map.get_entry("appid").unwrap().key, "AppId");
}

#[test]
fn test_value_keeps_equals_signs() {
    let map = RawConfigMap::parse("app.conf", "Args = --env=A=B").unwrap();
    assert_eq!(map.get("Args"), Some("--env=A=B"));
}

#[test]
fn test_mismatched_quotes_kept() {
    let map = RawConfigMap::parse("app.conf", "A = \"abc'\nB = \"").unwrap();
    assert_eq!(map.get("A"), Some("\"abc'"));
    assert_eq!(map.get("B"), Some("\""));
}

#[test]
fn test_line_numbers_recorded() {
    let map = RawConfigMap::parse("app.conf", "\n# c\nA = 1\n\nB = 2").unwrap();
    assert_eq!(map.get_entry("A").unwrap().line, 3);
    assert_eq!(map.get_entry("B").unwrap().line, 5);
}

#[test]
fn test_iter_source_order() {
    let map = RawConfigMap::parse("app.conf", "Z = 1\nA = 2\nM = 3").unwrap();
    let keys: Vec<&str> = map.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["Z", "A", "M"]);
}

// ============================================================================
// Multi-line Tests
// ============================================================================

#[test]
fn test_multi_line_block() {
    let text = "Notes = \"\"\"\n    line one\n\n    line two\n\"\"\"\nNext = x";
    let map = RawConfigMap::parse("app.conf", text).unwrap();
    assert_eq!(map.get("Notes"), Some("line one\n\n    line two"));
    assert_eq!(map.get("Next"), Some("x"));
    assert_eq!(map.get_entry("Next").unwrap().line, 6);
}

#[test]
fn test_multi_line_text_on_marker_lines() {
    let text = "Notes = \"\"\"first\nsecond\nthird\"\"\"";
    let map = RawConfigMap::parse("app.conf", text).unwrap();
    assert_eq!(map.get("Notes"), Some("first\nsecond\nthird"));
}

#[test]
fn test_multi_line_comment_markers_are_content() {
    let text = "Notes = \"\"\"\n# not a comment\n\"\"\"";
    let map = RawConfigMap::parse("app.conf", text).unwrap();
    assert_eq!(map.get("Notes"), Some("# not a comment"));
}

#[test]
fn test_multi_line_unterminated() {
    let text = "A = 1\nNotes = \"\"\"\nline one\nline two";
    let err = RawConfigMap::parse("app.conf", text).unwrap_err();
    match err {
        DeployError::Format { line, message, .. } => {
            assert_eq!(line, 2);
            assert!(message.contains("no multi-line termination"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

// ============================================================================
// Error Tests
// ============================================================================

#[test]
fn test_syntax_error_reports_line() {
    let err = RawConfigMap::parse("app.conf", "A = 1\n\nnot a setting").unwrap_err();
    assert_eq!(err.line(), Some(3));
    let msg = err.to_string();
    assert!(msg.contains("app.conf"), "{}", msg);
    assert!(msg.contains("line 3"), "{}", msg);
}

#[test]
fn test_missing_key_is_error() {
    let err = RawConfigMap::parse("app.conf", "= value").unwrap_err();
    assert_eq!(err.line(), Some(1));
}

#[test]
fn test_duplicate_key_any_case() {
    let err = RawConfigMap::parse("app.conf", "AppId = a\n# c\nAPPID = b").unwrap_err();
    match err {
        DeployError::Format { line, message, .. } => {
            assert_eq!(line, 3);
            assert!(message.contains("duplicate"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

// ============================================================================
// Verbatim Tests
// ============================================================================

#[test]
fn test_verbatim_lines() {
    let text = "# header\nA = 1\n\nB = \"\"\"\nx\n\"\"\"";
    let map = RawConfigMap::parse("app.conf", text).unwrap();
    assert_eq!(map.lines().len(), 6);
    assert_eq!(map.verbatim(), text);
}

#[test]
fn test_from_file() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("HelloWorld.conf");
    std::fs::write(&path, "AppBaseName = HelloWorld\n").unwrap();

    let map = RawConfigMap::from_file(&path).unwrap();
    assert_eq!(map.source_name(), "HelloWorld.conf");
    assert_eq!(map.get("AppBaseName"), Some("HelloWorld"));
}

#[test]
fn test_from_file_missing() {
    let err = RawConfigMap::from_file("/nonexistent/app.conf").unwrap_err();
    assert!(matches!(err, DeployError::Io(_)));
}
