//! Index writer tests: the eight-field encoding contract and the buffered
//! append discipline.

use std::path::PathBuf;

use sharecrawl::types::{DocClass, FileRecord};
use sharecrawl::writer::{IndexWriter, encode_record};

fn record(content: &str) -> FileRecord {
    FileRecord {
        timestamp: 1700000000,
        logical_url: "file://fs01/share/docs/a.txt".to_string(),
        physical_path: PathBuf::from("smb/fs01/share/docs/a.txt"),
        server: "fs01".to_string(),
        share: "share".to_string(),
        extension: "txt".to_string(),
        class: DocClass::Text,
        content: content.to_string(),
    }
}

/// Split an encoded line into fields, honoring the always-quoted rule for
/// fields 2..8.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut rest = line;
    let comma = rest.find(',').expect("timestamp separator");
    fields.push(rest[..comma].to_string());
    rest = &rest[comma..];
    while let Some(stripped) = rest.strip_prefix(",\"") {
        let mut field = String::new();
        let mut chars = stripped.char_indices();
        let mut consumed = stripped.len();
        while let Some((i, c)) = chars.next() {
            if c == '"' {
                match stripped[i + 1..].chars().next() {
                    Some('"') => {
                        field.push('"');
                        chars.next();
                    }
                    _ => {
                        consumed = i + 1;
                        break;
                    }
                }
            } else {
                field.push(c);
            }
        }
        fields.push(field);
        rest = &stripped[consumed..];
    }
    assert!(rest.is_empty(), "trailing garbage: {rest:?}");
    fields
}

#[test]
fn test_encode_has_exactly_eight_fields() {
    let line = encode_record(&record("some text"));
    let fields = split_fields(&line);
    assert_eq!(fields.len(), 8);
    assert_eq!(fields[0], "1700000000");
    assert_eq!(fields[6], "text");
    assert_eq!(fields[7], "some text");
}

#[test]
fn test_timestamp_is_bare_and_rest_quoted() {
    let line = encode_record(&record("x"));
    assert!(line.starts_with("1700000000,\""));
    // Seven quoted fields → seven `,"` separators.
    assert_eq!(line.matches(",\"").count(), 7);
    assert!(line.ends_with('"'));
}

#[test]
fn test_interior_quotes_doubled() {
    let line = encode_record(&record("hello world \"quote\""));
    assert!(line.ends_with("\"hello world \"\"quote\"\"\""));
    let fields = split_fields(&line);
    assert_eq!(fields[7], "hello world \"quote\"");
}

#[test]
fn test_control_chars_never_reach_the_line() {
    // Adversarial content that slipped past an adapter.
    let line = encode_record(&record("a\r\nb\0c"));
    assert!(!line.contains('\r'));
    assert!(!line.contains('\n'));
    assert!(!line.contains('\0'));
    let fields = split_fields(&line);
    assert_eq!(fields[7], "abc");
}

#[test]
fn test_unicode_content_round_trips() {
    let line = encode_record(&record("пароль 密码 ñ"));
    let fields = split_fields(&line);
    assert_eq!(fields[7], "пароль 密码 ñ");
}

#[test]
fn test_append_buffers_until_cap_then_flushes() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.csv");
    // Large cap: nothing on disk until an explicit flush.
    let writer = IndexWriter::open(&out, 1024 * 1024).unwrap();
    writer.append(&record("one")).unwrap();
    assert_eq!(std::fs::metadata(&out).unwrap().len(), 0);
    writer.flush().unwrap();
    let text = std::fs::read_to_string(&out).unwrap();
    assert_eq!(text.lines().count(), 1);
}

#[test]
fn test_small_cap_flushes_on_append() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.csv");
    let writer = IndexWriter::open(&out, 1).unwrap();
    writer.append(&record("one")).unwrap();
    writer.append(&record("two")).unwrap();
    let text = std::fs::read_to_string(&out).unwrap();
    assert_eq!(text.lines().count(), 2);
}

#[test]
fn test_drop_flushes_remaining() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.csv");
    {
        let writer = IndexWriter::open(&out, 1024 * 1024).unwrap();
        writer.append(&record("pending")).unwrap();
    }
    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.contains("pending"));
}

#[test]
fn test_concurrent_appends_keep_lines_intact() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.csv");
    let writer = std::sync::Arc::new(IndexWriter::open(&out, 64).unwrap());

    std::thread::scope(|scope| {
        for t in 0..4 {
            let writer = std::sync::Arc::clone(&writer);
            scope.spawn(move || {
                for i in 0..50 {
                    writer.append(&record(&format!("worker{t} line{i}"))).unwrap();
                }
            });
        }
    });
    writer.flush().unwrap();

    let text = std::fs::read_to_string(&out).unwrap();
    assert_eq!(text.lines().count(), 200);
    for line in text.lines() {
        assert_eq!(split_fields(line).len(), 8);
    }
}
