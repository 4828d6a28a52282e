//! External command runner tests: capture, deadlines, cancellation, and
//! missing tools. Unix-only where they shell out.

#![cfg(unix)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use sharecrawl::engine::command::ExternalCommand;

fn no_cancel() -> Arc<AtomicBool> {
    Arc::new(AtomicBool::new(false))
}

#[test]
fn test_captures_stdout() {
    let out = ExternalCommand::new("echo")
        .arg("hello")
        .run(Duration::from_secs(5), &no_cancel())
        .unwrap();
    assert!(out.success());
    assert_eq!(out.stdout_text().trim(), "hello");
}

#[test]
fn test_nonzero_exit_is_data_not_error() {
    let out = ExternalCommand::new("false")
        .run(Duration::from_secs(5), &no_cancel())
        .unwrap();
    assert!(!out.success());
    assert_eq!(out.exit_code, Some(1));
    assert!(!out.timed_out);
}

#[test]
fn test_missing_binary_is_an_error() {
    let result = ExternalCommand::new("no-such-tool-on-any-path")
        .run(Duration::from_secs(5), &no_cancel());
    assert!(result.is_err());
}

#[test]
fn test_deadline_kills_the_child() {
    let started = Instant::now();
    let out = ExternalCommand::new("sleep")
        .arg("30")
        .run(Duration::from_millis(300), &no_cancel())
        .unwrap();
    assert!(out.timed_out);
    assert!(out.exit_code.is_none());
    // Killed promptly, nowhere near the child's own runtime.
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_cancellation_kills_the_child() {
    let cancel = no_cancel();
    let flag = Arc::clone(&cancel);
    std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(200));
        flag.store(true, Ordering::Relaxed);
    });

    let started = Instant::now();
    let out = ExternalCommand::new("sleep")
        .arg("30")
        .run(Duration::from_secs(60), &cancel)
        .unwrap();
    assert!(out.cancelled);
    assert!(started.elapsed() < Duration::from_secs(5));
}
