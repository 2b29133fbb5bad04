// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use std::io::Write;

#[test]
fn defaults_match_spec() {
    let cfg = Config::default();
    assert_eq!(cfg.exemplar_threshold_seconds, 30);
    assert!(cfg.exemplar_enabled);
    assert_eq!(cfg.slow_threshold_seconds, 60);
    assert_eq!(cfg.retry_attempts, 3);
    assert_eq!(cfg.max_processing_time_seconds, 300);
}

#[test]
fn missing_file_yields_defaults() {
    let cfg = Config::load(Path::new("/nonexistent/path/does-not-exist.toml")).unwrap();
    assert_eq!(cfg, Config::default());
}

#[test]
fn file_values_override_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "retry_attempts = 5\ndefault_model = \"claude-3-haiku\"").unwrap();
    let cfg = Config::load(file.path()).unwrap();
    assert_eq!(cfg.retry_attempts, 5);
    assert_eq!(cfg.default_model, "claude-3-haiku");
    // untouched keys keep their default
    assert_eq!(cfg.exemplar_threshold_seconds, 30);
}

#[test]
#[serial(env)]
fn env_override_wins_over_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "retry_attempts = 5").unwrap();
    std::env::set_var("COMPUTER_RETRY_ATTEMPTS", "9");
    let cfg = Config::load(file.path()).unwrap();
    std::env::remove_var("COMPUTER_RETRY_ATTEMPTS");
    assert_eq!(cfg.retry_attempts, 9);
}

#[test]
#[serial(env)]
fn invalid_env_override_falls_back_to_default_for_that_key_only() {
    std::env::set_var("COMPUTER_RETRY_ATTEMPTS", "not-a-number");
    let cfg = Config::load(Path::new("/nonexistent.toml")).unwrap();
    std::env::remove_var("COMPUTER_RETRY_ATTEMPTS");
    assert_eq!(cfg.retry_attempts, Config::default().retry_attempts);
}
