//! Tests for the logger module

use std::io::{Read, Write};

use proptest::prelude::*;
use tempfile::TempDir;

use crate::logger::config::*;
use crate::logger::open_log_file;

fn file_config(dir: &TempDir, append: bool) -> FileConfig {
    FileConfig {
        enabled: true,
        path: dir.path().join("nested").join("push.log"),
        append,
        format: LogFormat::Json,
    }
}

#[test]
fn test_open_log_file_creates_parent_dirs() {
    let dir = TempDir::new().unwrap();
    let config = file_config(&dir, true);

    let file = open_log_file(&config);
    assert!(file.is_ok());
    assert!(config.path.exists());
}

#[test]
fn test_open_log_file_append_keeps_content() {
    let dir = TempDir::new().unwrap();
    let config = file_config(&dir, true);

    open_log_file(&config).unwrap().write_all(b"first\n").unwrap();
    open_log_file(&config).unwrap().write_all(b"second\n").unwrap();

    let mut content = String::new();
    std::fs::File::open(&config.path)
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, "first\nsecond\n");
}

#[test]
fn test_open_log_file_truncates_without_append() {
    let dir = TempDir::new().unwrap();
    let config = file_config(&dir, false);

    open_log_file(&config).unwrap().write_all(b"stale\n").unwrap();
    open_log_file(&config).unwrap().write_all(b"fresh\n").unwrap();

    let content = std::fs::read_to_string(&config.path).unwrap();
    assert_eq!(content, "fresh\n");
}

proptest! {
    #[test]
    fn property_valid_configs_validate(
        console_enabled in any::<bool>(),
        file_enabled in any::<bool>(),
        colored in any::<bool>(),
        append in any::<bool>(),
        level in prop_oneof![
            Just("trace"), Just("debug"), Just("info"), Just("warn"), Just("error")
        ],
    ) {
        prop_assume!(console_enabled || file_enabled);

        let config = LoggerConfig {
            console: ConsoleConfig::new(console_enabled, colored),
            file: FileConfig {
                enabled: file_enabled,
                append,
                ..Default::default()
            },
            level: level.to_string(),
        };

        prop_assert!(config.validate().is_ok());
        prop_assert!(config.parse_level().is_ok());
    }

    #[test]
    fn property_unknown_levels_fail(level in "[a-z]{6,12}") {
        prop_assume!(!["trace", "debug", "info", "warn", "error"].contains(&level.as_str()));
        let config = LoggerConfig { level, ..Default::default() };
        prop_assert!(config.validate().is_err());
    }
}
