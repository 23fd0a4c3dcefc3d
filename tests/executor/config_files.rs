//! Sessions configured from `jqbridge.toml` files.

use crate::common::*;
use jqbridge::CONFIG_FILE_NAME;
use tempfile::TempDir;

#[test]
fn config_file_drives_session() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "pretty = true\nmax_outputs = 2\n").unwrap();

    let config = BridgeConfig::from_file(&path).unwrap();
    let mut session = Session::with_config(".[]", config).unwrap();
    session.accept_json(r#"[{"a":1}, {"b":2}, {"c":3}]"#).unwrap();

    assert!(session.step().unwrap());
    assert_eq!(session.last_value_as_text().unwrap(), "{\n  \"a\": 1\n}");
    assert!(session.step().unwrap());
    assert!(matches!(session.step(), Err(Error::Evaluation { .. })));
}

#[test]
fn default_file_is_written_once() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    BridgeConfig::write_default_if_missing(&path).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, BridgeConfig::default_toml());
    assert_eq!(BridgeConfig::from_file(&path).unwrap(), BridgeConfig::default());
}

#[test]
fn malformed_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "max_depth = [").unwrap();
    assert!(matches!(
        BridgeConfig::from_file(&path),
        Err(Error::Config { .. })
    ));
}
