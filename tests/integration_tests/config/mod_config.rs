use forum_query::{ForumConfig, ForumError};
use std::fs;
use tempfile::tempdir;

#[test]
fn explicit_config_file_is_loaded() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("forumq.toml");
    fs::write(&path, "default_limit = 15\nmax_limit = 200\nmax_connections = 4\n").unwrap();
    let cfg = ForumConfig::from_file(&path).unwrap();
    assert_eq!((cfg.default_limit, cfg.max_limit, cfg.max_connections), (15, 200, 4));
    assert_eq!(ForumConfig::config_paths(Some(path.as_path()))[0], path);
}

#[test]
fn missing_explicit_config_is_an_error() {
    let dir = tempdir().unwrap();
    let err = ForumConfig::load(Some(dir.path().join("absent.toml").as_path())).unwrap_err();
    assert!(matches!(err, ForumError::Config(_)));
}

#[test]
fn malformed_file_names_the_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "max_limit = \"many\"").unwrap();
    let err = ForumConfig::from_file(&path).unwrap_err();
    assert!(err.to_string().contains("bad.toml"));
}
