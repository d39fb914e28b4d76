//! Tests for config loading

use esfetch::{Credentials, ElasticConfig, Error};
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn test_load_full_file() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("esfetch.toml");
    fs::write(
        &path,
        r#"
base_url = "https://search.example.com:9243"
index = "articles"
doc_type = "article"
timeout_ms = 2500

[credentials]
user = "reader"
password = "secret"
"#,
    )
    .unwrap();

    let config = ElasticConfig::load(&path).unwrap();

    assert_eq!(config.base_url, "https://search.example.com:9243");
    assert_eq!(config.index, "articles");
    assert_eq!(config.doc_type, "article");
    assert_eq!(config.timeout(), Duration::from_millis(2500));
    assert_eq!(config.credentials, Some(Credentials::new("reader", "secret")));
}

#[test]
fn test_load_applies_defaults() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("esfetch.toml");
    fs::write(&path, "index = \"articles\"\n").unwrap();

    let config = ElasticConfig::load(&path).unwrap();

    assert_eq!(config.base_url, "http://localhost:9200");
    assert_eq!(config.doc_type, "_doc");
    assert_eq!(config.timeout_ms, 30000);
    assert!(config.credentials.is_none());
}

#[test]
fn test_load_missing_file() {
    let temp = tempdir().unwrap();
    let err = ElasticConfig::load(&temp.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_load_invalid_toml() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("esfetch.toml");
    fs::write(&path, "timeout_ms = \"soon\"\n").unwrap();

    let err = ElasticConfig::load(&path).unwrap_err();
    assert!(matches!(err, Error::Toml(_)));
}

#[test]
fn test_builder_helpers() {
    let config = ElasticConfig::new("http://es:9200", "logs")
        .with_doc_type("entry")
        .with_timeout(Duration::from_secs(5))
        .with_credentials(Credentials::new("", "token"));

    assert_eq!(config.index, "logs");
    assert_eq!(config.doc_type, "entry");
    assert_eq!(config.timeout_ms, 5000);
    assert_eq!(config.credentials.unwrap().user, "");
}
