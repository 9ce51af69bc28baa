//! Integration tests for loading the shipped configuration.

use lamus_core::config::AppConfig;
use lamus_core::config::logging::LogFormat;
use lamus_storage::PathResolver;

#[test]
fn test_default_config_loads() {
    let config = AppConfig::load("test").unwrap();

    assert_eq!(config.database.max_connections, 10);
    assert_eq!(config.workspace.orphans_directory_name, "sessions");
    assert_eq!(config.workspace.type_recheck_size_limit_bytes, 8_388_608);
    assert_eq!(config.worker.concurrency, 4);
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_default_config_builds_path_resolver() {
    let config = AppConfig::load("test").unwrap();
    let paths = PathResolver::new(config.workspace.clone(), &config.archive);

    assert_eq!(
        paths.orphans_directory(Some("Corpus")),
        std::path::Path::new("./data/archive/corpora/Corpus/sessions")
    );
}
