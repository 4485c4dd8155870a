//! Configuration files driving extraction runs.

mod common;

use common::{samples, FakeEngine};
use radiomics_batch::config::{ConfigManager, ConfigurationError};
use radiomics_batch::orchestration::{CancellationToken, ExtractionContext, FeatureExtraction};
use std::fs;
use tempfile::TempDir;
use tracing::level_filters::LevelFilter;

fn write_config(dir: &TempDir, name: &str, contents: &str) {
    fs::write(dir.path().join(name), contents).unwrap();
}

#[test]
fn test_yml_extension_is_accepted() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "radiomics-batch.yml", "projection:\n  dimensions: 3\n");

    let manager =
        ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "development")
            .unwrap();
    assert_eq!(manager.config().projection.dimensions, 3);
    assert_eq!(manager.config_directory(), dir.path());
}

#[test]
fn test_environment_section_overrides_nested_values_only() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        "radiomics-batch.yaml",
        r#"
extraction:
  available_cpus: 4
  keep_extra_columns: true
logging:
  file_level: warn
  log_file_name: batch.log

test:
  extraction:
    available_cpus: 1
  logging:
    file_level: trace
"#,
    );

    let manager =
        ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "test")
            .unwrap();
    let config = manager.config();
    assert_eq!(config.extraction.available_cpus, Some(1));
    assert!(config.extraction.keep_extra_columns);
    assert_eq!(config.logging.file_level, LevelFilter::TRACE);
    assert_eq!(config.logging.log_file_name, "batch.log");

    let rendered = manager.debug_config();
    assert_eq!(rendered["logging"]["file_level"], "trace");
}

#[test]
fn test_non_mapping_environment_section_is_rejected() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "radiomics-batch.yaml", "test: 5\n");

    let result =
        ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "test");
    assert!(matches!(
        result,
        Err(ConfigurationError::ConfigMergeError { .. })
    ));
}

#[test]
fn test_loaded_config_drives_an_extraction() {
    let config_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    write_config(
        &config_dir,
        "radiomics-batch.yaml",
        &format!(
            "extraction:\n  available_cpus: 3\nlogging:\n  console_level: off\n  log_file_name: run.log\noutput:\n  enabled: true\n  write_json: false\n  directory: {}\n",
            output_dir.path().display()
        ),
    );

    let manager = ConfigManager::load_from_directory_with_env(
        Some(config_dir.path().to_path_buf()),
        "test",
    )
    .unwrap();
    let extraction =
        FeatureExtraction::new(manager.config().clone(), FakeEngine::new().into_extractor());

    let report = extraction
        .run(
            samples(4),
            &mut ExtractionContext::new(),
            |_| {},
            &CancellationToken::new(),
        )
        .unwrap()
        .into_report()
        .unwrap();

    assert_eq!(report.pool_size, 2);
    assert!(output_dir.path().join("run.log").exists());
    assert!(output_dir.path().join("results.csv").exists());
    assert!(output_dir.path().join("results.txt").exists());
    assert!(!output_dir.path().join("results.json").exists());
}
