use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    // Read the configuration file
    let content = std::fs::read_to_string(path)?;

    // Parse TOML
    let config: Config = toml::from_str(&content)?;

    // Validate the configuration
    validate(&config)?;

    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// The hash is recorded in the run log so a resumed run can be matched
/// against the configuration that produced its checkpoint.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok((Config, String))` - Successfully loaded configuration and its hash
/// * `Err(ConfigError)` - Failed to load or parse the configuration
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const VALID_CONFIG: &str = r#"
[crawl]
max-entries-per-query = 10
max-sub-items = 30
target-record-count = 200
checkpoint-interval = 10

[delays]
step-ms = 1000
record-ms = 2000
query-ms = 3000
frame-timeout-ms = 10000
settle-ms = 2000

[search]
base-url = "https://map.example.com/p/search"
queries = ["seoul specialty coffee", "seongsu roastery"]

[filter]
region-markers = ["Seoul"]
exclusion-keywords = ["Cake"]

[output]
records-path = "data/stores.csv"
sub-items-path = "data/menus.csv"
run-log-path = "data/crawl_log.json"
checkpoint-path = "data/checkpoint.json"
"#;

    #[test]
    fn test_load_valid_config() {
        let file = create_temp_config(VALID_CONFIG);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawl.max_entries_per_query, 10);
        assert_eq!(config.crawl.target_record_count, Some(200));
        assert_eq!(config.search.queries.len(), 2);
        assert_eq!(config.filter.region_markers, vec!["Seoul"]);
        assert!(!config.filter.signal_keywords_enabled);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_malformed_toml() {
        let file = create_temp_config("this is not [ valid toml");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_config_hash_is_stable() {
        let file = create_temp_config(VALID_CONFIG);
        let h1 = compute_config_hash(file.path()).unwrap();
        let h2 = compute_config_hash(file.path()).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
    }

    #[test]
    fn test_hash_changes_with_content() {
        let file_a = create_temp_config(VALID_CONFIG);
        let file_b = create_temp_config(&VALID_CONFIG.replace("200", "100"));
        let h1 = compute_config_hash(file_a.path()).unwrap();
        let h2 = compute_config_hash(file_b.path()).unwrap();
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_load_config_with_hash() {
        let file = create_temp_config(VALID_CONFIG);
        let (config, hash) = load_config_with_hash(file.path()).unwrap();
        assert_eq!(config.crawl.checkpoint_interval, 10);
        assert_eq!(hash.len(), 64);
    }
}
