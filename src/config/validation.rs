use crate::config::types::{
    Config, CrawlConfig, DelayConfig, FilterConfig, OutputConfig, SearchConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl(&config.crawl)?;
    validate_delays(&config.delays)?;
    validate_search(&config.search)?;
    validate_filter(&config.filter)?;
    validate_output(&config.output)?;
    Ok(())
}

/// Validates traversal caps
fn validate_crawl(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.max_entries_per_query < 1 || config.max_entries_per_query > 100 {
        return Err(ConfigError::Validation(format!(
            "max_entries_per_query must be between 1 and 100, got {}",
            config.max_entries_per_query
        )));
    }

    if config.max_sub_items < 1 {
        return Err(ConfigError::Validation(format!(
            "max_sub_items must be >= 1, got {}",
            config.max_sub_items
        )));
    }

    if config.checkpoint_interval < 1 {
        return Err(ConfigError::Validation(format!(
            "checkpoint_interval must be >= 1, got {}",
            config.checkpoint_interval
        )));
    }

    if let Some(target) = config.target_record_count {
        if target < 1 {
            return Err(ConfigError::Validation(
                "target_record_count must be >= 1 when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates pacing delays
fn validate_delays(config: &DelayConfig) -> Result<(), ConfigError> {
    if config.step_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "step_ms must be >= 100ms, got {}ms",
            config.step_ms
        )));
    }

    if config.frame_timeout_ms < 1000 {
        return Err(ConfigError::Validation(format!(
            "frame_timeout_ms must be >= 1000ms, got {}ms",
            config.frame_timeout_ms
        )));
    }

    Ok(())
}

/// Validates the search endpoint and query list
fn validate_search(config: &SearchConfig) -> Result<(), ConfigError> {
    Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if config.queries.is_empty() {
        return Err(ConfigError::Validation(
            "at least one query is required".to_string(),
        ));
    }

    if let Some(empty) = config.queries.iter().position(|q| q.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "query at index {} is empty",
            empty
        )));
    }

    Ok(())
}

/// Validates admission-rule lists
fn validate_filter(config: &FilterConfig) -> Result<(), ConfigError> {
    if config.region_markers.is_empty() {
        return Err(ConfigError::Validation(
            "at least one region marker is required".to_string(),
        ));
    }

    if config.signal_keywords_enabled && config.signal_keywords.is_empty() {
        return Err(ConfigError::Validation(
            "signal_keywords cannot be empty when signal_keywords_enabled is true".to_string(),
        ));
    }

    Ok(())
}

/// Validates output paths
fn validate_output(config: &OutputConfig) -> Result<(), ConfigError> {
    let paths = [
        ("records_path", &config.records_path),
        ("sub_items_path", &config.sub_items_path),
        ("run_log_path", &config.run_log_path),
        ("checkpoint_path", &config.checkpoint_path),
    ];

    for (name, value) in paths {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            crawl: CrawlConfig {
                max_entries_per_query: 10,
                max_sub_items: 30,
                target_record_count: Some(200),
                checkpoint_interval: 10,
            },
            delays: DelayConfig {
                step_ms: 1000,
                record_ms: 2000,
                query_ms: 3000,
                frame_timeout_ms: 10_000,
                settle_ms: 2000,
            },
            search: SearchConfig {
                base_url: "https://map.example.com/p/search".to_string(),
                queries: vec!["seoul specialty coffee".to_string()],
            },
            filter: FilterConfig {
                region_markers: vec!["Seoul".to_string()],
                signal_keywords_enabled: false,
                signal_keywords: vec![],
                exclusion_keywords: vec!["Cake".to_string()],
            },
            output: OutputConfig {
                records_path: "data/stores.csv".to_string(),
                sub_items_path: "data/menus.csv".to_string(),
                run_log_path: "data/crawl_log.json".to_string(),
                checkpoint_path: "data/checkpoint.json".to_string(),
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_rejects_empty_queries() {
        let mut config = valid_config();
        config.search.queries.clear();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_blank_query() {
        let mut config = valid_config();
        config.search.queries.push("   ".to_string());
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let mut config = valid_config();
        config.search.base_url = "not a url".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_rejects_zero_entry_cap() {
        let mut config = valid_config();
        config.crawl.max_entries_per_query = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_oversized_entry_cap() {
        let mut config = valid_config();
        config.crawl.max_entries_per_query = 500;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_zero_checkpoint_interval() {
        let mut config = valid_config();
        config.crawl.checkpoint_interval = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_tiny_step_delay() {
        let mut config = valid_config();
        config.delays.step_ms = 10;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_empty_region_markers() {
        let mut config = valid_config();
        config.filter.region_markers.clear();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_signal_enabled_without_terms() {
        let mut config = valid_config();
        config.filter.signal_keywords_enabled = true;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_signal_enabled_with_terms_passes() {
        let mut config = valid_config();
        config.filter.signal_keywords_enabled = true;
        config.filter.signal_keywords = vec!["single origin".to_string()];
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_rejects_empty_output_path() {
        let mut config = valid_config();
        config.output.checkpoint_path = String::new();
        assert!(validate(&config).is_err());
    }
}
