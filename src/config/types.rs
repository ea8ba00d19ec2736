use serde::Deserialize;

/// Main configuration structure for a Mapsift crawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawl: CrawlConfig,
    pub delays: DelayConfig,
    pub search: SearchConfig,
    pub filter: FilterConfig,
    pub output: OutputConfig,
}

/// Traversal caps and cadence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Maximum result entries enumerated per query
    #[serde(rename = "max-entries-per-query")]
    pub max_entries_per_query: usize,

    /// Maximum sub-items kept per record (excess is truncated)
    #[serde(rename = "max-sub-items")]
    pub max_sub_items: usize,

    /// Stop once this many records have been accepted (optional)
    #[serde(rename = "target-record-count", default)]
    pub target_record_count: Option<usize>,

    /// Persist progress after every N accepted records
    #[serde(rename = "checkpoint-interval")]
    pub checkpoint_interval: usize,
}

/// Pacing delays, in milliseconds
///
/// All values are fixed configuration, not adaptive: the engine imposes a
/// minimum spacing between navigations, an extra pause after each accepted
/// record, and a longer pause between queries.
#[derive(Debug, Clone, Deserialize)]
pub struct DelayConfig {
    /// Minimum time between two navigation/interaction steps
    #[serde(rename = "step-ms")]
    pub step_ms: u64,

    /// Pause after each accepted record
    #[serde(rename = "record-ms")]
    pub record_ms: u64,

    /// Pause between queries
    #[serde(rename = "query-ms")]
    pub query_ms: u64,

    /// Bounded wait for a frame to become attachable
    #[serde(rename = "frame-timeout-ms")]
    pub frame_timeout_ms: u64,

    /// Settle time after a navigation, for dynamically rendered content
    #[serde(rename = "settle-ms")]
    pub settle_ms: u64,
}

/// Search endpoint and query list
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Base URL of the map application's search view; the query string is
    /// appended as a path segment
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Queries, processed in list order
    pub queries: Vec<String>,
}

/// Record and sub-item admission rules
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// A record's address must contain at least one of these markers
    #[serde(rename = "region-markers")]
    pub region_markers: Vec<String>,

    /// Enables the content-signal check on records
    #[serde(rename = "signal-keywords-enabled", default)]
    pub signal_keywords_enabled: bool,

    /// Terms a record's description or sub-items must mention when the
    /// signal check is enabled
    #[serde(rename = "signal-keywords", default)]
    pub signal_keywords: Vec<String>,

    /// Sub-items whose name or description contains any of these terms are
    /// dropped
    #[serde(rename = "exclusion-keywords", default)]
    pub exclusion_keywords: Vec<String>,
}

/// Output artifact paths
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the record table CSV
    #[serde(rename = "records-path")]
    pub records_path: String,

    /// Path to the sub-item table CSV
    #[serde(rename = "sub-items-path")]
    pub sub_items_path: String,

    /// Path to the run log JSON
    #[serde(rename = "run-log-path")]
    pub run_log_path: String,

    /// Path to the checkpoint file
    #[serde(rename = "checkpoint-path")]
    pub checkpoint_path: String,
}
