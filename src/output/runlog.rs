//! Run log: per-query outcomes and error details for post-run inspection

use crate::checkpoint::write_atomic;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One query's traversal outcome
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryOutcome {
    pub query: String,
    /// Result entries enumerated for the query
    pub found: usize,
    /// Records accepted while processing the query
    pub added: usize,
}

/// One captured error, at query or record granularity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorOutcome {
    pub query: String,
    /// Result-list position, when the error was record-level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    pub message: String,
}

/// The accumulated log for one run, persisted as JSON at the end
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLog {
    #[serde(rename = "start_time")]
    pub started_at: DateTime<Utc>,
    #[serde(rename = "end_time", skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    pub config_hash: String,
    pub queries: Vec<QueryOutcome>,
    pub errors: Vec<ErrorOutcome>,
    pub total_records: usize,
    pub total_sub_items: usize,
}

impl RunLog {
    pub fn new(config_hash: impl Into<String>) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            config_hash: config_hash.into(),
            queries: Vec::new(),
            errors: Vec::new(),
            total_records: 0,
            total_sub_items: 0,
        }
    }

    /// Appends a finished query's outcome
    pub fn record_query(&mut self, outcome: QueryOutcome) {
        self.queries.push(outcome);
    }

    /// Appends an error at query (`position: None`) or record granularity
    pub fn record_error(
        &mut self,
        query: impl Into<String>,
        position: Option<usize>,
        message: impl Into<String>,
    ) {
        self.errors.push(ErrorOutcome {
            query: query.into(),
            position,
            message: message.into(),
        });
    }

    /// Stamps the end time and final totals
    pub fn finish(&mut self, total_records: usize, total_sub_items: usize) {
        self.finished_at = Some(Utc::now());
        self.total_records = total_records;
        self.total_sub_items = total_sub_items;
    }

    /// Persists the log as pretty JSON, atomically
    pub fn write(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_vec_pretty(self)?;
        write_atomic(path, &content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_accumulates_queries_and_errors() {
        let mut log = RunLog::new("abc123");
        log.record_query(QueryOutcome {
            query: "seongsu coffee".to_string(),
            found: 10,
            added: 3,
        });
        log.record_error("seongsu coffee", Some(4), "detail frame not attachable");
        log.record_error("mapo roastery", None, "search frame timeout");

        assert_eq!(log.queries.len(), 1);
        assert_eq!(log.errors.len(), 2);
        assert_eq!(log.errors[0].position, Some(4));
        assert_eq!(log.errors[1].position, None);
    }

    #[test]
    fn test_finish_stamps_totals() {
        let mut log = RunLog::new("abc123");
        assert!(log.finished_at.is_none());
        log.finish(12, 84);
        assert!(log.finished_at.is_some());
        assert_eq!(log.total_records, 12);
        assert_eq!(log.total_sub_items, 84);
    }

    #[test]
    fn test_write_then_parse_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("crawl_log.json");

        let mut log = RunLog::new("abc123");
        log.record_query(QueryOutcome {
            query: "q".to_string(),
            found: 2,
            added: 1,
        });
        log.finish(1, 4);
        log.write(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: RunLog = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.config_hash, "abc123");
        assert_eq!(parsed.queries, log.queries);
        assert_eq!(parsed.total_sub_items, 4);
    }

    #[test]
    fn test_query_level_error_omits_position_field() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("crawl_log.json");

        let mut log = RunLog::new("abc123");
        log.record_error("q", None, "boom");
        log.write(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("\"position\""));
    }
}
