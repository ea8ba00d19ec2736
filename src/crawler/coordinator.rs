//! Crawl coordinator - main traversal orchestration
//!
//! The coordinator owns the browser session (through the navigator), the
//! accepted set, the checkpoint, and the run log for the whole run. It
//! walks queries in configured order and entries in list order, gates
//! every extraction through admission and dedup, advances the checkpoint,
//! and guarantees that final artifacts are written on every exit path.
//! Nothing below this loop may abort the run except a session-level
//! browser failure.

use crate::browser::BrowserSession;
use crate::checkpoint::{Checkpoint, CheckpointStore};
use crate::config::Config;
use crate::crawler::extractor::{extract_fields, extract_sub_items};
use crate::crawler::navigator::{DetailAccess, Navigator};
use crate::crawler::pacer::Pacer;
use crate::dedup::AcceptedSet;
use crate::filter::{Admission, Rejection};
use crate::output::{load_tables, write_tables, QueryOutcome, RunLog};
use crate::record::ResultEntry;
use crate::site::SiteProfile;
use crate::Result;
use std::path::Path;

/// Final figures reported by a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub records: usize,
    pub sub_items: usize,
    /// Whether the run picked up a previous checkpoint
    pub resumed: bool,
    /// Whether the run stopped early at the configured target count
    pub target_reached: bool,
}

/// Outcome of one entry's traversal
enum EntryOutcome {
    Accepted { sub_items: usize },
    Rejected(Rejection),
    Failed(String),
}

/// Owns one crawl run end to end
pub struct Coordinator<B: BrowserSession> {
    config: Config,
    profile: SiteProfile,
    navigator: Navigator<B>,
    pacer: Pacer,
    accepted: AcceptedSet,
    checkpoint: Checkpoint,
    store: CheckpointStore,
    run_log: RunLog,
    accepted_since_save: usize,
    resumed: bool,
}

impl<B: BrowserSession> Coordinator<B> {
    /// Creates a coordinator, resuming from a checkpoint unless `fresh`
    ///
    /// Resume mode loads the processed-position set and pre-seeds the
    /// accepted set from the partial tables, so already-committed records
    /// are neither re-extracted nor re-emitted.
    pub fn new(config: Config, session: B, config_hash: &str, fresh: bool) -> Result<Self> {
        let profile = SiteProfile::naver_map()?;
        let store = CheckpointStore::new(&config.output.checkpoint_path);

        let (checkpoint, accepted, resumed) = if fresh {
            store.remove()?;
            (Checkpoint::new(), AcceptedSet::new(), false)
        } else if let Some(checkpoint) = store.load()? {
            let accepted = load_tables(&config.output)?;
            tracing::info!(
                positions = checkpoint.len(),
                records = accepted.len(),
                "resuming from checkpoint"
            );
            (checkpoint, accepted, true)
        } else {
            (Checkpoint::new(), AcceptedSet::new(), false)
        };

        let pacer = Pacer::new(config.delays.clone());

        Ok(Self {
            config,
            profile,
            navigator: Navigator::new(session),
            pacer,
            accepted,
            checkpoint,
            store,
            run_log: RunLog::new(config_hash),
            accepted_since_save: 0,
            resumed,
        })
    }

    /// Runs the traversal to completion
    ///
    /// On success the checkpoint file is removed and the final tables and
    /// run log remain. On a fatal error the latest checkpoint and partial
    /// tables are preserved as the resume point; the run log is written
    /// either way. The browser session is released when the coordinator
    /// is dropped, on every path.
    pub async fn run(mut self) -> Result<RunSummary> {
        tracing::info!(
            queries = self.config.search.queries.len(),
            resumed = self.resumed,
            "starting crawl run"
        );

        let outcome = self.crawl_loop().await;

        // Final artifacts happen regardless of how the loop ended.
        write_tables(&self.config.output, &self.accepted)?;
        self.run_log
            .finish(self.accepted.len(), self.accepted.sub_item_count());
        self.run_log
            .write(Path::new(&self.config.output.run_log_path))?;

        match outcome {
            Ok(target_reached) => {
                self.store.remove()?;
                let summary = RunSummary {
                    records: self.accepted.len(),
                    sub_items: self.accepted.sub_item_count(),
                    resumed: self.resumed,
                    target_reached,
                };
                tracing::info!(
                    records = summary.records,
                    sub_items = summary.sub_items,
                    "crawl completed"
                );
                Ok(summary)
            }
            Err(e) => {
                self.store.save(&self.checkpoint)?;
                tracing::error!(error = %e, "run aborted; checkpoint and partial output preserved");
                Err(e)
            }
        }
    }

    /// Walks all queries; returns whether the target count stopped the run
    async fn crawl_loop(&mut self) -> Result<bool> {
        let queries = self.config.search.queries.clone();
        let total = queries.len();

        for (query_index, query) in queries.iter().enumerate() {
            if self.target_reached() {
                return Ok(true);
            }

            tracing::info!(query = %query, index = query_index + 1, total, "processing query");
            let mut outcome = QueryOutcome {
                query: query.clone(),
                found: 0,
                added: 0,
            };

            let result = self.process_query(query_index, query, &mut outcome).await;
            self.run_log.record_query(outcome);
            if let Err(e) = &result {
                self.run_log.record_error(query, None, e.to_string());
            }
            result?;

            if self.target_reached() {
                return Ok(true);
            }
            if query_index + 1 < total {
                self.pacer.between_queries().await;
            }
        }

        Ok(self.target_reached())
    }

    /// Processes one query's result list
    ///
    /// Query-level browser failures are converted to run-log entries and
    /// the traversal moves on; only session-level failures propagate.
    async fn process_query(
        &mut self,
        query_index: usize,
        query: &str,
        outcome: &mut QueryOutcome,
    ) -> Result<()> {
        let search_url = self
            .profile
            .search_url(&self.config.search.base_url, query)?;

        self.pacer.before_step().await;
        if let Err(e) = self
            .navigator
            .open_search(&self.profile, &self.pacer, &search_url)
            .await
        {
            if e.is_fatal() {
                return Err(e.into());
            }
            tracing::warn!(query = %query, error = %e, "search view unavailable; query skipped");
            self.run_log.record_error(query, None, e.to_string());
            let _ = self.navigator.reset();
            return Ok(());
        }

        let max_entries = self.config.crawl.max_entries_per_query;
        let entries = match self.navigator.list_entries(&self.profile, max_entries) {
            Ok(entries) => entries,
            Err(e) => {
                if e.is_fatal() {
                    return Err(e.into());
                }
                tracing::warn!(query = %query, error = %e, "result list unreadable");
                self.run_log.record_error(query, None, e.to_string());
                let _ = self.navigator.reset();
                return Ok(());
            }
        };
        outcome.found = entries.len();
        tracing::info!(query = %query, found = entries.len(), "entries enumerated");

        for entry in &entries {
            let position = Checkpoint::position(query_index, entry.position, max_entries);
            if self.checkpoint.is_processed(position) {
                tracing::debug!(position, name = %entry.name, "position already processed, skipping");
                continue;
            }
            if self.target_reached() {
                break;
            }

            // A fatal abort mid-entry must leave the position unprocessed
            // so a resumed run retries it.
            let result = self.process_entry(&search_url, entry).await;
            if result.is_ok() {
                self.checkpoint.mark_processed(position);
            }

            match result {
                Ok(EntryOutcome::Accepted { sub_items }) => {
                    outcome.added += 1;
                    self.accepted_since_save += 1;
                    tracing::info!(
                        name = %entry.name,
                        sub_items,
                        total = self.accepted.len(),
                        "record accepted"
                    );
                    self.maybe_checkpoint()?;
                    self.pacer.after_record().await;
                }
                Ok(EntryOutcome::Rejected(reason)) => {
                    tracing::info!(name = %entry.name, reason = %reason, "record not added");
                }
                Ok(EntryOutcome::Failed(message)) => {
                    tracing::warn!(name = %entry.name, error = %message, "entry failed");
                    self.run_log
                        .record_error(query, Some(entry.position), message);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    /// Drills into one entry, extracts, and gates acceptance
    async fn process_entry(
        &mut self,
        search_url: &str,
        entry: &ResultEntry,
    ) -> Result<EntryOutcome> {
        self.pacer.before_step().await;

        match self
            .navigator
            .open_detail(&self.profile, &self.pacer, search_url, entry)
            .await
        {
            Ok(DetailAccess::Open) => {}
            Ok(DetailAccess::Mismatch { expected, found }) => {
                tracing::debug!(
                    expected = %expected,
                    found = %found,
                    "result list shifted under us; entry skipped"
                );
                let _ = self.navigator.reset();
                return Ok(EntryOutcome::Rejected(Rejection::EntryMismatch));
            }
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                let _ = self.navigator.reset();
                return Ok(EntryOutcome::Failed(e.to_string()));
            }
        }

        // First pass: the detail view.
        let mut fields = extract_fields(self.navigator.session_mut(), &self.profile);

        // Second pass: the sub-list view, when it can be activated. Fields
        // already extracted are never overwritten.
        let mut items = Vec::new();
        if self
            .navigator
            .activate_sublist(&self.profile, &self.pacer)
            .await
        {
            let second_pass = extract_fields(self.navigator.session_mut(), &self.profile);
            fields.merge_missing(second_pass);

            let admission = Admission::new(&self.config.filter);
            items = extract_sub_items(
                self.navigator.session_mut(),
                &self.profile,
                &admission,
                self.config.crawl.max_sub_items,
            );
        }

        if let Err(e) = self.navigator.reset() {
            if e.is_fatal() {
                return Err(e.into());
            }
            tracing::debug!(error = %e, "reset after detail view failed");
        }

        let Some(record) = fields.into_record() else {
            return Ok(EntryOutcome::Rejected(Rejection::Invalid));
        };

        let admission = Admission::new(&self.config.filter);
        if let Err(reason) = admission.admit_record(&record, &items, &self.accepted) {
            return Ok(EntryOutcome::Rejected(reason));
        }

        let sub_items = items.len();
        if !self.accepted.insert(record, items) {
            return Ok(EntryOutcome::Rejected(Rejection::Duplicate));
        }
        Ok(EntryOutcome::Accepted { sub_items })
    }

    /// Persists tables and checkpoint once the interval is reached
    fn maybe_checkpoint(&mut self) -> Result<()> {
        if self.accepted_since_save >= self.config.crawl.checkpoint_interval {
            write_tables(&self.config.output, &self.accepted)?;
            self.store.save(&self.checkpoint)?;
            self.accepted_since_save = 0;
            tracing::info!(
                records = self.accepted.len(),
                positions = self.checkpoint.len(),
                "progress checkpointed"
            );
        }
        Ok(())
    }

    fn target_reached(&self) -> bool {
        self.config
            .crawl
            .target_record_count
            .map_or(false, |target| self.accepted.len() >= target)
    }

    /// Read access for inspection in tests
    pub fn accepted(&self) -> &AcceptedSet {
        &self.accepted
    }
}
