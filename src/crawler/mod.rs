//! The crawl-and-extract engine
//!
//! This module contains the traversal machinery:
//! - frame-context navigation through the map application's views
//! - multi-strategy field extraction with the fill-only-empty merge
//! - pacing between interactions
//! - the coordinator loop gluing navigation, extraction, admission,
//!   deduplication, checkpointing, and logging together

mod coordinator;
mod extractor;
mod navigator;
mod pacer;

pub use coordinator::{Coordinator, RunSummary};
pub use extractor::{extract_fields, extract_sub_items};
pub use navigator::{DetailAccess, FrameContext, Navigator};
pub use pacer::Pacer;

use crate::browser::chrome::ChromeSession;
use crate::config::Config;
use crate::Result;

/// Runs a complete crawl over a freshly launched browser session
///
/// This is the main entry point used by the CLI. It will:
/// 1. Launch a headless browser session
/// 2. Load or create the checkpoint (resume unless `fresh`)
/// 3. Walk every configured query and its result entries
/// 4. Write the tables, run log, and final checkpoint state
///
/// # Arguments
///
/// * `config` - The crawl configuration
/// * `config_hash` - Hash of the configuration file, recorded in the run log
/// * `fresh` - Ignore any existing checkpoint and start over
///
/// # Returns
///
/// * `Ok(RunSummary)` - Crawl completed; artifacts are on disk
/// * `Err(MapsiftError)` - Crawl aborted; resumable state is on disk
pub async fn run_crawl(config: Config, config_hash: &str, fresh: bool) -> Result<RunSummary> {
    let session = ChromeSession::launch()?;
    let coordinator = Coordinator::new(config, session, config_hash, fresh)?;
    coordinator.run().await
}
