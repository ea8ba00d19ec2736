//! Statistics over existing output tables
//!
//! Backs the `--stats` CLI mode: summarize what a previous run produced
//! without opening a browser session.

use crate::config::OutputConfig;
use crate::output::tables::load_tables;
use crate::Result;

/// Summary of the current tabular output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputStats {
    pub records: usize,
    pub sub_items: usize,
    /// Records that have at least one sub-item
    pub records_with_sub_items: usize,
}

/// Loads statistics from the output tables
///
/// Missing tables count as zero rather than an error, so the mode is
/// usable before any run has happened.
pub fn load_stats(output: &OutputConfig) -> Result<OutputStats> {
    let accepted = load_tables(output)?;

    let records_with_sub_items = accepted.iter().filter(|(_, items)| !items.is_empty()).count();

    Ok(OutputStats {
        records: accepted.len(),
        sub_items: accepted.sub_item_count(),
        records_with_sub_items,
    })
}

/// Prints statistics to stdout
pub fn print_stats(stats: &OutputStats) {
    println!("=== Output Statistics ===\n");
    println!("Records:                {}", stats.records);
    println!("Sub-items:              {}", stats.sub_items);
    println!("Records with sub-items: {}", stats.records_with_sub_items);

    if stats.records > 0 {
        println!(
            "Avg sub-items/record:   {:.1}",
            stats.sub_items as f64 / stats.records as f64
        );
    }
}
