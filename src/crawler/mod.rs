//! Crawler module for page discovery and product harvesting
//!
//! This module contains the network-facing pipeline, including:
//! - HTTP fetching without retries
//! - Listing page discovery from category pagination
//! - Product URL collection from listing pages
//! - Wave scheduling with bounded concurrency
//! - Overall run coordination

mod coordinator;
mod fetcher;
mod listing;
mod pagination;
mod scheduler;

pub use coordinator::{harvest_product, run_harvest, HarvestSummary, Harvester};
pub use fetcher::{build_http_client, Fetcher};
pub use listing::{extract_product_urls, parse_product_urls};
pub use pagination::{discover_pages, listing_pages, parse_last_page};
pub use scheduler::{run_batched, Scheduler};

use crate::config::Config;
use crate::Result;

/// Runs a complete harvest
///
/// This is the main entry point for starting a harvest. It will:
/// 1. Open the record store
/// 2. Create a run or resume an unfinished one with the same config hash
/// 3. Discover listing pages for every category
/// 4. Collect product URLs from the listing pages
/// 5. Extract and store every product record
/// 6. Write the unified table
///
/// # Arguments
///
/// * `config` - The harvest configuration
/// * `config_hash` - Hash identifying `config`
/// * `fresh` - Always start a new run
///
/// # Returns
///
/// * `Ok(HarvestSummary)` - Harvest completed successfully
/// * `Err(HarvestError)` - Harvest aborted
pub async fn harvest(config: Config, config_hash: &str, fresh: bool) -> Result<HarvestSummary> {
    run_harvest(config, config_hash, fresh).await
}
