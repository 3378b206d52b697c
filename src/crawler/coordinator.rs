//! Harvest coordinator - main pipeline orchestration
//!
//! This module drives one harvest run through its stages:
//! - Opening the record store and creating or resuming a run
//! - Discovering listing pages for every category
//! - Collecting product URLs from listing pages
//! - Extracting product records wave by wave, appending each wave
//! - Marking the run complete and exporting the unified table
//!
//! Stages run strictly one after another. Within a stage, work is split into
//! waves by the [`Scheduler`]; any fetch failure aborts the run.

use crate::config::{Config, SiteConfig};
use crate::crawler::{discover_pages, extract_product_urls, Fetcher, Scheduler};
use crate::extract::extract_product;
use crate::output::{export_run, ExportSummary};
use crate::record::{self, ProductRecord};
use crate::storage::{RecordStore, SqliteStore};
use crate::{HarvestError, Result};
use std::collections::HashMap;
use std::path::Path;
use url::Url;

/// Outcome of a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestSummary {
    pub run_id: i64,
    /// Listing pages visited across all categories
    pub listing_pages: usize,
    /// Product URLs found on those pages, duplicates included
    pub products_discovered: usize,
    /// Records extracted by this process
    pub products_extracted: usize,
    /// Records already stored by an earlier attempt of the same run
    pub products_resumed: usize,
    pub export: ExportSummary,
}

/// Main harvest coordinator structure
pub struct Harvester {
    config: Config,
    store: Box<dyn RecordStore>,
    fetcher: Fetcher,
    scheduler: Scheduler,
    base_url: Url,
    config_hash: String,
    run_id: i64,
    /// Product URL of every record already stored for `run_id`, by position
    stored: HashMap<usize, String>,
}

impl Harvester {
    /// Creates a coordinator backed by the configured SQLite store
    ///
    /// # Arguments
    ///
    /// * `config` - The harvest configuration
    /// * `config_hash` - Hash identifying `config`, used to gate resumption
    /// * `fresh` - Always start a new run instead of resuming
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Successfully created coordinator
    /// * `Err(HarvestError)` - Failed to open the store or build the client
    pub fn new(config: Config, config_hash: &str, fresh: bool) -> Result<Self> {
        let store = SqliteStore::new(Path::new(&config.output.store_path))?;
        Self::with_store(config, config_hash, Box::new(store), fresh)
    }

    /// Creates a coordinator on top of an already opened store
    pub fn with_store(
        config: Config,
        config_hash: &str,
        mut store: Box<dyn RecordStore>,
        fresh: bool,
    ) -> Result<Self> {
        let base_url = Url::parse(&config.site.base_url)?;
        let fetcher = Fetcher::new(&config.crawler)?;
        let scheduler = Scheduler::new(config.crawler.batch_size as usize);

        let resumable = if fresh {
            None
        } else {
            store
                .get_latest_run()?
                .filter(|run| run.is_resumable_with(config_hash))
        };

        let (run_id, stored) = match resumable {
            Some(run) => {
                let stored = store.stored_positions(run.id)?;
                tracing::info!(
                    "Resuming run {} ({} products already stored)",
                    run.id,
                    stored.len()
                );
                (run.id, stored)
            }
            None => {
                let run_id = store.create_run(config_hash)?;
                tracing::info!("Starting new run {}", run_id);
                (run_id, HashMap::new())
            }
        };

        Ok(Self {
            config,
            store,
            fetcher,
            scheduler,
            base_url,
            config_hash: config_hash.to_string(),
            run_id,
            stored,
        })
    }

    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    /// Runs every stage to completion
    pub async fn run(&mut self) -> Result<HarvestSummary> {
        tracing::info!(
            "Harvesting {} categories from {} (batch size {})",
            self.config.site.categories.len(),
            self.base_url,
            self.scheduler.batch_size()
        );

        let listing_pages = self.discover_listing_pages().await?;
        let product_urls = self.collect_product_urls(&listing_pages).await?;
        self.check_stored_positions(&product_urls)?;
        let products_resumed = self.stored.len();
        let products_extracted = self.extract_products(&product_urls).await?;

        self.store.complete_run(self.run_id)?;
        tracing::info!("Run {} completed", self.run_id);

        let export = export_run(
            self.store.as_ref(),
            self.run_id,
            Path::new(&self.config.output.csv_path),
            self.config.output.delimiter_byte(),
        )?;

        Ok(HarvestSummary {
            run_id: self.run_id,
            listing_pages: listing_pages.len(),
            products_discovered: product_urls.len(),
            products_extracted,
            products_resumed,
            export,
        })
    }

    /// Listing page URLs of every category, in category order
    async fn discover_listing_pages(&self) -> Result<Vec<String>> {
        let fetcher = &self.fetcher;

        let per_category = self
            .scheduler
            .run(&self.config.site.categories, |category| async move {
                discover_pages(fetcher, &category).await
            })
            .await?;

        let pages: Vec<String> = per_category.into_iter().flatten().collect();
        tracing::info!("Discovered {} listing pages", pages.len());
        Ok(pages)
    }

    /// Product URLs of every listing page, in page order
    async fn collect_product_urls(&self, listing_pages: &[String]) -> Result<Vec<String>> {
        let fetcher = &self.fetcher;
        let base = &self.base_url;

        let per_page = self
            .scheduler
            .run(listing_pages, |page| async move {
                extract_product_urls(fetcher, &page, base).await
            })
            .await?;

        let urls: Vec<String> = per_page.into_iter().flatten().collect();
        tracing::info!("Collected {} product URLs", urls.len());
        Ok(urls)
    }

    /// Drops a resumed run whose stored records no longer match the listing
    ///
    /// A stored record is only reusable if the product at its position is
    /// still the same URL. On any mismatch a new run is started and every
    /// product is extracted again.
    fn check_stored_positions(&mut self, product_urls: &[String]) -> Result<()> {
        let stale = self
            .stored
            .iter()
            .find(|(position, url)| {
                product_urls.get(**position).map(String::as_str) != Some(url.as_str())
            })
            .map(|(position, url)| (*position, url.clone()));

        if let Some((position, url)) = stale {
            let previous = self.run_id;
            self.run_id = self.store.create_run(&self.config_hash)?;
            self.stored.clear();
            tracing::warn!(
                "Run {} stored {} at position {}, which the listing no longer has; starting new run {}",
                previous,
                url,
                position,
                self.run_id
            );
        }

        Ok(())
    }

    /// Extracts every product not yet stored, appending one wave at a time
    async fn extract_products(&mut self, product_urls: &[String]) -> Result<usize> {
        let pending: Vec<(usize, String)> = product_urls
            .iter()
            .cloned()
            .enumerate()
            .filter(|(position, _)| !self.stored.contains_key(position))
            .collect();

        if pending.len() < product_urls.len() {
            tracing::info!(
                "Skipping {} products stored by an earlier attempt",
                product_urls.len() - pending.len()
            );
        }

        let fetcher = &self.fetcher;
        let site = &self.config.site;
        let store = &mut self.store;
        let stored = &mut self.stored;
        let run_id = self.run_id;
        let mut extracted = 0;

        self.scheduler
            .for_each_wave(
                &pending,
                |(position, url)| async move {
                    let record = harvest_product(fetcher, site, &url).await?;
                    Ok::<_, HarvestError>((position, record))
                },
                |_, wave| {
                    store.append_records(run_id, &wave)?;
                    stored.extend(wave.iter().map(|(position, product)| {
                        let url = product.get(record::URL).unwrap_or_default();
                        (*position, url.to_string())
                    }));
                    extracted += wave.len();
                    Ok(())
                },
            )
            .await?;

        Ok(extracted)
    }
}

/// Fetches one product page and extracts its record
pub async fn harvest_product(
    fetcher: &Fetcher,
    site: &SiteConfig,
    url: &str,
) -> Result<ProductRecord> {
    let body = fetcher.get(url).await?;
    Ok(extract_product(url, &body, site))
}

/// Runs a complete harvest against the configured SQLite store
///
/// # Arguments
///
/// * `config` - The harvest configuration
/// * `config_hash` - Hash identifying `config`
/// * `fresh` - Always start a new run instead of resuming
///
/// # Returns
///
/// * `Ok(HarvestSummary)` - Harvest completed and the table was written
/// * `Err(HarvestError)` - Harvest aborted
pub async fn run_harvest(config: Config, config_hash: &str, fresh: bool) -> Result<HarvestSummary> {
    let mut harvester = Harvester::new(config, config_hash, fresh)?;

    match harvester.run().await {
        Ok(summary) => {
            tracing::info!(
                "Harvest complete: {} rows, {} columns written to {}",
                summary.export.rows,
                summary.export.columns,
                summary.export.path.display()
            );
            Ok(summary)
        }
        Err(e) => {
            tracing::error!(
                "Run {} aborted: {}. Rerun with the same configuration to resume",
                harvester.run_id(),
                e
            );
            Err(e)
        }
    }
}
