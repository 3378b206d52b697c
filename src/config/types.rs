use serde::Deserialize;

/// Main configuration structure for Sumi-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub site: SiteConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of pages fetched concurrently in one wave
    #[serde(rename = "batch-size")]
    pub batch_size: u32,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    30
}

/// Target site description
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Origin used to absolutize site-relative product links
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Manufacturer written into every record
    pub manufacturer: String,

    /// Token stripped from price text
    #[serde(rename = "currency-suffix", default)]
    pub currency_suffix: String,

    /// Category root URLs to harvest, in order
    pub categories: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite record store
    #[serde(rename = "store-path")]
    pub store_path: String,

    /// Path to the exported table
    #[serde(rename = "csv-path")]
    pub csv_path: String,

    /// Field delimiter of the exported table
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

fn default_delimiter() -> String {
    ";".to_string()
}

impl OutputConfig {
    /// Delimiter as a single byte; validation guarantees one ASCII character
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter.as_bytes().first().copied().unwrap_or(b';')
    }
}
