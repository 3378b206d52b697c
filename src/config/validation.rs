use crate::config::types::{Config, CrawlerConfig, OutputConfig, SiteConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_site_config(&config.site)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.batch_size < 1 || config.batch_size > 100 {
        return Err(ConfigError::Validation(format!(
            "batch_size must be between 1 and 100, got {}",
            config.batch_size
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates the target site description
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    validate_http_url(&config.base_url, "base_url")?;

    if config.categories.is_empty() {
        return Err(ConfigError::Validation(
            "at least one category URL is required".to_string(),
        ));
    }

    for category in &config.categories {
        validate_http_url(category, "category")?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.store_path.is_empty() {
        return Err(ConfigError::Validation(
            "store_path cannot be empty".to_string(),
        ));
    }

    if config.csv_path.is_empty() {
        return Err(ConfigError::Validation(
            "csv_path cannot be empty".to_string(),
        ));
    }

    if config.delimiter.len() != 1 || !config.delimiter.is_ascii() {
        return Err(ConfigError::Validation(format!(
            "delimiter must be a single ASCII character, got '{}'",
            config.delimiter
        )));
    }

    Ok(())
}

/// Requires an absolute http(s) URL
fn validate_http_url(raw: &str, what: &str) -> Result<(), ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", what, raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            what, raw
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> Config {
        Config {
            crawler: CrawlerConfig {
                batch_size: 10,
                request_timeout_secs: 30,
            },
            site: SiteConfig {
                base_url: "https://shop.example.com".to_string(),
                manufacturer: "Acme".to_string(),
                currency_suffix: "USD".to_string(),
                categories: vec!["https://shop.example.com/laptops".to_string()],
            },
            output: OutputConfig {
                store_path: "./test.db".to_string(),
                csv_path: "./test.csv".to_string(),
                delimiter: ";".to_string(),
            },
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&create_test_config()).is_ok());
    }

    #[test]
    fn test_batch_size_bounds() {
        let mut config = create_test_config();
        config.crawler.batch_size = 0;
        assert!(validate(&config).is_err());

        config.crawler.batch_size = 101;
        assert!(validate(&config).is_err());

        config.crawler.batch_size = 100;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_categories_required() {
        let mut config = create_test_config();
        config.site.categories.clear();
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_category_must_be_http() {
        let mut config = create_test_config();
        config.site.categories = vec!["ftp://shop.example.com/laptops".to_string()];
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));

        config.site.categories = vec!["/laptops".to_string()];
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_delimiter_single_ascii() {
        let mut config = create_test_config();
        config.output.delimiter = ";;".to_string();
        assert!(validate(&config).is_err());

        config.output.delimiter = "§".to_string();
        assert!(validate(&config).is_err());

        config.output.delimiter = "\t".to_string();
        assert!(validate(&config).is_ok());
    }
}
