//! Product link extraction from listing pages

use crate::crawler::Fetcher;
use crate::url::absolutize;
use crate::HarvestError;
use scraper::{Html, Selector};
use url::Url;

/// Primary link of each product-name block
const PRODUCT_LINK: &str = "div.product-name > a[href]";

/// Extracts absolute product URLs from listing page markup
///
/// Document order is preserved and duplicates are kept. Relative hrefs are
/// resolved against `base`, the shop origin. `div.product-name` matches any
/// div whose class list contains `product-name`.
pub fn parse_product_urls(html: &str, base: &Url) -> Vec<String> {
    let document = Html::parse_document(html);

    let Ok(selector) = Selector::parse(PRODUCT_LINK) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(|href| absolutize(href, base))
        .collect()
}

/// Fetches a listing page and returns the product URLs it links to
pub async fn extract_product_urls(
    fetcher: &Fetcher,
    listing_url: &str,
    base: &Url,
) -> Result<Vec<String>, HarvestError> {
    let body = fetcher.get(listing_url).await?;
    let urls = parse_product_urls(&body, base);

    tracing::debug!("Found {} product links on {}", urls.len(), listing_url);
    Ok(urls)
}
