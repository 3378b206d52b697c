//! Listing-page discovery for a category
//!
//! The category root page carries a pagination control whose last link
//! points at the highest page index. Missing or malformed pagination means
//! the category has a single page.

use crate::crawler::Fetcher;
use crate::url::{page_url, parse_page_index};
use crate::HarvestError;
use scraper::{ElementRef, Html, Selector};

/// Reads the highest page index from a category root page
///
/// Returns 1 when there is no pagination control, when its last item has no
/// link, or when the link carries no parseable page index.
pub fn parse_last_page(html: &str) -> u32 {
    let document = Html::parse_document(html);

    let (Ok(pagination), Ok(link)) = (Selector::parse("ul.pagination"), Selector::parse("a[href]"))
    else {
        return 1;
    };

    let href = document.select(&pagination).find_map(|list| {
        let last_item = list
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.value().name() == "li")
            .last()?;

        last_item
            .children()
            .filter_map(ElementRef::wrap)
            .find(|child| link.matches(child))
            .and_then(|anchor| anchor.value().attr("href"))
    });

    match href.map(|href| (href, parse_page_index(href))) {
        Some((_, Some(last))) => last.max(1),
        Some((href, None)) => {
            tracing::warn!("Unparseable pagination link {:?}, assuming one page", href);
            1
        }
        None => 1,
    }
}

/// Listing page URLs for pages `1..=last_page`
pub fn listing_pages(category_url: &str, last_page: u32) -> Vec<String> {
    (1..=last_page.max(1))
        .map(|page| page_url(category_url, page))
        .collect()
}

/// Fetches a category root and enumerates its listing pages
///
/// A fetch failure propagates; the pagination markup itself never causes an
/// error.
pub async fn discover_pages(
    fetcher: &Fetcher,
    category_url: &str,
) -> Result<Vec<String>, HarvestError> {
    let body = fetcher.get(category_url).await?;
    let last_page = parse_last_page(&body);

    tracing::info!("Category {} has {} page(s)", category_url, last_page);
    Ok(listing_pages(category_url, last_page))
}
