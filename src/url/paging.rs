use url::Url;

/// Builds the URL of one listing page of a category
///
/// The page index is appended as a `page` query parameter, joined with `&`
/// when the category URL already carries a query string.
///
/// # Examples
///
/// ```
/// use sumi_harvest::url::page_url;
///
/// assert_eq!(page_url("https://shop.example.com/imac", 2), "https://shop.example.com/imac?page=2");
/// assert_eq!(page_url("https://shop.example.com/c?id=7", 1), "https://shop.example.com/c?id=7&page=1");
/// ```
pub fn page_url(category_url: &str, page: u32) -> String {
    let separator = if category_url.contains('?') { '&' } else { '?' };
    format!("{}{}page={}", category_url, separator, page)
}

/// Extracts the page index from a pagination link target
///
/// Prefers an explicit `page` query parameter; otherwise takes whatever
/// follows the last `=` in the href. Returns `None` when neither yields a
/// number.
pub fn parse_page_index(href: &str) -> Option<u32> {
    let href = href.trim();

    // The base only matters for relative hrefs; the query survives either way.
    let from_query = Url::parse("http://localhost/")
        .and_then(|base| base.join(href))
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "page")
                .and_then(|(_, value)| value.trim().parse::<u32>().ok())
        });

    from_query.or_else(|| href.rsplit('=').next()?.trim().parse::<u32>().ok())
}
