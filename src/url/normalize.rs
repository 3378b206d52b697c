use url::Url;

/// Returns true if the href already carries a scheme
///
/// # Examples
///
/// ```
/// use sumi_harvest::url::has_scheme;
///
/// assert!(has_scheme("https://example.com/p/1"));
/// assert!(!has_scheme("/p/1"));
/// ```
pub fn has_scheme(href: &str) -> bool {
    Url::parse(href.trim()).is_ok()
}

/// Resolves a link href to an absolute URL
///
/// Hrefs that already carry a scheme are returned unchanged (trimmed).
/// Anything else is resolved against `base`, the shop origin. An empty href
/// resolves to the origin itself.
///
/// # Arguments
///
/// * `href` - The raw href attribute value
/// * `base` - The site origin
///
/// # Returns
///
/// * `Some(String)` - Absolute URL
/// * `None` - The href cannot be resolved
///
/// # Examples
///
/// ```
/// use sumi_harvest::url::absolutize;
/// use url::Url;
///
/// let base = Url::parse("https://shop.example.com").unwrap();
/// assert_eq!(
///     absolutize("/laptops/air-13", &base).as_deref(),
///     Some("https://shop.example.com/laptops/air-13")
/// );
/// ```
pub fn absolutize(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        tracing::debug!("Empty href resolved to origin {}", base);
        return Some(base.to_string());
    }

    if has_scheme(href) {
        return Some(href.to_string());
    }

    match base.join(href) {
        Ok(absolute) => Some(absolute.to_string()),
        Err(e) => {
            tracing::debug!("Failed to resolve {} against {}: {}", href, base, e);
            None
        }
    }
}
