//! Product page extraction
//!
//! This module turns a product detail document into a [`ProductRecord`]:
//! - Fixed fields (image, name, breadcrumb, price, description, ...)
//! - Characteristic pairs recovered from the description tab table
//!
//! Extraction never fails. Each field degrades to an empty string on its own
//! when its markup is missing, so one malformed page cannot abort a batch.

pub mod characteristics;
pub mod fields;
mod text;

pub use characteristics::{accept_pairs, extract_characteristics, Tier};

use crate::config::SiteConfig;
use crate::record::{self, ProductRecord};
use scraper::Html;

/// Extracts a product record from a fetched product page
///
/// # Arguments
///
/// * `url` - The product page URL, stored as the record's source
/// * `body` - The raw page markup
/// * `site` - Site settings (manufacturer, currency suffix)
///
/// # Returns
///
/// A record holding every fixed column, followed by any characteristics
/// found on the page.
///
/// # Example
///
/// ```
/// use sumi_harvest::config::default_config;
/// use sumi_harvest::extract_product;
///
/// let site = default_config().unwrap().site;
/// let record = extract_product("https://apolo.com.ua/p/1", "<html></html>", &site);
/// assert_eq!(record.get("Name"), Some(""));
/// assert_eq!(record.get("Manufacturer"), Some("Apple"));
/// ```
pub fn extract_product(url: &str, body: &str, site: &SiteConfig) -> ProductRecord {
    let document = Html::parse_document(body);
    extract_from_document(url, &document, site)
}

/// Extracts a product record from an already parsed document
pub fn extract_from_document(url: &str, document: &Html, site: &SiteConfig) -> ProductRecord {
    let mut product = ProductRecord::with_fixed_columns(url);

    let (category, subcategory) = fields::breadcrumb(document);

    product.insert(record::IMAGE, fields::image(document));
    product.insert(record::NAME, fields::name(document));
    product.insert(record::MANUFACTURER, site.manufacturer.as_str());
    product.insert(record::CATEGORY, category);
    product.insert(record::SUBCATEGORY, subcategory);
    product.insert(
        record::PRICE,
        fields::price(document, &site.currency_suffix),
    );
    product.insert(record::DESCRIPTION, fields::description(document));
    product.insert(
        record::CHARACTERISTICS,
        fields::characteristics_text(document),
    );
    product.insert(
        record::CHARACTERISTICS_TABLE,
        fields::characteristics_table(document),
    );

    let pairs = extract_characteristics(document);
    tracing::debug!("Extracted {} characteristics from {}", pairs.len(), url);
    for (name, value) in pairs {
        product.insert(name, value);
    }

    product
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FIXED_COLUMNS;

    fn site() -> SiteConfig {
        SiteConfig {
            base_url: "https://shop.example.com".to_string(),
            manufacturer: "Apple".to_string(),
            currency_suffix: "грн.".to_string(),
            categories: vec!["https://shop.example.com/mac".to_string()],
        }
    }

    const PRODUCT_PAGE: &str = r#"<html><body>
<ul class="breadcrumb">
<li itemprop="itemListElement"><a href="/"><span itemprop="name">Home</span></a></li>
<li itemprop="itemListElement"><a href="/mac"><span itemprop="name">Mac</span></a></li>
<li itemprop="itemListElement"><a href="/mac/air"><span itemprop="name">MacBook Air</span></a></li>
</ul>
<div id="image-box"><a href="https://shop.example.com/img/air.jpg"><img src="/t.jpg"></a></div>
<h1 itemprop="name">MacBook Air 13 M1</h1>
<div class="price"><span>32999 грн.</span></div>
<div itemprop="description">Ultra thin.<table><tr><td>x</td></tr></table></div>
<div id="tab-description"><table><tbody><tr><td class="cell-4"><span>Color:</span></td><td class="cell-8"><span>Space Gray</span></td></tr><tr><td class="cell-4"><span>Weight:</span></td><td class="cell-8"><span>1.29 kg</span></td></tr></tbody></table></div>
</body></html>"#;

    #[test]
    fn test_full_product_page() {
        let product = extract_product("https://shop.example.com/p/air", PRODUCT_PAGE, &site());

        assert_eq!(product.get("url"), Some("https://shop.example.com/p/air"));
        assert_eq!(
            product.get("Image"),
            Some("https://shop.example.com/img/air.jpg")
        );
        assert_eq!(product.get("Name"), Some("MacBook Air 13 M1"));
        assert_eq!(product.get("Manufacturer"), Some("Apple"));
        assert_eq!(product.get("Category"), Some("Mac"));
        assert_eq!(product.get("Subcategory"), Some("MacBook Air"));
        assert_eq!(product.get("Price"), Some("32999 "));
        assert_eq!(product.get("Characteristics"), Some("Ultra thin."));
        assert!(!product.get("Description").unwrap().contains("<table"));
        assert!(product
            .get("Characteristics Table")
            .unwrap()
            .contains("Space Gray"));
        assert_eq!(product.get("Color"), Some("Space Gray"));
        assert_eq!(product.get("Weight"), Some("1.29 kg"));
        assert_eq!(product.len(), FIXED_COLUMNS.len() + 2);
    }

    #[test]
    fn test_empty_page_has_every_fixed_field() {
        let product = extract_product("https://shop.example.com/p/x", "", &site());

        assert_eq!(product.len(), FIXED_COLUMNS.len());
        for column in FIXED_COLUMNS {
            assert!(product.get(column).is_some(), "missing {}", column);
        }
        assert_eq!(product.get("Name"), Some(""));
        assert_eq!(product.get("Manufacturer"), Some("Apple"));
    }

    #[test]
    fn test_garbage_markup_does_not_fail() {
        let product = extract_product(
            "https://shop.example.com/p/x",
            "<div id=\"tab-description\"><table><tr><td colspan=3><<<>>></td>",
            &site(),
        );
        assert_eq!(product.len(), FIXED_COLUMNS.len());
    }

    #[test]
    fn test_characteristic_overrides_fixed_name_in_place() {
        let page = r#"<div id="tab-description"><table><tbody><tr><td class="cell-4"><span>Name</span></td><td class="cell-8"><span>Override</span></td></tr></tbody></table></div>"#;
        let product = extract_product("https://shop.example.com/p/x", page, &site());

        assert_eq!(product.get("Name"), Some("Override"));
        assert_eq!(product.len(), FIXED_COLUMNS.len());
        assert_eq!(product.names().nth(2), Some("Name"));
    }
}
