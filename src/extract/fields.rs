//! Fixed product fields
//!
//! Every function here returns an empty string when the markup it looks for
//! is absent. None of them can fail.

use crate::extract::text::{first_attr, first_own_text, own_text, own_text_all, selector};
use scraper::{ElementRef, Html};

const IMAGE_LINK: &str = "div#image-box > a[href]";
const NAME_HEADING: &str = r#"h1[itemprop="name"]"#;
const BREADCRUMB_NAMES: &str =
    r#"ul.breadcrumb > li[itemprop="itemListElement"] > a > span[itemprop="name"]"#;
const PRICE_TEXT: &str = "div.price > span";
const DESCRIPTION_NODE: &str = r#"div[itemprop="description"]"#;
const CHARACTERISTICS_TABLE: &str = "#tab-description > table";

/// Link target of the image container
pub fn image(document: &Html) -> String {
    first_attr(document, IMAGE_LINK, "href").unwrap_or_default()
}

/// Text of the heading marked as the item's name
pub fn name(document: &Html) -> String {
    first_own_text(document, NAME_HEADING).unwrap_or_default()
}

/// Category and subcategory from the breadcrumb trail
///
/// These are the second-to-last and last entries; both are empty when the
/// trail has fewer than two entries.
pub fn breadcrumb(document: &Html) -> (String, String) {
    let trail = own_text_all(document, BREADCRUMB_NAMES);

    match trail.as_slice() {
        [.., category, subcategory] => (category.to_string(), subcategory.to_string()),
        _ => (String::new(), String::new()),
    }
}

/// Price text with every occurrence of the currency suffix removed
pub fn price(document: &Html, currency_suffix: &str) -> String {
    let Some(raw) = first_own_text(document, PRICE_TEXT) else {
        return String::new();
    };

    if currency_suffix.is_empty() {
        raw
    } else {
        raw.replace(currency_suffix, "")
    }
}

fn description_node(document: &Html) -> Option<ElementRef<'_>> {
    let selector = selector(DESCRIPTION_NODE)?;
    document.select(&selector).next()
}

/// Markup of the description node with every nested table removed
///
/// Tables are characteristic data and are extracted separately. If nothing
/// is left after removal, the node's first text child is used instead.
pub fn description(document: &Html) -> String {
    let Some(node) = description_node(document) else {
        return String::new();
    };

    let stripped = strip_tables(&node.html());
    if !stripped.trim().is_empty() {
        return stripped;
    }

    own_text(node).next().unwrap_or_default().to_string()
}

/// Re-parses `markup` as a fragment and serializes it without `<table>`s
fn strip_tables(markup: &str) -> String {
    let mut fragment = Html::parse_fragment(markup);

    let tables: Vec<_> = match selector("table") {
        Some(table) => fragment.select(&table).map(|element| element.id()).collect(),
        None => Vec::new(),
    };

    for id in tables {
        if let Some(mut node) = fragment.tree.get_mut(id) {
            node.detach();
        }
    }

    fragment.root_element().inner_html()
}

/// Direct text children of the description node, newline-joined
///
/// This overlaps the text inside [`description`] on purpose; downstream
/// consumers read both columns.
pub fn characteristics_text(document: &Html) -> String {
    description_node(document)
        .map(|node| own_text(node).collect::<Vec<_>>().join("\n"))
        .unwrap_or_default()
}

/// Raw markup of the characteristics table under the description tab
pub fn characteristics_table(document: &Html) -> String {
    selector(CHARACTERISTICS_TABLE)
        .and_then(|table| document.select(&table).next().map(|element| element.html()))
        .unwrap_or_default()
}
