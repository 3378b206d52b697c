//! Small helpers over the parsed tree shared by the extractors

use scraper::{ElementRef, Html, Selector};

/// Parses a selector, logging and swallowing errors
///
/// All selectors in this crate are constants, so a failure here is a typo
/// and degrades the affected field to its default.
pub(crate) fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::error!("Invalid selector {:?}: {:?}", css, e);
            None
        }
    }
}

/// Text nodes that are direct children of `element`, in document order
pub(crate) fn own_text<'a>(element: ElementRef<'a>) -> impl Iterator<Item = &'a str> + 'a {
    element
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| &**text)
}

/// Direct text children of every element matching `css`, in document order
pub(crate) fn own_text_all<'a>(document: &'a Html, css: &str) -> Vec<&'a str> {
    let Some(selector) = selector(css) else {
        return Vec::new();
    };

    document.select(&selector).flat_map(own_text).collect()
}

/// First direct text child across every element matching `css`
pub(crate) fn first_own_text(document: &Html, css: &str) -> Option<String> {
    own_text_all(document, css)
        .first()
        .map(|text| text.to_string())
}

/// First value of `attr` across every element matching `css`
pub(crate) fn first_attr(document: &Html, css: &str, attr: &str) -> Option<String> {
    let selector = selector(css)?;

    document
        .select(&selector)
        .find_map(|element| element.value().attr(attr))
        .map(str::to_string)
}

/// Removes carriage returns, line feeds and tabs
pub(crate) fn strip_control(fragment: &str) -> String {
    fragment
        .chars()
        .filter(|c| !matches!(c, '\r' | '\n' | '\t'))
        .collect()
}

/// True if uppercasing `c` leaves it unchanged
///
/// Digits, punctuation and caseless scripts count as upper-case here.
pub(crate) fn is_upper_or_caseless(c: char) -> bool {
    let mut upper = c.to_uppercase();
    upper.next() == Some(c) && upper.next().is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_own_text_skips_nested_elements() {
        let html = Html::parse_document(r#"<p id="x">one<b>bold</b>two</p>"#);
        let sel = selector("p#x").unwrap();
        let p = html.select(&sel).next().unwrap();
        assert_eq!(own_text(p).collect::<Vec<_>>(), vec!["one", "two"]);
    }

    #[test]
    fn test_first_own_text_across_matches() {
        let html = Html::parse_document(
            r#"<div class="a"><i>x</i></div><div class="a">second</div>"#,
        );
        assert_eq!(first_own_text(&html, "div.a"), Some("second".to_string()));
        assert_eq!(first_own_text(&html, "div.missing"), None);
    }

    #[test]
    fn test_first_attr() {
        let html = Html::parse_document(r#"<a>no href</a><a href="/p">link</a>"#);
        assert_eq!(first_attr(&html, "a", "href"), Some("/p".to_string()));
    }

    #[test]
    fn test_strip_control() {
        assert_eq!(strip_control("\r\n\tRed \t"), "Red ");
        assert_eq!(strip_control("\n\n"), "");
    }

    #[test]
    fn test_is_upper_or_caseless() {
        assert!(is_upper_or_caseless('R'));
        assert!(is_upper_or_caseless('Ч'));
        assert!(is_upper_or_caseless('8'));
        assert!(!is_upper_or_caseless('r'));
        assert!(!is_upper_or_caseless('ч'));
        // 'ß' uppercases to "SS"
        assert!(!is_upper_or_caseless('ß'));
    }

    #[test]
    fn test_invalid_selector() {
        assert!(selector("div[").is_none());
    }
}
