//! Key/value characteristic recovery from the description tab table
//!
//! The table under `#tab-description` is laid out differently from one
//! product to the next. Three tiers are tried in order and the first one
//! that yields anything wins:
//!
//! 1. [`strict_cells`]: label spans in `td.cell-4`, value spans in `td.cell-8`
//! 2. [`positional_cells`]: first and second cell of each row, whatever
//!    their classes
//! 3. [`textual_fragments`]: every text node in the rows except section
//!    headers (anything under a `colspan` cell), with control characters
//!    removed
//!
//! Each tier returns a flat sequence `name, value, name, value, ...`.
//! [`accept_pairs`] then decides whether the sequence really alternates.

use crate::extract::text::{is_upper_or_caseless, selector, strip_control};
use scraper::{ElementRef, Html};

const TABLE_ROWS: &str = "#tab-description > table > tbody > tr";

/// How many ancestors of a text node are checked for `colspan`
const COLSPAN_DEPTH: usize = 4;

/// Extraction strategy that produced a candidate sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    StrictCells,
    Positional,
    Textual,
}

impl Tier {
    /// Whether the upper-case heuristic gates this tier's output
    ///
    /// Only the textual tier lacks structural cues about which fragment is
    /// a name and which is a value.
    pub fn checks_case(self) -> bool {
        matches!(self, Self::Textual)
    }
}

/// A tier: document in, flat name/value candidates out
pub type TierFn = fn(&Html) -> Vec<String>;

/// Tiers in the order they are tried
pub const TIERS: [(Tier, TierFn); 3] = [
    (Tier::StrictCells, strict_cells),
    (Tier::Positional, positional_cells),
    (Tier::Textual, textual_fragments),
];

/// Runs the tiers in order and returns the first non-empty sequence
pub fn candidate_sequence(document: &Html) -> Option<(Tier, Vec<String>)> {
    TIERS.iter().find_map(|(tier, extract)| {
        let candidates = extract(document);
        if candidates.is_empty() {
            None
        } else {
            Some((*tier, candidates))
        }
    })
}

/// Recovers characteristic pairs from a product document
///
/// Returns an empty vector when no tier yields anything or the winning
/// sequence is rejected.
pub fn extract_characteristics(document: &Html) -> Vec<(String, String)> {
    let Some((tier, candidates)) = candidate_sequence(document) else {
        tracing::trace!("No characteristic candidates found");
        return Vec::new();
    };

    match accept_pairs(&candidates, tier) {
        Some(pairs) => {
            tracing::trace!("{:?} tier produced {} characteristics", tier, pairs.len());
            pairs
        }
        None => {
            tracing::debug!(
                "Rejected {} candidates from {:?} tier",
                candidates.len(),
                tier
            );
            Vec::new()
        }
    }
}

/// Validates a flat candidate sequence and pairs it up
///
/// Rejects (returns `None`) when:
/// - the sequence has odd length
/// - the tier is gated by the case heuristic and every value starts with an
///   upper-case or caseless character, which means the fragments are most
///   likely a flat list of names rather than alternating pairs
///
/// Accepted names have every `:` and no-break space removed; values are kept
/// as they are.
pub fn accept_pairs(candidates: &[String], tier: Tier) -> Option<Vec<(String, String)>> {
    if candidates.len() % 2 != 0 {
        return None;
    }

    if tier.checks_case() && !candidates.is_empty() {
        let all_upper = candidates
            .chunks_exact(2)
            .all(|pair| pair[1].chars().next().map_or(true, is_upper_or_caseless));
        if all_upper {
            return None;
        }
    }

    Some(
        candidates
            .chunks_exact(2)
            .map(|pair| (clean_name(&pair[0]), pair[1].clone()))
            .collect(),
    )
}

fn clean_name(name: &str) -> String {
    name.chars().filter(|c| !matches!(c, ':' | '\u{a0}')).collect()
}

fn rows(document: &Html) -> Vec<ElementRef<'_>> {
    match selector(TABLE_ROWS) {
        Some(rows) => document.select(&rows).collect(),
        None => Vec::new(),
    }
}

/// Text nodes under `row` in document order, paired with their parent element
fn row_texts<'a>(row: ElementRef<'a>) -> impl Iterator<Item = (&'a str, ElementRef<'a>)> {
    row.descendants().filter_map(|node| {
        let text = node.value().as_text()?;
        let parent = node.parent().and_then(ElementRef::wrap)?;
        Some((&**text, parent))
    })
}

fn is_named(element: ElementRef<'_>, name: &str) -> bool {
    element.value().name() == name
}

fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// True if `element` is the first `<span>` among its element siblings
fn is_first_span(element: ElementRef<'_>) -> bool {
    is_named(element, "span")
        && !element
            .prev_siblings()
            .filter_map(ElementRef::wrap)
            .any(|sibling| is_named(sibling, "span"))
}

/// True if some proper ancestor of `element`, below `stop`, satisfies `pred`
fn has_ancestor_below<'a>(
    element: ElementRef<'a>,
    stop: ElementRef<'a>,
    pred: impl Fn(ElementRef<'a>) -> bool,
) -> bool {
    element
        .ancestors()
        .take_while(|node| node.id() != stop.id())
        .filter_map(ElementRef::wrap)
        .any(pred)
}

fn is_child_of(element: ElementRef<'_>, parent: ElementRef<'_>) -> bool {
    element.parent().map(|p| p.id()) == Some(parent.id())
}

/// Tier 1: spans in cells tagged as label (`cell-4`) and value (`cell-8`)
///
/// Label text is the direct text of a `span` child of `td.cell-4`. Value
/// text is the direct text of the first `span` among its siblings anywhere
/// inside `td.cell-8`. Both cells must be direct children of the row.
/// A cell qualifies when its class list contains the token, so
/// `class="cell-4 wide"` counts as a label cell too.
pub fn strict_cells(document: &Html) -> Vec<String> {
    let mut out = Vec::new();

    for row in rows(document) {
        for (text, span) in row_texts(row) {
            if !is_named(span, "span") {
                continue;
            }

            let is_label = span
                .parent()
                .and_then(ElementRef::wrap)
                .is_some_and(|td| {
                    is_named(td, "td") && has_class(td, "cell-4") && is_child_of(td, row)
                });

            let is_value = is_first_span(span)
                && has_ancestor_below(span, row, |td| {
                    is_named(td, "td") && has_class(td, "cell-8") && is_child_of(td, row)
                });

            if is_label || is_value {
                out.push(text.to_string());
            }
        }
    }

    out
}

/// Tier 2: first and second cell of each row
///
/// Names are the direct text of any element directly inside the row's first
/// child element. Values are the direct text of the first `span` among its
/// siblings anywhere inside the row's second child element.
pub fn positional_cells(document: &Html) -> Vec<String> {
    let mut out = Vec::new();

    for row in rows(document) {
        let mut cells = row.children().filter_map(ElementRef::wrap);
        let first = cells.next();
        let second = cells.next();

        for (text, parent) in row_texts(row) {
            let is_name = first.is_some_and(|first| {
                parent
                    .parent()
                    .is_some_and(|grandparent| grandparent.id() == first.id())
            });

            let is_value = second.is_some_and(|second| {
                is_first_span(parent)
                    && has_ancestor_below(parent, row, |ancestor| ancestor.id() == second.id())
            });

            if is_name || is_value {
                out.push(text.to_string());
            }
        }
    }

    out
}

/// True if a text node's parent or one of the ancestors above it has `colspan`
///
/// `parent` counts as the first of the [`COLSPAN_DEPTH`] levels checked.
fn under_colspan(parent: ElementRef<'_>) -> bool {
    std::iter::once(parent)
        .chain(
            parent
                .ancestors()
                .take(COLSPAN_DEPTH - 1)
                .filter_map(ElementRef::wrap),
        )
        .any(|element| element.value().attr("colspan").is_some())
}

/// Tier 3: every text fragment in the rows, minus section headers
///
/// Fragments under a `colspan` cell (checked up to four ancestors up) are
/// section headers and are skipped. Carriage returns, line feeds and tabs
/// are removed; fragments left empty are dropped.
pub fn textual_fragments(document: &Html) -> Vec<String> {
    rows(document)
        .into_iter()
        .flat_map(row_texts)
        .filter(|(_, parent)| !under_colspan(*parent))
        .map(|(text, _)| strip_control(text))
        .filter(|fragment| !fragment.is_empty())
        .collect()
}
