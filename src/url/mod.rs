//! URL handling module for Sumi-Harvest
//!
//! This module resolves site-relative links against the shop origin and
//! builds and parses listing-page URLs.

mod normalize;
mod paging;

// Re-export main functions
pub use normalize::{absolutize, has_scheme};
pub use paging::{page_url, parse_page_index};
