//! Typed extraction of watchlist entries from one listing page.
//!
//! The listing grid renders each film as:
//!
//! ```text
//! <li class="griditem">
//!   <div class="react-component" data-item-slug="inception"
//!        data-item-name="Inception (2010)" data-item-link="/film/inception/">
//!     <img alt="Inception" ...>
//! ```
//!
//! The title comes from the poster image's `alt`, the release year from the
//! trailing `(YYYY)` of `data-item-name`, and the detail URL from
//! `data-item-link` resolved against the site origin. Entries without a
//! title, slug, or link are skipped and counted as unparsable.

use std::sync::LazyLock;

use regex::Regex;
use reelid_core::PartialRecord;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

static GRID_ITEM: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li.griditem").expect("valid grid item selector"));

static POSTER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[data-item-slug]").expect("valid poster selector"));

static POSTER_IMG: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img[alt]").expect("valid poster image selector"));

static TRAILING_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d{4})\)\s*$").expect("valid trailing year regex"));

/// Records extracted from one listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchlistPage {
    /// Well-formed entries, in page order.
    pub records: Vec<PartialRecord>,
    /// Grid items that were skipped for missing a title, slug, or link.
    pub unparsable: usize,
}

impl WatchlistPage {
    /// `true` when the page yielded no usable records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parses one listing page into partial movie records.
///
/// `origin` is the listing site root used to absolutise relative film links.
/// Returns an empty page when the markup has no grid items.
#[must_use]
pub fn extract_records(markup: &str, origin: &Url) -> WatchlistPage {
    let document = Html::parse_document(markup);
    let mut page = WatchlistPage::default();

    for item in document.select(&GRID_ITEM) {
        match parse_item(item, origin) {
            Some(record) => page.records.push(record),
            None => page.unparsable += 1,
        }
    }

    if page.unparsable > 0 {
        tracing::debug!(
            unparsable = page.unparsable,
            parsed = page.records.len(),
            "skipped malformed watchlist items"
        );
    }

    page
}

fn parse_item(item: ElementRef<'_>, origin: &Url) -> Option<PartialRecord> {
    let poster = item.select(&POSTER).next()?;
    let attrs = poster.value();

    let slug = attrs.attr("data-item-slug").map(str::trim)?;
    if slug.is_empty() {
        return None;
    }

    let link = attrs
        .attr("data-item-link")
        .map(str::trim)
        .filter(|l| !l.is_empty())?;
    let source_url = origin.join(link).ok()?;

    let title = poster
        .select(&POSTER_IMG)
        .next()
        .and_then(|img| img.value().attr("alt"))
        .map(str::trim)
        .filter(|t| !t.is_empty())?;

    let year = attrs.attr("data-item-name").and_then(parse_trailing_year);

    Some(PartialRecord {
        title: title.to_owned(),
        year,
        source_url: source_url.to_string(),
    })
}

/// Pulls a trailing `(YYYY)` out of a display name such as `"Inception (2010)"`.
fn parse_trailing_year(name: &str) -> Option<u16> {
    TRAILING_YEAR
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u16>().ok())
        .filter(|year| *year > 0)
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
