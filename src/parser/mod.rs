pub mod cards;
pub mod extract;

use reqwest::Url;
use scraper::Html;
use tracing::debug;

use crate::records::RawRecord;
use cards::Card;
use extract::FieldExtractor;

/// What one search page yielded.
#[derive(Debug, Default)]
pub struct PageExtract {
    /// Cards located on the page, whether or not they were kept.
    pub cards: usize,
    pub records: Vec<RawRecord>,
    pub dropped: usize,
}

/// Locate the result cards on a page and extract up to `limit` records.
/// Scanning stops as soon as `limit` is reached.
pub fn extract_page(
    html: &str,
    page_url: &Url,
    limit: usize,
    extractor: &FieldExtractor,
) -> PageExtract {
    let document = Html::parse_document(html);
    let found = cards::locate(&document);
    let mut page = PageExtract {
        cards: found.len(),
        ..Default::default()
    };

    for el in found {
        if page.records.len() >= limit {
            break;
        }
        match extractor.extract(&Card::new(el, page_url)) {
            Ok(record) => page.records.push(record),
            Err(e) => {
                debug!("Dropped card on {}: {}", page_url, e);
                page.dropped += 1;
            }
        }
    }

    page
}

// ── Tests ──
