pub mod heading;
pub mod salary;

use scraper::Selector;
use tracing::trace;

use super::cards::{Card, CONTRACT_SEL, LOCATION_SEL};
use crate::records::RawRecord;

pub const DEFAULT_LOCATION: &str = "France";
pub const DEFAULT_CONTRACT: &str = "Non spécifié";
pub const NO_SALARY: &str = "Non affiché";
pub const NO_LINK: &str = "Non disponible";

/// Why a card was dropped instead of emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CardError {
    #[error("card has no heading")]
    MissingHeading,
    #[error("card heading has an empty title")]
    EmptyTitle,
}

/// One way of reading a field off a card. A field's strategies are tried
/// in order; the first `Some` wins.
pub trait Strategy {
    type Output;

    fn name(&self) -> &'static str;
    fn apply(&self, card: &Card<'_>) -> Option<Self::Output>;
}

type Chain<T> = Vec<Box<dyn Strategy<Output = T>>>;

fn first_match<T>(card: &Card<'_>, chain: &Chain<T>) -> Option<T> {
    chain.iter().find_map(|s| {
        let value = s.apply(card);
        if value.is_some() {
            trace!(strategy = s.name(), "field matched");
        }
        value
    })
}

/// Trimmed text of a marker element (`data-cy` attribute).
pub struct MarkedText {
    name: &'static str,
    selector: &'static Selector,
}

impl Strategy for MarkedText {
    type Output = String;

    fn name(&self) -> &'static str {
        self.name
    }

    fn apply(&self, card: &Card<'_>) -> Option<String> {
        card.marked_text(self.selector)
    }
}

pub struct FirstLink;

impl Strategy for FirstLink {
    type Output = String;

    fn name(&self) -> &'static str {
        "first link"
    }

    fn apply(&self, card: &Card<'_>) -> Option<String> {
        card.first_href()
    }
}

/// Per-field strategy chains for a HelloWork result card.
pub struct FieldExtractor {
    title: Chain<(String, String)>,
    location: Chain<String>,
    contract: Chain<String>,
    salary: Chain<String>,
    link: Chain<String>,
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self {
            title: vec![Box::new(heading::HeadingParagraphs), Box::new(heading::HeadingLines)],
            location: vec![Box::new(MarkedText {
                name: "location marker",
                selector: &LOCATION_SEL,
            })],
            contract: vec![Box::new(MarkedText {
                name: "contract marker",
                selector: &CONTRACT_SEL,
            })],
            salary: vec![Box::new(salary::EuroPattern), Box::new(salary::EuroLine)],
            link: vec![Box::new(FirstLink)],
        }
    }
}

impl FieldExtractor {
    /// Read every field of one card. A card without a heading or with an
    /// empty title is rejected whole; every other field has a default.
    pub fn extract(&self, card: &Card<'_>) -> Result<RawRecord, CardError> {
        let (title, company) = first_match(card, &self.title).ok_or(CardError::MissingHeading)?;
        if title.is_empty() {
            return Err(CardError::EmptyTitle);
        }

        let or = |chain: &Chain<String>, default: &str| {
            first_match(card, chain).unwrap_or_else(|| default.to_string())
        };

        Ok(RawRecord {
            title,
            company,
            location: or(&self.location, DEFAULT_LOCATION),
            contract: or(&self.contract, DEFAULT_CONTRACT),
            salary_text: or(&self.salary, NO_SALARY),
            link: or(&self.link, NO_LINK),
        })
    }
}

// ── Tests ──
