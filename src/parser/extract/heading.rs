use super::Strategy;
use crate::parser::cards::{text_content, Card, PARAGRAPH_SEL};

pub const UNKNOWN_COMPANY: &str = "Inconnu";

/// `<h3><p>title</p><p>company</p></h3>`, the current markup.
pub struct HeadingParagraphs;

impl Strategy for HeadingParagraphs {
    type Output = (String, String);

    fn name(&self) -> &'static str {
        "heading paragraphs"
    }

    fn apply(&self, card: &Card<'_>) -> Option<(String, String)> {
        let heading = card.heading()?;
        let mut paragraphs = heading.select(&PARAGRAPH_SEL);
        let title = paragraphs.next()?;
        let company = paragraphs.next()?;
        Some((
            text_content(title).trim().to_string(),
            text_content(company).trim().to_string(),
        ))
    }
}

/// Older or partial markup: the heading text is "title\ncompany".
pub struct HeadingLines;

impl Strategy for HeadingLines {
    type Output = (String, String);

    fn name(&self) -> &'static str {
        "heading lines"
    }

    fn apply(&self, card: &Card<'_>) -> Option<(String, String)> {
        let full = text_content(card.heading()?);
        let mut lines = full.trim().split('\n');
        let title = lines.next().unwrap_or("").trim().to_string();
        let company = lines
            .next()
            .map(|c| c.trim().to_string())
            .unwrap_or_else(|| UNKNOWN_COMPANY.to_string());
        Some((title, company))
    }
}
