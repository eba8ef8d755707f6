use std::sync::LazyLock;

use regex::Regex;

use super::Strategy;
use crate::parser::cards::Card;

/// Digits/spaces, the euro sign, then the rest of that line.
static EURO_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([0-9\s]+€.*)").unwrap());

pub struct EuroPattern;

impl Strategy for EuroPattern {
    type Output = String;

    fn name(&self) -> &'static str {
        "euro pattern"
    }

    fn apply(&self, card: &Card<'_>) -> Option<String> {
        let text = card.text_content();
        let caps = EURO_RE.captures(&text)?;
        Some(caps[1].trim().to_string())
    }
}

/// First line mentioning €, for amounts the pattern misses ("35k€").
pub struct EuroLine;

impl Strategy for EuroLine {
    type Output = String;

    fn name(&self) -> &'static str {
        "euro line"
    }

    fn apply(&self, card: &Card<'_>) -> Option<String> {
        card.text_content()
            .split('\n')
            .find(|line| line.contains('€'))
            .map(|line| line.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::cards::locate;
    use reqwest::Url;
    use scraper::Html;

    fn run(fragment: &str) -> (Option<String>, Option<String>) {
        let html = Html::parse_document(&format!(r#"<div data-cy="serpCard">{}</div>"#, fragment));
        let url = Url::parse("https://www.hellowork.com/").unwrap();
        let card = Card::new(locate(&html)[0], &url);
        (EuroPattern.apply(&card), EuroLine.apply(&card))
    }

    #[test]
    fn pattern_takes_amount_and_rest_of_line() {
        let (p, _) = run("<span>CDI</span>\n<span>2 500 € / mois</span>\n<span>Il y a 2 jours</span>");
        assert_eq!(p.as_deref(), Some("2 500 € / mois"));
    }

    #[test]
    fn pattern_misses_letter_before_euro() {
        let (p, l) = run("<span>Télétravail</span>\n<span>Salaire : 35k€ brut</span>");
        assert_eq!(p, None);
        assert_eq!(l.as_deref(), Some("Salaire : 35k€ brut"));
    }

    #[test]
    fn no_euro_sign() {
        assert_eq!(run("<span>CDI</span>"), (None, None));
    }
}
