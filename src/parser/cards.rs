use std::sync::LazyLock;

use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

static CARD_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("[data-cy='serpCard']").unwrap());
static HEADING_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h3").unwrap());
static LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

pub static PARAGRAPH_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());
pub static LOCATION_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[data-cy='localisationCard']").unwrap());
pub static CONTRACT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[data-cy='contractCard']").unwrap());

/// All result cards on a search page, in document order.
pub fn locate(document: &Html) -> Vec<ElementRef<'_>> {
    document.select(&CARD_SEL).collect()
}

/// One rendered posting. Sub-element lookups return `None` when the
/// element is absent; callers pick the default.
pub struct Card<'a> {
    el: ElementRef<'a>,
    page_url: &'a Url,
}

impl<'a> Card<'a> {
    pub fn new(el: ElementRef<'a>, page_url: &'a Url) -> Self {
        Self { el, page_url }
    }

    pub fn heading(&self) -> Option<ElementRef<'a>> {
        self.el.select(&HEADING_SEL).next()
    }

    /// Trimmed text of the first descendant matching `selector`.
    pub fn marked_text(&self, selector: &Selector) -> Option<String> {
        self.el
            .select(selector)
            .next()
            .map(|e| text_content(e).trim().to_string())
    }

    /// Every text node under the card, concatenated (DOM `textContent`).
    pub fn text_content(&self) -> String {
        text_content(self.el)
    }

    /// `href` of the first anchor, resolved against the page URL the way a
    /// browser reports it.
    pub fn first_href(&self) -> Option<String> {
        let href = self.el.select(&LINK_SEL).next()?.value().attr("href")?;
        Some(
            self.page_url
                .join(href)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| href.to_string()),
        )
    }
}

pub fn text_content(el: ElementRef<'_>) -> String {
    el.text().collect()
}
