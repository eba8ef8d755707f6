use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;
use tracing::{info, warn};

use crate::config::HarvestConfig;
use crate::parser::{self, extract::FieldExtractor};
use crate::records::RawRecord;
use crate::session::PageSource;

/// Why the page loop ended. An empty page may be the end of the results or
/// an anti-bot block; the source gives no way to tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    TargetReached,
    NoMoreCards,
    FetchFailed,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TargetReached => "target_reached",
            Self::NoMoreCards => "no_more_cards",
            Self::FetchFailed => "fetch_failed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PageLog {
    pub page: u32,
    pub url: String,
    pub cards: usize,
    pub kept: usize,
    pub dropped: usize,
    pub latency_ms: i64,
}

#[derive(Debug)]
pub struct HarvestOutcome {
    pub records: Vec<RawRecord>,
    pub pages: Vec<PageLog>,
    pub stop: StopReason,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

pub struct Harvester<'a, S> {
    config: &'a HarvestConfig,
    source: S,
    extractor: FieldExtractor,
}

impl<'a, S: PageSource> Harvester<'a, S> {
    pub fn new(config: &'a HarvestConfig, source: S) -> Self {
        Self {
            config,
            source,
            extractor: FieldExtractor::default(),
        }
    }

    /// Walk result pages until the target is met, a page comes back without
    /// cards, or a fetch fails. Whatever was collected is returned in every
    /// case; the page source is dropped on return.
    pub async fn run(mut self) -> anyhow::Result<HarvestOutcome> {
        let target = self.config.target;
        let started_at = Utc::now();
        let mut records: Vec<RawRecord> = Vec::with_capacity(target.min(1024));
        let mut pages = Vec::new();

        let pb = ProgressBar::new(target as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40} {pos}/{len} offers {msg}")?
                .progress_chars("=> "),
        );

        let mut page: u32 = 1;
        let stop = loop {
            if records.len() >= target {
                break StopReason::TargetReached;
            }

            let url = self.config.page_url(page)?;
            pb.set_message(format!("(page {})", page));
            info!("Page {} | {} offers collected", page, records.len());

            let start = Instant::now();
            let html = match self.source.fetch(url.as_str()).await {
                Ok(html) => html,
                Err(e) => {
                    warn!("Stopping on page {}: {:#}", page, e);
                    break StopReason::FetchFailed;
                }
            };
            let latency_ms = start.elapsed().as_millis() as i64;

            let extracted =
                parser::extract_page(&html, &url, target - records.len(), &self.extractor);
            pages.push(PageLog {
                page,
                url: url.to_string(),
                cards: extracted.cards,
                kept: extracted.records.len(),
                dropped: extracted.dropped,
                latency_ms,
            });

            if extracted.cards == 0 {
                warn!("No offers on page {}: end of results or blocked", page);
                break StopReason::NoMoreCards;
            }

            pb.inc(extracted.records.len() as u64);
            records.extend(extracted.records);

            if records.len() >= target {
                break StopReason::TargetReached;
            }

            page += 1;
            tokio::time::sleep(self.next_delay()).await;
        };

        pb.finish_and_clear();
        info!(
            "Harvest stopped ({}): {} offers over {} pages",
            stop.as_str(),
            records.len(),
            pages.len()
        );

        Ok(HarvestOutcome {
            records,
            pages,
            stop,
            started_at,
            finished_at: Utc::now(),
        })
    }

    fn next_delay(&self) -> Duration {
        let (min, max) = self.config.delay_bounds();
        let ms = rand::rng().random_range(min.as_millis() as u64..=max.as_millis() as u64);
        Duration::from_millis(ms)
    }
}

// ── Tests ──
