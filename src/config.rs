use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Url;

pub const SEARCH_URL: &str = "https://www.hellowork.com/fr-fr/emploi/recherche.html";
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const DEFAULT_TARGET: usize = 1000;
pub const DEFAULT_DELAY_MIN_MS: u64 = 1000;
pub const DEFAULT_DELAY_MAX_MS: u64 = 2200;

pub const DEFAULT_RAW_PATH: &str = "data/dataset_raw.csv";
pub const DEFAULT_CLEAN_PATH: &str = "data/dataset_clean.csv";
pub const DEFAULT_DB_PATH: &str = "data/harvest.sqlite";

/// Everything one harvest run needs.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub target: usize,
    /// Free-text search filter, sent as `k=`. Empty searches all of France.
    pub location_filter: String,
    pub search_url: String,
    pub user_agent: String,
    pub delay_min: Duration,
    pub delay_max: Duration,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET,
            location_filter: String::new(),
            search_url: SEARCH_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            delay_min: Duration::from_millis(DEFAULT_DELAY_MIN_MS),
            delay_max: Duration::from_millis(DEFAULT_DELAY_MAX_MS),
        }
    }
}

impl HarvestConfig {
    /// Page 1 is the bare search; later pages add `p=<n>`.
    pub fn page_url(&self, page: u32) -> Result<Url> {
        let mut url = Url::parse(&self.search_url)
            .with_context(|| format!("Invalid search URL {}", self.search_url))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("k", &self.location_filter);
            if page > 1 {
                query.append_pair("p", &page.to_string());
            }
        }
        Ok(url)
    }

    /// Bounds in ascending order, whatever order they were given in.
    pub fn delay_bounds(&self) -> (Duration, Duration) {
        if self.delay_min <= self.delay_max {
            (self.delay_min, self.delay_max)
        } else {
            (self.delay_max, self.delay_min)
        }
    }
}

/// Input raw table and output clean table for the clean pipeline.
#[derive(Debug, Clone)]
pub struct CleanConfig {
    pub input: PathBuf,
    pub output: PathBuf,
}
