use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Serialize;

use crate::config::HarvestConfig;
use crate::harvest::HarvestOutcome;
use crate::parser::extract::NO_SALARY;

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let conn = Connection::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS runs (
            id              INTEGER PRIMARY KEY,
            target          INTEGER NOT NULL,
            location_filter TEXT NOT NULL,
            stop_reason     TEXT NOT NULL
                            CHECK(stop_reason IN ('target_reached','no_more_cards','fetch_failed')),
            records         INTEGER NOT NULL,
            started_at      TEXT NOT NULL,
            finished_at     TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS pages (
            id         INTEGER PRIMARY KEY,
            run_id     INTEGER NOT NULL REFERENCES runs(id),
            page_no    INTEGER NOT NULL,
            url        TEXT NOT NULL,
            cards      INTEGER NOT NULL,
            kept       INTEGER NOT NULL,
            dropped    INTEGER NOT NULL,
            latency_ms INTEGER NOT NULL,
            UNIQUE(run_id, page_no)
        );
        CREATE INDEX IF NOT EXISTS idx_pages_run ON pages(run_id);

        CREATE TABLE IF NOT EXISTS listings (
            id          INTEGER PRIMARY KEY,
            run_id      INTEGER NOT NULL REFERENCES runs(id),
            title       TEXT NOT NULL,
            company     TEXT NOT NULL,
            location    TEXT NOT NULL,
            contract    TEXT NOT NULL,
            salary_text TEXT NOT NULL,
            link        TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_listings_run ON listings(run_id);
        ",
    )?;
    Ok(())
}

// ── Runs ──

/// Archive one harvest run with its page log and raw listings. Returns the
/// run id.
pub fn save_run(conn: &Connection, config: &HarvestConfig, outcome: &HarvestOutcome) -> Result<i64> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO runs (target, location_filter, stop_reason, records, started_at, finished_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            config.target as i64,
            config.location_filter,
            outcome.stop.as_str(),
            outcome.records.len() as i64,
            outcome.started_at.to_rfc3339(),
            outcome.finished_at.to_rfc3339(),
        ],
    )?;
    let run_id = tx.last_insert_rowid();
    {
        let mut p_stmt = tx.prepare(
            "INSERT INTO pages (run_id, page_no, url, cards, kept, dropped, latency_ms)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for p in &outcome.pages {
            p_stmt.execute(rusqlite::params![
                run_id, p.page, p.url, p.cards as i64, p.kept as i64, p.dropped as i64, p.latency_ms,
            ])?;
        }

        let mut l_stmt = tx.prepare(
            "INSERT INTO listings (run_id, title, company, location, contract, salary_text, link)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for r in &outcome.records {
            l_stmt.execute(rusqlite::params![
                run_id, r.title, r.company, r.location, r.contract, r.salary_text, r.link,
            ])?;
        }
    }
    tx.commit()?;
    Ok(run_id)
}

// ── Stats ──

#[derive(Debug, Serialize)]
pub struct Stats {
    pub runs: usize,
    pub pages: usize,
    pub listings: usize,
    pub with_salary_text: usize,
    pub dropped_cards: usize,
    pub last_run: Option<LastRun>,
}

#[derive(Debug, Serialize)]
pub struct LastRun {
    pub started_at: String,
    pub target: usize,
    pub records: usize,
    pub stop_reason: String,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let runs: usize = conn.query_row("SELECT COUNT(*) FROM runs", [], |r| r.get(0))?;
    let pages: usize = conn.query_row("SELECT COUNT(*) FROM pages", [], |r| r.get(0))?;
    let listings: usize = conn.query_row("SELECT COUNT(*) FROM listings", [], |r| r.get(0))?;
    let with_salary_text: usize = conn.query_row(
        "SELECT COUNT(*) FROM listings WHERE salary_text != ?1",
        [NO_SALARY],
        |r| r.get(0),
    )?;
    let dropped_cards: usize =
        conn.query_row("SELECT COALESCE(SUM(dropped), 0) FROM pages", [], |r| r.get(0))?;

    let mut stmt = conn.prepare(
        "SELECT started_at, target, records, stop_reason FROM runs ORDER BY id DESC LIMIT 1",
    )?;
    let last_run = stmt
        .query_map([], |row| {
            Ok(LastRun {
                started_at: row.get(0)?,
                target: row.get(1)?,
                records: row.get(2)?,
                stop_reason: row.get(3)?,
            })
        })?
        .next()
        .transpose()?;

    Ok(Stats {
        runs,
        pages,
        listings,
        with_salary_text,
        dropped_cards,
        last_run,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harvest::{PageLog, StopReason};
    use crate::records::RawRecord;
    use chrono::Utc;

    fn record(title: &str, salary: &str) -> RawRecord {
        RawRecord {
            title: title.to_string(),
            company: "Acme".to_string(),
            location: "Lyon - 69".to_string(),
            contract: "CDI".to_string(),
            salary_text: salary.to_string(),
            link: "https://x".to_string(),
        }
    }

    fn outcome(stop: StopReason, records: Vec<RawRecord>) -> HarvestOutcome {
        HarvestOutcome {
            pages: vec![PageLog {
                page: 1,
                url: "https://www.hellowork.com/fr-fr/emploi/recherche.html?k=".to_string(),
                cards: records.len() + 1,
                kept: records.len(),
                dropped: 1,
                latency_ms: 120,
            }],
            records,
            stop,
            started_at: Utc::now(),
            finished_at: Utc::now(),
        }
    }

    #[test]
    fn empty_archive() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let s = get_stats(&conn).unwrap();
        assert_eq!(s.runs, 0);
        assert_eq!(s.dropped_cards, 0);
        assert!(s.last_run.is_none());
    }

    #[test]
    fn runs_accumulate() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let cfg = HarvestConfig::default();

        save_run(
            &conn,
            &cfg,
            &outcome(StopReason::NoMoreCards, vec![record("a", NO_SALARY)]),
        )
        .unwrap();
        let id = save_run(
            &conn,
            &cfg,
            &outcome(
                StopReason::TargetReached,
                vec![record("b", "2 000 € / mois"), record("c", NO_SALARY)],
            ),
        )
        .unwrap();
        assert_eq!(id, 2);

        let s = get_stats(&conn).unwrap();
        assert_eq!(s.runs, 2);
        assert_eq!(s.pages, 2);
        assert_eq!(s.listings, 3);
        assert_eq!(s.with_salary_text, 1);
        assert_eq!(s.dropped_cards, 2);
        let last = s.last_run.unwrap();
        assert_eq!(last.records, 2);
        assert_eq!(last.stop_reason, "target_reached");
        assert_eq!(last.target, cfg.target);
    }
}
