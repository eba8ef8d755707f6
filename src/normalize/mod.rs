pub mod location;
pub mod salary;
pub mod title;

use std::collections::HashSet;

use tracing::info;

use crate::records::{CleanRecord, RawRecord};

/// Deduplicated clean rows, in first-seen order. Built once per run.
#[derive(Debug)]
pub struct Dataset {
    records: Vec<CleanRecord>,
}

impl Dataset {
    pub fn records(&self) -> &[CleanRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStats {
    pub rows_in: usize,
    pub unique_rows: usize,
    pub with_salary: usize,
}

impl PipelineStats {
    pub fn print(&self) {
        println!("Rows in:          {}", self.rows_in);
        println!("Unique offers:    {}", self.unique_rows);
        println!("Usable salaries:  {}", self.with_salary);
    }
}

/// Salary → annual figure, title → display title, location → (city, department).
pub fn normalize(raw: &RawRecord) -> CleanRecord {
    let (city, department) = location::split(&raw.location);
    CleanRecord {
        title_clean: title::canonicalize(&raw.title),
        company: raw.company.clone(),
        city,
        department,
        contract: raw.contract.clone(),
        annual_salary: salary::annualize(&raw.salary_text),
    }
}

/// Normalize every raw row, then drop repeats of the same
/// (title, company, city).
pub fn run(raw: &[RawRecord]) -> (Dataset, PipelineStats) {
    info!("Normalizing {} rows (salary, title, location)", raw.len());
    let clean: Vec<CleanRecord> = raw.iter().map(normalize).collect();

    let records = dedup(clean);
    let stats = PipelineStats {
        rows_in: raw.len(),
        unique_rows: records.len(),
        with_salary: records.iter().filter(|r| r.annual_salary.is_some()).count(),
    };
    info!(
        "{} unique offers out of {} rows, {} with a usable salary",
        stats.unique_rows, stats.rows_in, stats.with_salary
    );

    (Dataset { records }, stats)
}

fn dedup(records: Vec<CleanRecord>) -> Vec<CleanRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| {
            let (t, c, v) = r.dedup_key();
            seen.insert((t.to_string(), c.to_string(), v.to_string()))
        })
        .collect()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(title: &str, company: &str, location: &str, salary: &str, link: &str) -> RawRecord {
        RawRecord {
            title: title.to_string(),
            company: company.to_string(),
            location: location.to_string(),
            contract: "CDI".to_string(),
            salary_text: salary.to_string(),
            link: link.to_string(),
        }
    }

    #[test]
    fn projects_all_fields() {
        let r = normalize(&raw(
            "Développeur (CDI) - 35h",
            "Acme",
            "Paris 15e - 75",
            "2000 € / mois",
            "https://example.com/1",
        ));
        assert_eq!(r.title_clean, "Développeur");
        assert_eq!(r.company, "Acme");
        assert_eq!(r.city, "Paris");
        assert_eq!(r.department, "75");
        assert_eq!(r.contract, "CDI");
        assert_eq!(r.annual_salary, Some(24000.0));
    }

    #[test]
    fn dedup_keeps_first_seen() {
        let rows = vec![
            raw("Comptable H/F", "Acme", "Lyon 3e - 69", "2000 € / mois", "https://a"),
            raw("Comptable", "Acme", "Lyon - 69", "Non affiché", "https://b"),
            raw("Comptable", "Globex", "Lyon - 69", "Non affiché", "https://c"),
        ];
        let (dataset, stats) = run(&rows);
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records()[0].company, "Acme");
        assert_eq!(dataset.records()[0].annual_salary, Some(24000.0));
        assert_eq!(dataset.records()[1].company, "Globex");
        assert_eq!(
            stats,
            PipelineStats { rows_in: 3, unique_rows: 2, with_salary: 1 }
        );
    }

    #[test]
    fn dedup_preserves_order() {
        let rows = vec![
            raw("B", "X", "Nantes", "", "1"),
            raw("A", "X", "Nantes", "", "2"),
            raw("B", "X", "Nantes", "", "3"),
            raw("C", "X", "Nantes", "", "4"),
        ];
        let (dataset, _) = run(&rows);
        let titles: Vec<&str> = dataset.records().iter().map(|r| r.title_clean.as_str()).collect();
        assert_eq!(titles, ["B", "A", "C"]);
    }

    #[test]
    fn different_city_is_distinct() {
        let rows = vec![
            raw("Vendeur", "Acme", "Lyon - 69", "", "1"),
            raw("Vendeur", "Acme", "Lille - 59", "", "2"),
        ];
        let (dataset, _) = run(&rows);
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn empty_input() {
        let (dataset, stats) = run(&[]);
        assert!(dataset.is_empty());
        assert_eq!(stats.rows_in, 0);
    }
}
