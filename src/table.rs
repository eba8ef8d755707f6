use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::Serialize;
use tracing::{info, warn};

use crate::normalize::Dataset;
use crate::records::{RawRecord, CLEAN_COLUMNS, RAW_COLUMNS};

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Raw rows read back from disk, plus how many lines were unusable.
#[derive(Debug)]
pub struct LoadedTable {
    pub records: Vec<RawRecord>,
    pub skipped: usize,
}

/// Write the raw harvest as `;`-separated UTF-8 with a BOM (opens cleanly
/// in Excel).
pub fn write_raw(path: &Path, records: &[RawRecord]) -> Result<()> {
    let file = create_with_bom(path)?;
    let mut writer = WriterBuilder::new().delimiter(b';').from_writer(file);
    for r in records {
        writer.serialize(r)?;
    }
    writer.flush()?;
    info!("Wrote {} raw rows to {}", records.len(), path.display());
    Ok(())
}

#[derive(Serialize)]
struct CleanRow<'a> {
    #[serde(rename = "Titre_Simplifie")]
    title: &'a str,
    #[serde(rename = "Entreprise")]
    company: &'a str,
    #[serde(rename = "Ville")]
    city: &'a str,
    #[serde(rename = "Departement")]
    department: &'a str,
    #[serde(rename = "Contrat")]
    contract: &'a str,
    #[serde(rename = "Salaire_Annuel")]
    annual_salary: String,
}

/// Write the clean dataset as `,`-separated UTF-8 with a BOM. A missing
/// salary is an empty cell.
pub fn write_clean(path: &Path, dataset: &Dataset) -> Result<()> {
    let file = create_with_bom(path)?;
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
    writer.write_record(CLEAN_COLUMNS)?;
    for r in dataset.records() {
        writer.serialize(CleanRow {
            title: &r.title_clean,
            company: &r.company,
            city: &r.city,
            department: &r.department,
            contract: &r.contract,
            annual_salary: r.annual_salary.map(format_salary).unwrap_or_default(),
        })?;
    }
    writer.flush()?;
    info!("Wrote {} clean rows to {}", dataset.len(), path.display());
    Ok(())
}

/// `24000.0`, `21840.48`: whole values keep one decimal.
fn format_salary(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{:.1}", v)
    } else {
        v.to_string()
    }
}

fn create_with_bom(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let mut file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(BOM)?;
    Ok(file)
}

/// Read a raw table written by [`write_raw`] (or by hand in a spreadsheet).
/// Columns are matched by header name; a missing column reads as empty.
/// Rows with extra fields or undecodable bytes are skipped, short rows are
/// padded.
pub fn read_raw(path: &Path) -> Result<LoadedTable> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    read_raw_bytes(bytes.strip_prefix(BOM).unwrap_or(&bytes[..]))
}

fn read_raw_bytes(bytes: &[u8]) -> Result<LoadedTable> {
    let delimiter = sniff_delimiter(bytes);
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader.headers().context("Failed to read table header")?.clone();
    let columns: Vec<Option<usize>> = RAW_COLUMNS
        .iter()
        .map(|name| headers.iter().position(|h| h.trim() == *name))
        .collect();
    for (name, idx) in RAW_COLUMNS.iter().zip(&columns) {
        if idx.is_none() {
            warn!("Column {} missing from input, reading it as empty", name);
        }
    }

    let mut records = Vec::new();
    let mut skipped = 0;
    for (line, result) in reader.records().enumerate() {
        match result {
            Ok(row) if row.len() <= headers.len() => records.push(to_raw(&row, &columns)),
            Ok(row) => {
                warn!(
                    "Skipping row {}: {} fields, header has {}",
                    line + 2,
                    row.len(),
                    headers.len()
                );
                skipped += 1;
            }
            Err(e) => {
                warn!("Skipping row {}: {}", line + 2, e);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!("{} malformed rows skipped, {} rows loaded", skipped, records.len());
    }
    Ok(LoadedTable { records, skipped })
}

/// `;` unless the header line only has commas.
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let header = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
    if !header.contains(&b';') && header.contains(&b',') {
        b','
    } else {
        b';'
    }
}

fn to_raw(row: &StringRecord, columns: &[Option<usize>]) -> RawRecord {
    let cell = |i: usize| {
        columns[i]
            .and_then(|idx| row.get(idx))
            .unwrap_or("")
            .to_string()
    };
    RawRecord {
        title: cell(0),
        company: cell(1),
        location: cell(2),
        contract: cell(3),
        salary_text: cell(4),
        link: cell(5),
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("job_harvest_{}_{}", std::process::id(), name))
    }

    fn sample() -> RawRecord {
        RawRecord {
            title: "Comptable H/F".to_string(),
            company: "Acme; et fils".to_string(),
            location: "Lyon 3e - 69".to_string(),
            contract: "CDI".to_string(),
            salary_text: "2 000 € / mois".to_string(),
            link: "https://www.hellowork.com/fr-fr/emplois/1.html".to_string(),
        }
    }

    #[test]
    fn raw_file_layout() {
        let path = temp_path("raw_layout.csv");
        write_raw(&path, &[sample()]).unwrap();
        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(BOM));
        let text = String::from_utf8(bytes[BOM.len()..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Titre;Entreprise;Localisation;Contrat;Salaire;Lien"));
        assert_eq!(
            lines.next(),
            Some("Comptable H/F;\"Acme; et fils\";Lyon 3e - 69;CDI;2 000 € / mois;https://www.hellowork.com/fr-fr/emplois/1.html")
        );
        let loaded = read_raw(&path).unwrap();
        assert_eq!(loaded.records, vec![sample()]);
        assert_eq!(loaded.skipped, 0);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn malformed_rows_skipped_short_rows_padded() {
        let input = "Titre;Entreprise;Localisation;Contrat;Salaire;Lien\n\
                     A;B;Lyon;CDI;Non affiché;x\n\
                     Too;many;fields;in;this;row;here\n\
                     Short;Row\n";
        let loaded = read_raw_bytes(input.as_bytes()).unwrap();
        assert_eq!(loaded.skipped, 1);
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.records[1].title, "Short");
        assert_eq!(loaded.records[1].location, "");
    }

    #[test]
    fn columns_by_name_and_comma_fallback() {
        let input = "Lien,Titre,Salaire\nhttps://x,Vendeur,35k €\n";
        let loaded = read_raw_bytes(input.as_bytes()).unwrap();
        let r = &loaded.records[0];
        assert_eq!(r.title, "Vendeur");
        assert_eq!(r.salary_text, "35k €");
        assert_eq!(r.link, "https://x");
        assert_eq!(r.company, "");
    }

    #[test]
    fn invalid_utf8_row_skipped() {
        let mut input = b"Titre;Entreprise;Localisation;Contrat;Salaire;Lien\n".to_vec();
        input.extend_from_slice(b"Caf\xE9;B;C;D;E;F\n");
        input.extend_from_slice("Café;B;C;D;E;F\n".as_bytes());
        let loaded = read_raw_bytes(&input).unwrap();
        assert_eq!(loaded.skipped, 1);
        assert_eq!(loaded.records[0].title, "Café");
    }

    #[test]
    fn clean_file_layout() {
        let rows = vec![
            sample(),
            RawRecord {
                title: "Soudeur".to_string(),
                salary_text: "12 € / heure".to_string(),
                ..sample()
            },
            RawRecord {
                title: "Magasinier".to_string(),
                salary_text: "Non affiché".to_string(),
                ..sample()
            },
        ];
        let (dataset, _) = normalize::run(&rows);
        let path = temp_path("clean_layout.csv");
        write_clean(&path, &dataset).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(BOM));
        let text = String::from_utf8(bytes[BOM.len()..].to_vec()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "Titre_Simplifie,Entreprise,Ville,Departement,Contrat,Salaire_Annuel",
                "Comptable,Acme; et fils,Lyon,69,CDI,24000.0",
                "Soudeur,Acme; et fils,Lyon,69,CDI,21840.48",
                "Magasinier,Acme; et fils,Lyon,69,CDI,",
            ]
        );
        fs::remove_file(&path).ok();
    }
}
