use serde::Serialize;

/// Fields as lifted from one result card, before any cleaning.
/// Serialized with the raw dataset's French headers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawRecord {
    #[serde(rename = "Titre")]
    pub title: String,
    #[serde(rename = "Entreprise")]
    pub company: String,
    #[serde(rename = "Localisation")]
    pub location: String,
    #[serde(rename = "Contrat")]
    pub contract: String,
    #[serde(rename = "Salaire")]
    pub salary_text: String,
    #[serde(rename = "Lien")]
    pub link: String,
}

pub const RAW_COLUMNS: [&str; 6] = ["Titre", "Entreprise", "Localisation", "Contrat", "Salaire", "Lien"];

/// One analytics-ready row.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRecord {
    pub title_clean: String,
    pub company: String,
    pub city: String,
    pub department: String,
    pub contract: String,
    pub annual_salary: Option<f64>,
}

pub const CLEAN_COLUMNS: [&str; 6] = [
    "Titre_Simplifie",
    "Entreprise",
    "Ville",
    "Departement",
    "Contrat",
    "Salaire_Annuel",
];

impl CleanRecord {
    /// Two postings with the same key are the same offer seen twice.
    pub fn dedup_key(&self) -> (&str, &str, &str) {
        (&self.title_clean, &self.company, &self.city)
    }
}
