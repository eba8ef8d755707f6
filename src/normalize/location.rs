use std::sync::LazyLock;

use regex::Regex;

use super::title::UNKNOWN;

pub const DEFAULT_DEPARTMENT: &str = "France";

const SEPARATOR: &str = " - ";

/// "Paris 15e", "Lyon 3ème", "Marseille 1er" → parent city.
static ARRONDISSEMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s[0-9]+(?:er|e|ème)?$").unwrap());

/// Split "City - Department" on its last separator. Without a separator the
/// whole string is the city and the department defaults to "France".
pub fn split(raw: &str) -> (String, String) {
    if raw.trim().is_empty() {
        return (UNKNOWN.to_string(), UNKNOWN.to_string());
    }

    let (city, department) = match raw.rsplit_once(SEPARATOR) {
        Some((city, dept)) => (city.trim(), dept.trim().to_string()),
        None => (raw.trim(), DEFAULT_DEPARTMENT.to_string()),
    };

    let city = ARRONDISSEMENT_RE.replace(city, "").into_owned();
    (city, department)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(city: &str, dept: &str) -> (String, String) {
        (city.to_string(), dept.to_string())
    }

    #[test]
    fn arrondissement_and_department() {
        assert_eq!(split("Paris 15e - 75"), pair("Paris", "75"));
        assert_eq!(split("Lyon 3ème - 69"), pair("Lyon", "69"));
        assert_eq!(split("Marseille 1er - 13"), pair("Marseille", "13"));
        assert_eq!(split("Paris 8 - 75"), pair("Paris", "75"));
    }

    #[test]
    fn city_only() {
        assert_eq!(split("Lyon"), pair("Lyon", "France"));
        assert_eq!(split("  Nantes "), pair("Nantes", "France"));
    }

    #[test]
    fn splits_on_last_separator() {
        assert_eq!(
            split("Saint-Denis - La Plaine - 93"),
            pair("Saint-Denis - La Plaine", "93")
        );
    }

    #[test]
    fn hyphenated_city_is_not_split() {
        assert_eq!(split("Aix-en-Provence - 13"), pair("Aix-en-Provence", "13"));
    }

    #[test]
    fn only_trailing_suffix_is_stripped() {
        assert_eq!(split("Paris 15e Montparnasse - 75"), pair("Paris 15e Montparnasse", "75"));
        assert_eq!(split("75"), pair("75", "France"));
    }

    #[test]
    fn blank_is_unknown() {
        assert_eq!(split(""), pair(UNKNOWN, UNKNOWN));
    }
}
