use std::ops::RangeInclusive;
use std::sync::LazyLock;

use regex::Regex;

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?").unwrap());

/// Plausible annual salary bounds for this market. Anything outside is a
/// typo, a daily rate mislabelled as annual, or a bonus line.
pub const MIN_ANNUAL: f64 = 14_000.0;
pub const MAX_ANNUAL: f64 = 200_000.0;

/// An unlabelled figure in this band is read as a monthly salary.
pub const MONTHLY_BAND: RangeInclusive<f64> = 1_200.0..=12_000.0;

/// Legal monthly hours for a 35h week.
pub const MONTHLY_HOURS: f64 = 151.67;
pub const MONTHS: f64 = 12.0;

/// Annual worked days under a "forfait jours" executive contract.
pub const WORKED_DAYS: f64 = 218.0;

const NOT_DISPLAYED: &str = "non affiché";
const MONTH_UNIT: &str = "mois";
const HOUR_UNIT: &str = "heure";
const DAY_UNIT: &str = "jour";

/// Convert free-form salary text ("2 000 € / mois", "35k €", "12 € / heure")
/// into a gross annual figure. Returns `None` when nothing usable is found
/// or the result falls outside [`MIN_ANNUAL`, `MAX_ANNUAL`].
pub fn annualize(text: &str) -> Option<f64> {
    if text.trim().is_empty() || text.to_lowercase().contains(NOT_DISPLAYED) {
        return None;
    }

    let compact = compact(text);
    let numbers: Vec<f64> = NUMBER_RE
        .find_iter(&compact)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect();
    if numbers.is_empty() {
        return None;
    }

    // A range ("30000-40000") collapses to its midpoint
    let value = numbers.iter().sum::<f64>() / numbers.len() as f64;
    let annual = round2(value * multiplier(&compact, value));

    if !(MIN_ANNUAL..=MAX_ANNUAL).contains(&annual) {
        return None;
    }
    Some(annual)
}

/// Lowercase, drop every space variant, expand the `k` shorthand.
fn compact(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ' ' | '\u{a0}' | '\u{202f}'))
        .collect::<String>()
        .replace('k', "000")
}

fn multiplier(compact: &str, value: f64) -> f64 {
    if compact.contains(MONTH_UNIT) {
        MONTHS
    } else if compact.contains(HOUR_UNIT) {
        MONTHLY_HOURS * MONTHS
    } else if compact.contains(DAY_UNIT) {
        WORKED_DAYS
    } else if MONTHLY_BAND.contains(&value) {
        MONTHS
    } else {
        1.0
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
