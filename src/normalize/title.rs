use std::sync::LazyLock;

use regex::Regex;

pub const UNKNOWN: &str = "Inconnu";

static HOURS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+(?:[.,][0-9]+)?\s?[hH]").unwrap());

/// Contract types, schedules, gender markers, parentheses and stray
/// separators. Applied in order, each replaced by a space.
const NOISE_PATTERNS: &[&str] = &[
    r"temps\s?plein",
    r"temps\s?partiel",
    r"\bCDI\b",
    r"\bCDD\b",
    r"\bIntérim\b",
    r"\bStage\b",
    r"\bAlternance\b",
    r"\bH/F\b",
    r"\bF/H\b",
    r"\(.*?\)",
    r"\s-\s",
    r"\|",
];

static NOISE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    NOISE_PATTERNS
        .iter()
        .map(|p| Regex::new(&format!("(?i){}", p)).unwrap())
        .collect()
});

static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-_]").unwrap());
static SPACES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Reduce a posting title to something readable in a chart legend:
/// "Développeur Java H/F - CDI (Lyon) - 35h" becomes "Développeur Java".
pub fn canonicalize(raw: &str) -> String {
    if raw.trim().is_empty() {
        return UNKNOWN.to_string();
    }

    let mut title = HOURS_RE.replace_all(raw, "").into_owned();
    for re in NOISE_RES.iter() {
        title = re.replace_all(&title, " ").into_owned();
    }

    let spaced = SEPARATOR_RE.replace_all(&title, " ");
    let collapsed = SPACES_RE.replace_all(&spaced, " ");
    capitalize_first(collapsed.trim())
}

/// Uppercase the first character, leave the rest untouched.
fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
