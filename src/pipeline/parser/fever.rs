//! Maximum-fever extraction, normalized to Celsius.
//!
//! Pattern order matters: an explicit Fahrenheit label is checked
//! first so "101 F" is never read as a Celsius value, then readings
//! anchored to a fever keyword, then a Celsius label, then bare
//! two-digit numbers inside the plausible febrile band.

use std::sync::LazyLock;

use regex::Regex;

/// Plausible Celsius band for a reported body temperature.
const MIN_C: f64 = 35.0;
const MAX_C: f64 = 42.0;

static FAHRENHEIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{2,3}(?:[.,]\d+)?)\s*(?:graus\s*)?(?:°\s*)?(?:fahrenheit\b|f\b)").unwrap()
});

static KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:febre|febril|temperatura|temp\b|maxima|max\b)\D{0,15}(\d{2}(?:[.,]\d+)?)\b")
        .unwrap()
});

static CELSIUS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{2}(?:[.,]\d+)?)\s*(?:graus\b|°\s*c?|c\b)").unwrap()
});

static BARE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{2}(?:[.,]\d+)?)\b").unwrap());

static NON_TEMP_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:anos?|dias?|semanas?|meses|horas?|%|/)").unwrap()
});

/// Extract a maximum fever in Celsius from folded narrative text.
pub fn parse_fever(folded: &str) -> Option<f64> {
    if let Some(caps) = FAHRENHEIT_RE.captures(folded) {
        if let Some(c) = parse_number(&caps[1]).map(fahrenheit_to_celsius) {
            if in_band(c) {
                return Some(c);
            }
        }
    }

    if let Some(caps) = KEYWORD_RE.captures(folded) {
        if let Some(c) = parse_number(&caps[1]) {
            if in_band(c) {
                return Some(c);
            }
        }
    }

    if let Some(caps) = CELSIUS_RE.captures(folded) {
        if let Some(c) = parse_number(&caps[1]) {
            if in_band(c) {
                return Some(c);
            }
        }
    }

    for caps in BARE_RE.captures_iter(folded) {
        let m = caps.get(1)?;
        // Bare numbers only count as fever in the clearly febrile band,
        // and never when they quantify something else (age, duration).
        if m.start() > 0 && folded.as_bytes()[m.start() - 1] == b'/' {
            continue;
        }
        if NON_TEMP_SUFFIX_RE.is_match(&folded[m.end()..]) {
            continue;
        }
        if let Some(c) = parse_number(m.as_str()) {
            if (37.5..=MAX_C).contains(&c) {
                return Some(c);
            }
        }
    }

    None
}

fn parse_number(s: &str) -> Option<f64> {
    s.replace(',', ".").parse().ok()
}

fn fahrenheit_to_celsius(f: f64) -> f64 {
    ((f - 32.0) / 1.8 * 10.0).round() / 10.0
}

fn in_band(c: f64) -> bool {
    (MIN_C..=MAX_C).contains(&c)
}
