//! Symptom-duration extraction, normalized to days.
//!
//! Three pattern families, checked in priority order: explicit
//! quantity + unit ("5 dias", "48h"), compact ISO-8601-like codes
//! ("p1w", "p3d"), and relative phrases ("desde ontem"). First match
//! wins; mixed phrasings are not reconciled.

use std::sync::LazyLock;

use regex::Regex;

/// A recognized duration with the exact phrase that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDuration {
    /// Normalized duration in days. Sub-day durations are fractional,
    /// floored at roughly one hour.
    pub days: f64,
    /// The matched phrase, verbatim from the folded narrative.
    pub raw: String,
}

static UNIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\d+(?:[.,]\d+)?)\s*(horas?\b|hrs?\b|h\b|dias?\b|d\b|semanas?\b|sem\b|meses\b|mes\b)",
    )
    .unwrap()
});

static ISO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bp(?:(\d+)m)?(?:(\d+)w)?(?:(\d+)d)?(?:t(\d+)h)?\b").unwrap());

static YESTERDAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bdesde\s+ontem\b|\bontem\b").unwrap());

static TODAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bdesde\s+hoje\b|\bhoje\b|\bagora\b").unwrap());

/// Extract a duration from folded narrative text.
pub fn parse_duration(folded: &str) -> Option<ParsedDuration> {
    if let Some(caps) = UNIT_RE.captures(folded) {
        let quantity: f64 = caps[1].replace(',', ".").parse().ok()?;
        let unit = &caps[2];
        let days = match unit.chars().next() {
            Some('h') => (quantity / 24.0).max(0.04),
            Some('d') => quantity,
            Some('s') => quantity * 7.0,
            Some('m') => quantity * 30.0,
            _ => return None,
        };
        return Some(ParsedDuration {
            days,
            raw: caps[0].to_string(),
        });
    }

    if let Some(caps) = ISO_RE.captures(folded) {
        let months = group_as_f64(&caps, 1);
        let weeks = group_as_f64(&caps, 2);
        let iso_days = group_as_f64(&caps, 3);
        let hours = group_as_f64(&caps, 4);
        // A bare "p" is not a duration; require at least one component.
        if months.is_some() || weeks.is_some() || iso_days.is_some() || hours.is_some() {
            let days = months.unwrap_or(0.0) * 30.0
                + weeks.unwrap_or(0.0) * 7.0
                + iso_days.unwrap_or(0.0)
                + hours.unwrap_or(0.0) / 24.0;
            return Some(ParsedDuration {
                days: if hours.is_some() && days < 0.04 { 0.04 } else { days },
                raw: caps[0].to_string(),
            });
        }
    }

    if let Some(m) = YESTERDAY_RE.find(folded) {
        return Some(ParsedDuration {
            days: 1.0,
            raw: m.as_str().to_string(),
        });
    }
    if let Some(m) = TODAY_RE.find(folded) {
        return Some(ParsedDuration {
            days: 0.0,
            raw: m.as_str().to_string(),
        });
    }

    None
}

fn group_as_f64(caps: &regex::Captures<'_>, idx: usize) -> Option<f64> {
    caps.get(idx).and_then(|m| m.as_str().parse().ok())
}
