//! Symptom-trajectory extraction.
//!
//! The biphasic pattern (got better, then worse again) is checked
//! before plain worsening because its phrases contain both cues.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::Trajectory;

static BIPHASIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"melhorou\s+(?:e|mas|porem)\s+(?:depois\s+)?piorou|estava\s+melhorando\s+(?:e|mas)\s+piorou|piorou\s+de\s+novo|voltou\s+a\s+piorar",
    )
    .unwrap()
});

static WORSENING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bpior(?:ando|ou|a)\b|cada\s+vez\s+pior|mais\s+forte").unwrap());

static IMPROVING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bmelhor(?:ando|ou|a)\b|mais\s+fraco|diminuindo").unwrap());

static STABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bestavel\b|\bigual\b|sem\s+mudanca|na\s+mesma").unwrap());

static FLUCTUATING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bflutua\w*\b|vai\s+e\s+volta|\bintermitente\b|as\s+vezes\s+melhora").unwrap()
});

/// Extract a trajectory from folded narrative text.
pub fn parse_trajectory(folded: &str) -> Option<Trajectory> {
    if BIPHASIC_RE.is_match(folded) {
        return Some(Trajectory::BiphasicWorsening);
    }
    if WORSENING_RE.is_match(folded) {
        return Some(Trajectory::Worsening);
    }
    if IMPROVING_RE.is_match(folded) {
        return Some(Trajectory::Improving);
    }
    if STABLE_RE.is_match(folded) {
        return Some(Trajectory::Stable);
    }
    if FLUCTUATING_RE.is_match(folded) {
        return Some(Trajectory::Fluctuating);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_directions() {
        assert_eq!(parse_trajectory("a dor esta piorando"), Some(Trajectory::Worsening));
        assert_eq!(parse_trajectory("ja esta melhorando"), Some(Trajectory::Improving));
        assert_eq!(parse_trajectory("continua igual"), Some(Trajectory::Stable));
        assert_eq!(parse_trajectory("a dor vai e volta"), Some(Trajectory::Fluctuating));
    }

    #[test]
    fn biphasic_beats_plain_worsening() {
        assert_eq!(
            parse_trajectory("melhorou mas depois piorou muito"),
            Some(Trajectory::BiphasicWorsening)
        );
        assert_eq!(
            parse_trajectory("tinha melhorado e voltou a piorar"),
            Some(Trajectory::BiphasicWorsening)
        );
    }

    #[test]
    fn no_trajectory_mentioned() {
        assert_eq!(parse_trajectory("dor de garganta ha 2 dias"), None);
    }
}
