//! Pain-severity extraction: descriptive words plus 0-10 numeric
//! scales (NRS/EVA). A numeric scale always wins over adjectives.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::PainSeverity;

/// A recognized pain report.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPain {
    pub severity: PainSeverity,
    /// The 0-10 numeric value, when one was given.
    pub scale: Option<u8>,
}

static SCALE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2})\s*/\s*10\b|(?:nrs|eva)\s*:?\s*(\d{1,2})\b").unwrap()
});

static SEVERE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"dor\s+(?:muito\s+)?(?:forte|intensa|insuportavel|lancinante)|pior\s+dor").unwrap()
});

static MODERATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"dor\s+moderada|dor\s+consideravel|incomoda\s+bastante").unwrap());

static MILD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"dor\s+(?:leve|fraca|discreta)|desconforto\s+leve").unwrap());

/// Extract pain severity from folded narrative text.
pub fn parse_pain(folded: &str) -> Option<ParsedPain> {
    if let Some(caps) = SCALE_RE.captures(folded) {
        let raw = caps.get(1).or_else(|| caps.get(2))?.as_str();
        if let Ok(value) = raw.parse::<u8>() {
            if value <= 10 {
                return Some(ParsedPain {
                    severity: PainSeverity::from_scale(value),
                    scale: Some(value),
                });
            }
        }
    }

    if SEVERE_RE.is_match(folded) {
        return Some(ParsedPain {
            severity: PainSeverity::Severe,
            scale: None,
        });
    }
    if MODERATE_RE.is_match(folded) {
        return Some(ParsedPain {
            severity: PainSeverity::Moderate,
            scale: None,
        });
    }
    if MILD_RE.is_match(folded) {
        return Some(ParsedPain {
            severity: PainSeverity::Mild,
            scale: None,
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptive_words() {
        assert_eq!(
            parse_pain("dor forte no ouvido").map(|p| p.severity),
            Some(PainSeverity::Severe)
        );
        assert_eq!(
            parse_pain("dor moderada ao engolir").map(|p| p.severity),
            Some(PainSeverity::Moderate)
        );
        assert_eq!(
            parse_pain("so uma dor leve").map(|p| p.severity),
            Some(PainSeverity::Mild)
        );
    }

    #[test]
    fn numeric_scale_buckets() {
        let p = parse_pain("dor 9/10 desde ontem").unwrap();
        assert_eq!(p.severity, PainSeverity::Severe);
        assert_eq!(p.scale, Some(9));

        let p = parse_pain("eva 5 na consulta").unwrap();
        assert_eq!(p.severity, PainSeverity::Moderate);
        assert_eq!(p.scale, Some(5));

        let p = parse_pain("nrs: 2").unwrap();
        assert_eq!(p.severity, PainSeverity::Mild);
        assert_eq!(p.scale, Some(2));
    }

    #[test]
    fn scale_wins_over_adjective() {
        let p = parse_pain("dor forte, uns 3/10").unwrap();
        assert_eq!(p.severity, PainSeverity::Mild);
        assert_eq!(p.scale, Some(3));
    }

    #[test]
    fn out_of_range_scale_falls_back_to_words() {
        let p = parse_pain("dor forte 15/10").unwrap();
        assert_eq!(p.severity, PainSeverity::Severe);
        assert_eq!(p.scale, None);
    }

    #[test]
    fn no_pain_mentioned() {
        assert_eq!(parse_pain("coriza e espirros"), None);
    }
}
