//! Clinical narrative parser.
//!
//! Each submodule extracts one signal class from Portuguese free text
//! with priority-ordered regex tables. All matching happens on a folded
//! form of the input (lowercased, accents stripped) so "está" and
//! "esta" behave identically. Extraction is pure: same text in, same
//! signals out.

pub mod domain;
pub mod duration;
pub mod fever;
pub mod negation;
pub mod pain;
pub mod red_flags;
pub mod trajectory;

pub use domain::infer_domain;
pub use duration::parse_duration;
pub use fever::parse_fever;
pub use negation::{feature_key_for, parse_negations, strip_negations};
pub use pain::parse_pain;
pub use red_flags::detect_red_flags;
pub use trajectory::parse_trajectory;

use crate::models::{Domain, Trajectory};

/// Lowercase and strip Portuguese diacritics. All parser tables are
/// written against this folded form.
pub fn fold(text: &str) -> String {
    text.chars()
        .flat_map(|c| c.to_lowercase())
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Everything the parser can pull out of one narrative.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSignals {
    pub duration: Option<duration::ParsedDuration>,
    pub trajectory: Option<Trajectory>,
    pub max_fever_c: Option<f64>,
    pub pain: Option<pain::ParsedPain>,
    pub negated: std::collections::BTreeSet<String>,
    pub domain: Option<Domain>,
    pub red_flags: Vec<String>,
}

/// Run every extractor over the narrative.
pub fn parse_narrative(text: &str) -> ParsedSignals {
    let folded = fold(text);
    ParsedSignals {
        duration: parse_duration(&folded),
        trajectory: parse_trajectory(&folded),
        max_fever_c: parse_fever(&folded),
        pain: parse_pain(&folded),
        negated: parse_negations(&folded),
        domain: infer_domain(&folded),
        red_flags: detect_red_flags(&folded),
    }
}
