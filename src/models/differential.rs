//! Result types produced by the local scoring pipeline.

use serde::{Deserialize, Serialize};

/// One ranked diagnosis hypothesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifferentialCandidate {
    /// Human-readable diagnosis label (Portuguese).
    pub label: String,
    /// Posterior probability in (0, 1), clamped away from 0 and 1.
    pub probability: f64,
    /// Short explanations of which findings drove the score.
    #[serde(default)]
    pub rationale: Vec<String>,
    /// Scoring source tag ("heuristica", "tabela", "remoto", "blend").
    #[serde(default)]
    pub source: Option<String>,
}

impl DifferentialCandidate {
    pub fn new(label: impl Into<String>, probability: f64) -> Self {
        Self {
            label: label.into(),
            probability,
            rationale: Vec::new(),
            source: None,
        }
    }

    pub fn with_rationale(mut self, note: impl Into<String>) -> Self {
        self.rationale.push(note.into());
        self
    }
}

/// A follow-up question to put to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    /// Answer choices; defaults to a yes/no/unsure triple when absent.
    #[serde(default)]
    pub options: Vec<String>,
}

impl Question {
    pub fn new(text: impl Into<String>, options: &[&str]) -> Self {
        Self {
            text: text.into(),
            options: options.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Information the engine still lacks: open questions plus checklist ids
/// it did not recognize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gaps {
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub unknown_symptoms: Vec<String>,
}

/// Red-flag detection summary for one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedFlagReport {
    /// True when any alarm pattern fired.
    pub any: bool,
    /// Identifiers of the alarm patterns that fired, sorted.
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// Recommended care urgency. `None` means the engine makes no claim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CareLevel {
    Emergency,
    Urgency,
    Routine,
    #[default]
    None,
}

/// Output of one full local evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalReport {
    /// Top differentials, descending probability, at most three.
    #[serde(default)]
    pub list: Vec<DifferentialCandidate>,
    /// Probability of the leading candidate, 0.0 when the list is empty.
    pub confidence: f64,
    #[serde(default)]
    pub gaps: Gaps,
    #[serde(default)]
    pub red_flags: RedFlagReport,
    /// Free-form evaluation notes ("domínio ausente", etc.).
    #[serde(default)]
    pub notes: Vec<String>,
}

impl LocalReport {
    /// Empty report carrying a single explanatory note.
    pub fn insufficient(note: impl Into<String>) -> Self {
        Self {
            notes: vec![note.into()],
            ..Self::default()
        }
    }
}
