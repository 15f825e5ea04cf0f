//! Externally loaded weighted rule table.
//!
//! The table is fetched as JSON and deserialized tolerantly: missing
//! priors default, unknown feature keys contribute nothing, and a
//! domain without rules simply yields an empty map (the heuristics
//! then stand alone). Ordered maps keep scoring bit-identical across
//! runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{CasePayload, Domain, Trajectory};
use crate::pipeline::features::FeatureMap;
use crate::pipeline::TriageError;

use super::{ScoreMap, ScoringStrategy};

const PRIOR_FLOOR: f64 = 0.001;
const PRIOR_CEIL: f64 = 0.95;

fn default_prior() -> f64 {
    0.10
}

/// Top-level rule document, keyed by domain rules key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleTable {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub domains: BTreeMap<String, DomainRules>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainRules {
    #[serde(default)]
    pub diagnoses: Vec<DxRule>,
}

/// One table-driven diagnosis: a prior plus additive feature weights
/// and multiplicative context modifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DxRule {
    pub name: String,
    #[serde(default = "default_prior")]
    pub prior: f64,
    #[serde(default)]
    pub weights: BTreeMap<String, f64>,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
}

/// Context conditions that scale a rule's score when they hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Modifier {
    AgeRange {
        #[serde(default)]
        min: Option<u32>,
        #[serde(default)]
        max: Option<u32>,
        factor: f64,
    },
    DurationDays {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
        factor: f64,
    },
    Trajectory {
        value: Trajectory,
        #[serde(default)]
        min_duration_days: Option<f64>,
        factor: f64,
    },
    FeverAtLeast {
        celsius: f64,
        factor: f64,
    },
    AbsentFeature {
        feature: String,
        factor: f64,
    },
}

impl Modifier {
    fn applies(&self, payload: &CasePayload, features: &FeatureMap) -> bool {
        match self {
            Self::AgeRange { min, max, .. } => match payload.age {
                Some(age) => {
                    min.map(|m| age >= m).unwrap_or(true) && max.map(|m| age <= m).unwrap_or(true)
                }
                None => false,
            },
            Self::DurationDays { min, max, .. } => match payload.duration_days {
                Some(d) => {
                    min.map(|m| d >= m).unwrap_or(true) && max.map(|m| d <= m).unwrap_or(true)
                }
                None => false,
            },
            Self::Trajectory {
                value,
                min_duration_days,
                ..
            } => {
                payload.trajectory == Some(*value)
                    && min_duration_days
                        .map(|m| payload.duration_days.is_some_and(|d| d >= m))
                        .unwrap_or(true)
            }
            Self::FeverAtLeast { celsius, .. } => {
                payload.max_fever_c.is_some_and(|c| c >= *celsius)
            }
            Self::AbsentFeature { feature, .. } => {
                features.get(feature).map(|present| !present).unwrap_or(false)
            }
        }
    }

    fn factor(&self) -> f64 {
        match self {
            Self::AgeRange { factor, .. }
            | Self::DurationDays { factor, .. }
            | Self::Trajectory { factor, .. }
            | Self::FeverAtLeast { factor, .. }
            | Self::AbsentFeature { factor, .. } => *factor,
        }
    }
}

impl RuleTable {
    /// Parse a rule document, surfacing malformed JSON as a pipeline
    /// error.
    pub fn from_json(raw: &str) -> Result<Self, TriageError> {
        serde_json::from_str(raw).map_err(|e| TriageError::RuleTableParse(e.to_string()))
    }

    fn rules_for(&self, domain: Domain) -> Option<&DomainRules> {
        self.domains.get(domain.rules_key())
    }
}

impl DxRule {
    fn score(&self, payload: &CasePayload, features: &FeatureMap) -> f64 {
        let mut p = self.prior.clamp(PRIOR_FLOOR, PRIOR_CEIL);
        for (feature, weight) in &self.weights {
            // Unknown feature keys in the table are ignored.
            if features.get(feature) == Some(true) {
                p += weight;
            }
        }
        for modifier in &self.modifiers {
            if modifier.applies(payload, features) {
                p *= modifier.factor();
            }
        }
        p.clamp(PRIOR_FLOOR, PRIOR_CEIL)
    }
}

/// [`ScoringStrategy`] over a loaded [`RuleTable`].
pub struct RuleTableStrategy<'a> {
    table: &'a RuleTable,
}

impl<'a> RuleTableStrategy<'a> {
    pub fn new(table: &'a RuleTable) -> Self {
        Self { table }
    }
}

impl ScoringStrategy for RuleTableStrategy<'_> {
    fn name(&self) -> &'static str {
        "tabela"
    }

    fn score(&self, payload: &CasePayload, features: &FeatureMap, domain: Domain) -> ScoreMap {
        let mut map = ScoreMap::new();
        let Some(rules) = self.table.rules_for(domain) else {
            return map;
        };
        for rule in &rules.diagnoses {
            map.set(&rule.name, rule.score(payload, features), None);
        }
        map
    }
}
