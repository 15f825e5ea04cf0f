//! Case payload — everything known about the current triage session.
//!
//! The payload is owned by the session and merged progressively as the
//! user answers prompts, checks symptoms, or submits free text. It is
//! never replaced wholesale; enrichment from parsing is additive-only.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Anatomical triage domain.
///
/// Wire values match the rule-table domain keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Domain {
    #[serde(rename = "ouvido")]
    Ear,
    #[serde(rename = "nariz")]
    Nose,
    #[serde(rename = "garganta")]
    Throat,
    #[serde(rename = "pescoco")]
    Neck,
}

impl Domain {
    /// Key used by the external rule table and the backend wire format.
    pub fn rules_key(&self) -> &'static str {
        match self {
            Self::Ear => "ouvido",
            Self::Nose => "nariz",
            Self::Throat => "garganta",
            Self::Neck => "pescoco",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.rules_key())
    }
}

/// Biological sex as reported during intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "OUTRO")]
    Other,
}

impl Sex {
    /// Intake code, identical to the wire value.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
            Self::Other => "OUTRO",
        }
    }
}

/// Reported direction of symptom change over time.
///
/// Biphasic worsening (improvement followed by renewed worsening) is a
/// classic bacterial-superinfection cue and is kept distinct from plain
/// worsening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trajectory {
    #[serde(rename = "piorando")]
    Worsening,
    #[serde(rename = "melhorando")]
    Improving,
    #[serde(rename = "estavel")]
    Stable,
    #[serde(rename = "flutuante")]
    Fluctuating,
    #[serde(rename = "piora_bifasica")]
    BiphasicWorsening,
}

/// Bucketed pain severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PainSeverity {
    #[serde(rename = "leve")]
    Mild,
    #[serde(rename = "moderada")]
    Moderate,
    #[serde(rename = "forte")]
    Severe,
}

impl PainSeverity {
    /// Derive a bucket from a 0-10 numeric scale (NRS/EVA).
    pub fn from_scale(scale: u8) -> Self {
        match scale {
            s if s >= 8 => Self::Severe,
            s if s >= 4 => Self::Moderate,
            _ => Self::Mild,
        }
    }
}

/// The mutable record of everything known about the current session.
///
/// Fields left `None` mean "unknown", never "absent": negation is
/// tracked separately in `negated` so that "no cough" and "cough not
/// mentioned" stay distinguishable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CasePayload {
    pub age: Option<u32>,
    pub sex: Option<Sex>,
    /// Accumulated free-form narrative (newline-joined across turns).
    #[serde(default)]
    pub free_text: String,
    /// Checklist symptom identifiers, domain-specific vocabulary.
    #[serde(default)]
    pub symptoms: BTreeSet<String>,
    /// Red-flag identifiers explicitly reported by the user.
    #[serde(default)]
    pub red_flags: BTreeSet<String>,
    pub domain: Option<Domain>,
    /// Duration exactly as the user phrased it, when captured.
    pub duration_raw: Option<String>,
    /// Duration normalized to days (fractional for sub-day durations).
    pub duration_days: Option<f64>,
    pub trajectory: Option<Trajectory>,
    /// Maximum reported fever, Celsius.
    pub max_fever_c: Option<f64>,
    pub pain: Option<PainSeverity>,
    /// Numeric 0-10 pain scale when explicitly given.
    pub pain_scale: Option<u8>,
    /// Symptom tokens the narrative explicitly denies.
    #[serde(default)]
    pub negated: BTreeSet<String>,
    #[serde(default)]
    pub comorbidities: Vec<String>,
    #[serde(default)]
    pub medications: Vec<String>,
}

impl CasePayload {
    /// Merge age/sex from the intake form. Provided values win; `None`
    /// leaves the existing value untouched.
    pub fn merge_demographics(&mut self, age: Option<u32>, sex: Option<Sex>) {
        if age.is_some() {
            self.age = age;
        }
        if sex.is_some() {
            self.sex = sex;
        }
    }

    /// Replace the checklist symptom set (the picker overlay resubmits
    /// the full selection each time).
    pub fn set_symptoms<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symptoms = ids.into_iter().map(Into::into).collect();
    }

    /// Replace the reported red-flag set.
    pub fn set_red_flags<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.red_flags = ids.into_iter().map(Into::into).collect();
    }

    /// Append a narrative fragment. Text accumulates across turns and is
    /// re-parsed as a whole on the next turn.
    pub fn append_free_text(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if !self.free_text.is_empty() {
            self.free_text.push('\n');
        }
        self.free_text.push_str(text);
    }

    /// Replace the reported comorbidity list.
    pub fn set_comorbidities<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.comorbidities = items.into_iter().map(Into::into).collect();
    }

    /// Replace the current-medication list.
    pub fn set_medications<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.medications = items.into_iter().map(Into::into).collect();
    }

    /// Explicitly set the anatomical domain. An explicit domain is never
    /// overwritten by inference.
    pub fn set_domain(&mut self, domain: Domain) {
        self.domain = Some(domain);
    }

    /// True when the payload holds nothing beyond demographics: no
    /// symptoms, no red flags, no narrative. The orchestration policy
    /// hard-gates remote calls on this.
    pub fn is_demographics_only(&self) -> bool {
        self.symptoms.is_empty() && self.red_flags.is_empty() && self.free_text.trim().is_empty()
    }

    /// True when there is any clinical signal at all (symptoms or
    /// non-empty narrative).
    pub fn has_clinical_signal(&self) -> bool {
        !self.symptoms.is_empty() || !self.free_text.trim().is_empty()
    }
}
