//! Escalation policy: decide whether a turn should also consult the
//! remote backend.
//!
//! The decision is a pure function of the payload, the previous
//! payload snapshot and the local report; the session records its
//! outcome as a [`DecisionRecord`] so every escalation is auditable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{MIN_TEXT_SIGNAL_CHARS, NEAR_CERTAINTY_CEILING};
use crate::models::{CasePayload, LocalReport};
use crate::pipeline::features::checklist_asserts;
use crate::pipeline::parser::{self, detect_red_flags};

/// Escalation posture. Each mode is a confidence threshold below which
/// the local answer is not considered good enough on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyMode {
    PreferLocal,
    #[default]
    Balanced,
    PreferRemote,
}

impl PolicyMode {
    /// Wire name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreferLocal => "prefer_local",
            Self::Balanced => "balanced",
            Self::PreferRemote => "prefer_remote",
        }
    }

    /// Confidence threshold under which the mode escalates.
    pub fn confidence_threshold(&self) -> f64 {
        match self {
            Self::PreferLocal => 0.45,
            Self::Balanced => 0.62,
            Self::PreferRemote => 0.75,
        }
    }
}

/// Why and whether a remote call was made, with its inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub mode: PolicyMode,
    pub local_confidence: f64,
    pub conflict: bool,
    pub red_flag: bool,
    pub significant_change: bool,
    pub demographics_only: bool,
    pub should_call_remote: bool,
    /// Names of the triggers that fired, in evaluation order.
    pub triggers: Vec<String>,
    pub decided_at: DateTime<Utc>,
}

/// True when the payload differs from the previous snapshot in any way
/// that could move the differential. A first turn always counts as
/// changed.
pub fn significant_change(payload: &CasePayload, previous: Option<&CasePayload>) -> bool {
    match previous {
        Some(prev) => payload != prev,
        None => true,
    }
}

/// A conflict is a symptom the checklist asserts while the narrative
/// denies it. Contradictory input is exactly what the remote model is
/// better at untangling.
pub fn has_conflict(payload: &CasePayload) -> bool {
    payload
        .negated
        .iter()
        .any(|token| checklist_asserts(&payload.symptoms, token))
}

/// Evaluate the escalation policy for one turn.
pub fn decide(
    mode: PolicyMode,
    payload: &CasePayload,
    previous: Option<&CasePayload>,
    local: &LocalReport,
    remote_red_flag_hint: bool,
) -> DecisionRecord {
    let demographics_only = payload.is_demographics_only();
    let conflict = has_conflict(payload);
    let text_flags = detect_red_flags(&parser::fold(&payload.free_text));
    let red_flag =
        local.red_flags.any || !payload.red_flags.is_empty() || !text_flags.is_empty() || remote_red_flag_hint;
    let changed = significant_change(payload, previous);

    let mut triggers: Vec<String> = Vec::new();
    let should_call_remote = if demographics_only {
        // Nothing clinical to reason about; never spend a remote call.
        false
    } else {
        if conflict {
            triggers.push("conflict".to_string());
        }
        if red_flag {
            triggers.push("red_flag".to_string());
        }
        if local.confidence < mode.confidence_threshold() {
            triggers.push("low_confidence".to_string());
        }
        if mode == PolicyMode::PreferRemote && payload.has_clinical_signal() {
            triggers.push("prefer_remote".to_string());
        }
        if mode == PolicyMode::Balanced
            && payload.free_text.trim().chars().count() >= MIN_TEXT_SIGNAL_CHARS
            && local.confidence < NEAR_CERTAINTY_CEILING
        {
            triggers.push("text_signal".to_string());
        }
        !triggers.is_empty() && changed
    };

    if !changed && !demographics_only {
        tracing::debug!("payload unchanged since last turn, remote call skipped");
    }

    DecisionRecord {
        mode,
        local_confidence: local.confidence,
        conflict,
        red_flag,
        significant_change: changed,
        demographics_only,
        should_call_remote,
        triggers,
        decided_at: Utc::now(),
    }
}
