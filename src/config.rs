//! Crate-wide tunables.
//!
//! Constants live here so thresholds are greppable in one place; the
//! runtime-adjustable subset is carried by [`TriageConfig`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::pipeline::policy::PolicyMode;

/// Remote triage endpoint path, relative to the backend base URL.
pub const TRIAGE_ENDPOINT: &str = "/api/triage";

/// Remote sequential-interview endpoint path.
pub const INTERVIEW_ENDPOINT: &str = "/api/interview";

/// Default backend base URL for local development.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8787";

/// Remote request timeout. Generous because the backend may be running
/// a slow reasoning model.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Weight of the remote distribution when blending with the local one.
pub const DEFAULT_REMOTE_WEIGHT: f64 = 0.6;

/// Weight of the heuristic strategy when a rule table is also loaded.
pub const HEURISTIC_BLEND_WEIGHT: f64 = 0.7;

/// Maximum number of follow-up questions surfaced per evaluation.
pub const MAX_FOLLOWUP_QUESTIONS: usize = 6;

/// Local confidence above which even balanced mode stops escalating on
/// narrative text alone.
pub const NEAR_CERTAINTY_CEILING: f64 = 0.95;

/// Minimum narrative length (chars) counted as textual signal.
pub const MIN_TEXT_SIGNAL_CHARS: usize = 4;

/// Language tag sent to the remote backend.
pub const DEFAULT_LANGUAGE: &str = "pt-BR";

/// Default `RUST_LOG`-style filter when the env var is unset.
pub fn default_log_filter() -> &'static str {
    "ent_triage=debug,info"
}

/// Runtime configuration for a triage session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageConfig {
    /// Escalation posture.
    pub mode: PolicyMode,
    /// Remote backend base URL.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Remote weight used when blending differentials.
    pub remote_weight: f64,
    /// Language tag forwarded to the backend.
    pub language: String,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            mode: PolicyMode::default(),
            base_url: DEFAULT_BACKEND_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            remote_weight: DEFAULT_REMOTE_WEIGHT,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_constants() {
        let cfg = TriageConfig::default();
        assert_eq!(cfg.base_url, DEFAULT_BACKEND_URL);
        assert_eq!(cfg.timeout, Duration::from_secs(120));
        assert!((cfg.remote_weight - 0.6).abs() < f64::EPSILON);
        assert_eq!(cfg.mode, PolicyMode::Balanced);
    }

    #[test]
    fn blend_weights_are_complementary_fractions() {
        assert!(DEFAULT_REMOTE_WEIGHT > 0.0 && DEFAULT_REMOTE_WEIGHT < 1.0);
        assert!(HEURISTIC_BLEND_WEIGHT > 0.0 && HEURISTIC_BLEND_WEIGHT < 1.0);
    }
}
