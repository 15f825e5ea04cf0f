//! The local triage pipeline: parse → features → score → follow-ups,
//! plus the escalation policy and the remote client.
//!
//! Every stage before `remote` is pure and synchronous; given the same
//! payload and rule table the output is bit-identical.

pub mod features;
pub mod followup;
pub mod parser;
pub mod policy;
pub mod remote;
pub mod scoring;

use thiserror::Error;

/// Pipeline-level failures. Scoring itself cannot fail; errors only
/// arise around the external rule table.
#[derive(Debug, Error)]
pub enum TriageError {
    #[error("rule table fetch failed: {0}")]
    RuleTableFetch(String),

    #[error("rule table parse failed: {0}")]
    RuleTableParse(String),
}
