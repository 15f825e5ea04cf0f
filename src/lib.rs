//! ent-triage: local differential-diagnosis engine and escalation
//! policy for an ENT (ear, nose, throat, neck) self-assessment
//! assistant.
//!
//! The crate is the client side of a hybrid design: a deterministic
//! local pipeline (parse → features → score → follow-ups) produces an
//! answer on every turn, and a policy decides when that answer is weak,
//! conflicted or alarming enough to also consult a remote reasoning
//! backend. Remote results are blended, never trusted exclusively, and
//! a failed or stale remote call degrades to the local result.
//!
//! Entry point: [`session::TriageSession`].

pub mod config;
pub mod models;
pub mod pipeline;
pub mod session;

pub use config::TriageConfig;
pub use models::{
    CasePayload, CareLevel, DifferentialCandidate, Domain, Gaps, LocalReport, PainSeverity,
    Question, RedFlagReport, Sex, Trajectory,
};
pub use pipeline::policy::{DecisionRecord, PolicyMode};
pub use pipeline::remote::{HttpTriageBackend, RemoteError, RemoteTriageResponse, TriageBackend};
pub use pipeline::scoring::RuleTable;
pub use pipeline::TriageError;
pub use session::{TriageOutcome, TriageSession};

/// Initialize tracing with the env filter, falling back to the crate
/// default. Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .ok();
}
