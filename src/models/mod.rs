//! Domain types shared across the pipeline.

pub mod case;
pub mod differential;

pub use case::{CasePayload, Domain, PainSeverity, Sex, Trajectory};
pub use differential::{
    CareLevel, DifferentialCandidate, Gaps, LocalReport, Question, RedFlagReport,
};
