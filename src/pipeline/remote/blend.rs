//! Merging the remote answer into the local one.
//!
//! Differentials blend over the union of labels with a fixed remote
//! weight; red flags union; questions dedup by folded text with the
//! local ones first.

use crate::models::{DifferentialCandidate, Question};
use crate::pipeline::parser::fold;

/// Weighted blend over the label union. A label missing on one side
/// contributes zero from that side. Order: local labels first, then
/// remote-only labels, re-ranked by blended probability (stable).
pub fn blend_differentials(
    local: &[DifferentialCandidate],
    remote: &[DifferentialCandidate],
    remote_weight: f64,
) -> Vec<DifferentialCandidate> {
    let local_weight = 1.0 - remote_weight;
    let mut out: Vec<DifferentialCandidate> = Vec::new();

    for candidate in local {
        let remote_p = remote
            .iter()
            .find(|r| fold(&r.label) == fold(&candidate.label))
            .map(|r| r.probability)
            .unwrap_or(0.0);
        let mut blended = candidate.clone();
        blended.probability = local_weight * candidate.probability + remote_weight * remote_p;
        blended.source = Some("blend".to_string());
        out.push(blended);
    }

    for candidate in remote {
        let already = out.iter().any(|c| fold(&c.label) == fold(&candidate.label));
        if !already {
            let mut blended = candidate.clone();
            blended.probability = remote_weight * candidate.probability;
            blended.source = Some("remoto".to_string());
            out.push(blended);
        }
    }

    out.sort_by(|a, b| {
        b.probability
            .partial_cmp(&a.probability)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    out.truncate(3);
    out
}

/// Union of reported and remote red flags, deduplicated, local first.
pub fn merge_red_flags(local: &[String], remote: &[String]) -> Vec<String> {
    let mut out: Vec<String> = local.to_vec();
    for flag in remote {
        if !out.iter().any(|f| fold(f) == fold(flag)) {
            out.push(flag.clone());
        }
    }
    out
}

/// Local questions first, then remote extras deduplicated by folded
/// text. Remote questions without options get the yes/no pair.
pub fn merge_questions(local: &[Question], remote: &[Question], cap: usize) -> Vec<Question> {
    let mut out: Vec<Question> = local.to_vec();
    for question in remote {
        if out.len() >= cap {
            break;
        }
        if out.iter().any(|q| fold(&q.text) == fold(&question.text)) {
            continue;
        }
        let mut question = question.clone();
        if question.options.is_empty() {
            question.options = vec!["Sim".to_string(), "Não".to_string()];
        }
        out.push(question);
    }
    out.truncate(cap);
    out
}
