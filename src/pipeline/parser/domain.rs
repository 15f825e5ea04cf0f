//! Anatomical-domain inference from narrative text.
//!
//! Checked in a fixed priority order (ear, nose, throat, neck) so
//! multi-site narratives resolve deterministically. When nothing
//! matches the domain stays unknown; an explicitly chosen domain is
//! handled upstream and never overwritten by this inference.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::Domain;

static EAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\bouvidos?\b|\botalgia\b|\botorreia\b|\bzumbido\b|audicao|\bsurdez\b|perda\s+auditiva|\btragus\b",
    )
    .unwrap()
});

static NOSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\bnariz\b|\bnasal\b|\bcoriza\b|\bespirros?\b|\bsinusite\b|rinossinusite|\brinite\b|\bepistaxe\b|sangramento\s+nasal|\bolfato\b|\banosmia\b",
    )
    .unwrap()
});

static THROAT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\bgarganta\b|\bengolir\b|\bdeglutir\b|\bamigdala\w*\b|\bfaringe\b|\brouquidao\b|\brouco\b|\bvoz\b|\bdisfonia\b|\bdisfagia\b",
    )
    .unwrap()
});

static NECK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bpescoco\b|\bcervical\b|\bganglio\w*\b|\blinfonodo\w*\b|caroco\s+no\s+pescoco|\bnuca\b")
        .unwrap()
});

/// Infer the dominant anatomical domain, if any.
pub fn infer_domain(folded: &str) -> Option<Domain> {
    if EAR_RE.is_match(folded) {
        return Some(Domain::Ear);
    }
    if NOSE_RE.is_match(folded) {
        return Some(Domain::Nose);
    }
    if THROAT_RE.is_match(folded) {
        return Some(Domain::Throat);
    }
    if NECK_RE.is_match(folded) {
        return Some(Domain::Neck);
    }
    None
}
