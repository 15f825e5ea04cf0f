//! Negation extraction.
//!
//! A negation cue ("sem", "nega", "não tem…") negates the symptom
//! surfaces found in the span that follows it, up to the next sentence
//! break. "afebril" is a self-contained negation of fever. Negated
//! tokens are reported under canonical checklist identifiers.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// How far past a cue a negated surface may appear.
const NEGATION_WINDOW: usize = 48;

static CUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bsem\b|\bnega\b|\bnao\s+(?:tem|tenho|ha|apresenta|sente|sinto|teve|tive)\b")
        .unwrap()
});

static AFEBRILE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bafebril\b").unwrap());

static SENTENCE_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.;!?]").unwrap());

// An adversative or "com" flips polarity back to affirmation mid-span.
static POLARITY_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bmas\b|\bporem\b|\bcom\b").unwrap());

/// Canonical token id and the surface forms that name it.
static SURFACES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    vec![
        ("febre", Regex::new(r"\bfebre\b|\bfebril\b").unwrap()),
        ("tosse", Regex::new(r"\btosse\b|\btossindo\b").unwrap()),
        ("coriza", Regex::new(r"\bcoriza\b|nariz\s+escorrendo").unwrap()),
        (
            "nariz_entupido",
            Regex::new(r"nariz\s+entupido|congestao\s+nasal|obstrucao\s+nasal").unwrap(),
        ),
        (
            "dor_de_garganta",
            Regex::new(r"dor\s+(?:de|na)\s+garganta|garganta\s+doendo").unwrap(),
        ),
        (
            "otalgia",
            Regex::new(r"dor\s+(?:de|no)\s+ouvido|\botalgia\b").unwrap(),
        ),
        (
            "otorreia",
            Regex::new(r"secrecao\s+no\s+ouvido|\botorreia\b|ouvido\s+escorrendo").unwrap(),
        ),
    ]
});

/// Extract canonically-named negated symptom tokens from folded text.
pub fn parse_negations(folded: &str) -> BTreeSet<String> {
    let mut negated = BTreeSet::new();

    for cue in CUE_RE.find_iter(folded) {
        let window = negation_window(folded, cue.end());
        for (token, surface) in SURFACES.iter() {
            if surface.is_match(window) {
                negated.insert(token.to_string());
            }
        }
    }

    if AFEBRILE_RE.is_match(folded) {
        negated.insert("febre".to_string());
    }

    negated
}

/// Blank out every negated span so downstream textual feature matching
/// never sees a denied symptom as present.
pub fn strip_negations(folded: &str) -> String {
    let mut out = folded.to_string();
    let mut spans: Vec<(usize, usize)> = Vec::new();

    for cue in CUE_RE.find_iter(folded) {
        let window = negation_window(folded, cue.end());
        spans.push((cue.start(), cue.end() + window.len()));
    }
    for m in AFEBRILE_RE.find_iter(folded) {
        spans.push((m.start(), m.end()));
    }

    for (start, end) in spans {
        // Safety: spans are computed on char boundaries of `folded`.
        out.replace_range(start..end, &" ".repeat(end - start));
    }
    out
}

/// Map a negation token id to the feature-map key it suppresses.
pub fn feature_key_for(token: &str) -> Option<&'static str> {
    Some(match token {
        "febre" => "fever",
        "tosse" => "cough",
        "coriza" => "rhinorrhea",
        "nariz_entupido" => "nasal_obstruction",
        "dor_de_garganta" => "sore_throat",
        "otalgia" => "ear_pain",
        "otorreia" => "ear_discharge",
        _ => return None,
    })
}

fn negation_window(folded: &str, from: usize) -> &str {
    let rest = &folded[from..];
    let mut end = rest.len().min(NEGATION_WINDOW);
    // Do not cross a sentence break or a return to affirmation.
    if let Some(m) = SENTENCE_BREAK_RE.find(rest) {
        end = end.min(m.start());
    }
    if let Some(m) = POLARITY_BREAK_RE.find(rest) {
        end = end.min(m.start());
    }
    // A comma opens a new assertive clause ("sem febre, dor de
    // garganta...") and ends the span, except when it continues the
    // denial with "nem".
    for (idx, _) in rest.match_indices(',') {
        if idx >= end {
            break;
        }
        let after = rest[idx + 1..].trim_start();
        if !is_word_prefix(after, "nem") {
            end = idx;
            break;
        }
    }
    // Stay on a char boundary after the byte cap.
    while end < rest.len() && !rest.is_char_boundary(end) {
        end -= 1;
    }
    &rest[..end]
}

fn is_word_prefix(text: &str, word: &str) -> bool {
    text.strip_prefix(word)
        .is_some_and(|tail| !tail.starts_with(|c: char| c.is_alphanumeric()))
}
