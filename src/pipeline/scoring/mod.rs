//! Differential scoring.
//!
//! Two interchangeable strategies implement [`ScoringStrategy`]: the
//! built-in clinical heuristics and an externally loaded weighted rule
//! table. When both are available their distributions are blended
//! 70/30 in favor of the heuristics. Scoring is deterministic: ordered
//! maps only, stable sorts only.

pub mod bayes;
pub mod ear;
pub mod neck;
pub mod nose;
pub mod rule_table;
pub mod throat;

use crate::config::HEURISTIC_BLEND_WEIGHT;
use crate::models::{CasePayload, DifferentialCandidate, Domain, LocalReport};
use crate::pipeline::features::FeatureMap;

pub use rule_table::{RuleTable, RuleTableStrategy};

/// Probabilities never reach the extremes; downstream odds math and
/// the escalation policy both rely on that.
pub const PROB_FLOOR: f64 = 0.001;
pub const PROB_CEIL: f64 = 0.999;

/// One scored hypothesis before finalization.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreEntry {
    pub label: String,
    pub probability: f64,
    pub rationale: Vec<String>,
}

/// Ordered label→probability map. Insertion order is preserved so ties
/// resolve the same way on every run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreMap {
    entries: Vec<ScoreEntry>,
}

impl ScoreMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a label's probability.
    pub fn set(&mut self, label: &str, probability: f64, note: Option<&str>) {
        match self.entries.iter_mut().find(|e| e.label == label) {
            Some(entry) => {
                entry.probability = probability;
                if let Some(note) = note {
                    entry.rationale.push(note.to_string());
                }
            }
            None => self.entries.push(ScoreEntry {
                label: label.to_string(),
                probability,
                rationale: note.map(|n| vec![n.to_string()]).unwrap_or_default(),
            }),
        }
    }

    /// Raise a label to at least the given probability.
    pub fn raise(&mut self, label: &str, probability: f64, note: Option<&str>) {
        match self.entries.iter_mut().find(|e| e.label == label) {
            Some(entry) => {
                if probability > entry.probability {
                    entry.probability = probability;
                }
                if let Some(note) = note {
                    entry.rationale.push(note.to_string());
                }
            }
            None => self.set(label, probability, note),
        }
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.probability)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }
}

/// A scoring backend: heuristics, rule table, anything that turns a
/// case into a label→probability map for one domain.
pub trait ScoringStrategy {
    fn name(&self) -> &'static str;

    fn score(&self, payload: &CasePayload, features: &FeatureMap, domain: Domain) -> ScoreMap;
}

/// The built-in clinical heuristics, one scorer per domain.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicStrategy;

impl ScoringStrategy for HeuristicStrategy {
    fn name(&self) -> &'static str {
        "heuristica"
    }

    fn score(&self, payload: &CasePayload, features: &FeatureMap, domain: Domain) -> ScoreMap {
        match domain {
            Domain::Throat => throat::score(payload, features),
            Domain::Ear => ear::score(payload, features),
            Domain::Nose => nose::score(payload, features),
            Domain::Neck => neck::score(payload, features),
        }
    }
}

/// Weighted union of two score maps. Labels keep the order of `a`,
/// then `b`'s extras; a label missing from one map contributes zero
/// from that side.
pub fn blend_maps(a: &ScoreMap, b: &ScoreMap, weight_a: f64) -> ScoreMap {
    let weight_b = 1.0 - weight_a;
    let mut out = ScoreMap::new();

    for entry in a.entries() {
        let other = b.get(&entry.label).unwrap_or(0.0);
        out.set(&entry.label, weight_a * entry.probability + weight_b * other, None);
        for note in &entry.rationale {
            out.raise(&entry.label, 0.0, Some(note));
        }
    }
    for entry in b.entries() {
        if out.get(&entry.label).is_none() {
            out.set(&entry.label, weight_b * entry.probability, None);
            for note in &entry.rationale {
                out.raise(&entry.label, 0.0, Some(note));
            }
        }
    }
    out
}

/// Clamp, rank, truncate to three, and normalize an over-unity sum.
pub fn finalize(map: ScoreMap) -> (Vec<DifferentialCandidate>, f64) {
    let mut entries = map.entries;
    for entry in &mut entries {
        entry.probability = entry.probability.clamp(PROB_FLOOR, PROB_CEIL);
    }
    // Stable sort: equal probabilities keep insertion order.
    entries.sort_by(|a, b| {
        b.probability
            .partial_cmp(&a.probability)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    entries.truncate(3);

    let sum: f64 = entries.iter().map(|e| e.probability).sum();
    if sum > 1.0 {
        for entry in &mut entries {
            entry.probability /= sum;
        }
    }

    let confidence = entries.first().map(|e| e.probability).unwrap_or(0.0);
    let list = entries
        .into_iter()
        .map(|e| DifferentialCandidate {
            label: e.label,
            probability: e.probability,
            rationale: e.rationale,
            source: None,
        })
        .collect();
    (list, confidence)
}

/// Score a case with the heuristics, blended with the rule table when
/// one is loaded. Returns an insufficient-information report when the
/// domain is unknown.
pub fn score_case(
    payload: &CasePayload,
    features: &FeatureMap,
    rules: Option<&RuleTable>,
) -> LocalReport {
    let Some(domain) = payload.domain else {
        return LocalReport::insufficient("domínio ausente");
    };

    let heuristic = HeuristicStrategy.score(payload, features, domain);
    let combined = match rules {
        Some(table) => {
            let tabled = RuleTableStrategy::new(table).score(payload, features, domain);
            if tabled.is_empty() {
                heuristic
            } else {
                blend_maps(&heuristic, &tabled, HEURISTIC_BLEND_WEIGHT)
            }
        }
        None => heuristic,
    };

    if combined.is_empty() {
        return LocalReport::insufficient("domínio desconhecido");
    }

    let (list, confidence) = finalize(combined);
    LocalReport {
        list,
        confidence,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_map_set_and_raise() {
        let mut map = ScoreMap::new();
        map.set("A", 0.4, Some("primeira"));
        map.raise("A", 0.2, None);
        assert_eq!(map.get("A"), Some(0.4));
        map.raise("A", 0.7, Some("segunda"));
        assert_eq!(map.get("A"), Some(0.7));
        assert_eq!(map.entries()[0].rationale.len(), 2);
    }

    #[test]
    fn finalize_clamps_sorts_and_truncates() {
        let mut map = ScoreMap::new();
        map.set("baixa", 0.0, None);
        map.set("alta", 1.2, None);
        map.set("media", 0.5, None);
        map.set("quarta", 0.4, None);

        let (list, confidence) = finalize(map);
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].label, "alta");
        // Over-unity sum gets normalized; the leader stays the leader.
        let sum: f64 = list.iter().map(|c| c.probability).sum();
        assert!(sum <= 1.0 + 1e-9);
        assert!((confidence - list[0].probability).abs() < 1e-12);
    }

    #[test]
    fn finalize_keeps_under_unity_sums_untouched() {
        let mut map = ScoreMap::new();
        map.set("a", 0.3, None);
        map.set("b", 0.2, None);
        let (list, confidence) = finalize(map);
        assert!((list[0].probability - 0.3).abs() < 1e-12);
        assert!((confidence - 0.3).abs() < 1e-12);
    }

    #[test]
    fn finalize_is_stable_on_ties() {
        let mut map = ScoreMap::new();
        map.set("primeiro", 0.5, None);
        map.set("segundo", 0.5, None);
        let (list, _) = finalize(map);
        assert_eq!(list[0].label, "primeiro");
        assert_eq!(list[1].label, "segundo");
    }

    #[test]
    fn blend_uses_zero_for_missing_labels() {
        let mut a = ScoreMap::new();
        a.set("comum", 0.6, None);
        a.set("so_local", 0.4, None);
        let mut b = ScoreMap::new();
        b.set("comum", 0.2, None);
        b.set("so_tabela", 0.8, None);

        let blended = blend_maps(&a, &b, 0.7);
        assert!((blended.get("comum").unwrap() - (0.7 * 0.6 + 0.3 * 0.2)).abs() < 1e-9);
        assert!((blended.get("so_local").unwrap() - 0.7 * 0.4).abs() < 1e-9);
        assert!((blended.get("so_tabela").unwrap() - 0.3 * 0.8).abs() < 1e-9);
    }

    #[test]
    fn missing_domain_yields_insufficient_report() {
        let payload = CasePayload::default();
        let features = FeatureMap::default();
        let report = score_case(&payload, &features, None);
        assert!(report.list.is_empty());
        assert_eq!(report.confidence, 0.0);
        assert_eq!(report.notes, vec!["domínio ausente".to_string()]);
    }
}
