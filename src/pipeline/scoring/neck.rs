//! Neck heuristics: cervical lymphadenopathy triage.

use crate::models::CasePayload;
use crate::pipeline::features::FeatureMap;

use super::ScoreMap;

const REACTIVE: &str = "Linfadenite reativa";
const SYSTEMIC: &str = "Linfadenopatia a esclarecer (investigação sistêmica)";
const NONSPECIFIC_NODES: &str = "Linfonodomegalia inespecífica";
const NECK_COMPLAINT: &str = "Queixa cervical inespecífica";
const GLOBUS: &str = "Sensação de globus faríngeo";

/// A node persisting this long without regression needs workup.
const PERSISTENT_NODE_DAYS: f64 = 28.0;

pub fn score(payload: &CasePayload, features: &FeatureMap) -> ScoreMap {
    let mut map = ScoreMap::new();

    if features.neck_nodes {
        let constitutional = features.weight_loss || features.night_sweats;
        let persistent = payload
            .duration_days
            .is_some_and(|d| d >= PERSISTENT_NODE_DAYS);
        if constitutional || persistent {
            let note = if constitutional {
                "sintomas constitucionais associados"
            } else {
                "linfonodo persistente"
            };
            map.raise(SYSTEMIC, 0.60, Some(note));
        }

        if features.fever || features.sore_throat || features.rhinorrhea {
            map.raise(REACTIVE, 0.70, Some("contexto infeccioso recente"));
        }

        if map.is_empty() {
            map.set(NONSPECIFIC_NODES, 0.40, None);
        }
    } else {
        if features.globus && !features.dysphagia {
            map.raise(GLOBUS, 0.50, Some("sensação de corpo estranho sem disfagia"));
        }
        map.raise(NECK_COMPLAINT, 1.0, None);
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infectious_context_is_reactive() {
        let mut f = FeatureMap::default();
        f.neck_nodes = true;
        f.fever = true;
        let map = score(&CasePayload::default(), &f);
        assert_eq!(map.get(REACTIVE), Some(0.70));
        assert!(map.get(SYSTEMIC).is_none());
    }

    #[test]
    fn constitutional_symptoms_force_systemic_workup() {
        let mut f = FeatureMap::default();
        f.neck_nodes = true;
        f.night_sweats = true;
        let map = score(&CasePayload::default(), &f);
        assert_eq!(map.get(SYSTEMIC), Some(0.60));
    }

    #[test]
    fn persistent_node_adds_workup_alongside_the_reactive_read() {
        let mut f = FeatureMap::default();
        f.neck_nodes = true;
        f.fever = true;
        let mut p = CasePayload::default();
        p.duration_days = Some(40.0);
        let map = score(&p, &f);
        assert_eq!(map.get(SYSTEMIC), Some(0.60));
        assert_eq!(map.get(REACTIVE), Some(0.70));
    }

    #[test]
    fn bare_node_is_nonspecific() {
        let mut f = FeatureMap::default();
        f.neck_nodes = true;
        let map = score(&CasePayload::default(), &f);
        assert_eq!(map.get(NONSPECIFIC_NODES), Some(0.40));
        assert!(map.get(NECK_COMPLAINT).is_none());
    }

    #[test]
    fn no_nodes_falls_back_to_nonspecific_complaint() {
        let map = score(&CasePayload::default(), &FeatureMap::default());
        assert_eq!(map.get(NECK_COMPLAINT), Some(1.0));
    }

    #[test]
    fn globus_without_dysphagia() {
        let mut f = FeatureMap::default();
        f.globus = true;
        let map = score(&CasePayload::default(), &f);
        assert_eq!(map.get(GLOBUS), Some(0.50));

        f.dysphagia = true;
        let map = score(&CasePayload::default(), &f);
        assert!(map.get(GLOBUS).is_none());
    }
}
