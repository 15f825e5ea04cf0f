//! Ear heuristics: otologic vs. referred otalgia, with tinnitus and
//! dizziness overlays.

use crate::models::CasePayload;
use crate::pipeline::features::FeatureMap;

use super::ScoreMap;

const SUDDEN_LOSS: &str = "Perda auditiva súbita";
const EXTERNA: &str = "Otite externa";
const MEDIA: &str = "Otite média aguda";
const TUBAL: &str = "Disfunção tubária / otite serosa";
const OTHER_OTOGENIC: &str = "Outra causa otológica";
const TMJ: &str = "Dor referida da articulação temporomandibular";
const PHARYNGEAL: &str = "Otalgia referida de origem faríngea";
const REFERRED: &str = "Otalgia referida";
const PULSATILE: &str = "Zumbido pulsátil (avaliação vascular)";
const SENSORINEURAL: &str = "Zumbido com perda auditiva (provável neurossensorial)";
const TINNITUS_NONSPECIFIC: &str = "Zumbido inespecífico";
const VERTIGO: &str = "Vertigem periférica";

/// Hearing loss installing within this window counts as sudden.
const SUDDEN_LOSS_WINDOW_DAYS: f64 = 3.0;

pub fn score(payload: &CasePayload, features: &FeatureMap) -> ScoreMap {
    let mut map = ScoreMap::new();

    // Time-critical, checked before everything else.
    let acute_window = payload
        .duration_days
        .is_some_and(|d| d <= SUDDEN_LOSS_WINDOW_DAYS);
    if features.hearing_loss && (features.sudden_onset || acute_window) {
        map.set(SUDDEN_LOSS, 0.90, Some("perda auditiva de instalação súbita"));
    }

    let otologic_signs = features.ear_discharge
        || features.ear_fullness
        || features.hearing_loss
        || features.after_pool
        || features.ear_itch
        || features.tragal_pain;

    if otologic_signs {
        if features.after_pool || features.ear_itch || features.tragal_pain {
            map.raise(EXTERNA, 0.90, Some("dor ao manipular a orelha ou exposição à água"));
        } else if features.fever || features.recent_uri {
            map.raise(MEDIA, 0.85, Some("quadro febril ou infecção respiratória recente"));
        } else if features.ear_fullness {
            map.raise(TUBAL, 0.70, Some("plenitude sem sinais infecciosos"));
        } else {
            map.raise(OTHER_OTOGENIC, 1.0, None);
        }
    } else if features.ear_pain {
        // Pain without otologic findings: look for a referred source.
        if features.fever || features.recent_uri {
            map.raise(MEDIA, 0.85, Some("quadro febril ou infecção respiratória recente"));
        } else if features.chewing_pain {
            map.raise(TMJ, 0.60, Some("dor ao mastigar"));
        } else if features.sore_throat {
            map.raise(PHARYNGEAL, 0.95, Some("dor de garganta associada"));
        } else {
            map.raise(REFERRED, 1.0, None);
        }
    }

    if features.pulsatile_tinnitus {
        map.raise(PULSATILE, 1.0, Some("zumbido sincronizado com o pulso"));
    } else if features.tinnitus {
        if features.unilateral && (features.hearing_loss || features.sudden_onset) {
            map.raise(SUDDEN_LOSS, 0.80, Some("zumbido unilateral com hipoacusia"));
        } else if features.hearing_loss {
            map.raise(SENSORINEURAL, 0.70, Some("zumbido com perda auditiva"));
        } else {
            map.raise(TINNITUS_NONSPECIFIC, 0.70, None);
        }
    }

    if features.dizziness {
        map.raise(VERTIGO, 0.70, Some("tontura associada"));
    }

    map
}
