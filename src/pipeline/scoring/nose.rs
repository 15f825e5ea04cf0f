//! Nose heuristics: chronic rhinosinusitis gate, allergic vs viral
//! rhinitis, bacterial superinfection cue, epistaxis.

use crate::models::{CasePayload, Trajectory};
use crate::pipeline::features::FeatureMap;

use super::ScoreMap;

const POLYPOID_CRS: &str = "Rinossinusite crônica polipoide provável";
const PROBABLE_CRS: &str = "Rinossinusite crônica provável";
const ALLERGIC: &str = "Rinite alérgica";
const COMMON_COLD: &str = "Resfriado comum / rinite inespecífica";
const VIRAL_SINUSITIS: &str = "Rinossinusite aguda viral";
const BACTERIAL_SINUSITIS: &str = "Rinossinusite aguda bacteriana";
const EPISTAXIS: &str = "Epistaxe anterior";
const ANOSMIA: &str = "Anosmia a esclarecer";

/// Viral rhinosinusitis persisting this long suggests bacterial
/// superinfection.
const BACTERIAL_GATE_DAYS: f64 = 10.0;

pub fn score(payload: &CasePayload, features: &FeatureMap) -> ScoreMap {
    let mut map = ScoreMap::new();
    let nasal = features.nasal_obstruction || features.rhinorrhea;

    if nasal && (features.facial_pressure || features.smell_loss) {
        if features.anosmia_complete {
            map.set(POLYPOID_CRS, 0.90, Some("obstrução nasal com perda completa do olfato"));
        } else {
            map.set(PROBABLE_CRS, 0.75, Some("sintomas nasais com pressão facial ou hiposmia"));
        }
    }

    let afebrile_discharge = features.rhinorrhea && !features.fever;
    if features.nasal_itch || (features.sneezing && !features.fever) || afebrile_discharge {
        map.raise(ALLERGIC, 0.85, Some("prurido ou espirros sem febre"));
    }

    if nasal || features.sneezing {
        map.raise(COMMON_COLD, 0.80, None);
    }

    if nasal && features.facial_pressure {
        let long_course = payload
            .duration_days
            .is_some_and(|d| d >= BACTERIAL_GATE_DAYS);
        let biphasic = payload.trajectory == Some(Trajectory::BiphasicWorsening);
        if (long_course || biphasic) && features.purulence {
            map.set(BACTERIAL_SINUSITIS, 0.80, Some("curso prolongado ou bifásico com secreção purulenta"));
            map.set(VIRAL_SINUSITIS, 0.20, None);
        } else {
            map.set(VIRAL_SINUSITIS, 0.55, Some("pressão facial com sintomas nasais"));
        }
    }

    if features.nosebleed {
        map.raise(EPISTAXIS, 0.70, Some("sangramento nasal relatado"));
    }

    if features.anosmia_complete && !nasal {
        map.raise(ANOSMIA, 0.50, Some("anosmia sem obstrução que a explique"));
    }

    map
}
