//! Throat heuristics: Centor/McIsaac pharyngitis scoring plus a
//! dysphonia overlay.

use crate::models::CasePayload;
use crate::pipeline::features::FeatureMap;

use super::bayes::{centor_likelihood_ratio, post_test_probability};
use super::ScoreMap;

const GABHS: &str = "Faringite estreptocócica (GABHS)";
const VIRAL: &str = "Faringite viral";
const MONO: &str = "Mononucleose infecciosa";
const LARYNGITIS: &str = "Laringite aguda";
const CHRONIC_DYSPHONIA: &str = "Disfonia crônica (avaliação otorrinolaringológica)";
const LARYNGEAL_ALARM: &str = "Suspeita de lesão laríngea";

/// Age assumed when the user has not answered the intake question.
const DEFAULT_AGE: u32 = 30;

/// Dysphonia persisting this long stops being "acute".
const CHRONIC_DYSPHONIA_DAYS: f64 = 28.0;

pub fn score(payload: &CasePayload, features: &FeatureMap) -> ScoreMap {
    let mut map = ScoreMap::new();
    let age = payload.age.unwrap_or(DEFAULT_AGE);

    if features.sore_throat || features.tonsil_exudate {
        let mut centor = 0i32;
        let mut notes: Vec<&str> = Vec::new();
        if features.tonsil_exudate {
            centor += 1;
            notes.push("exsudato amigdaliano");
        }
        if features.neck_nodes {
            centor += 1;
            notes.push("linfonodos cervicais");
        }
        if features.fever {
            centor += 1;
            notes.push("febre");
        }
        if !features.cough {
            centor += 1;
            notes.push("ausência de tosse");
        }
        // McIsaac age adjustment; children also carry a higher
        // pre-test probability.
        let pre_test = if (3..=14).contains(&age) {
            centor += 1;
            0.25
        } else {
            if age >= 45 {
                centor -= 1;
            }
            0.10
        };

        let gabhs = post_test_probability(pre_test, centor_likelihood_ratio(centor));
        map.set(GABHS, gabhs, None);
        for note in notes {
            map.raise(GABHS, 0.0, Some(note));
        }

        let mono = if features.tonsil_exudate && features.extreme_fatigue {
            map.set(MONO, 0.70, Some("exsudato com fadiga intensa"));
            0.70
        } else {
            map.set(MONO, 0.05, None);
            0.05
        };

        map.set(VIRAL, (1.0 - gabhs - mono).max(0.0), None);
        if features.cough {
            map.raise(VIRAL, 0.0, Some("tosse presente"));
        }
    }

    if features.hoarseness {
        let alarming =
            features.blood_in_saliva || features.weight_loss || features.neck_nodes;
        if alarming {
            map.raise(LARYNGEAL_ALARM, 1.0, Some("disfonia com sinais de alarme"));
        } else if payload
            .duration_days
            .is_some_and(|d| d >= CHRONIC_DYSPHONIA_DAYS)
        {
            map.raise(CHRONIC_DYSPHONIA, 0.60, Some("rouquidão persistente"));
        } else {
            map.raise(LARYNGITIS, 0.60, Some("rouquidão recente"));
        }
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn throat_payload(age: u32) -> CasePayload {
        CasePayload {
            age: Some(age),
            ..Default::default()
        }
    }

    #[test]
    fn classic_strep_presentation_scores_high() {
        let mut f = FeatureMap::default();
        f.sore_throat = true;
        f.tonsil_exudate = true;
        f.neck_nodes = true;
        f.fever = true;
        // No cough: Centor 4 at age 25.
        let map = score(&throat_payload(25), &f);
        let gabhs = map.get(GABHS).unwrap();
        assert!(gabhs > 0.35, "gabhs = {gabhs}");
    }

    #[test]
    fn cough_pushes_toward_viral() {
        let mut f = FeatureMap::default();
        f.sore_throat = true;
        f.cough = true;
        let map = score(&throat_payload(25), &f);
        let gabhs = map.get(GABHS).unwrap();
        let viral = map.get(VIRAL).unwrap();
        assert!(viral > gabhs);
        assert!(gabhs < 0.05);
    }

    #[test]
    fn adding_fever_never_lowers_gabhs() {
        let mut without = FeatureMap::default();
        without.sore_throat = true;
        let mut with = without.clone();
        with.fever = true;

        let p_without = score(&throat_payload(25), &without).get(GABHS).unwrap();
        let p_with = score(&throat_payload(25), &with).get(GABHS).unwrap();
        assert!(p_with >= p_without);
    }

    #[test]
    fn child_gets_age_point_and_higher_pretest() {
        let mut f = FeatureMap::default();
        f.sore_throat = true;
        let child = score(&throat_payload(8), &f).get(GABHS).unwrap();
        let adult = score(&throat_payload(30), &f).get(GABHS).unwrap();
        let older = score(&throat_payload(60), &f).get(GABHS).unwrap();
        assert!(child > adult);
        assert!(older < adult);
    }

    #[test]
    fn unknown_age_behaves_like_default_adult() {
        let mut f = FeatureMap::default();
        f.sore_throat = true;
        let mut no_age = CasePayload::default();
        no_age.age = None;
        assert_eq!(
            score(&no_age, &f).get(GABHS),
            score(&throat_payload(30), &f).get(GABHS)
        );
    }

    #[test]
    fn exudate_with_fatigue_raises_mono() {
        let mut f = FeatureMap::default();
        f.sore_throat = true;
        f.tonsil_exudate = true;
        f.extreme_fatigue = true;
        let map = score(&throat_payload(19), &f);
        assert_eq!(map.get(MONO), Some(0.70));
    }

    #[test]
    fn recent_hoarseness_is_acute_laryngitis() {
        let mut f = FeatureMap::default();
        f.hoarseness = true;
        let mut p = throat_payload(40);
        p.duration_days = Some(3.0);
        let map = score(&p, &f);
        assert_eq!(map.get(LARYNGITIS), Some(0.60));
        assert!(map.get(CHRONIC_DYSPHONIA).is_none());
    }

    #[test]
    fn month_long_hoarseness_is_chronic() {
        let mut f = FeatureMap::default();
        f.hoarseness = true;
        let mut p = throat_payload(40);
        p.duration_days = Some(35.0);
        let map = score(&p, &f);
        assert_eq!(map.get(CHRONIC_DYSPHONIA), Some(0.60));
    }

    #[test]
    fn hoarseness_with_blood_is_an_alarm() {
        let mut f = FeatureMap::default();
        f.hoarseness = true;
        f.blood_in_saliva = true;
        let map = score(&throat_payload(55), &f);
        assert_eq!(map.get(LARYNGEAL_ALARM), Some(1.0));
    }
}
