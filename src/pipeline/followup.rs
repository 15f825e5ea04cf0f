//! Follow-up question generation.
//!
//! Questions are keyed off the ranked differentials: each template
//! fires when its matcher appears in a candidate label. Questions
//! whose answer is already present in the payload (onset, trajectory,
//! fever) are suppressed, duplicates collapse, and the list is capped.

use std::sync::LazyLock;

use crate::config::MAX_FOLLOWUP_QUESTIONS;
use crate::models::{CasePayload, DifferentialCandidate, Question};
use crate::pipeline::parser::fold;

/// Which payload signal answers a template, for suppression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnsweredBy {
    Onset,
    Trajectory,
    Fever,
    Pain,
}

struct Template {
    /// Substring matched against the folded candidate label.
    matcher: &'static str,
    text: &'static str,
    answered_by: Option<AnsweredBy>,
}

static TEMPLATES: LazyLock<Vec<Template>> = LazyLock::new(|| {
    vec![
        Template {
            matcher: "otite externa",
            text: "A dor piora quando você puxa ou aperta a orelha?",
            answered_by: None,
        },
        Template {
            matcher: "otite media",
            text: "Você teve gripe ou resfriado nos últimos dias?",
            answered_by: None,
        },
        Template {
            matcher: "disfuncao tub",
            text: "A sensação de ouvido tampado muda quando você boceja ou engole?",
            answered_by: None,
        },
        Template {
            matcher: "otite serosa",
            text: "A sensação de ouvido tampado muda quando você boceja ou engole?",
            answered_by: None,
        },
        Template {
            matcher: "perda auditiva subita",
            text: "A perda de audição começou de repente, de um dia para o outro?",
            answered_by: Some(AnsweredBy::Onset),
        },
        Template {
            matcher: "zumbido puls",
            text: "O zumbido acompanha as batidas do seu coração?",
            answered_by: None,
        },
        Template {
            matcher: "rinossinusite cronica",
            text: "Os sintomas nasais duram mais de três meses?",
            answered_by: Some(AnsweredBy::Onset),
        },
        Template {
            matcher: "rinite al",
            text: "Os sintomas pioram perto de poeira, mofo ou animais?",
            answered_by: None,
        },
        Template {
            matcher: "rinite inespec",
            text: "A secreção do nariz é clara ou amarelada?",
            answered_by: None,
        },
        Template {
            matcher: "resfriado",
            text: "A secreção do nariz é clara ou amarelada?",
            answered_by: None,
        },
        Template {
            matcher: "faringite estrept",
            text: "Você consegue ver placas brancas na garganta?",
            answered_by: None,
        },
        Template {
            matcher: "gabhs",
            text: "Você teve febre medida acima de 38°C?",
            answered_by: Some(AnsweredBy::Fever),
        },
        Template {
            matcher: "faringite viral",
            text: "Você está com tosse ou coriza junto com a dor de garganta?",
            answered_by: None,
        },
        Template {
            matcher: "mononucleose",
            text: "Você sente um cansaço fora do comum há vários dias?",
            answered_by: None,
        },
        Template {
            matcher: "disfonia",
            text: "A rouquidão está presente há mais de três semanas?",
            answered_by: Some(AnsweredBy::Onset),
        },
        Template {
            matcher: "rouquid",
            text: "A rouquidão está presente há mais de três semanas?",
            answered_by: Some(AnsweredBy::Onset),
        },
        Template {
            matcher: "linfadenite",
            text: "O caroço no pescoço está dolorido ao toque?",
            answered_by: None,
        },
        Template {
            matcher: "linfadenop",
            text: "O caroço está crescendo, diminuindo ou estável?",
            answered_by: Some(AnsweredBy::Trajectory),
        },
    ]
});

// Generic fallbacks so the user is never left without a next step.
// The first has no suppression signal on purpose.
static GENERIC: LazyLock<Vec<Template>> = LazyLock::new(|| {
    vec![
        Template {
            matcher: "",
            text: "Algum outro sintoma apareceu junto com esse quadro?",
            answered_by: None,
        },
        Template {
            matcher: "",
            text: "Há quantos dias os sintomas começaram?",
            answered_by: Some(AnsweredBy::Onset),
        },
        Template {
            matcher: "",
            text: "Desde que começou, está piorando, melhorando ou igual?",
            answered_by: Some(AnsweredBy::Trajectory),
        },
        Template {
            matcher: "",
            text: "A dor é leve, moderada ou forte?",
            answered_by: Some(AnsweredBy::Pain),
        },
    ]
});

const DEFAULT_OPTIONS: [&str; 3] = ["Sim", "Não", "Não sei"];

fn is_answered(template: &Template, payload: &CasePayload) -> bool {
    match template.answered_by {
        Some(AnsweredBy::Onset) => payload.duration_days.is_some(),
        Some(AnsweredBy::Trajectory) => payload.trajectory.is_some(),
        Some(AnsweredBy::Fever) => payload.max_fever_c.is_some(),
        Some(AnsweredBy::Pain) => payload.pain.is_some(),
        None => false,
    }
}

/// Build the follow-up question list for a ranked differential.
pub fn questions_for(
    payload: &CasePayload,
    differentials: &[DifferentialCandidate],
) -> Vec<Question> {
    fn push(out: &mut Vec<Question>, text: &str) {
        if out.len() < MAX_FOLLOWUP_QUESTIONS && !out.iter().any(|q| q.text == text) {
            out.push(Question::new(text, &DEFAULT_OPTIONS));
        }
    }

    let mut out: Vec<Question> = Vec::new();
    for candidate in differentials {
        let label = fold(&candidate.label);
        for template in TEMPLATES.iter() {
            if label.contains(template.matcher) && !is_answered(template, payload) {
                push(&mut out, template.text);
            }
        }
    }

    if out.is_empty() {
        for template in GENERIC.iter() {
            if !is_answered(template, payload) {
                push(&mut out, template.text);
            }
        }
    }

    out
}
