//! Wire DTOs for the `/api/triage` and `/api/interview` endpoints.

use serde::{Deserialize, Serialize};

use crate::models::{
    CasePayload, CareLevel, DifferentialCandidate, Domain, PainSeverity, Question, Sex,
    Trajectory,
};

/// Request body for `/api/triage`. The case state rides twice: as
/// machine-readable fields and folded into the narrative's context
/// block, so the backend prompt needs no re-assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteTriageRequest {
    /// Narrative plus a structured context block.
    pub narrative: String,
    pub language: String,
    pub age: Option<u32>,
    pub sex: Option<Sex>,
    pub domain: Option<Domain>,
    pub duration_days: Option<f64>,
    /// Duration exactly as the user phrased it.
    pub duration_raw: Option<String>,
    pub trajectory: Option<Trajectory>,
    pub max_fever_c: Option<f64>,
    pub pain: Option<PainSeverity>,
    pub pain_scale: Option<u8>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub negated: Vec<String>,
    #[serde(default)]
    pub red_flags_reported: Vec<String>,
    #[serde(default)]
    pub comorbidities: Vec<String>,
    #[serde(default)]
    pub medications: Vec<String>,
    /// Local top differentials, so the backend can agree or dissent.
    #[serde(default)]
    pub local_differentials: Vec<DifferentialCandidate>,
    #[serde(default)]
    pub answered: Vec<QaPair>,
    /// Escalation-mode hint, e.g. "balanced".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
}

impl RemoteTriageRequest {
    /// Build the request from a payload. Structured signals are folded
    /// into a `[CONTEXTO]` block so the backend sees everything the
    /// local engine knows, not only the raw narrative.
    pub fn from_case(
        payload: &CasePayload,
        local_differentials: &[DifferentialCandidate],
        answered: &[QaPair],
        language: &str,
    ) -> Self {
        let mut context: Vec<String> = Vec::new();
        if let Some(age) = payload.age {
            context.push(format!("idade: {age}"));
        }
        if let Some(sex) = payload.sex {
            context.push(format!("sexo: {}", sex.code()));
        }
        if let Some(domain) = payload.domain {
            context.push(format!("dominio: {domain}"));
        }
        if let Some(days) = payload.duration_days {
            context.push(format!("duracao_dias: {days}"));
        }
        if let Some(fever) = payload.max_fever_c {
            context.push(format!("febre_max_c: {fever}"));
        }
        if !payload.symptoms.is_empty() {
            let ids: Vec<&str> = payload.symptoms.iter().map(String::as_str).collect();
            context.push(format!("sintomas: {}", ids.join(", ")));
        }
        if !payload.negated.is_empty() {
            let ids: Vec<&str> = payload.negated.iter().map(String::as_str).collect();
            context.push(format!("negados: {}", ids.join(", ")));
        }
        if !payload.red_flags.is_empty() {
            let ids: Vec<&str> = payload.red_flags.iter().map(String::as_str).collect();
            context.push(format!("alertas_relatados: {}", ids.join(", ")));
        }

        let narrative = if context.is_empty() {
            payload.free_text.clone()
        } else {
            format!("{}\n[CONTEXTO]\n{}", payload.free_text, context.join("\n"))
        };

        Self {
            narrative,
            language: language.to_string(),
            age: payload.age,
            sex: payload.sex,
            domain: payload.domain,
            duration_days: payload.duration_days,
            duration_raw: payload.duration_raw.clone(),
            trajectory: payload.trajectory,
            max_fever_c: payload.max_fever_c,
            pain: payload.pain,
            pain_scale: payload.pain_scale,
            symptoms: payload.symptoms.iter().cloned().collect(),
            negated: payload.negated.iter().cloned().collect(),
            red_flags_reported: payload.red_flags.iter().cloned().collect(),
            comorbidities: payload.comorbidities.clone(),
            medications: payload.medications.clone(),
            local_differentials: local_differentials.to_vec(),
            answered: answered.to_vec(),
            strategy: None,
        }
    }

    pub fn with_strategy(mut self, strategy: &str) -> Self {
        self.strategy = Some(strategy.to_string());
        self
    }
}

/// Response body from `/api/triage`. `differentials` is the one field
/// the contract requires; everything else tolerates absence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteTriageResponse {
    pub differentials: Vec<DifferentialCandidate>,
    #[serde(default)]
    pub red_flags: Vec<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub next_steps: Vec<String>,
    #[serde(default)]
    pub care_level: CareLevel,
    #[serde(default)]
    pub safety_note: Option<String>,
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// One answered follow-up, echoed back to the backend for context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

/// What the interview endpoint is being asked to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewGoal {
    NextQuestion,
    ConfirmSummary,
}

/// Request body for `/api/interview`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewRequest {
    pub narrative: String,
    pub language: String,
    pub goal: InterviewGoal,
    #[serde(default)]
    pub answered: Vec<QaPair>,
}

/// Response body from `/api/interview`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterviewResponse {
    #[serde(default)]
    pub question: Option<Question>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub done: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Domain, Sex};

    #[test]
    fn context_block_carries_structured_signals() {
        let mut payload = CasePayload::default();
        payload.append_free_text("dor de garganta forte");
        payload.merge_demographics(Some(25), Some(Sex::Female));
        payload.set_domain(Domain::Throat);
        payload.duration_days = Some(5.0);
        payload.set_symptoms(["febre"]);

        let req = RemoteTriageRequest::from_case(&payload, &[], &[], "pt-BR");
        assert!(req.narrative.starts_with("dor de garganta forte"));
        assert!(req.narrative.contains("[CONTEXTO]"));
        assert!(req.narrative.contains("idade: 25"));
        assert!(req.narrative.contains("sexo: F"));
        assert!(req.narrative.contains("dominio: garganta"));
        assert!(req.narrative.contains("duracao_dias: 5"));
        assert!(req.narrative.contains("sintomas: febre"));
    }

    #[test]
    fn request_carries_the_structured_case_fields() {
        let mut payload = CasePayload::default();
        payload.merge_demographics(Some(62), Some(Sex::Male));
        payload.set_domain(Domain::Ear);
        payload.duration_days = Some(2.0);
        payload.duration_raw = Some("2 dias".to_string());
        payload.trajectory = Some(crate::models::Trajectory::Worsening);
        payload.max_fever_c = Some(38.2);
        payload.pain = Some(crate::models::PainSeverity::Moderate);
        payload.set_symptoms(["otalgia"]);
        payload.set_red_flags(["otorreia com sangue"]);
        payload.set_comorbidities(["diabetes"]);
        payload.set_medications(["metformina"]);
        payload.negated.insert("tosse".to_string());

        let req = RemoteTriageRequest::from_case(&payload, &[], &[], "pt-BR");
        assert_eq!(req.age, Some(62));
        assert_eq!(req.sex, Some(Sex::Male));
        assert_eq!(req.domain, Some(Domain::Ear));
        assert_eq!(req.duration_days, Some(2.0));
        assert_eq!(req.duration_raw.as_deref(), Some("2 dias"));
        assert_eq!(req.trajectory, Some(crate::models::Trajectory::Worsening));
        assert_eq!(req.pain, Some(crate::models::PainSeverity::Moderate));
        assert_eq!(req.symptoms, vec!["otalgia".to_string()]);
        assert_eq!(req.negated, vec!["tosse".to_string()]);
        assert_eq!(req.red_flags_reported, vec!["otorreia com sangue".to_string()]);
        assert_eq!(req.comorbidities, vec!["diabetes".to_string()]);
        assert_eq!(req.medications, vec!["metformina".to_string()]);

        let wire = serde_json::to_value(&req).unwrap();
        assert_eq!(wire["sex"], "M");
        assert_eq!(wire["domain"], "ouvido");
        assert_eq!(wire["trajectory"], "piorando");
        assert_eq!(wire["comorbidities"][0], "diabetes");
    }

    #[test]
    fn bare_narrative_has_no_context_block() {
        let mut payload = CasePayload::default();
        payload.append_free_text("zumbido no ouvido");
        let req = RemoteTriageRequest::from_case(&payload, &[], &[], "pt-BR");
        assert_eq!(req.narrative, "zumbido no ouvido");
    }

    #[test]
    fn response_requires_differentials() {
        let err = serde_json::from_str::<RemoteTriageResponse>(r#"{ "red_flags": [] }"#);
        assert!(err.is_err());

        let ok: RemoteTriageResponse = serde_json::from_str(
            r#"{ "differentials": [ { "label": "Otite externa", "probability": 0.7 } ] }"#,
        )
        .unwrap();
        assert_eq!(ok.differentials.len(), 1);
        assert_eq!(ok.care_level, CareLevel::None);
        assert!(ok.questions.is_empty());
    }

    #[test]
    fn interview_goal_wire_values() {
        assert_eq!(
            serde_json::to_string(&InterviewGoal::NextQuestion).unwrap(),
            "\"next_question\""
        );
    }
}
