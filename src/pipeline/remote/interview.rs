//! Sequential interview: one backend-chosen question per call, with a
//! fixed safety question as the degraded-mode fallback.

use crate::models::{CasePayload, Question};

use super::client::TriageBackend;
use super::types::{InterviewGoal, InterviewRequest, QaPair};
use super::RemoteError;

/// Asked when the backend cannot be reached. Screening for alarm signs
/// is the one question that is always worth asking.
pub fn fallback_question() -> Question {
    Question::new(
        "Você tem algum sinal de alerta, como dificuldade para respirar, para engolir ou sangramento?",
        &["Sim", "Não"],
    )
}

/// Ask the backend for the next interview question. Falls back to the
/// fixed safety question on any remote failure except supersession.
pub async fn next_question<B: TriageBackend>(
    backend: &B,
    payload: &CasePayload,
    answered: &[QaPair],
    language: &str,
) -> Result<Option<Question>, RemoteError> {
    let request = InterviewRequest {
        narrative: payload.free_text.clone(),
        language: language.to_string(),
        goal: InterviewGoal::NextQuestion,
        answered: answered.to_vec(),
    };

    match backend.interview(request).await {
        Ok(response) if response.done => Ok(None),
        Ok(response) => Ok(response.question.or_else(|| Some(fallback_question()))),
        Err(RemoteError::Superseded) => Err(RemoteError::Superseded),
        Err(err) => {
            tracing::warn!(error = %err, "interview backend failed, using safety fallback");
            Ok(Some(fallback_question()))
        }
    }
}
