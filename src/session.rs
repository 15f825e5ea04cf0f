//! Triage session: owns the case payload across turns, runs the local
//! pipeline, applies the escalation policy, and supersedes stale
//! remote calls.
//!
//! Concurrency model: each `run_turn` takes a monotonically increasing
//! turn number from a `watch` channel. An in-flight remote call races
//! against the channel advancing past its turn; whichever side loses
//! is dropped, and results only commit to the session caches while
//! their turn is still the latest. A remote response can therefore
//! never overwrite the state of a newer turn.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use uuid::Uuid;

use crate::config::{TriageConfig, MAX_FOLLOWUP_QUESTIONS};
use crate::models::{CasePayload, DifferentialCandidate, Domain, LocalReport, Question, RedFlagReport, Sex};
use crate::pipeline::followup;
use crate::pipeline::parser::{self, detect_red_flags, fold};
use crate::pipeline::policy::{self, DecisionRecord};
use crate::pipeline::remote::{
    blend, interview, HttpTriageBackend, QaPair, RemoteError, RemoteTriageRequest,
    RemoteTriageResponse, TriageBackend,
};
use crate::pipeline::scoring::{score_case, RuleTable};
use crate::pipeline::{features, TriageError};

/// Everything one turn produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TriageOutcome {
    pub local: LocalReport,
    pub remote: Option<RemoteTriageResponse>,
    /// Final ranked differential (blended when a remote answer
    /// arrived, otherwise the local list).
    pub blended: Vec<DifferentialCandidate>,
    pub red_flags: Vec<String>,
    pub questions: Vec<Question>,
    pub decision: DecisionRecord,
    /// True when a remote call was attempted and failed; the outcome
    /// then carries local results only.
    pub remote_fallback: bool,
}

#[derive(Debug, Default)]
struct SessionState {
    payload: CasePayload,
    previous: Option<CasePayload>,
    last_outcome: Option<TriageOutcome>,
    rules: Option<RuleTable>,
    rules_url: Option<String>,
    answered: Vec<QaPair>,
}

/// One user's triage conversation.
pub struct TriageSession<B = HttpTriageBackend> {
    id: Uuid,
    config: TriageConfig,
    backend: Option<B>,
    state: Mutex<SessionState>,
    latest_turn: watch::Sender<u64>,
}

impl TriageSession<HttpTriageBackend> {
    /// Session with the production HTTP backend.
    pub fn new(config: TriageConfig) -> Result<Self, RemoteError> {
        let backend = HttpTriageBackend::new(config.base_url.clone(), config.timeout)?;
        Ok(Self::with_backend(config, backend))
    }

    /// Session that never calls out, regardless of policy.
    pub fn local_only(config: TriageConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            backend: None,
            state: Mutex::new(SessionState::default()),
            latest_turn: watch::Sender::new(0),
        }
    }
}

impl<B: TriageBackend> TriageSession<B> {
    /// Session over an arbitrary backend implementation.
    pub fn with_backend(config: TriageConfig, backend: B) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            backend: Some(backend),
            state: Mutex::new(SessionState::default()),
            latest_turn: watch::Sender::new(0),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── payload input ────────────────────────────────────────────────

    pub fn update_demographics(&self, age: Option<u32>, sex: Option<Sex>) {
        self.state().payload.merge_demographics(age, sex);
    }

    pub fn set_symptoms<I, S>(&self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state().payload.set_symptoms(ids);
    }

    pub fn set_red_flags<I, S>(&self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state().payload.set_red_flags(ids);
    }

    pub fn add_free_text(&self, text: &str) {
        self.state().payload.append_free_text(text);
    }

    pub fn set_domain(&self, domain: Domain) {
        self.state().payload.set_domain(domain);
    }

    pub fn set_comorbidities<I, S>(&self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state().payload.set_comorbidities(items);
    }

    pub fn set_medications<I, S>(&self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state().payload.set_medications(items);
    }

    /// Record an answered follow-up. Answers also feed the narrative so
    /// the parser can pick up signals phrased in them.
    pub fn record_answer(&self, question: &str, answer: &str) {
        let mut state = self.state();
        state.answered.push(QaPair {
            question: question.to_string(),
            answer: answer.to_string(),
        });
        let line = format!("{question} {answer}");
        state.payload.append_free_text(&line);
    }

    /// Start over with an empty payload. A loaded rule table survives.
    pub fn reset(&self) {
        let mut state = self.state();
        state.payload = CasePayload::default();
        state.previous = None;
        state.last_outcome = None;
        state.answered.clear();
    }

    // ── snapshots ────────────────────────────────────────────────────

    pub fn payload_snapshot(&self) -> CasePayload {
        self.state().payload.clone()
    }

    pub fn last_outcome(&self) -> Option<TriageOutcome> {
        self.state().last_outcome.clone()
    }

    // ── rule table ───────────────────────────────────────────────────

    /// Install a rule table directly (offline bundles, tests).
    pub fn set_rule_table(&self, table: RuleTable) {
        self.state().rules = Some(table);
    }

    /// Fetch and install a rule table. Already-loaded URLs are not
    /// fetched again; on failure the previously loaded table (if any)
    /// stays active.
    pub async fn load_rule_table(&self, url: &str) -> Result<(), TriageError> {
        {
            let state = self.state();
            if state.rules.is_some() && state.rules_url.as_deref() == Some(url) {
                return Ok(());
            }
        }
        let response = reqwest::get(url)
            .await
            .map_err(|e| TriageError::RuleTableFetch(e.to_string()))?;
        if !response.status().is_success() {
            return Err(TriageError::RuleTableFetch(format!(
                "status {}",
                response.status().as_u16()
            )));
        }
        let raw = response
            .text()
            .await
            .map_err(|e| TriageError::RuleTableFetch(e.to_string()))?;
        let table = RuleTable::from_json(&raw)?;

        let mut state = self.state();
        state.rules = Some(table);
        state.rules_url = Some(url.to_string());
        tracing::info!(url, "rule table loaded");
        Ok(())
    }

    // ── evaluation ───────────────────────────────────────────────────

    /// Run one full turn: enrich the payload from its narrative, score
    /// locally, consult the policy, optionally call the backend, and
    /// commit the result if this turn is still the latest.
    pub async fn run_turn(&self) -> TriageOutcome {
        let mut turn = 0u64;
        self.latest_turn.send_modify(|t| {
            *t += 1;
            turn = *t;
        });
        let mut supersede_rx = self.latest_turn.subscribe();

        let (payload, previous, rules, answered) = {
            let mut state = self.state();
            enrich(&mut state.payload);
            (
                state.payload.clone(),
                state.previous.clone(),
                state.rules.clone(),
                state.answered.clone(),
            )
        };
        tracing::debug!(session = %self.id, turn, "evaluating triage turn");

        let extracted = features::extract_features(&payload);
        let mut local = score_case(&payload, &extracted.map, rules.as_ref());

        let mut patterns: Vec<String> = payload.red_flags.iter().cloned().collect();
        for flag in detect_red_flags(&fold(&payload.free_text)) {
            if !patterns.contains(&flag) {
                patterns.push(flag);
            }
        }
        patterns.sort();
        local.red_flags = RedFlagReport {
            any: !patterns.is_empty(),
            patterns,
        };
        local.gaps.unknown_symptoms = extracted.unknown_symptoms.clone();
        local.gaps.questions = followup::questions_for(&payload, &local.list);

        let decision = policy::decide(self.config.mode, &payload, previous.as_ref(), &local, false);

        let mut remote: Option<RemoteTriageResponse> = None;
        let mut remote_fallback = false;
        if decision.should_call_remote {
            if let Some(backend) = &self.backend {
                let request = RemoteTriageRequest::from_case(
                    &payload,
                    &local.list,
                    &answered,
                    &self.config.language,
                )
                .with_strategy(self.config.mode.as_str());
                let result = tokio::select! {
                    response = backend.triage(request) => response,
                    _ = wait_for_supersede(&mut supersede_rx, turn) => Err(RemoteError::Superseded),
                };
                match result {
                    Ok(response) => remote = Some(response),
                    Err(RemoteError::Superseded) => {
                        tracing::debug!(session = %self.id, turn, "remote call superseded by a newer turn");
                    }
                    Err(err) => {
                        tracing::warn!(session = %self.id, turn, error = %err, "remote triage failed, degrading to local result");
                        remote_fallback = true;
                    }
                }
            }
        }

        let blended = match &remote {
            Some(response) => blend::blend_differentials(
                &local.list,
                &response.differentials,
                self.config.remote_weight,
            ),
            None => local.list.clone(),
        };
        let red_flags = match &remote {
            Some(response) => blend::merge_red_flags(&local.red_flags.patterns, &response.red_flags),
            None => local.red_flags.patterns.clone(),
        };
        let questions = match &remote {
            Some(response) => blend::merge_questions(
                &local.gaps.questions,
                &response.questions,
                MAX_FOLLOWUP_QUESTIONS,
            ),
            None => local.gaps.questions.clone(),
        };

        let outcome = TriageOutcome {
            local,
            remote,
            blended,
            red_flags,
            questions,
            decision,
            remote_fallback,
        };

        // A stale turn must not touch the caches.
        if *self.latest_turn.borrow() == turn {
            let mut state = self.state();
            state.previous = Some(payload);
            state.last_outcome = Some(outcome.clone());
        }
        outcome
    }

    /// Ask the backend for the next interview question; local-only
    /// sessions get the fixed safety question.
    pub async fn next_interview_question(&self) -> Result<Option<Question>, RemoteError> {
        let (payload, answered) = {
            let state = self.state();
            (state.payload.clone(), state.answered.clone())
        };
        match &self.backend {
            Some(backend) => {
                interview::next_question(backend, &payload, &answered, &self.config.language).await
            }
            None => Ok(Some(interview::fallback_question())),
        }
    }
}

/// Fill unknown payload fields from the narrative. Additive only: an
/// explicitly known value is never overwritten, negations union, and
/// repeated enrichment of the same payload is a fixed point.
fn enrich(payload: &mut CasePayload) {
    let parsed = parser::parse_narrative(&payload.free_text);
    if payload.duration_days.is_none() {
        if let Some(duration) = parsed.duration {
            payload.duration_days = Some(duration.days);
            payload.duration_raw = Some(duration.raw);
        }
    }
    if payload.trajectory.is_none() {
        payload.trajectory = parsed.trajectory;
    }
    if payload.max_fever_c.is_none() {
        payload.max_fever_c = parsed.max_fever_c;
    }
    if payload.pain.is_none() {
        if let Some(pain) = parsed.pain {
            payload.pain = Some(pain.severity);
            payload.pain_scale = pain.scale;
        }
    }
    payload.negated.extend(parsed.negated);
    if payload.domain.is_none() {
        payload.domain = parsed.domain;
    }
}

async fn wait_for_supersede(rx: &mut watch::Receiver<u64>, turn: u64) {
    // The watch read guard is not Send; it must be dropped before any
    // further await point or the whole turn future stops being
    // spawnable.
    let superseded = rx.wait_for(|latest| *latest > turn).await.is_ok();
    if !superseded {
        // Sender dropped without a newer turn: never supersede.
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    use tokio::sync::Notify;

    use crate::pipeline::remote::types::{InterviewRequest, InterviewResponse};

    fn remote_response(label: &str, probability: f64) -> RemoteTriageResponse {
        RemoteTriageResponse {
            differentials: vec![DifferentialCandidate::new(label, probability)],
            ..Default::default()
        }
    }

    struct CountingBackend {
        calls: Arc<AtomicUsize>,
        response: RemoteTriageResponse,
    }

    impl TriageBackend for CountingBackend {
        async fn triage(
            &self,
            _request: RemoteTriageRequest,
        ) -> Result<RemoteTriageResponse, RemoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }

        async fn interview(
            &self,
            _request: InterviewRequest,
        ) -> Result<InterviewResponse, RemoteError> {
            Ok(InterviewResponse::default())
        }
    }

    /// Remembers the last triage request so tests can inspect the wire
    /// contract.
    struct CapturingBackend {
        last_request: Arc<Mutex<Option<RemoteTriageRequest>>>,
    }

    impl TriageBackend for CapturingBackend {
        async fn triage(
            &self,
            request: RemoteTriageRequest,
        ) -> Result<RemoteTriageResponse, RemoteError> {
            *self
                .last_request
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = Some(request);
            Ok(remote_response("Qualquer", 0.5))
        }

        async fn interview(
            &self,
            _request: InterviewRequest,
        ) -> Result<InterviewResponse, RemoteError> {
            Ok(InterviewResponse::default())
        }
    }

    struct FailingBackend;

    impl TriageBackend for FailingBackend {
        async fn triage(
            &self,
            _request: RemoteTriageRequest,
        ) -> Result<RemoteTriageResponse, RemoteError> {
            Err(RemoteError::Connection("connection refused".into()))
        }

        async fn interview(
            &self,
            _request: InterviewRequest,
        ) -> Result<InterviewResponse, RemoteError> {
            Err(RemoteError::Connection("connection refused".into()))
        }
    }

    /// First triage call parks until superseded; later calls answer
    /// immediately. Lets the test hold a turn in flight
    /// deterministically.
    struct GatedBackend {
        started: Arc<Notify>,
        first: AtomicBool,
    }

    impl TriageBackend for GatedBackend {
        async fn triage(
            &self,
            _request: RemoteTriageRequest,
        ) -> Result<RemoteTriageResponse, RemoteError> {
            if self.first.swap(false, Ordering::SeqCst) {
                self.started.notify_one();
                std::future::pending::<()>().await;
                unreachable!()
            }
            Ok(remote_response("Resposta nova", 0.8))
        }

        async fn interview(
            &self,
            _request: InterviewRequest,
        ) -> Result<InterviewResponse, RemoteError> {
            Ok(InterviewResponse::default())
        }
    }

    #[test]
    fn turn_futures_are_spawnable() {
        fn require_send<T: Send>(_: T) {}
        let session = TriageSession::local_only(TriageConfig::default());
        require_send(session.run_turn());
    }

    #[tokio::test]
    async fn local_only_end_to_end_throat_case() {
        let session = TriageSession::local_only(TriageConfig::default());
        session.update_demographics(Some(25), None);
        session.add_free_text("dor de garganta há 5 dias, piorando, sem tosse");

        let outcome = session.run_turn().await;
        assert!(outcome.remote.is_none());
        assert!(!outcome.remote_fallback);
        assert_eq!(outcome.blended[0].label, "Faringite viral");
        assert!(outcome.local.confidence > 0.5);

        let payload = session.payload_snapshot();
        assert_eq!(payload.domain, Some(Domain::Throat));
        assert_eq!(payload.duration_days, Some(5.0));
        assert!(payload.negated.contains("tosse"));
    }

    #[tokio::test]
    async fn denied_fever_does_not_erase_the_complaint() {
        let session = TriageSession::local_only(TriageConfig::default());
        session.update_demographics(Some(30), None);
        session.add_free_text("sem febre, dor de garganta ha 2 dias");

        let outcome = session.run_turn().await;
        assert!(!outcome.blended.is_empty());
        assert_eq!(outcome.blended[0].label, "Faringite viral");

        let payload = session.payload_snapshot();
        assert_eq!(payload.domain, Some(Domain::Throat));
        assert!(payload.negated.contains("febre"));
        assert!(!payload.negated.contains("dor_de_garganta"));
    }

    #[tokio::test]
    async fn repeated_turns_without_changes_are_idempotent() {
        let session = TriageSession::local_only(TriageConfig::default());
        session.add_free_text("dor de ouvido desde ontem");

        let first = session.run_turn().await;
        let second = session.run_turn().await;
        assert_eq!(first.local, second.local);
        assert_eq!(first.blended, second.blended);
        assert!(first.decision.significant_change);
        assert!(!second.decision.significant_change);
    }

    #[tokio::test]
    async fn demographics_only_never_reaches_the_backend() {
        let calls = Arc::new(AtomicUsize::new(0));
        let backend = CountingBackend {
            calls: calls.clone(),
            response: remote_response("Qualquer", 0.9),
        };
        let session = TriageSession::with_backend(TriageConfig::default(), backend);
        session.update_demographics(Some(40), Some(Sex::Male));

        let outcome = session.run_turn().await;
        assert!(outcome.decision.demographics_only);
        assert!(outcome.remote.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn remote_answer_is_blended_into_the_differential() {
        let calls = Arc::new(AtomicUsize::new(0));
        let backend = CountingBackend {
            calls: calls.clone(),
            response: remote_response("Faringite viral", 0.9),
        };
        let session = TriageSession::with_backend(TriageConfig::default(), backend);
        session.update_demographics(Some(25), None);
        session.add_free_text("dor de garganta há 5 dias, piorando, sem tosse");

        let outcome = session.run_turn().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let remote = outcome.remote.as_ref().unwrap();
        assert_eq!(remote.differentials[0].label, "Faringite viral");

        let local_p = outcome.local.list[0].probability;
        let expected = 0.4 * local_p + 0.6 * 0.9;
        let blended_p = outcome.blended[0].probability;
        assert!((blended_p - expected).abs() < 1e-9, "blended = {blended_p}");
        assert_eq!(outcome.blended[0].source.as_deref(), Some("blend"));
    }

    #[tokio::test]
    async fn intake_lists_reach_the_remote_request() {
        let last_request = Arc::new(Mutex::new(None));
        let backend = CapturingBackend {
            last_request: last_request.clone(),
        };
        let session = TriageSession::with_backend(TriageConfig::default(), backend);
        session.update_demographics(Some(58), Some(Sex::Female));
        session.set_comorbidities(["diabetes"]);
        session.set_medications(["insulina"]);
        session.add_free_text("dor de garganta ha 2 dias");

        session.run_turn().await;
        let request = last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .unwrap();
        assert_eq!(request.age, Some(58));
        assert_eq!(request.comorbidities, vec!["diabetes".to_string()]);
        assert_eq!(request.medications, vec!["insulina".to_string()]);
        assert_eq!(request.duration_days, Some(2.0));
        assert_eq!(request.strategy.as_deref(), Some("balanced"));
    }

    #[tokio::test]
    async fn backend_failure_degrades_to_local_results() {
        let session = TriageSession::with_backend(TriageConfig::default(), FailingBackend);
        session.add_free_text("zumbido constante ha 2 dias");

        let outcome = session.run_turn().await;
        assert!(outcome.remote_fallback);
        assert!(outcome.remote.is_none());
        assert_eq!(outcome.blended, outcome.local.list);
    }

    #[tokio::test]
    async fn superseded_turn_does_not_commit() {
        let started = Arc::new(Notify::new());
        let backend = GatedBackend {
            started: started.clone(),
            first: AtomicBool::new(true),
        };
        let session = Arc::new(TriageSession::with_backend(TriageConfig::default(), backend));
        session.add_free_text("dor de garganta forte");

        let stale_session = session.clone();
        let stale = tokio::spawn(async move { stale_session.run_turn().await });
        started.notified().await;

        // New information arrives while the first call is in flight.
        session.add_free_text("agora com falta de ar");
        let fresh = session.run_turn().await;
        let stale = stale.await.unwrap();

        // The stale turn lost the race: local-only, nothing committed.
        assert!(stale.remote.is_none());
        assert!(!stale.remote_fallback);
        assert_eq!(
            fresh.remote.as_ref().unwrap().differentials[0].label,
            "Resposta nova"
        );

        let committed = session.last_outcome().unwrap();
        assert_eq!(committed.blended, fresh.blended);
        assert!(committed.red_flags.contains(&"dispneia".to_string()));
    }

    #[tokio::test]
    async fn red_flags_from_text_and_checklist_are_merged_sorted() {
        let session = TriageSession::local_only(TriageConfig::default());
        session.add_free_text("dor de garganta e falta de ar");
        session.set_red_flags(["estridor"]);

        let outcome = session.run_turn().await;
        assert!(outcome.local.red_flags.any);
        assert_eq!(
            outcome.local.red_flags.patterns,
            vec!["dispneia".to_string(), "estridor".to_string()]
        );
        assert!(outcome.decision.red_flag);
        assert!(outcome.decision.should_call_remote || outcome.remote.is_none());
    }

    #[tokio::test]
    async fn rule_table_blend_changes_scores() {
        let session = TriageSession::local_only(TriageConfig::default());
        session.add_free_text("dor de garganta, sem tosse");
        let baseline = session.run_turn().await;

        session.set_rule_table(
            RuleTable::from_json(
                r#"{ "domains": { "garganta": { "diagnoses": [
                    { "name": "Faringite viral", "prior": 0.9 }
                ] } } }"#,
            )
            .unwrap(),
        );
        let tabled = session.run_turn().await;

        let viral_before = baseline
            .local
            .list
            .iter()
            .find(|c| c.label == "Faringite viral")
            .unwrap()
            .probability;
        let viral_after = tabled
            .local
            .list
            .iter()
            .find(|c| c.label == "Faringite viral")
            .unwrap()
            .probability;
        assert!((viral_after - viral_before).abs() > 1e-6);
    }

    #[tokio::test]
    async fn unknown_symptoms_surface_as_gaps() {
        let session = TriageSession::local_only(TriageConfig::default());
        session.set_symptoms(["otalgia", "sintoma_misterioso"]);

        let outcome = session.run_turn().await;
        assert_eq!(
            outcome.local.gaps.unknown_symptoms,
            vec!["sintoma_misterioso".to_string()]
        );
    }

    #[tokio::test]
    async fn reset_clears_the_case_but_keeps_rules() {
        let session = TriageSession::local_only(TriageConfig::default());
        session.set_rule_table(RuleTable::default());
        session.add_free_text("dor de ouvido");
        session.run_turn().await;

        session.reset();
        assert!(session.payload_snapshot().is_demographics_only());
        assert!(session.last_outcome().is_none());
        // Rules survive: a new turn still scores with the table.
        assert!(session.state().rules.is_some());
    }

    #[tokio::test]
    async fn local_only_interview_uses_the_safety_fallback() {
        let session = TriageSession::local_only(TriageConfig::default());
        let question = session.next_interview_question().await.unwrap().unwrap();
        assert!(question.text.contains("sinal de alerta"));
    }

    #[tokio::test]
    async fn answers_feed_back_into_the_narrative() {
        let session = TriageSession::local_only(TriageConfig::default());
        session.add_free_text("dor de ouvido");
        session.record_answer("Há quantos dias os sintomas começaram?", "ha 3 dias");

        let outcome = session.run_turn().await;
        assert_eq!(session.payload_snapshot().duration_days, Some(3.0));
        // The onset question is now answered and no longer asked.
        assert!(!outcome
            .questions
            .iter()
            .any(|q| q.text.contains("quantos dias")));
    }
}
