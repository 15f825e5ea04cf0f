//! Feature extraction: checklist identifiers plus narrative text are
//! folded into one boolean feature map the scoring strategies consume.
//!
//! Precedence: a feature is present when the checklist asserts it or
//! the (negation-stripped) text mentions it; a textual negation forces
//! it absent unless the checklist explicitly asserts the same
//! identifier. Unrecognized checklist ids are reported back as gaps,
//! never silently dropped.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::CasePayload;
use crate::pipeline::parser::{self, feature_key_for, strip_negations};

/// Checklist-asserted fever only counts as febrile at or above this.
const FEBRILE_THRESHOLD_C: f64 = 37.8;

/// Boolean clinical findings, one field per recognized feature.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMap {
    pub fever: bool,
    pub cough: bool,
    pub sore_throat: bool,
    pub tonsil_exudate: bool,
    pub hoarseness: bool,
    pub blood_in_saliva: bool,
    pub extreme_fatigue: bool,
    pub nasal_obstruction: bool,
    pub rhinorrhea: bool,
    pub facial_pressure: bool,
    pub smell_loss: bool,
    pub anosmia_complete: bool,
    pub taste_loss: bool,
    pub sneezing: bool,
    pub nasal_itch: bool,
    pub purulence: bool,
    pub nosebleed: bool,
    pub ear_pain: bool,
    pub ear_fullness: bool,
    pub ear_discharge: bool,
    pub hearing_loss: bool,
    pub ear_itch: bool,
    pub tragal_pain: bool,
    pub after_pool: bool,
    pub recent_uri: bool,
    pub chewing_pain: bool,
    pub tinnitus: bool,
    pub pulsatile_tinnitus: bool,
    pub sudden_onset: bool,
    pub unilateral: bool,
    pub dizziness: bool,
    pub presyncope: bool,
    pub neck_nodes: bool,
    pub weight_loss: bool,
    pub night_sweats: bool,
    pub halitosis: bool,
    pub globus: bool,
    pub dysphagia: bool,
    pub snoring: bool,
    pub headache: bool,
}

impl FeatureMap {
    /// Look a feature up by its canonical key.
    pub fn get(&self, key: &str) -> Option<bool> {
        Some(match key {
            "fever" => self.fever,
            "cough" => self.cough,
            "sore_throat" => self.sore_throat,
            "tonsil_exudate" => self.tonsil_exudate,
            "hoarseness" => self.hoarseness,
            "blood_in_saliva" => self.blood_in_saliva,
            "extreme_fatigue" => self.extreme_fatigue,
            "nasal_obstruction" => self.nasal_obstruction,
            "rhinorrhea" => self.rhinorrhea,
            "facial_pressure" => self.facial_pressure,
            "smell_loss" => self.smell_loss,
            "anosmia_complete" => self.anosmia_complete,
            "taste_loss" => self.taste_loss,
            "sneezing" => self.sneezing,
            "nasal_itch" => self.nasal_itch,
            "purulence" => self.purulence,
            "nosebleed" => self.nosebleed,
            "ear_pain" => self.ear_pain,
            "ear_fullness" => self.ear_fullness,
            "ear_discharge" => self.ear_discharge,
            "hearing_loss" => self.hearing_loss,
            "ear_itch" => self.ear_itch,
            "tragal_pain" => self.tragal_pain,
            "after_pool" => self.after_pool,
            "recent_uri" => self.recent_uri,
            "chewing_pain" => self.chewing_pain,
            "tinnitus" => self.tinnitus,
            "pulsatile_tinnitus" => self.pulsatile_tinnitus,
            "sudden_onset" => self.sudden_onset,
            "unilateral" => self.unilateral,
            "dizziness" => self.dizziness,
            "presyncope" => self.presyncope,
            "neck_nodes" => self.neck_nodes,
            "weight_loss" => self.weight_loss,
            "night_sweats" => self.night_sweats,
            "halitosis" => self.halitosis,
            "globus" => self.globus,
            "dysphagia" => self.dysphagia,
            "snoring" => self.snoring,
            "headache" => self.headache,
            _ => return None,
        })
    }

    /// Set a feature by key. Returns false for unknown keys.
    pub fn set(&mut self, key: &str, value: bool) -> bool {
        let slot: &mut bool = match key {
            "fever" => &mut self.fever,
            "cough" => &mut self.cough,
            "sore_throat" => &mut self.sore_throat,
            "tonsil_exudate" => &mut self.tonsil_exudate,
            "hoarseness" => &mut self.hoarseness,
            "blood_in_saliva" => &mut self.blood_in_saliva,
            "extreme_fatigue" => &mut self.extreme_fatigue,
            "nasal_obstruction" => &mut self.nasal_obstruction,
            "rhinorrhea" => &mut self.rhinorrhea,
            "facial_pressure" => &mut self.facial_pressure,
            "smell_loss" => &mut self.smell_loss,
            "anosmia_complete" => &mut self.anosmia_complete,
            "taste_loss" => &mut self.taste_loss,
            "sneezing" => &mut self.sneezing,
            "nasal_itch" => &mut self.nasal_itch,
            "purulence" => &mut self.purulence,
            "nosebleed" => &mut self.nosebleed,
            "ear_pain" => &mut self.ear_pain,
            "ear_fullness" => &mut self.ear_fullness,
            "ear_discharge" => &mut self.ear_discharge,
            "hearing_loss" => &mut self.hearing_loss,
            "ear_itch" => &mut self.ear_itch,
            "tragal_pain" => &mut self.tragal_pain,
            "after_pool" => &mut self.after_pool,
            "recent_uri" => &mut self.recent_uri,
            "chewing_pain" => &mut self.chewing_pain,
            "tinnitus" => &mut self.tinnitus,
            "pulsatile_tinnitus" => &mut self.pulsatile_tinnitus,
            "sudden_onset" => &mut self.sudden_onset,
            "unilateral" => &mut self.unilateral,
            "dizziness" => &mut self.dizziness,
            "presyncope" => &mut self.presyncope,
            "neck_nodes" => &mut self.neck_nodes,
            "weight_loss" => &mut self.weight_loss,
            "night_sweats" => &mut self.night_sweats,
            "halitosis" => &mut self.halitosis,
            "globus" => &mut self.globus,
            "dysphagia" => &mut self.dysphagia,
            "snoring" => &mut self.snoring,
            "headache" => &mut self.headache,
            _ => return false,
        };
        *slot = value;
        true
    }
}

/// The feature map plus what could not be mapped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFeatures {
    pub map: FeatureMap,
    /// Checklist ids with no known alias, in submission order.
    pub unknown_symptoms: Vec<String>,
    /// The raw checklist ids, for conflict detection downstream.
    pub checklist: BTreeSet<String>,
}

// Checklist id / rule label aliases, keyed by the normalized form
// (folded, underscores as spaces).
static ALIASES: LazyLock<Vec<(&'static str, &'static str)>> = LazyLock::new(|| {
    vec![
        ("febre", "fever"),
        ("tosse", "cough"),
        ("dor de garganta", "sore_throat"),
        ("placas na garganta", "tonsil_exudate"),
        ("pus na garganta", "tonsil_exudate"),
        ("exsudato amigdaliano", "tonsil_exudate"),
        ("rouquidao", "hoarseness"),
        ("disfonia", "hoarseness"),
        ("sangue na saliva", "blood_in_saliva"),
        ("cansaco extremo", "extreme_fatigue"),
        ("fadiga", "extreme_fatigue"),
        ("nariz entupido", "nasal_obstruction"),
        ("obstrucao nasal", "nasal_obstruction"),
        ("coriza", "rhinorrhea"),
        ("pressao na face", "facial_pressure"),
        ("dor facial", "facial_pressure"),
        ("perda de olfato", "smell_loss"),
        ("anosmia", "anosmia_complete"),
        ("perda de paladar", "taste_loss"),
        ("espirros", "sneezing"),
        ("coceira no nariz", "nasal_itch"),
        ("secrecao amarela", "purulence"),
        ("secrecao purulenta", "purulence"),
        ("sangramento nasal", "nosebleed"),
        ("epistaxe", "nosebleed"),
        ("otalgia", "ear_pain"),
        ("dor de ouvido", "ear_pain"),
        ("ouvido tampado", "ear_fullness"),
        ("plenitude auricular", "ear_fullness"),
        ("otorreia", "ear_discharge"),
        ("secrecao no ouvido", "ear_discharge"),
        ("perda auditiva", "hearing_loss"),
        ("coceira no ouvido", "ear_itch"),
        ("dor ao tocar a orelha", "tragal_pain"),
        ("dor no tragus", "tragal_pain"),
        ("depois de piscina", "after_pool"),
        ("natacao recente", "after_pool"),
        ("gripe recente", "recent_uri"),
        ("resfriado recente", "recent_uri"),
        ("dor ao mastigar", "chewing_pain"),
        ("zumbido", "tinnitus"),
        ("zumbido pulsatil", "pulsatile_tinnitus"),
        ("inicio subito", "sudden_onset"),
        ("unilateral", "unilateral"),
        ("so de um lado", "unilateral"),
        ("tontura", "dizziness"),
        ("vertigem", "dizziness"),
        ("quase desmaio", "presyncope"),
        ("pre sincope", "presyncope"),
        ("ganglios no pescoco", "neck_nodes"),
        ("linfonodos aumentados", "neck_nodes"),
        ("ingua", "neck_nodes"),
        ("perda de peso", "weight_loss"),
        ("suor noturno", "night_sweats"),
        ("suores noturnos", "night_sweats"),
        ("mau halito", "halitosis"),
        ("halitose", "halitosis"),
        ("bolo na garganta", "globus"),
        ("globus", "globus"),
        ("dificuldade para engolir", "dysphagia"),
        ("disfagia", "dysphagia"),
        ("ronco", "snoring"),
        ("dor de cabeca", "headache"),
        ("cefaleia", "headache"),
    ]
});

// Narrative patterns per feature, matched against negation-stripped
// folded text.
static TEXT_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    vec![
        ("fever", Regex::new(r"\bfebre\b|\bfebril\b").unwrap()),
        ("cough", Regex::new(r"\btosse\b|tossindo").unwrap()),
        (
            "sore_throat",
            Regex::new(r"dor\s+(?:de|na)\s+garganta|garganta\s+(?:doendo|inflamada)").unwrap(),
        ),
        (
            "tonsil_exudate",
            Regex::new(r"placas?\s+na\s+garganta|pus\s+na\s+(?:garganta|amigdala)|exsudato").unwrap(),
        ),
        (
            "hoarseness",
            Regex::new(r"\brouquidao\b|\brouco\b|\brouca\b|\bdisfonia\b|perda\s+da\s+voz").unwrap(),
        ),
        (
            "blood_in_saliva",
            Regex::new(r"sangue\s+na\s+saliva|cuspindo\s+sangue|saliva\s+com\s+sangue").unwrap(),
        ),
        (
            "extreme_fatigue",
            Regex::new(r"cansaco\s+extremo|muito\s+cansad|fadiga\s+intensa|exaust").unwrap(),
        ),
        (
            "nasal_obstruction",
            Regex::new(r"nariz\s+entupido|\bentupid\w+|congestao\s+nasal|obstrucao\s+nasal").unwrap(),
        ),
        (
            "rhinorrhea",
            Regex::new(r"\bcoriza\b|nariz\s+escorrendo|escorrendo\s+o\s+nariz").unwrap(),
        ),
        (
            "facial_pressure",
            Regex::new(r"pressao\s+n[ao]\s+(?:face|rosto)|dor\s+facial|peso\s+no\s+rosto").unwrap(),
        ),
        (
            "smell_loss",
            Regex::new(r"perda\s+d[eo]\s+olfato|olfato\s+diminuido").unwrap(),
        ),
        (
            "anosmia_complete",
            Regex::new(r"\banosmia\b|perda\s+total\s+do\s+olfato").unwrap(),
        ),
        (
            "taste_loss",
            Regex::new(r"perda\s+d[eo]\s+paladar|paladar\s+diminuido").unwrap(),
        ),
        ("sneezing", Regex::new(r"espirro|espirrando").unwrap()),
        (
            "nasal_itch",
            Regex::new(r"coceira\s+no\s+nariz|nariz\s+cocando").unwrap(),
        ),
        (
            "purulence",
            Regex::new(r"secrecao\s+(?:amarela|esverdeada|purulenta)|catarro\s+(?:amarelo|verde)|pus\s+no\s+nariz")
                .unwrap(),
        ),
        (
            "nosebleed",
            Regex::new(r"\bepistaxe\b|sangramento\s+nasal|sangrando\s+pelo\s+nariz|nariz\s+sangrando")
                .unwrap(),
        ),
        (
            "ear_pain",
            Regex::new(r"dor\s+(?:de|no)\s+ouvido|\botalgia\b|ouvido\s+doendo").unwrap(),
        ),
        (
            "ear_fullness",
            Regex::new(r"ouvido\s+(?:tampado|entupido)|\bplenitude\b|pressao\s+no\s+ouvido").unwrap(),
        ),
        (
            "ear_discharge",
            Regex::new(r"\botorreia\b|secrecao\s+no\s+ouvido|ouvido\s+escorrendo|saindo\s+liquido\s+do\s+ouvido")
                .unwrap(),
        ),
        (
            "hearing_loss",
            Regex::new(r"perda\s+auditiva|ouvindo\s+menos|audicao\s+diminuida|\bsurdez\b").unwrap(),
        ),
        (
            "ear_itch",
            Regex::new(r"coceira\s+no\s+ouvido|ouvido\s+cocando").unwrap(),
        ),
        (
            "tragal_pain",
            Regex::new(r"dor\s+ao\s+(?:tocar|puxar)\s+a\s+orelha|\btragus\b").unwrap(),
        ),
        (
            "after_pool",
            Regex::new(r"\bpiscina\b|\bnatacao\b|mergulh|depois\s+de\s+nadar").unwrap(),
        ),
        (
            "recent_uri",
            Regex::new(r"gripe\s+recente|resfriado\s+recente|\bgripad\w+|\bresfriad\w+").unwrap(),
        ),
        (
            "chewing_pain",
            Regex::new(r"dor\s+ao\s+mastigar|mastigar\s+doi|dor\s+na\s+mandibula").unwrap(),
        ),
        (
            "tinnitus",
            Regex::new(r"\bzumbido\b|apito\s+no\s+ouvido|chiado\s+no\s+ouvido").unwrap(),
        ),
        (
            "pulsatile_tinnitus",
            Regex::new(r"zumbido\s+pulsatil|zumbido\s+que\s+pulsa|pulsando\s+no\s+ouvido").unwrap(),
        ),
        (
            "sudden_onset",
            Regex::new(r"\bsubit\w+|de\s+repente|de\s+uma\s+hora\s+pra\s+outra").unwrap(),
        ),
        (
            "unilateral",
            Regex::new(r"\bunilateral\b|so\s+(?:de|em)\s+um\s+lado|apenas\s+(?:de\s+)?um\s+lado|ouvido\s+(?:direito|esquerdo)")
                .unwrap(),
        ),
        (
            "dizziness",
            Regex::new(r"\btontura\b|\bvertigem\b|\btont[oa]\b").unwrap(),
        ),
        (
            "presyncope",
            Regex::new(r"quase\s+desmai\w+|pre\s+sincope|sensacao\s+de\s+desmaio").unwrap(),
        ),
        (
            "neck_nodes",
            Regex::new(r"\bganglio\w*\b|\blinfonodo\w*\b|\bingua\b|caroco\s+no\s+pescoco").unwrap(),
        ),
        (
            "weight_loss",
            Regex::new(r"perda\s+de\s+peso|perdendo\s+peso|emagrec").unwrap(),
        ),
        (
            "night_sweats",
            Regex::new(r"suor(?:es)?\s+noturno|suando\s+a\s+noite").unwrap(),
        ),
        ("halitosis", Regex::new(r"mau\s+halito|\bhalitose\b").unwrap()),
        (
            "globus",
            Regex::new(r"bolo\s+na\s+garganta|\bglobus\b|algo\s+parado\s+na\s+garganta").unwrap(),
        ),
        (
            "dysphagia",
            Regex::new(r"dificuldade\s+(?:para|de)\s+engolir|\bdisfagia\b|nao\s+consigo\s+engolir|doi\s+(?:para|ao)\s+engolir")
                .unwrap(),
        ),
        ("snoring", Regex::new(r"\bronco\b|roncando").unwrap()),
        (
            "headache",
            Regex::new(r"dor\s+de\s+cabeca|\bcefaleia\b").unwrap(),
        ),
    ]
});

// Affirmations phrased as negations ("não sinto cheiro") would be
// blanked by negation stripping; they are matched on the raw text.
static RAW_SMELL_LOSS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"nao\s+sinto\s+(?:o\s+)?cheiro|sem\s+olfato").unwrap());
static RAW_TASTE_LOSS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"nao\s+sinto\s+(?:o\s+)?gosto|sem\s+paladar").unwrap());

fn normalize_id(id: &str) -> String {
    parser::fold(id).replace('_', " ").trim().to_string()
}

fn alias_lookup(normalized: &str) -> Option<&'static str> {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|(_, key)| *key)
}

/// True when the checklist explicitly asserts the given symptom id
/// (compared under normalization).
pub fn checklist_asserts(checklist: &BTreeSet<String>, token: &str) -> bool {
    let token = normalize_id(token);
    checklist.iter().any(|id| normalize_id(id) == token)
}

/// Build the feature map for a payload.
pub fn extract_features(payload: &CasePayload) -> ExtractedFeatures {
    let folded = parser::fold(&payload.free_text);
    let stripped = strip_negations(&folded);

    let mut map = FeatureMap::default();
    let mut unknown = Vec::new();

    for (key, re) in TEXT_PATTERNS.iter() {
        if re.is_match(&stripped) {
            map.set(key, true);
        }
    }
    if RAW_SMELL_LOSS_RE.is_match(&folded) {
        map.smell_loss = true;
    }
    if RAW_TASTE_LOSS_RE.is_match(&folded) {
        map.taste_loss = true;
    }
    if payload.max_fever_c.is_some_and(|c| c >= FEBRILE_THRESHOLD_C) {
        map.fever = true;
    }

    for id in &payload.symptoms {
        match alias_lookup(&normalize_id(id)) {
            Some(key) => {
                map.set(key, true);
            }
            None => unknown.push(id.clone()),
        }
    }

    // Checklist assertion outranks textual negation for the same id.
    for token in &payload.negated {
        if checklist_asserts(&payload.symptoms, token) {
            continue;
        }
        if let Some(key) = feature_key_for(token) {
            map.set(key, false);
        }
    }

    if map.pulsatile_tinnitus {
        map.tinnitus = true;
    }
    if map.anosmia_complete {
        map.smell_loss = true;
    }

    ExtractedFeatures {
        map,
        unknown_symptoms: unknown,
        checklist: payload.symptoms.clone(),
    }
}
