//! Alarm-sign detection in narrative text.
//!
//! Each pattern maps to a stable identifier surfaced to the caller and
//! to the escalation policy. These never lower urgency; a match always
//! escalates.

use std::sync::LazyLock;

use regex::Regex;

static PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    vec![
        (
            "dispneia",
            Regex::new(r"falta\s+de\s+ar|dificuldade\s+(?:para|de)\s+respirar|\bdispneia\b|nao\s+consigo\s+respirar")
                .unwrap(),
        ),
        (
            "estridor",
            Regex::new(r"\bestridor\b|chiado\s+ao\s+respirar|barulho\s+ao\s+puxar\s+o\s+ar").unwrap(),
        ),
        (
            "dor_intensa",
            Regex::new(r"pior\s+dor\s+da\s+(?:minha\s+)?vida|dor\s+insuportavel|dor\s+lancinante").unwrap(),
        ),
        (
            "sangramento_ativo",
            Regex::new(r"sangramento\s+(?:ativo|intenso|que\s+nao\s+para)|sangrando\s+muito|nao\s+para\s+de\s+sangrar")
                .unwrap(),
        ),
        (
            "rigidez_pescoco",
            Regex::new(r"rigidez\s+(?:de|no)\s+pescoco|pescoco\s+duro|nao\s+consigo\s+mexer\s+o\s+pescoco")
                .unwrap(),
        ),
        (
            "alteracao_neurologica",
            Regex::new(r"\bconfusao\b|\bdesmaio\w*\b|\bdesmaiei\b|visao\s+dupla|fala\s+enrolada|\bconvulsao\b")
                .unwrap(),
        ),
    ]
});

/// Identifiers of every alarm pattern present in the folded text,
/// in table order.
pub fn detect_red_flags(folded: &str) -> Vec<String> {
    PATTERNS
        .iter()
        .filter(|(_, re)| re.is_match(folded))
        .map(|(id, _)| id.to_string())
        .collect()
}
