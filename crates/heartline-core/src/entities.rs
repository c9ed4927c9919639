//! Entity extraction: dictionary lookups over the normalized transcript.
//!
//! At most one value per entity kind; the first vocabulary entry that matches
//! wins. Kinds with no match are left out of the map entirely.

use crate::patterns::normalize;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of structured fact pulled from a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Condition,
    Severity,
    Timeframe,
    Symptom,
}

/// Cardiovascular conditions the risk model reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    HeartAttack,
    Stroke,
    HeartFailure,
    Arrhythmia,
}

impl Condition {
    /// Key used in entity maps and in `risk_data`.
    pub fn key(&self) -> &'static str {
        match self {
            Self::HeartAttack => "heart_attack",
            Self::Stroke => "stroke",
            Self::HeartFailure => "heart_failure",
            Self::Arrhythmia => "arrhythmia",
        }
    }

    /// Spoken form.
    pub fn label(&self) -> &'static str {
        match self {
            Self::HeartAttack => "heart attack",
            Self::Stroke => "stroke",
            Self::HeartFailure => "heart failure",
            Self::Arrhythmia => "arrhythmia",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "heart_attack" => Some(Self::HeartAttack),
            "stroke" => Some(Self::Stroke),
            "heart_failure" => Some(Self::HeartFailure),
            "arrhythmia" => Some(Self::Arrhythmia),
            _ => None,
        }
    }
}

const CONDITION_VOCAB: &[(&str, Condition)] = &[
    (r"\bheart attacks?\b", Condition::HeartAttack),
    (r"\bstrokes?\b", Condition::Stroke),
    (r"\bheart failure\b", Condition::HeartFailure),
    (r"\b(arrhythmias?|irregular heart ?beat)\b", Condition::Arrhythmia),
];

const SEVERITY_VOCAB: &[(&str, &str)] = &[
    (r"\b(severe|serious|bad|terrible|unbearable|urgent|urgently|emergency)\b", "high"),
    (r"\bmoderate\b", "medium"),
    (r"\b(mild|slight|little)\b", "low"),
];

const TIMEFRAME_VOCAB: &[(&str, &str)] = &[
    (r"\b(now|current|currently|today)\b", "current"),
    (r"\b(last|previous|recent|recently)\b", "recent"),
];

const SYMPTOM_VOCAB: &[(&str, &str)] = &[
    (r"\bchest pains?\b", "chest_pain"),
    (r"\b(shortness of breath|short of breath|can'?t breathe)\b", "shortness_of_breath"),
    (r"\b(dizziness|dizzy)\b", "dizziness"),
    (r"\bpalpitations?\b", "palpitations"),
];

struct Vocabulary {
    kind: EntityKind,
    entries: Vec<(Regex, &'static str)>,
}

impl Vocabulary {
    fn compile(kind: EntityKind, table: &[(&'static str, &'static str)]) -> Self {
        let entries = table
            .iter()
            .filter_map(|(pattern, value)| match Regex::new(pattern) {
                Ok(r) => Some((r, *value)),
                Err(e) => {
                    tracing::error!(target: "heartline::coach", "Bad entity pattern {}: {}", pattern, e);
                    None
                }
            })
            .collect();
        Self { kind, entries }
    }

    fn first_match(&self, normalized: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(r, _)| r.is_match(normalized))
            .map(|(_, v)| *v)
    }
}

static VOCABULARIES: Lazy<Vec<Vocabulary>> = Lazy::new(|| {
    let conditions: Vec<(&'static str, &'static str)> =
        CONDITION_VOCAB.iter().map(|(p, c)| (*p, c.key())).collect();
    vec![
        Vocabulary::compile(EntityKind::Condition, &conditions),
        Vocabulary::compile(EntityKind::Severity, SEVERITY_VOCAB),
        Vocabulary::compile(EntityKind::Timeframe, TIMEFRAME_VOCAB),
        Vocabulary::compile(EntityKind::Symptom, SYMPTOM_VOCAB),
    ]
});

/// Entity kind -> extracted value. Built fresh per request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityMap(BTreeMap<EntityKind, String>);

impl EntityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: EntityKind, value: impl Into<String>) {
        self.0.insert(kind, value.into());
    }

    pub fn get(&self, kind: EntityKind) -> Option<&str> {
        self.0.get(&kind).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn condition(&self) -> Option<Condition> {
        self.get(EntityKind::Condition).and_then(Condition::from_key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityKind, &String)> {
        self.0.iter()
    }
}

/// Scan a transcript for condition, severity, timeframe, and symptom words.
pub fn extract(text: &str) -> EntityMap {
    let normalized = normalize(text);
    let mut entities = EntityMap::new();
    if normalized.is_empty() {
        return entities;
    }
    for vocab in VOCABULARIES.iter() {
        if let Some(value) = vocab.first_match(&normalized) {
            entities.insert(vocab.kind, value);
        }
    }
    entities
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heart_attack_question_yields_only_condition() {
        let e = extract("What is my heart attack risk?");
        assert_eq!(e.get(EntityKind::Condition), Some("heart_attack"));
        assert_eq!(e.len(), 1);
        assert_eq!(e.condition(), Some(Condition::HeartAttack));
    }

    #[test]
    fn severity_words_map_to_levels() {
        assert_eq!(extract("mild discomfort").get(EntityKind::Severity), Some("low"));
        assert_eq!(extract("moderate pain").get(EntityKind::Severity), Some("medium"));
        assert_eq!(extract("severe pain").get(EntityKind::Severity), Some("high"));
        assert_eq!(extract("I need emergency help").get(EntityKind::Severity), Some("high"));
        assert_eq!(extract("it's urgent").get(EntityKind::Severity), Some("high"));
    }

    #[test]
    fn absent_kinds_are_omitted() {
        let e = extract("hello there");
        assert!(e.is_empty());
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn only_one_condition_is_kept() {
        let e = extract("stroke or heart attack, which is worse");
        assert_eq!(e.get(EntityKind::Condition), Some("heart_attack"));
    }

    #[test]
    fn symptom_and_timeframe() {
        let e = extract("I have chest pain right now");
        assert_eq!(e.get(EntityKind::Symptom), Some("chest_pain"));
        assert_eq!(e.get(EntityKind::Timeframe), Some("current"));
    }

    #[test]
    fn word_boundaries_prevent_partial_hits() {
        // "badge" must not read as severity "bad".
        assert_eq!(extract("my badge number").get(EntityKind::Severity), None);
    }

    #[test]
    fn serializes_with_snake_case_keys() {
        let e = extract("severe stroke symptoms");
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["condition"], "stroke");
        assert_eq!(json["severity"], "high");
    }
}
