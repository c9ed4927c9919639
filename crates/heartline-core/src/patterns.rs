//! Pattern registry: ordered (regex, intent) table and the first-match classifier.
//!
//! Rules are evaluated top to bottom against the normalized transcript and the
//! first hit wins; table order is the only tie-break. Confidence is the fixed
//! constant attached to the winning rule, not a measure of match quality.

use crate::intent::Intent;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Whole-phrase rules ("explain my results", "chest pain").
pub const EXACT_PHRASE_CONFIDENCE: f32 = 0.95;
/// Keyword co-occurrence rules ("show ... risk").
pub const KEYWORD_CONFIDENCE: f32 = 0.9;
/// Single loose keyword rules ("next", "again").
pub const LOOSE_CONFIDENCE: f32 = 0.8;
/// Reported when nothing in the table matches.
pub const UNKNOWN_CONFIDENCE: f32 = 0.3;

/// One row of the static rule table.
#[derive(Debug, Clone, Copy)]
pub struct PatternRule {
    pub pattern: &'static str,
    pub intent: Intent,
    pub confidence: f32,
}

const fn rule(pattern: &'static str, intent: Intent, confidence: f32) -> PatternRule {
    PatternRule {
        pattern,
        intent,
        confidence,
    }
}

/// Emergency rules sit first so a safety phrase is never shadowed by a broader
/// rule further down. They deliberately do not match a bare "help", which would
/// swallow "help me understand my score".
const RULE_TABLE: &[PatternRule] = &[
    // emergency_help
    rule(r"\b(emergency|911|ambulance)\b", Intent::EmergencyHelp, EXACT_PHRASE_CONFIDENCE),
    rule(r"\bchest pains?\b", Intent::EmergencyHelp, EXACT_PHRASE_CONFIDENCE),
    rule(
        r"\bi('m| am| think i'?m| might be| may be) having an? (heart attack|stroke)\b",
        Intent::EmergencyHelp,
        EXACT_PHRASE_CONFIDENCE,
    ),
    rule(r"\b(can'?t|cannot) breathe\b|\bshortness of breath\b", Intent::EmergencyHelp, KEYWORD_CONFIDENCE),
    rule(r"\b(call|need) (a |my |the )?doctor\b", Intent::EmergencyHelp, KEYWORD_CONFIDENCE),
    rule(r"\burgent(ly)?\b", Intent::EmergencyHelp, KEYWORD_CONFIDENCE),
    rule(r"\b(i need|get me|send) help\b", Intent::EmergencyHelp, KEYWORD_CONFIDENCE),
    rule(r"\bfeel(ing)? (really |very )?(bad|terrible|awful)\b", Intent::EmergencyHelp, LOOSE_CONFIDENCE),
    // explain_results
    rule(r"\bwhat does (this|that|it) mean\b", Intent::ExplainResults, EXACT_PHRASE_CONFIDENCE),
    rule(r"\bexplain (my )?results?\b", Intent::ExplainResults, EXACT_PHRASE_CONFIDENCE),
    rule(
        r"\b(explain|what does|help me understand|interpret)\b.*\b(results?|scores?|means?|risk)\b",
        Intent::ExplainResults,
        KEYWORD_CONFIDENCE,
    ),
    // start_assessment
    rule(r"\bnew assessment\b|\btake a test\b", Intent::StartAssessment, EXACT_PHRASE_CONFIDENCE),
    rule(
        r"\b(start|begin|new|take|retake)\b.*\b(assessment|test|evaluation|check-?up)\b",
        Intent::StartAssessment,
        KEYWORD_CONFIDENCE,
    ),
    // medication_reminder
    rule(
        r"\b(medications?|medicines?|pills?|drugs?)\b.*\b(reminders?|remind|alerts?)\b",
        Intent::MedicationReminder,
        KEYWORD_CONFIDENCE,
    ),
    rule(r"\bremind\b.*\b(medications?|medicines?|pills?)\b", Intent::MedicationReminder, KEYWORD_CONFIDENCE),
    rule(r"\btake\b.*\bmedicines?\b", Intent::MedicationReminder, LOOSE_CONFIDENCE),
    // lifestyle_tips
    rule(r"\blifestyle tips?\b|\btip of the day\b", Intent::LifestyleTips, EXACT_PHRASE_CONFIDENCE),
    rule(
        r"\blifestyle\b.*\b(tips?|advice|changes?|suggestions?)\b",
        Intent::LifestyleTips,
        KEYWORD_CONFIDENCE,
    ),
    rule(r"\bhow (can i|to|do i) improve\b", Intent::LifestyleTips, KEYWORD_CONFIDENCE),
    // health_tips
    rule(r"\bhealth advice\b", Intent::HealthTips, EXACT_PHRASE_CONFIDENCE),
    rule(
        r"\b(health|fitness|heart)\b.*\b(tips?|advice|suggestions?|recommendations?)\b",
        Intent::HealthTips,
        KEYWORD_CONFIDENCE,
    ),
    rule(r"\b(give me|any) (some )?(tips?|advice)\b", Intent::HealthTips, LOOSE_CONFIDENCE),
    // show_risk
    rule(
        r"\b(heart attack|stroke|cardiovascular|heart failure|arrhythmia) risk\b",
        Intent::ShowRisk,
        EXACT_PHRASE_CONFIDENCE,
    ),
    rule(
        r"\b(show|what|what's|current|my)\b.*\b(risks?|scores?|levels?|chances?|likelihood|odds)\b",
        Intent::ShowRisk,
        KEYWORD_CONFIDENCE,
    ),
    // next_question
    rule(r"\bnext question\b|\bcontinue assessment\b", Intent::NextQuestion, EXACT_PHRASE_CONFIDENCE),
    rule(r"\b(next|continue|proceed|go on|move on)\b", Intent::NextQuestion, LOOSE_CONFIDENCE),
    // repeat_last
    rule(r"\b(repeat|say (that|it) again|replay)\b", Intent::RepeatLast, KEYWORD_CONFIDENCE),
    rule(r"\bagain\b", Intent::RepeatLast, LOOSE_CONFIDENCE),
];

/// A table row with its compiled matcher.
#[derive(Debug)]
pub struct CompiledRule {
    pub rule: PatternRule,
    regex: Regex,
}

impl CompiledRule {
    pub fn is_match(&self, normalized: &str) -> bool {
        self.regex.is_match(normalized)
    }
}

static REGISTRY: Lazy<Vec<CompiledRule>> = Lazy::new(|| {
    RULE_TABLE
        .iter()
        .filter_map(|rule| match Regex::new(rule.pattern) {
            Ok(regex) => Some(CompiledRule { rule: *rule, regex }),
            Err(e) => {
                tracing::error!(
                    target: "heartline::coach",
                    pattern = rule.pattern,
                    "Skipping pattern that failed to compile: {}",
                    e
                );
                None
            }
        })
        .collect()
});

/// The compiled, ordered rule table. Shared read-only across threads.
pub fn rules() -> &'static [CompiledRule] {
    REGISTRY.as_slice()
}

/// Intent plus the confidence of the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub intent: Intent,
    pub confidence: f32,
}

impl Classification {
    pub fn unknown() -> Self {
        Self {
            intent: Intent::Unknown,
            confidence: UNKNOWN_CONFIDENCE,
        }
    }
}

/// Lower-case, trim, and collapse internal whitespace.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Classify a raw transcript. First matching rule wins.
pub fn classify(text: &str) -> Classification {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return Classification::unknown();
    }
    rules()
        .iter()
        .find(|r| r.is_match(&normalized))
        .map(|r| Classification {
            intent: r.rule.intent,
            confidence: r.rule.confidence,
        })
        .unwrap_or_else(Classification::unknown)
}
