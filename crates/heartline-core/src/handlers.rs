//! Intent handlers. One function per intent; each turns the entities and the
//! resolved context into reply text, suggested actions, and a priority.
//!
//! No handler fails. Missing optional data always has a fallback sentence.

use crate::context::{ResolvedContext, RiskLevel, RiskLookup};
use crate::entities::{EntityKind, EntityMap};
use crate::intent::{Intent, Priority};
use crate::tips::{
    pick_tip, BMI_THRESHOLD, DEFAULT_HEALTH_TIPS, EXERCISE_HOURS_TARGET, EXERCISE_TIP, SMOKING_TIP,
    WEIGHT_TIP,
};
use rand::Rng;

/// Action identifier every emergency reply leads with.
pub const EMERGENCY_CONTACT_ACTION: &str = "emergency_contact";

/// Most tips a single `health_tips` reply will read out.
const MAX_HEALTH_TIPS: usize = 2;

/// What a handler produces before the envelope is built.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerOutput {
    pub response_text: String,
    pub suggested_actions: Vec<String>,
    pub priority: Priority,
}

impl HandlerOutput {
    fn new(text: impl Into<String>, actions: &[&str], priority: Priority) -> Self {
        Self {
            response_text: text.into(),
            suggested_actions: actions.iter().map(|a| a.to_string()).collect(),
            priority,
        }
    }
}

/// Route to the handler for `intent`. `rng` is only consulted by `lifestyle_tips`.
pub fn dispatch<R: Rng + ?Sized>(
    intent: Intent,
    entities: &EntityMap,
    resolved: &ResolvedContext<'_>,
    rng: &mut R,
) -> HandlerOutput {
    match intent {
        Intent::ShowRisk => show_risk(resolved),
        Intent::ExplainResults => explain_results(resolved),
        Intent::StartAssessment => start_assessment(),
        Intent::HealthTips => health_tips(resolved),
        Intent::LifestyleTips => lifestyle_tips(rng),
        Intent::MedicationReminder => medication_reminder(),
        Intent::EmergencyHelp => emergency_help(entities),
        Intent::NextQuestion => next_question(),
        Intent::RepeatLast => repeat_last(resolved),
        Intent::Unknown => clarify(),
    }
}

pub fn show_risk(resolved: &ResolvedContext<'_>) -> HandlerOutput {
    let label = resolved.condition.label();
    match resolved.risk {
        RiskLookup::Known { percent, level } => {
            let (advice, priority) = match level {
                RiskLevel::High => (
                    "This is considered high risk. I recommend consulting your healthcare provider soon.",
                    Priority::High,
                ),
                RiskLevel::Medium => (
                    "This is moderate risk. Consider lifestyle improvements and regular monitoring.",
                    Priority::Medium,
                ),
                RiskLevel::Low => (
                    "This is relatively low risk. Keep up your healthy habits!",
                    Priority::Medium,
                ),
            };
            let text = format!(
                "Your {} risk is currently {}% ({}). {}",
                label,
                format_percent(percent),
                level,
                advice
            );
            HandlerOutput::new(text, &["view_detailed_risk", "get_recommendations"], priority)
        }
        RiskLookup::Unknown => HandlerOutput::new(
            format!(
                "I don't have your {} risk results yet. Please complete a risk assessment first, and then I can tell you where you stand.",
                label
            ),
            &["start_assessment"],
            Priority::Medium,
        ),
    }
}

pub fn explain_results(resolved: &ResolvedContext<'_>) -> HandlerOutput {
    let mut text = String::from(
        "Your cardiovascular risk assessment analyzes over 20 health factors, including age, blood pressure, \
cholesterol, family history, and lifestyle habits like smoking and exercise. Each factor is weighted \
based on medical research, and the percentages represent your statistical likelihood of developing \
each condition over the next 10 years.",
    );
    let expert = resolved
        .profile
        .expertise
        .as_deref()
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "advanced" | "expert" | "clinician"))
        .unwrap_or(false);
    if expert {
        text.push_str(
            " Predictions come from an ensemble classifier, and the qualitative level bands split at 40% and 70%.",
        );
    }
    HandlerOutput::new(
        text,
        &["show_risk_factors", "lifestyle_recommendations"],
        Priority::Medium,
    )
}

pub fn start_assessment() -> HandlerOutput {
    HandlerOutput::new(
        "I'll start a new cardiovascular health assessment for you. It takes about 5 minutes and covers \
your medical history, lifestyle, and current health status. You can answer every question by voice. Let's begin!",
        &["navigate_to_assessment", "enable_voice_input"],
        Priority::Medium,
    )
}

pub fn health_tips(resolved: &ResolvedContext<'_>) -> HandlerOutput {
    let profile = resolved.profile;
    let mut tips: Vec<&str> = Vec::new();
    if profile.smoking.unwrap_or(false) {
        tips.push(SMOKING_TIP);
    }
    if profile
        .exercise_hours
        .map(|h| h < EXERCISE_HOURS_TARGET)
        .unwrap_or(false)
    {
        tips.push(EXERCISE_TIP);
    }
    if profile.bmi.map(|b| b > BMI_THRESHOLD).unwrap_or(false) {
        tips.push(WEIGHT_TIP);
    }

    let text = if tips.is_empty() {
        format!(
            "Here are some heart-healthy tips: {}",
            DEFAULT_HEALTH_TIPS[..MAX_HEALTH_TIPS].join(" ")
        )
    } else {
        tips.truncate(MAX_HEALTH_TIPS);
        format!("Here are personalized health tips for you: {}", tips.join(" "))
    };
    HandlerOutput::new(text, &["set_health_goals", "track_progress"], Priority::Medium)
}

pub fn lifestyle_tips<R: Rng + ?Sized>(rng: &mut R) -> HandlerOutput {
    HandlerOutput::new(
        format!("Here's a lifestyle tip: {}", pick_tip(rng)),
        &["another_tip", "set_health_goals"],
        Priority::Medium,
    )
}

pub fn medication_reminder() -> HandlerOutput {
    HandlerOutput::new(
        "Let's set up a medication reminder. Taking your prescribed heart medications consistently is important. \
Would you like a daily reminder, or help tracking your medication schedule?",
        &["set_daily_reminder", "medication_tracking"],
        Priority::High,
    )
}

/// Always critical, always points at emergency services. The wording is more
/// direct when the transcript carries a high severity or a red-flag symptom.
pub fn emergency_help(entities: &EntityMap) -> HandlerOutput {
    let severe = entities.get(EntityKind::Severity) == Some("high");
    let red_flag = matches!(
        entities.get(EntityKind::Symptom),
        Some("chest_pain") | Some("shortness_of_breath")
    );
    let text = if severe || red_flag {
        "If you're experiencing chest pain, shortness of breath, or other serious symptoms, call 911 or your local \
emergency services immediately, or go to the nearest emergency room. Your safety comes first."
    } else {
        "If this is an emergency, call 911 or your local emergency services right away. For non-urgent medical \
questions, contact your healthcare provider. I can also help you check your symptoms."
    };
    HandlerOutput::new(
        text,
        &[EMERGENCY_CONTACT_ACTION, "call_emergency_services", "symptom_checker"],
        Priority::Critical,
    )
}

pub fn next_question() -> HandlerOutput {
    HandlerOutput::new(
        "Let's continue. What else would you like to know about your heart health? You can ask about your \
risk levels, request health tips, or get an explanation of your results.",
        &["continue_conversation"],
        Priority::Medium,
    )
}

pub fn repeat_last(resolved: &ResolvedContext<'_>) -> HandlerOutput {
    let text = match resolved.previous_reply() {
        Some(prev) => format!("Let me repeat that: {}", prev),
        None => "I don't have a previous response to repeat. You can ask about your risk levels or request health tips."
            .to_string(),
    };
    HandlerOutput::new(text, &["continue_conversation"], Priority::Medium)
}

pub fn clarify() -> HandlerOutput {
    HandlerOutput::new(
        "I'm not sure I caught that. Would you like to check your risk levels, hear some health tips, \
or start a new assessment?",
        &["show_help_menu", "voice_commands_list"],
        Priority::Low,
    )
}

/// Whole numbers without a decimal, everything else to one place.
fn format_percent(percent: f64) -> String {
    if (percent - percent.round()).abs() < 0.05 {
        format!("{:.0}", percent.round())
    } else {
        format!("{:.1}", percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{merge, ConversationContext};
    use crate::entities::extract;
    use crate::tips::LIFESTYLE_TIPS;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn ctx(value: serde_json::Value) -> ConversationContext {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn show_risk_reports_percent_and_level() {
        let c = ctx(json!({
            "risk_data": { "heart_attack": { "probability": 0.44, "risk_level": "Medium" } }
        }));
        let e = extract("What is my heart attack risk");
        let out = show_risk(&merge(&e, &c));
        assert!(out.response_text.contains("44%"), "{}", out.response_text);
        assert!(out.response_text.contains("Medium"));
        assert_eq!(out.priority, Priority::Medium);
    }

    #[test]
    fn show_risk_high_level_raises_priority() {
        let c = ctx(json!({ "risk_data": { "stroke": { "probability": 0.81, "risk_level": "High" } } }));
        let out = show_risk(&merge(&extract("stroke risk"), &c));
        assert_eq!(out.priority, Priority::High);
        assert!(out.response_text.contains("81%"));
    }

    #[test]
    fn show_risk_without_data_asks_for_assessment() {
        let c = ConversationContext::default();
        let out = show_risk(&merge(&extract("heart attack risk"), &c));
        assert!(out.response_text.contains("assessment"));
        assert_eq!(out.suggested_actions, vec!["start_assessment".to_string()]);
    }

    #[test]
    fn emergency_is_always_critical() {
        for text in ["emergency", "severe chest pain", "call a doctor"] {
            let out = emergency_help(&extract(text));
            assert_eq!(out.priority, Priority::Critical);
            assert_eq!(out.suggested_actions[0], EMERGENCY_CONTACT_ACTION);
            assert!(out.response_text.contains("emergency services"));
        }
    }

    #[test]
    fn emergency_keyword_uses_immediate_wording() {
        let out = emergency_help(&extract("I need emergency help"));
        assert!(out.response_text.contains("immediately"), "{}", out.response_text);
    }

    #[test]
    fn start_assessment_opens_the_form() {
        let out = start_assessment();
        assert_eq!(out.priority, Priority::Medium);
        assert_eq!(
            out.suggested_actions,
            vec!["navigate_to_assessment".to_string(), "enable_voice_input".to_string()]
        );
        assert!(out.response_text.contains("assessment"));
    }

    #[test]
    fn medication_reminder_is_high_priority() {
        let out = medication_reminder();
        assert_eq!(out.priority, Priority::High);
        assert_eq!(
            out.suggested_actions,
            vec!["set_daily_reminder".to_string(), "medication_tracking".to_string()]
        );
        assert!(out.response_text.contains("reminder"));
    }

    #[test]
    fn next_question_continues_the_conversation() {
        let out = next_question();
        assert_eq!(out.priority, Priority::Medium);
        assert_eq!(out.suggested_actions, vec!["continue_conversation".to_string()]);
        assert!(out.response_text.starts_with("Let's continue."));
    }

    #[test]
    fn health_tips_personalize_from_profile() {
        let c = ctx(json!({ "user_profile": { "smoking": true, "exercise_hours": 1.0, "bmi": 33.0 } }));
        let out = health_tips(&merge(&EntityMap::new(), &c));
        assert!(out.response_text.contains(SMOKING_TIP));
        assert!(out.response_text.contains(EXERCISE_TIP));
        assert!(!out.response_text.contains(WEIGHT_TIP));
    }

    #[test]
    fn health_tips_fall_back_to_defaults() {
        let c = ConversationContext::default();
        let out = health_tips(&merge(&EntityMap::new(), &c));
        assert!(out.response_text.contains(DEFAULT_HEALTH_TIPS[0]));
    }

    #[test]
    fn lifestyle_tip_is_one_of_the_known_tips() {
        let mut rng = StdRng::seed_from_u64(3);
        let out = lifestyle_tips(&mut rng);
        assert!(LIFESTYLE_TIPS
            .iter()
            .any(|tip| out.response_text.ends_with(tip)));
    }

    #[test]
    fn repeat_without_history_says_so() {
        let c = ConversationContext::default();
        let out = repeat_last(&merge(&EntityMap::new(), &c));
        assert!(out.response_text.contains("don't have a previous response"));
    }

    #[test]
    fn expert_profile_gets_extra_detail() {
        let c = ctx(json!({ "user_profile": { "expertise": "Clinician" } }));
        let out = explain_results(&merge(&EntityMap::new(), &c));
        assert!(out.response_text.contains("40% and 70%"));
    }

    #[test]
    fn percent_formatting() {
        assert_eq!(format_percent(44.000000001), "44");
        assert_eq!(format_percent(12.34), "12.3");
    }
}
