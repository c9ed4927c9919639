//! VoiceCoach: classify -> extract -> merge -> handle -> envelope.
//!
//! Each call is synchronous and independent. The coach holds no per-request
//! state, so one instance can be shared across threads without locking.

use crate::context::{lenient, merge, ConversationContext};
use crate::entities::extract;
use crate::error::{CoachError, CoachResult};
use crate::handlers::dispatch;
use crate::patterns::{classify, rules};
use crate::response::NlpResponse;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire request: `{ text, context?, patient_id? }`. Only `text` is strict; a
/// null or mistyped `context` or `patient_id` is read as absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceCommandRequest {
    pub text: String,
    #[serde(default, deserialize_with = "lenient")]
    pub context: ConversationContext,
    #[serde(default, deserialize_with = "lenient")]
    pub patient_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VoiceCoach;

impl VoiceCoach {
    /// Build a coach and compile the pattern table up front.
    pub fn new() -> Self {
        let count = rules().len();
        tracing::debug!(target: "heartline::coach", rules = count, "Pattern registry ready");
        Self
    }

    /// Run the pipeline on a transcript. Always yields a response.
    pub fn process(&self, text: &str, context: &ConversationContext) -> NlpResponse {
        self.process_with_rng(text, context, &mut rand::thread_rng())
    }

    /// Same as [`process`](Self::process) with a caller-supplied source for tip sampling.
    pub fn process_with_rng<R: Rng + ?Sized>(
        &self,
        text: &str,
        context: &ConversationContext,
        rng: &mut R,
    ) -> NlpResponse {
        let classification = classify(text);
        let entities = extract(text);
        let resolved = merge(&entities, context);
        let output = dispatch(classification.intent, &entities, &resolved, rng);

        tracing::debug!(target: "heartline::coach", transcript = text, "Voice command received");
        tracing::info!(
            target: "heartline::coach",
            intent = %classification.intent,
            confidence = classification.confidence,
            priority = %output.priority,
            "Voice command processed"
        );

        NlpResponse::build(classification, entities, output, &context.user_profile)
    }

    /// Validate a raw JSON request and run it. The only rejection path is a
    /// non-object body or a missing or non-string `text`.
    pub fn process_request(&self, body: Value) -> CoachResult<NlpResponse> {
        let request = parse_request(body)?;
        Ok(self.process(&request.text, &request.context))
    }
}

/// Shape-check and deserialize a request body.
pub fn parse_request(body: Value) -> CoachResult<VoiceCommandRequest> {
    let obj = body
        .as_object()
        .ok_or_else(|| CoachError::InvalidRequest("request body must be a JSON object".into()))?;
    match obj.get("text") {
        Some(Value::String(_)) => {}
        Some(_) => return Err(CoachError::InvalidRequest("`text` must be a string".into())),
        None => return Err(CoachError::InvalidRequest("`text` is required".into())),
    }
    Ok(serde_json::from_value(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::{Intent, Priority};
    use serde_json::json;

    #[test]
    fn non_string_text_is_rejected() {
        let err = VoiceCoach::new()
            .process_request(json!({ "text": 42 }))
            .unwrap_err();
        assert!(matches!(err, CoachError::InvalidRequest(_)));
    }

    #[test]
    fn missing_text_is_rejected() {
        assert!(VoiceCoach::new().process_request(json!({ "context": {} })).is_err());
        assert!(VoiceCoach::new().process_request(json!("just a string")).is_err());
    }

    #[test]
    fn non_object_context_is_treated_as_empty() {
        let r = VoiceCoach::new()
            .process_request(json!({ "text": "show my heart attack risk", "context": [1, 2] }))
            .unwrap();
        assert_eq!(r.intent, Intent::ShowRisk);
        assert!(r.suggested_actions.contains(&"start_assessment".to_string()));
    }

    #[test]
    fn null_context_is_treated_as_empty() {
        let r = VoiceCoach::new()
            .process_request(json!({ "text": "I need emergency help", "context": null }))
            .unwrap();
        assert_eq!(r.intent, Intent::EmergencyHelp);
        assert_eq!(r.priority, Priority::Critical);
    }

    #[test]
    fn chest_pain_with_null_history_still_gets_emergency_reply() {
        let r = VoiceCoach::new()
            .process_request(json!({
                "text": "I have chest pain",
                "context": { "conversation_history": null }
            }))
            .unwrap();
        assert_eq!(r.intent, Intent::EmergencyHelp);
        assert_eq!(r.priority, Priority::Critical);
    }

    #[test]
    fn mistyped_context_fields_degrade_gracefully() {
        let coach = VoiceCoach::new();
        let r = coach
            .process_request(json!({
                "text": "I need emergency help",
                "context": { "user_profile": { "smoking": "yes" } }
            }))
            .unwrap();
        assert_eq!(r.priority, Priority::Critical);

        let r = coach
            .process_request(json!({
                "text": "what is my heart attack risk",
                "context": { "risk_data": { "heart_attack": null } }
            }))
            .unwrap();
        assert_eq!(r.intent, Intent::ShowRisk);
        assert_eq!(r.suggested_actions, vec!["start_assessment".to_string()]);
    }

    #[test]
    fn patient_id_is_accepted() {
        let req = parse_request(json!({ "text": "next", "patient_id": "p-17" })).unwrap();
        assert_eq!(req.patient_id.as_deref(), Some("p-17"));
    }
}
