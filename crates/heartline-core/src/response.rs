//! Response envelope returned to the caller.

use crate::context::UserProfile;
use crate::entities::EntityMap;
use crate::handlers::HandlerOutput;
use crate::intent::{Intent, Priority};
use crate::patterns::Classification;
use serde::{Deserialize, Serialize};

/// Final structured reply. The caller owns it (logging, display, text-to-speech).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NlpResponse {
    pub intent: Intent,
    pub confidence: f32,
    pub entities: EntityMap,
    pub response_text: String,
    pub suggested_actions: Vec<String>,
    pub should_speak: bool,
    pub priority: Priority,
}

impl NlpResponse {
    /// Assemble the envelope. Speech follows the caller's mute preference,
    /// except that critical replies are always spoken.
    pub fn build(
        classification: Classification,
        entities: EntityMap,
        output: HandlerOutput,
        profile: &UserProfile,
    ) -> Self {
        let should_speak = !profile.mute_voice || output.priority == Priority::Critical;
        Self {
            intent: classification.intent,
            confidence: classification.confidence,
            entities,
            response_text: output.response_text,
            suggested_actions: output.suggested_actions,
            should_speak,
            priority: output.priority,
        }
    }
}
