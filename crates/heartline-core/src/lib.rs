//! Heartline core library.
//! Voice coach pipeline for the cardiovascular risk app: pattern-based intent
//! classification, entity extraction, context merge, and contextual replies.

pub mod catalog;
pub mod context;
pub mod engine;
pub mod entities;
pub mod error;
pub mod handlers;
pub mod intent;
pub mod patterns;
pub mod response;
pub mod tips;

pub use catalog::{voice_commands, VoiceCommandCatalog, STARTER_COMMANDS, WELCOME_MESSAGE};
pub use context::{
    merge, ConditionKey, ConversationContext, ConversationTurn, ResolvedContext, RiskEntry, RiskLevel,
    RiskLookup, UserProfile,
};
pub use engine::{parse_request, VoiceCoach, VoiceCommandRequest};
pub use entities::{extract, Condition, EntityKind, EntityMap};
pub use error::{CoachError, CoachResult};
pub use handlers::{HandlerOutput, EMERGENCY_CONTACT_ACTION};
pub use intent::{Intent, Priority, VoiceTone};
pub use patterns::{classify, Classification, UNKNOWN_CONFIDENCE};
pub use response::NlpResponse;
pub use tips::LIFESTYLE_TIPS;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
