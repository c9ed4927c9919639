//! Static catalog of supported voice commands, grouped by category, for user guidance.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct VoiceCommandCatalog {
    pub risk_queries: &'static [&'static str],
    pub explanations: &'static [&'static str],
    pub actions: &'static [&'static str],
    pub navigation: &'static [&'static str],
    pub emergency: &'static [&'static str],
}

pub const VOICE_COMMANDS: VoiceCommandCatalog = VoiceCommandCatalog {
    risk_queries: &[
        "Show my heart attack risk",
        "What is my stroke risk?",
        "What's my current cardiovascular risk?",
    ],
    explanations: &[
        "Explain my results",
        "What does this mean?",
        "Help me understand my risk score",
    ],
    actions: &[
        "Start new assessment",
        "Give me health tips",
        "Set medication reminder",
    ],
    navigation: &["Next question", "Repeat last result", "Continue assessment"],
    emergency: &["Emergency help", "Call doctor", "I need urgent assistance"],
};

/// Openers suggested when a conversation starts.
pub const STARTER_COMMANDS: &[&str] = &[
    "Show my current risk levels",
    "Explain my latest results",
    "Give me health improvement tips",
];

pub const WELCOME_MESSAGE: &str = "Hello! I'm your heart health coach. I can help you understand your \
cardiovascular risk and give you personalized guidance. What would you like to know?";

pub fn voice_commands() -> VoiceCommandCatalog {
    VOICE_COMMANDS
}

impl VoiceCommandCatalog {
    /// `(category, phrases)` pairs in display order.
    pub fn categories(&self) -> [(&'static str, &'static [&'static str]); 5] {
        [
            ("risk_queries", self.risk_queries),
            ("explanations", self.explanations),
            ("actions", self.actions),
            ("navigation", self.navigation),
            ("emergency", self.emergency),
        ]
    }
}
