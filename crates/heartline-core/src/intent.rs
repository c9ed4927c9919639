//! Intent and priority tags shared by every stage of the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classified purpose of a user utterance. The set is closed; anything the
/// pattern table cannot place becomes [`Intent::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    ShowRisk,
    ExplainResults,
    StartAssessment,
    HealthTips,
    MedicationReminder,
    EmergencyHelp,
    NextQuestion,
    RepeatLast,
    LifestyleTips,
    Unknown,
}

impl Intent {
    pub const ALL: [Intent; 10] = [
        Intent::ShowRisk,
        Intent::ExplainResults,
        Intent::StartAssessment,
        Intent::HealthTips,
        Intent::MedicationReminder,
        Intent::EmergencyHelp,
        Intent::NextQuestion,
        Intent::RepeatLast,
        Intent::LifestyleTips,
        Intent::Unknown,
    ];

    /// Wire label (matches the serde representation).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShowRisk => "show_risk",
            Self::ExplainResults => "explain_results",
            Self::StartAssessment => "start_assessment",
            Self::HealthTips => "health_tips",
            Self::MedicationReminder => "medication_reminder",
            Self::EmergencyHelp => "emergency_help",
            Self::NextQuestion => "next_question",
            Self::RepeatLast => "repeat_last",
            Self::LifestyleTips => "lifestyle_tips",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery urgency attached to every reply. Ordered `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
    /// Emergency replies. Never muted, never dropped.
    Critical,
}

/// Advisory speaking tone for the caller's text-to-speech engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceTone {
    Calm,
    Neutral,
    Firm,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Tone hint for the speech collaborator. The core only emits the tag;
    /// acting on it is the caller's decision.
    pub fn voice_tone(&self) -> VoiceTone {
        match self {
            Self::Low => VoiceTone::Calm,
            Self::Medium => VoiceTone::Neutral,
            Self::High => VoiceTone::Firm,
            Self::Critical => VoiceTone::Urgent,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
