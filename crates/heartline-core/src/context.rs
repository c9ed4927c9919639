//! Caller-supplied conversation context and the merge step that resolves it
//! against extracted entities.
//!
//! Every field is optional on the wire and has a documented default, so a
//! request with `{}` as context is valid. A field that is null or of the wrong
//! JSON type falls back to its default instead of failing the request. Lookups
//! that find nothing resolve to an explicit `Unknown` rather than a missing value.

use crate::entities::{Condition, EntityMap};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Percent above which a risk without an explicit level is treated as High.
pub const HIGH_RISK_THRESHOLD: f64 = 70.0;
/// Percent above which a risk without an explicit level is treated as Medium.
pub const MEDIUM_RISK_THRESHOLD: f64 = 40.0;

/// Session data owned by the caller and re-sent with every request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationContext {
    /// Latest risk scores keyed by condition (`heart_attack`, `stroke`, `overall`, ...).
    /// Default: empty. Entries that do not parse are dropped and look up as `Unknown`.
    #[serde(default, deserialize_with = "lenient_risk_data")]
    pub risk_data: HashMap<String, RiskEntry>,
    /// Profile hints. Default: all unset.
    #[serde(default, deserialize_with = "lenient")]
    pub user_profile: UserProfile,
    /// Prior turns, oldest first. Default: empty. Unreadable turns are skipped.
    #[serde(default, deserialize_with = "lenient_history")]
    pub conversation_history: Vec<ConversationTurn>,
    /// The last reply the caller spoke or displayed, if it tracks one.
    #[serde(default, deserialize_with = "lenient")]
    pub last_response: Option<String>,
}

/// Deserialize `T`, or its default when the value is null or the wrong shape.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Keep the readable members of a JSON array; anything else is empty.
fn lenient_items<T: DeserializeOwned>(value: Value) -> Vec<T> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| T::deserialize(v).ok())
            .collect(),
        _ => Vec::new(),
    }
}

fn lenient_history<'de, D>(deserializer: D) -> Result<Vec<ConversationTurn>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_items(Value::deserialize(deserializer)?))
}

fn lenient_risk_data<'de, D>(deserializer: D) -> Result<HashMap<String, RiskEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(map) = Value::deserialize(deserializer)? else {
        return Ok(HashMap::new());
    };
    Ok(map
        .into_iter()
        .filter_map(|(key, v)| RiskEntry::deserialize(v).ok().map(|entry| (key, entry)))
        .collect())
}

/// One risk score as reported by the prediction backend.
///
/// Accepts `{ "probability": 0.44, "risk_level": "Medium" }` or a bare number.
/// Probabilities in `[0, 1]` are fractions; larger numbers are percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RiskEntry {
    Detailed {
        #[serde(default, alias = "risk_score")]
        probability: Option<f64>,
        #[serde(default, alias = "level")]
        risk_level: Option<String>,
    },
    Score(f64),
}

impl RiskEntry {
    fn probability(&self) -> Option<f64> {
        match self {
            Self::Detailed { probability, .. } => *probability,
            Self::Score(v) => Some(*v),
        }
    }

    fn level(&self) -> Option<&str> {
        match self {
            Self::Detailed { risk_level, .. } => risk_level.as_deref(),
            Self::Score(_) => None,
        }
    }
}

/// Profile hints. Accent, personality, and expertise are cosmetic and only
/// passed through; the tip hints personalize `health_tips`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, deserialize_with = "lenient")]
    pub accent: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub personality: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub expertise: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub smoking: Option<bool>,
    /// Weekly hours of moderate exercise.
    #[serde(default, deserialize_with = "lenient")]
    pub exercise_hours: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub bmi: Option<f64>,
    /// Caller preference to suppress speech. Critical replies are spoken regardless.
    #[serde(default, deserialize_with = "lenient")]
    pub mute_voice: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One prior exchange. Deserializes from `"text"` or `{ "role": ..., "text": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawTurn")]
pub struct ConversationTurn {
    pub role: String,
    pub text: String,
}

impl ConversationTurn {
    pub fn is_assistant(&self) -> bool {
        matches!(
            self.role.to_ascii_lowercase().as_str(),
            "assistant" | "coach" | "bot"
        )
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTurn {
    Text(String),
    Full {
        #[serde(default = "default_role")]
        role: String,
        #[serde(alias = "content", alias = "message")]
        text: String,
    },
}

fn default_role() -> String {
    "user".to_string()
}

impl From<RawTurn> for ConversationTurn {
    fn from(raw: RawTurn) -> Self {
        match raw {
            RawTurn::Text(text) => Self {
                role: default_role(),
                text,
            },
            RawTurn::Full { role, text } => Self { role, text },
        }
    }
}

/// Qualitative risk band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" | "moderate" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn from_percent(percent: f64) -> Self {
        if percent > HIGH_RISK_THRESHOLD {
            Self::High
        } else if percent > MEDIUM_RISK_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        })
    }
}

/// Condition a risk handler reports on. `Overall` when the transcript named none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionKey {
    Overall,
    Specific(Condition),
}

impl ConditionKey {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Overall => "overall cardiovascular",
            Self::Specific(c) => c.label(),
        }
    }

    /// `risk_data` keys tried in order.
    fn lookup_keys(&self) -> &'static [&'static str] {
        match self {
            Self::Overall => &["overall", "overall_cardiovascular", "cardiovascular"],
            Self::Specific(Condition::HeartAttack) => &["heart_attack"],
            Self::Specific(Condition::Stroke) => &["stroke"],
            Self::Specific(Condition::HeartFailure) => &["heart_failure"],
            Self::Specific(Condition::Arrhythmia) => &["arrhythmia"],
        }
    }
}

/// Result of a risk lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RiskLookup {
    Known { percent: f64, level: RiskLevel },
    Unknown,
}

/// Entities folded together with the caller's context.
#[derive(Debug, Clone)]
pub struct ResolvedContext<'a> {
    pub condition: ConditionKey,
    pub risk: RiskLookup,
    pub profile: &'a UserProfile,
    pub history: &'a [ConversationTurn],
    pub last_response: Option<&'a str>,
}

impl ResolvedContext<'_> {
    /// Text of the most recent reply: explicit `last_response` first, then the
    /// newest assistant turn in the history.
    pub fn previous_reply(&self) -> Option<&str> {
        self.last_response
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or_else(|| {
                self.history
                    .iter()
                    .rev()
                    .find(|t| t.is_assistant() && !t.text.trim().is_empty())
                    .map(|t| t.text.trim())
            })
    }
}

/// Resolve the condition and its risk score. Never fails; missing data is `Unknown`.
pub fn merge<'a>(entities: &EntityMap, context: &'a ConversationContext) -> ResolvedContext<'a> {
    let condition = entities
        .condition()
        .map(ConditionKey::Specific)
        .unwrap_or(ConditionKey::Overall);

    let risk = condition
        .lookup_keys()
        .iter()
        .find_map(|k| context.risk_data.get(*k))
        .map(resolve_entry)
        .unwrap_or(RiskLookup::Unknown);

    ResolvedContext {
        condition,
        risk,
        profile: &context.user_profile,
        history: &context.conversation_history,
        last_response: context.last_response.as_deref(),
    }
}

fn resolve_entry(entry: &RiskEntry) -> RiskLookup {
    let Some(raw) = entry.probability().filter(|p| p.is_finite() && *p >= 0.0) else {
        return RiskLookup::Unknown;
    };
    let percent = if raw <= 1.0 { raw * 100.0 } else { raw }.min(100.0);
    let level = entry
        .level()
        .and_then(RiskLevel::parse)
        .unwrap_or_else(|| RiskLevel::from_percent(percent));
    RiskLookup::Known { percent, level }
}
