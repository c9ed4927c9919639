//! Fixed tip lists. `lifestyle_tips` samples one entry uniformly; tests assert
//! membership in [`LIFESTYLE_TIPS`] rather than an exact string.

use rand::seq::SliceRandom;
use rand::Rng;

pub const LIFESTYLE_TIPS: &[&str] = &[
    "Aim for 150 minutes of moderate exercise per week. Even a 30-minute daily walk makes a real difference.",
    "Follow a Mediterranean-style diet rich in fruits, vegetables, whole grains, and healthy fats.",
    "Quitting smoking is the single most important step you can take for your heart.",
    "Practice stress management through meditation, breathing exercises, or yoga.",
    "Get 7 to 9 hours of quality sleep each night.",
    "Cut back on salt to help keep your blood pressure in a healthy range.",
    "Limit alcohol to no more than one drink a day for women or two for men.",
];

pub const SMOKING_TIP: &str =
    "Quitting smoking is the most impactful change you can make. It can cut your heart attack risk by up to half.";
pub const EXERCISE_TIP: &str =
    "Try to get at least 150 minutes of moderate exercise per week. A 30-minute daily walk is a great start.";
pub const WEIGHT_TIP: &str =
    "Reaching a healthy weight through diet and exercise can significantly lower your cardiovascular risk.";

/// Used when the profile gives nothing to personalize on.
pub const DEFAULT_HEALTH_TIPS: &[&str] = &[
    "Follow a Mediterranean-style diet rich in fruits, vegetables, and healthy fats.",
    "Aim for 7 to 9 hours of quality sleep each night for optimal heart health.",
    "Practice stress management through meditation, yoga, or other relaxation techniques.",
];

/// Weekly exercise below this many hours earns the exercise tip.
pub const EXERCISE_HOURS_TARGET: f64 = 2.5;
/// BMI above this earns the weight tip.
pub const BMI_THRESHOLD: f64 = 30.0;

/// Uniformly sample one lifestyle tip.
pub fn pick_tip<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    LIFESTYLE_TIPS
        .choose(rng)
        .copied()
        .unwrap_or(LIFESTYLE_TIPS[0])
}
