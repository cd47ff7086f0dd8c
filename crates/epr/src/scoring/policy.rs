use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use super::inputs::ProficiencyLevel;

/// Valid domain for an entered achievement percentage.
pub const ACHIEVEMENT_RANGE: RangeInclusive<f64> = 0.0..=150.0;

/// What to do with an achievement outside [`ACHIEVEMENT_RANGE`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputRangePolicy {
    /// Keep the value exactly as entered.
    #[default]
    PassThrough,
    /// Pull the value back onto the nearest bound.
    Clamp,
    /// Refuse the entry.
    Reject,
}

impl InputRangePolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pass-through" | "passthrough" | "pass_through" => Some(Self::PassThrough),
            "clamp" => Some(Self::Clamp),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InputRangePolicy::PassThrough => "pass-through",
            InputRangePolicy::Clamp => "clamp",
            InputRangePolicy::Reject => "reject",
        }
    }
}

/// Tunable parts of input assembly. Blend weights and level percentages live in `rules`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    /// Level assumed for a catalog competency the employee left unscored.
    pub default_competency_level: ProficiencyLevel,
    pub input_range: InputRangePolicy,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            default_competency_level: ProficiencyLevel::MIDPOINT,
            input_range: InputRangePolicy::PassThrough,
        }
    }
}
