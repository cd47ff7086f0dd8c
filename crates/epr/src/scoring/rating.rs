use serde::{Deserialize, Serialize};
use std::fmt;

/// Letter grade derived from the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RatingBand {
    #[serde(rename = "C")]
    C,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A++")]
    APlusPlus,
}

impl RatingBand {
    /// Inclusive lower bounds, evaluated highest first.
    pub const THRESHOLDS: [(f64, RatingBand); 4] = [
        (135.0, RatingBand::APlusPlus),
        (120.0, RatingBand::APlus),
        (100.0, RatingBand::A),
        (80.0, RatingBand::B),
    ];

    pub fn label(self) -> &'static str {
        match self {
            RatingBand::APlusPlus => "A++",
            RatingBand::APlus => "A+",
            RatingBand::A => "A",
            RatingBand::B => "B",
            RatingBand::C => "C",
        }
    }
}

impl fmt::Display for RatingBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Maps any final score onto a band. Boundaries belong to the higher band; NaN falls through to `C`.
pub fn derive_rating(final_score: f64) -> RatingBand {
    RatingBand::THRESHOLDS
        .iter()
        .find(|(floor, _)| final_score >= *floor)
        .map(|(_, band)| *band)
        .unwrap_or(RatingBand::C)
}
