use serde::{Deserialize, Serialize};

use super::repository::PeriodUniqueness;
use crate::scoring::ScoringPolicy;

/// Policy knobs for the review workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewConfig {
    pub scoring: ScoringPolicy,
    pub period_uniqueness: PeriodUniqueness,
}
