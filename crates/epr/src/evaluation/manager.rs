//! Manager-side scoring.
//!
//! The manager review averages the employee's final score with the manager's own score. This is a
//! different formula from the employee-side 90/10 blend and is kept separate on purpose until the
//! business decides whether the two should converge.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Range of the manager's slider.
pub const MANAGER_SCORE_RANGE: RangeInclusive<f64> = 0.0..=100.0;

/// Minimum manager score for a passing verdict.
pub const MANAGER_PASS_THRESHOLD: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagerVerdict {
    Pass,
    NeedsImprovement,
}

impl ManagerVerdict {
    pub fn label(self) -> &'static str {
        match self {
            ManagerVerdict::Pass => "pass",
            ManagerVerdict::NeedsImprovement => "needs_improvement",
        }
    }
}

/// Simple average of the employee's final score and the manager's score.
pub fn compute_manager_final_score(employee_score: f64, manager_score: f64) -> f64 {
    (employee_score + manager_score) / 2.0
}

pub fn manager_verdict(manager_score: f64) -> ManagerVerdict {
    if manager_score >= MANAGER_PASS_THRESHOLD {
        ManagerVerdict::Pass
    } else {
        ManagerVerdict::NeedsImprovement
    }
}
