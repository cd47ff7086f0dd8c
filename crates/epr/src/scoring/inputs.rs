use serde::{Deserialize, Serialize};

use super::rules::level_percentage;
use crate::catalog::{CompetencyId, CriterionId};

/// Employee-entered achievement against one KPI criterion, carrying the catalog weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub criterion_id: CriterionId,
    pub weight: f64,
    pub achieved_percent: f64,
}

/// Selected proficiency level for one competency, carrying the catalog importance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetencyLevel {
    pub competency_id: CompetencyId,
    pub importance_level: u8,
    pub selected_level: ProficiencyLevel,
}

impl CompetencyLevel {
    pub fn percentage(&self) -> f64 {
        level_percentage(self.selected_level)
    }

    /// Mapped percentage multiplied by importance.
    pub fn contribution(&self) -> f64 {
        self.percentage() * f64::from(self.importance_level)
    }
}

/// Competency level on the 1–5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ProficiencyLevel(u8);

impl ProficiencyLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;
    /// "Meets expectations".
    pub const MIDPOINT: ProficiencyLevel = ProficiencyLevel(3);

    pub fn new(level: u8) -> Result<Self, ScoringInputError> {
        if (Self::MIN..=Self::MAX).contains(&level) {
            Ok(Self(level))
        } else {
            Err(ScoringInputError::InvalidLevel(level))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for ProficiencyLevel {
    fn default() -> Self {
        Self::MIDPOINT
    }
}

impl TryFrom<u8> for ProficiencyLevel {
    type Error = ScoringInputError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProficiencyLevel> for u8 {
    fn from(value: ProficiencyLevel) -> Self {
        value.0
    }
}

/// Complete engine input for one department: every catalog criterion and competency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringInputs {
    pub criteria: Vec<CriterionScore>,
    pub competencies: Vec<CompetencyLevel>,
}

/// Raised while turning caller entries into [`ScoringInputs`]. The arithmetic itself never fails.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringInputError {
    #[error("criterion {0} is not part of the department catalog")]
    UnknownCriterion(CriterionId),
    #[error("competency {0} is not part of the competency catalog")]
    UnknownCompetency(CompetencyId),
    #[error("criterion {0} was entered more than once")]
    DuplicateCriterion(CriterionId),
    #[error("competency {0} was entered more than once")]
    DuplicateCompetency(CompetencyId),
    #[error("achievement {value} for criterion {criterion_id} is outside 0-150%")]
    AchievementOutOfRange { criterion_id: CriterionId, value: f64 },
    #[error("achievement for criterion {0} is not a finite number")]
    NonFiniteAchievement(CriterionId),
    #[error("proficiency level {0} is outside 1-5")]
    InvalidLevel(u8),
}
