//! Read-only reference data: per-department KPI criteria and the organization-wide competencies.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a KPI criterion (KRA) row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CriterionId(pub u32);

impl fmt::Display for CriterionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a competency row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompetencyId(pub u32);

impl fmt::Display for CompetencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Department-scoped KPI criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub id: CriterionId,
    pub department: String,
    pub kra_name: String,
    pub description: String,
    pub weight: f64,
    pub category: String,
}

/// Competency groups, in the order they are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetencyCategory {
    Core,
    Leadership,
    Professional,
    Other,
}

impl CompetencyCategory {
    pub fn label(self) -> &'static str {
        match self {
            CompetencyCategory::Core => "A. Core competencies",
            CompetencyCategory::Leadership => "B. Management & leadership",
            CompetencyCategory::Professional => "C. Professional competencies",
            CompetencyCategory::Other => "Other",
        }
    }
}

/// Organization-wide behavioral competency rated on the 1–5 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competency {
    pub id: CompetencyId,
    pub name: String,
    pub description: String,
    pub importance_level: u8,
    pub category: CompetencyCategory,
    /// Behavior expected at levels 1 through 5.
    pub level_descriptors: [String; 5],
}

impl Competency {
    pub const DEFAULT_IMPORTANCE: u8 = 2;
}

/// Catalog collaborator consumed by the evaluation service.
pub trait ReferenceCatalog: Send + Sync {
    /// Criteria for one department ordered by category then KRA name.
    fn criteria_for(&self, department: &str) -> Result<Vec<Criterion>, CatalogError>;
    /// All competencies ordered by category then id.
    fn competencies(&self) -> Result<Vec<Competency>, CatalogError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("criterion {id} has non-positive weight {weight}")]
    NonPositiveWeight { id: CriterionId, weight: f64 },
    #[error("competency {0} has importance level 0")]
    ZeroImportance(CompetencyId),
    #[error("criterion {0} is defined more than once")]
    DuplicateCriterion(CriterionId),
    #[error("competency {0} is defined more than once")]
    DuplicateCompetency(CompetencyId),
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Validated in-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    criteria: Vec<Criterion>,
    competencies: Vec<Competency>,
}

impl StaticCatalog {
    pub fn new(
        criteria: Vec<Criterion>,
        competencies: Vec<Competency>,
    ) -> Result<Self, CatalogError> {
        let mut seen = BTreeSet::new();
        for criterion in &criteria {
            if criterion.weight.is_nan() || criterion.weight <= 0.0 {
                return Err(CatalogError::NonPositiveWeight {
                    id: criterion.id,
                    weight: criterion.weight,
                });
            }
            if !seen.insert(criterion.id) {
                return Err(CatalogError::DuplicateCriterion(criterion.id));
            }
        }

        let mut seen = BTreeSet::new();
        for competency in &competencies {
            if competency.importance_level == 0 {
                return Err(CatalogError::ZeroImportance(competency.id));
            }
            if !seen.insert(competency.id) {
                return Err(CatalogError::DuplicateCompetency(competency.id));
            }
        }

        Ok(Self::ordered(criteria, competencies))
    }

    /// Seed catalog: the Sales and Office KRAs plus the three core competencies.
    pub fn standard() -> Self {
        let mut criteria = Vec::new();
        let mut next_id = 1;
        for (department, service_note) in [
            ("Sales", "Keep customer service activities running without gaps"),
            ("Office", "Keep support operations running without gaps"),
        ] {
            for (kra_name, description, weight) in [
                ("Sustain continuous service", service_note, 30.0),
                (
                    "Uphold discipline and culture",
                    "Follow internal rules and working procedures",
                    20.0,
                ),
                (
                    "Stay current with the market",
                    "Track trends and propose solutions",
                    20.0,
                ),
                (
                    "Complete assigned work",
                    "Deliver assigned work on schedule and to standard",
                    30.0,
                ),
            ] {
                criteria.push(Criterion {
                    id: CriterionId(next_id),
                    department: department.to_string(),
                    kra_name: kra_name.to_string(),
                    description: description.to_string(),
                    weight,
                    category: "KPI".to_string(),
                });
                next_id += 1;
            }
        }

        let competencies = vec![
            seed_competency(
                1,
                "Integrity",
                "Acts honestly and can be relied upon",
                [
                    "Follows basic rules",
                    "Acts consistently",
                    "Sets the example",
                    "Shapes the culture",
                    "Recognized role model",
                ],
            ),
            seed_competency(
                2,
                "Teamwork",
                "Collaborates effectively with colleagues",
                [
                    "Takes part in the team",
                    "Contributes actively",
                    "Supports teammates",
                    "Leads the team",
                    "Builds team culture",
                ],
            ),
            seed_competency(
                3,
                "Customer orientation",
                "Focuses on customer needs",
                [
                    "Responds to basic requests",
                    "Resolves issues",
                    "Proactively helps",
                    "Creates great experiences",
                    "Service expert",
                ],
            ),
        ];

        Self::ordered(criteria, competencies)
    }

    /// Criteria for `department`, in catalog order.
    pub fn criteria(&self, department: &str) -> Vec<Criterion> {
        self.criteria
            .iter()
            .filter(|criterion| criterion.department == department)
            .cloned()
            .collect()
    }

    pub fn all_competencies(&self) -> Vec<Competency> {
        self.competencies.clone()
    }

    pub fn departments(&self) -> Vec<String> {
        let departments: BTreeSet<&str> = self
            .criteria
            .iter()
            .map(|criterion| criterion.department.as_str())
            .collect();
        departments.into_iter().map(str::to_string).collect()
    }

    fn ordered(mut criteria: Vec<Criterion>, mut competencies: Vec<Competency>) -> Self {
        criteria.sort_by(|a, b| {
            (&a.department, &a.category, &a.kra_name).cmp(&(&b.department, &b.category, &b.kra_name))
        });
        competencies.sort_by_key(|competency| (competency.category, competency.id));
        Self {
            criteria,
            competencies,
        }
    }
}

impl ReferenceCatalog for StaticCatalog {
    fn criteria_for(&self, department: &str) -> Result<Vec<Criterion>, CatalogError> {
        Ok(self.criteria(department))
    }

    fn competencies(&self) -> Result<Vec<Competency>, CatalogError> {
        Ok(self.all_competencies())
    }
}

fn seed_competency(id: u32, name: &str, description: &str, levels: [&str; 5]) -> Competency {
    Competency {
        id: CompetencyId(id),
        name: name.to_string(),
        description: description.to_string(),
        importance_level: Competency::DEFAULT_IMPORTANCE,
        category: CompetencyCategory::Core,
        level_descriptors: levels.map(str::to_string),
    }
}
