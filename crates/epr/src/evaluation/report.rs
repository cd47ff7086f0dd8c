//! Data builders for the history view, PDF export and the admin spreadsheet export.

use std::io;

use serde::{Deserialize, Serialize};

use super::domain::{EvaluationId, EvaluationRecord, EvaluationStatus};
use crate::catalog::{CompetencyCategory, CompetencyId, CriterionId};
use crate::identity::{UserId, UserRecord};
use crate::scoring::{RoundedScores, ScoreBreakdown};

/// One KPI row of an individual report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiLineItem {
    pub criterion_id: CriterionId,
    pub category: String,
    pub kra_name: String,
    pub weight: f64,
    pub achieved_percent: f64,
    /// `achieved_percent * weight`.
    pub weighted_score: f64,
    pub comment: String,
}

/// One competency row of an individual report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetencyLineItem {
    pub competency_id: CompetencyId,
    pub category: CompetencyCategory,
    pub name: String,
    pub level: u8,
    pub level_descriptor: String,
    pub percentage: f64,
    pub importance_level: u8,
    /// `percentage * importance_level`.
    pub score: f64,
    pub comment: String,
    pub defaulted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportHeader {
    pub user_id: UserId,
    pub code: String,
    pub fullname: String,
    pub department: String,
}

impl From<&UserRecord> for ReportHeader {
    fn from(user: &UserRecord) -> Self {
        Self {
            user_id: user.id,
            code: user.code.clone(),
            fullname: user.fullname.clone(),
            department: user.department.clone(),
        }
    }
}

/// Everything a renderer needs for one evaluation, recomputed from stored rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub evaluation_id: EvaluationId,
    pub employee: ReportHeader,
    pub year: i32,
    pub period: String,
    pub status: EvaluationStatus,
    pub kpi_items: Vec<KpiLineItem>,
    pub competency_items: Vec<CompetencyLineItem>,
    pub breakdown: ScoreBreakdown,
    pub display: RoundedScores,
    pub employee_comment: String,
    pub development_plan: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_comment: Option<String>,
}

/// Filter for the admin export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReportFilter {
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub status: Option<EvaluationStatus>,
}

impl ReportFilter {
    /// Department matches against the department the form was scored under.
    pub fn matches(&self, record: &EvaluationRecord) -> bool {
        let department_ok = self
            .department
            .as_deref()
            .map(|department| record.department == department)
            .unwrap_or(true);
        let status_ok = self
            .status
            .map(|status| record.status == status)
            .unwrap_or(true);
        department_ok && status_ok
    }
}

/// Flat row of the admin export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub evaluation_id: String,
    pub code: String,
    pub fullname: String,
    pub department: String,
    pub year: i32,
    pub period: String,
    pub employee_score: f64,
    pub manager_score: Option<f64>,
    pub final_score: f64,
    pub rating: String,
    pub manager_verdict: Option<String>,
    pub status: String,
}

impl ExportRow {
    pub fn new(user: &UserRecord, record: &EvaluationRecord) -> Self {
        let rounded = record.breakdown.rounded();
        Self {
            evaluation_id: record.id.0.clone(),
            code: user.code.clone(),
            fullname: user.fullname.clone(),
            department: record.department.clone(),
            year: record.year,
            period: record.period.clone(),
            employee_score: rounded.final_score,
            manager_score: record.manager_score(),
            final_score: crate::scoring::round_for_display(record.final_score()),
            rating: record.breakdown.rating.label().to_string(),
            manager_verdict: record
                .manager_review
                .as_ref()
                .map(|review| review.verdict.label().to_string()),
            status: record.status.label().to_string(),
        }
    }
}

/// Admin dashboard counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProgressSummary {
    pub total: usize,
    pub submitted: usize,
    pub reviewed: usize,
}

impl ProgressSummary {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a EvaluationRecord>) -> Self {
        records
            .into_iter()
            .fold(ProgressSummary::default(), |mut summary, record| {
                summary.total += 1;
                if record.status != EvaluationStatus::Draft {
                    summary.submitted += 1;
                }
                if record.status == EvaluationStatus::ManagerReviewed {
                    summary.reviewed += 1;
                }
                summary
            })
    }
}

/// Writes export rows as CSV with a header line.
pub fn write_csv<W: io::Write>(rows: &[ExportRow], writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
