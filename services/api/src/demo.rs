use crate::infra::{
    InMemoryEvaluationRepository, InMemoryUserDirectory, DEMO_ADMIN, DEMO_EMPLOYEE, DEMO_MANAGER,
};
use chrono::{Datelike, Local};
use clap::Args;
use epr::catalog::StaticCatalog;
use epr::config::AppConfig;
use epr::error::AppError;
use epr::evaluation::{
    index_entries, write_csv, CompetencyEntry, CriterionEntry, EvaluationReport,
    EvaluationService, EvaluationServiceError, EvaluationSubmission, ManagerReviewInput,
    PreviewRequest, ReportFilter, ReviewConfig,
};
use epr::scoring::{ProficiencyLevel, ScoreBreakdown, ScoringEngine};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON file with `department`, `criteria` and `competencies` entries
    #[arg(long)]
    pub(crate) input: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Review year (defaults to the current year)
    #[arg(long)]
    pub(crate) year: Option<i32>,
    /// Manager score (0-100) recorded during the review step
    #[arg(long, default_value_t = 80.0)]
    pub(crate) manager_score: f64,
    /// Print the admin CSV export at the end of the walkthrough
    #[arg(long)]
    pub(crate) csv: bool,
}

/// Offline scoring request read by `epr-api score`.
#[derive(Debug, Deserialize)]
pub(crate) struct ScoreFile {
    pub(crate) department: String,
    #[serde(default)]
    pub(crate) criteria: Vec<CriterionEntry>,
    #[serde(default)]
    pub(crate) competencies: Vec<CompetencyEntry>,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let raw = std::fs::read_to_string(&args.input)?;
    let file: ScoreFile = serde_json::from_str(&raw)?;

    let breakdown = score_entries(&StaticCatalog::standard(), &config.review, &file)?;
    println!("Department: {}", file.department);
    render_breakdown(&breakdown);
    Ok(())
}

pub(crate) fn score_entries(
    catalog: &StaticCatalog,
    review: &ReviewConfig,
    file: &ScoreFile,
) -> Result<ScoreBreakdown, EvaluationServiceError> {
    let engine = ScoringEngine::new(review.scoring);
    let (achievements, levels) = index_entries(&file.criteria, &file.competencies)?;
    let inputs = engine.assemble(
        &catalog.criteria(&file.department),
        &catalog.all_competencies(),
        &achievements,
        &levels,
    )?;
    Ok(engine.score(&inputs))
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        year,
        manager_score,
        csv,
    } = args;
    let year = year.unwrap_or_else(|| Local::now().year());

    let catalog = Arc::new(StaticCatalog::standard());
    let repository = Arc::new(InMemoryEvaluationRepository::default());
    let service = EvaluationService::new(
        repository.clone(),
        catalog.clone(),
        Arc::new(InMemoryUserDirectory::seeded()),
        ReviewConfig::default(),
    );

    println!("EPR scoring demo ({year})");
    println!("Departments: {}", catalog.departments().join(", "));
    println!("\nSales KRAs");
    for criterion in catalog.criteria("Sales") {
        println!(
            "- [{}] {} (weight {})",
            criterion.id, criterion.kra_name, criterion.weight
        );
    }

    let submission = demo_submission(year);
    let preview = service.preview(&PreviewRequest {
        user_id: submission.user_id,
        criteria: submission.criteria.clone(),
        competencies: submission.competencies.clone(),
    })?;
    println!("\nLive preview");
    render_breakdown(&preview);

    let record = service.submit(submission)?;
    println!(
        "\nSubmitted {} for user {} -> {} ({} rows stored)",
        record.id,
        record.user_id,
        record.status.label(),
        record.criteria.len() + record.competencies.len()
    );

    let report = service.export_report(&record.id)?;
    render_report(&report);

    let reviewed = service.review(
        &record.id,
        ManagerReviewInput {
            manager_id: DEMO_MANAGER,
            score: manager_score,
            comment: "Strong customer follow-up; keep building product knowledge".to_string(),
        },
    )?;
    if let Some(review) = &reviewed.manager_review {
        println!(
            "\nManager review: score {:.1} -> combined {:.1} ({})",
            review.score,
            review.final_score,
            review.verdict.label()
        );
    }

    let progress = service.progress()?;
    println!(
        "\nProgress: {} evaluations | {} submitted | {} reviewed | {} stored",
        progress.total,
        progress.submitted,
        progress.reviewed,
        repository.len()
    );
    println!("Admin user {} can export every department", DEMO_ADMIN);

    if csv {
        let rows = service.export_rows(&ReportFilter::default())?;
        let mut buffer = Vec::new();
        match write_csv(&rows, &mut buffer) {
            Ok(()) => println!("\n{}", String::from_utf8_lossy(&buffer)),
            Err(err) => println!("\nCSV export unavailable: {}", err),
        }
    }

    Ok(())
}

fn demo_submission(year: i32) -> EvaluationSubmission {
    let criterion = |id: u32, achieved_percent: f64, comment: &str| CriterionEntry {
        criterion_id: epr::catalog::CriterionId(id),
        achieved_percent,
        comment: comment.to_string(),
    };
    let competency = |id: u32, level: ProficiencyLevel| CompetencyEntry {
        competency_id: epr::catalog::CompetencyId(id),
        level,
        comment: String::new(),
    };

    EvaluationSubmission {
        user_id: DEMO_EMPLOYEE,
        year,
        period: None,
        criteria: vec![
            criterion(1, 110.0, "Closed every escalated ticket within SLA"),
            criterion(2, 100.0, "No attendance issues"),
            criterion(3, 90.0, "Two product trainings completed"),
            criterion(4, 105.0, "All quarterly targets delivered"),
        ],
        competencies: vec![
            competency(1, ProficiencyLevel::MIDPOINT),
            competency(2, ProficiencyLevel::MIDPOINT),
        ],
        overall_comment: "Good year with steady customer growth".to_string(),
        development_plan: "Negotiation workshop in the first quarter".to_string(),
    }
}

fn render_breakdown(breakdown: &ScoreBreakdown) {
    let display = breakdown.rounded();
    println!(
        "- KPI {:.1}% x 90% = {:.2}",
        display.kpi_result,
        breakdown.weighted_kpi()
    );
    println!(
        "- Competency {:.1}% x 10% = {:.2}",
        display.comp_result,
        breakdown.weighted_competency()
    );
    println!(
        "- Final {:.1} -> rating {}",
        display.final_score, breakdown.rating
    );
}

fn render_report(report: &EvaluationReport) {
    println!(
        "\nReport for {} {} ({}), {} {}",
        report.employee.code,
        report.employee.fullname,
        report.employee.department,
        report.period,
        report.year
    );
    for item in &report.kpi_items {
        println!(
            "- {}: {:.0}% of weight {} = {:.0}",
            item.kra_name, item.achieved_percent, item.weight, item.weighted_score
        );
    }
    for item in &report.competency_items {
        let note = if item.defaulted { " (not scored)" } else { "" };
        println!(
            "- {}: level {} = {:.0}%{}",
            item.name, item.level, item.percentage, note
        );
    }
    println!(
        "Final {:.1} ({})",
        report.display.final_score, report.breakdown.rating
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use epr::scoring::RatingBand;

    fn score_file(json: &str) -> ScoreFile {
        serde_json::from_str(json).expect("score file parses")
    }

    #[test]
    fn scores_office_entries_with_default_competencies() {
        let file = score_file(
            r#"{
                "department": "Office",
                "criteria": [
                    { "criterion_id": 5, "achieved_percent": 100 },
                    { "criterion_id": 6, "achieved_percent": 100 },
                    { "criterion_id": 7, "achieved_percent": 100 },
                    { "criterion_id": 8, "achieved_percent": 100 }
                ]
            }"#,
        );

        let breakdown = score_entries(&StaticCatalog::standard(), &ReviewConfig::default(), &file)
            .expect("entries score");

        assert_eq!(breakdown.kpi_result, 100.0);
        assert_eq!(breakdown.comp_result, 100.0);
        assert_eq!(breakdown.rating, RatingBand::A);
    }

    #[test]
    fn rejects_criteria_from_other_department() {
        let file = score_file(
            r#"{ "department": "Office", "criteria": [ { "criterion_id": 1, "achieved_percent": 100 } ] }"#,
        );

        let result = score_entries(&StaticCatalog::standard(), &ReviewConfig::default(), &file);

        assert!(matches!(result, Err(EvaluationServiceError::Input(_))));
    }

    #[test]
    fn demo_runs_end_to_end() {
        run_demo(DemoArgs {
            year: Some(2025),
            manager_score: 75.0,
            csv: true,
        })
        .expect("demo completes");
    }
}
