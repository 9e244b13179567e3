use crate::infra::{build_pipeline, parse_assistant};
use chrono::Utc;
use clap::Args;
use morph_ai::config::AppConfig;
use morph_ai::error::AppError;
use morph_ai::workflows::ingest::PerformanceDatasetImporter;
use morph_ai::workflows::performance::assistants::context_for;
use morph_ai::workflows::performance::{
    export_summaries_csv, AssistantKind, BatchReportView, EmployeeId, EvaluationRecord,
    JsonFileSummaryStore, SummaryStore,
};
use std::fmt::Write;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Current-week KPI export (CSV)
    #[arg(long)]
    pub(crate) current: PathBuf,
    /// Prior-week KPI export used for week-over-week comparison
    #[arg(long)]
    pub(crate) prior: Option<PathBuf>,
    /// Monthly survey export (CSV)
    #[arg(long)]
    pub(crate) survey: Option<PathBuf>,
    /// Evaluate only these employee ids (repeatable). Defaults to everyone in the current table.
    #[arg(long = "employee")]
    pub(crate) employees: Vec<String>,
    /// Override the summary store path
    #[arg(long)]
    pub(crate) store: Option<PathBuf>,
    /// Skip the text-generation model and write rule-based summaries only
    #[arg(long)]
    pub(crate) rule_based_only: bool,
    /// Print the full batch report as JSON instead of the text overview
    #[arg(long)]
    pub(crate) json: bool,
    /// Also write the batch summaries to this CSV file
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct SummariesArgs {
    /// Only records created within this many days
    #[arg(long)]
    pub(crate) days: Option<u32>,
    /// Show one employee, by id or by name
    #[arg(long)]
    pub(crate) employee: Option<String>,
    /// Override the summary store path
    #[arg(long)]
    pub(crate) store: Option<PathBuf>,
    /// Write the selected summaries to this CSV file instead of printing them
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ContextArgs {
    /// Assistant whose context to print: sidekick, psycholog or conflict
    #[arg(value_parser = parse_assistant)]
    pub(crate) assistant: AssistantKind,
    /// Focus the context on one employee by name
    #[arg(long)]
    pub(crate) employee: Option<String>,
    /// Override the summary store path
    #[arg(long)]
    pub(crate) store: Option<PathBuf>,
}

pub(crate) fn run_evaluation(config: &AppConfig, args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        current,
        prior,
        survey,
        employees,
        store,
        rule_based_only,
        json,
        output,
    } = args;

    let dataset = PerformanceDatasetImporter::from_paths(current, prior, survey)?;
    let pipeline = build_pipeline(config, store, rule_based_only)?;

    let requested: Vec<EmployeeId> = employees.into_iter().map(EmployeeId::new).collect();
    let requested = (!requested.is_empty()).then_some(requested.as_slice());

    let outcome = pipeline.run(&dataset, requested)?;
    let view = BatchReportView::from(outcome);

    if json {
        match serde_json::to_string_pretty(&view) {
            Ok(payload) => println!("{payload}"),
            Err(err) => return Err(AppError::Runtime(format!("failed to render report: {err}"))),
        }
    } else {
        print!(
            "{}",
            render_batch_report(&view, &pipeline.store().path().display().to_string())
        );
    }

    if let Some(path) = output {
        let written = export_summaries_csv(&path, view.summaries.values())?;
        if !json {
            println!("\n{written} summaries exported to {}", path.display());
        }
    }

    Ok(())
}

pub(crate) fn run_summaries(config: &AppConfig, args: SummariesArgs) -> Result<(), AppError> {
    let store = JsonFileSummaryStore::new(args.store.unwrap_or_else(|| config.store.path.clone()));

    let records = match (args.employee.as_deref(), args.days) {
        (Some(employee), _) => {
            let by_id = store.get(&EmployeeId::new(employee))?;
            let record = match by_id {
                Some(record) => Some(record),
                None => store.find_by_name(employee)?,
            };
            record.into_iter().collect()
        }
        (None, Some(days)) => store.recent(days, Utc::now())?,
        (None, None) => store.all()?.into_values().collect(),
    };

    match args.output {
        Some(path) => {
            let written = export_summaries_csv(&path, &records)?;
            println!("{written} summaries exported to {}", path.display());
        }
        None => print!("{}", render_summaries(&records)),
    }
    Ok(())
}

pub(crate) fn run_context(config: &AppConfig, args: ContextArgs) -> Result<(), AppError> {
    let store = JsonFileSummaryStore::new(args.store.unwrap_or_else(|| config.store.path.clone()));
    let context = context_for(args.assistant, &store, args.employee.as_deref())?;

    println!("{} context", args.assistant.label());
    println!("{context}");
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn render_batch_report(view: &BatchReportView, store_path: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Employee evaluation batch");
    let _ = writeln!(
        out,
        "- {} evaluated | {} skipped",
        view.evaluated, view.skipped
    );
    match (&view.persistence_error, view.stored_total) {
        (Some(err), _) => {
            let _ = writeln!(out, "- Summaries NOT saved to {store_path}: {err}");
        }
        (None, Some(total)) => {
            let _ = writeln!(out, "- {total} summaries stored in {store_path}");
        }
        (None, None) => {}
    }

    if !view.skipped_employees.is_empty() {
        let _ = writeln!(out, "\nSkipped employees:");
        for skipped in &view.skipped_employees {
            let _ = writeln!(out, "  - {}: {}", skipped.employee_id, skipped.reason);
        }
    }

    let _ = writeln!(out, "\nPer-employee results:");
    for record in view.summaries.values() {
        let issues = if record.bad_metrics.is_empty() {
            "none".to_string()
        } else {
            record
                .bad_metrics
                .iter()
                .map(|metric| metric.label())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let _ = writeln!(
            out,
            "  - {} {} | {} summary | issues: {} | psychologist: {} | conflict resolution: {}",
            record.employee_id,
            record.employee_name,
            record.summary_source.label(),
            issues,
            yes_no(record.need_psychologist),
            yes_no(record.need_conflict_resolution),
        );
    }

    if !view.metric_issues.entries.is_empty() {
        let _ = writeln!(out, "\nMetric issues:");
        for entry in &view.metric_issues.entries {
            let _ = writeln!(out, "  - {}: {}", entry.metric, entry.count);
        }
    }

    for (heading, flagged) in [
        ("Needs psychologist", &view.psychologist),
        ("Needs conflict resolution", &view.conflict_resolution),
    ] {
        if flagged.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n{heading}:");
        for (position, employee) in flagged.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {}. {} ({})",
                position + 1,
                employee.employee_name,
                employee.employee_id
            );
        }
    }

    out
}

fn render_summaries(records: &[EvaluationRecord]) -> String {
    if records.is_empty() {
        return "No stored summaries.\n".to_string();
    }

    let mut out = String::new();
    for record in records {
        let _ = writeln!(
            out,
            "{} {} ({}, {} summary)",
            record.employee_id,
            record.employee_name,
            record.created_at.format("%Y-%m-%d %H:%M UTC"),
            record.summary_source.label(),
        );
        for line in record.summary.lines() {
            let _ = writeln!(out, "  {line}");
        }
    }
    out
}
