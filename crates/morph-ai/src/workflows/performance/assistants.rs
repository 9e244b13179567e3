//! Read-side views over the summary store for the three chat assistants.
//!
//! Each assistant gets a context block that is prepended to the user's message before it
//! reaches the text-generation model. The sidekick additionally scans messages for
//! stress and conflict vocabulary and offers the matching support service.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use super::domain::{EvaluationRecord, FlaggedEmployee, StructuredSummary};
use super::gateways::{LlmError, SummaryGenerator};
use super::repository::{RepositoryError, SummaryStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssistantKind {
    Sidekick,
    Psycholog,
    Conflict,
}

impl AssistantKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sidekick => "Sidekick",
            Self::Psycholog => "Psycholog",
            Self::Conflict => "Conflict Resolution",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sidekick" => Some(Self::Sidekick),
            "psycholog" | "psychologist" => Some(Self::Psycholog),
            "conflict" | "conflict-resolution" | "conflict_resolution" => Some(Self::Conflict),
            _ => None,
        }
    }
}

const PSYCHOLOGICAL_KEYWORDS: [&str; 14] = [
    "stress",
    "anxiety",
    "worried",
    "depressed",
    "overwhelmed",
    "burnout",
    "tired",
    "exhausted",
    "mental health",
    "sad",
    "unhappy",
    "feel bad",
    "can't sleep",
    "trouble sleeping",
];

const CONFLICT_KEYWORDS: [&str; 11] = [
    "argument",
    "conflict",
    "disagreement",
    "team issues",
    "colleague",
    "fighting",
    "tension",
    "teammates",
    "communication problems",
    "misunderstanding",
    "clash",
];

pub fn flagged_for_psychologist<S: SummaryStore + ?Sized>(
    store: &S,
) -> Result<Vec<FlaggedEmployee>, RepositoryError> {
    Ok(store
        .all()?
        .values()
        .filter(|record| record.need_psychologist)
        .map(FlaggedEmployee::from)
        .collect())
}

pub fn flagged_for_conflict_resolution<S: SummaryStore + ?Sized>(
    store: &S,
) -> Result<Vec<FlaggedEmployee>, RepositoryError> {
    Ok(store
        .all()?
        .values()
        .filter(|record| record.need_conflict_resolution)
        .map(FlaggedEmployee::from)
        .collect())
}

/// Context for the assistant `kind`, focused on `employee` when that name is on record.
pub fn context_for<S: SummaryStore + ?Sized>(
    kind: AssistantKind,
    store: &S,
    employee: Option<&str>,
) -> Result<String, RepositoryError> {
    match kind {
        AssistantKind::Sidekick => sidekick_context(store, employee),
        AssistantKind::Psycholog => psycholog_context(store, employee),
        AssistantKind::Conflict => conflict_context(store, employee),
    }
}

fn lookup<S: SummaryStore + ?Sized>(
    store: &S,
    employee: Option<&str>,
) -> Result<Option<EvaluationRecord>, RepositoryError> {
    match employee.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => store.find_by_name(name),
        None => Ok(None),
    }
}

pub fn sidekick_context<S: SummaryStore + ?Sized>(
    store: &S,
    employee: Option<&str>,
) -> Result<String, RepositoryError> {
    if let Some(record) = lookup(store, employee)? {
        let metrics = &record.performance_metrics;
        let mut context = format!(
            "Employee Performance Context for {}:\n\n{}\n\nPerformance Metrics:\n\
             - Tasks Completed: {}\n\
             - Time per Task: {} hours\n\
             - Error Rate: {}%\n\
             - Customer Satisfaction: {}%\n",
            record.employee_name,
            record.summary,
            metrics.tasks_completed,
            metrics.time_per_task,
            metrics.error_rate,
            metrics.customer_satisfaction,
        );
        if record.need_psychologist {
            context.push_str("\nNOTE: This employee may benefit from psychological support.");
        }
        if record.need_conflict_resolution {
            context.push_str("\nNOTE: This employee may benefit from conflict resolution support.");
        }
        return Ok(context);
    }

    let records = store.all()?;
    if records.is_empty() {
        return Ok("No employee performance data available.".to_string());
    }

    let need_psych = records.values().filter(|record| record.need_psychologist).count();
    let need_conflict = records
        .values()
        .filter(|record| record.need_conflict_resolution)
        .count();

    Ok(format!(
        "Team Performance Context:\n\
         - Total employees analyzed: {}\n\
         - Employees potentially needing psychological support: {need_psych}\n\
         - Employees potentially needing conflict resolution: {need_conflict}\n",
        records.len(),
    ))
}

fn focused_sections(summary: &StructuredSummary) -> String {
    format!(
        "Areas for improvement:\n{}\n\nRecommendation:\n{}\n",
        summary.improvement_areas, summary.recommendation
    )
}

fn numbered_names(heading: &str, employees: &[FlaggedEmployee]) -> String {
    let mut context = format!("{heading}:\n\n");
    for (position, employee) in employees.iter().enumerate() {
        let _ = writeln!(context, "{}. {}", position + 1, employee.employee_name);
    }
    context
}

pub fn psycholog_context<S: SummaryStore + ?Sized>(
    store: &S,
    employee: Option<&str>,
) -> Result<String, RepositoryError> {
    if let Some(record) = lookup(store, employee)? {
        let summary = &record.structured_summary;
        let mut context = format!(
            "Psychological Context for {}:\n\n{}\n\n{}",
            record.employee_name,
            summary.performance_summary,
            focused_sections(summary),
        );
        if record.need_psychologist {
            context.push_str(
                "\n\nNOTE: The employee has shown indicators of stress or anxiety that may require support.",
            );
        }
        return Ok(context);
    }

    let employees = flagged_for_psychologist(store)?;
    if employees.is_empty() {
        return Ok("No employees currently flagged as needing psychological support.".to_string());
    }
    Ok(numbered_names(
        "Employees potentially needing psychological support",
        &employees,
    ))
}

pub fn conflict_context<S: SummaryStore + ?Sized>(
    store: &S,
    employee: Option<&str>,
) -> Result<String, RepositoryError> {
    if let Some(record) = lookup(store, employee)? {
        let summary = &record.structured_summary;
        let mut context = format!(
            "Conflict Resolution Context for {}:\n\n{}\n\n\
             Team collaboration metrics:\n\
             - Team goal achievement: {}%\n\n{}",
            record.employee_name,
            summary.performance_summary,
            record.performance_metrics.team_goal_achievement,
            focused_sections(summary),
        );
        if record.need_conflict_resolution {
            context.push_str(
                "\n\nNOTE: The employee has shown indicators of team conflicts that may require mediation.",
            );
        }
        return Ok(context);
    }

    let employees = flagged_for_conflict_resolution(store)?;
    if employees.is_empty() {
        return Ok("No employees currently flagged as needing conflict resolution.".to_string());
    }
    Ok(numbered_names(
        "Employees potentially needing conflict resolution",
        &employees,
    ))
}

/// Support services suggested for a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceRecommendation {
    pub need_psychologist: bool,
    pub need_conflict_resolution: bool,
    pub offer: String,
}

impl ServiceRecommendation {
    pub fn is_empty(&self) -> bool {
        !self.need_psychologist && !self.need_conflict_resolution
    }
}

/// Keyword scan of `message`, OR-ed with the stored flags of `employee` when known.
pub fn recommend_services(
    message: &str,
    employee: Option<&EvaluationRecord>,
) -> ServiceRecommendation {
    let lowered = message.to_lowercase();
    let mentions = |keywords: &[&str]| keywords.iter().any(|keyword| lowered.contains(keyword));

    let need_psychologist = mentions(&PSYCHOLOGICAL_KEYWORDS)
        || employee.is_some_and(|record| record.need_psychologist);
    let need_conflict_resolution = mentions(&CONFLICT_KEYWORDS)
        || employee.is_some_and(|record| record.need_conflict_resolution);

    let offer = match (need_psychologist, need_conflict_resolution) {
        (true, true) => "Based on our conversation, you might benefit from both:\n\
             1. Speaking with a psychologist about stress management\n\
             2. Using our conflict resolution tools to address team dynamics\n\n\
             Would you like me to connect you with either service?",
        (true, false) => "Based on our conversation, you might benefit from speaking with our \
             psychological support service about stress management and personal well-being.\n\n\
             Would you like me to connect you to the Psycholog service?",
        (false, true) => "Based on our conversation, you might benefit from our conflict \
             resolution tools to help address team dynamics and communication.\n\n\
             Would you like me to connect you to the Conflict Resolution service?",
        (false, false) => "",
    };

    ServiceRecommendation {
        need_psychologist,
        need_conflict_resolution,
        offer: offer.to_string(),
    }
}

/// First stored employee whose name appears in `message`, longest name first.
pub fn mentioned_employee<S: SummaryStore + ?Sized>(
    store: &S,
    message: &str,
) -> Result<Option<EvaluationRecord>, RepositoryError> {
    let lowered = message.to_lowercase();
    let mut candidates: Vec<EvaluationRecord> = store
        .all()?
        .into_values()
        .filter(|record| {
            let name = record.employee_name.trim().to_lowercase();
            !name.is_empty() && lowered.contains(&name)
        })
        .collect();
    candidates.sort_by_key(|record| std::cmp::Reverse(record.employee_name.len()));
    Ok(candidates.into_iter().next())
}

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Model(#[from] LlmError),
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub assistant: AssistantKind,
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<ServiceRecommendation>,
}

/// Answers one chat turn with the assistant's store context prepended.
pub fn respond<S: SummaryStore + ?Sized>(
    kind: AssistantKind,
    store: &S,
    generator: &dyn SummaryGenerator,
    message: &str,
    employee: Option<&str>,
) -> Result<ChatReply, AssistantError> {
    let context = context_for(kind, store, employee)?;
    let prompt = format!("{context}\n\nUser: {message}\n\nAssistant:");
    let mut reply = generator.converse(&prompt)?;

    let recommendation = if kind == AssistantKind::Sidekick {
        let record = match lookup(store, employee)? {
            Some(record) => Some(record),
            None => mentioned_employee(store, message)?,
        };
        Some(recommend_services(message, record.as_ref())).filter(|rec| !rec.is_empty())
    } else {
        None
    };

    if let Some(recommendation) = &recommendation {
        reply.push_str("\n\n");
        reply.push_str(&recommendation.offer);
    }

    Ok(ChatReply {
        assistant: kind,
        reply,
        recommendation,
    })
}
