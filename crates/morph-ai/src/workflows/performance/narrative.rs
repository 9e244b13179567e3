use std::fmt::Write;

use super::domain::{KpiSnapshot, SummarySection, SurveyQuestion, SurveyResponse};
use super::evaluation::rules::describe_thresholds;
use super::evaluation::MetricThresholds;

/// Opening phrase of the instruction prompt; the extractor cuts model output here.
pub const INSTRUCTION_PREAMBLE: &str = "You are an HR assistant";
/// Header of the embedded employee-data block.
pub const EMPLOYEE_DATA_HEADER: &str = "EMPLOYEE DATA:";
/// Header introducing the required output layout.
pub const OUTPUT_FORMAT_HEADER: &str = "Output format:";

const MISSING_ANSWER: &str = "No data";

fn format_hint(section: SummarySection) -> &'static str {
    match section {
        SummarySection::PerformanceSummary => "[good/poor and explanation]",
        SummarySection::Comparison => "[summary comparison with previous week]",
        SummarySection::ImprovementAreas => "[1-3 main areas that need improvement]",
        SummarySection::Recommendation => {
            "[psychologist/conflict resolution/not needed] and reason"
        }
    }
}

/// Builds the deterministic summary prompt for one employee.
#[derive(Debug, Clone, Default)]
pub struct NarrativeComposer {
    thresholds: MetricThresholds,
}

impl NarrativeComposer {
    pub fn new(thresholds: MetricThresholds) -> Self {
        Self { thresholds }
    }

    /// Employee-data block: identity, weekly KPIs, optional deltas and survey answers.
    pub fn performance_text(
        &self,
        current: &KpiSnapshot,
        prior: Option<&KpiSnapshot>,
        survey: Option<&SurveyResponse>,
    ) -> String {
        let mut text = String::new();

        // Writing into a String cannot fail.
        let _ = writeln!(text, "Employee Name: {}", current.employee_name);
        let _ = writeln!(text, "Employee ID: {}", current.employee_id);
        let _ = writeln!(text);
        let _ = writeln!(text, "WEEKLY KPIs:");
        let _ = writeln!(
            text,
            "- Productivity: {} tasks completed, {:.2} hours/task",
            current.tasks_completed, current.time_per_task_hours
        );
        let _ = writeln!(
            text,
            "- Work Quality: Error rate {:.2}%, Customer satisfaction {:.2}%",
            current.error_rate_pct, current.customer_satisfaction_pct
        );
        let _ = writeln!(
            text,
            "- Attendance & Punctuality: Attendance {:.2}%, Punctuality {:.2}%",
            current.attendance_pct, current.punctuality_pct
        );
        let _ = writeln!(
            text,
            "- Goals & Objectives: Individual achievement {:.2}%, Team achievement {:.2}%, Contribution {:.2}/5",
            current.individual_goal_pct, current.team_goal_pct, current.vision_contribution
        );
        let _ = writeln!(
            text,
            "- Collaboration & Teamwork: Communication {:.2}/5, Teamwork {:.2}/5",
            current.communication_score, current.teamwork_score
        );

        if let Some(prior) = prior {
            let task_delta = i64::from(current.tasks_completed) - i64::from(prior.tasks_completed);
            let _ = writeln!(text);
            let _ = writeln!(text, "COMPARISON WITH PREVIOUS WEEK:");
            let _ = writeln!(text, "- Change in number of tasks: {task_delta}");
            let _ = writeln!(
                text,
                "- Change in time per task: {:.2} hours",
                current.time_per_task_hours - prior.time_per_task_hours
            );
            let _ = writeln!(
                text,
                "- Change in error rate: {:.2}%",
                current.error_rate_pct - prior.error_rate_pct
            );
            let _ = writeln!(
                text,
                "- Change in customer satisfaction: {:.2}%",
                current.customer_satisfaction_pct - prior.customer_satisfaction_pct
            );
        }

        if let Some(survey) = survey {
            let _ = writeln!(text);
            let _ = writeln!(text, "MONTHLY SURVEY:");
            for question in SurveyQuestion::ordered() {
                let answer = survey
                    .answer(question)
                    .map(str::trim)
                    .filter(|answer| !answer.is_empty())
                    .unwrap_or(MISSING_ANSWER);
                let _ = writeln!(text, "- {}: {answer}", question.label());
            }
        }

        text.trim_end().to_string()
    }

    /// Wraps an employee-data block in the fixed instruction template.
    pub fn build_prompt(&self, performance_text: &str) -> String {
        let output_format = SummarySection::ordered()
            .into_iter()
            .map(|section| format!("{} {}", section.marker(), format_hint(section)))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "{INSTRUCTION_PREAMBLE} expert in analyzing employee performance.\n\
             \n\
             Task:\n\
             Analyze the following employee performance data and provide a summary that assesses:\n\
             1. Whether performance is good or poor (compare with threshold: {thresholds})\n\
             2. How it compares to the previous week (up/down)\n\
             3. Which areas need improvement\n\
             4. Whether this employee needs a personal psychologist or conflict resolution (based on survey)\n\
             \n\
             {EMPLOYEE_DATA_HEADER}\n\
             {performance_text}\n\
             \n\
             {OUTPUT_FORMAT_HEADER}\n\
             {output_format}\n",
            thresholds = describe_thresholds(&self.thresholds),
        )
    }

    pub fn compose(
        &self,
        current: &KpiSnapshot,
        prior: Option<&KpiSnapshot>,
        survey: Option<&SurveyResponse>,
    ) -> String {
        self.build_prompt(&self.performance_text(current, prior, survey))
    }
}
