use std::io::Read;

use serde::{Deserialize, Deserializer};

use super::normalizer::{normalize_id, normalize_name};
use crate::workflows::performance::domain::{
    EmployeeId, KpiSnapshot, SurveyQuestion, SurveyResponse,
};

/// Row-level validation failure with the CSV line it came from.
#[derive(Debug)]
pub(crate) struct RowIssue {
    pub(crate) line: u64,
    pub(crate) reason: String,
}

pub(crate) enum ParseFailure {
    Csv(csv::Error),
    Row(RowIssue),
}

impl From<csv::Error> for ParseFailure {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

fn rows<R, T>(reader: R) -> Result<Vec<(u64, T)>, ParseFailure>
where
    R: Read,
    T: for<'de> Deserialize<'de>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let mut parsed = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let line = record
            .position()
            .map(|position| position.line())
            .unwrap_or_default();
        let row = record.deserialize(Some(&headers))?;
        parsed.push((line, row));
    }
    Ok(parsed)
}

fn row_issue(line: u64, reason: String) -> ParseFailure {
    ParseFailure::Row(RowIssue { line, reason })
}

pub(crate) fn parse_kpi_rows<R: Read>(reader: R) -> Result<Vec<KpiSnapshot>, ParseFailure> {
    rows::<R, KpiRow>(reader)?
        .into_iter()
        .map(|(line, row)| row.into_snapshot().map_err(|reason| row_issue(line, reason)))
        .collect()
}

pub(crate) fn parse_survey_rows<R: Read>(reader: R) -> Result<Vec<SurveyResponse>, ParseFailure> {
    rows::<R, SurveyRow>(reader)?
        .into_iter()
        .map(|(line, row)| row.into_response().map_err(|reason| row_issue(line, reason)))
        .collect()
}

#[derive(Debug, Deserialize)]
struct KpiRow {
    #[serde(rename = "Employee ID", alias = "employee_id")]
    employee_id: String,
    #[serde(rename = "Employee Name", alias = "employee_name")]
    employee_name: String,
    #[serde(
        rename = "Productivity: Number of tasks completed",
        alias = "tasks_completed"
    )]
    tasks_completed: f64,
    #[serde(
        rename = "Productivity: Time to complete tasks (hours/task)",
        alias = "time_per_task_hours"
    )]
    time_per_task_hours: f64,
    #[serde(rename = "Quality of Work: Error rate (%)", alias = "error_rate_pct")]
    error_rate_pct: f64,
    #[serde(
        rename = "Quality of Work: Customer satisfaction rate (%)",
        alias = "customer_satisfaction_pct"
    )]
    customer_satisfaction_pct: f64,
    #[serde(
        rename = "Presence and Punctuality: Attendance rate (%)",
        alias = "attendance_pct"
    )]
    attendance_pct: f64,
    #[serde(
        rename = "Presence and Punctuality: Punctuality rate (%)",
        alias = "punctuality_pct"
    )]
    punctuality_pct: f64,
    #[serde(
        rename = "Goals and Objectives: Individual goal achievement (%)",
        alias = "individual_goal_pct"
    )]
    individual_goal_pct: f64,
    #[serde(
        rename = "Goals and Objectives: Team goal achievement (%)",
        alias = "team_goal_pct"
    )]
    team_goal_pct: f64,
    #[serde(
        rename = "Goals and Objectives: Contribution to company vision (1-5)",
        alias = "vision_contribution"
    )]
    vision_contribution: f64,
    #[serde(
        rename = "Collaboration and Teamwork: Communication skills (1-5)",
        alias = "communication_score"
    )]
    communication_score: f64,
    #[serde(
        rename = "Collaboration and Teamwork: Ability to work in a team (1-5)",
        alias = "teamwork_score"
    )]
    teamwork_score: f64,
}

fn percentage(name: &str, value: f64) -> Result<f64, String> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{name} must be a percentage in [0, 100], got {value}"))
    }
}

fn rating(name: &str, value: f64) -> Result<f64, String> {
    if value.is_finite() && (1.0..=5.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{name} must be a score in [1, 5], got {value}"))
    }
}

impl KpiRow {
    fn into_snapshot(self) -> Result<KpiSnapshot, String> {
        let employee_id = normalize_id(&self.employee_id);
        if employee_id.is_empty() {
            return Err("employee id is empty".to_string());
        }

        if !(self.tasks_completed.is_finite()
            && self.tasks_completed >= 0.0
            && self.tasks_completed.fract() == 0.0
            && self.tasks_completed <= f64::from(u32::MAX))
        {
            return Err(format!(
                "tasks completed must be a non-negative whole number, got {}",
                self.tasks_completed
            ));
        }

        if !(self.time_per_task_hours.is_finite() && self.time_per_task_hours > 0.0) {
            return Err(format!(
                "time per task must be positive, got {}",
                self.time_per_task_hours
            ));
        }

        Ok(KpiSnapshot {
            employee_id: EmployeeId::new(employee_id),
            employee_name: normalize_name(&self.employee_name),
            tasks_completed: self.tasks_completed as u32,
            time_per_task_hours: self.time_per_task_hours,
            error_rate_pct: percentage("error rate", self.error_rate_pct)?,
            customer_satisfaction_pct: percentage(
                "customer satisfaction",
                self.customer_satisfaction_pct,
            )?,
            attendance_pct: percentage("attendance", self.attendance_pct)?,
            punctuality_pct: percentage("punctuality", self.punctuality_pct)?,
            individual_goal_pct: percentage(
                "individual goal achievement",
                self.individual_goal_pct,
            )?,
            team_goal_pct: percentage("team goal achievement", self.team_goal_pct)?,
            vision_contribution: rating(
                "contribution to company vision",
                self.vision_contribution,
            )?,
            communication_score: rating("communication skills", self.communication_score)?,
            teamwork_score: rating("teamwork", self.teamwork_score)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SurveyRow {
    #[serde(rename = "Employee ID", alias = "employee_id")]
    employee_id: String,
    #[serde(
        rename = "Self-Performance",
        alias = "self_performance",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    self_performance: Option<String>,
    #[serde(
        rename = "Goals Achieved",
        alias = "goals_achieved",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    goals_achieved: Option<String>,
    #[serde(
        rename = "Personal Challenges",
        alias = "personal_challenges",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    personal_challenges: Option<String>,
    #[serde(
        rename = "Stress or Anxiety",
        alias = "stress_or_anxiety",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    stress_or_anxiety: Option<String>,
    #[serde(
        rename = "Relationship with Colleagues",
        alias = "relationship_with_colleagues",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    relationship_with_colleagues: Option<String>,
    #[serde(
        rename = "Communication Issues",
        alias = "communication_issues",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    communication_issues: Option<String>,
    #[serde(
        rename = "Team Conflicts",
        alias = "team_conflicts",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    team_conflicts: Option<String>,
    #[serde(
        rename = "Team Collaboration",
        alias = "team_collaboration",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    team_collaboration: Option<String>,
}

impl SurveyRow {
    fn into_response(self) -> Result<SurveyResponse, String> {
        let employee_id = normalize_id(&self.employee_id);
        if employee_id.is_empty() {
            return Err("employee id is empty".to_string());
        }

        let answers = [
            (SurveyQuestion::SelfPerformance, self.self_performance),
            (SurveyQuestion::GoalsAchieved, self.goals_achieved),
            (SurveyQuestion::PersonalChallenges, self.personal_challenges),
            (SurveyQuestion::StressOrAnxiety, self.stress_or_anxiety),
            (
                SurveyQuestion::RelationshipWithColleagues,
                self.relationship_with_colleagues,
            ),
            (SurveyQuestion::CommunicationIssues, self.communication_issues),
            (SurveyQuestion::TeamConflicts, self.team_conflicts),
            (SurveyQuestion::TeamCollaboration, self.team_collaboration),
        ];

        let mut response = SurveyResponse::new(EmployeeId::new(employee_id));
        for (question, answer) in answers {
            if let Some(text) = answer {
                response = response.with_answer(question, text);
            }
        }
        Ok(response)
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
