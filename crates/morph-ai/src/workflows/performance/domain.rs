use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable employee identifier shared by the KPI tables, the survey table, and the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub String);

impl EmployeeId {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self(value.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EmployeeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One employee's KPI figures for a single reporting week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSnapshot {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub tasks_completed: u32,
    pub time_per_task_hours: f64,
    pub error_rate_pct: f64,
    pub customer_satisfaction_pct: f64,
    pub attendance_pct: f64,
    pub punctuality_pct: f64,
    pub individual_goal_pct: f64,
    pub team_goal_pct: f64,
    pub vision_contribution: f64,
    pub communication_score: f64,
    pub teamwork_score: f64,
}

/// KPI dimensions checked against fixed thresholds, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KpiMetric {
    #[serde(rename = "number of tasks")]
    TasksCompleted,
    #[serde(rename = "time per task")]
    TimePerTask,
    #[serde(rename = "error rate")]
    ErrorRate,
    #[serde(rename = "customer satisfaction")]
    CustomerSatisfaction,
}

impl KpiMetric {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::TasksCompleted,
            Self::TimePerTask,
            Self::ErrorRate,
            Self::CustomerSatisfaction,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::TasksCompleted => "number of tasks",
            Self::TimePerTask => "time per task",
            Self::ErrorRate => "error rate",
            Self::CustomerSatisfaction => "customer satisfaction",
        }
    }
}

impl fmt::Display for KpiMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Questions of the monthly survey, in questionnaire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurveyQuestion {
    SelfPerformance,
    GoalsAchieved,
    PersonalChallenges,
    StressOrAnxiety,
    RelationshipWithColleagues,
    CommunicationIssues,
    TeamConflicts,
    TeamCollaboration,
}

impl SurveyQuestion {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::SelfPerformance,
            Self::GoalsAchieved,
            Self::PersonalChallenges,
            Self::StressOrAnxiety,
            Self::RelationshipWithColleagues,
            Self::CommunicationIssues,
            Self::TeamConflicts,
            Self::TeamCollaboration,
        ]
    }

    /// Label used when the answer is quoted in a prompt.
    pub const fn label(self) -> &'static str {
        match self {
            Self::SelfPerformance => "Self-Performance",
            Self::GoalsAchieved => "Goals Achieved",
            Self::PersonalChallenges => "Personal Challenges",
            Self::StressOrAnxiety => "Stress/Anxiety",
            Self::RelationshipWithColleagues => "Relationship with Colleagues",
            Self::CommunicationIssues => "Communication Issues",
            Self::TeamConflicts => "Team Conflicts",
            Self::TeamCollaboration => "Team Collaboration",
        }
    }
}

/// Free-text answers of one employee to the monthly survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyResponse {
    pub employee_id: EmployeeId,
    pub answers: BTreeMap<SurveyQuestion, String>,
}

impl SurveyResponse {
    pub fn new(employee_id: EmployeeId) -> Self {
        Self {
            employee_id,
            answers: BTreeMap::new(),
        }
    }

    pub fn with_answer(mut self, question: SurveyQuestion, text: impl Into<String>) -> Self {
        self.answers.insert(question, text.into());
        self
    }

    pub fn answer(&self, question: SurveyQuestion) -> Option<&str> {
        self.answers.get(&question).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Maps classifier vocabularies ("Very Negative", "NEG", "neutral", ...) onto the three labels.
    pub fn parse(raw: &str) -> Option<Self> {
        let lowered = raw.trim().to_ascii_lowercase();
        if lowered.contains("neg") {
            Some(Self::Negative)
        } else if lowered.contains("pos") {
            Some(Self::Positive)
        } else if lowered.contains("neu") {
            Some(Self::Neutral)
        } else {
            None
        }
    }
}

/// Classifier verdict for a snippet of text. The label always decides the sign of the score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    pub score: f64,
}

impl SentimentResult {
    pub const fn neutral() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            score: 0.0,
        }
    }

    /// Clamps `raw_score` into [-1, 1] and forces its sign to agree with `label`.
    pub fn normalized(label: SentimentLabel, raw_score: f64) -> Self {
        let magnitude = if raw_score.is_finite() {
            raw_score.abs().min(1.0)
        } else {
            0.0
        };

        let score = match label {
            SentimentLabel::Positive => magnitude,
            SentimentLabel::Negative => -magnitude,
            SentimentLabel::Neutral => 0.0,
        };

        Self { label, score }
    }

    pub fn is_negative_below(&self, threshold: f64) -> bool {
        self.label == SentimentLabel::Negative && self.score < threshold
    }
}

/// Sections of the structured summary, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SummarySection {
    PerformanceSummary,
    Comparison,
    ImprovementAreas,
    Recommendation,
}

impl SummarySection {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::PerformanceSummary,
            Self::Comparison,
            Self::ImprovementAreas,
            Self::Recommendation,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::PerformanceSummary => "Performance Summary",
            Self::Comparison => "Comparison",
            Self::ImprovementAreas => "Improvement Areas",
            Self::Recommendation => "Recommendation",
        }
    }

    /// Label as it appears in model output, including the trailing colon.
    pub const fn marker(self) -> &'static str {
        match self {
            Self::PerformanceSummary => "Performance Summary:",
            Self::Comparison => "Comparison:",
            Self::ImprovementAreas => "Improvement Areas:",
            Self::Recommendation => "Recommendation:",
        }
    }
}

pub const NO_INFORMATION: &str = "No information available";

/// Four-section narrative attached to every evaluation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredSummary {
    pub performance_summary: String,
    pub comparison: String,
    pub improvement_areas: String,
    pub recommendation: String,
}

impl Default for StructuredSummary {
    fn default() -> Self {
        Self {
            performance_summary: NO_INFORMATION.to_string(),
            comparison: NO_INFORMATION.to_string(),
            improvement_areas: NO_INFORMATION.to_string(),
            recommendation: NO_INFORMATION.to_string(),
        }
    }
}

impl StructuredSummary {
    pub fn section(&self, section: SummarySection) -> &str {
        match section {
            SummarySection::PerformanceSummary => &self.performance_summary,
            SummarySection::Comparison => &self.comparison,
            SummarySection::ImprovementAreas => &self.improvement_areas,
            SummarySection::Recommendation => &self.recommendation,
        }
    }

    pub fn set_section(&mut self, section: SummarySection, content: String) {
        let slot = match section {
            SummarySection::PerformanceSummary => &mut self.performance_summary,
            SummarySection::Comparison => &mut self.comparison,
            SummarySection::ImprovementAreas => &mut self.improvement_areas,
            SummarySection::Recommendation => &mut self.recommendation,
        };
        *slot = content;
    }

    /// Combined `Label: value` rendering, one section per line.
    pub fn to_text(&self) -> String {
        SummarySection::ordered()
            .into_iter()
            .map(|section| format!("{} {}", section.marker(), self.section(section)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Whether a summary came from the language model or from the deterministic rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarySource {
    Model,
    RuleBased,
}

impl SummarySource {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::RuleBased => "rule-based",
        }
    }
}

/// KPI figures copied into the persisted record for dashboards and assistants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub tasks_completed: u32,
    pub time_per_task: f64,
    pub error_rate: f64,
    pub customer_satisfaction: f64,
    pub team_goal_achievement: f64,
}

impl From<&KpiSnapshot> for PerformanceMetrics {
    fn from(snapshot: &KpiSnapshot) -> Self {
        Self {
            tasks_completed: snapshot.tasks_completed,
            time_per_task: snapshot.time_per_task_hours,
            error_rate: snapshot.error_rate_pct,
            customer_satisfaction: snapshot.customer_satisfaction_pct,
            team_goal_achievement: snapshot.team_goal_pct,
        }
    }
}

/// Persisted outcome of evaluating one employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub bad_metrics: Vec<KpiMetric>,
    pub need_psychologist: bool,
    pub need_conflict_resolution: bool,
    pub structured_summary: StructuredSummary,
    pub summary: String,
    pub summary_source: SummarySource,
    pub performance_metrics: PerformanceMetrics,
    pub created_at: DateTime<Utc>,
}

/// Employee routed to one of the intervention services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlaggedEmployee {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub summary: String,
}

impl From<&EvaluationRecord> for FlaggedEmployee {
    fn from(record: &EvaluationRecord) -> Self {
        Self {
            employee_id: record.employee_id.clone(),
            employee_name: record.employee_name.clone(),
            summary: record.summary.clone(),
        }
    }
}
