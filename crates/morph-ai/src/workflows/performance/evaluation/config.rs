use serde::{Deserialize, Serialize};

/// Fixed KPI thresholds applied to the current reporting week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricThresholds {
    pub min_tasks_completed: u32,
    pub max_time_per_task_hours: f64,
    pub max_error_rate_pct: f64,
    pub min_customer_satisfaction_pct: f64,
}

impl Default for MetricThresholds {
    fn default() -> Self {
        Self {
            min_tasks_completed: 15,
            max_time_per_task_hours: 3.0,
            max_error_rate_pct: 5.0,
            min_customer_satisfaction_pct: 80.0,
        }
    }
}

/// Sentiment cut-offs below which a negative survey answer triggers an intervention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentThresholds {
    pub stress_threshold: f64,
    pub conflict_threshold: f64,
}

impl Default for SentimentThresholds {
    fn default() -> Self {
        Self {
            stress_threshold: -0.3,
            conflict_threshold: -0.3,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    pub metrics: MetricThresholds,
    pub sentiment: SentimentThresholds,
}

impl EvaluationConfig {
    pub fn validate(&self) -> Result<(), InvalidThreshold> {
        for (name, value) in [
            ("stress_threshold", self.sentiment.stress_threshold),
            ("conflict_threshold", self.sentiment.conflict_threshold),
        ] {
            if !(-1.0..0.0).contains(&value) {
                return Err(InvalidThreshold { name, value });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{name} must lie in [-1, 0), got {value}")]
pub struct InvalidThreshold {
    pub name: &'static str,
    pub value: f64,
}
