use std::sync::Arc;

use tracing::warn;

use super::super::domain::{SentimentResult, SurveyQuestion, SurveyResponse};
use super::super::gateways::sentiment::{SentimentClassifier, MIN_CLASSIFIABLE_CHARS};
use super::config::SentimentThresholds;

/// Flags derived from the stress and team-conflict survey answers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterventionOutcome {
    pub need_psychologist: bool,
    pub need_conflict_resolution: bool,
    pub stress_sentiment: Option<SentimentResult>,
    pub conflict_sentiment: Option<SentimentResult>,
    pub classifier_failures: Vec<String>,
}

/// Routes employees to the psychologist or conflict-resolution service from survey sentiment.
pub struct InterventionDetector {
    classifier: Arc<dyn SentimentClassifier>,
    thresholds: SentimentThresholds,
}

impl InterventionDetector {
    pub fn new(classifier: Arc<dyn SentimentClassifier>, thresholds: SentimentThresholds) -> Self {
        Self {
            classifier,
            thresholds,
        }
    }

    pub fn detect(&self, survey: Option<&SurveyResponse>) -> InterventionOutcome {
        let Some(survey) = survey else {
            return InterventionOutcome::default();
        };

        let mut outcome = InterventionOutcome::default();

        outcome.stress_sentiment = self.classify_answer(
            survey,
            SurveyQuestion::StressOrAnxiety,
            &mut outcome.classifier_failures,
        );
        outcome.need_psychologist = outcome
            .stress_sentiment
            .is_some_and(|result| result.is_negative_below(self.thresholds.stress_threshold));

        outcome.conflict_sentiment = self.classify_answer(
            survey,
            SurveyQuestion::TeamConflicts,
            &mut outcome.classifier_failures,
        );
        outcome.need_conflict_resolution = outcome
            .conflict_sentiment
            .is_some_and(|result| result.is_negative_below(self.thresholds.conflict_threshold));

        outcome
    }

    fn classify_answer(
        &self,
        survey: &SurveyResponse,
        question: SurveyQuestion,
        failures: &mut Vec<String>,
    ) -> Option<SentimentResult> {
        let text = survey.answer(question)?.trim();
        if text.chars().count() <= MIN_CLASSIFIABLE_CHARS {
            return None;
        }

        match self.classifier.classify(text) {
            Ok(result) => Some(result),
            Err(err) => {
                warn!(
                    employee_id = %survey.employee_id,
                    question = question.label(),
                    error = %err,
                    "sentiment classification failed; answer left unflagged"
                );
                failures.push(format!("{}: {err}", question.label()));
                None
            }
        }
    }
}
