use std::sync::Arc;

use super::common::*;
use crate::workflows::performance::domain::{
    EmployeeId, KpiMetric, SentimentLabel, SentimentResult, SurveyQuestion, SurveyResponse,
};
use crate::workflows::performance::evaluation::{
    EvaluationConfig, InterventionDetector, MetricEvaluator, SentimentThresholds,
};
use crate::workflows::performance::fallback::RuleBasedFallback;

const OVERWHELMED: &str = "I am completely overwhelmed and cannot sleep";

fn survey(stress: Option<&str>, conflict: Option<&str>) -> SurveyResponse {
    let mut response = SurveyResponse::new(EmployeeId::from("EMP001"));
    if let Some(text) = stress {
        response = response.with_answer(SurveyQuestion::StressOrAnxiety, text);
    }
    if let Some(text) = conflict {
        response = response.with_answer(SurveyQuestion::TeamConflicts, text);
    }
    response
}

#[test]
fn struggling_week_fails_every_metric_in_order() {
    let evaluator = MetricEvaluator::default();
    let failing = evaluator.evaluate(&struggling("EMP001", "John Smith"));
    assert_eq!(
        failing,
        vec![
            KpiMetric::TasksCompleted,
            KpiMetric::TimePerTask,
            KpiMetric::ErrorRate,
            KpiMetric::CustomerSatisfaction,
        ]
    );
    let labels: Vec<&str> = failing.iter().map(|metric| metric.label()).collect();
    assert_eq!(
        labels,
        ["number of tasks", "time per task", "error rate", "customer satisfaction"]
    );
}

#[test]
fn compliant_week_without_prior_or_survey_gets_neutral_fallback() {
    let current = compliant("EMP002", "Jane Doe");
    let failing = MetricEvaluator::default().evaluate(&current);
    assert!(failing.is_empty());

    let summary = RuleBasedFallback::new().summarize(&current, None, &failing, false, false);
    assert_eq!(summary.performance_summary, "good");
    assert_eq!(summary.comparison, "No comparison data available.");
    assert_eq!(summary.improvement_areas, "No areas requiring urgent improvement.");
    assert_eq!(summary.recommendation, "Not needed");
}

#[test]
fn task_threshold_flags_exactly_below_fifteen() {
    let evaluator = MetricEvaluator::default();
    for tasks in 0..40 {
        let failing = evaluator.evaluate(&snapshot("EMP003", "Michael Johnson", tasks, 2.0, 2.0, 90.0));
        assert_eq!(
            failing.contains(&KpiMetric::TasksCompleted),
            tasks < 15,
            "tasks={tasks}"
        );
        assert_eq!(failing.is_empty(), tasks >= 15, "tasks={tasks}");
    }
}

#[test]
fn thresholds_are_inclusive_at_the_boundary() {
    let evaluator = MetricEvaluator::default();
    assert!(evaluator
        .evaluate(&snapshot("EMP004", "Sarah Williams", 15, 3.0, 5.0, 80.0))
        .is_empty());
    assert_eq!(
        evaluator.evaluate(&snapshot("EMP004", "Sarah Williams", 15, 3.01, 5.0, 79.99)),
        vec![KpiMetric::TimePerTask, KpiMetric::CustomerSatisfaction]
    );
}

#[test]
fn negative_stress_answer_routes_to_psychologist() {
    let classifier =
        Arc::new(ScriptedClassifier::default().with(OVERWHELMED, SentimentLabel::Negative, 0.6));
    let detector = InterventionDetector::new(classifier.clone(), SentimentThresholds::default());

    let outcome = detector.detect(Some(&survey(Some(OVERWHELMED), None)));

    assert!(outcome.need_psychologist);
    assert!(!outcome.need_conflict_resolution);
    assert_eq!(
        outcome.stress_sentiment,
        Some(SentimentResult::normalized(SentimentLabel::Negative, -0.6))
    );
    assert_eq!(classifier.calls(), 1);
}

#[test]
fn short_answers_never_reach_the_classifier() {
    let classifier = Arc::new(ScriptedClassifier::default());
    let detector = InterventionDetector::new(classifier.clone(), SentimentThresholds::default());

    for text in ["", "sad", "  bad  ", "12345", " tired "] {
        let outcome = detector.detect(Some(&survey(Some(text), Some(text))));
        assert!(!outcome.need_psychologist, "text={text:?}");
        assert!(!outcome.need_conflict_resolution, "text={text:?}");
    }
    assert_eq!(classifier.calls(), 0);
}

#[test]
fn missing_survey_is_not_negative_sentiment() {
    let classifier = Arc::new(ScriptedClassifier::default());
    let detector = InterventionDetector::new(classifier.clone(), SentimentThresholds::default());

    let outcome = detector.detect(None);

    assert!(!outcome.need_psychologist);
    assert!(!outcome.need_conflict_resolution);
    assert_eq!(classifier.calls(), 0);
}

#[test]
fn score_at_threshold_is_not_flagged() {
    let conflict = "We keep arguing in every stand-up";
    let classifier =
        Arc::new(ScriptedClassifier::default().with(conflict, SentimentLabel::Negative, 0.3));
    let detector = InterventionDetector::new(classifier, SentimentThresholds::default());

    let outcome = detector.detect(Some(&survey(None, Some(conflict))));

    assert!(!outcome.need_conflict_resolution);
}

#[test]
fn positive_answers_are_never_flagged_even_with_large_scores() {
    let text = "Things are calm and the team is supportive";
    let classifier =
        Arc::new(ScriptedClassifier::default().with(text, SentimentLabel::Positive, -0.95));
    let detector = InterventionDetector::new(classifier, SentimentThresholds::default());

    let outcome = detector.detect(Some(&survey(Some(text), Some(text))));

    assert!(!outcome.need_psychologist);
    assert!(!outcome.need_conflict_resolution);
    assert_eq!(outcome.stress_sentiment.map(|result| result.score), Some(0.95));
}

#[test]
fn classifier_errors_leave_flags_clear_and_are_reported() {
    let detector = InterventionDetector::new(Arc::new(FailingClassifier), SentimentThresholds::default());

    let outcome = detector.detect(Some(&survey(
        Some(OVERWHELMED),
        Some("Constant tension with my teammates"),
    )));

    assert!(!outcome.need_psychologist);
    assert!(!outcome.need_conflict_resolution);
    assert_eq!(outcome.classifier_failures.len(), 2);
    assert!(outcome.classifier_failures[0].starts_with("Stress/Anxiety"));
}

#[test]
fn custom_thresholds_change_routing() {
    let text = "A bit stressed about the deadline";
    let classifier = Arc::new(ScriptedClassifier::default().with(text, SentimentLabel::Negative, 0.4));
    let strict = SentimentThresholds {
        stress_threshold: -0.5,
        conflict_threshold: -0.5,
    };

    let lenient = InterventionDetector::new(classifier.clone(), SentimentThresholds::default());
    let strict = InterventionDetector::new(classifier, strict);

    assert!(lenient.detect(Some(&survey(Some(text), None))).need_psychologist);
    assert!(!strict.detect(Some(&survey(Some(text), None))).need_psychologist);
}

#[test]
fn validate_rejects_thresholds_outside_negative_range() {
    let mut config = EvaluationConfig::default();
    assert!(config.validate().is_ok());

    config.sentiment.conflict_threshold = 0.0;
    let err = config.validate().expect_err("zero is outside [-1, 0)");
    assert_eq!(err.name, "conflict_threshold");

    config.sentiment.conflict_threshold = -1.2;
    assert!(config.validate().is_err());
}

#[test]
fn normalization_lets_the_label_decide_the_sign() {
    let cases = [
        (SentimentLabel::Positive, -0.7, 0.7),
        (SentimentLabel::Positive, 1.8, 1.0),
        (SentimentLabel::Negative, 0.45, -0.45),
        (SentimentLabel::Negative, -3.0, -1.0),
        (SentimentLabel::Neutral, 0.9, 0.0),
        (SentimentLabel::Negative, f64::NAN, 0.0),
    ];

    for (label, raw, expected) in cases {
        let result = SentimentResult::normalized(label, raw);
        assert_eq!(result.label, label);
        assert_eq!(result.score, expected, "label={label:?} raw={raw}");
    }
}
