use std::fs;

use chrono::{TimeZone, Utc};
use morph_ai::workflows::performance::{
    export_summaries_csv, write_summaries_csv, EmployeeId, EvaluationRecord, PerformanceMetrics,
    StructuredSummary, SummarySource,
};

fn record(id: &str, name: &str) -> EvaluationRecord {
    let structured_summary = StructuredSummary {
        performance_summary: "good".to_string(),
        comparison: "Performance improved (tasks +3, error -0.80%).".to_string(),
        improvement_areas: "No areas requiring urgent improvement.".to_string(),
        recommendation: "Not needed".to_string(),
    };
    EvaluationRecord {
        employee_id: EmployeeId::from(id),
        employee_name: name.to_string(),
        bad_metrics: Vec::new(),
        need_psychologist: false,
        need_conflict_resolution: false,
        summary: structured_summary.to_text(),
        structured_summary,
        summary_source: SummarySource::Model,
        performance_metrics: PerformanceMetrics {
            tasks_completed: 18,
            time_per_task: 2.5,
            error_rate: 3.2,
            customer_satisfaction: 88.0,
            team_goal_achievement: 85.0,
        },
        created_at: Utc
            .with_ymd_and_hms(2025, 3, 10, 9, 0, 0)
            .single()
            .expect("valid timestamp"),
    }
}

#[test]
fn export_writes_header_and_one_row_per_record() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("reports").join("employee_summaries.csv");
    let records = vec![record("EMP001", "John Smith"), record("EMP002", "Jane Doe")];

    let written = export_summaries_csv(&path, &records).expect("export succeeds");
    assert_eq!(written, 2);

    let mut reader = csv::Reader::from_path(&path).expect("export readable");
    let headers = reader.headers().expect("header row").clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["Employee ID", "Employee Name", "Summary"]
    );

    let rows: Vec<csv::StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .expect("rows parse");
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][0], "EMP001");
    assert_eq!(&rows[1][1], "Jane Doe");
    assert_eq!(&rows[0][2], records[0].summary);
    assert!(rows[0][2].contains("\nComparison: Performance improved"));
}

#[test]
fn empty_export_still_carries_the_header() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("employee_summaries.csv");

    let written = export_summaries_csv(&path, &Vec::new()).expect("export succeeds");

    assert_eq!(written, 0);
    assert_eq!(
        fs::read_to_string(&path).expect("file written"),
        "Employee ID,Employee Name,Summary\n"
    );
}

#[test]
fn fields_with_separators_are_quoted() {
    let mut buffer = Vec::new();
    let mut awkward = record("EMP003", "Johnson, Michael");
    awkward.summary = "Recommendation: \"pair\" with a mentor".to_string();

    write_summaries_csv(&mut buffer, [&awkward]).expect("write succeeds");

    let text = String::from_utf8(buffer).expect("utf-8 export");
    assert_eq!(
        text,
        "Employee ID,Employee Name,Summary\n\
         EMP003,\"Johnson, Michael\",\"Recommendation: \"\"pair\"\" with a mentor\"\n"
    );
}
