use std::fs;
use std::path::PathBuf;

use morph_ai::workflows::ingest::{DatasetImportError, PerformanceDatasetImporter};
use morph_ai::workflows::performance::{EmployeeId, SurveyQuestion};

const KPI: &str = "\
Employee ID,Employee Name,Productivity: Number of tasks completed,Productivity: Time to complete tasks (hours/task),Quality of Work: Error rate (%),Quality of Work: Customer satisfaction rate (%),Presence and Punctuality: Attendance rate (%),Presence and Punctuality: Punctuality rate (%),Goals and Objectives: Individual goal achievement (%),Goals and Objectives: Team goal achievement (%),Goals and Objectives: Contribution to company vision (1-5),Collaboration and Teamwork: Communication skills (1-5),Collaboration and Teamwork: Ability to work in a team (1-5)
\u{feff}EMP001,John Smith,18,2.5,3.2,88.0,97.0,95.0,90.0,85.0,4.0,4.5,4.0

EMP002,Jane Doe,12,3.6,6.1,74.5,92.0,90.0,70.0,65.0,3.0,3.5,3.0
";

const SURVEY: &str = "\
Employee ID,Employee Name,Self-Performance,Goals Achieved,Personal Challenges,Stress or Anxiety,Relationship with Colleagues,Communication Issues,Team Conflicts,Team Collaboration
EMP002,Jane Doe,Average,Partly,Childcare,Constantly worried,Good,Some,None,Good
";

fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

#[test]
fn imports_all_three_tables_from_disk() {
    let dir = tempfile::tempdir().expect("temp dir");
    let current = write(&dir, "current.csv", KPI);
    let prior = write(&dir, "prior.csv", KPI);
    let survey = write(&dir, "survey.csv", SURVEY);

    let dataset = PerformanceDatasetImporter::from_paths(current, Some(prior), Some(survey))
        .expect("dataset imports");

    let john = EmployeeId::from("EMP001");
    assert_eq!(dataset.current.len(), 2);
    assert!(dataset.current.get(&john).is_some(), "byte order mark stripped from id");
    assert_eq!(
        dataset.prior_for(&john).map(|row| row.tasks_completed),
        Some(18)
    );

    let jane = EmployeeId::from("EMP002");
    let answers = dataset.survey_for(&jane).expect("jane answered");
    assert_eq!(
        answers.answer(SurveyQuestion::StressOrAnxiety),
        Some("Constantly worried")
    );
    assert!(dataset.survey_for(&john).is_none());
}

#[test]
fn optional_tables_may_be_absent() {
    let dir = tempfile::tempdir().expect("temp dir");
    let current = write(&dir, "current.csv", KPI);

    let dataset = PerformanceDatasetImporter::from_paths(current, None, None)
        .expect("current table alone is enough");

    assert!(dataset.prior.is_none());
    assert!(dataset.surveys.is_none());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("missing.csv");

    let err = PerformanceDatasetImporter::from_paths(missing, None, None)
        .expect_err("missing file rejected");
    assert!(matches!(err, DatasetImportError::Io(_)));
}

#[test]
fn invalid_prior_row_names_the_prior_table() {
    let dir = tempfile::tempdir().expect("temp dir");
    let current = write(&dir, "current.csv", KPI);
    let prior = write(
        &dir,
        "prior.csv",
        &KPI.replace("18,2.5,3.2", "18,0,3.2"),
    );

    let err = PerformanceDatasetImporter::from_paths(current, Some(prior), None)
        .expect_err("zero time per task rejected");
    match err {
        DatasetImportError::InvalidRow { table, line, reason } => {
            assert_eq!(table, "prior KPI");
            assert_eq!(line, 2);
            assert!(reason.contains("time per task"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
