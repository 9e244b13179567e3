//! CSV ingestion for the weekly KPI exports and the monthly survey.
//!
//! Both the spreadsheet export headers (`Employee ID`, `Quality of Work: Error rate (%)`,
//! `Stress or Anxiety`, ...) and snake_case headers are accepted.

mod normalizer;
mod parser;

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use tracing::debug;

use crate::workflows::performance::dataset::{KpiTable, PerformanceDataset, SurveyTable};
use parser::ParseFailure;

#[derive(Debug)]
pub enum DatasetImportError {
    Io(std::io::Error),
    Csv {
        table: &'static str,
        source: csv::Error,
    },
    InvalidRow {
        table: &'static str,
        line: u64,
        reason: String,
    },
}

impl std::fmt::Display for DatasetImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetImportError::Io(err) => write!(f, "failed to read dataset file: {}", err),
            DatasetImportError::Csv { table, source } => {
                write!(f, "invalid CSV data in {} table: {}", table, source)
            }
            DatasetImportError::InvalidRow {
                table,
                line,
                reason,
            } => write!(f, "invalid row in {} table at line {}: {}", table, line, reason),
        }
    }
}

impl std::error::Error for DatasetImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatasetImportError::Io(err) => Some(err),
            DatasetImportError::Csv { source, .. } => Some(source),
            DatasetImportError::InvalidRow { .. } => None,
        }
    }
}

impl From<std::io::Error> for DatasetImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

fn import_error(table: &'static str) -> impl Fn(ParseFailure) -> DatasetImportError {
    move |failure| match failure {
        ParseFailure::Csv(source) => DatasetImportError::Csv { table, source },
        ParseFailure::Row(issue) => DatasetImportError::InvalidRow {
            table,
            line: issue.line,
            reason: issue.reason,
        },
    }
}

const CURRENT_TABLE: &str = "current KPI";
const PRIOR_TABLE: &str = "prior KPI";
const SURVEY_TABLE: &str = "survey";

pub struct PerformanceDatasetImporter;

impl PerformanceDatasetImporter {
    pub fn kpi_table_from_reader<R: Read>(
        reader: R,
        table: &'static str,
    ) -> Result<KpiTable, DatasetImportError> {
        let rows = parser::parse_kpi_rows(reader).map_err(import_error(table))?;
        debug!(table, rows = rows.len(), "parsed KPI table");
        Ok(KpiTable::from_rows(rows))
    }

    pub fn survey_table_from_reader<R: Read>(reader: R) -> Result<SurveyTable, DatasetImportError> {
        let responses = parser::parse_survey_rows(reader).map_err(import_error(SURVEY_TABLE))?;
        debug!(rows = responses.len(), "parsed survey table");
        Ok(SurveyTable::from_responses(responses))
    }

    pub fn from_paths<P: AsRef<Path>>(
        current: P,
        prior: Option<P>,
        survey: Option<P>,
    ) -> Result<PerformanceDataset, DatasetImportError> {
        let mut dataset =
            PerformanceDataset::new(Self::kpi_table_from_reader(File::open(current)?, CURRENT_TABLE)?);
        if let Some(path) = prior {
            dataset = dataset.with_prior(Self::kpi_table_from_reader(File::open(path)?, PRIOR_TABLE)?);
        }
        if let Some(path) = survey {
            dataset = dataset.with_surveys(Self::survey_table_from_reader(File::open(path)?)?);
        }
        Ok(dataset)
    }

    pub fn from_csv_strings(
        current: &str,
        prior: Option<&str>,
        survey: Option<&str>,
    ) -> Result<PerformanceDataset, DatasetImportError> {
        let mut dataset = PerformanceDataset::new(Self::kpi_table_from_reader(
            Cursor::new(current.as_bytes()),
            CURRENT_TABLE,
        )?);
        if let Some(csv) = prior.filter(|csv| !csv.trim().is_empty()) {
            dataset = dataset.with_prior(Self::kpi_table_from_reader(
                Cursor::new(csv.as_bytes()),
                PRIOR_TABLE,
            )?);
        }
        if let Some(csv) = survey.filter(|csv| !csv.trim().is_empty()) {
            dataset = dataset.with_surveys(Self::survey_table_from_reader(Cursor::new(
                csv.as_bytes(),
            ))?);
        }
        Ok(dataset)
    }
}
