use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use super::domain::EvaluationRecord;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write summary export {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode summary export: {0}")]
    Csv(#[from] csv::Error),
}

const HEADER: [&str; 3] = ["Employee ID", "Employee Name", "Summary"];

/// Writes one `Employee ID,Employee Name,Summary` row per record, header first.
pub fn write_summaries_csv<'a, W, I>(writer: W, records: I) -> Result<usize, ExportError>
where
    W: Write,
    I: IntoIterator<Item = &'a EvaluationRecord>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(HEADER)?;

    let mut written = 0;
    for record in records {
        csv_writer.write_record([
            record.employee_id.as_str(),
            record.employee_name.as_str(),
            record.summary.as_str(),
        ])?;
        written += 1;
    }

    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(written)
}

/// Creates (or truncates) `path` and writes the summary export into it.
pub fn export_summaries_csv<'a, I>(path: &Path, records: I) -> Result<usize, ExportError>
where
    I: IntoIterator<Item = &'a EvaluationRecord>,
{
    let io_error = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    let file = File::create(path).map_err(io_error)?;
    let written = write_summaries_csv(file, records)?;

    info!(path = %path.display(), rows = written, "summary export written");
    Ok(written)
}
