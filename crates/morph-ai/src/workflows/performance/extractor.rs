use super::domain::{StructuredSummary, SummarySection};
use super::narrative::{EMPLOYEE_DATA_HEADER, INSTRUCTION_PREAMBLE, OUTPUT_FORMAT_HEADER};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("model output contained none of the summary sections")]
    NoSections,
}

/// Splits free-form model output into the four summary sections.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryExtractor;

impl SummaryExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Never fails; absent sections hold the sentinel text.
    pub fn extract(&self, raw: &str) -> StructuredSummary {
        let body = strip_echoes(raw);
        let mut summary = StructuredSummary::default();

        let mut located: Vec<(usize, SummarySection)> = SummarySection::ordered()
            .into_iter()
            .filter_map(|section| body.find(section.marker()).map(|at| (at, section)))
            .collect();
        located.sort_by_key(|(at, _)| *at);

        for (index, (start, section)) in located.iter().enumerate() {
            let content_start = start + section.marker().len();
            let content_end = located
                .iter()
                .skip(index + 1)
                .map(|(at, _)| *at)
                .find(|at| *at >= content_start)
                .unwrap_or(body.len());
            let content = body
                .get(content_start..content_end.max(content_start))
                .unwrap_or_default()
                .trim();
            summary.set_section(*section, content.to_string());
        }

        summary
    }

    /// Like [`extract`](Self::extract) but rejects output that carries no section at all.
    pub fn extract_checked(&self, raw: &str) -> Result<StructuredSummary, ExtractionError> {
        let body = strip_echoes(raw);
        let any_section = SummarySection::ordered()
            .into_iter()
            .any(|section| body.contains(section.marker()));
        if !any_section {
            return Err(ExtractionError::NoSections);
        }
        Ok(self.extract(raw))
    }
}

fn strip_echoes(raw: &str) -> &str {
    let mut body = raw;
    if let Some(at) = body.find(INSTRUCTION_PREAMBLE) {
        body = &body[..at];
    }
    if let Some(at) = body.find(EMPLOYEE_DATA_HEADER) {
        body = &body[..at];
    }
    if let Some(at) = body.find(OUTPUT_FORMAT_HEADER) {
        body = &body[at + OUTPUT_FORMAT_HEADER.len()..];
    }
    body.trim()
}
