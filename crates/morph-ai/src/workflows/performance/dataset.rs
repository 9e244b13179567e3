use std::collections::HashMap;

use super::domain::{EmployeeId, KpiSnapshot, SurveyResponse};

/// KPI rows for one reporting week, indexed by employee id. The first row for an id wins.
#[derive(Debug, Clone, Default)]
pub struct KpiTable {
    rows: Vec<KpiSnapshot>,
    index: HashMap<EmployeeId, usize>,
}

impl KpiTable {
    pub fn from_rows(rows: impl IntoIterator<Item = KpiSnapshot>) -> Self {
        let mut table = Self::default();
        for row in rows {
            if table.index.contains_key(&row.employee_id) {
                continue;
            }
            table.index.insert(row.employee_id.clone(), table.rows.len());
            table.rows.push(row);
        }
        table
    }

    pub fn get(&self, id: &EmployeeId) -> Option<&KpiSnapshot> {
        self.index.get(id).map(|position| &self.rows[*position])
    }

    /// Ids in table order.
    pub fn employee_ids(&self) -> Vec<EmployeeId> {
        self.rows.iter().map(|row| row.employee_id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SurveyTable {
    responses: HashMap<EmployeeId, SurveyResponse>,
}

impl SurveyTable {
    pub fn from_responses(responses: impl IntoIterator<Item = SurveyResponse>) -> Self {
        let mut table = Self::default();
        for response in responses {
            table
                .responses
                .entry(response.employee_id.clone())
                .or_insert(response);
        }
        table
    }

    pub fn get(&self, id: &EmployeeId) -> Option<&SurveyResponse> {
        self.responses.get(id)
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}

/// Everything one batch evaluates: the current week plus optional prior week and survey.
#[derive(Debug, Clone, Default)]
pub struct PerformanceDataset {
    pub current: KpiTable,
    pub prior: Option<KpiTable>,
    pub surveys: Option<SurveyTable>,
}

impl PerformanceDataset {
    pub fn new(current: KpiTable) -> Self {
        Self {
            current,
            prior: None,
            surveys: None,
        }
    }

    pub fn with_prior(mut self, prior: KpiTable) -> Self {
        self.prior = Some(prior);
        self
    }

    pub fn with_surveys(mut self, surveys: SurveyTable) -> Self {
        self.surveys = Some(surveys);
        self
    }

    pub fn prior_for(&self, id: &EmployeeId) -> Option<&KpiSnapshot> {
        self.prior.as_ref().and_then(|table| table.get(id))
    }

    pub fn survey_for(&self, id: &EmployeeId) -> Option<&SurveyResponse> {
        self.surveys.as_ref().and_then(|table| table.get(id))
    }
}
