use serde::{Deserialize, Serialize};

use super::{Site, StatusOutcome};

/// One probed site as it appears in the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub site: Site,
    pub outcome: StatusOutcome,
    /// Human-readable label derived from `outcome`
    pub rendered_status_text: String,
}

impl ReportRow {
    pub fn new(site: Site, outcome: StatusOutcome) -> Self {
        let rendered_status_text = outcome.rendered_text();
        Self {
            site,
            outcome,
            rendered_status_text,
        }
    }
}

/// Rows in roster order. Assembled once per run and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDataset {
    rows: Vec<ReportRow>,
}

impl ReportDataset {
    pub fn new(rows: Vec<ReportRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn up_count(&self) -> usize {
        self.rows.iter().filter(|row| row.outcome.is_up()).count()
    }

    pub fn down_count(&self) -> usize {
        self.len() - self.up_count()
    }
}

impl FromIterator<ReportRow> for ReportDataset {
    fn from_iter<I: IntoIterator<Item = ReportRow>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
