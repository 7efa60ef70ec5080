//! # Report Rendering
//!
//! The [`ReportSink`] seam takes a finished [`ReportDataset`] and writes it to
//! a destination path. [`ReportPaths`] owns the date-stamped file naming shared
//! by every trigger.

pub mod paths;
pub mod pdf;

use async_trait::async_trait;
use std::path::Path;

use crate::constants::report::{HEADER_NAME, HEADER_STATUS, HEADER_URL};
use crate::error::RenderError;
use crate::models::ReportDataset;

pub use paths::ReportPaths;
pub use pdf::PdfReportSink;

/// Renders a dataset into a document at `destination`.
///
/// Implementations fail with [`RenderError`] when the destination cannot be
/// written; they do not create missing directories.
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn render(&self, dataset: &ReportDataset, destination: &Path) -> Result<(), RenderError>;

    /// Name used in logs
    fn name(&self) -> &'static str;
}

/// Header row followed by one `[name, url, status]` row per dataset entry
pub fn table_rows(dataset: &ReportDataset) -> Vec<[String; 3]> {
    let header = [
        HEADER_NAME.to_string(),
        HEADER_URL.to_string(),
        HEADER_STATUS.to_string(),
    ];

    std::iter::once(header)
        .chain(dataset.rows().iter().map(|row| {
            [
                row.site.name.clone(),
                row.site.url.clone(),
                row.rendered_status_text.clone(),
            ]
        }))
        .collect()
}
