//! PDF report sink built on `printpdf` with the built-in Helvetica faces.
//!
//! Layout is a landscape A4 page: a centered title, a bold header row and one
//! 20pt row per site. Rows continue on a fresh page (header repeated) when the
//! bottom margin is reached.

use async_trait::async_trait;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{table_rows, ReportSink};
use crate::error::RenderError;
use crate::models::ReportDataset;

const PAGE_WIDTH_PT: f32 = 842.0;
const PAGE_HEIGHT_PT: f32 = 595.0;
const MARGIN_PT: f32 = 50.0;
const TITLE_TOP_PT: f32 = 60.0;
const TABLE_TOP_PT: f32 = 100.0;
const TITLE_SIZE: f32 = 20.0;
const BODY_SIZE: f32 = 12.0;
const ROW_HEIGHT_PT: f32 = 20.0;
/// Name, URL, Status
const COLUMN_WIDTHS_PT: [f32; 3] = [200.0, 300.0, 100.0];
const LAYER_NAME: &str = "Report";

fn pt(value: f32) -> Mm {
    Mm(value * 25.4 / 72.0)
}

/// Helvetica averages roughly half an em per glyph
fn estimated_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5
}

/// Writes the report as a PDF document
#[derive(Debug, Clone)]
pub struct PdfReportSink {
    title: String,
}

impl PdfReportSink {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// Encode the dataset into PDF bytes
    pub fn encode(&self, dataset: &ReportDataset) -> Result<Vec<u8>, RenderError> {
        let (doc, page, layer) = PdfDocument::new(
            self.title.as_str(),
            pt(PAGE_WIDTH_PT),
            pt(PAGE_HEIGHT_PT),
            LAYER_NAME,
        );
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(RenderError::encoding)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(RenderError::encoding)?;

        let mut current = doc.get_page(page).get_layer(layer);

        let title_x =
            ((PAGE_WIDTH_PT - estimated_width(&self.title, TITLE_SIZE)) / 2.0).max(MARGIN_PT);
        current.use_text(
            self.title.as_str(),
            TITLE_SIZE,
            pt(title_x),
            pt(PAGE_HEIGHT_PT - TITLE_TOP_PT),
            &regular,
        );

        let mut rows = table_rows(dataset).into_iter();
        let header = rows.next().unwrap_or_default();

        let mut y = PAGE_HEIGHT_PT - TABLE_TOP_PT;
        draw_row(&current, &header, &bold, y);
        y -= ROW_HEIGHT_PT;

        for row in rows {
            if y < MARGIN_PT {
                let (next_page, next_layer) =
                    doc.add_page(pt(PAGE_WIDTH_PT), pt(PAGE_HEIGHT_PT), LAYER_NAME);
                current = doc.get_page(next_page).get_layer(next_layer);
                y = PAGE_HEIGHT_PT - MARGIN_PT;
                draw_row(&current, &header, &bold, y);
                y -= ROW_HEIGHT_PT;
            }
            draw_row(&current, &row, &regular, y);
            y -= ROW_HEIGHT_PT;
        }

        drop(current);
        doc.save_to_bytes().map_err(RenderError::encoding)
    }

    fn write(&self, dataset: &ReportDataset, destination: &Path) -> Result<(), RenderError> {
        let bytes = self.encode(dataset)?;
        std::fs::write(destination, &bytes).map_err(|e| RenderError::io(destination, e))?;
        debug!(
            path = %destination.display(),
            bytes = bytes.len(),
            "PDF written"
        );
        Ok(())
    }
}

fn draw_row(layer: &PdfLayerReference, cells: &[String; 3], font: &IndirectFontRef, y: f32) {
    let mut x = MARGIN_PT;
    for (cell, width) in cells.iter().zip(COLUMN_WIDTHS_PT) {
        layer.use_text(cell.as_str(), BODY_SIZE, pt(x), pt(y), font);
        x += width;
    }
}

#[async_trait]
impl ReportSink for PdfReportSink {
    async fn render(&self, dataset: &ReportDataset, destination: &Path) -> Result<(), RenderError> {
        let sink = self.clone();
        let dataset = dataset.clone();
        let destination: PathBuf = destination.to_path_buf();

        let path_for_log = destination.clone();
        tokio::task::spawn_blocking(move || sink.write(&dataset, &destination))
            .await
            .map_err(|e| RenderError::TaskAborted {
                message: e.to_string(),
            })??;

        info!(path = %path_for_log.display(), "📄 Report generated");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "pdf"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DownReason, ReportRow, Site, StatusOutcome};
    use tempfile::TempDir;

    fn dataset(rows: usize) -> ReportDataset {
        (0..rows)
            .map(|i| {
                let outcome = if i % 2 == 0 {
                    StatusOutcome::Up
                } else {
                    StatusOutcome::Down(DownReason::ServerError(502))
                };
                ReportRow::new(Site::new(format!("site-{i}"), format!("https://s{i}.test/")), outcome)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_render_writes_pdf_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Website_Status_Report_2026-10-19.pdf");

        PdfReportSink::new("Website Status Report")
            .render(&dataset(5), &path)
            .await
            .unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_render_spills_onto_additional_pages() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("long.pdf");

        PdfReportSink::new("Website Status Report")
            .render(&dataset(80), &path)
            .await
            .unwrap();

        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_missing_directory_is_render_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("does-not-exist").join("report.pdf");

        let err = PdfReportSink::new("t")
            .render(&dataset(1), &path)
            .await
            .unwrap_err();

        assert!(matches!(err, RenderError::Io { .. }), "{err:?}");
        assert!(!path.exists());
    }
}
