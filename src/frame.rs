//! In-memory tabular frame loaded from CSV/TSV text or an XLSX workbook.
//!
//! A [`Frame`] is a header row plus stringly-typed data rows, read fully into
//! memory before the pipeline runs. Rows are normalized to the header width on
//! load so column access by index is always in bounds.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use calamine::{Reader, Xlsx, open_workbook};
use encoding_rs::Encoding;

use crate::io_utils;

pub const XLSX_EXTENSIONS: &[&str] = &["xlsx", "xlsm"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Frame {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Frame { headers, rows }
    }

    /// Index of the column named `name` (exact match), if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn rename_column(&mut self, index: usize, name: &str) {
        if let Some(header) = self.headers.get_mut(index) {
            *header = name.to_string();
        }
    }

    /// Appends a derived column; `values` must carry one cell per row.
    pub fn push_column(&mut self, name: &str, values: Vec<String>) {
        debug_assert_eq!(values.len(), self.rows.len());
        self.headers.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }

    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    /// Loads a frame from `path`, dispatching on extension: `.xlsx`/`.xlsm`
    /// go through the workbook reader, everything else is delimited text.
    /// `sheet` selects a worksheet (first sheet when omitted) and is ignored
    /// for text input.
    pub fn load(
        path: &Path,
        delimiter: Option<u8>,
        encoding: &'static Encoding,
        sheet: Option<&str>,
    ) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match extension.as_deref() {
            Some(ext) if XLSX_EXTENSIONS.contains(&ext) => Self::from_xlsx_path(path, sheet),
            _ => {
                let delimiter = io_utils::resolve_input_delimiter(path, delimiter);
                Self::from_csv_path(path, delimiter, encoding)
            }
        }
    }

    pub fn from_csv_path(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<Self> {
        let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
        let headers = io_utils::reader_headers(&mut reader, encoding)
            .with_context(|| format!("Reading headers from {path:?}"))?;
        let mut rows = Vec::new();
        for record in reader.byte_records() {
            let record = record.with_context(|| format!("Reading record from {path:?}"))?;
            rows.push(io_utils::decode_record(&record, encoding)?);
        }
        Ok(Frame::new(headers, rows))
    }

    pub fn from_xlsx_path(path: &Path, sheet: Option<&str>) -> Result<Self> {
        let mut workbook: Xlsx<_> =
            open_workbook(path).with_context(|| format!("Opening workbook {path:?}"))?;
        let sheet_name = match sheet {
            Some(name) => name.to_string(),
            None => workbook
                .sheet_names()
                .first()
                .cloned()
                .ok_or_else(|| anyhow!("Workbook {path:?} contains no sheets"))?,
        };
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|err| anyhow!("Reading sheet '{sheet_name}' from {path:?}: {err}"))?;

        let mut rows_iter = range.rows();
        let headers = match rows_iter.next() {
            Some(first) => first.iter().map(|cell| cell.to_string()).collect(),
            None => Vec::new(),
        };
        let rows = rows_iter
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();
        Ok(Frame::new(headers, rows))
    }

    /// Writes the frame as CSV to `path` (stdout when `None` or `-`).
    pub fn write_csv(&self, path: Option<&Path>, delimiter: u8) -> Result<()> {
        let mut writer = io_utils::open_csv_writer(path, delimiter)?;
        writer
            .write_record(&self.headers)
            .context("Writing header row")?;
        for row in &self.rows {
            writer.write_record(row).context("Writing data row")?;
        }
        writer.flush().context("Flushing CSV output")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_pads_short_rows_to_header_width() {
        let frame = Frame::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![vec!["1".into()], vec!["1".into(), "2".into(), "3".into()]],
        );
        assert_eq!(frame.rows[0], vec!["1", "", ""]);
        assert_eq!(frame.cell(1, 2), "3");
        assert_eq!(frame.cell(7, 0), "");
    }

    #[test]
    fn push_column_extends_every_row() {
        let mut frame = Frame::new(
            vec!["a".into()],
            vec![vec!["1".into()], vec!["2".into()]],
        );
        frame.push_column("b", vec!["x".into(), "y".into()]);
        assert_eq!(frame.column_index("b"), Some(1));
        assert_eq!(frame.cell(1, 1), "y");
    }

    #[test]
    fn rename_column_is_exact_by_index() {
        let mut frame = Frame::new(vec!["Due Date".into()], vec![]);
        frame.rename_column(0, "data_prevista_conclusao");
        assert_eq!(frame.column_index("data_prevista_conclusao"), Some(0));
        assert_eq!(frame.column_index("Due Date"), None);
    }
}
