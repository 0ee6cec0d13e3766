//! Worksheet model backing the review grid.
//!
//! A worksheet is a header row plus ordered data rows; the schema is whatever
//! the loaded source had. Edits mutate the in-memory copy first and are never
//! rolled back by a failed remote push.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

use calamine::{Reader, Xlsx};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::types::{AppError, AppResult};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Worksheet {
    pub id: Uuid,
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Worksheet {
    pub fn new(name: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut sheet = Self {
            id: Uuid::new_v4(),
            name: name.into(),
            columns,
            rows,
        };
        sheet.pad_rows();
        sheet
    }

    /// Ragged sources (short CSV records, trailing empty XLSX cells) are
    /// padded so every row has one value per column.
    fn pad_rows(&mut self) {
        let width = self.columns.len();
        for row in &mut self.rows {
            row.resize(width, String::new());
        }
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Apply one cell edit addressed by row index and column name.
    pub fn update_cell(&mut self, row: usize, column: &str, value: String) -> AppResult<()> {
        let col_idx = self
            .column_index(column)
            .ok_or_else(|| AppError::InvalidRequest(format!("unknown column: {}", column)))?;
        let row_ref = self
            .rows
            .get_mut(row)
            .ok_or_else(|| AppError::InvalidRequest(format!("row {} is out of range", row)))?;
        row_ref[col_idx] = value;
        Ok(())
    }

    /// Header row followed by data rows, the layout a full remote push writes.
    pub fn rows_with_header(&self) -> Vec<Vec<String>> {
        let mut out = Vec::with_capacity(self.rows.len() + 1);
        out.push(self.columns.clone());
        out.extend(self.rows.iter().cloned());
        out
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Parse a CSV upload. The first record is taken as the header row.
pub fn worksheet_from_csv(name: &str, bytes: &[u8]) -> AppResult<Worksheet> {
    let mut reader = csv::Reader::from_reader(bytes);
    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::Extraction(format!("failed to read CSV header: {}", e)))?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if columns.is_empty() {
        return Err(AppError::Extraction("CSV file has no header row".to_string()));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| AppError::Extraction(format!("failed to read CSV row: {}", e)))?;
        rows.push(record.iter().map(|f| f.to_string()).collect());
    }

    Ok(Worksheet::new(name, columns, rows))
}

/// Parse the first sheet of an XLSX upload. The first populated row is taken
/// as the header row.
pub fn worksheet_from_xlsx(name: &str, bytes: &[u8]) -> AppResult<Worksheet> {
    let mut workbook = Xlsx::new(Cursor::new(bytes.to_vec()))
        .map_err(|e| AppError::Extraction(format!("failed to open XLSX file: {}", e)))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::Extraction("XLSX file has no worksheets".to_string()))?
        .map_err(|e| AppError::Extraction(format!("failed to read XLSX sheet: {}", e)))?;

    let mut rows_iter = range.rows();
    let columns: Vec<String> = rows_iter
        .next()
        .ok_or_else(|| AppError::Extraction("XLSX sheet is empty".to_string()))?
        .iter()
        .map(|cell| cell.to_string())
        .collect();

    let rows: Vec<Vec<String>> = rows_iter
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();

    Ok(Worksheet::new(name, columns, rows))
}

/// Build a worksheet from explicit columns and rows (the JSON load path).
pub fn worksheet_from_rows(
    name: &str,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
) -> AppResult<Worksheet> {
    if columns.is_empty() {
        return Err(AppError::InvalidRequest("columns must not be empty".to_string()));
    }
    for (i, row) in rows.iter().enumerate() {
        if row.len() > columns.len() {
            return Err(AppError::InvalidRequest(format!(
                "row {} has {} values but there are {} columns",
                i,
                row.len(),
                columns.len()
            )));
        }
    }
    Ok(Worksheet::new(name, columns, rows))
}

/// Starter dataset for a grid opened without any source.
pub fn sample_worksheet() -> Worksheet {
    Worksheet::new(
        "sample",
        vec!["item".to_string(), "owner".to_string(), "status".to_string()],
        vec![
            vec!["Quarterly report".to_string(), "dana".to_string(), "in review".to_string()],
            vec!["Budget forecast".to_string(), "miguel".to_string(), "draft".to_string()],
            vec!["Launch checklist".to_string(), "priya".to_string(), "approved".to_string()],
        ],
    )
}

#[derive(Clone, Default)]
pub struct WorksheetRegistry {
    inner: Arc<RwLock<HashMap<Uuid, Worksheet>>>,
}

impl WorksheetRegistry {
    pub async fn insert(&self, sheet: Worksheet) {
        let mut guard = self.inner.write().await;
        guard.insert(sheet.id, sheet);
    }

    pub async fn get(&self, id: Uuid) -> Option<Worksheet> {
        let guard = self.inner.read().await;
        guard.get(&id).cloned()
    }

    /// Apply a cell edit and return the updated worksheet. The edit is
    /// committed here, before any remote push is attempted.
    pub async fn update_cell(
        &self,
        id: Uuid,
        row: usize,
        column: &str,
        value: String,
    ) -> AppResult<Worksheet> {
        let mut guard = self.inner.write().await;
        let sheet = guard
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("worksheet {}", id)))?;
        sheet.update_cell(row, column, value)?;
        Ok(sheet.clone())
    }
}
