//! Target lists read from spreadsheets.
//!
//! A target sheet has a header row. The product label comes from the first
//! column named like a product (`nome`, `produto`, ...), falling back to the
//! first column. Every column whose header mentions `link` or `url` holds
//! page addresses; each `http(s)` cell becomes one target.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use thiserror::Error;

use crate::models::config::TargetConfig;

const NAME_HEADERS: &[&str] = &["nome", "produto", "product", "item", "descricao", "descrição"];
const LINK_MARKERS: &[&str] = &["link", "url"];

#[derive(Debug, Error)]
pub enum TargetsError {
    #[error("failed to read target file")]
    ReadFailed,
    #[error("failed to parse CSV")]
    CsvParseFailed,
    #[error("failed to parse spreadsheet")]
    XlsxParseFailed,
    #[error("target file has no worksheet")]
    MissingSheet,
    #[error("target file has no header row")]
    MissingHeader,
    #[error("target file has no link column")]
    MissingLinkColumn,
    #[error("unsupported target file extension: {0}")]
    UnsupportedFormat(String),
}

impl From<std::io::Error> for TargetsError {
    fn from(_: std::io::Error) -> Self {
        Self::ReadFailed
    }
}

impl From<csv::Error> for TargetsError {
    fn from(_: csv::Error) -> Self {
        Self::CsvParseFailed
    }
}

impl From<calamine::Error> for TargetsError {
    fn from(_: calamine::Error) -> Self {
        Self::XlsxParseFailed
    }
}

/// Read targets from a `csv`, `xlsx` or `xls` file.
pub fn load_targets(path: &Path) -> Result<Vec<TargetConfig>, TargetsError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let (headers, rows) = match extension.as_str() {
        "csv" => read_csv_rows(path)?,
        "xlsx" | "xls" | "xlsm" | "ods" => read_sheet_rows(path)?,
        other => return Err(TargetsError::UnsupportedFormat(other.to_string())),
    };
    targets_from_rows(&headers, &rows)
}

/// Build targets from a header row and data rows.
pub fn targets_from_rows(
    headers: &[String],
    rows: &[Vec<String>],
) -> Result<Vec<TargetConfig>, TargetsError> {
    if headers.is_empty() {
        return Err(TargetsError::MissingHeader);
    }
    let normalized: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
    let name_column = normalized
        .iter()
        .position(|h| NAME_HEADERS.contains(&h.as_str()))
        .unwrap_or(0);
    let mut link_columns: Vec<usize> = normalized
        .iter()
        .enumerate()
        .filter(|(_, h)| LINK_MARKERS.iter().any(|marker| h.contains(marker)))
        .map(|(idx, _)| idx)
        .collect();
    if link_columns.is_empty() {
        // Unlabelled sheets: any column holding a URL.
        link_columns = (0..headers.len())
            .filter(|&column| {
                rows.iter()
                    .filter_map(|row| row.get(column))
                    .any(|cell| cell.contains("http://") || cell.contains("https://"))
            })
            .collect();
    }
    if link_columns.is_empty() {
        return Err(TargetsError::MissingLinkColumn);
    }

    let mut targets = Vec::new();
    for row in rows {
        let product = row
            .get(name_column)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty() && !link_columns.contains(&name_column));
        for &column in &link_columns {
            let Some(url) = row.get(column).map(|v| v.trim()) else {
                continue;
            };
            if url.starts_with("http://") || url.starts_with("https://") {
                targets.push(TargetConfig {
                    url: url.to_string(),
                    marketplace: None,
                    product: product.clone(),
                });
            }
        }
    }
    Ok(targets)
}

fn read_csv_rows(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>), TargetsError> {
    let content = std::fs::read_to_string(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()?
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    Ok((headers, rows))
}

fn read_sheet_rows(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>), TargetsError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(TargetsError::MissingSheet)??;

    let mut iter = range.rows();
    let Some(header_row) = iter.next() else {
        return Err(TargetsError::MissingHeader);
    };

    let headers = header_row.iter().map(cell_to_string).collect::<Vec<_>>();
    let rows = iter
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>())
        .collect();

    Ok((headers, rows))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        _ => cell.to_string(),
    }
}
