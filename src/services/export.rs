use thiserror::Error;

/// Spreadsheet format of an exported listing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to render csv")]
    CsvRender,
    #[error("failed to render xlsx")]
    XlsxRender,
}

/// Render a header row followed by `rows` into file bytes.
pub fn render_table(
    format: ExportFormat,
    headers: &[&str],
    rows: &[Vec<String>],
) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(vec![]);
            writer
                .write_record(headers)
                .map_err(|_| ExportError::CsvRender)?;
            for row in rows {
                let escaped_row: Vec<String> = row.iter().map(|value| escape_cell(value)).collect();
                writer
                    .write_record(&escaped_row)
                    .map_err(|_| ExportError::CsvRender)?;
            }
            writer.into_inner().map_err(|_| ExportError::CsvRender)
        }
        ExportFormat::Xlsx => {
            let mut workbook = rust_xlsxwriter::Workbook::new();
            let worksheet = workbook.add_worksheet();

            for (col_idx, header) in headers.iter().enumerate() {
                worksheet
                    .write_string(0, col_idx as u16, *header)
                    .map_err(|_| ExportError::XlsxRender)?;
            }

            for (row_idx, row) in rows.iter().enumerate() {
                let sheet_row = (row_idx + 1) as u32;
                for (col_idx, value) in row.iter().enumerate() {
                    worksheet
                        .write_string(sheet_row, col_idx as u16, escape_cell(value))
                        .map_err(|_| ExportError::XlsxRender)?;
                }
            }

            workbook
                .save_to_buffer()
                .map_err(|_| ExportError::XlsxRender)
        }
    }
}

/// Prefix cells that a spreadsheet would evaluate as formulas.
fn escape_cell(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some('=' | '+' | '-' | '@') => format!("'{value}"),
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{ExportFormat, render_table};

    #[test]
    fn csv_export_escapes_formula_prefixed_cells() {
        let bytes = render_table(
            ExportFormat::Csv,
            &["product", "marketplace"],
            &[vec!["=SUM(A1:A2)".to_string(), "+malicious".to_string()]],
        )
        .expect("csv render should succeed");

        let csv_output = String::from_utf8(bytes).expect("csv output should be utf-8");
        assert!(csv_output.contains("'=SUM(A1:A2)"));
        assert!(csv_output.contains("'+malicious"));
    }

    #[test]
    fn csv_export_keeps_safe_cells_unchanged() {
        let bytes = render_table(
            ExportFormat::Csv,
            &["product", "price"],
            &[vec!["Fone Bluetooth XYZ".to_string(), "89.90".to_string()]],
        )
        .expect("csv render should succeed");

        let csv_output = String::from_utf8(bytes).expect("csv output should be utf-8");
        assert_eq!(csv_output, "product,price\nFone Bluetooth XYZ,89.90\n");
    }

    #[test]
    fn xlsx_export_produces_a_zip_container() {
        let bytes = render_table(
            ExportFormat::Xlsx,
            &["product"],
            &[vec!["Fone".to_string()]],
        )
        .expect("xlsx render should succeed");

        assert!(bytes.starts_with(b"PK"));
    }
}
