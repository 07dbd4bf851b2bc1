//! Excel workbook output for both pipelines.
//!
//! Styling is intentionally minimal: a bold, tinted header row and column
//! widths sized to the header text. The Summary sheet of the activations
//! workbook is rendered as a real Excel table with a Total row.

use crate::activation::DateCount;
use crate::enrichment::{EnrichedRecord, JOIN_KEY};
use crate::error::Result;
use crate::monthly_counts::{DeviceCountMatrix, DEVICE_COLUMN};
use rust_xlsxwriter::{
    Color, Format, FormatAlign, FormatBorder, Table, TableColumn, TableFunction, TableStyle,
    Workbook, Worksheet,
};
use std::path::Path;

const MIN_COLUMN_WIDTH: f64 = 12.0;

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_text_wrap()
        .set_align(FormatAlign::Top)
        .set_background_color(Color::RGB(0xD7E4BC))
        .set_border(FormatBorder::Thin)
}

fn write_header_row(worksheet: &mut Worksheet, headers: &[String]) -> Result<()> {
    let format = header_format();
    for (col, header) in headers.iter().enumerate() {
        let col = col as u16;
        worksheet.write_string_with_format(0, col, header, &format)?;
        let width = (header.len() as f64 + 2.0).max(MIN_COLUMN_WIDTH);
        worksheet.set_column_width(col, width)?;
    }
    Ok(())
}

fn write_matrix_sheet(worksheet: &mut Worksheet, matrix: &DeviceCountMatrix) -> Result<()> {
    let mut headers = vec![DEVICE_COLUMN.to_string()];
    headers.extend(matrix.months.iter().map(|m| m.file_label()));
    write_header_row(worksheet, &headers)?;

    for (row, (device, counts)) in matrix.rows.iter().enumerate() {
        let row = row as u32 + 1;
        worksheet.write_string(row, 0, device)?;
        for (col, count) in counts.iter().enumerate() {
            worksheet.write_number(row, col as u16 + 1, *count as f64)?;
        }
    }
    Ok(())
}

/// Counts workbook: one sheet for total counts, one with the configured
/// attack names excluded.
pub fn write_counts_workbook(
    path: &Path,
    total: &DeviceCountMatrix,
    filtered: &DeviceCountMatrix,
) -> Result<()> {
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Total Attacks Count")?;
    write_matrix_sheet(sheet, total)?;

    let sheet = workbook.add_worksheet();
    sheet.set_name("Filtered Attacks Count")?;
    write_matrix_sheet(sheet, filtered)?;

    workbook.save(path)?;
    Ok(())
}

/// Activations workbook: Detail sheet with the parsed and enrichment
/// columns, Summary sheet with the per-date counts as an Excel table
/// (anchored at B2, Total row summing the count column).
pub fn write_activations_workbook(
    path: &Path,
    enrichment_columns: &[String],
    records: &[EnrichedRecord],
    summary: &[DateCount],
) -> Result<()> {
    let mut workbook = Workbook::new();

    let detail = workbook.add_worksheet();
    detail.set_name("Detail")?;
    let mut headers = vec![
        "Date".to_string(),
        "Protected Object".to_string(),
        JOIN_KEY.to_string(),
    ];
    headers.extend(enrichment_columns.iter().cloned());
    write_header_row(detail, &headers)?;

    for (row, enriched) in records.iter().enumerate() {
        let row = row as u32 + 1;
        detail.write_string(row, 0, &enriched.record.date)?;
        if let Some(po) = &enriched.record.protected_object {
            detail.write_string(row, 1, po)?;
        }
        if let Some(id) = &enriched.record.attack_id {
            detail.write_string(row, 2, id)?;
        }
        for (col, value) in enriched.values.iter().enumerate() {
            let col = col as u16 + 3;
            if let Some(value) = value {
                // Metric columns arrive as text; keep numbers as numbers.
                match value.parse::<f64>() {
                    Ok(n) => detail.write_number(row, col, n)?,
                    Err(_) => detail.write_string(row, col, value)?,
                };
            }
        }
    }

    let sheet = workbook.add_worksheet();
    sheet.set_name("Summary")?;

    // Table block anchored at B2: header row 1, columns B..C (0-based 1..2).
    let header_row: u32 = 1;
    let first_col: u16 = 1;
    let last_col: u16 = 2;
    for (i, row) in summary.iter().enumerate() {
        let r = header_row + 1 + i as u32;
        sheet.write_string(r, first_col, &row.date)?;
        sheet.write_number(r, last_col, row.count as f64)?;
    }
    let last_row = header_row + summary.len() as u32 + 1;

    let columns = vec![
        TableColumn::new()
            .set_header("Date")
            .set_total_label("Total"),
        TableColumn::new()
            .set_header("Number of Activations")
            .set_total_function(TableFunction::Sum),
    ];
    let table = Table::new()
        .set_columns(&columns)
        .set_total_row(true)
        .set_style(TableStyle::Medium9);
    sheet.add_table(header_row, first_col, last_row, last_col, &table)?;
    sheet.set_column_width(first_col, MIN_COLUMN_WIDTH)?;
    sheet.set_column_width(last_col, "Number of Activations".len() as f64 + 2.0)?;

    workbook.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::ActivationRecord;
    use crate::calendar::CalendarMonth;

    #[test]
    fn test_counts_workbook_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.xlsx");
        let matrix = DeviceCountMatrix {
            months: vec![CalendarMonth::new(2025, 7), CalendarMonth::new(2025, 8)],
            rows: vec![("fw-a".to_string(), vec![3, 0])],
        };
        write_counts_workbook(&path, &matrix, &matrix).unwrap();
        assert!(path.metadata().unwrap().len() > 0);
    }

    #[test]
    fn test_activations_workbook_with_empty_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activations.xlsx");
        let records = vec![EnrichedRecord {
            record: ActivationRecord {
                date: "2025-08-01".to_string(),
                protected_object: Some("Web Farm".to_string()),
                attack_id: None,
            },
            values: vec![Some("120".to_string())],
        }];
        write_activations_workbook(&path, &["packetCount".to_string()], &records, &[])
            .unwrap();
        assert!(path.metadata().unwrap().len() > 0);
    }
}
