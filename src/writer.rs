//! Rendering of ICT records into the "Test Report" worksheet.
//!
//! The layout is fixed: product information in rows 1-4, the field legend in
//! rows 7-12, column headers in row 14 and one record per row from row 15.

use crate::error::{Error, Result};
use crate::metadata::ReportMetadata;
use crate::reader::{Field, Record};
use std::path::Path;
use tracing::info;
use umya_spreadsheet::structs::{
    Border, HorizontalAlignmentValues, SheetView, Spreadsheet, Style, VerticalAlignmentValues,
    Worksheet,
};

const SHEET_NAME: &str = "Test Report";
const TITLE: &str = "Product Information";
const FONT_NAME: &str = "Arial";

const HEADER_FILL: &str = "FFD9D9D9";
const PASS_FILL: &str = "FFC6EFCE";

const HEADER_ROW: u32 = 14;
const LEGEND_ROW: u32 = 7;

const LEGEND_LEFT: [Field; 6] = [
    Field::Result,
    Field::Board,
    Field::Type,
    Field::Part,
    Field::ActVal,
    Field::StdVal,
];
const LEGEND_RIGHT: [Field; 5] = [Field::HL, Field::LL, Field::Mode, Field::Range, Field::TestVal];

const COLUMN_WIDTHS: [(&str, f64); 11] = [
    ("A", 8.0),
    ("B", 8.0),
    ("C", 12.0),
    ("D", 15.0),
    ("E", 10.0),
    ("F", 10.0),
    ("G", 8.0),
    ("H", 8.0),
    ("I", 8.0),
    ("J", 8.0),
    ("K", 12.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Title,
    Label,
    Value,
}

/// Legend text for a field code.
pub fn legend_text(field: Field) -> &'static str {
    match field {
        Field::Result => "Result of the measured",
        Field::Board => "Module of the board",
        Field::Type => "Type of component",
        Field::Part => "Name of the component",
        Field::ActVal => "Value paralel\ncomponents",
        Field::StdVal => "BOM value components",
        Field::HL => "High Rate Tolerance",
        Field::LL => "Low Rate Tolerance",
        Field::Mode => {
            "Type of measure: CC - Constant current,\nAC - Alternate current,\nLV - Low voltage"
        }
        Field::Range => "Range of measured",
        Field::TestVal => "Real measured value",
    }
}

/// Build the report workbook in memory.
pub fn build_report(records: &[Record], metadata: &ReportMetadata) -> Spreadsheet {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book.get_active_sheet_mut();
    sheet.set_name(SHEET_NAME);
    hide_gridlines(sheet);

    write_product_info(sheet, metadata);
    write_legend(sheet);
    write_records(sheet, records);

    for (column, width) in COLUMN_WIDTHS {
        sheet.get_column_dimension_mut(column).set_width(width);
    }

    book
}

/// Render `records` and save the workbook to `path`.
pub fn write_report(records: &[Record], metadata: &ReportMetadata, path: &Path) -> Result<()> {
    let book = build_report(records, metadata);
    umya_spreadsheet::writer::xlsx::write(&book, path).map_err(|e| Error::ReportWrite {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;

    info!(path = %path.display(), "report saved");
    Ok(())
}

fn write_product_info(sheet: &mut Worksheet, metadata: &ReportMetadata) {
    put(sheet, 1, 1, TITLE, CellKind::Title);
    sheet.add_merge_cells("A1:B1");

    let rows = [
        ("Program", metadata.program.as_str()),
        ("SMT Run", metadata.smt_run.as_str()),
        ("SMT Line", metadata.smt_line.as_str()),
    ];
    for (row, (key, value)) in (2..).zip(rows) {
        put(sheet, 1, row, key, CellKind::Label);
        put(sheet, 2, row, value, CellKind::Value);
    }
}

fn write_legend(sheet: &mut Worksheet) {
    for (row, field) in (LEGEND_ROW..).zip(LEGEND_LEFT) {
        put(sheet, 1, row, field.name(), CellKind::Label);
        put(sheet, 2, row, legend_text(field), CellKind::Value);
    }
    for (row, field) in (LEGEND_ROW..).zip(LEGEND_RIGHT) {
        put(sheet, 3, row, field.name(), CellKind::Label);
        put(sheet, 4, row, legend_text(field), CellKind::Value);
    }

    // The right half is one row shorter; close it with an empty bordered cell.
    let last = LEGEND_ROW + LEGEND_LEFT.len() as u32 - 1;
    let cell = sheet.get_cell_mut((3, last));
    cell.set_value_string("");
    outline(cell.get_style_mut());
    sheet.add_merge_cells(format!("C{last}:D{last}"));
}

fn write_records(sheet: &mut Worksheet, records: &[Record]) {
    for (col, field) in (1..).zip(Field::ALL) {
        put(sheet, col, HEADER_ROW, field.name(), CellKind::Label);
    }

    for (row, record) in (HEADER_ROW + 1..).zip(records) {
        for (col, field) in (1..).zip(Field::ALL) {
            let style = put(sheet, col, row, record.get(field), CellKind::Value);
            if field == Field::Result && record.is_pass() {
                style.set_background_color(PASS_FILL);
            }
        }
    }
}

/// Write `value` as text at (`col`, `row`) and apply the style for `kind`.
fn put<'a>(
    sheet: &'a mut Worksheet,
    col: u32,
    row: u32,
    value: &str,
    kind: CellKind,
) -> &'a mut Style {
    let cell = sheet.get_cell_mut((col, row));
    cell.set_value_string(value);
    let style = cell.get_style_mut();

    match kind {
        CellKind::Title => {
            style.get_font_mut().set_name(FONT_NAME).set_size(14.0).set_bold(true);
            return style;
        }
        CellKind::Label => {
            style.get_font_mut().set_name(FONT_NAME).set_size(11.0).set_bold(true);
            style.set_background_color(HEADER_FILL);
        }
        CellKind::Value => {
            style.get_font_mut().set_name(FONT_NAME).set_size(10.0);
        }
    }

    outline(style);
    let alignment = style.get_alignment_mut();
    alignment.set_horizontal(HorizontalAlignmentValues::Center);
    alignment.set_vertical(VerticalAlignmentValues::Center);
    if value.contains('\n') {
        alignment.set_wrap_text(true);
    }
    style
}

fn outline(style: &mut Style) {
    let borders = style.get_borders_mut();
    borders.get_left_mut().set_border_style(Border::BORDER_THIN);
    borders.get_right_mut().set_border_style(Border::BORDER_THIN);
    borders.get_top_mut().set_border_style(Border::BORDER_THIN);
    borders.get_bottom_mut().set_border_style(Border::BORDER_THIN);
}

fn hide_gridlines(sheet: &mut Worksheet) {
    let views = sheet.get_sheet_views_mut();
    if views.get_sheet_view_list().is_empty() {
        views.add_sheet_view_list_mut(SheetView::default());
    }
    for view in views.get_sheet_view_list_mut().iter_mut() {
        view.set_show_grid_lines(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn metadata() -> ReportMetadata {
        ReportMetadata {
            program: "AUT1077-HC00".to_string(),
            smt_run: "27-Jun-25".to_string(),
            smt_line: "Line 9".to_string(),
        }
    }

    fn record(result: &str, part: &str) -> Record {
        let mut record = Record::default();
        record
            .set(Field::Result, result)
            .set(Field::Board, "1")
            .set(Field::Type, "R")
            .set(Field::Part, part)
            .set(Field::ActVal, "10.00K")
            .set(Field::StdVal, "10.00K")
            .set(Field::HL, "5%")
            .set(Field::LL, "5%")
            .set(Field::Mode, "CC")
            .set(Field::Range, "3")
            .set(Field::TestVal, "9.98K");
        record
    }

    fn fill_of(sheet: &Worksheet, coordinate: &str) -> Option<String> {
        sheet
            .get_cell(coordinate)
            .and_then(|cell| cell.get_style().get_background_color())
            .map(|color| color.get_argb().to_string())
    }

    #[test]
    fn header_row_uses_fixed_column_order() {
        let book = build_report(&[], &metadata());
        let sheet = book.get_sheet(&0).unwrap();

        let headers: Vec<String> = (1..=11u32).map(|col| sheet.get_value((col, 14u32))).collect();
        assert_eq!(
            headers,
            vec![
                "Result", "Board", "Type", "Part", "ActVal", "StdVal", "HL", "LL", "Mode",
                "Range", "TestVal"
            ]
        );
        assert_eq!(sheet.get_name(), "Test Report");
    }

    #[test]
    fn product_info_block() {
        let book = build_report(&[], &metadata());
        let sheet = book.get_sheet(&0).unwrap();

        assert_eq!(sheet.get_value("A1"), "Product Information");
        assert_eq!(sheet.get_value("A2"), "Program");
        assert_eq!(sheet.get_value("B2"), "AUT1077-HC00");
        assert_eq!(sheet.get_value("A3"), "SMT Run");
        assert_eq!(sheet.get_value("B3"), "27-Jun-25");
        assert_eq!(sheet.get_value("A4"), "SMT Line");
        assert_eq!(sheet.get_value("B4"), "Line 9");
        assert!(sheet
            .get_merge_cells()
            .iter()
            .any(|range| range.get_range() == "A1:B1"));
    }

    #[test]
    fn legend_is_static() {
        let book = build_report(&[], &metadata());
        let sheet = book.get_sheet(&0).unwrap();

        assert_eq!(sheet.get_value("A7"), "Result");
        assert_eq!(sheet.get_value("B7"), "Result of the measured");
        assert_eq!(sheet.get_value("C7"), "HL");
        assert_eq!(sheet.get_value("D7"), "High Rate Tolerance");
        assert_eq!(sheet.get_value("A12"), "StdVal");
        assert_eq!(sheet.get_value("B12"), "BOM value components");
        assert_eq!(sheet.get_value("C11"), "TestVal");
        assert_eq!(sheet.get_value("D11"), "Real measured value");
        assert_eq!(sheet.get_value("C9"), "Mode");
        assert!(sheet.get_value("D9").starts_with("Type of measure: CC"));
        assert!(sheet
            .get_merge_cells()
            .iter()
            .any(|range| range.get_range() == "C12:D12"));
    }

    #[test]
    fn only_passing_result_cells_are_highlighted() {
        let records = vec![
            record("PASS", "R1"),
            record(" pass ", "R2"),
            record("FAIL", "R3"),
            record("", "R4"),
        ];
        let book = build_report(&records, &metadata());
        let sheet = book.get_sheet(&0).unwrap();

        assert_eq!(fill_of(sheet, "A15").as_deref(), Some(PASS_FILL));
        assert_eq!(fill_of(sheet, "A16").as_deref(), Some(PASS_FILL));
        assert_eq!(fill_of(sheet, "A17"), None);
        assert_eq!(fill_of(sheet, "A18"), None);
        // Only the Result column is coloured.
        assert_eq!(fill_of(sheet, "B15"), None);
        assert_eq!(fill_of(sheet, "K15"), None);
    }

    #[test]
    fn header_cells_use_header_fill() {
        let book = build_report(&[], &metadata());
        let sheet = book.get_sheet(&0).unwrap();

        assert_eq!(fill_of(sheet, "A14").as_deref(), Some(HEADER_FILL));
        assert_eq!(fill_of(sheet, "K14").as_deref(), Some(HEADER_FILL));
        assert_eq!(fill_of(sheet, "A2").as_deref(), Some(HEADER_FILL));
        assert_eq!(fill_of(sheet, "B2"), None);
    }

    #[test]
    fn values_are_copied_verbatim() {
        let mut odd = record("FAIL", "C12");
        odd.set(Field::ActVal, "1.50").set(Field::TestVal, "0001");
        let records = vec![record("PASS", "R101"), odd];
        let book = build_report(&records, &metadata());
        let sheet = book.get_sheet(&0).unwrap();

        for (offset, record) in records.iter().enumerate() {
            let row = 15 + offset as u32;
            for (col, field) in (1u32..).zip(Field::ALL) {
                assert_eq!(sheet.get_value((col, row)), record.get(field));
            }
        }
        assert_eq!(sheet.get_value("E16"), "1.50");
        assert_eq!(sheet.get_value("K16"), "0001");
        assert_eq!(sheet.get_value("A17"), "");
    }

    #[test]
    fn missing_column_renders_empty_cells() {
        let mut incomplete = record("PASS", "R1");
        incomplete.set(Field::StdVal, "");
        let book = build_report(&[incomplete.clone(), incomplete], &metadata());
        let sheet = book.get_sheet(&0).unwrap();

        assert_eq!(sheet.get_value("F14"), "StdVal");
        assert_eq!(sheet.get_value("F15"), "");
        assert_eq!(sheet.get_value("F16"), "");
        assert_eq!(sheet.get_value("D16"), "R1");
    }

    #[test]
    fn saved_report_reads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Test_Report_sample.xlsx");
        write_report(&[record("PASS", "R101")], &metadata(), &path).unwrap();

        let book = umya_spreadsheet::reader::xlsx::read(&path).unwrap();
        let sheet = book.get_sheet(&0).unwrap();
        assert_eq!(sheet.get_value("A14"), "Result");
        assert_eq!(sheet.get_value("D15"), "R101");
        assert_eq!(sheet.get_value("B3"), "27-Jun-25");
    }

    #[test]
    fn save_failure_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("report.xlsx");

        let err = write_report(&[], &metadata(), &path).unwrap_err();
        assert!(matches!(err, Error::ReportWrite { .. }));
    }
}
