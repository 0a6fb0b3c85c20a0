// src/export/xlsx.rs

use crate::errors::AppResult;
use crate::export::excel_date::{DATETIME_FORMAT, naive_datetime_to_excel_serial};
use crate::export::model::{Cell, CellValue, ExportSheet};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatPattern, Workbook, Worksheet};
use unicode_width::UnicodeWidthStr;

const BAND_1: u32 = 0xEAF3FB;
const BAND_2: u32 = 0xFFFFFF;
const PASS_FILL: u32 = 0xC6EFCE;
const PASS_FONT: u32 = 0x006100;
const FAIL_FILL: u32 = 0xFFC7CE;
const FAIL_FONT: u32 = 0x9C0006;

/// Workbook with a styled header, banded rows and auto-sized columns.
/// Readings with a verdict are filled green (pass) or red (fail).
pub(crate) fn render_xlsx(sheet: &ExportSheet) -> AppResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet.name)?;

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0xFFFFFF))
        .set_background_color(Color::RGB(0x2F75B5))
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);

    for (col, header) in sheet.headers.iter().enumerate() {
        worksheet.write_with_format(0, col as u16, *header, &header_format)?;
    }
    worksheet.set_freeze_panes(1, 0).ok();

    let mut col_widths: Vec<usize> = sheet.headers.iter().map(|h| h.width()).collect();

    for (row_index, cells) in sheet.rows.iter().enumerate() {
        let row = (row_index + 1) as u32;
        let band = if row_index % 2 == 0 { BAND_1 } else { BAND_2 };

        for (col, cell) in cells.iter().enumerate() {
            write_cell(worksheet, row, col as u16, cell, band)?;
            if let Some(w) = col_widths.get_mut(col) {
                *w = (*w).max(cell.display().width());
            }
        }
    }

    for (c, w) in col_widths.iter().enumerate() {
        worksheet.set_column_width(c as u16, *w as f64 + 2.0)?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn cell_format(cell: &Cell, band: u32) -> Format {
    let (fill, font) = match cell.verdict {
        Some(true) => (PASS_FILL, Some(PASS_FONT)),
        Some(false) => (FAIL_FILL, Some(FAIL_FONT)),
        None => (band, None),
    };

    let mut fmt = Format::new()
        .set_background_color(Color::RGB(fill))
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);
    if let Some(font) = font {
        fmt = fmt.set_font_color(Color::RGB(font));
    }
    fmt
}

fn write_cell(ws: &mut Worksheet, row: u32, col: u16, cell: &Cell, band: u32) -> AppResult<()> {
    let fmt = cell_format(cell, band);

    match &cell.value {
        CellValue::Empty => {
            ws.write_blank(row, col, &fmt)?;
        }
        CellValue::Text(s) => {
            ws.write_with_format(row, col, s.as_str(), &fmt)?;
        }
        CellValue::Int(n) => {
            ws.write_with_format(row, col, *n as f64, &fmt.set_align(FormatAlign::Right))?;
        }
        CellValue::Float(n) => {
            let fmt = fmt.set_align(FormatAlign::Right).set_num_format("0.00");
            ws.write_with_format(row, col, *n, &fmt)?;
        }
        CellValue::Timestamp(ts) => {
            let fmt = fmt.set_num_format(DATETIME_FORMAT);
            ws.write_with_format(row, col, naive_datetime_to_excel_serial(ts), &fmt)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workbook_is_a_zip_container() {
        let sheet = ExportSheet {
            name: "Tensiones",
            file_stem: "tensions_export",
            headers: vec!["id", "da"],
            rows: vec![vec![Cell::int(1), Cell::float(Some(-5.0)).with_verdict(Some(false))]],
        };
        let bytes = render_xlsx(&sheet).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
