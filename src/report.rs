//! 受付レポート（Excel）出力

use crate::error::{CheckInError, Result};
use checkin_common::{AttendeeSnapshot, SessionCounters};
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, XlsxError};
use std::path::Path;

const ATTENDEES_SHEET: &str = "Attendees";
const SUMMARY_SHEET: &str = "Summary";

fn xlsx_error(e: XlsxError) -> CheckInError {
    CheckInError::Report(e.to_string())
}

/// 参加者一覧と集計をxlsxに書き出す
pub fn write_report(
    snapshot: &AttendeeSnapshot,
    counters: &SessionCounters,
    output_path: &Path,
) -> Result<()> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA));

    let sheet = workbook.add_worksheet();
    sheet.set_name(ATTENDEES_SHEET).map_err(xlsx_error)?;

    for (col, header) in snapshot.headers.iter().enumerate() {
        let col = col as u16;
        sheet
            .write_string_with_format(0, col, header, &header_format)
            .map_err(xlsx_error)?;
        sheet.set_column_width(col, 18).map_err(xlsx_error)?;
    }

    for (row, record) in snapshot.iter().enumerate() {
        let row = (row + 1) as u32;
        for (col, (_, value)) in record.fields.iter().enumerate() {
            sheet
                .write_string(row, col as u16, value)
                .map_err(xlsx_error)?;
        }
    }

    let summary = workbook.add_worksheet();
    summary.set_name(SUMMARY_SHEET).map_err(xlsx_error)?;
    summary.set_column_width(0, 20).map_err(xlsx_error)?;

    let rows = [
        ("Attendees", snapshot.len() as f64),
        ("Total Checked In", counters.total_checked_in as f64),
        ("Type A Tickets", counters.type_a as f64),
        ("Type B Tickets", counters.type_b as f64),
    ];
    for (row, (label, value)) in rows.iter().enumerate() {
        let row = row as u32;
        summary
            .write_string_with_format(row, 0, *label, &header_format)
            .map_err(xlsx_error)?;
        summary.write_number(row, 1, *value).map_err(xlsx_error)?;
    }

    workbook.save(output_path).map_err(xlsx_error)?;
    Ok(())
}
