//! XLSX rendering of the grouped order report

use crate::grouping::{group_items, ReportRow, Totals};
use crate::record::ItemRecord;
use crate::ReportError;
use chrono::NaiveDate;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};

/// Header labels, columns 1-9.
const HEADERS: [&str; 9] = [
    "ORDER ID", "ITEM", "F/B", "SHIRT TYPE", "QUANT.", "COLOR", "SIZE", "Approved", "Note",
];

/// Column widths in character units, columns 1-9.
const COLUMN_WIDTHS: [f64; 9] = [18.0, 8.0, 18.0, 20.0, 10.0, 16.0, 12.0, 10.0, 24.0];

const HEADER_FILL: Color = Color::RGB(0xC9DAF8);

/// Every sub-item is one garment, whatever its variant count.
const QUANTITY: &str = "1";

/// Builds the "Orders" worksheet from a flat item list.
///
/// The builder performs no I/O and never reads the clock; the caller saves
/// the returned workbook and injects the banner date if one is wanted.
pub struct ReportBuilder {
    date: Option<NaiveDate>,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self { date: None }
    }

    /// Stamp `date`, rendered day-month, into the DATE banner band.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Group `items` and render the report.
    ///
    /// Empty input is valid: the sheet then holds the banner, the header
    /// row and a zero-total footer.
    pub fn build(&self, items: &[ItemRecord]) -> Result<(Workbook, Totals), ReportError> {
        let (rows, totals) = group_items(items).into_rows();

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet().set_name("Orders")?;

        let banner = Format::new()
            .set_bold()
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin);
        let header = banner.clone().set_background_color(HEADER_FILL);
        let cell = Format::new()
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin);

        self.write_banner(sheet, &banner)?;

        for (col, label) in HEADERS.iter().enumerate() {
            sheet.write_string_with_format(3, col as u16, *label, &header)?;
        }

        let mut row_num = 4;
        for row in &rows {
            write_data_row(sheet, row_num, row, &cell)?;
            row_num += 1;
        }

        sheet.write_string_with_format(row_num, 0, "...", &cell)?;
        for col in 1..HEADERS.len() as u16 {
            sheet.write_blank(row_num, col, &cell)?;
        }
        row_num += 1;

        sheet.write_string_with_format(row_num, 0, "TOTAL FILMS", &cell)?;
        sheet.write_number_with_format(row_num, 1, totals.films as f64, &cell)?;
        sheet.write_blank(row_num, 2, &cell)?;
        sheet.write_string_with_format(row_num, 3, "TOTAL SHIRT", &cell)?;
        sheet.write_number_with_format(row_num, 4, totals.shirts as f64, &cell)?;
        for col in 5..HEADERS.len() as u16 {
            sheet.write_blank(row_num, col, &cell)?;
        }

        for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
            sheet.set_column_width(col as u16, *width)?;
        }

        Ok((workbook, totals))
    }

    /// Banner rows 1-2: three bands merged across both rows. The DATE band
    /// shows the injected date when one was given, else the bare label.
    fn write_banner(&self, sheet: &mut Worksheet, banner: &Format) -> Result<(), ReportError> {
        sheet.merge_range(0, 0, 1, 0, "FILE", banner)?;
        let date_band = match self.date {
            Some(date) => date.format("%d-%m").to_string(),
            None => "DATE".to_string(),
        };
        sheet.merge_range(0, 1, 1, 1, &date_band, banner)?;
        sheet.merge_range(0, 2, 1, 2, "TYPE", banner)?;
        Ok(())
    }
}

fn write_data_row(
    sheet: &mut Worksheet,
    row_num: u32,
    row: &ReportRow,
    cell: &Format,
) -> Result<(), ReportError> {
    sheet.write_string_with_format(row_num, 0, &row.order_id, cell)?;
    sheet.write_number_with_format(row_num, 1, row.item_count as f64, cell)?;
    sheet.write_string_with_format(row_num, 2, &row.labels, cell)?;
    sheet.write_string_with_format(row_num, 3, &row.shirt_type, cell)?;
    sheet.write_string_with_format(row_num, 4, QUANTITY, cell)?;
    sheet.write_string_with_format(row_num, 5, &row.color, cell)?;
    sheet.write_string_with_format(row_num, 6, &row.size, cell)?;
    sheet.write_blank(row_num, 7, cell)?;
    sheet.write_blank(row_num, 8, cell)?;
    Ok(())
}
