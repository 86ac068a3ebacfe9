use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, XlsxError};

const MONEY_FORMAT: &str = "#,##0.00";
const PERCENT_FORMAT: &str = "0.00%";

/// One column of a rendered table.
pub struct Column {
    pub header: &'static str,
    pub width: f64,
}

impl Column {
    pub const fn new(header: &'static str) -> Self {
        Self { header, width: 20.0 }
    }

    pub const fn wide(header: &'static str, width: f64) -> Self {
        Self { header, width }
    }
}

/// A single table cell. Money and percent cells carry decimals; conversion
/// to the spreadsheet's float representation happens only at write time,
/// for display.
pub enum Cell {
    Text(String),
    Int(i64),
    Money(Decimal),
    /// Percent in percent units (16 renders as 16.00%).
    Percent(Decimal),
    Date(NaiveDate),
    Empty,
}

/// Styled worksheet writer shared by every report kind: merged bold title,
/// italic period banner, bordered header rows, fixed-width columns, money
/// number format, bold total rows. Rows are appended top to bottom.
pub struct SheetBuilder {
    workbook: Workbook,
    row: u32,
    banner_fmt: Format,
    section_fmt: Format,
    header_fmt: Format,
    money_fmt: Format,
    percent_fmt: Format,
    bold_fmt: Format,
    bold_money_fmt: Format,
}

impl SheetBuilder {
    pub fn new(title: &str, table_width: u16) -> Result<Self, XlsxError> {
        let mut workbook = Workbook::new();
        let title_fmt = Format::new()
            .set_bold()
            .set_font_size(16)
            .set_align(FormatAlign::Center);
        let banner_fmt = Format::new().set_italic();
        let section_fmt = Format::new().set_bold().set_font_size(12);
        let header_fmt = Format::new()
            .set_bold()
            .set_align(FormatAlign::Center)
            .set_border(FormatBorder::Thin);
        let money_fmt = Format::new().set_num_format(MONEY_FORMAT);
        let percent_fmt = Format::new().set_num_format(PERCENT_FORMAT);
        let bold_fmt = Format::new().set_bold();
        let bold_money_fmt = Format::new().set_bold().set_num_format(MONEY_FORMAT);

        {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(title)?;
            let last_col = table_width.saturating_sub(1);
            worksheet.merge_range(0, 0, 0, last_col, title, &title_fmt)?;
        }

        Ok(Self {
            workbook,
            row: 1,
            banner_fmt,
            section_fmt,
            header_fmt,
            money_fmt,
            percent_fmt,
            bold_fmt,
            bold_money_fmt,
        })
    }

    /// Italic "Period: start to end" line under the title.
    pub fn period_banner(&mut self, start: NaiveDate, end: NaiveDate) -> Result<(), XlsxError> {
        let text = format!("Period: {} to {}", start, end);
        let row = self.next_row();
        let worksheet = self.workbook.worksheet_from_index(0)?;
        worksheet.write_string_with_format(row, 0, &text, &self.banner_fmt)?;
        Ok(())
    }

    /// Bold sub-table heading (department name etc).
    pub fn section_title(&mut self, text: &str) -> Result<(), XlsxError> {
        let row = self.next_row();
        let worksheet = self.workbook.worksheet_from_index(0)?;
        worksheet.write_string_with_format(row, 0, text, &self.section_fmt)?;
        Ok(())
    }

    /// Bordered header row; also fixes the column widths.
    pub fn headers(&mut self, columns: &[Column]) -> Result<(), XlsxError> {
        let row = self.next_row();
        let worksheet = self.workbook.worksheet_from_index(0)?;
        for (col, column) in columns.iter().enumerate() {
            let col = col as u16;
            worksheet.write_string_with_format(row, col, column.header, &self.header_fmt)?;
            worksheet.set_column_width(col, column.width)?;
        }
        Ok(())
    }

    pub fn data_row(&mut self, cells: &[Cell]) -> Result<(), XlsxError> {
        self.write_row(cells, false)
    }

    /// Bolded rollup row.
    pub fn total_row(&mut self, cells: &[Cell]) -> Result<(), XlsxError> {
        self.write_row(cells, true)
    }

    pub fn blank_row(&mut self) {
        self.row += 1;
    }

    fn next_row(&mut self) -> u32 {
        let row = self.row;
        self.row += 1;
        row
    }

    fn write_row(&mut self, cells: &[Cell], bold: bool) -> Result<(), XlsxError> {
        let row = self.next_row();
        let worksheet = self.workbook.worksheet_from_index(0)?;
        for (col, cell) in cells.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(s) => {
                    if bold {
                        worksheet.write_string_with_format(row, col, s, &self.bold_fmt)?;
                    } else {
                        worksheet.write_string(row, col, s)?;
                    }
                }
                Cell::Int(n) => {
                    worksheet.write_number(row, col, *n as f64)?;
                }
                Cell::Money(d) => {
                    let fmt = if bold { &self.bold_money_fmt } else { &self.money_fmt };
                    worksheet.write_number_with_format(row, col, decimal_display(*d), fmt)?;
                }
                Cell::Percent(d) => {
                    worksheet.write_number_with_format(
                        row,
                        col,
                        decimal_display(*d / Decimal::ONE_HUNDRED),
                        &self.percent_fmt,
                    )?;
                }
                Cell::Date(date) => {
                    worksheet.write_string(row, col, &date.to_string())?;
                }
                Cell::Empty => {}
            }
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<Vec<u8>, XlsxError> {
        self.workbook.save_to_buffer()
    }
}

// Display-only conversion; never feeds back into arithmetic.
fn decimal_display(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn builds_a_complete_sheet() {
        let mut sheet = SheetBuilder::new("Payroll Detail Report", 3).unwrap();
        sheet.period_banner(d(2026, 3, 1), d(2026, 3, 31)).unwrap();
        sheet
            .headers(&[
                Column::new("Employee"),
                Column::new("Gross Salary"),
                Column::new("Net Salary"),
            ])
            .unwrap();
        sheet
            .data_row(&[
                Cell::Text("John Doe".to_string()),
                Cell::Money(dec!(90000)),
                Cell::Money(dec!(69100)),
            ])
            .unwrap();
        sheet
            .total_row(&[
                Cell::Text("Total".to_string()),
                Cell::Money(dec!(90000)),
                Cell::Money(dec!(69100)),
            ])
            .unwrap();

        let bytes = sheet.finish().unwrap();
        // xlsx artifacts are zip containers.
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn mixed_cell_kinds_write_cleanly() {
        let mut sheet = SheetBuilder::new("Tax Summary Report", 5).unwrap();
        sheet
            .headers(&[
                Column::new("ID"),
                Column::new("Name"),
                Column::new("Rate"),
                Column::new("Period"),
                Column::new("Blank"),
            ])
            .unwrap();
        sheet
            .data_row(&[
                Cell::Int(7),
                Cell::Text("Jane".to_string()),
                Cell::Percent(dec!(16)),
                Cell::Date(d(2026, 1, 1)),
                Cell::Empty,
            ])
            .unwrap();
        assert!(!sheet.finish().unwrap().is_empty());
    }
}
