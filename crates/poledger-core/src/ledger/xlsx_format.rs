//! Excel workbook ledgers.
//!
//! Workbooks are read with calamine and rewritten with rust_xlsxwriter. The
//! first worksheet holds the ledger; every other worksheet is carried through
//! by value. Formulas and dates keep their kind; cell styles are not kept.

use std::io::Cursor;

use calamine::{Data, Range, Reader, Xlsx};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_xlsxwriter::{Format, Formula, Workbook, Worksheet};
use tracing::{debug, trace};

use super::{Cell, Ledger, LedgerFormat, Result, Sheet};
use crate::error::LedgerError;

/// Largest column count Excel accepts.
const MAX_COLUMNS: usize = 16_384;

/// Largest row count Excel accepts.
const MAX_ROWS: usize = 1_048_576;

/// Number format for date cells carrying a time of day.
const DATETIME_FORMAT: &str = "mm/dd/yyyy hh:mm:ss";

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// XLSX ledger format.
pub struct XlsxFormat {
    date_format: String,
}

impl XlsxFormat {
    pub fn new() -> Self {
        Self {
            date_format: "mm/dd/yyyy".to_string(),
        }
    }

    /// Excel number format written for date cells.
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    fn read_sheet(&self, workbook: &mut Xlsx<Cursor<&[u8]>>, name: &str) -> Result<Vec<Vec<Cell>>> {
        let values = workbook
            .worksheet_range(name)
            .map_err(|e| LedgerError::XlsxRead(format!("sheet '{name}': {e}")))?;
        let formulas = workbook
            .worksheet_formula(name)
            .map_err(|e| LedgerError::XlsxRead(format!("sheet '{name}' formulas: {e}")))?;

        let mut grid = Vec::new();
        place_cells(&mut grid, &values, |d| self.cell_from_data(d));
        // A formula cell also has a cached value; the formula wins.
        place_cells(&mut grid, &formulas, |f| Cell::Formula(f.trim_start_matches('=').to_string()));

        for row in &mut grid {
            while row.last().is_some_and(Cell::is_empty) {
                row.pop();
            }
        }
        Ok(grid)
    }

    fn cell_from_data(&self, data: &Data) -> Cell {
        match data {
            Data::Empty => Cell::Empty,
            Data::Int(i) => Cell::Int(*i),
            Data::Float(f) => Cell::from_f64(*f),
            Data::String(s) if s.is_empty() => Cell::Empty,
            Data::String(s) if s.trim() == super::SENTINEL => Cell::Missing,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(value) => Cell::Date(value),
                None => Cell::from_f64(dt.as_f64()),
            },
            other => Cell::Text(other.to_string()),
        }
    }
}

impl Default for XlsxFormat {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy the used cells of a range into `grid` at their sheet positions.
///
/// Ranges begin at the first used cell, so the offset is added back to keep
/// the header in row 1, column A.
fn place_cells<T, F>(grid: &mut Vec<Vec<Cell>>, range: &Range<T>, to_cell: F)
where
    T: calamine::CellType,
    F: Fn(&T) -> Cell,
{
    let Some((start_row, start_col)) = range.start() else {
        return;
    };

    for (row, col, value) in range.used_cells() {
        let row = start_row as usize + row;
        let col = start_col as usize + col;
        if grid.len() <= row {
            grid.resize(row + 1, Vec::new());
        }
        let cells = &mut grid[row];
        if cells.len() <= col {
            cells.resize(col + 1, Cell::Empty);
        }
        cells[col] = to_cell(value);
    }
}

impl LedgerFormat for XlsxFormat {
    fn load(&self, data: &[u8], key_column: &str) -> Result<Ledger> {
        let cursor = Cursor::new(data);
        let mut workbook: Xlsx<_> = calamine::open_workbook_from_rs(cursor)
            .map_err(|e| LedgerError::XlsxRead(format!("failed to open xlsx: {e}")))?;

        let sheet_names = workbook.sheet_names();
        let (first, rest) = sheet_names
            .split_first()
            .ok_or_else(|| LedgerError::XlsxRead("workbook has no worksheets".into()))?;

        let mut ledger = Ledger::from_grid(self.read_sheet(&mut workbook, first)?, key_column)?;
        ledger.sheet_name = Some(first.clone());

        for name in rest {
            trace!("Carrying worksheet '{}' through", name);
            let rows = self.read_sheet(&mut workbook, name)?;
            ledger.other_sheets.push(Sheet {
                name: name.clone(),
                rows,
            });
        }

        debug!(
            "Loaded XLSX ledger '{}': {} columns, {} rows, {} other sheets",
            first,
            ledger.columns().len(),
            ledger.len(),
            ledger.other_sheets.len()
        );
        Ok(ledger)
    }

    fn save(&self, ledger: &Ledger) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let formats = CellFormats {
            header: Format::new().set_bold(),
            date: Format::new().set_num_format(&self.date_format),
            datetime: Format::new().set_num_format(DATETIME_FORMAT),
        };

        {
            let name = ledger.sheet_name.as_deref().unwrap_or("Sheet1");
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(name)?;
            write_grid(worksheet, name, &ledger.to_grid(), &formats, true)?;
            worksheet.autofit();
        }

        for sheet in &ledger.other_sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&sheet.name)?;
            write_grid(worksheet, &sheet.name, &sheet.rows, &formats, false)?;
        }

        Ok(workbook.save_to_buffer()?)
    }
}

struct CellFormats {
    header: Format,
    date: Format,
    datetime: Format,
}

fn write_grid(
    worksheet: &mut Worksheet,
    name: &str,
    grid: &[Vec<Cell>],
    formats: &CellFormats,
    bold_header: bool,
) -> Result<()> {
    let columns = grid.iter().map(Vec::len).max().unwrap_or(0);
    if grid.len() > MAX_ROWS || columns > MAX_COLUMNS {
        return Err(LedgerError::SheetTooLarge {
            sheet: name.to_string(),
            rows: grid.len(),
            columns,
        });
    }

    for (row_idx, row) in grid.iter().enumerate() {
        let row_num = row_idx as u32;
        for (col_idx, cell) in row.iter().enumerate() {
            let col_num = col_idx as u16;
            match cell {
                Cell::Empty => {}
                _ if bold_header && row_idx == 0 => {
                    worksheet.write_string_with_format(row_num, col_num, cell.to_string(), &formats.header)?;
                }
                Cell::Int(_) | Cell::Decimal(_) => match cell.as_f64() {
                    Some(n) => {
                        worksheet.write_number(row_num, col_num, n)?;
                    }
                    None => {
                        worksheet.write_string(row_num, col_num, cell.to_string())?;
                    }
                },
                Cell::Date(value) => match excel_serial(value) {
                    Some(serial) => {
                        let format = if value.time() == NaiveTime::MIN {
                            &formats.date
                        } else {
                            &formats.datetime
                        };
                        worksheet.write_number_with_format(row_num, col_num, serial, format)?;
                    }
                    None => {
                        worksheet.write_string(row_num, col_num, cell.to_string())?;
                    }
                },
                Cell::Formula(formula) => {
                    worksheet.write_formula(row_num, col_num, Formula::new(formula))?;
                }
                Cell::Missing | Cell::Text(_) => {
                    worksheet.write_string(row_num, col_num, cell.to_string())?;
                }
            }
        }
    }
    Ok(())
}

/// Days since the 1900 date system epoch, as Excel stores dates.
fn excel_serial(value: &NaiveDateTime) -> Option<f64> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_time(NaiveTime::MIN);
    Some((*value - epoch).num_milliseconds() as f64 / MILLIS_PER_DAY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::DEFAULT_KEY_COLUMN;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::new(
            vec!["PO_NUM".to_string(), "PO_DOLLARS".to_string(), "CARRIER".to_string()],
            DEFAULT_KEY_COLUMN,
        );
        ledger.append_row(vec![
            Cell::Int(123456),
            Cell::Decimal(Decimal::from_str("4500.25").unwrap()),
            Cell::Text("ACME".to_string()),
        ]);
        ledger.append_row(vec![Cell::Int(123457), Cell::Missing, Cell::Empty]);
        ledger.sheet_name = Some("Orders".to_string());
        ledger.other_sheets.push(Sheet {
            name: "Notes".to_string(),
            rows: vec![vec![Cell::Text("keep me".to_string())]],
        });
        ledger
    }

    #[test]
    fn test_workbook_round_trip() {
        let format = XlsxFormat::new();
        let ledger = sample_ledger();

        let bytes = format.save(&ledger).unwrap();
        let reloaded = format.load(&bytes, DEFAULT_KEY_COLUMN).unwrap();

        assert_eq!(reloaded, ledger);
    }

    #[test]
    fn test_sentinel_survives_workbook() {
        let format = XlsxFormat::new();
        let bytes = format.save(&sample_ledger()).unwrap();
        let reloaded = format.load(&bytes, DEFAULT_KEY_COLUMN).unwrap();

        assert_eq!(reloaded.rows()[1][1], Cell::Missing);
        assert_eq!(reloaded.existing_keys().unwrap().len(), 2);
    }

    #[test]
    fn test_formulas_survive_load_and_save() {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.write_string(0, 0, "PO_NUM").unwrap();
        worksheet.write_string(0, 1, "PO_DOLLARS").unwrap();
        worksheet.write_number(1, 0, 1.0).unwrap();
        worksheet.write_formula(1, 1, "=2+3").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let format = XlsxFormat::new();
        let ledger = format.load(&bytes, DEFAULT_KEY_COLUMN).unwrap();
        assert_eq!(ledger.rows()[0][1], Cell::Formula("2+3".to_string()));

        let reloaded = format
            .load(&format.save(&ledger).unwrap(), DEFAULT_KEY_COLUMN)
            .unwrap();
        assert_eq!(reloaded.rows()[0][1], Cell::Formula("2+3".to_string()));
        assert_eq!(reloaded.rows()[0][0], Cell::Int(1));
    }

    #[test]
    fn test_dates_survive_load_and_save() {
        let shipped = NaiveDate::from_ymd_opt(2024, 9, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut ledger = Ledger::new(
            vec!["PO_NUM".to_string(), "SHIP_DATE".to_string()],
            DEFAULT_KEY_COLUMN,
        );
        ledger.append_row(vec![Cell::Int(1), Cell::Date(shipped)]);

        let format = XlsxFormat::new();
        let reloaded = format
            .load(&format.save(&ledger).unwrap(), DEFAULT_KEY_COLUMN)
            .unwrap();

        assert_eq!(reloaded.rows()[0][1], Cell::Date(shipped));
        assert_eq!(reloaded.rows()[0][1].to_string(), "09/15/2024");
    }

    #[test]
    fn test_oversized_sheet_is_an_error() {
        let columns: Vec<String> = (0..=MAX_COLUMNS).map(|i| format!("C{i}")).collect();
        let ledger = Ledger::new(columns, "C0");

        let result = XlsxFormat::new().save(&ledger);
        assert!(matches!(
            result,
            Err(LedgerError::SheetTooLarge { columns, .. }) if columns == MAX_COLUMNS + 1
        ));
    }

    #[test]
    fn test_load_rejects_garbage() {
        let result = XlsxFormat::new().load(b"not a workbook", DEFAULT_KEY_COLUMN);
        assert!(matches!(result, Err(LedgerError::XlsxRead(_))));
    }
}
