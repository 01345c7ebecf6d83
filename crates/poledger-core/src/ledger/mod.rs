//! Keyed ledger tables and their file formats.

mod cell;
mod csv_format;
mod merge;
mod xlsx_format;

pub use cell::{Cell, SENTINEL};
pub use csv_format::CsvFormat;
pub use merge::{LedgerMerger, MergeSummary};
pub use xlsx_format::XlsxFormat;

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use crate::error::LedgerError;

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Default key column name.
pub const DEFAULT_KEY_COLUMN: &str = "PO_NUM";

/// Trait for ledger storage formats.
///
/// The merger works on [`Ledger`] only; formats translate between bytes and
/// the in-memory table.
pub trait LedgerFormat {
    /// Parse a ledger from file contents.
    fn load(&self, data: &[u8], key_column: &str) -> Result<Ledger>;

    /// Serialize a ledger to file contents.
    fn save(&self, ledger: &Ledger) -> Result<Vec<u8>>;
}

/// Supported ledger file kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerKind {
    /// Comma-separated values.
    Csv,
    /// Excel workbook.
    Xlsx,
}

impl LedgerKind {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "csv" => Ok(LedgerKind::Csv),
            "xlsx" => Ok(LedgerKind::Xlsx),
            _ => Err(LedgerError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            LedgerKind::Csv => "csv",
            LedgerKind::Xlsx => "xlsx",
        }
    }

    fn format(&self) -> Box<dyn LedgerFormat> {
        match self {
            LedgerKind::Csv => Box::new(CsvFormat::new()),
            LedgerKind::Xlsx => Box::new(XlsxFormat::new()),
        }
    }

    /// Parse a ledger of this kind.
    pub fn load(&self, data: &[u8], key_column: &str) -> Result<Ledger> {
        self.format().load(data, key_column)
    }

    /// Serialize a ledger in this kind's format.
    pub fn save(&self, ledger: &Ledger) -> Result<Vec<u8>> {
        self.format().save(ledger)
    }
}

/// A worksheet carried through a load/save cycle untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    /// Worksheet name.
    pub name: String,
    /// Cell grid, first row first.
    pub rows: Vec<Vec<Cell>>,
}

/// An ordered table of records keyed by one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
    key_column: String,
    /// Name of the worksheet the ledger came from, if any.
    pub sheet_name: Option<String>,
    /// Other worksheets of the source workbook.
    pub other_sheets: Vec<Sheet>,
}

impl Ledger {
    /// Create an empty ledger with a header row.
    pub fn new(columns: Vec<String>, key_column: impl Into<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            key_column: key_column.into(),
            sheet_name: None,
            other_sheets: Vec::new(),
        }
    }

    /// Build a ledger from a raw grid whose first row is the header.
    ///
    /// The table is as wide as its widest row. Columns holding data under a
    /// blank header get an empty name; rows with no data at all are dropped.
    pub fn from_grid(grid: Vec<Vec<Cell>>, key_column: impl Into<String>) -> Result<Self> {
        let mut grid = grid.into_iter();
        let header = grid.next().ok_or(LedgerError::Empty)?;

        let rows: Vec<Vec<Cell>> = grid
            .filter(|row| !row.iter().all(Cell::is_empty))
            .map(|mut row| {
                while row.last().is_some_and(Cell::is_empty) {
                    row.pop();
                }
                row
            })
            .collect();
        let data_width = rows.iter().map(Vec::len).max().unwrap_or(0);

        let mut columns: Vec<String> = header.iter().map(|c| c.to_string().trim().to_string()).collect();
        while columns.len() > data_width && columns.last().is_some_and(|c| c.is_empty()) {
            columns.pop();
        }
        if columns.iter().all(|c| c.is_empty()) {
            return Err(LedgerError::Empty);
        }
        if columns.len() < data_width {
            columns.resize(data_width, String::new());
        }

        let mut ledger = Ledger::new(columns, key_column);
        for row in rows {
            ledger.append_row(row);
        }
        Ok(ledger)
    }

    /// Header names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Data rows in order.
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Name of the key column.
    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    /// Position of the key column in the header.
    pub fn key_position(&self) -> Result<usize> {
        self.column_position(&self.key_column)
            .ok_or_else(|| LedgerError::MissingKeyColumn(self.key_column.clone()))
    }

    /// Position of a named column.
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Rename header cells in place, left to right.
    ///
    /// Values are not reshuffled: row `i`, column `j` keeps its value under
    /// the new name at `j`. Columns past the end of `names` keep their old
    /// names and values; a longer `names` widens every row.
    pub fn rename_columns(&mut self, names: &[String]) {
        for (i, name) in names.iter().enumerate() {
            match self.columns.get_mut(i) {
                Some(column) => column.clone_from(name),
                None => self.columns.push(name.clone()),
            }
        }
        self.pad_rows();
    }

    /// Append a row, padding it to the header width.
    ///
    /// A row wider than the header widens the table with unnamed columns.
    pub fn append_row(&mut self, mut row: Vec<Cell>) -> usize {
        if row.len() > self.columns.len() {
            self.columns.resize(row.len(), String::new());
            self.pad_rows();
        }
        row.resize(self.columns.len(), Cell::Empty);
        self.rows.push(row);
        self.rows.len() - 1
    }

    fn pad_rows(&mut self) {
        let width = self.columns.len();
        for row in &mut self.rows {
            if row.len() < width {
                row.resize(width, Cell::Empty);
            }
        }
    }

    /// Cell at (row, column).
    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Overwrite the cell at (row, column).
    pub fn set_cell(&mut self, row: usize, column: usize, value: Cell) -> bool {
        match self.rows.get_mut(row).and_then(|r| r.get_mut(column)) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    /// Map from key to row index.
    ///
    /// If the file holds a key more than once, the last row wins.
    pub fn key_index(&self) -> Result<HashMap<u64, usize>> {
        let position = self.key_position()?;
        Ok(self
            .rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| row.get(position).and_then(Cell::as_key).map(|k| (k, i)))
            .collect())
    }

    /// Keys currently present in the ledger.
    pub fn existing_keys(&self) -> Result<BTreeSet<u64>> {
        Ok(self.key_index()?.into_keys().collect())
    }

    /// Row for a key, if present.
    pub fn find_row(&self, key: u64) -> Result<Option<&[Cell]>> {
        Ok(self.key_index()?.get(&key).map(|&i| self.rows[i].as_slice()))
    }

    /// Header followed by data rows, for writers.
    pub fn to_grid(&self) -> Vec<Vec<Cell>> {
        let mut grid = Vec::with_capacity(self.rows.len() + 1);
        grid.push(self.columns.iter().map(|c| Cell::Text(c.clone())).collect());
        grid.extend(self.rows.iter().cloned());
        grid
    }
}
