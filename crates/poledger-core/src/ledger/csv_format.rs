//! Comma-separated ledger files.

use tracing::debug;

use super::{Cell, Ledger, LedgerFormat, Result};

/// CSV ledger format.
///
/// The first record is the header. Cells are typed on read with
/// [`Cell::parse`], so `N/A` comes back as the sentinel.
pub struct CsvFormat {
    delimiter: u8,
}

impl CsvFormat {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    /// Use a different field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerFormat for CsvFormat {
    fn load(&self, data: &[u8], key_column: &str) -> Result<Ledger> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(data);

        let mut grid = Vec::new();
        for record in reader.records() {
            let record = record?;
            grid.push(record.iter().map(Cell::parse).collect());
        }

        let ledger = Ledger::from_grid(grid, key_column)?;
        debug!(
            "Loaded CSV ledger: {} columns, {} rows",
            ledger.columns().len(),
            ledger.len()
        );
        Ok(ledger)
    }

    fn save(&self, ledger: &Ledger) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(vec![]);

        writer.write_record(ledger.columns())?;
        for row in ledger.rows() {
            writer.write_record(row.iter().map(|c| c.to_string()))?;
        }

        writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const LEDGER: &str = "PO_NUM,PO_DOLLARS,CARRIER,ITEM_DESCRIPTION\n\
                          123456,4500.00,ACME,\"Cereal, 12 ct\"\n\
                          123457,N/A,,Granola\n";

    #[test]
    fn test_load_types_cells() {
        let ledger = CsvFormat::new().load(LEDGER.as_bytes(), "PO_NUM").unwrap();

        assert_eq!(ledger.columns(), ["PO_NUM", "PO_DOLLARS", "CARRIER", "ITEM_DESCRIPTION"]);
        assert_eq!(
            ledger.rows()[0],
            vec![
                Cell::Int(123456),
                Cell::Decimal(Decimal::from_str("4500.00").unwrap()),
                Cell::Text("ACME".to_string()),
                Cell::Text("Cereal, 12 ct".to_string()),
            ]
        );
        assert_eq!(ledger.rows()[1][1], Cell::Missing);
        assert_eq!(ledger.rows()[1][2], Cell::Empty);
    }

    #[test]
    fn test_save_reproduces_input() {
        let format = CsvFormat::new();
        let ledger = format.load(LEDGER.as_bytes(), "PO_NUM").unwrap();
        let bytes = format.save(&ledger).unwrap();

        assert_eq!(String::from_utf8(bytes).unwrap(), LEDGER);
    }

    #[test]
    fn test_save_keeps_data_under_blank_header() {
        let data = "PO_NUM,CARRIER,\n1,ACME,keep-me\n";
        let format = CsvFormat::new();
        let ledger = format.load(data.as_bytes(), "PO_NUM").unwrap();

        assert_eq!(ledger.rows()[0][2], Cell::Text("keep-me".to_string()));
        assert_eq!(String::from_utf8(format.save(&ledger).unwrap()).unwrap(), data);
    }

    #[test]
    fn test_load_semicolon_delimited() {
        let data = "PO_NUM;CARRIER\n1;ACME\n";
        let ledger = CsvFormat::new()
            .with_delimiter(b';')
            .load(data.as_bytes(), "PO_NUM")
            .unwrap();

        assert_eq!(ledger.rows()[0][1], Cell::Text("ACME".to_string()));
    }
}
