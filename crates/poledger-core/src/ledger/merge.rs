//! Keyed merge of new records into a ledger.

use serde::Serialize;
use tracing::{debug, info};

use super::{Ledger, Result};
use crate::error::LedgerError;
use crate::models::record::Record;

/// Outcome of a merge, keys listed in the order they were processed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    /// Keys appended as new rows.
    pub inserted: Vec<u64>,
    /// Keys whose existing row was updated.
    pub updated: Vec<u64>,
}

/// Reconciles records into a ledger by key.
///
/// Existing rows are only overwritten where the incoming value is not the
/// sentinel, so an incomplete extraction never erases captured data.
pub struct LedgerMerger;

impl LedgerMerger {
    pub fn new() -> Self {
        Self
    }

    /// Merge `records` into `ledger` using the caller's column order.
    ///
    /// The key column must appear in `column_order`; otherwise the ledger is
    /// left untouched. The leading header cells are renamed to `column_order`
    /// when they differ, and columns past its end are kept.
    /// Appended rows are indexed immediately, so two records sharing a key in
    /// one call end up in a single row.
    pub fn merge(
        &self,
        ledger: &mut Ledger,
        records: &[Record],
        column_order: &[String],
    ) -> Result<MergeSummary> {
        let key_position = column_order
            .iter()
            .position(|c| c == ledger.key_column())
            .ok_or_else(|| LedgerError::MissingKeyColumn(ledger.key_column().to_string()))?;

        if !ledger.columns().starts_with(column_order) {
            debug!(
                "Rewriting ledger header {:?} -> {:?}",
                ledger.columns(),
                column_order
            );
            ledger.rename_columns(column_order);
        }

        let mut index = ledger.key_index()?;
        let mut summary = MergeSummary::default();

        for record in records {
            let row = record.to_row(column_order);

            match index.get(&record.po_num) {
                Some(&row_idx) => {
                    for (col_idx, value) in row.into_iter().enumerate() {
                        if col_idx == key_position || value.is_missing() || value.is_empty() {
                            continue;
                        }
                        ledger.set_cell(row_idx, col_idx, value);
                    }
                    debug!("Updated PO #{} at row {}", record.po_num, row_idx);
                    summary.updated.push(record.po_num);
                }
                None => {
                    let row_idx = ledger.append_row(row);
                    index.insert(record.po_num, row_idx);
                    debug!("Appended PO #{} at row {}", record.po_num, row_idx);
                    summary.inserted.push(record.po_num);
                }
            }
        }

        info!(
            "Merged {} records: {} inserted, {} updated",
            records.len(),
            summary.inserted.len(),
            summary.updated.len()
        );
        Ok(summary)
    }
}

impl Default for LedgerMerger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Cell, DEFAULT_KEY_COLUMN};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn acme_ledger() -> Ledger {
        let mut ledger = Ledger::new(columns(&["PO_NUM", "CARRIER", "UNITS"]), DEFAULT_KEY_COLUMN);
        ledger.append_row(vec![
            Cell::Int(123456),
            Cell::Text("ACME".to_string()),
            Cell::Int(40),
        ]);
        ledger
    }

    #[test]
    fn test_missing_fields_do_not_overwrite() {
        let mut ledger = acme_ledger();
        let mut record = Record::new(123456);
        record.units = Some(42);

        let order = ledger.columns().to_vec();
        let summary = LedgerMerger::new().merge(&mut ledger, &[record], &order).unwrap();

        assert_eq!(summary.updated, vec![123456]);
        assert_eq!(ledger.len(), 1);
        assert_eq!(
            ledger.rows()[0],
            vec![Cell::Int(123456), Cell::Text("ACME".to_string()), Cell::Int(42)]
        );
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut ledger = Ledger::new(columns(&["PO_NUM", "PO_DOLLARS", "CARRIER"]), DEFAULT_KEY_COLUMN);
        let mut record = Record::new(9);
        record.po_dollars = Some(Decimal::from_str("10.50").unwrap());
        record.carrier = Some("ACME".to_string());

        let order = ledger.columns().to_vec();
        let merger = LedgerMerger::new();
        merger.merge(&mut ledger, &[record.clone()], &order).unwrap();
        let after_first = ledger.clone();

        let summary = merger.merge(&mut ledger, &[record], &order).unwrap();
        assert_eq!(summary.inserted, Vec::<u64>::new());
        assert_eq!(ledger, after_first);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_new_record_is_coerced_to_column_order() {
        let mut ledger = acme_ledger();
        let mut record = Record::new(777);
        record.units = Some(5);
        record.region = Some("SE".to_string());

        let order = ledger.columns().to_vec();
        LedgerMerger::new().merge(&mut ledger, &[record], &order).unwrap();

        assert_eq!(
            ledger.rows()[1],
            vec![Cell::Int(777), Cell::Missing, Cell::Int(5)]
        );
    }

    #[test]
    fn test_same_key_twice_in_one_merge() {
        let mut ledger = acme_ledger();
        let mut first = Record::new(5);
        first.carrier = Some("Swift".to_string());
        let mut second = Record::new(5);
        second.units = Some(3);

        let order = ledger.columns().to_vec();
        let summary = LedgerMerger::new()
            .merge(&mut ledger, &[first, second], &order)
            .unwrap();

        assert_eq!(summary.inserted, vec![5]);
        assert_eq!(summary.updated, vec![5]);
        assert_eq!(ledger.len(), 2);
        assert_eq!(
            ledger.rows()[1],
            vec![Cell::Int(5), Cell::Text("Swift".to_string()), Cell::Int(3)]
        );
    }

    #[test]
    fn test_header_rewritten_to_column_order() {
        let mut ledger = Ledger::new(columns(&["po", "carrier"]), DEFAULT_KEY_COLUMN);
        ledger.append_row(vec![Cell::Int(1), Cell::Text("ACME".to_string())]);

        let order = columns(&["PO_NUM", "CARRIER", "CLIENT"]);
        let mut record = Record::new(1);
        record.client = Some("Magic Spoon".to_string());
        LedgerMerger::new().merge(&mut ledger, &[record], &order).unwrap();

        assert_eq!(ledger.columns(), order.as_slice());
        assert_eq!(
            ledger.rows()[0],
            vec![
                Cell::Int(1),
                Cell::Text("ACME".to_string()),
                Cell::Text("Magic Spoon".to_string()),
            ]
        );
    }

    #[test]
    fn test_missing_key_column_is_an_error() {
        let mut ledger = Ledger::new(columns(&["ORDER"]), DEFAULT_KEY_COLUMN);
        let order = columns(&["ORDER", "CARRIER"]);

        let result = LedgerMerger::new().merge(&mut ledger, &[Record::new(1)], &order);
        assert!(matches!(result, Err(LedgerError::MissingKeyColumn(_))));
    }

    #[test]
    fn test_rejected_column_order_leaves_ledger_untouched() {
        let mut ledger = Ledger::new(columns(&["PO_NUM", "CARRIER"]), DEFAULT_KEY_COLUMN);
        ledger.append_row(vec![Cell::Int(1), Cell::Text("ACME".to_string())]);
        let before = ledger.clone();

        let result = LedgerMerger::new().merge(&mut ledger, &[Record::new(1)], &columns(&["ORDER"]));

        assert!(matches!(result, Err(LedgerError::MissingKeyColumn(_))));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_narrower_column_order_keeps_trailing_cells() {
        let mut ledger = acme_ledger();
        let mut record = Record::new(123456);
        record.carrier = Some("Swift".to_string());

        let order = columns(&["PO_NUM", "CARRIER"]);
        LedgerMerger::new().merge(&mut ledger, &[record], &order).unwrap();

        assert_eq!(ledger.columns(), columns(&["PO_NUM", "CARRIER", "UNITS"]).as_slice());
        assert_eq!(
            ledger.rows()[0],
            vec![Cell::Int(123456), Cell::Text("Swift".to_string()), Cell::Int(40)]
        );
    }

    #[test]
    fn test_unnamed_columns_are_not_cleared() {
        let mut ledger = Ledger::new(columns(&["PO_NUM", ""]), DEFAULT_KEY_COLUMN);
        ledger.append_row(vec![Cell::Int(1), Cell::Text("note".to_string())]);

        let order = ledger.columns().to_vec();
        LedgerMerger::new().merge(&mut ledger, &[Record::new(1), Record::new(2)], &order).unwrap();

        assert_eq!(ledger.rows()[0][1], Cell::Text("note".to_string()));
        assert_eq!(ledger.rows()[1], vec![Cell::Int(2), Cell::Empty]);
    }
}
