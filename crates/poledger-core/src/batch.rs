//! Per-invocation document batch with duplicate screening.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::models::record::{Record, Supplement};
use crate::purchase_order::{ExtractionResult, FieldExtractor, RecordParser};

/// A document that produced no record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejected {
    pub source: String,
    pub reason: String,
}

/// Where a duplicate key was already seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateKind {
    /// The ledger already has a row for the key.
    InLedger,
    /// An earlier document in this batch had the key.
    InBatch,
}

/// A document whose key was already taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Duplicate {
    pub source: String,
    pub po_num: u64,
    pub kind: DuplicateKind,
}

/// A document accepted into the batch.
#[derive(Debug, Clone, Serialize)]
pub struct Accepted {
    /// Documents that contributed to the record, first one first.
    pub sources: Vec<String>,
    pub result: ExtractionResult,
}

impl Accepted {
    pub fn record(&self) -> &Record {
        &self.result.record
    }
}

/// What happened to one added document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    Accepted(u64),
    Rejected,
    Duplicate(u64, DuplicateKind),
}

/// Documents collected for one merge.
///
/// Keys already present in the ledger are excluded. A key seen twice within
/// the batch keeps one record, with the later document's values folded in.
pub struct Batch {
    extractor: FieldExtractor,
    existing_keys: BTreeSet<u64>,
    accepted: Vec<Accepted>,
    positions: HashMap<u64, usize>,
    rejected: Vec<Rejected>,
    duplicates: Vec<Duplicate>,
}

impl Batch {
    pub fn new(existing_keys: BTreeSet<u64>) -> Self {
        Self::with_extractor(existing_keys, FieldExtractor::default())
    }

    pub fn with_extractor(existing_keys: BTreeSet<u64>, extractor: FieldExtractor) -> Self {
        Self {
            extractor,
            existing_keys,
            accepted: Vec::new(),
            positions: HashMap::new(),
            rejected: Vec::new(),
            duplicates: Vec::new(),
        }
    }

    /// Extract a document and file it.
    pub fn add(&mut self, source: impl Into<String>, text: &str) -> BatchOutcome {
        let source = source.into();

        let result = match self.extractor.parse(text) {
            Ok(result) => result,
            Err(e) => {
                self.reject(source, e.to_string());
                return BatchOutcome::Rejected;
            }
        };

        let po_num = result.record.po_num;

        if self.existing_keys.contains(&po_num) {
            warn!("{}: PO #{} is already in the ledger", source, po_num);
            self.duplicates.push(Duplicate {
                source,
                po_num,
                kind: DuplicateKind::InLedger,
            });
            return BatchOutcome::Duplicate(po_num, DuplicateKind::InLedger);
        }

        if let Some(&idx) = self.positions.get(&po_num) {
            warn!("{}: PO #{} appeared earlier in this batch", source, po_num);
            let earlier = &mut self.accepted[idx];
            self.extractor.fold(&mut earlier.result, &result);
            earlier.sources.push(source.clone());
            self.duplicates.push(Duplicate {
                source,
                po_num,
                kind: DuplicateKind::InBatch,
            });
            return BatchOutcome::Duplicate(po_num, DuplicateKind::InBatch);
        }

        info!("{}: accepted PO #{}", source, po_num);
        self.positions.insert(po_num, self.accepted.len());
        self.accepted.push(Accepted {
            sources: vec![source],
            result,
        });
        BatchOutcome::Accepted(po_num)
    }

    /// Record a document that could not be read at all.
    pub fn reject(&mut self, source: impl Into<String>, reason: impl Into<String>) {
        let rejected = Rejected {
            source: source.into(),
            reason: reason.into(),
        };
        warn!("{}: {}", rejected.source, rejected.reason);
        self.rejected.push(rejected);
    }

    /// Apply the same operator-supplied fields to every accepted record.
    pub fn supplement_all(&mut self, supplement: &Supplement) {
        for accepted in &mut self.accepted {
            accepted.result.record.apply_supplement(supplement);
        }
    }

    /// Apply operator-supplied fields to one record.
    pub fn supplement(&mut self, po_num: u64, supplement: &Supplement) -> bool {
        match self.positions.get(&po_num) {
            Some(&idx) => {
                self.accepted[idx].result.record.apply_supplement(supplement);
                true
            }
            None => {
                debug!("No accepted record for PO #{}", po_num);
                false
            }
        }
    }

    pub fn accepted(&self) -> &[Accepted] {
        &self.accepted
    }

    pub fn rejected(&self) -> &[Rejected] {
        &self.rejected
    }

    pub fn duplicates(&self) -> &[Duplicate] {
        &self.duplicates
    }

    /// Accepted records in the order their documents were added.
    pub fn records(&self) -> Vec<Record> {
        self.accepted.iter().map(|a| a.result.record.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::Column;
    use pretty_assertions::assert_eq;

    fn doc(po: u64, extra: &str) -> String {
        format!("Order #: {po}\n{extra}\n")
    }

    #[test]
    fn test_unrecognized_document_is_rejected() {
        let mut batch = Batch::new(BTreeSet::new());

        assert_eq!(batch.add("memo.txt", "nothing to see"), BatchOutcome::Rejected);
        assert_eq!(batch.add("po.txt", &doc(7, "")), BatchOutcome::Accepted(7));

        assert_eq!(batch.rejected().len(), 1);
        assert_eq!(batch.rejected()[0].source, "memo.txt");
        assert_eq!(batch.records().len(), 1);
    }

    #[test]
    fn test_key_in_ledger_is_excluded() {
        let mut batch = Batch::new(BTreeSet::from([123456]));

        let outcome = batch.add("a.pdf", &doc(123456, "Purchase Order Total: 10.00"));

        assert_eq!(outcome, BatchOutcome::Duplicate(123456, DuplicateKind::InLedger));
        assert!(batch.is_empty());
        assert_eq!(
            batch.duplicates(),
            &[Duplicate {
                source: "a.pdf".to_string(),
                po_num: 123456,
                kind: DuplicateKind::InLedger,
            }]
        );
    }

    #[test]
    fn test_repeat_within_batch_is_folded() {
        let mut batch = Batch::new(BTreeSet::new());

        batch.add("first.pdf", &doc(5, "DFI% - 2"));
        let outcome = batch.add("second.pdf", &doc(5, "FRT% - 1.5"));

        assert_eq!(outcome, BatchOutcome::Duplicate(5, DuplicateKind::InBatch));
        assert_eq!(batch.accepted().len(), 1);

        let accepted = &batch.accepted()[0];
        assert_eq!(accepted.sources, vec!["first.pdf", "second.pdf"]);
        assert_eq!(accepted.record().dfi.map(|d| d.to_string()), Some("2".to_string()));
        assert_eq!(accepted.record().frt.map(|d| d.to_string()), Some("1.5".to_string()));
        assert!(!accepted.result.missing.contains(&Column::Dfi));
        assert!(!accepted.result.missing.contains(&Column::Frt));
        assert!(!accepted.result.warnings.iter().any(|w| w.contains("FRT")));
    }

    #[test]
    fn test_supplements() {
        let mut batch = Batch::new(BTreeSet::new());
        batch.add("a.pdf", &doc(1, ""));
        batch.add("b.pdf", &doc(2, ""));

        batch.supplement_all(&Supplement {
            carrier: Some("ACME".to_string()),
            ..Default::default()
        });
        assert!(batch.supplement(
            2,
            &Supplement {
                rotation: Some(3),
                client: Some("Magic Spoon".to_string()),
                ..Default::default()
            }
        ));
        assert!(!batch.supplement(99, &Supplement::default()));

        let records = batch.records();
        assert_eq!(records[0].carrier.as_deref(), Some("ACME"));
        assert_eq!(records[1].carrier, None);
        assert_eq!(records[1].rotation, Some(3));
    }
}
