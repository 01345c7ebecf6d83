//! Purchase-order record model.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::Cell;

/// A known record column and its ledger header name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Column {
    #[serde(rename = "PO_NUM")]
    PoNum,
    #[serde(rename = "PO_DOLLARS")]
    PoDollars,
    #[serde(rename = "UNITS")]
    Units,
    #[serde(rename = "SHIP_DATE")]
    ShipDate,
    #[serde(rename = "REGION")]
    Region,
    #[serde(rename = "DFI")]
    Dfi,
    #[serde(rename = "FRT")]
    Frt,
    #[serde(rename = "SKU")]
    Sku,
    #[serde(rename = "ITEM_DESCRIPTION")]
    ItemDescription,
    #[serde(rename = "ROTATION")]
    Rotation,
    #[serde(rename = "CARRIER")]
    Carrier,
    #[serde(rename = "TYPE")]
    Type,
    #[serde(rename = "CLIENT")]
    Client,
}

impl Column {
    /// All columns in the order a fresh ledger would list them.
    pub const ALL: [Column; 13] = [
        Column::PoNum,
        Column::PoDollars,
        Column::Units,
        Column::ShipDate,
        Column::Region,
        Column::Dfi,
        Column::Frt,
        Column::Sku,
        Column::ItemDescription,
        Column::Rotation,
        Column::Carrier,
        Column::Type,
        Column::Client,
    ];

    /// Columns filled in by the operator rather than the extractor.
    pub const SUPPLEMENTAL: [Column; 4] =
        [Column::Rotation, Column::Carrier, Column::Type, Column::Client];

    /// Ledger header text for this column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::PoNum => "PO_NUM",
            Column::PoDollars => "PO_DOLLARS",
            Column::Units => "UNITS",
            Column::ShipDate => "SHIP_DATE",
            Column::Region => "REGION",
            Column::Dfi => "DFI",
            Column::Frt => "FRT",
            Column::Sku => "SKU",
            Column::ItemDescription => "ITEM_DESCRIPTION",
            Column::Rotation => "ROTATION",
            Column::Carrier => "CARRIER",
            Column::Type => "TYPE",
            Column::Client => "CLIENT",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Column {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown column: {s}"))
    }
}

/// One parsed purchase order.
///
/// Every field except `po_num` is optional; `None` is written to the ledger
/// as the `N/A` sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Purchase-order number, the ledger key.
    pub po_num: u64,

    /// Purchase order total in dollars.
    pub po_dollars: Option<Decimal>,

    /// Total ordered units.
    pub units: Option<i64>,

    /// Requested ship date as printed on the document.
    pub ship_date: Option<String>,

    /// Two-letter Costco region code.
    pub region: Option<String>,

    /// DFI percentage, unscaled.
    pub dfi: Option<Decimal>,

    /// Freight percentage, unscaled.
    pub frt: Option<Decimal>,

    /// Item number.
    pub sku: Option<i64>,

    /// Item description with whitespace collapsed.
    pub item_description: Option<String>,

    pub rotation: Option<i64>,
    pub carrier: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub client: Option<String>,
}

impl Record {
    /// Create a record with only the key set.
    pub fn new(po_num: u64) -> Self {
        Self {
            po_num,
            ..Default::default()
        }
    }

    /// Ledger cell for a column.
    pub fn cell(&self, column: Column) -> Cell {
        match column {
            Column::PoNum => i64::try_from(self.po_num)
                .map(Cell::Int)
                .unwrap_or_else(|_| Cell::Text(self.po_num.to_string())),
            Column::PoDollars => self.po_dollars.into(),
            Column::Units => self.units.into(),
            Column::ShipDate => self.ship_date.clone().into(),
            Column::Region => self.region.clone().into(),
            Column::Dfi => self.dfi.into(),
            Column::Frt => self.frt.into(),
            Column::Sku => self.sku.into(),
            Column::ItemDescription => self.item_description.clone().into(),
            Column::Rotation => self.rotation.into(),
            Column::Carrier => self.carrier.clone().into(),
            Column::Type => self.kind.clone().into(),
            Column::Client => self.client.clone().into(),
        }
    }

    /// Ledger cell for a header name; unknown headers are missing.
    pub fn cell_by_name(&self, name: &str) -> Cell {
        name.parse::<Column>()
            .map(|c| self.cell(c))
            .unwrap_or(Cell::Missing)
    }

    /// Coerce the record to a row in the given column order.
    ///
    /// Unnamed columns stay empty.
    pub fn to_row(&self, column_order: &[String]) -> Vec<Cell> {
        column_order
            .iter()
            .map(|name| {
                if name.is_empty() {
                    Cell::Empty
                } else {
                    self.cell_by_name(name)
                }
            })
            .collect()
    }

    /// Columns with no value.
    pub fn missing_columns(&self) -> Vec<Column> {
        Column::ALL
            .iter()
            .copied()
            .filter(|c| self.cell(*c).is_missing())
            .collect()
    }

    /// Assign an extracted cell to its column.
    ///
    /// Values of the wrong type for the column are dropped.
    pub fn set(&mut self, column: Column, cell: Cell) {
        match column {
            Column::PoNum => {
                if let Some(key) = cell.as_key() {
                    self.po_num = key;
                }
            }
            Column::PoDollars => self.po_dollars = cell.as_decimal(),
            Column::Units => self.units = cell.as_int(),
            Column::ShipDate => self.ship_date = cell.as_text(),
            Column::Region => self.region = cell.as_text(),
            Column::Dfi => self.dfi = cell.as_decimal(),
            Column::Frt => self.frt = cell.as_decimal(),
            Column::Sku => self.sku = cell.as_int(),
            Column::ItemDescription => self.item_description = cell.as_text(),
            Column::Rotation => self.rotation = cell.as_int(),
            Column::Carrier => self.carrier = cell.as_text(),
            Column::Type => self.kind = cell.as_text(),
            Column::Client => self.client = cell.as_text(),
        }
    }

    /// Fill operator-supplied fields. Blank supplement fields stay missing.
    pub fn apply_supplement(&mut self, supplement: &Supplement) {
        self.rotation = supplement.rotation;
        self.carrier = non_blank(&supplement.carrier);
        self.kind = non_blank(&supplement.kind);
        self.client = non_blank(&supplement.client);
    }

    /// Fold a later record for the same key into this one.
    ///
    /// Fields present in `other` win; missing ones keep the current value.
    pub fn absorb(&mut self, other: &Record) {
        for column in Column::ALL {
            let cell = other.cell(column);
            if !cell.is_missing() {
                self.set(column, cell);
            }
        }
    }
}

/// The four fields solicited from the operator before a merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplement {
    pub rotation: Option<i64>,
    pub carrier: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub client: Option<String>,
}

impl Supplement {
    /// Fill any field left empty here from `defaults`.
    pub fn or(self, defaults: &Supplement) -> Supplement {
        Supplement {
            rotation: self.rotation.or(defaults.rotation),
            carrier: non_blank(&self.carrier).or_else(|| non_blank(&defaults.carrier)),
            kind: non_blank(&self.kind).or_else(|| non_blank(&defaults.kind)),
            client: non_blank(&self.client).or_else(|| non_blank(&defaults.client)),
        }
    }

    /// True when every field is provided.
    pub fn is_complete(&self) -> bool {
        self.rotation.is_some()
            && non_blank(&self.carrier).is_some()
            && non_blank(&self.kind).is_some()
            && non_blank(&self.client).is_some()
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
