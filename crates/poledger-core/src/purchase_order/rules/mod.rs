//! Data-driven field rules for purchase-order templates.

pub mod dates;
pub mod numbers;
pub mod patterns;
pub mod text;

pub use dates::parse_ship_date;
pub use numbers::{parse_us_amount, parse_us_integer, parse_whole_quantity};
pub use text::{bounded_item_detail, normalize_whitespace};

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ledger::Cell;
use crate::models::record::Column;
use patterns::*;

/// How a captured string becomes a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalizer {
    /// Decimal with thousands separators dropped.
    Amount,
    /// Integer with thousands separators dropped.
    Integer,
    /// Decimal truncated to a whole number.
    WholeQuantity,
    /// Trimmed token.
    Token,
    /// Window cut at the next label, then whitespace-normalized.
    BoundedText,
}

impl Normalizer {
    /// Normalize a captured value. `None` means the field stays missing.
    pub fn apply(&self, raw: &str) -> Option<Cell> {
        match self {
            Normalizer::Amount => parse_us_amount(raw).map(Cell::Decimal),
            Normalizer::Integer => parse_us_integer(raw).map(Cell::Int),
            Normalizer::WholeQuantity => parse_whole_quantity(raw).map(Cell::Int),
            Normalizer::Token => Some(raw.trim())
                .filter(|s| !s.is_empty())
                .map(|s| Cell::Text(s.to_string())),
            Normalizer::BoundedText => normalize_whitespace(bounded_item_detail(raw)).map(Cell::Text),
        }
    }
}

/// One field of a template: where to look and how to read it.
#[derive(Debug, Clone)]
pub struct FieldRule {
    /// Column the value lands in.
    pub column: Column,
    /// Pattern for the usual layout; group 1 is the value.
    pub primary: &'static Regex,
    /// Pattern for the alternate layout, tried when the primary yields nothing.
    pub fallback: Option<&'static Regex>,
    pub normalizer: Normalizer,
}

/// A value found by a rule.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMatch {
    pub column: Column,
    pub value: Cell,
    /// Text matched by the pattern.
    pub source: String,
    /// Whether the fallback pattern produced the value.
    pub from_fallback: bool,
}

impl FieldRule {
    /// Run the rule against document text.
    ///
    /// The first pattern whose capture normalizes wins.
    pub fn apply(&self, text: &str) -> Option<FieldMatch> {
        let candidates = std::iter::once((self.primary, false))
            .chain(self.fallback.map(|p| (p, true)));

        for (pattern, from_fallback) in candidates {
            let Some(caps) = pattern.captures(text) else {
                continue;
            };
            let Some(raw) = caps.get(1) else {
                continue;
            };
            if let Some(value) = self.normalizer.apply(raw.as_str()) {
                return Some(FieldMatch {
                    column: self.column,
                    value,
                    source: caps[0].to_string(),
                    from_fallback,
                });
            }
        }

        None
    }
}

/// Known document templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemplateKind {
    /// Costco purchase order.
    #[serde(rename = "costco-po")]
    CostcoPo,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 1] = [TemplateKind::CostcoPo];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::CostcoPo => "costco-po",
        }
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            TemplateKind::CostcoPo => "Costco PO",
        }
    }

    /// Rule table for this template.
    pub fn template(&self) -> &'static Template {
        match self {
            TemplateKind::CostcoPo => &COSTCO_PO,
        }
    }
}

impl Default for TemplateKind {
    fn default() -> Self {
        Self::CostcoPo
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TemplateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateKind::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown template: {s}"))
    }
}

/// A recognized document layout.
#[derive(Debug)]
pub struct Template {
    pub kind: TemplateKind,
    /// Marker that identifies the layout; group 1 is the document key.
    pub marker: &'static Regex,
    pub rules: Vec<FieldRule>,
}

impl Template {
    /// True when the text carries this template's marker.
    pub fn recognizes(&self, text: &str) -> bool {
        self.marker.is_match(text)
    }

    /// Document key following the marker, if it fits a `u64`.
    pub fn key(&self, text: &str) -> Option<u64> {
        self.marker
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}

/// First template whose marker matches the text.
pub fn detect_template(text: &str) -> Option<TemplateKind> {
    TemplateKind::ALL
        .iter()
        .copied()
        .find(|kind| kind.template().recognizes(text))
}

fn rule(
    column: Column,
    primary: &'static Regex,
    fallback: Option<&'static Regex>,
    normalizer: Normalizer,
) -> FieldRule {
    FieldRule {
        column,
        primary,
        fallback,
        normalizer,
    }
}

lazy_static! {
    static ref COSTCO_PO: Template = Template {
        kind: TemplateKind::CostcoPo,
        marker: &*ORDER_NUMBER,
        rules: vec![
            rule(Column::PoDollars, &*PO_TOTAL, Some(&*MERCHANDISE_TOTAL_DOLLARS), Normalizer::Amount),
            rule(Column::Units, &*TOTAL_QTY, Some(&*MERCHANDISE_TOTAL_UNITS), Normalizer::WholeQuantity),
            rule(Column::ShipDate, &*SHIP_DATE, Some(&*SHIP_DATE_NEXT_LINE), Normalizer::Token),
            rule(Column::Region, &*REGION, None, Normalizer::Token),
            rule(Column::Dfi, &*DFI_PERCENT, None, Normalizer::Amount),
            rule(Column::Frt, &*FRT_PERCENT, None, Normalizer::Amount),
            rule(Column::Sku, &*SKU, None, Normalizer::Integer),
            rule(Column::ItemDescription, &*ITEM_DETAIL, None, Normalizer::BoundedText),
        ],
    };
}
