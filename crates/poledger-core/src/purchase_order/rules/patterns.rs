//! Regex patterns for the Costco purchase-order template.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Template marker, also the key field
    pub static ref ORDER_NUMBER: Regex = Regex::new(
        r"Order #:\s*(\d+)"
    ).unwrap();

    // Dollar totals ("Merchandise Total <units> <dollars>" on the alternate layout)
    pub static ref PO_TOTAL: Regex = Regex::new(
        r"Purchase Order Total:\s*([\d,]+\.\d{2})"
    ).unwrap();

    pub static ref MERCHANDISE_TOTAL_DOLLARS: Regex = Regex::new(
        r"Merchandise Total\s*\d+\s*([\d,]+\.\d{2})"
    ).unwrap();

    // Unit totals
    pub static ref TOTAL_QTY: Regex = Regex::new(
        r"Total Qty:\s*([\d,]+\.\d{2})"
    ).unwrap();

    pub static ref MERCHANDISE_TOTAL_UNITS: Regex = Regex::new(
        r"Merchandise Total\s*(\d+)"
    ).unwrap();

    // Ship date, same line or next line
    pub static ref SHIP_DATE: Regex = Regex::new(
        r"Requested Ship Date:\s*([\d/]+)"
    ).unwrap();

    pub static ref SHIP_DATE_NEXT_LINE: Regex = Regex::new(
        r"Requested Ship Date:[ \t]*\r?\n\s*([\d/]+)"
    ).unwrap();

    // Two-letter region code printed before the region label
    pub static ref REGION: Regex = Regex::new(
        r"\b(\w{2})\b\s*COSTCO REGION"
    ).unwrap();

    // Percentages
    pub static ref DFI_PERCENT: Regex = Regex::new(
        r"DFI% -\s*([\d.]+)"
    ).unwrap();

    pub static ref FRT_PERCENT: Regex = Regex::new(
        r"FRT% -\s*([\d.]+)"
    ).unwrap();

    // Item number precedes the item detail label
    pub static ref SKU: Regex = Regex::new(
        r"(\d+)\s+Item Detail:"
    ).unwrap();

    pub static ref ITEM_DETAIL: Regex = Regex::new(
        r"(?s)Item Detail:\s*(.*)"
    ).unwrap();

    // Labels that close the item detail window
    pub static ref ITEM_DETAIL_END: Regex = Regex::new(
        r"\s+(?:T\d+|Unit Price:)"
    ).unwrap();
}
