//! Text normalization and bounded text windows.

use super::patterns::ITEM_DETAIL_END;

/// Collapse every whitespace run (line breaks included) to one space and trim.
///
/// Returns `None` when nothing but whitespace remains.
pub fn normalize_whitespace(s: &str) -> Option<String> {
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Cut an item-detail window at the first following label.
///
/// Without a closing label the window runs to the end of the text.
pub fn bounded_item_detail(window: &str) -> &str {
    match ITEM_DETAIL_END.find(window) {
        Some(m) => &window[..m.start()],
        None => window,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(
            normalize_whitespace("  MAGIC SPOON\nCEREAL\r\n  VARIETY  4PK "),
            Some("MAGIC SPOON CEREAL VARIETY 4PK".to_string())
        );
        assert_eq!(normalize_whitespace(" \n\t "), None);
    }

    #[test]
    fn test_bounded_item_detail() {
        assert_eq!(
            bounded_item_detail("MAGIC SPOON\nVARIETY 4PK\nT1 240"),
            "MAGIC SPOON\nVARIETY 4PK"
        );
        assert_eq!(
            bounded_item_detail("GRANOLA BITES  Unit Price: 9.99"),
            "GRANOLA BITES"
        );
        assert_eq!(bounded_item_detail("CEREAL 6CT"), "CEREAL 6CT");
    }
}
