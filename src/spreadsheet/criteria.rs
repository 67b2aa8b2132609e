use crate::helpers::string::{starts_with_ignore_case, to_lowercase_chars};
use crate::spreadsheet::cell::CellValue;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Test applied to the native value of a cell.
pub type CellPredicate = Arc<dyn Fn(Option<&CellValue>) -> bool + Send + Sync>;

/// Builds a predicate matching string cells that start with the prefix,
/// ignoring case and leading whitespace.
pub fn ignore_case_prefix_predicate(prefix: &str) -> CellPredicate {
    let prefix = to_lowercase_chars(prefix.trim());
    Arc::new(move |value| match value {
        Some(CellValue::String(text)) => starts_with_ignore_case(text, &prefix),
        _ => false,
    })
}

/// Locates a row of a table: its name row or its footer row.
#[derive(Clone)]
pub enum Anchor {
    /// Cell text starting with the prefix, ignoring case and leading whitespace
    Prefix(String),
    /// Any cell value accepted by the predicate
    Predicate(CellPredicate),
}

impl Anchor {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Anchor::Prefix(prefix.into())
    }

    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(Option<&CellValue>) -> bool + Send + Sync + 'static,
    {
        Anchor::Predicate(Arc::new(predicate))
    }

    /// Predicate testing cell values against the anchor, built once per search.
    pub fn to_predicate(&self) -> CellPredicate {
        match self {
            Anchor::Prefix(prefix) => ignore_case_prefix_predicate(prefix),
            Anchor::Predicate(predicate) => Arc::clone(predicate),
        }
    }
}

impl Debug for Anchor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Anchor::Prefix(prefix) => f.debug_tuple("Prefix").field(prefix).finish(),
            Anchor::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Criteria for locating a table on a report page.
#[derive(Clone, Debug)]
pub struct TableCriteria {
    /// Anchor of the first table row. For named tables it is the name row,
    /// for nameless tables it is the first header row.
    first_row: Anchor,

    /// Anchor of the footer row. Without it the table ends before the first blank row.
    last_row: Option<Anchor>,

    /// Number of header rows (default: 1)
    headers_row_count: i32,

    /// Name of a nameless table.
    provided_name: Option<String>,

    /// Table name row is absent on the page
    nameless: bool,
}

impl TableCriteria {
    /// Name of a predicate-anchored table whose name cell is not found.
    pub const NOT_FOUND_TABLE_NAME: &'static str = "<not found>";

    /// Default name of a nameless table.
    pub const NAMELESS_TABLE_NAME: &'static str = "undefined";

    fn of(first_row: Anchor, nameless: bool) -> Self {
        TableCriteria {
            first_row,
            last_row: None,
            headers_row_count: 1,
            provided_name: None,
            nameless,
        }
    }

    /// Table whose name cell starts with the prefix.
    pub fn named(prefix: impl Into<String>) -> Self {
        Self::of(Anchor::prefix(prefix), false)
    }

    /// Table whose name cell is accepted by the predicate.
    pub fn named_by<F>(predicate: F) -> Self
    where
        F: Fn(Option<&CellValue>) -> bool + Send + Sync + 'static,
    {
        Self::of(Anchor::predicate(predicate), false)
    }

    /// Table without a name row; the first header row holds a cell starting with the prefix.
    pub fn nameless(prefix: impl Into<String>) -> Self {
        Self::of(Anchor::prefix(prefix), true)
    }

    /// Table without a name row; the first header row holds a cell accepted by the predicate.
    pub fn nameless_by<F>(predicate: F) -> Self
    where
        F: Fn(Option<&CellValue>) -> bool + Send + Sync + 'static,
    {
        Self::of(Anchor::predicate(predicate), true)
    }

    /// Table ends at the row holding a cell starting with the prefix.
    pub fn ending_with(mut self, prefix: impl Into<String>) -> Self {
        self.last_row = Some(Anchor::prefix(prefix));
        self
    }

    pub fn ending_by<F>(mut self, predicate: F) -> Self
    where
        F: Fn(Option<&CellValue>) -> bool + Send + Sync + 'static,
    {
        self.last_row = Some(Anchor::predicate(predicate));
        self
    }

    pub fn with_headers_row_count(mut self, headers_row_count: i32) -> Self {
        self.headers_row_count = headers_row_count;
        self
    }

    pub fn with_provided_name(mut self, name: impl Into<String>) -> Self {
        self.provided_name = Some(name.into());
        self
    }

    pub fn first_row(&self) -> &Anchor {
        &self.first_row
    }

    pub fn last_row(&self) -> Option<&Anchor> {
        self.last_row.as_ref()
    }

    pub fn headers_row_count(&self) -> i32 {
        self.headers_row_count
    }

    pub fn is_nameless(&self) -> bool {
        self.nameless
    }

    /// Name given to a nameless table.
    pub fn provided_name(&self) -> &str {
        self.provided_name.as_deref().unwrap_or(Self::NAMELESS_TABLE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_anchor_matches_strings_only() {
        let matches = Anchor::prefix("  Table 1 ").to_predicate();
        assert!(matches(Some(&CellValue::from("TABLE 1: operations"))));
        assert!(matches(Some(&CellValue::from("\ttable 1"))));
        assert!(!matches(Some(&CellValue::from("Table 2"))));
        assert!(!matches(Some(&CellValue::Int(1))));
        assert!(!matches(None));
    }

    #[test]
    fn predicate_anchor() {
        let anchor = Anchor::predicate(|value| value == Some(&CellValue::Int(42)));
        let matches = anchor.to_predicate();
        assert!(matches(Some(&CellValue::Int(42))));
        assert!(!matches(Some(&CellValue::Int(41))));
        assert_eq!(format!("{:?}", anchor), "Predicate(..)");
    }

    #[test]
    fn criteria_defaults() {
        let criteria = TableCriteria::named("Trades");
        assert_eq!(criteria.headers_row_count(), 1);
        assert!(criteria.last_row().is_none());
        assert!(!criteria.is_nameless());

        let criteria = TableCriteria::nameless("Date").with_headers_row_count(2).ending_with("Total");
        assert!(criteria.is_nameless());
        assert_eq!(criteria.provided_name(), TableCriteria::NAMELESS_TABLE_NAME);
        assert_eq!(criteria.headers_row_count(), 2);
        assert!(matches!(criteria.last_row(), Some(Anchor::Prefix(prefix)) if prefix == "Total"));
        assert_eq!(criteria.with_provided_name("Cash").provided_name(), "Cash");
    }
}
