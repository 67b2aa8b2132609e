use crate::error::{Result, TableError};
use crate::spreadsheet::dao::{CellDataAccessObject, DEFAULT_DAO};
use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use std::fmt::{Debug, Display};

/// Native value stored in a cell.
/// An absent value is represented by `Option::None` at the access site.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    /// Boolean values (true/false)
    Bool(bool),
    /// Integer numbers
    Int(i64),
    /// Floating point numbers
    Float(f64),
    /// Exact decimal numbers
    Decimal(Decimal),
    /// Text
    String(String),
    /// Point in time
    DateTime(DateTime<Utc>),
}

impl CellValue {
    /// Returns the text if the value is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, CellValue::Int(_) | CellValue::Float(_) | CellValue::Decimal(_))
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Bool(value) => write!(f, "{}", value),
            CellValue::Int(value) => write!(f, "{}", value),
            CellValue::Float(value) => write!(f, "{}", value),
            CellValue::Decimal(value) => write!(f, "{}", value),
            CellValue::String(value) => write!(f, "{}", value),
            CellValue::DateTime(value) => write!(f, "{}", value.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::String(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Int(value as i64)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<Decimal> for CellValue {
    fn from(value: Decimal) -> Self {
        CellValue::Decimal(value)
    }
}

impl From<DateTime<Utc>> for CellValue {
    fn from(value: DateTime<Utc>) -> Self {
        CellValue::DateTime(value)
    }
}

/// One cell of a report page row.
///
/// Typed accessors delegate to the cell's [`CellDataAccessObject`]. Each accessor has an
/// `_or_default` counterpart that substitutes the given default on any failure.
pub trait TableCell: Send + Sync {
    /// Zero-based column index
    fn column_index(&self) -> i32;

    /// Native value, None if the cell holds no value
    fn value(&self) -> Option<&CellValue>;

    /// Coercion strategy interpreting the native value
    fn dao(&self) -> &dyn CellDataAccessObject;

    fn int_value(&self) -> Result<i32> {
        self.dao().int_value(self.value())
    }

    fn long_value(&self) -> Result<i64> {
        self.dao().long_value(self.value())
    }

    fn double_value(&self) -> Result<f64> {
        self.dao().double_value(self.value())
    }

    fn big_decimal_value(&self) -> Result<Decimal> {
        self.dao().big_decimal_value(self.value())
    }

    fn string_value(&self) -> Result<String> {
        self.dao().string_value(self.value())
    }

    fn instant_value(&self) -> Result<DateTime<Utc>> {
        self.dao().instant_value(self.value())
    }

    /// Date-time at the system time zone
    fn local_date_time_value(&self) -> Result<NaiveDateTime> {
        self.dao().local_date_time_value(self.value())
    }

    fn local_date_time_value_at(&self, zone: FixedOffset) -> Result<NaiveDateTime> {
        self.dao().local_date_time_value_at(self.value(), zone)
    }

    fn int_value_or_default(&self, default: i32) -> i32 {
        self.int_value().unwrap_or(default)
    }

    fn long_value_or_default(&self, default: i64) -> i64 {
        self.long_value().unwrap_or(default)
    }

    fn double_value_or_default(&self, default: f64) -> f64 {
        self.double_value().unwrap_or(default)
    }

    fn big_decimal_value_or_default(&self, default: Decimal) -> Decimal {
        self.big_decimal_value().unwrap_or(default)
    }

    fn string_value_or_default(&self, default: &str) -> String {
        self.string_value().unwrap_or_else(|_| default.to_owned())
    }

    fn instant_value_or_default(&self, default: DateTime<Utc>) -> DateTime<Utc> {
        self.instant_value().unwrap_or(default)
    }

    fn local_date_time_value_or_default(&self, default: NaiveDateTime) -> NaiveDateTime {
        self.local_date_time_value().unwrap_or(default)
    }
}

impl Debug for dyn TableCell + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableCell")
            .field("column_index", &self.column_index())
            .field("value", &self.value())
            .finish()
    }
}

/// Placeholder for a cell that does not exist on the page.
/// Holds no value; every typed accessor fails with a missing value error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EmptyTableCell {
    column_index: i32,
}

impl EmptyTableCell {
    pub fn of(column_index: i32) -> Self {
        EmptyTableCell { column_index }
    }

    fn missing<T>(&self, kind: &str) -> Result<T> {
        Err(TableError::MissingValue(format!(
            "Can't get {} value of absent cell in column {}",
            kind, self.column_index
        )))
    }
}

impl TableCell for EmptyTableCell {
    fn column_index(&self) -> i32 {
        self.column_index
    }

    fn value(&self) -> Option<&CellValue> {
        None
    }

    fn dao(&self) -> &dyn CellDataAccessObject {
        &*DEFAULT_DAO
    }

    fn int_value(&self) -> Result<i32> {
        self.missing("int")
    }

    fn long_value(&self) -> Result<i64> {
        self.missing("long")
    }

    fn double_value(&self) -> Result<f64> {
        self.missing("double")
    }

    fn big_decimal_value(&self) -> Result<Decimal> {
        self.missing("decimal")
    }

    fn string_value(&self) -> Result<String> {
        self.missing("string")
    }

    fn instant_value(&self) -> Result<DateTime<Utc>> {
        self.missing("instant")
    }

    fn local_date_time_value(&self) -> Result<NaiveDateTime> {
        self.missing("date-time")
    }

    fn local_date_time_value_at(&self, _zone: FixedOffset) -> Result<NaiveDateTime> {
        self.missing("date-time")
    }
}

/// A cell viewed through another coercion strategy than the one it was created with.
pub struct BoundCell<'a> {
    cell: &'a dyn TableCell,
    dao: &'a dyn CellDataAccessObject,
}

impl<'a> BoundCell<'a> {
    pub fn new(cell: &'a dyn TableCell, dao: &'a dyn CellDataAccessObject) -> Self {
        BoundCell { cell, dao }
    }

    /// The wrapped cell with its own coercion strategy.
    pub fn inner(&self) -> &'a dyn TableCell {
        self.cell
    }
}

impl TableCell for BoundCell<'_> {
    fn column_index(&self) -> i32 {
        self.cell.column_index()
    }

    fn value(&self) -> Option<&CellValue> {
        self.cell.value()
    }

    fn dao(&self) -> &dyn CellDataAccessObject {
        self.dao
    }
}

impl Debug for BoundCell<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundCell")
            .field("column_index", &self.column_index())
            .field("value", &self.value())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn display_native_values() {
        assert_eq!(CellValue::from(true).to_string(), "true");
        assert_eq!(CellValue::from(12).to_string(), "12");
        assert_eq!(CellValue::from(1.5).to_string(), "1.5");
        assert_eq!(CellValue::from(Decimal::new(1000, 3)).to_string(), "1.000");
        assert_eq!(CellValue::from("text").to_string(), "text");
        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 10, 20, 30).unwrap();
        assert_eq!(CellValue::from(instant).to_string(), "2024-03-01T10:20:30Z");
    }

    #[test]
    fn value_kinds() {
        assert_eq!(CellValue::from("a").as_str(), Some("a"));
        assert_eq!(CellValue::from(1).as_str(), None);
        assert!(CellValue::from(1.0).is_number());
        assert!(!CellValue::from("1").is_number());
    }

    #[test]
    fn empty_cell_fails_every_typed_accessor() {
        let cell = EmptyTableCell::of(3);
        assert_eq!(cell.column_index(), 3);
        assert_eq!(cell.value(), None);
        assert!(cell.int_value().unwrap_err().is_missing_value());
        assert!(cell.long_value().unwrap_err().is_missing_value());
        assert!(cell.double_value().unwrap_err().is_missing_value());
        assert!(cell.big_decimal_value().unwrap_err().is_missing_value());
        assert!(cell.string_value().unwrap_err().is_missing_value());
        assert!(cell.instant_value().unwrap_err().is_missing_value());
        assert!(cell.local_date_time_value().unwrap_err().is_missing_value());
        assert_eq!(cell.int_value_or_default(7), 7);
        assert_eq!(cell.string_value_or_default("none"), "none");
    }
}
