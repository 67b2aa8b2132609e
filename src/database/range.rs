use crate::error::TableError;
use crate::spreadsheet::reference::{col_to_index, index_to_reference, row_to_index};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Display;

static REFERENCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z]+)(\d+)(?::([A-Z]+)(\d+))?$").expect("Hardcode regex pattern"));

/// Rectangular region of a report page, all bounds inclusive and zero-based.
///
/// [`TableCellRange::EMPTY`] is flagged apart from any real range: it contains nothing and
/// shifting it yields itself.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TableCellRange {
    first_row: i32,
    last_row: i32,
    first_column: i32,
    last_column: i32,
    empty: bool,
}

impl TableCellRange {
    pub const EMPTY: TableCellRange = TableCellRange {
        first_row: 0,
        last_row: 0,
        first_column: 0,
        last_column: 0,
        empty: true,
    };

    pub const fn of(first_row: i32, last_row: i32, first_column: i32, last_column: i32) -> Self {
        TableCellRange {
            first_row,
            last_row,
            first_column,
            last_column,
            empty: false,
        }
    }

    pub fn first_row(&self) -> i32 {
        self.first_row
    }

    pub fn last_row(&self) -> i32 {
        self.last_row
    }

    pub fn first_column(&self) -> i32 {
        self.first_column
    }

    pub fn last_column(&self) -> i32 {
        self.last_column
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn contains(&self, row: i32, column: i32) -> bool {
        self.contains_row(row) && self.contains_column(column)
    }

    pub fn contains_row(&self, row: i32) -> bool {
        !self.empty && self.first_row <= row && row <= self.last_row
    }

    pub fn contains_column(&self, column: i32) -> bool {
        !self.empty && self.first_column <= column && column <= self.last_column
    }

    /// Extends the range upwards, or shrinks it for a negative count.
    pub fn add_rows_to_top(&self, count: i32) -> Self {
        self.shifted(-count, 0, 0, 0)
    }

    pub fn add_rows_to_bottom(&self, count: i32) -> Self {
        self.shifted(0, count, 0, 0)
    }

    pub fn add_columns_to_left(&self, count: i32) -> Self {
        self.shifted(0, 0, -count, 0)
    }

    pub fn add_columns_to_right(&self, count: i32) -> Self {
        self.shifted(0, 0, 0, count)
    }

    fn shifted(&self, first_row: i32, last_row: i32, first_column: i32, last_column: i32) -> Self {
        if self.empty {
            return Self::EMPTY;
        }
        Self::of(
            self.first_row + first_row,
            self.last_row + last_row,
            self.first_column + first_column,
            self.last_column + last_column,
        )
    }
}

impl TryFrom<&str> for TableCellRange {
    type Error = TableError;

    /// Parses an Excel-style reference of a cell ("B3") or a range ("B3:D10").
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let reference = value.trim().to_ascii_uppercase();
        let invalid = || TableError::InvalidReference(value.to_owned());
        let captures = REFERENCE_PATTERN.captures(&reference).ok_or_else(invalid)?;
        let column = |group: usize| captures.get(group).and_then(|matcher| col_to_index(matcher.as_str()));
        let row = |group: usize| captures.get(group).and_then(|matcher| row_to_index(matcher.as_str()));
        let first_column = column(1).ok_or_else(invalid)?;
        let first_row = row(2).ok_or_else(invalid)?;
        let (last_column, last_row) = if captures.get(3).is_some() {
            (column(3).ok_or_else(invalid)?, row(4).ok_or_else(invalid)?)
        } else {
            (first_column, first_row)
        };
        Ok(Self::of(
            first_row.min(last_row),
            first_row.max(last_row),
            first_column.min(last_column),
            first_column.max(last_column),
        ))
    }
}

impl Display for TableCellRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.empty {
            write!(f, "EMPTY")
        } else if self.first_row >= 0 && self.first_column >= 0 && self.last_row >= 0 && self.last_column >= 0 {
            write!(
                f,
                "{}:{}",
                index_to_reference(self.first_row, self.first_column),
                index_to_reference(self.last_row, self.last_column)
            )
        } else {
            write!(
                f,
                "R{}C{}:R{}C{}",
                self.first_row, self.first_column, self.last_row, self.last_column
            )
        }
    }
}
