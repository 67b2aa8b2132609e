//! Cell addresses and conversions between zero-based indexes and Excel-style references.

use std::fmt::Display;

/// Converts column letters ("A", "AB") to a zero-based column index.
/// Returns None for an empty or invalid string.
pub(crate) fn col_to_index(col: &str) -> Option<i32> {
    if col.is_empty() {
        return None;
    }
    let mut index: i64 = 0;
    for char in col.chars() {
        if !char.is_ascii_uppercase() {
            return None;
        }
        index = index * 26 + (char as i64 - 'A' as i64 + 1);
        if index > i32::MAX as i64 {
            return None;
        }
    }
    Some((index - 1) as i32)
}

/// Converts a 1-based row number ("1", "10") to a zero-based row index.
pub(crate) fn row_to_index(row: &str) -> Option<i32> {
    row.parse::<i32>().ok().filter(|row| *row > 0).map(|row| row - 1)
}

/// Converts a zero-based column index to column letters.
pub(crate) fn index_to_col(col: i32) -> String {
    let mut column = col as u32 + 1;
    let mut letters = String::new();
    while column > 0 {
        column -= 1;
        letters.insert(0, char::from_u32('A' as u32 + column % 26).expect("Hardcode letters"));
        column /= 26;
    }
    letters
}

/// Converts zero-based row and column indexes to an Excel-style reference (e.g. "B3").
pub(crate) fn index_to_reference(row: i32, col: i32) -> String {
    format!("{}{}", index_to_col(col), row as i64 + 1)
}

/// Address of one cell on a report page.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TableCellAddress {
    /// Zero-based row index
    pub row: i32,
    /// Zero-based column index
    pub column: i32,
}

impl TableCellAddress {
    /// Returned by searches that found nothing.
    pub const NOT_FOUND: TableCellAddress = TableCellAddress { row: -1, column: -1 };

    pub const fn of(row: i32, column: i32) -> Self {
        TableCellAddress { row, column }
    }

    pub fn is_found(&self) -> bool {
        *self != Self::NOT_FOUND
    }
}

impl Display for TableCellAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.row >= 0 && self.column >= 0 {
            write!(f, "{}", index_to_reference(self.row, self.column))
        } else if *self == Self::NOT_FOUND {
            write!(f, "NOT_FOUND")
        } else {
            write!(f, "R{}C{}", self.row, self.column)
        }
    }
}
