//! # Report Page Search
//!
//! A report page is a sparse grid of rows. Besides row access, [`ReportPage`] provides the
//! search operations used to delimit tables: cell lookup by value, predicate or prefix, the
//! first blank row, and the bounding range of a table given its anchors.
//!
//! Search misses are reported with [`TableCellAddress::NOT_FOUND`], `-1` or
//! [`TableCellRange::EMPTY`], never with an error.
use crate::database::range::TableCellRange;
use crate::helpers::string::is_blank;
use crate::spreadsheet::cell::{CellValue, TableCell};
use crate::spreadsheet::criteria::{ignore_case_prefix_predicate, Anchor};
use crate::spreadsheet::reference::TableCellAddress;
use crate::spreadsheet::row::ReportPageRow;
use log::debug;
use std::any::Any;

/// Returns true for an absent value or a string holding whitespace only.
pub(crate) fn is_blank_value(value: Option<&CellValue>) -> bool {
    match value {
        None => true,
        Some(CellValue::String(text)) => is_blank(text),
        Some(_) => false,
    }
}

fn find_anchor<P>(page: &P, anchor: &Anchor, start_row: i32) -> TableCellAddress
where
    P: ReportPage + ?Sized,
{
    if let Anchor::Prefix(prefix) = anchor {
        if is_blank(prefix) {
            return TableCellAddress::NOT_FOUND;
        }
    }
    page.find_by_in(start_row, i32::MAX, 0, i32::MAX, &*anchor.to_predicate())
}

/// Page of a report, e.g. one sheet of a workbook.
pub trait ReportPage: Send + Sync {
    /// Row by zero-based number, None if the page has no such row.
    fn row(&self, row: i32) -> Option<&dyn ReportPageRow>;

    /// Zero-based number of the last row, -1 for an empty page.
    fn last_row_num(&self) -> i32;

    fn as_any(&self) -> &dyn Any;

    /// Name of the concrete page type, used in diagnostics.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn cell(&self, address: TableCellAddress) -> Option<&dyn TableCell> {
        self.row(address.row)?.cell(address.column)
    }

    /// First cell holding the value, scanning rows top-down and cells left to right.
    fn find(&self, value: &CellValue) -> TableCellAddress {
        self.find_in(value, 0, i32::MAX, 0, i32::MAX)
    }

    /// Bounded variant of [`ReportPage::find`]; end bounds are exclusive.
    fn find_in(
        &self,
        value: &CellValue,
        start_row: i32,
        end_row: i32,
        start_column: i32,
        end_column: i32,
    ) -> TableCellAddress {
        self.find_by_in(start_row, end_row, start_column, end_column, &|cell_value| {
            cell_value == Some(value)
        })
    }

    fn find_by(&self, predicate: &dyn Fn(Option<&CellValue>) -> bool) -> TableCellAddress {
        self.find_by_in(0, i32::MAX, 0, i32::MAX, predicate)
    }

    /// Tests present cells only, in ascending column order of each row.
    fn find_by_in(
        &self,
        start_row: i32,
        end_row: i32,
        start_column: i32,
        end_column: i32,
        predicate: &dyn Fn(Option<&CellValue>) -> bool,
    ) -> TableCellAddress {
        let last_row = end_row.saturating_sub(1).min(self.last_row_num());
        for row_num in start_row.max(0)..=last_row {
            let Some(row) = self.row(row_num) else {
                continue;
            };
            for cell in row.cells() {
                let column = cell.column_index();
                if column >= start_column && column < end_column && predicate(cell.value()) {
                    return TableCellAddress::of(row_num, column);
                }
            }
        }
        TableCellAddress::NOT_FOUND
    }

    /// First string cell starting with the prefix, ignoring case and leading whitespace.
    /// An empty prefix finds nothing.
    fn find_by_prefix(&self, prefix: &str) -> TableCellAddress {
        self.find_by_prefix_in(prefix, 0, i32::MAX, 0, i32::MAX)
    }

    fn find_by_prefix_in(
        &self,
        prefix: &str,
        start_row: i32,
        end_row: i32,
        start_column: i32,
        end_column: i32,
    ) -> TableCellAddress {
        if prefix.trim().is_empty() {
            return TableCellAddress::NOT_FOUND;
        }
        let predicate = ignore_case_prefix_predicate(prefix);
        self.find_by_in(start_row, end_row, start_column, end_column, &*predicate)
    }

    /// Value to the right of a key cell: the first non-blank value after the cell starting
    /// with the prefix, on the same row.
    fn next_column_value(&self, key_prefix: &str) -> Option<&CellValue> {
        let address = self.find_by_prefix(key_prefix);
        if !address.is_found() {
            return None;
        }
        self.row(address.row)?
            .cells()
            .filter(|cell| cell.column_index() > address.column)
            .filter_map(|cell| cell.value())
            .find(|value| !is_blank_value(Some(*value)))
    }

    /// First row at or after `start_row` which is absent, has no cells or holds only blank
    /// cells. Returns -1 if every row up to the last one has data.
    fn find_empty_row(&self, start_row: i32) -> i32 {
        for row_num in start_row.max(0)..=self.last_row_num() {
            let blank = match self.row(row_num) {
                None => true,
                Some(row) if row.last_cell_num() == -1 => true,
                Some(row) => row.cells().all(|cell| is_blank_value(cell.value())),
            };
            if blank {
                return row_num;
            }
        }
        -1
    }

    /// Range of a table starting at the anchor row and ending before the first blank row
    /// following the header rows, or at the last page row.
    fn table_cell_range(&self, first_row: &Anchor, headers_row_count: i32) -> TableCellRange {
        let start = find_anchor(self, first_row, 0);
        let Some(start_row) = start.is_found().then(|| self.row(start.row)).flatten() else {
            debug!("Table first row {:?} is not found", first_row);
            return TableCellRange::EMPTY;
        };
        let empty_row = self.find_empty_row(start.row + headers_row_count + 1);
        let last_row_num = if empty_row == -1 {
            self.last_row_num()
        } else {
            empty_row - 1
        };
        let range = if last_row_num <= start.row {
            TableCellRange::of(start.row, start.row, start_row.first_cell_num(), start_row.last_cell_num())
        } else {
            let last_cell_num = self
                .row(last_row_num)
                .map(|row| row.last_cell_num())
                .unwrap_or_else(|| start_row.last_cell_num());
            TableCellRange::of(start.row, last_row_num, start_row.first_cell_num(), last_cell_num)
        };
        debug!("Table {:?} found at {}", first_row, range);
        range
    }

    /// Range of a table from the anchor row to the footer row, both included.
    /// The footer is searched below the header rows only.
    fn table_cell_range_with_footer(
        &self,
        first_row: &Anchor,
        headers_row_count: i32,
        last_row: &Anchor,
    ) -> TableCellRange {
        let start = find_anchor(self, first_row, 0);
        let Some(start_row) = start.is_found().then(|| self.row(start.row)).flatten() else {
            debug!("Table first row {:?} is not found", first_row);
            return TableCellRange::EMPTY;
        };
        let end = find_anchor(self, last_row, start.row + headers_row_count + 1);
        let Some(end_row) = end.is_found().then(|| self.row(end.row)).flatten() else {
            debug!("Table {:?} footer {:?} is not found", first_row, last_row);
            return TableCellRange::EMPTY;
        };
        let range = TableCellRange::of(start.row, end.row, start_row.first_cell_num(), end_row.last_cell_num());
        debug!("Table {:?} found at {}", first_row, range);
        range
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::sheet::GridSheet;

    fn report() -> GridSheet {
        let mut sheet = GridSheet::new("report");
        sheet
            .push(0, 0, "Broker report")
            .push(0, 3, "2021")
            .push(1, 0, "Account:")
            .push_empty(1, 1)
            .push(1, 2, "  ")
            .push(1, 3, "A-100")
            .push(2, 0, "  Trades")
            .push(3, 0, "Date")
            .push(3, 1, "Price")
            .push(3, 2, "Quantity")
            .push(4, 0, "2021-01-01")
            .push(4, 1, 10.5)
            .push(4, 2, 3)
            .push(5, 0, "2021-01-02")
            .push(5, 1, 11)
            .push(5, 2, 4)
            .push(5, 3, "note")
            .push(6, 1, " ")
            .push(7, 0, "Total")
            .push(7, 2, 7);
        sheet
    }

    #[test]
    fn find_scans_rows_then_columns() {
        let sheet = report();
        assert_eq!(sheet.find(&CellValue::from("Price")), TableCellAddress::of(3, 1));
        assert_eq!(sheet.find(&CellValue::Int(7)), TableCellAddress::of(7, 2));
        assert_eq!(sheet.find(&CellValue::from("missing")), TableCellAddress::NOT_FOUND);
        assert_eq!(
            sheet.find_in(&CellValue::Int(3), 0, 4, 0, i32::MAX),
            TableCellAddress::NOT_FOUND
        );
        assert_eq!(
            sheet.find_in(&CellValue::Int(3), 4, 5, 2, 3),
            TableCellAddress::of(4, 2)
        );
        assert_eq!(
            sheet.find_in(&CellValue::Int(3), 4, 5, 0, 2),
            TableCellAddress::NOT_FOUND
        );
    }

    #[test]
    fn find_by_predicate_sees_present_cells_only() {
        let sheet = report();
        assert_eq!(sheet.find_by(&|value| value.is_none()), TableCellAddress::of(1, 1));
        assert_eq!(
            sheet.find_by(&|value| value.map(CellValue::is_number).unwrap_or(false)),
            TableCellAddress::of(4, 1)
        );
    }

    #[test]
    fn find_by_prefix() {
        let sheet = report();
        assert_eq!(sheet.find_by_prefix("trades"), TableCellAddress::of(2, 0));
        assert_eq!(sheet.find_by_prefix("TOT"), TableCellAddress::of(7, 0));
        assert_eq!(sheet.find_by_prefix(""), TableCellAddress::NOT_FOUND);
        assert_eq!(sheet.find_by_prefix_in("date", 4, i32::MAX, 0, i32::MAX), TableCellAddress::NOT_FOUND);
    }

    #[test]
    fn find_by_prefix_matches_text_equal_to_prefix() {
        let mut sheet = report();
        sheet.push(8, 1, "ΟΔΟΣ report").push(9, 0, "ΟΔΟΣ");
        assert_eq!(sheet.find_by_prefix("ΟΔΟΣ"), TableCellAddress::of(8, 1));
        assert_eq!(sheet.find_by_prefix("οδοσ report"), TableCellAddress::of(8, 1));
        assert_eq!(sheet.find_by_prefix_in("ΟΔΟΣ", 9, i32::MAX, 0, i32::MAX), TableCellAddress::of(9, 0));
        let range = sheet.table_cell_range(&Anchor::prefix("ΟΔΟΣ"), 0);
        assert_eq!(range.first_row(), 8);
    }

    #[test]
    fn next_column_value_skips_blanks() {
        let sheet = report();
        assert_eq!(sheet.next_column_value("account"), Some(&CellValue::from("A-100")));
        assert_eq!(sheet.next_column_value("broker"), Some(&CellValue::from("2021")));
        assert_eq!(sheet.next_column_value("total"), Some(&CellValue::Int(7)));
        assert_eq!(sheet.next_column_value("quantity"), None);
        assert_eq!(sheet.next_column_value("absent"), None);
    }

    #[test]
    fn find_empty_row_treats_blank_cells_as_empty() {
        let mut sheet = report();
        assert_eq!(sheet.find_empty_row(3), 6);
        assert_eq!(sheet.find_empty_row(7), -1);
        sheet.ensure_row(9).push(10, 0, "tail");
        assert_eq!(sheet.find_empty_row(8), 8);
        assert_eq!(sheet.find_empty_row(9), 9);
        assert_eq!(sheet.find_empty_row(-5), 6);
    }

    #[test]
    fn table_range_ends_before_blank_row() {
        let sheet = report();
        let range = sheet.table_cell_range(&Anchor::prefix("Trades"), 1);
        assert_eq!(range, TableCellRange::of(2, 5, 0, 3));
        assert_eq!(
            sheet.table_cell_range(&Anchor::prefix("Absent"), 1),
            TableCellRange::EMPTY
        );
        assert_eq!(sheet.table_cell_range(&Anchor::prefix(""), 1), TableCellRange::EMPTY);
    }

    #[test]
    fn table_range_runs_to_last_row() {
        let sheet = report();
        let range = sheet.table_cell_range(&Anchor::prefix("Total"), 0);
        assert_eq!(range, TableCellRange::of(7, 7, 0, 2));
    }

    #[test]
    fn table_range_collapses_to_name_row() {
        let mut sheet = GridSheet::new("report");
        sheet.push(0, 1, "Name").push(0, 2, "x").push(2, 0, "other");
        let range = sheet.table_cell_range(&Anchor::prefix("name"), 0);
        assert_eq!(range, TableCellRange::of(0, 0, 1, 2));
    }

    #[test]
    fn table_range_with_footer() {
        let sheet = report();
        let range = sheet.table_cell_range_with_footer(&Anchor::prefix("Trades"), 1, &Anchor::prefix("Total"));
        assert_eq!(range, TableCellRange::of(2, 7, 0, 2));
        let range = sheet.table_cell_range_with_footer(
            &Anchor::predicate(|value| value == Some(&CellValue::from("Date"))),
            0,
            &Anchor::predicate(|value| value == Some(&CellValue::Int(4))),
        );
        assert_eq!(range, TableCellRange::of(3, 5, 0, 3));
        assert_eq!(
            sheet.table_cell_range_with_footer(&Anchor::prefix("Trades"), 1, &Anchor::prefix("Absent")),
            TableCellRange::EMPTY
        );
        // footer inside the header rows is not taken
        assert_eq!(
            sheet.table_cell_range_with_footer(&Anchor::prefix("Trades"), 1, &Anchor::prefix("Date")),
            TableCellRange::EMPTY
        );
    }

    #[test]
    fn page_cell_by_address() {
        let sheet = report();
        assert_eq!(
            sheet.cell(TableCellAddress::of(3, 2)).and_then(|cell| cell.value()),
            Some(&CellValue::from("Quantity"))
        );
        assert!(sheet.cell(TableCellAddress::of(3, 3)).is_none());
        assert!(sheet.cell(TableCellAddress::NOT_FOUND).is_none());
        assert!(sheet.type_name().ends_with("GridSheet"));
    }
}
