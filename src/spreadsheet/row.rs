use crate::spreadsheet::cell::{CellValue, TableCell};

/// One row of a report page.
///
/// Cell numbers are zero-based; `first_cell_num` and `last_cell_num` are -1 when the row has no
/// cells. Rows may be sparse: `cell` returns None for columns without a cell.
pub trait ReportPageRow: Send + Sync {
    fn cell(&self, column: i32) -> Option<&dyn TableCell>;

    /// Zero-based row number
    fn row_num(&self) -> i32;

    fn first_cell_num(&self) -> i32;

    fn last_cell_num(&self) -> i32;

    /// Present cells in ascending column order.
    fn cells(&self) -> Box<dyn Iterator<Item = &dyn TableCell> + '_> {
        let first = self.first_cell_num();
        let last = self.last_cell_num();
        if first < 0 || last < first {
            return Box::new(std::iter::empty());
        }
        Box::new((first..=last).filter_map(move |column| self.cell(column)))
    }

    /// Returns true if any cell of the row holds the value.
    fn row_contains(&self, value: &CellValue) -> bool {
        self.cells().any(|cell| cell.value() == Some(value))
    }
}
