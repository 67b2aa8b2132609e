use crate::database::column::TableHeaderColumn;
use crate::database::table::Table;
use crate::error::{Result, TableError};
use crate::spreadsheet::cell::{BoundCell, CellValue, TableCell};
use crate::spreadsheet::dao::CellDataAccessObject;
use crate::spreadsheet::row::ReportPageRow;
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::fmt::{Debug, Formatter};

/// Page row bound to a table row cursor.
#[derive(Copy, Clone)]
pub(crate) enum RowBinding<'a> {
    Page(&'a dyn ReportPageRow),
    /// Row absent on the page, by zero-based number
    Empty(i32),
}

impl<'a> RowBinding<'a> {
    pub(crate) fn of(row: Option<&'a dyn ReportPageRow>, row_num: i32) -> Self {
        row.map(RowBinding::Page).unwrap_or(RowBinding::Empty(row_num))
    }
}

/// Cursor over the rows of a [`Table`], reading cells by header column.
///
/// Cells fetched through the cursor are interpreted by the table's coercion strategy,
/// whatever strategy the page gave them. A row yielded by [`Table::rows`] is rebound on each
/// step; use [`TableRow::detach`] to keep it.
pub struct TableRow<'a, H: TableHeaderColumn> {
    table: &'a Table<'a, H>,
    dao: &'a dyn CellDataAccessObject,
    pub(crate) row: RowBinding<'a>,
}

impl<'a, H: TableHeaderColumn> TableRow<'a, H> {
    pub(crate) fn new(table: &'a Table<'a, H>, dao: &'a dyn CellDataAccessObject, row: RowBinding<'a>) -> Self {
        TableRow { table, dao, row }
    }

    /// Snapshot bound to the current row, unaffected by further cursor moves.
    pub fn detach(&self) -> TableRow<'a, H> {
        TableRow {
            table: self.table,
            dao: self.dao,
            row: self.row,
        }
    }

    pub fn table(&self) -> &'a Table<'a, H> {
        self.table
    }

    /// Zero-based row number on the page
    pub fn row_num(&self) -> i32 {
        match self.row {
            RowBinding::Page(row) => row.row_num(),
            RowBinding::Empty(row_num) => row_num,
        }
    }

    pub fn first_cell_num(&self) -> i32 {
        match self.row {
            RowBinding::Page(row) => row.first_cell_num(),
            RowBinding::Empty(_) => -1,
        }
    }

    pub fn last_cell_num(&self) -> i32 {
        match self.row {
            RowBinding::Page(row) => row.last_cell_num(),
            RowBinding::Empty(_) => -1,
        }
    }

    /// Returns true if the row is absent on the page.
    pub fn is_empty_row(&self) -> bool {
        matches!(self.row, RowBinding::Empty(_))
    }

    pub fn row_contains(&self, value: &CellValue) -> bool {
        match self.row {
            RowBinding::Page(row) => row.row_contains(value),
            RowBinding::Empty(_) => false,
        }
    }

    /// Present cells of the row in column order.
    pub fn cells(&self) -> Box<dyn Iterator<Item = BoundCell<'a>> + 'a> {
        let dao = self.dao;
        match self.row {
            RowBinding::Page(row) => Box::new(row.cells().map(move |cell| BoundCell::new(cell, dao))),
            RowBinding::Empty(_) => Box::new(std::iter::empty()),
        }
    }

    /// Cell by zero-based column index.
    pub fn cell_at(&self, column: i32) -> Option<BoundCell<'a>> {
        match self.row {
            RowBinding::Page(row) => row.cell(column).map(|cell| BoundCell::new(cell, self.dao)),
            RowBinding::Empty(_) => None,
        }
    }

    /// Column index resolved for the header, [`TableColumn::NO_COLUMN_INDEX`](crate::TableColumn::NO_COLUMN_INDEX)
    /// for a missing optional column.
    pub fn column_index(&self, header: H) -> Result<i32> {
        self.table
            .header_description()
            .get(&header)
            .copied()
            .ok_or_else(|| TableError::ColumnNotFound(format!("{:?} in table '{}'", header, self.table.name())))
    }

    pub fn cell(&self, header: H) -> Result<Option<BoundCell<'a>>> {
        Ok(self.cell_at(self.column_index(header)?))
    }

    pub fn cell_value(&self, header: H) -> Result<Option<&'a CellValue>> {
        let column = self.column_index(header)?;
        Ok(match self.row {
            RowBinding::Page(row) => self.dao.value_at(row, column),
            RowBinding::Empty(_) => None,
        })
    }

    fn typed<T, F>(&self, header: H, read: F) -> Result<T>
    where
        F: FnOnce(&dyn CellDataAccessObject, &dyn ReportPageRow, i32) -> Result<T>,
    {
        let column = self.column_index(header)?;
        match self.row {
            RowBinding::Page(row) => read(self.dao, row, column),
            RowBinding::Empty(row_num) => Err(TableError::MissingValue(format!(
                "Row {} of table '{}' is absent",
                row_num + 1,
                self.table.name()
            ))),
        }
    }

    pub fn int_cell_value(&self, header: H) -> Result<i32> {
        self.typed(header, |dao, row, column| dao.int_value_at(row, column))
    }

    pub fn long_cell_value(&self, header: H) -> Result<i64> {
        self.typed(header, |dao, row, column| dao.long_value_at(row, column))
    }

    pub fn double_cell_value(&self, header: H) -> Result<f64> {
        self.typed(header, |dao, row, column| dao.double_value_at(row, column))
    }

    pub fn big_decimal_cell_value(&self, header: H) -> Result<Decimal> {
        self.typed(header, |dao, row, column| dao.big_decimal_value_at(row, column))
    }

    pub fn string_cell_value(&self, header: H) -> Result<String> {
        self.typed(header, |dao, row, column| dao.string_value_at(row, column))
    }

    pub fn instant_cell_value(&self, header: H) -> Result<DateTime<Utc>> {
        self.typed(header, |dao, row, column| dao.instant_value_at(row, column))
    }

    pub fn local_date_time_cell_value(&self, header: H) -> Result<NaiveDateTime> {
        self.typed(header, |dao, row, column| dao.local_date_time_value_at_row(row, column))
    }

    pub fn local_date_time_cell_value_at(&self, header: H, zone: FixedOffset) -> Result<NaiveDateTime> {
        self.typed(header, |dao, row, column| dao.local_date_time_value_at_row_in(row, column, zone))
    }

    /// Native value of the cell, the default for a missing cell or header.
    pub fn cell_value_or_default(&self, header: H, default: CellValue) -> CellValue {
        match self.cell_value(header) {
            Ok(Some(value)) => value.clone(),
            _ => default,
        }
    }

    pub fn int_cell_value_or_default(&self, header: H, default: i32) -> i32 {
        self.int_cell_value(header).unwrap_or(default)
    }

    pub fn long_cell_value_or_default(&self, header: H, default: i64) -> i64 {
        self.long_cell_value(header).unwrap_or(default)
    }

    pub fn double_cell_value_or_default(&self, header: H, default: f64) -> f64 {
        self.double_cell_value(header).unwrap_or(default)
    }

    pub fn big_decimal_cell_value_or_default(&self, header: H, default: Decimal) -> Decimal {
        self.big_decimal_cell_value(header).unwrap_or(default)
    }

    pub fn string_cell_value_or_default(&self, header: H, default: &str) -> String {
        self.string_cell_value(header).unwrap_or_else(|_| default.to_owned())
    }

    pub fn instant_cell_value_or_default(&self, header: H, default: DateTime<Utc>) -> DateTime<Utc> {
        self.instant_cell_value(header).unwrap_or(default)
    }

    pub fn local_date_time_cell_value_or_default(&self, header: H, default: NaiveDateTime) -> NaiveDateTime {
        self.local_date_time_cell_value(header).unwrap_or(default)
    }

    pub fn local_date_time_cell_value_at_or_default(
        &self,
        header: H,
        zone: FixedOffset,
        default: NaiveDateTime,
    ) -> NaiveDateTime {
        self.local_date_time_cell_value_at(header, zone).unwrap_or(default)
    }
}

impl<H: TableHeaderColumn> Debug for TableRow<'_, H> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let values: Vec<Option<&CellValue>> = self.cells().map(|cell| cell.inner().value()).collect();
        f.debug_struct("TableRow")
            .field("table", &self.table.name())
            .field("row_num", &self.row_num())
            .field("values", &values)
            .finish()
    }
}
