use crate::spreadsheet::cell::{CellValue, TableCell};
use crate::spreadsheet::dao::{CellDataAccessObject, DefaultCellDataAccessObject};
use crate::spreadsheet::page::ReportPage;
use crate::spreadsheet::row::ReportPageRow;
use log::warn;
use std::any::Any;
use std::sync::Arc;

/// In-memory report page holding already typed cell values.
///
/// Rows are stored densely by row number, cells of a row sparsely in column order.
/// Every cell shares the coercion strategy of the sheet.
pub struct GridSheet {
    /// Sheet name
    name: String,
    /// Rows by zero-based number, None for absent rows
    rows: Vec<Option<GridRow>>,
    /// Coercion strategy of all cells
    dao: Arc<dyn CellDataAccessObject>,
}

/// Row of a [`GridSheet`].
pub struct GridRow {
    row_num: i32,
    /// Cells sorted by column
    cells: Vec<GridCell>,
}

/// Cell of a [`GridSheet`].
pub struct GridCell {
    column: i32,
    value: Option<CellValue>,
    dao: Arc<dyn CellDataAccessObject>,
}

impl GridSheet {
    /// Creates an empty sheet interpreting values with [`DefaultCellDataAccessObject`].
    pub fn new(name: impl Into<String>) -> Self {
        GridSheet {
            name: name.into(),
            rows: Vec::new(),
            dao: Arc::new(DefaultCellDataAccessObject::default()),
        }
    }

    /// Creates a sheet from rows of optional values; an empty row is left absent.
    pub fn from_rows<R, C, V>(name: impl Into<String>, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = Option<V>>,
        V: Into<CellValue>,
    {
        let mut sheet = Self::new(name);
        for (row, values) in (0..).zip(rows) {
            for (column, value) in (0..).zip(values) {
                if let Some(value) = value {
                    sheet.push(row, column, value);
                }
            }
        }
        sheet
    }

    /// Replaces the coercion strategy of the sheet and of all its cells.
    pub fn with_dao(mut self, dao: Arc<dyn CellDataAccessObject>) -> Self {
        for cell in self.rows.iter_mut().flatten().flat_map(|row| row.cells.iter_mut()) {
            cell.dao = Arc::clone(&dao);
        }
        self.dao = dao;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Puts a value at (row, column), replacing the cell already there.
    pub fn push(&mut self, row: i32, column: i32, value: impl Into<CellValue>) -> &mut Self {
        self.put(row, column, Some(value.into()))
    }

    /// Puts a cell holding no value at (row, column).
    pub fn push_empty(&mut self, row: i32, column: i32) -> &mut Self {
        self.put(row, column, None)
    }

    /// Makes the row present, without cells if it was absent.
    pub fn ensure_row(&mut self, row: i32) -> &mut Self {
        if row < 0 {
            warn!("Sheet '{}': ignored negative row {}", self.name, row);
        } else {
            self.row_mut(row);
        }
        self
    }

    fn row_mut(&mut self, row: i32) -> &mut GridRow {
        let index = row as usize;
        if self.rows.len() <= index {
            self.rows.resize_with(index + 1, || None);
        }
        self.rows[index].get_or_insert_with(|| GridRow {
            row_num: row,
            cells: Vec::new(),
        })
    }

    fn put(&mut self, row: i32, column: i32, value: Option<CellValue>) -> &mut Self {
        if row < 0 || column < 0 {
            warn!("Sheet '{}': ignored cell at negative position ({}, {})", self.name, row, column);
            return self;
        }
        let cell = GridCell {
            column,
            value,
            dao: Arc::clone(&self.dao),
        };
        let cells = &mut self.row_mut(row).cells;
        match cells.binary_search_by_key(&column, |cell| cell.column) {
            Ok(index) => cells[index] = cell,
            Err(index) => cells.insert(index, cell),
        }
        self
    }
}

impl ReportPage for GridSheet {
    fn row(&self, row: i32) -> Option<&dyn ReportPageRow> {
        let index = usize::try_from(row).ok()?;
        self.rows
            .get(index)?
            .as_ref()
            .map(|row| row as &dyn ReportPageRow)
    }

    fn last_row_num(&self) -> i32 {
        self.rows.len() as i32 - 1
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ReportPageRow for GridRow {
    fn cell(&self, column: i32) -> Option<&dyn TableCell> {
        self.cells
            .binary_search_by_key(&column, |cell| cell.column)
            .ok()
            .map(|index| &self.cells[index] as &dyn TableCell)
    }

    fn row_num(&self) -> i32 {
        self.row_num
    }

    fn first_cell_num(&self) -> i32 {
        self.cells.first().map(|cell| cell.column).unwrap_or(-1)
    }

    fn last_cell_num(&self) -> i32 {
        self.cells.last().map(|cell| cell.column).unwrap_or(-1)
    }

    fn cells(&self) -> Box<dyn Iterator<Item = &dyn TableCell> + '_> {
        Box::new(self.cells.iter().map(|cell| cell as &dyn TableCell))
    }
}

impl TableCell for GridCell {
    fn column_index(&self) -> i32 {
        self.column
    }

    fn value(&self) -> Option<&CellValue> {
        self.value.as_ref()
    }

    fn dao(&self) -> &dyn CellDataAccessObject {
        &*self.dao
    }
}
