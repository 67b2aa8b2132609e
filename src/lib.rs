//! # Table Wrapper
//!
//! Access layer for tables embedded in report pages, such as the sheets of a broker report.
//! A table is located by the text (or a predicate) of its name row, optionally ended by a
//! footer row, and read row by row through header columns instead of column indexes.
//!
//! ## Features
//!
//! - **Format independent**: pages, rows and cells are traits; [`GridSheet`] is an
//!   in-memory implementation
//! - **Header column strategies**: constant, pattern, multi-line, relative, optional and
//!   any-of columns, declared once per table with [`table_header!`]
//! - **Tolerant coercion**: integers, decimals, doubles with either decimal separator,
//!   strings, instants and local date-times
//! - **Row isolation**: bulk extraction logs and skips failing rows
//! - **Allocation free iteration**: one row cursor per table scan, detached on demand
//!
//! ## Example
//!
//! ```
//! use table_wrapper::{table_header, GridSheet, PageTableFactory, TableColumn, TableCriteria, TableFactory};
//! use std::sync::Arc;
//!
//! table_header! {
//!     enum Trade {
//!         Date => TableColumn::pattern(&["date"]),
//!         Amount => TableColumn::pattern(&["amount"]),
//!     }
//! }
//!
//! let mut sheet = GridSheet::new("report");
//! sheet
//!     .push(0, 0, "Trades")
//!     .push(1, 0, "Date")
//!     .push(1, 1, "Amount")
//!     .push(2, 0, "2021-01-01")
//!     .push(2, 1, "1 000,50");
//!
//! let factory: Arc<dyn TableFactory> = Arc::new(PageTableFactory::<GridSheet>::default());
//! let table = factory.create::<Trade>(&sheet, &TableCriteria::named("trades")).unwrap();
//! let amounts = table.data(|row| row.double_cell_value(Trade::Amount).map(Some));
//! assert_eq!(amounts, [1000.5]);
//! ```
mod database;
mod error;
mod helpers;
mod spreadsheet;

pub use crate::database::column::{PatternColumn, TableColumn, TableHeaderColumn};
pub use crate::database::factory::{PageTableFactory, TableFactory, TableFactoryRegistry};
pub use crate::database::range::TableCellRange;
pub use crate::database::row::TableRow;
pub use crate::database::table::{add_with_equality_checker, Table, TableIter, TableRows};
pub use crate::error::{Result, TableError};
pub use crate::spreadsheet::cell::{BoundCell, CellValue, EmptyTableCell, TableCell};
pub use crate::spreadsheet::criteria::{ignore_case_prefix_predicate, Anchor, CellPredicate, TableCriteria};
pub use crate::spreadsheet::dao::{CellDataAccessObject, DefaultCellDataAccessObject};
pub use crate::spreadsheet::page::ReportPage;
pub use crate::spreadsheet::reference::TableCellAddress;
pub use crate::spreadsheet::row::ReportPageRow;
pub use crate::spreadsheet::sheet::{GridCell, GridRow, GridSheet};
