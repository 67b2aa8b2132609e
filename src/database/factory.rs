//! Table construction dispatched by report page implementation.
use crate::database::column::TableHeaderColumn;
use crate::database::range::TableCellRange;
use crate::database::table::Table;
use crate::error::{Result, TableError};
use crate::spreadsheet::cell::TableCell;
use crate::spreadsheet::criteria::{Anchor, CellPredicate, TableCriteria};
use crate::spreadsheet::dao::{CellDataAccessObject, DefaultCellDataAccessObject};
use crate::spreadsheet::page::ReportPage;
use log::debug;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::marker::PhantomData;
use std::sync::Arc;

static GLOBAL_REGISTRY: Lazy<TableFactoryRegistry> = Lazy::new(TableFactoryRegistry::new);

/// Creates tables on the report pages it can handle.
pub trait TableFactory: Send + Sync {
    fn can_handle(&self, page: &dyn ReportPage) -> bool;

    /// Coercion strategy of the created tables.
    fn cell_data_access_object(&self) -> Arc<dyn CellDataAccessObject>;
}

impl dyn TableFactory {
    /// Locates the table described by the criteria and resolves its header.
    ///
    /// A table which is not found is created empty. Nameless tables get a phantom name row
    /// above the first header row.
    pub fn create<'p, H: TableHeaderColumn>(
        &self,
        page: &'p dyn ReportPage,
        criteria: &TableCriteria,
    ) -> Result<Table<'p, H>> {
        let headers_row_count = criteria.headers_row_count();
        let range = match criteria.last_row() {
            Some(last_row) => page.table_cell_range_with_footer(criteria.first_row(), headers_row_count, last_row),
            None => page.table_cell_range(criteria.first_row(), headers_row_count),
        };
        if criteria.is_nameless() {
            return self.create_with_range(page, criteria.provided_name(), range.add_rows_to_top(1), headers_row_count);
        }
        let name = match criteria.first_row() {
            Anchor::Prefix(prefix) => prefix.clone(),
            Anchor::Predicate(predicate) => table_name(page, &range, predicate),
        };
        self.create_with_range(page, name, range, headers_row_count)
    }

    /// Creates a table over an already known range.
    pub fn create_with_range<'p, H: TableHeaderColumn>(
        &self,
        page: &'p dyn ReportPage,
        name: impl Into<String>,
        range: TableCellRange,
        headers_row_count: i32,
    ) -> Result<Table<'p, H>> {
        Table::new(page, name, range, headers_row_count, self.cell_data_access_object())
    }
}

/// Text of the cell accepted by the predicate in the first table row.
fn table_name(page: &dyn ReportPage, range: &TableCellRange, predicate: &CellPredicate) -> String {
    if range.is_empty() {
        return TableCriteria::NOT_FOUND_TABLE_NAME.to_owned();
    }
    let address = page.find_by_in(range.first_row(), range.first_row() + 1, 0, i32::MAX, &**predicate);
    page.cell(address)
        .and_then(|cell| cell.string_value().ok())
        .unwrap_or_else(|| TableCriteria::NOT_FOUND_TABLE_NAME.to_owned())
}

/// Factory of the pages of type `P`.
pub struct PageTableFactory<P: ReportPage + 'static> {
    dao: Arc<dyn CellDataAccessObject>,
    page_type: PhantomData<fn() -> P>,
}

impl<P: ReportPage + 'static> PageTableFactory<P> {
    pub fn new(dao: Arc<dyn CellDataAccessObject>) -> Self {
        PageTableFactory {
            dao,
            page_type: PhantomData,
        }
    }
}

impl<P: ReportPage + 'static> Default for PageTableFactory<P> {
    fn default() -> Self {
        Self::new(Arc::new(DefaultCellDataAccessObject::default()))
    }
}

impl<P: ReportPage + 'static> TableFactory for PageTableFactory<P> {
    fn can_handle(&self, page: &dyn ReportPage) -> bool {
        page.as_any().is::<P>()
    }

    fn cell_data_access_object(&self) -> Arc<dyn CellDataAccessObject> {
        Arc::clone(&self.dao)
    }
}

/// Set of table factories, looked up by report page.
///
/// Readers get a snapshot of the factories; writers replace it, so lookups never wait for
/// a registration to finish.
pub struct TableFactoryRegistry {
    factories: RwLock<Arc<Vec<Arc<dyn TableFactory>>>>,
}

fn same_factory(left: &Arc<dyn TableFactory>, right: &Arc<dyn TableFactory>) -> bool {
    Arc::as_ptr(left) as *const () == Arc::as_ptr(right) as *const ()
}

impl TableFactoryRegistry {
    pub fn new() -> Self {
        TableFactoryRegistry {
            factories: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Process-wide registry, empty until factories are added.
    pub fn global() -> &'static TableFactoryRegistry {
        &GLOBAL_REGISTRY
    }

    /// Adds the factory, returns false if it is already registered.
    pub fn add(&self, factory: Arc<dyn TableFactory>) -> bool {
        let mut factories = self.factories.write();
        if factories.iter().any(|known| same_factory(known, &factory)) {
            return false;
        }
        let mut updated = Vec::clone(&factories);
        updated.push(factory);
        *factories = Arc::new(updated);
        true
    }

    /// Removes the factory, returns false if it is not registered.
    pub fn remove(&self, factory: &Arc<dyn TableFactory>) -> bool {
        let mut factories = self.factories.write();
        let updated: Vec<_> = factories
            .iter()
            .filter(|known| !same_factory(known, factory))
            .cloned()
            .collect();
        if updated.len() == factories.len() {
            return false;
        }
        *factories = Arc::new(updated);
        true
    }

    pub fn clear(&self) {
        *self.factories.write() = Arc::new(Vec::new());
    }

    /// Snapshot of the registered factories, in registration order.
    pub fn all(&self) -> Arc<Vec<Arc<dyn TableFactory>>> {
        Arc::clone(&self.factories.read())
    }

    /// First registered factory handling the page.
    pub fn get(&self, page: &dyn ReportPage) -> Result<Arc<dyn TableFactory>> {
        self.all()
            .iter()
            .find(|factory| factory.can_handle(page))
            .cloned()
            .ok_or_else(|| TableError::NoFactoryRegistered(page.type_name().to_owned()))
    }

    /// Creates a table with the factory handling the page.
    pub fn create_table<'p, H: TableHeaderColumn>(
        &self,
        page: &'p dyn ReportPage,
        criteria: &TableCriteria,
    ) -> Result<Table<'p, H>> {
        let factory = self.get(page)?;
        debug!("Creating table {:?} on {}", criteria.first_row(), page.type_name());
        factory.create(page, criteria)
    }
}

impl Default for TableFactoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}
