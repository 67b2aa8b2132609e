use crate::database::column::{TableColumn, TableHeaderColumn};
use crate::database::range::TableCellRange;
use crate::database::row::{RowBinding, TableRow};
use crate::error::{Result, ResultMessage, TableError};
use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::dao::CellDataAccessObject;
use crate::spreadsheet::page::ReportPage;
use crate::spreadsheet::reference::TableCellAddress;
use crate::spreadsheet::row::ReportPageRow;
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// Table located on a report page.
///
/// The first range row holds the table name, followed by the header rows and the data rows.
/// Header columns are resolved once, on construction.
pub struct Table<'p, H: TableHeaderColumn> {
    /// Page holding the table
    page: &'p dyn ReportPage,
    /// Table name
    name: String,
    /// Table range, columns narrowed to the resolved header columns
    range: TableCellRange,
    /// Resolved column index of each header column, shared with sub-tables
    header_description: Arc<HashMap<H, i32>>,
    /// Offset of the first data row from the first range row
    data_row_offset: i32,
    /// Table has no data rows
    empty: bool,
    /// Coercion strategy of the row cursors
    dao: Arc<dyn CellDataAccessObject>,
}

impl<'p, H: TableHeaderColumn> Table<'p, H> {
    /// Creates a table over the range, resolving header columns from the
    /// `headers_row_count` rows following the name row.
    pub fn new(
        page: &'p dyn ReportPage,
        name: impl Into<String>,
        range: TableCellRange,
        headers_row_count: i32,
        dao: Arc<dyn CellDataAccessObject>,
    ) -> Result<Self> {
        let name = name.into();
        let data_row_offset = 1 + headers_row_count;
        let empty = Self::is_empty_range(&range, data_row_offset);
        let mut table = Table {
            page,
            name,
            range,
            header_description: Arc::new(HashMap::new()),
            data_row_offset,
            empty,
            dao,
        };
        if empty {
            debug!("Table '{}' at {} has no data rows", table.name, range);
            return Ok(table);
        }
        let header_description = Self::resolve_header(page, &range, headers_row_count)
            .with_prefix(&format!("Table '{}'", table.name))?;
        let resolved = || {
            header_description
                .values()
                .copied()
                .filter(|index| *index != TableColumn::NO_COLUMN_INDEX)
        };
        table.range = TableCellRange::of(
            range.first_row(),
            range.last_row(),
            resolved().min().unwrap_or(range.first_column()),
            resolved().max().unwrap_or(range.last_column()),
        );
        debug!("Table '{}' found at {} with header {:?}", table.name, table.range, header_description);
        table.header_description = Arc::new(header_description);
        Ok(table)
    }

    fn is_empty_range(range: &TableCellRange, data_row_offset: i32) -> bool {
        range.is_empty() || (range.last_row() - range.first_row() + 1) - data_row_offset <= 0
    }

    fn resolve_header(
        page: &dyn ReportPage,
        range: &TableCellRange,
        headers_row_count: i32,
    ) -> Result<HashMap<H, i32>> {
        let header_rows = (1..=headers_row_count)
            .map(|offset| {
                let row = range.first_row() + offset;
                page.row(row).ok_or(TableError::HeaderRowIsAbsent { row })
            })
            .collect::<Result<Vec<&dyn ReportPageRow>>>()?;
        H::values()
            .iter()
            .map(|header| -> Result<(H, i32)> { Ok((*header, header.column().column_index(&header_rows)?)) })
            .collect()
    }

    /// Table with the range extended by data rows on top and at the bottom; negative
    /// counts shrink it. Header columns are shared.
    pub fn sub_table(&self, top_rows: i32, bottom_rows: i32) -> Table<'p, H> {
        let range = self.range.add_rows_to_top(top_rows).add_rows_to_bottom(bottom_rows);
        Table {
            page: self.page,
            name: self.name.clone(),
            range,
            header_description: Arc::clone(&self.header_description),
            data_row_offset: self.data_row_offset,
            empty: Self::is_empty_range(&range, self.data_row_offset),
            dao: Arc::clone(&self.dao),
        }
    }

    /// Table without the last row.
    pub fn exclude_total_row(&self) -> Table<'p, H> {
        self.sub_table(0, -1)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn range(&self) -> TableCellRange {
        self.range
    }

    pub fn header_description(&self) -> &HashMap<H, i32> {
        &self.header_description
    }

    pub fn page(&self) -> &'p dyn ReportPage {
        self.page
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn dao(&self) -> &dyn CellDataAccessObject {
        &*self.dao
    }

    /// Page row by zero-based number.
    pub fn row(&self, row: i32) -> Option<&'p dyn ReportPageRow> {
        self.page.row(row)
    }

    /// First and last data row numbers; the first exceeds the last for an empty table.
    fn data_rows(&self) -> (i32, i32) {
        let first = self.range.first_row() + self.data_row_offset;
        if self.empty {
            (first, first - 1)
        } else {
            (first, self.range.last_row())
        }
    }

    fn cursor(&self, row: i32) -> TableRow<'_, H> {
        TableRow::new(self, &*self.dao, RowBinding::of(self.page.row(row), row))
    }

    /// Data rows through a single cursor moved on each step.
    pub fn rows(&self) -> TableRows<'_, H> {
        let (next_row, last_row) = self.data_rows();
        TableRows {
            cursor: self.cursor(next_row),
            next_row,
            last_row,
        }
    }

    /// Data rows, each one a detached row.
    pub fn iter(&self) -> TableIter<'_, H> {
        let (next_row, last_row) = self.data_rows();
        TableIter {
            table: self,
            next_row,
            last_row,
        }
    }

    pub fn stream(&self) -> TableIter<'_, H> {
        self.iter()
    }

    /// Extracts one optional value from each data row. Failed rows are logged and skipped.
    pub fn data<T, E, F>(&self, extractor: F) -> Vec<T>
    where
        F: FnMut(&TableRow<'_, H>) -> std::result::Result<Option<T>, E>,
        E: Display,
    {
        self.data_for("unknown", extractor)
    }

    /// [`Table::data`] naming the report in logs.
    pub fn data_for<T, E, F>(&self, report: impl Display, mut extractor: F) -> Vec<T>
    where
        F: FnMut(&TableRow<'_, H>) -> std::result::Result<Option<T>, E>,
        E: Display,
    {
        self.handle_rows::<T, E, _>(&report, |row, data| {
            if let Some(value) = extractor(row)? {
                data.push(value);
            }
            Ok(())
        })
    }

    /// Extracts any number of values from each data row. Failed rows are logged and skipped.
    pub fn data_collection<T, I, E, F>(&self, extractor: F) -> Vec<T>
    where
        F: FnMut(&TableRow<'_, H>) -> std::result::Result<I, E>,
        I: IntoIterator<Item = T>,
        E: Display,
    {
        self.data_collection_for("unknown", extractor)
    }

    pub fn data_collection_for<T, I, E, F>(&self, report: impl Display, mut extractor: F) -> Vec<T>
    where
        F: FnMut(&TableRow<'_, H>) -> std::result::Result<I, E>,
        I: IntoIterator<Item = T>,
        E: Display,
    {
        self.handle_rows::<T, E, _>(&report, |row, data| {
            data.extend(extractor(row)?);
            Ok(())
        })
    }

    /// [`Table::data_collection_for`] merging each value with the first equal value already
    /// extracted.
    pub fn data_collection_with_merge<T, I, M, E, F, Q, R>(
        &self,
        report: impl Display,
        mut extractor: F,
        equality_checker: Q,
        mut merge_duplicates: R,
    ) -> Vec<T>
    where
        F: FnMut(&TableRow<'_, H>) -> std::result::Result<I, E>,
        I: IntoIterator<Item = T>,
        M: IntoIterator<Item = T>,
        E: Display,
        Q: Fn(&T, &T) -> bool,
        R: FnMut(T, T) -> M,
    {
        self.handle_rows::<T, E, _>(&report, |row, data| {
            for value in extractor(row)? {
                add_with_equality_checker(value, data, &equality_checker, &mut merge_duplicates);
            }
            Ok(())
        })
    }

    fn handle_rows<T, E, F>(&self, report: &dyn Display, mut handler: F) -> Vec<T>
    where
        F: FnMut(&TableRow<'_, H>, &mut Vec<T>) -> std::result::Result<(), E>,
        E: Display,
    {
        let mut data = Vec::new();
        let mut rows = self.rows();
        while let Some(row) = rows.next() {
            if let Err(e) = handler(row, &mut data) {
                warn!("Can't parse table '{}' in {}, row {}: {}", self.name, report, row.row_num() + 1, e);
            }
        }
        data
    }

    /// Row of the table holding the first page cell with the value, None if that cell
    /// is outside the table.
    pub fn find_row(&self, value: &CellValue) -> Result<Option<TableRow<'_, H>>> {
        self.row_at(self.page.find(value))
    }

    /// Row of the table holding the first page string starting with the prefix, ignoring
    /// case. None if that cell is outside the table.
    pub fn find_row_by_prefix(&self, prefix: &str) -> Result<Option<TableRow<'_, H>>> {
        self.row_at(self.page.find_by_prefix(prefix))
    }

    fn row_at(&self, address: TableCellAddress) -> Result<Option<TableRow<'_, H>>> {
        if !self.range.contains(address.row, address.column) {
            return Ok(None);
        }
        match self.page.row(address.row) {
            Some(row) => Ok(Some(TableRow::new(self, &*self.dao, RowBinding::Page(row)))),
            None => Err(TableError::RowIsEmpty { row: address.row }),
        }
    }
}

/// Adds the element to the collection. If the collection already holds an equal element,
/// the first one is removed and replaced by the merge result, appended at the end.
pub fn add_with_equality_checker<T, M, Q, R>(element: T, collection: &mut Vec<T>, equality_checker: Q, merge_duplicates: R)
where
    M: IntoIterator<Item = T>,
    Q: Fn(&T, &T) -> bool,
    R: FnOnce(T, T) -> M,
{
    match collection.iter().position(|known| equality_checker(known, &element)) {
        Some(index) => {
            let known = collection.remove(index);
            collection.extend(merge_duplicates(known, element));
        }
        None => collection.push(element),
    }
}

impl<H: TableHeaderColumn> Debug for Table<'_, H> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name)
            .field("range", &self.range)
            .field("header_description", &self.header_description)
            .field("empty", &self.empty)
            .finish()
    }
}

/// Lending iterator over the data rows of a [`Table`].
///
/// The same cursor is rebound to every row, so a row obtained from [`TableRows::next`]
/// is valid until the next call; [`TableRow::detach`] keeps it longer.
pub struct TableRows<'a, H: TableHeaderColumn> {
    cursor: TableRow<'a, H>,
    next_row: i32,
    last_row: i32,
}

impl<'a, H: TableHeaderColumn> TableRows<'a, H> {
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&TableRow<'a, H>> {
        if self.next_row > self.last_row {
            return None;
        }
        let row_num = self.next_row;
        self.next_row += 1;
        self.cursor.row = RowBinding::of(self.cursor.table().page().row(row_num), row_num);
        Some(&self.cursor)
    }
}

/// Iterator over the data rows of a [`Table`] yielding independent rows.
pub struct TableIter<'a, H: TableHeaderColumn> {
    table: &'a Table<'a, H>,
    next_row: i32,
    last_row: i32,
}

impl<'a, H: TableHeaderColumn> Iterator for TableIter<'a, H> {
    type Item = TableRow<'a, H>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_row > self.last_row {
            return None;
        }
        let row_num = self.next_row;
        self.next_row += 1;
        Some(self.table.cursor(row_num))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.last_row - self.next_row + 1).max(0) as usize;
        (remaining, Some(remaining))
    }
}

impl<'a, 'p: 'a, H: TableHeaderColumn> IntoIterator for &'a Table<'p, H> {
    type Item = TableRow<'a, H>;
    type IntoIter = TableIter<'a, H>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::dao::DefaultCellDataAccessObject;
    use crate::spreadsheet::page::ReportPage;
    use crate::spreadsheet::sheet::GridSheet;
    use crate::spreadsheet::criteria::Anchor;
    use crate::table_header;
    use anyhow::anyhow;

    table_header! {
        enum Header {
            Date => TableColumn::pattern(&["date"]),
            Price => TableColumn::pattern(&["price"]),
            Quantity => TableColumn::pattern(&["quantity"]),
        }
    }

    table_header! {
        enum WideHeader {
            Date => TableColumn::pattern(&["date"]),
            Comment => TableColumn::optional(TableColumn::pattern(&["comment"])),
            Total => TableColumn::multi_line_words(&["total", "rub"]),
        }
    }

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn dao() -> Arc<dyn CellDataAccessObject> {
        Arc::new(DefaultCellDataAccessObject::default())
    }

    fn report() -> GridSheet {
        let mut sheet = GridSheet::new("report");
        sheet
            .push(0, 0, "Broker report")
            .push(2, 0, "Trades")
            .push(3, 0, "Date")
            .push(3, 1, "Price")
            .push(3, 2, "Quantity")
            .push(3, 4, "Note")
            .push(4, 0, "2021-01-01")
            .push(4, 1, 10.5)
            .push(4, 2, 3)
            .push(5, 0, "2021-01-02")
            .push(5, 1, "bad")
            .push(5, 2, 4)
            .push(5, 4, "total")
            .push(7, 0, "Other");
        sheet
    }

    fn trades(sheet: &GridSheet) -> Table<'_, Header> {
        let range = sheet.table_cell_range(&Anchor::prefix("Trades"), 1);
        Table::new(sheet, "Trades", range, 1, dao()).unwrap()
    }

    #[test]
    fn blank_row_terminated_table() {
        init();
        let sheet = report();
        let table = trades(&sheet);
        assert!(!table.is_empty());
        assert_eq!(table.name(), "Trades");
        assert_eq!(table.range(), TableCellRange::of(2, 5, 0, 2));
        assert_eq!(table.header_description()[&Header::Price], 1);
        let rows: Vec<i32> = table.iter().map(|row| row.row_num()).collect();
        assert_eq!(rows, [4, 5]);
        assert_eq!(table.iter().size_hint(), (2, Some(2)));
    }

    #[test]
    fn failed_rows_are_skipped() {
        init();
        let sheet = report();
        let table = trades(&sheet);
        let prices = table.data(|row| row.double_cell_value(Header::Price).map(Some));
        assert_eq!(prices, [10.5]);
        let quantities = table.data_for("report.xlsx", |row| row.int_cell_value(Header::Quantity).map(Some));
        assert_eq!(quantities, [3, 4]);
        let nothing: Vec<i32> = table.data(|_| Err(anyhow!("broken row")));
        assert!(nothing.is_empty());
        let filtered = table.data(|row| {
            let quantity = row.int_cell_value(Header::Quantity)?;
            Ok::<_, TableError>((quantity > 3).then_some(quantity))
        });
        assert_eq!(filtered, [4]);
    }

    #[test]
    fn absent_page_rows_are_iterated() {
        init();
        let mut sheet = GridSheet::new("sparse");
        sheet.push(0, 0, "Table").push(1, 0, "Date").push(1, 1, "Price").push(1, 2, "Quantity");
        sheet.push(2, 1, 1).push(5, 1, 2);
        let table: Table<Header> = Table::new(&sheet, "Table", TableCellRange::of(0, 5, 0, 2), 1, dao()).unwrap();
        let mut rows = table.rows();
        let mut row_nums = Vec::new();
        while let Some(row) = rows.next() {
            row_nums.push(row.row_num());
            if row.row_num() == 3 || row.row_num() == 4 {
                assert!(row.int_cell_value(Header::Price).unwrap_err().is_missing_value());
            }
        }
        assert_eq!(row_nums, [2, 3, 4, 5]);
        assert_eq!(table.data(|row| row.int_cell_value(Header::Price).map(Some)), [1, 2]);
    }

    #[test]
    fn duplicates_are_merged() {
        init();
        let sheet = GridSheet::from_rows(
            "sheet",
            vec![
                vec![Some("Table")],
                vec![Some("Date"), Some("Price"), Some("Quantity")],
                vec![Some("A"), Some("1"), Some("1")],
                vec![Some("A"), Some("2"), Some("1")],
                vec![Some("B"), Some("3"), Some("1")],
            ],
        );
        let table: Table<Header> = Table::new(&sheet, "Table", TableCellRange::of(0, 4, 0, 2), 1, dao()).unwrap();
        let data = table.data_collection_with_merge(
            "sheet",
            |row| Ok::<_, TableError>(vec![(row.string_cell_value(Header::Date)?, row.int_cell_value(Header::Price)?)]),
            |left, right| left.0 == right.0,
            |left, right| vec![(format!("{}+", left.0), left.1 + right.1)],
        );
        assert_eq!(data, [("A+".to_owned(), 3), ("B".to_owned(), 3)]);

        let collected = table.data_collection(|row| {
            let quantity = row.int_cell_value(Header::Quantity)?;
            Ok::<_, TableError>(vec![quantity; 2])
        });
        assert_eq!(collected, [1; 6]);
    }

    #[test]
    fn add_with_equality_checker_replaces_first_equal() {
        let mut data = vec![1, 2, 3];
        add_with_equality_checker(2, &mut data, |a, b| a == b, |a, b| vec![a * 10, b * 10]);
        assert_eq!(data, [1, 3, 20, 20]);
        add_with_equality_checker(4, &mut data, |a, b| a == b, |_, _| Vec::new());
        assert_eq!(data, [1, 3, 20, 20, 4]);
    }

    #[test]
    fn sub_table_and_total_row() {
        let sheet = report();
        let table = trades(&sheet);
        let without_total = table.exclude_total_row();
        assert_eq!(without_total.range(), TableCellRange::of(2, 4, 0, 2));
        assert_eq!(without_total.iter().count(), 1);
        assert!(Arc::ptr_eq(&table.header_description, &without_total.header_description));
        let empty = table.sub_table(0, -2);
        assert!(empty.is_empty());
        assert_eq!(empty.iter().count(), 0);
        let mut rows = empty.rows();
        assert!(rows.next().is_none());
    }

    #[test]
    fn empty_tables() {
        let sheet = report();
        let table: Table<Header> = Table::new(&sheet, "Absent", TableCellRange::EMPTY, 1, dao()).unwrap();
        assert!(table.is_empty());
        assert!(table.header_description().is_empty());
        assert_eq!(table.iter().count(), 0);
        assert!(table.find_row(&CellValue::from("Date")).unwrap().is_none());
        // name and header rows only
        let table: Table<Header> = Table::new(&sheet, "Trades", TableCellRange::of(2, 3, 0, 4), 1, dao()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.range(), TableCellRange::of(2, 3, 0, 4));
    }

    #[test]
    fn header_errors() {
        let sheet = report();
        let error = Table::<WideHeader>::new(&sheet, "Trades", TableCellRange::of(2, 5, 0, 4), 1, dao()).unwrap_err();
        assert!(error.is_column_not_found());
        assert!(error.to_string().contains("Table 'Trades'"));

        let error = Table::<Header>::new(&sheet, "Other", TableCellRange::of(7, 10, 0, 0), 1, dao()).unwrap_err();
        assert!(matches!(error, TableError::HeaderRowIsAbsent { row: 8 }));
    }

    #[test]
    fn optional_and_multi_line_headers() {
        let mut sheet = GridSheet::new("sheet");
        sheet
            .push(0, 0, "Cash")
            .push(1, 0, "Date")
            .push(1, 3, "Total")
            .push(2, 2, "usd")
            .push(2, 3, "rub")
            .push(3, 0, "2021-01-01")
            .push(3, 3, 100);
        let table: Table<WideHeader> = Table::new(&sheet, "Cash", TableCellRange::of(0, 3, 0, 3), 2, dao()).unwrap();
        assert_eq!(table.header_description()[&WideHeader::Comment], TableColumn::NO_COLUMN_INDEX);
        assert_eq!(table.range(), TableCellRange::of(0, 3, 0, 3));
        let row = table.iter().next().unwrap();
        assert_eq!(row.int_cell_value(WideHeader::Total).unwrap(), 100);
        assert_eq!(row.cell_value(WideHeader::Comment).unwrap(), None);
    }

    #[test]
    fn find_rows_inside_table() {
        let sheet = report();
        let table = trades(&sheet);
        let row = table.find_row(&CellValue::Int(4)).unwrap().unwrap();
        assert_eq!(row.row_num(), 5);
        assert_eq!(row.string_cell_value(Header::Date).unwrap(), "2021-01-02");
        assert_eq!(table.find_row_by_prefix("2021-01-01").unwrap().unwrap().row_num(), 4);
        // outside of the narrowed columns
        assert!(table.find_row(&CellValue::from("total")).unwrap().is_none());
        assert!(table.find_row_by_prefix("other").unwrap().is_none());
        assert!(table.find_row_by_prefix("").unwrap().is_none());
    }

    #[test]
    fn find_row_uses_first_match_on_page() {
        let sheet = GridSheet::from_rows(
            "sheet",
            vec![
                vec![Some("First")],
                vec![Some("Date"), Some("Price"), Some("Quantity")],
                vec![Some("Total"), Some("1"), Some("1")],
                vec![],
                vec![Some("Second")],
                vec![Some("Date"), Some("Price"), Some("Quantity")],
                vec![Some("2021-01-01"), Some("2"), Some("2")],
                vec![Some("Total"), Some("2"), Some("2")],
            ],
        );
        let range = sheet.table_cell_range(&Anchor::prefix("Second"), 1);
        assert_eq!(range, TableCellRange::of(4, 7, 0, 2));
        let second: Table<Header> = Table::new(&sheet, "Second", range, 1, dao()).unwrap();
        assert!(second.find_row_by_prefix("total").unwrap().is_none());
        assert!(second.find_row(&CellValue::from("Total")).unwrap().is_none());
        assert_eq!(second.find_row_by_prefix("2021").unwrap().unwrap().row_num(), 6);
    }

    #[test]
    fn table_iteration_by_reference() {
        let sheet = report();
        let table = trades(&sheet);
        let mut count = 0;
        for row in &table {
            assert!(row.row_contains(&CellValue::from(row.string_cell_value(Header::Date).unwrap())));
            count += 1;
        }
        assert_eq!(count, 2);
        assert_eq!(table.stream().count(), 2);
        assert!(format!("{:?}", table).contains("Trades"));
    }
}
