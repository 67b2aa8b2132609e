use thiserror::Error;

/// Main error type of the table wrapper.
/// Search misses are not errors: they are reported with sentinels (`TableCellAddress::NOT_FOUND`,
/// `TableCellRange::EMPTY`) or `None`.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("{0}")]
    WithContextError(String),

    #[error("{0}")]
    AnyhowError(#[from] anyhow::Error),

    /// A column locator could not resolve a header column (schema error)
    #[error("Column is not found: {0}")]
    ColumnNotFound(String),

    /// A typed accessor found no cell or no value where one was required
    #[error("Missing value: {0}")]
    MissingValue(String),

    /// A value is present but is not convertible to the requested type
    #[error("Can't convert '{value}' to {kind}")]
    CannotConvert { value: String, kind: &'static str },

    /// A declared header row does not exist on the page
    #[error("Header row {row} is absent")]
    HeaderRowIsAbsent { row: i32 },

    /// A row inside the table range has no backing page row
    #[error("Row {row} is empty")]
    RowIsEmpty { row: i32 },

    #[error("No factory registered for report page of type {0}")]
    NoFactoryRegistered(String),

    #[error("Invalid cell reference '{0}'")]
    InvalidReference(String),
}

impl TableError {
    pub(crate) fn cannot_convert(value: impl ToString, kind: &'static str) -> Self {
        TableError::CannotConvert {
            value: value.to_string(),
            kind,
        }
    }

    /// Returns true for failures caused by absent cells or values.
    pub fn is_missing_value(&self) -> bool {
        matches!(self, TableError::MissingValue(_))
    }

    /// Returns true for failures caused by unresolved header columns.
    pub fn is_column_not_found(&self) -> bool {
        matches!(self, TableError::ColumnNotFound(_))
    }
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, TableError> {
    /// Adds context to any failure except column and header errors, which keep their kind.
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| match e {
            TableError::ColumnNotFound(text) => TableError::ColumnNotFound(format!("{}: {}", message, text)),
            TableError::HeaderRowIsAbsent { .. } => e,
            _ => TableError::WithContextError(format!("{}: {}", message, e)),
        })
    }
}

pub type Result<T, E = TableError> = std::result::Result<T, E>;
