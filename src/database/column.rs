use crate::error::{Result, TableError};
use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::row::ReportPageRow;
use log::{trace, warn};
use regex::{Regex, RegexBuilder};
use std::fmt::{Debug, Display, Formatter};
use std::hash::Hash;

/// Header column description of a table.
///
/// Implemented by enums declared with [`table_header!`](crate::table_header): every variant
/// carries the [`TableColumn`] locating it.
pub trait TableHeaderColumn: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// All header columns of the table.
    fn values() -> &'static [Self];

    fn column(&self) -> TableColumn;
}

/// Declares a table header enum and implements [`TableHeaderColumn`] for it.
///
/// ```
/// use table_wrapper::{table_header, TableColumn};
///
/// table_header! {
///     pub enum TradeHeader {
///         Date => TableColumn::pattern(&["date"]),
///         Price => TableColumn::pattern(&["price"]),
///         Fee => TableColumn::optional(TableColumn::pattern(&["fee"])),
///     }
/// }
/// ```
#[macro_export]
macro_rules! table_header {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => $column:expr),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),+
        }

        impl $crate::TableHeaderColumn for $name {
            fn values() -> &'static [Self] {
                &[$($name::$variant),+]
            }

            fn column(&self) -> $crate::TableColumn {
                match self {
                    $($name::$variant => $column),+
                }
            }
        }
    };
}

/// Strategy locating the column index of a header by scanning header rows.
#[derive(Clone, Debug)]
pub enum TableColumn {
    /// First column available for search
    Leftmost,
    /// Never found
    NoColumn,
    /// Fixed zero-based column index
    Constant(i32),
    /// First string cell matching all case-insensitive regexes
    Pattern(PatternColumn),
    /// One strategy per header row, each searching from the column found in the row above
    MultiLine(Vec<TableColumn>),
    /// Column found by the base strategy shifted by the offset
    Relative { column: Box<TableColumn>, offset: i32 },
    /// Column which may be missing from the header
    Optional(Box<TableColumn>),
    /// First strategy which succeeds
    AnyOf(Vec<TableColumn>),
}

impl TableColumn {
    /// Index of a column missing from the header.
    pub const NO_COLUMN_INDEX: i32 = -1;

    pub fn constant(index: i32) -> Self {
        TableColumn::Constant(index)
    }

    /// Header cell text should match all words, each treated as a case-insensitive regex.
    /// Without non-empty words the column is the leftmost one.
    pub fn pattern<S: AsRef<str>>(words: &[S]) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(words.len());
        for word in words.iter().map(|word| word.as_ref()).filter(|word| !word.is_empty()) {
            if !unique.iter().any(|known| known == word) {
                unique.push(word.to_owned());
            }
        }
        if unique.is_empty() {
            TableColumn::Leftmost
        } else {
            TableColumn::Pattern(PatternColumn::new(unique))
        }
    }

    pub fn multi_line(columns: Vec<TableColumn>) -> Self {
        TableColumn::MultiLine(columns)
    }

    /// Multi-line header with one pattern per header row.
    pub fn multi_line_words(words: &[&str]) -> Self {
        TableColumn::MultiLine(words.iter().map(|word| Self::pattern(&[word])).collect())
    }

    pub fn relative(column: TableColumn, offset: i32) -> Self {
        TableColumn::Relative {
            column: Box::new(column),
            offset,
        }
    }

    pub fn optional(column: TableColumn) -> Self {
        TableColumn::Optional(Box::new(column))
    }

    pub fn any_of(columns: Vec<TableColumn>) -> Self {
        TableColumn::AnyOf(columns)
    }

    /// Resolves the column index searching from the first column.
    pub fn column_index(&self, header_rows: &[&dyn ReportPageRow]) -> Result<i32> {
        self.column_index_from(0, header_rows)
    }

    /// Resolves the column index considering columns starting at `first_column` only.
    pub fn column_index_from(&self, first_column: i32, header_rows: &[&dyn ReportPageRow]) -> Result<i32> {
        let index = match self {
            TableColumn::Leftmost => Ok(first_column),
            TableColumn::NoColumn => Err(TableError::ColumnNotFound("No column".to_owned())),
            TableColumn::Constant(index) => Ok(*index),
            TableColumn::Pattern(pattern) => pattern.column_index_from(first_column, header_rows),
            TableColumn::MultiLine(columns) => {
                if columns.len() != header_rows.len() {
                    return Err(TableError::ColumnNotFound(format!(
                        "Header of {} rows expected for {}, found {} rows",
                        columns.len(),
                        self,
                        header_rows.len()
                    )));
                }
                columns
                    .iter()
                    .zip(header_rows)
                    .try_fold(first_column, |index, (column, row)| {
                        column.column_index_from(index, std::slice::from_ref(row))
                    })
            }
            TableColumn::Relative { column, offset } => column
                .column_index_from(first_column, header_rows)
                .map(|index| {
                    if index == Self::NO_COLUMN_INDEX {
                        index
                    } else {
                        index + offset
                    }
                }),
            TableColumn::Optional(column) => Ok(column
                .column_index_from(first_column, header_rows)
                .unwrap_or(Self::NO_COLUMN_INDEX)),
            TableColumn::AnyOf(columns) => columns
                .iter()
                .find_map(|column| column.column_index_from(first_column, header_rows).ok())
                .ok_or_else(|| {
                    let alternatives: Vec<String> = columns.iter().map(ToString::to_string).collect();
                    TableError::ColumnNotFound(format!("Header including any of {} is not found", alternatives.join(", ")))
                }),
        };
        trace!("Column {} searched from {} resolved to {:?}", self, first_column, index);
        index
    }
}

impl PartialEq for TableColumn {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TableColumn::Leftmost, TableColumn::Leftmost) => true,
            (TableColumn::NoColumn, TableColumn::NoColumn) => true,
            (TableColumn::Constant(left), TableColumn::Constant(right)) => left == right,
            (TableColumn::Pattern(left), TableColumn::Pattern(right)) => left == right,
            (TableColumn::MultiLine(left), TableColumn::MultiLine(right)) => left == right,
            (
                TableColumn::Relative { column: left, offset: left_offset },
                TableColumn::Relative { column: right, offset: right_offset },
            ) => left == right && left_offset == right_offset,
            (TableColumn::Optional(left), TableColumn::Optional(right)) => left == right,
            (TableColumn::AnyOf(left), TableColumn::AnyOf(right)) => left == right,
            _ => false,
        }
    }
}

impl Display for TableColumn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TableColumn::Leftmost => write!(f, "leftmost"),
            TableColumn::NoColumn => write!(f, "no column"),
            TableColumn::Constant(index) => write!(f, "column {}", index),
            TableColumn::Pattern(pattern) => write!(f, "'{}'", pattern.words.join(", ")),
            TableColumn::MultiLine(columns) => {
                let levels: Vec<String> = columns.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", levels.join(" / "))
            }
            TableColumn::Relative { column, offset } => write!(f, "{} {:+}", column, offset),
            TableColumn::Optional(column) => write!(f, "optional {}", column),
            TableColumn::AnyOf(columns) => {
                let alternatives: Vec<String> = columns.iter().map(ToString::to_string).collect();
                write!(f, "any of ({})", alternatives.join(", "))
            }
        }
    }
}

/// Header words with their compiled regexes.
#[derive(Clone)]
pub struct PatternColumn {
    words: Vec<String>,
    /// None if a word does not compile even escaped, the column is never found then
    patterns: Option<Vec<Regex>>,
}

impl PatternColumn {
    /// Compiled size limit of a word regex, the regex crate default.
    const PATTERN_SIZE_LIMIT: usize = 10 * (1 << 20);

    fn new(words: Vec<String>) -> Self {
        Self::with_size_limit(words, Self::PATTERN_SIZE_LIMIT)
    }

    fn with_size_limit(words: Vec<String>, size_limit: usize) -> Self {
        let patterns = words
            .iter()
            .map(|word| Self::to_pattern(word, size_limit))
            .collect::<Option<Vec<Regex>>>();
        if patterns.is_none() {
            warn!("Header words '{}' exceed the regex size limit", words.join(", "));
        }
        PatternColumn { words, patterns }
    }

    /// A word which is not a valid regex is matched literally.
    fn to_pattern(word: &str, size_limit: usize) -> Option<Regex> {
        let build = |pattern: &str| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .size_limit(size_limit)
                .build()
        };
        build(word).or_else(|_| build(&regex::escape(word))).ok()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    fn matches(&self, text: &str) -> bool {
        self.patterns
            .as_ref()
            .is_some_and(|patterns| patterns.iter().all(|pattern| pattern.is_match(text)))
    }

    fn column_index_from(&self, first_column: i32, header_rows: &[&dyn ReportPageRow]) -> Result<i32> {
        header_rows
            .iter()
            .flat_map(|row| row.cells())
            .filter(|cell| cell.column_index() >= first_column)
            .find(|cell| match cell.value() {
                Some(CellValue::String(text)) => self.matches(text),
                _ => false,
            })
            .map(|cell| cell.column_index())
            .ok_or_else(|| {
                TableError::ColumnNotFound(format!("Header including '{}' is not found", self.words.join(", ")))
            })
    }
}

impl PartialEq for PatternColumn {
    fn eq(&self, other: &Self) -> bool {
        self.words == other.words
    }
}

impl Debug for PatternColumn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternColumn").field("words", &self.words).finish()
    }
}
