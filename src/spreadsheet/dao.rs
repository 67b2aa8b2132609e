//! # Cell Value Coercion
//!
//! Conversion of native cell values into typed values. The parse rules are shared by every
//! page implementation through the provided methods of [`CellDataAccessObject`]; only the
//! instant conversion is format specific.
use crate::error::{Result, TableError};
use crate::helpers::string::strip_whitespace;
use crate::spreadsheet::cell::{CellValue, TableCell};
use crate::spreadsheet::row::ReportPageRow;
use crate::spreadsheet::reference::index_to_reference;
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use once_cell::sync::Lazy;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::fmt::Debug;
use std::str::FromStr;

const NO_CELL_VALUE_MESSAGE: &str = "Cell doesn't contain value";

/// Coercion strategy used when a cell has nothing more specific.
pub(crate) static DEFAULT_DAO: Lazy<DefaultCellDataAccessObject> = Lazy::new(DefaultCellDataAccessObject::default);

fn no_value<T>() -> Result<T> {
    Err(TableError::MissingValue(NO_CELL_VALUE_MESSAGE.to_owned()))
}

/// Interprets native cell values.
///
/// Numeric values are truncated for integral accessors; text is stripped of whitespace and
/// parsed. An absent value fails with [`TableError::MissingValue`], a value of the wrong shape
/// with [`TableError::CannotConvert`].
pub trait CellDataAccessObject: Send + Sync + Debug {
    /// Instant conversion, specific to the document format.
    fn instant_value(&self, value: Option<&CellValue>) -> Result<DateTime<Utc>>;

    fn int_value(&self, value: Option<&CellValue>) -> Result<i32> {
        let long = self.long_value(value)?;
        i32::try_from(long).map_err(|_| TableError::cannot_convert(long, "int"))
    }

    fn long_value(&self, value: Option<&CellValue>) -> Result<i64> {
        match value {
            Some(CellValue::Int(value)) => Ok(*value),
            Some(CellValue::Float(value)) => {
                let truncated = value.trunc();
                if truncated.is_finite() && truncated >= i64::MIN as f64 && truncated <= i64::MAX as f64 {
                    Ok(truncated as i64)
                } else {
                    Err(TableError::cannot_convert(value, "long"))
                }
            }
            Some(CellValue::Decimal(value)) => value
                .trunc()
                .to_i64()
                .ok_or_else(|| TableError::cannot_convert(value, "long")),
            Some(CellValue::String(value)) => strip_whitespace(value)
                .parse::<i64>()
                .map_err(|_| TableError::cannot_convert(value, "long")),
            Some(other) => Err(TableError::cannot_convert(other, "long")),
            None => no_value(),
        }
    }

    /// Text is parsed with '.' as decimal separator, then retried with the separator swapped.
    fn double_value(&self, value: Option<&CellValue>) -> Result<f64> {
        match value {
            Some(CellValue::Int(value)) => Ok(*value as f64),
            Some(CellValue::Float(value)) => Ok(*value),
            Some(CellValue::Decimal(value)) => value
                .to_f64()
                .ok_or_else(|| TableError::cannot_convert(value, "double")),
            Some(CellValue::String(value)) => {
                let number = strip_whitespace(value);
                number
                    .parse::<f64>()
                    .or_else(|error| {
                        if number.contains(',') {
                            number.replace(',', ".").parse::<f64>()
                        } else if number.contains('.') {
                            number.replace('.', ",").parse::<f64>()
                        } else {
                            Err(error)
                        }
                    })
                    .map_err(|_| TableError::cannot_convert(value, "double"))
            }
            Some(other) => Err(TableError::cannot_convert(other, "double")),
            None => no_value(),
        }
    }

    /// "0" and "0.0" give the scale-0 `Decimal::ZERO`; any other number keeps the scale it is written with.
    fn big_decimal_value(&self, value: Option<&CellValue>) -> Result<Decimal> {
        let number = self.string_value(value)?.replace(',', ".");
        if number == "0" || number == "0.0" {
            return Ok(Decimal::ZERO);
        }
        Decimal::from_str(&number)
            .or_else(|_| Decimal::from_scientific(&number))
            .map_err(|_| TableError::cannot_convert(number, "decimal"))
    }

    fn string_value(&self, value: Option<&CellValue>) -> Result<String> {
        match value {
            Some(value) => Ok(value.to_string()),
            None => no_value(),
        }
    }

    /// Instant converted to the system time zone.
    fn local_date_time_value(&self, value: Option<&CellValue>) -> Result<NaiveDateTime> {
        Ok(self.instant_value(value)?.with_timezone(&Local).naive_local())
    }

    fn local_date_time_value_at(&self, value: Option<&CellValue>, zone: FixedOffset) -> Result<NaiveDateTime> {
        Ok(self.instant_value(value)?.with_timezone(&zone).naive_local())
    }

    /// Cell of the row at the column, None if absent.
    fn cell<'r>(&self, row: &'r dyn ReportPageRow, column: i32) -> Option<&'r dyn TableCell> {
        row.cell(column)
    }

    /// Native value of the cell at the column; None if either the cell or its value is absent.
    fn value_at<'r>(&self, row: &'r dyn ReportPageRow, column: i32) -> Option<&'r CellValue> {
        self.cell(row, column).and_then(|cell| cell.value())
    }

    fn int_value_at(&self, row: &dyn ReportPageRow, column: i32) -> Result<i32> {
        self.int_value(existing_cell(self, row, column)?.value())
    }

    fn long_value_at(&self, row: &dyn ReportPageRow, column: i32) -> Result<i64> {
        self.long_value(existing_cell(self, row, column)?.value())
    }

    fn double_value_at(&self, row: &dyn ReportPageRow, column: i32) -> Result<f64> {
        self.double_value(existing_cell(self, row, column)?.value())
    }

    fn big_decimal_value_at(&self, row: &dyn ReportPageRow, column: i32) -> Result<Decimal> {
        self.big_decimal_value(existing_cell(self, row, column)?.value())
    }

    fn string_value_at(&self, row: &dyn ReportPageRow, column: i32) -> Result<String> {
        self.string_value(existing_cell(self, row, column)?.value())
    }

    fn instant_value_at(&self, row: &dyn ReportPageRow, column: i32) -> Result<DateTime<Utc>> {
        self.instant_value(existing_cell(self, row, column)?.value())
    }

    fn local_date_time_value_at_row(&self, row: &dyn ReportPageRow, column: i32) -> Result<NaiveDateTime> {
        self.local_date_time_value(existing_cell(self, row, column)?.value())
    }

    fn local_date_time_value_at_row_in(
        &self,
        row: &dyn ReportPageRow,
        column: i32,
        zone: FixedOffset,
    ) -> Result<NaiveDateTime> {
        self.local_date_time_value_at(existing_cell(self, row, column)?.value(), zone)
    }
}

fn existing_cell<'r, D>(dao: &D, row: &'r dyn ReportPageRow, column: i32) -> Result<&'r dyn TableCell>
where
    D: CellDataAccessObject + ?Sized,
{
    dao.cell(row, column).ok_or_else(|| {
        let position = if column >= 0 {
            index_to_reference(row.row_num(), column)
        } else {
            format!("row {} without column", row.row_num() + 1)
        };
        TableError::MissingValue(format!("Cell not found at {}", position))
    })
}

/// Coercion strategy for pages holding already typed values.
///
/// Instants are taken from date-time values as is, or parsed from text: RFC 3339 first, then
/// each of the configured formats, reading naive date-times at the configured zone.
#[derive(Clone, Debug)]
pub struct DefaultCellDataAccessObject {
    /// chrono format strings, tried in order
    date_time_formats: Vec<String>,
    /// Zone of naive date-times found in text
    zone: FixedOffset,
}

impl Default for DefaultCellDataAccessObject {
    fn default() -> Self {
        DefaultCellDataAccessObject {
            date_time_formats: vec![
                "%Y-%m-%d %H:%M:%S".to_owned(),
                "%Y-%m-%dT%H:%M:%S".to_owned(),
                "%d.%m.%Y %H:%M:%S".to_owned(),
                "%Y-%m-%d".to_owned(),
                "%d.%m.%Y".to_owned(),
            ],
            zone: Utc.fix(),
        }
    }
}

impl DefaultCellDataAccessObject {
    /// Replaces the accepted date-time formats.
    pub fn with_date_time_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.date_time_formats = formats.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the zone used to read naive date-times.
    pub fn with_zone(mut self, zone: FixedOffset) -> Self {
        self.zone = zone;
        self
    }

    fn parse_instant(&self, text: &str) -> Option<DateTime<Utc>> {
        let text = text.trim();
        if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
            return Some(instant.with_timezone(&Utc));
        }
        self.date_time_formats.iter().find_map(|format| {
            let naive = NaiveDateTime::parse_from_str(text, format)
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(text, format)
                        .ok()
                        .and_then(|date| date.and_hms_opt(0, 0, 0))
                })?;
            self.zone
                .from_local_datetime(&naive)
                .single()
                .map(|instant| instant.with_timezone(&Utc))
        })
    }
}

impl CellDataAccessObject for DefaultCellDataAccessObject {
    fn instant_value(&self, value: Option<&CellValue>) -> Result<DateTime<Utc>> {
        match value {
            Some(CellValue::DateTime(value)) => Ok(*value),
            Some(CellValue::String(text)) => self
                .parse_instant(text)
                .ok_or_else(|| TableError::cannot_convert(text, "instant")),
            Some(other) => Err(TableError::cannot_convert(other, "instant")),
            None => no_value(),
        }
    }
}
