use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ChartError, ChartResult};

/// Single scalar cell of a result row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowValue {
    #[default]
    Null,
    Number(f64),
    Date(NaiveDateTime),
    String(String),
}

impl RowValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric reading of the cell. Strings are trimmed and coerced, blank
    /// strings reading as `0`; non-finite results are rejected.
    #[must_use]
    pub fn to_finite_number(&self) -> Option<f64> {
        let number = match self {
            Self::Number(value) => *value,
            Self::String(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse::<f64>().ok()?
                }
            }
            Self::Null | Self::Date(_) => return None,
        };
        number.is_finite().then_some(number)
    }

    /// Textual form used for identity bucket keys and group values.
    #[must_use]
    pub fn to_key_string(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Number(value) => Some(value.to_string()),
            Self::Date(value) => Some(value.format("%Y-%m-%dT%H:%M:%S").to_string()),
            Self::String(text) => Some(text.clone()),
        }
    }
}

impl fmt::Display for RowValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_key_string() {
            Some(text) => f.write_str(&text),
            None => f.write_str("null"),
        }
    }
}

impl From<f64> for RowValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for RowValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i32> for RowValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for RowValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for RowValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<NaiveDateTime> for RowValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDate> for RowValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value.and_time(chrono::NaiveTime::MIN))
    }
}

impl<T: Into<RowValue>> From<Option<T>> for RowValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// One query result row: an insertion-ordered mapping from column name to value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    cells: IndexMap<String, RowValue>,
}

impl Row {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<RowValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<RowValue>) {
        self.cells.insert(field.into(), value.into());
    }

    /// Returns the cell for `field`; absent columns read as `None`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&RowValue> {
        self.cells.get(field)
    }

    /// `true` when the column is absent or explicitly null.
    #[must_use]
    pub fn is_null(&self, field: &str) -> bool {
        self.get(field).is_none_or(RowValue::is_null)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowValue)> {
        self.cells.iter().map(|(field, value)| (field.as_str(), value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Converts a JSON object into a row.
    ///
    /// Booleans become the strings `"true"`/`"false"`; nested arrays and
    /// objects have no scalar reading and are skipped.
    pub fn from_json(value: &Value) -> ChartResult<Self> {
        let object = value.as_object().ok_or_else(|| {
            ChartError::InvalidData("row must be a JSON object".to_owned())
        })?;

        let mut row = Self::new();
        for (field, cell) in object {
            let cell = match cell {
                Value::Null => RowValue::Null,
                Value::Bool(flag) => RowValue::String(flag.to_string()),
                Value::Number(number) => match number.as_f64() {
                    Some(number) => RowValue::Number(number),
                    None => continue,
                },
                Value::String(text) => RowValue::String(text.clone()),
                Value::Array(_) | Value::Object(_) => continue,
            };
            row.insert(field.clone(), cell);
        }
        Ok(row)
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let value: Value = serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse row json: {e}")))?;
        Self::from_json(&value)
    }
}

impl<K: Into<String>, V: Into<RowValue>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (field, value) in iter {
            row.insert(field, value);
        }
        row
    }
}

/// Inferred semantic type of a result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnDataType {
    #[default]
    None,
    Date,
    Number,
    String,
    Mixed,
}

impl ColumnDataType {
    /// Merges one more observation into the running inference.
    ///
    /// Widening is monotonic: `None` adopts the observation, a differing
    /// observation turns any specific type into `Mixed`, and `Mixed` is final.
    #[must_use]
    pub fn merge(self, observed: ColumnDataType) -> Self {
        match (self, observed) {
            (Self::None, observed) => observed,
            (current, Self::None) => current,
            (current, observed) if current == observed => current,
            _ => Self::Mixed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableColumn {
    pub field: String,
    pub data_type: ColumnDataType,
}

impl AvailableColumn {
    #[must_use]
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            data_type: ColumnDataType::None,
        }
    }
}
