//! Tabular Frames
//!
//! The uniform output shape of every query: a named frame made of typed,
//! equally long columns. Frames are immutable once built.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Column type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Time,
    String,
    Int32,
    Int64,
}

/// Typed column values
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValues {
    Time(Vec<DateTime<Utc>>),
    String(Vec<String>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
}

impl FieldValues {
    pub fn len(&self) -> usize {
        match self {
            FieldValues::Time(v) => v.len(),
            FieldValues::String(v) => v.len(),
            FieldValues::Int32(v) => v.len(),
            FieldValues::Int64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValues::Time(_) => FieldType::Time,
            FieldValues::String(_) => FieldType::String,
            FieldValues::Int32(_) => FieldType::Int32,
            FieldValues::Int64(_) => FieldType::Int64,
        }
    }
}

/// Named, typed column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub values: FieldValues,
}

impl Field {
    pub fn new(name: &str, values: FieldValues) -> Self {
        Self {
            name: name.to_string(),
            field_type: values.field_type(),
            values,
        }
    }

    /// Time column from epoch milliseconds
    pub fn time_millis<I>(name: &str, millis: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        let values = millis.into_iter().map(millis_to_instant).collect();
        Self::new(name, FieldValues::Time(values))
    }

    pub fn string<I, S>(name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            FieldValues::String(values.into_iter().map(Into::into).collect()),
        )
    }

    pub fn int32<I: IntoIterator<Item = i32>>(name: &str, values: I) -> Self {
        Self::new(name, FieldValues::Int32(values.into_iter().collect()))
    }

    pub fn int64<I: IntoIterator<Item = i64>>(name: &str, values: I) -> Self {
        Self::new(name, FieldValues::Int64(values.into_iter().collect()))
    }
}

/// Epoch milliseconds to an instant; out-of-range values fall back to the epoch
pub fn millis_to_instant(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ms).unwrap_or_default()
}

/// Frame of equally long columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabularFrame {
    pub name: String,
    pub fields: Vec<Field>,
}

impl TabularFrame {
    pub fn new(name: &str, fields: Vec<Field>) -> Self {
        debug_assert!(
            fields.windows(2).all(|w| w[0].values.len() == w[1].values.len()),
            "frame '{}' has columns of different lengths",
            name
        );

        Self {
            name: name.to_string(),
            fields,
        }
    }

    pub fn row_count(&self) -> usize {
        self.fields.first().map(|f| f.values.len()).unwrap_or(0)
    }

    /// Look up a column by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}
