//! Data Processor Module
//! Normalizes chart input into one canonical polars table and extracts columns.

use crate::error::{ChartError, ChartResult};
use indexmap::IndexMap;
use polars::prelude::*;

/// Values of one named column in mapping-shaped input.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Numbers(Vec<f64>),
    Text(Vec<String>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Numbers(v) => v.len(),
            ColumnValues::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn into_column(self, name: &str) -> Column {
        match self {
            ColumnValues::Numbers(v) => Column::new(name.into(), v),
            ColumnValues::Text(v) => Column::new(name.into(), v),
        }
    }
}

impl From<Vec<f64>> for ColumnValues {
    fn from(values: Vec<f64>) -> Self {
        ColumnValues::Numbers(values)
    }
}

impl From<Vec<i64>> for ColumnValues {
    fn from(values: Vec<i64>) -> Self {
        ColumnValues::Numbers(values.into_iter().map(|v| v as f64).collect())
    }
}

impl From<Vec<String>> for ColumnValues {
    fn from(values: Vec<String>) -> Self {
        ColumnValues::Text(values)
    }
}

impl From<Vec<&str>> for ColumnValues {
    fn from(values: Vec<&str>) -> Self {
        ColumnValues::Text(values.into_iter().map(str::to_string).collect())
    }
}

/// Tabular chart input: either a table or an ordered mapping of column name to values.
#[derive(Debug, Clone)]
pub enum ChartInput {
    Table(DataFrame),
    Mapping(IndexMap<String, ColumnValues>),
}

impl From<DataFrame> for ChartInput {
    fn from(df: DataFrame) -> Self {
        ChartInput::Table(df)
    }
}

impl From<IndexMap<String, ColumnValues>> for ChartInput {
    fn from(mapping: IndexMap<String, ColumnValues>) -> Self {
        ChartInput::Mapping(mapping)
    }
}

impl ChartInput {
    /// Build a mapping input from `(name, values)` pairs, keeping their order.
    pub fn mapping<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<ColumnValues>,
        I: IntoIterator<Item = (K, V)>,
    {
        ChartInput::Mapping(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Normalize into the canonical table.
    ///
    /// Mapping keys become columns in insertion order; every column must hold the
    /// same number of rows.
    pub fn into_table(self) -> ChartResult<DataFrame> {
        match self {
            ChartInput::Table(df) => Ok(df),
            ChartInput::Mapping(mapping) => {
                let mut lengths = mapping.iter().map(|(name, values)| (name, values.len()));
                if let Some((first_name, first_len)) = lengths.next() {
                    if let Some((name, len)) = lengths.find(|(_, len)| *len != first_len) {
                        return Err(ChartError::invalid(format!(
                            "column '{}' has {} rows but '{}' has {}",
                            name, len, first_name, first_len
                        )));
                    }
                }

                let columns: Vec<Column> = mapping
                    .into_iter()
                    .map(|(name, values)| values.into_column(&name))
                    .collect();
                Ok(DataFrame::new(columns)?)
            }
        }
    }
}

/// Column lookups and conversions shared by the chart builders.
pub struct DataProcessor;

impl DataProcessor {
    pub fn is_numeric(dtype: &DataType) -> bool {
        matches!(
            dtype,
            DataType::Float32
                | DataType::Float64
                | DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
        )
    }

    pub fn column_names(df: &DataFrame) -> Vec<String> {
        df.get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn require_column<'a>(df: &'a DataFrame, name: &str) -> ChartResult<&'a Column> {
        df.column(name).map_err(|_| {
            ChartError::invalid(format!(
                "no column named '{}' (available: {})",
                name,
                Self::column_names(df).join(", ")
            ))
        })
    }

    /// Numeric column as `f64`, nulls kept as `None`.
    pub fn numeric_values(df: &DataFrame, name: &str) -> ChartResult<Vec<Option<f64>>> {
        let column = Self::require_column(df, name)?;
        Self::numeric_column(column)
    }

    pub fn numeric_column(column: &Column) -> ChartResult<Vec<Option<f64>>> {
        if !Self::is_numeric(column.dtype()) {
            return Err(ChartError::invalid(format!(
                "column '{}' must be numeric, found {}",
                column.name(),
                column.dtype()
            )));
        }
        let as_f64 = column.cast(&DataType::Float64)?;
        let values = as_f64.f64()?;
        Ok(values.into_iter().collect())
    }

    /// Any column rendered as category labels, nulls kept as `None`.
    pub fn label_values(df: &DataFrame, name: &str) -> ChartResult<Vec<Option<String>>> {
        let column = Self::require_column(df, name)?;
        Self::label_column(column)
    }

    pub fn label_column(column: &Column) -> ChartResult<Vec<Option<String>>> {
        if column.dtype() == &DataType::String {
            let values = column.str()?;
            return Ok(values.into_iter().map(|v| v.map(str::to_string)).collect());
        }
        let mut labels = Vec::with_capacity(column.len());
        for i in 0..column.len() {
            let label = match column.get(i)? {
                AnyValue::Null => None,
                val => Some(val.get_str().map_or_else(|| val.to_string(), str::to_string)),
            };
            labels.push(label);
        }
        Ok(labels)
    }

    /// Distinct labels in order of first appearance; numeric columns sort ascending.
    pub fn category_order(df: &DataFrame, name: &str) -> ChartResult<Vec<String>> {
        let column = Self::require_column(df, name)?;
        let labels = Self::label_column(column)?;
        if Self::is_numeric(column.dtype()) {
            // Each distinct number keeps the label of its first row.
            let mut first: IndexMap<u64, (f64, usize)> = IndexMap::new();
            for (i, v) in Self::numeric_column(column)?.into_iter().enumerate() {
                if let Some(v) = v.filter(|v| !v.is_nan()) {
                    let v = if v == 0.0 { 0.0 } else { v };
                    first.entry(v.to_bits()).or_insert((v, i));
                }
            }
            let mut order: Vec<(f64, usize)> = first.into_values().collect();
            order.sort_by(|a, b| a.0.total_cmp(&b.0));
            Ok(order
                .into_iter()
                .filter_map(|(_, i)| labels[i].clone())
                .collect())
        } else {
            let mut seen: IndexMap<String, ()> = IndexMap::new();
            for label in labels.into_iter().flatten() {
                seen.entry(label).or_insert(());
            }
            Ok(seen.into_keys().collect())
        }
    }
}
