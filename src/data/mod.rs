//! Data module - CSV loading and input normalization

mod loader;
mod processor;

pub use loader::{DataLoader, LoaderError};
pub use processor::{ChartInput, ColumnValues, DataProcessor};
