//! Error types shared by every chart operation.

use polars::prelude::PolarsError;
use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown {kind}: '{name}'")]
    UnknownTheme { kind: &'static str, name: String },

    #[error("labels required: a bare sequence of values carries no category labels")]
    LabelsRequired,

    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("render error: {0}")]
    Render(String),

    #[error("display error: {0}")]
    Display(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
}

impl ChartError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        ChartError::InvalidInput(message.into())
    }
}
