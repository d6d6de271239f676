//! Stats module - aggregation, binning and density estimation

mod calculator;

pub use calculator::{Binned, StatsCalculator, Summary, KDE_GRID_SIZE};
