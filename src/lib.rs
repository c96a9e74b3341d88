//! Selective aggregation and presentation state for sets of named x/y
//! series: ingestion, descriptive statistics, per-series selection flags and
//! the derived views a dashboard renders.

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod processing;
pub mod report;
pub mod state;

pub use app::{AggregationController, CommandOutcome, DerivedViews, PlotTrace, TableRow};
pub use error::{CommandError, ConfigError, CoreError, LoadError};
pub use processing::statistics::{describe, AggregateLastValueStats, DescriptiveStats};
pub use state::series_store::{Sample, Series};
