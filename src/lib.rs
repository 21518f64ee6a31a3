//! habitdash: the reactive core of a lifestyle-survey analytics dashboard.
//!
//! An immutable [`dataset::Dataset`] is loaded once; all session state lives
//! in filter specs and the drill-down selection. Pure functions derive KPI
//! summaries, grouped aggregates, and chart series from the filtered view,
//! and [`dispatch::Dashboard`] recomputes exactly the outputs affected by
//! each input event, per an explicit dependency table. Rendering is left to
//! whatever consumes the emitted payloads.

pub mod aggregate;
pub mod chart_data;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod dispatch;
pub mod drilldown;
pub mod filter;
pub mod summary;

pub use cli::Args;
pub use config::{AppConfig, ConfigManager};
pub use dataset::{CategoryField, Dataset, LoadOptions, NumericField, Record, SchemaError};
pub use dispatch::{Dashboard, InputEvent, Output, OutputKey, OutputPayload, DEPENDENCIES};
pub use drilldown::{DetailView, DrillDownController, DrillDownSelection, TableSnapshot};
pub use filter::{FilterKey, FilterSpec, FilterState};
pub use summary::Kpi;

/// Application name used for the config directory and other app-specific paths
pub const APP_NAME: &str = "habitdash";
