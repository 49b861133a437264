//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the series identity and run configuration (`SeriesIdentity`, `RunConfig`)
//! - raw and assembled observations (`RawPoint`, `TimeSeries`, `ForecastSeries`)
//! - provenance-tagged views (`ExportView`, `DisplayView`) and pipeline `Stage`s

pub mod types;

pub use types::*;
