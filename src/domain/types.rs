//! Shared domain types.
//!
//! These types are intentionally kept small and serializable so they can be:
//!
//! - built by the fetch/assemble stage
//! - passed to the forecaster as plain value columns
//! - exported to CSV or rendered by the plot adapters

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Default number of periods to forecast.
pub const DEFAULT_HORIZON: usize = 5;

/// Default World Bank indicators API base.
pub const DEFAULT_BASE_URL: &str = "https://api.worldbank.org/v2";

/// Default per-request timeout (seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A (country, indicator) pair selecting one remote series.
///
/// Codes are trimmed and uppercased at construction and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesIdentity {
    country_code: String,
    indicator_code: String,
}

impl SeriesIdentity {
    pub fn new(country_code: &str, indicator_code: &str) -> Result<Self, AppError> {
        let country_code = country_code.trim().to_uppercase();
        let indicator_code = indicator_code.trim().to_uppercase();
        if country_code.is_empty() {
            return Err(AppError::config("Country code must not be empty."));
        }
        if indicator_code.is_empty() {
            return Err(AppError::config("Indicator code must not be empty."));
        }
        Ok(Self {
            country_code,
            indicator_code,
        })
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    pub fn indicator_code(&self) -> &str {
        &self.indicator_code
    }

    /// Deterministic export filename, e.g. `Forecast_AFG_NY.GDP.MKTP.CN.csv`.
    pub fn export_file_name(&self) -> String {
        format!("Forecast_{}_{}.csv", self.country_code, self.indicator_code)
    }
}

impl fmt::Display for SeriesIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.country_code, self.indicator_code)
    }
}

/// One provider row as received: the period is still text and the value may be null.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawPoint {
    pub date: String,
    pub value: Option<f64>,
}

/// A single observation with an integer period (usually a year).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub period: i32,
    pub value: f64,
}

/// Assembled historical series.
///
/// Invariants (checked by `TimeSeries::new`):
/// - non-empty
/// - periods strictly increasing (so no duplicates)
/// - every value finite
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    points: Vec<SeriesPoint>,
}

impl TimeSeries {
    pub fn new(points: Vec<SeriesPoint>) -> Result<Self, AppError> {
        if points.is_empty() {
            return Err(AppError::fetch("Time series has no observations."));
        }
        if let Some(p) = points.iter().find(|p| !p.value.is_finite()) {
            return Err(AppError::fetch(format!(
                "Non-finite value at period {}.",
                p.period
            )));
        }
        if let Some(w) = points.windows(2).find(|w| w[1].period <= w[0].period) {
            return Err(AppError::fetch(format!(
                "Periods must be strictly increasing (found {} after {}).",
                w[1].period, w[0].period
            )));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn periods(&self) -> Vec<i32> {
        self.points.iter().map(|p| p.period).collect()
    }

    pub fn first(&self) -> SeriesPoint {
        self.points[0]
    }

    pub fn last(&self) -> SeriesPoint {
        self.points[self.points.len() - 1]
    }
}

/// Forecast extension: `horizon` contiguous periods after the last observed one.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSeries {
    points: Vec<SeriesPoint>,
}

impl ForecastSeries {
    /// Attach periods `last_period + 1 ..= last_period + values.len()`.
    ///
    /// Fails when the last period would not fit in an `i32`.
    pub fn following(last_period: i32, values: &[f64]) -> Result<Self, AppError> {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                let period = i32::try_from(i + 1)
                    .ok()
                    .and_then(|offset| last_period.checked_add(offset))
                    .ok_or_else(|| {
                        AppError::model(format!(
                            "Forecast period {} steps after {last_period} is out of range.",
                            i + 1
                        ))
                    })?;
                Ok(SeriesPoint { period, value })
            })
            .collect::<Result<Vec<_>, AppError>>()?;
        Ok(Self { points })
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn periods(&self) -> Vec<i32> {
        self.points.iter().map(|p| p.period).collect()
    }
}

/// Whether a row is observed history or projected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Source,
    Forecast,
}

impl Provenance {
    pub fn label(self) -> &'static str {
        match self {
            Provenance::Source => "source",
            Provenance::Forecast => "forecast",
        }
    }
}

/// A point plus its provenance tag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaggedPoint {
    pub point: SeriesPoint,
    pub provenance: Provenance,
}

impl TaggedPoint {
    pub fn new(point: SeriesPoint, provenance: Provenance) -> Self {
        Self { point, provenance }
    }
}

/// History then forecast, one row per period. Safe to write as a clean series.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportView {
    pub rows: Vec<TaggedPoint>,
}

/// History, a bridging row, then forecast. For continuous plotting only.
///
/// The bridging row repeats the last source period, so this view must never be
/// exported as a series.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayView {
    pub rows: Vec<TaggedPoint>,
}

impl DisplayView {
    /// Points for one provenance, in order. Includes the bridge for `Forecast`.
    pub fn segment(&self, provenance: Provenance) -> Vec<SeriesPoint> {
        self.rows
            .iter()
            .filter(|r| r.provenance == provenance)
            .map(|r| r.point)
            .collect()
    }
}

/// A named milestone in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Loaded,
    Forecasted,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Loaded => "loaded",
            Stage::Forecasted => "forecasted",
        }
    }

    /// The pipeline call that completes this stage.
    pub fn producer(self) -> &'static str {
        match self {
            Stage::Loaded => "load()",
            Stage::Forecasted => "forecast()",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolved configuration for a single run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub identity: SeriesIdentity,
    pub horizon: usize,
    pub base_url: String,
    pub timeout_secs: u64,
    /// Write the export CSV after forecasting.
    pub export: bool,
    /// Explicit export path; defaults to `identity.export_file_name()` in the cwd.
    pub export_path: Option<PathBuf>,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
}

impl RunConfig {
    pub fn new(identity: SeriesIdentity) -> Self {
        Self {
            identity,
            horizon: DEFAULT_HORIZON,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            export: true,
            export_path: None,
            plot: true,
            plot_width: 80,
            plot_height: 20,
        }
    }

    pub fn resolved_export_path(&self) -> PathBuf {
        self.export_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.identity.export_file_name()))
    }
}
