//! Shared "load -> forecast -> combine" pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! probe -> paged fetch -> assembly -> forecast -> combined views
//!
//! Every product lives in an `Option` that only its producing stage fills, and
//! every accessor consults the `StageGate` first, so reading before the
//! prerequisite stage is a `NotReady` error rather than a missing value.

use std::path::Path;
use std::time::Duration;

use tracing::info;

use crate::app::stage::StageGate;
use crate::data::{AssemblyStats, SeriesSource, WorldBankClient, assemble_with_stats};
use crate::domain::{DisplayView, ExportView, ForecastSeries, RunConfig, SeriesIdentity, Stage, TimeSeries};
use crate::error::AppError;
use crate::forecast::{AutoArima, ForecastEngine, Forecaster, ModelSummary};

/// One single-use pipeline for a single series.
pub struct Pipeline<S, F> {
    identity: SeriesIdentity,
    source: S,
    engine: ForecastEngine<F>,
    gate: StageGate,
    series: Option<TimeSeries>,
    assembly: Option<AssemblyStats>,
    forecast: Option<ForecastSeries>,
    summary: Option<ModelSummary>,
    export: Option<ExportView>,
    display: Option<DisplayView>,
}

impl<S: SeriesSource, F: Forecaster> Pipeline<S, F> {
    pub fn new(identity: SeriesIdentity, source: S, forecaster: F) -> Self {
        Self {
            identity,
            source,
            engine: ForecastEngine::new(forecaster),
            gate: StageGate::new(),
            series: None,
            assembly: None,
            forecast: None,
            summary: None,
            export: None,
            display: None,
        }
    }

    pub fn state(&self) -> &StageGate {
        &self.gate
    }

    /// Probe, fetch every page, and assemble the historical series.
    ///
    /// Runs once per pipeline; a second call is `AlreadyCompleted`.
    pub fn load(&mut self) -> Result<&TimeSeries, AppError> {
        if self.gate.is_loaded() {
            return Err(AppError::already_completed(Stage::Loaded));
        }

        self.source.probe(&self.identity)?;
        let raw = self.source.fetch_all(&self.identity)?;
        let (series, stats) = assemble_with_stats(raw)?;

        info!(
            identity = %self.identity,
            points = series.len(),
            first = series.first().period,
            last = series.last().period,
            "series loaded"
        );

        self.assembly = Some(stats);
        self.gate.mark_loaded();
        Ok(&*self.series.insert(series))
    }

    /// Forecast `horizon` periods and build both combined views.
    ///
    /// Requires `load()`; runs once per pipeline.
    pub fn forecast(&mut self, horizon: usize) -> Result<&ForecastSeries, AppError> {
        self.gate.require(Stage::Loaded)?;
        if self.gate.is_forecasted() {
            return Err(AppError::already_completed(Stage::Forecasted));
        }
        let series = self
            .series
            .as_ref()
            .ok_or_else(|| AppError::not_ready(Stage::Loaded))?;

        let (forecast, summary) = self.engine.forecast(series, horizon)?;
        let (export, display) = crate::view::combine(series, &forecast);

        self.summary = Some(summary);
        self.export = Some(export);
        self.display = Some(display);
        self.gate.mark_forecasted();
        Ok(&*self.forecast.insert(forecast))
    }

    pub fn series(&self) -> Result<&TimeSeries, AppError> {
        self.gate.require(Stage::Loaded)?;
        self.series.as_ref().ok_or_else(|| AppError::not_ready(Stage::Loaded))
    }

    pub fn forecast_series(&self) -> Result<&ForecastSeries, AppError> {
        self.gate.require(Stage::Forecasted)?;
        self.forecast.as_ref().ok_or_else(|| AppError::not_ready(Stage::Forecasted))
    }

    pub fn model_summary(&self) -> Result<&ModelSummary, AppError> {
        self.gate.require(Stage::Forecasted)?;
        self.summary.as_ref().ok_or_else(|| AppError::not_ready(Stage::Forecasted))
    }

    pub fn export_view(&self) -> Result<&ExportView, AppError> {
        self.gate.require(Stage::Forecasted)?;
        self.export.as_ref().ok_or_else(|| AppError::not_ready(Stage::Forecasted))
    }

    pub fn display_view(&self) -> Result<&DisplayView, AppError> {
        self.gate.require(Stage::Forecasted)?;
        self.display.as_ref().ok_or_else(|| AppError::not_ready(Stage::Forecasted))
    }

    /// Write the export view as CSV. Nothing is created unless `forecast()` has run.
    pub fn export_csv(&self, path: &Path) -> Result<(), AppError> {
        let view = self.export_view()?;
        crate::io::export::write_export_csv(path, view)?;
        info!(identity = %self.identity, path = %path.display(), rows = view.rows.len(), "export written");
        Ok(())
    }

    /// Consume the pipeline into its outputs. Requires `forecast()`.
    pub fn into_output(self) -> Result<RunOutput, AppError> {
        self.gate.require(Stage::Forecasted)?;
        let missing = || AppError::not_ready(Stage::Forecasted);
        Ok(RunOutput {
            identity: self.identity,
            series: self.series.ok_or_else(missing)?,
            assembly: self.assembly.ok_or_else(missing)?,
            forecast: self.forecast.ok_or_else(missing)?,
            summary: self.summary.ok_or_else(missing)?,
            export: self.export.ok_or_else(missing)?,
            display: self.display.ok_or_else(missing)?,
        })
    }
}

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub identity: SeriesIdentity,
    pub series: TimeSeries,
    pub assembly: AssemblyStats,
    pub forecast: ForecastSeries,
    pub summary: ModelSummary,
    pub export: ExportView,
    pub display: DisplayView,
}

/// Execute the full pipeline against the World Bank API with the default forecaster.
pub fn run_pipeline(config: &RunConfig) -> Result<RunOutput, AppError> {
    let client = WorldBankClient::new(config.base_url.clone(), Duration::from_secs(config.timeout_secs))?;
    run_with(config, client, AutoArima::default())
}

/// Execute the pipeline with explicit collaborators (used by tests and the TUI).
pub fn run_with<S: SeriesSource, F: Forecaster>(
    config: &RunConfig,
    source: S,
    forecaster: F,
) -> Result<RunOutput, AppError> {
    let mut pipeline = Pipeline::new(config.identity.clone(), source, forecaster);
    pipeline.load()?;
    pipeline.forecast(config.horizon)?;

    if config.export {
        pipeline.export_csv(&config.resolved_export_path())?;
    }

    pipeline.into_output()
}
