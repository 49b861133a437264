//! Merge history and forecast into provenance-tagged views.
//!
//! Two shapes come out of one pair of inputs:
//! - `ExportView`: history as `Source`, then forecast as `Forecast`
//! - `DisplayView`: the same, with the last history point repeated as
//!   `Forecast` between the segments so a line chart has no gap

use crate::domain::{DisplayView, ExportView, ForecastSeries, Provenance, TaggedPoint, TimeSeries};

/// Build both views. Pure: the same inputs always give the same outputs.
pub fn combine(series: &TimeSeries, forecast: &ForecastSeries) -> (ExportView, DisplayView) {
    let export = export_view(series, forecast);
    let display = display_view(series, &export);
    (export, display)
}

fn export_view(series: &TimeSeries, forecast: &ForecastSeries) -> ExportView {
    let mut rows = Vec::with_capacity(series.len() + forecast.len());
    rows.extend(
        series
            .points()
            .iter()
            .map(|&p| TaggedPoint::new(p, Provenance::Source)),
    );
    rows.extend(
        forecast
            .points()
            .iter()
            .map(|&p| TaggedPoint::new(p, Provenance::Forecast)),
    );
    ExportView { rows }
}

fn display_view(series: &TimeSeries, export: &ExportView) -> DisplayView {
    let split = series.len();
    let bridge = TaggedPoint::new(series.last(), Provenance::Forecast);

    let mut rows = Vec::with_capacity(export.rows.len() + 1);
    rows.extend_from_slice(&export.rows[..split]);
    rows.push(bridge);
    rows.extend_from_slice(&export.rows[split..]);
    DisplayView { rows }
}
