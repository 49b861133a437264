//! Period framing around a `Forecaster`.
//!
//! The forecaster sees only values. The engine extracts the value column and
//! re-attaches periods `last + 1 ..= last + horizon` to whatever comes back.

use tracing::info;

use crate::domain::{ForecastSeries, TimeSeries};
use crate::error::AppError;
use crate::forecast::forecaster::{Forecaster, ModelSummary};

pub struct ForecastEngine<F> {
    forecaster: F,
}

impl<F: Forecaster> ForecastEngine<F> {
    pub fn new(forecaster: F) -> Self {
        Self { forecaster }
    }

    /// Forecast `horizon` periods past the end of `series`.
    pub fn forecast(&self, series: &TimeSeries, horizon: usize) -> Result<(ForecastSeries, ModelSummary), AppError> {
        if horizon == 0 {
            return Err(AppError::config("Forecast horizon must be > 0."));
        }

        let prediction = self.forecaster.fit_and_predict(&series.values(), horizon)?;

        if prediction.values.len() != horizon {
            return Err(AppError::model(format!(
                "Forecaster returned {} values for a horizon of {horizon}.",
                prediction.values.len()
            )));
        }
        if prediction.values.iter().any(|v| !v.is_finite()) {
            return Err(AppError::model("Forecaster returned non-finite values."));
        }

        let forecast = ForecastSeries::following(series.last().period, &prediction.values)?;
        info!(
            model = %prediction.summary.display_name,
            horizon,
            first_period = forecast.points()[0].period,
            "forecast produced"
        );
        Ok((forecast, prediction.summary))
    }
}
