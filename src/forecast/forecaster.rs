//! The pluggable fit-and-predict capability.

use serde::Serialize;

use crate::error::AppError;

/// Which model produced a forecast, and how well it fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub display_name: String,
    /// Autoregressive order.
    pub p: usize,
    /// Differencing order.
    pub d: usize,
    /// BIC of the chosen candidate; `None` for models without a likelihood score.
    pub bic: Option<f64>,
    /// Observations used by the final fit (after differencing and lags).
    pub n_obs: usize,
}

/// Output of `Forecaster::fit_and_predict`.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub values: Vec<f64>,
    pub summary: ModelSummary,
}

/// Fit a model to a value column and predict `horizon` further values.
///
/// Implementations know nothing about periods; framing is the engine's job.
pub trait Forecaster {
    fn fit_and_predict(&self, values: &[f64], horizon: usize) -> Result<Prediction, AppError>;
}

/// Repeat the last observation (random walk without drift).
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveForecaster;

impl Forecaster for NaiveForecaster {
    fn fit_and_predict(&self, values: &[f64], horizon: usize) -> Result<Prediction, AppError> {
        let last = *values
            .last()
            .ok_or_else(|| AppError::model("Cannot forecast an empty series."))?;
        Ok(Prediction {
            values: vec![last; horizon],
            summary: ModelSummary {
                display_name: "Naive".to_string(),
                p: 0,
                d: 1,
                bic: None,
                n_obs: values.len(),
            },
        })
    }
}
