//! Forecasting.
//!
//! - `forecaster`: the `Forecaster` trait plus a naive fallback
//! - `auto_arima`: automatic ARIMA(p, d, 0) order search (default forecaster)
//! - `engine`: attaches future periods to forecaster output

pub mod auto_arima;
pub mod engine;
pub mod forecaster;

pub use auto_arima::*;
pub use engine::*;
pub use forecaster::*;
