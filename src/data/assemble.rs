//! Turn raw provider rows into a clean `TimeSeries`.
//!
//! The feed arrives newest-first and page by page. Assembly must not depend on
//! that: the result is always ascending by period with one value per period.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::domain::{RawPoint, SeriesPoint, TimeSeries};
use crate::error::AppError;

/// Counts from one assembly, useful in logs and reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyStats {
    pub rows_read: usize,
    pub missing_dropped: usize,
    pub duplicates_dropped: usize,
}

/// Assemble raw rows into an ascending, deduplicated series.
///
/// Steps:
/// 1. parse each `date` into an integer period
/// 2. drop rows with absent or non-finite values
/// 3. drop repeated periods, keeping the first row seen (request order)
/// 4. sort ascending by period
pub fn assemble(raw: Vec<RawPoint>) -> Result<TimeSeries, AppError> {
    assemble_with_stats(raw).map(|(series, _)| series)
}

pub fn assemble_with_stats(raw: Vec<RawPoint>) -> Result<(TimeSeries, AssemblyStats), AppError> {
    let mut stats = AssemblyStats {
        rows_read: raw.len(),
        ..AssemblyStats::default()
    };

    let mut seen = HashSet::new();
    let mut points = Vec::with_capacity(raw.len());

    for row in raw {
        let period = parse_period(&row.date)?;
        let value = match row.value {
            Some(v) if v.is_finite() => v,
            _ => {
                stats.missing_dropped += 1;
                continue;
            }
        };
        if !seen.insert(period) {
            debug!(period, "duplicate period dropped");
            stats.duplicates_dropped += 1;
            continue;
        }
        points.push(SeriesPoint { period, value });
    }

    if points.is_empty() {
        return Err(AppError::fetch(format!(
            "No observations with values ({} rows read, {} missing).",
            stats.rows_read, stats.missing_dropped
        )));
    }

    // Provider order is newest-first; reverse before sorting so already-ordered
    // feeds are a no-op for the stable sort.
    points.reverse();
    points.sort_by_key(|p| p.period);

    info!(
        points = points.len(),
        missing = stats.missing_dropped,
        duplicates = stats.duplicates_dropped,
        "series assembled"
    );

    Ok((TimeSeries::new(points)?, stats))
}

/// Parse a provider date into an integer period.
///
/// Only plain integer periods (annual data such as `"2020"`) are supported;
/// quarterly/monthly codes like `"2020Q1"` are rejected rather than guessed.
pub fn parse_period(raw: &str) -> Result<i32, AppError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| AppError::fetch(format!("Unsupported period '{raw}' (expected an integer year).")))
}
