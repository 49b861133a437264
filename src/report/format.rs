//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the pipeline code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use chrono::{DateTime, Local};

use crate::app::pipeline::RunOutput;
use crate::domain::{ExportView, Provenance};

/// Format the run summary (identity, dataset stats, chosen model).
pub fn format_run_summary(run: &RunOutput, generated: DateTime<Local>) -> String {
    let mut out = String::new();

    out.push_str("=== wbf - World Bank series forecast ===\n");
    out.push_str(&format!(
        "Series: country={} indicator={}\n",
        run.identity.country_code(),
        run.identity.indicator_code()
    ));
    out.push_str(&format!(
        "Observations: n={} | periods=[{}, {}] | rows read={} (missing={}, duplicate={})\n",
        run.series.len(),
        run.series.first().period,
        run.series.last().period,
        run.assembly.rows_read,
        run.assembly.missing_dropped,
        run.assembly.duplicates_dropped,
    ));

    let bic = run
        .summary
        .bic
        .map(|b| format!("{b:.3}"))
        .unwrap_or_else(|| "-".to_string());
    out.push_str(&format!(
        "Model: {} | BIC={} | n_fit={}\n",
        run.summary.display_name, bic, run.summary.n_obs
    ));
    out.push_str(&format!(
        "Horizon: {} | periods=[{}, {}]\n",
        run.forecast.len(),
        run.forecast.points().first().map(|p| p.period).unwrap_or_default(),
        run.forecast.points().last().map(|p| p.period).unwrap_or_default(),
    ));
    out.push_str(&format!("Generated: {}\n", generated.format("%Y-%m-%d %H:%M:%S")));
    out.push('\n');

    out
}

/// Format the forecast rows of the export view, preceded by the last `tail` history rows.
pub fn format_forecast_table(view: &ExportView, tail: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:>8} {:>18} {:<10}", "period", "value", "provenance"));
    out.push('\n');
    out.push_str(&format!("{:->8} {:->18} {:-<10}", "", "", ""));
    out.push('\n');

    let first_forecast = view
        .rows
        .iter()
        .position(|r| r.provenance == Provenance::Forecast)
        .unwrap_or(view.rows.len());
    let start = first_forecast.saturating_sub(tail);

    for r in &view.rows[start..] {
        out.push_str(
            format!(
                "{:>8} {:>18} {:<10}",
                r.point.period,
                fmt_value(r.point.value),
                r.provenance.label()
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Large indicator values (GDP in local currency) switch to scientific notation.
fn fmt_value(v: f64) -> String {
    if v.abs() >= 1e7 {
        format!("{v:.6e}")
    } else {
        format!("{v:.4}")
    }
}
