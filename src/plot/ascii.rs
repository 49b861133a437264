//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements (see `style_for`):
//! - history: `o` markers joined by `-`
//! - forecast: `*` markers joined by `.`, starting at the bridging row

use crate::domain::{DisplayView, Provenance, SeriesPoint};
use crate::plot::style_for;

/// Render the display view as a fixed-size character grid.
pub fn render_ascii_plot(view: &DisplayView, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let source = view.segment(Provenance::Source);
    let forecast = view.segment(Provenance::Forecast);

    let (p_min, p_max) = period_range(view).unwrap_or((0, 1));
    let (y_min, y_max) = value_range(view).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);
    let (t_min, t_max) = (p_min as f64, p_max as f64);

    let mut grid = vec![vec![' '; width]; height];

    // Lines first, then markers; history markers last so the bridge shows as history.
    for (segment, tag) in [(&source, Provenance::Source), (&forecast, Provenance::Forecast)] {
        draw_segment(&mut grid, segment, style_for(tag).line, t_min, t_max, y_min, y_max);
    }
    for (segment, tag) in [(&forecast, Provenance::Forecast), (&source, Provenance::Source)] {
        let marker = style_for(tag).marker;
        for p in segment.iter() {
            let x = map_x(p.period as f64, t_min, t_max, width);
            let y = map_y(p.value, y_min, y_max, height);
            grid[y][x] = marker;
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: period=[{p_min}, {p_max}] | value=[{y_min:.2}, {y_max:.2}]\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    let src = style_for(Provenance::Source);
    let fc = style_for(Provenance::Forecast);
    out.push_str(&format!("{} source | {} forecast\n", src.marker, fc.marker));

    out
}

fn period_range(view: &DisplayView) -> Option<(i32, i32)> {
    let min = view.rows.iter().map(|r| r.point.period).min()?;
    let max = view.rows.iter().map(|r| r.point.period).max()?;
    if max > min { Some((min, max)) } else { Some((min - 1, max + 1)) }
}

fn value_range(view: &DisplayView) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for r in &view.rows {
        min_y = min_y.min(r.point.value);
        max_y = max_y.max(r.point.value);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() && min_y == max_y {
        Some((min_y - 1.0, max_y + 1.0))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_segment(
    grid: &mut [Vec<char>],
    points: &[SeriesPoint],
    ch: char,
    t_min: f64,
    t_max: f64,
    y_min: f64,
    y_max: f64,
) {
    if points.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev: Option<(usize, usize)> = None;
    for p in points {
        let x = map_x(p.period as f64, t_min, t_max, width);
        let y = map_y(p.value, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, y, ch);
        }
        prev = Some((x, y));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaggedPoint;

    fn row(period: i32, value: f64, provenance: Provenance) -> TaggedPoint {
        TaggedPoint::new(SeriesPoint { period, value }, provenance)
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let view = DisplayView {
            rows: vec![
                row(2000, 1.0, Provenance::Source),
                row(2004, 1.0, Provenance::Source),
                row(2004, 1.0, Provenance::Forecast),
                row(2009, 2.0, Provenance::Forecast),
            ],
        };

        let txt = render_ascii_plot(&view, 10, 5);
        let expected = concat!(
            "Plot: period=[2000, 2009] | value=[0.95, 2.05]\n",
            "         *\n",
            "        . \n",
            "      ..  \n",
            "     .    \n",
            "o---o     \n",
            "o source | * forecast\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn single_point_view_does_not_panic() {
        let view = DisplayView {
            rows: vec![row(2020, 5.0, Provenance::Source), row(2020, 5.0, Provenance::Forecast)],
        };
        let txt = render_ascii_plot(&view, 12, 6);
        assert!(txt.contains('o'));
        assert_eq!(txt.lines().count(), 1 + 6 + 1);
    }
}
