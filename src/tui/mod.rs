//! Ratatui-based terminal UI.
//!
//! Shows the history/forecast chart for one series, the tail of the export
//! view, and lets the user change the horizon or write the export CSV.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
};
use tracing::warn;

use crate::app::pipeline::{RunOutput, run_pipeline};
use crate::domain::{DisplayView, Provenance, RunConfig};
use crate::error::AppError;
use crate::plot::color_for;

mod plotters_chart;

use plotters_chart::ForecastPlottersChart;

/// Upper bound for interactive horizon changes.
const MAX_HORIZON: usize = 50;

/// Start the TUI.
pub fn run(config: RunConfig) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::io(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config);
    app.refresh();
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::io(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::io(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    config: RunConfig,
    status: String,
    run: Option<RunOutput>,
}

impl App {
    fn new(mut config: RunConfig) -> Self {
        // Exports happen on demand (`e`), never as a side effect of refreshing.
        config.export = false;
        Self {
            config,
            status: String::new(),
            run: None,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::io(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::io(format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::io(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Left | KeyCode::Char('-') => self.set_horizon(self.config.horizon.saturating_sub(1)),
            KeyCode::Right | KeyCode::Char('+') => self.set_horizon(self.config.horizon + 1),
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char('e') => self.export(),
            _ => {}
        }
        false
    }

    fn set_horizon(&mut self, horizon: usize) {
        let horizon = horizon.clamp(1, MAX_HORIZON);
        if horizon == self.config.horizon {
            return;
        }
        self.config.horizon = horizon;
        self.refresh();
    }

    /// Pipelines are single-use, so a refresh always runs a fresh one.
    fn refresh(&mut self) {
        match run_pipeline(&self.config) {
            Ok(run) => {
                self.status = format!(
                    "{} | model {} | horizon {}",
                    run.identity, run.summary.display_name, self.config.horizon
                );
                self.run = Some(run);
            }
            Err(err) => {
                warn!(%err, "tui refresh failed");
                self.status = format!("Refresh failed: {err}");
            }
        }
    }

    fn export(&mut self) {
        let Some(run) = &self.run else {
            self.status = "Nothing to export yet.".to_string();
            return;
        };
        let path = self.config.resolved_export_path();
        self.status = match crate::io::export::write_export_csv(&path, &run.export) {
            Ok(()) => format!("Wrote {}", path.display()),
            Err(err) => format!("Export failed: {err}"),
        };
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("wbf", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" - {}", self.config.identity)),
        ]));

        if let Some(run) = &self.run {
            let bic = run
                .summary
                .bic
                .map(|b| format!("{b:.3}"))
                .unwrap_or_else(|| "-".to_string());
            lines.push(Line::from(Span::styled(
                format!(
                    "n={} | periods {}..{} | model {} | bic={bic} | horizon {}",
                    run.series.len(),
                    run.series.first().period,
                    run.series.last().period,
                    run.summary.display_name,
                    run.forecast.len(),
                ),
                Style::default().fg(Color::Gray),
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(36)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_table(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("History + forecast").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(run) = &self.run else {
            let msg = Paragraph::new("Waiting for data...")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let (source, forecast, x_bounds, y_bounds) = chart_series(&run.display);

        let (chart_rect, insets) = chart_layout(inner);
        let widget = ForecastPlottersChart {
            source: &source,
            forecast: &forecast,
            x_bounds,
            y_bounds,
            x_label: "period",
            y_label: run.identity.indicator_code().to_string(),
            fmt_x: fmt_axis_period,
            fmt_y: fmt_axis_value,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, x_bounds, y_bounds);
        }
    }

    fn draw_table(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Export rows").borders(Borders::ALL);
        let Some(run) = &self.run else {
            frame.render_widget(block, area);
            return;
        };

        let visible = area.height.saturating_sub(2) as usize;
        let rows = &run.export.rows;
        let start = rows.len().saturating_sub(visible);

        let lines: Vec<Line> = rows[start..]
            .iter()
            .map(|r| {
                let (red, green, blue) = color_for(r.provenance);
                Line::from(Span::styled(
                    format!("{:>6} {:>16} {}", r.point.period, fmt_axis_value(r.point.value), r.provenance.label()),
                    Style::default().fg(Color::Rgb(red, green, blue)),
                ))
            })
            .collect();

        frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ horizon  r refresh  e export CSV  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

type ChartData = (Vec<(f64, f64)>, Vec<(f64, f64)>, [f64; 2], [f64; 2]);

/// Split the display view into per-provenance line series plus padded bounds.
fn chart_series(view: &DisplayView) -> ChartData {
    let to_xy = |tag: Provenance| -> Vec<(f64, f64)> {
        view.segment(tag)
            .into_iter()
            .map(|p| (p.period as f64, p.value))
            .collect()
    };
    let source = to_xy(Provenance::Source);
    let forecast = to_xy(Provenance::Forecast);

    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in source.iter().chain(forecast.iter()) {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    if !x_min.is_finite() || !x_max.is_finite() || x_max <= x_min {
        x_min -= 1.0;
        x_max += 1.0;
    }
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        y_min -= 1.0;
        y_max += 1.0;
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    (source, forecast, [x_min, x_max], [y_min - pad, y_max + pad])
}

fn fmt_axis_period(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_value(v: f64) -> String {
    if v.abs() >= 1e6 {
        format!("{v:.3e}")
    } else {
        format!("{v:.2}")
    }
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 10,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 5
    {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = fmt_axis_period(x_val);
        let label_len = label.len() as u16;
        let start = x.saturating_sub((label.len() / 2) as u16);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = fmt_axis_value(y_val);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label.len() as u16);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("period")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let source = color_for(Provenance::Source);
    let forecast = color_for(Provenance::Forecast);
    let legend = Line::from(vec![
        Span::styled("history ", Style::default().fg(Color::Rgb(source.0, source.1, source.2))),
        Span::styled(
            "forecast",
            Style::default()
                .fg(Color::Rgb(forecast.0, forecast.1, forecast.2))
                .add_modifier(Modifier::BOLD),
        ),
    ]);
    let legend_rect = Rect {
        x: chart.x,
        y: inner.y,
        width: chart.width.min(20),
        height: 1,
    };
    frame.render_widget(Paragraph::new(legend), legend_rect);
}
