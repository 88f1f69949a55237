//! Ratatui-based terminal UI.
//!
//! The TUI shows a region selector and the growth-rate metric on the left,
//! and four charts on the right: world cumulative cases, world new cases,
//! and the selected region's cases and deaths. `t` swaps the charts for the
//! raw normalized table.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use plotters::style::RGBColor;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
};

use crate::app::pipeline::{DashboardView, Interaction, ViewState, compute_view};
use crate::domain::{AggregatedSeries, DashboardConfig, Metric, RegionCatalog, Trend};
use crate::error::AppError;
use crate::io::ingest::{Dataset, load_dataset};

mod plotters_chart;

use plotters_chart::{ChartLine, SeriesChart, chart_bounds};

const DAILY_COLOR: RGBColor = RGBColor(100, 149, 237); // cornflower blue
const AVERAGE_COLOR: RGBColor = RGBColor(255, 165, 0); // orange
const CUMULATIVE_COLOR: RGBColor = RGBColor(0, 255, 255); // cyan

/// Start the TUI.
pub fn run(config: DashboardConfig) -> Result<(), AppError> {
    // Load before touching the terminal so load errors print normally.
    let mut app = App::new(config)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
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
    dataset: Dataset,
    catalog: RegionCatalog,
    state: ViewState,
    view: DashboardView,
    raw_scroll: usize,
    status: String,
}

impl App {
    fn new(config: DashboardConfig) -> Result<Self, AppError> {
        let dataset = load_dataset(&config.csv_path)?;
        let catalog = RegionCatalog::standard();
        catalog.validate(&dataset.table)?;

        let mut state = ViewState::for_region(&catalog, config.region.as_deref());
        state.show_raw = config.show_raw;
        let view = compute_view(&dataset, &catalog, &state);

        let status = format!("Loaded {} rows.", dataset.stats.rows);
        Ok(Self {
            dataset,
            catalog,
            state,
            view,
            raw_scroll: 0,
            status,
        })
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
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

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        let interaction = match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up | KeyCode::Char('k') => Interaction::SelectPrev,
            KeyCode::Down | KeyCode::Char('j') => Interaction::SelectNext,
            KeyCode::Home => Interaction::Select(0),
            KeyCode::End => Interaction::Select(self.catalog.len().saturating_sub(1)),
            KeyCode::Char('t') => Interaction::ToggleRaw,
            KeyCode::PageDown => {
                self.scroll_raw(20);
                return false;
            }
            KeyCode::PageUp => {
                self.scroll_raw(-20);
                return false;
            }
            _ => return false,
        };

        if self.state.apply(interaction, &self.catalog) {
            self.refresh_view();
        }
        false
    }

    fn scroll_raw(&mut self, delta: isize) {
        if !self.state.show_raw {
            return;
        }
        let max = self.dataset.table.len().saturating_sub(1);
        self.raw_scroll = self.raw_scroll.saturating_add_signed(delta).min(max);
    }

    /// Re-run the pipeline for the current state.
    fn refresh_view(&mut self) {
        self.view = compute_view(&self.dataset, &self.catalog, &self.state);
        self.status = match &self.view.region {
            Ok(series) => format!("{}: {} point(s)", self.state.label(&self.catalog), series.len()),
            Err(err) => err.to_string(),
        };
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
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
        let stats = &self.dataset.stats;
        let range = match (stats.first_date, stats.last_date) {
            (Some(a), Some(b)) => format!("{a} .. {b}"),
            _ => "-".to_string(),
        };

        let lines = vec![
            Line::from(vec![
                Span::styled("covid", Style::default().fg(Color::Cyan)),
                Span::raw(" | Covid-19 dashboard | "),
                Span::styled(crate::report::DATA_SOURCE_URL, Style::default().fg(Color::Gray)),
            ]),
            Line::from(Span::styled(
                format!(
                    "data: {} | rows: {} | regions: {} | dates: {range}",
                    self.dataset.source.display(),
                    stats.rows,
                    stats.regions,
                ),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(30), Constraint::Min(0)])
            .split(area);

        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(10)])
            .split(chunks[0]);

        self.draw_regions(frame, side[0]);
        self.draw_growth(frame, side[1]);

        if self.view.show_raw {
            self.draw_raw_table(frame, chunks[1]);
        } else {
            self.draw_charts(frame, chunks[1]);
        }
    }

    fn draw_regions(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = self
            .catalog
            .options()
            .iter()
            .map(|opt| ListItem::new(opt.label))
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Region").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        if self.state.custom_region.is_none() {
            state.select(Some(self.state.selected));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_growth(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines = Vec::new();
        match &self.view.growth {
            Ok(rate) => {
                let color = match rate.trend() {
                    Trend::Accelerating => Color::Red,
                    Trend::Decelerating => Color::Green,
                    Trend::Stable => Color::White,
                };
                lines.push(Line::from(Span::styled(
                    format!("{:.3}", rate.value),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(Span::styled(
                    format!("{} vs {}", rate.latest_date, rate.prior_date),
                    Style::default().fg(Color::Gray),
                )));
            }
            Err(err) => {
                lines.push(Line::from(Span::styled(
                    "not available",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(Span::styled(err.to_string(), Style::default().fg(Color::Gray))));
            }
        }
        lines.push(Line::from(Span::styled(
            crate::report::GROWTH_CAPTION,
            Style::default().fg(Color::DarkGray),
        )));

        let p = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: true })
            .block(Block::default().title("Monthly growth rate").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_charts(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);
        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[0]);

        draw_cumulative_chart(frame, top[0], "World: cumulative cases", &self.view.world);
        draw_daily_chart(frame, top[1], "World: new cases", &self.view.world, Metric::Cases);

        let label = self.state.label(&self.catalog);
        match &self.view.region {
            Ok(series) => {
                let bottom = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .split(rows[1]);
                draw_daily_chart(frame, bottom[0], &format!("{label}: cases"), series, Metric::Cases);
                draw_daily_chart(frame, bottom[1], &format!("{label}: deaths"), series, Metric::Deaths);
            }
            Err(err) => draw_message(frame, rows[1], label, &err.to_string()),
        }
    }

    fn draw_raw_table(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let visible = area.height.saturating_sub(3) as usize;
        let rows = self
            .dataset
            .table
            .rows()
            .iter()
            .skip(self.raw_scroll)
            .take(visible)
            .map(|r| {
                // Year and population as plain integers.
                Row::new(vec![
                    Cell::from(r.date.format("%Y-%m-%d").to_string()),
                    Cell::from(r.region_name.clone()),
                    Cell::from(r.region_code.clone()),
                    Cell::from(r.cases.to_string()),
                    Cell::from(r.deaths.to_string()),
                    Cell::from(r.year.to_string()),
                    Cell::from(r.population.to_string()),
                ])
            });

        let header = Row::new(vec!["date", "region", "code", "cases", "deaths", "year", "popData2020"])
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
        let widths = [
            Constraint::Length(10),
            Constraint::Min(16),
            Constraint::Length(6),
            Constraint::Length(9),
            Constraint::Length(7),
            Constraint::Length(5),
            Constraint::Length(12),
        ];
        let title = format!(
            "Data ({}-{} of {})",
            (self.raw_scroll + 1).min(self.dataset.table.len()),
            (self.raw_scroll + visible).min(self.dataset.table.len()),
            self.dataset.table.len()
        );
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(table, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ region  Home/End first/last  t data table  PgUp/PgDn scroll  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn draw_cumulative_chart(frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, series: &AggregatedSeries) {
    let Some(inner) = chart_frame(frame, area, title, series) else {
        return;
    };
    let Some(origin) = series.first_date() else {
        return;
    };

    let fill = ChartLine {
        points: series
            .points
            .iter()
            .map(|p| (day_offset(origin, p.date), p.cumulative_cases as f64))
            .collect(),
        color: CUMULATIVE_COLOR,
    };
    let (x_bounds, y_bounds) = chart_bounds([&fill]);
    let widget = SeriesChart {
        area: Some(&fill),
        lines: &[],
        x_bounds,
        y_bounds,
        origin,
    };
    frame.render_widget(widget, inner);
}

fn draw_daily_chart(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    title: &str,
    series: &AggregatedSeries,
    metric: Metric,
) {
    let Some(inner) = chart_frame(frame, area, &format!("{title} (blue: daily, orange: 7-day avg)"), series) else {
        return;
    };
    let Some(origin) = series.first_date() else {
        return;
    };

    let lines = daily_lines(series, metric, origin);
    let (x_bounds, y_bounds) = chart_bounds(lines.iter());
    let widget = SeriesChart {
        area: None,
        lines: &lines,
        x_bounds,
        y_bounds,
        origin,
    };
    frame.render_widget(widget, inner);
}

/// Raw daily values and their 7-day average as chart lines.
fn daily_lines(series: &AggregatedSeries, metric: Metric, origin: chrono::NaiveDate) -> [ChartLine; 2] {
    let daily = ChartLine {
        points: series
            .points
            .iter()
            .map(|p| (day_offset(origin, p.date), metric.daily(p) as f64))
            .collect(),
        color: DAILY_COLOR,
    };
    let average = ChartLine {
        points: series
            .points
            .iter()
            .filter_map(|p| metric.rolling(p).map(|v| (day_offset(origin, p.date), v)))
            .collect(),
        color: AVERAGE_COLOR,
    };
    [daily, average]
}

/// Draw the chart block; returns the inner area, or `None` after drawing an
/// empty-state message.
fn chart_frame(frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, series: &AggregatedSeries) -> Option<Rect> {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    if series.is_empty() {
        let msg = Paragraph::new("No data.")
            .style(Style::default().fg(Color::Yellow))
            .alignment(Alignment::Center);
        frame.render_widget(msg, inner);
        return None;
    }
    Some(inner)
}

fn draw_message(frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, message: &str) {
    let p = Paragraph::new(message.to_string())
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().title(title.to_string()).borders(Borders::ALL));
    frame.render_widget(p, area);
}

fn day_offset(origin: chrono::NaiveDate, date: chrono::NaiveDate) -> f64 {
    (date - origin).num_days() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RegionFilter, SeriesPoint};
    use chrono::NaiveDate;

    #[test]
    fn daily_lines_skip_undefined_averages() {
        let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let points = (0..8)
            .map(|i| SeriesPoint {
                date: start + chrono::Duration::days(i),
                total_cases: i as u64,
                total_deaths: 1,
                cumulative_cases: 0,
                cumulative_deaths: 0,
                rolling_cases_7d: if i >= 6 { Some(3.0) } else { None },
                rolling_deaths_7d: if i >= 6 { Some(1.0) } else { None },
            })
            .collect();
        let series = AggregatedSeries {
            filter: RegionFilter::All,
            points,
        };

        let [daily, average] = daily_lines(&series, Metric::Cases, start);
        assert_eq!(daily.points.len(), 8);
        assert_eq!(average.points, vec![(6.0, 3.0), (7.0, 3.0)]);

        let [deaths, _] = daily_lines(&series, Metric::Deaths, start);
        assert!(deaths.points.iter().all(|&(_, y)| y == 1.0));
    }
}
