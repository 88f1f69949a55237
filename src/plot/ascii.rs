//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - daily counts: `.`
//! - 7-day average: `*` line
//! - cumulative total: `#` line

use chrono::NaiveDate;

use crate::domain::{AggregatedSeries, Metric};

/// One drawable layer: points in (day offset, value) space.
struct Layer {
    glyph: char,
    points: Vec<(f64, f64)>,
    connect: bool,
}

/// Render the cumulative-cases curve of a series.
pub fn render_cumulative_plot(series: &AggregatedSeries, width: usize, height: usize) -> String {
    let Some(origin) = series.first_date() else {
        return format!("Plot: cumulative cases | {} | no data\n", series.filter.label());
    };
    let points = series
        .points
        .iter()
        .map(|p| (day_offset(origin, p.date), p.cumulative_cases as f64))
        .collect();

    let layers = [Layer {
        glyph: '#',
        points,
        connect: true,
    }];
    render_plot("cumulative cases", series, &layers, width, height)
}

/// Render daily counts (dots) with their 7-day average (line).
pub fn render_daily_plot(series: &AggregatedSeries, metric: Metric, width: usize, height: usize) -> String {
    let Some(origin) = series.first_date() else {
        return format!("Plot: {} | {} | no data\n", metric.display_name(), series.filter.label());
    };

    let daily = series
        .points
        .iter()
        .map(|p| (day_offset(origin, p.date), metric.daily(p) as f64))
        .collect();
    let rolling = series
        .points
        .iter()
        .filter_map(|p| metric.rolling(p).map(|v| (day_offset(origin, p.date), v)))
        .collect();

    // Draw the average first so daily points can overlay it.
    let layers = [
        Layer {
            glyph: '*',
            points: rolling,
            connect: true,
        },
        Layer {
            glyph: '.',
            points: daily,
            connect: false,
        },
    ];
    render_plot(metric.display_name(), series, &layers, width, height)
}

fn render_plot(title: &str, series: &AggregatedSeries, layers: &[Layer], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = x_range(layers).unwrap_or((0.0, 1.0));
    // Counts are non-negative: anchor the axis at zero.
    let y_max = layers
        .iter()
        .flat_map(|l| l.points.iter().map(|&(_, y)| y))
        .fold(0.0_f64, f64::max);
    let y_max = if y_max > 0.0 { y_max } else { 1.0 };
    let y_min = 0.0;

    let mut grid = vec![vec![' '; width]; height];
    for layer in layers {
        if layer.connect {
            draw_curve(&mut grid, &layer.points, layer.glyph, x_min, x_max, y_min, y_max);
        } else {
            for &(x, y) in &layer.points {
                let col = map_x(x, x_min, x_max, width);
                let row = map_y(y, y_min, y_max, height);
                grid[row][col] = layer.glyph;
            }
        }
    }

    // Build final string. We include a small header with ranges.
    let mut out = String::new();
    let first = series.first_date().map(|d| d.to_string()).unwrap_or_default();
    let last = series.last().map(|p| p.date.to_string()).unwrap_or_default();
    out.push_str(&format!(
        "Plot: {title} | {} | {first} .. {last} | y=[0, {y_max:.0}]\n",
        series.filter.label()
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn day_offset(origin: NaiveDate, date: NaiveDate) -> f64 {
    (date - origin).num_days() as f64
}

fn x_range(layers: &[Layer]) -> Option<(f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    for &(x, _) in layers.iter().flat_map(|l| l.points.iter()) {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
    }
    if min_x.is_finite() && max_x.is_finite() && max_x > min_x {
        Some((min_x, max_x))
    } else {
        None
    }
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(
    grid: &mut [Vec<char>],
    points: &[(f64, f64)],
    glyph: char,
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in points {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, glyph);
        } else {
            grid[row][col] = glyph;
        }
        prev = Some((col, row));
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
    use crate::domain::{RegionFilter, SeriesPoint};

    fn series(cases: &[u64]) -> AggregatedSeries {
        let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let mut total = 0;
        let points = cases
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                total += c;
                SeriesPoint {
                    date: start + chrono::Duration::days(i as i64),
                    total_cases: c,
                    total_deaths: 0,
                    cumulative_cases: total,
                    cumulative_deaths: 0,
                    rolling_cases_7d: None,
                    rolling_deaths_7d: None,
                }
            })
            .collect();
        AggregatedSeries {
            filter: RegionFilter::Region("France".to_string()),
            points,
        }
    }

    #[test]
    fn cumulative_golden_snapshot_small() {
        let txt = render_cumulative_plot(&series(&[10, 20, 30]), 10, 5);
        let expected = concat!(
            "Plot: cumulative cases | France | 2021-01-01 .. 2021-01-03 | y=[0, 60]\n",
            "        ##\n",
            "      ##  \n",
            "   ###    \n",
            "###       \n",
            "          \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn daily_plot_marks_every_point() {
        let txt = render_daily_plot(&series(&[0, 5, 10]), Metric::Cases, 10, 5);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("Plot: new cases | France"));
        assert_eq!(lines[5].chars().next(), Some('.'));
        assert_eq!(lines[1].chars().last(), Some('.'));
        // No 7-day average yet, so no line glyphs.
        assert!(!txt.contains('*'));
    }

    #[test]
    fn empty_series_plot() {
        let txt = render_daily_plot(&series(&[]), Metric::Deaths, 10, 5);
        assert_eq!(txt, "Plot: deaths | France | no data\n");
    }
}
