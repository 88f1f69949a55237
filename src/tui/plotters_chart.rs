//! Plotters time-series chart widget for Ratatui.
//!
//! X values are day offsets from `origin` so Plotters can use a plain `f64`
//! axis; the tick formatter turns them back into dates. Output goes into the
//! Ratatui buffer through `plotters-ratatui-backend`.

use chrono::{Duration, NaiveDate};
use plotters::prelude::*;
// The named ratatui `Color` import shadows the plotters trait from the prelude.
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A line drawn on the chart, x in days since `origin`.
#[derive(Debug, Clone)]
pub struct ChartLine {
    pub points: Vec<(f64, f64)>,
    pub color: RGBColor,
}

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call so `render()`
/// only draws.
pub struct SeriesChart<'a> {
    /// Optional filled area (drawn first).
    pub area: Option<&'a ChartLine>,
    /// Lines drawn in order on top of the area.
    pub lines: &'a [ChartLine],
    /// X bounds (days since `origin`).
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub origin: NaiveDate,
}

impl<'a> Widget for SeriesChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let origin = self.origin;
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 2)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(4)
                .y_labels(5)
                .x_label_formatter(&|v| fmt_day(origin, *v))
                .y_label_formatter(&|v| fmt_count(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            if let Some(fill) = self.area {
                chart.draw_series(
                    AreaSeries::new(fill.points.iter().copied(), 0.0, &fill.color.mix(0.3))
                        .border_style(&fill.color),
                )?;
            }

            for line in self.lines {
                chart.draw_series(LineSeries::new(line.points.iter().copied(), &line.color))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// X/Y bounds covering every point, with the y axis anchored at zero.
pub fn chart_bounds<'a>(lines: impl IntoIterator<Item = &'a ChartLine>) -> ([f64; 2], [f64; 2]) {
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let mut y_max = 0.0_f64;
    for line in lines {
        for &(x, y) in &line.points {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_max = y_max.max(y);
        }
    }

    if !x_min.is_finite() || !x_max.is_finite() || x_max <= x_min {
        x_min = 0.0;
        x_max = x_min + 1.0;
    }
    if !y_max.is_finite() || y_max <= 0.0 {
        y_max = 1.0;
    }

    let pad = (y_max * 0.05).max(1e-12);
    ([x_min, x_max], [0.0, y_max + pad])
}

fn fmt_day(origin: NaiveDate, offset: f64) -> String {
    let date = origin + Duration::days(offset.round() as i64);
    date.format("%d/%m/%y").to_string()
}

fn fmt_count(v: f64) -> String {
    if v >= 1_000_000.0 {
        format!("{:.1}M", v / 1_000_000.0)
    } else if v >= 10_000.0 {
        format!("{:.0}k", v / 1_000.0)
    } else {
        format!("{v:.0}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_anchor_y_at_zero_and_pad_top() {
        let line = ChartLine {
            points: vec![(0.0, 10.0), (4.0, 100.0)],
            color: RGBColor(0, 0, 0),
        };
        let (x, y) = chart_bounds([&line]);
        assert_eq!(x, [0.0, 4.0]);
        assert_eq!(y[0], 0.0);
        assert!((y[1] - 105.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_bounds_fall_back() {
        let line = ChartLine {
            points: vec![(3.0, 0.0)],
            color: RGBColor(0, 0, 0),
        };
        let (x, y) = chart_bounds([&line]);
        assert_eq!(x, [0.0, 1.0]);
        assert!(y[1] > 1.0);
    }

    #[test]
    fn renders_area_and_lines_into_buffer() {
        let fill = ChartLine {
            points: (0..30).map(|i| (i as f64, (i * i) as f64)).collect(),
            color: RGBColor(0, 255, 255),
        };
        let lines = [ChartLine {
            points: (0..30).map(|i| (i as f64, 10.0 * i as f64)).collect(),
            color: RGBColor(255, 165, 0),
        }];
        let (x_bounds, y_bounds) = chart_bounds([&fill, &lines[0]]);
        let chart = SeriesChart {
            area: Some(&fill),
            lines: &lines,
            x_bounds,
            y_bounds,
            origin: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
        };

        let rect = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(rect);
        chart.render(rect, &mut buf);
        assert!(buf.content().iter().any(|cell| cell.symbol() != " "));
    }

    #[test]
    fn tick_labels() {
        let origin = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        assert_eq!(fmt_day(origin, 31.2), "01/02/21");
        assert_eq!(fmt_count(950.0), "950");
        assert_eq!(fmt_count(25_000.0), "25k");
        assert_eq!(fmt_count(2_500_000.0), "2.5M");
    }
}
