//! Plotters-powered digit distribution chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
// `ratatui::style::Color` shadows the Plotters trait; keep `.filled()` in scope.
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call (see
/// `chart_series` in the parent module).
pub struct DigitPlottersChart<'a> {
    /// `(digit, observed share)` bars.
    pub observed: &'a [(f64, f64)],
    /// `(digit, expected share)` line.
    pub expected: &'a [(f64, f64)],
    /// Y bounds (share, 0..max).
    pub y_bounds: [f64; 2],
}

impl<'a> Widget for DigitPlottersChart<'a> {
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

        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];
        if !(y0.is_finite() && y1.is_finite()) || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(0.5_f64..9.5_f64, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("leading digit")
                .y_desc("share")
                .x_labels(9)
                .y_labels(5)
                .x_label_formatter(&|v| format!("{v:.0}"))
                .y_label_formatter(&|v| format!("{:.0}%", v * 100.0))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let bar_color = RGBColor(0, 255, 255); // cyan
            let expected_color = RGBColor(255, 255, 0); // yellow

            // 1) Observed shares as bars.
            chart.draw_series(
                self.observed
                    .iter()
                    .map(|&(d, v)| Rectangle::new([(d - 0.35, 0.0), (d + 0.35, v)], bar_color.filled())),
            )?;

            // 2) Benford reference on top.
            chart.draw_series(LineSeries::new(self.expected.iter().copied(), &expected_color))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
