//! ### Graph
//! Displays results from the `scenario` module in shareable format.

use plotters::backend::BitMapBackend;
use plotters::chart::ChartBuilder;
use plotters::chart::SeriesLabelPosition;
use plotters::drawing::IntoDrawingArea;
use plotters::prelude::PathElement;
use plotters::series::LineSeries;
use plotters::style::Color;
use plotters::style::Palette;
use plotters::style::Palette99;
use plotters::style::RGBColor;
use plotters::style::BLACK;
use plotters::style::WHITE;
use std::ops::Range;
use std::path::Path;
use tracing::info;

use crate::error::{Error, Result};
use crate::table::ScenarioTable;

pub struct Graphing<'a> {
    path: &'a Path,
}

/// Plotters errors borrow the backend; only the message survives.
fn draw_err(e: impl std::fmt::Display) -> Error {
    Error::Chart(e.to_string())
}

/// Spans every scenario value with a tenth of headroom on each side.
/// The axis keeps 0 in view unless some value lies below it.
fn y_range(table: &ScenarioTable) -> Range<f64> {
    let (lo, hi) = table
        .scenario_names()
        .filter_map(|name| table.column(name))
        .flatten()
        .fold((0f64, 0f64), |(lo, hi), &el| (lo.min(el), hi.max(el)));
    let pad = (hi - lo) * 0.1;
    if pad > 0. {
        let lo = if lo < 0. { lo - pad } else { lo };
        lo..hi + pad
    } else {
        0f64..1.
    }
}

impl<'a> Graphing<'a> {
    const CHART_COLOR: RGBColor = WHITE;

    pub fn new(path: &'a Path) -> Self {
        Graphing { path }
    }

    /// One line per scenario column, dispatched MW over time.
    pub fn scenarios(&self, table: &ScenarioTable, caption: &str) -> Result<()> {
        let names: Vec<&str> = table.scenario_names().collect();
        if names.is_empty() || table.is_empty() {
            return Err(Error::invalid("nothing to plot: table has no scenario columns"));
        }

        let root = BitMapBackend::new(self.path, (1080, 720)).into_drawing_area();
        root.fill(&Self::CHART_COLOR).map_err(draw_err)?;

        let mut chart = ChartBuilder::on(&root)
            .x_label_area_size(72)
            .y_label_area_size(72)
            .margin(20)
            .caption(caption, ("sans-serif", 40.))
            .build_cartesian_2d(0..table.len(), y_range(table))
            .map_err(draw_err)?;

        let timestamps = table.timestamps();
        chart
            .configure_mesh()
            .disable_x_mesh()
            .bold_line_style(WHITE.mix(0.3))
            .y_desc("MW")
            .x_desc("Delivery period")
            .axis_desc_style(("sans-serif", 30))
            .x_label_formatter(&|&idx| {
                timestamps
                    .get(idx)
                    .map(|ts| ts.format("%m-%d %H:%M").to_string())
                    .unwrap_or_default()
            })
            .y_label_formatter(&|mw| format!("{mw:.1}"))
            .x_labels(12)
            .y_labels(10)
            .x_label_style(("sans-serif", 16))
            .y_label_style(("sans-serif", 16))
            .draw()
            .map_err(draw_err)?;

        for (idx, name) in names.iter().enumerate() {
            let Some(values) = table.column(name) else {
                continue;
            };
            let color = Palette99::pick(idx).to_rgba();
            chart
                .draw_series(LineSeries::new(
                    values.iter().copied().enumerate(),
                    color.stroke_width(2),
                ))
                .map_err(draw_err)?
                .label(*name)
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3))
                });
        }

        chart
            .configure_series_labels()
            .border_style(BLACK)
            .background_style(WHITE.mix(0.8))
            .position(SeriesLabelPosition::UpperRight)
            .label_font(("sans-serif", 14))
            .draw()
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
        info!(path = %self.path.display(), scenarios = names.len(), "chart written");

        Ok(())
    }
}
