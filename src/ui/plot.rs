use std::f32::consts::{FRAC_PI_2, TAU};
use std::ops::RangeInclusive;

use eframe::egui::{Align2, Color32, FontId, Pos2, RichText, Sense, Shape, Stroke, Ui, Vec2};
use egui_plot::{Bar, BarChart, GridMark, Plot, PlotPoint, Text};

use crate::color::ColorMap;

/// Shown in place of a chart or table with no rows.
pub const NO_DATA: &str = "Нет данных";

// ---------------------------------------------------------------------------
// Chart input
// ---------------------------------------------------------------------------

/// One chart series: a category label, its value and the text printed next
/// to the bar or slice.
#[derive(Debug, Clone, Default)]
pub struct Series {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub value_labels: Vec<String>,
}

impl Series {
    pub fn push(&mut self, label: String, value: f64, value_label: String) {
        self.labels.push(label);
        self.values.push(value);
        self.value_labels.push(value_label);
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

pub struct BarSpec<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub category_axis: &'a str,
    pub value_axis: &'a str,
    pub color: Color32,
    pub orientation: Orientation,
}

// ---------------------------------------------------------------------------
// Bar chart
// ---------------------------------------------------------------------------

/// Bars at integer positions with the category names on that axis and a
/// value label at the end of every bar.
pub fn bar_chart(ui: &mut Ui, spec: &BarSpec<'_>, series: &Series) {
    ui.label(RichText::new(spec.title).strong());
    if series.is_empty() {
        ui.label(NO_DATA);
    }

    let bars: Vec<Bar> = series
        .values
        .iter()
        .zip(&series.labels)
        .enumerate()
        .map(|(i, (&value, label))| Bar::new(i as f64, value).name(label).fill(spec.color))
        .collect();

    let mut chart = BarChart::new(bars).color(spec.color).width(0.7);
    if spec.orientation == Orientation::Horizontal {
        chart = chart.horizontal();
    }

    let labels = series.labels.clone();
    let category_names = move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let pos = mark.value;
        if pos.fract() != 0.0 || pos < 0.0 {
            return String::new();
        }
        labels.get(pos as usize).cloned().unwrap_or_default()
    };

    let plot = Plot::new(spec.id)
        .height(320.0)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false);
    let plot = match spec.orientation {
        Orientation::Vertical => plot
            .x_axis_formatter(category_names)
            .x_axis_label(spec.category_axis)
            .y_axis_label(spec.value_axis),
        Orientation::Horizontal => plot
            .y_axis_formatter(category_names)
            .y_axis_label(spec.category_axis)
            .x_axis_label(spec.value_axis),
    };

    plot.show(ui, |plot_ui| {
        plot_ui.bar_chart(chart);
        for (i, (&value, text)) in series.values.iter().zip(&series.value_labels).enumerate() {
            let (position, anchor) = match spec.orientation {
                Orientation::Vertical => (PlotPoint::new(i as f64, value), Align2::CENTER_BOTTOM),
                Orientation::Horizontal => (PlotPoint::new(value, i as f64), Align2::LEFT_CENTER),
            };
            plot_ui.text(Text::new(position, text.as_str()).anchor(anchor));
        }
    });
}

// ---------------------------------------------------------------------------
// Pie chart
// ---------------------------------------------------------------------------

/// Angular extent of one pie slice, in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slice {
    pub start: f32,
    pub end: f32,
    pub fraction: f64,
}

/// Split a full turn between the values, starting at twelve o'clock and
/// going clockwise. Non-positive totals give no slices.
pub fn pie_slices(values: &[f64]) -> Vec<Slice> {
    let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
    if total <= 0.0 {
        return Vec::new();
    }
    let mut start = -FRAC_PI_2;
    values
        .iter()
        .map(|&v| {
            let fraction = v.max(0.0) / total;
            let end = start + (fraction as f32) * TAU;
            let slice = Slice {
                start,
                end,
                fraction,
            };
            start = end;
            slice
        })
        .collect()
}

/// Convex pieces (at most a quarter turn each) that fill one slice.
fn wedge_polygons(center: Pos2, radius: f32, slice: &Slice) -> Vec<Vec<Pos2>> {
    const STEP: f32 = TAU / 120.0;
    let mut pieces = Vec::new();
    let mut from = slice.start;
    while from < slice.end {
        let to = (from + FRAC_PI_2).min(slice.end);
        let steps = (((to - from) / STEP).ceil() as usize).max(1);
        let mut points = vec![center];
        points.extend((0..=steps).map(|k| {
            let angle = from + (to - from) * k as f32 / steps as f32;
            center + Vec2::angled(angle) * radius
        }));
        pieces.push(points);
        from = to;
    }
    pieces
}

/// Pie with whole-percent labels inside each slice and a colour legend.
pub fn pie_chart(ui: &mut Ui, title: &str, series: &Series) {
    ui.label(RichText::new(title).strong());
    let slices = pie_slices(&series.values);
    let colors = ColorMap::new(&series.labels);
    let text_color = ui.visuals().text_color();

    ui.horizontal(|ui: &mut Ui| {
        let (response, painter) = ui.allocate_painter(Vec2::splat(280.0), Sense::hover());
        let center = response.rect.center();
        let radius = response.rect.width().min(response.rect.height()) * 0.45;

        if slices.is_empty() {
            painter.circle_stroke(center, radius, Stroke::new(1.0, Color32::GRAY));
            painter.text(center, Align2::CENTER_CENTER, NO_DATA, FontId::proportional(14.0), text_color);
            return;
        }

        for (slice, label) in slices.iter().zip(&series.labels) {
            let fill = colors.color_for(label);
            for points in wedge_polygons(center, radius, slice) {
                painter.add(Shape::convex_polygon(points, fill, Stroke::NONE));
            }
            if slice.fraction > 0.0 {
                let mid = (slice.start + slice.end) / 2.0;
                painter.text(
                    center + Vec2::angled(mid) * radius * 0.65,
                    Align2::CENTER_CENTER,
                    format!("{:.0}%", slice.fraction * 100.0),
                    FontId::proportional(12.0),
                    Color32::BLACK,
                );
            }
        }

        ui.vertical(|ui: &mut Ui| {
            for (label, color) in colors.legend_entries() {
                ui.horizontal(|ui: &mut Ui| {
                    ui.label(RichText::new("■").color(*color));
                    ui.label(label);
                });
            }
        });
    });
}
