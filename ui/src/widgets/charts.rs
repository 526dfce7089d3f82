//! Report charts built on `egui_plot`.

use egui::Ui;
use egui_plot::{Bar, BarChart, Plot};
use walletboard_business::reports::VolumeBucket;

const CHART_HEIGHT: f32 = 220.0;

/// A labeled bar chart: one bar per entry, category labels on the x axis.
pub fn labeled_bar_chart(ui: &mut Ui, chart_id: &str, entries: &[(String, f64)]) {
    if entries.is_empty() {
        ui.weak("No data for the selected range.");
        return;
    }

    let bars: Vec<Bar> = entries
        .iter()
        .enumerate()
        .map(|(index, (label, value))| {
            Bar::new(index as f64, *value)
                .width(0.6)
                .name(label.clone())
        })
        .collect();
    let labels: Vec<String> = entries.iter().map(|(label, _)| label.clone()).collect();

    Plot::new(chart_id.to_owned())
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show_grid([false, true])
        .x_axis_formatter(move |mark, _range| {
            let index = mark.value.round();
            if index >= 0.0 && mark.value.fract().abs() < f64::EPSILON {
                labels.get(index as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(chart_id.to_owned(), bars));
        });
}

/// The daily-volume chart: one bar per calendar day, amount summed.
pub fn volume_chart(ui: &mut Ui, chart_id: &str, buckets: &[VolumeBucket]) {
    if buckets.is_empty() {
        ui.weak("No transactions in the selected range.");
        return;
    }

    let bars: Vec<Bar> = buckets
        .iter()
        .enumerate()
        .map(|(index, bucket)| {
            Bar::new(index as f64, bucket.amount)
                .width(0.6)
                .name(format!("{} ({} txs)", bucket.date, bucket.count))
        })
        .collect();
    let labels: Vec<String> = buckets
        .iter()
        .map(|bucket| bucket.date.format("%m-%d").to_string())
        .collect();

    Plot::new(chart_id.to_owned())
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show_grid([false, true])
        .x_axis_formatter(move |mark, _range| {
            let index = mark.value.round();
            if index >= 0.0 && mark.value.fract().abs() < f64::EPSILON {
                labels.get(index as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(chart_id.to_owned(), bars));
        });
}
