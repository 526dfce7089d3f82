//! The reports page: date range plus three aggregate charts.

use chrono::NaiveDate;
use egui::{Color32, Ui};
use walletboard_business::reports::ReportResult;

use crate::state::AppState;
use crate::widgets::charts::{labeled_bar_chart, volume_chart};

const COLOR_ERROR: Color32 = Color32::from_rgb(220, 53, 69);
const COLOR_WARNING: Color32 = Color32::from_rgb(255, 165, 0);

pub fn reports_page(state: &mut AppState, ui: &mut Ui) {
    ui.heading("Reports");
    ui.add_space(8.0);

    let mut apply = false;
    ui.horizontal(|ui| {
        ui.label("From:");
        ui.add(
            egui::TextEdit::singleline(&mut state.reports.date_from_input)
                .hint_text("YYYY-MM-DD")
                .desired_width(100.0),
        );
        ui.label("To:");
        ui.add(
            egui::TextEdit::singleline(&mut state.reports.date_to_input)
                .hint_text("YYYY-MM-DD")
                .desired_width(100.0),
        );
        apply = ui.button("Apply").clicked();
    });

    if let Some(message) = &state.reports.range_error {
        ui.colored_label(COLOR_ERROR, message);
    }

    if apply {
        run_reports(state);
    }

    ui.add_space(12.0);

    ui.strong("Top transactions per user");
    match state.reports.top_transactions.result() {
        ReportResult::Loading => {
            ui.spinner();
        }
        ReportResult::Error(message) => {
            ui.colored_label(COLOR_ERROR, message);
        }
        ReportResult::Loaded(rows) => {
            let entries: Vec<(String, f64)> = rows
                .iter()
                .map(|row| (row.wallet.clone(), row.amount))
                .collect();
            labeled_bar_chart(ui, "top_transactions", &entries);
        }
        ReportResult::Idle => {
            ui.weak("Pick a date range and press Apply.");
        }
    }

    ui.add_space(12.0);

    ui.strong("Top users by outbound value");
    match state.reports.top_users.result() {
        ReportResult::Loading => {
            ui.spinner();
        }
        ReportResult::Error(message) => {
            ui.colored_label(COLOR_ERROR, message);
        }
        ReportResult::Loaded(rows) => {
            let entries: Vec<(String, f64)> = rows
                .iter()
                .map(|row| (row.wallet.clone(), row.total_out))
                .collect();
            labeled_bar_chart(ui, "top_users", &entries);
        }
        ReportResult::Idle => {
            ui.weak("Pick a date range and press Apply.");
        }
    }

    ui.add_space(12.0);

    ui.strong("Daily transaction volume");
    match state.reports.volume.result() {
        ReportResult::Loading => {
            ui.spinner();
        }
        ReportResult::Error(message) => {
            ui.colored_label(COLOR_ERROR, message);
        }
        ReportResult::Loaded(report) => {
            if report.truncated {
                ui.colored_label(
                    COLOR_WARNING,
                    format!(
                        "Showing the first {} transactions of the range; the chart undercounts.",
                        report.rows_seen
                    ),
                );
            }
            volume_chart(ui, "daily_volume", &report.buckets);
        }
        ReportResult::Idle => {
            ui.weak("Pick a date range and press Apply.");
        }
    }
}

/// Parses the date inputs and kicks off all three report fetches.
fn run_reports(state: &mut AppState) {
    let Some(token) = state.login.token().map(str::to_owned) else {
        return;
    };

    let from = parse_date(&state.reports.date_from_input);
    let to = parse_date(&state.reports.date_to_input);
    let (Some(from), Some(to)) = (from, to) else {
        state.reports.range_error = Some("Dates must be YYYY-MM-DD.".to_owned());
        return;
    };
    if from > to {
        state.reports.range_error = Some("The start date must not be after the end date.".to_owned());
        return;
    }
    state.reports.range_error = None;

    let client = &state.client;
    let fetcher = state.fetcher.as_ref();
    state
        .reports
        .top_transactions
        .fetch(client, fetcher, &token, from, to);
    state
        .reports
        .top_users
        .fetch(client, fetcher, &token, from, to);
    state.reports.volume.start(client, fetcher, &token, from, to);
}

fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").ok()
}
