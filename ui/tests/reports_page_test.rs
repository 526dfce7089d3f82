//! Harness tests for the reports page.

use std::sync::Arc;

use egui_kittest::Harness;
use kittest::Queryable;
use walletboard_business::BusinessConfig;
use walletboard_business::fetch_service::{MockFetcher, json_response};
use walletboard_ui::pages::reports_page;
use walletboard_ui::state::AppState;

fn signed_in_state(fetcher: Arc<MockFetcher>) -> AppState {
    let mut state = AppState::new(BusinessConfig::new("http://api.test"), fetcher);
    state.login.restore(
        serde_json::from_str(
            r#"{"id": 1, "name": "Ada", "email": "ada@example.com", "role": "admin"}"#,
        )
        .expect("valid profile"),
        "token".to_owned(),
    );
    state
}

#[test]
fn reports_page_shows_sections_and_idle_hints() {
    let state = signed_in_state(Arc::new(MockFetcher::new()));

    let harness = Harness::new_ui_state(
        |ui, state| {
            reports_page(state, ui);
        },
        state,
    );

    assert!(
        harness
            .query_by_label_contains("Top transactions per user")
            .is_some(),
        "top-transactions section should exist"
    );
    assert!(
        harness
            .query_by_label_contains("Top users by outbound value")
            .is_some(),
        "top-users section should exist"
    );
    assert!(
        harness
            .query_by_label_contains("Daily transaction volume")
            .is_some(),
        "volume section should exist"
    );
    assert!(
        harness
            .query_by_label_contains("Pick a date range")
            .is_some(),
        "idle hint should exist before the first fetch"
    );
}

#[test]
fn invalid_date_range_is_rejected_without_fetching() {
    let fetcher = Arc::new(MockFetcher::new());
    let mut state = signed_in_state(fetcher.clone());
    state.reports.date_from_input = "not-a-date".to_owned();

    let mut harness = Harness::new_ui_state(
        |ui, state| {
            reports_page(state, ui);
        },
        state,
    );
    harness.step();

    if let Some(button) = harness.query_by_label_contains("Apply") {
        button.click();
    }
    harness.step();

    assert!(
        harness
            .query_by_label_contains("Dates must be YYYY-MM-DD")
            .is_some(),
        "the parse error should be rendered"
    );
    assert!(
        fetcher.requests_seen().is_empty(),
        "no report request should be issued for an invalid range"
    );
}

#[test]
fn truncated_volume_reports_the_undercount() {
    let fetcher = Arc::new(MockFetcher::new());
    let mut state = signed_in_state(fetcher.clone());

    // Top reports answer empty; the volume window hits its cap with rows
    // remaining on the server.
    fetcher.push_response(json_response(200, "[]"));
    fetcher.push_response(json_response(200, "[]"));
    for _ in 0..walletboard_business::reports::VOLUME_MAX_PAGES {
        let rows: Vec<String> = (0..walletboard_business::reports::VOLUME_PAGE_SIZE)
            .map(|i| {
                format!(
                    r#"{{"id": {i}, "created_at": "2026-02-01T08:00:00Z", "wallet": "w",
                        "counterparty": "c", "direction": "in", "amount": 1.0,
                        "status": "settled"}}"#
                )
            })
            .collect();
        fetcher.push_response(json_response(
            200,
            &format!(r#"{{"data": [{}], "recordsTotal": 99999}}"#, rows.join(",")),
        ));
    }

    let mut harness = Harness::new_ui_state(
        |ui, state| {
            // The app loop's polling duties, inlined.
            state.reports.top_transactions.poll();
            state.reports.top_users.poll();
            let fetcher = state.fetcher.clone();
            state
                .reports
                .volume
                .poll(&state.client, fetcher.as_ref(), "token");
            reports_page(state, ui);
        },
        state,
    );
    harness.step();

    if let Some(button) = harness.query_by_label_contains("Apply") {
        button.click();
    }
    harness.step();
    harness.step();

    assert!(
        harness
            .query_by_label_contains("undercounts")
            .is_some(),
        "the truncation notice should be rendered"
    );
}
