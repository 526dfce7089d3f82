//! Harness tests for the login page.

use std::sync::Arc;

use egui_kittest::Harness;
use kittest::Queryable;
use walletboard_business::fetch_service::{MockFetcher, json_response};
use walletboard_business::{BusinessConfig, UnauthorizedObserver};
use walletboard_ui::pages::login_page;
use walletboard_ui::state::AppState;

fn test_state(fetcher: Arc<MockFetcher>) -> AppState {
    AppState::new(BusinessConfig::new("http://api.test"), fetcher)
}

fn success_body() -> &'static str {
    r#"{
        "token": "jwt-token",
        "user": {"id": 1, "name": "Ada", "email": "ada@example.com", "role": "admin"}
    }"#
}

#[test]
fn login_form_is_displayed() {
    let state = test_state(Arc::new(MockFetcher::new()));

    let harness = Harness::new_ui_state(
        |ui, state| {
            login_page(state, ui);
        },
        state,
    );

    assert!(
        harness.query_by_label_contains("Walletboard").is_some(),
        "app heading should be displayed"
    );
    assert!(
        harness.query_by_label_contains("Email").is_some(),
        "email label should be displayed"
    );
    assert!(
        harness.query_by_label_contains("Password").is_some(),
        "password label should be displayed"
    );
    assert!(
        harness.query_by_label_contains("Sign in").is_some(),
        "sign-in button should be displayed"
    );
}

#[test]
fn sign_in_click_authenticates_through_the_flow() {
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.push_response(json_response(200, success_body()));

    let mut state = test_state(fetcher);
    state.email_input = "ada@example.com".to_owned();
    state.password_input = "hunter2".to_owned();

    let mut harness = Harness::new_ui_state(
        |ui, state| {
            login_page(state, ui);
        },
        state,
    );
    harness.step();

    if let Some(button) = harness.query_by_label_contains("Sign in") {
        button.click();
    }
    harness.step();

    // The mock answers synchronously; applying the outcome is the app
    // loop's job, done here by hand.
    harness.state_mut().login.poll();

    assert!(
        harness.state_mut().login.status().is_authenticated(),
        "clicking sign-in with a 200 response should authenticate"
    );
}

#[test]
fn rejected_login_shows_the_server_message() {
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.push_response(json_response(401, r#"{"message": "Account locked"}"#));

    let mut state = test_state(fetcher);
    state.email_input = "ada@example.com".to_owned();
    state.password_input = "wrong".to_owned();

    let mut harness = Harness::new_ui_state(
        |ui, state| {
            state.login.poll();
            login_page(state, ui);
        },
        state,
    );
    harness.step();

    if let Some(button) = harness.query_by_label_contains("Sign in") {
        button.click();
    }
    harness.step();
    harness.step();

    assert!(
        harness.query_by_label_contains("Account locked").is_some(),
        "the backend's rejection message should be rendered"
    );
}

#[test]
fn session_expired_flag_surfaces_on_the_login_page() {
    let state = test_state(Arc::new(MockFetcher::new()));
    // What the transport does when a 401 arrives.
    state.session_expired.on_unauthorized();

    let mut harness = Harness::new_ui_state(
        |ui, state| {
            if state.session_expired.take() {
                state.login.expire();
            }
            login_page(state, ui);
        },
        state,
    );
    harness.step();

    assert!(
        harness
            .query_by_label_contains("session has expired")
            .is_some(),
        "the session-expired notice should be rendered"
    );
}
