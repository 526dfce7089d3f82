//! Integration tests driving the table controller through the real HTTP
//! stack against a wiremock server.

use std::time::Duration;

use chrono::Utc;
use walletboard_business::{
    ApiClient, EhttpFetcher, FilterDef, SortDirection, TableController, Transaction,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn page_body() -> &'static str {
    r#"{
        "data": [
            {"id": 1, "created_at": "2026-02-01T08:00:00Z", "wallet": "alice",
             "counterparty": "bob", "direction": "out", "amount": 12.5, "status": "settled"},
            {"id": 2, "created_at": "2026-02-02T09:30:00Z", "wallet": "carol",
             "counterparty": "dan", "direction": "in", "amount": 3.0, "status": "pending"}
        ],
        "recordsTotal": 57,
        "recordsFiltered": 0
    }"#
}

/// Pumps the controller until the in-flight fetch settles.
async fn settle(
    table: &mut TableController<Transaction>,
    client: &ApiClient,
    fetcher: &EhttpFetcher,
) {
    for _ in 0..250 {
        table.process(Utc::now(), client, fetcher, Some("token"));
        if !table.is_loading() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("fetch did not settle in time");
}

#[tokio::test(flavor = "multi_thread")]
async fn controller_round_trips_against_a_live_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/transactions"))
        .and(header("authorization", "Bearer token"))
        .and(query_param("draw", "1"))
        .and(query_param("start", "0"))
        .and(query_param("length", "10"))
        .and(query_param("order[0][column]", "1"))
        .and(query_param("order[0][dir]", "desc"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(page_body(), "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(format!("{}/api", server.uri()));
    let fetcher = EhttpFetcher;
    let mut table: TableController<Transaction> = TableController::new("/transactions", Vec::new())
        .with_sort(1, SortDirection::Desc);

    settle(&mut table, &client, &fetcher).await;

    assert_eq!(table.rows().len(), 2);
    assert_eq!(table.rows()[0].wallet, "alice");
    // recordsFiltered of 0 falls back to recordsTotal for display math.
    assert_eq!(table.summary().total_for_display, 57);
    assert_eq!(table.summary().total_pages, 6);
    assert_eq!(table.summary().current_from, 1);
    assert_eq!(table.summary().current_to, 10);
}

#[tokio::test(flavor = "multi_thread")]
async fn filters_and_search_reach_the_wire() {
    let server = MockServer::start().await;
    // Mocks match in mount order: the filtered request first, then the
    // catch-all for the initial page load.
    Mock::given(method("GET"))
        .and(path("/api/transactions"))
        .and(query_param("search[value]", "latte"))
        .and(query_param("wallet", "alice"))
        .and(query_param("draw", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(page_body(), "application/json"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/transactions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(page_body(), "application/json"))
        .mount(&server)
        .await;

    let client = ApiClient::new(format!("{}/api", server.uri()));
    let fetcher = EhttpFetcher;
    let mut table: TableController<Transaction> = TableController::new(
        "/transactions",
        vec![FilterDef::text("wallet", "Wallet")],
    );

    settle(&mut table, &client, &fetcher).await;

    table.set_filter(ustr::Ustr::from("wallet"), "alice");
    table.set_search_input("latte", Utc::now());
    settle(&mut table, &client, &fetcher).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn server_failure_surfaces_as_an_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/transactions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = ApiClient::new(format!("{}/api", server.uri()));
    let fetcher = EhttpFetcher;
    let mut table: TableController<Transaction> =
        TableController::new("/transactions", Vec::new());

    settle(&mut table, &client, &fetcher).await;

    assert!(table.error().is_some());
    assert!(table.rows().is_empty());
}
