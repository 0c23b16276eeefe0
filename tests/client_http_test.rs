#![cfg(feature = "http")]

use chrono::{TimeDelta, Utc};
use chrono_tz::Europe::Copenhagen;
use energidataservice::api::{EnergiDataServiceClient, SpotPriceSource};
use mockito::{Matcher, Server};
use serde_json::json;
use std::time::Duration;

fn rows_for_today(hours: u32) -> serde_json::Value {
    let date = Utc::now().format("%Y-%m-%d").to_string();
    let rows: Vec<_> = (0..hours)
        .map(|h| {
            json!({
                "HourUTC": format!("{}T{:02}:00:00", date, h),
                "SpotPriceEUR": 10.0 + f64::from(h),
            })
        })
        .collect();
    json!({ "data": { "elspotprices": rows } })
}

fn client(server: &Server) -> EnergiDataServiceClient {
    EnergiDataServiceClient::with_endpoint(
        "DK1",
        Copenhagen,
        &server.url(),
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn fetches_and_splits_prices() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Regex(r#"PriceArea: \{_eq: \\"DK1\\"\}"#.to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(rows_for_today(24).to_string())
        .create_async()
        .await;

    let c = client(&server);
    c.update().await.unwrap();
    mock.assert_async().await;

    assert_eq!(c.raw_data().len(), 24);
    assert_eq!(c.today().len(), 24);
    assert!(c.tomorrow().is_empty());
    assert!(!c.tomorrow_valid());
    assert_eq!(c.source(), "energidataservice");
}

#[tokio::test]
async fn null_prices_are_skipped() {
    let mut server = Server::new_async().await;
    let date = Utc::now().format("%Y-%m-%d").to_string();
    let body = json!({ "data": { "elspotprices": [
        {"HourUTC": format!("{}T00:00:00", date), "SpotPriceEUR": null},
        {"HourUTC": format!("{}T01:00:00", date), "SpotPriceEUR": 42.5},
    ]}});
    let _mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_body(body.to_string())
        .create_async()
        .await;

    let c = client(&server);
    c.update().await.unwrap();
    let today = c.today();
    assert_eq!(today.len(), 1);
    assert_eq!(today[0].value, 42.5);
}

#[tokio::test]
async fn bad_request_clears_cached_rows() {
    let mut server = Server::new_async().await;
    let ok = server
        .mock("POST", "/")
        .with_status(200)
        .with_body(rows_for_today(24).to_string())
        .create_async()
        .await;

    let c = client(&server);
    c.update().await.unwrap();
    assert_eq!(c.raw_data().len(), 24);
    ok.remove_async().await;

    let bad = server
        .mock("POST", "/")
        .with_status(400)
        .create_async()
        .await;
    assert!(c.update().await.is_err());
    bad.assert_async().await;
    assert!(c.raw_data().is_empty());
    assert!(c.today().is_empty());
}

#[tokio::test]
async fn server_error_keeps_cached_rows() {
    let mut server = Server::new_async().await;
    let ok = server
        .mock("POST", "/")
        .with_status(200)
        .with_body(rows_for_today(3).to_string())
        .create_async()
        .await;

    let c = client(&server);
    c.update().await.unwrap();
    ok.remove_async().await;

    let _err = server
        .mock("POST", "/")
        .with_status(500)
        .create_async()
        .await;
    assert!(c.update().await.is_err());
    assert_eq!(c.raw_data().len(), 3);
}

#[tokio::test]
async fn next_refresh_is_reported() {
    let server = Server::new_async().await;
    let c = client(&server);
    assert!(c.next_data_refresh().is_none());
    let at = Utc::now() + TimeDelta::hours(1);
    c.set_next_data_refresh(Some(at));
    assert_eq!(c.next_data_refresh(), Some(at));
}
