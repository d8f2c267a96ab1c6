//! Integration tests for farmer sign-in and the dashboard.

use axum::http::StatusCode;
use farmstand_integration_tests::TestClient;

#[tokio::test]
async fn test_sign_in_redirects_to_dashboard() {
    let mut client = TestClient::new();

    let response = client.get("/farmer/sign-in").await;
    assert_eq!(response.status, StatusCode::OK);

    let response = client
        .post_form(
            "/farmer/sign-in",
            &[("email", "grower@example.com"), ("password", "anything")],
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/dashboard"));

    let response = client.get("/dashboard").await;
    assert!(response.body.contains("Signed in as grower@example.com"));
}

#[tokio::test]
async fn test_sign_in_requires_both_fields() {
    let mut client = TestClient::new();
    let response = client
        .post_form("/farmer/sign-in", &[("email", "grower@example.com"), ("password", "")])
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_sign_out_forgets_farmer() {
    let mut client = TestClient::new();
    client
        .post_form(
            "/farmer/sign-in",
            &[("email", "grower@example.com"), ("password", "x")],
        )
        .await;

    let response = client.post_form("/farmer/sign-out", &[]).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);

    let response = client.get("/dashboard").await;
    assert!(response.body.contains("Demo account"));
}

#[tokio::test]
async fn test_dashboard_tabs() {
    let mut client = TestClient::new();

    let response = client.get("/dashboard").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.shows("Today's Sales"));
    assert!(response.body.contains("Low stock alert: Fresh Eggs"));

    let response = client.get("/dashboard?tab=orders").await;
    assert!(response.body.contains("Coming soon"));
    assert!(!response.body.contains("Recent Activity"));

    let response = client.get("/dashboard?tab=barn").await;
    assert!(response.body.contains("Recent Activity"));
}
