mod common;

use axum::http::{HeaderValue, StatusCode, header};

async fn shorten(ctx: &common::TestContext, url: &str) -> String {
    ctx.state
        .shortener_service
        .shorten(url, None)
        .await
        .unwrap()
        .short_code
}

#[tokio::test]
async fn test_redirect_success() {
    let mut ctx = common::create_test_state();
    let code = shorten(&ctx, "https://example.com/target").await;
    let server = common::create_test_server(ctx.state.clone());

    let response = server
        .get(&format!("/{code}"))
        .add_header(header::USER_AGENT, HeaderValue::from_static("test-agent/1.0"))
        .await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(
        response.header(header::LOCATION),
        "https://example.com/target"
    );

    let event = ctx.access_rx.try_recv().unwrap();
    assert_eq!(event.url_id, 1);
    assert_eq!(event.short_code, code);
    assert_eq!(event.ip_address.as_deref(), Some("203.0.113.7"));
    assert_eq!(event.user_agent.as_deref(), Some("test-agent/1.0"));
}

#[tokio::test]
async fn test_redirect_records_one_event_per_request() {
    let mut ctx = common::create_test_state();
    let code = shorten(&ctx, "https://example.com").await;
    let server = common::create_test_server(ctx.state.clone());

    for _ in 0..3 {
        server
            .get(&format!("/{code}"))
            .await
            .assert_status(StatusCode::FOUND);
    }

    let mut events = 0;
    while ctx.access_rx.try_recv().is_ok() {
        events += 1;
    }
    assert_eq!(events, 3);
}

#[tokio::test]
async fn test_redirect_unknown_code() {
    let mut ctx = common::create_test_state();
    let server = common::create_test_server(ctx.state.clone());

    let response = server.get("/Zz9Zz9").await;

    response.assert_status_not_found();
    assert_eq!(response.json::<serde_json::Value>()["error"]["code"], "not_found");
    assert!(ctx.access_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_redirect_malformed_code() {
    let ctx = common::create_test_state();
    let server = common::create_test_server(ctx.state.clone());

    server.get("/abc").await.assert_status_not_found();
    server.get("/abc-12").await.assert_status_not_found();
    server.get("/abcdefg").await.assert_status_not_found();
}

#[tokio::test]
async fn test_redirect_deleted_code() {
    let mut ctx = common::create_test_state();
    let created = ctx
        .state
        .shortener_service
        .shorten("https://example.com", Some(1))
        .await
        .unwrap();
    ctx.state
        .shortener_service
        .delete_for_owner(1, 1)
        .await
        .unwrap();
    let server = common::create_test_server(ctx.state.clone());

    let response = server.get(&format!("/{}", created.short_code)).await;

    response.assert_status_not_found();
    assert!(ctx.access_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_redirect_ignores_forwarded_for_without_proxy() {
    let mut ctx = common::create_test_state();
    let code = shorten(&ctx, "https://example.com").await;
    let server = common::create_test_server(ctx.state.clone());

    server
        .get(&format!("/{code}"))
        .add_header(
            header::HeaderName::from_static("x-forwarded-for"),
            HeaderValue::from_static("198.51.100.1"),
        )
        .await
        .assert_status(StatusCode::FOUND);

    let event = ctx.access_rx.try_recv().unwrap();
    assert_eq!(event.ip_address.as_deref(), Some("203.0.113.7"));
}

#[tokio::test]
async fn test_redirect_uses_forwarded_for_behind_proxy() {
    let mut ctx = common::create_test_state();
    let code = shorten(&ctx, "https://example.com").await;
    let mut state = ctx.state.clone();
    state.behind_proxy = true;
    let server = common::create_test_server(state);

    server
        .get(&format!("/{code}"))
        .add_header(
            header::HeaderName::from_static("x-forwarded-for"),
            HeaderValue::from_static("198.51.100.1, 10.0.0.1"),
        )
        .await
        .assert_status(StatusCode::FOUND);

    let event = ctx.access_rx.try_recv().unwrap();
    assert_eq!(event.ip_address.as_deref(), Some("198.51.100.1"));
}
