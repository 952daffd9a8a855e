use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shop_agent::dashboard::{DashboardState, SYNC_FAILED};
use shop_agent::widget::{WidgetState, FAILURE_REPLY};
use shop_agent::{BackendClient, BackendError, ChatRequest, SyncRequest};

fn sync_request() -> SyncRequest {
    SyncRequest {
        shop_url: "my-shop.myshopify.com".to_string(),
        api_token: "shpat_abc".to_string(),
    }
}

#[tokio::test]
async fn sync_posts_shop_url_and_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sync"))
        .and(body_json(json!({
            "shop_url": "my-shop.myshopify.com",
            "api_token": "shpat_abc"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "products_indexed": 42 })))
        .expect(1)
        .mount(&server)
        .await;

    let client = BackendClient::new(&server.uri());
    let report = client.sync(&sync_request()).await.unwrap();
    assert_eq!(report.products_indexed, Some(42));
}

#[tokio::test]
async fn sync_accepts_empty_success_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sync"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = BackendClient::new(&server.uri());
    let report = client.sync(&sync_request()).await.unwrap();
    assert_eq!(report.products_indexed, None);
}

#[tokio::test]
async fn non_2xx_sync_shows_fixed_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sync"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
        .mount(&server)
        .await;

    let client = BackendClient::new(&server.uri());
    let mut dashboard = DashboardState::new(None);
    let request = dashboard.begin_sync();
    let result = client.sync(&request).await;

    assert!(matches!(result, Err(BackendError::Status(s)) if s.as_u16() == 401));
    dashboard.finish_sync(result);
    assert_eq!(dashboard.status, SYNC_FAILED);
}

#[tokio::test]
async fn chat_reply_with_products_drives_carousel() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({ "message": "hoodies?" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "Found these products",
            "products": [
                { "id": "gid://shopify/Product/123", "title": "Cool T-Shirt", "price": "29.99" },
                { "id": "gid://shopify/Product/456", "title": "Awesome Hoodie", "price": 59.99 },
                { "id": "gid://shopify/Product/789", "title": "Beanie", "handle": "beanie" }
            ]
        })))
        .mount(&server)
        .await;

    let client = BackendClient::new(&server.uri());
    let mut widget = WidgetState::new();
    for c in "hoodies?".chars() {
        widget.input.insert(c);
    }
    let request = widget.begin_send().unwrap();
    let reply = client.chat(&request).await.unwrap();
    widget.receive_reply(reply);

    let msg = widget.messages.last().unwrap();
    assert_eq!(msg.text, "Found these products");
    assert_eq!(msg.products.len(), 3);

    let id = msg.id;
    let mut titles = Vec::new();
    for _ in 0..3 {
        titles.push(widget.current_product(id).unwrap().title.clone());
        widget.carousel_next(id);
    }
    assert_eq!(titles, ["Cool T-Shirt", "Awesome Hoodie", "Beanie"]);
    assert_eq!(widget.carousel_index(id), Some(0));
}

#[tokio::test]
async fn chat_sends_optional_context_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({
            "message": "add it",
            "cart_id": "cart-1",
            "shop_domain": "my-shop.myshopify.com"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "Added" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = BackendClient::new(&server.uri());
    let mut request = ChatRequest::new("add it");
    request.cart_id = Some("cart-1".into());
    request.shop_domain = Some("my-shop.myshopify.com".into());

    let reply = client.chat(&request).await.unwrap();
    assert_eq!(reply.response, "Added");
    assert!(reply.products.is_empty());
}

#[tokio::test]
async fn chat_failures_collapse_to_one_apology() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "detail": "boom" })))
        .mount(&server)
        .await;

    let client = BackendClient::new(&server.uri());
    let mut widget = WidgetState::new();
    widget.input.insert('x');
    let request = widget.begin_send().unwrap();

    match client.chat(&request).await {
        Ok(_) => panic!("expected failure"),
        Err(BackendError::Status(_)) => widget.receive_failure(),
        Err(other) => panic!("unexpected error: {other}"),
    }

    assert!(!widget.loading);
    assert_eq!(widget.messages.last().unwrap().text, FAILURE_REPLY);
}

#[tokio::test]
async fn malformed_chat_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = BackendClient::new(&server.uri());
    let result = client.chat(&ChatRequest::new("hi")).await;
    assert!(matches!(result, Err(BackendError::Decode(_))));
}

#[tokio::test]
async fn unreachable_backend_is_a_request_error() {
    // Nothing listens on the discard port
    let client = BackendClient::new("http://127.0.0.1:9");
    let result = client.chat(&ChatRequest::new("hi")).await;
    assert!(matches!(result, Err(BackendError::Request(_))));
}
