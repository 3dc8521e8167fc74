//! Render strategy against a stand-in rendering service.

use pagefetch_core::{FetchRequest, FetcherType};
use pagefetch_fetch::{
    Cookie, ErrorKind, FetchError, FetchSettings, Fetcher, RenderError, RenderFetcher, RenderHooks,
};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE: &str = "https://shop.example.com/cart";

fn fetcher(server: &MockServer) -> RenderFetcher {
    RenderFetcher::new(&FetchSettings::default().with_render_endpoint(server.uri())).unwrap()
}

fn render_request(url: &str) -> FetchRequest {
    FetchRequest::new(url).with_fetcher_type(FetcherType::Render)
}

fn rendered(status: u16, cookies: Value, headers: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "url": PAGE,
        "http_status": status,
        "html": "<html><body>cart</body></html>",
        "cookies": cookies,
        "headers": headers,
    }))
}

async fn service_calls(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[tokio::test]
async fn test_render_page() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/render.json"))
        .respond_with(rendered(
            200,
            json!([{"name": "cart", "value": "42", "domain": "shop.example.com"}]),
            json!([{"name": "Cache-Control", "value": "max-age=300"}]),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher(&server);
    let response = fetcher.response(&render_request(PAGE)).await.unwrap();

    assert_eq!(response.url(), PAGE);
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.body().text(), "<html><body>cart</body></html>");
    assert!(response.is_cacheable());
    assert!(response.expires().is_some());

    let cookies = fetcher.cookie_jar().all();
    assert_eq!(cookies.len(), 1);
    assert_eq!(cookies[0].name, "cart");
    assert_eq!(cookies[0].value, "42");

    let calls = service_calls(&server).await;
    assert_eq!(calls[0]["url"], PAGE);
    assert_eq!(calls[0]["http_method"], "GET");
    assert_eq!(calls[0]["cookies"], json!([]));
    assert!(calls[0].get("body").is_none());
}

#[tokio::test]
async fn test_jar_cookies_sent_to_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/render.json"))
        .respond_with(rendered(200, json!([]), json!([])))
        .mount(&server)
        .await;

    let fetcher = fetcher(&server);
    let jar = fetcher.cookie_jar();
    jar.merge(
        &url::Url::parse(PAGE).unwrap(),
        &[Cookie::new("sid", "abc")],
    );
    jar.merge(
        &url::Url::parse("https://other.example.org/").unwrap(),
        &[Cookie::new("foreign", "1")],
    );

    fetcher.response(&render_request(PAGE)).await.unwrap();

    let calls = service_calls(&server).await;
    let sent = calls[0]["cookies"].as_array().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["name"], "sid");
    assert_eq!(sent[0]["value"], "abc");
}

#[tokio::test]
async fn test_host_only_cookie_not_sent_to_subdomain() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/render.json"))
        .respond_with(rendered(200, json!([]), json!([])))
        .mount(&server)
        .await;

    let fetcher = fetcher(&server);
    let mut wide = Cookie::new("wide", "1");
    wide.domain = ".example.com".to_string();
    fetcher.cookie_jar().merge(
        &url::Url::parse("https://example.com/").unwrap(),
        &[Cookie::new("narrow", "1"), wide],
    );

    fetcher.response(&render_request(PAGE)).await.unwrap();

    let calls = service_calls(&server).await;
    let sent = calls[0]["cookies"].as_array().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["name"], "wide");
}

#[tokio::test]
async fn test_cookies_carry_over_between_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/render.json"))
        .respond_with(rendered(
            200,
            json!([{"name": "sid", "value": "s-1", "domain": "shop.example.com"}]),
            json!([]),
        ))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/render.json"))
        .respond_with(rendered(200, json!([]), json!([])))
        .mount(&server)
        .await;

    let fetcher = fetcher(&server);
    fetcher.response(&render_request(PAGE)).await.unwrap();
    fetcher.response(&render_request(PAGE)).await.unwrap();

    let calls = service_calls(&server).await;
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0]["cookies"], json!([]));
    let sent = calls[1]["cookies"].as_array().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["name"], "sid");
    assert_eq!(sent[0]["value"], "s-1");
}

#[tokio::test]
async fn test_plain_request_renders() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/render.json"))
        .respond_with(rendered(200, json!([]), json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let response = fetcher(&server)
        .response(&FetchRequest::new(PAGE))
        .await
        .unwrap();
    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_form_and_token_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/render.json"))
        .respond_with(rendered(200, json!([]), json!([])))
        .mount(&server)
        .await;

    let req = render_request(PAGE)
        .with_form_data("item=7&qty=2")
        .with_user_token("tenant-9");
    let response = fetcher(&server).response(&req).await.unwrap();
    assert!(!response.is_cacheable());

    let calls = service_calls(&server).await;
    assert_eq!(calls[0]["http_method"], "POST");
    assert_eq!(calls[0]["body"], "item=7&qty=2");
    assert_eq!(calls[0]["user_token"], "tenant-9");
}

#[tokio::test]
async fn test_page_status_classified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/render.json"))
        .respond_with(rendered(
            404,
            json!([{"name": "seen", "value": "1", "domain": "shop.example.com"}]),
            json!([]),
        ))
        .mount(&server)
        .await;

    let fetcher = fetcher(&server);
    let err = fetcher.response(&render_request(PAGE)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.url(), Some(PAGE));
    // cookies set while rendering are kept even when the page failed
    assert_eq!(fetcher.cookie_jar().len(), 1);
}

#[tokio::test]
async fn test_service_failure_not_reclassified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/render.json"))
        .respond_with(ResponseTemplate::new(500).set_body_string("browser crashed"))
        .mount(&server)
        .await;

    let err = fetcher(&server)
        .response(&render_request(PAGE))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Render);
    assert_eq!(err.status(), Some(500));
    match err {
        FetchError::Render(RenderError::Service { message, .. }) => {
            assert_eq!(message, "browser crashed");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_undecodable_service_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/render.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = fetcher(&server)
        .response(&render_request(PAGE))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Render(RenderError::Decode(_))));
}

#[tokio::test]
async fn test_prepare_request_hook_edits_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/render.json"))
        .respond_with(rendered(200, json!([]), json!([])))
        .mount(&server)
        .await;

    let settings = FetchSettings::default().with_render_endpoint(server.uri());
    let hooks = RenderHooks::new().prepare_request(|call| {
        call.wait = 2.0;
        Ok(())
    });
    let fetcher = RenderFetcher::with_hooks(&settings, hooks).unwrap();
    fetcher.response(&render_request(PAGE)).await.unwrap();

    let calls = service_calls(&server).await;
    assert_eq!(calls[0]["wait"], 2.0);
}

#[tokio::test]
async fn test_malformed_url_never_calls_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rendered(200, json!([]), json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let err = fetcher(&server)
        .response(&render_request("shop.example.com/cart"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadRequest);
}
