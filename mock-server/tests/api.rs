use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with_journal, Journal, RecordedRequest, StatusBody};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder().method(method).uri(uri).body(String::new()).unwrap()
}

// --- status ---

#[tokio::test]
async fn status_route_replies_with_requested_code() {
    let resp = app().oneshot(empty_request("GET", "/status/201")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: StatusBody = body_json(resp).await;
    assert_eq!(body.status, 201);
}

#[tokio::test]
async fn status_route_accepts_any_method() {
    for method in ["POST", "PUT", "PATCH", "DELETE"] {
        let resp = app().oneshot(empty_request(method, "/status/503")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE, "{method}");
    }
}

#[tokio::test]
async fn status_route_rejects_out_of_range_code() {
    let resp = app().oneshot(empty_request("GET", "/status/42")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_route_rejects_non_numeric_code() {
    let resp = app().oneshot(empty_request("GET", "/status/ok")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- echo ---

#[tokio::test]
async fn echo_returns_method_headers_and_body() {
    let req = Request::builder()
        .method("POST")
        .uri("/echo")
        .header(http::header::CONTENT_TYPE, "text/plain")
        .header("x-trace", "abc")
        .body("ping".to_string())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echoed: RecordedRequest = body_json(resp).await;
    assert_eq!(echoed.method, "POST");
    assert_eq!(echoed.path, "/echo");
    assert_eq!(echoed.body, "ping");
    assert!(echoed.headers.contains(&("x-trace".to_string(), "abc".to_string())));
}

// --- journal ---

#[tokio::test]
async fn journal_records_status_and_echo_calls() {
    let journal = Journal::default();

    app_with_journal(journal.clone())
        .oneshot(empty_request("DELETE", "/status/204"))
        .await
        .unwrap();
    let resp = app_with_journal(journal.clone())
        .oneshot(empty_request("GET", "/echo"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let recorded = journal.read().await;
    assert_eq!(recorded.len(), 2);
    assert_eq!(recorded[0].method, "DELETE");
    assert_eq!(recorded[0].path, "/status/204");
    assert_eq!(recorded[1].path, "/echo");
}

#[tokio::test]
async fn requests_route_lists_journal_without_recording_itself() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/requests"))
        .await
        .unwrap();
    let listed: Vec<RecordedRequest> = body_json(resp).await;
    assert!(listed.is_empty());

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("PUT", "/status/500"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_bytes(resp).await;
    assert_eq!(&body[..], br#"{"status":500}"#);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/requests"))
        .await
        .unwrap();
    let listed: Vec<RecordedRequest> = body_json(resp).await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].method, "PUT");
}
