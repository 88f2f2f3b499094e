use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    routing::{any, get},
    Json, Router,
};
use log::debug;
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// One request as the server saw it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecordedRequest {
    pub id: Uuid,
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusBody {
    pub status: u16,
}

pub type Journal = Arc<RwLock<Vec<RecordedRequest>>>;

pub fn app() -> Router {
    app_with_journal(Journal::default())
}

/// Build the router around a caller-supplied journal so tests can inspect
/// what reached the server without another HTTP round-trip.
pub fn app_with_journal(journal: Journal) -> Router {
    Router::new()
        .route("/status/{code}", any(status))
        .route("/echo", any(echo))
        .route("/requests", get(list_requests))
        .with_state(journal)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, app()).await
}

pub async fn serve(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app).await
}

async fn record(journal: &Journal, method: &Method, uri: &Uri, headers: &HeaderMap, body: &Bytes) -> RecordedRequest {
    let recorded = RecordedRequest {
        id: Uuid::new_v4(),
        method: method.to_string(),
        path: uri.path().to_string(),
        headers: headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect(),
        body: String::from_utf8_lossy(body).into_owned(),
    };
    debug!("{} {}", recorded.method, recorded.path);
    journal.write().await.push(recorded.clone());
    recorded
}

async fn status(
    State(journal): State<Journal>,
    Path(code): Path<u16>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<StatusBody>), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    record(&journal, &method, &uri, &headers, &body).await;
    Ok((status, Json(StatusBody { status: code })))
}

async fn echo(
    State(journal): State<Journal>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Json<RecordedRequest> {
    Json(record(&journal, &method, &uri, &headers, &body).await)
}

async fn list_requests(State(journal): State<Journal>) -> Json<Vec<RecordedRequest>> {
    Json(journal.read().await.clone())
}
