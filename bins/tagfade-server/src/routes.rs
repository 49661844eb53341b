//! Axum router and HTTP handlers.
//!
//! Readers call `GET /nfc?uid=<tag>&reader=<id>` on every change of their
//! field; `uid=none` means the field went empty.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use tagfade_core::constants::DEFAULT_READER;
use tagfade_core::{FadeScope, TagEvent};

use crate::AppState;

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/nfc", get(nfc))
        .route("/api/status", get(api_status))
        .route("/healthz", get(|| async { "OK" }))
        .with_state(state)
        .layer(cors)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct NfcQuery {
    uid: Option<String>,
    reader: Option<String>,
}

/// `GET /nfc` — one reader event.
async fn nfc(State(state): State<AppState>, Query(query): Query<NfcQuery>) -> impl IntoResponse {
    let Some(uid) = query.uid else {
        return (StatusCode::BAD_REQUEST, "missing uid");
    };
    let reader = query
        .reader
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_READER.to_string());

    info!(%uid, %reader, "Reader event");
    state.dispatcher.handle_event(&TagEvent::from_raw(reader.trim(), &uid));
    (StatusCode::OK, "OK")
}

/// `GET /api/status` — configured readers, active tags per reader and every
/// fade's values.
async fn api_status(State(state): State<AppState>) -> impl IntoResponse {
    let dispatcher = &state.dispatcher;

    let fades: Vec<_> = dispatcher
        .fades()
        .snapshot()
        .into_iter()
        .map(|(key, fade)| {
            json!({
                "reader": key.reader,
                "tag": key.tag,
                "current": fade.current,
                "target": fade.target,
            })
        })
        .collect();

    let scope = match dispatcher.scope() {
        FadeScope::PerReader => "per_reader",
        FadeScope::SharedTag => "shared_tag",
    };

    Json(json!({
        "configured_readers": dispatcher.lookup().readers(),
        "readers": dispatcher.presence().snapshot(),
        "fades": fades,
        "scope": scope,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    use tagfade_core::sink::RecordingSink;
    use tagfade_core::{EventDispatcher, StaticLookup};

    const TAG: &str = "04:94:6a:5a:a3:11:90";

    fn state() -> (AppState, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let dispatcher = EventDispatcher::new(Arc::new(StaticLookup::default_table()), sink.clone());
        (
            AppState {
                dispatcher: Arc::new(dispatcher),
            },
            sink,
        )
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn nfc_registers_tag_on_default_reader() {
        let (state, sink) = state();
        let (status, body) = get(router(state.clone()), &format!("/nfc?uid={TAG}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
        assert!(state.dispatcher.presence().is_active(&"1".into(), &TAG.into()));

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(sink.last_value(21), Some(127));
    }

    #[tokio::test(start_paused = true)]
    async fn nfc_none_clears_reader() {
        let (state, _sink) = state();
        get(router(state.clone()), &format!("/nfc?uid={TAG}&reader=2")).await;
        let (status, _) = get(router(state.clone()), "/nfc?uid=none&reader=2").await;
        assert_eq!(status, StatusCode::OK);
        assert!(state.dispatcher.presence().active_tags(&"2".into()).is_empty());
    }

    #[tokio::test]
    async fn nfc_unknown_tag_still_answers_ok() {
        let (state, sink) = state();
        let (status, body) = get(router(state), "/nfc?uid=ff:ff&reader=1").await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "OK"));
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn nfc_without_uid_is_bad_request() {
        let (state, _sink) = state();
        let (status, _) = get(router(state), "/nfc?reader=1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test(start_paused = true)]
    async fn status_reports_readers_and_fades() {
        let (state, _sink) = state();
        get(router(state.clone()), &format!("/nfc?uid={TAG}&reader=1")).await;
        tokio::time::sleep(Duration::from_secs(3)).await;

        let (status, body) = get(router(state), "/api/status").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["readers"]["1"][0], TAG);
        assert_eq!(json["fades"][0]["current"], 127);
        assert_eq!(json["fades"][0]["reader"], "1");
        assert_eq!(json["scope"], "per_reader");
        assert_eq!(json["configured_readers"], serde_json::json!(["1", "2"]));
    }

    #[tokio::test]
    async fn healthz() {
        let (state, _sink) = state();
        assert_eq!(get(router(state), "/healthz").await, (StatusCode::OK, "OK".to_string()));
    }
}
