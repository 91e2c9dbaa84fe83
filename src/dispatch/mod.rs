//! Same-origin action dispatcher.
//!
//! The widget never talks to the extraction API directly; it posts named
//! actions to this endpoint, which verifies the anti-forgery token,
//! re-validates input, proxies to the API and answers with the
//! `{success, data}` envelope the transport client expects. Keeping the
//! API base URL server-side is the point: the page only ever learns the
//! dispatch endpoint and its token.

pub mod upstream;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::core::config;
use crate::core::nonce;
use crate::core::validation::validate_tweet_url;
use crate::widget::transport::actions;
use upstream::ExtractorApi;

/// Form fields accepted by the dispatch endpoint. Unknown extras are
/// ignored, missing ones default so the handlers can answer with an
/// envelope instead of a 422.
#[derive(Debug, Deserialize)]
pub struct DispatchForm {
    #[serde(default)]
    action: String,
    #[serde(default)]
    nonce: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    quality: Option<String>,
    #[serde(default)]
    video_number: Option<u32>,
}

#[derive(Clone)]
struct DispatchState {
    api: Arc<ExtractorApi>,
    public_url: String,
}

/// Builds the dispatcher router. `public_url` is what the widget bootstrap
/// announces as the dispatch endpoint's base.
pub fn router(api: Arc<ExtractorApi>, public_url: impl Into<String>) -> Router {
    let state = DispatchState {
        api,
        public_url: public_url.into().trim_end_matches('/').to_string(),
    };
    Router::new()
        .route("/dispatch", post(dispatch_handler))
        .route("/widget/config", get(widget_config_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Start the dispatcher.
pub async fn serve(addr: SocketAddr, api: ExtractorApi, public_url: String) -> anyhow::Result<()> {
    let app = router(Arc::new(api), public_url);

    log::info!("Starting action dispatcher on http://{}", addr);
    log::info!("  POST /dispatch       - widget actions");
    log::info!("  GET  /widget/config  - widget bootstrap (endpoint + token)");
    log::info!("  GET  /health         - health check");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn success(data: Value) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

fn failure(message: &str) -> Json<Value> {
    Json(json!({ "success": false, "data": message }))
}

/// POST /dispatch — verifies the token, then routes by action name.
async fn dispatch_handler(State(state): State<DispatchState>, Form(form): Form<DispatchForm>) -> Response {
    if !nonce::verify(nonce::WIDGET_SCOPE, &form.nonce) {
        log::warn!("dispatch rejected: bad nonce for action {:?}", form.action);
        return (StatusCode::FORBIDDEN, failure("Invalid security token")).into_response();
    }

    match form.action.as_str() {
        actions::EXTRACT_VIDEO => extract_action(&state, form).await.into_response(),
        actions::DOWNLOAD_VIDEO => download_action(&state, form).await.into_response(),
        other => {
            log::warn!("dispatch rejected: unknown action {:?}", other);
            failure("Unknown action").into_response()
        }
    }
}

async fn extract_action(state: &DispatchState, form: DispatchForm) -> Json<Value> {
    let url = form.url.unwrap_or_default();
    let url = match validate_tweet_url(&url) {
        Ok(url) => url.to_string(),
        Err(err) => return failure(&err.to_string()),
    };

    log::info!("extract requested for {}", url);
    match state.api.extract(&url).await {
        // the upstream body becomes the envelope payload as-is; the widget
        // reads the fields it knows and ignores the rest
        Ok(body) => success(body),
        Err(err) => {
            log::warn!("extract failed for {}: {}", url, err);
            failure(&err.to_string())
        }
    }
}

async fn download_action(state: &DispatchState, form: DispatchForm) -> Json<Value> {
    let url = form.url.unwrap_or_default();
    if url.trim().is_empty() {
        return failure("Invalid request");
    }
    let quality = form.quality.filter(|q| !q.is_empty()).unwrap_or_else(|| "360p".to_string());
    let video_number = form.video_number.unwrap_or(1);

    log::info!("download requested: {} ({}, video {})", url, quality, video_number);
    let body = match state.api.download(url.trim(), &quality, video_number).await {
        Ok(body) => body,
        Err(err) => {
            log::warn!("download failed for {}: {}", url, err);
            return failure(&err.to_string());
        }
    };

    // the upstream envelope is not trusted: require the success flag and a
    // non-empty payload before forwarding anything to the widget
    if !body.get("success").and_then(Value::as_bool).unwrap_or(false) {
        return failure("Invalid response from download service");
    }
    let video_data = body.get("video_data").and_then(Value::as_str).unwrap_or("");
    if video_data.is_empty() {
        return failure("No video data received");
    }

    let filename = body
        .get("filename")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("twitter_video_{}.mp4", quality));
    let file_size = body.get("file_size").cloned().unwrap_or(Value::Null);

    success(json!({
        "video_data": video_data,
        "filename": filename,
        "file_size": file_size,
    }))
}

/// GET /widget/config — the bootstrap payload an embedding page inlines:
/// where to post actions and the token that must ride along. Issued fresh
/// per render.
async fn widget_config_handler(State(state): State<DispatchState>) -> Json<Value> {
    Json(json!({
        "dispatch_url": format!("{}/dispatch", state.public_url),
        "nonce": nonce::issue(nonce::WIDGET_SCOPE),
        "message_timeout_secs": config::ui::MESSAGE_DISMISS_SECS,
    }))
}

/// GET /health — simple health check.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
