//! Fake avatar CDN.
//!
//! | Route | Response |
//! |---|---|
//! | `/ok/:file` | 64x64 PNG, color derived from `file` |
//! | `/slow/:ms/:file` | same PNG after `ms` milliseconds |
//! | `/missing/*rest` | 404 |
//! | `/garbage/*rest` | 200 with a body that isn't an image |
//! | `/requests` | JSON list of every request seen so far |

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use image::{ImageFormat, Rgba, RgbaImage};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

pub const IMAGE_SIDE: u32 = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordedRequest {
    pub path: String,
    pub cache_control: Option<String>,
}

/// Requests seen by the host, shared between handlers and tests
#[derive(Debug, Clone, Default)]
pub struct HostState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl HostState {
    fn record(&self, uri: &Uri, headers: &HeaderMap) {
        let request = RecordedRequest {
            path: uri.path().to_string(),
            cache_control: headers
                .get(CACHE_CONTROL)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string),
        };
        debug!(path = %request.path, cache_control = ?request.cache_control, "Recorded request");

        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn hits(&self, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|request| request.path == path)
            .count()
    }
}

pub fn router(state: HostState) -> Router {
    Router::new()
        .route("/ok/:file", get(ok_image))
        .route("/slow/:ms/:file", get(slow_image))
        .route("/missing/*rest", get(missing))
        .route("/garbage/*rest", get(garbage))
        .route("/requests", get(list_requests))
        .with_state(state)
}

/// Solid PNG whose color is derived from `name`, so different paths produce
/// images that tests can tell apart
pub fn sample_png(name: &str) -> anyhow::Result<Vec<u8>> {
    let [r, g, b] = name.bytes().fold([17u8, 91, 163], |[r, g, b], byte| {
        [
            r.wrapping_mul(31).wrapping_add(byte),
            g.wrapping_mul(37).wrapping_add(byte),
            b.wrapping_mul(41).wrapping_add(byte),
        ]
    });
    let image = RgbaImage::from_pixel(IMAGE_SIDE, IMAGE_SIDE, Rgba([r, g, b, 255]));

    let mut buffer = Vec::new();
    image.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
    Ok(buffer)
}

fn png_response(name: &str) -> Response {
    match sample_png(name) {
        Ok(png) => ([(CONTENT_TYPE, "image/png")], png).into_response(),
        Err(err) => {
            error!(name, error = %err, "Failed to encode sample PNG");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

async fn ok_image(
    State(state): State<HostState>,
    Path(file): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> impl IntoResponse {
    state.record(&uri, &headers);
    png_response(&file)
}

async fn slow_image(
    State(state): State<HostState>,
    Path((ms, file)): Path<(u64, String)>,
    uri: Uri,
    headers: HeaderMap,
) -> impl IntoResponse {
    state.record(&uri, &headers);
    tokio::time::sleep(Duration::from_millis(ms)).await;
    png_response(&file)
}

async fn missing(State(state): State<HostState>, uri: Uri, headers: HeaderMap) -> impl IntoResponse {
    state.record(&uri, &headers);
    (StatusCode::NOT_FOUND, "no such avatar")
}

async fn garbage(State(state): State<HostState>, uri: Uri, headers: HeaderMap) -> impl IntoResponse {
    state.record(&uri, &headers);
    ([(CONTENT_TYPE, "image/png")], "definitely not a png")
}

async fn list_requests(State(state): State<HostState>) -> impl IntoResponse {
    Json(state.requests())
}

/// An image host running inside the current tokio runtime on a random port.
/// Shuts down when dropped.
pub struct ImageHost {
    addr: SocketAddr,
    state: HostState,
    server: JoinHandle<std::io::Result<()>>,
}

impl ImageHost {
    pub async fn spawn() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = HostState::default();

        let app = router(state.clone());
        let server = tokio::spawn(async move { axum::serve(listener, app).await });

        info!(%addr, "Image host started");
        Ok(Self {
            addr,
            state,
            server,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}/{}", self.addr, path.trim_start_matches('/'))
    }

    pub fn state(&self) -> &HostState {
        &self.state
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests()
    }

    pub fn hits(&self, path: &str) -> usize {
        self.state.hits(path)
    }
}

impl Drop for ImageHost {
    fn drop(&mut self) {
        self.server.abort();
    }
}
