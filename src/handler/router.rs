//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: health probes, the spreadsheet
//! endpoint (GET read, POST write, OPTIONS preflight) and access logging.

use super::error::HandlerError;
use super::query::parse_query;
use super::read::{self, ReadOptions};
use super::write::{self, WriteOptions};
use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::HeaderValue;
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let started = Instant::now();
    let access_log = state.cached_access_log.load(Ordering::Relaxed);
    let entry = access_log.then(|| access_entry(&req, peer_addr));

    let mut response = route_request(req, &state).await;
    decorate(&mut response, &state);

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = usize::try_from(response.body().size_hint().exact().unwrap_or(0))
            .unwrap_or(usize::MAX);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

fn access_entry<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessLogEntry {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = format!("{:?}", req.version())
        .trim_start_matches("HTTP/")
        .to_string();
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry
}

/// Route request based on path and method
async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let path = req.uri().path();

    // 0. Health check endpoints
    let health = &state.config.health;
    if health.enabled {
        if path == health.liveness_path {
            return http::build_health_response(StatusCode::OK, "ok");
        }
        if path == health.readiness_path {
            return readiness(state).await;
        }
    }

    // 1. The spreadsheet endpoint
    if !is_endpoint(path, &state.config.server.endpoint_path) {
        return http::build_404_response();
    }

    let method = req.method().clone();
    match method {
        Method::GET => handle_read(&req, state).await,
        Method::POST => handle_write(req, state).await,
        Method::OPTIONS => http::build_options_response(state.config.http.enable_cors),
        method => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            http::build_405_response()
        }
    }
}

/// Paths compare with trailing slashes ignored
fn is_endpoint(path: &str, endpoint: &str) -> bool {
    let trim = |p: &str| p.trim_end_matches('/').to_string();
    trim(path) == trim(endpoint)
}

async fn readiness(state: &AppState) -> Response<Full<Bytes>> {
    match state.store.sheet_names().await {
        Ok(_) => http::build_health_response(StatusCode::OK, "ok"),
        Err(e) => {
            logger::log_warning(&format!("Readiness check failed: {e}"));
            http::build_health_response(StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    }
}

async fn handle_read<B>(req: &Request<B>, state: &AppState) -> Response<Full<Bytes>> {
    let query = parse_query(req.uri().query());
    let options = ReadOptions::from(&state.config.spreadsheet);

    match read::read(state.store.as_ref(), &options, &query).await {
        Ok(body) => http::build_json_response(StatusCode::OK, &body),
        Err(e) => error_response(&HandlerError::from(e)),
    }
}

async fn handle_write<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let max_body_size = state.config.http.max_body_size;
    if let Some(resp) = check_body_size(&req, max_body_size) {
        return resp;
    }

    let query = parse_query(req.uri().query());
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    let body = match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_error(&format!("Request body exceeds {max_body_size} bytes"));
            return http::build_413_response();
        }
        Err(e) => return error_response(&HandlerError::Body(e.to_string())),
    };

    let options = WriteOptions::from(&state.config.spreadsheet);
    match write::write(state.store.as_ref(), &options, query.sheet.as_deref(), &body).await {
        Ok(body) => http::build_json_response(StatusCode::OK, &body),
        Err(e) => error_response(&e),
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', relying on streamed limit"
                ));
                None
            }
            _ => None,
        },
    )
}

fn error_response(err: &HandlerError) -> Response<Full<Bytes>> {
    if err.status().is_server_error() {
        logger::log_error(&err.to_string());
    } else {
        logger::log_warning(&err.to_string());
    }
    http::build_json_error(err.status(), err.public_message())
}

/// Headers every response carries
fn decorate(response: &mut Response<Full<Bytes>>, state: &AppState) {
    let headers = response.headers_mut();
    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        headers.insert("Server", server);
    }
    if state.config.http.enable_cors {
        headers.insert("Access-Control-Allow-Origin", HeaderValue::from_static("*"));
    }
}
