//! HTTP response building module
//!
//! Builders for every response shape the router produces. None of them
//! panic: a builder failure is logged and degrades to an empty response.

use super::cache::CachePolicy;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CACHE_CONTROL, CONTENT_TYPE};
use hyper::{Response, StatusCode};

/// Body of the placeholder answer for paths under the API prefix
pub const API_PLACEHOLDER_BODY: &str = "API endpoint";

/// Body of the final 404 when neither the asset nor the fallback exists
pub const NOT_FOUND_BODY: &str = "Not Found";

/// Content type forced onto the fallback document
pub const FALLBACK_CONTENT_TYPE: &str = "text/html";

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Build the placeholder response for API routes
pub fn build_api_placeholder_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::OK, API_PLACEHOLDER_BODY)
}

/// Build the terminal 404 Not Found response
pub fn build_not_found_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::NOT_FOUND, NOT_FOUND_BODY)
}

/// Build 400 Bad Request response
pub fn build_400_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::BAD_REQUEST, "400 Bad Request")
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::PAYLOAD_TOO_LARGE, "413 Payload Too Large")
}

/// Build 405 Method Not Allowed response for read-only asset stores
pub fn build_405_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header(CONTENT_TYPE, TEXT_PLAIN)
        .header("Allow", "GET, HEAD")
        .body(Full::new(Bytes::from("405 Method Not Allowed")))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str, cache: CachePolicy) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header("ETag", etag)
        .header(CACHE_CONTROL, cache.to_header_value())
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 200 response for a stored asset
///
/// `HEAD` requests keep every header, `Content-Length` included, but carry
/// an empty body.
pub fn build_asset_response(
    data: Bytes,
    content_type: &str,
    etag: &str,
    cache: CachePolicy,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header("Content-Length", content_length)
        .header("Accept-Ranges", "none")
        .header("ETag", etag)
        .header(CACHE_CONTROL, cache.to_header_value())
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Rewrap the fallback document for client-side routes
///
/// Keeps the body and every header of the store's response, then forces
/// `Content-Type: text/html` and `Cache-Control: no-cache` so the entry
/// document is always revalidated.
pub fn build_fallback_response(fallback: Response<Full<Bytes>>) -> Response<Full<Bytes>> {
    let (mut parts, body) = fallback.into_parts();
    parts.status = StatusCode::OK;
    parts
        .headers
        .insert(CONTENT_TYPE, HeaderValue::from_static(FALLBACK_CONTENT_TYPE));
    match HeaderValue::try_from(CachePolicy::NoCache.to_header_value()) {
        Ok(value) => {
            parts.headers.insert(CACHE_CONTROL, value);
        }
        Err(e) => crate::logger::log_error(&format!("Invalid Cache-Control value: {e}")),
    }
    Response::from_parts(parts, body)
}

fn build_text_response(status: StatusCode, text: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, TEXT_PLAIN)
        .body(Full::new(Bytes::from_static(text.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            let mut resp = Response::new(Full::new(Bytes::from_static(text.as_bytes())));
            *resp.status_mut() = status;
            resp
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
