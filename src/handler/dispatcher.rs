//! SPA request dispatcher
//!
//! Classifies a request by path and picks one of four outcomes:
//!
//! 1. API prefix: fixed placeholder, the asset store is not consulted
//! 2. asset hit (any status but 404): the store's response, untouched
//! 3. asset miss or fault: the fallback document, rewrapped as `text/html`
//!    with `Cache-Control: no-cache`
//! 4. fallback miss or fault: `404 Not Found`
//!
//! At most two lookups are made, strictly one after the other. Faults are
//! logged and treated as misses, so [`Dispatcher::dispatch`] cannot fail.

use crate::assets::{AssetFetcher, AssetRequest, AssetResponse};
use crate::config::SpaConfig;
use crate::error::{AssetError, Result};
use crate::http;
use crate::logger;
use hyper::header::{
    IF_MATCH, IF_MODIFIED_SINCE, IF_NONE_MATCH, IF_RANGE, IF_UNMODIFIED_SINCE, RANGE,
};
use hyper::{Request, StatusCode, Uri};
use std::sync::Arc;

pub const DEFAULT_API_PREFIX: &str = "/api/";
pub const DEFAULT_FALLBACK_PATH: &str = "/index.html";

pub struct Dispatcher {
    fetcher: Arc<dyn AssetFetcher>,
    api_prefix: String,
    fallback_path: String,
}

impl Dispatcher {
    pub fn new(fetcher: Arc<dyn AssetFetcher>) -> Self {
        Self {
            fetcher,
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            fallback_path: DEFAULT_FALLBACK_PATH.to_string(),
        }
    }

    pub fn from_config(fetcher: Arc<dyn AssetFetcher>, config: &SpaConfig) -> Self {
        Self {
            fetcher,
            api_prefix: config.api_prefix.clone(),
            fallback_path: config.fallback_path.clone(),
        }
    }

    pub fn is_api_path(&self, path: &str) -> bool {
        path.starts_with(&self.api_prefix)
    }

    pub fn fallback_path(&self) -> &str {
        &self.fallback_path
    }

    /// Map a request to its response
    pub async fn dispatch(&self, req: AssetRequest) -> AssetResponse {
        let path = req.uri().path();

        // Extension point for real API handlers
        if self.is_api_path(path) {
            return http::build_api_placeholder_response();
        }

        match self.fetcher.fetch(&req).await {
            Ok(resp) if resp.status() != StatusCode::NOT_FOUND => return resp,
            Ok(_) => logger::log_debug(&format!("No asset for {path}, trying fallback document")),
            Err(e) => logger::log_error(&format!("Error fetching asset {path}: {e}")),
        }

        self.serve_fallback(&req).await
    }

    async fn serve_fallback(&self, req: &AssetRequest) -> AssetResponse {
        let fallback_req = match fallback_request(req, &self.fallback_path) {
            Ok(r) => r,
            Err(e) => {
                logger::log_error(&format!("Error building fallback request: {e}"));
                return http::build_not_found_response();
            }
        };

        match self.fetcher.fetch(&fallback_req).await {
            Ok(resp) if resp.status() == StatusCode::OK => http::build_fallback_response(resp),
            Ok(resp) => {
                logger::log_debug(&format!(
                    "Fallback document {} answered {}",
                    self.fallback_path,
                    resp.status()
                ));
                http::build_not_found_response()
            }
            Err(e) => {
                logger::log_error(&format!(
                    "Error fetching fallback document {}: {e}",
                    self.fallback_path
                ));
                http::build_not_found_response()
            }
        }
    }
}

/// Build the lookup for the fallback document
///
/// Same method, version, headers and body as `req`, same origin, with path
/// and query replaced by `fallback_path`. Conditional and range headers are
/// dropped: only a full 200 can be served as the entry document.
pub fn fallback_request(req: &AssetRequest, fallback_path: &str) -> Result<AssetRequest> {
    let original = req.uri();
    let mut builder = Uri::builder();
    if let (Some(scheme), Some(authority)) = (original.scheme(), original.authority()) {
        builder = builder.scheme(scheme.clone()).authority(authority.clone());
    }
    let uri = builder.path_and_query(fallback_path).build().map_err(|e| {
        AssetError::invalid_request(format!("invalid fallback path '{fallback_path}': {e}"))
    })?;

    let mut fallback = Request::new(req.body().clone());
    *fallback.method_mut() = req.method().clone();
    *fallback.uri_mut() = uri;
    *fallback.version_mut() = req.version();
    *fallback.headers_mut() = req.headers().clone();
    for name in [IF_NONE_MATCH, IF_MODIFIED_SINCE, IF_MATCH, IF_UNMODIFIED_SINCE, IF_RANGE, RANGE] {
        fallback.headers_mut().remove(name);
    }
    Ok(fallback)
}
