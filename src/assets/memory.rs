//! In-memory asset store
//!
//! Useful for embedding a prebuilt bundle in the binary and for exercising
//! the dispatcher without touching the filesystem.

use super::{check_read_method, serve_content, AssetFetcher, AssetRequest, AssetResponse};
use crate::error::{AssetError, Result};
use crate::http::{self, cache::CachePolicy, mime};
use async_trait::async_trait;
use hyper::body::Bytes;
use std::collections::{HashMap, HashSet};
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    files: HashMap<String, (Bytes, &'static str)>,
    faulty: HashSet<String>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `content` under the URL path `path`
    ///
    /// The content type follows the path's extension.
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<Bytes>) {
        let path = path.into();
        let content_type = mime::content_type_for(Path::new(&path));
        self.files.insert(path, (content.into(), content_type));
    }

    #[must_use]
    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<Bytes>) -> Self {
        self.insert(path, content);
        self
    }

    /// Make every lookup of `path` fail as if the store were down
    #[must_use]
    pub fn with_fault(mut self, path: impl Into<String>) -> Self {
        self.faulty.insert(path.into());
        self
    }

    fn lookup(&self, path: &str) -> Option<&(Bytes, &'static str)> {
        self.files.get(path).or_else(|| {
            path.ends_with('/')
                .then(|| self.files.get(&format!("{path}index.html")))
                .flatten()
        })
    }
}

#[async_trait]
impl AssetFetcher for MemoryAssets {
    async fn fetch(&self, req: &AssetRequest) -> Result<AssetResponse> {
        let path = req.uri().path();
        if self.faulty.contains(path) {
            return Err(AssetError::unavailable(format!("lookup of {path} failed")));
        }

        if let Some(resp) = check_read_method(req.method()) {
            return Ok(resp);
        }

        Ok(match self.lookup(path) {
            Some((content, content_type)) => {
                serve_content(req, content.clone(), content_type, CachePolicy::default())
            }
            None => http::build_not_found_response(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::{Method, Request, StatusCode};

    fn get(path: &str) -> AssetRequest {
        Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Bytes::new())
            .unwrap()
    }

    #[tokio::test]
    async fn test_hit_and_miss() {
        let assets = MemoryAssets::new().with_file("/app.js", "console.log(1)");

        let hit = assets.fetch(&get("/app.js")).await.unwrap();
        assert_eq!(hit.status(), StatusCode::OK);
        assert_eq!(hit.headers()["content-type"], "text/javascript; charset=utf-8");

        let miss = assets.fetch(&get("/other.js")).await.unwrap();
        assert_eq!(miss.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_trailing_slash_uses_index() {
        let assets = MemoryAssets::new().with_file("/index.html", "<html>");
        let resp = assets.fetch(&get("/")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_fault_is_an_error() {
        let assets = MemoryAssets::new()
            .with_file("/index.html", "<html>")
            .with_fault("/index.html");
        let err = assets.fetch(&get("/index.html")).await.unwrap_err();
        assert!(matches!(err, AssetError::Unavailable { .. }));
    }
}
