//! Directory-backed asset store
//!
//! Serves the build output of the single-page application (usually `dist/`)
//! straight from disk.

use super::{check_read_method, serve_content, AssetFetcher, AssetRequest, AssetResponse};
use crate::config::SpaConfig;
use crate::error::{AssetError, Result};
use crate::http::{self, cache::CachePolicy, mime};
use crate::logger;
use async_trait::async_trait;
use hyper::body::Bytes;
use percent_encoding::percent_decode_str;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

pub struct DirectoryAssets {
    root: PathBuf,
    index_files: Vec<String>,
    cache: CachePolicy,
}

impl DirectoryAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index_files: vec!["index.html".to_string(), "index.htm".to_string()],
            cache: CachePolicy::default(),
        }
    }

    pub fn from_config(config: &SpaConfig) -> Self {
        Self::new(&config.asset_dir)
            .with_index_files(config.index_files.clone())
            .with_cache_policy(CachePolicy::Public(config.asset_max_age))
    }

    #[must_use]
    pub fn with_index_files(mut self, index_files: Vec<String>) -> Self {
        self.index_files = index_files;
        self
    }

    #[must_use]
    pub fn with_cache_policy(mut self, cache: CachePolicy) -> Self {
        self.cache = cache;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find the first configured index file inside `dir`
    async fn find_index(&self, dir: &Path) -> Option<PathBuf> {
        for index_file in &self.index_files {
            let candidate = dir.join(index_file);
            if fs::metadata(&candidate).await.is_ok_and(|m| m.is_file()) {
                return Some(candidate);
            }
        }
        None
    }

    /// Map a URL path onto a file below the canonical root
    ///
    /// `Ok(None)` is a miss; `Err` is a storage fault.
    async fn resolve(&self, root: &Path, url_path: &str) -> Result<Option<PathBuf>> {
        let Some(mut file_path) = sanitize_path(root, url_path) else {
            return Ok(None);
        };

        match fs::metadata(&file_path).await {
            Ok(meta) if meta.is_dir() => match self.find_index(&file_path).await {
                Some(index) => file_path = index,
                None => return Ok(None),
            },
            Ok(_) => {}
            Err(e) if is_missing(&e) => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        // Symlinks may still point outside the root
        let canonical = match fs::canonicalize(&file_path).await {
            Ok(p) => p,
            Err(e) if is_missing(&e) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if !canonical.starts_with(root) {
            logger::log_debug(&format!(
                "Path traversal attempt blocked: {url_path} -> {}",
                canonical.display()
            ));
            return Ok(None);
        }

        Ok(Some(canonical))
    }
}

#[async_trait]
impl AssetFetcher for DirectoryAssets {
    async fn fetch(&self, req: &AssetRequest) -> Result<AssetResponse> {
        if let Some(resp) = check_read_method(req.method()) {
            return Ok(resp);
        }

        let root = fs::canonicalize(&self.root).await.map_err(|e| {
            AssetError::unavailable(format!(
                "asset directory '{}' is inaccessible: {e}",
                self.root.display()
            ))
        })?;

        let Some(file_path) = self.resolve(&root, req.uri().path()).await? else {
            logger::log_debug(&format!("Asset miss: {}", req.uri().path()));
            return Ok(http::build_not_found_response());
        };

        let content = match fs::read(&file_path).await {
            Ok(c) => c,
            Err(e) if is_missing(&e) => return Ok(http::build_not_found_response()),
            Err(e) => return Err(e.into()),
        };

        let content_type = mime::content_type_for(&file_path);
        Ok(serve_content(req, Bytes::from(content), content_type, self.cache))
    }
}

/// Percent-decode `url_path` and join its segments onto `root`
///
/// Returns `None` for undecodable paths and for any segment that could climb
/// out of the root.
fn sanitize_path(root: &Path, url_path: &str) -> Option<PathBuf> {
    let Ok(decoded) = percent_decode_str(url_path).decode_utf8() else {
        logger::log_debug(&format!("Rejecting path that is not valid UTF-8: {url_path}"));
        return None;
    };

    let mut buf = root.to_path_buf();
    for seg in decoded.split('/') {
        if seg.is_empty() || seg == "." {
            continue;
        }
        if seg == ".." || seg.contains('\\') || seg.contains('\0') {
            logger::log_debug(&format!("Rejecting unsafe path segment in: {url_path}"));
            return None;
        }
        buf.push(seg);
    }
    Some(buf)
}

fn is_missing(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use hyper::{Method, Request, StatusCode};

    fn request(method: Method, path: &str) -> AssetRequest {
        Request::builder()
            .method(method)
            .uri(format!("http://localhost{path}"))
            .body(Bytes::new())
            .unwrap()
    }

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<div id=root></div>").unwrap();
        std::fs::write(dir.path().join("logo.png"), [0x89, b'P', b'N', b'G']).unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs").join("index.htm"), "docs").unwrap();
        std::fs::create_dir(dir.path().join("empty")).unwrap();
        std::fs::write(dir.path().join("hello world.txt"), "hi").unwrap();
        std::fs::write(dir.path().join("...js"), "dots").unwrap();
        std::fs::write(dir.path().join("..well-known-ish"), "ok").unwrap();
        dir
    }

    async fn body(resp: AssetResponse) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_serves_existing_file() {
        let dir = site();
        let assets = DirectoryAssets::new(dir.path());

        let resp = assets.fetch(&request(Method::GET, "/logo.png")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-type"], "image/png");
        assert_eq!(resp.headers()["cache-control"], "public, max-age=3600");
        assert!(resp.headers().contains_key("etag"));
        assert_eq!(body(resp).await.as_ref(), &[0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn test_missing_file_is_404() {
        let dir = site();
        let assets = DirectoryAssets::new(dir.path());

        let resp = assets.fetch(&request(Method::GET, "/dashboard/settings")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = assets.fetch(&request(Method::GET, "/logo.png/child")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_directory_uses_index_files() {
        let dir = site();
        let assets = DirectoryAssets::new(dir.path());

        let resp = assets.fetch(&request(Method::GET, "/")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body(resp).await, "<div id=root></div>");

        let resp = assets.fetch(&request(Method::GET, "/docs/")).await.unwrap();
        assert_eq!(body(resp).await, "docs");

        let resp = assets.fetch(&request(Method::GET, "/empty")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_percent_encoded_path() {
        let dir = site();
        let assets = DirectoryAssets::new(dir.path());

        let resp = assets.fetch(&request(Method::GET, "/hello%20world.txt")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body(resp).await, "hi");
    }

    #[tokio::test]
    async fn test_dot_prefixed_names_are_served() {
        let dir = site();
        let assets = DirectoryAssets::new(dir.path());

        let resp = assets.fetch(&request(Method::GET, "/...js")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body(resp).await, "dots");

        let resp = assets.fetch(&request(Method::GET, "/..well-known-ish")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body(resp).await, "ok");
    }

    #[tokio::test]
    async fn test_traversal_is_refused() {
        let outer = tempfile::tempdir().unwrap();
        std::fs::write(outer.path().join("secret.txt"), "secret").unwrap();
        let public = outer.path().join("public");
        std::fs::create_dir(&public).unwrap();
        let assets = DirectoryAssets::new(&public);

        for path in ["/../secret.txt", "/%2e%2e/secret.txt", "/..%2fsecret.txt"] {
            let resp = assets.fetch(&request(Method::GET, path)).await.unwrap();
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "path {path}");
        }
    }

    #[tokio::test]
    async fn test_if_none_match_returns_304() {
        let dir = site();
        let assets = DirectoryAssets::new(dir.path());

        let first = assets.fetch(&request(Method::GET, "/index.html")).await.unwrap();
        let etag = first.headers()["etag"].clone();

        let mut req = request(Method::GET, "/index.html");
        req.headers_mut().insert("if-none-match", etag);
        let resp = assets.fetch(&req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
        assert!(body(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_head_and_method_handling() {
        let dir = site();
        let assets = DirectoryAssets::new(dir.path());

        let resp = assets.fetch(&request(Method::HEAD, "/index.html")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-length"], "19");
        assert!(body(resp).await.is_empty());

        let resp = assets.fetch(&request(Method::POST, "/index.html")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_missing_root_is_a_fault() {
        let dir = tempfile::tempdir().unwrap();
        let assets = DirectoryAssets::new(dir.path().join("not-built-yet"));

        let err = assets.fetch(&request(Method::GET, "/index.html")).await.unwrap_err();
        assert!(matches!(err, AssetError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_config_cache_policy() {
        let dir = site();
        let config = SpaConfig {
            asset_dir: dir.path().display().to_string(),
            asset_max_age: 60,
            ..SpaConfig::default()
        };
        let assets = DirectoryAssets::from_config(&config);
        assert_eq!(assets.root(), dir.path());

        let resp = assets.fetch(&request(Method::GET, "/logo.png")).await.unwrap();
        assert_eq!(resp.headers()["cache-control"], "public, max-age=60");
    }
}
