//! Asset-fetch capability
//!
//! The dispatcher never touches storage directly. It hands a request
//! descriptor to an [`AssetFetcher`] and reads the status of whatever comes
//! back: 404 on a miss, 200 with content on a hit, anything else passes
//! through untouched.

mod directory;
mod memory;

pub use directory::DirectoryAssets;
pub use memory::MemoryAssets;

use crate::error::Result;
use crate::http::{self, cache, cache::CachePolicy};
use async_trait::async_trait;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};

/// Buffered request descriptor: method, URI, version, headers and body
pub type AssetRequest = Request<Bytes>;

/// Response produced by asset stores and the dispatcher
pub type AssetResponse = Response<Full<Bytes>>;

#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Look up the asset named by `req`
    ///
    /// A miss is `Ok` with status 404. `Err` is a fault: the store could not
    /// answer at all.
    async fn fetch(&self, req: &AssetRequest) -> Result<AssetResponse>;
}

/// Reject anything but `GET` and `HEAD` with a 405
fn check_read_method(method: &Method) -> Option<AssetResponse> {
    match *method {
        Method::GET | Method::HEAD => None,
        _ => Some(http::build_405_response()),
    }
}

/// Answer a hit, honouring `If-None-Match` and `HEAD`
fn serve_content(
    req: &AssetRequest,
    data: Bytes,
    content_type: &str,
    policy: CachePolicy,
) -> AssetResponse {
    let etag = cache::generate_etag(&data);
    let if_none_match = req
        .headers()
        .get("if-none-match")
        .and_then(|v| v.to_str().ok());

    if cache::check_etag_match(if_none_match, &etag) {
        return http::build_304_response(&etag, policy);
    }

    let is_head = req.method() == Method::HEAD;
    http::response::build_asset_response(data, content_type, &etag, policy, is_head)
}
