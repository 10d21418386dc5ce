//! HTTP protocol layer module
//!
//! Response builders, MIME detection and cache validators shared by the
//! asset stores and the dispatcher.

pub mod cache;
pub mod mime;
pub mod response;

pub use response::{
    build_304_response, build_400_response, build_405_response, build_413_response,
    build_api_placeholder_response, build_fallback_response, build_not_found_response,
};
