//! HTTP router for a single-page application.
//!
//! Paths under the API prefix get a placeholder answer, everything else is
//! looked up in an asset store, and client-side routes that match no asset
//! fall back to the application's `index.html`.

pub mod assets;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
