//! Request handler module
//!
//! The dispatcher holds the routing decision; the router adapts hyper's
//! wire requests to it.

pub mod dispatcher;
pub mod router;

pub use dispatcher::Dispatcher;
pub use router::handle_request;
