//! Request handler module
//!
//! Routing plus the endpoint's read and write paths. The read and write
//! functions take a store and plain options so they can be driven without
//! an HTTP request.

mod error;
mod query;
mod read;
mod router;
mod target;
mod write;

// Re-export main entry point
pub use router::handle_request;
