//! HTTP server
//!
//! [`ServerBuilder`] wires a document store, a media storage and an auth
//! provider into the services, mounts the routes under `/api/v1` and serves
//! them with graceful shutdown.

pub mod builder;
pub mod handlers;
pub mod router;
pub mod state;

pub use builder::ServerBuilder;
pub use router::API_PREFIX;
pub use state::AppState;
