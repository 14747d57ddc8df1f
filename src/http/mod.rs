//! HTTP surface of the dashboard service

pub mod middleware;
pub mod routes;

pub use routes::build_router;
