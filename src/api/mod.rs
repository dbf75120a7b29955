//! HTTP view adapter over the session

pub mod handlers;
pub mod routes;

pub use routes::create_router;
