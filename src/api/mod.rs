//! HTTP surface: `POST /ai-multitool` and `GET /health`.

pub mod routes;
pub mod server;

pub use server::{build_router, start_server, AppState};
