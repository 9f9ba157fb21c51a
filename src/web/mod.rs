//! HTTP surface: greeting routes, the prediction page and a small JSON API.

pub mod error;
pub mod handlers;
pub mod render;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::{AppState, SharedState};
