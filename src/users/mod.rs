use crate::state::AppState;
use axum::Router;

pub mod handlers;
pub mod lenient;
pub mod memory;
pub mod profile;
pub mod repo;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
