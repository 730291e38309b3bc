pub mod category;
mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;
pub mod timestamp;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::waste_routes()
}
