//! API route handlers for the logpack server.

pub mod health;
pub mod home;
pub mod logs;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Create the combined API router.
///
/// Routes:
/// - GET    /v1/logs      - List all collection jobs
/// - POST   /v1/logs      - Create a job and trigger collection
/// - GET    /v1/logs/{id} - Get a single job
/// - DELETE /v1/logs/{id} - Remove a job and schedule artifact deletion
/// - GET    /v1/health    - Health check
/// - GET    /             - Landing page that creates a job and auto-polls
pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/v1", logs::router())
        .nest("/v1", health::router())
        .merge(home::router())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Config;

    #[test]
    fn test_api_routes_creation() {
        let state = AppState::new(Config::default());
        let _router = api_routes(state);
    }
}
