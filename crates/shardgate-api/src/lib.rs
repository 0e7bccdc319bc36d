//! shardgate-api — admin REST surface over the endpoint registry.
//!
//! Thin axum layer; all fleet logic lives in the registry. The owner
//! quota is enforced here, at the operator surface, so the registry stays
//! unaware of policy.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/api/v1/servers` | List registered endpoints |
//! | POST | `/api/v1/servers` | Register an endpoint |
//! | GET | `/api/v1/servers/{name}` | Endpoint details |
//! | DELETE | `/api/v1/servers/{name}` | Deregister an endpoint |
//! | GET | `/api/v1/servers/{name}/status` | Cached online flag |
//! | POST | `/api/v1/reconcile` | Trigger one reconciliation cycle |

pub mod handlers;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use shardgate_registry::{Reconciler, Registry};

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub registry: Arc<Registry>,
    pub reconciler: Arc<Reconciler>,
    /// Endpoints a single owner may register.
    pub max_servers_per_owner: u32,
}

/// Build the admin API router.
pub fn build_router(state: ApiState) -> Router {
    let api_routes = Router::new()
        .route(
            "/servers",
            get(handlers::list_servers).post(handlers::create_server),
        )
        .route(
            "/servers/{name}",
            get(handlers::get_server).delete(handlers::delete_server),
        )
        .route("/servers/{name}/status", get(handlers::server_status))
        .route("/reconcile", post(handlers::reconcile))
        .with_state(state);

    Router::new().nest("/api/v1", api_routes)
}
