//! Admin API handlers.
//!
//! Each handler delegates to the registry and maps its error taxonomy to
//! HTTP status codes: validation 400, duplicate 409, owner quota 422,
//! persistence 500. Status queries never fail — absence reads as offline.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use shardgate_registry::{CycleOutcome, NewEndpoint, RegistryError};

use crate::ApiState;

/// Response wrapper for consistent API format.
#[derive(serde::Serialize)]
struct ApiResponse<T: serde::Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

fn error_response(msg: &str, status: StatusCode) -> impl IntoResponse {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
}

fn registry_error_status(e: &RegistryError) -> StatusCode {
    match e {
        RegistryError::InvalidName(_) | RegistryError::InvalidPort(_) => StatusCode::BAD_REQUEST,
        RegistryError::Duplicate(_) => StatusCode::CONFLICT,
        RegistryError::Store(_) | RegistryError::Routing(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// ── Servers ────────────────────────────────────────────────────

/// GET /api/v1/servers
pub async fn list_servers(State(state): State<ApiState>) -> impl IntoResponse {
    let servers = state.registry.list_all().await;
    ApiResponse::ok(servers)
}

/// GET /api/v1/servers/{name}
pub async fn get_server(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.registry.lookup(&name).await {
        Some(ep) => ApiResponse::ok(ep).into_response(),
        None => error_response("server not found", StatusCode::NOT_FOUND).into_response(),
    }
}

/// Registration request body.
#[derive(serde::Deserialize)]
pub struct CreateServerRequest {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub owner_id: String,
    pub owner_name: String,
}

/// POST /api/v1/servers
pub async fn create_server(
    State(state): State<ApiState>,
    Json(req): Json<CreateServerRequest>,
) -> impl IntoResponse {
    // Owner quota, checked against the store — the authority for
    // aggregate counts.
    match state.registry.count_by_owner(&req.owner_id).await {
        Ok(count) if count >= state.max_servers_per_owner as i64 => {
            return error_response(
                &format!(
                    "owner {} already has {count} servers (limit {})",
                    req.owner_id, state.max_servers_per_owner
                ),
                StatusCode::UNPROCESSABLE_ENTITY,
            )
            .into_response();
        }
        Ok(_) => {}
        Err(e) => {
            return error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR)
                .into_response();
        }
    }

    let new = NewEndpoint {
        name: req.name,
        host: req.host,
        port: req.port,
        owner_id: req.owner_id,
        owner_name: req.owner_name,
    };
    match state.registry.add(new).await {
        Ok(ep) => (StatusCode::CREATED, ApiResponse::ok(ep)).into_response(),
        Err(e) => error_response(&e.to_string(), registry_error_status(&e)).into_response(),
    }
}

/// DELETE /api/v1/servers/{name} — idempotent.
pub async fn delete_server(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.registry.remove(&name).await {
        Ok(_) => ApiResponse::ok("removed").into_response(),
        Err(e) => error_response(&e.to_string(), registry_error_status(&e)).into_response(),
    }
}

/// GET /api/v1/servers/{name}/status — never fails; absent endpoints
/// read as offline.
pub async fn server_status(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    let online = state.registry.is_online(&name).await;
    ApiResponse::ok(serde_json::json!({ "name": name, "online": online }))
}

// ── Reconciliation ─────────────────────────────────────────────

/// POST /api/v1/reconcile — run one cycle now.
pub async fn reconcile(State(state): State<ApiState>) -> impl IntoResponse {
    match state.reconciler.run_cycle().await {
        Ok(CycleOutcome::Completed(report)) => ApiResponse::ok(serde_json::json!({
            "skipped": false,
            "probed": report.probed,
            "status_changes": report.status_changes,
            "evicted": report.evicted,
        }))
        .into_response(),
        Ok(CycleOutcome::Skipped) => {
            ApiResponse::ok(serde_json::json!({ "skipped": true })).into_response()
        }
        Err(e) => error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response(),
    }
}
