//! # HTTP API
//!
//! JSON front end over the services, mounted under `/api/v1`. Every service failure is
//! answered with `500 {"error": "..."}`.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use flowtally_common::network::address_list::ToggleItem;
use flowtally_common::network::connection::GroupedConnections;
use flowtally_common::network::counter::DomainSummary;
use flowtally_core::error::ServiceError;
use flowtally_core::service::{ConnectionsService, CounterQueryService};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    connections: ConnectionsService,
    counters: CounterQueryService,
}

impl AppState {
    pub fn new(connections: ConnectionsService, counters: CounterQueryService) -> Self {
        Self {
            connections,
            counters,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/src", get(get_by_source))
        .route("/api/v1/dns", get(get_domains).post(set_domain_ignore))
        .route("/api/v1/ignore-lan-to-vpn", get(get_toggle_list).post(set_toggle))
        .with_state(state)
}

struct ApiError(ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

fn ok() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// `true` and `1` switch a toggle on; anything else switches it off.
fn is_enabled(raw: &str) -> bool {
    matches!(raw.trim(), "true" | "1")
}

#[derive(Debug, Default, Deserialize)]
struct SourceQuery {
    #[serde(default, rename = "srcIp")]
    src_ip: String,
}

#[derive(Debug, Default, Deserialize)]
struct FindQuery {
    #[serde(default)]
    find: String,
}

#[derive(Debug, Default, Deserialize)]
struct DomainToggleQuery {
    #[serde(default)]
    dns: String,
    #[serde(default)]
    enabled: String,
}

#[derive(Debug, Default, Deserialize)]
struct HostToggleQuery {
    #[serde(default)]
    ip: String,
    #[serde(default)]
    enabled: String,
}

#[derive(Debug, Default, Deserialize)]
struct HostToggleBody {
    #[serde(default)]
    ip: String,
    #[serde(default)]
    enabled: bool,
}

async fn health() -> Json<Value> {
    ok()
}

async fn get_by_source(
    State(state): State<AppState>,
    Query(query): Query<SourceQuery>,
) -> ApiResult<Vec<GroupedConnections>> {
    Ok(Json(state.connections.get_by_source(&query.src_ip).await?))
}

async fn get_domains(
    State(state): State<AppState>,
    Query(query): Query<FindQuery>,
) -> ApiResult<Vec<DomainSummary>> {
    Ok(Json(state.counters.get_domain_counters(&query.find).await?))
}

async fn set_domain_ignore(
    State(state): State<AppState>,
    Query(query): Query<DomainToggleQuery>,
) -> ApiResult<Value> {
    state
        .connections
        .set_domain_ignore_state(&query.dns, is_enabled(&query.enabled))
        .await?;
    Ok(ok())
}

async fn get_toggle_list(
    State(state): State<AppState>,
    Query(query): Query<FindQuery>,
) -> ApiResult<Vec<ToggleItem>> {
    Ok(Json(state.connections.get_toggle_list(&query.find).await?))
}

/// Takes `ip`/`enabled` from the query string, or from a JSON body when the query has
/// no `ip`. An unreadable body counts as empty.
async fn set_toggle(
    State(state): State<AppState>,
    Query(query): Query<HostToggleQuery>,
    body: Bytes,
) -> ApiResult<Value> {
    let (ip, enabled) = if query.ip.is_empty() {
        let body: HostToggleBody = serde_json::from_slice(&body).unwrap_or_default();
        let enabled = if query.enabled.is_empty() {
            body.enabled
        } else {
            is_enabled(&query.enabled)
        };
        (body.ip, enabled)
    } else {
        (query.ip, is_enabled(&query.enabled))
    };

    state.connections.set_toggle_state(&ip, enabled).await?;
    Ok(ok())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
