//! Target route handlers.
//!
//! Thin translation between the wire contract and the registry. A mutation
//! answer is only sent after both the store write and the file projection
//! completed; any failure in between surfaces as a server error so the
//! caller can retry the idempotent operation.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

use promgrid_core::TargetGroup;
use promgrid_discovery::DiscoveryError;

use crate::ApiState;
use crate::validate;

fn error_message(msg: &str, status: StatusCode) -> impl IntoResponse {
    (status, Json(json!({ "message": msg })))
}

/// Validation-adjacent registry failures map to 400, the rest to 500.
fn mutation_status(err: &DiscoveryError) -> StatusCode {
    match err {
        DiscoveryError::InvalidExporter(_) | DiscoveryError::MissingIdentityLabel { .. } => {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Query parameters for the filtered read.
#[derive(Debug, Deserialize)]
pub struct TargetsQuery {
    pub exporter: Option<String>,
    pub zone: Option<String>,
}

/// GET /targets
///
/// Without query parameters, returns every stored record in the minimal
/// `{exporter, target, labels}` projection. With both `exporter` and
/// `zone`, returns the matching set in the discovery-file group shape.
pub async fn get_targets(
    State(state): State<ApiState>,
    Query(query): Query<TargetsQuery>,
) -> impl IntoResponse {
    let result = match (&query.exporter, &query.zone) {
        (Some(exporter), Some(zone)) => state.registry.find(exporter, zone).map(|records| {
            let groups: Vec<TargetGroup> = records.into_iter().map(TargetGroup::from).collect();
            Json(json!({ "targets": groups })).into_response()
        }),
        _ => state
            .registry
            .list_all()
            .map(|records| Json(json!({ "targets": records })).into_response()),
    };

    match result {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "target listing failed");
            error_message(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response()
        }
    }
}

/// POST /targets
pub async fn post_target(
    State(state): State<ApiState>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    let record = match validate::upsert_from_value(body) {
        Ok(record) => record,
        Err(e) => {
            warn!(missing = ?e.missing, "rejected upsert body");
            return error_message(&e.message(), StatusCode::BAD_REQUEST).into_response();
        }
    };

    match state.registry.upsert(record).await {
        Ok(stored) => (
            StatusCode::CREATED,
            Json(json!({ "status": "created", "data": stored })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "target upsert failed");
            error_message(&e.to_string(), mutation_status(&e)).into_response()
        }
    }
}

/// DELETE /targets
pub async fn delete_target(
    State(state): State<ApiState>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    let identity = match validate::delete_from_value(body) {
        Ok(identity) => identity,
        Err(e) => {
            warn!(missing = ?e.missing, "rejected delete body");
            return error_message(&e.message(), StatusCode::BAD_REQUEST).into_response();
        }
    };

    match state.registry.delete(&identity).await {
        // Deleting a missing record is still a success; nothing was removed.
        Ok(_removed) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!(error = %e, "target delete failed");
            error_message(&e.to_string(), mutation_status(&e)).into_response()
        }
    }
}

/// GET /healthz
pub async fn healthz() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
