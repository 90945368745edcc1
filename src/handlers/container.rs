//! Container-level handlers.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::{GatewayError, GatewayResult, Operation};
use crate::router::AppState;

use super::present;

/// Body of a create-container request.
#[derive(Debug, Deserialize)]
pub struct CreateContainerRequest {
    pub id: Option<String>,
}

/// Response to a successful create-container request.
///
/// `requestId` is `null` when the backend cannot report one, which is always
/// the case for the Azure backend.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContainerResponse {
    pub message: String,
    pub request_id: Option<String>,
    pub url: String,
}

/// Query parameters for viewing a container.
#[derive(Debug, Deserialize)]
pub struct ContainerQuery {
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BlobView {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ViewContainerResponse {
    pub blobs: Vec<BlobView>,
}

/// POST /container/create - Create container.
pub async fn create_container(
    State(state): State<AppState>,
    body: Result<Json<CreateContainerRequest>, JsonRejection>,
) -> GatewayResult<(StatusCode, Json<CreateContainerResponse>)> {
    let Json(request) = body.map_err(|e| GatewayError::bad_request(e.body_text()))?;
    let container = present(request.id)
        .ok_or_else(|| GatewayError::bad_request("Container ID is required"))?;

    let created = state.store.create_container(&container).await.map_err(|e| {
        error!("Error creating container: {}", e);
        GatewayError::storage(Operation::CreateContainer, e)
    })?;

    info!(
        "Container was created successfully. requestId: {} URL: {}",
        created.request_id.as_deref().unwrap_or("-"),
        created.url
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateContainerResponse {
            message: "Container was created successfully".to_string(),
            request_id: created.request_id,
            url: created.url,
        }),
    ))
}

/// GET /container/view?id={container} - List blobs in a container.
pub async fn view_container(
    State(state): State<AppState>,
    Query(query): Query<ContainerQuery>,
) -> GatewayResult<Json<ViewContainerResponse>> {
    let container =
        present(query.id).ok_or_else(|| GatewayError::bad_request("Container ID is required"))?;

    let entries = state.store.list_blobs(&container).await.map_err(|e| {
        error!("Error retrieving blobs: {}", e);
        GatewayError::storage(Operation::ListBlobs, e)
    })?;

    let blobs = entries
        .into_iter()
        .map(|entry| BlobView {
            name: entry.name,
            url: entry.url,
        })
        .collect();

    Ok(Json(ViewContainerResponse { blobs }))
}
