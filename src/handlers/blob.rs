//! Blob-level handlers.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Query, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::{GatewayError, GatewayResult, Operation, StageError, StoreError};
use crate::router::AppState;
use crate::upload::StagedUpload;

use super::present;

/// Multipart field carrying the container id.
const ID_FIELD: &str = "id";

/// Multipart field carrying the uploaded file.
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadBlobResponse {
    pub message: String,
    pub blob_url: String,
    pub request_id: String,
}

/// Query parameters for deleting a blob.
#[derive(Debug, Deserialize)]
pub struct DeleteBlobQuery {
    pub id: Option<String>,
    pub filename: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteBlobResponse {
    pub message: String,
}

/// POST /blob/create - Upload a file as a new blob.
///
/// The file part is staged to the upload directory while the form is read,
/// then sent to the store. The staged copy is removed when the handler
/// returns, on success and failure alike.
pub async fn upload_blob(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> GatewayResult<Json<UploadBlobResponse>> {
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(e) => {
            debug!("Rejected non-multipart upload: {}", e);
            return Err(GatewayError::bad_request("No file uploaded"));
        }
    };

    let mut container = None;
    let mut staged = None;

    while let Some(field) = multipart.next_field().await.map_err(rejected_form)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(ID_FIELD) => {
                let value = field.text().await.map_err(rejected_form)?;
                container = present(Some(value));
            }
            Some(FILE_FIELD) if staged.is_none() => {
                let upload = StagedUpload::from_field(&state.config.upload_dir, field)
                    .await
                    .map_err(|e| match e {
                        StageError::Form(e) => rejected_form(e),
                        e => {
                            error!("Error uploading file: {}", e);
                            GatewayError::from(e)
                        }
                    })?;
                staged = Some(upload);
            }
            _ => {}
        }
    }

    let staged = staged.ok_or_else(|| GatewayError::bad_request("No file uploaded"))?;
    let container =
        container.ok_or_else(|| GatewayError::bad_request("Container ID is required"))?;

    info!(
        "Uploading {} to container {} as blob {} ({} bytes)",
        staged.original_name(),
        container,
        staged.blob_name(),
        staged.size()
    );

    let uploaded = async {
        let data = staged.read().await?;
        state
            .store
            .upload_blob(&container, staged.blob_name(), data, staged.content_type())
            .await
    }
    .await
    .map_err(|e: StoreError| {
        error!("Error uploading file: {}", e);
        GatewayError::storage(Operation::UploadBlob, e)
    })?;

    info!(
        "Blob was uploaded successfully. requestId: {} URL: {}",
        uploaded.request_id, uploaded.url
    );

    Ok(Json(UploadBlobResponse {
        message: "File uploaded successfully".to_string(),
        blob_url: uploaded.url,
        request_id: uploaded.request_id,
    }))
}

fn rejected_form(err: MultipartError) -> GatewayError {
    let err = GatewayError::from(err);
    debug!("Rejected upload form: {}", err);
    err
}

/// DELETE /blob/delete?id={container}&filename={blob} - Delete a blob and its snapshots.
pub async fn delete_blob(
    State(state): State<AppState>,
    Query(query): Query<DeleteBlobQuery>,
) -> GatewayResult<Json<DeleteBlobResponse>> {
    let (container, blob) = match (present(query.id), present(query.filename)) {
        (Some(container), Some(blob)) => (container, blob),
        _ => {
            return Err(GatewayError::bad_request(
                "Container ID and filename are required",
            ))
        }
    };

    let deleted = state
        .store
        .delete_blob(&container, &blob)
        .await
        .map_err(|e| {
            error!("Error deleting blob: {}", e);
            GatewayError::storage(Operation::DeleteBlob, e)
        })?;

    info!(
        "Deleted blob {} from container {}. requestId: {}",
        blob, container, deleted.request_id
    );

    Ok(Json(DeleteBlobResponse {
        message: format!(
            "Blob {} deleted successfully from container {}",
            blob, container
        ),
    }))
}
