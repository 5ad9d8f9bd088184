use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, State},
    routing::{get, patch},
    Json, Router,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::clients::photo_storage::StoredPhoto;
use crate::dto::vehicle_dto::{PhotoUpload, UpdateStatusRequest, VehicleForm};
use crate::models::vehicle::{Vehicle, VehicleWithPhotos};
use crate::services::vehicle_workflow::MAX_PHOTOS;
use crate::state::AppState;
use crate::utils::errors::{bad_request_error, validation_error, AppError};

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vehicles).post(create_vehicle))
        .route("/:id", get(get_vehicle).delete(delete_vehicle))
        .route("/:id/status", patch(update_status))
        .route("/:id/folder-photos", get(list_folder_photos))
}

// Partes de archivo del formulario; `fotos` es el nombre original
fn is_photo_field(name: &str) -> bool {
    matches!(name, "photos" | "fotos")
}

async fn create_vehicle(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<VehicleWithPhotos>, AppError> {
    let mut fields = HashMap::new();
    let mut photos = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request_error(&format!("invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if is_photo_field(&name) {
            // Tope del lado del llamador, antes de invocar el workflow
            if photos.len() == MAX_PHOTOS {
                return Err(validation_error("photos", "maximum 15 photos"));
            }

            let file_name = field.file_name().unwrap_or("photo").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| bad_request_error(&format!("could not read photo: {}", e)))?;

            photos.push(PhotoUpload {
                file_name,
                content_type,
                data,
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| bad_request_error(&format!("could not read field {}: {}", name, e)))?;
            fields.insert(name, value);
        }
    }

    let form = VehicleForm::from_fields(fields)?;
    let vehicle = state.workflow.create(form, photos).await?;
    Ok(Json(vehicle))
}

async fn list_vehicles(
    State(state): State<AppState>,
) -> Result<Json<Vec<VehicleWithPhotos>>, AppError> {
    let vehicles = state.workflow.list_available().await?;
    Ok(Json(vehicles))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VehicleWithPhotos>, AppError> {
    let vehicle = state.workflow.get(id).await?;
    Ok(Json(vehicle))
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<Vehicle>, AppError> {
    let Json(request) = payload?;
    let vehicle = state.workflow.update_status(id, &request.status).await?;
    Ok(Json(vehicle))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    state.workflow.delete(id).await?;
    Ok(Json(json!({ "success": true })))
}

async fn list_folder_photos(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<StoredPhoto>>, AppError> {
    let photos = state.workflow.list_folder_photos(id).await?;
    Ok(Json(photos))
}
