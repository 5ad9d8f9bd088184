//! Cliente HTTP para Google Drive (API v3)
//!
//! Implementa `PhotoStorage` sobre la API REST de Drive: creación de carpetas
//! públicas, subida multipart de fotos, listado y borrado. El cliente se crea
//! una sola vez al arrancar y se comparte entre requests.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use super::google_auth::ServiceAccountAuth;
use super::photo_storage::{
    folder_name, photo_file_name, sort_by_photo_index, FolderRequest, PhotoStorage, StoredPhoto,
};
use crate::config::drive::DriveConfig;
use crate::dto::vehicle_dto::PhotoUpload;
use crate::utils::errors::{external_api_error, AppError, AppResult};

const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

/// Cliente de Google Drive con sesión de cuenta de servicio
#[derive(Clone)]
pub struct GoogleDriveClient {
    http: Client,
    auth: ServiceAccountAuth,
    config: DriveConfig,
}

impl GoogleDriveClient {
    /// Crear el cliente; todas las llamadas usan el timeout configurado
    pub fn new(config: DriveConfig) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("could not build HTTP client: {}", e)))?;

        let auth = ServiceAccountAuth::new(http.clone(), config.service_account.clone());

        Ok(Self { http, auth, config })
    }

    /// URL que sirve la imagen directamente, con ancho fijo
    pub fn public_url(&self, file_id: &str) -> String {
        public_photo_url(file_id, self.config.photo_render_width)
    }

    /// Permiso "cualquiera con el link puede leer"
    async fn make_public(&self, file_id: &str) -> AppResult<()> {
        let token = self.auth.access_token().await?;
        let url = format!("{}/files/{}/permissions", self.config.api_base_url, file_id);

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&json!({ "role": "reader", "type": "anyone" }))
            .send()
            .await
            .map_err(|e| external_api_error("set permission", e))?;

        ensure_success("set permission", response).await?;
        Ok(())
    }
}

#[async_trait]
impl PhotoStorage for GoogleDriveClient {
    async fn create_folder(&self, request: &FolderRequest<'_>) -> AppResult<String> {
        let parent_id = self.config.parent_folder(request.category)?;
        let name = folder_name(request, Utc::now());

        debug!("📁 Creando carpeta '{}' en {}", name, parent_id);

        let token = self.auth.access_token().await?;
        let response = self
            .http
            .post(format!("{}/files", self.config.api_base_url))
            .bearer_auth(token)
            .query(&[("fields", "id")])
            .json(&json!({
                "name": name,
                "mimeType": FOLDER_MIME_TYPE,
                "parents": [parent_id],
            }))
            .send()
            .await
            .map_err(|e| external_api_error("create folder", e))?;

        let folder: DriveFile = ensure_success("create folder", response)
            .await?
            .json()
            .await
            .map_err(|e| external_api_error("create folder response", e))?;

        // Si esto falla la carpeta queda creada pero privada; el error se propaga
        self.make_public(&folder.id).await?;

        info!("✅ Carpeta creada: {} ({})", name, folder.id);
        Ok(folder.id)
    }

    async fn upload_photo(
        &self,
        folder_id: &str,
        photo: &PhotoUpload,
        index: usize,
    ) -> AppResult<String> {
        let name = photo_file_name(index, &photo.file_name, &photo.content_type);
        let boundary = format!("photo_upload_{}", Uuid::new_v4().simple());
        let body = multipart_related_body(&boundary, &name, folder_id, photo);

        debug!("📤 Subiendo {} ({} bytes) a {}", name, photo.data.len(), folder_id);

        let token = self.auth.access_token().await?;
        let response = self
            .http
            .post(format!("{}/files", self.config.upload_base_url))
            .bearer_auth(token)
            .query(&[("uploadType", "multipart"), ("fields", "id")])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .body(body)
            .send()
            .await
            .map_err(|e| external_api_error("upload photo", e))?;

        let file: DriveFile = ensure_success("upload photo", response)
            .await?
            .json()
            .await
            .map_err(|e| external_api_error("upload photo response", e))?;

        self.make_public(&file.id).await?;

        Ok(self.public_url(&file.id))
    }

    async fn list_folder_photos(&self, folder_id: &str) -> AppResult<Vec<StoredPhoto>> {
        let query = format!(
            "'{}' in parents and mimeType contains 'image/' and trashed = false",
            folder_id.replace('\'', "\\'")
        );

        let token = self.auth.access_token().await?;
        let response = self
            .http
            .get(format!("{}/files", self.config.api_base_url))
            .bearer_auth(token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id, name)"),
                ("orderBy", "name"),
                ("pageSize", "100"),
            ])
            .send()
            .await
            .map_err(|e| external_api_error("list folder", e))?;

        let listing: DriveFileList = ensure_success("list folder", response)
            .await?
            .json()
            .await
            .map_err(|e| external_api_error("list folder response", e))?;

        let mut photos: Vec<StoredPhoto> = listing
            .files
            .into_iter()
            .map(|file| StoredPhoto {
                url: self.public_url(&file.id),
                id: file.id,
                name: file.name,
            })
            .collect();

        sort_by_photo_index(&mut photos);
        Ok(photos)
    }

    async fn delete_folder(&self, folder_id: &str) -> AppResult<()> {
        let token = self.auth.access_token().await?;
        let response = self
            .http
            .delete(format!("{}/files/{}", self.config.api_base_url, folder_id))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| external_api_error("delete folder", e))?;

        ensure_success("delete folder", response).await?;
        info!("🗑️ Carpeta {} borrada de Google Drive", folder_id);
        Ok(())
    }
}

/// Convierte un status HTTP no exitoso en error con el cuerpo de la respuesta
async fn ensure_success(operation: &str, response: Response) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(external_api_error(
        operation,
        format!("HTTP {}: {}", status, body),
    ))
}

pub fn public_photo_url(file_id: &str, width: u32) -> String {
    format!("https://drive.google.com/thumbnail?id={}&sz=w{}", file_id, width)
}

/// Cuerpo `multipart/related`: metadata JSON seguida del contenido binario
fn multipart_related_body(
    boundary: &str,
    name: &str,
    folder_id: &str,
    photo: &PhotoUpload,
) -> Vec<u8> {
    let metadata = json!({ "name": name, "parents": [folder_id] });

    let mut body = Vec::with_capacity(photo.data.len() + 512);
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{m}\r\n\
             --{b}\r\nContent-Type: {t}\r\n\r\n",
            b = boundary,
            m = metadata,
            t = photo.content_type,
        )
        .as_bytes(),
    );
    body.extend_from_slice(&photo.data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    body
}
