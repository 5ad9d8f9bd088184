//! Contrato del almacenamiento externo de fotos
//!
//! Una carpeta por vehículo bajo la carpeta padre de su categoría, con
//! objetos `photo_<index>.<ext>` dentro. El workflow sólo conoce este trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::dto::vehicle_dto::PhotoUpload;
use crate::models::vehicle::VehicleCategory;
use crate::utils::errors::AppResult;

/// Datos usados para nombrar la carpeta de un vehículo
#[derive(Debug, Clone)]
pub struct FolderRequest<'a> {
    pub category: VehicleCategory,
    pub make: &'a str,
    pub model: &'a str,
    pub trim: Option<&'a str>,
    pub year: i32,
}

/// Foto listada desde el almacenamiento externo
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredPhoto {
    pub id: String,
    pub name: String,
    pub url: String,
}

#[async_trait]
pub trait PhotoStorage: Send + Sync {
    /// Crea la carpeta pública del vehículo y devuelve su id
    async fn create_folder(&self, request: &FolderRequest<'_>) -> AppResult<String>;

    /// Sube una foto como `photo_<index>.<ext>` y devuelve su URL pública
    async fn upload_photo(
        &self,
        folder_id: &str,
        photo: &PhotoUpload,
        index: usize,
    ) -> AppResult<String>;

    /// Lista las imágenes de la carpeta, ordenadas por índice de foto
    async fn list_folder_photos(&self, folder_id: &str) -> AppResult<Vec<StoredPhoto>>;

    /// Borra la carpeta con todo su contenido
    async fn delete_folder(&self, folder_id: &str) -> AppResult<()>;
}

/// `"<make> <model> <trim> <year> <YYYYMMDDHHMMSS>"`, sin el trim si no existe
pub fn folder_name(request: &FolderRequest<'_>, now: DateTime<Utc>) -> String {
    let year = request.year.to_string();
    let timestamp = now.format("%Y%m%d%H%M%S").to_string();

    [
        Some(request.make),
        Some(request.model),
        request.trim,
        Some(year.as_str()),
        Some(timestamp.as_str()),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(" ")
}

/// `photo_<index>.<ext>` conservando la extensión original
pub fn photo_file_name(index: usize, original_name: &str, content_type: &str) -> String {
    format!("photo_{}.{}", index, photo_extension(original_name, content_type))
}

fn photo_extension(original_name: &str, content_type: &str) -> String {
    if let Some((stem, ext)) = original_name.rsplit_once('.') {
        if !stem.is_empty() && !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return ext.to_string();
        }
    }

    // Sin extensión en el nombre: derivarla del tipo MIME
    match content_type.split_once('/').map(|(_, subtype)| subtype) {
        Some("jpeg") | Some("pjpeg") => "jpg".to_string(),
        Some("svg+xml") => "svg".to_string(),
        Some(subtype) if !subtype.is_empty() => subtype.to_string(),
        _ => "bin".to_string(),
    }
}

/// Índice numérico de un nombre `photo_<n>.<ext>`
pub fn photo_index(name: &str) -> Option<usize> {
    name.strip_prefix("photo_")?
        .split('.')
        .next()?
        .parse()
        .ok()
}

/// Ordena por índice numérico; `photo_10` queda después de `photo_2`.
/// Los nombres fuera del esquema van al final, por nombre.
pub fn sort_by_photo_index(photos: &mut [StoredPhoto]) {
    photos.sort_by(|a, b| {
        match (photo_index(&a.name), photo_index(&b.name)) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.name.cmp(&b.name),
        }
    });
}
