//! Configuración de Google Drive
//!
//! Carpetas padre por categoría, credenciales de la cuenta de servicio
//! y límites de las llamadas al proveedor de archivos.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use super::environment::{parse_or, required};
use crate::models::vehicle::VehicleCategory;
use crate::utils::errors::{AppError, AppResult};

pub const DRIVE_API_BASE_URL: &str = "https://www.googleapis.com/drive/v3";
pub const DRIVE_UPLOAD_BASE_URL: &str = "https://www.googleapis.com/upload/drive/v3";
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";

/// Campos usados de la clave JSON de la cuenta de servicio
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

// La clave privada nunca se imprime
impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"***")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

/// Configuración del proveedor de archivos
#[derive(Debug, Clone)]
pub struct DriveConfig {
    pub service_account: ServiceAccountKey,
    pub parent_folders: HashMap<VehicleCategory, String>,
    pub request_timeout: Duration,
    pub photo_render_width: u32,
    pub api_base_url: String,
    pub upload_base_url: String,
}

impl DriveConfig {
    pub fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_key = required(lookup, "GOOGLE_SERVICE_ACCOUNT")?;
        let service_account: ServiceAccountKey = serde_json::from_str(&raw_key)
            .context("GOOGLE_SERVICE_ACCOUNT must be a service account JSON key")?;

        let parent_folders = VehicleCategory::ALL
            .iter()
            .filter_map(|category| {
                lookup(parent_folder_variable(*category))
                    .map(|id| id.trim().to_string())
                    .filter(|id| !id.is_empty())
                    .map(|id| (*category, id))
            })
            .collect();

        Ok(Self {
            service_account,
            parent_folders,
            request_timeout: Duration::from_secs(parse_or(lookup, "EXTERNAL_TIMEOUT_SECS", 30)?),
            photo_render_width: parse_or(lookup, "PHOTO_RENDER_WIDTH", 1000)?,
            api_base_url: DRIVE_API_BASE_URL.to_string(),
            upload_base_url: DRIVE_UPLOAD_BASE_URL.to_string(),
        })
    }

    /// Carpeta padre configurada para la categoría
    pub fn parent_folder(&self, category: VehicleCategory) -> AppResult<&str> {
        self.parent_folders
            .get(&category)
            .map(String::as_str)
            .ok_or_else(|| {
                AppError::Configuration(format!(
                    "no parent folder configured for category '{}' (set {})",
                    category.as_str(),
                    parent_folder_variable(category)
                ))
            })
    }
}

fn parent_folder_variable(category: VehicleCategory) -> &'static str {
    match category {
        VehicleCategory::Car => "GOOGLE_DRIVE_FOLDER_CAR",
        VehicleCategory::Pickup => "GOOGLE_DRIVE_FOLDER_PICKUP",
        VehicleCategory::Motorcycle => "GOOGLE_DRIVE_FOLDER_MOTORCYCLE",
        VehicleCategory::VanUtility => "GOOGLE_DRIVE_FOLDER_VAN",
    }
}
