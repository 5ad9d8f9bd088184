//! Workflow de vehículos
//!
//! Coordina la base de datos relacional y el almacenamiento externo de fotos
//! para crear, listar, consultar, cambiar de estado y borrar anuncios.
//!
//! Orden de creación: validar, crear la carpeta, subir las fotos una por una
//! (índice = orden de envío) y recién entonces insertar vehículo + fotos en una
//! única transacción. Si algo falla no queda ninguna fila; la carpeta y las
//! fotos ya subidas quedan huérfanas en Drive y se registran en el log.
//!
//! Al borrar, la fila es lo que manda: primero se borra el registro y después
//! se intenta borrar la carpeta. Un fallo en Drive sólo se registra.

use std::str::FromStr;
use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::clients::photo_storage::{FolderRequest, PhotoStorage, StoredPhoto};
use crate::dto::vehicle_dto::{PhotoUpload, VehicleForm};
use crate::models::vehicle::{Vehicle, VehicleStatus, VehicleWithPhotos};
use crate::repositories::vehicle_repository::VehicleStore;
use crate::utils::errors::{not_found_error, validation_error, AppResult};

pub const MIN_PHOTOS: usize = 3;
pub const MAX_PHOTOS: usize = 15;

pub struct VehicleWorkflow {
    store: Arc<dyn VehicleStore>,
    storage: Arc<dyn PhotoStorage>,
}

impl VehicleWorkflow {
    pub fn new(store: Arc<dyn VehicleStore>, storage: Arc<dyn PhotoStorage>) -> Self {
        Self { store, storage }
    }

    /// Crear un anuncio con sus fotos. Devuelve el vehículo con sus fotos.
    pub async fn create(
        &self,
        form: VehicleForm,
        photos: Vec<PhotoUpload>,
    ) -> AppResult<VehicleWithPhotos> {
        if photos.len() < MIN_PHOTOS {
            return Err(validation_error("photos", "minimum 3 photos"));
        }
        if let Some(photo) = photos
            .iter()
            .find(|p| !p.content_type.starts_with("image/"))
        {
            return Err(validation_error(
                "photos",
                format!("{} is not an image ({})", photo.file_name, photo.content_type),
            ));
        }
        form.validate()?;

        let folder_id = self
            .storage
            .create_folder(&FolderRequest {
                category: form.category,
                make: &form.make,
                model: &form.model,
                trim: form.trim.as_deref(),
                year: form.model_year,
            })
            .await?;

        let mut photo_urls = Vec::with_capacity(photos.len());
        for (index, photo) in photos.iter().enumerate() {
            match self.storage.upload_photo(&folder_id, photo, index).await {
                Ok(url) => photo_urls.push(url),
                Err(e) => {
                    error!(
                        "❌ Falló la subida de la foto {} a la carpeta {}; \
                         la carpeta queda huérfana ({} fotos subidas)",
                        index,
                        folder_id,
                        photo_urls.len()
                    );
                    return Err(e);
                }
            }
        }

        let new_vehicle = form.into_new_vehicle(folder_id.clone());
        let created = match self.store.insert_with_photos(new_vehicle, photo_urls).await {
            Ok(created) => created,
            Err(e) => {
                error!(
                    "❌ No se pudo guardar el vehículo; la carpeta {} queda huérfana",
                    folder_id
                );
                return Err(e);
            }
        };

        info!(
            "🚗 Vehículo {} creado con {} fotos (carpeta {})",
            created.vehicle.id,
            created.photos.len(),
            folder_id
        );
        Ok(created)
    }

    /// Vehículos disponibles, más nuevos primero
    pub async fn list_available(&self) -> AppResult<Vec<VehicleWithPhotos>> {
        self.store.list_by_status(VehicleStatus::Available).await
    }

    /// Vehículo por id, en cualquier estado
    pub async fn get(&self, id: Uuid) -> AppResult<VehicleWithPhotos> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))
    }

    /// Cambiar el estado; cualquier estado puede pasar a cualquier otro
    pub async fn update_status(&self, id: Uuid, status: &str) -> AppResult<Vehicle> {
        let status = VehicleStatus::from_str(status)
            .map_err(|e| validation_error("status", e.to_string()))?;

        let vehicle = self.store.update_status(id, status).await?;
        info!("🔄 Vehículo {} ahora está {}", id, status);
        Ok(vehicle)
    }

    /// Borrar el registro y después, sin fallar, la carpeta externa
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let folder_id = self
            .store
            .find_folder_id(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))?;

        // Otro request pudo haberlo borrado entre la consulta y el delete
        if !self.store.delete(id).await? {
            return Err(not_found_error("Vehicle", &id.to_string()));
        }
        info!("🗑️ Vehículo {} borrado", id);

        if let Err(e) = self.storage.delete_folder(&folder_id).await {
            warn!(
                "⚠️ No se pudo borrar la carpeta {} del vehículo {}: {}",
                folder_id, id, e
            );
        }

        Ok(())
    }

    /// Fotos tal como están en el almacenamiento externo
    pub async fn list_folder_photos(&self, id: Uuid) -> AppResult<Vec<StoredPhoto>> {
        let vehicle = self.get(id).await?;
        self.storage
            .list_folder_photos(&vehicle.vehicle.drive_folder_id)
            .await
    }

    /// Verificar la conexión con la base de datos
    pub async fn database_ready(&self) -> bool {
        match self.store.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!("⚠️ Health check: base de datos no disponible: {}", e);
                false
            }
        }
    }
}
