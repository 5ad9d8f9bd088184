//! Dobles en memoria para la base de datos y Google Drive
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Bytes;
use chrono::Utc;
use uuid::Uuid;

use vehicle_listing::clients::photo_storage::{
    folder_name, photo_file_name, sort_by_photo_index, FolderRequest, PhotoStorage, StoredPhoto,
};
use vehicle_listing::dto::vehicle_dto::{PhotoUpload, VehicleForm};
use vehicle_listing::models::vehicle::{
    NewVehicle, Vehicle, VehicleCategory, VehiclePhoto, VehicleStatus, VehicleWithPhotos,
};
use vehicle_listing::repositories::vehicle_repository::VehicleStore;
use vehicle_listing::services::vehicle_workflow::VehicleWorkflow;
use vehicle_listing::utils::errors::{not_found_error, AppError, AppResult};

#[derive(Default)]
pub struct InMemoryVehicleStore {
    vehicles: Mutex<Vec<VehicleWithPhotos>>,
    pub fail_inserts: AtomicBool,
    pub fail_ping: AtomicBool,
}

impl InMemoryVehicleStore {
    pub fn count(&self) -> usize {
        self.vehicles.lock().unwrap().len()
    }

    pub fn photo_count(&self) -> usize {
        self.vehicles
            .lock()
            .unwrap()
            .iter()
            .map(|v| v.photos.len())
            .sum()
    }
}

#[async_trait]
impl VehicleStore for InMemoryVehicleStore {
    async fn insert_with_photos(
        &self,
        new: NewVehicle,
        photo_urls: Vec<String>,
    ) -> AppResult<VehicleWithPhotos> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }

        let now = Utc::now();
        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            category: new.category,
            engine_displacement: new.engine_displacement,
            make: new.make,
            model: new.model,
            trim: new.trim,
            model_year: new.model_year,
            manufacture_year: new.manufacture_year,
            plate_final_digit: new.plate_final_digit,
            mileage_km: new.mileage_km,
            fuel_type: new.fuel_type,
            transmission: new.transmission,
            color: new.color,
            condition: new.condition,
            single_owner: new.single_owner,
            road_tax_paid: new.road_tax_paid,
            licensed: new.licensed,
            accepts_trade: new.accepts_trade,
            has_factory_warranty: new.has_factory_warranty,
            warranty_expires_on: new.warranty_expires_on,
            has_maintenance_history: new.has_maintenance_history,
            maintenance_details: new.maintenance_details,
            price: new.price,
            options: new.options,
            other_options: new.other_options,
            drive_folder_id: new.drive_folder_id,
            status: VehicleStatus::Available,
            user_id: new.user_id,
            created_at: now,
            updated_at: now,
        };

        let photos = photo_urls
            .into_iter()
            .enumerate()
            .map(|(order, url)| VehiclePhoto {
                id: Uuid::new_v4(),
                vehicle_id: vehicle.id,
                url,
                display_order: order as i32,
                created_at: now,
            })
            .collect();

        let created = VehicleWithPhotos { vehicle, photos };
        self.vehicles.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<VehicleWithPhotos>> {
        Ok(self
            .vehicles
            .lock()
            .unwrap()
            .iter()
            .find(|v| v.vehicle.id == id)
            .cloned())
    }

    async fn list_by_status(&self, status: VehicleStatus) -> AppResult<Vec<VehicleWithPhotos>> {
        // Insertados después van primero cuando empatan en created_at
        let mut vehicles: Vec<VehicleWithPhotos> = self
            .vehicles
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|v| v.vehicle.status == status)
            .cloned()
            .collect();
        vehicles.sort_by(|a, b| b.vehicle.created_at.cmp(&a.vehicle.created_at));
        Ok(vehicles)
    }

    async fn update_status(&self, id: Uuid, status: VehicleStatus) -> AppResult<Vehicle> {
        let mut vehicles = self.vehicles.lock().unwrap();
        let entry = vehicles
            .iter_mut()
            .find(|v| v.vehicle.id == id)
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))?;

        entry.vehicle.status = status;
        entry.vehicle.updated_at = Utc::now().max(entry.vehicle.updated_at);
        Ok(entry.vehicle.clone())
    }

    async fn find_folder_id(&self, id: Uuid) -> AppResult<Option<String>> {
        Ok(self
            .vehicles
            .lock()
            .unwrap()
            .iter()
            .find(|v| v.vehicle.id == id)
            .map(|v| v.vehicle.drive_folder_id.clone()))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut vehicles = self.vehicles.lock().unwrap();
        let before = vehicles.len();
        vehicles.retain(|v| v.vehicle.id != id);
        Ok(vehicles.len() < before)
    }

    async fn ping(&self) -> AppResult<()> {
        if self.fail_ping.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeDrive {
    pub folders: HashMap<String, Vec<StoredPhoto>>,
    pub folder_names: HashMap<String, String>,
    pub deleted: Vec<String>,
    pub create_folder_calls: usize,
}

#[derive(Default)]
pub struct FakePhotoStorage {
    pub drive: Mutex<FakeDrive>,
    pub fail_create_folder: AtomicBool,
    pub fail_delete: AtomicBool,
    pub fail_upload_at: Mutex<Option<usize>>,
    pub unconfigured: Mutex<Option<VehicleCategory>>,
}

impl FakePhotoStorage {
    pub fn folder_count(&self) -> usize {
        self.drive.lock().unwrap().folders.len()
    }

    pub fn create_folder_calls(&self) -> usize {
        self.drive.lock().unwrap().create_folder_calls
    }

    pub fn uploaded_to(&self, folder_id: &str) -> Vec<StoredPhoto> {
        self.drive
            .lock()
            .unwrap()
            .folders
            .get(folder_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.drive.lock().unwrap().deleted.clone()
    }
}

#[async_trait]
impl PhotoStorage for FakePhotoStorage {
    async fn create_folder(&self, request: &FolderRequest<'_>) -> AppResult<String> {
        let mut drive = self.drive.lock().unwrap();
        drive.create_folder_calls += 1;

        if *self.unconfigured.lock().unwrap() == Some(request.category) {
            return Err(AppError::Configuration(format!(
                "no parent folder configured for category '{}'",
                request.category.as_str()
            )));
        }
        if self.fail_create_folder.load(Ordering::SeqCst) {
            return Err(AppError::ExternalApi("create folder: HTTP 503".to_string()));
        }

        let id = format!("folder-{}", Uuid::new_v4().simple());
        drive.folders.insert(id.clone(), Vec::new());
        drive
            .folder_names
            .insert(id.clone(), folder_name(request, Utc::now()));
        Ok(id)
    }

    async fn upload_photo(
        &self,
        folder_id: &str,
        photo: &PhotoUpload,
        index: usize,
    ) -> AppResult<String> {
        if *self.fail_upload_at.lock().unwrap() == Some(index) {
            return Err(AppError::ExternalApi("upload photo: timeout".to_string()));
        }

        let mut drive = self.drive.lock().unwrap();
        let folder = drive
            .folders
            .get_mut(folder_id)
            .ok_or_else(|| AppError::ExternalApi(format!("folder {} not found", folder_id)))?;

        let id = format!("file-{}", Uuid::new_v4().simple());
        let url = format!("https://drive.google.com/thumbnail?id={}&sz=w1000", id);
        folder.push(StoredPhoto {
            id,
            name: photo_file_name(index, &photo.file_name, &photo.content_type),
            url: url.clone(),
        });
        Ok(url)
    }

    async fn list_folder_photos(&self, folder_id: &str) -> AppResult<Vec<StoredPhoto>> {
        let mut photos = self.uploaded_to(folder_id);
        sort_by_photo_index(&mut photos);
        Ok(photos)
    }

    async fn delete_folder(&self, folder_id: &str) -> AppResult<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(AppError::ExternalApi("delete folder: HTTP 500".to_string()));
        }

        let mut drive = self.drive.lock().unwrap();
        drive.folders.remove(folder_id);
        drive.deleted.push(folder_id.to_string());
        Ok(())
    }
}

pub struct Harness {
    pub store: Arc<InMemoryVehicleStore>,
    pub storage: Arc<FakePhotoStorage>,
    pub workflow: VehicleWorkflow,
}

pub fn harness() -> Harness {
    let store = Arc::new(InMemoryVehicleStore::default());
    let storage = Arc::new(FakePhotoStorage::default());
    let workflow = VehicleWorkflow::new(store.clone(), storage.clone());
    Harness {
        store,
        storage,
        workflow,
    }
}

/// Campos de un Gol usado, con los nombres originales del formulario
pub fn car_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("tipo_veiculo", "Carro"),
        ("marca", "Volkswagen"),
        ("modelo", "Gol"),
        ("versao", "1.0 MPI"),
        ("ano_modelo", "2020"),
        ("ano_fabricacao", "2019"),
        ("final_placa", "7"),
        ("quilometragem", "45000"),
        ("combustivel", "Flex"),
        ("cambio", "Manual"),
        ("cor", "Branco"),
        ("estado", "Usado"),
        ("unico_dono", "true"),
        ("ipva_pago", "true"),
        ("licenciado", "false"),
        ("aceita_troca", "false"),
        ("preco", "45990.00"),
        ("opcionais", r#"["Ar-condicionado","ABS"]"#),
    ]
}

pub fn form_from(pairs: &[(&str, &str)]) -> VehicleForm {
    let fields = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    VehicleForm::from_fields(fields).expect("form fields should parse")
}

pub fn car_form() -> VehicleForm {
    form_from(&car_fields())
}

pub fn motorcycle_fields(displacement: Option<&'static str>) -> Vec<(&'static str, &'static str)> {
    let mut fields = vec![
        ("tipo_veiculo", "Moto"),
        ("marca", "Honda"),
        ("modelo", "CG"),
        ("ano_modelo", "2022"),
        ("ano_fabricacao", "2022"),
        ("quilometragem", "12000"),
        ("combustivel", "Gasolina"),
        ("cambio", "Manual"),
        ("cor", "Vermelho"),
        ("estado", "Semi-novo"),
        ("preco", "14500.00"),
    ];
    if let Some(displacement) = displacement {
        fields.push(("cilindradas", displacement));
    }
    fields
}

pub fn photos(count: usize) -> Vec<PhotoUpload> {
    (0..count)
        .map(|i| PhotoUpload {
            file_name: format!("IMG_{:04}.jpg", i),
            content_type: "image/jpeg".to_string(),
            data: Bytes::from(vec![0xFF, 0xD8, 0xFF, i as u8]),
        })
        .collect()
}
