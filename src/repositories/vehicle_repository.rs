use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use crate::models::vehicle::{NewVehicle, Vehicle, VehiclePhoto, VehicleStatus, VehicleWithPhotos};
use crate::utils::errors::{not_found_error, AppError, AppResult};

/// Acceso a las tablas `vehicles` y `vehicle_photos`.
///
/// Borrar un vehículo borra sus fotos (ON DELETE CASCADE), sin importar
/// lo que pase con el almacenamiento externo.
#[async_trait]
pub trait VehicleStore: Send + Sync {
    /// Inserta el vehículo y sus fotos en una sola transacción.
    /// `photo_urls[i]` se guarda con `display_order = i`.
    async fn insert_with_photos(
        &self,
        vehicle: NewVehicle,
        photo_urls: Vec<String>,
    ) -> AppResult<VehicleWithPhotos>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<VehicleWithPhotos>>;

    /// Vehículos con el estado dado, más nuevos primero
    async fn list_by_status(&self, status: VehicleStatus) -> AppResult<Vec<VehicleWithPhotos>>;

    /// Cambia el estado y refresca `updated_at`; `NotFound` si no existe
    async fn update_status(&self, id: Uuid, status: VehicleStatus) -> AppResult<Vehicle>;

    async fn find_folder_id(&self, id: Uuid) -> AppResult<Option<String>>;

    /// Devuelve `false` si no había fila con ese id
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    async fn ping(&self) -> AppResult<()>;
}

pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn photos_for(
        &self,
        vehicle_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, Vec<VehiclePhoto>>> {
        if vehicle_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let photos = sqlx::query_as::<_, VehiclePhoto>(
            r#"
            SELECT id, vehicle_id, url, display_order, created_at
            FROM vehicle_photos
            WHERE vehicle_id = ANY($1)
            ORDER BY vehicle_id, display_order ASC
            "#,
        )
        .bind(vehicle_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<VehiclePhoto>> = HashMap::new();
        for photo in photos {
            grouped.entry(photo.vehicle_id).or_default().push(photo);
        }
        Ok(grouped)
    }
}

#[async_trait]
impl VehicleStore for VehicleRepository {
    async fn insert_with_photos(
        &self,
        vehicle: NewVehicle,
        photo_urls: Vec<String>,
    ) -> AppResult<VehicleWithPhotos> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (
                id, category, engine_displacement, make, model, trim, model_year,
                manufacture_year, plate_final_digit, mileage_km, fuel_type, transmission,
                color, condition, single_owner, road_tax_paid, licensed, accepts_trade,
                has_factory_warranty, warranty_expires_on, has_maintenance_history,
                maintenance_details, price, options, other_options, drive_folder_id,
                status, user_id, created_at, updated_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, 'available', $27,
                NOW(), NOW()
            )
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(vehicle.category)
        .bind(vehicle.engine_displacement)
        .bind(vehicle.make)
        .bind(vehicle.model)
        .bind(vehicle.trim)
        .bind(vehicle.model_year)
        .bind(vehicle.manufacture_year)
        .bind(vehicle.plate_final_digit)
        .bind(vehicle.mileage_km)
        .bind(vehicle.fuel_type)
        .bind(vehicle.transmission)
        .bind(vehicle.color)
        .bind(vehicle.condition)
        .bind(vehicle.single_owner)
        .bind(vehicle.road_tax_paid)
        .bind(vehicle.licensed)
        .bind(vehicle.accepts_trade)
        .bind(vehicle.has_factory_warranty)
        .bind(vehicle.warranty_expires_on)
        .bind(vehicle.has_maintenance_history)
        .bind(vehicle.maintenance_details)
        .bind(vehicle.price)
        .bind(vehicle.options)
        .bind(vehicle.other_options)
        .bind(vehicle.drive_folder_id)
        .bind(vehicle.user_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut photos = Vec::with_capacity(photo_urls.len());
        for (display_order, url) in photo_urls.into_iter().enumerate() {
            let display_order = i32::try_from(display_order)
                .map_err(|_| AppError::Internal("photo index out of range".to_string()))?;

            let photo = sqlx::query_as::<_, VehiclePhoto>(
                r#"
                INSERT INTO vehicle_photos (id, vehicle_id, url, display_order, created_at)
                VALUES ($1, $2, $3, $4, NOW())
                RETURNING id, vehicle_id, url, display_order, created_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(inserted.id)
            .bind(url)
            .bind(display_order)
            .fetch_one(&mut *tx)
            .await?;

            photos.push(photo);
        }

        // Si algo falló antes, el drop de `tx` hace rollback
        tx.commit().await?;

        debug!("💾 Vehículo {} guardado con {} fotos", inserted.id, photos.len());
        Ok(VehicleWithPhotos {
            vehicle: inserted,
            photos,
        })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<VehicleWithPhotos>> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(vehicle) = vehicle else {
            return Ok(None);
        };

        let photos = self
            .photos_for(&[vehicle.id])
            .await?
            .remove(&vehicle.id)
            .unwrap_or_default();

        Ok(Some(VehicleWithPhotos { vehicle, photos }))
    }

    async fn list_by_status(&self, status: VehicleStatus) -> AppResult<Vec<VehicleWithPhotos>> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles WHERE status = $1 ORDER BY created_at DESC",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = vehicles.iter().map(|v| v.id).collect();
        let mut photos = self.photos_for(&ids).await?;

        Ok(vehicles
            .into_iter()
            .map(|vehicle| {
                let photos = photos.remove(&vehicle.id).unwrap_or_default();
                VehicleWithPhotos { vehicle, photos }
            })
            .collect())
    }

    async fn update_status(&self, id: Uuid, status: VehicleStatus) -> AppResult<Vehicle> {
        sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))
    }

    async fn find_folder_id(&self, id: Uuid) -> AppResult<Option<String>> {
        let folder_id = sqlx::query_scalar::<_, String>(
            "SELECT drive_folder_id FROM vehicles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(folder_id)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
