//! Tests del repositorio contra PostgreSQL real.
//!
//! `#[sqlx::test]` crea una base temporal por test (usa `DATABASE_URL`) y
//! aplica las migraciones de `migrations/`.

mod common;

use sqlx::PgPool;
use uuid::Uuid;

use common::{car_form, form_from, motorcycle_fields};
use vehicle_listing::models::vehicle::{NewVehicle, VehicleStatus};
use vehicle_listing::repositories::vehicle_repository::{VehicleRepository, VehicleStore};
use vehicle_listing::utils::errors::AppError;

fn car(folder_id: &str) -> NewVehicle {
    car_form().into_new_vehicle(folder_id.to_string())
}

fn urls(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("https://drive.google.com/thumbnail?id=file-{}&sz=w1000", i))
        .collect()
}

async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test]
async fn test_insert_with_photos_keeps_order(pool: PgPool) {
    let repo = VehicleRepository::new(pool.clone());

    let created = repo.insert_with_photos(car("folder-1"), urls(12)).await.unwrap();

    assert_eq!(created.vehicle.status, VehicleStatus::Available);
    assert_eq!(created.vehicle.drive_folder_id, "folder-1");
    assert_eq!(created.vehicle.options, vec!["ABS".to_string(), "Ar-condicionado".to_string()]);

    let fetched = repo.find_by_id(created.vehicle.id).await.unwrap().unwrap();
    let orders: Vec<i32> = fetched.photos.iter().map(|p| p.display_order).collect();
    assert_eq!(orders, (0..12).collect::<Vec<_>>());
    assert_eq!(fetched.photos[10].url, urls(12)[10]);
    assert_eq!(fetched.vehicle.price, created.vehicle.price);
}

#[sqlx::test]
async fn test_failed_photo_insert_rolls_back_vehicle(pool: PgPool) {
    let repo = VehicleRepository::new(pool.clone());
    // PostgreSQL no acepta NUL dentro de TEXT: falla la segunda foto
    let photo_urls = vec!["https://example.com/0".to_string(), "bad\0url".to_string()];

    let result = repo.insert_with_photos(car("folder-1"), photo_urls).await;

    assert!(matches!(result, Err(AppError::Database(_))));
    assert_eq!(count(&pool, "vehicles").await, 0);
    assert_eq!(count(&pool, "vehicle_photos").await, 0);
}

#[sqlx::test]
async fn test_list_by_status_newest_first(pool: PgPool) {
    let repo = VehicleRepository::new(pool.clone());
    let older = repo.insert_with_photos(car("folder-old"), urls(3)).await.unwrap();
    let newer = repo
        .insert_with_photos(
            form_from(&motorcycle_fields(Some("150cc"))).into_new_vehicle("folder-new".into()),
            urls(4),
        )
        .await
        .unwrap();
    let sold = repo.insert_with_photos(car("folder-sold"), urls(3)).await.unwrap();

    sqlx::query("UPDATE vehicles SET created_at = NOW() - INTERVAL '1 hour' WHERE id = $1")
        .bind(older.vehicle.id)
        .execute(&pool)
        .await
        .unwrap();
    repo.update_status(sold.vehicle.id, VehicleStatus::Sold)
        .await
        .unwrap();

    let listed = repo.list_by_status(VehicleStatus::Available).await.unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|v| v.vehicle.id).collect();
    assert_eq!(ids, vec![newer.vehicle.id, older.vehicle.id]);
    assert_eq!(listed[0].photos.len(), 4);
    assert_eq!(listed[1].photos.len(), 3);
    assert!(listed
        .iter()
        .all(|v| v.photos.iter().all(|p| p.vehicle_id == v.vehicle.id)));

    let sold_listing = repo.list_by_status(VehicleStatus::Sold).await.unwrap();
    assert_eq!(sold_listing.len(), 1);
    assert_eq!(sold_listing[0].vehicle.id, sold.vehicle.id);
}

#[sqlx::test]
async fn test_update_status_refreshes_timestamp(pool: PgPool) {
    let repo = VehicleRepository::new(pool.clone());
    let created = repo.insert_with_photos(car("folder-1"), urls(3)).await.unwrap();

    let updated = repo
        .update_status(created.vehicle.id, VehicleStatus::Reserved)
        .await
        .unwrap();

    assert_eq!(updated.status, VehicleStatus::Reserved);
    assert!(updated.updated_at >= created.vehicle.updated_at);
    assert_eq!(updated.created_at, created.vehicle.created_at);
}

#[sqlx::test]
async fn test_update_status_unknown_id_is_not_found(pool: PgPool) {
    let repo = VehicleRepository::new(pool);

    let result = repo.update_status(Uuid::new_v4(), VehicleStatus::Sold).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[sqlx::test]
async fn test_delete_cascades_photos(pool: PgPool) {
    let repo = VehicleRepository::new(pool.clone());
    let kept = repo.insert_with_photos(car("folder-kept"), urls(3)).await.unwrap();
    let removed = repo.insert_with_photos(car("folder-removed"), urls(5)).await.unwrap();

    assert_eq!(
        repo.find_folder_id(removed.vehicle.id).await.unwrap().as_deref(),
        Some("folder-removed")
    );
    assert!(repo.delete(removed.vehicle.id).await.unwrap());

    assert!(repo.find_by_id(removed.vehicle.id).await.unwrap().is_none());
    assert!(repo.find_folder_id(removed.vehicle.id).await.unwrap().is_none());
    assert_eq!(count(&pool, "vehicle_photos").await, 3);
    assert!(repo.find_by_id(kept.vehicle.id).await.unwrap().is_some());

    // Un segundo delete ya no encuentra la fila
    assert!(!repo.delete(removed.vehicle.id).await.unwrap());
}

#[sqlx::test]
async fn test_ping(pool: PgPool) {
    let repo = VehicleRepository::new(pool);
    assert!(repo.ping().await.is_ok());
}
