//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle, sus fotos y los enums del anuncio.
//! Mapea exactamente al schema PostgreSQL de `migrations/` con primary key 'id'.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;
use uuid::Uuid;

/// Error al interpretar un literal de enum recibido del formulario
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

fn unknown(kind: &'static str, value: &str) -> UnknownVariant {
    UnknownVariant {
        kind,
        value: value.to_string(),
    }
}

/// Normaliza un literal para compararlo sin importar mayúsculas ni espacios
fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Tipo de vehículo - mapea al ENUM vehicle_category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "vehicle_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VehicleCategory {
    Car,
    Pickup,
    Motorcycle,
    VanUtility,
}

impl VehicleCategory {
    pub const ALL: [VehicleCategory; 4] = [
        VehicleCategory::Car,
        VehicleCategory::Pickup,
        VehicleCategory::Motorcycle,
        VehicleCategory::VanUtility,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleCategory::Car => "car",
            VehicleCategory::Pickup => "pickup",
            VehicleCategory::Motorcycle => "motorcycle",
            VehicleCategory::VanUtility => "van_utility",
        }
    }
}

impl FromStr for VehicleCategory {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "car" | "carro" => Ok(VehicleCategory::Car),
            "pickup" | "picape" => Ok(VehicleCategory::Pickup),
            "motorcycle" | "moto" => Ok(VehicleCategory::Motorcycle),
            "van_utility" | "van/utility" | "van/utilitário" | "van/utilitario" | "van" => {
                Ok(VehicleCategory::VanUtility)
            }
            _ => Err(unknown("category", s)),
        }
    }
}

/// Combustible - mapea al ENUM fuel_type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "fuel_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    Flex,
    Gasoline,
    Diesel,
    Electric,
    Hybrid,
}

impl FromStr for FuelType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "flex" => Ok(FuelType::Flex),
            "gasoline" | "gasolina" => Ok(FuelType::Gasoline),
            "diesel" => Ok(FuelType::Diesel),
            "electric" | "elétrico" | "eletrico" => Ok(FuelType::Electric),
            "hybrid" | "híbrido" | "hibrido" => Ok(FuelType::Hybrid),
            _ => Err(unknown("fuel type", s)),
        }
    }
}

/// Câmbio - mapea al ENUM transmission_type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "transmission_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Transmission {
    Manual,
    Automatic,
    Automated,
    Cvt,
}

impl FromStr for Transmission {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "manual" => Ok(Transmission::Manual),
            "automatic" | "automático" | "automatico" => Ok(Transmission::Automatic),
            "automated" | "automatizado" => Ok(Transmission::Automated),
            "cvt" => Ok(Transmission::Cvt),
            _ => Err(unknown("transmission", s)),
        }
    }
}

/// Estado de conservación - mapea al ENUM vehicle_condition
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "vehicle_condition", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VehicleCondition {
    New,
    SemiNew,
    Used,
}

impl FromStr for VehicleCondition {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "new" | "novo" => Ok(VehicleCondition::New),
            "semi_new" | "semi-new" | "semi-novo" | "seminovo" => Ok(VehicleCondition::SemiNew),
            "used" | "usado" => Ok(VehicleCondition::Used),
            _ => Err(unknown("condition", s)),
        }
    }
}

/// Estado del anuncio - mapea al ENUM vehicle_status
///
/// No hay grafo de transiciones: cualquier estado puede pasar a cualquier otro.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "vehicle_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    Available,
    Reserved,
    Sold,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Available => "available",
            VehicleStatus::Reserved => "reserved",
            VehicleStatus::Sold => "sold",
        }
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "available" | "disponivel" | "disponível" => Ok(VehicleStatus::Available),
            "reserved" | "reservado" => Ok(VehicleStatus::Reserved),
            "sold" | "vendido" => Ok(VehicleStatus::Sold),
            _ => Err(unknown("status", s)),
        }
    }
}

/// Vehicle principal - mapea exactamente a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub category: VehicleCategory,
    pub engine_displacement: Option<String>,
    pub make: String,
    pub model: String,
    pub trim: Option<String>,
    pub model_year: i32,
    pub manufacture_year: i32,
    pub plate_final_digit: Option<i16>,
    pub mileage_km: i64,
    pub fuel_type: FuelType,
    pub transmission: Transmission,
    pub color: String,
    pub condition: VehicleCondition,
    pub single_owner: bool,
    pub road_tax_paid: bool,
    pub licensed: bool,
    pub accepts_trade: bool,
    pub has_factory_warranty: bool,
    pub warranty_expires_on: Option<NaiveDate>,
    pub has_maintenance_history: bool,
    pub maintenance_details: Option<String>,
    pub price: Decimal,
    pub options: Vec<String>,
    pub other_options: Option<String>,
    pub drive_folder_id: String,
    pub status: VehicleStatus,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Foto de un vehículo - mapea a la tabla vehicle_photos
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VehiclePhoto {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub url: String,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

/// Vehículo con sus fotos ordenadas por `display_order`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleWithPhotos {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub photos: Vec<VehiclePhoto>,
}

/// Datos ya validados para insertar un vehículo nuevo.
///
/// El estado inicial siempre es `available` y `drive_folder_id` se fija aquí
/// una sola vez; ninguna operación posterior lo reasigna.
#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub category: VehicleCategory,
    pub engine_displacement: Option<String>,
    pub make: String,
    pub model: String,
    pub trim: Option<String>,
    pub model_year: i32,
    pub manufacture_year: i32,
    pub plate_final_digit: Option<i16>,
    pub mileage_km: i64,
    pub fuel_type: FuelType,
    pub transmission: Transmission,
    pub color: String,
    pub condition: VehicleCondition,
    pub single_owner: bool,
    pub road_tax_paid: bool,
    pub licensed: bool,
    pub accepts_trade: bool,
    pub has_factory_warranty: bool,
    pub warranty_expires_on: Option<NaiveDate>,
    pub has_maintenance_history: bool,
    pub maintenance_details: Option<String>,
    pub price: Decimal,
    pub options: Vec<String>,
    pub other_options: Option<String>,
    pub drive_folder_id: String,
    pub user_id: Option<Uuid>,
}
