//! Configuración del proyecto
//!
//! Este módulo contiene la configuración de base de datos, de Google Drive,
//! variables de entorno y otras configuraciones del sistema.

pub mod database;
pub mod drive;
pub mod environment;

pub use database::DatabaseConfig;
pub use drive::{DriveConfig, ServiceAccountKey};
pub use environment::*;
