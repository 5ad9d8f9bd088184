//! Vehicle listing API
//!
//! Registro de vehículos en venta con fotos en Google Drive y datos en PostgreSQL.

pub mod clients;
pub mod config;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
