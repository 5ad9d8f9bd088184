//! Services module
//!
//! Este módulo contiene la lógica de negocio de la aplicación.
//! Los servicios encapsulan operaciones que involucran la base de datos
//! y el almacenamiento externo de fotos.

pub mod vehicle_workflow;

pub use vehicle_workflow::*;
