//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::services::vehicle_workflow::VehicleWorkflow;

#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<VehicleWorkflow>,
}

impl AppState {
    pub fn new(workflow: VehicleWorkflow) -> Self {
        Self {
            workflow: Arc::new(workflow),
        }
    }
}
