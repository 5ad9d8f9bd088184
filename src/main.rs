use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use vehicle_listing::clients::GoogleDriveClient;
use vehicle_listing::config::EnvironmentConfig;
use vehicle_listing::database::connect_and_migrate;
use vehicle_listing::middleware::cors_layer;
use vehicle_listing::repositories::VehicleRepository;
use vehicle_listing::routes::create_router;
use vehicle_listing::services::VehicleWorkflow;
use vehicle_listing::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();
    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    info!("🚗 Vehicle Listing API");
    info!("======================");
    info!("🌍 Entorno: {}", config.environment);
    if !config.is_production() && config.cors_origins.is_none() {
        warn!("⚠️ CORS_ORIGINS no definido: se aceptan requests de cualquier origen");
    }

    // Inicializar base de datos
    let pool = match connect_and_migrate(&config.database).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {:#}", e);
            return Err(e);
        }
    };

    // Una sola sesión de Google Drive para todo el proceso
    let drive = GoogleDriveClient::new(config.drive.clone())
        .map_err(|e| anyhow::anyhow!("Error creando cliente de Google Drive: {}", e))?;
    for category in vehicle_listing::models::VehicleCategory::ALL {
        if config.drive.parent_folder(category).is_err() {
            warn!(
                "⚠️ Sin carpeta padre para '{}': esa categoría no se puede registrar",
                category.as_str()
            );
        }
    }

    let workflow = VehicleWorkflow::new(
        Arc::new(VehicleRepository::new(pool)),
        Arc::new(drive),
    );

    let app = create_router(AppState::new(workflow), config.max_upload_bytes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config.cors_origins.as_deref()));

    let addr: SocketAddr = config.server_url().parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET    /health - Health check");
    info!("   POST   /api/vehicles - Registrar vehículo (multipart, 3 a 15 fotos)");
    info!("   GET    /api/vehicles - Listar vehículos disponibles");
    info!("   GET    /api/vehicles/:id - Obtener vehículo");
    info!("   PATCH  /api/vehicles/:id/status - Actualizar estado");
    info!("   DELETE /api/vehicles/:id - Eliminar vehículo");
    info!("   GET    /api/vehicles/:id/folder-photos - Fotos en Google Drive");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
