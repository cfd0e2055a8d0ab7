use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

use transport_rostering::config::database::DatabaseConfig;
use transport_rostering::config::{EnvironmentConfig, RosteringPolicy};
use transport_rostering::database::DatabaseConnection;
use transport_rostering::repositories::{MemoryRosterRepository, PgRosterRepository, RosterRepository};
use transport_rostering::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    let level = std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|l| l.parse::<tracing::Level>().ok())
        .unwrap_or(tracing::Level::DEBUG);
    tracing_subscriber::fmt().with_max_level(level).init();

    info!("🚐 Transport Rostering - Conflictos y auto-asignación");
    info!("====================================================");

    let config = EnvironmentConfig::from_env()?;
    let policy = RosteringPolicy::from_env()?;
    info!("📐 Política: {:?}", policy);

    let repository: Arc<dyn RosterRepository> = match &config.database_url {
        Some(url) => {
            let connection = DatabaseConnection::new(&DatabaseConfig::new(url.clone()))
                .await
                .map_err(|e| {
                    error!("❌ Error conectando a la base de datos: {}", e);
                    e
                })?;
            Arc::new(PgRosterRepository::new(connection.pool().clone()))
        }
        None => {
            warn!("⚠️ DATABASE_URL no configurada, usando repositorio en memoria");
            Arc::new(MemoryRosterRepository::new())
        }
    };

    let addr: SocketAddr = config.server_url().parse()?;
    let app = transport_rostering::create_app(AppState::new(config, policy, repository));

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health");
    info!("   POST /api/tenants/:tenant_id/conflicts/check");
    info!("   GET  /api/tenants/:tenant_id/conflicts?start=&end=");
    info!("   GET  /api/tenants/:tenant_id/availability/:entity_type/:entity_id?date=");
    info!("   GET  /api/tenants/:tenant_id/workload?start=&end=");
    info!("   POST /api/tenants/:tenant_id/auto-assign");
    info!("   POST /api/tenants/:tenant_id/auto-assign/apply");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

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
            Ok(mut stream) => {
                stream.recv().await;
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
