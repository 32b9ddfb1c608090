// ============================================================================
// FISCAL DEVICE SERVER - Dispositivo fiscal simulado
// ============================================================================
// Este binario sirve únicamente los endpoints del dispositivo:
// - POST /fiscalize
// - GET  /static/qr_codes/{file}
// - GET  /health
// - GET  /metrics
// ============================================================================

use anyhow::Result;
use fiscal_invoices::{create_device_router, state::DeviceState};
use shared::Config;
use std::{net::SocketAddr, sync::Arc};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

// 🚀 JEMALLOC ALLOCATOR
#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("🛑 Signal received, starting graceful shutdown");
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)] // Servicio liviano
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::new(&config.app.log_level))
        .with_ansi(!config.is_production())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("🖨️ Starting fiscal device server");

    // ServeDir necesita el directorio desde el arranque.
    tokio::fs::create_dir_all(&config.qr.output_dir).await?;
    info!("✅ QR codes stored under {}", config.qr.output_dir.display());

    let port = config.app.device_port;
    let app = create_device_router(Arc::new(DeviceState::new(config)));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("🚀 Fiscal device listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("✅ Fiscal device shutdown completed");
    Ok(())
}
