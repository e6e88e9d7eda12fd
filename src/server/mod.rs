use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::config::Settings;

pub mod api;
pub mod routes;
pub mod static_files;

/// Blocks the calling thread on a fresh tokio runtime until the server stops.
pub fn run_server(settings: Settings) -> std::io::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(settings))
}

pub async fn serve(settings: Settings) -> std::io::Result<()> {
    let listener = TcpListener::bind(&settings.bind_addr).await?;
    println!("navlist server listening on http://{}", settings.bind_addr);
    info!(
        dataset = %settings.dataset_path.display(),
        registry = %settings.registry_path.display(),
        "serving nav list"
    );
    axum::serve(listener, routes::router(Arc::new(settings))).await
}
