use std::path::Path;

use anyhow::Context;
use dts_forge::{bootstrap, registry, GeneratorConfig};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod dtos;
mod handlers;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("product_service=info,dts_forge=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    if std::env::args().any(|arg| arg == "--dump-catalog") {
        let catalog = registry::inventory_catalog();
        println!("{}", catalog.to_json_string()?);
        return Ok(());
    }

    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let config = GeneratorConfig::from_cargo_manifest(&manifest_dir.join("Cargo.toml"))
        .context("failed to read [package.metadata.dts_forge]")?
        .unwrap_or_default();
    let output_dir = manifest_dir.join(config.output_dir_or_default());
    if bootstrap::generate_if_local_dev(&output_dir)? {
        tracing::info!(path = %output_dir.display(), "TypeScript declarations regenerated");
    }

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
    tracing::info!("🚀 Server running at http://127.0.0.1:3000");
    axum::serve(listener, handlers::router()).await?;
    Ok(())
}
