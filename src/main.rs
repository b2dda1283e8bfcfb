use std::process::ExitCode;
use std::sync::Arc;

use catalog_schema_core::core::config::Config;
use catalog_schema_core::core::error::AppError;
use catalog_schema_core::features::categories::CategoryTreeService;
use catalog_schema_core::features::listings::dtos::ListingAttributesDto;
use catalog_schema_core::features::listings::ListingAttributeService;
use catalog_schema_core::modules::storage::{CatalogSnapshot, InMemoryCatalogStore};
use catalog_schema_core::shared::types::ApiResponse;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

const USAGE: &str = "usage: catalog-schema-core <tree | schema <category-id> | submit <request.json>>";

enum Command {
    Tree,
    Schema(Uuid),
    Submit(String),
}

impl Command {
    fn from_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let command = args.next().ok_or_else(|| anyhow::anyhow!(USAGE))?;
        match (command.as_str(), args.next()) {
            ("tree", None) => Ok(Command::Tree),
            ("schema", Some(id)) => Ok(Command::Schema(
                Uuid::parse_str(&id).map_err(|e| anyhow::anyhow!("Invalid category id: {}", e))?,
            )),
            ("submit", Some(path)) => Ok(Command::Submit(path)),
            _ => Err(anyhow::anyhow!(USAGE)),
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    let command = Command::from_args(std::env::args().skip(1))?;

    // Build Tokio runtime with configurable worker threads
    let worker_threads = config.app.worker_threads;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config, command))
}

async fn async_main(config: Config, command: Command) -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!(
        "Configuration loaded: decimal_scale={}, max_hierarchy_depth={}, tokio_worker_threads={}",
        config.catalog.decimal_scale,
        config.catalog.max_hierarchy_depth,
        config.app.worker_threads
    );

    let snapshot = CatalogSnapshot::load(&config.app.snapshot_path).await?;
    let store = Arc::new(InMemoryCatalogStore::from_snapshot(snapshot)?);
    tracing::info!("Catalog snapshot loaded from {}", config.app.snapshot_path);

    let tree = CategoryTreeService::new(store.clone(), config.catalog.clone());

    let outcome = match command {
        Command::Tree => tree.category_tree().await.and_then(to_json),
        Command::Schema(category_id) => tree
            .resolve_effective_schema(category_id)
            .await
            .and_then(|schema| to_json(schema.definitions())),
        Command::Submit(path) => {
            let raw = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path, e))?;
            let request: ListingAttributesDto = serde_json::from_str(&raw)
                .map_err(|e| anyhow::anyhow!("Malformed request {}: {}", path, e))?;

            let service = ListingAttributeService::new(
                store.clone(),
                store.clone(),
                store,
                config.catalog.clone(),
            );
            service.submit(request).await.and_then(to_json)
        }
    };

    match outcome {
        Ok(data) => {
            let response = ApiResponse::success(Some(data), None);
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            println!("{}", serde_json::to_string_pretty(&e.to_response())?);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn to_json(value: impl Serialize) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(e.to_string()))
}
