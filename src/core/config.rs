use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path of the JSON catalog snapshot loaded into the in-memory store
    pub snapshot_path: String,
    pub worker_threads: usize,
}

/// Tunables of the schema core and its store boundary
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Fixed number of fractional digits for Decimal values and variant keys
    pub decimal_scale: u32,
    /// Deepest category chain accepted before it is treated as cyclic
    pub max_hierarchy_depth: usize,
    /// How many times a stale-schema conflict is re-resolved before surfacing
    pub stale_schema_retries: u32,
    /// Timeout applied to each collaborator store fetch
    pub store_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            catalog: CatalogConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_SNAPSHOT_PATH: &'static str = "catalog.json";

    pub fn from_env() -> Result<Self, String> {
        let snapshot_path = env::var("CATALOG_SNAPSHOT_PATH")
            .unwrap_or_else(|_| Self::DEFAULT_SNAPSHOT_PATH.to_string());

        let worker_threads = match env::var("TOKIO_WORKER_THREADS") {
            Ok(raw) => raw
                .parse::<usize>()
                .map_err(|_| "TOKIO_WORKER_THREADS must be a valid number".to_string())?,
            Err(_) => std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4),
        };

        Ok(Self {
            snapshot_path,
            worker_threads,
        })
    }
}

impl CatalogConfig {
    const DEFAULT_DECIMAL_SCALE: u32 = 4;
    const MAX_DECIMAL_SCALE: u32 = 28;
    const DEFAULT_MAX_HIERARCHY_DEPTH: usize = 64;
    const DEFAULT_STALE_SCHEMA_RETRIES: u32 = 1;
    const DEFAULT_STORE_TIMEOUT_MS: u64 = 2000;

    pub fn from_env() -> Result<Self, String> {
        let decimal_scale = env::var("CATALOG_DECIMAL_SCALE")
            .unwrap_or_else(|_| Self::DEFAULT_DECIMAL_SCALE.to_string())
            .parse::<u32>()
            .map_err(|_| "CATALOG_DECIMAL_SCALE must be a valid number".to_string())?;

        if decimal_scale > Self::MAX_DECIMAL_SCALE {
            return Err(format!(
                "CATALOG_DECIMAL_SCALE must not exceed {}",
                Self::MAX_DECIMAL_SCALE
            ));
        }

        let max_hierarchy_depth = env::var("CATALOG_MAX_HIERARCHY_DEPTH")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_HIERARCHY_DEPTH.to_string())
            .parse::<usize>()
            .map_err(|_| "CATALOG_MAX_HIERARCHY_DEPTH must be a valid number".to_string())?;

        let stale_schema_retries = env::var("CATALOG_STALE_SCHEMA_RETRIES")
            .unwrap_or_else(|_| Self::DEFAULT_STALE_SCHEMA_RETRIES.to_string())
            .parse::<u32>()
            .map_err(|_| "CATALOG_STALE_SCHEMA_RETRIES must be a valid number".to_string())?;

        let store_timeout_ms = env::var("CATALOG_STORE_TIMEOUT_MS")
            .unwrap_or_else(|_| Self::DEFAULT_STORE_TIMEOUT_MS.to_string())
            .parse::<u64>()
            .map_err(|_| "CATALOG_STORE_TIMEOUT_MS must be a valid number".to_string())?;

        Ok(Self {
            decimal_scale,
            max_hierarchy_depth,
            stale_schema_retries,
            store_timeout: Duration::from_millis(store_timeout_ms),
        })
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            decimal_scale: Self::DEFAULT_DECIMAL_SCALE,
            max_hierarchy_depth: Self::DEFAULT_MAX_HIERARCHY_DEPTH,
            stale_schema_retries: Self::DEFAULT_STALE_SCHEMA_RETRIES,
            store_timeout: Duration::from_millis(Self::DEFAULT_STORE_TIMEOUT_MS),
        }
    }
}
