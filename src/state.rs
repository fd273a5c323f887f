//! Application state: the catalog (store with static fallback) and progress recording.
//!
//! This module owns:
//!   - opening and seeding the SQLite store at startup
//!   - the fallback catalog used when the store is unreachable
//!   - the boolean progress-save contract (errors are logged, never propagated)
//!
//! Built once in `main`, shared as `Arc<AppState>`, closed on shutdown.

use tracing::{error, info, instrument, warn};

use crate::catalog::{report_catalog_issues, CatalogQuery, FallbackCatalog, StaticCatalog};
use crate::config::{load_catalog_config, AppConfig, IN_MEMORY_DB};
use crate::domain::{ProgressRecord, ProgressUpdate};
use crate::error::AppError;
use crate::store::{ProgressStore, Store};

pub struct AppState {
    pub catalog: FallbackCatalog<Store>,
}

impl AppState {
    /// Build state from config: static catalog (TOML bank or built-in), store, seeding.
    #[instrument(level = "info", skip_all)]
    pub async fn open(cfg: &AppConfig) -> Self {
        let fallback = cfg
            .catalog_path
            .as_deref()
            .and_then(load_catalog_config)
            .map(|bank| {
                let (tools, use_cases) = bank.into_catalog();
                StaticCatalog::new(tools, use_cases)
            })
            .unwrap_or_else(StaticCatalog::builtin);

        let opened = if cfg.database_path == IN_MEMORY_DB {
            Store::open_in_memory()
        } else {
            Store::open(&cfg.database_path)
        };

        let store = match opened {
            Ok(store) => match seed_store(&store, &fallback, cfg.reseed).await {
                Ok(()) => Some(store),
                Err(e) => {
                    error!(target: "aipuzzle_backend", error = %e, "Seeding failed; store disabled");
                    None
                }
            },
            Err(e) => {
                error!(target: "aipuzzle_backend", path = %cfg.database_path, error = %e, "Failed to open database; serving static catalog only");
                None
            }
        };

        let state = Self::with_catalog(FallbackCatalog::new(store, fallback));
        state.log_inventory().await;
        state
    }

    pub fn with_catalog(catalog: FallbackCatalog<Store>) -> Self {
        Self { catalog }
    }

    async fn log_inventory(&self) {
        let (tools, origin) = self.catalog.list_tools().await;
        let (use_cases, _) = self.catalog.list_use_cases().await;
        report_catalog_issues(&tools, &use_cases, origin);
    }

    /// Persist progress. Failures are logged and reported as `false`; no retry.
    #[instrument(level = "info", skip(self, update), fields(user = %update.user_id, use_case = %update.use_case_id, score = update.score))]
    pub async fn save_progress(&self, update: &ProgressUpdate) -> bool {
        let Some(store) = self.catalog.primary() else {
            warn!(target: "puzzle", "No store available; progress not saved");
            return false;
        };
        match store.save_progress(update).await {
            Ok(()) => {
                info!(target: "puzzle", completed = update.completed, hints_used = update.hints_used, "Progress saved");
                true
            }
            Err(e) => {
                error!(target: "puzzle", error = %e, "Saving progress failed");
                false
            }
        }
    }

    pub async fn load_progress(&self, user_id: &str) -> Result<Vec<ProgressRecord>, AppError> {
        match self.catalog.primary() {
            Some(store) => store.load_progress(user_id).await,
            None => Err(AppError::CatalogUnavailable("no database configured".into())),
        }
    }

    /// Probe the store; a successful probe takes the catalog out of fallback mode.
    #[instrument(level = "info", skip(self))]
    pub async fn test_connection(&self) -> Result<String, AppError> {
        let store = self
            .catalog
            .primary()
            .ok_or_else(|| AppError::CatalogUnavailable("no database configured".into()))?;
        let now = store.ping().await?;
        self.catalog.recover();
        Ok(now)
    }

    /// Release the database connection.
    pub fn close(self) {
        if let Some(store) = self.catalog.into_primary() {
            match store.close() {
                Ok(()) => info!(target: "aipuzzle_backend", "Store closed"),
                Err(e) => error!(target: "aipuzzle_backend", error = %e, "Error closing store"),
            }
        }
    }
}

/// Seed when the store is empty, or always when `reseed` is set.
async fn seed_store(store: &Store, source: &StaticCatalog, reseed: bool) -> Result<(), AppError> {
    if reseed || store.is_empty().await? {
        store.replace_catalog(source.tools(), source.use_cases()).await?;
        info!(target: "aipuzzle_backend", reseed, "Store seeded from static catalog");
    } else {
        let tools = store.list_tools().await?;
        info!(target: "aipuzzle_backend", tools = tools.len(), "Using existing store catalog");
    }
    Ok(())
}
