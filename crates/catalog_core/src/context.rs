//! Process context owning the catalog database.
//!
//! # Responsibility
//! - Open the database once (`init`) and close it explicitly (`shutdown`).
//! - Hand out services bound to the owned connection.
//!
//! # Invariants
//! - Services borrow the context, so they cannot outlive `shutdown`.

use crate::config::CatalogConfig;
use crate::db::{Database, DbResult};
use crate::repo::product_repo::{RepoResult, SqliteProductRepository};
use crate::service::product_service::ProductService;
use log::info;

/// Concrete service type handed out by [`CatalogContext`].
pub type CatalogProductService<'ctx> = ProductService<SqliteProductRepository<'ctx>>;

/// Owner of process-wide catalog state.
#[derive(Debug)]
pub struct CatalogContext {
    config: CatalogConfig,
    db: Database,
}

impl CatalogContext {
    /// Opens the configured database file and applies migrations.
    pub fn init(config: CatalogConfig) -> DbResult<Self> {
        let db = Database::open(&config.db_path)?;
        info!("event=context_init module=core status=ok mode=file");
        Ok(Self { config, db })
    }

    /// Context over a fresh in-memory database.
    pub fn init_in_memory() -> DbResult<Self> {
        let db = Database::open_in_memory()?;
        info!("event=context_init module=core status=ok mode=memory");
        Ok(Self {
            config: CatalogConfig::default(),
            db,
        })
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Builds the product controller over the owned connection.
    pub fn product_service(&self) -> RepoResult<CatalogProductService<'_>> {
        let repo = SqliteProductRepository::try_new(&self.db)?;
        Ok(ProductService::new(repo))
    }

    /// Releases the database connection.
    pub fn shutdown(self) -> DbResult<()> {
        self.db.close()?;
        info!("event=context_shutdown module=core status=ok");
        Ok(())
    }
}
