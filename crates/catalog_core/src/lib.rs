//! Core domain logic for the product catalog.
//! This crate is the single source of truth for catalog business rules.

pub mod config;
pub mod context;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::CatalogConfig;
pub use context::{CatalogContext, CatalogProductService};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::product::{
    NewProduct, Product, ProductChanges, ProductDraft, ProductId, ProductValidationError,
    StockRule,
};
pub use repo::product_repo::{
    ProductFilters, ProductListQuery, ProductRepository, RepoError, RepoResult, SortDirection,
    SortField, SqliteProductRepository,
};
pub use rust_decimal::Decimal;
pub use service::product_service::{
    ProductActionResponse, ProductOutcome, ProductService, ProductServiceError, ServiceResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
