//! Product use-case service (controller).
//!
//! # Responsibility
//! - Validate raw user input before anything reaches storage.
//! - Enforce name uniqueness and id existence ahead of writes.
//! - Fold every mutation outcome into a [`ProductActionResponse`].
//!
//! # Invariants
//! - Rule order is fixed: required text, price, stock, uniqueness.
//! - Stock may be zero on create but must be positive on edit.
//! - Mutations never return `Err`; read paths propagate storage errors.
//! - Check and write are separate repository calls (single-actor design).

use crate::model::product::{
    parse_product_id, Product, ProductDraft, ProductId, ProductValidationError, StockRule,
};
use crate::repo::product_repo::{
    ProductFilters, ProductListQuery, ProductRepository, RepoError, RepoResult,
};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ProductServiceError>;

/// Service error for product use-cases.
#[derive(Debug)]
pub enum ProductServiceError {
    /// Malformed or out-of-range field input.
    Validation(ProductValidationError),
    /// Another product already uses the requested name.
    Conflict { name: String, existing_id: ProductId },
    /// Target product does not exist.
    NotFound(ProductId),
    /// Id text is not an integer.
    InvalidId(String),
    /// Storage failure while performing `operation`.
    Storage {
        operation: &'static str,
        source: RepoError,
    },
    /// The write matched no row, e.g. the product vanished after the check.
    NotApplied {
        operation: &'static str,
        id: ProductId,
    },
}

impl ProductServiceError {
    /// Stable code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Conflict { .. } => "conflict",
            Self::NotFound(_) => "not_found",
            Self::InvalidId(_) => "invalid_id",
            Self::Storage { .. } => "storage",
            Self::NotApplied { .. } => "not_applied",
        }
    }
}

impl Display for ProductServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Conflict { name, existing_id } => write!(
                f,
                "a product named '{name}' already exists (id {existing_id})"
            ),
            Self::NotFound(id) => write!(f, "no product with id {id}"),
            Self::InvalidId(raw) => write!(f, "id must be a valid number, got `{raw}`"),
            Self::Storage { operation, source } => {
                write!(f, "failed to {operation} product: {source}")
            }
            Self::NotApplied { operation, id } => {
                write!(f, "product {id} could not be {operation}d")
            }
        }
    }
}

impl Error for ProductServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ProductValidationError> for ProductServiceError {
    fn from(value: ProductValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Successful mutation outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductOutcome {
    pub id: ProductId,
    /// Name as stored (after trimming), or as it was before delete.
    pub name: String,
}

/// Result envelope returned to the view for every mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductActionResponse {
    pub ok: bool,
    pub message: String,
    /// Set only by a successful create.
    pub product_id: Option<ProductId>,
}

impl ProductActionResponse {
    fn success(message: impl Into<String>, product_id: Option<ProductId>) -> Self {
        Self {
            ok: true,
            message: message.into(),
            product_id,
        }
    }

    fn failure(err: &ProductServiceError) -> Self {
        Self {
            ok: false,
            message: err.to_string(),
            product_id: None,
        }
    }
}

/// Product controller over a repository implementation.
pub struct ProductService<R: ProductRepository> {
    repo: R,
}

impl<R: ProductRepository> ProductService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists all products sorted by name.
    pub fn list(&self) -> RepoResult<Vec<Product>> {
        self.repo.list_products(&ProductListQuery::default())
    }

    /// Lists products using explicit sort and filter options.
    pub fn list_with(&self, query: &ProductListQuery) -> RepoResult<Vec<Product>> {
        self.repo.list_products(query)
    }

    pub fn list_by_category(&self, category: &str) -> RepoResult<Vec<Product>> {
        self.list_filtered(ProductFilters {
            category: Some(category.to_string()),
            ..ProductFilters::default()
        })
    }

    /// Products whose stock is at or below their minimum.
    pub fn list_low_stock(&self) -> RepoResult<Vec<Product>> {
        self.list_filtered(ProductFilters {
            low_stock: true,
            ..ProductFilters::default()
        })
    }

    /// Products that carry an offer price.
    pub fn list_on_offer(&self) -> RepoResult<Vec<Product>> {
        self.list_filtered(ProductFilters {
            on_offer: true,
            ..ProductFilters::default()
        })
    }

    /// Gets one product by raw id text.
    ///
    /// Malformed ids are a miss, not an error.
    pub fn get(&self, raw_id: &str) -> RepoResult<Option<Product>> {
        match parse_product_id(raw_id) {
            Some(id) => self.repo.find_by_id(id),
            None => Ok(None),
        }
    }

    pub fn get_by_sku(&self, sku: &str) -> RepoResult<Option<Product>> {
        self.repo.find_by_sku(sku.trim())
    }

    /// Validates and inserts a product, returning a view envelope.
    pub fn create(
        &self,
        name: &str,
        price: &str,
        category: &str,
        stock: &str,
    ) -> ProductActionResponse {
        match self.try_create(name, price, category, stock) {
            Ok(outcome) => ProductActionResponse::success(
                format!("product '{}' added", outcome.name),
                Some(outcome.id),
            ),
            Err(err) => ProductActionResponse::failure(&err),
        }
    }

    /// Validates and replaces all editable fields, returning a view envelope.
    pub fn edit(
        &self,
        raw_id: &str,
        name: &str,
        price: &str,
        category: &str,
        stock: &str,
    ) -> ProductActionResponse {
        match self.try_edit(raw_id, name, price, category, stock) {
            Ok(outcome) => {
                ProductActionResponse::success(format!("product '{}' updated", outcome.name), None)
            }
            Err(err) => ProductActionResponse::failure(&err),
        }
    }

    /// Hard-deletes a product, returning a view envelope.
    pub fn delete(&self, raw_id: &str) -> ProductActionResponse {
        match self.try_delete(raw_id) {
            Ok(outcome) => {
                ProductActionResponse::success(format!("product '{}' deleted", outcome.name), None)
            }
            Err(err) => ProductActionResponse::failure(&err),
        }
    }

    /// Typed variant of [`Self::create`].
    pub fn try_create(
        &self,
        name: &str,
        price: &str,
        category: &str,
        stock: &str,
    ) -> ServiceResult<ProductOutcome> {
        let result = (|| -> ServiceResult<ProductOutcome> {
            let draft = ProductDraft::parse(name, price, category, stock, StockRule::AllowZero)?;
            self.ensure_name_free(&draft.name, None, "add")?;

            let name = draft.name.clone();
            let id = self
                .repo
                .create_product(&draft.into_new_product())
                .map_err(storage("add"))?;
            Ok(ProductOutcome { id, name })
        })();
        log_outcome("product_create", &result);
        result
    }

    /// Typed variant of [`Self::edit`].
    pub fn try_edit(
        &self,
        raw_id: &str,
        name: &str,
        price: &str,
        category: &str,
        stock: &str,
    ) -> ServiceResult<ProductOutcome> {
        let result = (|| -> ServiceResult<ProductOutcome> {
            let id = require_id(raw_id)?;
            let current = self
                .repo
                .find_by_id(id)
                .map_err(storage("update"))?
                .ok_or(ProductServiceError::NotFound(id))?;

            let draft =
                ProductDraft::parse(name, price, category, stock, StockRule::RequirePositive)?;
            if draft.name != current.name {
                self.ensure_name_free(&draft.name, Some(id), "update")?;
            }

            let name = draft.name.clone();
            let applied = self
                .repo
                .update_product(id, &draft.into_changes())
                .map_err(storage("update"))?;
            if !applied {
                return Err(ProductServiceError::NotApplied {
                    operation: "update",
                    id,
                });
            }
            Ok(ProductOutcome { id, name })
        })();
        log_outcome("product_edit", &result);
        result
    }

    /// Typed variant of [`Self::delete`].
    pub fn try_delete(&self, raw_id: &str) -> ServiceResult<ProductOutcome> {
        let result = (|| -> ServiceResult<ProductOutcome> {
            let id = require_id(raw_id)?;
            let current = self
                .repo
                .find_by_id(id)
                .map_err(storage("delete"))?
                .ok_or(ProductServiceError::NotFound(id))?;

            let applied = self.repo.delete_product(id).map_err(storage("delete"))?;
            if !applied {
                return Err(ProductServiceError::NotApplied {
                    operation: "delete",
                    id,
                });
            }
            Ok(ProductOutcome {
                id,
                name: current.name,
            })
        })();
        log_outcome("product_delete", &result);
        result
    }

    fn list_filtered(&self, filters: ProductFilters) -> RepoResult<Vec<Product>> {
        self.repo.list_products(&ProductListQuery {
            filters,
            ..ProductListQuery::default()
        })
    }

    fn ensure_name_free(
        &self,
        name: &str,
        editing: Option<ProductId>,
        operation: &'static str,
    ) -> ServiceResult<()> {
        match self.repo.find_by_name(name).map_err(storage(operation))? {
            Some(existing) if Some(existing.id) != editing => Err(ProductServiceError::Conflict {
                name: name.to_string(),
                existing_id: existing.id,
            }),
            _ => Ok(()),
        }
    }
}

fn require_id(raw_id: &str) -> ServiceResult<ProductId> {
    parse_product_id(raw_id)
        .ok_or_else(|| ProductServiceError::InvalidId(raw_id.trim().to_string()))
}

fn storage(operation: &'static str) -> impl Fn(RepoError) -> ProductServiceError {
    move |source| ProductServiceError::Storage { operation, source }
}

fn log_outcome(event: &str, result: &ServiceResult<ProductOutcome>) {
    match result {
        Ok(outcome) => info!(
            "event={} module=service status=ok product_id={}",
            event, outcome.id
        ),
        Err(err @ ProductServiceError::Storage { .. }) => warn!(
            "event={} module=service status=error error_code={} error={}",
            event,
            err.code(),
            err
        ),
        Err(err) => info!(
            "event={} module=service status=rejected error_code={}",
            event,
            err.code()
        ),
    }
}
