//! Catalog domain model.
//!
//! # Responsibility
//! - Define the product record shared by repository, service and view.
//! - Own field parsing/validation rules for user-entered product data.
//!
//! # Invariants
//! - Every product is identified by a storage-generated `ProductId`.
//! - Deletion is a hard delete; there is no tombstone state.

pub mod product;
