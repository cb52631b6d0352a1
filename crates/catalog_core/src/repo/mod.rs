//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Values are always bound as parameters.
//! - Identifiers that cannot be bound (sort column/direction) come only from
//!   fixed enums.

pub mod product_repo;
