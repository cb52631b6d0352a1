//! Core use-case services.
//!
//! # Responsibility
//! - Validate user input and apply catalog business rules.
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep the console view decoupled from storage details.

pub mod product_service;
