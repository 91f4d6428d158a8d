//! # Registry Infrastructure
//!
//! Explicit resolution of serialized descriptors back to live sources. Where
//! the original framework resolved scopes dynamically by sending a method
//! name to a class, this crate keeps an explicit mapping from
//! `(model class, scope name)` pairs to scope constructors.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dataflow_source::{Model, ScopeRegistry, ScopeSelect};
//! # use serde::Serialize;
//! # use sqlx::FromRow;
//! # #[derive(Debug, Clone, Serialize, FromRow)]
//! # struct Product { id: i64 }
//! # impl Model for Product {
//! #     const TABLE: &'static str = "products";
//! #     const PRIMARY_KEY: &'static str = "id";
//! #     const MODEL_CLASS: &'static str = "Product";
//! #     fn primary_key(&self) -> i64 { self.id }
//! # }
//!
//! let mut registry = ScopeRegistry::new();
//! registry.register::<Product, _>("active", |_args| {
//!     let mut query = ScopeSelect::for_model::<Product>();
//!     query.condition("products.active = TRUE");
//!     Ok(query)
//! });
//! ```

pub mod scope_registry;

pub use scope_registry::{ScopeKey, ScopeRegistry};
