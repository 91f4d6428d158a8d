#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Dataflow Source
//!
//! SQL-backed source connector for data-flow pipelines: exposes a model's
//! named query scopes as batched, cursor-resumable record sources.
//!
//! ## Overview
//!
//! A data-flow/ETL framework that moves rows between systems needs a source
//! end for relational models. This crate is that source end and nothing
//! else: it validates that a source wraps a *named* scope (never an ad-hoc
//! filter), snapshots the scope into a serializable descriptor, resolves
//! descriptors back into live sources through an explicit registry, and
//! iterates the scope's rows in primary-key order, one batch per fetch.
//!
//! The pipeline engine itself — scheduling, sinks, transforms — stays
//! external. So does the model layer: applications bring their own SQLx
//! model structs and implement [`Model`] for them.
//!
//! ## Module Organization
//!
//! - [`connector`] - the source itself: `NamedScopeSource`, batch iteration,
//!   the erased `RecordSource` capability, and the serializable descriptor
//! - [`scopes`] - named scope declarations and parameterized SELECT building
//! - [`registry`] - explicit `(model class, scope name)` resolution for
//!   persisted descriptors
//! - [`models`] - the `Model` contract the embedding application implements
//! - [`config`] - environment-driven connector configuration
//! - [`error`] - structured error handling
//! - [`logging`] - structured tracing initialization
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dataflow_source::{Model, NamedScopeSource, ScopeQuery, ScopeSelect};
//! use futures::TryStreamExt;
//! use serde::Serialize;
//! use sqlx::FromRow;
//!
//! #[derive(Debug, Clone, Serialize, FromRow)]
//! struct Product {
//!     id: i64,
//!     name: String,
//! }
//!
//! impl Model for Product {
//!     const TABLE: &'static str = "products";
//!     const PRIMARY_KEY: &'static str = "id";
//!     const MODEL_CLASS: &'static str = "Product";
//!
//!     fn primary_key(&self) -> i64 {
//!         self.id
//!     }
//! }
//!
//! impl Product {
//!     fn active() -> ScopeQuery<Product> {
//!         ScopeQuery::named("active", |_args| {
//!             let mut query = ScopeSelect::for_model::<Product>();
//!             query.condition("products.active = TRUE");
//!             Ok(query)
//!         })
//!     }
//! }
//!
//! # async fn example(pool: &sqlx::PgPool) -> dataflow_source::Result<()> {
//! let source = NamedScopeSource::new(Some(Product::active()), vec![])?;
//!
//! // Persist the descriptor with the pipeline definition
//! let descriptor = source.to_descriptor();
//!
//! // Pull rows in batches of 500, resuming after id 1000
//! let rows: Vec<Product> = source
//!     .iterate(pool, 500, Some(1000))
//!     .records()
//!     .try_collect()
//!     .await?;
//! # let _ = (descriptor, rows);
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! Iteration tests run against a live PostgreSQL database using SQLx native
//! testing with automatic database isolation:
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # All tests (requires DATABASE_URL)
//! ```

pub mod config;
pub mod connector;
pub mod error;
pub mod logging;
pub mod models;
pub mod registry;
pub mod scopes;

pub use config::ConnectorConfig;
pub use connector::descriptor::{SourceDescriptor, DEFAULT_BATCH_SIZE};
pub use connector::source::{NamedScopeSource, RecordBatches, RecordSource};
pub use error::{Result, SourceError};
pub use models::Model;
pub use registry::{ScopeKey, ScopeRegistry};
pub use scopes::{ScopeArgs, ScopeQuery, ScopeSelect};
