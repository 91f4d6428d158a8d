//! # Model Layer Contract
//!
//! The connector does not own any models. The embedding application maps its
//! tables to plain structs and implements [`Model`] for each one; the
//! connector only needs enough metadata to generate batched SELECTs and to
//! identify the model in serialized descriptors.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dataflow_source::Model;
//! use serde::Serialize;
//! use sqlx::FromRow;
//!
//! #[derive(Debug, Clone, Serialize, FromRow)]
//! struct Product {
//!     id: i64,
//!     name: String,
//!     active: bool,
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
//! ```

use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::FromRow;

/// A relational-database-backed model type the connector can iterate.
///
/// `Serialize` is required so rows can cross the framework boundary as plain
/// JSON objects; `FromRow` so batched SELECTs can be decoded directly.
pub trait Model:
    for<'r> FromRow<'r, PgRow> + Serialize + Send + Sync + Unpin + 'static
{
    /// Table name as referenced in generated SQL
    const TABLE: &'static str;

    /// Primary key column, used for batch ordering and cursor resumption
    const PRIMARY_KEY: &'static str;

    /// Stable class identifier used in serialized descriptors
    const MODEL_CLASS: &'static str;

    /// Primary key of this row
    fn primary_key(&self) -> i64;
}
