//! # Named Query Scopes
//!
//! The connector wraps *named* scopes: reusable, query-producing operations a
//! model declares up front, as opposed to inline ad-hoc filters. This module
//! provides the building blocks for declaring them:
//!
//! - [`ScopeSelect`]: a scoped SELECT under construction, with parameterized
//!   WHERE conditions bound through SQLx
//! - [`ScopeQuery`]: a named (or deliberately anonymous) scope — a build
//!   closure that produces a fresh `ScopeSelect` on every invocation
//! - [`ScopeArgs`]: positional, typed access to a source's stored scope
//!   parameters
//!
//! A scope is rebuilt from its closure for every batch fetch, so a
//! `ScopeQuery` never holds partially-consumed query state.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dataflow_source::{Model, ScopeQuery, ScopeSelect};
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
//! impl Product {
//!     /// Scope: active - products currently available for sale
//!     fn active() -> ScopeQuery<Product> {
//!         ScopeQuery::named("active", |_args| {
//!             let mut query = ScopeSelect::for_model::<Product>();
//!             query.condition("products.active = TRUE");
//!             Ok(query)
//!         })
//!     }
//!
//!     /// Scope: priced_above - products above a price floor (one argument)
//!     fn priced_above() -> ScopeQuery<Product> {
//!         ScopeQuery::named("priced_above", |args| {
//!             let floor = args.integer(0)?;
//!             let mut query = ScopeSelect::for_model::<Product>();
//!             query.condition("products.price_cents > ");
//!             query.bind(floor);
//!             Ok(query)
//!         })
//!     }
//! }
//! ```
//!
//! All conditions use parameterized queries with SQLx binding; scope authors
//! never interpolate caller values into SQL text.

use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;
use sqlx::{Postgres, QueryBuilder};

use crate::error::{Result, SourceError};
use crate::models::Model;

/// A scoped SELECT under construction.
///
/// Wraps `sqlx::QueryBuilder` with WHERE bookkeeping so scope closures can
/// add conditions without tracking whether one already exists.
pub struct ScopeSelect {
    query: QueryBuilder<'static, Postgres>,
    has_conditions: bool,
}

impl ScopeSelect {
    /// Start a `SELECT table.* FROM table` for an explicit table name
    pub fn from_table(table: &str) -> Self {
        let query = QueryBuilder::new(format!("SELECT {table}.* FROM {table}"));
        Self {
            query,
            has_conditions: false,
        }
    }

    /// Start a scoped SELECT over a model's table
    pub fn for_model<T: Model>() -> Self {
        Self::from_table(T::TABLE)
    }

    /// Add WHERE clause helper
    pub fn condition(&mut self, condition: &str) {
        if self.has_conditions {
            self.query.push(" AND ");
        } else {
            self.query.push(" WHERE ");
            self.has_conditions = true;
        }
        self.query.push(condition);
    }

    /// Bind a value for the most recently added condition fragment
    pub fn bind<V>(&mut self, value: V)
    where
        V: 'static + Send + sqlx::Encode<'static, Postgres> + sqlx::Type<Postgres>,
    {
        self.query.push_bind(value);
    }

    /// Current SQL text (conditions only; no batch window yet)
    pub fn sql(&self) -> &str {
        self.query.sql()
    }

    /// Append the batch window and hand back the finished builder: an
    /// optional `pk > cursor` filter, primary key ascending order, and a
    /// LIMIT. Consumes the select; a fresh one is built per batch.
    pub(crate) fn batch_window(
        mut self,
        table: &str,
        primary_key: &str,
        after_id: Option<i64>,
        limit: i64,
    ) -> QueryBuilder<'static, Postgres> {
        if let Some(id) = after_id {
            self.condition(&format!("{table}.{primary_key} > "));
            self.query.push_bind(id);
        }
        self.query
            .push(format!(" ORDER BY {table}.{primary_key} ASC LIMIT "));
        self.query.push_bind(limit);
        self.query
    }
}

pub(crate) type ScopeBuild =
    Arc<dyn Fn(&ScopeArgs<'_>) -> Result<ScopeSelect> + Send + Sync>;

/// A reusable query-producing operation on a model type.
///
/// Named scopes are the only kind a source accepts; the anonymous form
/// exists so ad-hoc filters are representable and rejectable at
/// construction rather than by convention.
pub struct ScopeQuery<T: Model> {
    name: Option<String>,
    build: ScopeBuild,
    _model: PhantomData<T>,
}

impl<T: Model> ScopeQuery<T> {
    /// Declare a named scope
    pub fn named<F>(name: impl Into<String>, build: F) -> Self
    where
        F: Fn(&ScopeArgs<'_>) -> Result<ScopeSelect> + Send + Sync + 'static,
    {
        Self {
            name: Some(name.into()),
            build: Arc::new(build),
            _model: PhantomData,
        }
    }

    /// Declare an anonymous, ad-hoc query. Sources reject these.
    pub fn adhoc<F>(build: F) -> Self
    where
        F: Fn(&ScopeArgs<'_>) -> Result<ScopeSelect> + Send + Sync + 'static,
    {
        Self {
            name: None,
            build: Arc::new(build),
            _model: PhantomData,
        }
    }

    /// Reassemble a scope from registry parts
    pub(crate) fn from_parts(name: String, build: ScopeBuild) -> Self {
        Self {
            name: Some(name),
            build,
            _model: PhantomData,
        }
    }

    /// Scope name, `None` for ad-hoc queries
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Class identifier of the underlying model
    pub fn model_class(&self) -> &'static str {
        T::MODEL_CLASS
    }

    /// Produce a fresh scoped SELECT for the given arguments
    pub(crate) fn build(&self, args: &ScopeArgs<'_>) -> Result<ScopeSelect> {
        (self.build)(args)
    }
}

impl<T: Model> Clone for ScopeQuery<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            build: self.build.clone(),
            _model: PhantomData,
        }
    }
}

/// Positional view over a source's stored scope parameters.
///
/// Accessors surface missing or mistyped arguments as `InvalidArgument`, so
/// a scope's arity and argument types are enforced when the source is
/// constructed, not when a batch fetch finally runs.
#[derive(Debug, Clone, Copy)]
pub struct ScopeArgs<'a> {
    params: &'a [Value],
}

impl<'a> ScopeArgs<'a> {
    pub fn new(params: &'a [Value]) -> Self {
        Self { params }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Raw JSON value at a position
    pub fn value(&self, index: usize) -> Result<&'a Value> {
        self.params.get(index).ok_or_else(|| {
            SourceError::invalid_argument(format!(
                "scope expects an argument at position {index}, got {} argument(s)",
                self.params.len()
            ))
        })
    }

    /// String argument at a position
    pub fn string(&self, index: usize) -> Result<&'a str> {
        self.value(index)?.as_str().ok_or_else(|| {
            SourceError::invalid_argument(format!("scope argument {index} must be a string"))
        })
    }

    /// Integer argument at a position
    pub fn integer(&self, index: usize) -> Result<i64> {
        self.value(index)?.as_i64().ok_or_else(|| {
            SourceError::invalid_argument(format!("scope argument {index} must be an integer"))
        })
    }

    /// Float argument at a position
    pub fn float(&self, index: usize) -> Result<f64> {
        self.value(index)?.as_f64().ok_or_else(|| {
            SourceError::invalid_argument(format!("scope argument {index} must be a number"))
        })
    }

    /// Boolean argument at a position
    pub fn boolean(&self, index: usize) -> Result<bool> {
        self.value(index)?.as_bool().ok_or_else(|| {
            SourceError::invalid_argument(format!("scope argument {index} must be a boolean"))
        })
    }
}
