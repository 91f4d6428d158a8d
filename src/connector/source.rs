//! # Named Scope Source
//!
//! The source connector itself: wraps one of a model's named scopes and
//! exposes it to the data-flow framework as a batched, resumable record
//! source.
//!
//! ## Architecture
//!
//! A [`NamedScopeSource`] stores only metadata (model class, scope name,
//! scope parameters, default batch size) plus the scope's build closure.
//! Iteration is keyset pagination: every batch rebuilds the scoped SELECT,
//! filters `pk > cursor`, orders by primary key ascending, and fetches at
//! most one batch of rows. The full result set is never held in memory, and
//! the caller decides when the next batch is fetched.
//!
//! [`RecordSource`] is the erased boundary the framework drives: descriptors
//! for persistence, a row stream for iteration, close for teardown. Rows
//! cross that boundary as JSON objects.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dataflow_source::{Model, NamedScopeSource, ScopeQuery, ScopeSelect};
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
//! # fn active() -> ScopeQuery<Product> {
//! #     ScopeQuery::named("active", |_args| Ok(ScopeSelect::for_model::<Product>()))
//! # }
//!
//! # async fn example(pool: &sqlx::PgPool) -> dataflow_source::Result<()> {
//! let source = NamedScopeSource::new(Some(active()), vec![])?;
//!
//! let mut batches = source.iterate(pool, 500, None);
//! while let Some(batch) = batches.next_batch().await? {
//!     for product in batch {
//!         // hand each row to the pipeline
//!         let _ = product.id;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use serde_json::Value;
use sqlx::PgPool;
use tracing::debug;

use crate::connector::descriptor::{SourceDescriptor, DEFAULT_BATCH_SIZE};
use crate::error::{Result, SourceError};
use crate::models::Model;
use crate::scopes::{ScopeArgs, ScopeQuery};

/// Source connector wrapping a model's named scope.
///
/// Construction validates that the scope is named; ad-hoc filters are
/// rejected so that every source can be serialized and later reconstructed
/// by name. The scope's arguments are probe-built once at construction, so
/// arity and type mismatches fail here rather than mid-pipeline.
pub struct NamedScopeSource<T: Model> {
    scope: ScopeQuery<T>,
    model_class: String,
    scope_name: String,
    scope_params: Vec<Value>,
    batch_size: i64,
    closed: bool,
}

impl<T: Model> NamedScopeSource<T> {
    /// Create a source from a named scope and its arguments.
    ///
    /// Fails with `InvalidArgument` when the scope is absent or anonymous,
    /// or when the scope rejects the supplied arguments.
    pub fn new(scope: Option<ScopeQuery<T>>, scope_params: Vec<Value>) -> Result<Self> {
        let scope = scope.ok_or_else(|| SourceError::invalid_argument("scope is required"))?;

        let scope_name = match scope.name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                return Err(SourceError::invalid_argument(
                    "source must be a named scope (for example Product::active), \
                     not an ad-hoc filter",
                ))
            }
        };

        // Probe build: argument arity/type mismatches are fatal to the
        // source definition and must not wait for the first batch fetch.
        scope.build(&ScopeArgs::new(&scope_params))?;

        Ok(Self {
            model_class: T::MODEL_CLASS.to_string(),
            scope_name,
            scope_params,
            batch_size: DEFAULT_BATCH_SIZE,
            scope,
            closed: false,
        })
    }

    /// Override the default batch size. Fails with `InvalidArgument` for
    /// anything below 1.
    pub fn with_batch_size(mut self, batch_size: i64) -> Result<Self> {
        if batch_size < 1 {
            return Err(SourceError::invalid_argument(format!(
                "batch size must be positive, got {batch_size}"
            )));
        }
        self.batch_size = batch_size;
        Ok(self)
    }

    /// Class identifier of the wrapped model
    pub fn model_class(&self) -> &str {
        &self.model_class
    }

    /// Name of the wrapped scope
    pub fn scope_name(&self) -> &str {
        &self.scope_name
    }

    /// Scope arguments, stored verbatim from construction
    pub fn scope_params(&self) -> &[Value] {
        &self.scope_params
    }

    /// Default batch size used by [`Self::batches`]
    pub fn batch_size(&self) -> i64 {
        self.batch_size
    }

    /// Snapshot the source's configuration for persistence
    pub fn to_descriptor(&self) -> SourceDescriptor {
        SourceDescriptor {
            model_class: self.model_class.clone(),
            scope_name: self.scope_name.clone(),
            scope_params: self.scope_params.clone(),
            batch_size: self.batch_size,
        }
    }

    /// Iterate the scope's rows in batches of `batch_size`, ordered by
    /// primary key ascending. When `start_id` is given, iteration resumes
    /// strictly after that id.
    pub fn iterate<'a>(
        &'a self,
        pool: &'a PgPool,
        batch_size: i64,
        start_id: Option<i64>,
    ) -> RecordBatches<'a, T> {
        RecordBatches {
            source: self,
            pool,
            batch_size,
            cursor: start_id,
            finished: false,
        }
    }

    /// Iterate with the source's default batch size, from the beginning
    pub fn batches<'a>(&'a self, pool: &'a PgPool) -> RecordBatches<'a, T> {
        self.iterate(pool, self.batch_size, None)
    }

    /// Mark the source closed. The pool is borrowed per fetch, so there is
    /// nothing to release; calling this more than once is fine.
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            debug!(
                model_class = %self.model_class,
                scope_name = %self.scope_name,
                "Source closed"
            );
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Pull-style batch iterator over a source's rows.
///
/// Forward-only: each `next_batch` issues exactly one fetch and advances the
/// cursor past the last row seen. Restarting means asking the source for a
/// new iterator with a fresh `start_id`.
pub struct RecordBatches<'a, T: Model> {
    source: &'a NamedScopeSource<T>,
    pool: &'a PgPool,
    batch_size: i64,
    cursor: Option<i64>,
    finished: bool,
}

impl<'a, T: Model> RecordBatches<'a, T> {
    /// Fetch the next batch, or `None` once the scope is exhausted
    pub async fn next_batch(&mut self) -> Result<Option<Vec<T>>> {
        if self.finished {
            return Ok(None);
        }
        if self.batch_size < 1 {
            return Err(SourceError::invalid_argument(format!(
                "batch size must be positive, got {}",
                self.batch_size
            )));
        }

        let args = ScopeArgs::new(&self.source.scope_params);
        let select = self.source.scope.build(&args)?;
        let mut query = select.batch_window(T::TABLE, T::PRIMARY_KEY, self.cursor, self.batch_size);

        let rows: Vec<T> = query.build_query_as::<T>().fetch_all(self.pool).await?;

        debug!(
            model_class = %self.source.model_class,
            scope_name = %self.source.scope_name,
            rows = rows.len(),
            cursor = ?self.cursor,
            "Fetched batch"
        );

        // A short batch means the scope is exhausted; skip the extra
        // empty-result round trip on the next call.
        if (rows.len() as i64) < self.batch_size {
            self.finished = true;
        }
        if let Some(last) = rows.last() {
            self.cursor = Some(last.primary_key());
        }

        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows))
        }
    }

    /// Last primary key handed out, usable as `start_id` for a later resume
    pub fn cursor(&self) -> Option<i64> {
        self.cursor
    }

    /// Adapt the batches into a flat, lazy stream of rows
    pub fn records(self) -> impl stream::Stream<Item = Result<T>> + 'a {
        stream::try_unfold(self, |mut batches| async move {
            Ok::<_, SourceError>(batches
                .next_batch()
                .await?
                .map(|batch| (stream::iter(batch.into_iter().map(Ok)), batches)))
        })
        .try_flatten()
    }
}

/// The data-flow framework's Source capability.
///
/// Everything the framework needs from a source, with the row type erased:
/// a descriptor for persistence, a lazy row stream for iteration, and a
/// close hook. Reconstruction lives on
/// [`crate::registry::ScopeRegistry::resolve`], which returns sources
/// behind this trait.
pub trait RecordSource: Send + Sync {
    /// Snapshot the source's configuration for persistence
    fn to_descriptor(&self) -> SourceDescriptor;

    /// Lazily stream the scope's rows as JSON objects, in batches of
    /// `batch_size`, optionally resuming after `start_id`
    fn iterate<'a>(
        &'a self,
        pool: &'a PgPool,
        batch_size: i64,
        start_id: Option<i64>,
    ) -> BoxStream<'a, Result<Value>>;

    /// Release held resources; safe to call repeatedly
    fn close(&mut self);
}

impl<T: Model> RecordSource for NamedScopeSource<T> {
    fn to_descriptor(&self) -> SourceDescriptor {
        NamedScopeSource::to_descriptor(self)
    }

    fn iterate<'a>(
        &'a self,
        pool: &'a PgPool,
        batch_size: i64,
        start_id: Option<i64>,
    ) -> BoxStream<'a, Result<Value>> {
        NamedScopeSource::iterate(self, pool, batch_size, start_id)
            .records()
            .map(|row| {
                row.and_then(|record| serde_json::to_value(&record).map_err(SourceError::from))
            })
            .boxed()
    }

    fn close(&mut self) {
        NamedScopeSource::close(self);
    }
}
