//! # Scope Registry
//!
//! Maps `(model class, scope name)` pairs to scope constructor functions so
//! persisted descriptors can be resolved back into live sources without any
//! dynamic dispatch.
//!
//! Registration happens once at startup over `&mut self`; after that the
//! registry is read-only, so resolution needs no locking.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::connector::descriptor::SourceDescriptor;
use crate::connector::source::{NamedScopeSource, RecordSource};
use crate::error::{Result, SourceError};
use crate::models::Model;
use crate::scopes::{ScopeArgs, ScopeBuild, ScopeQuery, ScopeSelect};

/// Key for scope lookup in the registry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeKey {
    pub model_class: String,
    pub scope_name: String,
}

impl ScopeKey {
    /// Create a new scope key with explicit values
    pub fn new(model_class: impl Into<String>, scope_name: impl Into<String>) -> Self {
        Self {
            model_class: model_class.into(),
            scope_name: scope_name.into(),
        }
    }

    /// Create a scope key from a descriptor
    pub fn from_descriptor(descriptor: &SourceDescriptor) -> Self {
        Self {
            model_class: descriptor.model_class.clone(),
            scope_name: descriptor.scope_name.clone(),
        }
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.model_class, self.scope_name)
    }
}

type SourceFactory = Arc<dyn Fn(&SourceDescriptor) -> Result<Box<dyn RecordSource>> + Send + Sync>;

/// Explicit mapping from scope keys to source constructors.
///
/// Model classes are tracked separately from scope entries so resolution can
/// distinguish "this model is unknown" from "this model exists but has no
/// such scope".
pub struct ScopeRegistry {
    factories: HashMap<ScopeKey, SourceFactory>,
    model_classes: HashSet<String>,
}

impl ScopeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            model_classes: HashSet::new(),
        }
    }

    /// Register a named scope for a model.
    ///
    /// The build closure is the scope body: it receives the descriptor's
    /// stored arguments and produces a fresh scoped SELECT. Re-registering
    /// the same key replaces the previous constructor.
    pub fn register<T, F>(&mut self, scope_name: &str, build: F)
    where
        T: Model,
        F: Fn(&ScopeArgs<'_>) -> Result<ScopeSelect> + Send + Sync + 'static,
    {
        let key = ScopeKey::new(T::MODEL_CLASS, scope_name);
        let name = scope_name.to_string();
        let build: ScopeBuild = Arc::new(build);

        let factory: SourceFactory = Arc::new(move |descriptor: &SourceDescriptor| {
            let scope = ScopeQuery::<T>::from_parts(name.clone(), build.clone());
            let source = NamedScopeSource::new(Some(scope), descriptor.scope_params.clone())?
                .with_batch_size(descriptor.batch_size)?;
            Ok(Box::new(source) as Box<dyn RecordSource>)
        });

        self.model_classes.insert(T::MODEL_CLASS.to_string());
        self.factories.insert(key.clone(), factory);

        info!(key = %key, "Registered named scope");
    }

    /// Resolve a descriptor back into a live source.
    ///
    /// `UnresolvedModel` when the model class was never registered,
    /// `UnresolvedScope` when the model is known but the scope name is not.
    pub fn resolve(&self, descriptor: &SourceDescriptor) -> Result<Box<dyn RecordSource>> {
        if !self.model_classes.contains(&descriptor.model_class) {
            return Err(SourceError::UnresolvedModel {
                model_class: descriptor.model_class.clone(),
            });
        }

        let key = ScopeKey::from_descriptor(descriptor);
        let factory = self
            .factories
            .get(&key)
            .ok_or_else(|| SourceError::UnresolvedScope {
                model_class: descriptor.model_class.clone(),
                scope_name: descriptor.scope_name.clone(),
            })?;

        debug!(key = %key, "Resolving source from descriptor");
        factory(descriptor)
    }

    /// Resolve directly from the descriptor's JSON form
    pub fn resolve_json(&self, value: serde_json::Value) -> Result<Box<dyn RecordSource>> {
        self.resolve(&SourceDescriptor::from_json(value)?)
    }

    /// Whether a scope is registered under this model class and name
    pub fn contains(&self, model_class: &str, scope_name: &str) -> bool {
        self.factories
            .contains_key(&ScopeKey::new(model_class, scope_name))
    }

    /// Number of registered scopes
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for ScopeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
