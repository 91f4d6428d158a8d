//! # Source Connector
//!
//! The boundary between the data-flow framework and the model layer:
//!
//! - [`source::NamedScopeSource`]: wraps a model's named scope as a batched,
//!   cursor-resumable record source
//! - [`source::RecordSource`]: the erased Source capability the framework
//!   drives (describe, iterate, close)
//! - [`descriptor::SourceDescriptor`]: the serializable snapshot that lets a
//!   pipeline definition persist a source and rebuild it later

pub mod descriptor;
pub mod source;

pub use descriptor::{SourceDescriptor, DEFAULT_BATCH_SIZE};
pub use source::{NamedScopeSource, RecordBatches, RecordSource};
