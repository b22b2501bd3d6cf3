//! Common types and traits shared across `gdbkit` crates.
//!
//! This crate provides the data model (fields, domains, values) and the store
//! capabilities that `gdbkit-core` operations are written against, so that a
//! store implementation only needs to depend on this crate.

pub mod domain;
pub mod field;
pub mod store;
pub mod value;

// Re-export commonly used types
pub use domain::{Domain, DomainKind};
pub use field::{FieldDescriptor, FieldType, ParseFieldTypeError, SYSTEM_FIELD_TYPES};
pub use store::{
    DataType, DatasetDescription, DatasetStore, MetadataSource, OID_TOKEN, RowIter, RowSource,
    SHAPE_TOKEN, SchemaEditor, ShapeType, WorkspaceKind,
};
pub use value::{Row, RowId, Value};
