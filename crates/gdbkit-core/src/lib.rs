//! `gdbkit-core` is the core library for the `gdbkit` project, providing schema and field
//! maintenance operations for geodatabase datasets.
//!
//! This crate includes:
//! - **Field Catalogs**: case-normalized snapshots of a dataset's fields.
//! - **Schema Comparison**: missing fields and type/length mismatches between two datasets.
//! - **Domains**: decoding of coded-value and range domains, and the per-field domain report.
//! - **Field Maintenance**: value-preserving field retyping, vertex counts and unique values.
//! - **JSON Workspace**: a file-backed store implementing every store capability.
//!
//! Operations are written against the store traits of [`gdbkit_core_common`] and return
//! structured reports; the [`render`] module turns reports into text.

pub mod catalog;
pub mod compare;
pub mod domains;
pub mod error;
pub mod render;
pub mod retype;
pub mod unique;
pub mod vertices;
pub mod workspace;

pub use gdbkit_core_common as common;
pub use gdbkit_core_common::{FieldDescriptor, FieldType, Value};
