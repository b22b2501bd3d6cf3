//! Schema comparison between an input and a target dataset.
//!
//! The comparison works on two [`FieldCatalog`]s and produces a
//! [`SchemaDiff`]: fields present on one side only, and type or length
//! mismatches among the fields both sides share.
//!
//! Shape bookkeeping columns come and go with the storage format, so names in
//! [`SKIP_FIELD_NAMES`] are left out of the missing-field sets. They are still
//! checked for type and length mismatches.

use std::collections::BTreeSet;

use gdbkit_core_common::{FieldType, MetadataSource, SYSTEM_FIELD_TYPES};
use log::info;
use serde::Serialize;

use crate::catalog::{FieldCatalog, build_catalog, require_table};
use crate::error::Result;

/// Field names never reported as missing.
pub const SKIP_FIELD_NAMES: [&str; 5] = [
    "shape_length",
    "shape_area",
    "shape.len",
    "shape.area",
    "shape",
];

/// Options for [`compare_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareOptions {
    /// Lower-cased names left out of the missing-field sets.
    pub skip_names: BTreeSet<String>,
    /// Field types left out of the missing-field sets. Empty by default;
    /// [`CompareOptions::skip_system_types`] fills it with
    /// [`SYSTEM_FIELD_TYPES`].
    pub skip_types: BTreeSet<FieldType>,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            skip_names: SKIP_FIELD_NAMES.iter().map(ToString::to_string).collect(),
            skip_types: BTreeSet::new(),
        }
    }
}

impl CompareOptions {
    /// Also leaves system-maintained field types out of the missing-field sets.
    #[must_use]
    pub fn skip_system_types(mut self) -> Self {
        self.skip_types.extend(SYSTEM_FIELD_TYPES);
        self
    }

    /// Adds a name to leave out of the missing-field sets.
    #[must_use]
    pub fn skip_name(mut self, name: &str) -> Self {
        self.skip_names.insert(name.to_lowercase());
        self
    }

    fn reports_missing(&self, key: &str, field_type: FieldType) -> bool {
        !self.skip_names.contains(key) && !self.skip_types.contains(&field_type)
    }
}

/// A field whose type or length differs between input and target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMismatch {
    /// Lower-cased field name.
    pub field: String,
    pub input_type: FieldType,
    pub input_len: Option<u32>,
    pub target_type: FieldType,
    pub target_len: Option<u32>,
}

/// Logical dataset names of the two sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameComparison {
    pub input: String,
    pub target: String,
    pub same: bool,
}

/// Result of comparing two field catalogs.
///
/// All collections are in lexicographic field order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaDiff {
    pub names: NameComparison,
    /// Fields of the target that the input lacks.
    pub missing_from_input: BTreeSet<String>,
    /// Fields of the input that the target lacks.
    pub missing_from_target: BTreeSet<String>,
    pub type_mismatches: Vec<FieldMismatch>,
    pub length_mismatches: Vec<FieldMismatch>,
}

impl SchemaDiff {
    /// Returns `true` if neither side lacks a reported field.
    #[must_use]
    pub fn all_fields_present(&self) -> bool {
        self.missing_from_input.is_empty() && self.missing_from_target.is_empty()
    }

    /// Returns `true` if the schemas match in every checked respect.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.all_fields_present()
            && self.type_mismatches.is_empty()
            && self.length_mismatches.is_empty()
    }
}

/// Compares two catalogs with the default options.
#[must_use]
pub fn compare(input: &FieldCatalog, target: &FieldCatalog) -> SchemaDiff {
    compare_with(input, target, &CompareOptions::default())
}

/// Compares two catalogs.
#[must_use]
pub fn compare_with(
    input: &FieldCatalog,
    target: &FieldCatalog,
    options: &CompareOptions,
) -> SchemaDiff {
    let missing = |from: &FieldCatalog, other: &FieldCatalog| -> BTreeSet<String> {
        from.iter()
            .filter(|(key, _)| !other.contains(key))
            .filter(|(key, field)| options.reports_missing(key, field.field_type))
            .map(|(key, _)| key.to_string())
            .collect()
    };

    let mut type_mismatches = Vec::new();
    let mut length_mismatches = Vec::new();
    for (key, input_field) in input.iter() {
        let Some(target_field) = target.get(key) else {
            continue;
        };
        let mismatch = || FieldMismatch {
            field: key.to_string(),
            input_type: input_field.field_type,
            input_len: input_field.length,
            target_type: target_field.field_type,
            target_len: target_field.length,
        };
        if input_field.field_type != target_field.field_type {
            type_mismatches.push(mismatch());
        }
        if input_field.length != target_field.length {
            length_mismatches.push(mismatch());
        }
    }

    SchemaDiff {
        names: NameComparison {
            input: input.name().to_string(),
            target: target.name().to_string(),
            same: input.name() == target.name(),
        },
        missing_from_input: missing(target, input),
        missing_from_target: missing(input, target),
        type_mismatches,
        length_mismatches,
    }
}

/// Checks the schema of `input_dataset` against `target_dataset`.
///
/// Both datasets must be feature classes or tables. The two sides may live in
/// different stores.
///
/// # Errors
///
/// Returns an input-shape error if either dataset is not tabular, or the
/// store's error if a catalog cannot be built.
pub fn check_schema<I, T>(
    input_source: &I,
    input_dataset: &str,
    target_source: &T,
    target_dataset: &str,
    options: &CompareOptions,
) -> Result<SchemaDiff>
where
    I: MetadataSource + ?Sized,
    T: MetadataSource + ?Sized,
{
    require_table(input_source, input_dataset)?;
    require_table(target_source, target_dataset)?;

    info!("Checking schema of {input_dataset} against {target_dataset}");
    let input = build_catalog(input_source, input_dataset)?;
    let target = build_catalog(target_source, target_dataset)?;
    let diff = compare_with(&input, &target, options);
    info!(
        "{} missing field(s), {} type mismatch(es), {} length mismatch(es)",
        diff.missing_from_input.len() + diff.missing_from_target.len(),
        diff.type_mismatches.len(),
        diff.length_mismatches.len()
    );
    Ok(diff)
}
