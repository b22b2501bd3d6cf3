//! Field catalogs: case-normalized snapshots of a dataset's field metadata.

use std::collections::BTreeMap;

use gdbkit_core_common::{DatasetDescription, FieldDescriptor, MetadataSource};
use log::debug;

use crate::error::{InputError, Result};

/// Marker in a data source path identifying an enterprise geodatabase
/// connection, whose dataset names carry an owner qualifier.
pub const QUALIFIED_NAME_MARKER: &str = ".sde";

/// Snapshot of a dataset's fields keyed by lower-cased field name.
///
/// Iteration is in lexicographic key order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldCatalog {
    name: String,
    fields: BTreeMap<String, FieldDescriptor>,
    domain_bindings: Vec<(String, String)>,
}

impl FieldCatalog {
    /// Builds a catalog for a dataset with logical name `name`.
    ///
    /// When two fields share a lower-cased name the later one wins.
    pub fn from_fields(
        name: impl Into<String>,
        fields: impl IntoIterator<Item = FieldDescriptor>,
    ) -> Self {
        let mut catalog = Self {
            name: name.into(),
            ..Self::default()
        };
        for field in fields {
            let key = field.key();
            if let Some(domain) = field.domain() {
                let domain = domain.to_lowercase();
                match catalog.domain_bindings.iter_mut().find(|(f, _)| *f == key) {
                    Some(binding) => binding.1 = domain,
                    None => catalog.domain_bindings.push((key.clone(), domain)),
                }
            } else {
                catalog.domain_bindings.retain(|(f, _)| *f != key);
            }
            catalog.fields.insert(key, field);
        }
        catalog
    }

    /// Logical name of the dataset the catalog was built from.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up a field, ignoring case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(&name.to_lowercase())
    }

    /// Returns `true` if the catalog holds `name`, ignoring case.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Lower-cased field names.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// `(lower-cased name, descriptor)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldDescriptor)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `(lower-cased field name, lower-cased domain name)` for every field
    /// bound to a domain, in field order.
    #[must_use]
    pub fn domain_bindings(&self) -> &[(String, String)] {
        &self.domain_bindings
    }
}

/// Strips the owner qualifier from a dataset name when its data source is an
/// enterprise geodatabase connection.
///
/// `DCGIS.NotaryPublicPt` read through `prod.sde` becomes `NotaryPublicPt`;
/// names from any other source are returned unchanged.
#[must_use]
pub fn logical_name(description: &DatasetDescription) -> String {
    let base = description.base_name.as_str();
    if description.catalog_path.contains(QUALIFIED_NAME_MARKER) {
        base.split_once('.').map_or(base, |(_, name)| name).to_string()
    } else {
        base.to_string()
    }
}

/// Builds the field catalog of `dataset`.
///
/// # Errors
///
/// Returns an error if the dataset cannot be described or its fields cannot
/// be enumerated.
pub fn build_catalog<S>(source: &S, dataset: &str) -> Result<FieldCatalog>
where
    S: MetadataSource + ?Sized,
{
    let description = source.describe(dataset)?;
    let fields = source.list_fields(dataset)?;
    debug!("Read {} field(s) from {dataset}", fields.len());
    Ok(FieldCatalog::from_fields(logical_name(&description), fields))
}

/// Describes `dataset` and rejects anything that is not a feature class or
/// table.
///
/// # Errors
///
/// Returns [`InputError::NotTable`] for non-tabular datasets, or the store's
/// error if the dataset cannot be described.
pub fn require_table<S>(source: &S, dataset: &str) -> Result<DatasetDescription>
where
    S: MetadataSource + ?Sized,
{
    let description = source.describe(dataset)?;
    if description.data_type.is_tabular() {
        Ok(description)
    } else {
        Err(InputError::NotTable {
            dataset: dataset.to_string(),
            data_type: description.data_type,
        }
        .into())
    }
}
