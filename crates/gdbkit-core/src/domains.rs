//! Attribute domain decoding and the per-field domain report.

use std::collections::BTreeMap;

use gdbkit_core_common::{DomainKind, MetadataSource, Value};
use log::{debug, info};
use serde::{Serialize, Serializer};

use crate::catalog::FieldCatalog;
use crate::error::{InputError, MetadataError, Result};

/// Decoded form of a domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainDescriptor {
    /// Legal codes and their descriptions.
    Coded(#[serde(serialize_with = "serialize_codes")] BTreeMap<Value, String>),
    /// Legal numeric interval.
    Range { min: f64, max: f64 },
}

impl DomainDescriptor {
    /// `(label, text)` pairs describing the legal values: one pair per code
    /// for coded domains, `min` and `max` for ranges.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, String)> {
        match self {
            Self::Coded(codes) => codes
                .iter()
                .map(|(code, description)| (code.to_string(), description.clone()))
                .collect(),
            Self::Range { min, max } => vec![
                ("min".to_string(), min.to_string()),
                ("max".to_string(), max.to_string()),
            ],
        }
    }
}

#[derive(Serialize)]
struct CodedValue<'a> {
    code: &'a Value,
    description: &'a str,
}

fn serialize_codes<S>(
    codes: &BTreeMap<Value, String>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(codes.iter().map(|(code, description)| CodedValue {
        code,
        description,
    }))
}

/// Decoded domains keyed by lower-cased domain name.
pub type DomainMap = BTreeMap<String, DomainDescriptor>;

/// Decodes every domain defined in `workspace`.
///
/// # Errors
///
/// Returns the store's error if the domains cannot be listed.
pub fn decode_domains<S>(source: &S, workspace: &str) -> Result<DomainMap>
where
    S: MetadataSource + ?Sized,
{
    let mut decoded = DomainMap::new();
    for domain in source.list_domains(workspace)? {
        let descriptor = match domain.kind {
            DomainKind::Coded(codes) => DomainDescriptor::Coded(codes),
            DomainKind::Range { min, max } => DomainDescriptor::Range { min, max },
            _ => {
                debug!("Skipping domain {} of unsupported kind", domain.name);
                continue;
            },
        };
        decoded.insert(domain.name.to_lowercase(), descriptor);
    }
    debug!("Decoded {} domain(s) from {workspace}", decoded.len());
    Ok(decoded)
}

/// A domain-bound field and the values its domain allows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDomain {
    /// Lower-cased field name.
    pub field: String,
    /// Lower-cased domain name.
    pub domain: String,
    pub descriptor: DomainDescriptor,
}

/// Domain listing for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetDomains {
    pub dataset: String,
    pub base_name: String,
    /// `false` if the dataset is not a feature class or table; such datasets
    /// carry no field list.
    pub tabular: bool,
    pub fields: Vec<FieldDomain>,
}

/// Domain listing for a set of datasets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainReport {
    pub workspace: String,
    pub datasets: Vec<DatasetDomains>,
}

/// Resolves each domain binding of `catalog` against `domains`.
///
/// # Errors
///
/// Returns [`MetadataError::UnknownDomain`] if a field is bound to a domain
/// missing from `domains`.
pub fn resolve_field_domains(
    catalog: &FieldCatalog,
    domains: &DomainMap,
) -> Result<Vec<FieldDomain>> {
    catalog
        .domain_bindings()
        .iter()
        .map(|(field, domain)| -> Result<FieldDomain> {
            let descriptor = domains.get(domain).ok_or_else(|| MetadataError::UnknownDomain {
                field: field.clone(),
                domain: domain.clone(),
            })?;
            Ok(FieldDomain {
                field: field.clone(),
                domain: domain.clone(),
                descriptor: descriptor.clone(),
            })
        })
        .collect()
}

/// Lists, for every dataset, the domain-bound fields and their legal values.
///
/// Dataset names may carry surrounding quotes, which are removed. Datasets
/// that are not feature classes or tables are recorded and skipped.
///
/// # Errors
///
/// Returns [`InputError::NotGeodatabase`] if `workspace` cannot hold domains,
/// [`MetadataError::UnknownDomain`] for a binding to an undefined domain, or
/// the store's error.
pub fn domain_report<S, D>(source: &S, workspace: &str, datasets: &[D]) -> Result<DomainReport>
where
    S: MetadataSource + ?Sized,
    D: AsRef<str>,
{
    let kind = source.workspace_kind(workspace)?;
    if !kind.is_geodatabase() {
        return Err(InputError::NotGeodatabase {
            workspace: workspace.to_string(),
            kind,
        }
        .into());
    }

    let domains = decode_domains(source, workspace)?;
    let mut report = DomainReport {
        workspace: workspace.to_string(),
        datasets: Vec::with_capacity(datasets.len()),
    };

    for (counter, dataset) in datasets.iter().enumerate() {
        let dataset = dataset.as_ref().replace('\'', "");
        let description = source.describe(&dataset)?;
        info!(
            "{} of {}: {}",
            counter + 1,
            datasets.len(),
            description.base_name
        );

        let mut entry = DatasetDomains {
            dataset: dataset.clone(),
            base_name: description.base_name.clone(),
            tabular: description.data_type.is_tabular(),
            fields: Vec::new(),
        };
        if entry.tabular {
            let catalog = FieldCatalog::from_fields(
                description.base_name,
                source.list_fields(&dataset)?,
            );
            entry.fields = resolve_field_domains(&catalog, &domains)?;
        }
        report.datasets.push(entry);
    }

    Ok(report)
}
