//! Field metadata as reported by a dataset store.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage type of a dataset field.
///
/// Variant names follow the type names a geodatabase reports for its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldType {
    /// Variable-length text, bounded by the field length.
    Text,
    /// 16-bit signed integer.
    SmallInteger,
    /// 32-bit signed integer.
    Integer,
    /// Single-precision floating point.
    Single,
    /// Double-precision floating point.
    Double,
    /// Date and time.
    Date,
    /// Shape column of a feature class.
    Geometry,
    /// Replication identifier maintained by the geodatabase.
    #[serde(rename = "GlobalID")]
    GlobalId,
    /// User-maintained GUID.
    Guid,
    /// Object identifier maintained by the geodatabase.
    #[serde(rename = "OID")]
    Oid,
    /// Binary large object.
    Blob,
    /// Raster column.
    Raster,
}

/// Field types whose columns are maintained by the geodatabase itself.
pub const SYSTEM_FIELD_TYPES: [FieldType; 5] = [
    FieldType::Geometry,
    FieldType::GlobalId,
    FieldType::Guid,
    FieldType::Oid,
    FieldType::Date,
];

impl FieldType {
    /// Returns the display name of this field type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "Text",
            FieldType::SmallInteger => "SmallInteger",
            FieldType::Integer => "Integer",
            FieldType::Single => "Single",
            FieldType::Double => "Double",
            FieldType::Date => "Date",
            FieldType::Geometry => "Geometry",
            FieldType::GlobalId => "GlobalID",
            FieldType::Guid => "Guid",
            FieldType::Oid => "OID",
            FieldType::Blob => "Blob",
            FieldType::Raster => "Raster",
        }
    }

    /// Returns `true` for the types listed in [`SYSTEM_FIELD_TYPES`].
    #[must_use]
    pub fn is_system_managed(&self) -> bool {
        SYSTEM_FIELD_TYPES.contains(self)
    }

    /// Returns `true` if a column of this type may be dropped and re-created.
    ///
    /// Shape, object id, global id and raster columns belong to the dataset
    /// and cannot be replaced by a user edit.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        !matches!(
            self,
            FieldType::Geometry | FieldType::GlobalId | FieldType::Oid | FieldType::Raster
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a field type keyword is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown field type '{0}'")]
pub struct ParseFieldTypeError(pub String);

impl FromStr for FieldType {
    type Err = ParseFieldTypeError;

    /// Parses a field type from either its display name or the keyword used
    /// when adding fields (`TEXT`, `SHORT`, `LONG`, `FLOAT`, ...).
    /// Matching is case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field_type = match s.trim().to_ascii_lowercase().as_str() {
            "text" | "string" => FieldType::Text,
            "smallinteger" | "short" => FieldType::SmallInteger,
            "integer" | "long" => FieldType::Integer,
            "single" | "float" => FieldType::Single,
            "double" => FieldType::Double,
            "date" => FieldType::Date,
            "geometry" => FieldType::Geometry,
            "globalid" => FieldType::GlobalId,
            "guid" => FieldType::Guid,
            "oid" => FieldType::Oid,
            "blob" => FieldType::Blob,
            "raster" => FieldType::Raster,
            _ => return Err(ParseFieldTypeError(s.to_string())),
        };
        Ok(field_type)
    }
}

/// Metadata of a single dataset field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name as stored. Identity comparisons use the lower-cased name.
    pub name: String,
    /// Storage type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Declared length, if the store reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    /// Name of the attribute domain bound to this field, if any.
    #[serde(default, rename = "domain", skip_serializing_if = "Option::is_none")]
    pub domain_name: Option<String>,
}

impl FieldDescriptor {
    /// Creates a descriptor without a domain.
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: FieldType, length: Option<u32>) -> Self {
        Self {
            name: name.into(),
            field_type,
            length,
            domain_name: None,
        }
    }

    /// Binds an attribute domain to this descriptor.
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain_name = Some(domain.into());
        self
    }

    /// Lower-cased name used as the field's identity.
    #[must_use]
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    /// Returns `true` if `name` refers to this field, ignoring case.
    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }

    /// Bound domain name, treating an empty name as no domain.
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.domain_name.as_deref().filter(|d| !d.is_empty())
    }
}
