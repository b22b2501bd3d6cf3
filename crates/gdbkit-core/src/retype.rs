//! Changing a field's type or length while keeping its values.
//!
//! A store cannot alter a column in place, so the field is dropped and added
//! back with the new definition, and the values read beforehand are written
//! back by row id. Every value is converted to the new definition before the
//! field is dropped, so a value that does not fit aborts the run with the
//! dataset untouched. The replacement itself is not atomic: a store failure
//! after the drop leaves the new field added but only partially populated.

use std::collections::BTreeMap;

use anyhow::anyhow;
use gdbkit_core_common::{DatasetStore, FieldDescriptor, FieldType, OID_TOKEN, RowId, Value};
use log::{debug, info};
use serde::Serialize;

use crate::catalog::require_table;
use crate::error::{ConfigError, ConversionError, MetadataError, Result};

/// Outcome of a field replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetypeSummary {
    pub dataset: String,
    pub field: String,
    pub from_type: FieldType,
    pub from_length: Option<u32>,
    pub to_type: FieldType,
    pub to_length: Option<u32>,
    pub rows_updated: usize,
}

/// Converts `value` so that it can be stored in a field of `target` type and
/// `length`.
///
/// # Errors
///
/// Returns a [`ConversionError`] if the value has no representation in the
/// target type, is out of its range, or is longer than `length`.
pub fn cast_value(
    value: Value,
    target: FieldType,
    length: Option<u32>,
) -> std::result::Result<Value, ConversionError> {
    let incompatible = |value: &Value| ConversionError::Incompatible {
        value: value.to_string(),
        kind: value.kind(),
        target,
    };
    let out_of_range = |value: &Value| ConversionError::OutOfRange {
        value: value.to_string(),
        target,
    };

    if value.is_null() {
        return Ok(Value::Null);
    }

    let cast = match target {
        FieldType::Text | FieldType::Date | FieldType::Guid | FieldType::Blob => {
            let text = match &value {
                Value::Integer(_) | Value::Double(_) if target == FieldType::Text => {
                    value.to_string()
                },
                Value::Text(text) => text.clone(),
                _ => return Err(incompatible(&value)),
            };
            if let Some(length) = length
                && text.chars().count() > length as usize
            {
                return Err(ConversionError::TooLong {
                    value: text,
                    length,
                });
            }
            Value::Text(text)
        },
        FieldType::SmallInteger | FieldType::Integer => {
            let integer = match &value {
                Value::Integer(v) => *v,
                #[allow(clippy::cast_possible_truncation)]
                Value::Double(v) if v.fract() == 0.0 && v.is_finite() => *v as i64,
                Value::Text(text) => text
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| incompatible(&value))?,
                _ => return Err(incompatible(&value)),
            };
            let fits = if target == FieldType::SmallInteger {
                i16::try_from(integer).is_ok()
            } else {
                i32::try_from(integer).is_ok()
            };
            if !fits {
                return Err(out_of_range(&value));
            }
            Value::Integer(integer)
        },
        FieldType::Single | FieldType::Double => {
            let double = match &value {
                #[allow(clippy::cast_precision_loss)]
                Value::Integer(v) => *v as f64,
                Value::Double(v) => *v,
                Value::Text(text) => text
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| incompatible(&value))?,
                Value::Null | Value::Geometry(_) => return Err(incompatible(&value)),
            };
            #[allow(clippy::cast_possible_truncation)]
            let narrowed = double as f32;
            if target == FieldType::Single && double.is_finite() && !narrowed.is_finite() {
                return Err(out_of_range(&value));
            }
            Value::Double(double)
        },
        FieldType::Geometry | FieldType::GlobalId | FieldType::Oid | FieldType::Raster => {
            return Err(incompatible(&value));
        },
    };
    Ok(cast)
}

/// Replaces `field` of `dataset` with a field of `new_type` and `length`,
/// carrying every row's value over.
///
/// # Errors
///
/// Returns an input-shape error if the dataset is not a feature class or
/// table, [`MetadataError::FieldNotFound`] if the field does not exist,
/// [`ConfigError`] if either the old or the new type cannot be replaced,
/// a [`ConversionError`] if a value does not fit the new definition, or the
/// store's error.
pub fn change_field_type<S>(
    store: &mut S,
    dataset: &str,
    field: &str,
    new_type: FieldType,
    length: Option<u32>,
) -> Result<RetypeSummary>
where
    S: DatasetStore + ?Sized,
{
    require_table(&*store, dataset)?;
    if !new_type.is_editable() {
        return Err(ConfigError::InvalidOption {
            option: "field type".to_string(),
            message: format!("cannot create a {new_type} field"),
        }
        .into());
    }
    if length == Some(0) {
        return Err(ConfigError::InvalidOption {
            option: "field length".to_string(),
            message: "length must be greater than zero".to_string(),
        }
        .into());
    }

    let existing = store
        .list_fields(dataset)?
        .into_iter()
        .find(|f| f.is_named(field))
        .ok_or_else(|| MetadataError::FieldNotFound {
            dataset: dataset.to_string(),
            field: field.to_string(),
        })?;
    if !existing.field_type.is_editable() {
        return Err(ConfigError::InvalidOption {
            option: "field".to_string(),
            message: format!(
                "{} is a {} field and cannot be replaced",
                existing.name, existing.field_type
            ),
        }
        .into());
    }

    // Values keyed by row id, already converted to the new definition.
    let mut preserved = BTreeMap::<RowId, Value>::new();
    for row in store.read_rows(dataset, &[OID_TOKEN, existing.name.as_str()])? {
        let row = row?;
        let value = row.values.into_iter().nth(1).ok_or_else(|| {
            anyhow!(
                "Row {} of {dataset} came back without a {} value",
                row.id,
                existing.name
            )
        })?;
        let value =
            cast_value(value, new_type, length).map_err(|e| e.at_row(row.id, &existing.name))?;
        preserved.insert(row.id, value);
    }
    debug!("Preserved {} value(s) of {}", preserved.len(), existing.name);

    let replacement = FieldDescriptor::new(existing.name.clone(), new_type, length);

    info!("delete {} field", existing.name);
    store.delete_field(dataset, &existing.name)?;
    info!("add {} field", existing.name);
    store.add_field(dataset, &replacement)?;
    info!("update field value");
    let rows_updated = preserved.len();
    for (id, value) in preserved {
        store.update_row(dataset, id, &existing.name, value)?;
    }
    info!("Finished");

    Ok(RetypeSummary {
        dataset: dataset.to_string(),
        field: existing.name,
        from_type: existing.field_type,
        from_length: existing.length,
        to_type: new_type,
        to_length: length,
        rows_updated,
    })
}

/// Replaces `field` of `dataset` with a text field of `length` characters.
///
/// # Errors
///
/// Same as [`change_field_type`].
pub fn change_text_field_length<S>(
    store: &mut S,
    dataset: &str,
    field: &str,
    length: u32,
) -> Result<RetypeSummary>
where
    S: DatasetStore + ?Sized,
{
    change_field_type(store, dataset, field, FieldType::Text, Some(length))
}
