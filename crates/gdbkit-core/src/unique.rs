//! Unique value tabulation.

use std::collections::BTreeMap;

use gdbkit_core_common::{RowSource, Value};
use log::info;
use serde::Serialize;

use crate::error::Result;

/// A distinct value and how many rows hold it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    pub value: Value,
    pub count: usize,
}

/// Distinct values of one column in ascending value order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnTally {
    pub field: String,
    pub values: Vec<ValueCount>,
}

impl ColumnTally {
    /// Occurrences of `value` in the column.
    #[must_use]
    pub fn count_of(&self, value: &Value) -> usize {
        self.values
            .iter()
            .find(|v| &v.value == value)
            .map_or(0, |v| v.count)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UniqueValuesReport {
    pub dataset: String,
    pub records: usize,
    pub columns: Vec<ColumnTally>,
}

/// Tabulates the distinct values of each of `fields` in a single pass over
/// `dataset`. A field listed twice, in any case, is tabulated once under its
/// first spelling.
///
/// # Errors
///
/// Returns the store's error if the dataset or a field cannot be read.
pub fn unique_values<S, F>(source: &S, dataset: &str, fields: &[F]) -> Result<UniqueValuesReport>
where
    S: RowSource + ?Sized,
    F: AsRef<str>,
{
    let mut columns: Vec<&str> = Vec::with_capacity(fields.len());
    for field in fields {
        let field = field.as_ref().trim();
        if !field.is_empty() && !columns.iter().any(|c| c.eq_ignore_ascii_case(field)) {
            columns.push(field);
        }
    }

    let mut tallies = vec![BTreeMap::<Value, usize>::new(); columns.len()];
    let mut records = 0;
    for row in source.read_rows(dataset, &columns)? {
        let row = row?;
        records += 1;
        for (tally, value) in tallies.iter_mut().zip(row.values) {
            *tally.entry(value).or_default() += 1;
        }
    }
    info!(
        "Tabulated {} column(s) over {records} record(s) of {dataset}",
        columns.len()
    );

    Ok(UniqueValuesReport {
        dataset: dataset.to_string(),
        records,
        columns: columns
            .into_iter()
            .zip(tallies)
            .map(|(field, tally)| ColumnTally {
                field: field.to_string(),
                values: tally
                    .into_iter()
                    .map(|(value, count)| ValueCount { value, count })
                    .collect(),
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::JsonWorkspace;

    const PARCELS: &str = r#"{
        "datasets": {
            "Parcels": {
                "dataType": "Table",
                "fields": [
                    { "name": "Zone", "type": "Text", "length": 10 },
                    { "name": "Owner", "type": "Text", "length": 50 }
                ],
                "rows": [
                    { "Zone": "R1", "Owner": "Adams" },
                    { "Zone": "C2" },
                    { "Zone": "R1", "Owner": "Baker" }
                ]
            }
        }
    }"#;

    fn parcels() -> JsonWorkspace {
        JsonWorkspace::from_json("parcels.gdb.json", PARCELS).unwrap()
    }

    #[test]
    fn test_repeated_field_tabulated_once() {
        let report =
            unique_values(&parcels(), "Parcels", &["Zone", "Owner", "zone", "ZONE"]).unwrap();
        let fields: Vec<&str> = report.columns.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, ["Zone", "Owner"]);
        assert_eq!(report.records, 3);
    }

    #[test]
    fn test_values_sorted_with_null_first() {
        let report = unique_values(&parcels(), "Parcels", &["Owner", "Zone"]).unwrap();
        let owner = &report.columns[0];
        assert_eq!(owner.values[0].value, Value::Null);
        assert_eq!(owner.count_of(&Value::Null), 1);
        assert_eq!(report.columns[1].count_of(&Value::from("R1")), 2);
        assert_eq!(report.columns[1].count_of(&Value::from("X9")), 0);
    }

    #[test]
    fn test_blank_field_names_ignored() {
        let report = unique_values(&parcels(), "Parcels", &[" ", "Zone "]).unwrap();
        assert_eq!(report.columns.len(), 1);
        assert_eq!(report.columns[0].field, "Zone");
    }
}
