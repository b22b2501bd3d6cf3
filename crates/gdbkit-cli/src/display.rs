//! Display utilities for formatting CLI output as tables.
//!
//! This module provides table row structures and formatting functions
//! for presenting `gdbkit` reports in a human-readable format.

use tabled::{Table, Tabled};

use gdbkit_core::compare::{FieldMismatch, SchemaDiff};
use gdbkit_core::domains::DomainReport;
use gdbkit_core::render::group_thousands;
use gdbkit_core::unique::UniqueValuesReport;
use gdbkit_core::vertices::VertexCount;

/// Table row representation for displaying dataset information.
#[derive(Tabled)]
pub struct DatasetRow {
    /// Name of the dataset within its workspace.
    #[tabled(rename = "Dataset")]
    pub name: String,
    /// Kind of dataset (e.g., `FeatureClass`, `Table`).
    #[tabled(rename = "Type")]
    pub data_type: String,
    /// Geometry type for feature classes.
    #[tabled(rename = "Shape")]
    pub shape_type: String,
    #[tabled(rename = "Fields")]
    pub fields: String,
    #[tabled(rename = "Rows")]
    pub rows: String,
}

/// Table row representation for a field present on one side only.
#[derive(Tabled)]
pub struct MissingFieldRow {
    #[tabled(rename = "Field")]
    pub field: String,
    /// Layer the field is missing from (`input` or `target`).
    #[tabled(rename = "Missing From")]
    pub missing_from: String,
}

/// Table row representation for a type or length mismatch.
#[derive(Tabled)]
pub struct MismatchRow {
    #[tabled(rename = "Field")]
    pub field: String,
    #[tabled(rename = "Input Type")]
    pub input_type: String,
    #[tabled(rename = "Input Length")]
    pub input_length: String,
    #[tabled(rename = "Target Type")]
    pub target_type: String,
    #[tabled(rename = "Target Length")]
    pub target_length: String,
}

impl From<&FieldMismatch> for MismatchRow {
    fn from(m: &FieldMismatch) -> Self {
        Self {
            field: m.field.clone(),
            input_type: m.input_type.to_string(),
            input_length: length(m.input_len),
            target_type: m.target_type.to_string(),
            target_length: length(m.target_len),
        }
    }
}

/// Table row representation for one legal value of a domain-bound field.
#[derive(Tabled)]
pub struct DomainCodeRow {
    #[tabled(rename = "Dataset")]
    pub dataset: String,
    #[tabled(rename = "Field")]
    pub field: String,
    #[tabled(rename = "Domain")]
    pub domain: String,
    /// Coded value, or `min`/`max` for range domains.
    #[tabled(rename = "Code")]
    pub code: String,
    #[tabled(rename = "Description")]
    pub description: String,
}

/// Table row representation for a distinct value and its count.
#[derive(Tabled)]
pub struct ValueCountRow {
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Count")]
    pub count: usize,
}

/// Table row representation for vertex totals.
#[derive(Tabled)]
pub struct VertexRow {
    #[tabled(rename = "Dataset")]
    pub dataset: String,
    #[tabled(rename = "Records")]
    pub records: String,
    #[tabled(rename = "Vertices")]
    pub vertices: String,
}

fn length(len: Option<u32>) -> String {
    len.map_or_else(|| "-".to_string(), |l| l.to_string())
}

/// Builds the missing-field rows of a schema comparison, input side first.
#[must_use]
pub fn missing_field_rows(diff: &SchemaDiff) -> Vec<MissingFieldRow> {
    let side = |fields: &std::collections::BTreeSet<String>, missing_from: &str| {
        fields
            .iter()
            .map(|field| MissingFieldRow {
                field: field.clone(),
                missing_from: missing_from.to_string(),
            })
            .collect::<Vec<_>>()
    };
    let mut rows = side(&diff.missing_from_input, "input");
    rows.extend(side(&diff.missing_from_target, "target"));
    rows
}

/// Flattens a domain report into one row per legal value.
#[must_use]
pub fn domain_code_rows(report: &DomainReport) -> Vec<DomainCodeRow> {
    let mut rows = Vec::new();
    for dataset in report.datasets.iter().filter(|d| d.tabular) {
        for field in &dataset.fields {
            for (code, description) in field.descriptor.entries() {
                rows.push(DomainCodeRow {
                    dataset: dataset.base_name.clone(),
                    field: field.field.clone(),
                    domain: field.domain.clone(),
                    code,
                    description,
                });
            }
        }
    }
    rows
}

/// Display a schema comparison as tables.
pub fn display_schema_diff(diff: &SchemaDiff) {
    println!("\n=== Data Name ===");
    if diff.names.same {
        println!("Input and Target have same name: {}", diff.names.input);
    } else {
        println!("{} : {}", diff.names.input, diff.names.target);
    }

    println!("\n=== Missing Fields ===");
    if diff.all_fields_present() {
        println!("All fields are presented in input and target");
    } else {
        println!("{}", Table::new(missing_field_rows(diff)));
    }

    for (title, mismatches) in [
        ("Type Mismatches", &diff.type_mismatches),
        ("Length Mismatches", &diff.length_mismatches),
    ] {
        println!("\n=== {title} ===");
        if mismatches.is_empty() {
            println!("None");
        } else {
            let rows: Vec<MismatchRow> = mismatches.iter().map(MismatchRow::from).collect();
            println!("{}", Table::new(rows));
        }
    }
}

/// Display a domain listing as a table, followed by the datasets that were
/// skipped.
pub fn display_domain_report(report: &DomainReport) {
    println!("\nWorkspace: {}", report.workspace);
    println!("\n=== Domain Codes ===");
    println!("{}", Table::new(domain_code_rows(report)));

    let skipped: Vec<&str> = report
        .datasets
        .iter()
        .filter(|d| !d.tabular)
        .map(|d| d.base_name.as_str())
        .collect();
    if !skipped.is_empty() {
        println!("\nNot Feature Class or Table: {}", skipped.join(", "));
    }
}

/// Display vertex totals as a table.
pub fn display_vertex_count(dataset: &str, count: &VertexCount) {
    let row = VertexRow {
        dataset: dataset.to_string(),
        records: group_thousands(count.records),
        vertices: group_thousands(count.vertices),
    };
    println!("{}", Table::new([row]));
}

/// Display one table of distinct values per field.
pub fn display_unique_values(report: &UniqueValuesReport) {
    println!("\nDataset: {} ({} records)", report.dataset, report.records);
    for column in &report.columns {
        println!("\n=== {} ===", column.field);
        let rows: Vec<ValueCountRow> = column
            .values
            .iter()
            .map(|v| ValueCountRow {
                value: v.value.to_string(),
                count: v.count,
            })
            .collect();
        println!("{}", Table::new(rows));
    }
}
