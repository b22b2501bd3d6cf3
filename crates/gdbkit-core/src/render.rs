//! Plain-text rendering of operation reports.
//!
//! Each function turns a report into the line-oriented text the command line
//! prints. Reports stay free of presentation concerns; everything about
//! layout lives here, in `Display` adapters over the report types.

use std::fmt;

use crate::compare::{FieldMismatch, SchemaDiff};
use crate::domains::DomainReport;
use crate::retype::RetypeSummary;
use crate::unique::UniqueValuesReport;
use crate::vertices::VertexCount;

/// Formats `n` with `,` thousands separators.
#[must_use]
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

fn length(len: Option<u32>) -> String {
    len.map_or_else(|| "-".to_string(), |l| l.to_string())
}

fn mismatch_section(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    what: &str,
    mismatches: &[FieldMismatch],
    line: impl Fn(&FieldMismatch) -> String,
) -> fmt::Result {
    writeln!(f, "** Checking Field {title}")?;
    if mismatches.is_empty() {
        writeln!(f, "* No field {what} mismatch in common fields")?;
    } else {
        writeln!(f, "* Found {what} mismatch in common fields")?;
        for mismatch in mismatches {
            writeln!(f, "  Field:{}", mismatch.field)?;
            writeln!(f, "  {}", line(mismatch))?;
        }
        writeln!(
            f,
            "Total {} field(s) {what} mismatch found",
            mismatches.len()
        )?;
    }
    writeln!(f)
}

struct SchemaText<'a>(&'a SchemaDiff);

impl fmt::Display for SchemaText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let diff = self.0;

        writeln!(f, "****** Checking Data Name ******")?;
        if diff.names.same {
            writeln!(f, "Input and Target have same name")?;
        } else {
            writeln!(f, "Input and Target have different Name")?;
            writeln!(f, "{} : {}", diff.names.input, diff.names.target)?;
        }
        writeln!(f)?;

        writeln!(f, "****** Checking Schema ******")?;
        writeln!(f, "** Checking Fields List")?;
        if diff.all_fields_present() {
            writeln!(f, "* All fields are presented in input and target")?;
        } else {
            writeln!(f, "* Field not in input layer:")?;
            for field in &diff.missing_from_input {
                writeln!(f, "  {field}")?;
            }
            writeln!(f, "* Field not in target layer:")?;
            for field in &diff.missing_from_target {
                writeln!(f, "  {field}")?;
            }
        }
        writeln!(f)?;

        mismatch_section(f, "Type", "type", &diff.type_mismatches, |m| {
            format!(
                "Input:{} - Len:{}, Target:{} - Len:{}",
                m.input_type,
                length(m.input_len),
                m.target_type,
                length(m.target_len)
            )
        })?;
        mismatch_section(f, "Length", "length", &diff.length_mismatches, |m| {
            format!(
                "Input:{}, Target:{}",
                length(m.input_len),
                length(m.target_len)
            )
        })
    }
}

struct DomainText<'a>(&'a DomainReport);

impl fmt::Display for DomainText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.0.datasets.len();
        for (counter, dataset) in self.0.datasets.iter().enumerate() {
            writeln!(f, "# {} of {total} : {}", counter + 1, dataset.base_name)?;
            if !dataset.tabular {
                writeln!(f, "    !Not Feature Class or Table!")?;
                continue;
            }
            for (i, field) in dataset.fields.iter().enumerate() {
                if i > 0 {
                    writeln!(f)?;
                }
                writeln!(f, "    field name : {}", field.field)?;
                writeln!(f, "    domain name: {}", field.domain)?;
                for (code, description) in field.descriptor.entries() {
                    writeln!(f, "                 {code} : {description}")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

struct UniqueValuesText<'a>(&'a UniqueValuesReport);

impl fmt::Display for UniqueValuesText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for column in &self.0.columns {
            writeln!(f, "Field: {}", column.field)?;
            writeln!(f, "unique:")?;
            for entry in &column.values {
                writeln!(f, "    {}: {}", entry.value, entry.count)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Renders a schema comparison.
#[must_use]
pub fn schema_report(diff: &SchemaDiff) -> String {
    SchemaText(diff).to_string()
}

/// Renders a domain listing.
#[must_use]
pub fn domain_report(report: &DomainReport) -> String {
    DomainText(report).to_string()
}

/// Renders vertex totals, or the notice for unsupported shape types.
#[must_use]
pub fn vertex_report(count: Option<&VertexCount>) -> String {
    match count {
        Some(count) => format!(
            "# Total number of records: {}\n# Total number of vertices: {}\n",
            group_thousands(count.records),
            group_thousands(count.vertices)
        ),
        None => "# Not a polygon or line\n".to_string(),
    }
}

/// Renders a unique value tabulation.
#[must_use]
pub fn unique_values_report(report: &UniqueValuesReport) -> String {
    UniqueValuesText(report).to_string()
}

/// Renders the outcome of a field replacement.
#[must_use]
pub fn retype_report(summary: &RetypeSummary) -> String {
    format!(
        "{}: {} {}({}) -> {}({}), {} row(s) updated\nFinished\n",
        summary.dataset,
        summary.field,
        summary.from_type,
        length(summary.from_length),
        summary.to_type,
        length(summary.to_length),
        summary.rows_updated
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FieldCatalog;
    use crate::compare::compare;
    use crate::domains::{DatasetDomains, DomainDescriptor, FieldDomain};
    use crate::unique::{ColumnTally, ValueCount};
    use gdbkit_core_common::{FieldDescriptor, FieldType, Value};

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_schema_report_sections_in_order() {
        let input = FieldCatalog::from_fields(
            "roads",
            [FieldDescriptor::new("name", FieldType::Text, Some(50))],
        );
        let target = FieldCatalog::from_fields(
            "streets",
            [
                FieldDescriptor::new("name", FieldType::Text, Some(100)),
                FieldDescriptor::new("extra", FieldType::Text, Some(10)),
            ],
        );
        let text = schema_report(&compare(&input, &target));

        let positions: Vec<usize> = [
            "Input and Target have different Name",
            "roads : streets",
            "* Field not in input layer:\n  extra\n",
            "* No field type mismatch in common fields",
            "* Found length mismatch in common fields",
            "  Field:name\n  Input:50, Target:100\n",
            "Total 1 field(s) length mismatch found",
        ]
        .iter()
        .map(|needle| text.find(needle).unwrap_or_else(|| panic!("missing {needle:?}")))
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_schema_report_full_text() {
        let input = FieldCatalog::from_fields(
            "roads",
            [
                FieldDescriptor::new("id", FieldType::Integer, None),
                FieldDescriptor::new("name", FieldType::Text, Some(50)),
            ],
        );
        let target = FieldCatalog::from_fields(
            "roads",
            [
                FieldDescriptor::new("id", FieldType::Integer, None),
                FieldDescriptor::new("name", FieldType::Text, Some(100)),
                FieldDescriptor::new("extra", FieldType::Text, Some(10)),
            ],
        );
        let expected = "\
****** Checking Data Name ******
Input and Target have same name

****** Checking Schema ******
** Checking Fields List
* Field not in input layer:
  extra
* Field not in target layer:

** Checking Field Type
* No field type mismatch in common fields

** Checking Field Length
* Found length mismatch in common fields
  Field:name
  Input:50, Target:100
Total 1 field(s) length mismatch found

";
        assert_eq!(schema_report(&compare(&input, &target)), expected);
    }

    #[test]
    fn test_schema_report_all_present() {
        let catalog = FieldCatalog::from_fields(
            "roads",
            [FieldDescriptor::new("id", FieldType::Integer, None)],
        );
        let text = schema_report(&compare(&catalog, &catalog));
        assert!(text.contains("Input and Target have same name"));
        assert!(text.contains("* All fields are presented in input and target"));
        assert!(text.contains("* No field length mismatch in common fields"));
    }

    #[test]
    fn test_type_mismatch_line() {
        let input = FieldCatalog::from_fields(
            "t",
            [FieldDescriptor::new("code", FieldType::Integer, None)],
        );
        let target = FieldCatalog::from_fields(
            "t",
            [FieldDescriptor::new("code", FieldType::Text, Some(4))],
        );
        let text = schema_report(&compare(&input, &target));
        assert!(text.contains("  Input:Integer - Len:-, Target:Text - Len:4\n"));
    }

    #[test]
    fn test_domain_report_text() {
        let report = DomainReport {
            workspace: "city.gdb".to_string(),
            datasets: vec![
                DatasetDomains {
                    dataset: "hydrants".to_string(),
                    base_name: "hydrants".to_string(),
                    tabular: true,
                    fields: vec![FieldDomain {
                        field: "pct".to_string(),
                        domain: "pctcomplete".to_string(),
                        descriptor: DomainDescriptor::Range {
                            min: 0.0,
                            max: 100.0,
                        },
                    }],
                },
                DatasetDomains {
                    dataset: "water_fd".to_string(),
                    base_name: "water_fd".to_string(),
                    tabular: false,
                    fields: vec![],
                },
            ],
        };
        let text = domain_report(&report);
        assert!(text.starts_with("# 1 of 2 : hydrants\n    field name : pct\n"));
        assert!(text.contains("                 min : 0\n                 max : 100\n"));
        assert!(text.contains("# 2 of 2 : water_fd\n    !Not Feature Class or Table!\n"));
    }

    #[test]
    fn test_vertex_report() {
        let count = VertexCount {
            records: 1200,
            vertices: 48_513,
        };
        assert_eq!(
            vertex_report(Some(&count)),
            "# Total number of records: 1,200\n# Total number of vertices: 48,513\n"
        );
        assert_eq!(vertex_report(None), "# Not a polygon or line\n");
    }

    #[test]
    fn test_unique_values_text() {
        let report = UniqueValuesReport {
            dataset: "parcels".to_string(),
            records: 3,
            columns: vec![ColumnTally {
                field: "zone".to_string(),
                values: vec![
                    ValueCount {
                        value: Value::Null,
                        count: 1,
                    },
                    ValueCount {
                        value: Value::from("R1"),
                        count: 2,
                    },
                ],
            }],
        };
        assert_eq!(
            unique_values_report(&report),
            "Field: zone\nunique:\n    <Null>: 1\n    R1: 2\n\n"
        );
    }
}
