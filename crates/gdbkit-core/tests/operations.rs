use anyhow::{Result, anyhow};
use gdbkit_core::common::{
    DatasetDescription, Domain, FieldDescriptor, FieldType, MetadataSource, OID_TOKEN, RowId,
    RowIter, RowSource, SchemaEditor, Value, WorkspaceKind,
};
use gdbkit_core::compare::{CompareOptions, check_schema};
use gdbkit_core::domains::{DomainDescriptor, domain_report};
use gdbkit_core::error::{ConversionError, GdbKitError, InputError, MetadataError};
use gdbkit_core::render;
use gdbkit_core::retype::{change_field_type, change_text_field_length};
use gdbkit_core::unique::unique_values;
use gdbkit_core::vertices::count_vertices;
use gdbkit_core::workspace::JsonWorkspace;

const CITY: &str = "tests/e2e_data/city.gdb.json";
const PROD: &str = "tests/e2e_data/prod.sde.json";

fn column(store: &JsonWorkspace, dataset: &str, field: &str) -> Result<Vec<(i64, Value)>> {
    store
        .read_rows(dataset, &[OID_TOKEN, field])?
        .map(|row| {
            let row = row?;
            Ok((row.id.0, row.values[1].clone()))
        })
        .collect()
}

fn field(store: &JsonWorkspace, dataset: &str, name: &str) -> Result<FieldDescriptor> {
    store
        .list_fields(dataset)?
        .into_iter()
        .find(|f| f.is_named(name))
        .ok_or_else(|| anyhow!("no field {name}"))
}

/// Counting vertices of a polygon feature class, including a null shape
#[test]
fn test_vertices_of_polygons() -> Result<()> {
    let city = JsonWorkspace::open(CITY)?;
    let count = count_vertices(&city, "Parcels")?.ok_or_else(|| anyhow!("expected a count"))?;
    assert_eq!(count.records, 3);
    assert_eq!(count.vertices, 9);
    Ok(())
}

/// Counting vertices of lines and multi-part lines
#[test]
fn test_vertices_of_lines() -> Result<()> {
    let city = JsonWorkspace::open(CITY)?;
    let count = count_vertices(&city, "roads")?.ok_or_else(|| anyhow!("expected a count"))?;
    assert_eq!(count.records, 2);
    assert_eq!(count.vertices, 7);
    Ok(())
}

/// Point feature classes and tables have no vertex count
#[test]
fn test_vertices_of_points_not_counted() -> Result<()> {
    let city = JsonWorkspace::open(CITY)?;
    assert!(count_vertices(&city, "Hydrants")?.is_none());
    assert!(count_vertices(&city, "Permits")?.is_none());
    assert_eq!(render::vertex_report(None), "# Not a polygon or line\n");
    Ok(())
}

/// Retyping an integer column to text keeps every value on its row
#[test]
fn test_integer_field_to_text() -> Result<()> {
    let mut city = JsonWorkspace::open(CITY)?;
    let summary = change_field_type(&mut city, "Permits", "PermitNo", FieldType::Text, Some(5))?;

    assert_eq!(summary.rows_updated, 3);
    assert_eq!(summary.from_type, FieldType::Integer);
    assert_eq!(summary.to_type, FieldType::Text);

    let permit_no = field(&city, "Permits", "permitno")?;
    assert_eq!(permit_no.field_type, FieldType::Text);
    assert_eq!(permit_no.length, Some(5));
    assert_eq!(
        column(&city, "Permits", "PermitNo")?,
        vec![
            (10, Value::from("1")),
            (11, Value::from("2")),
            (12, Value::from("3")),
        ]
    );
    // The replacement is appended after the other fields.
    let names: Vec<String> = city
        .list_fields("Permits")?
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(names, ["OBJECTID", "Fee", "Applicant", "PermitNo"]);
    Ok(())
}

/// Widening a text field keeps its values and nulls
#[test]
fn test_text_field_length() -> Result<()> {
    let mut city = JsonWorkspace::open(CITY)?;
    change_text_field_length(&mut city, "Parcels", "Owner", 120)?;

    assert_eq!(field(&city, "Parcels", "Owner")?.length, Some(120));
    assert_eq!(
        column(&city, "Parcels", "Owner")?,
        vec![
            (1, Value::from("Adams")),
            (2, Value::from("Baker")),
            (3, Value::Null),
        ]
    );
    Ok(())
}

/// A value that does not fit the new length leaves the dataset untouched
#[test]
fn test_value_too_long_aborts_before_edit() -> Result<()> {
    let mut city = JsonWorkspace::open(CITY)?;
    let before = city.list_fields("Permits")?;

    let err = change_text_field_length(&mut city, "Permits", "Applicant", 10).unwrap_err();
    match &err {
        GdbKitError::Conversion(ConversionError::AtRow { row, field, source }) => {
            assert_eq!(*row, RowId(10));
            assert_eq!(field, "Applicant");
            assert!(matches!(**source, ConversionError::TooLong { length: 10, .. }));
        },
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.recovery_suggestion().is_some());

    assert_eq!(city.list_fields("Permits")?, before);
    assert_eq!(
        column(&city, "Permits", "Applicant")?[0].1,
        Value::from("Springfield Water")
    );
    Ok(())
}

/// Retyping a missing field reports it by name
#[test]
fn test_missing_field() -> Result<()> {
    let mut city = JsonWorkspace::open(CITY)?;
    let err =
        change_field_type(&mut city, "Permits", "Nope", FieldType::Integer, None).unwrap_err();
    assert!(matches!(
        err,
        GdbKitError::Metadata(MetadataError::FieldNotFound { .. })
    ));
    Ok(())
}

/// Feature datasets are rejected as input
#[test]
fn test_feature_dataset_is_not_a_table() -> Result<()> {
    let mut city = JsonWorkspace::open(CITY)?;
    let err = change_field_type(&mut city, "Utilities", "Name", FieldType::Text, Some(5))
        .unwrap_err();
    assert!(err.is_input_shape());
    assert!(matches!(
        err,
        GdbKitError::Input(InputError::NotTable { .. })
    ));
    assert_eq!(
        err.user_message(),
        "****** Input is not Feature Class or Table ******"
    );
    Ok(())
}

/// Delegates to a workspace but fails the `n`th row update, and optionally
/// returns rows holding only their first column.
struct FlakyStore {
    inner: JsonWorkspace,
    fail_at: usize,
    updates: usize,
    short_rows: bool,
}

impl FlakyStore {
    fn new(inner: JsonWorkspace) -> Self {
        Self {
            inner,
            fail_at: 0,
            updates: 0,
            short_rows: false,
        }
    }
}

impl MetadataSource for FlakyStore {
    fn describe(&self, dataset: &str) -> Result<DatasetDescription> {
        self.inner.describe(dataset)
    }

    fn list_fields(&self, dataset: &str) -> Result<Vec<FieldDescriptor>> {
        self.inner.list_fields(dataset)
    }

    fn workspace_kind(&self, workspace: &str) -> Result<WorkspaceKind> {
        self.inner.workspace_kind(workspace)
    }

    fn list_domains(&self, workspace: &str) -> Result<Vec<Domain>> {
        self.inner.list_domains(workspace)
    }
}

impl RowSource for FlakyStore {
    fn read_rows<'a>(&'a self, dataset: &str, columns: &[&str]) -> Result<RowIter<'a>> {
        let rows = self.inner.read_rows(dataset, columns)?;
        if !self.short_rows {
            return Ok(rows);
        }
        Ok(Box::new(rows.map(|row| {
            row.map(|mut row| {
                row.values.truncate(1);
                row
            })
        })))
    }
}

impl SchemaEditor for FlakyStore {
    fn add_field(&mut self, dataset: &str, field: &FieldDescriptor) -> Result<()> {
        self.inner.add_field(dataset, field)
    }

    fn delete_field(&mut self, dataset: &str, name: &str) -> Result<()> {
        self.inner.delete_field(dataset, name)
    }

    fn update_row(&mut self, dataset: &str, id: RowId, field: &str, value: Value) -> Result<()> {
        self.updates += 1;
        if self.updates == self.fail_at {
            return Err(anyhow!("connection lost"));
        }
        self.inner.update_row(dataset, id, field, value)
    }
}

/// A store failure after the drop leaves the new field partially populated
#[test]
fn test_store_failure_mid_update() -> Result<()> {
    let mut store = FlakyStore {
        fail_at: 2,
        ..FlakyStore::new(JsonWorkspace::open(CITY)?)
    };
    let err = change_field_type(&mut store, "Permits", "PermitNo", FieldType::Text, Some(5))
        .unwrap_err();
    assert!(matches!(err, GdbKitError::Other(_)));

    assert_eq!(
        field(&store.inner, "Permits", "PermitNo")?.field_type,
        FieldType::Text
    );
    assert_eq!(
        column(&store.inner, "Permits", "PermitNo")?,
        vec![(10, Value::from("1")), (11, Value::Null), (12, Value::Null)]
    );
    Ok(())
}

/// A store that drops the requested field from its rows fails the retype
/// before anything is edited
#[test]
fn test_short_rows_abort_before_edit() -> Result<()> {
    let mut store = FlakyStore {
        short_rows: true,
        ..FlakyStore::new(JsonWorkspace::open(CITY)?)
    };
    let err = change_field_type(&mut store, "Permits", "PermitNo", FieldType::Text, Some(5))
        .unwrap_err();
    assert!(matches!(err, GdbKitError::Other(_)));
    assert!(err.to_string().contains("without a PermitNo value"));

    assert_eq!(store.updates, 0);
    assert_eq!(
        field(&store.inner, "Permits", "PermitNo")?.field_type,
        FieldType::Integer
    );
    assert_eq!(
        column(&store.inner, "Permits", "PermitNo")?[0],
        (10, Value::Integer(1))
    );
    Ok(())
}

/// Tabulating distinct values, nulls first
#[test]
fn test_unique_values() -> Result<()> {
    let city = JsonWorkspace::open(CITY)?;
    let report = unique_values(&city, "Parcels", &["Zone", "Owner", "zone"])?;

    assert_eq!(report.records, 3);
    assert_eq!(report.columns.len(), 2);

    let zone = &report.columns[0];
    assert_eq!(zone.count_of(&Value::from("R1")), 2);
    assert_eq!(zone.count_of(&Value::from("C2")), 1);

    let owner = &report.columns[1];
    assert_eq!(owner.values[0].value, Value::Null);
    assert_eq!(owner.values[0].count, 1);

    let text = render::unique_values_report(&report);
    assert!(text.starts_with("Field: Zone\nunique:\n    C2: 1\n    R1: 2\n\n"));
    assert!(text.contains("Field: Owner\nunique:\n    <Null>: 1\n    Adams: 1\n"));
    Ok(())
}

/// Numeric values tally by value
#[test]
fn test_unique_numeric_values() -> Result<()> {
    let city = JsonWorkspace::open(CITY)?;
    let report = unique_values(&city, "Permits", &["Fee"])?;
    let fee = &report.columns[0];
    assert_eq!(fee.values.len(), 2);
    assert_eq!(fee.count_of(&Value::Double(25.0)), 2);
    assert_eq!(fee.count_of(&Value::Double(40.5)), 1);
    Ok(())
}

/// Comparing a local feature class with its enterprise counterpart
#[test]
fn test_schema_check_across_workspaces() -> Result<()> {
    let city = JsonWorkspace::open(CITY)?;
    let prod = JsonWorkspace::open(PROD)?;
    let diff = check_schema(
        &city,
        "Parcels",
        &prod,
        "DCGIS.Parcels",
        &CompareOptions::default(),
    )?;

    // The owner prefix is stripped from enterprise names.
    assert!(diff.names.same);
    assert_eq!(diff.names.target, "Parcels");

    assert_eq!(
        diff.missing_from_input.iter().collect::<Vec<_>>(),
        ["parcelid"]
    );
    assert!(diff.missing_from_target.is_empty());

    let types: Vec<&str> = diff.type_mismatches.iter().map(|m| m.field.as_str()).collect();
    assert_eq!(types, ["zone"]);
    let lengths: Vec<&str> = diff
        .length_mismatches
        .iter()
        .map(|m| m.field.as_str())
        .collect();
    assert_eq!(lengths, ["owner", "zone"]);

    let text = render::schema_report(&diff);
    assert!(text.contains("Input and Target have same name"));
    assert!(text.contains("* Field not in input layer:\n  parcelid\n"));
    assert!(text.contains("  Field:owner\n  Input:50, Target:100\n"));
    Ok(())
}

/// Skipping system types drops system-maintained fields from the missing sets
#[test]
fn test_schema_check_skip_system_types() -> Result<()> {
    let city = JsonWorkspace::open(CITY)?;
    let prod = JsonWorkspace::open(PROD)?;

    let plain = check_schema(
        &city,
        "Permits",
        &prod,
        "DCGIS.Zoning",
        &CompareOptions::default(),
    )?;
    assert!(!plain.names.same);
    assert_eq!(
        plain.missing_from_input.iter().collect::<Vec<_>>(),
        ["globalid", "zone"]
    );
    assert_eq!(
        plain.missing_from_target.iter().collect::<Vec<_>>(),
        ["applicant", "fee", "permitno"]
    );

    let skipped = check_schema(
        &city,
        "Permits",
        &prod,
        "DCGIS.Zoning",
        &CompareOptions::default().skip_system_types(),
    )?;
    assert_eq!(
        skipped.missing_from_input.iter().collect::<Vec<_>>(),
        ["zone"]
    );
    assert_eq!(skipped.missing_from_target, plain.missing_from_target);
    Ok(())
}

/// Comparing against a feature dataset is an input-shape error
#[test]
fn test_schema_check_rejects_feature_dataset() -> Result<()> {
    let city = JsonWorkspace::open(CITY)?;
    let err = check_schema(
        &city,
        "Parcels",
        &city,
        "Utilities",
        &CompareOptions::default(),
    )
    .unwrap_err();
    assert!(err.is_input_shape());
    Ok(())
}

/// Listing domain-bound fields for several datasets
#[test]
fn test_domain_report() -> Result<()> {
    let city = JsonWorkspace::open(CITY)?;
    let report = domain_report(&city, CITY, &["'Hydrants'", "Utilities", "Parcels"])?;

    assert_eq!(report.datasets.len(), 3);

    let hydrants = &report.datasets[0];
    assert_eq!(hydrants.dataset, "Hydrants");
    let bound: Vec<&str> = hydrants.fields.iter().map(|f| f.field.as_str()).collect();
    assert_eq!(bound, ["pressure", "material"]);
    assert!(matches!(
        hydrants.fields[0].descriptor,
        DomainDescriptor::Range { min, max } if min == 0.0 && max == 100.0
    ));

    assert!(!report.datasets[1].tabular);

    let text = render::domain_report(&report);
    assert!(text.contains("# 1 of 3 : Hydrants\n"));
    assert!(text.contains("                 CI : Cast Iron\n"));
    assert!(text.contains("# 2 of 3 : Utilities\n    !Not Feature Class or Table!\n"));
    assert!(text.contains("    field name : status\n    domain name: status\n"));
    Ok(())
}
