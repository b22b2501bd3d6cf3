//! A geodatabase workspace stored as a single JSON document.
//!
//! The document lists the workspace kind, its attribute domains and its
//! datasets with their fields and rows:
//!
//! ```json
//! {
//!   "kind": "LocalDatabase",
//!   "domains": [
//!     { "domainType": "CodedValue", "name": "Status", "codedValues": [[1, "Open"], [2, "Closed"]] },
//!     { "domainType": "Range", "name": "PctComplete", "range": [0, 100] }
//!   ],
//!   "datasets": {
//!     "hydrants": {
//!       "dataType": "FeatureClass",
//!       "shapeType": "Point",
//!       "fields": [
//!         { "name": "OBJECTID", "type": "OID" },
//!         { "name": "SHAPE", "type": "Geometry" },
//!         { "name": "Status", "type": "Integer", "domain": "Status" }
//!       ],
//!       "rows": [
//!         { "OBJECTID": 1, "SHAPE": { "type": "Point", "coordinates": [0, 0] }, "Status": 1 }
//!       ]
//!     }
//!   }
//! }
//! ```
//!
//! Dataset and field names are matched ignoring case. Rows take their id from
//! the dataset's `OID` field, or from their position when there is none.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use gdbkit_core_common::{
    DataType, DatasetDescription, Domain, FieldDescriptor, FieldType, MetadataSource, OID_TOKEN,
    Row, RowId, RowIter, RowSource, SHAPE_TOKEN, SchemaEditor, ShapeType, Value, WorkspaceKind,
};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct WorkspaceDocument {
    #[serde(default)]
    kind: WorkspaceKind,
    #[serde(default)]
    domains: Vec<DomainRecord>,
    #[serde(default)]
    datasets: BTreeMap<String, DatasetRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domainType")]
enum DomainRecord {
    CodedValue {
        name: String,
        #[serde(rename = "codedValues")]
        coded_values: Vec<(Value, String)>,
    },
    Range {
        name: String,
        range: (f64, f64),
    },
}

impl From<&DomainRecord> for Domain {
    fn from(record: &DomainRecord) -> Self {
        match record {
            DomainRecord::CodedValue { name, coded_values } => {
                Domain::coded(name.clone(), coded_values.iter().cloned())
            },
            DomainRecord::Range { name, range } => Domain::range(name.clone(), range.0, range.1),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatasetRecord {
    data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shape_type: Option<ShapeType>,
    #[serde(default)]
    fields: Vec<FieldDescriptor>,
    #[serde(default)]
    rows: Vec<BTreeMap<String, Value>>,
}

impl DatasetRecord {
    fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.is_named(name))
    }

    fn field_of_type(&self, field_type: FieldType) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.field_type == field_type)
    }

    fn row_id(&self, index: usize, row: &BTreeMap<String, Value>) -> Result<RowId> {
        let Some(oid) = self.field_of_type(FieldType::Oid) else {
            return Ok(RowId(i64::try_from(index)? + 1));
        };
        match cell(row, &oid.name) {
            Value::Integer(id) => Ok(RowId(*id)),
            other => Err(anyhow!(
                "Row {} has a non-integer {} value: {other}",
                index + 1,
                oid.name
            )),
        }
    }
}

/// Looks up a cell, preferring an exact key and falling back to a
/// case-insensitive match. Absent cells are null.
fn cell<'a>(row: &'a BTreeMap<String, Value>, name: &str) -> &'a Value {
    static NULL: Value = Value::Null;
    row.get(name)
        .or_else(|| {
            row.iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value)
        })
        .unwrap_or(&NULL)
}

/// A workspace backed by a JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonWorkspace {
    path: PathBuf,
    document: WorkspaceDocument,
}

impl JsonWorkspace {
    /// Reads the workspace document at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid workspace
    /// document.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read workspace '{}': {e}", path.display()))?;
        Self::from_json(path, &text)
    }

    /// Parses a workspace document, recording `path` as its location.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not a valid workspace document.
    pub fn from_json(path: impl Into<PathBuf>, json: &str) -> Result<Self> {
        let path = path.into();
        let document: WorkspaceDocument = serde_json::from_str(json)
            .map_err(|e| anyhow!("Invalid workspace document '{}': {e}", path.display()))?;
        debug!(
            "Loaded workspace {} with {} dataset(s) and {} domain(s)",
            path.display(),
            document.datasets.len(),
            document.domains.len()
        );
        Ok(Self { path, document })
    }

    /// Location of the workspace document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the workspace document back to its location.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be serialized or written.
    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.document)?;
        fs::write(&self.path, json)
            .map_err(|e| anyhow!("Failed to write workspace '{}': {e}", self.path.display()))?;
        debug!("Saved workspace {}", self.path.display());
        Ok(())
    }

    /// Names of the datasets in the workspace.
    pub fn dataset_names(&self) -> impl Iterator<Item = &str> {
        self.document.datasets.keys().map(String::as_str)
    }

    fn resolve(&self, dataset: &str) -> Result<(&str, &DatasetRecord)> {
        self.document
            .datasets
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(dataset))
            .map(|(name, record)| (name.as_str(), record))
            .ok_or_else(|| {
                anyhow!(
                    "Dataset '{dataset}' not found in workspace '{}'",
                    self.path.display()
                )
            })
    }

    fn resolve_mut(&mut self, dataset: &str) -> Result<&mut DatasetRecord> {
        let path = &self.path;
        self.document
            .datasets
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(dataset))
            .map(|(_, record)| record)
            .ok_or_else(|| {
                anyhow!(
                    "Dataset '{dataset}' not found in workspace '{}'",
                    path.display()
                )
            })
    }

    fn check_workspace(&self, workspace: &str) -> Result<()> {
        if Path::new(workspace) == self.path.as_path() {
            Ok(())
        } else {
            Err(anyhow!(
                "Workspace '{workspace}' is not '{}'",
                self.path.display()
            ))
        }
    }
}

impl MetadataSource for JsonWorkspace {
    fn describe(&self, dataset: &str) -> Result<DatasetDescription> {
        let (name, record) = self.resolve(dataset)?;
        Ok(DatasetDescription {
            base_name: name.to_string(),
            catalog_path: format!("{}/{name}", self.path.display()),
            data_type: record.data_type,
            shape_type: record.shape_type,
        })
    }

    fn list_fields(&self, dataset: &str) -> Result<Vec<FieldDescriptor>> {
        Ok(self.resolve(dataset)?.1.fields.clone())
    }

    fn workspace_kind(&self, workspace: &str) -> Result<WorkspaceKind> {
        self.check_workspace(workspace)?;
        Ok(self.document.kind)
    }

    fn list_domains(&self, workspace: &str) -> Result<Vec<Domain>> {
        self.check_workspace(workspace)?;
        Ok(self.document.domains.iter().map(Domain::from).collect())
    }
}

enum Column {
    Id,
    Field(String),
}

impl RowSource for JsonWorkspace {
    fn read_rows<'a>(&'a self, dataset: &str, columns: &[&str]) -> Result<RowIter<'a>> {
        let (name, record) = self.resolve(dataset)?;
        let columns = columns
            .iter()
            .map(|column| -> Result<Column> {
                if column.eq_ignore_ascii_case(OID_TOKEN) {
                    return Ok(Column::Id);
                }
                let field = if column.eq_ignore_ascii_case(SHAPE_TOKEN) {
                    record
                        .field_of_type(FieldType::Geometry)
                        .ok_or_else(|| anyhow!("Dataset '{name}' has no shape field"))?
                } else {
                    record
                        .field(column)
                        .ok_or_else(|| anyhow!("Field '{column}' not found in '{name}'"))?
                };
                Ok(Column::Field(field.name.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Box::new(record.rows.iter().enumerate().map(
            move |(index, row)| {
                let id = record.row_id(index, row)?;
                let values = columns
                    .iter()
                    .map(|column| match column {
                        Column::Id => Value::Integer(id.0),
                        Column::Field(field) => cell(row, field).clone(),
                    })
                    .collect();
                Ok(Row { id, values })
            },
        )))
    }

    fn count_rows(&self, dataset: &str) -> Result<usize> {
        Ok(self.resolve(dataset)?.1.rows.len())
    }
}

impl SchemaEditor for JsonWorkspace {
    fn add_field(&mut self, dataset: &str, field: &FieldDescriptor) -> Result<()> {
        let record = self.resolve_mut(dataset)?;
        if record.field(&field.name).is_some() {
            return Err(anyhow!("Field '{}' already exists in '{dataset}'", field.name));
        }
        record.fields.push(field.clone());
        Ok(())
    }

    fn delete_field(&mut self, dataset: &str, name: &str) -> Result<()> {
        let record = self.resolve_mut(dataset)?;
        let before = record.fields.len();
        record.fields.retain(|f| !f.is_named(name));
        if record.fields.len() == before {
            return Err(anyhow!("Field '{name}' not found in '{dataset}'"));
        }
        for row in &mut record.rows {
            row.retain(|key, _| !key.eq_ignore_ascii_case(name));
        }
        Ok(())
    }

    fn update_row(&mut self, dataset: &str, id: RowId, field: &str, value: Value) -> Result<()> {
        let record = self.resolve_mut(dataset)?;
        let name = record
            .field(field)
            .map(|f| f.name.clone())
            .ok_or_else(|| anyhow!("Field '{field}' not found in '{dataset}'"))?;

        let mut target = None;
        for (index, row) in record.rows.iter().enumerate() {
            if record.row_id(index, row)? == id {
                target = Some(index);
                break;
            }
        }
        let index = target.ok_or_else(|| anyhow!("Row {id} not found in '{dataset}'"))?;

        let row = &mut record.rows[index];
        row.retain(|key, _| !key.eq_ignore_ascii_case(&name));
        row.insert(name, value);
        Ok(())
    }
}
