//! Store capabilities consumed by `gdbkit` operations.
//!
//! A store is anything that can describe datasets, enumerate their fields and
//! the domains of their workspace, stream rows, and edit columns. The three
//! capabilities are separate traits so that read-only operations can be
//! written against the smallest one they need.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::Domain;
use crate::field::FieldDescriptor;
use crate::value::{Row, RowId, Value};

/// Column token that reads the row identifier.
pub const OID_TOKEN: &str = "OID@";

/// Column token that reads the dataset's shape column.
pub const SHAPE_TOKEN: &str = "SHAPE@";

/// Kind of dataset behind a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    FeatureClass,
    Table,
    FeatureDataset,
    RasterDataset,
}

impl DataType {
    /// Returns `true` for datasets made of rows and fields.
    #[must_use]
    pub fn is_tabular(&self) -> bool {
        matches!(self, DataType::FeatureClass | DataType::Table)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::FeatureClass => "FeatureClass",
            DataType::Table => "Table",
            DataType::FeatureDataset => "FeatureDataset",
            DataType::RasterDataset => "RasterDataset",
        }
    }
}

/// Geometry type of a feature class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeType {
    Point,
    Multipoint,
    Polyline,
    Polygon,
    MultiPatch,
}

/// Kind of workspace holding datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WorkspaceKind {
    /// Folder of standalone files.
    FileSystem,
    /// File or personal geodatabase.
    #[default]
    LocalDatabase,
    /// Enterprise geodatabase reached through a connection file.
    RemoteDatabase,
}

impl WorkspaceKind {
    /// Returns `true` for workspaces that can hold attribute domains.
    #[must_use]
    pub fn is_geodatabase(&self) -> bool {
        matches!(
            self,
            WorkspaceKind::LocalDatabase | WorkspaceKind::RemoteDatabase
        )
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkspaceKind::FileSystem => "FileSystem",
            WorkspaceKind::LocalDatabase => "LocalDatabase",
            WorkspaceKind::RemoteDatabase => "RemoteDatabase",
        }
    }
}

/// Description of a dataset, as returned by [`MetadataSource::describe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetDescription {
    /// Dataset name without its workspace path. May be qualified
    /// (`OWNER.Name`) in enterprise geodatabases.
    pub base_name: String,
    /// Full data source path, including the workspace.
    pub catalog_path: String,
    pub data_type: DataType,
    /// Geometry type, for feature classes.
    pub shape_type: Option<ShapeType>,
}

/// Read access to dataset and workspace metadata.
pub trait MetadataSource {
    /// Describes the dataset at `dataset`.
    fn describe(&self, dataset: &str) -> Result<DatasetDescription>;

    /// Lists the fields of `dataset` in storage order.
    fn list_fields(&self, dataset: &str) -> Result<Vec<FieldDescriptor>>;

    /// Reports the kind of `workspace`.
    fn workspace_kind(&self, workspace: &str) -> Result<WorkspaceKind>;

    /// Lists every attribute domain defined in `workspace`.
    fn list_domains(&self, workspace: &str) -> Result<Vec<Domain>>;
}

/// Lazily evaluated sequence of rows borrowed from a store.
pub type RowIter<'a> = Box<dyn Iterator<Item = Result<Row>> + 'a>;

/// Row read access.
pub trait RowSource {
    /// Streams the rows of `dataset`, yielding the values of `columns` in
    /// request order. Columns are field names or the [`OID_TOKEN`] and
    /// [`SHAPE_TOKEN`] tokens.
    ///
    /// The returned iterator borrows the store, so it is released before any
    /// edit can start.
    fn read_rows<'a>(&'a self, dataset: &str, columns: &[&str]) -> Result<RowIter<'a>>;

    /// Counts the rows of `dataset`.
    fn count_rows(&self, dataset: &str) -> Result<usize> {
        self.read_rows(dataset, &[])?
            .try_fold(0, |count, row| row.map(|_| count + 1))
    }
}

/// Column and row edits.
pub trait SchemaEditor {
    /// Appends `field` to `dataset`. Existing rows hold null in the new column.
    fn add_field(&mut self, dataset: &str, field: &FieldDescriptor) -> Result<()>;

    /// Drops the field `name` and its values from `dataset`.
    fn delete_field(&mut self, dataset: &str, name: &str) -> Result<()>;

    /// Writes `value` to `field` of the row identified by `id`.
    fn update_row(&mut self, dataset: &str, id: RowId, field: &str, value: Value) -> Result<()>;
}

/// A store providing every capability.
pub trait DatasetStore: MetadataSource + RowSource + SchemaEditor {}

impl<T> DatasetStore for T where T: MetadataSource + RowSource + SchemaEditor + ?Sized {}
