//! Custom error types for `gdbkit` operations.
//!
//! Store implementations report failures through `anyhow::Error`; everything
//! the operations themselves detect is a domain-specific variant here so the
//! CLI can tell a user-facing input problem from a fatal one.

use gdbkit_core_common::{DataType, FieldType, RowId, WorkspaceKind};
use thiserror::Error;

/// Main error type for `gdbkit` operations.
///
/// This is the root error type that encompasses all domain-specific errors.
/// It uses `#[error(transparent)]` to delegate display formatting to the
/// underlying error variants.
#[derive(Debug, Error)]
pub enum GdbKitError {
    /// The dataset or workspace is not of a kind the operation accepts
    #[error(transparent)]
    Input(#[from] InputError),

    /// Metadata references something that does not exist
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// A value could not be carried over to a new field definition
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Failures reported by the underlying store
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Input-shape errors.
///
/// The operation was pointed at something it cannot work on. These end the
/// run with a message rather than a failure.
#[derive(Debug, Error)]
pub enum InputError {
    /// The dataset is not a feature class or table
    #[error("'{dataset}' is a {} and not a Feature Class or Table", data_type.as_str())]
    NotTable {
        /// The dataset path
        dataset: String,
        /// What the dataset actually is
        data_type: DataType,
    },

    /// The workspace cannot hold attribute domains
    #[error("Workspace '{workspace}' is a {} and not a geodatabase", kind.as_str())]
    NotGeodatabase {
        /// The workspace path
        workspace: String,
        /// What the workspace actually is
        kind: WorkspaceKind,
    },
}

/// Metadata lookup errors.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// A field is bound to a domain that its workspace does not define
    #[error("Field '{field}' references unknown domain '{domain}'")]
    UnknownDomain {
        /// The field name
        field: String,
        /// The missing domain name
        domain: String,
    },

    /// A field named by the caller does not exist
    #[error("Field '{field}' not found in '{dataset}'")]
    FieldNotFound {
        /// The dataset path
        dataset: String,
        /// The requested field
        field: String,
    },
}

/// Value conversion errors raised while retyping a field.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The value has no representation in the target type
    #[error("cannot convert {kind} value '{value}' to {target}")]
    Incompatible {
        /// Rendered source value
        value: String,
        /// Kind of the source value
        kind: &'static str,
        /// Target field type
        target: FieldType,
    },

    /// The value does not fit the target type's range
    #[error("value '{value}' is out of range for {target}")]
    OutOfRange {
        /// Rendered source value
        value: String,
        /// Target field type
        target: FieldType,
    },

    /// Text longer than the target field length
    #[error("value '{value}' is longer than {length} characters")]
    TooLong {
        /// Rendered source value
        value: String,
        /// Target field length
        length: u32,
    },

    /// Conversion failure located at a specific row
    #[error("row {row}, field '{field}': {source}")]
    AtRow {
        /// Row identifier
        row: RowId,
        /// Field being converted
        field: String,
        /// The underlying conversion failure
        #[source]
        source: Box<ConversionError>,
    },
}

/// Configuration errors.
///
/// These errors occur when options or configuration are invalid.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid option value
    #[error("Invalid {option} option: {message}")]
    InvalidOption {
        /// The option name
        option: String,
        /// Why it's invalid
        message: String,
    },

    /// Required option is missing
    #[error("Missing required option: {option}")]
    MissingRequired {
        /// The missing option name
        option: String,
    },
}

/// Type alias for Results using `GdbKitError`.
pub type Result<T> = std::result::Result<T, GdbKitError>;

impl GdbKitError {
    /// Get a user-friendly error message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Input(e) => e.user_message(),
            Self::Metadata(e) => format!("Metadata error: {e}"),
            Self::Conversion(e) => format!("Conversion error: {e}"),
            Self::Config(e) => format!("Configuration error: {e}"),
            Self::Other(e) => format!("Error: {e:#}"),
        }
    }

    /// Get recovery suggestions if available.
    #[must_use]
    pub fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::Metadata(MetadataError::UnknownDomain { .. }) => {
                Some("Recreate the domain or remove it from the field.".to_string())
            },
            Self::Metadata(MetadataError::FieldNotFound { .. }) => {
                Some("Field names are matched ignoring case; check the spelling.".to_string())
            },
            Self::Conversion(ConversionError::AtRow { source, .. })
                if matches!(**source, ConversionError::TooLong { .. }) =>
            {
                Some("Choose a field length at least as long as the longest value.".to_string())
            },
            Self::Conversion(_) => {
                Some("Choose a field type that can hold the existing values.".to_string())
            },
            _ => None,
        }
    }

    /// Returns `true` for input-shape errors, which end a run with a message
    /// instead of a failure.
    #[must_use]
    pub fn is_input_shape(&self) -> bool {
        matches!(self, Self::Input(_))
    }
}

impl InputError {
    fn user_message(&self) -> String {
        match self {
            Self::NotTable { .. } => "****** Input is not Feature Class or Table ******".to_string(),
            Self::NotGeodatabase { .. } => {
                "*---- Select file geodb or enterprise geodb ----*".to_string()
            },
        }
    }
}

impl ConversionError {
    /// Attaches the row and field being converted.
    #[must_use]
    pub fn at_row(self, row: RowId, field: &str) -> Self {
        Self::AtRow {
            row,
            field: field.to_string(),
            source: Box::new(self),
        }
    }
}
