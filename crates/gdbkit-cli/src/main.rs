//! Command-line interface for `gdbkit`, a toolkit for geodatabase schema and field maintenance.
//!
//! This binary provides a user-friendly CLI to interact with the [`gdbkit_core`] library,
//! enabling users to compare schemas, list attribute domains, count vertices, tabulate
//! unique values, and change field types on datasets of a JSON workspace.
//!
//! # Architecture
//!
//! The CLI is built using [`clap`] for argument parsing and [`tracing`] for structured logging.
//! It acts as a thin façade that parses arguments, configures logging, and delegates
//! to command handlers, which open the workspace, run one operation and print its report.
//!
//! # Available Commands
//!
//! - `datasets` - List the datasets of a workspace
//! - `schema-check` - Compare the schema of two datasets
//! - `domains` - List domain-bound fields and their legal values
//! - `vertex-count` - Count the vertices of a line or polygon feature class
//! - `change-field-type` - Replace a field with one of another type, keeping its values
//! - `change-field-length` - Replace a text field with one of another length
//! - `unique-values` - Tabulate the distinct values of fields

mod display;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tabled::Table;
use tracing::{Level, info, warn};
use tracing_log::LogTracer;
use tracing_subscriber::FmtSubscriber;

use gdbkit_core::FieldType;
use gdbkit_core::common::{MetadataSource, ParseFieldTypeError, RowSource};
use gdbkit_core::compare::{CompareOptions, check_schema};
use gdbkit_core::domains::domain_report;
use gdbkit_core::error::{ConfigError, GdbKitError};
use gdbkit_core::render;
use gdbkit_core::retype::{RetypeSummary, change_field_type, change_text_field_length};
use gdbkit_core::unique::unique_values;
use gdbkit_core::vertices::count_vertices;
use gdbkit_core::workspace::JsonWorkspace;

use display::DatasetRow;

#[derive(Parser)]
#[command(
    name = "gdbkit",
    version,
    about = "Schema and field maintenance for geodatabase datasets",
    long_about = "gdbkit compares dataset schemas, reports attribute domains, counts vertices,\n\
                  tabulates unique values and changes field types without losing data."
)]
/// Command-line arguments and options for the `gdbkit` CLI.
///
/// This struct defines the top-level CLI interface, including global flags for
/// logging verbosity and output format, and the subcommand to execute.
struct Cli {
    /// Enable verbose (INFO level) logging output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug (DEBUG level) logging output with detailed diagnostics.
    #[arg(short, long, global = true)]
    debug: bool,

    /// Output format for reports.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// How reports are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Line-oriented text report.
    #[default]
    Text,
    /// Tables.
    Table,
    /// Pretty-printed JSON.
    Json,
}

/// Available subcommands for the `gdbkit` CLI.
///
/// Every command works on a JSON workspace document; commands that edit a
/// dataset write the document back once the edit has succeeded.
#[derive(Subcommand)]
enum Commands {
    /// Lists the datasets of a workspace.
    Datasets {
        /// Path to the workspace document.
        #[arg(short, long, value_name = "WORKSPACE")]
        workspace: String,
    },

    /// Compares the schema of an input dataset against a target dataset.
    ///
    /// Reports whether the dataset names match, fields missing from either
    /// side, and type or length mismatches among the shared fields.
    SchemaCheck {
        /// Path to the workspace holding the input dataset.
        #[arg(short, long, value_name = "WORKSPACE")]
        workspace: String,

        /// Name of the input dataset.
        #[arg(short, long, value_name = "DATASET")]
        input: String,

        /// Workspace holding the target dataset, if different.
        #[arg(long, value_name = "WORKSPACE")]
        target_workspace: Option<String>,

        /// Name of the target dataset.
        #[arg(short, long, value_name = "DATASET")]
        target: String,

        /// Leave system-maintained fields (geometry, ids, dates) out of the missing-field lists.
        #[arg(long)]
        skip_system_types: bool,

        /// Additional field name to leave out of the missing-field lists.
        #[arg(long = "skip-name", value_name = "FIELD")]
        skip_names: Vec<String>,
    },

    /// Lists the domain-bound fields of datasets and their legal values.
    Domains {
        /// Path to the workspace document.
        #[arg(short, long, value_name = "WORKSPACE")]
        workspace: String,

        /// Datasets to report, separated by `;`. Defaults to every dataset.
        #[arg(long, value_name = "DATASETS", value_delimiter = ';')]
        datasets: Vec<String>,
    },

    /// Counts the records and vertices of a line or polygon feature class.
    VertexCount {
        /// Path to the workspace document.
        #[arg(short, long, value_name = "WORKSPACE")]
        workspace: String,

        /// Name of the feature class.
        #[arg(value_name = "DATASET")]
        dataset: String,
    },

    /// Changes the type of a field, keeping its values.
    ChangeFieldType {
        /// Path to the workspace document.
        #[arg(short, long, value_name = "WORKSPACE")]
        workspace: String,

        /// Name of the dataset.
        #[arg(long, value_name = "DATASET")]
        dataset: String,

        /// Name of the field to change.
        #[arg(short, long, value_name = "FIELD")]
        field: String,

        /// New field type (e.g., "Text", "Integer", "Double").
        #[arg(long, value_name = "TYPE")]
        field_type: String,

        /// New field length. Required for text fields.
        #[arg(short, long, value_name = "LENGTH")]
        length: Option<u32>,
    },

    /// Changes the length of a text field, keeping its values.
    ChangeFieldLength {
        /// Path to the workspace document.
        #[arg(short, long, value_name = "WORKSPACE")]
        workspace: String,

        /// Name of the dataset.
        #[arg(long, value_name = "DATASET")]
        dataset: String,

        /// Name of the field to change.
        #[arg(short, long, value_name = "FIELD")]
        field: String,

        /// New field length.
        #[arg(short, long, value_name = "LENGTH")]
        length: u32,
    },

    /// Tabulates the distinct values of fields and how often each occurs.
    UniqueValues {
        /// Path to the workspace document.
        #[arg(short, long, value_name = "WORKSPACE")]
        workspace: String,

        /// Name of the dataset.
        #[arg(long, value_name = "DATASET")]
        dataset: String,

        /// Fields to tabulate, separated by `;`.
        #[arg(short, long, value_name = "FIELDS", value_delimiter = ';', required = true)]
        fields: Vec<String>,
    },
}

/// Entry point for the `gdbkit` command-line interface.
///
/// This function parses command-line arguments, configures the logging system based on
/// verbosity flags, and dispatches to the appropriate command handler.
///
/// # Errors
///
/// Returns an error if command execution fails or if the logging system cannot be initialized.
fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity flags
    let log_level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    // Bridge logs from the `log` crate to the `tracing` ecosystem.
    LogTracer::init()?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let format = cli.format;
    match cli.command {
        Commands::Datasets { workspace } => {
            handle_datasets(&workspace, format)?;
        },
        Commands::SchemaCheck {
            workspace,
            input,
            target_workspace,
            target,
            skip_system_types,
            skip_names,
        } => {
            info!("Checking {input} against {target}");
            let mut options = CompareOptions::default();
            if skip_system_types {
                options = options.skip_system_types();
            }
            for name in &skip_names {
                options = options.skip_name(name);
            }
            handle_schema_check(
                &workspace,
                &input,
                target_workspace.as_deref(),
                &target,
                &options,
                format,
            )?;
        },
        Commands::Domains {
            workspace,
            datasets,
        } => {
            info!("Listing domains in {workspace}");
            handle_domains(&workspace, &datasets, format)?;
        },
        Commands::VertexCount { workspace, dataset } => {
            info!("Counting vertices of {dataset}");
            handle_vertex_count(&workspace, &dataset, format)?;
        },
        Commands::ChangeFieldType {
            workspace,
            dataset,
            field,
            field_type,
            length,
        } => {
            info!("Changing type of {dataset}.{field} to {field_type}");
            handle_change_field_type(&workspace, &dataset, &field, &field_type, length, format)?;
        },
        Commands::ChangeFieldLength {
            workspace,
            dataset,
            field,
            length,
        } => {
            info!("Changing length of {dataset}.{field} to {length}");
            handle_change_field_length(&workspace, &dataset, &field, length, format)?;
        },
        Commands::UniqueValues {
            workspace,
            dataset,
            fields,
        } => {
            info!("Tabulating unique values of {dataset}");
            handle_unique_values(&workspace, &dataset, &fields, format)?;
        },
    }

    Ok(())
}

/// Unwraps the result of an operation.
///
/// Input-shape errors are reported with their user message and end the
/// command successfully (`Ok(None)`). Any other error is returned with its
/// user message, after printing a recovery suggestion when one exists.
fn settle<T>(result: gdbkit_core::error::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_input_shape() => {
            warn!("{e}");
            println!("{}", e.user_message());
            Ok(None)
        },
        Err(e) => {
            if let Some(suggestion) = e.recovery_suggestion() {
                eprintln!("Suggestion: {suggestion}");
            }
            Err(anyhow!(e.user_message()))
        },
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Parses the `--field-type` option and checks it against `--length`.
fn parse_field_type(
    name: &str,
    length: Option<u32>,
) -> gdbkit_core::error::Result<(FieldType, Option<u32>)> {
    let field_type = name
        .parse::<FieldType>()
        .map_err(|e: ParseFieldTypeError| ConfigError::InvalidOption {
            option: "field-type".to_string(),
            message: e.to_string(),
        })?;
    if field_type == FieldType::Text && length.is_none() {
        return Err(GdbKitError::Config(ConfigError::MissingRequired {
            option: "length".to_string(),
        }));
    }
    Ok((field_type, length))
}

/// Handles the `datasets` subcommand by displaying a formatted table of the
/// workspace's datasets.
fn handle_datasets(workspace: &str, format: OutputFormat) -> Result<()> {
    let store = JsonWorkspace::open(workspace)?;

    let mut listing = Vec::new();
    let mut rows = Vec::new();
    for name in store.dataset_names() {
        let description = store.describe(name)?;
        let counts = if description.data_type.is_tabular() {
            Some((store.list_fields(name)?.len(), store.count_rows(name)?))
        } else {
            None
        };
        listing.push(serde_json::json!({
            "name": name,
            "dataType": description.data_type,
            "shapeType": description.shape_type,
            "fields": counts.map(|(fields, _)| fields),
            "rows": counts.map(|(_, rows)| rows),
        }));
        rows.push(DatasetRow {
            name: name.to_string(),
            data_type: description.data_type.as_str().to_string(),
            shape_type: description
                .shape_type
                .map_or_else(|| "-".to_string(), |s| format!("{s:?}")),
            fields: counts.map_or_else(|| "-".to_string(), |(f, _)| f.to_string()),
            rows: counts.map_or_else(
                || "-".to_string(),
                |(_, r)| render::group_thousands(r as u64),
            ),
        });
    }

    if format == OutputFormat::Json {
        return print_json(&listing);
    }

    println!("\nDatasets in {workspace} ({} total):\n", rows.len());
    let table = Table::new(rows).to_string();
    println!("{table}");

    Ok(())
}

fn handle_schema_check(
    workspace: &str,
    input: &str,
    target_workspace: Option<&str>,
    target: &str,
    options: &CompareOptions,
    format: OutputFormat,
) -> Result<()> {
    let input_store = JsonWorkspace::open(workspace)?;
    let target_store = match target_workspace {
        Some(path) => JsonWorkspace::open(path)?,
        None => input_store.clone(),
    };

    let Some(diff) = settle(check_schema(
        &input_store,
        input,
        &target_store,
        target,
        options,
    ))?
    else {
        return Ok(());
    };

    match format {
        OutputFormat::Text => print!("{}", render::schema_report(&diff)),
        OutputFormat::Table => display::display_schema_diff(&diff),
        OutputFormat::Json => print_json(&diff)?,
    }
    Ok(())
}

fn handle_domains(workspace: &str, datasets: &[String], format: OutputFormat) -> Result<()> {
    let store = JsonWorkspace::open(workspace)?;
    let datasets: Vec<String> = if datasets.is_empty() {
        store.dataset_names().map(str::to_string).collect()
    } else {
        datasets.to_vec()
    };

    let Some(report) = settle(domain_report(&store, workspace, datasets.as_slice()))? else {
        return Ok(());
    };

    match format {
        OutputFormat::Text => print!("{}", render::domain_report(&report)),
        OutputFormat::Table => display::display_domain_report(&report),
        OutputFormat::Json => print_json(&report)?,
    }
    Ok(())
}

fn handle_vertex_count(workspace: &str, dataset: &str, format: OutputFormat) -> Result<()> {
    let store = JsonWorkspace::open(workspace)?;
    let Some(count) = settle(count_vertices(&store, dataset))? else {
        return Ok(());
    };

    match (format, count) {
        (OutputFormat::Json, count) => print_json(&serde_json::json!({
            "dataset": dataset,
            "vertexCount": count,
        }))?,
        (OutputFormat::Table, Some(count)) => display::display_vertex_count(dataset, &count),
        (_, count) => print!("{}", render::vertex_report(count.as_ref())),
    }
    Ok(())
}

fn save_workspace(store: &JsonWorkspace) -> Result<()> {
    store.save()?;
    info!("Saved workspace {}", store.path().display());
    Ok(())
}

fn print_retype(summary: &RetypeSummary, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        print_json(summary)
    } else {
        print!("{}", render::retype_report(summary));
        Ok(())
    }
}

/// Handles the `change-field-type` subcommand. The workspace document is
/// only written once every value has been carried over.
fn handle_change_field_type(
    workspace: &str,
    dataset: &str,
    field: &str,
    field_type: &str,
    length: Option<u32>,
    format: OutputFormat,
) -> Result<()> {
    let mut store = JsonWorkspace::open(workspace)?;
    let result = parse_field_type(field_type, length).and_then(|(new_type, length)| {
        change_field_type(&mut store, dataset, field, new_type, length)
    });
    let Some(summary) = settle(result)? else {
        return Ok(());
    };

    save_workspace(&store)?;
    print_retype(&summary, format)
}

fn handle_change_field_length(
    workspace: &str,
    dataset: &str,
    field: &str,
    length: u32,
    format: OutputFormat,
) -> Result<()> {
    let mut store = JsonWorkspace::open(workspace)?;
    let Some(summary) = settle(change_text_field_length(&mut store, dataset, field, length))?
    else {
        return Ok(());
    };

    save_workspace(&store)?;
    print_retype(&summary, format)
}

fn handle_unique_values(
    workspace: &str,
    dataset: &str,
    fields: &[String],
    format: OutputFormat,
) -> Result<()> {
    let store = JsonWorkspace::open(workspace)?;
    let Some(report) = settle(unique_values(&store, dataset, fields))? else {
        return Ok(());
    };

    match format {
        OutputFormat::Text => print!("{}", render::unique_values_report(&report)),
        OutputFormat::Table => display::display_unique_values(&report),
        OutputFormat::Json => print_json(&report)?,
    }
    Ok(())
}
