//! Loading pipeline: finds the manifest, reads the CSV tables, and turns
//! their rows into line configs and orders.
//!
//! Format detection (RON/JSON/TOML) and file discovery cover the manifest.
//! Table rows that fail to parse or validate are skipped with a warning; a
//! table that cannot be read at all is reported in [`FactorySetup::problems`]
//! and contributes nothing.

use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use partline_core::id::{LineId, OrderId, PartTypeId};
use partline_core::line::LineConfig;
use partline_core::order::{Order, OrderBook, RequestedParts};
use partline_core::part::PartTemplate;
use partline_core::scheduler::{FactoryScheduler, SchedulerError};
use serde::de::DeserializeOwned;

use crate::schema::{FactoryManifest, MachineRow, OrderRow};

/// Base name of the scenario manifest inside a factory directory.
pub const MANIFEST_BASE_NAME: &str = "factory";

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// An empty path was supplied where a file or directory was expected.
    #[error("empty path supplied for {what}")]
    EmptyPath { what: &'static str },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// The CSV reader failed outside of a single row.
    #[error("csv error in {file}: {source}")]
    Csv {
        file: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// An I/O error occurred.
    #[error("cannot read {file}: {source}")]
    Io {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a requested-parts field could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestedPartsError {
    #[error("no part pairs given")]
    Empty,
    #[error("malformed pair '{0}', expected '(typeId qty)'")]
    MalformedPair(String),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported manifest formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for a data file with the given base name (without extension).
///
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// more than one format exists for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path).map_err(|source| DataLoadError::Io {
        file: path.to_path_buf(),
        source,
    })?;
    let parse_err = |detail: String| DataLoadError::Parse {
        file: path.to_path_buf(),
        detail,
    };

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_err(e.to_string())),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_err(e.to_string())),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_err(e.to_string())),
    }
}

// ===========================================================================
// Requested parts
// ===========================================================================

/// Parse `(typeId qty)` pairs joined by `-`, e.g. `(1 3)-(2 4)`.
///
/// A type listed twice has its quantities summed.
pub fn parse_requested_parts(text: &str) -> Result<RequestedParts, RequestedPartsError> {
    if text.trim().is_empty() {
        return Err(RequestedPartsError::Empty);
    }

    let mut requested = RequestedParts::new();
    for raw in text.split('-') {
        let pair = raw.trim().trim_start_matches('(').trim_end_matches(')');
        let mut fields = pair.split_whitespace();
        let (Some(type_id), Some(quantity), None) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(RequestedPartsError::MalformedPair(raw.trim().to_string()));
        };
        requested.add(PartTypeId(parse_number(type_id)?), parse_number(quantity)?);
    }
    Ok(requested)
}

fn parse_number(field: &str) -> Result<u32, RequestedPartsError> {
    field
        .parse()
        .map_err(|_| RequestedPartsError::InvalidNumber(field.to_string()))
}

// ===========================================================================
// CSV tables
// ===========================================================================

/// Read every well-formed row of a headed CSV table, deserializing columns
/// by position. Rows that fail are logged and skipped.
fn read_rows<T: DeserializeOwned>(path: &Path, table: &'static str) -> Result<Vec<T>, DataLoadError> {
    if path.as_os_str().is_empty() {
        return Err(DataLoadError::EmptyPath { what: table });
    }
    let file = File::open(path).map_err(|source| DataLoadError::Io {
        file: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);
    reader.headers().map_err(|source| DataLoadError::Csv {
        file: path.to_path_buf(),
        source,
    })?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "skipping unreadable {table} row");
                continue;
            }
        };
        let line = record.position().map_or(0, |p| p.line());
        match record.deserialize::<T>(None) {
            Ok(row) => rows.push(row),
            Err(e) => {
                tracing::warn!(file = %path.display(), line, error = %e, "skipping malformed {table} row");
            }
        }
    }
    Ok(rows)
}

/// Read the machine table at `path`.
pub fn read_machine_rows(path: &Path) -> Result<Vec<MachineRow>, DataLoadError> {
    read_rows(path, "machine")
}

/// Read the order table at `path`.
pub fn read_order_rows(path: &Path) -> Result<Vec<OrderRow>, DataLoadError> {
    read_rows(path, "order")
}

impl MachineRow {
    /// The line this row describes. The row id is both the line id and the
    /// part type id.
    pub fn to_line_config(&self) -> LineConfig {
        LineConfig {
            id: LineId(self.id),
            template: PartTemplate::new(PartTypeId(self.id), self.name.clone(), self.weight),
            period: self.period,
            weight_error: self.weight_error,
            defect_interval: self.defect_interval,
        }
    }
}

/// Load the machine table as validated line configs, in table order.
///
/// Rows with invalid settings or an id already seen are skipped with a
/// warning.
pub fn load_machines(path: &Path) -> Result<Vec<LineConfig>, DataLoadError> {
    let mut seen = HashSet::new();
    let mut configs = Vec::new();

    for row in read_machine_rows(path)? {
        let config = row.to_line_config();
        if let Err(e) = config.validate() {
            tracing::warn!(file = %path.display(), machine = row.id, error = %e, "skipping machine");
            continue;
        }
        if !seen.insert(row.id) {
            tracing::warn!(file = %path.display(), machine = row.id, "skipping duplicate machine id");
            continue;
        }
        configs.push(config);
    }
    Ok(configs)
}

/// Load the order table, in table order, all pending.
///
/// Rows whose requested parts cannot be parsed, or whose id was already
/// seen, are skipped with a warning.
pub fn load_orders(path: &Path) -> Result<Vec<Order>, DataLoadError> {
    let mut seen = HashSet::new();
    let mut orders = Vec::new();

    for row in read_order_rows(path)? {
        let requested = match parse_requested_parts(&row.requested) {
            Ok(requested) => requested,
            Err(e) => {
                tracing::warn!(file = %path.display(), order = row.id, error = %e, "skipping order");
                continue;
            }
        };
        if !seen.insert(row.id) {
            tracing::warn!(file = %path.display(), order = row.id, "skipping duplicate order id");
            continue;
        }
        orders.push(Order::new(OrderId(row.id), row.customer, requested));
    }
    Ok(orders)
}

// ===========================================================================
// Factory setup
// ===========================================================================

/// Everything loaded from a factory directory.
#[derive(Debug)]
pub struct FactorySetup {
    pub manifest: FactoryManifest,
    pub lines: Vec<LineConfig>,
    pub orders: Vec<Order>,
    /// Tables that could not be read. Each one left its dataset empty.
    pub problems: Vec<DataLoadError>,
}

impl FactorySetup {
    /// Whether both tables were read.
    pub fn is_complete(&self) -> bool {
        self.problems.is_empty()
    }

    /// Build a scheduler from the loaded lines and orders, seeded from the
    /// manifest.
    pub fn into_scheduler(self) -> Result<FactoryScheduler, SchedulerError> {
        let orders: OrderBook = self.orders.into_iter().collect();
        FactoryScheduler::from_configs(self.lines, orders, self.manifest.simulation.seed)
    }
}

/// Load a factory directory.
///
/// Reads `factory.{ron,toml,json}` if present (defaults otherwise), then the
/// machine and order tables it names. A manifest that exists but cannot be
/// parsed is an error; a table that cannot be opened is logged and recorded
/// in [`FactorySetup::problems`].
pub fn load_factory(dir: &Path) -> Result<FactorySetup, DataLoadError> {
    if dir.as_os_str().is_empty() {
        return Err(DataLoadError::EmptyPath {
            what: "factory directory",
        });
    }

    let manifest = match find_data_file(dir, MANIFEST_BASE_NAME)? {
        Some(path) => deserialize_file::<FactoryManifest>(&path)?,
        None => {
            tracing::debug!(dir = %dir.display(), "no manifest found, using defaults");
            FactoryManifest::default()
        }
    };

    let mut problems = Vec::new();
    let lines = load_dataset(&mut problems, "machines", || {
        load_machines(&table_path(dir, &manifest.machines, "machine table")?)
    });
    let orders = load_dataset(&mut problems, "orders", || {
        load_orders(&table_path(dir, &manifest.orders, "order table")?)
    });

    tracing::info!(
        dir = %dir.display(),
        lines = lines.len(),
        orders = orders.len(),
        problems = problems.len(),
        "factory loaded"
    );

    Ok(FactorySetup {
        manifest,
        lines,
        orders,
        problems,
    })
}

/// Resolve a manifest table path against the factory directory. An empty
/// path would resolve to the directory itself, so it is rejected here.
fn table_path(dir: &Path, table: &Path, what: &'static str) -> Result<PathBuf, DataLoadError> {
    if table.as_os_str().is_empty() {
        return Err(DataLoadError::EmptyPath { what });
    }
    Ok(dir.join(table))
}

fn load_dataset<T>(
    problems: &mut Vec<DataLoadError>,
    dataset: &'static str,
    load: impl FnOnce() -> Result<Vec<T>, DataLoadError>,
) -> Vec<T> {
    load().unwrap_or_else(|e| {
        tracing::error!(dataset, error = %e, "dataset not loaded");
        problems.push(e);
        Vec::new()
    })
}

// ===========================================================================
// Tests
// ===========================================================================
