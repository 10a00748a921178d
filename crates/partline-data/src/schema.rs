//! Serde structs for the on-disk factory format.
//!
//! [`FactoryManifest`] is read from RON, JSON, or TOML. [`MachineRow`] and
//! [`OrderRow`] are read positionally from CSV tables and then converted into
//! engine types by the loader.

use std::path::PathBuf;

use partline_core::sim::SimulationConfig;
use serde::{Deserialize, Serialize};

// ===========================================================================
// Manifest
// ===========================================================================

/// Top-level description of a factory scenario.
///
/// Table paths are relative to the directory holding the manifest unless
/// they are absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryManifest {
    /// Machine table (`id,name,weight,weight_error,period,defect_interval`).
    pub machines: PathBuf,
    /// Order table (`id,customer,requested`).
    pub orders: PathBuf,
    pub simulation: SimulationConfig,
}

impl Default for FactoryManifest {
    fn default() -> Self {
        Self {
            machines: PathBuf::from("machines.csv"),
            orders: PathBuf::from("orders.csv"),
            simulation: SimulationConfig::default(),
        }
    }
}

// ===========================================================================
// Table rows
// ===========================================================================

/// One row of the machine table. The machine id doubles as the id of the
/// part type it produces.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MachineRow {
    pub id: u32,
    pub name: String,
    pub weight: f64,
    pub weight_error: f64,
    pub period: u32,
    pub defect_interval: u32,
}

/// One row of the order table.
///
/// `requested` is still in its textual `(typeId qty)-(typeId qty)` form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderRow {
    pub id: u32,
    pub customer: String,
    pub requested: String,
}
