//! Partline Data -- loads factory definitions from disk.
//!
//! Machines and orders come from CSV tables; the run length, seed, and table
//! locations come from an optional `factory.{ron,toml,json}` manifest.

pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, FactorySetup, load_factory, load_machines, load_orders};
pub use schema::FactoryManifest;
