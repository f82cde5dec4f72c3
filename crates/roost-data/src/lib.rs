//! Data-file loading for Roost content and configuration.
//!
//! A data directory holds `items`, `resources`, `sources`, `cracks`,
//! `dousing` and `config`, each as `.ron`, `.toml` or `.json`. Only `items`
//! is required.

pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, RoostData, load_roost_data};
