//! Format detection (RON/JSON/TOML), file discovery and deserialization
//! helpers, and the pipeline that turns a data directory into a
//! `RegistryBuilder` plus a `RoostConfig`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use roost_core::config::RoostConfig;
use roost_core::id::{ItemTypeId, ResourceKind, ResourceTypeId};
use roost_core::registry::{
    CrackOutput, DousingRecipe, InfusionSlot, RegistryBuilder, RegistryError, SourceDefinition,
    SpecialInfusion,
};
use serde::de::DeserializeOwned;

use crate::schema::{
    ConfigData, CrackData, DousingData, ItemData, KindData, ResourceData, SourceData,
};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A name reference could not be resolved.
    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// A value that parses but makes no sense (e.g. a fluid crack with no
    /// resource).
    #[error("invalid entry in {file}: {detail}")]
    Invalid { file: PathBuf, detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file from its extension.
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

/// Look for `{base_name}.ron`, `.toml` or `.json` in `dir`. More than one
/// match is an error.
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

/// Like [`find_data_file`], but a missing file is an error.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, e: impl std::fmt::Display) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: e.to_string(),
    }
}

/// Deserialize a string in the given format.
pub fn deserialize_str<T: DeserializeOwned>(
    content: &str,
    format: Format,
    path: &Path,
) -> Result<T, DataLoadError> {
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(content).map_err(|e| parse_error(path, e)),
    }
}

/// Read a file and deserialize it according to its extension.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    deserialize_str(&content, format, path)
}

/// Deserialize a list. TOML has no top-level arrays, so there the list is
/// read from `toml_key` of the top-level table; RON and JSON hold the list
/// directly.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron | Format::Json => deserialize_str(&content, format, path),
        Format::Toml => {
            let table: toml::Table = toml::from_str(&content).map_err(|e| parse_error(path, e))?;
            let array = table
                .get(toml_key)
                .ok_or_else(|| parse_error(path, format!("missing key '{toml_key}' in TOML file")))?
                .clone();
            array.try_into().map_err(|e: toml::de::Error| parse_error(path, e))
        }
    }
}

// ===========================================================================
// Name resolution
// ===========================================================================

fn resolve_item(
    builder: &RegistryBuilder,
    name: &str,
    file: &Path,
) -> Result<ItemTypeId, DataLoadError> {
    builder.item_id(name).ok_or_else(|| DataLoadError::UnresolvedRef {
        file: file.to_path_buf(),
        name: name.to_string(),
        expected_kind: "item",
    })
}

fn resolve_resource(
    builder: &RegistryBuilder,
    name: &str,
    file: &Path,
) -> Result<ResourceTypeId, DataLoadError> {
    builder.resource_id(name).ok_or_else(|| DataLoadError::UnresolvedRef {
        file: file.to_path_buf(),
        name: name.to_string(),
        expected_kind: "resource",
    })
}

fn duplicate(file: &Path, e: RegistryError) -> DataLoadError {
    match e {
        RegistryError::Duplicate(name) => DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name,
        },
        other => invalid(file, other.to_string()),
    }
}

fn invalid(file: &Path, detail: String) -> DataLoadError {
    DataLoadError::Invalid {
        file: file.to_path_buf(),
        detail,
    }
}

// ===========================================================================
// Pipeline
// ===========================================================================

/// Everything read from a data directory.
#[derive(Debug)]
pub struct RoostData {
    pub config: RoostConfig,
    /// Unbuilt, so the host can add content before freezing it, or hand it
    /// to `Registry::reload`.
    pub builder: RegistryBuilder,
}

/// Load a data directory.
///
/// `items` is required. `resources`, `sources`, `cracks`, `dousing` and
/// `config` are optional. Files are processed in that order so each one
/// can refer to names declared by the ones before it.
pub fn load_roost_data(dir: &Path) -> Result<RoostData, DataLoadError> {
    let mut builder = RegistryBuilder::new();

    // --- Items ---
    let items_path = require_data_file(dir, "items")?;
    let items: Vec<ItemData> = deserialize_list(&items_path, "items")?;
    for item in &items {
        builder
            .register_item(&item.name)
            .map_err(|e| duplicate(&items_path, e))?;
    }

    // --- Resources ---
    let mut kinds: HashMap<String, ResourceKind> = HashMap::new();
    if let Some(path) = find_data_file(dir, "resources")? {
        let resources: Vec<ResourceData> = deserialize_list(&path, "resources")?;
        for res in &resources {
            if res.kind == KindData::Energy {
                return Err(invalid(
                    &path,
                    format!("resource '{}': energy is built in and cannot be declared", res.name),
                ));
            }
            builder
                .register_resource(&res.name, res.kind.into())
                .map_err(|e| duplicate(&path, e))?;
            kinds.insert(res.name.clone(), res.kind.into());
        }
    }
    // --- Sources ---
    if let Some(path) = find_data_file(dir, "sources")? {
        let sources: Vec<SourceData> = deserialize_list(&path, "sources")?;
        for src in sources {
            let item = resolve_item(&builder, &src.name, &path)?;
            let lay_item = resolve_item(&builder, &src.lay_item, &path)?;
            if src.lay_min > src.lay_max {
                return Err(invalid(
                    &path,
                    format!(
                        "source '{}': lay_min {} > lay_max {}",
                        src.name, src.lay_min, src.lay_max
                    ),
                ));
            }
            builder.add_source(
                item,
                SourceDefinition {
                    name: src.name,
                    lay_item,
                    lay_min: src.lay_min,
                    lay_max: src.lay_max,
                },
            );
        }
    }

    // --- Cracks ---
    if let Some(path) = find_data_file(dir, "cracks")? {
        let cracks: Vec<CrackData> = deserialize_list(&path, "cracks")?;
        for crack in &cracks {
            let item = resolve_item(&builder, &crack.item, &path)?;
            let kind: ResourceKind = crack.kind.into();
            let resource = match (kind, crack.resource.as_deref()) {
                (ResourceKind::Energy, None) => ResourceTypeId::ENERGY,
                (ResourceKind::Energy, Some(name)) => {
                    return Err(invalid(
                        &path,
                        format!("energy crack for '{}' names resource '{name}'", crack.item),
                    ));
                }
                (ResourceKind::Special, _) => {
                    return Err(invalid(
                        &path,
                        format!("crack for '{}' cannot produce a special resource", crack.item),
                    ));
                }
                (_, None) => {
                    return Err(invalid(
                        &path,
                        format!("crack for '{}' needs a resource", crack.item),
                    ));
                }
                (_, Some(name)) => {
                    let id = resolve_resource(&builder, name, &path)?;
                    if kinds.get(name) != Some(&kind) {
                        return Err(invalid(
                            &path,
                            format!("resource '{name}' is not of kind {kind:?}"),
                        ));
                    }
                    id
                }
            };
            let output = CrackOutput {
                kind,
                resource,
                amount: crack.amount,
            };
            if crack.is_override {
                builder.add_crack_override(item, output);
            } else {
                builder.add_crack_default(item, output);
            }
        }
    }

    // --- Dousing ---
    if let Some(path) = find_data_file(dir, "dousing")? {
        let dousing: DousingData = deserialize_file(&path)?;
        if let Some(input) = &dousing.input {
            let id = resolve_item(&builder, input, &path)?;
            builder.set_dousing_input(id);
        }
        for recipe in &dousing.recipes {
            let resource = resolve_resource(&builder, &recipe.resource, &path)?;
            let kind = kinds.get(&recipe.resource).copied();
            let Some(kind @ (ResourceKind::Fluid | ResourceKind::Chemical)) = kind else {
                return Err(invalid(
                    &path,
                    format!("recipe resource '{}' must be a fluid or chemical", recipe.resource),
                ));
            };
            let input = resolve_item(&builder, &recipe.input, &path)?;
            let output = resolve_item(&builder, &recipe.output, &path)?;
            builder.add_dousing_recipe(DousingRecipe {
                kind,
                resource,
                input,
                output,
                resource_cost: recipe.resource_cost,
                energy_cost: recipe.energy_cost,
            });
        }
        for special in &dousing.special_items {
            let item = resolve_item(&builder, &special.item, &path)?;
            let resource = resolve_resource(&builder, &special.resource, &path)?;
            if kinds.get(&special.resource) != Some(&ResourceKind::Special) {
                return Err(invalid(
                    &path,
                    format!("resource '{}' is not special", special.resource),
                ));
            }
            builder.add_special_item(item, resource);
        }
        for (slot, infusion) in [
            (InfusionSlot::A, &dousing.infusion_a),
            (InfusionSlot::B, &dousing.infusion_b),
        ] {
            let Some(infusion) = infusion else { continue };
            let resolved = SpecialInfusion {
                input: resolve_item(&builder, &infusion.input, &path)?,
                resource: resolve_resource(&builder, &infusion.resource, &path)?,
                output: resolve_item(&builder, &infusion.output, &path)?,
            };
            builder.set_infusion(slot, resolved);
        }
    }

    // --- Config ---
    let mut config = RoostConfig::default();
    if let Some(path) = find_data_file(dir, "config")? {
        let data: ConfigData = deserialize_file(&path)?;
        config.production = data.production;
        config.converters = data.converters;
        config.dousing = data.dousing;
        for (name, cost) in data.liquid_costs {
            let id = resolve_item(&builder, &name, &path)?;
            config.dousing.liquid_costs.insert(id, cost);
        }
    }

    log::debug!("loaded roost data from {}: {} items", dir.display(), items.len());
    Ok(RoostData { config, builder })
}

// ===========================================================================
// Tests
// ===========================================================================
