//! Serde data file structs for content definitions.
//!
//! Everything refers to items and resources by name. The loader resolves
//! names into ids while filling a `RegistryBuilder`.

use std::collections::BTreeMap;

use roost_core::config::{ConverterConfig, DousingConfig, ProductionConfig};
use roost_core::id::ResourceKind;
use serde::Deserialize;

// ===========================================================================
// Items and resources
// ===========================================================================

/// An item type definition. TOML key: `items`.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemData {
    pub name: String,
}

/// A bufferable resource. TOML key: `resources`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceData {
    pub name: String,
    pub kind: KindData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindData {
    Energy,
    Fluid,
    Chemical,
    Special,
}

impl From<KindData> for ResourceKind {
    fn from(kind: KindData) -> Self {
        match kind {
            KindData::Energy => ResourceKind::Energy,
            KindData::Fluid => ResourceKind::Fluid,
            KindData::Chemical => ResourceKind::Chemical,
            KindData::Special => ResourceKind::Special,
        }
    }
}

// ===========================================================================
// Production sources
// ===========================================================================

/// A breed. `name` must be a registered item. TOML key: `sources`.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceData {
    pub name: String,
    pub lay_item: String,
    pub lay_min: u32,
    pub lay_max: u32,
}

// ===========================================================================
// Cracking
// ===========================================================================

/// One crack table entry. TOML key: `cracks`.
///
/// Energy cracks carry no resource name.
#[derive(Debug, Clone, Deserialize)]
pub struct CrackData {
    pub item: String,
    pub kind: KindData,
    #[serde(default)]
    pub resource: Option<String>,
    pub amount: u32,
    /// Goes into the override table instead of the default one.
    #[serde(rename = "override", default)]
    pub is_override: bool,
}

// ===========================================================================
// Dousing
// ===========================================================================

/// The dousing file. A single object, not a list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DousingData {
    /// Item every default conversion starts from.
    pub input: Option<String>,
    pub recipes: Vec<RecipeData>,
    pub special_items: Vec<SpecialItemData>,
    pub infusion_a: Option<InfusionData>,
    pub infusion_b: Option<InfusionData>,
}

/// A registered recipe. The buffer kind comes from the resource.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeData {
    pub resource: String,
    pub input: String,
    pub output: String,
    pub resource_cost: u32,
    pub energy_cost: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpecialItemData {
    pub item: String,
    pub resource: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InfusionData {
    pub input: String,
    pub resource: String,
    pub output: String,
}

// ===========================================================================
// Configuration
// ===========================================================================

/// The config file. Every section is optional.
///
/// `liquid_costs` is keyed by item name and merged into
/// `dousing.liquid_costs` once names are resolved.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigData {
    pub production: ProductionConfig,
    pub converters: ConverterConfig,
    pub dousing: DousingConfig,
    pub liquid_costs: BTreeMap<String, u32>,
}
