//! Content registry: production sources, crack tables, recipe overrides and
//! dousing recipes.
//!
//! Built through [`RegistryBuilder`] and then treated as read-only, except
//! for the resource-to-source lookup cache it owns. [`Registry::reload`]
//! swaps the content and drops the cache.

use std::collections::HashMap;

use crate::id::{ItemTypeId, ResourceKind, ResourceTypeId};

/// A production source (a breed) and what it lays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDefinition {
    pub name: String,
    pub lay_item: ItemTypeId,
    /// Base lay time range in ticks, before speed multipliers.
    pub lay_min: u32,
    pub lay_max: u32,
}

/// What one unit of a crackable item turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrackOutput {
    pub kind: ResourceKind,
    pub resource: ResourceTypeId,
    pub amount: u32,
}

/// An externally registered dousing recipe keyed by the buffered resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DousingRecipe {
    /// `Fluid` or `Chemical`.
    pub kind: ResourceKind,
    pub resource: ResourceTypeId,
    pub input: ItemTypeId,
    pub output: ItemTypeId,
    pub resource_cost: u32,
    pub energy_cost: u32,
}

/// Which of the two special infusions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfusionSlot {
    A,
    B,
}

/// Turns `input` into `output` once the special buffer is full of
/// `resource`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialInfusion {
    pub input: ItemTypeId,
    pub resource: ResourceTypeId,
    pub output: ItemTypeId,
}

/// Errors raised while building a registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate name: {0}")]
    Duplicate(String),
    #[error("not found: {0}")]
    NotFound(String),
}

// ---------------------------------------------------------------------------
// Lookup cache
// ---------------------------------------------------------------------------

/// Memoized resource -> source resolution. Owned by the registry and
/// invalidated whenever its content changes.
#[derive(Debug, Clone, Default)]
pub struct SourceCache {
    entries: HashMap<(ResourceKind, ResourceTypeId), Option<ItemTypeId>>,
}

impl SourceCache {
    pub fn get(&self, kind: ResourceKind, resource: ResourceTypeId) -> Option<Option<ItemTypeId>> {
        self.entries.get(&(kind, resource)).copied()
    }

    pub fn insert(
        &mut self,
        kind: ResourceKind,
        resource: ResourceTypeId,
        source: Option<ItemTypeId>,
    ) {
        self.entries.insert((kind, resource), source);
    }

    pub fn invalidate(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Collects content, then produces a [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    items: Vec<String>,
    item_names: HashMap<String, ItemTypeId>,
    resources: Vec<(String, ResourceKind)>,
    resource_names: HashMap<String, ResourceTypeId>,
    sources: HashMap<ItemTypeId, SourceDefinition>,
    crack_defaults: HashMap<ItemTypeId, CrackOutput>,
    crack_overrides: HashMap<ItemTypeId, CrackOutput>,
    dousing_recipes: Vec<DousingRecipe>,
    special_items: HashMap<ItemTypeId, ResourceTypeId>,
    infusions: HashMap<InfusionSlot, SpecialInfusion>,
    dousing_input: Option<ItemTypeId>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an item name. Returns its id.
    pub fn register_item(&mut self, name: &str) -> Result<ItemTypeId, RegistryError> {
        if self.item_names.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        let id = ItemTypeId(self.items.len() as u32);
        self.items.push(name.to_string());
        self.item_names.insert(name.to_string(), id);
        Ok(id)
    }

    /// Register a resource name and its kind. Returns its id.
    pub fn register_resource(
        &mut self,
        name: &str,
        kind: ResourceKind,
    ) -> Result<ResourceTypeId, RegistryError> {
        if self.resource_names.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        let id = ResourceTypeId(self.resources.len() as u32);
        self.resources.push((name.to_string(), kind));
        self.resource_names.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn item_id(&self, name: &str) -> Option<ItemTypeId> {
        self.item_names.get(name).copied()
    }

    pub fn resource_id(&self, name: &str) -> Option<ResourceTypeId> {
        self.resource_names.get(name).copied()
    }

    /// Register an item as a production source.
    pub fn add_source(&mut self, item: ItemTypeId, def: SourceDefinition) -> &mut Self {
        self.sources.insert(item, def);
        self
    }

    pub fn add_crack_default(&mut self, item: ItemTypeId, output: CrackOutput) -> &mut Self {
        self.crack_defaults.insert(item, output);
        self
    }

    pub fn add_crack_override(&mut self, item: ItemTypeId, output: CrackOutput) -> &mut Self {
        self.crack_overrides.insert(item, output);
        self
    }

    pub fn add_dousing_recipe(&mut self, recipe: DousingRecipe) -> &mut Self {
        self.dousing_recipes.push(recipe);
        self
    }

    /// Using `item` on a dousing machine charges its special buffer with
    /// `resource`.
    pub fn add_special_item(&mut self, item: ItemTypeId, resource: ResourceTypeId) -> &mut Self {
        self.special_items.insert(item, resource);
        self
    }

    pub fn set_infusion(&mut self, slot: InfusionSlot, infusion: SpecialInfusion) -> &mut Self {
        self.infusions.insert(slot, infusion);
        self
    }

    /// The item every default fluid/chemical conversion starts from.
    pub fn set_dousing_input(&mut self, item: ItemTypeId) -> &mut Self {
        self.dousing_input = Some(item);
        self
    }

    pub fn build(self) -> Registry {
        Registry {
            items: self.items,
            item_names: self.item_names,
            resources: self.resources,
            resource_names: self.resource_names,
            sources: self.sources,
            crack_defaults: self.crack_defaults,
            crack_overrides: self.crack_overrides,
            dousing_recipes: self.dousing_recipes,
            special_items: self.special_items,
            infusions: self.infusions,
            dousing_input: self.dousing_input,
            cache: SourceCache::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Frozen content plus the lookup cache.
#[derive(Debug, Clone)]
pub struct Registry {
    items: Vec<String>,
    item_names: HashMap<String, ItemTypeId>,
    resources: Vec<(String, ResourceKind)>,
    resource_names: HashMap<String, ResourceTypeId>,
    sources: HashMap<ItemTypeId, SourceDefinition>,
    crack_defaults: HashMap<ItemTypeId, CrackOutput>,
    crack_overrides: HashMap<ItemTypeId, CrackOutput>,
    dousing_recipes: Vec<DousingRecipe>,
    special_items: HashMap<ItemTypeId, ResourceTypeId>,
    infusions: HashMap<InfusionSlot, SpecialInfusion>,
    dousing_input: Option<ItemTypeId>,
    cache: SourceCache,
}

impl Default for Registry {
    fn default() -> Self {
        RegistryBuilder::new().build()
    }
}

impl Registry {
    /// Replace all content with a freshly built registry and drop cached
    /// lookups.
    pub fn reload(&mut self, builder: RegistryBuilder) {
        *self = builder.build();
        self.cache.invalidate();
        log::debug!(
            "registry reloaded: {} items, {} sources",
            self.items.len(),
            self.sources.len()
        );
    }

    pub fn item_name(&self, id: ItemTypeId) -> Option<&str> {
        self.items.get(id.0 as usize).map(String::as_str)
    }

    pub fn item_id(&self, name: &str) -> Option<ItemTypeId> {
        self.item_names.get(name).copied()
    }

    pub fn resource_name(&self, id: ResourceTypeId) -> Option<&str> {
        self.resources.get(id.0 as usize).map(|(n, _)| n.as_str())
    }

    pub fn resource_kind(&self, id: ResourceTypeId) -> Option<ResourceKind> {
        if id == ResourceTypeId::ENERGY {
            return Some(ResourceKind::Energy);
        }
        self.resources.get(id.0 as usize).map(|(_, k)| *k)
    }

    pub fn resource_id(&self, name: &str) -> Option<ResourceTypeId> {
        self.resource_names.get(name).copied()
    }

    pub fn source(&self, item: ItemTypeId) -> Option<&SourceDefinition> {
        self.sources.get(&item)
    }

    pub fn is_source(&self, item: ItemTypeId) -> bool {
        self.sources.contains_key(&item)
    }

    pub fn find_crack_override(&self, item: ItemTypeId) -> Option<CrackOutput> {
        self.crack_overrides.get(&item).copied()
    }

    pub fn default_crack(&self, item: ItemTypeId) -> Option<CrackOutput> {
        self.crack_defaults.get(&item).copied()
    }

    /// Override table first, then the default table.
    pub fn resolve_crack(&self, item: ItemTypeId) -> Option<CrackOutput> {
        self.find_crack_override(item).or_else(|| self.default_crack(item))
    }

    /// Custom dousing recipe for a buffered resource and input item.
    pub fn find_dousing_override(
        &self,
        kind: ResourceKind,
        resource: ResourceTypeId,
        input: ItemTypeId,
    ) -> Option<&DousingRecipe> {
        self.dousing_recipes
            .iter()
            .find(|r| r.kind == kind && r.resource == resource && r.input == input)
    }

    pub fn special_resource(&self, item: ItemTypeId) -> Option<ResourceTypeId> {
        self.special_items.get(&item).copied()
    }

    pub fn infusion(&self, slot: InfusionSlot) -> Option<SpecialInfusion> {
        self.infusions.get(&slot).copied()
    }

    pub fn dousing_input(&self) -> Option<ItemTypeId> {
        self.dousing_input
    }

    /// The source whose lay item cracks into `resource` of `kind`, if any.
    /// Ties resolve to the lowest item id. Results are cached.
    pub fn resolve_source_for(
        &mut self,
        kind: ResourceKind,
        resource: ResourceTypeId,
    ) -> Option<ItemTypeId> {
        if let Some(hit) = self.cache.get(kind, resource) {
            return hit;
        }
        let found = self
            .sources
            .iter()
            .filter(|(_, def)| {
                self.resolve_crack(def.lay_item)
                    .is_some_and(|out| out.kind == kind && out.resource == resource)
            })
            .map(|(item, _)| *item)
            .min();
        self.cache.insert(kind, resource, found);
        found
    }

    pub fn cache(&self) -> &SourceCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build() -> (Registry, ItemTypeId, ItemTypeId, ResourceTypeId) {
        let mut b = RegistryBuilder::new();
        let water_chicken = b.register_item("water_chicken").unwrap();
        let water_egg = b.register_item("water_egg").unwrap();
        let water = b.register_resource("water", ResourceKind::Fluid).unwrap();
        b.add_source(
            water_chicken,
            SourceDefinition {
                name: "water_chicken".into(),
                lay_item: water_egg,
                lay_min: 6000,
                lay_max: 12000,
            },
        );
        b.add_crack_default(
            water_egg,
            CrackOutput {
                kind: ResourceKind::Fluid,
                resource: water,
                amount: 1000,
            },
        );
        (b.build(), water_chicken, water_egg, water)
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut b = RegistryBuilder::new();
        b.register_item("egg").unwrap();
        assert_eq!(b.register_item("egg"), Err(RegistryError::Duplicate("egg".into())));
    }

    #[test]
    fn override_wins_over_default() {
        let (registry, _, egg, _) = build();
        assert_eq!(registry.resolve_crack(egg).unwrap().amount, 1000);

        let mut b = RegistryBuilder::new();
        let egg2 = b.register_item("water_egg").unwrap();
        let water2 = b.register_resource("water", ResourceKind::Fluid).unwrap();
        let out = CrackOutput {
            kind: ResourceKind::Fluid,
            resource: water2,
            amount: 1000,
        };
        b.add_crack_default(egg2, out);
        b.add_crack_override(egg2, CrackOutput { amount: 250, ..out });
        let registry = b.build();
        assert_eq!(registry.resolve_crack(egg2).unwrap().amount, 250);
    }

    #[test]
    fn resolve_source_is_cached() {
        let (mut registry, chicken, _, water) = build();
        assert!(registry.cache().is_empty());
        assert_eq!(registry.resolve_source_for(ResourceKind::Fluid, water), Some(chicken));
        assert_eq!(registry.cache().len(), 1);
        // Second call hits the cache.
        assert_eq!(registry.resolve_source_for(ResourceKind::Fluid, water), Some(chicken));
        assert_eq!(registry.cache().len(), 1);
    }

    #[test]
    fn negative_lookups_are_cached_too() {
        let (mut registry, _, _, _) = build();
        assert_eq!(registry.resolve_source_for(ResourceKind::Chemical, ResourceTypeId(99)), None);
        assert_eq!(registry.cache().len(), 1);
    }

    #[test]
    fn reload_invalidates_cache() {
        let (mut registry, _, _, water) = build();
        registry.resolve_source_for(ResourceKind::Fluid, water);
        assert_eq!(registry.cache().len(), 1);

        registry.reload(RegistryBuilder::new());
        assert!(registry.cache().is_empty());
        assert_eq!(registry.resolve_source_for(ResourceKind::Fluid, water), None);
    }

    #[test]
    fn energy_resource_kind() {
        let registry = Registry::default();
        assert_eq!(registry.resource_kind(ResourceTypeId::ENERGY), Some(ResourceKind::Energy));
    }
}
