//! Shared test fixtures for unit and integration tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use crate::buffer::ResourceBuffer;
use crate::id::*;
use crate::registry::*;
use crate::transfer::{Neighbors, ResourceHandler};

// ===========================================================================
// Sample content
// ===========================================================================

/// Every id registered by [`sample_registry`].
#[derive(Debug, Clone, Copy)]
pub struct SampleIds {
    // Sources
    pub smart_chicken: ItemTypeId,
    pub water_chicken: ItemTypeId,
    pub lava_chicken: ItemTypeId,
    pub flux_chicken: ItemTypeId,
    pub hydrogen_chicken: ItemTypeId,
    pub oxygen_chicken: ItemTypeId,
    pub dragon_chicken: ItemTypeId,
    pub ender_chicken: ItemTypeId,
    // Lay items
    pub feather: ItemTypeId,
    pub water_egg: ItemTypeId,
    pub lava_egg: ItemTypeId,
    pub flux_egg: ItemTypeId,
    pub hydrogen_egg: ItemTypeId,
    pub dragon_scale: ItemTypeId,
    pub ender_pearl: ItemTypeId,
    // Misc
    pub seeds: ItemTypeId,
    pub dragon_breath: ItemTypeId,
    pub ender_eye: ItemTypeId,
    // Resources
    pub water: ResourceTypeId,
    pub lava: ResourceTypeId,
    pub hydrogen: ResourceTypeId,
    pub oxygen: ResourceTypeId,
    pub dragon_essence: ResourceTypeId,
    pub ender_essence: ResourceTypeId,
}

fn source(
    b: &mut RegistryBuilder,
    name: &str,
    lay_item: ItemTypeId,
    lay_min: u32,
    lay_max: u32,
) -> ItemTypeId {
    let id = b.register_item(name).expect("fixture names are unique");
    b.add_source(
        id,
        SourceDefinition {
            name: name.to_string(),
            lay_item,
            lay_min,
            lay_max,
        },
    );
    id
}

fn item(b: &mut RegistryBuilder, name: &str) -> ItemTypeId {
    b.register_item(name).expect("fixture names are unique")
}

fn resource(b: &mut RegistryBuilder, name: &str, kind: ResourceKind) -> ResourceTypeId {
    b.register_resource(name, kind).expect("fixture names are unique")
}

fn crack(kind: ResourceKind, resource: ResourceTypeId, amount: u32) -> CrackOutput {
    CrackOutput { kind, resource, amount }
}

/// A builder pre-filled with a small chicken catalog:
///
/// - water/lava eggs crack into 1000 of fluid, flux eggs into 10_000 energy,
///   hydrogen eggs into 1000 of chemical;
/// - dragon breath / ender eyes charge the special buffer;
/// - smart chickens are the dousing input; oxygen has a custom recipe.
pub fn sample_builder() -> (RegistryBuilder, SampleIds) {
    let mut b = RegistryBuilder::new();

    let feather = item(&mut b, "feather");
    let water_egg = item(&mut b, "water_egg");
    let lava_egg = item(&mut b, "lava_egg");
    let flux_egg = item(&mut b, "flux_egg");
    let hydrogen_egg = item(&mut b, "hydrogen_egg");
    let dragon_scale = item(&mut b, "dragon_scale");
    let ender_pearl = item(&mut b, "ender_pearl");
    let seeds = item(&mut b, "seeds");
    let dragon_breath = item(&mut b, "dragon_breath");
    let ender_eye = item(&mut b, "ender_eye");

    let smart_chicken = source(&mut b, "smart_chicken", feather, 6000, 12000);
    let water_chicken = source(&mut b, "water_chicken", water_egg, 6000, 12000);
    let lava_chicken = source(&mut b, "lava_chicken", lava_egg, 6000, 12000);
    let flux_chicken = source(&mut b, "flux_chicken", flux_egg, 6000, 12000);
    let hydrogen_chicken = source(&mut b, "hydrogen_chicken", hydrogen_egg, 6000, 12000);
    let oxygen_chicken = source(&mut b, "oxygen_chicken", feather, 6000, 12000);
    let dragon_chicken = source(&mut b, "dragon_chicken", dragon_scale, 12000, 24000);
    let ender_chicken = source(&mut b, "ender_chicken", ender_pearl, 6000, 12000);

    let water = resource(&mut b, "water", ResourceKind::Fluid);
    let lava = resource(&mut b, "lava", ResourceKind::Fluid);
    let hydrogen = resource(&mut b, "hydrogen", ResourceKind::Chemical);
    let oxygen = resource(&mut b, "oxygen", ResourceKind::Chemical);
    let dragon_essence = resource(&mut b, "dragon_essence", ResourceKind::Special);
    let ender_essence = resource(&mut b, "ender_essence", ResourceKind::Special);

    b.add_crack_default(water_egg, crack(ResourceKind::Fluid, water, 1000))
        .add_crack_default(lava_egg, crack(ResourceKind::Fluid, lava, 1000))
        .add_crack_default(flux_egg, crack(ResourceKind::Energy, ResourceTypeId::ENERGY, 10_000))
        .add_crack_default(hydrogen_egg, crack(ResourceKind::Chemical, hydrogen, 1000))
        .add_special_item(dragon_breath, dragon_essence)
        .add_special_item(ender_eye, ender_essence)
        .set_infusion(
            InfusionSlot::A,
            SpecialInfusion {
                input: smart_chicken,
                resource: dragon_essence,
                output: dragon_chicken,
            },
        )
        .set_infusion(
            InfusionSlot::B,
            SpecialInfusion {
                input: smart_chicken,
                resource: ender_essence,
                output: ender_chicken,
            },
        )
        .set_dousing_input(smart_chicken)
        .add_dousing_recipe(DousingRecipe {
            kind: ResourceKind::Chemical,
            resource: oxygen,
            input: smart_chicken,
            output: oxygen_chicken,
            resource_cost: 500,
            energy_cost: 2_000,
        });

    let ids = SampleIds {
        smart_chicken,
        water_chicken,
        lava_chicken,
        flux_chicken,
        hydrogen_chicken,
        oxygen_chicken,
        dragon_chicken,
        ender_chicken,
        feather,
        water_egg,
        lava_egg,
        flux_egg,
        hydrogen_egg,
        dragon_scale,
        ender_pearl,
        seeds,
        dragon_breath,
        ender_eye,
        water,
        lava,
        hydrogen,
        oxygen,
        dragon_essence,
        ender_essence,
    };
    (b, ids)
}

/// [`sample_builder`], built.
pub fn sample_registry() -> (Registry, SampleIds) {
    let (b, ids) = sample_builder();
    (b.build(), ids)
}

// ===========================================================================
// Neighbor double
// ===========================================================================

/// Plain buffers standing in for the six neighbors of a machine.
#[derive(Debug, Default)]
pub struct VecNeighbors {
    slots: [Option<ResourceBuffer>; 6],
}

impl VecNeighbors {
    pub fn insert(&mut self, direction: Direction, buffer: ResourceBuffer) {
        self.slots[direction.index()] = Some(buffer);
    }

    pub fn get(&self, direction: Direction) -> Option<&ResourceBuffer> {
        self.slots[direction.index()].as_ref()
    }

    pub fn get_mut(&mut self, direction: Direction) -> Option<&mut ResourceBuffer> {
        self.slots[direction.index()].as_mut()
    }
}

impl Neighbors for VecNeighbors {
    fn handler(
        &mut self,
        direction: Direction,
        kind: ResourceKind,
    ) -> Option<Box<dyn ResourceHandler + '_>> {
        let buffer = self.slots[direction.index()].as_mut()?;
        if buffer.kind() != kind {
            return None;
        }
        Some(Box::new(buffer))
    }
}
