//! Headless run: a water roost, a fluid converter and a dousing machine.
//!
//! The roost lays water eggs; they are moved by hand into the converter,
//! which pushes water into the adjacent dousing machine. A power converter
//! on the other side keeps the dousing machine supplied with energy.
//!
//! Run with: `cargo run -p roost-engine --example headless`

use roost_converter::ConverterVariant;
use roost_core::config::RoostConfig;
use roost_core::id::{ResourceKind, ResourceTypeId};
use roost_core::item::{Batch, SourceStats};
use roost_core::registry::{CrackOutput, RegistryBuilder, SourceDefinition};
use roost_engine::{Blueprint, BlockPos, Engine};
use roost_production::ContainerLayout;

fn main() {
    // --- Step 1: Content ---

    let mut b = RegistryBuilder::new();
    let water_egg = b.register_item("water_egg").expect("unique name");
    let flux_egg = b.register_item("flux_egg").expect("unique name");
    let smart = b.register_item("smart_chicken").expect("unique name");
    let water_chicken = b.register_item("water_chicken").expect("unique name");
    let feather = b.register_item("feather").expect("unique name");
    let water = b
        .register_resource("water", ResourceKind::Fluid)
        .expect("unique name");
    b.add_source(
        water_chicken,
        SourceDefinition {
            name: "water_chicken".into(),
            lay_item: water_egg,
            lay_min: 600,
            lay_max: 1200,
        },
    )
    .add_source(
        smart,
        SourceDefinition {
            name: "smart_chicken".into(),
            lay_item: feather,
            lay_min: 600,
            lay_max: 1200,
        },
    )
    .add_crack_default(
        water_egg,
        CrackOutput {
            kind: ResourceKind::Fluid,
            resource: water,
            amount: 1000,
        },
    )
    .add_crack_default(
        flux_egg,
        CrackOutput {
            kind: ResourceKind::Energy,
            resource: ResourceTypeId::ENERGY,
            amount: 10_000,
        },
    )
    .set_dousing_input(smart);

    // --- Step 2: Machines ---

    let mut engine = Engine::new(RoostConfig::default(), b.build()).with_seed(7);
    let roost = engine
        .place(BlockPos::new(-5, 0, 0), &Blueprint::Production(ContainerLayout::roost()))
        .expect("free position");
    let fluid = engine
        .place(BlockPos::new(0, 0, 0), &Blueprint::Converter(ConverterVariant::Fluid))
        .expect("free position");
    let dousing = engine
        .place(BlockPos::new(1, 0, 0), &Blueprint::Dousing)
        .expect("free position");
    let power = engine
        .place(BlockPos::new(2, 0, 0), &Blueprint::Converter(ConverterVariant::Power))
        .expect("free position");

    let m = engine.machine_mut(roost).expect("placed");
    let _ = m.set_batch(0, Some(Batch::with_stats(water_chicken, 16, SourceStats::new(10, 10, 1))));
    let m = engine.machine_mut(dousing).expect("placed");
    let _ = m.set_batch(0, Some(Batch::new(smart, 8)));

    // --- Step 3: Run ---

    for tick in 0..2000u32 {
        // Hand-carry eggs from the roost to the converter.
        let converter_free = engine.machine(fluid).is_some_and(|m| m.get_batch(0).is_none());
        if converter_free
            && let Some(egg) = engine.machine_mut(roost).and_then(|m| m.remove_batch(1, 1))
        {
            let converter = engine.machine_mut(fluid).expect("placed");
            let _ = converter.set_batch(0, Some(egg));
        }
        if tick % 100 == 0 {
            let generator = engine.machine_mut(power).expect("placed");
            if generator.get_batch(0).is_none() {
                let _ = generator.set_batch(0, Some(Batch::new(flux_egg, 1)));
            }
        }

        engine.step();
        for ev in engine.drain_events() {
            println!("[{:>4}] {:?}: {:?}", ev.tick, ev.machine, ev.event);
        }
    }

    // --- Step 4: Report ---

    let planner = engine
        .machine(dousing)
        .and_then(|m| m.as_dousing())
        .expect("dousing machine");
    println!(
        "dousing: progress {} energy {} fluid {} output {:?}",
        planner.progress(),
        planner.buffer(ResourceKind::Energy).amount(),
        planner.buffer(ResourceKind::Fluid).amount(),
        planner.get_batch(1),
    );
}
