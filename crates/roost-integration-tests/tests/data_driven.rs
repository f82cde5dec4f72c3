//! Content and configuration loaded from a data directory drive the engine,
//! and a registry reload changes behavior without rebuilding machines.

use std::fs;
use std::path::PathBuf;

use roost_converter::ConverterVariant;
use roost_core::id::ResourceKind;
use roost_core::item::Batch;
use roost_data::load_roost_data;
use roost_engine::{BlockPos, Blueprint, Engine};

fn make_test_dir(suffix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("roost_it_data_{suffix}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_content(dir: &PathBuf, crack_amount: u32) {
    fs::write(
        dir.join("items.json"),
        r#"[{"name": "lava_egg"}, {"name": "lava_chicken"}]"#,
    )
    .unwrap();
    fs::write(dir.join("resources.json"), r#"[{"name": "lava", "kind": "fluid"}]"#).unwrap();
    fs::write(
        dir.join("cracks.json"),
        format!(
            r#"[{{"item": "lava_egg", "kind": "fluid",
                 "resource": "lava", "amount": {crack_amount}}}]"#
        ),
    )
    .unwrap();
}

// ===========================================================================
// Test 1: Loaded content and config reach the machines
// ===========================================================================

#[test]
fn loaded_data_drives_converter() {
    let dir = make_test_dir("drive");
    write_content(&dir, 400);
    fs::write(
        dir.join("config.toml"),
        "[converters.fluid]\ncapacity = 1000\ntransfer_rate = 50\n",
    )
    .unwrap();

    let data = load_roost_data(&dir).unwrap();
    let registry = data.builder.build();
    let lava_egg = registry.item_id("lava_egg").unwrap();
    let lava = registry.resource_id("lava").unwrap();
    let mut engine = Engine::new(data.config, registry);

    let conv = engine
        .place(BlockPos::new(0, 0, 0), &Blueprint::Converter(ConverterVariant::Fluid))
        .unwrap();
    let dousing = engine.place(BlockPos::new(0, 1, 0), &Blueprint::Dousing).unwrap();
    assert!(engine
        .machine_mut(conv)
        .unwrap()
        .set_batch(0, Some(Batch::new(lava_egg, 1)))
        .is_none());

    engine.step();

    let buffer = engine.machine(conv).unwrap().as_converter().unwrap().buffer();
    assert_eq!(buffer.capacity(), 1000);
    assert_eq!(buffer.resource(), Some(lava));
    // 400 cracked, 50 pushed.
    assert_eq!(buffer.amount(), 350);
    let fluid = engine.machine(dousing).unwrap().as_dousing().unwrap().buffer(ResourceKind::Fluid);
    assert_eq!(fluid.amount(), 50);

    let _ = fs::remove_dir_all(&dir);
}

// ===========================================================================
// Test 2: Registry reload takes effect on the next crack
// ===========================================================================

#[test]
fn reload_changes_crack_amount() {
    let dir = make_test_dir("reload");
    write_content(&dir, 100);
    let data = load_roost_data(&dir).unwrap();
    let registry = data.builder.build();
    let lava_egg = registry.item_id("lava_egg").unwrap();
    let mut engine = Engine::new(data.config, registry);
    let conv = engine
        .place(BlockPos::new(0, 0, 0), &Blueprint::Converter(ConverterVariant::Fluid))
        .unwrap();
    assert!(engine
        .machine_mut(conv)
        .unwrap()
        .set_batch(0, Some(Batch::new(lava_egg, 1)))
        .is_none());

    engine.step();
    assert_eq!(engine.machine(conv).unwrap().as_converter().unwrap().buffer().amount(), 100);

    write_content(&dir, 250);
    let reloaded = load_roost_data(&dir).unwrap();
    engine.reload_registry(reloaded.builder);
    assert!(engine
        .machine_mut(conv)
        .unwrap()
        .set_batch(0, Some(Batch::new(lava_egg, 1)))
        .is_none());
    engine.step();
    assert_eq!(engine.machine(conv).unwrap().as_converter().unwrap().buffer().amount(), 350);

    let _ = fs::remove_dir_all(&dir);
}
