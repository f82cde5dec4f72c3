use std::fs;
use std::path::PathBuf;

use roost_core::id::{ResourceKind, ResourceTypeId};
use roost_core::registry::InfusionSlot;
use roost_data::{DataLoadError, load_roost_data};

fn make_test_dir(suffix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("roost_data_it_{suffix}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn cleanup(dir: &PathBuf) {
    let _ = fs::remove_dir_all(dir);
}

// ===========================================================================
// Test 1: Full RON directory
// ===========================================================================

#[test]
fn loads_full_ron_directory() {
    let dir = make_test_dir("ron_full");
    fs::write(
        dir.join("items.ron"),
        r#"[
            (name: "smart_chicken"),
            (name: "water_chicken"),
            (name: "water_egg"),
            (name: "flux_egg"),
            (name: "snow_chicken"),
            (name: "nether_star"),
            (name: "star_chicken"),
        ]"#,
    )
    .unwrap();
    fs::write(
        dir.join("resources.ron"),
        r#"[
            (name: "water", kind: fluid),
            (name: "essence", kind: special),
        ]"#,
    )
    .unwrap();
    fs::write(
        dir.join("sources.ron"),
        r#"[(name: "water_chicken", lay_item: "water_egg", lay_min: 600, lay_max: 1200)]"#,
    )
    .unwrap();
    fs::write(
        dir.join("cracks.ron"),
        r#"[
            (item: "water_egg", kind: fluid, resource: Some("water"), amount: 1000),
            (item: "flux_egg", kind: energy, amount: 10000),
            (item: "water_egg", kind: fluid, resource: Some("water"), amount: 250, override: true),
        ]"#,
    )
    .unwrap();
    fs::write(
        dir.join("dousing.ron"),
        r#"(
            input: Some("smart_chicken"),
            recipes: [(
                resource: "water",
                input: "smart_chicken",
                output: "snow_chicken",
                resource_cost: 500,
                energy_cost: 200,
            )],
            special_items: [(item: "nether_star", resource: "essence")],
            infusion_a: Some((input: "smart_chicken", resource: "essence", output: "star_chicken")),
        )"#,
    )
    .unwrap();
    fs::write(
        dir.join("config.ron"),
        r#"(
            production: (roost_speed_multiplier: 2.0),
            dousing: (energy_cost: 500),
            liquid_costs: {"snow_chicken": 4000},
        )"#,
    )
    .unwrap();

    let data = load_roost_data(&dir).unwrap();
    let registry = data.builder.build();

    let water_chicken = registry.item_id("water_chicken").unwrap();
    let water_egg = registry.item_id("water_egg").unwrap();
    let flux_egg = registry.item_id("flux_egg").unwrap();
    let smart = registry.item_id("smart_chicken").unwrap();
    let snow = registry.item_id("snow_chicken").unwrap();
    let water = registry.resource_id("water").unwrap();

    let source = registry.source(water_chicken).unwrap();
    assert_eq!(source.lay_item, water_egg);
    assert_eq!((source.lay_min, source.lay_max), (600, 1200));

    assert_eq!(registry.default_crack(water_egg).unwrap().amount, 1000);
    assert_eq!(registry.resolve_crack(water_egg).unwrap().amount, 250);
    let flux = registry.resolve_crack(flux_egg).unwrap();
    assert_eq!(flux.kind, ResourceKind::Energy);
    assert_eq!(flux.resource, ResourceTypeId::ENERGY);

    assert_eq!(registry.dousing_input(), Some(smart));
    let recipe = registry
        .find_dousing_override(ResourceKind::Fluid, water, smart)
        .unwrap();
    assert_eq!(recipe.output, snow);
    assert_eq!(recipe.resource_cost, 500);

    let star = registry.item_id("nether_star").unwrap();
    assert_eq!(registry.special_resource(star), registry.resource_id("essence"));
    assert!(registry.infusion(InfusionSlot::A).is_some());
    assert!(registry.infusion(InfusionSlot::B).is_none());

    assert_eq!(data.config.production.roost_speed_multiplier, 2.0);
    assert_eq!(data.config.dousing.energy_cost, 500);
    assert_eq!(data.config.dousing.liquid_dousing_cost(snow), 4000);
    assert_eq!(
        data.config.dousing.liquid_dousing_cost(smart),
        data.config.dousing.default_liquid_cost
    );

    cleanup(&dir);
}

// ===========================================================================
// Test 2: TOML directory
// ===========================================================================

#[test]
fn loads_toml_directory() {
    let dir = make_test_dir("toml");
    fs::write(
        dir.join("items.toml"),
        "[[items]]\nname = \"lava_egg\"\n\n[[items]]\nname = \"lava_chicken\"\n",
    )
    .unwrap();
    fs::write(
        dir.join("resources.toml"),
        "[[resources]]\nname = \"lava\"\nkind = \"fluid\"\n",
    )
    .unwrap();
    fs::write(
        dir.join("cracks.toml"),
        "[[cracks]]\nitem = \"lava_egg\"\nkind = \"fluid\"\nresource = \"lava\"\namount = 1000\n",
    )
    .unwrap();
    fs::write(
        dir.join("config.toml"),
        "[converters]\nshow_activity = false\n\n\
         [converters.fluid]\ncapacity = 16000\ntransfer_rate = 2000\n",
    )
    .unwrap();

    let data = load_roost_data(&dir).unwrap();
    assert!(!data.config.converters.show_activity);
    assert_eq!(data.config.converters.fluid.capacity, 16_000);

    let registry = data.builder.build();
    let egg = registry.item_id("lava_egg").unwrap();
    let crack = registry.resolve_crack(egg).unwrap();
    assert_eq!(crack.resource, registry.resource_id("lava").unwrap());
    assert_eq!(crack.amount, 1000);

    cleanup(&dir);
}

// ===========================================================================
// Test 3: Only items, in JSON
// ===========================================================================

#[test]
fn items_only_uses_default_config() {
    let dir = make_test_dir("json_min");
    fs::write(dir.join("items.json"), r#"[{"name": "egg"}]"#).unwrap();

    let data = load_roost_data(&dir).unwrap();
    assert_eq!(data.config, Default::default());
    assert!(data.builder.item_id("egg").is_some());

    cleanup(&dir);
}

// ===========================================================================
// Test 4: Error reporting
// ===========================================================================

#[test]
fn missing_items_file() {
    let dir = make_test_dir("no_items");
    assert!(matches!(
        load_roost_data(&dir),
        Err(DataLoadError::MissingRequired { .. })
    ));
    cleanup(&dir);
}

#[test]
fn duplicate_item_name() {
    let dir = make_test_dir("dup");
    fs::write(dir.join("items.json"), r#"[{"name": "egg"}, {"name": "egg"}]"#).unwrap();
    assert!(matches!(
        load_roost_data(&dir),
        Err(DataLoadError::DuplicateName { ref name, .. }) if name == "egg"
    ));
    cleanup(&dir);
}

#[test]
fn unresolved_lay_item() {
    let dir = make_test_dir("unresolved");
    fs::write(dir.join("items.json"), r#"[{"name": "hen"}]"#).unwrap();
    fs::write(
        dir.join("sources.json"),
        r#"[{"name": "hen", "lay_item": "golden_egg", "lay_min": 1, "lay_max": 2}]"#,
    )
    .unwrap();
    assert!(matches!(
        load_roost_data(&dir),
        Err(DataLoadError::UnresolvedRef { ref name, expected_kind: "item", .. })
            if name == "golden_egg"
    ));
    cleanup(&dir);
}

#[test]
fn crack_kind_must_match_resource() {
    let dir = make_test_dir("kind_mismatch");
    fs::write(dir.join("items.json"), r#"[{"name": "egg"}]"#).unwrap();
    fs::write(
        dir.join("resources.json"),
        r#"[{"name": "acid", "kind": "chemical"}]"#,
    )
    .unwrap();
    fs::write(
        dir.join("cracks.json"),
        r#"[{"item": "egg", "kind": "fluid", "resource": "acid", "amount": 10}]"#,
    )
    .unwrap();
    assert!(matches!(load_roost_data(&dir), Err(DataLoadError::Invalid { .. })));
    cleanup(&dir);
}

#[test]
fn energy_resource_cannot_be_declared() {
    let dir = make_test_dir("energy_res");
    fs::write(dir.join("items.json"), r#"[{"name": "egg"}]"#).unwrap();
    fs::write(
        dir.join("resources.json"),
        r#"[{"name": "rf", "kind": "energy"}]"#,
    )
    .unwrap();
    assert!(matches!(load_roost_data(&dir), Err(DataLoadError::Invalid { .. })));
    cleanup(&dir);
}

#[test]
fn inverted_lay_range_rejected() {
    let dir = make_test_dir("lay_range");
    fs::write(dir.join("items.json"), r#"[{"name": "hen"}, {"name": "egg"}]"#).unwrap();
    fs::write(
        dir.join("sources.json"),
        r#"[{"name": "hen", "lay_item": "egg", "lay_min": 50, "lay_max": 10}]"#,
    )
    .unwrap();
    assert!(matches!(load_roost_data(&dir), Err(DataLoadError::Invalid { .. })));
    cleanup(&dir);
}
