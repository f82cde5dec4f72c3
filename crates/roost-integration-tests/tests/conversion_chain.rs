//! A roost feeding a fluid converter, which feeds a dousing machine powered
//! by a second converter. Runs headless until a new source comes out.

use roost_converter::ConverterVariant;
use roost_core::config::RoostConfig;
use roost_core::event::{MachineEvent, MachineEventKind, PlanMode};
use roost_core::id::ResourceKind;
use roost_core::item::{Batch, SourceStats};
use roost_core::test_utils::{SampleIds, sample_registry};
use roost_dousing::{INPUT_SLOT, OUTPUT_SLOT, PROGRESS_TARGET};
use roost_engine::{BlockPos, Blueprint, Engine, EngineEvent};
use roost_production::ContainerLayout;

struct Chain {
    engine: Engine,
    ids: SampleIds,
    roost: roost_core::id::MachineId,
    fluid: roost_core::id::MachineId,
    dousing: roost_core::id::MachineId,
    power: roost_core::id::MachineId,
}

fn build_chain() -> Chain {
    let (registry, ids) = sample_registry();
    let mut engine = Engine::new(RoostConfig::default(), registry).with_seed(11);
    let roost = engine
        .place(BlockPos::new(-4, 0, 0), &Blueprint::Production(ContainerLayout::roost()))
        .unwrap();
    let fluid = engine
        .place(BlockPos::new(0, 0, 0), &Blueprint::Converter(ConverterVariant::Fluid))
        .unwrap();
    let dousing = engine.place(BlockPos::new(1, 0, 0), &Blueprint::Dousing).unwrap();
    let power = engine
        .place(BlockPos::new(2, 0, 0), &Blueprint::Converter(ConverterVariant::Power))
        .unwrap();

    let fast_hens = Batch::with_stats(ids.water_chicken, 16, SourceStats::new(10, 10, 1));
    assert!(engine.machine_mut(roost).unwrap().set_batch(0, Some(fast_hens)).is_none());
    let smart = Batch::new(ids.smart_chicken, 4);
    assert!(engine.machine_mut(dousing).unwrap().set_batch(INPUT_SLOT, Some(smart)).is_none());
    let flux = Batch::new(ids.flux_egg, 1);
    assert!(engine.machine_mut(power).unwrap().set_batch(0, Some(flux)).is_none());

    Chain {
        engine,
        ids,
        roost,
        fluid,
        dousing,
        power,
    }
}

/// Move one egg from the roost output into the fluid converter when it is
/// free.
fn carry_egg(chain: &mut Chain) {
    let free = chain
        .engine
        .machine(chain.fluid)
        .is_some_and(|m| m.get_batch(0).is_none());
    if !free {
        return;
    }
    let egg = chain
        .engine
        .machine_mut(chain.roost)
        .and_then(|m| m.remove_batch(1, 1));
    if let Some(egg) = egg {
        assert!(chain.engine.machine_mut(chain.fluid).unwrap().set_batch(0, Some(egg)).is_none());
    }
}

fn run_until_completed(chain: &mut Chain, limit: u32) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    for _ in 0..limit {
        carry_egg(chain);
        chain.engine.step();
        events.extend(chain.engine.drain_events());
        if events
            .iter()
            .any(|e| e.event.kind() == MachineEventKind::OperationCompleted)
        {
            break;
        }
    }
    events
}

// ===========================================================================
// Test 1: The chain produces a water chicken
// ===========================================================================

#[test]
fn chain_douses_smart_chicken_into_water_chicken() {
    let mut chain = build_chain();
    let events = run_until_completed(&mut chain, 2_000);

    let completed: Vec<_> = events
        .iter()
        .filter_map(|e| match &e.event {
            MachineEvent::OperationCompleted { output } => Some((e.machine, output.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(completed, vec![(chain.dousing, Batch::new(chain.ids.water_chicken, 1))]);

    let planner = chain.engine.machine(chain.dousing).unwrap().as_dousing().unwrap();
    assert_eq!(planner.get_batch(INPUT_SLOT).unwrap().count, 3);
    assert_eq!(planner.get_batch(OUTPUT_SLOT), Some(&Batch::new(chain.ids.water_chicken, 1)));
}

// ===========================================================================
// Test 2: Event flow across machines
// ===========================================================================

#[test]
fn events_come_from_every_stage() {
    let mut chain = build_chain();
    let events = run_until_completed(&mut chain, 2_000);

    let from = |id, kind| events.iter().any(|e| e.machine == id && e.event.kind() == kind);
    assert!(from(chain.roost, MachineEventKind::CycleCompleted));
    assert!(from(chain.fluid, MachineEventKind::Cracked));
    assert!(from(chain.fluid, MachineEventKind::Exported));
    assert!(from(chain.power, MachineEventKind::Cracked));
    assert!(from(chain.power, MachineEventKind::Exported));
    assert!(events.iter().any(|e| e.machine == chain.dousing
        && e.event == MachineEvent::PlanChanged {
            mode: PlanMode::ResourceB
        }));

    // Ticks are tagged in order.
    assert!(events.windows(2).all(|w| w[0].tick <= w[1].tick));
}

// ===========================================================================
// Test 3: An operation takes the full progress target
// ===========================================================================

#[test]
fn operation_needs_full_progress() {
    let mut chain = build_chain();
    let events = run_until_completed(&mut chain, 2_000);

    let ready_at = events
        .iter()
        .find(|e| e.machine == chain.dousing && e.event.kind() == MachineEventKind::PlanChanged)
        .map(|e| e.tick)
        .unwrap();
    let done_at = events
        .iter()
        .find(|e| e.event.kind() == MachineEventKind::OperationCompleted)
        .map(|e| e.tick)
        .unwrap();
    assert!(done_at - ready_at >= u64::from(PROGRESS_TARGET) - 1);

    let planner = chain.engine.machine(chain.dousing).unwrap().as_dousing().unwrap();
    assert_eq!(planner.progress(), 0);
    // The only flux egg paid for the only operation.
    assert_eq!(planner.buffer(ResourceKind::Energy).amount(), 0);
}
