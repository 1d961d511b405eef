//! Sequences per-frame updates across machines, the plumbing solver and the
//! physics world in the fixed order the scheduling model requires (§5).
//!
//! Welded-group rebuilds and separation sweeps are not part of the regular
//! per-frame sequence: they only run after a topology edit, so callers
//! invoke [`shipcore_graph::weld_builder::rebuild`] and
//! [`shipcore_graph::separation::detect_separations`] directly when a link
//! is made or broken.

use shipcore_fluid::Machine;
use shipcore_graph::RigidBodyWorld;

use crate::vehicle::Vehicle;

/// Runs one simulation frame: machines' `pre_update`, the plumbing tick,
/// `substeps` physics steps of `dt / substeps` seconds each, machines'
/// `physics_update`, then machines' `update` (§5).
///
/// Declared machines are ticked in map iteration order (unspecified) and
/// attached machines in insertion order, per part, in part-arena order.
///
/// # Errors
/// Propagates a plumbing solver convergence failure (§4.5.3).
pub fn run_frame(vehicle: &mut Vehicle, world: &mut dyn RigidBodyWorld, dt: f64, substeps: u32) -> anyhow::Result<()> {
    for_each_machine(vehicle, |m| m.pre_update(dt));

    let mut pipes = std::mem::take(&mut vehicle.pipes);
    let result = shipcore_fluid::run_tick(&mut pipes, vehicle, dt);
    vehicle.pipes = pipes;
    result?;

    let substep_dt = dt / f64::from(substeps.max(1));
    for _ in 0..substeps.max(1) {
        world.step(substep_dt);
    }

    for_each_machine(vehicle, |m| m.physics_update(dt));
    for_each_machine(vehicle, |m| m.update(dt));

    Ok(())
}

/// Runs editor-only ticks, skipping the plumbing and physics steps that
/// only make sense in flight mode.
pub fn run_editor_frame(vehicle: &mut Vehicle, dt: f64) { for_each_machine(vehicle, |m| m.editor_update(dt)); }

fn for_each_machine(vehicle: &mut Vehicle, mut callback: impl FnMut(&mut dyn Machine)) {
    let machine_ids: Vec<_> = vehicle.iter_parts().flat_map(|part| part.get_all_machines().map(|(_, id)| id)).collect();
    for id in machine_ids {
        if let Some(machine) = vehicle.get_machine_mut(id) {
            callback(machine);
        }
    }
}
