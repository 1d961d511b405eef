//! The vehicle: owner of parts, pieces, machines and the plumbing network
//! (§3 `Vehicle`).

use std::collections::HashMap;

use shipcore_fluid::{Machine, MachineId, MachineRegistry, Pipe, PlumbingMachine, WireMap};
use shipcore_graph::{PartId, PieceGraph, WeldedGroupArena};

use crate::part::Part;

/// Whether a vehicle's pieces are resting in their serialized transforms or
/// driven by live rigid bodies (§3: physics state flag `packed`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackState {
    Packed,
    Unpacked,
}

/// Owns a collection of parts, a collection of pieces, a designated root
/// piece (via [`PieceGraph::root`]), a plumbing graph, a wire set, and a
/// pack/unpack state flag (§3 `Vehicle`).
pub struct Vehicle {
    pub parts: Vec<Option<Part>>,
    pub pieces: PieceGraph,
    pub groups: WeldedGroupArena,
    pub machines: Vec<Option<Box<dyn Machine>>>,
    pub pipes: Vec<Pipe>,
    pub wires: WireMap,
    pub pack_state: PackState,

    /// Editor-facing names for a part's `group_id`, indexed by that id.
    ///
    /// Pure presentation metadata carried through load/save unmodified; no
    /// simulation module consults it.
    pub group_names: Vec<String>,

    /// Verbatim init tables for attached machines, kept so `save` can
    /// re-emit the exact table a machine was constructed from rather than
    /// invent a serialization of its current internal state.
    pub machine_init_data: HashMap<MachineId, toml::Table>,
}

impl Vehicle {
    #[must_use]
    pub fn new() -> Self {
        Self {
            parts: Vec::new(),
            pieces: PieceGraph::new(),
            groups: WeldedGroupArena::new(),
            machines: Vec::new(),
            pipes: Vec::new(),
            wires: WireMap::new(),
            pack_state: PackState::Packed,
            group_names: Vec::new(),
            machine_init_data: HashMap::new(),
        }
    }

    #[must_use]
    pub fn get_part(&self, id: PartId) -> Option<&Part> { self.parts.get(id.0 as usize)?.as_ref() }

    pub fn get_part_mut(&mut self, id: PartId) -> Option<&mut Part> { self.parts.get_mut(id.0 as usize)?.as_mut() }

    /// Inserts a part at its declared id, growing the arena as needed.
    pub fn insert_part(&mut self, part: Part) {
        let index = part.id.0 as usize;
        if self.parts.len() <= index {
            self.parts.resize_with(index + 1, || None);
        }
        self.parts[index] = Some(part);
    }

    /// Registers a machine, returning the [`MachineId`] it was assigned.
    ///
    /// Machines live in a flat per-vehicle arena (§9 re-shaping note) so
    /// pipes and wires can reference them by plain index regardless of
    /// which part declared or attached them.
    pub fn register_machine(&mut self, machine: Box<dyn Machine>) -> MachineId {
        let id = MachineId(self.machines.len() as u32);
        self.machines.push(Some(machine));
        id
    }

    #[must_use]
    pub fn get_machine(&self, id: MachineId) -> Option<&dyn Machine> {
        self.machines.get(id.0 as usize)?.as_deref()
    }

    pub fn get_machine_mut(&mut self, id: MachineId) -> Option<&mut (dyn Machine + 'static)> {
        self.machines.get_mut(id.0 as usize)?.as_deref_mut()
    }

    pub fn iter_parts(&self) -> impl Iterator<Item = &Part> { self.parts.iter().filter_map(Option::as_ref) }
}

impl Default for Vehicle {
    fn default() -> Self { Self::new() }
}

impl MachineRegistry for Vehicle {
    fn plumbing(&self, id: MachineId) -> &dyn PlumbingMachine {
        self.get_machine(id)
            .and_then(Machine::plumbing)
            .unwrap_or_else(|| panic!("machine {id:?} referenced by the plumbing network has no plumbing view"))
    }

    fn plumbing_mut(&mut self, id: MachineId) -> &mut dyn PlumbingMachine {
        let found = self.machines.get_mut(id.0 as usize).and_then(Option::as_deref_mut);
        found
            .and_then(Machine::plumbing_mut)
            .unwrap_or_else(|| panic!("machine {id:?} referenced by the plumbing network has no plumbing view"))
    }
}
