//! A logical unit instantiated from a part prototype (§3 `Part`, §4.4).

use std::collections::HashMap;

use shipcore_fluid::MachineId;
use shipcore_graph::{PartId, PieceId};

/// A part's synthetic name for an attached machine at index `i` (§4.4:
/// `"_attached_{i}"`).
#[must_use]
pub fn attached_machine_name(index: usize) -> String { format!("_attached_{index}") }

/// A logical aggregation of pieces instantiated from a `PartPrototype`
/// (§3 `Part`).
#[derive(Debug, Clone)]
pub struct Part {
    pub id: PartId,
    pub proto: String,
    pub group_id: Option<i32>,

    /// The prototype's named piece nodes (§3: "a mapping `name → Piece`").
    pub piece_names: HashMap<String, PieceId>,

    /// Machines declared by the prototype, keyed by their id in the file
    /// format.
    pub declared_machines: HashMap<String, MachineId>,

    /// Machines dynamically added at load time, in insertion order.
    pub attached_machines: Vec<MachineId>,
}

impl Part {
    #[must_use]
    pub fn new(id: PartId, proto: String) -> Self {
        Self {
            id,
            proto,
            group_id: None,
            piece_names: HashMap::new(),
            declared_machines: HashMap::new(),
            attached_machines: Vec::new(),
        }
    }

    /// Looks up a machine by id across declared and attached machines
    /// (§4.4: "exposes `get_machine(id)` across the union of declared and
    /// attached machines").
    #[must_use]
    pub fn get_machine(&self, id: &str) -> Option<MachineId> {
        if let Some(&machine) = self.declared_machines.get(id) {
            return Some(machine);
        }
        for (index, &machine) in self.attached_machines.iter().enumerate() {
            if attached_machine_name(index) == id {
                return Some(machine);
            }
        }
        None
    }

    /// Yields every machine's synthetic or declared name alongside its id,
    /// declared machines first then attached machines in insertion order
    /// (§4.4: `get_all_machines()`).
    pub fn get_all_machines(&self) -> impl Iterator<Item = (String, MachineId)> + '_ {
        self.declared_machines
            .iter()
            .map(|(name, &id)| (name.clone(), id))
            .chain(self.attached_machines.iter().enumerate().map(|(i, &id)| (attached_machine_name(i), id)))
    }
}
