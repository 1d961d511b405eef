//! The symmetric signal-wire multimap between machines (§4.4, §3 `Wire`).

use std::collections::HashMap;

use crate::machine::MachineId;

/// An undirected, symmetric `machine → machine` multimap.
///
/// Inserting `(a, b)` also inserts `(b, a)`; inserting either direction
/// again is a rejected no-op (§3 `Wire`, §8 testable property 4).
#[derive(Debug, Default)]
pub struct WireMap {
    edges: HashMap<MachineId, Vec<MachineId>>,
}

impl WireMap {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Inserts both `(a, b)` and `(b, a)`.
    ///
    /// Returns `false` without mutating anything if either direction was
    /// already present; the caller is expected to warn on a rejected
    /// duplicate (§7: "duplicate wire ... warn and drop the duplicate").
    pub fn insert(&mut self, a: MachineId, b: MachineId) -> bool {
        if self.contains(a, b) {
            return false;
        }
        self.edges.entry(a).or_default().push(b);
        self.edges.entry(b).or_default().push(a);
        true
    }

    #[must_use]
    pub fn contains(&self, a: MachineId, b: MachineId) -> bool {
        self.edges.get(&a).is_some_and(|peers| peers.contains(&b))
    }

    #[must_use]
    pub fn connections(&self, machine: MachineId) -> &[MachineId] {
        self.edges.get(&machine).map_or(&[], Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_symmetric_and_rejects_duplicates() {
        let mut wires = WireMap::new();
        let a = MachineId(0);
        let b = MachineId(1);

        assert!(wires.insert(a, b));
        assert!(wires.contains(a, b));
        assert!(wires.contains(b, a));

        assert!(!wires.insert(a, b));
        assert!(!wires.insert(b, a));
        assert_eq!(wires.connections(a), &[b]);
        assert_eq!(wires.connections(b), &[a]);
    }
}
