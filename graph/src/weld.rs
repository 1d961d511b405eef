//! A rigid body shared by two or more weld-connected pieces (§3 `WeldedGroup`).

use crate::piece::PieceId;
use crate::rigid_body::{MotionStateHandle, RigidBodyHandle};

/// Identifies a welded group within a vehicle's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WeldedGroupId(pub u32);

/// An ordered, non-empty set of pieces sharing one rigid body and one
/// motion state.
///
/// Exists iff the group has at least two members; a piece that is not
/// welded to anything owns its rigid body alone and has no `WeldedGroup`
/// (§3). The order of `members` is insertion order, matching the groups
/// produced by [`crate::weld_builder::rebuild`]; it has no physical
/// significance but keeps rebuilds reproducible (§4.2, determinism).
#[derive(Debug, Clone)]
pub struct WeldedGroup {
    pub members: Vec<PieceId>,
    pub rigid_body: RigidBodyHandle,
    pub motion_state: MotionStateHandle,
}

impl WeldedGroup {
    /// Whether `piece` is a member of this group.
    #[must_use]
    pub fn contains(&self, piece: PieceId) -> bool { self.members.contains(&piece) }

    /// Whether this group has exactly the same member set as `other`,
    /// ignoring order (§4.2 step 4, reconciliation test).
    #[must_use]
    pub fn same_members(&self, other: &[PieceId]) -> bool {
        self.members.len() == other.len() && other.iter().all(|p| self.members.contains(p))
    }
}

/// The arena of welded groups belonging to one vehicle, addressed by stable
/// [`WeldedGroupId`] (§9 re-shaping note, same rationale as [`crate::graph::PieceGraph`]).
#[derive(Debug, Default)]
pub struct WeldedGroupArena {
    groups: Vec<Option<WeldedGroup>>,
}

impl WeldedGroupArena {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn get(&self, id: WeldedGroupId) -> Option<&WeldedGroup> {
        self.groups.get(id.0 as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, id: WeldedGroupId) -> Option<&mut WeldedGroup> {
        self.groups.get_mut(id.0 as usize)?.as_mut()
    }

    pub fn insert(&mut self, group: WeldedGroup) -> WeldedGroupId {
        let id = WeldedGroupId(self.groups.len() as u32);
        self.groups.push(Some(group));
        id
    }

    /// Removes a group, returning it so the caller can tear down its rigid
    /// body via [`crate::rigid_body::RigidBodyWorld::remove_body`].
    pub fn remove(&mut self, id: WeldedGroupId) -> Option<WeldedGroup> {
        self.groups.get_mut(id.0 as usize)?.take()
    }

    pub fn iter(&self) -> impl Iterator<Item = (WeldedGroupId, &WeldedGroup)> {
        self.groups
            .iter()
            .enumerate()
            .filter_map(|(i, g)| g.as_ref().map(|g| (WeldedGroupId(i as u32), g)))
    }
}
