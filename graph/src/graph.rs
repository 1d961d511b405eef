//! The forest of pieces and navigation over it (§4.1 Piece Graph).

use crate::piece::{Piece, PieceId};

/// The forest of pieces belonging to one vehicle, rooted at [`PieceGraph::root`].
///
/// Pieces are stored in an arena addressed by stable index (§9 re-shaping
/// note: "pieces ... stored in vectors addressed by stable indices"), so
/// that back-pointers such as a welded group's member list or a link's
/// `from`/`to` can be plain [`PieceId`]s instead of cyclic references.
/// Removed pieces leave a tombstone so ids already handed out never change
/// meaning.
#[derive(Debug, Default)]
pub struct PieceGraph {
    pieces: Vec<Option<Piece>>,
    /// The root piece, or `None` for an empty graph.
    pub root: Option<PieceId>,
}

impl PieceGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Looks up a piece by id.
    #[must_use]
    pub fn get(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id.0 as usize)?.as_ref()
    }

    /// Looks up a piece by id, mutably.
    pub fn get_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        self.pieces.get_mut(id.0 as usize)?.as_mut()
    }

    /// Inserts `piece` into the graph, attached to `attached_to`.
    ///
    /// Rejects the insertion (returning the piece back) if `attached_to` is
    /// `Some` and either does not belong to this graph, or attaching to it
    /// would create a cycle. The first piece ever inserted becomes the root
    /// regardless of its `attached_to` field, which is cleared.
    ///
    /// # Panics
    /// Panics if the graph is non-empty and `attached_to` is `None`: every
    /// non-root piece must declare an attachment point (§3 invariant).
    pub fn add_piece(&mut self, mut piece: Piece) -> Result<PieceId, Piece> {
        let id = piece.id;

        if self.root.is_none() {
            piece.attached_to = None;
            let index = id.0 as usize;
            if self.pieces.len() <= index {
                self.pieces.resize_with(index + 1, || None);
            }
            self.pieces[index] = Some(piece);
            self.root = Some(id);
            return Ok(id);
        }

        let Some(parent) = piece.attached_to else {
            panic!("non-root piece {:?} must declare attached_to", id);
        };
        if self.get(parent).is_none() {
            return Err(piece);
        }
        if self.would_cycle(parent, id) {
            return Err(piece);
        }

        let index = id.0 as usize;
        if self.pieces.len() <= index {
            self.pieces.resize_with(index + 1, || None);
        }
        self.pieces[index] = Some(piece);
        Ok(id)
    }

    /// Whether attaching `candidate` underneath `parent` would create a
    /// cycle, i.e. `parent`'s ancestry already passes through `candidate`.
    fn would_cycle(&self, mut parent: PieceId, candidate: PieceId) -> bool {
        let bound = self.pieces.len();
        for _ in 0..=bound {
            if parent == candidate {
                return true;
            }
            match self.get(parent).and_then(|p| p.attached_to) {
                Some(next) => parent = next,
                None => return false,
            }
        }
        // Exceeded the step bound: the existing graph already contains a
        // cycle, which should be impossible if add_piece always rejected one.
        true
    }

    /// Clears `p.attached_to`. The caller is responsible for running a
    /// separation sweep afterwards (§4.1, §4.3); this method only mutates
    /// the topology.
    ///
    /// # Panics
    /// Panics if `p` is the root piece: the root has no link to break.
    pub fn break_link(&mut self, p: PieceId) {
        let piece = self.get_mut(p).expect("break_link on piece outside this graph");
        assert!(piece.attached_to.is_some(), "cannot break the root piece's link");
        piece.attached_to = None;
        piece.welded = false;
        piece.link = None;
    }

    /// Removes and returns a piece, leaving a tombstone so other ids are
    /// unaffected (§4.3 step 3: "remove every grouped piece from V").
    ///
    /// Clears `root` if the removed piece was the root; the caller is
    /// expected to only do this as part of tearing a vehicle down entirely.
    pub fn remove_piece(&mut self, id: PieceId) -> Option<Piece> {
        let removed = self.pieces.get_mut(id.0 as usize)?.take();
        if removed.is_some() && self.root == Some(id) {
            self.root = None;
        }
        removed
    }

    /// Iterates over every live piece exactly once, in arena order.
    pub fn iter(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter().filter_map(Option::as_ref)
    }

    /// Iterates over every live piece exactly once, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Piece> {
        self.pieces.iter_mut().filter_map(Option::as_mut)
    }

    /// The number of live pieces in the graph.
    #[must_use]
    pub fn len(&self) -> usize { self.pieces.iter().filter(|p| p.is_some()).count() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Depth-first walk starting from `start`, visiting children in
    /// insertion order for reproducibility (§4.1).
    #[must_use]
    pub fn walk_from(&self, start: PieceId) -> Vec<PieceId> {
        // Children are not indexed explicitly (pieces only store their
        // parent), so the walk is built from the parent map: an
        // attached_to-ordered pass collecting every piece's ancestry chain
        // up to `start` would be quadratic, so instead we do a single pass
        // building a children adjacency list, then DFS it.
        let mut children: std::collections::HashMap<PieceId, Vec<PieceId>> =
            std::collections::HashMap::new();
        for piece in self.iter() {
            if let Some(parent) = piece.attached_to {
                children.entry(parent).or_default().push(piece.id);
            }
        }

        let mut order = Vec::with_capacity(self.len());
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some(kids) = children.get(&id) {
                // push_back-then-pop (a stack) reverses order, so push in
                // reverse to keep the visit order matching insertion order.
                for &kid in kids.iter().rev() {
                    stack.push(kid);
                }
            }
        }
        order
    }

    /// Validates that every piece reaches `root` via `attached_to` within
    /// `|pieces|` steps (§4.1 invariant, testable property 1).
    ///
    /// # Panics
    /// Panics naming the offending piece if the invariant does not hold;
    /// this is the kind of runtime invariant violation §7 calls fatal.
    pub fn validate_reachability(&self) {
        let Some(root) = self.root else {
            assert!(self.is_empty(), "non-empty graph must have a root");
            return;
        };
        let bound = self.len();
        for piece in self.iter() {
            let mut current = piece.id;
            let mut steps = 0;
            while current != root {
                let next = self
                    .get(current)
                    .and_then(|p| p.attached_to)
                    .unwrap_or_else(|| panic!("piece {:?} cannot reach root {:?}", piece.id, root));
                current = next;
                steps += 1;
                assert!(
                    steps <= bound,
                    "piece {:?} did not reach root {:?} within {} steps",
                    piece.id,
                    root,
                    bound
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use shipcore_base::math::Transform;

    use super::*;
    use crate::collider::ColliderHandle;
    use crate::piece::PartId;

    fn piece(id: u32, attached_to: Option<PieceId>) -> Piece {
        Piece {
            id: PieceId(id),
            part: PartId(id),
            piece_prototype: "test:cube".into(),
            mass: 1.0,
            collider: ColliderHandle(id),
            attached_to,
            welded: false,
            editor_dettachable: true,
            link: None,
            from_attachment: None,
            to_attachment: None,
            link_pfrom: None,
            link_pto: None,
            packed_tform: Transform::identity(),
            welded_tform: Transform::identity(),
            rigid_body: None,
            motion_state: None,
            group: None,
        }
    }

    #[test]
    fn reachability_holds_for_a_chain() {
        let mut graph = PieceGraph::new();
        let root = graph.add_piece(piece(0, None)).unwrap();
        let a = graph.add_piece(piece(1, Some(root))).unwrap();
        graph.add_piece(piece(2, Some(a))).unwrap();
        graph.validate_reachability();
    }

    #[test]
    fn rejects_cycles() {
        let mut graph = PieceGraph::new();
        let root = graph.add_piece(piece(0, None)).unwrap();
        let a = graph.add_piece(piece(1, Some(root))).unwrap();

        let mut cyclic = piece(0, Some(a));
        cyclic.id = root; // would attach root to its own descendant
        assert!(graph.add_piece(cyclic).is_err());
    }

    #[test]
    fn walk_from_is_depth_first_by_insertion_order() {
        let mut graph = PieceGraph::new();
        let root = graph.add_piece(piece(0, None)).unwrap();
        let a = graph.add_piece(piece(1, Some(root))).unwrap();
        let b = graph.add_piece(piece(2, Some(root))).unwrap();
        let c = graph.add_piece(piece(3, Some(a))).unwrap();

        assert_eq!(graph.walk_from(root), vec![root, a, c, b]);
    }

    #[test]
    fn break_link_clears_weld_and_attachment() {
        let mut graph = PieceGraph::new();
        let root = graph.add_piece(piece(0, None)).unwrap();
        let a = graph.add_piece(piece(1, Some(root))).unwrap();
        graph.break_link(a);
        assert!(graph.get(a).unwrap().attached_to.is_none());
    }
}
