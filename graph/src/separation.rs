//! Splits a vehicle's piece graph into disjoint vehicles once one or more
//! pieces have come loose from the root (§4.3 Separation Detector).

use std::collections::HashMap;

use crate::graph::PieceGraph;
use crate::piece::{Piece, PieceId};

/// A group of pieces that separated together, seeded by the piece whose
/// link broke.
///
/// `pieces` is in an order safe to replay through
/// [`PieceGraph::add_piece`]: the seed first (becoming the new root), then
/// every other member with its `attached_to` parent already present.
#[derive(Debug)]
pub struct SeparatedGroup {
    pub seed: PieceId,
    pub pieces: Vec<Piece>,
}

/// Detects pieces detached from `graph`'s root and removes them from it,
/// returning one [`SeparatedGroup`] per resulting fragment in seed-discovery
/// order (§4.3, determinism: "iteration order of pieces matches insertion
/// order; group indices are assigned in that order").
///
/// `graph` keeps whatever is still connected to its original root; the
/// caller turns each returned group into a new vehicle with its seed as
/// root.
pub fn detect_separations(graph: &mut PieceGraph) -> Vec<SeparatedGroup> {
    let Some(root) = graph.root else { return Vec::new() };

    // Step 1: seed one group per detached piece.
    let mut group_of: HashMap<PieceId, usize> = HashMap::new();
    let mut member_order: Vec<Vec<PieceId>> = Vec::new();
    let mut seeds: Vec<PieceId> = Vec::new();
    for piece in graph.iter() {
        if piece.id != root && piece.attached_to.is_none() {
            group_of.insert(piece.id, member_order.len());
            member_order.push(vec![piece.id]);
            seeds.push(piece.id);
        }
    }

    if seeds.is_empty() {
        return Vec::new();
    }

    // Step 2: iteratively absorb pieces whose parent already belongs to a group.
    loop {
        let mut added = false;
        for piece in graph.iter() {
            if group_of.contains_key(&piece.id) {
                continue;
            }
            if let Some(parent) = piece.attached_to {
                if let Some(&group_index) = group_of.get(&parent) {
                    group_of.insert(piece.id, group_index);
                    member_order[group_index].push(piece.id);
                    added = true;
                }
            }
        }
        if !added {
            break;
        }
    }

    // Step 3 + 4: remove every grouped piece from the original graph and
    // collect its data into its group, seed first.
    let mut groups: Vec<SeparatedGroup> = seeds.iter().map(|&seed| SeparatedGroup { seed, pieces: Vec::new() }).collect();
    for (group_index, members) in member_order.into_iter().enumerate() {
        for piece_id in members {
            let piece = graph.remove_piece(piece_id).expect("grouped piece must exist");
            groups[group_index].pieces.push(piece);
        }
    }

    groups
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
    fn no_detachment_yields_no_groups() {
        let mut graph = PieceGraph::new();
        let root = graph.add_piece(piece(0, None)).unwrap();
        graph.add_piece(piece(1, Some(root))).unwrap();
        let groups = detect_separations(&mut graph);
        assert!(groups.is_empty());
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn detached_branch_becomes_its_own_group() {
        let mut graph = PieceGraph::new();
        let root = graph.add_piece(piece(0, None)).unwrap();
        let a = graph.add_piece(piece(1, Some(root))).unwrap();
        let b = graph.add_piece(piece(2, Some(a))).unwrap();
        graph.break_link(a);

        let groups = detect_separations(&mut graph);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].seed, a);
        assert_eq!(groups[0].pieces.iter().map(|p| p.id).collect::<Vec<_>>(), vec![a, b]);

        assert_eq!(graph.len(), 1);
        assert!(graph.get(root).is_some());
        assert!(graph.get(a).is_none());
        assert!(graph.get(b).is_none());
    }

    #[test]
    fn two_separate_detachments_form_two_groups() {
        let mut graph = PieceGraph::new();
        let root = graph.add_piece(piece(0, None)).unwrap();
        let a = graph.add_piece(piece(1, Some(root))).unwrap();
        let b = graph.add_piece(piece(2, Some(root))).unwrap();
        graph.break_link(a);
        graph.break_link(b);

        let groups = detect_separations(&mut graph);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].seed, a);
        assert_eq!(groups[1].seed, b);
        assert_eq!(graph.len(), 1);
    }
}
