//! Rebuilds the exact set of [`WeldedGroup`]s that reflects current weld
//! topology, preserving linear/angular state across the rebuild (§4.2).

use std::collections::HashMap;

use shipcore_base::math::{Transform, Vec3};

use crate::collider::CompoundChild;
use crate::graph::PieceGraph;
use crate::inertia::{compute_principal_frame, MassElement};
use crate::piece::PieceId;
use crate::rigid_body::{BodySpec, KinematicSnapshot, RigidBodyWorld};
use crate::weld::{WeldedGroup, WeldedGroupArena};

/// Runs one rebuild pass over `graph`, reconciling `groups` against the
/// current weld topology (§4.2).
///
/// Expected to be invoked only when topology changed; the rebuild is
/// `O(n_pieces)`.
///
/// # Panics
/// Panics (aborting the rebuild, per §4.2 failure semantics) if a piece is
/// unreachable from root, has a null collider handle, or a non-finite mass.
/// `PieceGraph::validate_reachability` should be called first by the
/// caller to convert that failure mode into a named diagnostic; this
/// function itself asserts the narrower preconditions it directly depends
/// on.
pub fn rebuild(graph: &mut PieceGraph, groups: &mut WeldedGroupArena, world: &mut dyn RigidBodyWorld) {
    graph.validate_reachability();

    // Step 1: snapshot every piece's kinematics before anything is torn down.
    let snapshots: HashMap<PieceId, KinematicSnapshot> =
        graph.iter().map(|p| (p.id, snapshot_piece(graph, world, p.id))).collect();

    // Step 2: group by welds via union-find over the "welded to parent" relation.
    let new_groups = group_by_weld(graph);

    // Step 3: extract singletons; clear ownership on pieces that used to be grouped.
    let (multi, singletons): (Vec<_>, Vec<_>) = new_groups.into_iter().partition(|g| g.len() >= 2);
    for &piece_id in singletons.iter().flatten() {
        let piece = graph.get_mut(piece_id).expect("piece vanished mid-rebuild");
        if piece.group.is_some() {
            piece.rigid_body = None;
            piece.motion_state = None;
            piece.group = None;
        }
    }

    // Step 4: reconcile against the existing group list.
    let surviving: Vec<_> =
        multi.iter().filter(|members| groups.iter().any(|(_, g)| g.same_members(members))).cloned().collect();
    let stale_ids: Vec<_> = groups
        .iter()
        .filter(|(_, g)| !surviving.iter().any(|members| g.same_members(members)))
        .map(|(id, _)| id)
        .collect();
    for id in stale_ids {
        let group = groups.remove(id).expect("stale group id must exist");
        world.remove_body(group.rigid_body, group.motion_state);
    }

    // Step 5: create new rigid bodies for newly appearing groups.
    for members in multi {
        if groups.iter().any(|(_, g)| g.same_members(&members)) {
            continue; // survived reconciliation, nothing to do
        }
        create_group(graph, groups, world, &members, &snapshots);
    }

    // Step 6: create lone-piece bodies for every singleton still missing one.
    for &piece_id in singletons.iter().flatten() {
        let needs_body = graph.get(piece_id).expect("piece vanished mid-rebuild").rigid_body.is_none();
        if needs_body {
            create_lone_body(graph, world, piece_id, &snapshots);
        }
    }
}

fn snapshot_piece(graph: &PieceGraph, world: &dyn RigidBodyWorld, id: PieceId) -> KinematicSnapshot {
    let piece = graph.get(id).expect("snapshot of piece outside graph");
    if let Some(body) = piece.rigid_body {
        let mut snap = world.snapshot(body);
        if piece.group.is_some() {
            // The body transform is the group's motion state; the piece's own
            // global transform also accounts for its offset within the group.
            snap.transform = snap.transform * piece.welded_tform;
        }
        snap
    } else {
        // Never had a body (still packed, or brand new): derive the global
        // transform by composing packed_tform up the attachment chain.
        KinematicSnapshot {
            transform: global_packed_transform(graph, id),
            linear_velocity: Vec3::zeros(),
            angular_velocity: Vec3::zeros(),
        }
    }
}

fn global_packed_transform(graph: &PieceGraph, id: PieceId) -> Transform {
    let piece = graph.get(id).expect("piece outside graph");
    match piece.attached_to {
        Some(parent) => global_packed_transform(graph, parent) * piece.packed_tform,
        None => piece.packed_tform,
    }
}

/// Groups pieces by the "welded to parent" relation via union-find,
/// returning groups in first-encounter order for determinism (§4.2 step 2).
fn group_by_weld(graph: &PieceGraph) -> Vec<Vec<PieceId>> {
    let mut parent: HashMap<PieceId, PieceId> = graph.iter().map(|p| (p.id, p.id)).collect();

    fn find(parent: &mut HashMap<PieceId, PieceId>, x: PieceId) -> PieceId {
        if parent[&x] == x {
            return x;
        }
        let root = find(parent, parent[&x]);
        parent.insert(x, root);
        root
    }

    for piece in graph.iter() {
        if piece.welded {
            let a = piece.attached_to.expect("welded piece must have attached_to");
            let ra = find(&mut parent, a);
            let rb = find(&mut parent, piece.id);
            if ra != rb {
                parent.insert(rb, ra);
            }
        }
    }

    let mut by_root: HashMap<PieceId, usize> = HashMap::new();
    let mut groups: Vec<Vec<PieceId>> = Vec::new();
    for piece in graph.iter() {
        let root = find(&mut parent, piece.id);
        let index = *by_root.entry(root).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[index].push(piece.id);
    }
    groups
}

fn create_group(
    graph: &mut PieceGraph,
    groups: &mut WeldedGroupArena,
    world: &mut dyn RigidBodyWorld,
    members: &[PieceId],
    snapshots: &HashMap<PieceId, KinematicSnapshot>,
) {
    let elements: Vec<MassElement> = members
        .iter()
        .map(|&id| {
            let piece = graph.get(id).expect("group member vanished");
            assert!(piece.mass.is_finite() && piece.mass > 0.0, "piece {:?} has non-finite mass", id);
            let snap = &snapshots[&id];
            MassElement {
                mass: piece.mass,
                local_inertia: world.local_inertia(piece.collider, piece.mass).tensor,
                transform: snap.transform,
            }
        })
        .collect();

    let frame = compute_principal_frame(&elements);
    let principal_inverse = frame.transform.inverse();

    let children: Vec<CompoundChild> = members
        .iter()
        .map(|&id| {
            let piece = graph.get(id).expect("group member vanished");
            CompoundChild {
                shape: piece.collider,
                transform: principal_inverse * snapshots[&id].transform,
                mass: piece.mass,
            }
        })
        .collect();

    let compound = world.make_compound(&children);
    let (body, motion_state) = world.add_body(BodySpec {
        collider: compound,
        mass: frame.total_mass,
        local_inertia: frame.local_inertia,
        motion_state_transform: frame.transform,
        deactivation_disabled: true,
    });

    // Restore dynamics: linear impulse = sum(mass * linear), angular velocity
    // = average of snapshot angulars (§4.2 step 5f; approximation documented
    // as an open question in §9).
    let linear_impulse: Vec3 = members
        .iter()
        .fold(Vec3::zeros(), |acc, id| acc + snapshots[id].linear_velocity * graph.get(*id).unwrap().mass);
    world.apply_linear_impulse(body, linear_impulse);
    let angular_sum: Vec3 =
        members.iter().fold(Vec3::zeros(), |acc, id| acc + snapshots[id].angular_velocity);
    world.set_angular_velocity(body, angular_sum / members.len() as f64);

    let group_id = groups.insert(WeldedGroup { members: members.to_vec(), rigid_body: body, motion_state });

    for (&id, child) in members.iter().zip(&children) {
        let piece = graph.get_mut(id).expect("group member vanished");
        piece.rigid_body = Some(body);
        piece.motion_state = Some(motion_state);
        piece.group = Some(group_id);
        piece.welded_tform = child.transform;
    }
}

fn create_lone_body(
    graph: &mut PieceGraph,
    world: &mut dyn RigidBodyWorld,
    id: PieceId,
    snapshots: &HashMap<PieceId, KinematicSnapshot>,
) {
    let piece = graph.get(id).expect("lone piece vanished");
    assert!(piece.mass.is_finite() && piece.mass > 0.0, "piece {:?} has non-finite mass", id);
    let snap = snapshots[&id];
    let local_inertia = world.local_inertia(piece.collider, piece.mass).tensor;

    let (body, motion_state) = world.add_body(BodySpec {
        collider: piece.collider,
        mass: piece.mass,
        local_inertia,
        motion_state_transform: snap.transform,
        deactivation_disabled: true,
    });

    world.apply_linear_impulse(body, snap.linear_velocity * piece.mass);
    world.set_angular_velocity(body, snap.angular_velocity);

    let piece = graph.get_mut(id).expect("lone piece vanished");
    piece.rigid_body = Some(body);
    piece.motion_state = Some(motion_state);
    piece.group = None;
}
