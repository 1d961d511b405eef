//! The on-disk vehicle file format: TOML tables for parts, pieces, wires and
//! pipes (§6.1), plus the packed-state persistence contract (§6.2).
//!
//! Pieces carry no mass or collider shape on disk; those come from the
//! (out-of-scope) asset/prototype system once a piece's `piece_prototype` is
//! resolved, so [`load`] leaves them at a zero placeholder for the caller to
//! fill in afterwards.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use shipcore_base::error::{LoadError, LoadResult};
use shipcore_base::math::{transform_from_row_major, transform_to_row_major, QuatTable, Transform, Vec3Table};
use shipcore_graph::{Link, PartId, Piece, PieceId};

use crate::factory::MachineFactory;
use crate::part::Part;
use crate::vehicle::{PackState, Vehicle};

#[derive(Debug, Deserialize, Serialize)]
struct VehicleFile {
    part_id: u32,
    piece_id: u32,
    #[serde(default)]
    group_names: Vec<String>,
    #[serde(default, rename = "part")]
    parts: Vec<PartTable>,
    #[serde(default, rename = "piece")]
    pieces: Vec<PieceTable>,
    #[serde(default, rename = "wire")]
    wires: Vec<WireTable>,
    #[serde(default, rename = "pipe")]
    pipes: Vec<PipeTable>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct PartTable {
    id: u32,
    #[serde(default = "default_group_id")]
    group_id: i32,
    proto: String,
    #[serde(default, rename = "attached_machine")]
    attached_machines: Vec<AttachedMachineTable>,
    #[serde(flatten)]
    machine_overrides: HashMap<String, MachineOverrideTable>,
}

fn default_group_id() -> i32 { -1 }

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
struct MachineOverrideTable {
    #[serde(default)]
    plumbing_rot: Option<i32>,
    #[serde(default)]
    plumbing_pos: Option<[i32; 2]>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct AttachedMachineTable {
    __attached_machine_id: u32,
    #[serde(flatten)]
    init: toml::Table,
}

#[derive(Debug, Deserialize, Serialize)]
struct PieceTable {
    id: u32,
    part: u32,
    node: String,
    #[serde(default)]
    root: bool,
    transform: [f64; 16],
    #[serde(default)]
    link: Option<LinkTable>,
}

#[derive(Debug, Deserialize, Serialize)]
struct LinkTable {
    to: u32,
    #[serde(default)]
    welded: bool,
    #[serde(default = "default_true")]
    editor_dettachable: bool,
    #[serde(default)]
    from_attachment: Option<String>,
    #[serde(default)]
    to_attachment: Option<String>,
    #[serde(default, rename = "type")]
    link_type: Option<String>,
    #[serde(default)]
    pfrom: Option<Vec3Table>,
    #[serde(default)]
    pto: Option<Vec3Table>,
    #[serde(default)]
    rot: Option<QuatTable>,
}

fn default_true() -> bool { true }

#[derive(Debug, Deserialize, Serialize)]
struct WireTable {
    from: u32,
    to: u32,
    fmachine: String,
    tmachine: String,
}

#[derive(Debug, Deserialize, Serialize)]
struct PipeTable {
    index: u32,
    from_part: u32,
    to_part: u32,
    #[serde(default)]
    from_machine: Option<String>,
    #[serde(default)]
    from_attached_machine: Option<u32>,
    #[serde(default)]
    to_machine: Option<String>,
    #[serde(default)]
    to_attached_machine: Option<u32>,
    from_port: String,
    to_port: String,
    #[serde(default)]
    waypoints: Vec<i32>,
}

fn resolve_part_machine(
    vehicle: &Vehicle,
    part_id: PartId,
    machine_name: Option<&str>,
    attached_index: Option<u32>,
) -> Option<shipcore_fluid::MachineId> {
    let part = vehicle.get_part(part_id)?;
    if let Some(name) = machine_name {
        part.get_machine(name)
    } else {
        part.attached_machines.get(attached_index? as usize).copied()
    }
}

/// Parses and validates a vehicle file, constructing machine behavior via
/// `factory` (§6.1).
///
/// Pieces are inserted into the resulting [`Vehicle`]'s piece graph in a
/// parent-before-child order derived from each piece's `link.to`, regardless
/// of their order in the file; this is required by
/// [`shipcore_graph::PieceGraph::add_piece`], which expects the attachment
/// target to already exist.
///
/// # Errors
/// Returns a [`LoadError`] naming the offending id for any malformed or
/// dangling reference (§7).
pub fn load(toml_str: &str, factory: &mut dyn MachineFactory) -> LoadResult<Vehicle> {
    let file: VehicleFile = toml::from_str(toml_str)?;

    if file.pieces.is_empty() {
        return Err(LoadError::NoPieces);
    }

    let mut vehicle = Vehicle::new();
    vehicle.group_names = file.group_names.clone();

    for part_table in &file.parts {
        if part_table.id > file.part_id {
            return Err(LoadError::PartIdOutOfRange { id: part_table.id, max: file.part_id });
        }

        let mut part = Part::new(PartId(part_table.id), part_table.proto.clone());
        part.group_id = (part_table.group_id >= 0).then_some(part_table.group_id);

        for (name, machine) in factory.declared_machines(&part_table.proto) {
            let mut machine = machine;
            if let Some(over) = part_table.machine_overrides.get(&name) {
                factory.apply_override(machine.as_mut(), over.plumbing_rot, over.plumbing_pos.map(|[x, y]| (x, y)));
            }
            let id = vehicle.register_machine(machine);
            part.declared_machines.insert(name, id);
        }

        let mut attached = part_table.attached_machines.clone();
        attached.sort_by_key(|m| m.__attached_machine_id);
        for (expected_index, attached_table) in attached.iter().enumerate() {
            assert_eq!(
                attached_table.__attached_machine_id as usize, expected_index,
                "attached machine ids on part {} are not dense starting at 0",
                part_table.id
            );
            let machine = factory.attached_machine(&attached_table.init);
            let id = vehicle.register_machine(machine);
            vehicle.machine_init_data.insert(id, attached_table.init.clone());
            part.attached_machines.push(id);
        }

        vehicle.insert_part(part);
    }

    let mut root_piece: Option<u32> = None;
    let mut piece_table_by_id: HashMap<u32, &PieceTable> = HashMap::new();
    for piece_table in &file.pieces {
        if piece_table.id > file.piece_id {
            return Err(LoadError::PieceIdOutOfRange { id: piece_table.id, max: file.piece_id });
        }
        piece_table_by_id.insert(piece_table.id, piece_table);
        if piece_table.root {
            if root_piece.is_some() {
                return Err(LoadError::MultipleRoots);
            }
            root_piece = Some(piece_table.id);
        }
    }
    let root_piece = root_piece.ok_or(LoadError::NoRoot)?;

    let mut children_of: HashMap<u32, Vec<u32>> = HashMap::new();
    for piece_table in &file.pieces {
        if piece_table.id == root_piece {
            continue;
        }
        let link =
            piece_table.link.as_ref().ok_or(LoadError::MissingLink { piece: piece_table.id })?;
        children_of.entry(link.to).or_default().push(piece_table.id);
    }

    let mut queue = VecDeque::new();
    queue.push_back(root_piece);
    let mut order = Vec::with_capacity(file.pieces.len());
    while let Some(current) = queue.pop_front() {
        order.push(current);
        if let Some(children) = children_of.get(&current) {
            for &child in children {
                queue.push_back(child);
            }
        }
    }
    if order.len() != file.pieces.len() {
        let reachable: HashSet<u32> = order.iter().copied().collect();
        let missing = file
            .pieces
            .iter()
            .find(|p| !reachable.contains(&p.id))
            .expect("length mismatch implies an unreachable piece exists");
        return Err(LoadError::DanglingReference { kind: "piece.link.to", target: "piece", id: missing.id });
    }

    for piece_id in order {
        let piece_table = piece_table_by_id[&piece_id];
        let transform = transform_from_row_major(&piece_table.transform)
            .map_err(|err| LoadError::InvalidPieceTransform { piece: piece_table.id, reason: err.to_string() })?;

        let part_id = PartId(piece_table.part);
        if vehicle.get_part(part_id).is_none() {
            return Err(LoadError::DanglingReference { kind: "piece.part", target: "part", id: piece_table.part });
        }

        let (attached_to, welded, editor_dettachable, link, from_attachment, to_attachment, link_pfrom, link_pto) =
            if piece_id == root_piece {
                (None, false, true, None, None, None, None, None)
            } else {
                let link_table = piece_table.link.as_ref().expect("validated while building the attachment order");
                let link = (link_table.link_type.as_deref() != Some("none")).then(|| Link {
                    from: PieceId(piece_table.id),
                    to: PieceId(link_table.to),
                    rot: link_table.rot.map(Into::into).unwrap_or_default(),
                });
                (
                    Some(PieceId(link_table.to)),
                    link_table.welded,
                    link_table.editor_dettachable,
                    link,
                    link_table.from_attachment.clone(),
                    link_table.to_attachment.clone(),
                    link_table.pfrom.map(Into::into),
                    link_table.pto.map(Into::into),
                )
            };

        let piece = Piece {
            id: PieceId(piece_table.id),
            part: part_id,
            piece_prototype: piece_table.node.clone(),
            mass: 0.0,
            collider: shipcore_graph::ColliderHandle(0),
            attached_to,
            welded,
            editor_dettachable,
            link,
            from_attachment,
            to_attachment,
            link_pfrom,
            link_pto,
            packed_tform: transform,
            welded_tform: Transform::identity(),
            rigid_body: None,
            motion_state: None,
            group: None,
        };

        vehicle
            .pieces
            .add_piece(piece)
            .map_err(|_| LoadError::CyclicAttachment {
                piece: piece_table.id,
                attached_to: attached_to.map_or(0, |p| p.0),
            })?;

        if let Some(part) = vehicle.get_part_mut(part_id) {
            part.piece_names.insert(piece_table.node.clone(), PieceId(piece_table.id));
        }
    }

    for wire in &file.wires {
        let from_machine = resolve_part_machine(&vehicle, PartId(wire.from), Some(&wire.fmachine), None)
            .ok_or(LoadError::DanglingReference { kind: "wire.from", target: "machine", id: wire.from })?;
        let to_machine = resolve_part_machine(&vehicle, PartId(wire.to), Some(&wire.tmachine), None)
            .ok_or(LoadError::DanglingReference { kind: "wire.to", target: "machine", id: wire.to })?;
        if !vehicle.wires.insert(from_machine, to_machine) {
            log::warn!("duplicate wire between part {} and part {} dropped", wire.from, wire.to);
        }
    }

    let mut pipes_by_index: Vec<Option<shipcore_fluid::Pipe>> = Vec::new();
    for pipe_table in &file.pipes {
        let index = pipe_table.index as usize;
        if pipes_by_index.len() <= index {
            pipes_by_index.resize_with(index + 1, || None);
        }

        let a_machine = resolve_part_machine(
            &vehicle,
            PartId(pipe_table.from_part),
            pipe_table.from_machine.as_deref(),
            pipe_table.from_attached_machine,
        )
        .ok_or_else(|| LoadError::DanglingPortReference {
            pipe_index: pipe_table.index,
            side: "a",
            machine: pipe_table.from_machine.clone().unwrap_or_default(),
            port: pipe_table.from_port.clone(),
        })?;
        let b_machine = resolve_part_machine(
            &vehicle,
            PartId(pipe_table.to_part),
            pipe_table.to_machine.as_deref(),
            pipe_table.to_attached_machine,
        )
        .ok_or_else(|| LoadError::DanglingPortReference {
            pipe_index: pipe_table.index,
            side: "b",
            machine: pipe_table.to_machine.clone().unwrap_or_default(),
            port: pipe_table.to_port.clone(),
        })?;

        let waypoints = pipe_table.waypoints.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect();

        pipes_by_index[index] = Some(shipcore_fluid::Pipe {
            a: shipcore_fluid::PipeEndpoint { machine: a_machine, port: pipe_table.from_port.clone() },
            b: shipcore_fluid::PipeEndpoint { machine: b_machine, port: pipe_table.to_port.clone() },
            waypoints,
            flow: 0.0,
            surface: 0.0,
        });
    }
    vehicle.pipes = pipes_by_index
        .into_iter()
        .enumerate()
        .map(|(i, p)| p.unwrap_or_else(|| panic!("pipe index {i} is missing from a file claiming a dense 0..N array")))
        .collect();

    vehicle.pack_state = PackState::Packed;
    Ok(vehicle)
}

/// Serializes a packed vehicle back to its TOML file format (§6.1 saver
/// contract, §6.2).
///
/// Pieces, parts and machines are renumbered with fresh sequential ids
/// starting at 1, in arena iteration order; a vehicle saved and reloaded is
/// equivalent up to that renumbering, not byte-identical to its source file.
///
/// # Errors
/// Returns [`LoadError::VehicleNotPacked`] if the vehicle is currently
/// unpacked (§6.2: only packed transforms are persisted).
pub fn save(vehicle: &Vehicle) -> LoadResult<String> {
    if vehicle.pack_state != PackState::Packed {
        return Err(LoadError::VehicleNotPacked);
    }

    let mut piece_ids = shipcore_base::save::IdAllocator::<Piece>::default();
    let mut piece_renumber: HashMap<PieceId, u32> = HashMap::new();
    for piece in vehicle.pieces.iter() {
        piece_renumber.insert(piece.id, piece_ids.alloc().raw());
    }

    let mut part_ids = shipcore_base::save::IdAllocator::<Part>::default();
    let mut part_renumber: HashMap<PartId, u32> = HashMap::new();
    for part in vehicle.iter_parts() {
        part_renumber.insert(part.id, part_ids.alloc().raw());
    }

    let mut parts_out = Vec::new();
    for part in vehicle.iter_parts() {
        let mut machine_overrides = HashMap::new();
        for (name, &machine_id) in &part.declared_machines {
            if let Some(plumbing) = vehicle.get_machine(machine_id).and_then(shipcore_fluid::Machine::plumbing) {
                let (x, y) = plumbing.editor_pos();
                machine_overrides.insert(
                    name.clone(),
                    MachineOverrideTable { plumbing_rot: Some(plumbing.editor_rot()), plumbing_pos: Some([x, y]) },
                );
            }
        }

        let attached_machines = part
            .attached_machines
            .iter()
            .enumerate()
            .map(|(index, &machine_id)| AttachedMachineTable {
                __attached_machine_id: index as u32,
                init: vehicle.machine_init_data.get(&machine_id).cloned().unwrap_or_default(),
            })
            .collect();

        parts_out.push(PartTable {
            id: part_renumber[&part.id],
            group_id: part.group_id.unwrap_or(-1),
            proto: part.proto.clone(),
            attached_machines,
            machine_overrides,
        });
    }

    let root = vehicle.pieces.root.expect("a packed vehicle always has a root piece");
    let mut pieces_out = Vec::new();
    for piece in vehicle.pieces.iter() {
        let link = piece.attached_to.map(|to| LinkTable {
            to: piece_renumber[&to],
            welded: piece.welded,
            editor_dettachable: piece.editor_dettachable,
            from_attachment: piece.from_attachment.clone(),
            to_attachment: piece.to_attachment.clone(),
            link_type: piece.link.is_none().then(|| "none".to_string()),
            pfrom: piece.link_pfrom.map(Into::into),
            pto: piece.link_pto.map(Into::into),
            rot: piece.link.map(|link| link.rot.into()),
        });

        pieces_out.push(PieceTable {
            id: piece_renumber[&piece.id],
            part: part_renumber[&piece.part],
            node: piece.piece_prototype.clone(),
            root: piece.id == root,
            transform: transform_to_row_major(&piece.packed_tform),
            link,
        });
    }
    pieces_out.sort_by_key(|p| p.id);

    let mut wires_out = Vec::new();
    let mut wire_emitted: HashSet<(u32, u32)> = HashSet::new();
    for part in vehicle.iter_parts() {
        for (name, machine_id) in part.get_all_machines() {
            for &peer in vehicle.wires.connections(machine_id) {
                let Some((peer_part, peer_name)) =
                    vehicle.iter_parts().find_map(|p| p.get_all_machines().find(|(_, id)| *id == peer).map(|(n, _)| (p.id, n)))
                else {
                    continue;
                };
                let key = (machine_id.0.min(peer.0), machine_id.0.max(peer.0));
                if !wire_emitted.insert(key) {
                    continue;
                }
                wires_out.push(WireTable {
                    from: part_renumber[&part.id],
                    to: part_renumber[&peer_part],
                    fmachine: name.clone(),
                    tmachine: peer_name,
                });
            }
        }
    }

    let mut pipes_out = Vec::with_capacity(vehicle.pipes.len());
    for (index, pipe) in vehicle.pipes.iter().enumerate() {
        let (from_part, from_machine, from_attached) = locate_machine(vehicle, pipe.a.machine);
        let (to_part, to_machine, to_attached) = locate_machine(vehicle, pipe.b.machine);
        let mut waypoints = Vec::with_capacity(pipe.waypoints.len() * 2);
        for (x, y) in &pipe.waypoints {
            waypoints.push(*x);
            waypoints.push(*y);
        }
        pipes_out.push(PipeTable {
            index: index as u32,
            from_part: part_renumber[&from_part],
            to_part: part_renumber[&to_part],
            from_machine,
            from_attached_machine: from_attached,
            to_machine,
            to_attached_machine: to_attached,
            from_port: pipe.a.port.clone(),
            to_port: pipe.b.port.clone(),
            waypoints,
        });
    }

    let file = VehicleFile {
        part_id: part_ids.max(),
        piece_id: piece_ids.max(),
        group_names: vehicle.group_names.clone(),
        parts: parts_out,
        pieces: pieces_out,
        wires: wires_out,
        pipes: pipes_out,
    };

    Ok(toml::to_string_pretty(&file)?)
}

/// Finds which part owns `machine`, and whether it is declared (by name) or
/// attached (by index), for emitting a pipe's part/machine reference pair.
fn locate_machine(vehicle: &Vehicle, machine: shipcore_fluid::MachineId) -> (PartId, Option<String>, Option<u32>) {
    for part in vehicle.iter_parts() {
        if let Some((name, _)) = part.declared_machines.iter().find(|(_, &id)| id == machine) {
            return (part.id, Some(name.clone()), None);
        }
        if let Some(index) = part.attached_machines.iter().position(|&id| id == machine) {
            return (part.id, None, Some(index as u32));
        }
    }
    panic!("pipe references machine {machine:?} owned by no part in this vehicle");
}
