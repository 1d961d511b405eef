//! The atomic collider and lifecycle unit of a vehicle (§3 `Piece`).

use shipcore_base::math::Transform;

use crate::collider::ColliderHandle;
use crate::rigid_body::{MotionStateHandle, RigidBodyHandle};
use crate::weld::WeldedGroupId;

/// Identifies a piece within its owning vehicle's arena.
///
/// Stable across the piece's lifetime; indices are never reused while the
/// piece graph they belong to is alive, so back-pointers (a welded group's
/// member list, a link's `from`/`to`) can hold plain [`PieceId`]s instead of
/// cyclic references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub u32);

/// Identifies the part that owns a piece.
///
/// Parts themselves are not modeled by this crate (they host machines,
/// which belong to the plumbing/behavior layer); pieces only need a stable
/// handle back to their owner to report which part broke loose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartId(pub u32);

/// A non-weld physical connector between two pieces.
///
/// Distinct from the weld relationship encoded by [`Piece::welded`]: a link
/// can break under stress without the pieces being rigidly fused.
#[derive(Debug, Clone, Copy)]
pub struct Link {
    pub from: PieceId,
    pub to: PieceId,
    pub rot: shipcore_base::math::Rotation,
}

/// The atomic collider and lifecycle unit of a vehicle.
///
/// See §3 for the full invariant list; the two enforced directly by
/// [`crate::graph::PieceGraph`] are that a welded piece always has
/// `attached_to.is_some()`, and that `rigid_body`/`motion_state` are set iff
/// the owning vehicle is unpacked.
#[derive(Debug, Clone)]
pub struct Piece {
    pub id: PieceId,
    pub part: PartId,
    pub piece_prototype: String,
    pub mass: f64,
    pub collider: ColliderHandle,

    /// The piece this one is attached to, or `None` for the root piece.
    pub attached_to: Option<PieceId>,

    /// Whether this piece is rigidly welded to `attached_to`.
    ///
    /// Meaningless (and always `false`) on the root piece, since the root
    /// has no `attached_to` to be welded to.
    pub welded: bool,

    /// Whether the editor may sever this piece's link interactively.
    pub editor_dettachable: bool,

    /// The non-weld connector to `attached_to`, if any.
    pub link: Option<Link>,

    pub from_attachment: Option<String>,
    pub to_attachment: Option<String>,

    /// Editor-only link gizmo anchors, in `from`'s and `to`'s local frames;
    /// not consulted by any structural or physics computation.
    pub link_pfrom: Option<shipcore_base::math::Vec3>,
    pub link_pto: Option<shipcore_base::math::Vec3>,

    /// Local transform when the vehicle is packed (rest state).
    pub packed_tform: Transform,

    /// Offset of this piece within its welded group's compound collider.
    ///
    /// Meaningless for lone pieces; recomputed by the welded-group builder
    /// whenever the piece's group is rebuilt.
    pub welded_tform: Transform,

    pub rigid_body: Option<RigidBodyHandle>,
    pub motion_state: Option<MotionStateHandle>,

    /// The welded group this piece belongs to, or `None` if it is lone.
    pub group: Option<WeldedGroupId>,
}

impl Piece {
    /// Whether this piece currently owns its own rigid body independent of
    /// any welded group (true exactly when it is unpacked and lone).
    #[must_use]
    pub fn is_lone_body(&self) -> bool {
        self.rigid_body.is_some() && self.group.is_none()
    }
}
