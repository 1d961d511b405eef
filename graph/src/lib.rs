//! The piece graph, welded-group builder, and separation detector (§4.1–§4.3):
//! the structural layer of a vehicle, independent of fluids and machines.

pub mod collider;
pub mod graph;
pub mod inertia;
pub mod piece;
pub mod rigid_body;
pub mod separation;
pub mod weld;
pub mod weld_builder;

pub use collider::{ColliderHandle, ColliderInertia, CompoundChild, LocalInertia};
pub use graph::PieceGraph;
pub use inertia::{compute_principal_frame, MassElement, PrincipalFrame};
pub use piece::{Link, PartId, Piece, PieceId};
pub use rigid_body::{BodySpec, KinematicSnapshot, MotionStateHandle, RigidBodyHandle, RigidBodyWorld};
pub use separation::{detect_separations, SeparatedGroup};
pub use weld::{WeldedGroup, WeldedGroupArena, WeldedGroupId};
