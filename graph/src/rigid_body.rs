//! The rigid-body world, treated as an opaque collaborator (§1, §9: "the
//! physics engine ... offering `add_body`, `remove_body`, `step`, and
//! callbacks"). Everything the welded-group builder and separation detector
//! need from the physics engine is captured by [`RigidBodyWorld`]; a real
//! integration (Bullet, Rapier, Jolt, ...) implements it once and the rest of
//! this crate never references a concrete physics crate.

use shipcore_base::math::{Mat3, Transform, Vec3};

use crate::collider::{ColliderHandle, ColliderInertia, CompoundChild};

/// Opaque handle to a rigid body owned by the physics world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RigidBodyHandle(pub u32);

/// Opaque handle to a motion state owned by the physics world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MotionStateHandle(pub u32);

/// Snapshot of a piece's kinematics just before a welded-group rebuild
/// (§4.2 step 1).
#[derive(Debug, Clone, Copy)]
pub struct KinematicSnapshot {
    pub transform: Transform,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
}

/// Describes a rigid body to create, either for a newly formed welded
/// group or for a lone piece (§4.2 steps 5d, 6).
pub struct BodySpec {
    pub collider: ColliderHandle,
    pub mass: f64,
    pub local_inertia: Mat3,
    pub motion_state_transform: Transform,
    /// Rigid bodies in this simulation never sleep: vehicles are driven by
    /// continuous physical processes (thrust, aerodynamic stress) that a
    /// deactivated body would silently stop responding to.
    pub deactivation_disabled: bool,
}

/// The capability set the welded-group builder and separation detector need
/// from the physics engine.
///
/// This is the seam named in §9 ("Global mutable state ... Replace with an
/// explicit `Context` value"): callers pass `&mut dyn RigidBodyWorld`
/// explicitly into [`crate::weld_builder::rebuild`] rather than reaching for
/// a process-wide physics singleton.
pub trait RigidBodyWorld: ColliderInertia {
    /// Combines `children` into a new compound collider.
    fn make_compound(&mut self, children: &[CompoundChild]) -> ColliderHandle;

    /// Creates a new rigid body with the given collider and mass
    /// properties, returning its handle and the paired motion state.
    fn add_body(&mut self, spec: BodySpec) -> (RigidBodyHandle, MotionStateHandle);

    /// Removes and deallocates a rigid body and its motion state.
    fn remove_body(&mut self, body: RigidBodyHandle, motion_state: MotionStateHandle);

    /// Takes a kinematic snapshot of a standalone piece's existing body.
    fn snapshot(&self, body: RigidBodyHandle) -> KinematicSnapshot;

    /// Applies a linear impulse at the body's center of mass.
    fn apply_linear_impulse(&mut self, body: RigidBodyHandle, impulse: Vec3);

    /// Sets a body's angular velocity directly.
    fn set_angular_velocity(&mut self, body: RigidBodyHandle, angular: Vec3);

    /// Advances the simulation by `dt` seconds (§5 "physics substep(s)").
    fn step(&mut self, dt: f64);
}
