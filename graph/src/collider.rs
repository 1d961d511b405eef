//! Collider shapes, treated as an opaque capability of the physics engine
//! (§1 non-goals: "the physics engine ... offering `add_body`, `remove_body`,
//! `step`, and callbacks"). The welded-group builder only needs enough of a
//! shape to build a compound collider and estimate a local inertia tensor;
//! everything else (meshes, broadphase, collision response) lives on the
//! other side of [`crate::rigid_body::RigidBodyWorld`].

use shipcore_base::math::Mat3;

/// A handle to a collider shape owned by the physics engine.
///
/// Opaque on purpose: the vehicle core never inspects collider geometry
/// directly, it only asks the physics engine to compose and compound
/// shapes it already owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderHandle(pub u32);

/// A child shape placed inside a compound collider at a local offset,
/// together with the mass used to weight the compound's inertia tensor
/// (§4.2 step 5).
#[derive(Debug, Clone, Copy)]
pub struct CompoundChild {
    pub shape: ColliderHandle,
    pub transform: shipcore_base::math::Transform,
    pub mass: f64,
}

/// Per-shape inertia properties as reported by the physics engine for a
/// single collider at the origin, used as an input to the principal-axis
/// routine (§4.2 step 5b).
#[derive(Debug, Clone, Copy)]
pub struct LocalInertia {
    /// Diagonal local inertia tensor of the shape about its own origin,
    /// assuming the mass passed alongside it.
    pub tensor: Mat3,
}

/// Capability for querying per-shape inertia, implemented by whatever
/// physics engine adapter is plugged into [`crate::rigid_body::RigidBodyWorld`].
pub trait ColliderInertia {
    /// Returns the local inertia tensor of `shape` if it carried `mass`.
    fn local_inertia(&self, shape: ColliderHandle, mass: f64) -> LocalInertia;
}
