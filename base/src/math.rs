//! Rigid transforms and vectors shared across the vehicle core.
//!
//! The physics engine is treated as an opaque collaborator (see
//! [`crate::save`] and the `rigid_body` module of `shipcore-graph`), but its
//! transforms still need to flow through the core, so we standardize on
//! [`nalgebra`]'s double-precision isometries rather than inventing our own.

use nalgebra::{Matrix3, Matrix4, Quaternion, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// A 3D vector in world or local space.
pub type Vec3 = Vector3<f64>;

/// A unit rotation quaternion.
pub type Rotation = UnitQuaternion<f64>;

/// A 3x3 matrix, used for inertia tensors.
pub type Mat3 = Matrix3<f64>;

/// A rigid transform: translation plus rotation, no scale or shear.
///
/// Collider shapes and rigid bodies never need scale, so an isometry is a
/// strictly more precise representation than a full 4x4 matrix and is what
/// every piece-level transform (`packed_tform`, `welded_tform`) uses.
pub type Transform = nalgebra::Isometry3<f64>;

/// Decodes a row-major 4x4 transform matrix as persisted in the vehicle file
/// format (§6.1: `transform` is an array of 16 floats, row-major).
///
/// # Errors
/// Returns an error if the array does not represent a rigid transform (i.e.
/// has a nonzero shear or non-unit scale component beyond floating point
/// tolerance).
pub fn transform_from_row_major(values: &[f64; 16]) -> anyhow::Result<Transform> {
    #[rustfmt::skip]
    let mat = Matrix4::new(
        values[0], values[1], values[2], values[3],
        values[4], values[5], values[6], values[7],
        values[8], values[9], values[10], values[11],
        values[12], values[13], values[14], values[15],
    );
    // Row-major storage means translation lives in the last column once transposed
    // into nalgebra's column-major convention.
    let mat = mat.transpose();

    let translation = Translation3::new(mat[(0, 3)], mat[(1, 3)], mat[(2, 3)]);
    let rotation_mat = mat.fixed_view::<3, 3>(0, 0).into_owned();
    let rotation = UnitQuaternion::from_matrix(&rotation_mat);

    anyhow::ensure!(
        (rotation.to_rotation_matrix().matrix() - rotation_mat).norm() < 1e-3,
        "transform matrix is not a pure rotation (has scale or shear)"
    );

    Ok(Transform::from_parts(translation, rotation))
}

/// Encodes a transform as a row-major 4x4 matrix for persistence.
#[must_use]
pub fn transform_to_row_major(transform: &Transform) -> [f64; 16] {
    let mat = transform.to_homogeneous();
    let mut out = [0.0; 16];
    for row in 0..4 {
        for col in 0..4 {
            out[row * 4 + col] = mat[(row, col)];
        }
    }
    out
}

/// A quaternion persisted as `{x, y, z, w}`, matching the `rot` tables in the
/// vehicle file format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuatTable {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl From<Rotation> for QuatTable {
    fn from(rot: Rotation) -> Self {
        let q: &Quaternion<f64> = rot.as_ref();
        Self { x: q.i, y: q.j, z: q.k, w: q.w }
    }
}

impl From<QuatTable> for Rotation {
    fn from(table: QuatTable) -> Self {
        UnitQuaternion::from_quaternion(Quaternion::new(table.w, table.x, table.y, table.z))
    }
}

/// A 3-vector persisted as `{x, y, z}`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3Table {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<Vec3> for Vec3Table {
    fn from(v: Vec3) -> Self { Self { x: v.x, y: v.y, z: v.z } }
}

impl From<Vec3Table> for Vec3 {
    fn from(t: Vec3Table) -> Self { Vec3::new(t.x, t.y, t.z) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_major_round_trip() {
        let original = Transform::from_parts(
            Translation3::new(1.0, 2.0, 3.0),
            UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3),
        );
        let encoded = transform_to_row_major(&original);
        let decoded = transform_from_row_major(&encoded).expect("valid rigid transform");

        assert!((decoded.translation.vector - original.translation.vector).norm() < 1e-9);
        assert!(decoded.rotation.angle_to(&original.rotation) < 1e-9);
    }

    #[test]
    fn rejects_sheared_matrix() {
        let mut values = [0.0; 16];
        values[0] = 1.0;
        values[5] = 2.0; // non-uniform scale on the diagonal
        values[10] = 1.0;
        values[15] = 1.0;
        assert!(transform_from_row_major(&values).is_err());
    }
}
