//! The principal-axis routine used to turn a cluster of colliders into one
//! compound rigid body (§4.2 step 5b/c: "Compute the principal-axis
//! transform and local inertia ... using the standard compound
//! principal-axis routine").
//!
//! This is the same construction every physics engine's "compound shape
//! mass properties" helper performs: sum the parallel-axis-shifted inertia
//! tensors of the children about their common center of mass, then
//! diagonalize the result so the body's local inertia tensor is diagonal in
//! its own principal frame.

use nalgebra::linalg::SymmetricEigen;
use shipcore_base::math::{Mat3, Transform, Vec3};

/// One child contributing to a compound body's mass properties.
#[derive(Debug, Clone, Copy)]
pub struct MassElement {
    pub mass: f64,
    /// The child's local inertia tensor about its own center, in its own
    /// orientation.
    pub local_inertia: Mat3,
    /// The child's transform in whatever frame the compound is being built
    /// in (the snapshot global frame during a rebuild).
    pub transform: Transform,
}

/// The result of reducing a set of [`MassElement`]s to one rigid body.
#[derive(Debug, Clone, Copy)]
pub struct PrincipalFrame {
    /// Transform of the principal frame in the same space the input
    /// elements' transforms were expressed in.
    pub transform: Transform,
    /// Diagonal local inertia tensor in the principal frame.
    pub local_inertia: Mat3,
    pub total_mass: f64,
}

/// Computes the principal-axis frame and local inertia for a compound of
/// `elements`.
///
/// # Panics
/// Panics if `elements` is empty or the total mass is non-finite or
/// non-positive (§4.2 failure semantics: "non-finite mass" is fatal).
#[must_use]
pub fn compute_principal_frame(elements: &[MassElement]) -> PrincipalFrame {
    assert!(!elements.is_empty(), "cannot compute mass properties of an empty compound");

    let total_mass: f64 = elements.iter().map(|e| e.mass).sum();
    assert!(total_mass.is_finite() && total_mass > 0.0, "compound has non-finite or zero mass");

    let center_of_mass = elements
        .iter()
        .fold(Vec3::zeros(), |acc, e| acc + e.transform.translation.vector * e.mass)
        / total_mass;

    let mut tensor = Mat3::zeros();
    for e in elements {
        let offset = e.transform.translation.vector - center_of_mass;
        let rotation = e.transform.rotation.to_rotation_matrix().into_inner();
        let local_about_own_center = rotation * e.local_inertia * rotation.transpose();

        // Parallel axis theorem: I_about_com = I_about_own_center + m * (|d|^2 * Id - d d^T)
        let d_sq = offset.norm_squared();
        let shift = Mat3::identity() * d_sq - offset * offset.transpose();
        tensor += local_about_own_center + shift * e.mass;
    }

    let eigen = SymmetricEigen::new(tensor);
    let mut rotation_matrix = eigen.eigenvectors;
    // SymmetricEigen does not guarantee a right-handed basis; flip the last
    // column if the determinant came out improper so the principal frame is
    // a valid rotation rather than a reflection.
    if rotation_matrix.determinant() < 0.0 {
        for row in 0..3 {
            rotation_matrix[(row, 2)] = -rotation_matrix[(row, 2)];
        }
    }
    let rotation = nalgebra::UnitQuaternion::from_rotation_matrix(&nalgebra::Rotation3::from_matrix_unchecked(
        rotation_matrix,
    ));

    let transform = Transform::from_parts(center_of_mass.into(), rotation);
    let local_inertia = Mat3::from_diagonal(&eigen.eigenvalues);

    PrincipalFrame { transform, local_inertia, total_mass }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use shipcore_base::math::Transform;

    use super::*;

    #[test]
    fn two_equal_point_masses_center_between_them() {
        let elements = vec![
            MassElement {
                mass: 1.0,
                local_inertia: Mat3::zeros(),
                transform: Transform::from_parts(Vec3::new(-1.0, 0.0, 0.0).into(), Default::default()),
            },
            MassElement {
                mass: 1.0,
                local_inertia: Mat3::zeros(),
                transform: Transform::from_parts(Vec3::new(1.0, 0.0, 0.0).into(), Default::default()),
            },
        ];

        let frame = compute_principal_frame(&elements);
        assert_relative_eq!(frame.total_mass, 2.0);
        assert_relative_eq!(frame.transform.translation.vector.norm(), 0.0, epsilon = 1e-9);
        // Each unit point mass 1 unit away from the axis contributes m*d^2 = 1
        // to the two transverse moments; the longitudinal moment is zero.
        assert_relative_eq!(frame.local_inertia[(0, 0)], 0.0, epsilon = 1e-9);
    }
}
