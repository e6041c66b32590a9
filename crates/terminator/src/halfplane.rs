//! Cutting half-planes bounded by the target to source axis.

use terminus_core::vector::{self, Vector3};

use crate::TerminatorError;

/// Relative size below which the reference vector counts as parallel to
/// the axis.
const PARALLEL_TOLERANCE: f64 = 1.0e-12;

/// Half-plane whose edge is the line through the target center along
/// `axis`, extending in the direction `direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CuttingHalfPlane {
    /// Unit vector from the target center toward the source center.
    pub axis: Vector3,
    /// Unit vector perpendicular to `axis`, pointing into the half-plane.
    pub direction: Vector3,
    /// Roll angle from the reference vector, radians.
    pub roll: f64,
}

impl CuttingHalfPlane {
    /// Half-plane containing `reference` rolled counter-clockwise about
    /// `axis` by `roll` radians.
    pub fn new(axis: &Vector3, reference: &Vector3, roll: f64) -> Result<Self, TerminatorError> {
        let axis = vector::unit(axis).ok_or_else(|| {
            TerminatorError::configuration("illumination source coincides with the target center")
        })?;
        let normal_part = vector::perpendicular(reference, &axis);
        if vector::norm(&normal_part) <= PARALLEL_TOLERANCE * vector::norm(reference) {
            return Err(TerminatorError::configuration(
                "reference vector is parallel to the target to source axis",
            ));
        }
        let base = vector::unit(&normal_part).ok_or_else(|| {
            TerminatorError::configuration("reference vector must be a finite non-zero vector")
        })?;
        Ok(Self {
            axis,
            direction: vector::rotate_about(&base, &axis, roll),
            roll,
        })
    }

    /// Point with the given components along the axis and the in-plane
    /// direction.
    pub fn point(&self, along_axis: f64, along_direction: f64) -> Vector3 {
        vector::lincomb(along_axis, &self.axis, along_direction, &self.direction)
    }

    /// Components of `point` along the axis, along the in-plane direction,
    /// and normal to the half-plane.
    pub fn coordinates(&self, point: &Vector3) -> [f64; 3] {
        let normal = vector::cross(&self.axis, &self.direction);
        [
            vector::dot(point, &self.axis),
            vector::dot(point, &self.direction),
            vector::dot(point, &normal),
        ]
    }
}

/// `count` half-planes; half-plane `i` is rolled by `i * roll_step`.
pub fn half_planes(
    axis: &Vector3,
    reference: &Vector3,
    roll_step: f64,
    count: usize,
) -> Result<Vec<CuttingHalfPlane>, TerminatorError> {
    (0..count)
        .map(|cut| CuttingHalfPlane::new(axis, reference, cut as f64 * roll_step))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn planes_roll_counter_clockwise_about_the_axis() {
        let planes = half_planes(&[2.0, 0.0, 0.0], &[5.0, 0.0, 1.0], FRAC_PI_2, 4).unwrap();
        let expected = [[0.0, 0.0, 1.0], [0.0, -1.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]];
        for (plane, want) in planes.iter().zip(expected) {
            for k in 0..3 {
                assert_relative_eq!(plane.direction[k], want[k], epsilon = 1e-15);
            }
        }
        assert_relative_eq!(planes[3].roll, 3.0 * FRAC_PI_2);
    }

    #[test]
    fn parallel_reference_is_rejected() {
        let err = CuttingHalfPlane::new(&[0.0, 0.0, 3.0], &[0.0, 0.0, -1.0], 0.0).unwrap_err();
        assert!(matches!(err, TerminatorError::Configuration(_)));
    }

    #[test]
    fn coordinates_invert_point() {
        let plane = CuttingHalfPlane::new(&[1.0, 1.0, 0.0], &[0.0, 0.0, 1.0], 0.3).unwrap();
        let c = plane.coordinates(&plane.point(2.5, 4.0));
        assert_relative_eq!(c[0], 2.5, epsilon = 1e-14);
        assert_relative_eq!(c[1], 4.0, epsilon = 1e-14);
        assert_relative_eq!(c[2], 0.0, epsilon = 1e-14);
    }
}
