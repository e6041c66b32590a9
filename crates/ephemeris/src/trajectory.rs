//! Analytic trajectory models relative to a center body.

use std::f64::consts::TAU;

use terminus_core::vector::{self, Vector3};

/// Motion of a body relative to its `center` (code 0 is the solar system
/// barycenter), expressed in J2000.
#[derive(Debug, Clone, PartialEq)]
pub enum Trajectory {
    /// Constant-velocity motion through `position_km` at `epoch`.
    Linear {
        center: i32,
        epoch: f64,
        position_km: Vector3,
        velocity_km_s: Vector3,
    },
    /// Uniform circular motion in the plane normal to `pole`, starting at
    /// the direction of `node` rotated by `phase_rad` at `epoch`.
    Circular {
        center: i32,
        radius_km: f64,
        period_s: f64,
        epoch: f64,
        phase_rad: f64,
        pole: Vector3,
        node: Vector3,
    },
}

impl Trajectory {
    /// Body this trajectory is measured from.
    pub fn center(&self) -> i32 {
        match self {
            Trajectory::Linear { center, .. } | Trajectory::Circular { center, .. } => *center,
        }
    }

    /// Position and velocity relative to the center at `et`.
    pub fn relative_state(&self, et: f64) -> (Vector3, Vector3) {
        match self {
            Trajectory::Linear {
                epoch,
                position_km,
                velocity_km_s,
                ..
            } => (
                vector::add(position_km, &vector::scale(velocity_km_s, et - epoch)),
                *velocity_km_s,
            ),
            Trajectory::Circular {
                radius_km,
                period_s,
                epoch,
                phase_rad,
                pole,
                node,
                ..
            } => {
                let normal = vector::unit(pole).unwrap_or([0.0, 0.0, 1.0]);
                let e1 = vector::unit(&vector::perpendicular(node, &normal))
                    .unwrap_or_else(|| fallback_node(&normal));
                let e2 = vector::cross(&normal, &e1);
                let rate = if *period_s != 0.0 { TAU / period_s } else { 0.0 };
                let angle = phase_rad + rate * (et - epoch);
                let (sin, cos) = angle.sin_cos();
                (
                    vector::scale(&vector::lincomb(cos, &e1, sin, &e2), *radius_km),
                    vector::scale(&vector::lincomb(-sin, &e1, cos, &e2), radius_km * rate),
                )
            }
        }
    }
}

fn fallback_node(normal: &Vector3) -> Vector3 {
    let trial = if normal[0].abs() < 0.9 {
        [1.0, 0.0, 0.0]
    } else {
        [0.0, 1.0, 0.0]
    };
    vector::unit(&vector::perpendicular(&trial, normal)).unwrap_or([1.0, 0.0, 0.0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn circular_orbit_keeps_radius_and_quarter_period_geometry() {
        let orbit = Trajectory::Circular {
            center: 499,
            radius_km: 9_376.0,
            period_s: 27_553.8,
            epoch: 0.0,
            phase_rad: 0.0,
            pole: [0.0, 0.0, 1.0],
            node: [1.0, 0.0, 0.0],
        };
        let (p0, v0) = orbit.relative_state(0.0);
        let (p1, _) = orbit.relative_state(27_553.8 / 4.0);

        assert_relative_eq!(vector::norm(&p0), 9_376.0, max_relative = 1e-12);
        assert_relative_eq!(p1[1], 9_376.0, max_relative = 1e-9);
        assert_relative_eq!(vector::dot(&p0, &v0), 0.0, epsilon = 1e-6);
    }
}
