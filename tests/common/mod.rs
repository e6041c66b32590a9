#![allow(dead_code)]

use terminus::core::matrix::IDENTITY;
use terminus::ephemeris::{BodyRecord, CatalogEphemeris, Orientation, Trajectory};

pub const SUN_RADIUS: f64 = 696_000.0;
pub const MARS_DISTANCE: f64 = 2.28e8;
pub const MARS_RADIUS: f64 = 3_396.0;

pub fn fixed(center: i32, position_km: [f64; 3], velocity_km_s: [f64; 3]) -> Trajectory {
    Trajectory::Linear {
        center,
        epoch: 0.0,
        position_km,
        velocity_km_s,
    }
}

/// Sun at the barycenter, Mars on the +x axis with a body-fixed frame equal
/// to J2000, and Earth off to the side.
pub fn mars_system(mars_radii: [f64; 3]) -> CatalogEphemeris {
    CatalogEphemeris::new()
        .with_body(
            BodyRecord::new(10, "SUN")
                .with_radii([SUN_RADIUS; 3])
                .with_trajectory(fixed(0, [0.0; 3], [0.0; 3])),
        )
        .with_body(
            BodyRecord::new(499, "MARS")
                .with_radii(mars_radii)
                .with_trajectory(fixed(10, [MARS_DISTANCE, 0.0, 0.0], [0.0; 3]))
                .with_orientation(Orientation::Fixed(IDENTITY)),
        )
        .with_body(
            BodyRecord::new(399, "EARTH")
                .with_trajectory(fixed(10, [1.5e8, 1.0e7, 0.0], [0.0; 3])),
        )
        .with_body(
            BodyRecord::new(-5, "LAMP")
                .with_radii([0.5; 3])
                .with_trajectory(fixed(499, [1.0, 0.0, 0.0], [0.0; 3])),
        )
}

/// Angle between `v` and the unit vector toward the Sun from Mars (-x).
pub fn cos_from_sun_axis(v: &[f64; 3]) -> f64 {
    -v[0] / terminus::core::vector::norm(v)
}
