//! Triaxial ellipsoid helpers. All vectors are body-fixed, in km.

use terminus_core::vector::{self, Vector3};

use crate::Ray;

/// Point where the ray from the ellipsoid center along `direction` meets
/// the surface, or `None` for a zero direction.
pub fn point_along(radii: &Vector3, direction: &Vector3) -> Option<Vector3> {
    let level = (0..3)
        .map(|i| (direction[i] / radii[i]).powi(2))
        .sum::<f64>()
        .sqrt();
    if level > 0.0 && level.is_finite() {
        Some(vector::scale(direction, 1.0 / level))
    } else {
        None
    }
}

/// Outward (unnormalized) gradient `A x` of the level function
/// `x^T A x`, with `A = diag(1/a², 1/b², 1/c²)`. For points on the surface
/// the tangent plane is `{y : gradient·y = 1}`.
pub fn gradient(radii: &Vector3, point: &Vector3) -> Vector3 {
    [
        point[0] / (radii[0] * radii[0]),
        point[1] / (radii[1] * radii[1]),
        point[2] / (radii[2] * radii[2]),
    ]
}

/// Level value `x^T A x`; 1 on the surface.
pub fn level(radii: &Vector3, point: &Vector3) -> f64 {
    vector::dot(&gradient(radii, point), point)
}

/// First intersection of a ray with the ellipsoid. A vertex inside the
/// ellipsoid yields the exit point.
pub fn intersect(radii: &Vector3, ray: &Ray) -> Option<Vector3> {
    let v = [
        ray.vertex[0] / radii[0],
        ray.vertex[1] / radii[1],
        ray.vertex[2] / radii[2],
    ];
    let d = [
        ray.direction[0] / radii[0],
        ray.direction[1] / radii[1],
        ray.direction[2] / radii[2],
    ];
    let a = vector::dot(&d, &d);
    if a == 0.0 {
        return None;
    }
    let b = 2.0 * vector::dot(&v, &d);
    let c = vector::dot(&v, &v) - 1.0;
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }
    let q = -0.5 * (b + b.signum() * discriminant.sqrt());
    let (mut t1, mut t2) = if q != 0.0 {
        (q / a, c / q)
    } else {
        let half = (-c / a).max(0.0).sqrt();
        (-half, half)
    };
    if t1 > t2 {
        std::mem::swap(&mut t1, &mut t2);
    }
    let t = if t1 >= 0.0 {
        t1
    } else if t2 >= 0.0 {
        t2
    } else {
        return None;
    };
    Some(vector::add(&ray.vertex, &vector::scale(&ray.direction, t)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const RADII: Vector3 = [13.0, 11.4, 9.1];

    #[test]
    fn outside_ray_hits_near_side() {
        let ray = Ray::new([100.0, 0.0, 0.0], [-1.0, 0.0, 0.0]);
        let hit = intersect(&RADII, &ray).unwrap();
        assert_relative_eq!(hit[0], 13.0, max_relative = 1e-14);
    }

    #[test]
    fn inside_ray_hits_exit_point_and_misses_are_none() {
        let hit = intersect(&RADII, &Ray::new([0.0; 3], [0.0, 0.0, 2.0])).unwrap();
        assert_relative_eq!(hit[2], 9.1, max_relative = 1e-14);
        assert!(intersect(&RADII, &Ray::new([100.0, 50.0, 0.0], [-1.0, 0.0, 0.0])).is_none());
        assert!(intersect(&RADII, &Ray::new([100.0, 0.0, 0.0], [1.0, 0.0, 0.0])).is_none());
    }

    #[test]
    fn point_along_lies_on_surface() {
        let p = point_along(&RADII, &[1.0, -2.0, 0.5]).unwrap();
        assert_relative_eq!(level(&RADII, &p), 1.0, max_relative = 1e-14);
    }
}
