//! Terminator points on the reference ellipsoid.

use std::f64::consts::PI;

use terminus_core::vector::{self, Vector3};
use terminus_method::Shadow;
use terminus_surface::ellipsoid::{gradient, point_along};
use tracing::trace;

use crate::geometry::SourceSphere;
use crate::{CuttingHalfPlane, TerminatorError};

/// Iteration cap shared by the bisection searches.
pub const MAX_BISECTIONS: usize = 200;

/// +1 when the source must lie on the body side of the tangent plane,
/// -1 when it must lie on the far side.
pub(crate) fn shadow_sign(shadow: Shadow) -> f64 {
    match shadow {
        Shadow::Umbral => 1.0,
        Shadow::Penumbral => -1.0,
    }
}

/// Signed distance (km) by which the source sphere misses tangency with
/// the plane tangent to the ellipsoid at `point`. Zero at a terminator
/// point; positive on the lit side of it.
pub fn tangency_residual(
    radii: &Vector3,
    source: &SourceSphere,
    shadow: Shadow,
    point: &Vector3,
) -> f64 {
    let normal = gradient(radii, point);
    (vector::dot(&normal, &source.center) - 1.0) / vector::norm(&normal)
        + shadow_sign(shadow) * source.radius
}

/// The ellipsoid terminator point in `plane`, or `None` when the residual
/// does not change sign along the half-ellipse.
pub fn ellipsoid_terminator(
    radii: &Vector3,
    source: &SourceSphere,
    shadow: Shadow,
    plane: &CuttingHalfPlane,
    cut: usize,
) -> Result<Option<Vector3>, TerminatorError> {
    let surface_at = |angle: f64| {
        let (sin, cos) = angle.sin_cos();
        point_along(radii, &plane.point(cos, sin))
    };
    let residual_at = |point: &Vector3| tangency_residual(radii, source, shadow, point);

    let (Some(lit), Some(dark)) = (surface_at(0.0), surface_at(PI)) else {
        return Ok(None);
    };
    let (lit_residual, dark_residual) = (residual_at(&lit), residual_at(&dark));
    if lit_residual == 0.0 {
        return Ok(Some(lit));
    }
    if dark_residual == 0.0 {
        return Ok(Some(dark));
    }
    if lit_residual < 0.0 || dark_residual > 0.0 {
        trace!(cut, lit_residual, dark_residual, "no terminator on the ellipsoid");
        return Ok(None);
    }

    let (mut low, mut high) = (0.0_f64, PI);
    let (mut low_point, mut high_point) = (lit, dark);
    let (mut low_residual, mut high_residual) = (lit_residual, dark_residual);
    for _ in 0..MAX_BISECTIONS {
        let mid = 0.5 * (low + high);
        if mid <= low || mid >= high {
            let best = if low_residual.abs() <= high_residual.abs() {
                low_point
            } else {
                high_point
            };
            return Ok(Some(best));
        }
        let Some(point) = surface_at(mid) else {
            return Ok(None);
        };
        let residual = residual_at(&point);
        if residual == 0.0 {
            return Ok(Some(point));
        }
        if residual > 0.0 {
            (low, low_point, low_residual) = (mid, point, residual);
        } else {
            (high, high_point, high_residual) = (mid, point, residual);
        }
    }
    Err(TerminatorError::NumericDivergence {
        cut,
        iterations: MAX_BISECTIONS,
    })
}
