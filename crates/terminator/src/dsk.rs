//! Tangent-ray search over topographic plate surfaces.
//!
//! Within a cutting half-plane, the lines tangent to the source sphere form
//! a one-parameter family. For the umbral terminator these are the outer
//! tangents, which keep the source and the target on the same side; for the
//! penumbral terminator they are the inner tangents, which cross between
//! them. The search sweeps from the tangent that just clears the target's
//! bounding sphere toward the one through the target center, casting a ray
//! from the source-sphere tangency point along each line.

use terminus_core::vector::{self, Vector3};
use terminus_method::Shadow;
use terminus_surface::{Ray, SurfaceProvider, SurfaceSelection};
use tracing::trace;

use crate::ellipsoid::{MAX_BISECTIONS, shadow_sign};
use crate::geometry::SourceSphere;
use crate::{CuttingHalfPlane, TerminatorError};

/// Relative padding applied to the bounding radius so the first ray never
/// grazes the outermost vertex.
const BOUNDING_PAD: f64 = 1.0e-6;

/// Bracketing and bisection settings for one target surface.
pub struct TangentSearch<'a> {
    pub surfaces: &'a dyn SurfaceProvider,
    pub body: i32,
    pub selection: &'a SurfaceSelection,
    pub bounding_radius: f64,
    pub step: f64,
    pub tolerance: f64,
}

/// One tangent-ray family laid out in a half-plane.
struct RayFamily<'p> {
    plane: &'p CuttingHalfPlane,
    distance: f64,
    radius: f64,
    sign: f64,
    start: f64,
    span: f64,
}

impl RayFamily<'_> {
    /// Ray at sweep parameter `lambda`, measured from the starting tangent.
    fn ray(&self, lambda: f64) -> Ray {
        let (sin, cos) = (self.start + self.sign * lambda).sin_cos();
        let normal = [-sin, self.sign * cos];
        let along = [-cos, -self.sign * sin];
        let vertex = self.plane.point(
            self.distance + self.radius * normal[0],
            self.radius * normal[1],
        );
        Ray::new(vertex, self.plane.point(along[0], along[1]))
    }
}

impl TangentSearch<'_> {
    /// Terminator points in `plane`, outermost first.
    pub fn search(
        &self,
        source: &SourceSphere,
        shadow: Shadow,
        plane: &CuttingHalfPlane,
        cut: usize,
    ) -> Result<Vec<Vector3>, TerminatorError> {
        let distance = vector::norm(&source.center);
        let sign = shadow_sign(shadow);
        let bound = self.bounding_radius * (1.0 + BOUNDING_PAD);
        let start_sine = (source.radius - sign * bound) / distance;
        if !(-1.0..=1.0).contains(&start_sine) || source.radius >= distance {
            return Err(TerminatorError::configuration(
                "illumination source overlaps the target's bounding sphere",
            ));
        }
        let start = start_sine.asin();
        let family = RayFamily {
            plane,
            distance,
            radius: source.radius,
            sign,
            start,
            span: ((source.radius / distance).asin() - start).abs(),
        };

        let mut points = Vec::new();
        let mut previous = (0.0, self.cast(&family, 0.0)?);
        while previous.0 < family.span {
            let lambda = (previous.0 + self.step).min(family.span);
            if lambda <= previous.0 {
                return Err(TerminatorError::NumericDivergence { cut, iterations: 0 });
            }
            let current = (lambda, self.cast(&family, lambda)?);
            trace!(cut, lambda, hit = current.1.is_some(), "bracketing step");
            if current.1.is_some() != previous.1.is_some() {
                points.push(self.refine(&family, previous, current, cut)?);
            }
            previous = current;
        }
        Ok(points)
    }

    fn cast(
        &self,
        family: &RayFamily<'_>,
        lambda: f64,
    ) -> Result<Option<Vector3>, TerminatorError> {
        Ok(self
            .surfaces
            .intersect(self.body, self.selection, &family.ray(lambda))?)
    }

    /// Bisect a bracket whose ends differ in intersection status. Returns the
    /// intersection of the last ray found to hit the surface.
    fn refine(
        &self,
        family: &RayFamily<'_>,
        (mut low, low_hit): (f64, Option<Vector3>),
        (mut high, high_hit): (f64, Option<Vector3>),
        cut: usize,
    ) -> Result<Vector3, TerminatorError> {
        let hit_is_low = low_hit.is_some();
        let Some(mut best) = low_hit.or(high_hit) else {
            return Err(TerminatorError::NumericDivergence { cut, iterations: 0 });
        };
        for iteration in 0..MAX_BISECTIONS {
            if high - low <= self.tolerance {
                return Ok(best);
            }
            let mid = 0.5 * (low + high);
            if mid <= low || mid >= high {
                return Err(TerminatorError::NumericDivergence {
                    cut,
                    iterations: iteration,
                });
            }
            let hit = self.cast(family, mid)?;
            if let Some(point) = hit {
                best = point;
            }
            if hit.is_some() == hit_is_low {
                low = mid;
            } else {
                high = mid;
            }
        }
        Err(TerminatorError::NumericDivergence {
            cut,
            iterations: MAX_BISECTIONS,
        })
    }
}
