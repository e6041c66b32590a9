//! Terminator point search.
//!
//! [`find_terminator_points`] traces the umbral or penumbral terminator of
//! a target illuminated by a spherical source. The terminator is sampled by
//! cutting half-planes that share the target to source axis as their edge;
//! each half-plane yields a row of points. Ellipsoid targets are solved
//! directly; plate-model targets are searched with tangent rays cast from
//! the source sphere. Rows are computed in parallel and returned in cut
//! order.

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use terminus_core::vector::Vector3;
use terminus_ephemeris::EphemerisProvider;
use terminus_method::{CurveType, Shape};
use terminus_surface::{Ray, SurfaceProvider};
use tracing::{Span, debug, info, info_span};

mod dsk;
mod ellipsoid;
mod error;
mod geometry;
mod halfplane;
mod request;
mod table;

pub use dsk::TangentSearch;
pub use ellipsoid::{MAX_BISECTIONS, ellipsoid_terminator, tangency_residual};
pub use error::TerminatorError;
pub use geometry::SourceSphere;
pub use halfplane::{CuttingHalfPlane, half_planes};
pub use request::{
    CorrectionLocus, DEFAULT_MAX_POINTS, DEFAULT_SEARCH_STEP, DEFAULT_SOLUTION_TOLERANCE,
    TerminatorRequest,
};
pub use table::{TerminatorPoint, TerminatorRow, TerminatorTable};

use geometry::{CutGeometry, Scene};

/// Data providers consulted by a search.
#[derive(Clone, Copy)]
pub struct TerminatorContext<'a> {
    pub ephemeris: &'a dyn EphemerisProvider,
    pub surfaces: Option<&'a dyn SurfaceProvider>,
}

impl<'a> TerminatorContext<'a> {
    /// Context for ellipsoid-only searches.
    pub fn new(ephemeris: &'a dyn EphemerisProvider) -> Self {
        Self {
            ephemeris,
            surfaces: None,
        }
    }

    pub fn with_surfaces(mut self, surfaces: &'a dyn SurfaceProvider) -> Self {
        self.surfaces = Some(surfaces);
        self
    }

    fn surfaces(&self) -> Result<&'a dyn SurfaceProvider, TerminatorError> {
        self.surfaces.ok_or_else(|| {
            TerminatorError::DataUnavailable("no topographic surface data is loaded".to_string())
        })
    }
}

/// Compute terminator points for every cut of `request`.
///
/// Fails on the first cut that fails; no partial table is returned.
pub fn find_terminator_points(
    context: &TerminatorContext<'_>,
    request: &TerminatorRequest,
) -> Result<TerminatorTable, TerminatorError> {
    let span = info_span!(
        "find_terminator_points",
        method = %request.method,
        cuts = request.cut_count,
        locus = %request.locus,
    );
    let _guard = span.enter();

    request.validate()?;
    let scene = Scene::resolve(context, request)?;
    let solver = Solver::new(context, request, &scene)?;
    let center = scene.center_geometry()?;
    let found = AtomicUsize::new(0);
    let parent = Span::current();

    let rows = match request.locus {
        CorrectionLocus::Center => {
            let planes = half_planes(
                &center.source.center,
                &request.reference_vector,
                request.roll_step,
                request.cut_count,
            )?;
            planes
                .into_par_iter()
                .enumerate()
                .map(|(cut, plane)| {
                    let _guard = parent.enter();
                    solver.row(cut, &center, plane, &found)
                })
                .collect::<Result<Vec<_>, _>>()?
        }
        CorrectionLocus::EllipsoidTerminator => (0..request.cut_count)
            .into_par_iter()
            .map(|cut| {
                let _guard = parent.enter();
                let (geometry, plane) = scene.terminator_geometry(cut, &center)?;
                solver.row(cut, &geometry, plane, &found)
            })
            .collect::<Result<Vec<_>, _>>()?,
    };

    let table = TerminatorTable::new(rows);
    info!(
        rows = table.len(),
        points = table.point_count(),
        "terminator search complete"
    );
    Ok(table)
}

/// Per-cut solver for the requested shape and curve type.
struct Solver<'s> {
    request: &'s TerminatorRequest,
    scene: &'s Scene<'s>,
    topography: Option<TangentSearch<'s>>,
}

impl<'s> Solver<'s> {
    fn new(
        context: &'s TerminatorContext<'s>,
        request: &'s TerminatorRequest,
        scene: &'s Scene<'s>,
    ) -> Result<Self, TerminatorError> {
        let topography = match request.method.shape {
            Shape::Ellipsoid => None,
            Shape::Dsk => {
                let surfaces = context.surfaces()?;
                let bounding_radius = surfaces.bounding_radius(scene.target, &scene.selection)?;
                debug!(bounding_radius, "topographic search setup");
                Some(TangentSearch {
                    surfaces,
                    body: scene.target,
                    selection: &scene.selection,
                    bounding_radius,
                    step: request.search_step,
                    tolerance: request.solution_tolerance,
                })
            }
        };
        Ok(Self {
            request,
            scene,
            topography,
        })
    }

    fn positions(
        &self,
        cut: usize,
        geometry: &CutGeometry,
        plane: &CuttingHalfPlane,
    ) -> Result<Vec<Vector3>, TerminatorError> {
        let shadow = self.request.method.shadow;
        if let Some(search) = &self.topography {
            return search.search(&geometry.source, shadow, plane, cut);
        }
        let radii = &self.scene.radii;
        let Some(point) = ellipsoid_terminator(radii, &geometry.source, shadow, plane, cut)? else {
            return Ok(Vec::new());
        };
        let point = match self.request.method.curve_type {
            CurveType::Tangent => Some(point),
            CurveType::Guided => {
                terminus_surface::ellipsoid::intersect(radii, &Ray::new([0.0; 3], point))
            }
        };
        Ok(point.into_iter().collect())
    }

    fn row(
        &self,
        cut: usize,
        geometry: &CutGeometry,
        plane: CuttingHalfPlane,
        found: &AtomicUsize,
    ) -> Result<TerminatorRow, TerminatorError> {
        let positions = self.positions(cut, geometry, &plane)?;
        let total = found.fetch_add(positions.len(), Ordering::Relaxed) + positions.len();
        if total > self.request.max_points {
            return Err(TerminatorError::CapacityExceeded {
                limit: self.request.max_points,
            });
        }
        let points = positions
            .into_iter()
            .map(|position| {
                Ok(TerminatorPoint {
                    position,
                    target_epoch: geometry.epoch,
                    surface_vector: geometry.surface_vector(&position)?,
                })
            })
            .collect::<Result<Vec<_>, TerminatorError>>()?;
        debug!(
            cut,
            roll = plane.roll,
            target_epoch = geometry.epoch,
            points = points.len(),
            "cut solved"
        );
        Ok(TerminatorRow {
            cut,
            half_plane: plane,
            target_epoch: geometry.epoch,
            points,
        })
    }
}
