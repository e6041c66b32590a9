//! Illumination geometry and aberration-correction loci.

use terminus_core::matrix::{Matrix3, mtxv, mxv};
use terminus_core::vector::{self, Vector3};
use terminus_ephemeris::aberration::{self, stellar_aberration};
use terminus_ephemeris::{EphemerisProvider, ReferenceFrame};
use terminus_method::{MethodSpec, Shape, SurfaceRef};
use terminus_surface::SurfaceSelection;
use tracing::{debug, trace};

use crate::ellipsoid::ellipsoid_terminator;
use crate::{CuttingHalfPlane, TerminatorContext, TerminatorError, TerminatorRequest};

/// Spherical illumination source, positioned relative to the target center
/// in the body-fixed frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceSphere {
    pub center: Vector3,
    pub radius: f64,
}

/// How observer-to-point vectors are formed for a row.
#[derive(Debug, Clone, Copy)]
enum ObserverVector {
    /// Apparent observer to target-center vector, body-fixed.
    Center(Vector3),
    /// Geometric J2000 observer to target-center vector at the row epoch;
    /// stellar aberration, when requested, is applied per point.
    PerPoint {
        center_j2000: Vector3,
        observer_velocity: Option<Vector3>,
    },
}

/// Geometry shared by every point of one cut.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CutGeometry {
    pub epoch: f64,
    pub source: SourceSphere,
    rotation: Matrix3,
    observer: ObserverVector,
}

impl CutGeometry {
    /// Observer to `point` vector in the body-fixed frame at the row epoch.
    pub fn surface_vector(&self, point: &Vector3) -> Result<Vector3, TerminatorError> {
        match self.observer {
            ObserverVector::Center(center) => Ok(vector::add(&center, point)),
            ObserverVector::PerPoint {
                center_j2000,
                observer_velocity,
            } => {
                let mut inertial = vector::add(&center_j2000, &mtxv(&self.rotation, point));
                if let Some(velocity) = observer_velocity {
                    inertial = stellar_aberration(&inertial, &velocity)?;
                }
                Ok(mxv(&self.rotation, &inertial))
            }
        }
    }
}

/// Bodies, frame, and shape data resolved from a request.
pub(crate) struct Scene<'a> {
    context: &'a TerminatorContext<'a>,
    request: &'a TerminatorRequest,
    pub target: i32,
    source: i32,
    observer: i32,
    frame: ReferenceFrame,
    pub radii: Vector3,
    source_radius: f64,
    pub selection: SurfaceSelection,
}

impl<'a> Scene<'a> {
    pub fn resolve(
        context: &'a TerminatorContext<'a>,
        request: &'a TerminatorRequest,
    ) -> Result<Self, TerminatorError> {
        let ephemeris = context.ephemeris;
        let target = ephemeris.body_code(&request.target)?;
        let source = ephemeris.body_code(&request.illumination_source)?;
        let observer = ephemeris.body_code(&request.observer)?;
        if observer == target {
            return Err(TerminatorError::configuration(
                "observer and target must be distinct bodies",
            ));
        }
        if source == target {
            return Err(TerminatorError::configuration(
                "illumination source and target must be distinct bodies",
            ));
        }

        let frame = ephemeris.frame(&request.frame)?;
        if frame.center != target {
            return Err(TerminatorError::configuration(format!(
                "frame `{}` is centered on body {}, not on target {}",
                frame.name, frame.center, target
            )));
        }

        let radii = ephemeris.radii(target)?;
        let source_radius = ephemeris.radii(source)?.into_iter().fold(0.0, f64::max);
        let selection = resolve_selection(context, &request.method, target)?;

        debug!(
            target,
            source,
            observer,
            frame = %frame.name,
            ?radii,
            source_radius,
            "resolved terminator scene"
        );
        Ok(Self {
            context,
            request,
            target,
            source,
            observer,
            frame,
            radii,
            source_radius,
            selection,
        })
    }

    fn ephemeris(&self) -> &'a dyn EphemerisProvider {
        self.context.ephemeris
    }

    /// Source sphere and frame rotation at target epoch `epoch`.
    fn illumination_at(&self, epoch: f64) -> Result<(SourceSphere, Matrix3), TerminatorError> {
        let rotation = self.ephemeris().rotation(&self.frame, epoch)?;
        let source = aberration::position(
            self.ephemeris(),
            self.source,
            epoch,
            self.request.aberration_correction,
            self.target,
        )?;
        let sphere = SourceSphere {
            center: mxv(&rotation, &source.position_km),
            radius: self.source_radius,
        };
        Ok((sphere, rotation))
    }

    /// Geometry corrected for the light time of the target center.
    pub fn center_geometry(&self) -> Result<CutGeometry, TerminatorError> {
        let request = self.request;
        let apparent = aberration::position(
            self.ephemeris(),
            self.target,
            request.epoch,
            request.aberration_correction,
            self.observer,
        )?;
        let epoch = apparent.emission_epoch(request.epoch);
        let (source, rotation) = self.illumination_at(epoch)?;
        debug!(
            target_epoch = epoch,
            light_time = apparent.light_time_seconds,
            "center locus geometry"
        );
        Ok(CutGeometry {
            epoch,
            source,
            rotation,
            observer: ObserverVector::Center(mxv(&rotation, &apparent.position_km)),
        })
    }

    /// Geometry and half-plane for `cut`, corrected for the light time of
    /// the reference-ellipsoid terminator point in that cut.
    pub fn terminator_geometry(
        &self,
        cut: usize,
        center: &CutGeometry,
    ) -> Result<(CutGeometry, CuttingHalfPlane), TerminatorError> {
        let request = self.request;
        let correction = request.aberration_correction;
        let roll = request.roll(cut);
        let mut epoch = center.epoch;
        let mut source = center.source;
        let mut rotation = center.rotation;
        let mut plane = CuttingHalfPlane::new(&source.center, &request.reference_vector, roll)?;

        for iteration in 0..correction.light_time_iterations() {
            let Some(point) =
                ellipsoid_terminator(&self.radii, &source, request.method.shadow, &plane, cut)?
            else {
                break;
            };
            let light_time = aberration::point_position(
                self.ephemeris(),
                self.target,
                &self.frame,
                &point,
                request.epoch,
                correction,
                self.observer,
            )?
            .light_time_seconds;
            let next = request.epoch - light_time;
            let change = (next - epoch).abs();
            epoch = next;
            (source, rotation) = self.illumination_at(epoch)?;
            plane = CuttingHalfPlane::new(&source.center, &request.reference_vector, roll)?;
            trace!(cut, iteration, epoch, change, "terminator locus epoch");
            if change <= f64::EPSILON * epoch.abs().max(1.0) {
                break;
            }
        }

        let observer_state = self.ephemeris().ssb_state(self.observer, request.epoch)?;
        let target_state = self.ephemeris().ssb_state(self.target, epoch)?;
        let observer = ObserverVector::PerPoint {
            center_j2000: vector::sub(&target_state.position_km, &observer_state.position_km),
            observer_velocity: correction
                .uses_stellar()
                .then_some(observer_state.velocity_km_s),
        };
        Ok((
            CutGeometry {
                epoch,
                source,
                rotation,
                observer,
            },
            plane,
        ))
    }
}

fn resolve_selection(
    context: &TerminatorContext<'_>,
    method: &MethodSpec,
    target: i32,
) -> Result<SurfaceSelection, TerminatorError> {
    if method.shape != Shape::Dsk || method.surfaces.is_empty() {
        return Ok(SurfaceSelection::All);
    }
    let surfaces = context.surfaces()?;
    method
        .surfaces
        .iter()
        .map(|surface| match surface {
            SurfaceRef::Code(code) => Ok(*code),
            SurfaceRef::Name(name) => surfaces.registry().code_for(name, target).ok_or_else(|| {
                TerminatorError::DataUnavailable(format!(
                    "surface `{name}` is not registered for body {target}"
                ))
            }),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(SurfaceSelection::Only)
}
