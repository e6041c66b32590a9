//! In-memory ephemeris provider assembled from analytic body models.

use std::collections::HashMap;

use terminus_core::constants::SSB_CODE;
use terminus_core::matrix::{IDENTITY, Matrix3};
use terminus_core::vector::{self, Vector3};

use crate::{
    Body, EphemerisError, EphemerisProvider, FrameKind, Orientation, ReferenceFrame, StateVector,
    Trajectory, normalize_name,
};

/// Maximum depth of center-of-motion chains.
const MAX_CENTER_DEPTH: usize = 32;

/// Name of the built-in inertial frame.
pub const J2000_FRAME: &str = "J2000";

/// Models describing one body.
#[derive(Debug, Clone)]
pub struct BodyRecord {
    pub code: i32,
    pub name: String,
    pub trajectory: Option<Trajectory>,
    pub orientation: Option<Orientation>,
    pub radii_km: Option<Vector3>,
}

impl BodyRecord {
    pub fn new(code: i32, name: &str) -> Self {
        Self {
            code,
            name: normalize_name(name),
            trajectory: None,
            orientation: None,
            radii_km: None,
        }
    }

    pub fn with_trajectory(mut self, trajectory: Trajectory) -> Self {
        self.trajectory = Some(trajectory);
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub fn with_radii(mut self, radii_km: Vector3) -> Self {
        self.radii_km = Some(radii_km);
        self
    }
}

/// Ephemeris provider holding body models in memory.
///
/// The solar system barycenter (code 0) and the `J2000` frame are always
/// present. Every body with an orientation model gets an `IAU_<NAME>`
/// body-fixed frame.
#[derive(Debug, Clone)]
pub struct CatalogEphemeris {
    bodies: HashMap<i32, BodyRecord>,
    names: HashMap<String, i32>,
    frames: HashMap<String, ReferenceFrame>,
    frame_orientation: HashMap<String, i32>,
}

impl Default for CatalogEphemeris {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogEphemeris {
    pub fn new() -> Self {
        let mut catalog = Self {
            bodies: HashMap::new(),
            names: HashMap::new(),
            frames: HashMap::new(),
            frame_orientation: HashMap::new(),
        };
        catalog.insert(BodyRecord::new(SSB_CODE, "SOLAR SYSTEM BARYCENTER"));
        catalog.add_alias("SSB", SSB_CODE);
        catalog.frames.insert(
            J2000_FRAME.to_string(),
            ReferenceFrame {
                name: J2000_FRAME.to_string(),
                center: SSB_CODE,
                kind: FrameKind::Inertial,
            },
        );
        catalog
    }

    /// Add or replace a body. Registers its name and, when it has an
    /// orientation model, its `IAU_<NAME>` frame.
    pub fn insert(&mut self, record: BodyRecord) -> &mut Self {
        let code = record.code;
        self.names.insert(record.name.clone(), code);
        if record.orientation.is_some() {
            let frame = format!("IAU_{}", record.name.replace(' ', "_"));
            self.add_body_fixed_frame(&frame, code);
        }
        self.bodies.insert(code, record);
        self
    }

    /// Builder-style variant of [`CatalogEphemeris::insert`].
    pub fn with_body(mut self, record: BodyRecord) -> Self {
        self.insert(record);
        self
    }

    /// Register an additional name for a body code.
    pub fn add_alias(&mut self, name: &str, code: i32) -> &mut Self {
        self.names.insert(normalize_name(name), code);
        self
    }

    /// Register a body-fixed frame that uses the orientation model of
    /// `center`.
    pub fn add_body_fixed_frame(&mut self, name: &str, center: i32) -> &mut Self {
        let key = normalize_name(name);
        self.frames.insert(
            key.clone(),
            ReferenceFrame {
                name: key.clone(),
                center,
                kind: FrameKind::BodyFixed,
            },
        );
        self.frame_orientation.insert(key, center);
        self
    }

    pub fn body_codes(&self) -> impl Iterator<Item = i32> + '_ {
        self.bodies.keys().copied()
    }

    fn record(&self, code: i32) -> Result<&BodyRecord, EphemerisError> {
        self.bodies
            .get(&code)
            .ok_or_else(|| EphemerisError::UnknownBody(code.to_string()))
    }
}

impl EphemerisProvider for CatalogEphemeris {
    fn body_code(&self, body: &Body) -> Result<i32, EphemerisError> {
        match body {
            Body::Code(code) => {
                self.record(*code)?;
                Ok(*code)
            }
            Body::Name(name) => self
                .names
                .get(&normalize_name(name))
                .copied()
                .ok_or_else(|| EphemerisError::UnknownBody(name.clone())),
        }
    }

    fn body_name(&self, code: i32) -> Option<String> {
        self.bodies.get(&code).map(|record| record.name.clone())
    }

    fn ssb_state(&self, code: i32, et: f64) -> Result<StateVector, EphemerisError> {
        let mut position = vector::ZERO;
        let mut velocity = vector::ZERO;
        let mut current = code;
        for _ in 0..MAX_CENTER_DEPTH {
            if current == SSB_CODE {
                return Ok(StateVector::geometric(position, velocity));
            }
            let trajectory = self
                .record(current)?
                .trajectory
                .as_ref()
                .ok_or(EphemerisError::MissingState { code: current, et })?;
            let (p, v) = trajectory.relative_state(et);
            position = vector::add(&position, &p);
            velocity = vector::add(&velocity, &v);
            current = trajectory.center();
        }
        Err(EphemerisError::CenterChain(code))
    }

    fn frame(&self, name: &str) -> Result<ReferenceFrame, EphemerisError> {
        self.frames
            .get(&normalize_name(name))
            .cloned()
            .ok_or_else(|| EphemerisError::UnknownFrame(name.to_string()))
    }

    fn rotation(&self, frame: &ReferenceFrame, et: f64) -> Result<Matrix3, EphemerisError> {
        if frame.kind == FrameKind::Inertial {
            return Ok(IDENTITY);
        }
        let missing = || EphemerisError::MissingOrientation {
            frame: frame.name.clone(),
            et,
        };
        let code = self.frame_orientation.get(&frame.name).ok_or_else(missing)?;
        let orientation = self
            .record(*code)?
            .orientation
            .as_ref()
            .ok_or_else(missing)?;
        Ok(orientation.rotation(et))
    }

    fn radii(&self, code: i32) -> Result<Vector3, EphemerisError> {
        let radii = self
            .record(code)?
            .radii_km
            .ok_or(EphemerisError::MissingRadii(code))?;
        if radii.iter().any(|r| !(r.is_finite() && *r > 0.0)) {
            return Err(EphemerisError::InvalidRadii { code, radii });
        }
        Ok(radii)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn mars_system() -> CatalogEphemeris {
        CatalogEphemeris::new()
            .with_body(
                BodyRecord::new(499, "Mars").with_trajectory(Trajectory::Linear {
                    center: SSB_CODE,
                    epoch: 0.0,
                    position_km: [2.0e8, 0.0, 0.0],
                    velocity_km_s: [0.0, 24.0, 0.0],
                }),
            )
            .with_body(
                BodyRecord::new(401, "phobos")
                    .with_trajectory(Trajectory::Linear {
                        center: 499,
                        epoch: 0.0,
                        position_km: [9_376.0, 0.0, 0.0],
                        velocity_km_s: [0.0, 2.1, 0.0],
                    })
                    .with_orientation(Orientation::Fixed(IDENTITY))
                    .with_radii([13.0, 11.4, 9.1]),
            )
    }

    #[test]
    fn states_chain_through_centers() {
        let catalog = mars_system();
        let state = catalog.ssb_state(401, 10.0).unwrap();
        assert_relative_eq!(state.position_km[0], 2.0e8 + 9_376.0);
        assert_relative_eq!(state.position_km[1], 261.0, max_relative = 1e-12);
        assert_relative_eq!(state.velocity_km_s[1], 26.1, max_relative = 1e-12);
    }

    #[test]
    fn names_and_frames_resolve_case_insensitively() {
        let catalog = mars_system();
        assert_eq!(catalog.body_code(&Body::named("  PHOBOS ")).unwrap(), 401);
        let frame = catalog.frame("iau_phobos").unwrap();
        assert_eq!(frame.center, 401);
        assert_eq!(frame.kind, FrameKind::BodyFixed);
        assert!(matches!(
            catalog.frame("IAU_MARS"),
            Err(EphemerisError::UnknownFrame(_))
        ));
        assert!(matches!(
            catalog.radii(499),
            Err(EphemerisError::MissingRadii(499))
        ));
    }
}
