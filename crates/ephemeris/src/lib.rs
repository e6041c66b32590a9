//! Ephemeris and orientation queries used by the terminator search.
//!
//! The search never talks to kernel files directly. It goes through the
//! [`EphemerisProvider`] trait, which exposes geometric states relative to the
//! solar system barycenter, body-fixed frame rotations, and triaxial radii.
//! Light-time and stellar-aberration corrections are layered on top in
//! [`aberration`]. [`catalog::CatalogEphemeris`] is an in-memory provider
//! built from simple trajectory and rotation models.

use std::fmt;
use std::str::FromStr;

use terminus_core::matrix::Matrix3;
use terminus_core::vector::Vector3;
use thiserror::Error;

pub mod aberration;
pub mod catalog;
pub mod orientation;
pub mod trajectory;

pub use aberration::{AberrationCorrection, CorrectedPosition};
pub use catalog::{BodyRecord, CatalogEphemeris};
pub use orientation::Orientation;
pub use trajectory::Trajectory;

/// Position, velocity, and light-time of a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVector {
    pub position_km: [f64; 3],
    pub velocity_km_s: [f64; 3],
    pub light_time_seconds: f64,
}

impl StateVector {
    /// Geometric state with zero light time.
    pub fn geometric(position_km: Vector3, velocity_km_s: Vector3) -> Self {
        Self {
            position_km,
            velocity_km_s,
            light_time_seconds: 0.0,
        }
    }
}

/// Ephemeris object identified by name or NAIF-style integer code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Body {
    Code(i32),
    Name(String),
}

impl Body {
    /// Body referenced by name. The name is normalized (upper case,
    /// single blanks).
    pub fn named(name: &str) -> Self {
        Body::Name(normalize_name(name))
    }
}

impl FromStr for Body {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(match trimmed.parse::<i32>() {
            Ok(code) => Body::Code(code),
            Err(_) => Body::named(trimmed),
        })
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Code(code) => write!(f, "{code}"),
            Body::Name(name) => f.write_str(name),
        }
    }
}

/// Upper-case a name and collapse runs of whitespace to a single blank.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Kind of reference frame known to a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Inertial,
    BodyFixed,
}

/// A named reference frame and the body it is centered on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceFrame {
    pub name: String,
    pub center: i32,
    pub kind: FrameKind,
}

/// Errors surfaced while querying ephemeris, orientation, or radii data.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EphemerisError {
    #[error("body `{0}` is not known to the ephemeris provider")]
    UnknownBody(String),
    #[error("no ephemeris data for body {code} at ET {et}")]
    MissingState { code: i32, et: f64 },
    #[error("reference frame `{0}` is not known to the ephemeris provider")]
    UnknownFrame(String),
    #[error("no orientation data for frame `{frame}` at ET {et}")]
    MissingOrientation { frame: String, et: f64 },
    #[error("no radii available for body {0}")]
    MissingRadii(i32),
    #[error("radii for body {code} must be positive, got {radii:?}")]
    InvalidRadii { code: i32, radii: [f64; 3] },
    #[error("trajectory chain for body {0} is cyclic or too deep")]
    CenterChain(i32),
    #[error("observer speed {speed_km_s} km/s is not below the speed of light")]
    Superluminal { speed_km_s: f64 },
    #[error("invalid aberration correction `{0}`")]
    InvalidCorrection(String),
}

/// Read-only source of geometric states, frame rotations, and radii.
///
/// Implementations must be immutable while a search is running; the search
/// shares one provider across worker threads.
pub trait EphemerisProvider: Send + Sync {
    /// Resolve a body reference to its integer code.
    fn body_code(&self, body: &Body) -> Result<i32, EphemerisError>;

    /// Name registered for a body code, if any.
    fn body_name(&self, code: i32) -> Option<String>;

    /// Geometric J2000 state of a body relative to the solar system
    /// barycenter.
    fn ssb_state(&self, code: i32, et: f64) -> Result<StateVector, EphemerisError>;

    /// Look up a reference frame by name (case-insensitive).
    fn frame(&self, name: &str) -> Result<ReferenceFrame, EphemerisError>;

    /// Rotation taking J2000 vectors into `frame` at `et`.
    fn rotation(&self, frame: &ReferenceFrame, et: f64) -> Result<Matrix3, EphemerisError>;

    /// Triaxial radii (km) of a body's reference ellipsoid.
    fn radii(&self, code: i32) -> Result<Vector3, EphemerisError>;
}
