//! Request parameters for a terminator search.

use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;

use terminus_core::vector::{self, Vector3};
use terminus_ephemeris::{AberrationCorrection, Body};
use terminus_method::{CurveType, MethodSpec, Shape};

use crate::TerminatorError;

/// Search step (radians) large enough to take a single bracketing step,
/// which suffices for convex targets.
pub const DEFAULT_SEARCH_STEP: f64 = 4.0;
pub const DEFAULT_SOLUTION_TOLERANCE: f64 = 1.0e-12;
pub const DEFAULT_MAX_POINTS: usize = 10_000;

/// Where aberration corrections are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CorrectionLocus {
    /// One correction, computed for the target center, for every point.
    #[default]
    Center,
    /// Per cut, the correction of the reference-ellipsoid terminator point
    /// in that cut.
    EllipsoidTerminator,
}

impl FromStr for CorrectionLocus {
    type Err = TerminatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .replace('_', " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_uppercase();
        match normalized.as_str() {
            "CENTER" => Ok(CorrectionLocus::Center),
            "ELLIPSOID TERMINATOR" => Ok(CorrectionLocus::EllipsoidTerminator),
            _ => Err(TerminatorError::configuration(format!(
                "unrecognized aberration correction locus `{s}`"
            ))),
        }
    }
}

impl fmt::Display for CorrectionLocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CorrectionLocus::Center => "CENTER",
            CorrectionLocus::EllipsoidTerminator => "ELLIPSOID TERMINATOR",
        })
    }
}

/// Everything needed to compute one terminator table.
///
/// `frame` must be a body-fixed frame centered on `target`; positions,
/// the reference vector, and observer vectors are all expressed in it.
/// Angles are in radians and `epoch` is seconds past J2000 TDB.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminatorRequest {
    pub method: MethodSpec,
    pub illumination_source: Body,
    pub target: Body,
    pub epoch: f64,
    pub frame: String,
    pub aberration_correction: AberrationCorrection,
    pub locus: CorrectionLocus,
    pub observer: Body,
    pub reference_vector: Vector3,
    pub roll_step: f64,
    pub cut_count: usize,
    pub search_step: f64,
    pub solution_tolerance: f64,
    pub max_points: usize,
}

impl TerminatorRequest {
    /// Request with a single cut containing the frame's +Z axis, no
    /// aberration correction, and default search settings.
    pub fn new(
        method: MethodSpec,
        illumination_source: Body,
        target: Body,
        observer: Body,
        frame: &str,
        epoch: f64,
    ) -> Self {
        Self {
            method,
            illumination_source,
            target,
            epoch,
            frame: frame.to_string(),
            aberration_correction: AberrationCorrection::None,
            locus: CorrectionLocus::Center,
            observer,
            reference_vector: [0.0, 0.0, 1.0],
            roll_step: TAU,
            cut_count: 1,
            search_step: DEFAULT_SEARCH_STEP,
            solution_tolerance: DEFAULT_SOLUTION_TOLERANCE,
            max_points: DEFAULT_MAX_POINTS,
        }
    }

    pub fn with_correction(
        mut self,
        correction: AberrationCorrection,
        locus: CorrectionLocus,
    ) -> Self {
        self.aberration_correction = correction;
        self.locus = locus;
        self
    }

    /// `count` cuts evenly spaced about the axis, starting at `reference`.
    pub fn with_cuts(mut self, reference: Vector3, count: usize) -> Self {
        self.reference_vector = reference;
        self.cut_count = count;
        if count > 0 {
            self.roll_step = TAU / count as f64;
        }
        self
    }

    pub fn with_roll_step(mut self, roll_step: f64) -> Self {
        self.roll_step = roll_step;
        self
    }

    pub fn with_search(mut self, step: f64, tolerance: f64) -> Self {
        self.search_step = step;
        self.solution_tolerance = tolerance;
        self
    }

    pub fn with_max_points(mut self, max_points: usize) -> Self {
        self.max_points = max_points;
        self
    }

    /// Roll angle of cut `cut`.
    pub fn roll(&self, cut: usize) -> f64 {
        cut as f64 * self.roll_step
    }

    /// Checks that need no ephemeris or surface data.
    pub fn validate(&self) -> Result<(), TerminatorError> {
        if self.cut_count == 0 {
            return Err(TerminatorError::configuration("cut count must be at least 1"));
        }
        if self.max_points == 0 {
            return Err(TerminatorError::configuration(
                "maximum point count must be at least 1",
            ));
        }
        if !self.epoch.is_finite() || !self.roll_step.is_finite() {
            return Err(TerminatorError::configuration(
                "epoch and roll step must be finite",
            ));
        }
        if vector::unit(&self.reference_vector).is_none() {
            return Err(TerminatorError::configuration(
                "reference vector must be a finite non-zero vector",
            ));
        }
        if self.method.curve_type == CurveType::Guided && self.locus != CorrectionLocus::Center {
            return Err(TerminatorError::configuration(
                "the GUIDED curve type requires the CENTER aberration correction locus",
            ));
        }
        if self.method.shape == Shape::Dsk {
            for (name, value) in [
                ("search step", self.search_step),
                ("solution tolerance", self.solution_tolerance),
            ] {
                if !(value.is_finite() && value > 0.0) {
                    return Err(TerminatorError::configuration(format!(
                        "{name} must be a positive number, got {value}"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terminus_method::Shadow;

    fn request(method: &str) -> TerminatorRequest {
        TerminatorRequest::new(
            MethodSpec::parse(method).unwrap(),
            Body::named("sun"),
            Body::named("mars"),
            Body::named("earth"),
            "IAU_MARS",
            0.0,
        )
    }

    #[test]
    fn locus_names_parse_loosely() {
        for text in ["center", " Center ", "ELLIPSOID  TERMINATOR", "ellipsoid_terminator"] {
            assert!(text.parse::<CorrectionLocus>().is_ok(), "{text}");
        }
        assert!("LIMB".parse::<CorrectionLocus>().is_err());
        assert_eq!(
            CorrectionLocus::EllipsoidTerminator.to_string().parse::<CorrectionLocus>(),
            Ok(CorrectionLocus::EllipsoidTerminator)
        );
    }

    #[test]
    fn guided_needs_center_locus() {
        let guided = request("UMBRAL/GUIDED/ELLIPSOID");
        assert!(guided.validate().is_ok());
        let err = guided
            .with_correction(AberrationCorrection::Lt, CorrectionLocus::EllipsoidTerminator)
            .validate()
            .unwrap_err();
        assert!(matches!(err, TerminatorError::Configuration(_)));
    }

    #[test]
    fn argument_checks() {
        let base = request("UMBRAL/TANGENT/DSK/UNPRIORITIZED");
        assert!(base.clone().with_cuts([0.0, 0.0, 1.0], 0).validate().is_err());
        assert!(base.clone().with_cuts([0.0; 3], 3).validate().is_err());
        assert!(base.clone().with_max_points(0).validate().is_err());
        assert!(base.clone().with_search(0.0, 1e-9).validate().is_err());
        assert!(base.clone().with_search(1e-3, f64::NAN).validate().is_err());

        let ellipsoid = TerminatorRequest {
            method: MethodSpec::ellipsoid(Shadow::Umbral, CurveType::Tangent),
            ..base.clone()
        };
        assert!(ellipsoid.with_search(0.0, 0.0).validate().is_ok());
        assert_eq!(base.with_cuts([1.0, 0.0, 0.0], 4).roll(2), std::f64::consts::PI);
    }
}
