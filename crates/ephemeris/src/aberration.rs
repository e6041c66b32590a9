//! Light-time and stellar-aberration corrected positions (reception case).

use std::fmt;
use std::str::FromStr;

use terminus_core::constants::CLIGHT_KM_S;
use terminus_core::matrix::mtxv;
use terminus_core::vector::{self, Vector3};
use tracing::trace;

use crate::{EphemerisError, EphemerisProvider, ReferenceFrame};

/// Upper bound on light-time iterations for converged corrections.
pub const MAX_CONVERGED_ITERATIONS: usize = 10;

/// Aberration correction applied to observer-relative positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AberrationCorrection {
    #[default]
    None,
    /// One-iteration Newtonian light time.
    Lt,
    /// One-iteration light time plus stellar aberration.
    LtS,
    /// Converged Newtonian light time.
    Cn,
    /// Converged light time plus stellar aberration.
    CnS,
}

impl AberrationCorrection {
    pub fn uses_light_time(self) -> bool {
        !matches!(self, AberrationCorrection::None)
    }

    pub fn uses_stellar(self) -> bool {
        matches!(self, AberrationCorrection::LtS | AberrationCorrection::CnS)
    }

    pub fn is_converged(self) -> bool {
        matches!(self, AberrationCorrection::Cn | AberrationCorrection::CnS)
    }

    /// Number of light-time refinements performed after the geometric
    /// estimate.
    pub fn light_time_iterations(self) -> usize {
        match self {
            AberrationCorrection::None => 0,
            AberrationCorrection::Lt | AberrationCorrection::LtS => 1,
            AberrationCorrection::Cn | AberrationCorrection::CnS => MAX_CONVERGED_ITERATIONS,
        }
    }
}

impl FromStr for AberrationCorrection {
    type Err = EphemerisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();
        match compact.as_str() {
            "NONE" => Ok(AberrationCorrection::None),
            "LT" => Ok(AberrationCorrection::Lt),
            "LT+S" => Ok(AberrationCorrection::LtS),
            "CN" => Ok(AberrationCorrection::Cn),
            "CN+S" => Ok(AberrationCorrection::CnS),
            _ => Err(EphemerisError::InvalidCorrection(s.to_string())),
        }
    }
}

impl fmt::Display for AberrationCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AberrationCorrection::None => "NONE",
            AberrationCorrection::Lt => "LT",
            AberrationCorrection::LtS => "LT+S",
            AberrationCorrection::Cn => "CN",
            AberrationCorrection::CnS => "CN+S",
        })
    }
}

/// Observer-relative J2000 position with its one-way light time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectedPosition {
    pub position_km: Vector3,
    pub light_time_seconds: f64,
}

impl CorrectedPosition {
    /// Epoch at which the light left the emitter.
    pub fn emission_epoch(&self, et: f64) -> f64 {
        et - self.light_time_seconds
    }
}

/// Position of body `target` as seen from body `observer` at `et`,
/// expressed in J2000.
pub fn position<P>(
    provider: &P,
    target: i32,
    et: f64,
    correction: AberrationCorrection,
    observer: i32,
) -> Result<CorrectedPosition, EphemerisError>
where
    P: EphemerisProvider + ?Sized,
{
    correct(provider, et, correction, observer, |epoch| {
        Ok(provider.ssb_state(target, epoch)?.position_km)
    })
}

/// Position of a point fixed in `frame` (centered on `target`) as seen from
/// `observer` at `et`, expressed in J2000. The light time is that of the
/// point itself, so the frame orientation is evaluated at the point's own
/// emission epoch.
pub fn point_position<P>(
    provider: &P,
    target: i32,
    frame: &ReferenceFrame,
    point_km: &Vector3,
    et: f64,
    correction: AberrationCorrection,
    observer: i32,
) -> Result<CorrectedPosition, EphemerisError>
where
    P: EphemerisProvider + ?Sized,
{
    correct(provider, et, correction, observer, |epoch| {
        let center = provider.ssb_state(target, epoch)?.position_km;
        let rotation = provider.rotation(frame, epoch)?;
        Ok(vector::add(&center, &mtxv(&rotation, point_km)))
    })
}

fn correct<P, F>(
    provider: &P,
    et: f64,
    correction: AberrationCorrection,
    observer: i32,
    emitter: F,
) -> Result<CorrectedPosition, EphemerisError>
where
    P: EphemerisProvider + ?Sized,
    F: Fn(f64) -> Result<Vector3, EphemerisError>,
{
    let observer_state = provider.ssb_state(observer, et)?;
    let mut position = vector::sub(&emitter(et)?, &observer_state.position_km);
    let mut light_time = vector::norm(&position) / CLIGHT_KM_S;

    for iteration in 0..correction.light_time_iterations() {
        position = vector::sub(&emitter(et - light_time)?, &observer_state.position_km);
        let next = vector::norm(&position) / CLIGHT_KM_S;
        let delta = (next - light_time).abs();
        light_time = next;
        if correction.is_converged() && delta <= f64::EPSILON * light_time.max(1.0e-12) {
            trace!(iteration, light_time, "light time converged");
            break;
        }
    }

    if !correction.uses_light_time() {
        light_time = 0.0;
    }
    if correction.uses_stellar() {
        position = stellar_aberration(&position, &observer_state.velocity_km_s)?;
    }

    Ok(CorrectedPosition {
        position_km: position,
        light_time_seconds: light_time,
    })
}

/// Apply the Newtonian stellar aberration correction: the apparent direction
/// is rotated toward the observer's velocity by `asin(|u × v/c|)`.
pub fn stellar_aberration(
    position_km: &Vector3,
    observer_velocity_km_s: &Vector3,
) -> Result<Vector3, EphemerisError> {
    let speed = vector::norm(observer_velocity_km_s);
    if speed >= CLIGHT_KM_S {
        return Err(EphemerisError::Superluminal { speed_km_s: speed });
    }
    let Some(direction) = vector::unit(position_km) else {
        return Ok(*position_km);
    };
    let beta = vector::scale(observer_velocity_km_s, 1.0 / CLIGHT_KM_S);
    let axis = vector::cross(&direction, &beta);
    let sin_phi = vector::norm(&axis);
    if sin_phi == 0.0 {
        return Ok(*position_km);
    }
    Ok(vector::rotate_about(position_km, &axis, sin_phi.min(1.0).asin()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn correction_strings_are_case_and_blank_insensitive() {
        assert_eq!(
            "lt + s".parse::<AberrationCorrection>().unwrap(),
            AberrationCorrection::LtS
        );
        assert_eq!(
            " cn+S ".parse::<AberrationCorrection>().unwrap(),
            AberrationCorrection::CnS
        );
        assert!("XLT".parse::<AberrationCorrection>().is_err());
    }

    #[test]
    fn stellar_aberration_tilts_toward_velocity() {
        let position = [1.0e8, 0.0, 0.0];
        let velocity = [0.0, 30.0, 0.0];
        let apparent = stellar_aberration(&position, &velocity).unwrap();

        assert_relative_eq!(vector::norm(&apparent), 1.0e8, max_relative = 1e-12);
        assert!(apparent[1] > 0.0);
        let expected = (30.0 / CLIGHT_KM_S).asin();
        assert_relative_eq!(
            vector::separation(&position, &apparent),
            expected,
            max_relative = 1e-9
        );
    }
}
