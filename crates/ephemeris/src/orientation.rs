//! Body orientation models in the IAU pole/prime-meridian form.

use std::f64::consts::FRAC_PI_2;

use terminus_core::matrix::{Matrix3, euler_313};
use terminus_core::time::{centuries_past_j2000, seconds_to_days};

/// Rotation from J2000 into a body-fixed frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Orientation {
    /// Time-invariant rotation matrix (J2000 to body-fixed).
    Fixed(Matrix3),
    /// Pole right ascension/declination with linear drift per Julian century
    /// and a prime meridian angle `W = W0 + Wd * d` (`d` in days past J2000).
    Iau {
        pole_ra_deg: f64,
        pole_ra_rate_deg_per_century: f64,
        pole_dec_deg: f64,
        pole_dec_rate_deg_per_century: f64,
        prime_meridian_deg: f64,
        rotation_rate_deg_per_day: f64,
    },
}

impl Orientation {
    /// J2000 to body-fixed rotation at `et`.
    pub fn rotation(&self, et: f64) -> Matrix3 {
        match self {
            Orientation::Fixed(matrix) => *matrix,
            Orientation::Iau {
                pole_ra_deg,
                pole_ra_rate_deg_per_century,
                pole_dec_deg,
                pole_dec_rate_deg_per_century,
                prime_meridian_deg,
                rotation_rate_deg_per_day,
            } => {
                let t = centuries_past_j2000(et);
                let d = seconds_to_days(et);
                let ra = (pole_ra_deg + pole_ra_rate_deg_per_century * t).to_radians();
                let dec = (pole_dec_deg + pole_dec_rate_deg_per_century * t).to_radians();
                let w = (prime_meridian_deg + rotation_rate_deg_per_day * d)
                    .rem_euclid(360.0)
                    .to_radians();
                euler_313(FRAC_PI_2 + ra, FRAC_PI_2 - dec, w)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use terminus_core::matrix::mxv;

    #[test]
    fn iau_pole_maps_to_body_z_axis() {
        let orientation = Orientation::Iau {
            pole_ra_deg: 317.68,
            pole_ra_rate_deg_per_century: 0.0,
            pole_dec_deg: 52.89,
            pole_dec_rate_deg_per_century: 0.0,
            prime_meridian_deg: 176.63,
            rotation_rate_deg_per_day: 350.89,
        };
        let (ra, dec) = (317.68f64.to_radians(), 52.89f64.to_radians());
        let pole = [dec.cos() * ra.cos(), dec.cos() * ra.sin(), dec.sin()];
        let body = mxv(&orientation.rotation(1.0e7), &pole);

        assert_relative_eq!(body[2], 1.0, max_relative = 1e-12);
    }
}
