//! Core units, constants, and shared primitives for the Terminus workspace.

/// Physical constants (kilometres and seconds unless stated otherwise).
pub mod constants {
    /// Speed of light in vacuum (km/s).
    pub const CLIGHT_KM_S: f64 = 299_792.458;
    /// Seconds per Julian day.
    pub const SECONDS_PER_DAY: f64 = 86_400.0;
    /// Days per Julian century.
    pub const DAYS_PER_CENTURY: f64 = 36_525.0;
    /// NAIF code of the solar system barycenter.
    pub const SSB_CODE: i32 = 0;
}

/// Basic unit conversion helpers.
pub mod units {
    /// Convert degrees to radians.
    #[inline]
    pub fn deg_to_rad(v: f64) -> f64 {
        v.to_radians()
    }

    /// Convert radians to degrees.
    #[inline]
    pub fn rad_to_deg(v: f64) -> f64 {
        v.to_degrees()
    }
}

pub mod matrix;
pub mod time;
pub mod vector;
