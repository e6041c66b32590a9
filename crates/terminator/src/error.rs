use terminus_ephemeris::EphemerisError;
use terminus_method::{ConfigurationError, MethodError, ParseError};
use terminus_surface::SurfaceError;
use thiserror::Error;

/// Errors returned by [`crate::find_terminator_points`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TerminatorError {
    #[error("malformed method: {0}")]
    Parse(#[from] ParseError),
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error("data unavailable: {0}")]
    DataUnavailable(String),
    #[error("more than {limit} terminator points were found")]
    CapacityExceeded { limit: usize },
    #[error("terminator search in cut {cut} did not converge after {iterations} iterations")]
    NumericDivergence { cut: usize, iterations: usize },
}

impl TerminatorError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        TerminatorError::Configuration(message.into())
    }
}

impl From<ConfigurationError> for TerminatorError {
    fn from(err: ConfigurationError) -> Self {
        TerminatorError::Configuration(err.to_string())
    }
}

impl From<MethodError> for TerminatorError {
    fn from(err: MethodError) -> Self {
        match err {
            MethodError::Parse(err) => err.into(),
            MethodError::Configuration(err) => err.into(),
        }
    }
}

impl From<EphemerisError> for TerminatorError {
    fn from(err: EphemerisError) -> Self {
        match err {
            EphemerisError::InvalidCorrection(_) | EphemerisError::Superluminal { .. } => {
                TerminatorError::Configuration(err.to_string())
            }
            other => TerminatorError::DataUnavailable(other.to_string()),
        }
    }
}

impl From<SurfaceError> for TerminatorError {
    fn from(err: SurfaceError) -> Self {
        TerminatorError::DataUnavailable(err.to_string())
    }
}
