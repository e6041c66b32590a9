//! Terminator point finding for ellipsoid and plate-model targets.
//!
//! The workspace crates are re-exported here so front-ends (the `termpt`
//! CLI, the plotting tool, tests) depend on one facade.

pub use terminus_config as config;
pub use terminus_core as core;
pub use terminus_ephemeris as ephemeris;
pub use terminus_export as export;
pub use terminus_method as method;
pub use terminus_surface as surface;
pub use terminus_terminator as terminator;

/// Returns the version of the library for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
