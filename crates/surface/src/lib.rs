//! Target surface models: triaxial ellipsoids and topographic plate sets.
//!
//! Topographic data are organized as plate models, each tagged with a body
//! code and a surface ID. Queries go through [`SurfaceProvider`], which
//! combines every selected plate set for a body without precedence
//! (unprioritized selection): the surface is the union of their plates.

use terminus_core::vector::Vector3;
use thiserror::Error;

pub mod ellipsoid;
pub mod obj;
pub mod plate;
pub mod registry;
pub mod store;

pub use plate::PlateModel;
pub use registry::SurfaceRegistry;
pub use store::PlateSurfaceStore;

/// Half-line starting at `vertex` along `direction` (need not be unit).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub vertex: Vector3,
    pub direction: Vector3,
}

impl Ray {
    pub fn new(vertex: Vector3, direction: Vector3) -> Self {
        Self { vertex, direction }
    }
}

/// Which surfaces of a body participate in a query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SurfaceSelection {
    /// Every surface loaded for the body.
    #[default]
    All,
    /// Only the listed surface IDs.
    Only(Vec<i32>),
}

impl SurfaceSelection {
    pub fn includes(&self, surface_id: i32) -> bool {
        match self {
            SurfaceSelection::All => true,
            SurfaceSelection::Only(ids) => ids.contains(&surface_id),
        }
    }
}

/// Errors raised by surface loading and queries.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("no topographic data for body {body} with surfaces {selection:?}")]
    NoData {
        body: i32,
        selection: SurfaceSelection,
    },
    #[error("plate model for surface {surface} has no plates")]
    EmptyModel { surface: i32 },
    #[error("plate {plate} of surface {surface} references missing vertex {vertex}")]
    BadVertexIndex {
        surface: i32,
        plate: usize,
        vertex: usize,
    },
    #[error("plate model line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("failed to read plate model: {0}")]
    Io(#[from] std::io::Error),
    #[error("tessellation needs at least 2 latitude bands and 3 longitude slices")]
    Tessellation,
}

/// Read-only source of topographic surface geometry.
///
/// Implementations must be immutable once a search starts; the search shares
/// one provider across worker threads.
pub trait SurfaceProvider: Send + Sync {
    /// Surface name/ID associations.
    fn registry(&self) -> &SurfaceRegistry;

    /// Whether any plates are available for `body` under `selection`.
    fn has_data(&self, body: i32, selection: &SurfaceSelection) -> bool;

    /// Radius of a body-centered sphere enclosing every selected plate.
    fn bounding_radius(&self, body: i32, selection: &SurfaceSelection)
    -> Result<f64, SurfaceError>;

    /// Nearest intersection of `ray` with the union of the selected plate
    /// sets. Coordinates are body-fixed, in km.
    fn intersect(
        &self,
        body: i32,
        selection: &SurfaceSelection,
        ray: &Ray,
    ) -> Result<Option<Vector3>, SurfaceError>;
}
