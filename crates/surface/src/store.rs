//! In-memory plate store implementing [`SurfaceProvider`].

use terminus_core::vector::{self, Vector3};

use crate::{PlateModel, Ray, SurfaceError, SurfaceProvider, SurfaceRegistry, SurfaceSelection};

/// Plate models for any number of bodies and surfaces.
#[derive(Debug, Clone, Default)]
pub struct PlateSurfaceStore {
    models: Vec<PlateModel>,
    registry: SurfaceRegistry,
}

impl PlateSurfaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plate model. Several models may share a body and surface ID;
    /// their plates are combined.
    pub fn insert(&mut self, model: PlateModel) -> &mut Self {
        self.models.push(model);
        self
    }

    pub fn with_model(mut self, model: PlateModel) -> Self {
        self.insert(model);
        self
    }

    /// Register a surface name for a body.
    pub fn name_surface(&mut self, name: &str, code: i32, body: i32) -> &mut Self {
        self.registry.add(name, code, body);
        self
    }

    pub fn models(&self) -> &[PlateModel] {
        &self.models
    }

    fn selected<'a>(
        &'a self,
        body: i32,
        selection: &'a SurfaceSelection,
    ) -> impl Iterator<Item = &'a PlateModel> + 'a {
        self.models
            .iter()
            .filter(move |model| model.body == body && selection.includes(model.surface_id))
    }
}

impl SurfaceProvider for PlateSurfaceStore {
    fn registry(&self) -> &SurfaceRegistry {
        &self.registry
    }

    fn has_data(&self, body: i32, selection: &SurfaceSelection) -> bool {
        self.selected(body, selection).next().is_some()
    }

    fn bounding_radius(
        &self,
        body: i32,
        selection: &SurfaceSelection,
    ) -> Result<f64, SurfaceError> {
        self.selected(body, selection)
            .map(PlateModel::bounding_radius)
            .reduce(f64::max)
            .ok_or_else(|| SurfaceError::NoData {
                body,
                selection: selection.clone(),
            })
    }

    fn intersect(
        &self,
        body: i32,
        selection: &SurfaceSelection,
        ray: &Ray,
    ) -> Result<Option<Vector3>, SurfaceError> {
        if !self.has_data(body, selection) {
            return Err(SurfaceError::NoData {
                body,
                selection: selection.clone(),
            });
        }
        let nearest = self
            .selected(body, selection)
            .filter_map(|model| model.intersect_parameter(ray))
            .min_by(|a, b| a.total_cmp(b));
        Ok(nearest.map(|t| vector::add(&ray.vertex, &vector::scale(&ray.direction, t))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> PlateSurfaceStore {
        let mut store = PlateSurfaceStore::new()
            .with_model(PlateModel::from_ellipsoid(401, 1, [10.0; 3], 12, 24).unwrap())
            .with_model(PlateModel::from_ellipsoid(401, 2, [12.0; 3], 12, 24).unwrap());
        store.name_surface("Phobos low res", 1, 401);
        store
    }

    #[test]
    fn unprioritized_union_returns_outermost_hit() {
        let ray = Ray::new([50.0, 0.0, 0.0], [-1.0, 0.0, 0.0]);
        let all = store().intersect(401, &SurfaceSelection::All, &ray).unwrap().unwrap();
        let only_inner = store()
            .intersect(401, &SurfaceSelection::Only(vec![1]), &ray)
            .unwrap()
            .unwrap();

        assert!(all[0] > 11.0);
        assert!(only_inner[0] < 10.01);
    }

    #[test]
    fn missing_data_is_an_error_not_a_miss() {
        let ray = Ray::new([50.0, 0.0, 0.0], [-1.0, 0.0, 0.0]);
        assert!(matches!(
            store().intersect(499, &SurfaceSelection::All, &ray),
            Err(SurfaceError::NoData { body: 499, .. })
        ));
        assert!(!store().has_data(401, &SurfaceSelection::Only(vec![9])));
        assert_eq!(store().registry().code_for("PHOBOS LOW RES", 401), Some(1));
    }
}
