//! Triangular plate models.

use std::f64::consts::{PI, TAU};

use terminus_core::vector::{self, Vector3};

use crate::{Ray, SurfaceError};

/// Barycentric slack so rays through shared plate edges never slip between
/// neighbouring plates.
const EDGE_TOLERANCE: f64 = 1.0e-12;

/// A set of triangular plates describing one surface of one body.
#[derive(Debug, Clone)]
pub struct PlateModel {
    pub body: i32,
    pub surface_id: i32,
    vertices: Vec<Vector3>,
    plates: Vec<[usize; 3]>,
    bounding_radius: f64,
}

impl PlateModel {
    /// Build a model, validating plate vertex indices (0-based).
    pub fn new(
        body: i32,
        surface_id: i32,
        vertices: Vec<Vector3>,
        plates: Vec<[usize; 3]>,
    ) -> Result<Self, SurfaceError> {
        if plates.is_empty() {
            return Err(SurfaceError::EmptyModel {
                surface: surface_id,
            });
        }
        for (index, plate) in plates.iter().enumerate() {
            if let Some(&vertex) = plate.iter().find(|&&v| v >= vertices.len()) {
                return Err(SurfaceError::BadVertexIndex {
                    surface: surface_id,
                    plate: index,
                    vertex,
                });
            }
        }
        let bounding_radius = vertices.iter().map(vector::norm).fold(0.0, f64::max);
        Ok(Self {
            body,
            surface_id,
            vertices,
            plates,
            bounding_radius,
        })
    }

    /// Tessellate a triaxial ellipsoid on a latitude/longitude grid with
    /// `bands` latitude bands and `slices` longitude slices.
    pub fn from_ellipsoid(
        body: i32,
        surface_id: i32,
        radii: Vector3,
        bands: usize,
        slices: usize,
    ) -> Result<Self, SurfaceError> {
        if bands < 2 || slices < 3 {
            return Err(SurfaceError::Tessellation);
        }
        let mut vertices = Vec::with_capacity((bands - 1) * slices + 2);
        vertices.push([0.0, 0.0, radii[2]]);
        for band in 1..bands {
            let colatitude = PI * band as f64 / bands as f64;
            let (sin_co, cos_co) = colatitude.sin_cos();
            for slice in 0..slices {
                let longitude = TAU * slice as f64 / slices as f64;
                let (sin_lon, cos_lon) = longitude.sin_cos();
                vertices.push([
                    radii[0] * sin_co * cos_lon,
                    radii[1] * sin_co * sin_lon,
                    radii[2] * cos_co,
                ]);
            }
        }
        let south = vertices.len();
        vertices.push([0.0, 0.0, -radii[2]]);

        let ring = |band: usize, slice: usize| 1 + (band - 1) * slices + slice % slices;
        let mut plates = Vec::with_capacity(2 * bands * slices);
        for slice in 0..slices {
            plates.push([0, ring(1, slice), ring(1, slice + 1)]);
        }
        for band in 1..bands - 1 {
            for slice in 0..slices {
                let (a, b) = (ring(band, slice), ring(band, slice + 1));
                let (c, d) = (ring(band + 1, slice), ring(band + 1, slice + 1));
                plates.push([a, c, d]);
                plates.push([a, d, b]);
            }
        }
        for slice in 0..slices {
            plates.push([south, ring(bands - 1, slice + 1), ring(bands - 1, slice)]);
        }
        Self::new(body, surface_id, vertices, plates)
    }

    pub fn vertices(&self) -> &[Vector3] {
        &self.vertices
    }

    pub fn plates(&self) -> &[[usize; 3]] {
        &self.plates
    }

    /// Largest vertex distance from the body center.
    pub fn bounding_radius(&self) -> f64 {
        self.bounding_radius
    }

    /// Nearest intersection parameter `t >= 0` along the ray, if any.
    pub fn intersect_parameter(&self, ray: &Ray) -> Option<f64> {
        if !ray_meets_sphere(ray, self.bounding_radius) {
            return None;
        }
        self.plates
            .iter()
            .filter_map(|plate| {
                triangle_parameter(
                    ray,
                    &self.vertices[plate[0]],
                    &self.vertices[plate[1]],
                    &self.vertices[plate[2]],
                )
            })
            .min_by(|a, b| a.total_cmp(b))
    }
}

fn ray_meets_sphere(ray: &Ray, radius: f64) -> bool {
    let dd = vector::dot(&ray.direction, &ray.direction);
    if dd == 0.0 {
        return false;
    }
    let t = (-vector::dot(&ray.vertex, &ray.direction) / dd).max(0.0);
    let closest = vector::add(&ray.vertex, &vector::scale(&ray.direction, t));
    vector::norm(&closest) <= radius * (1.0 + 1.0e-9)
}

/// Möller–Trumbore ray/triangle test.
fn triangle_parameter(ray: &Ray, p0: &Vector3, p1: &Vector3, p2: &Vector3) -> Option<f64> {
    let e1 = vector::sub(p1, p0);
    let e2 = vector::sub(p2, p0);
    let h = vector::cross(&ray.direction, &e2);
    let det = vector::dot(&e1, &h);
    if det == 0.0 {
        return None;
    }
    let inv = 1.0 / det;
    let s = vector::sub(&ray.vertex, p0);
    let u = inv * vector::dot(&s, &h);
    if !(-EDGE_TOLERANCE..=1.0 + EDGE_TOLERANCE).contains(&u) {
        return None;
    }
    let q = vector::cross(&s, &e1);
    let v = inv * vector::dot(&ray.direction, &q);
    if v < -EDGE_TOLERANCE || u + v > 1.0 + EDGE_TOLERANCE {
        return None;
    }
    let t = inv * vector::dot(&e2, &q);
    (t >= 0.0).then_some(t)
}
