//! Jagged result table.

use std::ops::Index;

use terminus_core::vector::Vector3;

use crate::CuttingHalfPlane;

/// One terminator point, body-fixed, km.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerminatorPoint {
    pub position: Vector3,
    /// Epoch (TDB seconds past J2000) at which the target participates.
    pub target_epoch: f64,
    /// Observer to point vector, evaluated at `target_epoch`.
    pub surface_vector: Vector3,
}

/// Points found in one cutting half-plane, outermost first.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminatorRow {
    pub cut: usize,
    pub half_plane: CuttingHalfPlane,
    /// Target epoch used for the cut, also when no point was found.
    pub target_epoch: f64,
    pub points: Vec<TerminatorPoint>,
}

impl TerminatorRow {
    pub fn roll(&self) -> f64 {
        self.half_plane.roll
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Rows in cut order; row `i` belongs to the half-plane rolled by
/// `i * roll_step`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TerminatorTable {
    rows: Vec<TerminatorRow>,
}

impl TerminatorTable {
    pub fn new(rows: Vec<TerminatorRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[TerminatorRow] {
        &self.rows
    }

    /// Number of rows (cuts).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn point_count(&self) -> usize {
        self.rows.iter().map(TerminatorRow::len).sum()
    }

    /// Every point with the index of its cut.
    pub fn points(&self) -> impl Iterator<Item = (usize, &TerminatorPoint)> + '_ {
        self.rows
            .iter()
            .flat_map(|row| row.points.iter().map(move |point| (row.cut, point)))
    }
}

impl Index<usize> for TerminatorTable {
    type Output = TerminatorRow;

    fn index(&self, cut: usize) -> &TerminatorRow {
        &self.rows[cut]
    }
}
