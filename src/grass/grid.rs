//! BladeGrid - uniform ground-plane hash grid over blade indices.
//!
//! Built once when the field is generated (blades never move), then used to
//! narrow radius queries down to the cells a circle overlaps.

use std::collections::HashMap;

use crate::core::types::{Vec2, Vec3};
use crate::math::planar;

/// Cell coordinate on the ground plane.
type CellCoord = (i32, i32);

/// Spatial index for radius queries over a fixed set of points.
#[derive(Clone, Debug)]
pub struct BladeGrid {
    cell_size: f32,
    cells: HashMap<CellCoord, Vec<u32>>,
    /// Inclusive (min, max) corners of the occupied cells.
    occupied: Option<(CellCoord, CellCoord)>,
    len: usize,
}

impl BladeGrid {
    /// Build from world positions. Index `i` in the grid refers to the
    /// `i`-th position yielded.
    pub fn build(positions: impl IntoIterator<Item = Vec3>, cell_size: f32) -> Self {
        let mut grid = Self {
            cell_size,
            cells: HashMap::new(),
            occupied: None,
            len: 0,
        };

        for (index, position) in positions.into_iter().enumerate() {
            let coord = grid.cell_of(planar(position));
            grid.cells.entry(coord).or_default().push(index as u32);
            grid.len += 1;
            grid.occupied = Some(match grid.occupied {
                None => (coord, coord),
                Some((lo, hi)) => (
                    (lo.0.min(coord.0), lo.1.min(coord.1)),
                    (hi.0.max(coord.0), hi.1.max(coord.1)),
                ),
            });
        }

        grid
    }

    fn cell_of(&self, p: Vec2) -> CellCoord {
        (
            (p.x / self.cell_size).floor() as i32,
            (p.y / self.cell_size).floor() as i32,
        )
    }

    /// Visit every indexed point whose cell overlaps the circle's bounding
    /// square. Callers apply the exact distance test themselves.
    ///
    /// The cell range is clamped to the occupied cells, so the cost is
    /// bounded by the grid's extent however large the radius is.
    pub fn visit_candidates(&self, center: Vec2, radius: f32, mut visit: impl FnMut(usize)) {
        if !(radius >= 0.0) || !center.is_finite() {
            return;
        }
        let Some((lo, hi)) = self.occupied else {
            return;
        };

        let (min_x, min_z) = self.cell_of(center - Vec2::splat(radius));
        let (max_x, max_z) = self.cell_of(center + Vec2::splat(radius));
        let (min_x, min_z) = (min_x.max(lo.0), min_z.max(lo.1));
        let (max_x, max_z) = (max_x.min(hi.0), max_z.min(hi.1));

        for x in min_x..=max_x {
            for z in min_z..=max_z {
                if let Some(indices) = self.cells.get(&(x, z)) {
                    for &i in indices {
                        visit(i as usize);
                    }
                }
            }
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of occupied cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of indexed points
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
