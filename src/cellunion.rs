//! Unions of cells, kept in a normalized form.

use crate::cap::Cap;
use crate::cell::Cell;
use crate::cellid::{CellId, MAX_LEVEL};
use crate::point::Point;
use crate::rect::LatLngRect;
use crate::region::Region;

/// A region consisting of cells of various levels.
///
/// The ids are kept normalized: sorted, non-overlapping, and with any
/// four complete siblings replaced by their parent. Two unions cover the
/// same region exactly when their normalized ids are equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellUnion {
    ids: Vec<CellId>,
}

impl CellUnion {
    /// Builds a union from arbitrary cell ids, normalizing them.
    pub fn from_cell_ids(mut ids: Vec<CellId>) -> CellUnion {
        ids.sort_unstable();

        let mut output: Vec<CellId> = Vec::with_capacity(ids.len());
        for mut id in ids {
            // Ids are visited in increasing order, so an id contained by
            // the union so far is contained by the last output entry.
            if output.last().is_some_and(|last| last.contains(id)) {
                continue;
            }
            while output.last().is_some_and(|last| id.contains(*last)) {
                output.pop();
            }
            // Replace any group of four complete siblings by their parent,
            // repeatedly.
            while output.len() >= 3 {
                let n = output.len();
                // Necessary (but not sufficient) condition: the four ids
                // must XOR to zero.
                if output[n - 3].id() ^ output[n - 2].id() ^ output[n - 1].id() != id.id() {
                    break;
                }
                // Mask out the two bits encoding the child position and
                // check that the other three candidates agree.
                let mut mask = id.lowest_on_bit() << 1;
                mask = !(mask + (mask << 1));
                let id_masked = id.id() & mask;
                if output[n - 3].id() & mask != id_masked
                    || output[n - 2].id() & mask != id_masked
                    || output[n - 1].id() & mask != id_masked
                    || id.is_face()
                {
                    break;
                }
                output.truncate(n - 3);
                id = id.parent();
            }
            output.push(id);
        }
        CellUnion { ids: output }
    }

    #[inline]
    pub fn ids(&self) -> &[CellId] {
        &self.ids
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// True if the union fully covers the given cell. Exact, since the
    /// ids are normalized.
    pub fn contains(&self, id: CellId) -> bool {
        match self.ids.binary_search(&id) {
            Ok(_) => true,
            Err(pos) => {
                (pos < self.ids.len() && self.ids[pos].range_min() <= id)
                    || (pos > 0 && self.ids[pos - 1].range_max() >= id)
            }
        }
    }

    /// True if the union and the given cell have any leaf in common.
    pub fn intersects(&self, id: CellId) -> bool {
        match self.ids.binary_search(&id) {
            Ok(_) => true,
            Err(pos) => {
                (pos < self.ids.len() && self.ids[pos].range_min() <= id.range_max())
                    || (pos > 0 && self.ids[pos - 1].range_max() >= id.range_min())
            }
        }
    }

    /// Replaces cells with their descendants until every cell satisfies
    /// `level >= min_level` and `(level - min_level)` is a multiple of
    /// `level_mod`. The result covers the same region but is no longer
    /// normalized.
    pub fn denormalize(&self, min_level: u8, level_mod: u8) -> Vec<CellId> {
        debug_assert!(min_level <= MAX_LEVEL);
        debug_assert!((1..=3).contains(&level_mod));

        let mut output = Vec::with_capacity(self.ids.len());
        for &id in &self.ids {
            let level = id.level();
            let mut new_level = level.max(min_level);
            if level_mod > 1 {
                // Round up so that (new_level - min_level) is a multiple of
                // level_mod. MAX_LEVEL is itself a multiple of 3.
                new_level += (MAX_LEVEL - (new_level - min_level)) % level_mod;
                new_level = new_level.min(MAX_LEVEL);
            }
            if new_level == level {
                output.push(id);
            } else {
                let end = id.child_end_at(new_level);
                let mut child = id.child_begin_at(new_level);
                while child != end {
                    output.push(child);
                    child = child.next();
                }
            }
        }
        output
    }

    /// Number of leaf cells covered by the union. At most 6 * 2^60.
    pub fn leaf_cells_covered(&self) -> u64 {
        self.ids
            .iter()
            .map(|id| 1u64 << ((MAX_LEVEL - id.level()) as u32 * 2))
            .sum()
    }

    /// Approximate area based on the average area of leaf cells. Accurate
    /// to within a factor of 1.7; exact for unions of many leaves.
    pub fn average_based_area(&self) -> f64 {
        Cell::average_area(MAX_LEVEL) * self.leaf_cells_covered() as f64
    }
}

impl Region for CellUnion {
    fn contains_point(&self, p: Point) -> bool {
        self.contains(CellId::from_point(p))
    }

    fn contains_cell(&self, cell: &Cell) -> bool {
        self.contains(cell.id())
    }

    fn may_intersect_cell(&self, cell: &Cell) -> bool {
        self.intersects(cell.id())
    }

    fn cap_bound(&self) -> Cap {
        if self.ids.is_empty() {
            return Cap::empty();
        }

        // Area-weighted centroid of the cells as the cap axis. Not the
        // minimal bounding cap, but close.
        let mut centroid = Point::ZERO;
        for &id in &self.ids {
            centroid += Cell::average_area(id.level()) * id.to_point();
        }
        let axis = if centroid == Point::ZERO {
            Point::new(1.0, 0.0, 0.0)
        } else {
            centroid.normalize()
        };

        // Expanding by each cell's own bounding cap, rather than by the
        // cell vertices, stays correct even when the result is concave.
        let mut cap = Cap::from_axis_height(axis, 0.0);
        for &id in &self.ids {
            cap = cap.add_cap(&Cell::from(id).cap_bound());
        }
        cap
    }

    fn rect_bound(&self) -> LatLngRect {
        let mut bound = LatLngRect::empty();
        for &id in &self.ids {
            bound = bound.union(&Cell::from(id).rect_bound());
        }
        bound
    }
}
