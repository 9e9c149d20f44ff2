//! The region abstraction the covering machinery runs against.

use crate::cap::Cap;
use crate::cell::Cell;
use crate::point::Point;
use crate::rect::LatLngRect;

/// A two-dimensional subset of the sphere.
///
/// The cell queries are allowed to be conservative in one direction each:
/// `contains_cell` may return false for a cell that is actually contained,
/// and `may_intersect_cell` may return true for a cell that does not
/// actually intersect. They must never err the other way, since coverings
/// rely on `may_intersect_cell(c) == false` to prune `c` entirely and on
/// `contains_cell(c) == true` to stop subdividing `c`.
pub trait Region {
    /// True if the region contains the given unit-length point.
    fn contains_point(&self, p: Point) -> bool;

    /// True only if the region completely contains the cell.
    fn contains_cell(&self, cell: &Cell) -> bool;

    /// False only if the cell definitely does not intersect the region.
    fn may_intersect_cell(&self, cell: &Cell) -> bool;

    /// A spherical cap that contains the region.
    fn cap_bound(&self) -> Cap;

    /// A latitude-longitude rectangle that contains the region.
    fn rect_bound(&self) -> LatLngRect;
}
