//! Geometric realization of cells.

use crate::cap::Cap;
use crate::cellid::{self, CellId, MAX_LEVEL};
use crate::interval::{CircularInterval, Interval};
use crate::latlng::{self, LatLng};
use crate::point::{self, Point};
use crate::projection::{self, AVG_AREA};
use crate::rect::LatLngRect;
use crate::region::Region;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

// Bound on the error of the uv coordinate computations below.
const MAX_ERROR: f64 = 1.0 / (1u64 << 51) as f64;

/// A cell decoded into geometry: its face, level, orientation and (u,v)
/// bounds on that face.
///
/// Unlike [`CellId`] this form supports efficient point containment and
/// bounding tests, at the cost of being bigger and slower to construct.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    face: u8,
    level: u8,
    orientation: u8,
    id: CellId,
    uv: [[f64; 2]; 2],
}

impl From<CellId> for Cell {
    fn from(id: CellId) -> Cell {
        let (face, i, j, orientation) = id.to_face_ij_orientation();
        let level = id.level();
        let cell_size = 1i64 << (MAX_LEVEL - level);
        let scale = 1.0 / cellid::MAX_SIZE as f64;

        // Cell bounds in scaled (i,j) coordinates, then projected to uv.
        let mut uv = [[0.0; 2]; 2];
        for (d, ij) in [(0, i), (1, j)] {
            let sij_lo = (ij as i64 & -cell_size) * 2 - cellid::MAX_SIZE as i64;
            let sij_hi = sij_lo + cell_size * 2;
            uv[d][0] = projection::st_to_uv(scale * sij_lo as f64);
            uv[d][1] = projection::st_to_uv(scale * sij_hi as f64);
        }

        Cell {
            face,
            level,
            orientation,
            id,
            uv,
        }
    }
}

impl Cell {
    /// The leaf cell containing `p`.
    pub fn from_point(p: Point) -> Cell {
        Cell::from(CellId::from_point(p))
    }

    /// The leaf cell containing `ll`.
    pub fn from_latlng(ll: LatLng) -> Cell {
        Cell::from(CellId::from_latlng(ll))
    }

    #[inline]
    pub fn id(&self) -> CellId {
        self.id
    }

    #[inline]
    pub fn face(&self) -> u8 {
        self.face
    }

    #[inline]
    pub fn level(&self) -> u8 {
        self.level
    }

    #[inline]
    pub fn orientation(&self) -> u8 {
        self.orientation
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.level == MAX_LEVEL
    }

    /// Vertex `k` of the cell in CCW order (lower left, lower right, upper
    /// right, upper left in the uv plane), not normalized.
    pub fn vertex_raw(&self, k: usize) -> Point {
        projection::face_uv_to_xyz(
            self.face,
            self.uv[0][(k >> 1) ^ (k & 1)],
            self.uv[1][k >> 1],
        )
    }

    /// Vertex `k` as a unit vector.
    pub fn vertex(&self, k: usize) -> Point {
        self.vertex_raw(k).normalize()
    }

    /// Inward-facing normal of the great circle through edge `k`, which
    /// runs from vertex `k` to vertex `k + 1`. Not normalized.
    pub fn edge_raw(&self, k: usize) -> Point {
        match k {
            0 => projection::face_v_norm(self.face, self.uv[1][0]), // South
            1 => projection::face_u_norm(self.face, self.uv[0][1]), // East
            2 => -projection::face_v_norm(self.face, self.uv[1][1]), // North
            3 => -projection::face_u_norm(self.face, self.uv[0][0]), // West
            _ => unreachable!("edge index out of range: {k}"),
        }
    }

    pub fn edge(&self, k: usize) -> Point {
        self.edge_raw(k).normalize()
    }

    /// Direction vector of the cell center, not normalized. The center is
    /// the point at which the cell is subdivided.
    pub fn center_raw(&self) -> Point {
        self.id.to_point_raw()
    }

    /// The cell center as a unit vector.
    pub fn center(&self) -> Point {
        self.center_raw().normalize()
    }

    /// The four children of this cell, in Hilbert curve traversal order.
    pub fn subdivide(&self) -> [Cell; 4] {
        debug_assert!(!self.is_leaf());

        // The given cell is split at its uv-space midpoint; each child
        // keeps two of the parent bounds and takes the midpoint for the
        // other two.
        let uv_mid = self.id.center_uv();
        let mid = [uv_mid.x, uv_mid.y];

        let mut children = [*self; 4];
        let mut id = self.id.child_begin();
        for (pos, child) in children.iter_mut().enumerate() {
            child.level = self.level + 1;
            child.orientation = self.orientation ^ cellid::POS_TO_ORIENTATION[pos];
            child.id = id;
            let ij = cellid::POS_TO_IJ[self.orientation as usize][pos] as usize;
            for d in 0..2 {
                // The dimension 0 index (i/u) is in bit 1 of ij.
                let m = 1 - ((ij >> (1 - d)) & 1);
                child.uv[d][m] = mid[d];
                child.uv[d][1 - m] = self.uv[d][1 - m];
            }
            id = id.next();
        }
        children
    }

    // ------------------------------------------------------------------
    // Area
    // ------------------------------------------------------------------

    /// Average area of cells at the given level. Exact, and cheap.
    pub fn average_area(level: u8) -> f64 {
        AVG_AREA.value(level)
    }

    /// Approximate area of this cell. Accurate to within 3% for all cell
    /// sizes, and within 0.1% for cells at level 5 or higher.
    pub fn approx_area(&self) -> f64 {
        // All cells at the first two levels have the same area.
        if self.level < 2 {
            return Self::average_area(self.level);
        }

        // The cross product of the cell diagonals gives twice the area of
        // the cell projected perpendicular to its normal.
        let flat_area = 0.5
            * (self.vertex(2) - self.vertex(0))
                .cross(self.vertex(3) - self.vertex(1))
                .length();

        // Compensate for curvature by treating the cell as a spherical cap
        // with the same area and boundary length.
        flat_area * 2.0 / (1.0 + (1.0 - (flat_area / PI).min(1.0)).sqrt())
    }

    /// Area of this cell as computed from the exact vertex positions, by
    /// splitting the cell into two spherical triangles.
    pub fn exact_area(&self) -> f64 {
        let v0 = self.vertex(0);
        let v2 = self.vertex(2);
        point::triangle_area(v0, self.vertex(1), v2)
            + point::triangle_area(v0, v2, self.vertex(3))
    }

    fn latitude(&self, i: usize, j: usize) -> f64 {
        let p = projection::face_uv_to_xyz(self.face, self.uv[0][i], self.uv[1][j]);
        latlng::latitude(p)
    }

    fn longitude(&self, i: usize, j: usize) -> f64 {
        let p = projection::face_uv_to_xyz(self.face, self.uv[0][i], self.uv[1][j]);
        latlng::longitude(p)
    }
}

impl Region for Cell {
    fn contains_point(&self, p: Point) -> bool {
        // Project onto this cell's own face rather than the nearest face,
        // so that points on the boundary between two faces are contained
        // by the cells on both sides.
        match projection::face_xyz_to_uv(self.face, p) {
            Some(uv) => {
                uv.x >= self.uv[0][0]
                    && uv.x <= self.uv[0][1]
                    && uv.y >= self.uv[1][0]
                    && uv.y <= self.uv[1][1]
            }
            None => false,
        }
    }

    fn contains_cell(&self, cell: &Cell) -> bool {
        self.id.contains(cell.id)
    }

    fn may_intersect_cell(&self, cell: &Cell) -> bool {
        self.id.intersects(cell.id)
    }

    fn cap_bound(&self) -> Cap {
        // The cell center in uv-space is used as the cap axis. This is not
        // quite the same as the normalized cell center, and neither yields
        // the minimal bounding cap, but both come close.
        let u = 0.5 * (self.uv[0][0] + self.uv[0][1]);
        let v = 0.5 * (self.uv[1][0] + self.uv[1][1]);
        let axis = projection::face_uv_to_xyz(self.face, u, v).normalize();
        let mut cap = Cap::from_axis_height(axis, 0.0);
        for k in 0..4 {
            cap = cap.add_point(self.vertex(k));
        }
        cap
    }

    fn rect_bound(&self) -> LatLngRect {
        if self.level > 0 {
            // Except at level 0, the latitude and longitude extremes are
            // attained at the vertices: the latitude range comes from one
            // pair of diagonally opposite vertices and the longitude range
            // from the other pair. The corner with the largest absolute
            // latitude is found from the sign of the uv midpoint sums.
            let u = self.uv[0][0] + self.uv[0][1];
            let v = self.uv[1][0] + self.uv[1][1];
            let i = if projection::face_u_axis(self.face).z == 0.0 {
                usize::from(u < 0.0)
            } else {
                usize::from(u > 0.0)
            };
            let j = if projection::face_v_axis(self.face).z == 0.0 {
                usize::from(v < 0.0)
            } else {
                usize::from(v > 0.0)
            };

            let lat =
                Interval::from_point_pair(self.latitude(i, j), self.latitude(1 - i, 1 - j))
                    .expanded(MAX_ERROR)
                    .intersection(LatLngRect::full_lat());
            if lat.lo() == -FRAC_PI_2 || lat.hi() == FRAC_PI_2 {
                return LatLngRect::from_intervals(lat, CircularInterval::full());
            }
            let lng = CircularInterval::from_point_pair(
                self.longitude(i, 1 - j),
                self.longitude(1 - i, j),
            )
            .expanded(MAX_ERROR);
            return LatLngRect::from_intervals(lat, lng);
        }

        // The four equatorial face cells extend to +/-45 degrees latitude
        // at the midpoints of their top and bottom edges; the two polar
        // face cells extend down to +/-35.26 degrees at their vertices.
        let pole_min_lat = (1.0f64 / 3.0).sqrt().asin() - MAX_ERROR;
        let (lat, lng) = match self.face {
            0 => (
                Interval::new(-FRAC_PI_4, FRAC_PI_4),
                CircularInterval::new(-FRAC_PI_4, FRAC_PI_4),
            ),
            1 => (
                Interval::new(-FRAC_PI_4, FRAC_PI_4),
                CircularInterval::new(FRAC_PI_4, 3.0 * FRAC_PI_4),
            ),
            2 => (
                Interval::new(pole_min_lat, FRAC_PI_2),
                CircularInterval::full(),
            ),
            3 => (
                Interval::new(-FRAC_PI_4, FRAC_PI_4),
                CircularInterval::new(3.0 * FRAC_PI_4, -3.0 * FRAC_PI_4),
            ),
            4 => (
                Interval::new(-FRAC_PI_4, FRAC_PI_4),
                CircularInterval::new(-3.0 * FRAC_PI_4, -FRAC_PI_4),
            ),
            _ => (
                Interval::new(-FRAC_PI_2, -pole_min_lat),
                CircularInterval::full(),
            ),
        };
        LatLngRect::from_intervals(lat, lng)
    }
}
