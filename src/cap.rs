//! Spherical caps: disc-shaped regions around an axis.

use crate::angle::Angle;
use crate::cell::Cell;
use crate::interval::{remainder, CircularInterval, Interval};
use crate::latlng::LatLng;
use crate::point::{self, Point};
use crate::rect::LatLngRect;
use crate::region::Region;
use std::f64::consts::{FRAC_PI_2, PI};

/// Multiplier that rounds a positive product up to at least the true
/// infinite-precision result.
const ROUND_UP: f64 = 1.0 + 1.0 / (1u64 << 52) as f64;

/// A spherical cap: everything within a given opening angle of a center
/// axis.
///
/// Stored as the unit axis plus the height, the distance from the axis tip
/// to the cutoff plane. Heights below 0 encode the empty cap and height 2
/// the full sphere, so every cap size from a single point up is
/// representable. Caps are immutable; the `add_*` operations return grown
/// copies.
#[derive(Debug, Clone, Copy)]
pub struct Cap {
    axis: Point,
    height: f64,
}

impl Cap {
    /// Cap containing no points.
    pub const fn empty() -> Cap {
        Cap {
            axis: Point::new(1.0, 0.0, 0.0),
            height: -1.0,
        }
    }

    /// Cap containing the whole sphere.
    pub const fn full() -> Cap {
        Cap {
            axis: Point::new(1.0, 0.0, 0.0),
            height: 2.0,
        }
    }

    pub fn from_axis_height(axis: Point, height: f64) -> Cap {
        debug_assert!(point::is_unit_length(axis));
        Cap { axis, height }
    }

    pub fn from_axis_angle(axis: Point, angle: Angle) -> Cap {
        debug_assert!(point::is_unit_length(axis));
        // 1 - cos(a) loses relative accuracy near zero; 2 sin^2(a/2) is the
        // same height computed stably.
        let d = (0.5 * angle.radians()).sin();
        Cap {
            axis,
            height: 2.0 * d * d,
        }
    }

    /// Cap covering the given area (at most the sphere's 4*pi).
    pub fn from_axis_area(axis: Point, area: f64) -> Cap {
        debug_assert!(point::is_unit_length(axis));
        Cap {
            axis,
            height: area / (2.0 * PI),
        }
    }

    #[inline]
    pub fn axis(&self) -> Point {
        self.axis
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn area(&self) -> f64 {
        2.0 * PI * self.height.max(0.0)
    }

    /// Opening angle; negative for the empty cap.
    pub fn angle(&self) -> Angle {
        // Inverse of the 2 sin^2(a/2) form used on construction; acos of
        // 1 - height would throw away half the bits for small caps.
        if self.is_empty() {
            return Angle::from_radians(-1.0);
        }
        Angle::from_radians(2.0 * (0.5 * self.height).sqrt().asin())
    }

    pub fn is_valid(&self) -> bool {
        point::is_unit_length(self.axis) && self.height <= 2.0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.height < 0.0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.height >= 2.0
    }

    /// Complement cap on the opposite axis. The complement of full is
    /// empty, not a singleton, and vice versa.
    pub fn complement(&self) -> Cap {
        let height = if self.is_full() {
            -1.0
        } else {
            2.0 - self.height.max(0.0)
        };
        Cap {
            axis: -self.axis,
            height,
        }
    }

    pub fn contains_cap(&self, other: &Cap) -> bool {
        if self.is_full() || other.is_empty() {
            return true;
        }
        self.angle().radians() >= point::angle(self.axis, other.axis) + other.angle().radians()
    }

    pub fn interior_intersects(&self, other: &Cap) -> bool {
        // The interior intersects `other` exactly when the complement does
        // not contain it.
        !self.complement().contains_cap(other)
    }

    pub fn interior_contains_point(&self, p: Point) -> bool {
        debug_assert!(point::is_unit_length(p));
        self.is_full() || (self.axis - p).length_squared() < 2.0 * self.height
    }

    /// Smallest cap with the same axis that also covers `p`.
    pub fn add_point(&self, p: Point) -> Cap {
        if self.is_empty() {
            return Cap {
                axis: p,
                height: 0.0,
            };
        }
        debug_assert!(point::is_unit_length(p));
        // Round the chord length up so the result really contains `p`.
        let dist2 = (self.axis - p).length_squared();
        Cap {
            axis: self.axis,
            height: self.height.max(ROUND_UP * 0.5 * dist2),
        }
    }

    /// Smallest cap with the same axis that also covers `other`.
    pub fn add_cap(&self, other: &Cap) -> Cap {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let angle = point::angle(self.axis, other.axis) + other.angle().radians();
        if angle >= PI {
            return Cap {
                axis: self.axis,
                height: 2.0,
            };
        }
        let d = (0.5 * angle).sin();
        Cap {
            axis: self.axis,
            height: self.height.max(ROUND_UP * 2.0 * d * d),
        }
    }

    pub fn approx_equals(&self, other: &Cap, max_error: f64) -> bool {
        ((self.axis - other.axis).abs().max_element() < max_error
            && (self.height - other.height).abs() <= max_error)
            || (self.is_empty() && other.height <= max_error)
            || (other.is_empty() && self.height <= max_error)
            || (self.is_full() && other.height >= 2.0 - max_error)
            || (other.is_full() && self.height >= 2.0 - max_error)
    }

    /// Whether the cap boundary crosses the cell, given that no cell
    /// vertex is inside the cap.
    fn intersects_cell(&self, cell: &Cell, vertices: &[Point; 4]) -> bool {
        // A cap covering a hemisphere or more has a convex complement, so
        // with every vertex outside there is nothing left to intersect.
        if self.height >= 1.0 {
            return false;
        }
        if self.is_empty() {
            return false;
        }
        // Cheap positive: the cell contains the cap axis.
        if cell.contains_point(self.axis) {
            return true;
        }
        // Any remaining intersection must cross the interior of an edge.
        let sin2_angle = self.height * (2.0 - self.height);
        for k in 0..4 {
            let edge = cell.edge_raw(k);
            let dot = self.axis.dot(edge);
            if dot > 0.0 {
                // The axis is inside the half-space of this edge; a
                // crossing here would imply one on the opposite edge too.
                continue;
            }
            // `edge` is not unit length, hence the length factor.
            if dot * dot > sin2_angle * edge.length_squared() {
                // The whole cap lies strictly outside this edge.
                return false;
            }
            // The great circle through the edge cuts the cap; crossing
            // happens only if the closest point is between the endpoints.
            let dir = edge.cross(self.axis);
            if dir.dot(vertices[k]) < 0.0 && dir.dot(vertices[(k + 1) & 3]) > 0.0 {
                return true;
            }
        }
        false
    }
}

/// Caps compare equal on (axis, height), with all empty caps equal and all
/// full caps equal.
impl PartialEq for Cap {
    fn eq(&self, other: &Cap) -> bool {
        (self.axis == other.axis && self.height == other.height)
            || (self.is_empty() && other.is_empty())
            || (self.is_full() && other.is_full())
    }
}

impl Region for Cap {
    fn contains_point(&self, p: Point) -> bool {
        debug_assert!(point::is_unit_length(p));
        (self.axis - p).length_squared() <= 2.0 * self.height
    }

    fn contains_cell(&self, cell: &Cell) -> bool {
        // Check the vertices before taking the complement: the complement
        // of a cap within an ulp of full rounds its height to exactly 2.
        let mut vertices = [Point::ZERO; 4];
        for (k, vertex) in vertices.iter_mut().enumerate() {
            *vertex = cell.vertex(k);
            if !self.contains_point(*vertex) {
                return false;
            }
        }
        !self.complement().intersects_cell(cell, &vertices)
    }

    fn may_intersect_cell(&self, cell: &Cell) -> bool {
        let mut vertices = [Point::ZERO; 4];
        for (k, vertex) in vertices.iter_mut().enumerate() {
            *vertex = cell.vertex(k);
            if self.contains_point(*vertex) {
                return true;
            }
        }
        self.intersects_cell(cell, &vertices)
    }

    fn cap_bound(&self) -> Cap {
        *self
    }

    fn rect_bound(&self) -> LatLngRect {
        if self.is_empty() {
            return LatLngRect::empty();
        }

        let axis_ll = LatLng::from_point(self.axis);
        let cap_angle = self.angle().radians();

        let mut all_longitudes = false;
        let mut lat_lo = axis_ll.lat_radians() - cap_angle;
        if lat_lo <= -FRAC_PI_2 {
            lat_lo = -FRAC_PI_2;
            all_longitudes = true;
        }
        let mut lat_hi = axis_ll.lat_radians() + cap_angle;
        if lat_hi >= FRAC_PI_2 {
            lat_hi = FRAC_PI_2;
            all_longitudes = true;
        }

        let mut lng = CircularInterval::full();
        if !all_longitudes {
            // Law of sines in the right spherical triangle formed by the
            // pole, the axis, and the point where the cap boundary is
            // tangent to a meridian: sin(half lng width) equals
            // sin(cap angle) / cos(latitude).
            let sin_a = (self.height * (2.0 - self.height)).sqrt();
            let sin_c = axis_ll.lat_radians().cos();
            if sin_a <= sin_c {
                let angle_a = (sin_a / sin_c).asin();
                lng = CircularInterval::new(
                    remainder(axis_ll.lng_radians() - angle_a, 2.0 * PI),
                    remainder(axis_ll.lng_radians() + angle_a, 2.0 * PI),
                );
            }
        }
        LatLngRect::from_intervals(Interval::new(lat_lo, lat_hi), lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::cellid::CellId;
    use crate::projection;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    const EPS: f64 = 1e-14;

    fn latlng_point(lat_degrees: f64, lng_degrees: f64) -> Point {
        LatLng::from_degrees(lat_degrees, lng_degrees).to_point()
    }

    fn random_unit_point(rng: &mut ChaCha8Rng) -> Point {
        loop {
            let p = Point::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            let len2 = p.length_squared();
            if len2 > 1e-6 && len2 < 1.0 {
                return p.normalize();
            }
        }
    }

    #[test]
    fn empty_and_full() {
        let empty = Cap::empty();
        let full = Cap::full();
        assert!(empty.is_valid());
        assert!(empty.is_empty());
        assert!(empty.complement().is_full());
        assert!(full.is_valid());
        assert!(full.is_full());
        assert!(full.complement().is_empty());
        assert_eq!(full.height(), 2.0);
        assert!((full.angle().degrees() - 180.0).abs() < 1e-9);

        assert!(empty.contains_cap(&empty));
        assert!(full.contains_cap(&empty));
        assert!(full.contains_cap(&full));
        assert!(!empty.interior_intersects(&empty));
        assert!(full.interior_intersects(&full));
        assert!(!full.interior_intersects(&empty));
    }

    #[test]
    fn singleton_caps() {
        // A cap containing just the x-axis.
        let xaxis = Cap::from_axis_height(Point::new(1.0, 0.0, 0.0), 0.0);
        assert!(xaxis.contains_point(Point::new(1.0, 0.0, 0.0)));
        assert!(!xaxis.contains_point(Point::new(1.0, 1e-20, 0.0)));
        assert_eq!(xaxis.angle().radians(), 0.0);

        let yaxis = Cap::from_axis_angle(Point::new(0.0, 1.0, 0.0), Angle::ZERO);
        assert!(!yaxis.contains_point(xaxis.axis()));
        assert_eq!(xaxis.height(), 0.0);

        // The complement of a singleton is the full cap, but the
        // complement of that complement is not the singleton again.
        let xcomp = xaxis.complement();
        assert!(xcomp.is_valid());
        assert!(xcomp.is_full());
        assert!(xcomp.contains_point(xaxis.axis()));
        assert!(xcomp.complement().is_valid());
        assert!(!xcomp.complement().contains_point(xaxis.axis()));
    }

    #[test]
    fn tiny_caps_are_exact() {
        // Small enough that unit vectors perturbed by this amount along a
        // tangent do not need renormalizing.
        let tiny_rad = 1e-10;
        let tiny = Cap::from_axis_angle(
            Point::new(1.0, 2.0, 3.0).normalize(),
            Angle::from_radians(tiny_rad),
        );
        let tangent = tiny.axis().cross(Point::new(3.0, 2.0, 1.0)).normalize();
        assert!(tiny.contains_point(tiny.axis() + 0.99 * tiny_rad * tangent));
        assert!(!tiny.contains_point(tiny.axis() + 1.01 * tiny_rad * tangent));
    }

    #[test]
    fn hemisphere() {
        let hemi = Cap::from_axis_height(Point::new(1.0, 0.0, 1.0).normalize(), 1.0);
        assert_eq!(hemi.complement().axis(), -hemi.axis());
        assert_eq!(hemi.complement().height(), 1.0);
        assert!(hemi.contains_point(Point::new(1.0, 0.0, 0.0)));
        assert!(!hemi.complement().contains_point(Point::new(1.0, 0.0, 0.0)));
        assert!(hemi.contains_point(Point::new(1.0, 0.0, -(1.0 - EPS)).normalize()));
        assert!(!hemi.interior_contains_point(Point::new(1.0, 0.0, -(1.0 + EPS)).normalize()));
    }

    #[test]
    fn added_points_are_contained() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..100 {
            let mut cap = Cap::from_axis_height(random_unit_point(&mut rng), 0.0);
            for _ in 0..10 {
                let p = random_unit_point(&mut rng);
                cap = cap.add_point(p);
                assert!(cap.contains_point(p));
            }
        }
        // Growing from empty adopts the point as the axis.
        let p = Point::new(0.0, 0.0, 1.0);
        let cap = Cap::empty().add_point(p);
        assert_eq!(cap.axis(), p);
        assert_eq!(cap.height(), 0.0);
    }

    #[test]
    fn add_cap_covers_both() {
        let a = Cap::from_axis_angle(Point::new(1.0, 0.0, 0.0), Angle::from_degrees(20.0));
        let b = Cap::from_axis_angle(Point::new(0.0, 1.0, 0.0), Angle::from_degrees(30.0));
        let grown = a.add_cap(&b);
        assert_eq!(grown.axis(), a.axis());
        // 90 degrees between the axes plus the 30 degree radius of `b`.
        assert!((grown.angle().degrees() - 120.0).abs() < 1e-9);
        assert!(grown.height() >= a.height());
        assert!(grown.contains_point(b.axis()));

        assert_eq!(a.add_cap(&Cap::empty()), a);
        assert_eq!(Cap::empty().add_cap(&a), a);

        // Opposite hemispheres grow to the full sphere.
        let hemi = Cap::from_axis_height(Point::new(0.0, 0.0, 1.0), 1.0);
        assert!(hemi.add_cap(&hemi.complement()).is_full());
    }

    #[test]
    fn rect_bound_near_poles() {
        // Cap that includes the south pole.
        let rect =
            Cap::from_axis_angle(latlng_point(-45.0, 57.0), Angle::from_degrees(50.0)).rect_bound();
        assert!((rect.lat_lo().degrees() - -90.0).abs() < 1e-13);
        assert!((rect.lat_hi().degrees() - 5.0).abs() < 1e-13);
        assert!(rect.lng().is_full());

        // Cap that (comfortably) crosses the north pole.
        let rect = Cap::from_axis_angle(
            Point::new(1.0, 0.0, 1.0).normalize(),
            Angle::from_degrees(45.01),
        )
        .rect_bound();
        assert!(rect.lat_lo().degrees() < 0.0);
        assert!((rect.lat_hi().degrees() - 90.0).abs() < 1e-13);
        assert!(rect.lng().is_full());

        // A cap centered on the north pole.
        let rect =
            Cap::from_axis_angle(latlng_point(90.0, 123.0), Angle::from_degrees(10.0)).rect_bound();
        assert!((rect.lat_lo().degrees() - 80.0).abs() < 1e-13);
        assert!((rect.lat_hi().degrees() - 90.0).abs() < 1e-13);
        assert!(rect.lng().is_full());
    }

    #[test]
    fn rect_bound_away_from_poles() {
        // Hemisphere pushed just past a quarter sphere.
        let rect = Cap::from_axis_angle(Point::new(0.0, 1.0, 0.0), Angle::from_degrees(90.01))
            .rect_bound();
        assert!((rect.lat_lo().degrees() - -90.0).abs() < 1e-13);
        assert!((rect.lat_hi().degrees() - 90.0).abs() < 1e-13);
        assert!(rect.lng().is_full());

        // A cap centered on the equator.
        let rect =
            Cap::from_axis_angle(latlng_point(0.0, 50.0), Angle::from_degrees(20.0)).rect_bound();
        assert!((rect.lat_lo().degrees() - -20.0).abs() < 1e-13);
        assert!((rect.lat_hi().degrees() - 20.0).abs() < 1e-13);
        assert!((rect.lng_lo().degrees() - 30.0).abs() < 1e-13);
        assert!((rect.lng_hi().degrees() - 70.0).abs() < 1e-13);
    }

    #[test]
    fn cell_relations() {
        // For each face, build cells on that face and caps positioned
        // relative to it, and check the expected relations.

        // Distance from the center of a face to one of its corners.
        let face_radius = 2.0f64.sqrt().atan();

        for face in 0..6u8 {
            let root_cell = Cell::from(CellId::from_face_pos_level(face, 0, 0));

            // A leaf at the midpoint of the v=1 edge, and one at the
            // (u=1, v=1) corner.
            let edge_cell = Cell::from_point(projection::face_uv_to_xyz(face, 0.0, 1.0 - EPS));
            let corner_cell =
                Cell::from_point(projection::face_uv_to_xyz(face, 1.0 - EPS, 1.0 - EPS));

            assert!(Cap::full().contains_cell(&root_cell));
            assert!(!Cap::empty().may_intersect_cell(&root_cell));

            // Check cap bounds of the leaves adjacent to the corner cell
            // along the curve; at (u=1, v=1) the curve stays on the face.
            let first = corner_cell.id().prev().prev().prev();
            let last = corner_cell.id().next().next().next().next();
            let mut id = first;
            while id < last {
                let cell = Cell::from(id);
                assert_eq!(
                    cell.cap_bound().contains_cell(&corner_cell),
                    id == corner_cell.id()
                );
                assert_eq!(
                    cell.cap_bound().may_intersect_cell(&corner_cell),
                    id.parent().contains(corner_cell.id())
                );
                id = id.next();
            }

            let anti_face = (face + 3) % 6;
            for cap_face in 0..6u8 {
                // A cap that barely covers all of `cap_face`.
                let center = projection::face_norm(cap_face);
                let covering =
                    Cap::from_axis_angle(center, Angle::from_radians(face_radius + EPS));
                assert_eq!(covering.contains_cell(&root_cell), cap_face == face);
                assert_eq!(covering.may_intersect_cell(&root_cell), cap_face != anti_face);
                assert_eq!(
                    covering.contains_cell(&edge_cell),
                    center.dot(edge_cell.center()) > 0.1
                );
                assert_eq!(
                    covering.contains_cell(&edge_cell),
                    covering.may_intersect_cell(&edge_cell)
                );
                assert_eq!(covering.contains_cell(&corner_cell), cap_face == face);
                assert_eq!(
                    covering.may_intersect_cell(&corner_cell),
                    center.dot(corner_cell.center()) > 0.0
                );

                // A cap that barely reaches past the edges of `cap_face`.
                let bulging = Cap::from_axis_angle(
                    center,
                    Angle::from_radians(std::f64::consts::FRAC_PI_4 + EPS),
                );
                assert!(!bulging.contains_cell(&root_cell));
                assert_eq!(bulging.may_intersect_cell(&root_cell), cap_face != anti_face);
                assert_eq!(bulging.contains_cell(&edge_cell), cap_face == face);
                assert_eq!(
                    bulging.may_intersect_cell(&edge_cell),
                    center.dot(edge_cell.center()) > 0.1
                );
                assert!(!bulging.contains_cell(&corner_cell));
                assert!(!bulging.may_intersect_cell(&corner_cell));

                // A singleton cap at the face center.
                let singleton = Cap::from_axis_angle(center, Angle::ZERO);
                assert_eq!(singleton.may_intersect_cell(&root_cell), cap_face == face);
                assert!(!singleton.may_intersect_cell(&edge_cell));
                assert!(!singleton.may_intersect_cell(&corner_cell));
            }
        }
    }
}
