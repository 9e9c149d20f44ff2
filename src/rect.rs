//! Latitude-longitude rectangles.

use crate::angle::Angle;
use crate::cap::Cap;
use crate::cell::Cell;
use crate::interval::{remainder, CircularInterval, Interval};
use crate::latlng::LatLng;
use crate::point::Point;
use crate::region::Region;
use std::f64::consts::{FRAC_PI_2, PI};

/// A rectangle in latitude-longitude space: the product of a latitude
/// interval and a circular longitude interval.
///
/// On the sphere this is the region between two parallels and two
/// meridians, so the lat/lng edges are curved and a "rectangle" can wrap
/// the date line or pinch at a pole. An empty latitude interval paired
/// with the empty longitude interval encodes the empty rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLngRect {
    lat: Interval,
    lng: CircularInterval,
}

impl LatLngRect {
    /// Rectangle from its lower-left and upper-right corners, which must
    /// be normalized with `lo.lat() <= hi.lat()`. Longitudes wrap: a lower
    /// bound east of the upper bound crosses the date line.
    pub fn new(lo: LatLng, hi: LatLng) -> LatLngRect {
        let rect = LatLngRect {
            lat: Interval::new(lo.lat_radians(), hi.lat_radians()),
            lng: CircularInterval::new(lo.lng_radians(), hi.lng_radians()),
        };
        debug_assert!(rect.is_valid());
        rect
    }

    pub fn from_intervals(lat: Interval, lng: CircularInterval) -> LatLngRect {
        let rect = LatLngRect { lat, lng };
        debug_assert!(rect.is_valid());
        rect
    }

    /// The smallest rectangle containing a single point.
    pub fn from_point(p: LatLng) -> LatLngRect {
        debug_assert!(p.is_valid());
        Self::new(p, p)
    }

    /// The smallest rectangle containing both points, choosing the
    /// shorter way around for the longitude span.
    pub fn from_point_pair(p1: LatLng, p2: LatLng) -> LatLngRect {
        debug_assert!(p1.is_valid() && p2.is_valid());
        LatLngRect {
            lat: Interval::from_point_pair(p1.lat_radians(), p2.lat_radians()),
            lng: CircularInterval::from_point_pair(p1.lng_radians(), p2.lng_radians()),
        }
    }

    pub fn empty() -> LatLngRect {
        LatLngRect {
            lat: Interval::empty(),
            lng: CircularInterval::empty(),
        }
    }

    pub fn full() -> LatLngRect {
        LatLngRect {
            lat: Self::full_lat(),
            lng: CircularInterval::full(),
        }
    }

    /// The full allowable range of latitudes.
    pub(crate) fn full_lat() -> Interval {
        Interval::new(-FRAC_PI_2, FRAC_PI_2)
    }

    #[inline]
    pub fn lat(&self) -> Interval {
        self.lat
    }

    #[inline]
    pub fn lng(&self) -> CircularInterval {
        self.lng
    }

    pub fn lat_lo(&self) -> Angle {
        Angle::from_radians(self.lat.lo())
    }

    pub fn lat_hi(&self) -> Angle {
        Angle::from_radians(self.lat.hi())
    }

    pub fn lng_lo(&self) -> Angle {
        Angle::from_radians(self.lng.lo())
    }

    pub fn lng_hi(&self) -> Angle {
        Angle::from_radians(self.lng.hi())
    }

    pub fn lo(&self) -> LatLng {
        LatLng::from_radians(self.lat.lo(), self.lng.lo())
    }

    pub fn hi(&self) -> LatLng {
        LatLng::from_radians(self.lat.hi(), self.lng.hi())
    }

    pub fn is_valid(&self) -> bool {
        // The latitude bounds must be within the poles, and empty lat must
        // pair with empty lng.
        self.lat.lo().abs() <= FRAC_PI_2
            && self.lat.hi().abs() <= FRAC_PI_2
            && self.lng.is_valid()
            && self.lat.is_empty() == self.lng.is_empty()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lat.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.lat == Self::full_lat() && self.lng.is_full()
    }

    pub fn center(&self) -> LatLng {
        LatLng::from_radians(self.lat.center(), self.lng.center())
    }

    /// Edge lengths; negative latitude size for the empty rectangle.
    pub fn size(&self) -> LatLng {
        LatLng::from_radians(self.lat.length(), self.lng.length())
    }

    /// Corners in CCW order: lower-left, lower-right, upper-right,
    /// upper-left.
    pub fn vertex(&self, k: usize) -> LatLng {
        match k {
            0 => LatLng::from_radians(self.lat.lo(), self.lng.lo()),
            1 => LatLng::from_radians(self.lat.lo(), self.lng.hi()),
            2 => LatLng::from_radians(self.lat.hi(), self.lng.hi()),
            3 => LatLng::from_radians(self.lat.hi(), self.lng.lo()),
            _ => unreachable!("vertex index out of range: {k}"),
        }
    }

    pub fn contains_latlng(&self, ll: LatLng) -> bool {
        debug_assert!(ll.is_valid());
        self.lat.contains(ll.lat_radians()) && self.lng.contains(ll.lng_radians())
    }

    pub fn interior_contains_latlng(&self, ll: LatLng) -> bool {
        debug_assert!(ll.is_valid());
        self.lat.interior_contains(ll.lat_radians())
            && self.lng.interior_contains(ll.lng_radians())
    }

    pub fn contains_rect(&self, other: &LatLngRect) -> bool {
        self.lat.contains_interval(other.lat) && self.lng.contains_interval(other.lng)
    }

    pub fn interior_contains_rect(&self, other: &LatLngRect) -> bool {
        self.lat.interior_contains_interval(other.lat)
            && self.lng.interior_contains_interval(other.lng)
    }

    pub fn intersects(&self, other: &LatLngRect) -> bool {
        self.lat.intersects(other.lat) && self.lng.intersects(other.lng)
    }

    pub fn interior_intersects(&self, other: &LatLngRect) -> bool {
        self.lat.interior_intersects(other.lat) && self.lng.interior_intersects(other.lng)
    }

    /// The smallest rectangle that also contains `ll`.
    pub fn add_point(&self, ll: LatLng) -> LatLngRect {
        debug_assert!(ll.is_valid());
        LatLngRect {
            lat: self.lat.add_point(ll.lat_radians()),
            lng: self.lng.add_point(ll.lng_radians()),
        }
    }

    /// Expands by the given margins on each side, clamping latitudes to
    /// the poles. Longitude margins of pi or more yield the full circle.
    pub fn expanded(&self, margin: LatLng) -> LatLngRect {
        debug_assert!(margin.lat_radians() >= 0.0 && margin.lng_radians() >= 0.0);
        if self.is_empty() {
            return *self;
        }
        LatLngRect {
            lat: self
                .lat
                .expanded(margin.lat_radians())
                .intersection(Self::full_lat()),
            lng: self.lng.expanded(margin.lng_radians()),
        }
    }

    pub fn union(&self, other: &LatLngRect) -> LatLngRect {
        LatLngRect {
            lat: self.lat.union(other.lat),
            lng: self.lng.union(other.lng),
        }
    }

    pub fn intersection(&self, other: &LatLngRect) -> LatLngRect {
        let lat = self.lat.intersection(other.lat);
        let lng = self.lng.intersection(other.lng);
        if lat.is_empty() || lng.is_empty() {
            // One component may come out empty on its own; collapse to the
            // canonical empty rectangle.
            return Self::empty();
        }
        LatLngRect { lat, lng }
    }

    pub fn approx_equals(&self, other: &LatLngRect, max_error: f64) -> bool {
        self.lat.approx_equals(other.lat, max_error)
            && self.lng.approx_equals(other.lng, max_error)
    }
}

impl Region for LatLngRect {
    fn contains_point(&self, p: Point) -> bool {
        self.contains_latlng(LatLng::from_point(p))
    }

    fn contains_cell(&self, cell: &Cell) -> bool {
        // A rectangle contains a cell exactly when it contains the cell's
        // bounding rectangle.
        self.contains_rect(&cell.rect_bound())
    }

    fn may_intersect_cell(&self, cell: &Cell) -> bool {
        // Conservative: the bounding rectangles may intersect even though
        // the rectangle and the cell do not.
        self.intersects(&cell.rect_bound())
    }

    fn cap_bound(&self) -> Cap {
        // Two candidates: a cap through the rectangle center, and a cap
        // around whichever pole is closer. Return the smaller.
        if self.is_empty() {
            return Cap::empty();
        }

        let (pole_z, pole_angle) = if self.lat.lo() + self.lat.hi() < 0.0 {
            (-1.0, FRAC_PI_2 + self.lat.hi())
        } else {
            (1.0, FRAC_PI_2 - self.lat.lo())
        };
        let pole_cap = Cap::from_axis_angle(
            Point::new(0.0, 0.0, pole_z),
            Angle::from_radians(pole_angle),
        );

        // For rectangles spanning at most half the longitudes, the widest
        // point of a center cap is at one of the corners. Wider rectangles
        // always get the pole cap.
        let lng_span = self.lng.hi() - self.lng.lo();
        if remainder(lng_span, 2.0 * PI) >= 0.0 && lng_span < 2.0 * PI {
            let mut mid_cap = Cap::from_axis_angle(self.center().to_point(), Angle::ZERO);
            for k in 0..4 {
                mid_cap = mid_cap.add_point(self.vertex(k).to_point());
            }
            if mid_cap.height() < pole_cap.height() {
                return mid_cap;
            }
        }
        pole_cap
    }

    fn rect_bound(&self) -> LatLngRect {
        *self
    }
}
