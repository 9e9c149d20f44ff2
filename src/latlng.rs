//! Latitude/longitude coordinates on the unit sphere.

use crate::angle::Angle;
use crate::interval::remainder;
use crate::point::Point;
use std::f64::consts::PI;

/// Latitude of a point that need not be unit length.
#[inline]
pub(crate) fn latitude(p: Point) -> f64 {
    // Intrinsically safe near the poles, unlike asin(z).
    p.z.atan2((p.x * p.x + p.y * p.y).sqrt())
}

/// Longitude of a point; arbitrary 0 on the z-axis itself.
#[inline]
pub(crate) fn longitude(p: Point) -> f64 {
    p.y.atan2(p.x)
}

/// A latitude/longitude pair, stored in radians.
///
/// Construction never range-checks; call [`LatLng::is_valid`] or
/// [`LatLng::normalized`] when the input is untrusted.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct LatLng {
    lat: f64,
    lng: f64,
}

impl LatLng {
    #[inline]
    pub const fn from_radians(lat: f64, lng: f64) -> Self {
        LatLng { lat, lng }
    }

    #[inline]
    pub fn from_degrees(lat: f64, lng: f64) -> Self {
        Self::new(Angle::from_degrees(lat), Angle::from_degrees(lng))
    }

    #[inline]
    pub fn new(lat: Angle, lng: Angle) -> Self {
        LatLng {
            lat: lat.radians(),
            lng: lng.radians(),
        }
    }

    /// Coordinates of a point on the sphere. The point does not need to be
    /// unit length.
    #[inline]
    pub fn from_point(p: Point) -> Self {
        let ll = LatLng {
            lat: latitude(p),
            lng: longitude(p),
        };
        debug_assert!(ll.is_valid());
        ll
    }

    #[inline]
    pub fn lat(self) -> Angle {
        Angle::from_radians(self.lat)
    }

    #[inline]
    pub fn lng(self) -> Angle {
        Angle::from_radians(self.lng)
    }

    #[inline]
    pub const fn lat_radians(self) -> f64 {
        self.lat
    }

    #[inline]
    pub const fn lng_radians(self) -> f64 {
        self.lng
    }

    #[inline]
    pub fn lat_degrees(self) -> f64 {
        self.lat().degrees()
    }

    #[inline]
    pub fn lng_degrees(self) -> f64 {
        self.lng().degrees()
    }

    /// Latitude in [-pi/2, pi/2] and longitude in [-pi, pi].
    #[inline]
    pub fn is_valid(self) -> bool {
        self.lat.abs() <= PI / 2.0 && self.lng.abs() <= PI
    }

    /// Clamps latitude to [-pi/2, pi/2] and wraps longitude to [-pi, pi].
    pub fn normalized(self) -> Self {
        LatLng {
            lat: self.lat.clamp(-PI / 2.0, PI / 2.0),
            lng: remainder(self.lng, 2.0 * PI),
        }
    }

    /// Unit vector for these coordinates. The input should be valid;
    /// out-of-range latitudes produce points off the sphere.
    pub fn to_point(self) -> Point {
        debug_assert!(self.is_valid());
        let phi = self.lat;
        let theta = self.lng;
        let cos_phi = phi.cos();
        Point::new(theta.cos() * cos_phi, theta.sin() * cos_phi, phi.sin())
    }
}
