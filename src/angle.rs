//! One-dimensional angles with unit-safe constructors.

use crate::point::{self, Point};

/// An angle stored in radians.
///
/// Wrapping the raw f64 keeps degree/radian conversions explicit at API
/// boundaries. Comparison and ordering work directly on the radian value.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd)]
pub struct Angle {
    radians: f64,
}

impl Angle {
    pub const ZERO: Angle = Angle { radians: 0.0 };

    #[inline]
    pub const fn from_radians(radians: f64) -> Self {
        Angle { radians }
    }

    #[inline]
    pub fn from_degrees(degrees: f64) -> Self {
        Angle {
            radians: degrees * (std::f64::consts::PI / 180.0),
        }
    }

    /// Degrees scaled by 1e5, as used by compact wire encodings.
    #[inline]
    pub fn from_e5(e5: i64) -> Self {
        Self::from_degrees(e5 as f64 * 1e-5)
    }

    #[inline]
    pub fn from_e6(e6: i64) -> Self {
        Self::from_degrees(e6 as f64 * 1e-6)
    }

    #[inline]
    pub fn from_e7(e7: i64) -> Self {
        Self::from_degrees(e7 as f64 * 1e-7)
    }

    /// The angle between two points on the unit sphere.
    #[inline]
    pub fn between(a: Point, b: Point) -> Self {
        Angle {
            radians: point::angle(a, b),
        }
    }

    #[inline]
    pub const fn radians(self) -> f64 {
        self.radians
    }

    #[inline]
    pub fn degrees(self) -> f64 {
        self.radians * (180.0 / std::f64::consts::PI)
    }

    #[inline]
    pub fn e5(self) -> i64 {
        (self.degrees() * 1e5).round() as i64
    }

    #[inline]
    pub fn e6(self) -> i64 {
        (self.degrees() * 1e6).round() as i64
    }

    #[inline]
    pub fn e7(self) -> i64 {
        (self.degrees() * 1e7).round() as i64
    }
}
