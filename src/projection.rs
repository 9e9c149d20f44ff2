//! Cube-face projection between the unit sphere and face-local coordinates.
//!
//! The sphere is projected onto 6 cube faces, numbered 0..6: 0=+x, 1=+y,
//! 2=+z, 3=-x, 4=-y, 5=-z (face and face+3 are antipodal). Each face carries
//! a right-handed (u,v) system in [-1,1]^2. A quadratic transform between
//! (u,v) and the (s,t) grid coordinates trades a small amount of skew for
//! nearly equal cell areas: corners get compressed, face centers stretched.

use crate::point::{self, Point};
use glam::DVec2;

/// Quadratic transform, ST [-1,1] to UV [-1,1].
#[inline]
pub(crate) fn st_to_uv(s: f64) -> f64 {
    if s >= 0.0 {
        (1.0 / 3.0) * ((1.0 + s) * (1.0 + s) - 1.0)
    } else {
        (1.0 / 3.0) * (1.0 - (1.0 - s) * (1.0 - s))
    }
}

/// Inverse quadratic transform, UV [-1,1] to ST [-1,1].
#[inline]
pub(crate) fn uv_to_st(u: f64) -> f64 {
    if u >= 0.0 {
        (1.0 + 3.0 * u).sqrt() - 1.0
    } else {
        1.0 - (1.0 - 3.0 * u).sqrt()
    }
}

/// Discretizes an ST coordinate to a leaf grid index in [0, 2^30).
#[inline]
pub(crate) fn st_to_ij(s: f64) -> i32 {
    let m = (crate::cellid::MAX_SIZE / 2) as f64;
    (m * s + (m - 0.5)).round().clamp(0.0, 2.0 * m - 1.0) as i32
}

/// Face whose center is closest to the direction `p`.
#[inline]
pub(crate) fn xyz_to_face(p: Point) -> u8 {
    let axis = point::largest_abs_component(p);
    if point::component(p, axis) < 0.0 {
        (axis + 3) as u8
    } else {
        axis as u8
    }
}

/// Face-local (u,v) of `p`, which must lie in the open half-space of `face`.
#[inline]
pub(crate) fn valid_face_xyz_to_uv(face: u8, p: Point) -> DVec2 {
    debug_assert!(p.dot(face_norm(face)) > 0.0);
    let (pu, pv) = match face {
        0 => (p.y / p.x, p.z / p.x),
        1 => (-p.x / p.y, p.z / p.y),
        2 => (-p.x / p.z, -p.y / p.z),
        3 => (p.z / p.x, p.y / p.x),
        4 => (p.z / p.y, -p.x / p.y),
        _ => (-p.y / p.z, -p.x / p.z),
    };
    DVec2::new(pu, pv)
}

/// Face-local (u,v) of `p`, or `None` when `p` does not project into the
/// interior of `face`.
#[inline]
pub(crate) fn face_xyz_to_uv(face: u8, p: Point) -> Option<DVec2> {
    if face < 3 {
        if point::component(p, face as usize) <= 0.0 {
            return None;
        }
    } else if point::component(p, (face - 3) as usize) >= 0.0 {
        return None;
    }
    Some(valid_face_xyz_to_uv(face, p))
}

/// Direction vector of the face point (u,v); not unit length.
#[inline]
pub(crate) fn face_uv_to_xyz(face: u8, u: f64, v: f64) -> Point {
    match face {
        0 => Point::new(1.0, u, v),
        1 => Point::new(-u, 1.0, v),
        2 => Point::new(-u, -v, 1.0),
        3 => Point::new(-1.0, -v, -u),
        4 => Point::new(v, -1.0, -u),
        _ => Point::new(v, u, -1.0),
    }
}

/// Outward normal of the face (the direction of its center).
#[inline]
pub(crate) fn face_norm(face: u8) -> Point {
    face_uv_to_xyz(face, 0.0, 0.0)
}

/// Unit vector along increasing u at the face center.
#[inline]
pub(crate) fn face_u_axis(face: u8) -> Point {
    match face {
        0 => Point::new(0.0, 1.0, 0.0),
        1 => Point::new(-1.0, 0.0, 0.0),
        2 => Point::new(-1.0, 0.0, 0.0),
        3 => Point::new(0.0, 0.0, -1.0),
        4 => Point::new(0.0, 0.0, -1.0),
        _ => Point::new(0.0, 1.0, 0.0),
    }
}

/// Unit vector along increasing v at the face center.
#[inline]
pub(crate) fn face_v_axis(face: u8) -> Point {
    match face {
        0 => Point::new(0.0, 0.0, 1.0),
        1 => Point::new(0.0, 0.0, 1.0),
        2 => Point::new(0.0, -1.0, 0.0),
        3 => Point::new(0.0, -1.0, 0.0),
        4 => Point::new(1.0, 0.0, 0.0),
        _ => Point::new(1.0, 0.0, 0.0),
    }
}

/// Normal (not unit length) to the great circle of constant u, oriented so
/// the edge runs right-handed in increasing v.
#[inline]
pub(crate) fn face_u_norm(face: u8, u: f64) -> Point {
    match face {
        0 => Point::new(u, -1.0, 0.0),
        1 => Point::new(1.0, u, 0.0),
        2 => Point::new(1.0, 0.0, u),
        3 => Point::new(-u, 0.0, 1.0),
        4 => Point::new(0.0, -u, 1.0),
        _ => Point::new(0.0, -1.0, -u),
    }
}

/// Normal (not unit length) to the great circle of constant v, oriented so
/// the edge runs right-handed in increasing u.
#[inline]
pub(crate) fn face_v_norm(face: u8, v: f64) -> Point {
    match face {
        0 => Point::new(-v, 0.0, 1.0),
        1 => Point::new(0.0, -v, 1.0),
        2 => Point::new(0.0, -1.0, -v),
        3 => Point::new(v, -1.0, 0.0),
        4 => Point::new(1.0, v, 0.0),
        _ => Point::new(1.0, 0.0, v),
    }
}

// ============================================================================
// Cell metrics
// ============================================================================

/// Binary exponent of `v` such that `v = m * 2^(exp-1)` with `m` in [1, 2);
/// zero maps to 0. Extracted straight from the bit pattern, so it is exact.
#[inline]
fn exp(v: f64) -> i32 {
    if v == 0.0 {
        return 0;
    }
    (((v.to_bits() >> 52) & 0x7ff) as i32) - 1022
}

/// Relates a geometric quantity of cells (a length or an area) to the
/// subdivision level. `value(level)` halves (dim 1) or quarters (dim 2) with
/// each level; the inverse lookups use exact exponent extraction, so they
/// are precise even for values near a level boundary.
#[derive(Debug, Clone, Copy)]
pub struct Metric {
    dim: u32,
    deriv: f64,
}

impl Metric {
    #[inline]
    pub const fn new(dim: u32, deriv: f64) -> Self {
        Metric { dim, deriv }
    }

    #[inline]
    pub const fn deriv(self) -> f64 {
        self.deriv
    }

    /// The value of this metric at the given level.
    #[inline]
    pub fn value(self, level: u8) -> f64 {
        self.deriv * f64::powi(2.0, self.dim as i32 * (1 - level as i32))
    }

    /// Minimum level such that the metric is at most the given value, or
    /// `MAX_LEVEL` if there is no such level (or the value is non-positive).
    pub fn min_level(self, value: f64) -> u8 {
        if value <= 0.0 {
            return crate::cellid::MAX_LEVEL;
        }
        // Computes the floating-point level and rounds up, exactly.
        let exponent = exp(value / ((1u32 << self.dim) as f64 * self.deriv));
        let level = -((exponent - 1) >> (self.dim - 1));
        level.clamp(0, crate::cellid::MAX_LEVEL as i32) as u8
    }

    /// Maximum level such that the metric is at least the given value, or 0
    /// if there is no such level. Non-positive values map to `MAX_LEVEL`.
    pub fn max_level(self, value: f64) -> u8 {
        if value <= 0.0 {
            return crate::cellid::MAX_LEVEL;
        }
        let exponent = exp((1u32 << self.dim) as f64 * self.deriv / value);
        let level = (exponent - 1) >> (self.dim - 1);
        level.clamp(0, crate::cellid::MAX_LEVEL as i32) as u8
    }

    /// Level at which the metric is closest to the given value.
    #[inline]
    pub fn closest_level(self, value: f64) -> u8 {
        self.min_level(std::f64::consts::SQRT_2 * value)
    }
}

/// Minimum width of a cell at a given level. The minimum is attained by
/// leaf-level cells straddling a face midline; `value(0)` is the width of a
/// face across its narrowest span.
pub const MIN_WIDTH: Metric = Metric::new(1, std::f64::consts::SQRT_2 / 3.0);

/// Average area of a cell at a given level. Exact: every level partitions
/// the sphere, so `6 * 4^level` cells average to `4*pi / (6 * 4^level)`.
pub const AVG_AREA: Metric = Metric::new(2, std::f64::consts::PI / 6.0);

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn st_uv_fixed_points_and_round_trip() {
        for x in [-1.0, 0.0, 1.0] {
            assert_eq!(st_to_uv(x), x);
            assert_eq!(uv_to_st(x), x);
        }
        let mut s = -1.0;
        while s <= 1.0 {
            assert!((uv_to_st(st_to_uv(s)) - s).abs() < 1e-15);
            assert!((st_to_uv(uv_to_st(s)) - s).abs() < 1e-15);
            s += 1.0 / 1024.0;
        }
    }

    #[test]
    fn faces_cover_every_axis_once() {
        let mut sum = Point::ZERO;
        for face in 0..6 {
            let center = face_uv_to_xyz(face, 0.0, 0.0);
            assert_eq!(center, face_norm(face));
            assert_eq!(
                crate::point::component(center, crate::point::largest_abs_component(center)).abs(),
                1.0
            );
            sum += center.abs();
        }
        assert_eq!(sum, Point::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn faces_are_right_handed() {
        for face in 0..6 {
            assert_eq!(
                face_u_axis(face)
                    .cross(face_v_axis(face))
                    .dot(face_norm(face)),
                1.0
            );
        }
    }

    #[test]
    fn face_axes_match_uv_derivatives() {
        for face in 0..6 {
            let center = face_uv_to_xyz(face, 0.0, 0.0);
            assert_eq!(face_u_axis(face), face_uv_to_xyz(face, 1.0, 0.0) - center);
            assert_eq!(face_v_axis(face), face_uv_to_xyz(face, 0.0, 1.0) - center);
        }
    }

    #[test]
    fn traversal_order_is_continuous_across_faces() {
        // The face curve starts at (-1,-1) and ends at (1,-1) or (-1,1)
        // depending on the axis swap, landing on the next face's start.
        for face in 0..6u8 {
            let sign = if face & 1 != 0 { -1.0 } else { 1.0 };
            assert_eq!(
                face_uv_to_xyz(face, sign, -sign),
                face_uv_to_xyz((face + 1) % 6, -1.0, -1.0)
            );
        }
    }

    #[test]
    fn uv_norms_match_edge_cross_products() {
        for face in 0..6 {
            let mut x = -1.0;
            while x <= 1.0 {
                let u_edge = face_uv_to_xyz(face, x, -1.0).cross(face_uv_to_xyz(face, x, 1.0));
                assert!(crate::point::angle(u_edge, face_u_norm(face, x)) < 1e-14);
                let v_edge = face_uv_to_xyz(face, -1.0, x).cross(face_uv_to_xyz(face, 1.0, x));
                assert!(crate::point::angle(v_edge, face_v_norm(face, x)) < 1e-14);
                x += 1.0 / 16.0;
            }
        }
    }

    #[test]
    fn uv_projection_round_trip() {
        for face in 0..6 {
            let p = face_uv_to_xyz(face, 0.4, -0.7).normalize();
            assert_eq!(xyz_to_face(p), face);
            let uv = valid_face_xyz_to_uv(face, p);
            assert!((uv.x - 0.4).abs() < 1e-14);
            assert!((uv.y - -0.7).abs() < 1e-14);
            assert!(face_xyz_to_uv(face, p).is_some());
            assert_eq!(face_xyz_to_uv((face + 3) % 6, p), None);
        }
    }

    #[test]
    fn exponent_extraction() {
        for i in 0..10 {
            assert_eq!(exp(f64::powi(2.0, i)), i as i32 + 1);
            assert_eq!(exp(-f64::powi(2.0, i)), i as i32 + 1);
        }
        assert_eq!(exp(0.0), 0);
        assert_eq!(exp(3.0), 2);
        assert_eq!(exp(5.0), 3);
    }

    #[test]
    fn metric_values_partition_the_sphere() {
        assert!((6.0 * AVG_AREA.value(0) - 4.0 * PI).abs() < 1e-12);
        assert!((AVG_AREA.value(5) - 4.0 * PI / (6.0 * 1024.0)).abs() < 1e-15);
        assert!((MIN_WIDTH.value(0) - 2.0 * 2.0f64.sqrt() / 3.0).abs() < 1e-15);
    }

    fn check_level_lookups(metric: Metric, dim: i32) {
        for level in -2..=(crate::cellid::MAX_LEVEL as i32 + 3) {
            // The value this metric would have at `level`, allowing levels
            // outside the valid range.
            let value = metric.deriv() * f64::powi(2.0, dim * (1 - level));
            let expected = level.clamp(0, crate::cellid::MAX_LEVEL as i32) as u8;

            assert_eq!(metric.min_level(value), expected, "min at {level}");
            assert_eq!(metric.max_level(value), expected, "max at {level}");
            assert_eq!(metric.closest_level(value), expected, "closest at {level}");

            // Just above and below the exact value resolve to the same
            // level for min/max respectively, and closest rounds to it from
            // both sides.
            assert_eq!(metric.min_level(1.2 * value), expected);
            assert_eq!(metric.max_level(0.8 * value), expected);
            assert_eq!(metric.closest_level(1.2 * value), expected);
            assert_eq!(metric.closest_level(0.8 * value), expected);
        }
    }

    #[test]
    fn metric_level_lookups() {
        check_level_lookups(MIN_WIDTH, 1);
        check_level_lookups(AVG_AREA, 2);
        assert_eq!(MIN_WIDTH.min_level(0.0), crate::cellid::MAX_LEVEL);
        assert_eq!(MIN_WIDTH.max_level(0.0), crate::cellid::MAX_LEVEL);
        assert_eq!(AVG_AREA.min_level(-1.0), crate::cellid::MAX_LEVEL);
    }
}
