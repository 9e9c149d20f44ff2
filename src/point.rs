//! Points on the unit sphere and spherical area primitives.

use glam::DVec3;

/// A point on (or near) the unit sphere, stored as a double-precision
/// 3-vector. Operations that require unit length say so; none of them
/// normalize on your behalf.
pub type Point = DVec3;

/// Angle in radians between two vectors.
///
/// The atan2 form is scale invariant and stays accurate for nearly parallel
/// and nearly antipodal inputs, where `acos` of a dot product loses up to
/// half the significant digits.
#[inline]
pub fn angle(a: Point, b: Point) -> f64 {
    a.cross(b).length().atan2(a.dot(b))
}

/// Index of the component with the largest absolute value (0=x, 1=y, 2=z).
#[inline]
pub(crate) fn largest_abs_component(p: Point) -> usize {
    let t = p.abs();
    if t.x > t.y {
        if t.x > t.z {
            0
        } else {
            2
        }
    } else if t.y > t.z {
        1
    } else {
        2
    }
}

/// Component of `p` selected by axis index (0=x, 1=y, 2=z).
#[inline]
pub(crate) fn component(p: Point, axis: usize) -> f64 {
    match axis {
        0 => p.x,
        1 => p.y,
        _ => p.z,
    }
}

/// True if `p` is within floating-point drift of unit length.
#[inline]
pub(crate) fn is_unit_length(p: Point) -> bool {
    (p.length_squared() - 1.0).abs() <= 1e-15
}

/// Area of the spherical triangle (a, b, c) in steradians.
///
/// Uses l'Huilier's formula, falling back to Girard's formula for long
/// skinny triangles where l'Huilier cancels badly. Relative accuracy is
/// about 1e-14 down to areas near 1e-20; inputs need not be unit length.
pub fn triangle_area(a: Point, b: Point, c: Point) -> f64 {
    let sa = angle(b, c);
    let sb = angle(c, a);
    let sc = angle(a, b);
    let s = 0.5 * (sa + sb + sc);
    if s >= 3e-4 {
        // Girard's formula can beat l'Huilier when the triangle is long and
        // skinny relative to its semiperimeter.
        let s2 = s * s;
        let dmin = s - sa.max(sb).max(sc);
        if dmin < 1e-2 * s * s2 * s2 {
            let area = girard_area(a, b, c);
            if dmin < s * (0.1 * area) {
                return area;
            }
        }
    }
    // l'Huilier's formula.
    let product = (0.5 * s).tan()
        * (0.5 * (s - sa)).tan()
        * (0.5 * (s - sb)).tan()
        * (0.5 * (s - sc)).tan();
    4.0 * product.max(0.0).sqrt().atan()
}

/// Girard's formula, rearranged so that a degenerate triangle with
/// `a == b == c` needs no special case. Clamped to zero from below.
pub fn girard_area(a: Point, b: Point, c: Point) -> f64 {
    let ab = a.cross(b);
    let bc = b.cross(c);
    let ac = a.cross(c);
    (angle(ab, ac) - angle(ab, bc) + angle(bc, ac)).max(0.0)
}
