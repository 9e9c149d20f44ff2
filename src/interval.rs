//! Closed one-dimensional intervals.
//!
//! [`Interval`] is an ordinary closed interval on the real line, used for
//! latitude ranges. [`CircularInterval`] lives on the unit circle and is used
//! for longitude ranges; an inverted bound pair (lo > hi) denotes an interval
//! wrapping through the +/-pi date line. Both represent empty and
//! single-point intervals exactly.

use std::f64::consts::PI;

/// IEEE-style remainder: `x - y * round_half_even(x / y)`, giving a result
/// in [-y/2, y/2].
#[inline]
pub(crate) fn remainder(x: f64, y: f64) -> f64 {
    x - (x / y).round_ties_even() * y
}

/// Distance from `a` to `b` going counterclockwise, in [0, 2*pi).
///
/// Written so that b == pi, a == -pi + eps gives approximately 2*pi rather
/// than collapsing to zero.
#[inline]
pub(crate) fn positive_distance(a: f64, b: f64) -> f64 {
    let d = b - a;
    if d >= 0.0 {
        return d;
    }
    (b + PI) - (a - PI)
}

// ============================================================================
// Interval (real line)
// ============================================================================

/// A closed, bounded interval on the real line.
///
/// Any interval with `lo > hi` is empty; all empty intervals compare equal.
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    lo: f64,
    hi: f64,
}

impl PartialEq for Interval {
    fn eq(&self, other: &Self) -> bool {
        (self.lo == other.lo && self.hi == other.hi) || (self.is_empty() && other.is_empty())
    }
}

impl Interval {
    #[inline]
    pub const fn new(lo: f64, hi: f64) -> Self {
        Interval { lo, hi }
    }

    #[inline]
    pub const fn empty() -> Self {
        Interval { lo: 1.0, hi: 0.0 }
    }

    #[inline]
    pub const fn from_point(p: f64) -> Self {
        Interval { lo: p, hi: p }
    }

    /// Minimal interval containing both points.
    #[inline]
    pub fn from_point_pair(p1: f64, p2: f64) -> Self {
        if p1 <= p2 {
            Interval { lo: p1, hi: p2 }
        } else {
            Interval { lo: p2, hi: p1 }
        }
    }

    #[inline]
    pub const fn lo(self) -> f64 {
        self.lo
    }

    #[inline]
    pub const fn hi(self) -> f64 {
        self.hi
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.lo > self.hi
    }

    /// Midpoint; arbitrary for empty intervals.
    #[inline]
    pub fn center(self) -> f64 {
        0.5 * (self.lo + self.hi)
    }

    /// Length of the interval; negative when empty.
    #[inline]
    pub fn length(self) -> f64 {
        self.hi - self.lo
    }

    #[inline]
    pub fn contains(self, p: f64) -> bool {
        p >= self.lo && p <= self.hi
    }

    #[inline]
    pub fn interior_contains(self, p: f64) -> bool {
        p > self.lo && p < self.hi
    }

    pub fn contains_interval(self, y: Interval) -> bool {
        if y.is_empty() {
            return true;
        }
        y.lo >= self.lo && y.hi <= self.hi
    }

    pub fn interior_contains_interval(self, y: Interval) -> bool {
        if y.is_empty() {
            return true;
        }
        y.lo > self.lo && y.hi < self.hi
    }

    pub fn intersects(self, y: Interval) -> bool {
        if self.lo <= y.lo {
            y.lo <= self.hi && y.lo <= y.hi
        } else {
            self.lo <= y.hi && self.lo <= self.hi
        }
    }

    /// True if the interior of this interval meets any point of `y`,
    /// including its boundary.
    pub fn interior_intersects(self, y: Interval) -> bool {
        y.lo < self.hi && self.lo < y.hi && self.lo < self.hi && y.lo <= y.hi
    }

    pub fn add_point(self, p: f64) -> Interval {
        if self.is_empty() {
            Interval::from_point(p)
        } else if p < self.lo {
            Interval { lo: p, hi: self.hi }
        } else if p > self.hi {
            Interval { lo: self.lo, hi: p }
        } else {
            self
        }
    }

    /// Widens by `radius` on both sides. Empty intervals stay empty.
    pub fn expanded(self, radius: f64) -> Interval {
        debug_assert!(radius >= 0.0);
        if self.is_empty() {
            return self;
        }
        Interval {
            lo: self.lo - radius,
            hi: self.hi + radius,
        }
    }

    pub fn union(self, y: Interval) -> Interval {
        if self.is_empty() {
            return y;
        }
        if y.is_empty() {
            return self;
        }
        Interval {
            lo: self.lo.min(y.lo),
            hi: self.hi.max(y.hi),
        }
    }

    /// Empty inputs need no special case: the result simply comes out empty.
    pub fn intersection(self, y: Interval) -> Interval {
        Interval {
            lo: self.lo.max(y.lo),
            hi: self.hi.min(y.hi),
        }
    }

    /// True if the symmetric difference of the two intervals has total
    /// length at most `max_error`.
    pub fn approx_equals(self, y: Interval, max_error: f64) -> bool {
        if self.is_empty() {
            return y.length() <= max_error;
        }
        if y.is_empty() {
            return self.length() <= max_error;
        }
        (y.lo - self.lo).abs() + (y.hi - self.hi).abs() <= max_error
    }
}

// ============================================================================
// CircularInterval (unit circle)
// ============================================================================

/// A closed interval on the unit circle with bounds in [-pi, pi].
///
/// `lo > hi` means the interval wraps through the +/-pi date line. The empty
/// and full intervals use the sentinel encodings [pi, -pi] and [-pi, pi];
/// outside those two, a bound of -pi normalizes to pi, so every point has
/// one representation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularInterval {
    lo: f64,
    hi: f64,
}

impl CircularInterval {
    /// Constructs [lo, hi], normalizing -pi bounds to pi except in the
    /// sentinel empty/full encodings.
    pub fn new(lo: f64, hi: f64) -> Self {
        let mut new_lo = lo;
        let mut new_hi = hi;
        if lo == -PI && hi != PI {
            new_lo = PI;
        }
        if hi == -PI && lo != PI {
            new_hi = PI;
        }
        CircularInterval {
            lo: new_lo,
            hi: new_hi,
        }
    }

    #[inline]
    pub const fn empty() -> Self {
        CircularInterval { lo: PI, hi: -PI }
    }

    #[inline]
    pub const fn full() -> Self {
        CircularInterval { lo: -PI, hi: PI }
    }

    pub fn from_point(mut p: f64) -> Self {
        if p == -PI {
            p = PI;
        }
        CircularInterval { lo: p, hi: p }
    }

    /// Minimal interval containing both points, going the short way around.
    /// Bounds must be in [-pi, pi].
    pub fn from_point_pair(mut p1: f64, mut p2: f64) -> Self {
        debug_assert!(p1.abs() <= PI && p2.abs() <= PI);
        if p1 == -PI {
            p1 = PI;
        }
        if p2 == -PI {
            p2 = PI;
        }
        if positive_distance(p1, p2) <= PI {
            CircularInterval { lo: p1, hi: p2 }
        } else {
            CircularInterval { lo: p2, hi: p1 }
        }
    }

    #[inline]
    pub const fn lo(self) -> f64 {
        self.lo
    }

    #[inline]
    pub const fn hi(self) -> f64 {
        self.hi
    }

    /// Bounds at most pi in absolute value, with -pi appearing only in the
    /// empty and full sentinels.
    pub fn is_valid(self) -> bool {
        self.lo.abs() <= PI
            && self.hi.abs() <= PI
            && !(self.lo == -PI && self.hi != PI)
            && !(self.hi == -PI && self.lo != PI)
    }

    #[inline]
    pub fn is_full(self) -> bool {
        self.hi - self.lo == 2.0 * PI
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.lo - self.hi == 2.0 * PI
    }

    /// True when the interval wraps through +/-pi (also true when empty).
    #[inline]
    pub fn is_inverted(self) -> bool {
        self.lo > self.hi
    }

    /// Midpoint in (-pi, pi]; arbitrary for empty and full intervals.
    pub fn center(self) -> f64 {
        let center = 0.5 * (self.lo + self.hi);
        if !self.is_inverted() {
            return center;
        }
        if center <= 0.0 {
            center + PI
        } else {
            center - PI
        }
    }

    /// Length; negative when empty.
    pub fn length(self) -> f64 {
        let mut length = self.hi - self.lo;
        if length >= 0.0 {
            return length;
        }
        length += 2.0 * PI;
        if length > 0.0 {
            length
        } else {
            -1.0
        }
    }

    /// Complement of the interior. Not a bijection: a singleton interval and
    /// the empty interval both complement to full.
    pub fn complement(self) -> Self {
        if self.lo == self.hi {
            return Self::full();
        }
        // Swapping bounds handles empty and full.
        CircularInterval {
            lo: self.hi,
            hi: self.lo,
        }
    }

    pub fn contains(self, mut p: f64) -> bool {
        debug_assert!(p.abs() <= PI);
        if p == -PI {
            p = PI;
        }
        self.fast_contains(p)
    }

    /// Like `contains` but assumes p is already normalized away from -pi.
    pub(crate) fn fast_contains(self, p: f64) -> bool {
        if self.is_inverted() {
            (p >= self.lo || p <= self.hi) && !self.is_empty()
        } else {
            p >= self.lo && p <= self.hi
        }
    }

    pub fn interior_contains(self, mut p: f64) -> bool {
        debug_assert!(p.abs() <= PI);
        if p == -PI {
            p = PI;
        }
        if self.is_inverted() {
            p > self.lo || p < self.hi
        } else {
            (p > self.lo && p < self.hi) || self.is_full()
        }
    }

    pub fn contains_interval(self, y: CircularInterval) -> bool {
        if self.is_inverted() {
            if y.is_inverted() {
                return y.lo >= self.lo && y.hi <= self.hi;
            }
            (y.lo >= self.lo || y.hi <= self.hi) && !self.is_empty()
        } else if y.is_inverted() {
            self.is_full() || y.is_empty()
        } else {
            y.lo >= self.lo && y.hi <= self.hi
        }
    }

    /// Note `x.interior_contains_interval(x)` holds only for the empty and
    /// full intervals.
    pub fn interior_contains_interval(self, y: CircularInterval) -> bool {
        if self.is_inverted() {
            if !y.is_inverted() {
                return y.lo > self.lo || y.hi < self.hi;
            }
            (y.lo > self.lo && y.hi < self.hi) || y.is_empty()
        } else if y.is_inverted() {
            self.is_full() || y.is_empty()
        } else {
            (y.lo > self.lo && y.hi < self.hi) || self.is_full()
        }
    }

    /// The point +/-pi has two representations, so [-pi, -3] and [2, pi]
    /// intersect.
    pub fn intersects(self, y: CircularInterval) -> bool {
        if self.is_empty() || y.is_empty() {
            return false;
        }
        if self.is_inverted() {
            // Every non-empty inverted interval contains pi.
            y.is_inverted() || y.lo <= self.hi || y.hi >= self.lo
        } else if y.is_inverted() {
            y.lo <= self.hi || y.hi >= self.lo
        } else {
            y.lo <= self.hi && y.hi >= self.lo
        }
    }

    pub fn interior_intersects(self, y: CircularInterval) -> bool {
        if self.is_empty() || y.is_empty() || self.lo == self.hi {
            return false;
        }
        if self.is_inverted() {
            y.is_inverted() || y.lo < self.hi || y.hi > self.lo
        } else if y.is_inverted() {
            y.lo < self.hi || y.hi > self.lo
        } else {
            (y.lo < self.hi && y.hi > self.lo) || self.is_full()
        }
    }

    /// Minimal expansion containing `p`, an angle in [-pi, pi]. Adding a
    /// point never turns a non-full interval into a full one.
    pub fn add_point(self, mut p: f64) -> Self {
        debug_assert!(p.abs() <= PI);
        if p == -PI {
            p = PI;
        }
        if self.fast_contains(p) {
            return self;
        }
        if self.is_empty() {
            return Self::from_point(p);
        }
        // Extend toward the closer endpoint.
        let dlo = positive_distance(p, self.lo);
        let dhi = positive_distance(self.hi, p);
        if dlo < dhi {
            Self::new(p, self.hi)
        } else {
            Self::new(self.lo, p)
        }
    }

    /// Widens by `radius` on both sides. Empty stays empty; an expansion
    /// that wraps all the way around (within one bit of rounding) returns
    /// full.
    pub fn expanded(self, radius: f64) -> Self {
        debug_assert!(radius >= 0.0);
        if self.is_empty() {
            return self;
        }
        if self.length() + 2.0 * radius >= 2.0 * PI - 1e-15 {
            return Self::full();
        }
        let mut lo = remainder(self.lo - radius, 2.0 * PI);
        let hi = remainder(self.hi + radius, 2.0 * PI);
        if lo == -PI {
            lo = PI;
        }
        Self::new(lo, hi)
    }

    /// Smallest interval containing both inputs.
    pub fn union(self, y: CircularInterval) -> Self {
        // The y-is-full case falls out of the endpoint tests below.
        if y.is_empty() {
            return self;
        }
        if self.fast_contains(y.lo) {
            if self.fast_contains(y.hi) {
                // Either this interval contains y, or the union covers the
                // whole circle.
                if self.contains_interval(y) {
                    return self;
                }
                return Self::full();
            }
            return CircularInterval {
                lo: self.lo,
                hi: y.hi,
            };
        }
        if self.fast_contains(y.hi) {
            return CircularInterval {
                lo: y.lo,
                hi: self.hi,
            };
        }
        // This interval contains neither endpoint of y: either y contains
        // all of this interval, or the two are disjoint.
        if self.is_empty() || y.fast_contains(self.lo) {
            return y;
        }
        // Disjoint: bridge the smaller of the two gaps.
        let dlo = positive_distance(y.hi, self.lo);
        let dhi = positive_distance(self.hi, y.lo);
        if dlo < dhi {
            CircularInterval {
                lo: y.lo,
                hi: self.hi,
            }
        } else {
            CircularInterval {
                lo: self.lo,
                hi: y.hi,
            }
        }
    }

    /// Smallest interval containing the intersection. The true intersection
    /// may consist of two disjoint arcs.
    pub fn intersection(self, y: CircularInterval) -> Self {
        if y.is_empty() {
            return Self::empty();
        }
        if self.fast_contains(y.lo) {
            if self.fast_contains(y.hi) {
                // Either this contains y, or the intersection is two
                // disjoint arcs. Return the shorter original either way.
                if y.length() < self.length() {
                    return y;
                }
                return self;
            }
            return CircularInterval {
                lo: y.lo,
                hi: self.hi,
            };
        }
        if self.fast_contains(y.hi) {
            return CircularInterval {
                lo: self.lo,
                hi: y.hi,
            };
        }
        if y.fast_contains(self.lo) {
            // Also covers the case where this interval is empty.
            return self;
        }
        Self::empty()
    }

    /// True if the symmetric difference has total length at most
    /// `max_error`.
    pub fn approx_equals(self, y: CircularInterval, max_error: f64) -> bool {
        if self.is_empty() {
            return y.length() <= max_error;
        }
        if y.is_empty() {
            return self.length() <= max_error;
        }
        remainder(y.lo - self.lo, 2.0 * PI).abs() + remainder(y.hi - self.hi, 2.0 * PI).abs()
            <= max_error
    }
}
