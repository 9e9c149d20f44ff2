//! 64-bit hierarchical cell identifiers on the unit sphere.
//!
//! A `CellId` names one cell of a recursive subdivision of the sphere: 6
//! cube faces, each divided into 4^level cells at levels 0..=30 along a
//! face-local Hilbert curve. The top 3 bits hold the face, the remaining 61
//! bits the curve position with a single trailing marker bit, so every
//! (face, level, position) triple gets a distinct id and the level can be
//! recovered from the position of the lowest set bit.
//!
//! The Hilbert traversal gives the property everything here relies on: ids
//! that are numerically close name cells that are spatially close (the
//! converse does not hold). A cell's id range is exactly the union of its
//! children's ranges, so containment and intersection tests are two
//! unsigned compares.


use crate::error::TokenError;
use crate::latlng::LatLng;
use crate::point::Point;
use crate::projection;
use glam::DVec2;
use std::fmt;

/// Deepest subdivision level.
pub const MAX_LEVEL: u8 = 30;

/// Leaf cells per face edge (2^30).
pub(crate) const MAX_SIZE: i32 = 1 << MAX_LEVEL;

const FACE_BITS: u32 = 3;
const NUM_FACES: u8 = 6;
const POS_BITS: u32 = 2 * MAX_LEVEL as u32 + 1;
const WRAP_OFFSET: u64 = (NUM_FACES as u64) << POS_BITS;

// Hilbert curve orientation flags: swap the i and j axes, invert their
// directions.
pub(crate) const SWAP_MASK: u8 = 0x01;
pub(crate) const INVERT_MASK: u8 = 0x02;

const LOOKUP_BITS: u32 = 4;

/// Orientation adjustment picked up at each position along the curve.
pub(crate) const POS_TO_ORIENTATION: [u8; 4] = [SWAP_MASK, 0, 0, INVERT_MASK | SWAP_MASK];

/// (i,j) quadrant (2 bits: i high, j low) visited at each curve position,
/// one row per orientation.
pub(crate) const POS_TO_IJ: [[u8; 4]; 4] = [
    [0, 1, 3, 2], // canonical order
    [0, 2, 3, 1], // axes swapped
    [3, 2, 0, 1], // bits inverted
    [3, 1, 0, 2], // swapped and inverted
];

/// Inverse of `POS_TO_IJ`.
#[cfg(test)]
pub(crate) const IJ_TO_POS: [[u8; 4]; 4] = [
    [0, 1, 3, 2],
    [0, 3, 1, 2],
    [2, 3, 1, 0],
    [2, 1, 3, 0],
];

// Lookup tables that translate 4 levels of the curve at a time. Indices and
// entries carry the orientation in their low 2 bits: an index is
// ((i << 4) + j) << 2 | orientation (for the position table) or
// (pos << 2) | orientation (for the ij table), and entries are packed the
// same way with the roles reversed.
const LOOKUP_TABLES: ([u16; 1024], [u16; 1024]) = build_lookup_tables();
const LOOKUP_POS: &[u16; 1024] = &LOOKUP_TABLES.0;
const LOOKUP_IJ: &[u16; 1024] = &LOOKUP_TABLES.1;

const fn build_lookup_tables() -> ([u16; 1024], [u16; 1024]) {
    let mut pos_table = [0u16; 1024];
    let mut ij_table = [0u16; 1024];
    let mut base = 0usize;
    while base < 4 {
        let mut pos = 0usize;
        while pos < 256 {
            // Walk the four quad digits most significant first, accumulating
            // (i,j) bits and composing the orientation.
            let mut i = 0usize;
            let mut j = 0usize;
            let mut orientation = base;
            let mut k = 3i32;
            while k >= 0 {
                let d = (pos >> (2 * k)) & 3;
                let ij = POS_TO_IJ[orientation][d] as usize;
                i = (i << 1) | (ij >> 1);
                j = (j << 1) | (ij & 1);
                orientation ^= POS_TO_ORIENTATION[d] as usize;
                k -= 1;
            }
            let ij = (i << LOOKUP_BITS) + j;
            pos_table[(ij << 2) + base] = ((pos << 2) + orientation) as u16;
            ij_table[(pos << 2) + base] = ((ij << 2) + orientation) as u16;
            pos += 1;
        }
        base += 1;
    }
    (pos_table, ij_table)
}

/// A cell identifier.
///
/// Plain 64-bit value type; ordering follows the Hilbert curve position.
/// The zero id ([`CellId::NONE`]) is not a valid cell.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId(u64);

impl CellId {
    /// The invalid "no cell" id.
    pub const NONE: CellId = CellId(0);

    #[inline]
    pub const fn new(id: u64) -> Self {
        CellId(id)
    }

    /// The raw 64-bit value.
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }

    // ------------------------------------------------------------------
    // Constructors
    // ------------------------------------------------------------------

    /// The cell at `level` containing the given curve position on `face`.
    /// The position's bits below the level are ignored.
    pub fn from_face_pos_level(face: u8, pos: u64, level: u8) -> Self {
        debug_assert!(face < NUM_FACES);
        CellId(((face as u64) << POS_BITS) + (pos | 1)).parent_at(level.min(MAX_LEVEL))
    }

    /// Leaf cell containing the given point (which need not be unit
    /// length).
    pub fn from_point(p: Point) -> Self {
        let face = projection::xyz_to_face(p);
        let uv = projection::valid_face_xyz_to_uv(face, p);
        let i = projection::st_to_ij(projection::uv_to_st(uv.x));
        let j = projection::st_to_ij(projection::uv_to_st(uv.y));
        Self::from_face_ij(face, i, j)
    }

    /// Leaf cell containing the given coordinates.
    #[inline]
    pub fn from_latlng(ll: LatLng) -> Self {
        Self::from_point(ll.to_point())
    }

    /// Leaf cell at leaf-grid coordinates (i,j) on `face`.
    pub(crate) fn from_face_ij(face: u8, i: i32, j: i32) -> Self {
        // Assemble the 61-bit curve position in two 32-bit halves, taking 4
        // bits of i and j per lookup.
        let mut n = [0u64, (face as u64) << (POS_BITS - 33)];
        let mut bits = (face & SWAP_MASK) as u32;
        let mask = (1u32 << LOOKUP_BITS) - 1;
        for k in (0..8i32).rev() {
            bits += (((i >> (k * 4)) as u32) & mask) << (LOOKUP_BITS + 2);
            bits += (((j >> (k * 4)) as u32) & mask) << 2;
            bits = LOOKUP_POS[bits as usize] as u32;
            n[(k >> 2) as usize] |= ((bits as u64) >> 2) << ((k & 3) * 8);
            bits &= (SWAP_MASK | INVERT_MASK) as u32;
        }
        CellId((((n[1] << 32) + n[0]) << 1) + 1)
    }

    /// Like `from_face_ij`, but (i,j) may lie up to one cell outside the
    /// face, in which case the result is the leaf on the adjacent face.
    fn from_face_ij_wrap(face: u8, i: i32, j: i32) -> Self {
        // Clamp to a position just past the face boundary, then project
        // through 3-space onto whichever face that direction hits. The
        // linear map u=s suffices here: only boundary points arrive, and
        // the quadratic transform is the identity at -1, 0, and 1.
        let i = i.clamp(-1, MAX_SIZE);
        let j = j.clamp(-1, MAX_SIZE);
        let scale = 1.0 / MAX_SIZE as f64;
        let s = scale * (2 * i as i64 + 1 - MAX_SIZE as i64) as f64;
        let t = scale * (2 * j as i64 + 1 - MAX_SIZE as i64) as f64;
        let p = projection::face_uv_to_xyz(face, s, t);
        let face = projection::xyz_to_face(p);
        let uv = projection::valid_face_xyz_to_uv(face, p);
        Self::from_face_ij(face, projection::st_to_ij(uv.x), projection::st_to_ij(uv.y))
    }

    fn from_face_ij_same(face: u8, i: i32, j: i32, same_face: bool) -> Self {
        if same_face {
            Self::from_face_ij(face, i, j)
        } else {
            Self::from_face_ij_wrap(face, i, j)
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// True for ids that name an actual cell: face in range and the level
    /// marker bit present.
    pub fn is_valid(self) -> bool {
        self.face() < NUM_FACES && (self.lowest_on_bit() & 0x1555_5555_5555_5555) != 0
    }

    #[inline]
    pub const fn face(self) -> u8 {
        (self.0 >> POS_BITS) as u8
    }

    /// Hilbert curve position within the face, in the low 61 bits.
    #[inline]
    pub const fn pos(self) -> u64 {
        self.0 & (u64::MAX >> FACE_BITS)
    }

    /// Subdivision level, recovered from the trailing marker bit.
    #[inline]
    pub fn level(self) -> u8 {
        debug_assert!(self.0 != 0);
        MAX_LEVEL - (self.0.trailing_zeros() >> 1) as u8
    }

    #[inline]
    pub fn is_leaf(self) -> bool {
        (self.0 & 1) != 0
    }

    #[inline]
    pub fn is_face(self) -> bool {
        (self.0 & (Self::lsb_for_level(0) - 1)) == 0
    }

    /// Which child (0..4) of its parent this cell's ancestor at `level`
    /// is. `level` must be between 1 and this cell's level.
    pub fn child_position(self, level: u8) -> u8 {
        debug_assert!(level >= 1 && level <= self.level());
        ((self.0 >> (2 * (MAX_LEVEL - level) as u32 + 1)) & 3) as u8
    }

    #[inline]
    pub(crate) fn lowest_on_bit(self) -> u64 {
        self.0 & self.0.wrapping_neg()
    }

    /// The marker bit of an id at `level`.
    #[inline]
    pub(crate) const fn lsb_for_level(level: u8) -> u64 {
        1u64 << (2 * (MAX_LEVEL - level) as u32)
    }

    // ------------------------------------------------------------------
    // Containment
    // ------------------------------------------------------------------

    /// First leaf id within this cell.
    #[inline]
    pub fn range_min(self) -> CellId {
        CellId(self.0 - (self.lowest_on_bit() - 1))
    }

    /// Last leaf id within this cell (inclusive).
    #[inline]
    pub fn range_max(self) -> CellId {
        CellId(self.0 + (self.lowest_on_bit() - 1))
    }

    /// True if this cell is `other` or one of its ancestors.
    #[inline]
    pub fn contains(self, other: CellId) -> bool {
        other >= self.range_min() && other <= self.range_max()
    }

    /// True if the two cells overlap (one contains the other).
    #[inline]
    pub fn intersects(self, other: CellId) -> bool {
        other.range_min() <= self.range_max() && other.range_max() >= self.range_min()
    }

    // ------------------------------------------------------------------
    // Hierarchy traversal
    // ------------------------------------------------------------------

    pub fn parent(self) -> CellId {
        debug_assert!(self.is_valid() && self.level() > 0);
        let new_lsb = self.lowest_on_bit() << 2;
        CellId((self.0 & new_lsb.wrapping_neg()) | new_lsb)
    }

    /// Ancestor at the given coarser level.
    pub fn parent_at(self, level: u8) -> CellId {
        debug_assert!(level <= self.level());
        let new_lsb = Self::lsb_for_level(level);
        CellId((self.0 & new_lsb.wrapping_neg()) | new_lsb)
    }

    pub fn child_begin(self) -> CellId {
        debug_assert!(self.is_valid() && self.level() < MAX_LEVEL);
        let old_lsb = self.lowest_on_bit();
        CellId(self.0 - old_lsb + (old_lsb >> 2))
    }

    /// First descendant at `level`; iterate with [`CellId::next`] up to
    /// [`CellId::child_end_at`].
    pub fn child_begin_at(self, level: u8) -> CellId {
        debug_assert!(level >= self.level() && level <= MAX_LEVEL);
        CellId(self.0 - self.lowest_on_bit() + Self::lsb_for_level(level))
    }

    pub fn child_end(self) -> CellId {
        debug_assert!(self.is_valid() && self.level() < MAX_LEVEL);
        let old_lsb = self.lowest_on_bit();
        CellId(self.0 + old_lsb + (old_lsb >> 2))
    }

    /// One past the last descendant at `level`. May be invalid (one step
    /// past the end of the face).
    pub fn child_end_at(self, level: u8) -> CellId {
        debug_assert!(level >= self.level() && level <= MAX_LEVEL);
        CellId(self.0 + self.lowest_on_bit() + Self::lsb_for_level(level))
    }

    /// Next cell at this level along the curve. Walks off the end of the
    /// last face into an invalid id rather than wrapping.
    #[inline]
    pub fn next(self) -> CellId {
        CellId(self.0.wrapping_add(self.lowest_on_bit() << 1))
    }

    #[inline]
    pub fn prev(self) -> CellId {
        CellId(self.0.wrapping_sub(self.lowest_on_bit() << 1))
    }

    /// Like `next`, but wraps from the end of face 5 back to face 0.
    pub fn next_wrap(self) -> CellId {
        debug_assert!(self.is_valid());
        let n = self.next();
        if n.0 < WRAP_OFFSET {
            n
        } else {
            CellId(n.0 - WRAP_OFFSET)
        }
    }

    /// Like `prev`, but wraps from the start of face 0 to the end of
    /// face 5.
    pub fn prev_wrap(self) -> CellId {
        debug_assert!(self.is_valid());
        let p = self.prev();
        if p.0 < WRAP_OFFSET {
            p
        } else {
            CellId(p.0.wrapping_add(WRAP_OFFSET))
        }
    }

    /// First cell of the full-sphere traversal at `level`.
    pub fn begin(level: u8) -> CellId {
        Self::from_face_pos_level(0, 0, 0).child_begin_at(level)
    }

    /// One past the last cell of the full-sphere traversal at `level`.
    pub fn end(level: u8) -> CellId {
        Self::from_face_pos_level(5, 0, 0).child_end_at(level)
    }

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    /// Direction of the cell center; not unit length, but within 1e-9 of
    /// it.
    pub fn to_point_raw(self) -> Point {
        // Decode a leaf inside this cell, then recenter. The decoded (i,j)
        // sits below the center for non-leaf cells; `delta` corrects by a
        // half leaf depending on the curve direction through the cell.
        let (face, i, j, _) = self.to_face_ij_orientation();
        let delta = if self.is_leaf() {
            1
        } else if ((i as u64 ^ (self.0 >> 2)) & 1) != 0 {
            2
        } else {
            0
        };
        let si = 2 * i as i64 + delta - MAX_SIZE as i64;
        let ti = 2 * j as i64 + delta - MAX_SIZE as i64;
        let scale = 1.0 / MAX_SIZE as f64;
        let u = projection::st_to_uv(scale * si as f64);
        let v = projection::st_to_uv(scale * ti as f64);
        projection::face_uv_to_xyz(face, u, v)
    }

    /// Unit vector at the cell center.
    #[inline]
    pub fn to_point(self) -> Point {
        self.to_point_raw().normalize()
    }

    /// Coordinates of the cell center.
    #[inline]
    pub fn to_latlng(self) -> LatLng {
        LatLng::from_point(self.to_point_raw())
    }

    /// Decodes to (face, i, j, orientation), where (i,j) are leaf-grid
    /// coordinates of a leaf within the cell and `orientation` is the
    /// Hilbert curve state of the cell itself.
    pub(crate) fn to_face_ij_orientation(self) -> (u8, i32, i32, u8) {
        let face = self.face();
        let mut bits = (face & SWAP_MASK) as u32;
        let mut i = 0i32;
        let mut j = 0i32;
        for k in (0..8i32).rev() {
            // The top iteration has only the 2 position bits left of the
            // 7 full lookups.
            let nbits = if k == 7 { 2 } else { LOOKUP_BITS };
            bits += (((self.0 >> (k * 8 + 1)) as u32) & ((1 << (2 * nbits)) - 1)) << 2;
            bits = LOOKUP_IJ[bits as usize] as u32;
            i += ((bits >> (LOOKUP_BITS + 2)) as i32) << (k * 4);
            j += (((bits >> 2) & ((1 << LOOKUP_BITS) - 1)) as i32) << (k * 4);
            bits &= (SWAP_MASK | INVERT_MASK) as u32;
        }
        // A cell whose marker suffix spans an odd number of bit pairs picks
        // up an extra axis swap from the suffix digits.
        let mut orientation = bits as u8;
        if (self.lowest_on_bit() & 0x1111_1111_1111_1110) != 0 {
            orientation ^= SWAP_MASK;
        }
        (face, i, j, orientation)
    }

    /// Center of the cell in face-local (u,v).
    pub(crate) fn center_uv(self) -> DVec2 {
        let (_, i, j, _) = self.to_face_ij_orientation();
        let cell_size = 1i64 << (MAX_LEVEL - self.level()) as u32;
        let si = (i as i64 & -cell_size) * 2 + cell_size - MAX_SIZE as i64;
        let ti = (j as i64 & -cell_size) * 2 + cell_size - MAX_SIZE as i64;
        let scale = 1.0 / MAX_SIZE as f64;
        DVec2::new(
            projection::st_to_uv(scale * si as f64),
            projection::st_to_uv(scale * ti as f64),
        )
    }

    // ------------------------------------------------------------------
    // Neighbors
    // ------------------------------------------------------------------

    /// The four cells adjacent across this cell's edges, in S, E, N, W
    /// order. Neighbors across a cube edge land on the adjacent face.
    pub fn edge_neighbors(self) -> [CellId; 4] {
        let level = self.level();
        let size = 1i32 << (MAX_LEVEL - level) as u32;
        let (face, i, j, _) = self.to_face_ij_orientation();
        [
            Self::from_face_ij_same(face, i, j - size, j - size >= 0).parent_at(level),
            Self::from_face_ij_same(face, i + size, j, i + size < MAX_SIZE).parent_at(level),
            Self::from_face_ij_same(face, i, j + size, j + size < MAX_SIZE).parent_at(level),
            Self::from_face_ij_same(face, i - size, j, i - size >= 0).parent_at(level),
        ]
    }

    /// The cells at `level` (strictly coarser than this cell's level)
    /// touching the vertex of this cell closest to its position: 4 cells,
    /// or 3 at one of the 8 cube corners.
    pub fn vertex_neighbors(self, level: u8) -> Vec<CellId> {
        debug_assert!(level < self.level());
        let (face, i, j, _) = self.to_face_ij_orientation();

        // The next bit of i and j below `level` says which quadrant of the
        // ancestor this cell is in, hence which vertex is closest.
        let halfsize = 1i32 << (MAX_LEVEL - (level + 1)) as u32;
        let size = halfsize << 1;
        let (ioffset, isame) = if (i & halfsize) != 0 {
            (size, i + size < MAX_SIZE)
        } else {
            (-size, i - size >= 0)
        };
        let (joffset, jsame) = if (j & halfsize) != 0 {
            (size, j + size < MAX_SIZE)
        } else {
            (-size, j - size >= 0)
        };

        let mut out = Vec::with_capacity(4);
        out.push(self.parent_at(level));
        out.push(Self::from_face_ij_same(face, i + ioffset, j, isame).parent_at(level));
        out.push(Self::from_face_ij_same(face, i, j + joffset, jsame).parent_at(level));
        // When both axis neighbors cross onto other faces this vertex is a
        // cube corner, which has only three incident cells.
        if isame || jsame {
            out.push(
                Self::from_face_ij_same(face, i + ioffset, j + joffset, isame && jsame)
                    .parent_at(level),
            );
        }
        out
    }

    /// All cells at `nbr_level` (at least this cell's level) that border
    /// this cell on any edge or corner.
    pub fn all_neighbors(self, nbr_level: u8) -> Vec<CellId> {
        debug_assert!(nbr_level >= self.level());
        let (face, mut i, mut j, _) = self.to_face_ij_orientation();

        // Lower-left corner of this cell.
        let size = 1i32 << (MAX_LEVEL - self.level()) as u32;
        i &= -size;
        j &= -size;

        let nbr_size = 1i32 << (MAX_LEVEL - nbr_level) as u32;
        let mut out = Vec::new();

        // One pass produces the N-S, E-W, and diagonal neighbors.
        let mut k = -nbr_size;
        loop {
            let same_face = if k < 0 {
                j + k >= 0
            } else if k >= size {
                j + k < MAX_SIZE
            } else {
                // North and south neighbors.
                out.push(
                    Self::from_face_ij_same(face, i + k, j - nbr_size, j - size >= 0)
                        .parent_at(nbr_level),
                );
                out.push(
                    Self::from_face_ij_same(face, i + k, j + size, j + size < MAX_SIZE)
                        .parent_at(nbr_level),
                );
                true
            };
            // East, west, and the four corner diagonals.
            out.push(
                Self::from_face_ij_same(face, i - nbr_size, j + k, same_face && i - size >= 0)
                    .parent_at(nbr_level),
            );
            out.push(
                Self::from_face_ij_same(face, i + size, j + k, same_face && i + size < MAX_SIZE)
                    .parent_at(nbr_level),
            );
            if k >= size {
                break;
            }
            k += nbr_size;
        }
        out
    }

    // ------------------------------------------------------------------
    // Tokens
    // ------------------------------------------------------------------

    /// Compact hex form: the 16-digit id with trailing zeros stripped.
    /// [`CellId::NONE`] becomes "X".
    pub fn to_token(self) -> String {
        if self.0 == 0 {
            return "X".to_string();
        }
        let hex = format!("{:016x}", self.0);
        hex.trim_end_matches('0').to_string()
    }

    /// Parses a token produced by [`CellId::to_token`]. Accepts both digit
    /// cases; does not check that the resulting id is valid.
    pub fn from_token(token: &str) -> Result<CellId, TokenError> {
        if token == "X" || token == "x" {
            return Ok(CellId::NONE);
        }
        let len = token.chars().count();
        if len == 0 {
            return Err(TokenError::Empty);
        }
        if len > 16 {
            return Err(TokenError::TooLong(len));
        }
        let mut value = 0u64;
        for c in token.chars() {
            let digit = c.to_digit(16).ok_or(TokenError::InvalidDigit(c))? as u64;
            value = (value << 4) | digit;
        }
        // The stripped trailing digits were zeros.
        value <<= 4 * (16 - len) as u32;
        Ok(CellId(value))
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_token())
    }
}
