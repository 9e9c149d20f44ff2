//! Approximating regions by unions of cells.
//!
//! The main entry points are [`covering`] and [`interior_covering`], which
//! approximate an arbitrary [`Region`] from the outside or the inside under
//! the constraints in [`CovererOptions`]. [`simple_covering`] is a cheaper
//! alternative for connected regions when all cells should have the same
//! level.

#[cfg(test)]
mod tests;

use crate::cell::Cell;
use crate::cellid::{CellId, MAX_LEVEL};
use crate::cellunion::CellUnion;
use crate::point::Point;
use crate::projection::MIN_WIDTH;
use crate::region::Region;
use rustc_hash::FxHashSet;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Default bound on the number of cells in a covering.
pub const DEFAULT_MAX_CELLS: usize = 8;

/// Constraints on the coverings produced by [`covering`] and friends.
///
/// `max_cells` is a soft budget: it may be exceeded when `min_level` forces
/// more cells than the budget allows, or when the budget is below 3 and the
/// region spans more cells than that at the top level. Coverings above the
/// budget come out as accurate as one at the budget would have been.
///
/// Accuracy is mostly controlled by `max_cells`: raising `max_level` alone
/// only refines the boundary cells, it does not buy a tighter covering.
#[derive(Debug, Clone, Copy)]
pub struct CovererOptions {
    min_level: u8,
    max_level: u8,
    level_mod: u8,
    max_cells: usize,
}

impl Default for CovererOptions {
    fn default() -> Self {
        CovererOptions {
            min_level: 0,
            max_level: MAX_LEVEL,
            level_mod: 1,
            max_cells: DEFAULT_MAX_CELLS,
        }
    }
}

impl CovererOptions {
    /// Minimum cell level to use, clamped to the valid range.
    pub fn with_min_level(mut self, level: u8) -> Self {
        self.min_level = level.min(MAX_LEVEL);
        self
    }

    /// Maximum cell level to use, clamped to the valid range.
    pub fn with_max_level(mut self, level: u8) -> Self {
        self.max_level = level.min(MAX_LEVEL);
        self
    }

    /// Restricts the levels used to `min_level + k * level_mod`. Values are
    /// clamped to 1..=3.
    pub fn with_level_mod(mut self, level_mod: u8) -> Self {
        self.level_mod = level_mod.clamp(1, 3);
        self
    }

    /// Soft bound on the number of cells.
    pub fn with_max_cells(mut self, max_cells: usize) -> Self {
        self.max_cells = max_cells;
        self
    }
}

/// Covers the region from the outside: every point of the region is in some
/// cell of the result, and the constraints of `options` hold.
///
/// Sibling cells are merged into their parent wherever that does not
/// violate the level constraints, so the result is often smaller than the
/// raw covering.
pub fn covering<R: Region>(region: &R, options: &CovererOptions) -> Vec<CellId> {
    covering_union(region, options).denormalize(options.min_level, options.level_mod)
}

/// Like [`covering`], but normalized into a [`CellUnion`]. The union may
/// use cells below `min_level` where four siblings merged.
pub fn covering_union<R: Region>(region: &R, options: &CovererOptions) -> CellUnion {
    CellUnion::from_cell_ids(Coverer::new(region, options, false).run())
}

/// Covers the region from the inside: every cell of the result is fully
/// contained in the region. The result may be empty when the region
/// contains no cell satisfying the constraints.
pub fn interior_covering<R: Region>(region: &R, options: &CovererOptions) -> Vec<CellId> {
    interior_covering_union(region, options).denormalize(options.min_level, options.level_mod)
}

/// Like [`interior_covering`], but normalized into a [`CellUnion`].
pub fn interior_covering_union<R: Region>(region: &R, options: &CovererOptions) -> CellUnion {
    CellUnion::from_cell_ids(Coverer::new(region, options, true).run())
}

/// Covers a connected region with cells at a fixed level by flood fill
/// from the cell containing `start`, which must be a point of the region.
///
/// The result satisfies the same guarantee as [`covering`] but makes no
/// attempt to minimize the number of cells, and is returned in flood fill
/// order rather than sorted.
pub fn simple_covering<R: Region>(region: &R, start: Point, level: u8) -> Vec<CellId> {
    let start = CellId::from_point(start).parent_at(level);
    let mut output = Vec::new();
    let mut visited = FxHashSet::default();
    visited.insert(start);
    let mut frontier = vec![start];
    while let Some(id) = frontier.pop() {
        if !region.may_intersect_cell(&Cell::from(id)) {
            continue;
        }
        output.push(id);
        for neighbor in id.edge_neighbors() {
            if visited.insert(neighbor) {
                frontier.push(neighbor);
            }
        }
    }
    output
}

struct Candidate {
    cell: Cell,
    is_terminal: bool,
    children: Vec<Candidate>,
}

struct QueueEntry {
    priority: u32,
    candidate: Candidate,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.priority.cmp(&other.priority)
    }
}

/// One covering computation.
///
/// `result` accumulates cells that are part of the output; the queue holds
/// cells that may still be subdivided, prioritized by level (coarsest
/// first), then by the number of intersecting children, then by the number
/// of contained children. Cells entirely inside the region go straight to
/// the output and cells missing the region are dropped, so the queue only
/// ever holds cells crossing the region boundary.
struct Coverer<'a, R: Region> {
    region: &'a R,
    min_level: u8,
    max_level: u8,
    level_mod: u8,
    max_cells: usize,
    interior: bool,
    candidates_created: u32,
    queue: BinaryHeap<Reverse<QueueEntry>>,
    result: Vec<CellId>,
}

impl<'a, R: Region> Coverer<'a, R> {
    fn new(region: &'a R, options: &CovererOptions, interior: bool) -> Self {
        Coverer {
            region,
            min_level: options.min_level,
            max_level: options.max_level,
            level_mod: options.level_mod,
            max_cells: options.max_cells,
            interior,
            candidates_created: 0,
            queue: BinaryHeap::new(),
            result: Vec::new(),
        }
    }

    fn max_children_shift(&self) -> u32 {
        2 * self.level_mod as u32
    }

    fn run(mut self) -> Vec<CellId> {
        self.initial_candidates();
        while let Some(Reverse(entry)) = self.queue.pop() {
            if self.interior && self.result.len() >= self.max_cells {
                break;
            }
            let mut candidate = entry.candidate;
            // Interior coverings can stop subdividing whenever the budget
            // runs out, since they need not cover the whole region.
            // Exterior coverings must use all children once a cell is
            // subdivided. A candidate with a single child is expanded even
            // over budget; this handles min_level settings that force more
            // than max_cells cells.
            let queued = if self.interior { 0 } else { self.queue.len() };
            if candidate.cell.level() < self.min_level
                || candidate.children.len() == 1
                || self.result.len() + queued + candidate.children.len() <= self.max_cells
            {
                for child in candidate.children {
                    self.add_candidate(child);
                }
            } else if !self.interior {
                candidate.is_terminal = true;
                self.add_candidate(candidate);
            }
        }
        log::debug!(
            "covering: {} cells from {} candidates",
            self.result.len(),
            self.candidates_created
        );
        self.result
    }

    fn initial_candidates(&mut self) {
        if self.max_cells >= 4 {
            // Start a few levels down when the region is small: find the
            // deepest level at which the bounding cap still fits within one
            // cell vertex neighborhood, and seed with those four cells.
            let cap = self.region.cap_bound();
            let mut level = MIN_WIDTH
                .max_level(2.0 * cap.angle().radians())
                .min(self.max_level)
                .min(MAX_LEVEL - 1);
            if self.level_mod > 1 && level > self.min_level {
                level -= (level - self.min_level) % self.level_mod;
            }
            // Level 0 is not worth the detour: more than four face cells
            // may be needed.
            if level > 0 {
                let center = CellId::from_point(cap.axis());
                for id in center.vertex_neighbors(level) {
                    if let Some(candidate) = self.new_candidate(Cell::from(id)) {
                        self.add_candidate(candidate);
                    }
                }
                return;
            }
        }
        for face in 0..6 {
            let cell = Cell::from(CellId::from_face_pos_level(face, 0, 0));
            if let Some(candidate) = self.new_candidate(cell) {
                self.add_candidate(candidate);
            }
        }
    }

    /// Candidate for the given cell, or `None` when the cell cannot
    /// contribute to the covering.
    fn new_candidate(&mut self, cell: Cell) -> Option<Candidate> {
        if !self.region.may_intersect_cell(&cell) {
            return None;
        }
        let mut is_terminal = false;
        if cell.level() >= self.min_level {
            if self.interior {
                if self.region.contains_cell(&cell) {
                    is_terminal = true;
                } else if cell.level() + self.level_mod > self.max_level {
                    return None;
                }
            } else if cell.level() + self.level_mod > self.max_level
                || self.region.contains_cell(&cell)
            {
                is_terminal = true;
            }
        }
        self.candidates_created += 1;
        Some(Candidate {
            cell,
            is_terminal,
            children: Vec::new(),
        })
    }

    /// Adds a candidate to the result if terminal, otherwise expands its
    /// children and queues it.
    fn add_candidate(&mut self, mut candidate: Candidate) {
        if candidate.is_terminal {
            self.result.push(candidate.cell.id());
            return;
        }
        debug_assert!(candidate.children.is_empty());

        // Expand one level at a time until min_level is reached, so the
        // levels between are never skipped past.
        let num_levels = if candidate.cell.level() < self.min_level {
            1
        } else {
            self.level_mod
        };
        candidate.children.reserve(1 << self.max_children_shift());
        let cell = candidate.cell;
        let num_terminals = self.expand_children(&mut candidate, cell, num_levels);

        if candidate.children.is_empty() {
            // Nothing under this cell intersects the region.
        } else if !self.interior
            && num_terminals == 1usize << self.max_children_shift()
            && candidate.cell.level() >= self.min_level
        {
            // All children are terminal: use the parent instead. Interior
            // coverings cannot do this, since their non-terminal children
            // merely intersect the region.
            candidate.is_terminal = true;
            self.add_candidate(candidate);
        } else {
            let priority = ((((candidate.cell.level() as u32) << self.max_children_shift())
                + candidate.children.len() as u32)
                << self.max_children_shift())
                + num_terminals as u32;
            log::trace!("queued {} at priority {}", candidate.cell.id(), priority);
            self.queue.push(Reverse(QueueEntry {
                priority,
                candidate,
            }));
        }
    }

    /// Expands `cell` by `num_levels` levels, attaching the resulting
    /// candidates to `candidate`. Returns how many were terminal.
    fn expand_children(
        &mut self,
        candidate: &mut Candidate,
        cell: Cell,
        num_levels: u8,
    ) -> usize {
        let num_levels = num_levels - 1;
        let mut num_terminals = 0;
        for child_cell in cell.subdivide() {
            if num_levels > 0 {
                if self.region.may_intersect_cell(&child_cell) {
                    num_terminals += self.expand_children(candidate, child_cell, num_levels);
                }
                continue;
            }
            if let Some(child) = self.new_candidate(child_cell) {
                if child.is_terminal {
                    num_terminals += 1;
                }
                candidate.children.push(child);
            }
        }
        num_terminals
    }
}
