//! Geographic coverage queries.
//!
//! Turns circles, annuli and rectangles given in degrees and nautical miles
//! into sets of same-level cells, picking the finest level whose cell count
//! stays inside a budget. The fixed level makes the results directly usable
//! as index terms: a point matches a coverage iff its cell id at the chosen
//! level is in the set.

use crate::angle::Angle;
use crate::cap::Cap;
use crate::cellid::{CellId, MAX_LEVEL};
use crate::coverer::simple_covering;
use crate::latlng::LatLng;
use crate::point::Point;
use crate::rect::LatLngRect;
use crate::region::Region;

const EARTH_RADIUS_METERS: f64 = 6_378_137.0;
const METERS_PER_NAUTICAL_MILE: f64 = 1_852.0;

/// Default cell budget for [`rectangle_coverage`].
const RECT_MAX_CELLS: usize = 300;

/// Level range and cell budget for the coverage queries.
///
/// Levels are probed from `min_level` upward; the first level whose cell
/// count reaches `max_cells` stops the search and the previous level wins.
#[derive(Debug, Clone, Copy)]
pub struct CoverageOptions {
    pub min_level: u8,
    pub max_level: u8,
    pub max_cells: usize,
}

impl Default for CoverageOptions {
    fn default() -> Self {
        CoverageOptions {
            min_level: 3,
            max_level: 9,
            max_cells: 500,
        }
    }
}

/// A region rendered as cells of a single level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coverage {
    pub level: u8,
    pub cells: Vec<CellId>,
}

/// Coverage of an annulus, as an outer disc and an inner disc to subtract.
///
/// The subtraction is left to the caller: a point is inside the annulus iff
/// its cell is in `include` and not in `exclude`. The two coverages are
/// computed independently and may use different levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoughnutCoverage {
    pub include: Coverage,
    pub exclude: Coverage,
}

/// Cell id containing the given coordinates at the given level, which is
/// clamped to the valid range.
pub fn cell_id_for_coordinates(lat_degrees: f64, lng_degrees: f64, level: u8) -> CellId {
    let point = LatLng::from_degrees(lat_degrees, lng_degrees).normalized();
    CellId::from_latlng(point).parent_at(level.min(MAX_LEVEL))
}

/// Covers a disc of the given radius around the given coordinates with
/// default options.
pub fn circular_coverage(lat_degrees: f64, lng_degrees: f64, radius_nm: f64) -> Coverage {
    circular_coverage_with(lat_degrees, lng_degrees, radius_nm, &CoverageOptions::default())
}

/// Covers a disc of the given radius (in nautical miles) around the given
/// coordinates (in degrees).
pub fn circular_coverage_with(
    lat_degrees: f64,
    lng_degrees: f64,
    radius_nm: f64,
    options: &CoverageOptions,
) -> Coverage {
    let center = LatLng::from_degrees(lat_degrees, lng_degrees)
        .normalized()
        .to_point();
    let radius = Angle::from_radians(radius_nm * METERS_PER_NAUTICAL_MILE / EARTH_RADIUS_METERS);
    let cap = Cap::from_axis_angle(center, radius);
    probe_levels(&cap, center, options)
}

/// Covers an annulus around the given coordinates with default options.
pub fn doughnut_coverage(
    lat_degrees: f64,
    lng_degrees: f64,
    outer_radius_nm: f64,
    inner_radius_nm: f64,
) -> DoughnutCoverage {
    doughnut_coverage_with(
        lat_degrees,
        lng_degrees,
        outer_radius_nm,
        inner_radius_nm,
        &CoverageOptions::default(),
    )
}

/// Covers an annulus around the given coordinates as two independent disc
/// coverages.
pub fn doughnut_coverage_with(
    lat_degrees: f64,
    lng_degrees: f64,
    outer_radius_nm: f64,
    inner_radius_nm: f64,
    options: &CoverageOptions,
) -> DoughnutCoverage {
    DoughnutCoverage {
        include: circular_coverage_with(lat_degrees, lng_degrees, outer_radius_nm, options),
        exclude: circular_coverage_with(lat_degrees, lng_degrees, inner_radius_nm, options),
    }
}

/// Covers the rectangle spanned by two corners with default options. The
/// rectangle budget is lower than the disc one since rectangles here tend
/// to be large.
pub fn rectangle_coverage(
    from_lat_degrees: f64,
    from_lng_degrees: f64,
    to_lat_degrees: f64,
    to_lng_degrees: f64,
) -> Coverage {
    rectangle_coverage_with(
        from_lat_degrees,
        from_lng_degrees,
        to_lat_degrees,
        to_lng_degrees,
        &CoverageOptions {
            max_cells: RECT_MAX_CELLS,
            ..CoverageOptions::default()
        },
    )
}

/// Covers the rectangle spanned by two corners, taking the shorter way
/// around in longitude.
pub fn rectangle_coverage_with(
    from_lat_degrees: f64,
    from_lng_degrees: f64,
    to_lat_degrees: f64,
    to_lng_degrees: f64,
    options: &CoverageOptions,
) -> Coverage {
    let from = LatLng::from_degrees(from_lat_degrees, from_lng_degrees).normalized();
    let to = LatLng::from_degrees(to_lat_degrees, to_lng_degrees).normalized();
    let rect = LatLngRect::from_point_pair(from, to);
    probe_levels(&rect, from.to_point(), options)
}

/// Probes levels from the bottom up and keeps the finest one under budget.
/// When even the coarsest level is over budget the coverage is empty.
fn probe_levels<R: Region>(region: &R, start: Point, options: &CoverageOptions) -> Coverage {
    let min_level = options.min_level.min(MAX_LEVEL);
    let max_level = options.max_level.min(MAX_LEVEL);
    let mut best = Coverage {
        level: min_level,
        cells: Vec::new(),
    };
    for level in min_level..=max_level {
        let cells = simple_covering(region, start, level);
        if cells.len() >= options.max_cells {
            log::trace!("probe level {}: {} cells, over budget", level, cells.len());
            break;
        }
        log::trace!("probe level {}: {} cells", level, cells.len());
        best = Coverage { level, cells };
    }
    log::debug!(
        "coverage at level {}: {} cells (budget {})",
        best.level,
        best.cells.len(),
        options.max_cells
    );
    best
}
