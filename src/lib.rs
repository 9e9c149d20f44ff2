//! Hierarchical spatial addressing and region covering on the unit sphere.
//!
//! The sphere is projected onto the six faces of a circumscribing cube and
//! each face is subdivided recursively into four children along a Hilbert
//! curve, thirty levels deep. A cell at any level is addressed by a single
//! 64-bit [`CellId`], numerically close to the ids of nearby cells, so
//! containment and proximity queries reduce to integer comparisons. Regions
//! such as discs, rectangles and annuli are approximated by small sets of
//! cells suitable for indexing and range queries.
//!
//! # Example
//!
//! ```
//! use s2_covering::{cell_id_for_coordinates, circular_coverage};
//!
//! // Address a coordinate at level 11 and render the id as a token.
//! let id = cell_id_for_coordinates(48.11027908325195, 16.569721221923828, 11);
//! assert_eq!(id.to_token(), "476c544");
//!
//! // Cover a 150 nautical mile disc around the same point.
//! let coverage = circular_coverage(48.11027908325195, 16.569721221923828, 150.0);
//! assert!(!coverage.cells.is_empty());
//! assert!(coverage.cells.iter().all(|id| id.level() == coverage.level));
//! ```

mod angle;
mod cap;
mod cell;
mod cellid;
mod cellunion;
mod coverage;
mod coverer;
mod error;
mod interval;
mod latlng;
mod point;
mod projection;
mod rect;
mod region;

pub use angle::Angle;
pub use cap::Cap;
pub use cell::Cell;
pub use cellid::{CellId, MAX_LEVEL};
pub use cellunion::CellUnion;
pub use coverage::{
    cell_id_for_coordinates, circular_coverage, circular_coverage_with, doughnut_coverage,
    doughnut_coverage_with, rectangle_coverage, rectangle_coverage_with, Coverage,
    CoverageOptions, DoughnutCoverage,
};
pub use coverer::{
    covering, covering_union, interior_covering, interior_covering_union, simple_covering,
    CovererOptions, DEFAULT_MAX_CELLS,
};
pub use error::TokenError;
pub use interval::{CircularInterval, Interval};
pub use latlng::LatLng;
pub use point::Point;
pub use projection::{Metric, AVG_AREA, MIN_WIDTH};
pub use rect::LatLngRect;
pub use region::Region;
