use super::*;

use crate::cap::Cap;
use crate::latlng::LatLng;
use crate::rect::LatLngRect;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;
use std::f64::consts::PI;

fn random_unit_point(rng: &mut ChaCha8Rng) -> Point {
    loop {
        let p = Point::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        let norm2 = p.length_squared();
        if norm2 > 1e-6 && norm2 <= 1.0 {
            return p.normalize();
        }
    }
}

fn random_cell_id(rng: &mut ChaCha8Rng) -> CellId {
    let level = rng.gen_range(0..=MAX_LEVEL);
    let face = rng.gen_range(0..6);
    let pos = rng.gen::<u64>() & (u64::MAX >> 3);
    CellId::from_face_pos_level(face, pos, level)
}

/// Cap with an area drawn log-uniformly from `[min_area, max_area]`.
fn random_cap(rng: &mut ChaCha8Rng, min_area: f64, max_area: f64) -> Cap {
    let area = max_area * (min_area / max_area).powf(rng.gen::<f64>());
    Cap::from_axis_area(random_unit_point(rng), area)
}

/// Integer skewed towards small values, up to `2^max_log - 1`.
fn skewed(rng: &mut ChaCha8Rng, max_log: u32) -> usize {
    let base = rng.gen_range(0..=max_log);
    rng.gen_range(0..(1usize << base))
}

/// Checks that the covering is tight around the region: cells disjoint
/// from the region are disjoint from the covering, and cells contained in
/// the region are contained in the covering.
fn check_covering_tight<R: Region>(region: &R, covering: &CellUnion, id: CellId) {
    if !id.is_valid() {
        for face in 0..6 {
            check_covering_tight(region, covering, CellId::from_face_pos_level(face, 0, 0));
        }
        return;
    }
    if !region.may_intersect_cell(&Cell::from(id)) {
        assert!(!covering.intersects(id));
    } else if !covering.contains(id) {
        // The region may intersect this cell without the covering doing
        // so, when subdivision reveals that the intersection is empty. The
        // cell cannot be contained in the region though.
        assert!(!region.contains_cell(&Cell::from(id)));
        assert!(!id.is_leaf());
        let end = id.child_end();
        let mut child = id.child_begin();
        while child != end {
            check_covering_tight(region, covering, child);
            child = child.next();
        }
    }
}

fn check_covering<R: Region>(
    region: &R,
    options: &CovererOptions,
    covering: &[CellId],
    interior: bool,
) {
    // Cells grouped by their ancestor at min_level.
    let mut min_level_cells: FxHashMap<CellId, usize> = FxHashMap::default();
    for &id in covering {
        let level = id.level();
        assert!(level >= options.min_level);
        assert!(level <= options.max_level);
        assert_eq!((level - options.min_level) % options.level_mod, 0);
        *min_level_cells.entry(id.parent_at(options.min_level)).or_insert(0) += 1;
    }
    if covering.len() > options.max_cells {
        // A covering over budget can only be caused by min_level, so each
        // ancestor at that level must appear exactly once.
        for &count in min_level_cells.values() {
            assert_eq!(count, 1);
        }
    }
    if interior {
        for &id in covering {
            assert!(region.contains_cell(&Cell::from(id)));
        }
    } else {
        let union = CellUnion::from_cell_ids(covering.to_vec());
        check_covering_tight(region, &union, CellId::NONE);
    }
}

// ==== coverings of single cells ====

#[test]
fn single_cell_regions_cover_as_themselves() {
    let mut rng = ChaCha8Rng::seed_from_u64(20);
    let options = CovererOptions::default().with_max_cells(1);
    for _ in 0..400 {
        let id = random_cell_id(&mut rng);
        let covering = covering(&Cell::from(id), &options);
        assert_eq!(covering.len(), 1);
        assert_eq!(covering[0], id);
    }
}

// ==== random caps ====

#[test]
fn random_cap_coverings() {
    let mut rng = ChaCha8Rng::seed_from_u64(21);
    for _ in 0..250 {
        let mut options = CovererOptions::default()
            .with_max_cells(skewed(&mut rng, 10))
            .with_level_mod(rng.gen_range(1..=3));
        loop {
            options = options
                .with_min_level(rng.gen_range(0..=MAX_LEVEL))
                .with_max_level(rng.gen_range(0..=MAX_LEVEL));
            if options.min_level <= options.max_level {
                break;
            }
        }
        let max_area = (4.0 * PI).min(
            (3 * options.max_cells + 1) as f64 * Cell::average_area(options.min_level),
        );
        let cap = random_cap(&mut rng, 0.1 * Cell::average_area(MAX_LEVEL), max_area);

        let ids = covering(&cap, &options);
        check_covering(&cap, &options, &ids, false);

        let inner = interior_covering(&cap, &options);
        check_covering(&cap, &options, &inner, true);

        // Coverings are deterministic.
        assert_eq!(covering(&cap, &options), ids);
    }
}

#[test]
fn full_cap_covers_with_the_six_faces() {
    let covering = covering(&Cap::full(), &CovererOptions::default());
    assert_eq!(covering.len(), 6);
    assert!(covering.iter().all(|id| id.is_face()));
}

#[test]
fn empty_cap_covers_with_no_cells() {
    let covering = covering(&Cap::empty(), &CovererOptions::default());
    assert!(covering.is_empty());
}

// ==== simple coverings ====

#[test]
fn simple_coverings_of_random_caps() {
    let mut rng = ChaCha8Rng::seed_from_u64(22);
    let huge = CovererOptions::default().with_max_cells(usize::MAX);
    for _ in 0..200 {
        let level = rng.gen_range(0..=MAX_LEVEL);
        let options = huge.with_min_level(level).with_max_level(level);
        let max_area = (4.0 * PI).min(1000.0 * Cell::average_area(level));
        let cap = random_cap(&mut rng, 0.1 * Cell::average_area(MAX_LEVEL), max_area);
        let covering = simple_covering(&cap, cap.axis(), level);
        check_covering(&cap, &options, &covering, false);
    }
}

// ==== rectangles ====

#[test]
fn rectangle_covering() {
    let rect = LatLngRect::from_point_pair(
        LatLng::from_degrees(10.0, 10.0),
        LatLng::from_degrees(15.0, 20.0),
    );
    let options = CovererOptions::default().with_max_cells(20);
    let ids = covering(&rect, &options);
    assert!(!ids.is_empty());
    check_covering(&rect, &options, &ids, false);
}

// ==== options ====

#[test]
fn options_clamp_to_valid_ranges() {
    let options = CovererOptions::default()
        .with_min_level(40)
        .with_max_level(40)
        .with_level_mod(7)
        .with_max_cells(4);
    assert_eq!(options.min_level, MAX_LEVEL);
    assert_eq!(options.max_level, MAX_LEVEL);
    assert_eq!(options.level_mod, 3);
    assert_eq!(options.max_cells, 4);

    let options = CovererOptions::default().with_level_mod(0);
    assert_eq!(options.level_mod, 1);
}
