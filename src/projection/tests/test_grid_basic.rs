use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::projection::{GridError, PointGrid};

fn brute_force(points: &[(f64, f64)], x: f64, y: f64) -> u32 {
    let mut best = (f64::INFINITY, 0u32);
    for (i, &(px, py)) in points.iter().enumerate() {
        let d2 = (px - x).powi(2) + (py - y).powi(2);
        let index = u32::try_from(i).expect("small test set");
        if d2 < best.0 {
            best = (d2, index);
        }
    }
    best.1
}

#[test]
fn empty_grid_finds_nothing() {
    let grid = PointGrid::new(1.0);
    assert!(grid.is_empty());
    assert_eq!(grid.nearest(0.0, 0.0), Err(GridError::NoPointFound));
}

#[test]
fn nearest_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(1234);
    for bucket_size in [0.05, 0.7, 5.0, 100.0] {
        let mut grid = PointGrid::new(bucket_size);
        let mut points = Vec::new();
        for i in 0..300u32 {
            let x: f64 = rng.random_range(-10.0..10.0);
            let y: f64 = rng.random_range(-10.0..10.0);
            grid.insert(x, y, i);
            points.push((x, y));
        }
        assert_eq!(grid.len(), 300);
        for _ in 0..200 {
            // Queries reach outside the occupied area too.
            let x: f64 = rng.random_range(-30.0..30.0);
            let y: f64 = rng.random_range(-30.0..30.0);
            assert_eq!(grid.nearest(x, y), Ok(brute_force(&points, x, y)), "bucket {bucket_size} at ({x}, {y})");
        }
    }
}

#[test]
fn sparse_far_points_are_still_found() {
    let mut grid = PointGrid::new(0.5);
    grid.insert(0.0, 0.0, 0);
    grid.insert(40.0, -25.0, 1);
    assert_eq!(grid.nearest(38.0, -20.0), Ok(1));
    assert_eq!(grid.nearest(-100.0, 100.0), Ok(0));
}

#[test]
fn ties_resolve_to_smallest_index() {
    let mut grid = PointGrid::new(1.0);
    grid.insert(1.0, 0.0, 7);
    grid.insert(-1.0, 0.0, 3);
    grid.insert(0.0, 1.0, 5);
    assert_eq!(grid.nearest(0.0, 0.0), Ok(3));
}

#[test]
fn bucket_size_follows_point_density() {
    let coords: Vec<f64> = (0..100).flat_map(|i| [f64::from(i % 10), f64::from(i / 10)]).collect();
    let size = PointGrid::bucket_size_for(&coords);
    assert!((size - 0.9).abs() < 1e-12);

    assert!((PointGrid::bucket_size_for(&[]) - PointGrid::DEFAULT_BUCKET_SIZE).abs() < f64::EPSILON);
    assert!((PointGrid::bucket_size_for(&[2.0, 2.0]) - PointGrid::DEFAULT_BUCKET_SIZE).abs() < f64::EPSILON);
    assert!((PointGrid::new(-1.0).bucket_size() - PointGrid::DEFAULT_BUCKET_SIZE).abs() < f64::EPSILON);
}

#[test]
fn huge_coordinates_do_not_overflow_bucket_keys() {
    let mut grid = PointGrid::new(5.0);
    grid.insert(1e20, 1e20, 0);
    assert_eq!(grid.nearest(1e20, 1e20), Ok(0));
    assert_eq!(grid.nearest(-1e300, 1e300), Ok(0));

    grid.insert(0.0, 0.0, 1);
    grid.insert(-3e19, 2.0, 2);
    assert_eq!(grid.nearest(1.0, 1.0), Ok(1));
    assert_eq!(grid.nearest(9e19, 1.1e20), Ok(0));
    assert_eq!(grid.nearest(-1e21, 0.0), Ok(2));
}
