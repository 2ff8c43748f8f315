//! Triangulation of bare planar point sets.

/// Delaunay-triangulates packed xy coordinates and returns flat triangle
/// indices suitable as the planar graph of a projection.
///
/// Fewer than three points, or collinear input, yields no triangles; the
/// walk then reaches every point through island reseeding.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn triangulate_points(coords: &[f64]) -> Vec<u32> {
    let points: Vec<delaunator::Point> = coords
        .chunks_exact(2)
        .map(|p| delaunator::Point { x: p[0], y: p[1] })
        .collect();
    if points.len() < 3 {
        return Vec::new();
    }

    let triangulation = delaunator::triangulate(&points);
    triangulation.triangles.iter().map(|&i| i as u32).collect()
}
