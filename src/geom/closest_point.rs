//! Nearest point on a mesh surface to an arbitrary world position.

use super::mesh::SurfaceMesh;
use super::surface_point::{MeshPoint, SurfacePointError};
use super::{Point3, Tolerance};

/// Closest point on triangle `(a, b, c)` to `p`, with its barycentric weights.
///
/// Walks the Voronoi regions of the triangle (vertices, then edges, then the
/// interior) as in Ericson, *Real-Time Collision Detection* §5.1.5.
#[must_use]
pub fn closest_point_on_triangle(p: Point3, a: Point3, b: Point3, c: Point3) -> (Point3, [f64; 3]) {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return (a, [1.0, 0.0, 0.0]);
    }

    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return (b, [0.0, 1.0, 0.0]);
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return (a + ab * v, [1.0 - v, v, 0.0]);
    }

    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return (c, [0.0, 0.0, 1.0]);
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return (a + ac * w, [1.0 - w, 0.0, w]);
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return (b + (c - b) * w, [0.0, 1.0 - w, w]);
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    (a + ab * v + ac * w, [1.0 - v - w, v, w])
}

/// Result of [`closest_surface_point`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub point: MeshPoint,
    pub position: Point3,
    pub distance_squared: f64,
}

/// Finds the surface point of `mesh` nearest to `query` with a linear scan
/// over all faces.
///
/// Weights within `tol` of a simplex boundary snap the result to the vertex
/// or edge they lie on.
pub fn closest_surface_point(mesh: &SurfaceMesh, query: Point3, tol: Tolerance) -> Result<SurfaceHit, SurfacePointError> {
    let mut best: Option<(usize, [usize; 3], Point3, [f64; 3], f64)> = None;
    for face in 0..mesh.face_count() {
        let vertices = mesh.face_vertices(face)?;
        let [a, b, c] = mesh.face_positions(vertices);
        let (position, weights) = closest_point_on_triangle(query, a, b, c);
        let d2 = position.distance_squared_to(query);
        if best.as_ref().map_or(true, |best| d2 < best.4) {
            best = Some((face, vertices, position, weights, d2));
        }
    }

    let Some((face, vertices, position, weights, distance_squared)) = best else {
        return Err(SurfacePointError::InvalidHandle { kind: "face", index: 0 });
    };

    Ok(SurfaceHit {
        point: classify_weights(mesh, face, vertices, weights, tol),
        position,
        distance_squared,
    })
}

/// Snaps face weights to the vertex or edge they (nearly) lie on.
#[must_use]
pub fn classify_weights(mesh: &SurfaceMesh, face: usize, vertices: [usize; 3], weights: [f64; 3], tol: Tolerance) -> MeshPoint {
    if let Some(k) = weights.iter().position(|&w| w > 1.0 - tol.eps) {
        return MeshPoint::Vertex { vertex: vertices[k] };
    }

    let zero: Vec<usize> = (0..3).filter(|&k| tol.approx_zero_f64(weights[k])).collect();
    if let [opposite] = zero[..] {
        let i = (opposite + 1) % 3;
        let j = (opposite + 2) % 3;
        if let Some(edge) = mesh.find_edge(vertices[i], vertices[j]) {
            let (first, _) = mesh.edge_vertices(edge);
            let sum = weights[i] + weights[j];
            let toward_j = if sum > 0.0 { weights[j] / sum } else { 0.5 };
            let t = if first == vertices[i] { toward_j } else { 1.0 - toward_j };
            return MeshPoint::Edge { edge, t };
        }
    }

    MeshPoint::Face { face, weights }
}
