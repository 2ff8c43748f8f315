//! Half-edge triangle mesh used as the walking surface.
//!
//! Half-edge `3f + k` runs from corner `k` to corner `k + 1` of face `f`, so
//! face loops are implicit in the numbering but still reachable through
//! `next` for code that must not assume triangles.

use std::collections::HashMap;
use std::f64::consts::{PI, TAU};

use super::{Point3, Vec2, Vec3};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    #[error("mesh buffers must hold whole triangles and xyz triples (indices: {indices}, positions: {positions})")]
    InvalidMeshArity { indices: usize, positions: usize },
    #[error("mesh has no faces")]
    EmptyMesh,
    #[error("face {face} references vertex {vertex}, but only {vertex_count} vertices exist")]
    VertexIndexOutOfBounds { face: usize, vertex: u32, vertex_count: usize },
    #[error("face {face} repeats a vertex")]
    DegenerateFaceIndices { face: usize },
    #[error("vertex {vertex} has a non-finite position")]
    NonFinitePosition { vertex: usize },
    #[error("edge {from} -> {to} is used by more than one face with the same orientation")]
    NonManifoldEdge { from: u32, to: u32 },
    #[error("face {face} has zero area and no tangent frame")]
    DegenerateFace { face: usize },
    #[error("face {face} has {count} vertices; only triangles are supported")]
    UnsupportedTopology { face: usize, count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfEdge {
    pub tail: usize,
    pub next: usize,
    pub twin: Option<usize>,
    pub face: usize,
    pub edge: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// First half-edge created for this edge; fixes the canonical endpoint order.
    pub half_edge: usize,
}

/// Local 2D picture of a face in its own tangent frame.
///
/// `corners[k]` is the planar position of the face's `k`-th vertex, with
/// corner 0 at the origin and corner 1 on the +X axis.
#[derive(Debug, Clone, Copy)]
pub struct FaceFrame {
    pub face: usize,
    pub vertices: [usize; 3],
    pub half_edges: [usize; 3],
    pub corners: [Vec2; 3],
    pub origin: Point3,
    pub x_axis: Vec3,
    pub y_axis: Vec3,
    pub normal: Vec3,
}

impl FaceFrame {
    /// Corner index of `half_edge` within this face.
    #[must_use]
    pub fn corner_of(&self, half_edge: usize) -> Option<usize> {
        self.half_edges.iter().position(|&h| h == half_edge)
    }

    #[must_use]
    pub fn point_at(&self, weights: [f64; 3]) -> Vec2 {
        let [a, b, c] = self.corners;
        weights[0] * a + weights[1] * b + weights[2] * c
    }

    /// Barycentric weights of a planar point, in corner order.
    #[must_use]
    pub fn weights_of(&self, p: Vec2) -> [f64; 3] {
        let [a, b, c] = self.corners;
        let area = (b - a).cross(c - a);
        let w1 = (p - a).cross(c - a) / area;
        let w2 = (b - a).cross(p - a) / area;
        let w0 = 1.0 - w1 - w2;
        [w0, w1, w2]
    }

    /// Planar expression of a world vector lying (roughly) in the face plane.
    #[must_use]
    pub fn to_local(&self, v: Vec3) -> Vec2 {
        Vec2::new(v.dot(self.x_axis), v.dot(self.y_axis))
    }

    #[must_use]
    pub fn edge_vector(&self, corner: usize) -> Vec2 {
        self.corners[(corner + 1) % 3] - self.corners[corner]
    }

    #[must_use]
    pub fn corner_angle(&self, corner: usize) -> f64 {
        let out = self.edge_vector(corner);
        let back = self.corners[(corner + 2) % 3] - self.corners[corner];
        out.cross(back).atan2(out.dot(back))
    }
}

/// One wedge of the fan around a vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexCorner {
    /// Outgoing half-edge that opens the wedge.
    pub half_edge: usize,
    pub face: usize,
    pub angle: f64,
}

/// Fan around a vertex in counter-clockwise order, starting at the
/// reference half-edge that defines angle 0 of the vertex tangent space.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexFan {
    pub corners: Vec<VertexCorner>,
    pub is_boundary: bool,
    pub angle_sum: f64,
}

impl VertexFan {
    /// Factor from true corner angles to tangent-space angles.
    #[must_use]
    pub fn angle_scale(&self) -> f64 {
        let target = if self.is_boundary { PI } else { TAU };
        if self.angle_sum > 0.0 { target / self.angle_sum } else { 1.0 }
    }
}

#[derive(Debug, Clone)]
pub struct SurfaceMesh {
    positions: Vec<Point3>,
    half_edges: Vec<HalfEdge>,
    edges: Vec<Edge>,
    face_half_edge: Vec<usize>,
    vertex_half_edge: Vec<Option<usize>>,
}

impl SurfaceMesh {
    /// Builds the connectivity from packed triangle indices and xyz positions.
    pub fn from_buffers(indices: &[u32], positions: &[f32]) -> Result<Self, MeshError> {
        if indices.len() % 3 != 0 || positions.len() % 3 != 0 {
            return Err(MeshError::InvalidMeshArity {
                indices: indices.len(),
                positions: positions.len(),
            });
        }
        if indices.is_empty() {
            return Err(MeshError::EmptyMesh);
        }

        let positions: Vec<Point3> = positions
            .chunks_exact(3)
            .map(|p| Point3::new(f64::from(p[0]), f64::from(p[1]), f64::from(p[2])))
            .collect();
        if let Some(vertex) = positions.iter().position(|p| !p.is_finite()) {
            return Err(MeshError::NonFinitePosition { vertex });
        }

        let vertex_count = positions.len();
        let face_count = indices.len() / 3;
        let mut half_edges = Vec::with_capacity(indices.len());
        let mut edges: Vec<Edge> = Vec::with_capacity(indices.len() / 2 + 1);
        let mut face_half_edge = Vec::with_capacity(face_count);
        let mut vertex_half_edge = vec![None; vertex_count];
        let mut directed: HashMap<(u32, u32), usize> = HashMap::with_capacity(indices.len());
        let mut undirected: HashMap<(u32, u32), usize> = HashMap::with_capacity(indices.len());

        for (face, tri) in indices.chunks_exact(3).enumerate() {
            if let Some(&vertex) = tri.iter().find(|&&v| v as usize >= vertex_count) {
                return Err(MeshError::VertexIndexOutOfBounds { face, vertex, vertex_count });
            }
            if tri[0] == tri[1] || tri[1] == tri[2] || tri[2] == tri[0] {
                return Err(MeshError::DegenerateFaceIndices { face });
            }

            let base = face * 3;
            face_half_edge.push(base);
            for k in 0..3 {
                let from = tri[k];
                let to = tri[(k + 1) % 3];
                let he = base + k;

                if directed.insert((from, to), he).is_some() {
                    return Err(MeshError::NonManifoldEdge { from, to });
                }

                let key = (from.min(to), from.max(to));
                let edge = *undirected.entry(key).or_insert_with(|| {
                    edges.push(Edge { half_edge: he });
                    edges.len() - 1
                });

                half_edges.push(HalfEdge {
                    tail: from as usize,
                    next: base + (k + 1) % 3,
                    twin: None,
                    face,
                    edge,
                });
                vertex_half_edge[from as usize].get_or_insert(he);
            }
        }

        for (&(from, to), &he) in &directed {
            half_edges[he].twin = directed.get(&(to, from)).copied();
        }

        let mut mesh = Self {
            positions,
            half_edges,
            edges,
            face_half_edge,
            vertex_half_edge,
        };
        mesh.pick_boundary_references();
        Ok(mesh)
    }

    /// Boundary vertices take the outgoing half-edge without a twin as their
    /// reference, so that their fan can be walked counter-clockwise in one pass.
    fn pick_boundary_references(&mut self) {
        for he in 0..self.half_edges.len() {
            if self.half_edges[he].twin.is_some() {
                continue;
            }
            let tail = self.half_edges[he].tail;
            let current = self.vertex_half_edge[tail];
            if current.map_or(true, |c| self.half_edges[c].twin.is_some() || he < c) {
                self.vertex_half_edge[tail] = Some(he);
            }
        }
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn face_count(&self) -> usize {
        self.face_half_edge.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn position(&self, vertex: usize) -> Point3 {
        self.positions[vertex]
    }

    #[must_use]
    pub fn half_edge(&self, he: usize) -> &HalfEdge {
        &self.half_edges[he]
    }

    #[must_use]
    pub fn head(&self, he: usize) -> usize {
        self.half_edges[self.half_edges[he].next].tail
    }

    #[must_use]
    pub fn edge(&self, edge: usize) -> &Edge {
        &self.edges[edge]
    }

    /// Endpoints of `edge` in canonical order.
    #[must_use]
    pub fn edge_vertices(&self, edge: usize) -> (usize, usize) {
        let he = self.edges[edge].half_edge;
        (self.half_edges[he].tail, self.head(he))
    }

    /// Finds the edge joining `a` and `b` by scanning the half-edges leaving `a`'s fan.
    #[must_use]
    pub fn find_edge(&self, a: usize, b: usize) -> Option<usize> {
        let start = self.vertex_half_edge.get(a).copied().flatten()?;
        let mut he = start;
        for _ in 0..self.half_edges.len() {
            if self.head(he) == b {
                return Some(self.half_edges[he].edge);
            }
            // The incoming half-edge of this wedge also touches `a`.
            let prev = self.prev(he);
            if self.half_edges[prev].tail == b {
                return Some(self.half_edges[prev].edge);
            }
            match self.half_edges[prev].twin {
                Some(twin) if twin != start => he = twin,
                _ => break,
            }
        }

        // Fans split by a non-manifold vertex are not reachable from the reference.
        self.half_edges.iter().find_map(|h| {
            let head = self.head_of(h);
            ((h.tail == a && head == b) || (h.tail == b && head == a)).then_some(h.edge)
        })
    }

    fn head_of(&self, h: &HalfEdge) -> usize {
        self.half_edges[h.next].tail
    }

    #[must_use]
    pub fn prev(&self, he: usize) -> usize {
        let mut cur = he;
        loop {
            let next = self.half_edges[cur].next;
            if next == he {
                return cur;
            }
            cur = next;
        }
    }

    /// Vertices of `face` in the order of its half-edge loop.
    pub fn face_vertices(&self, face: usize) -> Result<[usize; 3], MeshError> {
        let half_edges = self.face_half_edges(face)?;
        Ok(half_edges.map(|he| self.half_edges[he].tail))
    }

    pub fn face_half_edges(&self, face: usize) -> Result<[usize; 3], MeshError> {
        let start = self.face_half_edge[face];
        let mut out = [start; 3];
        let mut he = start;
        let mut count = 0;
        loop {
            if count < 3 {
                out[count] = he;
            }
            count += 1;
            he = self.half_edges[he].next;
            if he == start || count > 3 {
                break;
            }
        }
        if count != 3 {
            return Err(MeshError::UnsupportedTopology { face, count });
        }
        Ok(out)
    }

    #[must_use]
    pub fn face_positions(&self, vertices: [usize; 3]) -> [Point3; 3] {
        vertices.map(|v| self.positions[v])
    }

    pub fn face_frame(&self, face: usize) -> Result<FaceFrame, MeshError> {
        let half_edges = self.face_half_edges(face)?;
        let vertices = half_edges.map(|he| self.half_edges[he].tail);
        let [p0, p1, p2] = self.face_positions(vertices);

        let e1 = p1 - p0;
        let e2 = p2 - p0;
        let degenerate = MeshError::DegenerateFace { face };
        let normal = e1.cross(e2).normalized().ok_or(degenerate.clone())?;
        let x_axis = e1.normalized().ok_or(degenerate)?;
        let y_axis = normal.cross(x_axis);

        Ok(FaceFrame {
            face,
            vertices,
            half_edges,
            corners: [
                Vec2::ZERO,
                Vec2::new(e1.dot(x_axis), 0.0),
                Vec2::new(e2.dot(x_axis), e2.dot(y_axis)),
            ],
            origin: p0,
            x_axis,
            y_axis,
            normal,
        })
    }

    /// Counter-clockwise fan around `vertex`. `None` for unreferenced vertices.
    pub fn vertex_fan(&self, vertex: usize) -> Result<Option<VertexFan>, MeshError> {
        let Some(start) = self.vertex_half_edge.get(vertex).copied().flatten() else {
            return Ok(None);
        };
        let is_boundary = self.half_edges[start].twin.is_none();

        let mut corners = Vec::new();
        let mut he = start;
        loop {
            let face = self.half_edges[he].face;
            let frame = self.face_frame(face)?;
            let corner = frame.corner_of(he).unwrap_or(0);
            corners.push(VertexCorner {
                half_edge: he,
                face,
                angle: frame.corner_angle(corner),
            });

            match self.half_edges[self.prev(he)].twin {
                Some(next) if next != start && corners.len() < self.half_edges.len() => he = next,
                _ => break,
            }
        }

        let angle_sum = corners.iter().map(|c| c.angle).sum();
        Ok(Some(VertexFan {
            corners,
            is_boundary,
            angle_sum,
        }))
    }

    /// Face whose frame serves as the tangent space of points on `edge`.
    #[must_use]
    pub fn edge_face(&self, edge: usize) -> usize {
        self.half_edges[self.edges[edge].half_edge].face
    }
}
