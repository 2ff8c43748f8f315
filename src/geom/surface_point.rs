//! Locations on the walking surface and their conversion to world space.

use serde::Serialize;

use super::mesh::{MeshError, SurfaceMesh};
use super::Point3;

/// A location on the mesh surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MeshPoint {
    Vertex { vertex: usize },
    /// `t` runs from the edge's first vertex (0) to its second vertex (1).
    Edge { edge: usize, t: f64 },
    /// Weights follow the order of the face's half-edge loop.
    Face { face: usize, weights: [f64; 3] },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SurfacePointError {
    #[error("unsupported topology: {0}")]
    UnsupportedTopology(MeshError),
    #[error("unknown surface point kind {kind}")]
    UnknownPointKind { kind: u32 },
    #[error("{kind} handle {index} is out of range")]
    InvalidHandle { kind: &'static str, index: usize },
}

impl From<MeshError> for SurfacePointError {
    fn from(err: MeshError) -> Self {
        Self::UnsupportedTopology(err)
    }
}

impl MeshPoint {
    pub const KIND_VERTEX: u32 = 0;
    pub const KIND_EDGE: u32 = 1;
    pub const KIND_FACE: u32 = 2;

    /// Checks that the handle exists in `mesh`.
    pub fn validate(&self, mesh: &SurfaceMesh) -> Result<(), SurfacePointError> {
        let (kind, index, count) = match *self {
            Self::Vertex { vertex } => ("vertex", vertex, mesh.vertex_count()),
            Self::Edge { edge, .. } => ("edge", edge, mesh.edge_count()),
            Self::Face { face, .. } => ("face", face, mesh.face_count()),
        };
        if index < count {
            Ok(())
        } else {
            Err(SurfacePointError::InvalidHandle { kind, index })
        }
    }

    /// World-space position of this point on `mesh`.
    pub fn resolve(&self, mesh: &SurfaceMesh) -> Result<Point3, SurfacePointError> {
        self.validate(mesh)?;
        match *self {
            Self::Vertex { vertex } => Ok(mesh.position(vertex)),
            Self::Edge { edge, t } => {
                let (first, second) = mesh.edge_vertices(edge);
                Ok(mesh.position(first).lerp(mesh.position(second), t))
            }
            Self::Face { face, weights } => {
                let vertices = mesh.face_vertices(face)?;
                Ok(Point3::barycentric(mesh.face_positions(vertices), weights))
            }
        }
    }

    #[must_use]
    pub fn to_raw(&self) -> RawMeshPoint {
        match *self {
            Self::Vertex { vertex } => RawMeshPoint {
                kind: Self::KIND_VERTEX,
                index: vertex as u32,
                weights: [0.0; 3],
            },
            Self::Edge { edge, t } => RawMeshPoint {
                kind: Self::KIND_EDGE,
                index: edge as u32,
                weights: [t, 0.0, 0.0],
            },
            Self::Face { face, weights } => RawMeshPoint {
                kind: Self::KIND_FACE,
                index: face as u32,
                weights,
            },
        }
    }
}

/// Flat form of [`MeshPoint`] for hosts that exchange numeric buffers.
///
/// Packs as `[kind, index, w0, w1, w2]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RawMeshPoint {
    pub kind: u32,
    pub index: u32,
    pub weights: [f64; 3],
}

impl RawMeshPoint {
    #[must_use]
    pub fn to_packed(self) -> [f64; 5] {
        let [a, b, c] = self.weights;
        [f64::from(self.kind), f64::from(self.index), a, b, c]
    }

    /// Reads a packed point; `None` when `packed` is not five finite,
    /// integral-prefixed numbers.
    #[must_use]
    pub fn from_packed(packed: &[f64]) -> Option<Self> {
        let &[kind, index, a, b, c] = packed else {
            return None;
        };
        let integral = |v: f64| v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= f64::from(u32::MAX);
        if !integral(kind) || !integral(index) {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (kind, index) = (kind as u32, index as u32);
        Some(Self {
            kind,
            index,
            weights: [a, b, c],
        })
    }
}

impl TryFrom<RawMeshPoint> for MeshPoint {
    type Error = SurfacePointError;

    fn try_from(raw: RawMeshPoint) -> Result<Self, Self::Error> {
        let index = raw.index as usize;
        match raw.kind {
            Self::KIND_VERTEX => Ok(Self::Vertex { vertex: index }),
            Self::KIND_EDGE => Ok(Self::Edge {
                edge: index,
                t: raw.weights[0],
            }),
            Self::KIND_FACE => Ok(Self::Face {
                face: index,
                weights: raw.weights,
            }),
            kind => Err(SurfacePointError::UnknownPointKind { kind }),
        }
    }
}
