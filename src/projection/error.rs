use crate::geom::{MeshError, SurfacePointError, TraceError};

/// Everything that can abort a projection run.
///
/// Every variant is a deterministic function of the inputs; no partial
/// output is produced once one is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProjectionError {
    #[error("invalid mesh: {0}")]
    Mesh(#[from] MeshError),
    #[error(transparent)]
    SurfacePoint(#[from] SurfacePointError),
    #[error("trace failed: {0}")]
    Trace(#[from] TraceError),
    #[error("2D coordinates must be x/y pairs, got {len} values")]
    InvalidCoordinateArity { len: usize },
    #[error("2D coordinates must be finite (point {index})")]
    NonFiniteCoordinate { index: usize },
    #[error("triangulation length {len} is not a multiple of 3")]
    InvalidTriangulationArity { len: usize },
    #[error("triangulation refers to point {index} but only {point_count} points exist")]
    TriangulationIndexOutOfBounds { index: u32, point_count: usize },
    #[error("start point must be empty or three finite coordinates, got {len} values")]
    InvalidStartPoint { len: usize },
    #[error("up direction must be empty or three finite coordinates that are not all zero, got {len} values")]
    InvalidUpDirection { len: usize },
    #[error("no placed point found to reach point {index} from")]
    NoClosestVertex { index: u32 },
}
