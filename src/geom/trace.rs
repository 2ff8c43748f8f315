//! Straightest geodesic tracing.
//!
//! A walk starts at a surface point with a displacement expressed in that
//! point's tangent space, runs straight inside the current face, and when it
//! reaches an edge continues into the neighbouring face as if both faces were
//! unfolded flat around the shared edge.

use serde::Serialize;

use super::mesh::{MeshError, SurfaceMesh};
use super::surface_point::{MeshPoint, SurfacePointError};
use super::tangent::{Departure, FacePlacement, depart, unfold_direction};
use super::{Tolerance, Vec2};

/// Options for controlling a single trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TraceOptions {
    /// Record every edge crossing in [`TraceResult::path`].
    pub include_path: bool,
    /// Fail on numerical dead ends and crossing overflow instead of stopping early.
    pub error_on_problem: bool,
    /// Fail when the walk runs into the mesh boundary instead of stopping on it.
    pub error_on_boundary: bool,
    /// Upper bound on the number of edges a single trace may cross.
    pub max_face_crossings: usize,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            include_path: false,
            error_on_problem: true,
            error_on_boundary: false,
            max_face_crossings: 1 << 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TraceError {
    #[error("trace displacement must be finite")]
    NonFiniteDisplacement,
    #[error("trace hit the mesh boundary at edge {edge}")]
    HitBoundary { edge: usize },
    #[error("trace starts on the boundary heading off the surface")]
    BlockedAtStart,
    #[error("trace exceeded {limit} face crossings")]
    IterationLimit { limit: usize },
    #[error("trace found no exit edge in face {face}")]
    NoExitEdge { face: usize },
    #[error(transparent)]
    SurfacePoint(#[from] SurfacePointError),
}

impl From<MeshError> for TraceError {
    fn from(err: MeshError) -> Self {
        Self::SurfacePoint(err.into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraceResult {
    /// Always a face point; a walk stopped by the boundary ends on the border of its last face.
    pub end_point: MeshPoint,
    /// Unit heading at the end, in the tangent space of `end_point`.
    pub ending_dir: Vec2,
    /// Start, every edge crossed, and end. Empty unless requested.
    pub path: Vec<MeshPoint>,
    pub hit_boundary: bool,
    pub face_crossings: usize,
}

/// Walks a surface from a point along a tangent-space displacement.
pub trait SurfaceTracer {
    fn trace(
        &self,
        mesh: &SurfaceMesh,
        start: &MeshPoint,
        displacement: Vec2,
        options: &TraceOptions,
    ) -> Result<TraceResult, TraceError>;
}

/// Face-by-face straightest geodesic tracer.
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightestTracer;

struct Exit {
    corner: usize,
    t: f64,
    s: f64,
}

impl StraightestTracer {
    fn find_exit(placement: &FacePlacement) -> Option<Exit> {
        let frame = &placement.frame;
        let d = placement.direction;
        let p = placement.position;

        let mut best: Option<Exit> = None;
        for corner in 0..3 {
            if placement.skip_edges[corner] {
                continue;
            }
            let q = frame.corners[corner];
            let e = frame.edge_vector(corner);
            let edge_len_sq = e.dot(e);
            let denom = d.cross(e);
            // Only edges the heading crosses from inside to outside. A heading
            // along the edge line never crosses it, even from a point on it.
            if denom <= Tolerance::PARALLEL.eps * edge_len_sq.sqrt() {
                continue;
            }
            let t = (q - p).cross(e) / denom;
            if !t.is_finite() {
                continue;
            }
            let t = t.max(0.0);
            if best.as_ref().is_none_or(|b| t < b.t) {
                let hit = p + t * d;
                let s = ((hit - q).dot(e) / edge_len_sq).clamp(0.0, 1.0);
                best = Some(Exit { corner, t, s });
            }
        }
        best
    }

    fn face_point(placement: &FacePlacement, position: Vec2) -> MeshPoint {
        MeshPoint::Face {
            face: placement.frame.face,
            weights: clamp_weights(placement.frame.weights_of(position)),
        }
    }

    fn finish(placement: &FacePlacement, position: Vec2, path: &mut Vec<MeshPoint>, include_path: bool) -> (MeshPoint, Vec2) {
        let end_point = Self::face_point(placement, position);
        if include_path {
            path.push(end_point);
        }
        (end_point, placement.direction)
    }
}

impl SurfaceTracer for StraightestTracer {
    fn trace(
        &self,
        mesh: &SurfaceMesh,
        start: &MeshPoint,
        displacement: Vec2,
        options: &TraceOptions,
    ) -> Result<TraceResult, TraceError> {
        if !displacement.is_finite() {
            return Err(TraceError::NonFiniteDisplacement);
        }
        start.validate(mesh)?;

        let mut path = Vec::new();
        if options.include_path {
            path.push(*start);
        }

        let length = displacement.length();
        if Tolerance::ZERO_LENGTH.is_zero_length(length) {
            if options.include_path {
                path.push(*start);
            }
            return Ok(TraceResult {
                end_point: *start,
                ending_dir: displacement.normalized().unwrap_or(Vec2::X),
                path,
                hit_boundary: false,
                face_crossings: 0,
            });
        }

        let mut placement = match depart(mesh, start, displacement)? {
            Departure::Inside(placement) => placement,
            Departure::Blocked => {
                if options.error_on_boundary {
                    return Err(TraceError::BlockedAtStart);
                }
                log::warn!("trace blocked by boundary at its start point");
                if options.include_path {
                    path.push(*start);
                }
                return Ok(TraceResult {
                    end_point: *start,
                    ending_dir: displacement.normalized().unwrap_or(Vec2::X),
                    path,
                    hit_boundary: true,
                    face_crossings: 0,
                });
            }
        };

        let mut remaining = length;
        let mut crossings = 0;
        loop {
            let Some(exit) = Self::find_exit(&placement) else {
                if options.error_on_problem {
                    return Err(TraceError::NoExitEdge {
                        face: placement.frame.face,
                    });
                }
                let position = placement.position;
                let (end_point, ending_dir) = Self::finish(&placement, position, &mut path, options.include_path);
                return Ok(TraceResult {
                    end_point,
                    ending_dir,
                    path,
                    hit_boundary: false,
                    face_crossings: crossings,
                });
            };

            if exit.t >= remaining {
                let position = placement.position + remaining * placement.direction;
                let (end_point, ending_dir) = Self::finish(&placement, position, &mut path, options.include_path);
                return Ok(TraceResult {
                    end_point,
                    ending_dir,
                    path,
                    hit_boundary: false,
                    face_crossings: crossings,
                });
            }

            let frame = placement.frame;
            let he = frame.half_edges[exit.corner];
            let edge = mesh.half_edge(he).edge;
            let hit = frame.corners[exit.corner] + exit.s * frame.edge_vector(exit.corner);
            remaining -= exit.t;

            if options.include_path {
                let t = if mesh.edge(edge).half_edge == he { exit.s } else { 1.0 - exit.s };
                path.push(MeshPoint::Edge { edge, t });
            }

            let Some(twin) = mesh.half_edge(he).twin else {
                if options.error_on_boundary {
                    return Err(TraceError::HitBoundary { edge });
                }
                log::warn!("trace stopped at boundary edge {edge} with {remaining} left to walk");
                let (end_point, ending_dir) = Self::finish(&placement, hit, &mut path, options.include_path);
                return Ok(TraceResult {
                    end_point,
                    ending_dir,
                    path,
                    hit_boundary: true,
                    face_crossings: crossings,
                });
            };

            crossings += 1;
            if crossings > options.max_face_crossings {
                if options.error_on_problem {
                    return Err(TraceError::IterationLimit {
                        limit: options.max_face_crossings,
                    });
                }
                let (end_point, ending_dir) = Self::finish(&placement, hit, &mut path, options.include_path);
                return Ok(TraceResult {
                    end_point,
                    ending_dir,
                    path,
                    hit_boundary: false,
                    face_crossings: crossings,
                });
            }

            let next = mesh.face_frame(mesh.half_edge(twin).face)?;
            let next_corner = next.corner_of(twin).unwrap_or(0);
            let direction = unfold_direction(&frame, exit.corner, placement.direction, &next, next_corner);
            let mut skip_edges = [false; 3];
            skip_edges[next_corner] = true;
            placement = FacePlacement {
                position: next.corners[next_corner] + (1.0 - exit.s) * next.edge_vector(next_corner),
                direction,
                frame: next,
                skip_edges,
            };
        }
    }
}

/// Clamps tiny negative weights from rounding and renormalizes.
fn clamp_weights(weights: [f64; 3]) -> [f64; 3] {
    let clamped = weights.map(|w| w.max(0.0));
    let sum: f64 = clamped.iter().sum();
    if sum > 0.0 { clamped.map(|w| w / sum) } else { [1.0 / 3.0; 3] }
}
