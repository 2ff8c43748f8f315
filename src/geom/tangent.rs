//! Tangent spaces of surface points.
//!
//! - A face point uses its face frame.
//! - An edge point uses the frame of the face owning the edge's canonical half-edge.
//! - A vertex point uses polar coordinates around the vertex: angle 0 follows its
//!   reference half-edge and corner angles are rescaled to sum to 2π (π on the
//!   boundary).

use std::f64::consts::TAU;

use super::angle::normalize_angle;
use super::mesh::{FaceFrame, MeshError, SurfaceMesh};
use super::surface_point::{MeshPoint, SurfacePointError};
use super::{Tolerance, Vec2, Vec3};

/// A point inside (or on the border of) one face, ready to walk along `direction`.
#[derive(Debug, Clone, Copy)]
pub struct FacePlacement {
    pub frame: FaceFrame,
    pub position: Vec2,
    /// Unit direction in `frame`.
    pub direction: Vec2,
    /// Corners whose outgoing edge the walk must not exit through immediately.
    pub skip_edges: [bool; 3],
}

/// Where a walk starting at a surface point begins.
#[derive(Debug, Clone, Copy)]
pub enum Departure {
    Inside(FacePlacement),
    /// The direction points off the surface at a boundary.
    Blocked,
}

/// Re-expresses a direction leaving `from` through its edge at `corner` in
/// the frame of the face on the other side, by unfolding the two faces flat
/// around the shared edge.
#[must_use]
pub fn unfold_direction(from: &FaceFrame, corner: usize, dir: Vec2, to: &FaceFrame, to_corner: usize) -> Vec2 {
    let Some(u) = from.edge_vector(corner).normalized() else {
        return dir;
    };
    let Some(u_to) = to.edge_vector(to_corner).normalized() else {
        return dir;
    };
    let along = dir.dot(u);
    let across = dir.dot(u.perp());
    // The shared edge runs the other way in the neighbouring face.
    let unfolded = -along * u_to - across * u_to.perp();

    // A grazing heading can round to the outside of the edge it just crossed.
    if u_to.cross(unfolded) < 0.0 {
        let slide = unfolded.dot(u_to) * u_to;
        return slide.normalized().unwrap_or(u_to.perp());
    }
    unfolded.normalized().unwrap_or(unfolded)
}

/// Places a walk starting at `point` and heading `direction` (in the tangent
/// space of `point`) inside a concrete face.
pub fn depart(mesh: &SurfaceMesh, point: &MeshPoint, direction: Vec2) -> Result<Departure, SurfacePointError> {
    point.validate(mesh)?;
    let direction = direction.normalized().unwrap_or(Vec2::X);
    match *point {
        MeshPoint::Face { face, weights } => {
            let frame = mesh.face_frame(face)?;
            Ok(Departure::Inside(FacePlacement {
                position: frame.point_at(weights),
                frame,
                direction,
                skip_edges: [false; 3],
            }))
        }
        MeshPoint::Edge { edge, t } => depart_edge(mesh, edge, t, direction),
        MeshPoint::Vertex { vertex } => depart_vertex(mesh, vertex, direction),
    }
}

fn depart_edge(mesh: &SurfaceMesh, edge: usize, t: f64, direction: Vec2) -> Result<Departure, SurfacePointError> {
    let he = mesh.edge(edge).half_edge;
    let frame = mesh.face_frame(mesh.half_edge(he).face)?;
    let corner = frame.corner_of(he).ok_or(MeshError::UnsupportedTopology {
        face: frame.face,
        count: 0,
    })?;
    let edge_vec = frame.edge_vector(corner);
    let position = frame.corners[corner] + t * edge_vec;

    if edge_vec.cross(direction) >= 0.0 {
        let mut skip_edges = [false; 3];
        skip_edges[corner] = true;
        return Ok(Departure::Inside(FacePlacement {
            frame,
            position,
            direction,
            skip_edges,
        }));
    }

    let Some(twin) = mesh.half_edge(he).twin else {
        return Ok(Departure::Blocked);
    };
    let other = mesh.face_frame(mesh.half_edge(twin).face)?;
    let other_corner = other.corner_of(twin).ok_or(MeshError::UnsupportedTopology {
        face: other.face,
        count: 0,
    })?;
    let direction = unfold_direction(&frame, corner, direction, &other, other_corner);
    let mut skip_edges = [false; 3];
    skip_edges[other_corner] = true;
    Ok(Departure::Inside(FacePlacement {
        position: other.corners[other_corner] + (1.0 - t) * other.edge_vector(other_corner),
        frame: other,
        direction,
        skip_edges,
    }))
}

fn depart_vertex(mesh: &SurfaceMesh, vertex: usize, direction: Vec2) -> Result<Departure, SurfacePointError> {
    let Some(fan) = mesh.vertex_fan(vertex)? else {
        return Err(SurfacePointError::InvalidHandle { kind: "vertex", index: vertex });
    };

    let polar = direction.angle().rem_euclid(TAU);
    let mut remaining = polar / fan.angle_scale();
    for corner in &fan.corners {
        if remaining < corner.angle {
            let frame = mesh.face_frame(corner.face)?;
            let k = frame.corner_of(corner.half_edge).ok_or(MeshError::UnsupportedTopology {
                face: frame.face,
                count: 0,
            })?;
            let out = frame.edge_vector(k).normalized().unwrap_or(Vec2::X);
            let mut skip_edges = [false; 3];
            skip_edges[k] = true;
            skip_edges[(k + 2) % 3] = true;
            return Ok(Departure::Inside(FacePlacement {
                position: frame.corners[k],
                frame,
                direction: out.rotate(remaining),
                skip_edges,
            }));
        }
        remaining -= corner.angle;
    }

    if fan.is_boundary {
        Ok(Departure::Blocked)
    } else {
        // Rounding left the heading just past the last wedge; it closes onto the first.
        let first = fan.corners[0];
        let frame = mesh.face_frame(first.face)?;
        let k = frame.corner_of(first.half_edge).unwrap_or(0);
        let mut skip_edges = [false; 3];
        skip_edges[k] = true;
        skip_edges[(k + 2) % 3] = true;
        Ok(Departure::Inside(FacePlacement {
            position: frame.corners[k],
            frame,
            direction: frame.edge_vector(k).normalized().unwrap_or(Vec2::X),
            skip_edges,
        }))
    }
}

/// Heading, in the tangent space of `point`, that best matches the world
/// direction `world_dir`.
///
/// The direction is projected into the tangent plane first. When it is
/// (nearly) parallel to the normal it is nudged so that a heading exists.
pub fn tangent_angle_toward(mesh: &SurfaceMesh, point: &MeshPoint, world_dir: Vec3) -> Result<f64, SurfacePointError> {
    point.validate(mesh)?;
    let dir = world_dir.normalized().unwrap_or(Vec3::Y);
    match *point {
        MeshPoint::Face { face, .. } => Ok(face_heading(&mesh.face_frame(face)?, dir)),
        MeshPoint::Edge { edge, .. } => Ok(face_heading(&mesh.face_frame(mesh.edge_face(edge))?, dir)),
        MeshPoint::Vertex { vertex } => {
            let Some(fan) = mesh.vertex_fan(vertex)? else {
                return Err(SurfacePointError::InvalidHandle { kind: "vertex", index: vertex });
            };
            // Each wedge offers the in-wedge heading closest to the hint in its
            // own face; the one closest in space wins. Corner angles accumulate
            // the way a departure walks the fan.
            let mut best: Option<(f64, f64)> = None;
            let mut wedge_start = 0.0;
            for corner in &fan.corners {
                let frame = mesh.face_frame(corner.face)?;
                let k = frame.corner_of(corner.half_edge).unwrap_or(0);
                let out = frame.edge_vector(k).normalized().unwrap_or(Vec2::X);
                let offset = normalize_angle(face_heading(&frame, dir) - out.angle());
                let within = if (0.0..=corner.angle).contains(&offset) {
                    offset
                } else if offset.abs() <= normalize_angle(offset - corner.angle).abs() {
                    0.0
                } else {
                    corner.angle
                };
                let local = out.rotate(within);
                let score = (frame.x_axis * local.x + frame.y_axis * local.y).dot(dir);
                if best.is_none_or(|(s, _)| score > s) {
                    best = Some((score, wedge_start + within));
                }
                wedge_start += corner.angle;
            }
            let polar = best.map_or(0.0, |(_, polar)| polar);
            Ok(normalize_angle(polar * fan.angle_scale()))
        }
    }
}

fn face_heading(frame: &FaceFrame, dir: Vec3) -> f64 {
    frame.to_local(nudge_off_normal(dir, frame.normal)).angle()
}

fn nudge_off_normal(dir: Vec3, normal: Vec3) -> Vec3 {
    if dir.dot(normal).abs() < 1.0 - Tolerance::ALIGNMENT.eps {
        return dir;
    }
    // Tip the direction toward whichever axis is least aligned with the normal.
    let axis = [Vec3::X, Vec3::Y, Vec3::Z]
        .into_iter()
        .min_by(|a, b| a.dot(normal).abs().total_cmp(&b.dot(normal).abs()))
        .unwrap_or(Vec3::X);
    dir + axis * 1e-3
}
