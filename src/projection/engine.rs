//! Breadth-first projection of a planar point set onto a surface mesh.
//!
//! The walk starts at one surface point and spreads over the planar graph.
//! Every step turns the planar displacement to the next point into a tangent
//! displacement at the current surface point and traces it. When a connected
//! piece of the graph is exhausted, the walk is re-seeded from the placed
//! point closest (in the plane) to a point that is still waiting.

use std::collections::VecDeque;
use std::f64::consts::FRAC_PI_2;

use crate::geom::{
    MeshPoint, Point3, StraightestTracer, SurfaceMesh, SurfaceTracer, Tolerance, TraceOptions, Vec2, Vec3,
    angle_and_distance, closest_surface_point, tangent_angle_toward,
};

use super::diagnostics::ProjectionDiagnostics;
use super::error::ProjectionError;
use super::graph::PlanarGraph;
use super::grid::PointGrid;

/// Which planar coordinate the seed entry is paired with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeedOrigin {
    /// The seed sits at the planar origin, so the first point is reached by
    /// walking its own offset from `(0, 0)`.
    #[default]
    LocalOrigin,
    /// The seed sits at the first point's own coordinates; the first point
    /// lands exactly on the start point.
    FirstPoint,
}

/// Options for a projection run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionOptions {
    /// Emit every point crossed by every trace instead of one position per input point.
    pub full_path: bool,
    /// World-space seed; `None` starts inside the first face.
    pub start_point: Option<Point3>,
    /// World-space hint for the direction planar +y should point at the seed.
    pub up_direction: Option<Vec3>,
    pub trace: TraceOptions,
    /// Per-axis distance under which consecutive full-path points are merged.
    pub path_dedup_epsilon: f64,
    /// Bucket size of the reseed grid; `None` derives one from the input extent.
    pub bucket_size: Option<f64>,
    pub seed_origin: SeedOrigin,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            full_path: false,
            start_point: None,
            up_direction: None,
            trace: TraceOptions::default(),
            path_dedup_epsilon: Tolerance::PATH_DEDUP.eps,
            bucket_size: None,
            seed_origin: SeedOrigin::LocalOrigin,
        }
    }
}

impl ProjectionOptions {
    /// Builds options from host buffers where an empty slice means "not given".
    pub fn from_host(full_path: bool, start_point: &[f32], up_direction: &[f32]) -> Result<Self, ProjectionError> {
        let start_point = match *start_point {
            [] => None,
            [x, y, z] => Some(Point3::new(f64::from(x), f64::from(y), f64::from(z))),
            _ => return Err(ProjectionError::InvalidStartPoint { len: start_point.len() }),
        };
        let up_direction = match *up_direction {
            [] => None,
            [x, y, z] => Some(Vec3::new(f64::from(x), f64::from(y), f64::from(z))),
            _ => return Err(ProjectionError::InvalidUpDirection { len: up_direction.len() }),
        };
        let options = Self {
            full_path,
            start_point,
            up_direction,
            ..Self::default()
        };
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), ProjectionError> {
        if self.start_point.is_some_and(|p| !p.is_finite()) {
            return Err(ProjectionError::InvalidStartPoint { len: 3 });
        }
        if self
            .up_direction
            .is_some_and(|v| !v.is_finite() || Tolerance::ZERO_LENGTH.is_zero_length(v.length()))
        {
            return Err(ProjectionError::InvalidUpDirection { len: 3 });
        }
        Ok(())
    }
}

/// Where a planar point ended up on the surface and the headings that map
/// the next planar step into its tangent space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkState {
    pub index: u32,
    pub point: MeshPoint,
    pub x: f64,
    pub y: f64,
    /// Heading the walk arrived with, in the tangent space of `point`.
    pub tangent_angle: f64,
    /// The same heading in the plane.
    pub planar_angle: f64,
}

/// A pending step toward `target`, starting from an already placed state.
#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    target: u32,
    point: MeshPoint,
    x: f64,
    y: f64,
    tangent_angle: f64,
    planar_angle: f64,
}

impl WalkState {
    fn entry_for(&self, target: u32) -> QueueEntry {
        QueueEntry {
            target,
            point: self.point,
            x: self.x,
            y: self.y,
            tangent_angle: self.tangent_angle,
            planar_angle: self.planar_angle,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionOutput {
    /// Packed xyz triples; one per input point, or the full path when requested.
    pub projected_positions: Vec<f32>,
    /// Surface point of every input point, in input order.
    pub surface_points: Vec<MeshPoint>,
    pub diagnostics: ProjectionDiagnostics,
}

/// Collects output positions in either dense or full-path layout.
struct Emitter {
    full_path: bool,
    positions: Vec<f32>,
    last: Option<Point3>,
    dedup: Tolerance,
    emitted: usize,
}

impl Emitter {
    fn new(full_path: bool, point_count: usize, dedup_epsilon: f64) -> Self {
        let positions = if full_path { Vec::new() } else { vec![0.0; point_count * 3] };
        Self {
            full_path,
            positions,
            last: None,
            dedup: Tolerance::new(dedup_epsilon),
            emitted: 0,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn place(&mut self, index: usize, position: Point3) {
        self.positions[index * 3..index * 3 + 3].copy_from_slice(&[position.x as f32, position.y as f32, position.z as f32]);
        self.emitted += 1;
    }

    #[allow(clippy::cast_possible_truncation)]
    fn append(&mut self, position: Point3) {
        if self.last.is_some_and(|last| self.dedup.approx_eq_point3(last, position)) {
            return;
        }
        self.positions.extend([position.x as f32, position.y as f32, position.z as f32]);
        self.last = Some(position);
        self.emitted += 1;
    }
}

/// Projects packed 2D `coords` with triangle list `triangulation` onto the
/// mesh described by `indices`/`positions`, tracing with [`StraightestTracer`].
pub fn compute_geodesics(
    indices: &[u32],
    positions: &[f32],
    coords: &[f32],
    triangulation: &[u32],
    options: &ProjectionOptions,
) -> Result<ProjectionOutput, ProjectionError> {
    let mesh = SurfaceMesh::from_buffers(indices, positions)?;
    let coords: Vec<f64> = coords.iter().copied().map(f64::from).collect();
    project_points(&mesh, &StraightestTracer, &coords, triangulation, options)
}

fn validate_inputs(coords: &[f64], triangulation: &[u32], options: &ProjectionOptions) -> Result<usize, ProjectionError> {
    if coords.len() % 2 != 0 {
        return Err(ProjectionError::InvalidCoordinateArity { len: coords.len() });
    }
    let point_count = coords.len() / 2;
    if let Some(index) = coords.chunks_exact(2).position(|p| !p[0].is_finite() || !p[1].is_finite()) {
        return Err(ProjectionError::NonFiniteCoordinate { index });
    }
    if triangulation.len() % 3 != 0 {
        return Err(ProjectionError::InvalidTriangulationArity { len: triangulation.len() });
    }
    if let Some(&index) = triangulation.iter().find(|&&i| i as usize >= point_count) {
        return Err(ProjectionError::TriangulationIndexOutOfBounds { index, point_count });
    }
    if u32::try_from(point_count).is_err() {
        return Err(ProjectionError::InvalidCoordinateArity { len: coords.len() });
    }
    options.validate()?;
    Ok(point_count)
}

/// Runs the breadth-first projection with an arbitrary tracer.
///
/// Every input point is placed exactly once. Duplicate queue entries for a
/// point are resolved by the first one dequeued.
pub fn project_points<T: SurfaceTracer>(
    mesh: &SurfaceMesh,
    tracer: &T,
    coords: &[f64],
    triangulation: &[u32],
    options: &ProjectionOptions,
) -> Result<ProjectionOutput, ProjectionError> {
    let point_count = validate_inputs(coords, triangulation, options)?;
    let mut diagnostics = ProjectionDiagnostics {
        point_count,
        ..ProjectionDiagnostics::default()
    };
    if point_count == 0 {
        return Ok(ProjectionOutput {
            projected_positions: Vec::new(),
            surface_points: Vec::new(),
            diagnostics,
        });
    }

    let start = match options.start_point {
        Some(query) => closest_surface_point(mesh, query, Tolerance::BARYCENTRIC)?.point,
        None => MeshPoint::Face {
            face: 0,
            weights: [0.3, 0.3, 0.4],
        },
    };
    start.validate(mesh)?;
    let initial_tangent = match options.up_direction {
        Some(up) => tangent_angle_toward(mesh, &start, up)?,
        None => 0.0,
    };
    let (origin_x, origin_y) = match options.seed_origin {
        SeedOrigin::LocalOrigin => (0.0, 0.0),
        SeedOrigin::FirstPoint => (coords[0], coords[1]),
    };

    let graph = PlanarGraph::from_triangles(point_count, triangulation);
    if log::log_enabled!(log::Level::Debug) {
        log::debug!(
            "projecting {point_count} points in {} connected pieces onto {} faces from {start:?} (heading {initial_tangent:.4})",
            graph.component_count(),
            mesh.face_count()
        );
    }
    let mut grid = PointGrid::new(options.bucket_size.unwrap_or_else(|| PointGrid::bucket_size_for(coords)));
    let mut visited: Vec<Option<WalkState>> = vec![None; point_count];
    let mut emitter = Emitter::new(options.full_path, point_count, options.path_dedup_epsilon);
    let trace_options = TraceOptions {
        include_path: options.full_path,
        ..options.trace
    };

    let mut queue = VecDeque::new();
    queue.push_back(QueueEntry {
        target: 0,
        point: start,
        x: origin_x,
        y: origin_y,
        tangent_angle: initial_tangent,
        planar_angle: FRAC_PI_2,
    });
    diagnostics.island_count = 1;
    let mut next_unvisited = 0usize;

    loop {
        while let Some(entry) = queue.pop_front() {
            let target = entry.target as usize;
            if visited[target].is_some() {
                diagnostics.discarded_queue_entries += 1;
                continue;
            }

            let state = step(mesh, tracer, &entry, coords, &trace_options, &mut emitter, &mut diagnostics)?;
            grid.insert(state.x, state.y, state.index);
            visited[target] = Some(state);

            for &neighbor in graph.neighbors(target) {
                if visited[neighbor as usize].is_none() {
                    queue.push_back(state.entry_for(neighbor));
                }
            }
        }

        while next_unvisited < point_count && visited[next_unvisited].is_some() {
            next_unvisited += 1;
        }
        if next_unvisited == point_count {
            break;
        }

        #[allow(clippy::cast_possible_truncation)]
        let target = next_unvisited as u32;
        let (x, y) = (coords[next_unvisited * 2], coords[next_unvisited * 2 + 1]);
        let nearest = grid
            .nearest(x, y)
            .map_err(|_| ProjectionError::NoClosestVertex { index: target })?;
        let Some(anchor) = visited.get(nearest as usize).copied().flatten() else {
            return Err(ProjectionError::NoClosestVertex { index: target });
        };
        log::debug!("point {target} is in a new island, reseeding from placed point {nearest}");
        diagnostics.island_count += 1;
        queue.push_back(anchor.entry_for(target));
    }

    diagnostics.emitted_points = emitter.emitted;
    log::debug!("projection finished: {diagnostics}");

    // The loop only ends once every slot is filled.
    let surface_points: Vec<MeshPoint> = visited.into_iter().flatten().map(|state| state.point).collect();

    Ok(ProjectionOutput {
        projected_positions: emitter.positions,
        surface_points,
        diagnostics,
    })
}

/// Walks from `entry` to its target point and records the landing position.
fn step<T: SurfaceTracer>(
    mesh: &SurfaceMesh,
    tracer: &T,
    entry: &QueueEntry,
    coords: &[f64],
    trace_options: &TraceOptions,
    emitter: &mut Emitter,
    diagnostics: &mut ProjectionDiagnostics,
) -> Result<WalkState, ProjectionError> {
    let target = entry.target as usize;
    let (x, y) = (coords[target * 2], coords[target * 2 + 1]);
    let planar = angle_and_distance(x, y, entry.x, entry.y, entry.tangent_angle, entry.planar_angle);

    if Tolerance::ZERO_LENGTH.is_zero_length(planar.distance) {
        diagnostics.zero_length_steps += 1;
        log::trace!("point {target}: zero-length step, staying at {:?}", entry.point);
        let position = entry.point.resolve(mesh)?;
        if emitter.full_path {
            emitter.append(position);
        } else {
            emitter.place(target, position);
        }
        return Ok(WalkState {
            index: entry.target,
            point: entry.point,
            x,
            y,
            tangent_angle: entry.tangent_angle,
            planar_angle: entry.planar_angle,
        });
    }

    let displacement = Vec2::from_angle(planar.tangent_angle) * planar.distance;
    let result = tracer.trace(mesh, &entry.point, displacement, trace_options)?;
    diagnostics.traced_steps += 1;
    diagnostics.face_crossings += result.face_crossings;
    if result.hit_boundary {
        diagnostics.boundary_hits += 1;
    }
    log::trace!(
        "point {target}: traced {:.6} at {:.4} rad across {} edges to {:?}",
        planar.distance,
        planar.tangent_angle,
        result.face_crossings,
        result.end_point
    );

    if emitter.full_path {
        if result.path.is_empty() {
            emitter.append(result.end_point.resolve(mesh)?);
        }
        for point in &result.path {
            emitter.append(point.resolve(mesh)?);
        }
    } else {
        emitter.place(target, result.end_point.resolve(mesh)?);
    }

    Ok(WalkState {
        index: entry.target,
        point: result.end_point,
        x,
        y,
        tangent_angle: result.ending_dir.angle(),
        planar_angle: planar.planar_angle,
    })
}
