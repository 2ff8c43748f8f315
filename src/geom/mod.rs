mod angle;
mod closest_point;
mod core;
mod mesh;
mod surface_point;
mod tangent;
mod trace;

pub use angle::{PlanarStep, angle_and_distance, angle_difference, normalize_angle, transport_angle};
pub use closest_point::{SurfaceHit, classify_weights, closest_point_on_triangle, closest_surface_point};
pub use self::core::{Point3, Tolerance, Vec2, Vec3};
pub use mesh::{Edge, FaceFrame, HalfEdge, MeshError, SurfaceMesh, VertexCorner, VertexFan};
pub use surface_point::{MeshPoint, RawMeshPoint, SurfacePointError};
pub use tangent::{Departure, FacePlacement, depart, tangent_angle_toward, unfold_direction};
pub use trace::{StraightestTracer, SurfaceTracer, TraceError, TraceOptions, TraceResult};

#[cfg(test)]
pub(crate) mod tests;
