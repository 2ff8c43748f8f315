//! Projection of planar point sets onto surface meshes.

mod diagnostics;
mod engine;
mod error;
mod graph;
mod grid;
mod planar;

pub use diagnostics::ProjectionDiagnostics;
pub use engine::{ProjectionOptions, ProjectionOutput, SeedOrigin, WalkState, compute_geodesics, project_points};
pub use error::ProjectionError;
pub use graph::PlanarGraph;
pub use grid::{GridError, PointGrid};
pub use planar::triangulate_points;

#[cfg(test)]
mod tests;
