//! Run statistics collected while projecting a point set.

use std::fmt;

use serde::Serialize;

/// Counters for one projection run.
///
/// These never influence the output; they exist so hosts can tell a clean
/// run from one that leaned on island reseeding or stopped at boundaries.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProjectionDiagnostics {
    /// Number of 2D points in the input.
    pub point_count: usize,

    /// Connected pieces the walk had to be seeded into, the first one included.
    pub island_count: usize,

    /// Steps handed to the tracer.
    pub traced_steps: usize,

    /// Steps whose target coincided with their entry point and were not traced.
    pub zero_length_steps: usize,

    /// Traces that stopped on the mesh boundary before covering their distance.
    pub boundary_hits: usize,

    /// Queue entries dropped because their point was already placed.
    pub discarded_queue_entries: usize,

    /// Sum of edge crossings over all traces.
    pub face_crossings: usize,

    /// Cartesian triples written to the output.
    pub emitted_points: usize,
}

impl ProjectionDiagnostics {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.boundary_hits == 0
    }
}

impl fmt::Display for ProjectionDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} points, {} islands, {} traced, {} zero-length, {} boundary hits, {} crossings, {} emitted",
            self.point_count,
            self.island_count,
            self.traced_steps,
            self.zero_length_steps,
            self.boundary_hits,
            self.face_crossings,
            self.emitted_points,
        )
    }
}
