use std::f64::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_4, FRAC_PI_6};

use crate::geom::{
    Departure, MeshPoint, Point3, StraightestTracer, SurfaceTracer, TraceError, TraceOptions, Vec2, Vec3, depart,
    tangent_angle_toward,
};

use super::fixtures::{approx_eq, approx_point, cube, grid, square, triangle};

fn start_on_triangle() -> MeshPoint {
    MeshPoint::Face {
        face: 0,
        weights: [0.3, 0.3, 0.4],
    }
}

#[test]
fn straight_walk_on_a_plane_is_a_translation() {
    let mesh = square(2.0);
    let start = MeshPoint::Face {
        face: 0,
        weights: [0.6, 0.3, 0.1],
    };
    let result = StraightestTracer
        .trace(&mesh, &start, Vec2::new(0.0, 1.2), &TraceOptions::default())
        .expect("trace");

    let end = result.end_point.resolve(&mesh).expect("resolve");
    assert!(approx_point(end, Point3::new(0.8, 1.4, 0.0), 1e-9));
    assert_eq!(result.face_crossings, 1);
    assert!(!result.hit_boundary);
    assert!(matches!(result.end_point, MeshPoint::Face { face: 1, .. }));

    // The heading is re-expressed in the frame of the face it ended in.
    let frame = mesh.face_frame(1).expect("frame");
    let world = frame.x_axis * result.ending_dir.x + frame.y_axis * result.ending_dir.y;
    assert!(approx_eq(world.y, 1.0, 1e-9));
}

#[test]
fn walk_around_cube_returns_to_start() {
    let mesh = cube();
    // Front face, heading +x at height 0.25.
    let start = MeshPoint::Face {
        face: 4,
        weights: [0.5, 0.25, 0.25],
    };
    let origin = start.resolve(&mesh).expect("resolve");
    assert!(approx_point(origin, Point3::new(0.5, 0.0, 0.25), 1e-12));

    let result = StraightestTracer
        .trace(&mesh, &start, Vec2::new(4.0, 0.0), &TraceOptions::default())
        .expect("trace");
    let end = result.end_point.resolve(&mesh).expect("resolve");
    assert!(approx_point(end, origin, 1e-6));
    assert_eq!(result.face_crossings, 8);
    assert!(!result.hit_boundary);
}

#[test]
fn boundary_stops_the_walk_by_default() {
    let mesh = triangle();
    let result = StraightestTracer
        .trace(&mesh, &start_on_triangle(), Vec2::new(0.0, -1.0), &TraceOptions::default())
        .expect("trace");
    assert!(result.hit_boundary);
    let end = result.end_point.resolve(&mesh).expect("resolve");
    assert!(approx_point(end, Point3::new(0.3, 0.0, 0.0), 1e-9));
}

#[test]
fn boundary_can_be_an_error() {
    let mesh = triangle();
    let options = TraceOptions {
        error_on_boundary: true,
        ..TraceOptions::default()
    };
    let err = StraightestTracer
        .trace(&mesh, &start_on_triangle(), Vec2::new(0.0, -1.0), &options)
        .unwrap_err();
    let edge = mesh.find_edge(0, 1).expect("edge 0-1");
    assert_eq!(err, TraceError::HitBoundary { edge });
}

#[test]
fn zero_displacement_stays_put() {
    let mesh = cube();
    let start = MeshPoint::Vertex { vertex: 3 };
    let result = StraightestTracer
        .trace(&mesh, &start, Vec2::ZERO, &TraceOptions::default())
        .expect("trace");
    assert_eq!(result.end_point, start);
    assert_eq!(result.face_crossings, 0);
}

#[test]
fn non_finite_displacement_is_rejected() {
    let mesh = triangle();
    let err = StraightestTracer
        .trace(&mesh, &start_on_triangle(), Vec2::new(f64::NAN, 0.0), &TraceOptions::default())
        .unwrap_err();
    assert_eq!(err, TraceError::NonFiniteDisplacement);
}

#[test]
fn crossing_limit_is_enforced() {
    let mesh = cube();
    let start = MeshPoint::Face {
        face: 4,
        weights: [0.5, 0.25, 0.25],
    };
    let options = TraceOptions {
        max_face_crossings: 2,
        ..TraceOptions::default()
    };
    let err = StraightestTracer
        .trace(&mesh, &start, Vec2::new(4.0, 0.0), &options)
        .unwrap_err();
    assert_eq!(err, TraceError::IterationLimit { limit: 2 });

    let lenient = TraceOptions {
        error_on_problem: false,
        ..options
    };
    let result = StraightestTracer
        .trace(&mesh, &start, Vec2::new(4.0, 0.0), &lenient)
        .expect("trace");
    assert_eq!(result.face_crossings, 3);
}

#[test]
fn path_lists_start_crossings_and_end() {
    let mesh = square(2.0);
    let start = MeshPoint::Face {
        face: 0,
        weights: [0.6, 0.3, 0.1],
    };
    let options = TraceOptions {
        include_path: true,
        ..TraceOptions::default()
    };
    let result = StraightestTracer
        .trace(&mesh, &start, Vec2::new(0.0, 1.2), &options)
        .expect("trace");
    assert_eq!(result.path.len(), 3);
    assert_eq!(result.path[0], start);
    assert_eq!(result.path[2], result.end_point);
    let crossing = result.path[1].resolve(&mesh).expect("resolve");
    assert!(matches!(result.path[1], MeshPoint::Edge { .. }));
    assert!(approx_point(crossing, Point3::new(0.8, 0.8, 0.0), 1e-9));
}

#[test]
fn vertex_start_rescales_polar_angle() {
    let mesh = square(2.0);
    // Boundary corner with a right angle: polar angles are doubled.
    let start = MeshPoint::Vertex { vertex: 0 };
    let result = StraightestTracer
        .trace(&mesh, &start, Vec2::from_angle(FRAC_PI_3), &TraceOptions::default())
        .expect("trace");
    let end = result.end_point.resolve(&mesh).expect("resolve");
    assert!(approx_point(end, Point3::new(FRAC_PI_6.cos(), FRAC_PI_6.sin(), 0.0), 1e-9));
}

#[test]
fn vertex_start_off_the_surface_is_blocked() {
    let mesh = square(2.0);
    let start = MeshPoint::Vertex { vertex: 0 };
    assert!(matches!(
        depart(&mesh, &start, Vec2::from_angle(-FRAC_PI_2)).expect("depart"),
        Departure::Blocked
    ));

    let options = TraceOptions {
        error_on_boundary: true,
        ..TraceOptions::default()
    };
    let err = StraightestTracer
        .trace(&mesh, &start, Vec2::from_angle(-FRAC_PI_2), &options)
        .unwrap_err();
    assert_eq!(err, TraceError::BlockedAtStart);
}

#[test]
fn edge_start_crosses_into_the_facing_side() {
    let mesh = square(2.0);
    let edge = mesh.find_edge(0, 2).expect("diagonal");
    let start = MeshPoint::Edge { edge, t: 0.5 };
    let frame = mesh.face_frame(mesh.edge_face(edge)).expect("frame");
    // World -y, toward face 0 below the diagonal.
    let heading = frame.to_local(Vec3::new(0.0, -0.5, 0.0));
    let result = StraightestTracer
        .trace(&mesh, &start, heading, &TraceOptions::default())
        .expect("trace");
    let end = result.end_point.resolve(&mesh).expect("resolve");
    assert!(approx_point(end, Point3::new(1.0, 0.5, 0.0), 1e-9));
    assert!(matches!(result.end_point, MeshPoint::Face { face: 0, .. }));
}

#[test]
fn up_hint_turns_into_tangent_angle() {
    let mesh = triangle();
    let angle = tangent_angle_toward(&mesh, &start_on_triangle(), Vec3::new(0.0, 2.0, 0.0)).expect("angle");
    assert!(approx_eq(angle, FRAC_PI_2, 1e-12));

    // Parallel to the normal: nudged to some finite heading.
    let angle = tangent_angle_toward(&mesh, &start_on_triangle(), Vec3::new(0.0, 0.0, 1.0)).expect("angle");
    assert!(angle.is_finite());

    let square = square(2.0);
    let angle = tangent_angle_toward(&square, &MeshPoint::Vertex { vertex: 0 }, Vec3::new(1.0, 1.0, 0.0))
        .expect("angle");
    assert!(approx_eq(angle, 2.0 * FRAC_PI_4, 1e-12));
}

#[test]
fn walk_along_an_edge_line_from_a_point_on_it() {
    let mesh = grid(4);
    // Cell (1, 2), upper face: corners (1,2), (2,3), (1,3). The point sits on
    // the y = 3 edge up to rounding in its first weight.
    for w0 in [0.0, 5.5e-17, -3e-17, 1e-15] {
        let start = MeshPoint::Face {
            face: 2 * (2 * 4 + 1) + 1,
            weights: [w0, 0.586 - w0, 0.414],
        };
        let origin = start.resolve(&mesh).expect("resolve");
        assert!(approx_point(origin, Point3::new(1.586, 3.0, 0.0), 1e-12));

        for (world, distance) in [(Vec3::new(-1.0, 0.0, 0.0), 1.4142), (Vec3::new(1.0, 0.0, 0.0), 2.1)] {
            let heading = tangent_angle_toward(&mesh, &start, world).expect("heading");
            let result = StraightestTracer
                .trace(&mesh, &start, Vec2::from_angle(heading) * distance, &TraceOptions::default())
                .expect("trace");
            let end = result.end_point.resolve(&mesh).expect("resolve");
            let expected = Point3::new(origin.x + world.x * distance, 3.0, 0.0);
            assert!(approx_point(end, expected, 1e-9), "w0 {w0}: {end:?} != {expected:?}");
            assert!(!result.hit_boundary);
        }
    }
}

#[test]
fn up_hint_at_a_cube_corner_departs_along_the_hint() {
    let mesh = cube();
    let corner = MeshPoint::Vertex { vertex: 0 };
    // One direction inside each of four wedges around the corner, on three faces.
    for world in [
        Vec3::new(1.0, 0.5, 0.0),
        Vec3::new(1.0, 0.0, 0.5),
        Vec3::new(0.5, 0.0, 1.0),
        Vec3::new(0.0, 0.5, 1.0),
    ] {
        let heading = tangent_angle_toward(&mesh, &corner, world).expect("heading");
        let Departure::Inside(placement) = depart(&mesh, &corner, Vec2::from_angle(heading)).expect("depart") else {
            panic!("an interior vertex never blocks");
        };
        let d = placement.direction;
        let walked = placement.frame.x_axis * d.x + placement.frame.y_axis * d.y;
        let expected = world.normalized().expect("unit");
        assert!(approx_eq(walked.dot(expected), 1.0, 1e-9), "{world:?} departs along {walked:?}");
    }
}
