use crate::geom::{MeshPoint, Point3, Tolerance, closest_point_on_triangle, closest_surface_point};

use super::fixtures::{approx_eq, approx_point, cube, square, triangle};

#[test]
fn interior_query_projects_onto_plane() {
    let (p, w) = closest_point_on_triangle(
        Point3::new(0.25, 0.25, 3.0),
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    );
    assert!(approx_point(p, Point3::new(0.25, 0.25, 0.0), 1e-12));
    assert!(approx_eq(w[0], 0.5, 1e-12));
    assert!(approx_eq(w[1], 0.25, 1e-12));
    assert!(approx_eq(w[2], 0.25, 1e-12));
}

#[test]
fn above_centroid_is_a_face_point() {
    let mesh = triangle();
    let hit = closest_surface_point(&mesh, Point3::new(1.0 / 3.0, 1.0 / 3.0, 2.0), Tolerance::BARYCENTRIC)
        .expect("closest point");
    match hit.point {
        MeshPoint::Face { face, weights } => {
            assert_eq!(face, 0);
            for w in weights {
                assert!(approx_eq(w, 1.0 / 3.0, 1e-9));
            }
        }
        other => panic!("expected a face point, got {other:?}"),
    }
    assert!(approx_eq(hit.distance_squared, 4.0, 1e-12));
}

#[test]
fn beyond_a_corner_snaps_to_vertex() {
    let mesh = triangle();
    let hit = closest_surface_point(&mesh, Point3::new(-1.0, -1.0, 0.5), Tolerance::BARYCENTRIC)
        .expect("closest point");
    assert_eq!(hit.point, MeshPoint::Vertex { vertex: 0 });

    let hit = closest_surface_point(&mesh, Point3::new(-0.5, 3.0, 0.0), Tolerance::BARYCENTRIC)
        .expect("closest point");
    assert_eq!(hit.point, MeshPoint::Vertex { vertex: 2 });
}

#[test]
fn beside_an_edge_snaps_to_edge() {
    let mesh = triangle();
    let hit = closest_surface_point(&mesh, Point3::new(0.25, -2.0, 0.0), Tolerance::BARYCENTRIC)
        .expect("closest point");
    let MeshPoint::Edge { edge, t } = hit.point else {
        panic!("expected an edge point, got {:?}", hit.point);
    };
    let (first, _) = mesh.edge_vertices(edge);
    let expected_t = if first == 0 { 0.25 } else { 0.75 };
    assert!(approx_eq(t, expected_t, 1e-12));
    let resolved = hit.point.resolve(&mesh).expect("resolve");
    assert!(approx_point(resolved, Point3::new(0.25, 0.0, 0.0), 1e-12));
}

#[test]
fn shared_diagonal_is_found_from_either_face() {
    let mesh = square(2.0);
    let hit = closest_surface_point(&mesh, Point3::new(0.5, 0.5, 1.0), Tolerance::BARYCENTRIC)
        .expect("closest point");
    let MeshPoint::Edge { edge, .. } = hit.point else {
        panic!("expected an edge point, got {:?}", hit.point);
    };
    assert_eq!(mesh.find_edge(0, 2), Some(edge));
}

#[test]
fn picks_nearest_face_of_closed_mesh() {
    let mesh = cube();
    let query = Point3::new(0.4, 0.3, 5.0);
    let hit = closest_surface_point(&mesh, query, Tolerance::BARYCENTRIC).expect("closest point");
    assert!(approx_point(hit.position, Point3::new(0.4, 0.3, 1.0), 1e-12));
    let resolved = hit.point.resolve(&mesh).expect("resolve");
    assert!(approx_point(resolved, hit.position, 1e-9));
}
