#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod geom;
pub mod projection;

use std::fmt;

use geom::{MeshError, MeshPoint, Point3, RawMeshPoint, SurfaceMesh, SurfacePointError, Tolerance};
use projection::{ProjectionDiagnostics, ProjectionError, ProjectionOptions};
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    // A second `initialize` keeps the logger already installed.
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

/// Errors of the host-facing helpers that take packed buffers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
enum HostError {
    #[error("expected {expected} values, got {len}")]
    Arity { expected: usize, len: usize },
    #[error("packed surface point must be [kind, index, w0, w1, w2] with integral kind and index")]
    MalformedPoint,
    #[error("query point must be finite")]
    NonFiniteQuery,
    #[error("invalid mesh: {0}")]
    Mesh(#[from] MeshError),
    #[error(transparent)]
    SurfacePoint(#[from] SurfacePointError),
}

/// Result of [`compute_geodesics`].
#[wasm_bindgen]
pub struct ComputeGeodesicsOutput {
    projected_positions: Vec<f32>,
    diagnostics: ProjectionDiagnostics,
}

#[wasm_bindgen]
impl ComputeGeodesicsOutput {
    /// Packed xyz triples: one per input point, or every path point in
    /// full-path mode.
    #[wasm_bindgen(getter)]
    pub fn projected_positions(&self) -> Vec<f32> {
        self.projected_positions.clone()
    }

    /// Run statistics as a plain JS object.
    #[wasm_bindgen]
    pub fn diagnostics(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.diagnostics).map_err(|err| JsError::new(&err.to_string()).into())
    }
}

/// Projects a triangulated 2D point set onto a triangle mesh.
///
/// `start_point` and `up_direction` are either empty or three coordinates.
#[wasm_bindgen]
pub fn compute_geodesics(
    indices: &[u32],
    positions: &[f32],
    coords: &[f32],
    triangulation: &[u32],
    full_path: bool,
    start_point: &[f32],
    up_direction: &[f32],
) -> Result<ComputeGeodesicsOutput, JsValue> {
    let output = run_projection(indices, positions, coords, triangulation, full_path, start_point, up_direction)
        .map_err(to_js_error)?;
    debug_log!("compute_geodesics: {}", output.diagnostics);
    Ok(ComputeGeodesicsOutput {
        projected_positions: output.projected_positions,
        diagnostics: output.diagnostics,
    })
}

/// Packed surface point (`[kind, index, w0, w1, w2]`) nearest to a world
/// position.
#[wasm_bindgen]
pub fn closest_surface_point(indices: &[u32], positions: &[f32], query: &[f32]) -> Result<Vec<f64>, JsValue> {
    closest_point_packed(indices, positions, query)
        .map(|packed| packed.to_vec())
        .map_err(to_js_error)
}

/// World position of a packed surface point.
#[wasm_bindgen]
pub fn surface_point_position(indices: &[u32], positions: &[f32], packed: &[f64]) -> Result<Vec<f64>, JsValue> {
    resolve_packed(indices, positions, packed)
        .map(|position| position.to_vec())
        .map_err(to_js_error)
}

fn run_projection(
    indices: &[u32],
    positions: &[f32],
    coords: &[f32],
    triangulation: &[u32],
    full_path: bool,
    start_point: &[f32],
    up_direction: &[f32],
) -> Result<projection::ProjectionOutput, ProjectionError> {
    let options = ProjectionOptions::from_host(full_path, start_point, up_direction)?;
    projection::compute_geodesics(indices, positions, coords, triangulation, &options)
}

fn closest_point_packed(indices: &[u32], positions: &[f32], query: &[f32]) -> Result<[f64; 5], HostError> {
    let &[x, y, z] = query else {
        return Err(HostError::Arity {
            expected: 3,
            len: query.len(),
        });
    };
    let query = Point3::new(f64::from(x), f64::from(y), f64::from(z));
    if !query.is_finite() {
        return Err(HostError::NonFiniteQuery);
    }
    let mesh = SurfaceMesh::from_buffers(indices, positions)?;
    let hit = geom::closest_surface_point(&mesh, query, Tolerance::BARYCENTRIC)?;
    Ok(hit.point.to_raw().to_packed())
}

fn resolve_packed(indices: &[u32], positions: &[f32], packed: &[f64]) -> Result<[f64; 3], HostError> {
    if packed.len() != 5 {
        return Err(HostError::Arity {
            expected: 5,
            len: packed.len(),
        });
    }
    let raw = RawMeshPoint::from_packed(packed).ok_or(HostError::MalformedPoint)?;
    let point = MeshPoint::try_from(raw)?;
    let mesh = SurfaceMesh::from_buffers(indices, positions)?;
    Ok(point.resolve(&mesh)?.to_array())
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}
