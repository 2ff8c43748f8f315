#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("wrap_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use geodesics_engine::geom::{Point3, Vec3};
    use geodesics_engine::projection::{ProjectionOptions, ProjectionOutput, compute_geodesics, triangulate_points};
    use std::fs::{self, File};
    use std::io::{BufWriter, Write};
    use std::path::{Path, PathBuf};

    const USAGE: &str = r"wrap_cli (geodesics-engine)

USAGE:
  wrap_cli list
  wrap_cli run <scenario> [options]

SCENARIOS:
  grid_on_cube
  islands_on_plane
  spiral_on_tetrahedron

OPTIONS (run):
  --full-path        Emit every point crossed instead of one point per input
  --obj <path>       Write the mesh and the projected points as OBJ
  --overwrite        Overwrite an existing OBJ file
  -h, --help         Show this help
";

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let Some(command) = args.next() else {
            print_usage();
            return Ok(());
        };

        match command.as_str() {
            "list" => {
                print_scenarios();
                Ok(())
            }
            "run" => cmd_run(&mut args),
            "-h" | "--help" | "help" => {
                print_usage();
                Ok(())
            }
            other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
        }
    }

    fn print_usage() {
        println!("{USAGE}");
    }

    fn print_scenarios() {
        for scenario in Scenario::ALL {
            println!("{:<24}{}", scenario.name(), scenario.description());
        }
    }

    fn cmd_run(args: &mut Args) -> Result<(), String> {
        let scenario_name = args.next().ok_or("missing scenario name")?;

        let mut full_path = false;
        let mut obj_path: Option<PathBuf> = None;
        let mut overwrite = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--full-path" => full_path = true,
                "--obj" => obj_path = Some(PathBuf::from(args.value("--obj")?)),
                "--overwrite" => overwrite = true,
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        let scenario = Scenario::from_str(&scenario_name)
            .ok_or_else(|| format!("unknown scenario `{scenario_name}` (try `wrap_cli list`)"))?;
        let input = scenario.build();
        let options = ProjectionOptions {
            full_path,
            start_point: Some(input.start),
            up_direction: input.up,
            ..ProjectionOptions::default()
        };

        let output = compute_geodesics(&input.indices, &input.positions, &input.coords, &input.triangulation, &options)
            .map_err(|e| format!("projection failed: {e}"))?;

        println!("scenario: {}", scenario.name());
        println!("mesh: {} faces", input.indices.len() / 3);
        println!("diagnostics: {}", output.diagnostics);

        if let Some(path) = obj_path {
            write_obj_file(&path, &input, &output, full_path, scenario.name(), overwrite)?;
            println!("wrote {}", path.display());
        }
        Ok(())
    }

    fn write_obj_file(
        path: &Path,
        input: &ScenarioInput,
        output: &ProjectionOutput,
        full_path: bool,
        name: &str,
        overwrite: bool,
    ) -> Result<(), String> {
        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }

        let file = File::create(path).map_err(|e| format!("create {}: {e}", path.display()))?;
        let mut w = BufWriter::new(file);
        let io = |e: std::io::Error| format!("write obj: {e}");

        writeln!(w, "# geodesics-engine wrap_cli").map_err(io)?;
        writeln!(w, "o {name}_mesh").map_err(io)?;
        for p in input.positions.chunks_exact(3) {
            writeln!(w, "v {} {} {}", p[0], p[1], p[2]).map_err(io)?;
        }
        for tri in input.indices.chunks_exact(3) {
            writeln!(w, "f {} {} {}", tri[0] + 1, tri[1] + 1, tri[2] + 1).map_err(io)?;
        }

        let base = input.positions.len() / 3;
        let projected = output.projected_positions.len() / 3;
        writeln!(w, "o {name}_points").map_err(io)?;
        for p in output.projected_positions.chunks_exact(3) {
            writeln!(w, "v {} {} {}", p[0], p[1], p[2]).map_err(io)?;
        }

        if full_path {
            // One polyline through every emitted point, in walk order.
            if projected > 1 {
                write!(w, "l").map_err(io)?;
                for i in 0..projected {
                    write!(w, " {}", base + i + 1).map_err(io)?;
                }
                writeln!(w).map_err(io)?;
            }
        } else {
            // The planar triangulation, wrapped.
            for tri in input.triangulation.chunks_exact(3) {
                let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| base + i as usize + 1);
                writeln!(w, "l {a} {b} {c} {a}").map_err(io)?;
            }
        }

        w.flush().map_err(io)?;
        Ok(())
    }

    struct ScenarioInput {
        indices: Vec<u32>,
        positions: Vec<f32>,
        coords: Vec<f32>,
        triangulation: Vec<u32>,
        start: Point3,
        up: Option<Vec3>,
    }

    #[derive(Debug, Clone, Copy)]
    enum Scenario {
        GridOnCube,
        IslandsOnPlane,
        SpiralOnTetrahedron,
    }

    impl Scenario {
        const ALL: &'static [Scenario] = &[
            Scenario::GridOnCube,
            Scenario::IslandsOnPlane,
            Scenario::SpiralOnTetrahedron,
        ];

        fn name(self) -> &'static str {
            match self {
                Scenario::GridOnCube => "grid_on_cube",
                Scenario::IslandsOnPlane => "islands_on_plane",
                Scenario::SpiralOnTetrahedron => "spiral_on_tetrahedron",
            }
        }

        fn description(self) -> &'static str {
            match self {
                Scenario::GridOnCube => "8x8 grid wrapped over the top and sides of a unit cube",
                Scenario::IslandsOnPlane => "two separate grids placed on a flat square",
                Scenario::SpiralOnTetrahedron => "Delaunay-triangulated spiral on a tetrahedron",
            }
        }

        fn from_str(name: &str) -> Option<Self> {
            Scenario::ALL.iter().copied().find(|s| s.name() == name)
        }

        fn build(self) -> ScenarioInput {
            match self {
                Scenario::GridOnCube => {
                    let (coords, triangulation) = grid_points(8, 0.2, (-0.7, -0.7));
                    let (indices, positions) = cube_mesh();
                    ScenarioInput {
                        indices,
                        positions,
                        coords,
                        triangulation,
                        start: Point3::new(0.5, 0.5, 2.0),
                        up: Some(Vec3::new(0.0, 1.0, 0.0)),
                    }
                }
                Scenario::IslandsOnPlane => {
                    let (mut coords, mut triangulation) = grid_points(3, 0.5, (-3.0, -3.0));
                    let (far_coords, far_triangles) = grid_points(3, 0.5, (2.0, 1.5));
                    let offset = u32::try_from(coords.len() / 2).unwrap_or(u32::MAX);
                    coords.extend(far_coords);
                    triangulation.extend(far_triangles.into_iter().map(|i| i + offset));
                    ScenarioInput {
                        indices: vec![0, 1, 2, 0, 2, 3],
                        positions: vec![-5.0, -5.0, 0.0, 5.0, -5.0, 0.0, 5.0, 5.0, 0.0, -5.0, 5.0, 0.0],
                        coords,
                        triangulation,
                        start: Point3::new(0.2, -0.1, 1.0),
                        up: None,
                    }
                }
                Scenario::SpiralOnTetrahedron => {
                    let coords: Vec<f64> = (0..120)
                        .flat_map(|i| {
                            let t = f64::from(i);
                            let r = 0.12 * t.sqrt();
                            let a = t * 2.399_963_229_728_653;
                            [r * a.cos(), r * a.sin()]
                        })
                        .collect();
                    let triangulation = triangulate_points(&coords);
                    #[allow(clippy::cast_possible_truncation)]
                    let coords = coords.into_iter().map(|c| c as f32).collect();
                    ScenarioInput {
                        indices: vec![0, 1, 2, 0, 3, 1, 0, 2, 3, 1, 3, 2],
                        positions: vec![1.0, 1.0, 1.0, 1.0, -1.0, -1.0, -1.0, 1.0, -1.0, -1.0, -1.0, 1.0],
                        coords,
                        triangulation,
                        start: Point3::new(1.0, 1.0, -1.0),
                        up: None,
                    }
                }
            }
        }
    }

    /// `n` x `n` lattice starting at `origin` with two triangles per cell.
    #[allow(clippy::cast_precision_loss)]
    fn grid_points(n: u32, spacing: f32, origin: (f32, f32)) -> (Vec<f32>, Vec<u32>) {
        let mut coords = Vec::new();
        for j in 0..n {
            for i in 0..n {
                coords.extend([origin.0 + spacing * i as f32, origin.1 + spacing * j as f32]);
            }
        }
        let mut triangles = Vec::new();
        for j in 0..n - 1 {
            for i in 0..n - 1 {
                let a = j * n + i;
                let b = a + 1;
                let c = a + n;
                let d = c + 1;
                triangles.extend([a, b, d, a, d, c]);
            }
        }
        (coords, triangles)
    }

    fn cube_mesh() -> (Vec<u32>, Vec<f32>) {
        let indices = vec![
            0, 2, 1, 0, 3, 2, // bottom
            4, 5, 6, 4, 6, 7, // top
            0, 1, 5, 0, 5, 4, // front
            3, 7, 6, 3, 6, 2, // back
            0, 4, 7, 0, 7, 3, // left
            1, 2, 6, 1, 6, 5, // right
        ];
        let positions = vec![
            0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 1.0, 1.0,
        ];
        (indices, positions)
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next().ok_or_else(|| format!("missing value for {flag}"))
        }
    }
}
