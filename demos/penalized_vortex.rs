//! Penalizes a 2D vortex against a rigid disc and accumulates the resulting vorticity.
//!
//! ```text
//! cargo run --release --example penalized_vortex -- --size 256 --threads 4
//! ```

use clap::{arg, value_parser, Command};
use eulerian::prelude::*;
use eyre::{eyre, Context as _};
use std::f64::consts::PI;
use std::path::PathBuf;

/// Circulation of the Lamb-Oseen vortex.
const CIRCULATION: f64 = 1.0;
/// Core radius of the vortex.
const CORE: f64 = 0.1;
/// Radius of the solid disc.
const DISC_RADIUS: f64 = 0.15;

/// Spacing of a grid of `size` cells spanning the unit interval. At least one interior
/// cell is needed for the vorticity stencil.
fn grid_spacing(size: usize) -> eyre::Result<f64> {
    if size < 3 {
        return Err(eyre!("grid needs at least 3 cells per axis, got {size}"));
    }

    Ok(1.0 / (size - 1) as f64)
}

fn main() -> eyre::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .parse_default_env()
        .init();

    let matches = Command::new("penalized_vortex")
        .about("Penalizes a vortex against a solid disc on a uniform 2D grid")
        .arg(
            arg!(-c --config <PATH> "Kernel configuration (toml)")
                .value_parser(value_parser!(PathBuf))
                .required(false),
        )
        .arg(
            arg!(-n --size <CELLS> "Grid cells along each axis, including ghost cells")
                .value_parser(value_parser!(usize))
                .required(false)
                .default_value("128"),
        )
        .arg(
            arg!(-t --threads <COUNT> "Worker threads for each sweep")
                .value_parser(value_parser!(usize))
                .required(false),
        )
        .arg(
            arg!(--penalty <FACTOR> "Penalty factor times time step")
                .value_parser(value_parser!(f64))
                .required(false)
                .default_value("1e4"),
        )
        .get_matches();

    let size = *matches.get_one::<usize>("size").unwrap_or(&128);
    let penalty = *matches.get_one::<f64>("penalty").unwrap_or(&1e4);
    let spacing = grid_spacing(size)?;
    let shape = [size, size];

    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => KernelConfig::import_toml(path)
            .wrap_err_with(|| format!("failed to load kernel config {}", path.display()))?,
        None => {
            let mut config = KernelConfig::new(Precision::Double, 2).with_fixed_extents(shape);
            config.threads = matches.get_one::<usize>("threads").copied();
            config
        }
    };

    log::info!("Generating kernels for {:?}", config);

    let char_func_kernel = CharFuncFromLevelSet2d::<f64>::generate(&config, 2.0 * spacing)?;
    let vorticity_kernel = UpdateVorticityFromPenalizedVelocity2d::<f64>::generate(&config)?;

    let position = |[i, j]: [usize; 2]| [i as f64 * spacing, j as f64 * spacing];

    // Positive inside the disc.
    let level_set = Field::from_fn(shape, |index| {
        let [x, y] = position(index);
        DISC_RADIUS - ((x - 0.5).powi(2) + (y - 0.5).powi(2)).sqrt()
    });

    let velocity = VectorField::from_fn(shape, |component, index| {
        let [x, y] = position(index);
        let (dx, dy) = (x - 0.3, y - 0.5);
        let radius2 = (dx * dx + dy * dy).max(f64::EPSILON);
        let swirl = CIRCULATION / (2.0 * PI * radius2) * (1.0 - (-radius2 / (CORE * CORE)).exp());

        match component {
            0 => -swirl * dy,
            _ => swirl * dx,
        }
    });

    let mut char_func = Field::zeros(shape);
    char_func_kernel.apply(char_func.view_mut(), level_set.view())?;

    let solid_cells = char_func.storage().iter().filter(|&&chi| chi > 0.5).count();
    log::info!("Disc covers {solid_cells} cells");

    // Implicit Brinkman penalization towards a body at rest.
    let penalized = VectorField::from_fn(shape, |component, index| {
        velocity.component(component).get(index) / (1.0 + penalty * char_func[index])
    });

    let mut vorticity = Field::zeros(shape);
    vorticity_kernel.apply(
        vorticity.view_mut(),
        penalized.view(),
        velocity.view(),
        0.5 / spacing,
    )?;

    let area = spacing * spacing;
    let circulation: f64 = vorticity.storage().iter().map(|omega| omega * area).sum();
    let peak = vorticity
        .storage()
        .iter()
        .fold(0.0f64, |peak, omega| peak.max(omega.abs()));

    log::info!("Penalization vorticity: circulation {circulation:.6e}, peak {peak:.6e}");

    Ok(())
}
