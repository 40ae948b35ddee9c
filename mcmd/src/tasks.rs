//! Drivers running a configured task and writing its data files

use crate::config::{GeometryConfig, LatticeConfig, LatticeStart, MdRunConfig};
use crate::io::{create_data_file, format_sci, write_lattice_configuration, write_positions, write_row};
use crate::lattice::{Geometry, LatticeGas, Slab, Square};
use crate::md::MdSystem;
use color_eyre::eyre::Result;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub const LATTICE_SEED_FILE: &str = "lattice_seed.dat";
pub const LATTICE_THERMALIZATION_FILE: &str = "lattice_thermalization.dat";
pub const LATTICE_PRODUCTION_FILE: &str = "lattice_production.dat";
pub const LATTICE_CONFIGURATION_FILE: &str = "lattice_configuration.dat";
pub const MD_SEED_FILE: &str = "md_seed.dat";
pub const MD_POTENTIAL_FILE: &str = "md_potential.dat";
pub const MD_DESCENT_FILE: &str = "md_steepest_descent.dat";
pub const MD_THERMALIZATION_FILE: &str = "md_thermalization.dat";
pub const MD_PRODUCTION_FILE: &str = "md_production.dat";
pub const MD_FINAL_POSITIONS_FILE: &str = "md_final_positions.dat";

/// Final state of a lattice run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeSummary {
    /// Seed of the run, drawn at random when none was configured
    pub seed: u64,
    pub energy: f64,
    pub mean_neighbor_count: f64,
    pub acceptance_rate: f64,
}

/// Final state of an MD run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MdSummary {
    pub seed: u64,
    pub total_energy: f64,
    pub temperature: f64,
    pub descent_iterations: Option<usize>,
}

/// Thermalize, then record `E  <n>` (plus the substrate count on a slab)
/// before every production sweep
pub fn run_lattice(config: &LatticeConfig, dir: &Path) -> Result<LatticeSummary> {
    info!("#####################################################");
    info!("---------- Lattice-gas Monte Carlo ----------");
    info!("#####################################################");
    let params = config.params();

    match config.geometry {
        GeometryConfig::Square { lx, ly } => {
            let mut gas = LatticeGas::new(Square::new(lx, ly), params, config.seed);
            let mut trace = Vec::with_capacity(config.thermalization_sweeps);
            gas.thermalize_with(config.thermalization_sweeps, |e| trace.push(e));
            finish_lattice_run(&mut gas, config, dir, &trace, |_| None)
        }
        GeometryConfig::Slab { lx, ly, lz } => {
            let mut gas = LatticeGas::new(Slab::new(lx, ly, lz), params, config.seed);
            let mut trace = Vec::with_capacity(config.thermalization_sweeps);
            match config.start {
                LatticeStart::Random => {
                    gas.thermalize_with(config.thermalization_sweeps, |e| trace.push(e))
                }
                LatticeStart::FirstLayer => {
                    gas.thermalize_first_layer_with(config.thermalization_sweeps, |e| trace.push(e))
                }
            }
            finish_lattice_run(&mut gas, config, dir, &trace, |g| Some(g.count_first_layer()))
        }
    }
}

fn finish_lattice_run<G, C>(
    gas: &mut LatticeGas<G>,
    config: &LatticeConfig,
    dir: &Path,
    thermalization: &[f64],
    layer_count: C,
) -> Result<LatticeSummary>
where
    G: Geometry,
    C: Fn(&LatticeGas<G>) -> Option<usize>,
{
    record_seed(dir, LATTICE_SEED_FILE, gas.seed())?;

    let mut file = create_data_file(dir, LATTICE_THERMALIZATION_FILE)?;
    for &e in thermalization {
        write_row(&mut file, &[e])?;
    }
    file.flush()?;

    info!("Production run: {} sweeps", config.production_sweeps);
    gas.stats.reset();
    let mut file = create_data_file(dir, LATTICE_PRODUCTION_FILE)?;
    for _ in 0..config.production_sweeps {
        let (e, n) = (gas.energy(), gas.mean_neighbor_count());
        match layer_count(&*gas) {
            Some(count) => writeln!(file, "{} {} {}", format_sci(e), format_sci(n), count)?,
            None => write_row(&mut file, &[e, n])?,
        }
        gas.sweep();
    }
    file.flush()?;

    let mut file = create_data_file(dir, LATTICE_CONFIGURATION_FILE)?;
    write_lattice_configuration(&mut file, &*gas)?;
    file.flush()?;

    let summary = LatticeSummary {
        seed: gas.seed(),
        energy: gas.energy(),
        mean_neighbor_count: gas.mean_neighbor_count(),
        acceptance_rate: gas.stats.acceptance_rate(),
    };
    info!(
        "Lattice run finished: E = {:.8}, <n> = {:.4}, acceptance {:.2}%",
        summary.energy,
        summary.mean_neighbor_count,
        100.0 * summary.acceptance_rate
    );
    Ok(summary)
}

/// Optionally relax, then thermalize and record a production trajectory
pub fn run_md(config: &MdRunConfig, dir: &Path) -> Result<MdSummary> {
    info!("#####################################################");
    info!("---------- Molecular dynamics ----------");
    info!("#####################################################");

    let positions = config.generate_positions()?;
    let mut system = MdSystem::new(
        positions,
        config.potential(),
        config.sim_box(),
        config.params(),
        config.seed,
    );
    info!("Loaded {} atoms", system.n_atoms());
    record_seed(dir, MD_SEED_FILE, system.seed())?;
    if let Some(d) = system.nearest_neighbor_distance() {
        info!("Nearest-neighbor distance: {:.8}", d);
    }
    info!(
        "Initial potential energy: {:.8} ({:.8} per atom)",
        system.potential_energy(),
        system.potential_energy() / system.n_atoms() as f64
    );

    if let Some(table) = &config.potential_table {
        let mut file = create_data_file(dir, MD_POTENTIAL_FILE)?;
        for (r, v) in system.provider().tabulate(table.start, table.step) {
            write_row(&mut file, &[r, v])?;
        }
        file.flush()?;
    }

    let descent_iterations = match &config.steepest_descent {
        Some(sd) => {
            let mut trace = Vec::new();
            let iterations = system.steepest_descent_with(
                sd.force_tolerance,
                sd.step_coefficient,
                |s| trace.push(s),
            );
            let mut file = create_data_file(dir, MD_DESCENT_FILE)?;
            for s in &trace {
                write_row(&mut file, &[s.max_force, s.potential_energy])?;
            }
            file.flush()?;
            Some(iterations)
        }
        None => None,
    };

    let mut trace = Vec::new();
    system.thermalize_with(
        config.thermalization_time,
        config.initial_temperature,
        config.velocity_seed,
        |s| trace.push(s),
    );
    let mut file = create_data_file(dir, MD_THERMALIZATION_FILE)?;
    for s in &trace {
        write_row(&mut file, &[s.time, s.total_energy, s.temperature])?;
    }
    file.flush()?;

    info!(
        "Production run: t = {} with {:?}",
        config.total_time, config.integrator
    );
    let mut trace = Vec::new();
    system.evolve_with(config.total_time, config.integrator, |s| trace.push(s));
    let mut file = create_data_file(dir, MD_PRODUCTION_FILE)?;
    for s in &trace {
        write_row(&mut file, &[s.time, s.total_energy, s.temperature])?;
    }
    file.flush()?;

    let mut file = create_data_file(dir, MD_FINAL_POSITIONS_FILE)?;
    write_positions(&mut file, &system.positions)?;
    file.flush()?;

    let l = system.angular_momentum();
    let v_cm = system.center_of_mass_velocity();
    info!("Angular momentum: [{:.6e}, {:.6e}, {:.6e}]", l.x, l.y, l.z);
    info!("Center-of-mass velocity: [{:.6e}, {:.6e}, {:.6e}]", v_cm.x, v_cm.y, v_cm.z);

    let summary = MdSummary {
        seed: system.seed(),
        total_energy: system.total_energy(),
        temperature: system.temperature(),
        descent_iterations,
    };
    info!(
        "MD run finished: E = {:.8}, T = {:.6}",
        summary.total_energy, summary.temperature
    );
    Ok(summary)
}

/// Log the run seed and write it to `name`, so the run can be repeated
fn record_seed(dir: &Path, name: &str, seed: u64) -> Result<()> {
    info!("Random seed: {}", seed);
    let mut file = create_data_file(dir, name)?;
    writeln!(file, "{}", seed)?;
    file.flush()?;
    Ok(())
}
