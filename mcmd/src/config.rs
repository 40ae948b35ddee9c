use crate::io::load_positions;
use crate::lattice::{Geometry, LatticeParams, Slab, Square, BOLTZMANN_EV, DEFAULT_ACCEPTANCE_TOLERANCE};
use crate::md::{MdParams, Scheme, SimulationBox, SmoothedLennardJones};
use color_eyre::eyre::{eyre, Result, WrapErr};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration of a simulation run
///
/// Either task may be left out; the driver runs the ones present.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RunConfig {
    /// Lattice-gas Monte Carlo task
    pub lattice: Option<LatticeConfig>,
    /// Molecular dynamics task
    pub molecular_dynamics: Option<MdRunConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Lattice-gas Monte Carlo parameters
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LatticeConfig {
    pub geometry: GeometryConfig,
    /// Number of atoms N
    pub n_atoms: usize,
    /// Bond energy J1 per occupied neighbor pair
    pub bond_energy: f64,
    /// Energy J0 of a substrate atom (slab only)
    #[serde(default)]
    pub substrate_energy: f64,
    /// Boltzmann constant (default: eV/K)
    #[serde(default = "default_lattice_kb")]
    pub k_boltzmann: f64,
    pub temperature: f64,
    pub thermalization_sweeps: usize,
    pub production_sweeps: usize,
    /// Random seed; drawn from entropy when absent
    pub seed: Option<u64>,
    #[serde(default = "default_acceptance_tolerance")]
    pub acceptance_tolerance: f64,
    #[serde(default)]
    pub start: LatticeStart,
}

/// Grid shape
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(tag = "type")]
pub enum GeometryConfig {
    /// LX × LY torus
    #[serde(rename = "square")]
    Square { lx: usize, ly: usize },
    /// LX × LY × LZ slab, open along z
    #[serde(rename = "slab")]
    Slab { lx: usize, ly: usize, lz: usize },
}

/// Initial configuration before thermalization
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LatticeStart {
    #[default]
    Random,
    /// Fill the slab layer by layer from the substrate up
    FirstLayer,
}

/// Molecular dynamics parameters
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MdRunConfig {
    pub positions: PositionConfig,
    pub potential: PotentialConfig,
    /// Mass M shared by every atom
    pub mass: f64,
    /// Boltzmann constant (default: 1.0 for reduced units)
    #[serde(default = "default_md_kb")]
    pub k_boltzmann: f64,
    pub box_setup: BoxConfig,
    pub time_step: f64,
    pub initial_temperature: f64,
    /// Seed of the velocity draw; `null` draws from the run generator
    #[serde(default = "default_velocity_seed")]
    pub velocity_seed: Option<u64>,
    /// Seed of the run generator; entropy when absent
    pub seed: Option<u64>,
    pub thermalization_time: f64,
    pub total_time: f64,
    #[serde(default)]
    pub integrator: Scheme,
    /// Relax the loaded structure before thermalizing
    pub steepest_descent: Option<SteepestDescentConfig>,
    /// Sample the pair potential to a data file
    pub potential_table: Option<PotentialTableConfig>,
}

/// Position configuration options
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(tag = "type")]
pub enum PositionConfig {
    /// Whitespace-separated `x y z` rows
    #[serde(rename = "file")]
    File {
        path: PathBuf,
        /// Expected number of rows
        n_atoms: Option<usize>,
    },
    /// Explicit list of positions
    #[serde(rename = "explicit")]
    Explicit { coords: Vec<[f64; 3]> },
    /// Generate simple cubic lattice
    #[serde(rename = "cubic_lattice")]
    CubicLattice {
        /// Number of atoms per side
        n_per_side: usize,
        /// Lattice spacing
        spacing: f64,
        /// Optional offset from origin
        offset: Option<[f64; 3]>,
    },
}

/// Smoothed Lennard-Jones parameters
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct PotentialConfig {
    /// Well depth parameter ε
    pub epsilon: f64,
    /// Collision diameter σ
    pub sigma: f64,
    /// Cutoff distance RC (default: 2.5σ in reduced units)
    #[serde(default = "default_lj_cutoff")]
    pub cutoff: f64,
    /// Start RP of the smoothing polynomial; RP >= RC cuts sharply
    pub smoothing_start: f64,
}

/// Simulation box configuration
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct BoxConfig {
    /// Box lengths [x, y, z]
    pub lengths: [f64; 3],
    /// Periodic boundary per axis
    #[serde(default = "default_periodic")]
    pub periodic: [bool; 3],
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct SteepestDescentConfig {
    #[serde(default = "default_force_tolerance")]
    pub force_tolerance: f64,
    pub step_coefficient: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct PotentialTableConfig {
    /// First sampled separation
    pub start: f64,
    #[serde(default = "default_table_step")]
    pub step: f64,
}

/// Output configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OutputConfig {
    /// Directory receiving the data files
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

// Default value functions
fn default_lattice_kb() -> f64 {
    BOLTZMANN_EV
}
fn default_acceptance_tolerance() -> f64 {
    DEFAULT_ACCEPTANCE_TOLERANCE
}
fn default_md_kb() -> f64 {
    1.0
}
fn default_velocity_seed() -> Option<u64> {
    Some(3122000)
}
fn default_lj_cutoff() -> f64 {
    2.5
}
fn default_periodic() -> [bool; 3] {
    [true; 3]
}
fn default_force_tolerance() -> f64 {
    1e-8
}
fn default_table_step() -> f64 {
    1e-4
}
fn default_output_directory() -> PathBuf {
    PathBuf::from(".")
}

impl RunConfig {
    /// Load and validate configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("Unable to read configuration file: {}", path.display()))?;
        let config: RunConfig =
            serde_yaml::from_str(&content).wrap_err("Failed to parse configuration file")?;
        config
            .validate()
            .map_err(|e| eyre!("Invalid configuration: {}", e))?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if let Some(lattice) = &self.lattice {
            lattice.validate()?;
        }
        if let Some(md) = &self.molecular_dynamics {
            md.validate()?;
        }
        Ok(())
    }

    /// Replace the seed of every task
    pub fn override_seed(&mut self, seed: u64) {
        if let Some(lattice) = &mut self.lattice {
            lattice.seed = Some(seed);
        }
        if let Some(md) = &mut self.molecular_dynamics {
            md.seed = Some(seed);
        }
    }
}

impl GeometryConfig {
    pub fn n_cells(&self) -> usize {
        match *self {
            GeometryConfig::Square { lx, ly } => Square::new(lx, ly).n_cells(),
            GeometryConfig::Slab { lx, ly, lz } => Slab::new(lx, ly, lz).n_cells(),
        }
    }
}

impl LatticeConfig {
    pub fn validate(&self) -> Result<(), String> {
        let sizes_positive = match self.geometry {
            GeometryConfig::Square { lx, ly } => lx > 0 && ly > 0,
            GeometryConfig::Slab { lx, ly, lz } => lx > 0 && ly > 0 && lz > 0,
        };
        if !sizes_positive {
            return Err("Lattice sizes must be positive".to_string());
        }

        // sweeps rejection-sample an empty cell
        let n_cells = self.geometry.n_cells();
        if self.n_atoms >= n_cells {
            return Err(format!(
                "Number of atoms ({}) must be smaller than the number of cells ({})",
                self.n_atoms, n_cells
            ));
        }

        if self.k_boltzmann <= 0.0 {
            return Err("Boltzmann constant must be positive".to_string());
        }
        if self.acceptance_tolerance < 0.0 {
            return Err("Acceptance tolerance must not be negative".to_string());
        }
        if self.start == LatticeStart::FirstLayer && !matches!(self.geometry, GeometryConfig::Slab { .. }) {
            return Err("First-layer start requires a slab geometry".to_string());
        }
        Ok(())
    }

    pub fn params(&self) -> LatticeParams {
        LatticeParams::new(self.n_atoms, self.bond_energy, self.temperature)
            .with_substrate_energy(self.substrate_energy)
            .with_k_boltzmann(self.k_boltzmann)
            .with_acceptance_tolerance(self.acceptance_tolerance)
    }
}

impl MdRunConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.time_step <= 0.0 {
            return Err("Time step must be positive".to_string());
        }
        if self.mass <= 0.0 {
            return Err("Mass must be positive".to_string());
        }
        if self.k_boltzmann <= 0.0 {
            return Err("Boltzmann constant must be positive".to_string());
        }
        if self.initial_temperature < 0.0 {
            return Err("Initial temperature must not be negative".to_string());
        }

        let p = &self.potential;
        if p.epsilon <= 0.0 {
            return Err("LJ epsilon must be positive".to_string());
        }
        if p.sigma <= 0.0 {
            return Err("LJ sigma must be positive".to_string());
        }
        if p.cutoff <= 0.0 {
            return Err("LJ cutoff must be positive".to_string());
        }
        if p.smoothing_start <= 0.0 {
            return Err("Smoothing start must be positive".to_string());
        }
        if p.smoothing_start == p.cutoff {
            return Err("Smoothing start must differ from the cutoff".to_string());
        }

        for &length in &self.box_setup.lengths {
            if length <= 0.0 {
                return Err("Box lengths must be positive".to_string());
            }
        }

        match &self.positions {
            PositionConfig::CubicLattice {
                n_per_side,
                spacing,
                ..
            } => {
                if *n_per_side == 0 {
                    return Err("Cubic lattice needs at least one atom per side".to_string());
                }
                if *spacing <= 0.0 {
                    return Err("Lattice spacing must be positive".to_string());
                }
            }
            PositionConfig::Explicit { coords } if coords.is_empty() => {
                return Err("Explicit positions must not be empty".to_string());
            }
            _ => {}
        }

        if let Some(table) = &self.potential_table {
            if table.start <= 0.0 || table.step <= 0.0 {
                return Err("Potential table start and step must be positive".to_string());
            }
        }

        if let Some(sd) = &self.steepest_descent {
            if sd.step_coefficient <= 0.0 {
                return Err("Steepest-descent step coefficient must be positive".to_string());
            }
            if sd.force_tolerance <= 0.0 {
                return Err("Steepest-descent force tolerance must be positive".to_string());
            }
        }
        Ok(())
    }

    /// Generate positions based on configuration
    pub fn generate_positions(&self) -> Result<Vec<Vector3<f64>>> {
        match &self.positions {
            PositionConfig::File { path, n_atoms } => load_positions(path, *n_atoms),
            PositionConfig::Explicit { coords } => Ok(coords.iter().map(|&c| Vector3::from(c)).collect()),
            PositionConfig::CubicLattice {
                n_per_side,
                spacing,
                offset,
            } => {
                let offset = Vector3::from(offset.unwrap_or([0.0; 3]));
                let n = *n_per_side;
                let mut positions = Vec::with_capacity(n * n * n);
                for i in 0..n {
                    for j in 0..n {
                        for k in 0..n {
                            positions.push(offset + Vector3::new(i as f64, j as f64, k as f64) * *spacing);
                        }
                    }
                }
                Ok(positions)
            }
        }
    }

    pub fn potential(&self) -> SmoothedLennardJones {
        let p = &self.potential;
        SmoothedLennardJones::new(p.epsilon, p.sigma, p.cutoff, p.smoothing_start)
    }

    pub fn sim_box(&self) -> SimulationBox {
        SimulationBox::new(Vector3::from(self.box_setup.lengths), self.box_setup.periodic)
    }

    pub fn params(&self) -> MdParams {
        MdParams {
            mass: self.mass,
            k_b: self.k_boltzmann,
            time_step: self.time_step,
        }
    }
}
