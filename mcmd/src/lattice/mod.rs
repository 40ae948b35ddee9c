//! Lattice-gas Metropolis Monte Carlo
//!
//! Atoms occupy the cells of a discrete grid, at most one atom per cell, and
//! interact only through nearest-neighbor bonds. Two grid shapes are provided:
//! a periodic square torus ([`Square`]) and a slab that is periodic in x and y
//! but open along z ([`Slab`]). Both plug into the same [`LatticeGas`] engine
//! through the [`Geometry`] trait.

pub mod metropolis;
pub mod slab;
pub mod square;

pub use metropolis::{LatticeGas, SweepStatistics};
pub use slab::Slab;
pub use square::Square;

use rand::Rng;

/// Boltzmann constant in eV/K, the default for lattice runs
pub const BOLTZMANN_EV: f64 = 0.00008618460742911316;

/// Energy increases below this are accepted as if they were non-positive
pub const DEFAULT_ACCEPTANCE_TOLERANCE: f64 = 1e-8;

/// Adjacency of every grid cell
///
/// Fixed for the lifetime of a grid: it only depends on the grid shape and
/// its boundary rule, never on which cells are occupied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NeighborTable {
    cells: Vec<Vec<usize>>,
}

impl NeighborTable {
    pub fn from_lists(cells: Vec<Vec<usize>>) -> Self {
        Self { cells }
    }

    /// Adjacent cells of `cell`
    pub fn neighbors(&self, cell: usize) -> &[usize] {
        &self.cells[cell]
    }

    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }
}

/// Shape and boundary rule of a lattice
pub trait Geometry {
    /// Number of spatial dimensions
    fn dimension(&self) -> usize;

    /// Total number of cells in the grid
    fn n_cells(&self) -> usize;

    /// Integer grid coordinates of a cell
    fn coordinates(&self, cell: usize) -> Vec<usize>;

    /// Cell index for grid coordinates, `None` when outside the grid
    fn cell_index(&self, coords: &[usize]) -> Option<usize>;

    /// Compute the adjacent cells of every cell under the boundary rule
    fn build_neighbor_table(&self) -> NeighborTable;

    /// Draw a uniformly random cell, one uniform draw per axis
    fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> usize;

    /// Whether `cell` sits on the substrate layer
    fn on_substrate(&self, _cell: usize) -> bool {
        false
    }
}

/// Physical parameters of a lattice-gas run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeParams {
    /// Number of atoms N
    pub n_atoms: usize,
    /// Bond energy J1 per occupied neighbor pair
    pub bond_energy: f64,
    /// Energy J0 of an atom sitting on the substrate layer
    pub substrate_energy: f64,
    /// Boltzmann constant k_B
    pub k_boltzmann: f64,
    /// Temperature T
    pub temperature: f64,
    /// Energy increases below this count as non-positive in the acceptance test
    pub acceptance_tolerance: f64,
}

impl LatticeParams {
    pub fn new(n_atoms: usize, bond_energy: f64, temperature: f64) -> Self {
        Self {
            n_atoms,
            bond_energy,
            substrate_energy: 0.0,
            k_boltzmann: BOLTZMANN_EV,
            temperature,
            acceptance_tolerance: DEFAULT_ACCEPTANCE_TOLERANCE,
        }
    }

    pub fn with_substrate_energy(mut self, substrate_energy: f64) -> Self {
        self.substrate_energy = substrate_energy;
        self
    }

    pub fn with_k_boltzmann(mut self, k_boltzmann: f64) -> Self {
        self.k_boltzmann = k_boltzmann;
        self
    }

    pub fn with_acceptance_tolerance(mut self, tolerance: f64) -> Self {
        self.acceptance_tolerance = tolerance;
        self
    }
}

#[cfg(test)]
mod tests;
