use super::{Geometry, LatticeParams, NeighborTable, Slab};
use color_eyre::eyre::{eyre, Result};
use rand::prelude::*;
use rand::rngs::StdRng;
use tracing::{debug, info};

/// Counters for Metropolis trial moves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStatistics {
    /// Number of trial moves attempted
    pub attempts: u64,
    /// Number of trial moves accepted
    pub accepted: u64,
}

impl SweepStatistics {
    pub fn acceptance_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.accepted as f64 / self.attempts as f64
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Lattice gas of N atoms evolved by single-atom Metropolis moves
///
/// The occupation grid and the atom-position table are kept one-to-one:
/// `occupation[positions[a]]` is set for every atom `a`, and no other cell
/// is occupied.
#[derive(Debug, Clone)]
pub struct LatticeGas<G: Geometry> {
    geometry: G,
    pub params: LatticeParams,
    neighbors: NeighborTable,
    occupation: Vec<bool>,
    positions: Vec<usize>,
    seed: u64,
    rng: StdRng,
    pub stats: SweepStatistics,
}

impl<G: Geometry> LatticeGas<G> {
    /// Create a lattice gas with atoms placed at random
    ///
    /// Without a seed, one is drawn from the thread generator and kept, so
    /// the run can be repeated through [`LatticeGas::seed`].
    ///
    /// `params.n_atoms` must be smaller than the number of cells: placement
    /// and sweeps rejection-sample empty cells and never terminate otherwise.
    pub fn new(geometry: G, params: LatticeParams, seed: Option<u64>) -> Self {
        let mut gas = Self::empty(geometry, params, seed);
        gas.init_configuration();
        gas
    }

    /// Create a lattice gas from explicit atom cells, in atom-index order
    pub fn from_cells(
        geometry: G,
        params: LatticeParams,
        cells: &[usize],
        seed: Option<u64>,
    ) -> Result<Self> {
        if cells.len() != params.n_atoms {
            return Err(eyre!(
                "expected {} atom cells, got {}",
                params.n_atoms,
                cells.len()
            ));
        }
        let mut gas = Self::empty(geometry, params, seed);
        for (atom, &cell) in cells.iter().enumerate() {
            if cell >= gas.occupation.len() {
                return Err(eyre!("atom {} placed outside the grid (cell {})", atom, cell));
            }
            if gas.occupation[cell] {
                return Err(eyre!("atom {} placed on occupied cell {}", atom, cell));
            }
            gas.occupation[cell] = true;
            gas.positions.push(cell);
        }
        Ok(gas)
    }

    fn empty(geometry: G, params: LatticeParams, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        let n_cells = geometry.n_cells();
        let mut gas = Self {
            geometry,
            params,
            neighbors: NeighborTable::default(),
            occupation: vec![false; n_cells],
            positions: Vec::with_capacity(params.n_atoms),
            seed,
            rng: StdRng::seed_from_u64(seed),
            stats: SweepStatistics::default(),
        };
        gas.build_neighbor_table();
        gas
    }

    /// Seed the generator was built from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    /// Recompute the adjacency of every cell from the grid shape
    pub fn build_neighbor_table(&mut self) {
        self.neighbors = self.geometry.build_neighbor_table();
    }

    pub fn neighbor_table(&self) -> &NeighborTable {
        &self.neighbors
    }

    /// Place all atoms on distinct, uniformly random cells
    pub fn init_configuration(&mut self) {
        self.clear();
        while self.positions.len() < self.params.n_atoms {
            let cell = self.geometry.random_cell(&mut self.rng);
            self.place(cell);
        }
    }

    fn clear(&mut self) {
        self.occupation.fill(false);
        self.positions.clear();
    }

    /// Put the next atom on `cell` if it is empty
    fn place(&mut self, cell: usize) -> bool {
        if self.occupation[cell] {
            return false;
        }
        self.occupation[cell] = true;
        self.positions.push(cell);
        true
    }

    fn relocate(&mut self, atom: usize, cell: usize) {
        let old = self.positions[atom];
        self.occupation[old] = false;
        self.occupation[cell] = true;
        self.positions[atom] = cell;
    }

    pub fn n_atoms(&self) -> usize {
        self.positions.len()
    }

    /// Cell of every atom, in atom-index order
    pub fn atom_cells(&self) -> &[usize] {
        &self.positions
    }

    /// Grid coordinates of an atom
    pub fn atom_coordinates(&self, atom: usize) -> Vec<usize> {
        self.geometry.coordinates(self.positions[atom])
    }

    pub fn is_occupied(&self, cell: usize) -> bool {
        self.occupation[cell]
    }

    /// Number of occupied cells in the grid
    pub fn occupied_count(&self) -> usize {
        self.occupation.iter().filter(|&&o| o).count()
    }

    /// Number of occupied cells adjacent to `cell`
    pub fn neighbor_count(&self, cell: usize) -> usize {
        self.neighbors
            .neighbors(cell)
            .iter()
            .filter(|&&n| self.occupation[n])
            .count()
    }

    /// Total energy: half of J1 per occupied neighbor of every atom, plus J0
    /// for every atom on the substrate
    pub fn energy(&self) -> f64 {
        self.positions
            .iter()
            .map(|&cell| {
                let bonds = 0.5 * self.params.bond_energy * self.neighbor_count(cell) as f64;
                if self.geometry.on_substrate(cell) {
                    bonds + self.params.substrate_energy
                } else {
                    bonds
                }
            })
            .sum()
    }

    /// Average number of occupied neighbors per atom
    pub fn mean_neighbor_count(&self) -> f64 {
        if self.positions.is_empty() {
            return 0.0;
        }
        let total: usize = self
            .positions
            .iter()
            .map(|&cell| self.neighbor_count(cell))
            .sum();
        total as f64 / self.positions.len() as f64
    }

    /// One Metropolis trial move: relocate a random atom to a random empty cell
    pub fn sweep(&mut self) {
        if self.positions.is_empty() {
            return;
        }
        self.stats.attempts += 1;
        if self.attempt_move() {
            self.stats.accepted += 1;
        }
    }

    fn attempt_move(&mut self) -> bool {
        let atom = self.rng.gen_range(0..self.positions.len());
        let old_cell = self.positions[atom];
        let e_old = self.energy();

        let new_cell = loop {
            let cell = self.geometry.random_cell(&mut self.rng);
            if !self.occupation[cell] {
                break cell;
            }
        };
        self.relocate(atom, new_cell);

        let delta_e = self.energy() - e_old;
        if delta_e < self.params.acceptance_tolerance {
            return true;
        }

        if self.params.temperature <= 0.0 {
            self.relocate(atom, old_cell);
            return false;
        }

        let boltzmann = (-delta_e / (self.params.k_boltzmann * self.params.temperature)).exp();
        if self.rng.gen::<f64>() < boltzmann {
            true
        } else {
            self.relocate(atom, old_cell);
            false
        }
    }

    /// Run `steps` sweeps from a fresh random configuration
    pub fn thermalize(&mut self, steps: usize) {
        self.thermalize_with(steps, |_| {});
    }

    /// Run `steps` sweeps from a fresh random configuration, handing the
    /// energy before each sweep to `trace`
    pub fn thermalize_with<T: FnMut(f64)>(&mut self, steps: usize, trace: T) {
        self.init_configuration();
        self.run_sweeps(steps, trace);
    }

    fn run_sweeps<T: FnMut(f64)>(&mut self, steps: usize, mut trace: T) {
        info!(
            "Thermalizing {} atoms on {} cells for {} sweeps at T = {}",
            self.positions.len(),
            self.occupation.len(),
            steps,
            self.params.temperature
        );
        self.stats.reset();
        for _ in 0..steps {
            trace(self.energy());
            self.sweep();
        }
        debug!(
            "Thermalization accepted {} / {} moves ({:.2}%)",
            self.stats.accepted,
            self.stats.attempts,
            100.0 * self.stats.acceptance_rate()
        );
        info!("Thermalization finished, E = {:.8}", self.energy());
    }
}

impl LatticeGas<Slab> {
    /// Number of atoms on the substrate layer
    pub fn count_first_layer(&self) -> usize {
        self.positions
            .iter()
            .filter(|&&cell| self.geometry.layer_of(cell) == 0)
            .count()
    }

    /// Place atoms layer by layer from the substrate up, at random cells
    /// within each layer
    pub fn init_configuration_first_layer(&mut self) {
        self.clear();
        let layer_size = self.geometry.layer_size();
        while self.positions.len() < self.params.n_atoms {
            let layer = self.positions.len() / layer_size;
            let i = self.rng.gen_range(0..self.geometry.lx);
            let j = self.rng.gen_range(0..self.geometry.ly);
            let cell = self.geometry.index(i, j, layer);
            self.place(cell);
        }
    }

    /// Run `steps` sweeps starting from a layer-by-layer configuration
    pub fn thermalize_first_layer(&mut self, steps: usize) {
        self.thermalize_first_layer_with(steps, |_| {});
    }

    pub fn thermalize_first_layer_with<T: FnMut(f64)>(&mut self, steps: usize, trace: T) {
        self.init_configuration_first_layer();
        self.run_sweeps(steps, trace);
    }
}
