use crate::md::neighbor_list::{nearest_neighbor_distance, NeighborList};
use crate::md::system::SimulationBox;
use itertools::izip;
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub trait ForceProvider {
    /// Interaction range; neighbor lists are built with this cutoff
    fn cutoff(&self) -> f64;

    /// Potential energy summed over the neighbor lists, each pair once
    fn potential_energy(
        &self,
        positions: &[Vector3<f64>],
        neighbors: &NeighborList,
        sim_box: &SimulationBox,
    ) -> f64;

    /// Force on every atom from the atoms in its neighbor list
    fn compute_forces(
        &self,
        positions: &[Vector3<f64>],
        neighbors: &NeighborList,
        sim_box: &SimulationBox,
    ) -> Vec<Vector3<f64>>;
}

/// Time-stepping scheme for production runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scheme {
    #[default]
    VelocityVerlet,
    Euler,
}

/// Constants of an MD run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MdParams {
    /// Mass M shared by every atom
    pub mass: f64,
    /// Boltzmann constant k_B
    pub k_b: f64,
    /// Time step DT
    pub time_step: f64,
}

/// One recorded point of a trajectory
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MdSample {
    pub time: f64,
    pub total_energy: f64,
    pub temperature: f64,
}

/// One recorded point of a steepest-descent relaxation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DescentSample {
    pub max_force: f64,
    pub potential_energy: f64,
}

/// Atoms with continuous positions evolved under a pair potential
///
/// Forces and neighbor lists always describe the current positions: every
/// operation that moves atoms rebuilds both before returning.
pub struct MdSystem<F: ForceProvider> {
    pub positions: Vec<Vector3<f64>>,
    pub velocities: Vec<Vector3<f64>>,
    pub forces: Vec<Vector3<f64>>,
    pub params: MdParams,
    pub sim_box: SimulationBox,
    neighbors: NeighborList,
    pub(crate) provider: F,
    seed: u64,
    rng: StdRng,
}

impl<F: ForceProvider> MdSystem<F> {
    /// Build a system at rest and evaluate its neighbor lists and forces
    ///
    /// Without a seed, one is drawn from the thread generator and kept for
    /// [`MdSystem::seed`].
    pub fn new(
        positions: Vec<Vector3<f64>>,
        provider: F,
        sim_box: SimulationBox,
        params: MdParams,
        seed: Option<u64>,
    ) -> Self {
        let n = positions.len();
        let seed = seed.unwrap_or_else(rand::random);
        let mut system = MdSystem {
            positions,
            velocities: vec![Vector3::zeros(); n],
            forces: vec![Vector3::zeros(); n],
            params,
            sim_box,
            neighbors: NeighborList::new(provider.cutoff()),
            provider,
            seed,
            rng: StdRng::seed_from_u64(seed),
        };
        system.refresh_forces();
        system
    }

    /// Seed of the run generator
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn n_atoms(&self) -> usize {
        self.positions.len()
    }

    pub fn provider(&self) -> &F {
        &self.provider
    }

    pub fn neighbors(&self) -> &NeighborList {
        &self.neighbors
    }

    /// Rebuild the neighbor lists from the current positions
    pub fn rebuild_neighbors(&mut self) {
        self.neighbors.rebuild(&self.positions, &self.sim_box);
    }

    /// Rebuild the neighbor lists, then overwrite every force
    pub fn refresh_forces(&mut self) {
        self.rebuild_neighbors();
        self.forces = self
            .provider
            .compute_forces(&self.positions, &self.neighbors, &self.sim_box);
    }

    pub fn potential_energy(&self) -> f64 {
        self.provider
            .potential_energy(&self.positions, &self.neighbors, &self.sim_box)
    }

    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.params.mass * self.velocities.iter().map(|v| v.norm_squared()).sum::<f64>()
    }

    pub fn total_energy(&self) -> f64 {
        self.kinetic_energy() + self.potential_energy()
    }

    /// Instantaneous temperature `2K / (3 N k_B)`
    pub fn temperature(&self) -> f64 {
        2.0 * self.kinetic_energy() / (3.0 * self.n_atoms() as f64 * self.params.k_b)
    }

    /// Total angular momentum about the origin
    pub fn angular_momentum(&self) -> Vector3<f64> {
        self.positions
            .iter()
            .zip(&self.velocities)
            .map(|(r, v)| r.cross(v))
            .sum::<Vector3<f64>>()
            * self.params.mass
    }

    pub fn total_momentum(&self) -> Vector3<f64> {
        self.velocities.iter().sum::<Vector3<f64>>() * self.params.mass
    }

    /// Mean velocity `Σv / N`
    ///
    /// This is the velocity of the center of mass, not the summed velocity;
    /// the sum is `total_momentum() / mass`.
    pub fn center_of_mass_velocity(&self) -> Vector3<f64> {
        if self.velocities.is_empty() {
            return Vector3::zeros();
        }
        self.velocities.iter().sum::<Vector3<f64>>() / self.n_atoms() as f64
    }

    /// Largest force magnitude over all atoms
    pub fn max_force_magnitude(&self) -> f64 {
        self.forces.iter().map(|f| f.norm()).fold(0.0, f64::max)
    }

    pub fn nearest_neighbor_distance(&self) -> Option<f64> {
        nearest_neighbor_distance(&self.positions, &self.sim_box)
    }

    /// Draw velocities at exactly `target_temperature` with zero net momentum
    ///
    /// Each component is uniform in `[-c, c)` with `c = sqrt(3 k_B T / M)`,
    /// drawn as all x components, then all y, then all z. With `Some(seed)`
    /// the draws come from a fresh generator seeded with `seed`, leaving the
    /// system generator untouched; with `None` they come from the system
    /// generator.
    pub fn generate_initial_velocities(&mut self, target_temperature: f64, seed: Option<u64>) {
        let n = self.n_atoms();
        if n == 0 {
            return;
        }
        let uniform = Uniform::new(0.0, 1.0);
        let draws: Vec<f64> = match seed {
            Some(seed) => uniform
                .sample_iter(StdRng::seed_from_u64(seed))
                .take(3 * n)
                .collect(),
            None => uniform.sample_iter(&mut self.rng).take(3 * n).collect(),
        };

        let c = (3.0 * self.params.k_b * target_temperature / self.params.mass).sqrt();
        for (i, v) in self.velocities.iter_mut().enumerate() {
            *v = Vector3::new(draws[i], draws[i + n], draws[i + 2 * n]).map(|r| 2.0 * c * (r - 0.5));
        }

        let v_cm = self.center_of_mass_velocity();
        for v in &mut self.velocities {
            *v -= v_cm;
        }

        let current = self.temperature();
        if current > 0.0 {
            let scale = (target_temperature / current).sqrt();
            for v in &mut self.velocities {
                *v *= scale;
            }
        }
    }

    /// Advance one velocity-Verlet step
    ///
    /// Positions move first, then forces are recomputed at the new
    /// positions, then velocities take the mean of old and new forces.
    pub fn velocity_verlet_step(&mut self) {
        let dt = self.params.time_step;
        let inv_2m = 1.0 / (2.0 * self.params.mass);
        let old_forces = self.forces.clone();

        for (x, &v, &f) in izip!(&mut self.positions, &self.velocities, &self.forces) {
            *x += v * dt + f * (dt * dt * inv_2m);
        }

        self.refresh_forces();

        for (v, &f_new, &f_old) in izip!(&mut self.velocities, &self.forces, &old_forces) {
            *v += (f_new + f_old) * (dt * inv_2m);
        }
    }

    /// Advance one explicit Euler step
    pub fn euler_step(&mut self) {
        let dt = self.params.time_step;
        let inv_m = 1.0 / self.params.mass;

        for (x, v, &f) in izip!(&mut self.positions, &mut self.velocities, &self.forces) {
            *x += *v * dt;
            *v += f * (dt * inv_m);
        }

        self.refresh_forces();
    }

    pub fn step(&mut self, scheme: Scheme) {
        match scheme {
            Scheme::VelocityVerlet => self.velocity_verlet_step(),
            Scheme::Euler => self.euler_step(),
        }
    }

    fn sample(&self, time: f64) -> MdSample {
        MdSample {
            time,
            total_energy: self.total_energy(),
            temperature: self.temperature(),
        }
    }

    /// Draw velocities at `initial_temperature` and run velocity Verlet for
    /// `duration` of simulated time
    pub fn thermalize(&mut self, duration: f64, initial_temperature: f64, velocity_seed: Option<u64>) {
        self.thermalize_with(duration, initial_temperature, velocity_seed, |_| {});
    }

    /// Like [`thermalize`](Self::thermalize), handing `(t, K + U, T)` to
    /// `trace` after every step
    pub fn thermalize_with<T: FnMut(MdSample)>(
        &mut self,
        duration: f64,
        initial_temperature: f64,
        velocity_seed: Option<u64>,
        mut trace: T,
    ) {
        self.refresh_forces();
        self.generate_initial_velocities(initial_temperature, velocity_seed);
        info!(
            "Thermalizing {} atoms for t = {} from T = {}",
            self.n_atoms(),
            duration,
            initial_temperature
        );

        for time in step_times(duration, self.params.time_step) {
            self.velocity_verlet_step();
            trace(self.sample(time));
        }

        info!(
            "Thermalization finished: E = {:.8}, T = {:.6}",
            self.total_energy(),
            self.temperature()
        );
    }

    /// Production run: hand `(t, K + U, T)` to `trace` before every step
    pub fn evolve_with<T: FnMut(MdSample)>(&mut self, duration: f64, scheme: Scheme, mut trace: T) {
        for time in step_times(duration, self.params.time_step) {
            trace(self.sample(time));
            self.step(scheme);
        }
    }

    /// Move every atom along its force until the largest force drops to
    /// `force_tolerance`; returns the number of descent steps taken
    ///
    /// There is no line search and no iteration limit: a `step_coefficient`
    /// too large for the potential's curvature makes the loop diverge.
    pub fn steepest_descent(&mut self, force_tolerance: f64, step_coefficient: f64) -> usize {
        self.steepest_descent_with(force_tolerance, step_coefficient, |_| {})
    }

    /// Like [`steepest_descent`](Self::steepest_descent), handing
    /// `(max force, U)` to `trace` for the start and after every step
    pub fn steepest_descent_with<T: FnMut(DescentSample)>(
        &mut self,
        force_tolerance: f64,
        step_coefficient: f64,
        mut trace: T,
    ) -> usize {
        info!("---------- Starting steepest descent ----------");
        self.refresh_forces();
        let mut max_force = self.max_force_magnitude();
        trace(DescentSample {
            max_force,
            potential_energy: self.potential_energy(),
        });

        let mut iterations = 0;
        while max_force > force_tolerance {
            for (x, &f) in self.positions.iter_mut().zip(&self.forces) {
                *x += f * step_coefficient;
            }
            self.refresh_forces();
            max_force = self.max_force_magnitude();
            iterations += 1;

            let potential_energy = self.potential_energy();
            debug!(
                "  Iteration {}: max force {:.8e}, U = {:.8}",
                iterations, max_force, potential_energy
            );
            trace(DescentSample {
                max_force,
                potential_energy,
            });
        }

        info!(
            "Steepest descent converged after {} iterations (max force {:.3e})",
            iterations, max_force
        );
        iterations
    }
}

/// Times `i * dt` for every step index with `i * dt < duration`
fn step_times(duration: f64, dt: f64) -> impl Iterator<Item = f64> {
    (0u64..)
        .map(move |i| i as f64 * dt)
        .take_while(move |&t| t < duration)
}
