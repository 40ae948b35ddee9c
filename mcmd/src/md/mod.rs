//! Continuous-space molecular dynamics with a smoothed Lennard-Jones pair potential

pub mod lj_pot;
pub mod neighbor_list;
pub mod run_md;
pub mod system;

pub use lj_pot::{JunctionCoefficients, SmoothedLennardJones};
pub use neighbor_list::{nearest_neighbor_distance, NeighborList};
pub use run_md::{DescentSample, ForceProvider, MdParams, MdSample, MdSystem, Scheme};
pub use system::SimulationBox;
