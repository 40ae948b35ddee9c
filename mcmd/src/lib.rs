//! Lattice-gas Monte Carlo and Lennard-Jones molecular dynamics

pub mod config;
pub mod io;
pub mod lattice;
pub mod md;
pub mod tasks;
