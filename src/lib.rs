//! Supernova cosmology fit viewer.
//!
//! The library holds everything that does not touch the GUI: the
//! distance-modulus model, chi-square surfaces, the drag-session state
//! machine, data loading and configuration. The worker pool backs the
//! `pool_demo` binary.

pub mod config;
pub mod cosmology;
pub mod data;
pub mod fit;
pub mod pool;
pub mod session;
pub mod state;
