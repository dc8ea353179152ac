//! Cation placement in zeolite frameworks.
//!
//! Monovalent cations are put into the rings around a chosen T site;
//! divalent cations bridge oxygen pairs around two Al charge centers.
//! Candidates can be clash-filtered and reduced to symmetry-distinct ones.

pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod physics;
pub mod utils;

pub use error::{PlacementError, Result};
