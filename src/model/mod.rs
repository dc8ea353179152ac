//src/model/mod.rs
pub mod elements;
pub mod structure;

// Re-exports for cleaner imports
pub use elements::{covalent_radius, Radii};
pub use structure::{Atom, Structure};
