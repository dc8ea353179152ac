// src/physics/operations/mod.rs
pub mod divalent;
pub mod monovalent;
pub mod supercell;
