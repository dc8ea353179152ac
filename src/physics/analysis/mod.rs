// src/physics/analysis/mod.rs
pub mod clash;
pub mod dedup;
pub mod symmetry;
