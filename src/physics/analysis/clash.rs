// src/physics/analysis/clash.rs

use crate::error::Result;
use crate::model::structure::Structure;
use rayon::prelude::*;

/// Default steric cutoff (Å) between a placed cation and any framework atom.
pub const DEFAULT_CLASH_CUTOFF: f64 = 1.5;

/// True if any atom other than `new_index` lies strictly closer than `cutoff`
/// to it (minimum-image distance).
pub fn is_clashing(structure: &Structure, new_index: usize, cutoff: f64) -> Result<bool> {
    let distances = structure.distances_from(new_index)?;
    Ok(distances
        .iter()
        .enumerate()
        .any(|(i, d)| i != new_index && *d < cutoff))
}

/// Drop candidates whose last atom clashes with the framework.
///
/// `cutoff = None` disables the filter and returns the inputs unchanged. Order is
/// preserved and `candidates[i]` stays paired with `locations[i]`.
pub fn filter_clashes(
    candidates: Vec<Structure>,
    locations: Vec<String>,
    cutoff: Option<f64>,
) -> Result<(Vec<Structure>, Vec<String>)> {
    let Some(cutoff) = cutoff else {
        return Ok((candidates, locations));
    };

    let flags: Vec<bool> = candidates
        .par_iter()
        .map(|s| match s.len() {
            0 => Ok(false),
            n => is_clashing(s, n - 1, cutoff),
        })
        .collect::<Result<_>>()?;

    let mut kept = Vec::with_capacity(candidates.len());
    let mut kept_locations = Vec::with_capacity(locations.len());
    for ((structure, location), clashing) in candidates.into_iter().zip(locations).zip(flags) {
        if clashing {
            log::debug!("dropping {} candidate: cation within {} Å of the framework", location, cutoff);
        } else {
            kept.push(structure);
            kept_locations.push(location);
        }
    }
    Ok((kept, kept_locations))
}
