// src/physics/operations/monovalent.rs
//
// Monovalent cation placement: one candidate per ring around a T site, on the
// line from the site through the ring centroid.

use crate::config::Config;
use crate::error::{PlacementError, Result};
use crate::io::rings::{RingFinder, Validation};
use crate::io::save_candidate;
use crate::model::elements::Radii;
use crate::model::Structure;
use crate::physics::analysis::clash::{filter_clashes, DEFAULT_CLASH_CUTOFF};
use crate::physics::rings::{classify, Classification, Ring, RingSize};
use crate::utils::geometry::{centroid, unit_vector};
use nalgebra::Vector3;
use std::path::{Path, PathBuf};

/// Empirical cation-to-site distance, `r + 2/r` for a species radius `r` (Å).
///
/// Not a physical formula.
pub fn heuristic_bond_length(radius: f64) -> f64 {
    radius + 2.0 / radius
}

/// Bond length for `species`: the override when given, else the heuristic.
pub fn bond_length_for(radii: &Radii, species: &str, bond_length: Option<f64>) -> Result<f64> {
    match bond_length {
        Some(b) => Ok(b),
        None => radii
            .get(species)
            .map(heuristic_bond_length)
            .ok_or_else(|| PlacementError::unknown_species(species)),
    }
}

/// Directory name a ring candidate is written under, e.g. `D-6MR-2`.
pub fn candidate_dir_name(size: RingSize, occurrence: usize) -> String {
    format!("D-{}-{}", size, occurrence)
}

/// Unit vector from the site towards the centroid of `ring`.
///
/// The centroid is taken in `centered` (where the ring is contiguous) and
/// translated back into the frame of `framework`.
pub fn ring_direction(
    framework: &Structure,
    centered: &Structure,
    site: usize,
    ring: &Ring,
) -> Result<Vector3<f64>> {
    let site_pos = framework.site_position(site)?;
    let translation = site_pos - centered.site_position(site)?;

    let points = ring
        .path()
        .iter()
        .map(|&i| {
            centered.position(i).ok_or(PlacementError::RingIndexOutOfRange {
                index: i,
                len: centered.len(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let degenerate = || PlacementError::DegenerateGeometry {
        site,
        ring: ring.path().to_vec(),
    };

    let center = centroid(&points).ok_or_else(degenerate)? + translation;
    unit_vector(&(center - site_pos)).ok_or_else(degenerate)
}

/// Candidate with one `species` atom placed `bond_length` from `site` towards
/// the ring, wrapped into the cell. Pure: safe to call per ring and recover
/// from individual failures.
pub fn place_in_ring(
    framework: &Structure,
    centered: &Structure,
    site: usize,
    species: &str,
    ring: &Ring,
    bond_length: f64,
) -> Result<Structure> {
    let direction = ring_direction(framework, centered, site, ring)?;
    let position = framework.site_position(site)? + direction * bond_length;

    let mut candidate = framework.with_atom(species, position);
    candidate.wrap()?;
    Ok(candidate)
}

/// Place `species` in every classified ring whose size is in `included`.
///
/// Returns candidates and their `"{size}MR"` labels in classified order. When
/// `output` is set every candidate is also written to
/// `output/D-{size}MR-{occurrence}/POSCAR`.
pub fn place(
    framework: &Structure,
    centered: &Structure,
    radii: &Radii,
    site: usize,
    species: &str,
    classification: &Classification,
    included: &[RingSize],
    output: Option<&Path>,
    bond_length: Option<f64>,
) -> Result<(Vec<Structure>, Vec<String>)> {
    let bond = bond_length_for(radii, species, bond_length)?;

    let mut candidates = Vec::new();
    let mut locations = Vec::new();
    for (size, occurrence, ring) in classification.iter() {
        if !included.contains(&size) {
            continue;
        }
        let candidate = place_in_ring(framework, centered, site, species, ring, bond)?;
        if let Some(root) = output {
            save_candidate(root, &candidate_dir_name(size, occurrence), &candidate)?;
        }
        candidates.push(candidate);
        locations.push(size.to_string());
    }

    log::debug!(
        "site {}: placed {} in {} of {} rings (bond {:.3} Å)",
        site,
        species,
        candidates.len(),
        classification.len(),
        bond
    );
    Ok((candidates, locations))
}

/// Knobs for [`monovalent`].
#[derive(Clone, Debug)]
pub struct MonovalentOptions {
    /// Ring sizes to fill; `None` means every size found above `min_default_ring`.
    pub included_rings: Option<Vec<RingSize>>,
    pub output: Option<PathBuf>,
    pub bond_length: Option<f64>,
    /// Clash cutoff in Å; `None` keeps every candidate.
    pub cutoff: Option<f64>,
    pub validation: Validation,
    /// Largest ring searched when `included_rings` is not given.
    pub max_ring: RingSize,
    pub min_default_ring: RingSize,
    pub radii: Radii,
}

impl Default for MonovalentOptions {
    fn default() -> Self {
        Self {
            included_rings: None,
            output: None,
            bond_length: None,
            cutoff: Some(DEFAULT_CLASH_CUTOFF),
            validation: Validation::Crum,
            max_ring: RingSize(12),
            min_default_ring: RingSize(4),
            radii: Radii::covalent(),
        }
    }
}

impl MonovalentOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            bond_length: config.bond_length,
            cutoff: config.clash_cutoff,
            validation: config.validation,
            max_ring: RingSize(config.max_ring),
            min_default_ring: RingSize(config.min_default_ring),
            ..Default::default()
        }
    }
}

/// Find the rings around `site`, place `species` in each qualifying ring and
/// drop clashing candidates.
pub fn monovalent(
    framework: &Structure,
    site: usize,
    species: &str,
    finder: &dyn RingFinder,
    options: &MonovalentOptions,
) -> Result<(Vec<Structure>, Vec<String>)> {
    framework.site_position(site)?;

    let max_ring = options
        .included_rings
        .as_ref()
        .and_then(|sizes| sizes.iter().max().copied())
        .unwrap_or(options.max_ring);
    let search = finder.find(framework, site, options.validation, max_ring)?;

    let included: Vec<RingSize> = match &options.included_rings {
        Some(sizes) => sizes.clone(),
        None => search
            .distinct_sizes()
            .into_iter()
            .filter(|s| *s > options.min_default_ring)
            .collect(),
    };

    let classification = classify(&search.rings);
    let centered = search.working.centered_on(site)?;
    let (candidates, locations) = place(
        framework,
        &centered,
        &options.radii,
        site,
        species,
        &classification,
        &included,
        options.output.as_deref(),
        options.bond_length,
    )?;

    let placed = candidates.len();
    let (candidates, locations) = filter_clashes(candidates, locations, options.cutoff)?;
    log::info!(
        "site {}: {} {} candidates ({} removed by clash filter)",
        site,
        candidates.len(),
        species,
        placed - candidates.len()
    );
    Ok((candidates, locations))
}
