// src/io/rings.rs
//
// Ring finding is done by an external tool; this module defines the contract
// the placement engine consumes and a JSON-backed implementation of it.

use crate::error::{PlacementError, Result};
use crate::model::Structure;
use crate::physics::operations::supercell;
use crate::physics::rings::{Ring, RingSize};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

/// Rule a ring finder applies to discard cycles that are not true rings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Validation {
    /// Shortcut-free cycles only (Goetzke & Klein)
    None,
    #[default]
    Crum,
    Sastre,
    Vertex,
}

impl FromStr for Validation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "goetzke" => Ok(Validation::None),
            "crum" => Ok(Validation::Crum),
            "sastre" => Ok(Validation::Sastre),
            "vertex" => Ok(Validation::Vertex),
            other => Err(format!("unknown ring validation '{}'", other)),
        }
    }
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Validation::None => "none",
            Validation::Crum => "crum",
            Validation::Sastre => "sastre",
            Validation::Vertex => "vertex",
        };
        f.write_str(name)
    }
}

/// Result of a ring search around one site.
#[derive(Clone, Debug)]
pub struct RingSearch {
    /// Size of every ring found, ascending (one entry per ring).
    pub sizes_found: Vec<RingSize>,
    /// Ring paths indexing atoms of the original cell.
    pub rings: Vec<Ring>,
    /// Framework the ring search worked in (typically a supercell whose first
    /// image is the original cell).
    pub working: Structure,
}

impl RingSearch {
    /// Distinct sizes found, ascending.
    pub fn distinct_sizes(&self) -> Vec<RingSize> {
        let mut sizes = self.sizes_found.clone();
        sizes.sort_unstable();
        sizes.dedup();
        sizes
    }
}

pub trait RingFinder {
    fn find(
        &self,
        framework: &Structure,
        site: usize,
        validation: Validation,
        max_ring: RingSize,
    ) -> Result<RingSearch>;
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RingEntry {
    pub site: usize,
    pub paths: Vec<Ring>,
    /// Supercell the paths were found in; defaults to the bare cell.
    #[serde(default = "single_cell")]
    pub repeat: [u32; 3],
    #[serde(default)]
    pub validation: Option<Validation>,
}

fn single_cell() -> [u32; 3] {
    [1, 1, 1]
}

/// Rings computed ahead of time, one entry per site.
///
/// File format: `{ "entries": [ { "site": 101, "paths": [[...], ...], "repeat": [2, 2, 2] } ] }`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PrecomputedRings {
    pub entries: Vec<RingEntry>,
}

impl PrecomputedRings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            PlacementError::provider(format!("ring file {}: {}", path.display(), e))
        })
    }
}

impl RingFinder for PrecomputedRings {
    fn find(
        &self,
        framework: &Structure,
        site: usize,
        validation: Validation,
        max_ring: RingSize,
    ) -> Result<RingSearch> {
        framework.site_position(site)?;
        let entry = self
            .entries
            .iter()
            .find(|e| e.site == site)
            .ok_or_else(|| PlacementError::provider(format!("no precomputed rings for site {}", site)))?;

        if let Some(stored) = entry.validation {
            if stored != validation {
                log::warn!(
                    "rings for site {} were validated with '{}', '{}' was requested",
                    site,
                    stored,
                    validation
                );
            }
        }

        let mut rings: Vec<Ring> = Vec::with_capacity(entry.paths.len());
        for ring in &entry.paths {
            if let Some(&bad) = ring.path().iter().find(|&&i| i >= framework.len()) {
                return Err(PlacementError::RingIndexOutOfRange {
                    index: bad,
                    len: framework.len(),
                });
            }
            if ring.size() <= max_ring {
                rings.push(ring.clone());
            }
        }
        rings.sort_by_key(Ring::size);

        let sizes_found = rings.iter().map(Ring::size).collect();
        let working = supercell::generate(framework, entry.repeat);
        log::debug!(
            "site {}: {} precomputed rings up to {}",
            site,
            rings.len(),
            max_ring
        );

        Ok(RingSearch {
            sizes_found,
            rings,
            working,
        })
    }
}
