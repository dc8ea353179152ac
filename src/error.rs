// src/error.rs

use thiserror::Error;

/// Failures raised by the placement engine.
///
/// Filtering outcomes (a clashing candidate) are not errors; they only shorten
/// the returned candidate list.
#[derive(Debug, Error)]
pub enum PlacementError {
    #[error("site index {index} is out of range for a structure with {len} atoms")]
    SiteOutOfRange { index: usize, len: usize },

    #[error("ring path references atom {index}, but the structure has {len} atoms")]
    RingIndexOutOfRange { index: usize, len: usize },

    #[error("ring path has length {len}; T/O paths must have an even, non-zero length")]
    OddRingLength { len: usize },

    #[error("no element data is known for species '{element}'")]
    UnknownSpecies { element: String },

    #[error("T-center {site} has {found} bridging oxygens within {cutoff} Å, expected 4")]
    NeighborCount {
        site: usize,
        found: usize,
        cutoff: f64,
    },

    #[error("framework contains no Al charge centers")]
    NoChargeCenters,

    #[error("lattice matrix is singular (non-invertible)")]
    SingularLattice,

    #[error("ring centroid coincides with site {site} (ring {ring:?})")]
    DegenerateGeometry { site: usize, ring: Vec<usize> },

    #[error("symmetry search failed: {0}")]
    Symmetry(String),

    #[error("collaborator failed: {0}")]
    Provider(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PlacementError {
    pub fn unknown_species(element: impl Into<String>) -> Self {
        Self::UnknownSpecies {
            element: element.into(),
        }
    }

    pub fn provider(details: impl Into<String>) -> Self {
        Self::Provider(details.into())
    }

    /// True for malformed inputs (bad indices, odd rings, unexpected neighbour counts).
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::SiteOutOfRange { .. }
                | Self::RingIndexOutOfRange { .. }
                | Self::OddRingLength { .. }
                | Self::UnknownSpecies { .. }
                | Self::NeighborCount { .. }
                | Self::NoChargeCenters
                | Self::SingularLattice
        )
    }
}

pub type Result<T> = std::result::Result<T, PlacementError>;
