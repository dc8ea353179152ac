// src/physics/operations/divalent.rs
//
// Divalent cation enumeration for frameworks with two Al charge centers.
// Every pair of bridging oxygens around each Al yields one candidate.

use crate::error::{PlacementError, Result};
use crate::io::save_candidate;
use crate::model::Structure;
use crate::utils::geometry::parallelogram_vertex;

/// Species marking a charge center.
pub const CHARGE_CENTER: &str = "Al";
/// Species of the bridging atoms around a charge center.
pub const BRIDGING: &str = "O";
/// Default Al-O cutoff (Å) for bridging-oxygen detection.
pub const DEFAULT_NEIGHBOR_CUTOFF: f64 = 1.7;

/// The four bridging oxygens of one charge center, in index order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChargeCenter {
    pub site: usize,
    pub oxygens: [usize; 4],
}

impl ChargeCenter {
    /// All unordered oxygen pairs `(oi, oj)` with `i < j`.
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::with_capacity(6);
        for i in 0..4 {
            for j in (i + 1)..4 {
                out.push((self.oxygens[i], self.oxygens[j]));
            }
        }
        out
    }
}

/// Label and directory name of a divalent candidate: `D-{t}-{oj}-{oi}`.
pub fn pair_label(site: usize, oi: usize, oj: usize) -> String {
    format!("D-{}-{}-{}", site, oj, oi)
}

/// Locate every Al and its bridging oxygens (minimum-image distance below `cutoff`).
///
/// Anything other than exactly four oxygens is rejected.
pub fn charge_centers(framework: &Structure, cutoff: f64) -> Result<Vec<ChargeCenter>> {
    let sites = framework.indices_of(CHARGE_CENTER);
    if sites.is_empty() {
        return Err(PlacementError::NoChargeCenters);
    }
    if sites.len() != 2 {
        log::warn!(
            "expected 2 {} charge centers, found {}",
            CHARGE_CENTER,
            sites.len()
        );
    }

    let mut centers = Vec::with_capacity(sites.len());
    for site in sites {
        let distances = framework.distances_from(site)?;
        let oxygens: Vec<usize> = framework
            .atoms
            .iter()
            .filter(|a| a.element == BRIDGING && distances[a.index] < cutoff)
            .map(|a| a.index)
            .collect();

        let oxygens: [usize; 4] =
            oxygens
                .as_slice()
                .try_into()
                .map_err(|_| PlacementError::NeighborCount {
                    site,
                    found: oxygens.len(),
                    cutoff,
                })?;
        centers.push(ChargeCenter { site, oxygens });
    }
    Ok(centers)
}

/// Place `cation` at `pos(oi) - pos(t) + pos(oj)` for every oxygen pair of every
/// Al center.
///
/// Candidates are neither wrapped nor clash-filtered. Labels follow
/// [`pair_label`]; with `output` set each candidate is written under its label.
pub fn divalent(
    framework: &Structure,
    cation: &str,
    output: Option<&std::path::Path>,
    neighbor_cutoff: f64,
) -> Result<(Vec<Structure>, Vec<String>)> {
    let centers = charge_centers(framework, neighbor_cutoff)?;

    let mut candidates = Vec::with_capacity(centers.len() * 6);
    let mut labels = Vec::with_capacity(centers.len() * 6);
    for center in &centers {
        let t = framework.site_position(center.site)?;
        for (oi, oj) in center.pairs() {
            let a = framework.site_position(oi)?;
            let b = framework.site_position(oj)?;
            let candidate = framework.with_atom(cation, parallelogram_vertex(&a, &t, &b));

            let label = pair_label(center.site, oi, oj);
            if let Some(root) = output {
                save_candidate(root, &label, &candidate)?;
            }
            candidates.push(candidate);
            labels.push(label);
        }
    }

    log::info!(
        "{} {} candidates around {} charge centers",
        candidates.len(),
        cation,
        centers.len()
    );
    Ok((candidates, labels))
}
