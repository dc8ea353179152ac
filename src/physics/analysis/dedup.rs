// src/physics/analysis/dedup.rs
//
// Collapses symmetry-equivalent candidates to one representative each.

use crate::error::Result;
use crate::model::Structure;
use crate::physics::analysis::symmetry;
use crate::utils::linalg::{metric_tensor, CellFrame};
use nalgebra::{Matrix3, Vector3};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Equivalence test between structures, split so that the per-structure work
/// runs once per input.
pub trait StructureMatcher: Sync {
    type Key: Send;

    fn prepare(&self, structure: &Structure) -> Result<Self::Key>;

    fn equivalent(&self, a: &Self::Key, b: &Self::Key) -> bool;

    fn matches(&self, a: &Structure, b: &Structure) -> Result<bool> {
        Ok(self.equivalent(&self.prepare(a)?, &self.prepare(b)?))
    }
}

/// Group indices of equivalent structures.
///
/// Each structure joins the first group whose first member it matches, so the
/// grouping is deterministic and groups appear in order of first occurrence.
pub fn group_equivalent<M: StructureMatcher>(
    structures: &[Structure],
    matcher: &M,
) -> Result<Vec<Vec<usize>>> {
    let keys = structures
        .par_iter()
        .map(|s| matcher.prepare(s))
        .collect::<Result<Vec<_>>>()?;

    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (i, key) in keys.iter().enumerate() {
        match groups
            .iter_mut()
            .find(|g| matcher.equivalent(&keys[g[0]], key))
        {
            Some(group) => group.push(i),
            None => groups.push(vec![i]),
        }
    }
    Ok(groups)
}

/// One representative (the first member) per equivalence class.
pub fn dedupe<M: StructureMatcher>(structures: Vec<Structure>, matcher: &M) -> Result<Vec<Structure>> {
    let groups = group_equivalent(&structures, matcher)?;
    let total = structures.len();

    let mut slots: Vec<Option<Structure>> = structures.into_iter().map(Some).collect();
    let unique: Vec<Structure> = groups
        .iter()
        .filter_map(|g| slots[g[0]].take())
        .collect();

    log::info!("{} of {} candidates are symmetry-distinct", unique.len(), total);
    Ok(unique)
}

// --- Lattice matcher ---

#[derive(Clone, Copy, Debug)]
pub struct LatticeMatcher {
    /// Symmetry tolerance handed to moyo (Å)
    pub symprec: f64,
    /// Largest per-atom displacement accepted in a mapping (Å)
    pub position_tolerance: f64,
    /// Relative tolerance on metric tensor entries
    pub lattice_tolerance: f64,
}

impl Default for LatticeMatcher {
    fn default() -> Self {
        Self {
            symprec: 1e-4,
            position_tolerance: 0.3,
            lattice_tolerance: 1e-3,
        }
    }
}

impl LatticeMatcher {
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self {
            symprec: config.symprec,
            position_tolerance: config.position_tolerance,
            ..Default::default()
        }
    }

    fn same_metric(&self, a: &Matrix3<f64>, b: &Matrix3<f64>) -> bool {
        let scale = a.abs().max().max(b.abs().max());
        (a - b).abs().max() <= self.lattice_tolerance * scale
    }

    fn view(&self, structure: &Structure) -> Result<CellView> {
        let frame = structure.frame()?;
        let metric = metric_tensor(&structure.lattice);
        Ok(CellView {
            automorphisms: self.automorphisms(&metric),
            metric,
            frame,
            species: structure.atoms.iter().map(|a| a.element.clone()).collect(),
            frac: structure.atoms.iter().map(|a| frame.frac(&a.pos())).collect(),
        })
    }

    /// Integer matrices W with entries in {-1, 0, 1}, det ±1 and W^T G W = G.
    /// The identity comes first.
    fn automorphisms(&self, metric: &Matrix3<f64>) -> Vec<Matrix3<f64>> {
        let mut out = vec![Matrix3::identity()];
        let scale = metric.abs().max();
        for code in 0..3usize.pow(9) {
            let mut entries = [0.0; 9];
            let mut c = code;
            for e in entries.iter_mut() {
                *e = (c % 3) as f64 - 1.0;
                c /= 3;
            }
            let w = Matrix3::from_row_slice(&entries);
            if w == Matrix3::identity() || (w.determinant().abs() - 1.0).abs() > 0.5 {
                continue;
            }
            let image = w.transpose() * metric * w;
            if (image - metric).abs().max() <= self.lattice_tolerance * scale {
                out.push(w);
            }
        }
        out
    }

    /// Whether some automorphism of `a` plus a translation carries every atom of
    /// `a` onto a distinct atom of `b` of the same species.
    fn maps_onto(&self, a: &CellView, b: &CellView, anchor: &str) -> bool {
        if a.frac.len() != b.frac.len() {
            return false;
        }
        let Some(ia) = a.species.iter().position(|e| e == anchor) else {
            return false;
        };
        let targets: Vec<usize> = (0..b.species.len())
            .filter(|&j| b.species[j] == anchor)
            .collect();

        for w in &a.automorphisms {
            let rotated: Vec<Vector3<f64>> = a.frac.iter().map(|f| w * f).collect();
            for &j in &targets {
                let shift = b.frac[j] - rotated[ia];
                if self.covers(&rotated, &shift, a, b) {
                    return true;
                }
            }
        }
        false
    }

    fn covers(&self, rotated: &[Vector3<f64>], shift: &Vector3<f64>, a: &CellView, b: &CellView) -> bool {
        let mut used = vec![false; b.frac.len()];
        for (k, f) in rotated.iter().enumerate() {
            let target = f + shift;
            let hit = (0..b.frac.len()).find(|&j| {
                !used[j] && b.species[j] == a.species[k] && self.close(&a.frame, &(b.frac[j] - target))
            });
            match hit {
                Some(j) => used[j] = true,
                None => return false,
            }
        }
        true
    }

    // Rounding is exact here: displacements within tolerance are far below half a cell.
    fn close(&self, frame: &CellFrame, df: &Vector3<f64>) -> bool {
        let d = df.map(|x| x - x.round());
        frame.cart(&d).norm() < self.position_tolerance
    }
}

struct CellView {
    metric: Matrix3<f64>,
    frame: CellFrame,
    species: Vec<String>,
    frac: Vec<Vector3<f64>>,
    automorphisms: Vec<Matrix3<f64>>,
}

pub struct PreparedCell {
    composition: BTreeMap<String, usize>,
    raw: CellView,
    /// Moyo conventional cell, for comparing cells given in different settings
    standard: Option<CellView>,
}

impl StructureMatcher for LatticeMatcher {
    type Key = PreparedCell;

    fn prepare(&self, structure: &Structure) -> Result<PreparedCell> {
        let standard = match symmetry::standardize(structure, self.symprec) {
            Ok((_, std)) => Some(self.view(&std)?),
            Err(e) => {
                log::debug!("no standardized cell, comparing as given: {}", e);
                None
            }
        };
        Ok(PreparedCell {
            composition: structure.composition(),
            raw: self.view(structure)?,
            standard,
        })
    }

    // Space groups are not compared: displacements below `position_tolerance`
    // can still lower the detected symmetry.
    fn equivalent(&self, a: &PreparedCell, b: &PreparedCell) -> bool {
        if a.composition != b.composition {
            return false;
        }
        // Rarest species keeps the translation search short
        let Some(anchor) = a
            .composition
            .iter()
            .min_by_key(|(_, n)| **n)
            .map(|(e, _)| e.as_str())
        else {
            return true;
        };

        if self.same_metric(&a.raw.metric, &b.raw.metric) {
            self.maps_onto(&a.raw, &b.raw, anchor)
        } else {
            match (&a.standard, &b.standard) {
                (Some(sa), Some(sb)) => {
                    self.same_metric(&sa.metric, &sb.metric) && self.maps_onto(sa, sb, anchor)
                }
                _ => false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Si at the corner and O on the cube edges of a 10 Å cell (Pm-3m).
    fn cubic_framework() -> Structure {
        let mut s = Structure::new([[10.0, 0.0, 0.0], [0.0, 10.0, 0.0], [0.0, 0.0, 10.0]]);
        s.push("Si", [0.0, 0.0, 0.0]);
        s.push("O", [5.0, 0.0, 0.0]);
        s.push("O", [0.0, 5.0, 0.0]);
        s.push("O", [0.0, 0.0, 5.0]);
        s
    }

    fn with_na(p: [f64; 3]) -> Structure {
        cubic_framework().with_atom("Na", Vector3::from(p))
    }

    struct SameFormula;

    impl StructureMatcher for SameFormula {
        type Key = BTreeMap<String, usize>;

        fn prepare(&self, structure: &Structure) -> Result<Self::Key> {
            Ok(structure.composition())
        }

        fn equivalent(&self, a: &Self::Key, b: &Self::Key) -> bool {
            a == b
        }
    }

    #[test]
    fn test_greedy_grouping_order() {
        let fw = cubic_framework();
        let inputs = vec![
            fw.with_atom("Na", Vector3::zeros()),
            fw.with_atom("K", Vector3::zeros()),
            fw.with_atom("Na", Vector3::new(1.0, 0.0, 0.0)),
            fw.clone(),
            fw.with_atom("K", Vector3::new(2.0, 0.0, 0.0)),
        ];
        let groups = group_equivalent(&inputs, &SameFormula).unwrap();
        assert_eq!(groups, vec![vec![0, 2], vec![1, 4], vec![3]]);

        let unique = dedupe(inputs, &SameFormula).unwrap();
        assert_eq!(unique.len(), 3);
        assert_eq!(unique[1].atoms.last().unwrap().element, "K");
        assert_eq!(unique[1].atoms.last().unwrap().position, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_cubic_automorphisms() {
        let m = LatticeMatcher::default();
        let metric = metric_tensor(&cubic_framework().lattice);
        let autos = m.automorphisms(&metric);
        assert_eq!(autos.len(), 48);
        assert_eq!(autos[0], Matrix3::identity());
    }

    #[test]
    fn test_orthorhombic_automorphisms() {
        let m = LatticeMatcher::default();
        let metric = metric_tensor(&[[8.0, 0.0, 0.0], [0.0, 9.0, 0.0], [0.0, 0.0, 10.0]]);
        assert_eq!(m.automorphisms(&metric).len(), 8);
    }

    #[test]
    fn test_symmetry_equivalent_cations_collapse() {
        let inputs = vec![
            with_na([2.0, 0.0, 0.0]),
            with_na([0.0, 2.0, 0.0]),
            with_na([0.0, 0.0, 8.0]),
            with_na([2.0, 2.0, 0.0]),
            with_na([0.0, 2.0, 2.0]),
            with_na([3.0, 0.0, 0.0]),
        ];
        let matcher = LatticeMatcher::default();
        let groups = group_equivalent(&inputs, &matcher).unwrap();
        assert_eq!(groups, vec![vec![0, 1, 2], vec![3, 4], vec![5]]);

        let unique = dedupe(inputs, &matcher).unwrap();
        assert_eq!(unique.len(), 3);
        assert_eq!(unique[2].atoms.last().unwrap().position, [3.0, 0.0, 0.0]);
    }

    #[test]
    fn test_small_displacement_is_tolerated() {
        let m = LatticeMatcher::default();
        assert!(m.matches(&with_na([2.05, 0.0, 0.0]), &with_na([0.0, 0.0, 8.0])).unwrap());
        // Same site seen through the periodic boundary
        assert!(m.matches(&with_na([9.0, 0.0, 0.0]), &with_na([-1.0, 0.0, 0.0])).unwrap());
    }

    #[test]
    fn test_lower_symmetry_within_tolerance_still_matches() {
        let m = LatticeMatcher::default();
        let a = with_na([2.0, 0.0, 0.0]);
        let b = with_na([2.0, 0.05, 0.0]);
        assert!(m.matches(&a, &b).unwrap());

        let groups = group_equivalent(&[a, b, with_na([0.0, 0.0, 2.04])], &m).unwrap();
        assert_eq!(groups, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn test_different_species_never_match() {
        let m = LatticeMatcher::default();
        let a = with_na([2.0, 0.0, 0.0]);
        let b = cubic_framework().with_atom("K", Vector3::new(2.0, 0.0, 0.0));
        assert!(!m.matches(&a, &b).unwrap());
    }
}
