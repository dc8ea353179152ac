// src/model/structure.rs

use crate::error::{PlacementError, Result};
use crate::model::elements::atomic_mass;
use crate::utils::linalg::CellFrame;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Atom {
    pub element: String,
    pub position: [f64; 3],
    // Always equal to the atom's slot in `Structure::atoms`; renumbered on load.
    #[serde(skip_deserializing)]
    pub index: usize,
}

impl Atom {
    pub fn pos(&self) -> Vector3<f64> {
        Vector3::from(self.position)
    }
}

/// A periodic framework: three lattice vectors plus an ordered atom list.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "StructureFile")]
pub struct Structure {
    // Lattice vectors: [a_vec, b_vec, c_vec]
    pub lattice: [[f64; 3]; 3],
    pub atoms: Vec<Atom>,
    #[serde(default)]
    pub formula: String,
}

/// On-disk shape; any stored `index` is ignored.
#[derive(Deserialize)]
struct StructureFile {
    lattice: [[f64; 3]; 3],
    atoms: Vec<Atom>,
    #[serde(default)]
    formula: String,
}

impl From<StructureFile> for Structure {
    fn from(file: StructureFile) -> Self {
        let mut atoms = file.atoms;
        for (i, atom) in atoms.iter_mut().enumerate() {
            atom.index = i;
        }
        Structure {
            lattice: file.lattice,
            atoms,
            formula: file.formula,
        }
    }
}

impl Structure {
    pub fn new(lattice: [[f64; 3]; 3]) -> Self {
        Self {
            lattice,
            atoms: Vec::new(),
            formula: String::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Append an atom and return its index.
    pub fn push(&mut self, element: impl Into<String>, position: [f64; 3]) -> usize {
        let index = self.atoms.len();
        self.atoms.push(Atom {
            element: element.into(),
            position,
            index,
        });
        index
    }

    /// A fresh copy of this structure with one extra atom appended at the end.
    pub fn with_atom(&self, element: &str, position: Vector3<f64>) -> Structure {
        let mut out = self.clone();
        out.push(element, [position.x, position.y, position.z]);
        out
    }

    pub fn position(&self, index: usize) -> Option<Vector3<f64>> {
        self.atoms.get(index).map(Atom::pos)
    }

    /// Position of a site atom, rejecting out-of-range indices.
    pub fn site_position(&self, index: usize) -> Result<Vector3<f64>> {
        self.position(index).ok_or(PlacementError::SiteOutOfRange {
            index,
            len: self.len(),
        })
    }

    pub fn indices_of(&self, element: &str) -> Vec<usize> {
        self.atoms
            .iter()
            .filter(|a| a.element == element)
            .map(|a| a.index)
            .collect()
    }

    pub fn frame(&self) -> Result<CellFrame> {
        CellFrame::new(&self.lattice).ok_or(PlacementError::SingularLattice)
    }

    /// Distance between atoms `i` and `j`, minimum-image when `mic` is set.
    pub fn distance(&self, i: usize, j: usize, mic: bool) -> Result<f64> {
        let delta = self.site_position(j)? - self.site_position(i)?;
        if mic {
            Ok(self.frame()?.minimum_image(&delta).norm())
        } else {
            Ok(delta.norm())
        }
    }

    /// Minimum-image distances from atom `i` to every atom (including itself, 0.0).
    pub fn distances_from(&self, i: usize) -> Result<Vec<f64>> {
        let frame = self.frame()?;
        let origin = self.site_position(i)?;
        Ok(self
            .atoms
            .iter()
            .map(|a| frame.minimum_image(&(a.pos() - origin)).norm())
            .collect())
    }

    pub fn translate(&mut self, shift: &Vector3<f64>) {
        for atom in &mut self.atoms {
            let p = atom.pos() + shift;
            atom.position = [p.x, p.y, p.z];
        }
    }

    /// Map every atom back into the unit cell.
    pub fn wrap(&mut self) -> Result<()> {
        let frame = self.frame()?;
        for atom in &mut self.atoms {
            let p = frame.wrap(&atom.pos());
            atom.position = [p.x, p.y, p.z];
        }
        Ok(())
    }

    pub fn center_of_mass(&self) -> Result<Vector3<f64>> {
        let mut total = 0.0;
        let mut weighted = Vector3::zeros();
        for atom in &self.atoms {
            let m = atomic_mass(&atom.element)
                .ok_or_else(|| PlacementError::unknown_species(atom.element.as_str()))?;
            total += m;
            weighted += atom.pos() * m;
        }
        if total == 0.0 {
            return Ok(Vector3::zeros());
        }
        Ok(weighted / total)
    }

    /// Copy translated so atom `index` sits at the old centre of mass, then wrapped.
    ///
    /// Rings straddling a cell boundary become contiguous around the site in the
    /// returned copy, so their centroids are meaningful.
    pub fn centered_on(&self, index: usize) -> Result<Structure> {
        let site = self.site_position(index)?;
        let shift = self.center_of_mass()? - site;
        let mut out = self.clone();
        out.translate(&shift);
        out.wrap()?;
        Ok(out)
    }

    /// Species counts, alphabetical.
    pub fn composition(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for atom in &self.atoms {
            *counts.entry(atom.element.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Formula string such as "Al2NaO72Si34".
    pub fn formula_string(&self) -> String {
        self.composition()
            .iter()
            .map(|(el, n)| format!("{}{}", el, n))
            .collect()
    }

    /// Atoms stably grouped by species, alphabetical.
    ///
    /// Indices are renumbered; used for writing, never for placement.
    pub fn sorted_by_species(&self) -> Structure {
        let mut atoms = self.atoms.clone();
        atoms.sort_by(|a, b| a.element.cmp(&b.element));
        for (i, atom) in atoms.iter_mut().enumerate() {
            atom.index = i;
        }
        Structure {
            lattice: self.lattice,
            atoms,
            formula: self.formula.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cubic(a: f64) -> Structure {
        Structure::new([[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]])
    }

    #[test]
    fn test_push_assigns_dense_indices() {
        let mut s = cubic(10.0);
        assert_eq!(s.push("Si", [0.0; 3]), 0);
        assert_eq!(s.push("O", [1.6, 0.0, 0.0]), 1);
        assert!(s.atoms.iter().enumerate().all(|(i, a)| a.index == i));
    }

    #[test]
    fn test_with_atom_leaves_original_untouched() {
        let mut s = cubic(10.0);
        s.push("Si", [0.0; 3]);
        let c = s.with_atom("Na", Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(s.len(), 1);
        assert_eq!(c.len(), 2);
        assert_eq!(c.atoms[1].element, "Na");
        assert_eq!(c.atoms[1].index, 1);
    }

    #[test]
    fn test_mic_distance() {
        let mut s = cubic(10.0);
        s.push("O", [0.5, 0.0, 0.0]);
        s.push("O", [9.5, 0.0, 0.0]);
        assert!((s.distance(0, 1, true).unwrap() - 1.0).abs() < 1e-10);
        assert!((s.distance(0, 1, false).unwrap() - 9.0).abs() < 1e-10);
    }

    #[test]
    fn test_site_out_of_range() {
        let s = cubic(10.0);
        assert!(matches!(
            s.site_position(3),
            Err(PlacementError::SiteOutOfRange { index: 3, len: 0 })
        ));
    }

    #[test]
    fn test_distance_rejects_bad_index() {
        let mut s = cubic(10.0);
        s.push("O", [0.5, 0.0, 0.0]);
        assert!(matches!(
            s.distance(0, 4, true),
            Err(PlacementError::SiteOutOfRange { index: 4, len: 1 })
        ));
        assert!(s.distance(2, 0, false).is_err());
    }

    #[test]
    fn test_stored_indices_are_renumbered() {
        let json = r#"{ "lattice": [[10,0,0],[0,10,0],[0,0,10]],
            "atoms": [ { "element": "Al", "position": [0,0,0], "index": 3 },
                       { "element": "O", "position": [1.6,0,0], "index": 7 },
                       { "element": "O", "position": [0,1.6,0] } ] }"#;
        let s: Structure = serde_json::from_str(json).unwrap();
        assert!(s.atoms.iter().enumerate().all(|(i, a)| a.index == i));
        assert_eq!(s.indices_of("O"), vec![1, 2]);
        assert_eq!(s.distances_from(0).unwrap().len(), 3);
    }

    #[test]
    fn test_centered_on_moves_site_to_center_of_mass() {
        let mut s = cubic(10.0);
        s.push("Si", [1.0, 1.0, 1.0]);
        s.push("Si", [3.0, 1.0, 1.0]);
        let com = s.center_of_mass().unwrap();
        let c = s.centered_on(0).unwrap();
        assert!((c.position(0).unwrap() - com).norm() < 1e-10);
        // Relative geometry is preserved
        assert!((c.distance(0, 1, true).unwrap() - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_center_of_mass_unknown_species() {
        let mut s = cubic(10.0);
        s.push("Xx", [0.0; 3]);
        assert!(matches!(
            s.center_of_mass(),
            Err(PlacementError::UnknownSpecies { .. })
        ));
    }

    #[test]
    fn test_sorted_by_species_is_stable() {
        let mut s = cubic(10.0);
        s.push("Si", [0.0; 3]);
        s.push("O", [1.0, 0.0, 0.0]);
        s.push("Si", [2.0, 0.0, 0.0]);
        s.push("O", [3.0, 0.0, 0.0]);
        let sorted = s.sorted_by_species();
        let xs: Vec<f64> = sorted.atoms.iter().map(|a| a.position[0]).collect();
        assert_eq!(xs, vec![1.0, 3.0, 0.0, 2.0]);
        assert_eq!(s.formula_string(), "O2Si2");
    }
}
