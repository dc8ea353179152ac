// src/io/library.rs
//
// Framework database access. The engine only needs a canonical cell per
// framework code and the symmetry-class tables of its T and O sites.

use crate::error::{PlacementError, Result};
use crate::model::Structure;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SiteKind {
    /// Tetrahedral centers (Si or Al)
    T,
    /// Bridging oxygens
    O,
}

impl SiteKind {
    pub fn species(&self) -> &'static [&'static str] {
        match self {
            SiteKind::T => &["Si", "Al"],
            SiteKind::O => &["O"],
        }
    }
}

/// Symmetry-distinct site labels with the number of atoms in each class.
///
/// Atoms of one class are contiguous in the canonical cell, in label order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteClasses {
    pub labels: Vec<String>,
    pub multiplicities: Vec<usize>,
}

impl SiteClasses {
    /// Index of the first atom of each class in `framework`.
    pub fn first_indices(&self, framework: &Structure, kind: SiteKind) -> Result<Vec<usize>> {
        if self.labels.len() != self.multiplicities.len() {
            return Err(PlacementError::provider(
                "site labels and multiplicities differ in length",
            ));
        }
        let candidates: Vec<usize> = framework
            .atoms
            .iter()
            .filter(|a| kind.species().contains(&a.element.as_str()))
            .map(|a| a.index)
            .collect();

        let mut cursor = 0;
        let mut firsts = Vec::with_capacity(self.multiplicities.len());
        for (label, &m) in self.labels.iter().zip(&self.multiplicities) {
            let first = candidates.get(cursor).copied().ok_or_else(|| {
                PlacementError::provider(format!(
                    "site class {} starts past the last {:?} atom",
                    label, kind
                ))
            })?;
            firsts.push(first);
            cursor += m;
        }
        Ok(firsts)
    }
}

pub trait FrameworkProvider {
    fn framework(&self, code: &str) -> Result<Structure>;
    fn site_classes(&self, code: &str, kind: SiteKind) -> Result<SiteClasses>;
}

#[derive(Clone, Debug, Deserialize)]
struct SiteTable {
    tsites: SiteClasses,
    osites: SiteClasses,
}

/// Frameworks stored on disk as `<root>/<CODE>.vasp` (or `<root>/<CODE>/POSCAR`)
/// next to `<root>/<CODE>.json` site tables.
#[derive(Clone, Debug)]
pub struct DirectoryLibrary {
    pub root: PathBuf,
}

impl DirectoryLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn structure_path(&self, code: &str) -> PathBuf {
        let flat = self.root.join(format!("{}.vasp", code));
        if flat.exists() {
            flat
        } else {
            self.root.join(code).join("POSCAR")
        }
    }
}

impl FrameworkProvider for DirectoryLibrary {
    fn framework(&self, code: &str) -> Result<Structure> {
        let path = self.structure_path(code);
        let mut s = super::poscar::parse(&path)?;
        if s.formula.is_empty() {
            s.formula = code.to_string();
        }
        log::info!("loaded framework {} ({} atoms) from {}", code, s.len(), path.display());
        Ok(s)
    }

    fn site_classes(&self, code: &str, kind: SiteKind) -> Result<SiteClasses> {
        let path = self.root.join(format!("{}.json", code));
        let file = File::open(&path)?;
        let table: SiteTable = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| PlacementError::provider(format!("site table {}: {}", path.display(), e)))?;
        Ok(match kind {
            SiteKind::T => table.tsites,
            SiteKind::O => table.osites,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn framework() -> Structure {
        let mut s = Structure::new([[10.0, 0.0, 0.0], [0.0, 10.0, 0.0], [0.0, 0.0, 10.0]]);
        for i in 0..4 {
            s.push("Si", [i as f64, 0.0, 0.0]);
        }
        for i in 0..6 {
            s.push("O", [i as f64, 5.0, 0.0]);
        }
        s
    }

    #[test]
    fn test_first_indices_walk_multiplicities() {
        let fw = framework();
        let t = SiteClasses {
            labels: vec!["T1".into(), "T2".into()],
            multiplicities: vec![3, 1],
        };
        assert_eq!(t.first_indices(&fw, SiteKind::T).unwrap(), vec![0, 3]);

        let o = SiteClasses {
            labels: vec!["O1".into(), "O2".into(), "O3".into()],
            multiplicities: vec![2, 2, 2],
        };
        assert_eq!(o.first_indices(&fw, SiteKind::O).unwrap(), vec![4, 6, 8]);
    }

    #[test]
    fn test_first_indices_overflow() {
        let t = SiteClasses {
            labels: vec!["T1".into(), "T2".into()],
            multiplicities: vec![4, 1],
        };
        assert!(t.first_indices(&framework(), SiteKind::T).is_err());
    }

    #[test]
    fn test_directory_library_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        crate::io::poscar::write(tmp.path().join("XYZ.vasp"), &framework()).unwrap();
        fs::write(
            tmp.path().join("XYZ.json"),
            r#"{ "tsites": { "labels": ["T1"], "multiplicities": [4] },
                 "osites": { "labels": ["O1", "O2"], "multiplicities": [4, 2] } }"#,
        )
        .unwrap();

        let lib = DirectoryLibrary::new(tmp.path());
        let fw = lib.framework("XYZ").unwrap();
        assert_eq!(fw.len(), 10);
        let o = lib.site_classes("XYZ", SiteKind::O).unwrap();
        assert_eq!(o.multiplicities, vec![4, 2]);
        // POSCAR output groups species alphabetically, so oxygens come first
        assert_eq!(o.first_indices(&fw, SiteKind::O).unwrap(), vec![0, 4]);
    }
}
