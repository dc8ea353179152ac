// src/physics/analysis/symmetry.rs

use crate::error::{PlacementError, Result};
use crate::model::elements::atomic_number;
use crate::model::Structure;
use crate::utils::linalg::lattice_matrix;
use moyo::base::{AngleTolerance, Cell, Lattice};
use moyo::data::Setting;
use moyo::MoyoDataset;
use nalgebra::Vector3;
use std::collections::HashMap;

// --- Structs for Analysis Results ---
#[derive(Clone, Debug, PartialEq)]
pub struct SymmetryInfo {
    pub number: i32,
    pub system: &'static str,
}

/// Moyo view of a structure plus the species behind each atomic number.
struct MoyoInput {
    cell: Cell,
    species: HashMap<i32, String>,
}

fn to_moyo(structure: &Structure) -> Result<MoyoInput> {
    let frame = structure.frame()?;
    let lattice = Lattice::new(lattice_matrix(&structure.lattice));

    let mut positions = Vec::with_capacity(structure.len());
    let mut numbers = Vec::with_capacity(structure.len());
    let mut species = HashMap::new();

    for atom in &structure.atoms {
        positions.push(frame.frac(&atom.pos()));

        let z = atomic_number(&atom.element)
            .map(i32::from)
            .ok_or_else(|| PlacementError::unknown_species(atom.element.as_str()))?;
        species.entry(z).or_insert_with(|| atom.element.clone());
        numbers.push(z);
    }

    Ok(MoyoInput {
        cell: Cell::new(lattice, positions, numbers),
        species,
    })
}

fn dataset(input: &MoyoInput, symprec: f64) -> Result<MoyoDataset> {
    MoyoDataset::new(&input.cell, symprec, AngleTolerance::Default, Setting::Spglib, true)
        .map_err(|e| PlacementError::Symmetry(format!("{:?}", e)))
}

pub fn crystal_system(number: i32) -> &'static str {
    match number {
        1..=2 => "Triclinic",
        3..=15 => "Monoclinic",
        16..=74 => "Orthorhombic",
        75..=142 => "Tetragonal",
        143..=167 => "Trigonal",
        168..=194 => "Hexagonal",
        195..=230 => "Cubic",
        _ => "Unknown",
    }
}

pub fn analyze(structure: &Structure, symprec: f64) -> Result<SymmetryInfo> {
    let number = dataset(&to_moyo(structure)?, symprec)?.number;
    Ok(SymmetryInfo {
        number,
        system: crystal_system(number),
    })
}

/// Space-group number together with the standardized conventional cell.
pub fn standardize(structure: &Structure, symprec: f64) -> Result<(i32, Structure)> {
    let input = to_moyo(structure)?;
    let ds = dataset(&input, symprec)?;

    // Moyo keeps basis vectors as matrix columns
    let basis = ds.std_cell.lattice.basis;
    let mut out = Structure::new([
        [basis[(0, 0)], basis[(1, 0)], basis[(2, 0)]],
        [basis[(0, 1)], basis[(1, 1)], basis[(2, 1)]],
        [basis[(0, 2)], basis[(1, 2)], basis[(2, 2)]],
    ]);

    for (pos_frac, &type_id) in ds.std_cell.positions.iter().zip(&ds.std_cell.numbers) {
        let element = input
            .species
            .get(&type_id)
            .ok_or_else(|| PlacementError::Symmetry(format!("unexpected atomic number {}", type_id)))?;
        let cart: Vector3<f64> = basis * pos_frac;
        out.push(element.as_str(), [cart.x, cart.y, cart.z]);
    }
    out.formula = structure.formula.clone();

    Ok((ds.number, out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rock_salt() -> Structure {
        let a = 5.64;
        let mut s = Structure::new([[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]]);
        let fcc = [[0.0, 0.0, 0.0], [0.5, 0.5, 0.0], [0.5, 0.0, 0.5], [0.0, 0.5, 0.5]];
        for f in fcc {
            s.push("Na", [f[0] * a, f[1] * a, f[2] * a]);
            s.push("Cl", [(f[0] + 0.5) * a, f[1] * a, f[2] * a]);
        }
        s
    }

    #[test]
    fn test_crystal_system_ranges() {
        assert_eq!(crystal_system(1), "Triclinic");
        assert_eq!(crystal_system(225), "Cubic");
        assert_eq!(crystal_system(0), "Unknown");
    }

    #[test]
    fn test_rock_salt_is_fm3m() {
        let info = analyze(&rock_salt(), 1e-4).unwrap();
        assert_eq!(info.number, 225);
        assert_eq!(info.system, "Cubic");
    }

    #[test]
    fn test_unknown_species_is_reported() {
        let mut s = rock_salt();
        s.push("Xx", [1.0, 1.0, 1.0]);
        assert!(matches!(
            analyze(&s, 1e-4),
            Err(PlacementError::UnknownSpecies { .. })
        ));
    }

    #[test]
    fn test_standardize_keeps_composition_ratio() {
        let (number, std) = standardize(&rock_salt(), 1e-4).unwrap();
        assert_eq!(number, 225);
        let comp = std.composition();
        assert_eq!(comp.get("Na"), comp.get("Cl"));
    }
}
