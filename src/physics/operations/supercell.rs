// src/physics/operations/supercell.rs

use crate::model::structure::Structure;
use nalgebra::Vector3;

/// Repeat a structure `repeat[0] x repeat[1] x repeat[2]` times.
///
/// Atoms of the original cell keep their indices: image `k` of atom `i` lands at
/// `k * len + i`, with the (0, 0, 0) image first. Ring finders rely on this to
/// hand back paths that index the original cell.
pub fn generate(structure: &Structure, repeat: [u32; 3]) -> Structure {
    let [nx, ny, nz] = repeat;
    let vec_a = Vector3::from(structure.lattice[0]);
    let vec_b = Vector3::from(structure.lattice[1]);
    let vec_c = Vector3::from(structure.lattice[2]);

    let new_lattice = [
        (vec_a * nx as f64).into(),
        (vec_b * ny as f64).into(),
        (vec_c * nz as f64).into(),
    ];
    let mut out = Structure::new(new_lattice);

    for x in 0..nx {
        for y in 0..ny {
            for z in 0..nz {
                let translation = vec_a * x as f64 + vec_b * y as f64 + vec_c * z as f64;
                for atom in &structure.atoms {
                    let p = atom.pos() + translation;
                    out.push(atom.element.as_str(), [p.x, p.y, p.z]);
                }
            }
        }
    }

    out.formula = format!("{} ({}x{}x{} Supercell)", structure.formula, nx, ny, nz);
    out
}
