// src/io/poscar.rs

use crate::model::Structure;
use crate::utils::linalg::CellFrame;
use nalgebra::Vector3;
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::Path;

fn invalid(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

fn next_line<B: BufRead>(lines: &mut io::Lines<B>, what: &str) -> io::Result<String> {
    lines
        .next()
        .ok_or_else(|| invalid(format!("Missing {}", what)))?
}

fn parse_triple(line: &str, what: &str) -> io::Result<[f64; 3]> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 3 {
        return Err(invalid(format!("Invalid {} line: '{}'", what, line.trim())));
    }
    let mut out = [0.0; 3];
    for (slot, part) in out.iter_mut().zip(&parts) {
        *slot = part
            .parse::<f64>()
            .map_err(|_| invalid(format!("Invalid number '{}' in {} line", part, what)))?;
    }
    Ok(out)
}

pub fn parse(path: impl AsRef<Path>) -> io::Result<Structure> {
    let file = File::open(path.as_ref())?;
    read(io::BufReader::new(file))
}

/// Parse VASP 5 POSCAR text (species line required).
pub fn read<R: BufRead>(reader: R) -> io::Result<Structure> {
    let mut lines = reader.lines();

    let comment = next_line(&mut lines, "Comment")?;

    // Scale
    let scale_line = next_line(&mut lines, "Scale")?;
    let scale: f64 = scale_line
        .trim()
        .parse()
        .map_err(|_| invalid("Invalid Scale"))?;

    // Lattice
    let mut lattice = [[0.0; 3]; 3];
    for row in lattice.iter_mut() {
        let v = parse_triple(&next_line(&mut lines, "Lattice")?, "Lattice")?;
        *row = [v[0] * scale, v[1] * scale, v[2] * scale];
    }

    // Elements & Counts
    let elements_line = next_line(&mut lines, "Elements")?;
    if !elements_line
        .trim()
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic())
    {
        return Err(invalid("POSCAR without a species line is not supported"));
    }
    let element_names: Vec<String> = elements_line
        .split_whitespace()
        .map(str::to_string)
        .collect();
    let counts: Vec<usize> = next_line(&mut lines, "Counts")?
        .split_whitespace()
        .map(|x| x.parse().map_err(|_| invalid(format!("Invalid count '{}'", x))))
        .collect::<io::Result<_>>()?;
    if counts.len() != element_names.len() {
        return Err(invalid("Species and count lines differ in length"));
    }

    // Mode (optional "Selective dynamics" line first)
    let mut mode_line = next_line(&mut lines, "Mode")?;
    if mode_line.trim().to_lowercase().starts_with('s') {
        mode_line = next_line(&mut lines, "Mode")?;
    }
    let is_direct = mode_line.trim().to_lowercase().starts_with('d');

    let mut structure = Structure::new(lattice);
    structure.formula = comment.trim().to_string();
    let frame = CellFrame::new(&lattice);

    for (element, &count) in element_names.iter().zip(&counts) {
        for _ in 0..count {
            let p = parse_triple(&next_line(&mut lines, "Atom Pos")?, "Atom Pos")?;
            let position = if is_direct {
                let frame = frame.ok_or_else(|| invalid("Singular lattice"))?;
                let c = frame.cart(&Vector3::from(p));
                [c.x, c.y, c.z]
            } else {
                [p[0] * scale, p[1] * scale, p[2] * scale]
            };
            structure.push(element.as_str(), position);
        }
    }

    Ok(structure)
}

pub fn write(path: impl AsRef<Path>, structure: &Structure) -> io::Result<()> {
    let file = File::create(path.as_ref())?;
    let mut out = BufWriter::new(file);
    write_to(&mut out, structure)?;
    out.flush()
}

/// Write POSCAR text with atoms grouped by species (stable within a species).
pub fn write_to<W: Write>(out: &mut W, structure: &Structure) -> io::Result<()> {
    let sorted = structure.sorted_by_species();

    // 1. Header
    writeln!(out, "{}", sorted.formula_string())?;
    writeln!(out, "1.0")?;

    // 2. Lattice Vectors
    for vec in &sorted.lattice {
        writeln!(out, " {:16.10} {:16.10} {:16.10}", vec[0], vec[1], vec[2])?;
    }

    // 3. Species and counts, in first-appearance order of the sorted list
    let mut counts: Vec<(String, usize)> = Vec::new();
    for atom in &sorted.atoms {
        match counts.last_mut() {
            Some((el, n)) if *el == atom.element => *n += 1,
            _ => counts.push((atom.element.clone(), 1)),
        }
    }
    for (label, _) in &counts {
        write!(out, " {:<4}", label)?;
    }
    writeln!(out)?;
    for (_, count) in &counts {
        write!(out, " {:<4}", count)?;
    }
    writeln!(out)?;

    // 4. Atomic Positions (Direct/Fractional)
    writeln!(out, "Direct")?;
    let frame = CellFrame::new(&sorted.lattice).ok_or_else(|| invalid("Singular lattice"))?;
    for atom in &sorted.atoms {
        let f = frame.frac(&atom.pos());
        writeln!(out, " {:16.10} {:16.10} {:16.10}", f.x, f.y, f.z)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "test cell
1.0
  5.0 0.0 0.0
  0.0 6.0 0.0
  0.0 0.0 7.0
Si O
1 2
Direct
 0.0 0.0 0.0
 0.5 0.0 0.0
 0.0 0.5 0.5
";

    #[test]
    fn test_read_direct() {
        let s = read(SAMPLE.as_bytes()).unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s.atoms[0].element, "Si");
        assert_eq!(s.atoms[2].element, "O");
        assert!((s.atoms[1].position[0] - 2.5).abs() < 1e-10);
        assert!((s.atoms[2].position[2] - 3.5).abs() < 1e-10);
        assert_eq!(s.formula, "test cell");
    }

    #[test]
    fn test_write_groups_species_and_reads_back() {
        let mut s = Structure::new([[5.0, 0.0, 0.0], [0.0, 6.0, 0.0], [0.0, 0.0, 7.0]]);
        s.push("Si", [0.0, 0.0, 0.0]);
        s.push("O", [2.5, 0.0, 0.0]);
        s.push("Na", [1.0, 2.0, 3.0]);
        s.push("O", [0.0, 3.0, 3.5]);

        let mut buf = Vec::new();
        write_to(&mut buf, &s).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let species_line = text.lines().nth(5).unwrap();
        assert_eq!(species_line.split_whitespace().collect::<Vec<_>>(), vec!["Na", "O", "Si"]);

        let back = read(text.as_bytes()).unwrap();
        assert_eq!(back.composition(), s.composition());
        assert!((back.atoms[0].position[2] - 3.0).abs() < 1e-8);
        assert!((back.atoms[2].position[1] - 3.0).abs() < 1e-8);
    }

    #[test]
    fn test_truncated_file_is_invalid_data() {
        let err = read("comment\n1.0\n 1 0 0\n".as_bytes()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
