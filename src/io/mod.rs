// src/io/mod.rs
pub mod library;
pub mod poscar;
pub mod rings;

use crate::model::Structure;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Load a framework. `.json` files hold a serialized `Structure`; anything else
/// is read as POSCAR/CONTCAR.
pub fn load_structure(path: impl AsRef<Path>) -> io::Result<Structure> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        let file = fs::File::open(path)?;
        serde_json::from_reader(io::BufReader::new(file))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    } else {
        poscar::parse(path)
    }
}

/// Write `structure` to `root/name/POSCAR`, creating directories as needed.
///
/// Re-running with the same name overwrites the POSCAR; an existing directory is
/// not an error.
pub fn save_candidate(root: &Path, name: &str, structure: &Structure) -> io::Result<PathBuf> {
    let dir = root.join(name);
    fs::create_dir_all(&dir)?;
    let file = dir.join("POSCAR");
    poscar::write(&file, structure)?;
    log::debug!("wrote {}", file.display());
    Ok(file)
}
