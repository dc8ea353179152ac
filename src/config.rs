// src/config.rs

use crate::io::rings::Validation;
use crate::physics::analysis::clash::DEFAULT_CLASH_CUTOFF;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

// --- Main Config Struct ---

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
  /// Steric cutoff for monovalent candidates (Å); `null` disables the filter
  pub clash_cutoff: Option<f64>,
  /// Fixed cation-site distance (Å); `null` uses the radius heuristic
  pub bond_length: Option<f64>,
  /// Largest ring (in T atoms) searched when no sizes are requested
  pub max_ring: usize,
  /// Rings must be larger than this to be filled by default
  pub min_default_ring: usize,
  /// Al-O distance below which an oxygen counts as bridging (Å)
  pub neighbor_cutoff: f64,
  pub validation: Validation,
  /// Symmetry search tolerance passed to moyo (Å)
  pub symprec: f64,
  /// Largest per-atom displacement still considered equivalent when deduplicating (Å)
  pub position_tolerance: f64,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      clash_cutoff: Some(DEFAULT_CLASH_CUTOFF),
      bond_length: None,
      max_ring: 12,
      min_default_ring: 4,
      neighbor_cutoff: 1.7,
      validation: Validation::Crum,
      symprec: 1e-4,
      position_tolerance: 0.3,
    }
  }
}

impl Config {
  /// Loads config from `path`, or from the standard OS location
  /// (e.g., ~/.config/zeocat/settings.json) when `path` is `None`.
  ///
  /// Never fails: problems fall back to defaults and are described in the
  /// returned message.
  pub fn load(path: Option<&Path>) -> (Self, String) {
    let path = path.map(Path::to_path_buf).unwrap_or_else(Self::get_path);
    if path.exists() {
      match File::open(&path) {
        Ok(file) => {
          let reader = BufReader::new(file);
          match serde_json::from_reader(reader) {
            Ok(cfg) => (cfg, format!("Config loaded from {:?}", path)),
            Err(e) => (Self::default(), format!("Error parsing config: {}", e)),
          }
        }
        Err(e) => (Self::default(), format!("Error opening config: {}", e)),
      }
    } else {
      (
        Self::default(),
        "No config found. Using defaults.".to_string(),
      )
    }
  }

  /// Saves config to `path` (or the standard OS location)
  pub fn save(&self, path: Option<&Path>) -> String {
    let path = path.map(Path::to_path_buf).unwrap_or_else(Self::get_path);
    if let Some(parent) = path.parent() {
      let _ = fs::create_dir_all(parent);
    }

    match File::create(&path) {
      Ok(file) => {
        let writer = BufWriter::new(file);
        match serde_json::to_writer_pretty(writer, self) {
          Ok(_) => format!("Config saved to {:?}", path),
          Err(e) => format!("Failed to save config: {}", e),
        }
      }
      Err(e) => format!("Could not create config file: {}", e),
    }
  }

  fn get_path() -> PathBuf {
    if let Some(proj) = ProjectDirs::from("org", "zeocat", "zeocat") {
      proj.config_dir().join("settings.json")
    } else {
      PathBuf::from("settings.json")
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let cfg = Config::default();
    assert_eq!(cfg.clash_cutoff, Some(1.5));
    assert_eq!(cfg.max_ring, 12);
    assert_eq!(cfg.neighbor_cutoff, 1.7);
    assert_eq!(cfg.validation, Validation::Crum);
  }

  #[test]
  fn test_partial_file_keeps_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("settings.json");
    fs::write(&path, r#"{ "clash_cutoff": null, "validation": "sastre" }"#).unwrap();

    let (cfg, msg) = Config::load(Some(&path));
    assert!(msg.starts_with("Config loaded"));
    assert_eq!(cfg.clash_cutoff, None);
    assert_eq!(cfg.validation, Validation::Sastre);
    assert_eq!(cfg.max_ring, 12);
  }

  #[test]
  fn test_save_then_load() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("nested").join("settings.json");
    let cfg = Config {
      bond_length: Some(2.4),
      ..Default::default()
    };
    assert!(cfg.save(Some(&path)).starts_with("Config saved"));
    let (back, _) = Config::load(Some(&path));
    assert_eq!(back, cfg);
  }

  #[test]
  fn test_missing_or_broken_file_falls_back() {
    let tmp = tempfile::tempdir().unwrap();
    let (cfg, msg) = Config::load(Some(&tmp.path().join("absent.json")));
    assert_eq!(cfg, Config::default());
    assert!(msg.contains("defaults"));

    let broken = tmp.path().join("broken.json");
    fs::write(&broken, "{ not json").unwrap();
    let (cfg, msg) = Config::load(Some(&broken));
    assert_eq!(cfg, Config::default());
    assert!(msg.starts_with("Error parsing config"));
  }
}
