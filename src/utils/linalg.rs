// src/utils/linalg.rs

use nalgebra::{Matrix3, Vector3};

/// Lattice vectors as a row matrix [[ax, ay, az], [bx, by, bz], [cx, cy, cz]]
pub fn lattice_matrix(lattice: &[[f64; 3]; 3]) -> Matrix3<f64> {
  Matrix3::from_row_slice(&[
    lattice[0][0],
    lattice[0][1],
    lattice[0][2],
    lattice[1][0],
    lattice[1][1],
    lattice[1][2],
    lattice[2][0],
    lattice[2][1],
    lattice[2][2],
  ])
}

/// Metric tensor G = L L^T (G_ij = a_i · a_j)
pub fn metric_tensor(lattice: &[[f64; 3]; 3]) -> Matrix3<f64> {
  let l = lattice_matrix(lattice);
  l * l.transpose()
}

/// Cached forward/inverse transforms for repeated periodic queries on one cell.
#[derive(Clone, Copy, Debug)]
pub struct CellFrame {
  /// Columns are the lattice vectors: cart = to_cart * frac
  pub to_cart: Matrix3<f64>,
  pub to_frac: Matrix3<f64>,
}

impl CellFrame {
  pub fn new(lattice: &[[f64; 3]; 3]) -> Option<Self> {
    let to_cart = lattice_matrix(lattice).transpose();
    let to_frac = to_cart.try_inverse()?;
    Some(Self { to_cart, to_frac })
  }

  pub fn frac(&self, cart: &Vector3<f64>) -> Vector3<f64> {
    self.to_frac * cart
  }

  pub fn cart(&self, frac: &Vector3<f64>) -> Vector3<f64> {
    self.to_cart * frac
  }

  /// Shortest periodic image of a Cartesian displacement.
  ///
  /// Rounds in fractional space first, then scans the 27 neighbouring images,
  /// which is exact for the skewed cells the rounding alone gets wrong.
  pub fn minimum_image(&self, delta: &Vector3<f64>) -> Vector3<f64> {
    let mut df = self.frac(delta);
    df.x -= df.x.round();
    df.y -= df.y.round();
    df.z -= df.z.round();
    let base = self.cart(&df);

    let mut best = base;
    let mut best_norm = base.norm_squared();
    for dx in -1..=1 {
      for dy in -1..=1 {
        for dz in -1..=1 {
          if dx == 0 && dy == 0 && dz == 0 {
            continue;
          }
          let shift = self.cart(&Vector3::new(dx as f64, dy as f64, dz as f64));
          let candidate = base + shift;
          let n = candidate.norm_squared();
          if n < best_norm {
            best_norm = n;
            best = candidate;
          }
        }
      }
    }
    best
  }

  /// Map a Cartesian position into the cell, fractional coordinates in [0, 1)
  pub fn wrap(&self, cart: &Vector3<f64>) -> Vector3<f64> {
    let f = self.frac(cart);
    let wrapped = Vector3::new(wrap_unit(f.x), wrap_unit(f.y), wrap_unit(f.z));
    self.cart(&wrapped)
  }
}

fn wrap_unit(x: f64) -> f64 {
  let w = x.rem_euclid(1.0);
  // rem_euclid can round up to exactly 1.0 for tiny negative inputs
  if w >= 1.0 {
    0.0
  } else {
    w
  }
}
