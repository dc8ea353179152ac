// src/model/elements.rs

use std::collections::HashMap;

/// Tabulated data for one element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementData {
    pub atomic_number: u8,
    /// Standard atomic weight (u)
    pub mass: f64,
    /// Covalent radius in Å (Cordero et al. 2008, the set used by ASE)
    pub covalent_radius: f64,
}

const fn data(atomic_number: u8, mass: f64, covalent_radius: f64) -> Option<ElementData> {
    Some(ElementData {
        atomic_number,
        mass,
        covalent_radius,
    })
}

pub fn element_data(element: &str) -> Option<ElementData> {
    match element {
        // --- Period 1 ---
        "H" => data(1, 1.008, 0.31),
        "He" => data(2, 4.0026, 0.28),

        // --- Period 2 ---
        "Li" => data(3, 6.94, 1.28),
        "Be" => data(4, 9.0122, 0.96),
        "B" => data(5, 10.81, 0.84),
        "C" => data(6, 12.011, 0.76),
        "N" => data(7, 14.007, 0.71),
        "O" => data(8, 15.999, 0.66),
        "F" => data(9, 18.998, 0.57),
        "Ne" => data(10, 20.180, 0.58),

        // --- Period 3 ---
        "Na" => data(11, 22.990, 1.66),
        "Mg" => data(12, 24.305, 1.41),
        "Al" => data(13, 26.982, 1.21),
        "Si" => data(14, 28.085, 1.11),
        "P" => data(15, 30.974, 1.07),
        "S" => data(16, 32.06, 1.05),
        "Cl" => data(17, 35.45, 1.02),
        "Ar" => data(18, 39.948, 1.06),

        // --- Period 4 ---
        "K" => data(19, 39.098, 2.03),
        "Ca" => data(20, 40.078, 1.76),
        "Sc" => data(21, 44.956, 1.70),
        "Ti" => data(22, 47.867, 1.60),
        "V" => data(23, 50.942, 1.53),
        "Cr" => data(24, 51.996, 1.39),
        "Mn" => data(25, 54.938, 1.39),
        "Fe" => data(26, 55.845, 1.32),
        "Co" => data(27, 58.933, 1.26),
        "Ni" => data(28, 58.693, 1.24),
        "Cu" => data(29, 63.546, 1.32),
        "Zn" => data(30, 65.38, 1.22),
        "Ga" => data(31, 69.723, 1.22),
        "Ge" => data(32, 72.630, 1.20),
        "As" => data(33, 74.922, 1.19),
        "Se" => data(34, 78.971, 1.20),
        "Br" => data(35, 79.904, 1.20),
        "Kr" => data(36, 83.798, 1.16),

        // --- Period 5 ---
        "Rb" => data(37, 85.468, 2.20),
        "Sr" => data(38, 87.62, 1.95),
        "Y" => data(39, 88.906, 1.90),
        "Zr" => data(40, 91.224, 1.75),
        "Nb" => data(41, 92.906, 1.64),
        "Mo" => data(42, 95.95, 1.54),
        "Tc" => data(43, 98.0, 1.47),
        "Ru" => data(44, 101.07, 1.46),
        "Rh" => data(45, 102.91, 1.42),
        "Pd" => data(46, 106.42, 1.39),
        "Ag" => data(47, 107.87, 1.45),
        "Cd" => data(48, 112.41, 1.44),
        "In" => data(49, 114.82, 1.42),
        "Sn" => data(50, 118.71, 1.39),
        "Sb" => data(51, 121.76, 1.39),
        "Te" => data(52, 127.60, 1.38),
        "I" => data(53, 126.90, 1.39),
        "Xe" => data(54, 131.29, 1.40),

        // --- Period 6 ---
        "Cs" => data(55, 132.91, 2.44),
        "Ba" => data(56, 137.33, 2.15),
        "La" => data(57, 138.91, 2.07),
        "Ce" => data(58, 140.12, 2.04),
        "Pr" => data(59, 140.91, 2.03),
        "Nd" => data(60, 144.24, 2.01),
        "Pm" => data(61, 145.0, 1.99),
        "Sm" => data(62, 150.36, 1.98),
        "Eu" => data(63, 151.96, 1.98),
        "Gd" => data(64, 157.25, 1.96),
        "Tb" => data(65, 158.93, 1.94),
        "Dy" => data(66, 162.50, 1.92),
        "Ho" => data(67, 164.93, 1.92),
        "Er" => data(68, 167.26, 1.89),
        "Tm" => data(69, 168.93, 1.90),
        "Yb" => data(70, 173.05, 1.87),
        "Lu" => data(71, 174.97, 1.87),
        "Hf" => data(72, 178.49, 1.75),
        "Ta" => data(73, 180.95, 1.70),
        "W" => data(74, 183.84, 1.62),
        "Re" => data(75, 186.21, 1.51),
        "Os" => data(76, 190.23, 1.44),
        "Ir" => data(77, 192.22, 1.41),
        "Pt" => data(78, 195.08, 1.36),
        "Au" => data(79, 196.97, 1.36),
        "Hg" => data(80, 200.59, 1.32),
        "Tl" => data(81, 204.38, 1.45),
        "Pb" => data(82, 207.2, 1.46),
        "Bi" => data(83, 208.98, 1.48),
        "Po" => data(84, 209.0, 1.40),
        "At" => data(85, 210.0, 1.50),
        "Rn" => data(86, 222.0, 1.50),

        // --- Period 7 (through Cm) ---
        "Fr" => data(87, 223.0, 2.60),
        "Ra" => data(88, 226.0, 2.21),
        "Ac" => data(89, 227.0, 2.15),
        "Th" => data(90, 232.04, 2.06),
        "Pa" => data(91, 231.04, 2.00),
        "U" => data(92, 238.03, 1.96),
        "Np" => data(93, 237.0, 1.90),
        "Pu" => data(94, 244.0, 1.87),
        "Am" => data(95, 243.0, 1.80),
        "Cm" => data(96, 247.0, 1.69),

        _ => None,
    }
}

pub fn covalent_radius(element: &str) -> Option<f64> {
    element_data(element).map(|d| d.covalent_radius)
}

pub fn atomic_mass(element: &str) -> Option<f64> {
    element_data(element).map(|d| d.mass)
}

pub fn atomic_number(element: &str) -> Option<u8> {
    element_data(element).map(|d| d.atomic_number)
}

/// Per-species radii used to derive cation bond lengths.
///
/// Starts from the covalent table; individual species can be overridden.
#[derive(Clone, Debug, Default)]
pub struct Radii {
    overrides: HashMap<String, f64>,
}

impl Radii {
    pub fn covalent() -> Self {
        Self::default()
    }

    pub fn with(mut self, element: impl Into<String>, radius: f64) -> Self {
        self.overrides.insert(element.into(), radius);
        self
    }

    pub fn get(&self, element: &str) -> Option<f64> {
        self.overrides
            .get(element)
            .copied()
            .or_else(|| covalent_radius(element))
    }
}
