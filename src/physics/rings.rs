// src/physics/rings.rs
//
// Ring bookkeeping: size units and classification of the rings found around a site.

use crate::error::{PlacementError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Number of T atoms in a ring ("6" in "6MR").
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RingSize(pub usize);

/// Stored length of an alternating T/O path, always `2 * RingSize`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PathLength(pub usize);

impl From<RingSize> for PathLength {
    fn from(size: RingSize) -> Self {
        PathLength(size.0 * 2)
    }
}

impl TryFrom<PathLength> for RingSize {
    type Error = PlacementError;

    fn try_from(len: PathLength) -> Result<Self> {
        if len.0 == 0 || len.0 % 2 != 0 {
            return Err(PlacementError::OddRingLength { len: len.0 });
        }
        Ok(RingSize(len.0 / 2))
    }
}

impl fmt::Display for RingSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}MR", self.0)
    }
}

/// A closed T-O-T-O... loop, stored as atom indices.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct Ring {
    path: Vec<usize>,
}

impl Ring {
    pub fn new(path: Vec<usize>) -> Result<Self> {
        RingSize::try_from(PathLength(path.len()))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &[usize] {
        &self.path
    }

    pub fn path_length(&self) -> PathLength {
        PathLength(self.path.len())
    }

    pub fn size(&self) -> RingSize {
        // Length is validated on construction
        RingSize(self.path.len() / 2)
    }
}

impl TryFrom<Vec<usize>> for Ring {
    type Error = PlacementError;

    fn try_from(path: Vec<usize>) -> Result<Self> {
        Ring::new(path)
    }
}

impl From<Ring> for Vec<usize> {
    fn from(ring: Ring) -> Self {
        ring.path
    }
}

/// Rings ordered by size (largest first) with per-size occurrence counters.
///
/// The three vectors are parallel: entry `i` of each describes the same ring.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Classification {
    pub sizes: Vec<RingSize>,
    /// 1-based running count of rings of the same size, in classified order.
    pub occurrences: Vec<usize>,
    pub rings: Vec<Ring>,
}

impl Classification {
    pub fn len(&self) -> usize {
        self.rings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RingSize, usize, &Ring)> {
        self.sizes
            .iter()
            .zip(&self.occurrences)
            .zip(&self.rings)
            .map(|((s, o), r)| (*s, *o, r))
    }
}

/// Sort rings by size, largest first, and number the rings within each size.
///
/// The sort is stable: equally sized rings keep their input order.
pub fn classify(rings: &[Ring]) -> Classification {
    let mut sorted = rings.to_vec();
    sorted.sort_by(|a, b| b.size().cmp(&a.size()));

    let sizes: Vec<RingSize> = sorted.iter().map(Ring::size).collect();
    let occurrences = occurrence_indices(&sizes);

    Classification {
        sizes,
        occurrences,
        rings: sorted,
    }
}

fn occurrence_indices(sizes: &[RingSize]) -> Vec<usize> {
    let mut seen: HashMap<RingSize, usize> = HashMap::new();
    sizes
        .iter()
        .map(|size| {
            let count = seen.entry(*size).or_insert(0);
            *count += 1;
            *count
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ring(len: usize, tag: usize) -> Ring {
        Ring::new((0..len).map(|i| tag * 100 + i).collect()).unwrap()
    }

    #[test]
    fn test_units_convert_at_the_boundary() {
        assert_eq!(PathLength::from(RingSize(6)), PathLength(12));
        assert_eq!(RingSize::try_from(PathLength(16)).unwrap(), RingSize(8));
        assert!(RingSize::try_from(PathLength(7)).is_err());
        assert_eq!(RingSize(6).to_string(), "6MR");
    }

    #[test]
    fn test_odd_and_empty_paths_rejected() {
        assert!(matches!(
            Ring::new(vec![1, 2, 3]),
            Err(PlacementError::OddRingLength { len: 3 })
        ));
        assert!(Ring::new(vec![]).is_err());
    }

    #[test]
    fn test_classify_orders_and_counts() {
        let input = vec![ring(8, 0), ring(12, 1), ring(8, 2), ring(16, 3), ring(12, 4)];
        let c = classify(&input);

        assert_eq!(
            c.sizes,
            vec![RingSize(8), RingSize(6), RingSize(6), RingSize(4), RingSize(4)]
        );
        assert_eq!(c.occurrences, vec![1, 1, 2, 1, 2]);
        // Ties keep input order
        assert_eq!(c.rings[1], input[1]);
        assert_eq!(c.rings[2], input[4]);
        assert_eq!(c.rings[3], input[0]);
        assert_eq!(c.rings[4], input[2]);
    }

    #[test]
    fn test_classify_empty() {
        let c = classify(&[]);
        assert!(c.is_empty());
        assert!(c.sizes.is_empty() && c.occurrences.is_empty());
    }

    #[test]
    fn test_ring_deserializes_with_validation() {
        let ok: Ring = serde_json::from_str("[1, 2, 3, 4]").unwrap();
        assert_eq!(ok.size(), RingSize(2));
        assert!(serde_json::from_str::<Ring>("[1, 2, 3]").is_err());
    }

    proptest! {
        #[test]
        fn prop_classification_is_stable(sizes in proptest::collection::vec(1usize..13, 0..40)) {
            let rings: Vec<Ring> = sizes.iter().enumerate().map(|(i, s)| ring(s * 2, i)).collect();
            let first = classify(&rings);
            let second = classify(&rings);
            prop_assert_eq!(&first, &second);

            // Non-increasing sizes, and input order preserved within a size
            for w in first.rings.windows(2) {
                prop_assert!(w[0].size() >= w[1].size());
                if w[0].size() == w[1].size() {
                    prop_assert!(w[0].path()[0] < w[1].path()[0]);
                }
            }
        }

        #[test]
        fn prop_occurrences_cover_one_to_k(sizes in proptest::collection::vec(1usize..13, 0..40)) {
            let rings: Vec<Ring> = sizes.iter().enumerate().map(|(i, s)| ring(s * 2, i)).collect();
            let c = classify(&rings);

            let mut per_class: HashMap<RingSize, Vec<usize>> = HashMap::new();
            for (size, occ, _) in c.iter() {
                per_class.entry(size).or_default().push(occ);
            }
            for (size, mut occs) in per_class {
                let k = sizes.iter().filter(|s| **s == size.0).count();
                occs.sort_unstable();
                prop_assert_eq!(occs, (1..=k).collect::<Vec<_>>());
            }
        }
    }
}
