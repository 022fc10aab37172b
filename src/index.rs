// This file is part of Diceware.
//
// Copyright (c) 2025  René Coignard <contact@renecoignard.com>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::fmt;

use crate::dice::{DieRoll, DIE_SIDES};
use crate::error::GenerationError;

pub const ROLLS_PER_WORD: usize = 5;

/// Number of distinct indices, `6^5`.
pub const INDEX_SPACE: usize = 7776;

/// Five-digit word list key; every digit is a die face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LookupIndex(u32);

impl LookupIndex {
    pub const MIN: Self = Self(11111);
    pub const MAX: Self = Self(66666);

    /// Accepts only values whose five decimal digits are all in 1..=6.
    pub fn new(value: u32) -> Option<Self> {
        if !(Self::MIN.0..=Self::MAX.0).contains(&value) {
            return None;
        }

        let mut rest = value;
        for _ in 0..ROLLS_PER_WORD {
            let digit = rest % 10;
            if digit == 0 || digit > u32::from(DIE_SIDES) {
                return None;
            }
            rest /= 10;
        }

        Some(Self(value))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Position of the index in 0..INDEX_SPACE, reading the digits as base 6.
    pub fn ordinal(self) -> usize {
        let mut ordinal = 0;
        let mut scale = 1;
        let mut rest = self.0;
        for _ in 0..ROLLS_PER_WORD {
            ordinal += ((rest % 10) as usize - 1) * scale;
            scale *= usize::from(DIE_SIDES);
            rest /= 10;
        }
        ordinal
    }
}

impl fmt::Display for LookupIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Folds five ordered rolls into `10000*r0 + 1000*r1 + 100*r2 + 10*r3 + r4`.
pub fn build_index(rolls: &[DieRoll; ROLLS_PER_WORD]) -> Result<LookupIndex, GenerationError> {
    let mut value = 0u32;
    for &roll in rolls {
        if !(1..=DIE_SIDES).contains(&roll) {
            return Err(GenerationError::InvalidRoll(roll));
        }
        value = value * 10 + u32::from(roll);
    }

    Ok(LookupIndex(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn all_roll_tuples() -> Vec<[DieRoll; ROLLS_PER_WORD]> {
        let mut tuples = Vec::with_capacity(INDEX_SPACE);
        for a in 1..=6 {
            for b in 1..=6 {
                for c in 1..=6 {
                    for d in 1..=6 {
                        for e in 1..=6 {
                            tuples.push([a, b, c, d, e]);
                        }
                    }
                }
            }
        }
        tuples
    }

    #[test]
    fn test_place_values() {
        assert_eq!(build_index(&[1, 1, 1, 1, 1]).unwrap().value(), 11111);
        assert_eq!(build_index(&[6, 6, 6, 6, 6]).unwrap().value(), 66666);
        assert_eq!(build_index(&[3, 5, 4, 2, 6]).unwrap().value(), 35426);
        assert_eq!(build_index(&[6, 1, 1, 1, 2]).unwrap().value(), 61112);
    }

    #[test]
    fn test_bijection_over_all_tuples() {
        let tuples = all_roll_tuples();
        assert_eq!(tuples.len(), INDEX_SPACE);

        let mut indices = HashSet::new();
        let mut ordinals = HashSet::new();
        for rolls in &tuples {
            let index = build_index(rolls).unwrap();
            assert!(index >= LookupIndex::MIN && index <= LookupIndex::MAX);
            assert_eq!(LookupIndex::new(index.value()), Some(index));
            assert!(index.ordinal() < INDEX_SPACE);
            indices.insert(index);
            ordinals.insert(index.ordinal());
        }

        assert_eq!(indices.len(), INDEX_SPACE);
        assert_eq!(ordinals.len(), INDEX_SPACE);
    }

    #[test]
    fn test_rejects_out_of_range_rolls() {
        for bad in [0u8, 7, 255] {
            let err = build_index(&[1, 2, bad, 4, 5]).unwrap_err();
            assert!(
                matches!(err, GenerationError::InvalidRoll(roll) if roll == bad),
                "roll {} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_new_rejects_non_die_digits() {
        assert!(LookupIndex::new(11110).is_none());
        assert!(LookupIndex::new(11117).is_none());
        assert!(LookupIndex::new(10111).is_none());
        assert!(LookupIndex::new(66667).is_none());
        assert!(LookupIndex::new(1111).is_none());
        assert!(LookupIndex::new(111111).is_none());
        assert_eq!(LookupIndex::new(12345).map(LookupIndex::value), Some(12345));
    }

    #[test]
    fn test_ordinal_endpoints() {
        assert_eq!(LookupIndex::MIN.ordinal(), 0);
        assert_eq!(LookupIndex::MAX.ordinal(), INDEX_SPACE - 1);
        assert_eq!(LookupIndex::new(11112).unwrap().ordinal(), 1);
        assert_eq!(LookupIndex::new(11121).unwrap().ordinal(), 6);
    }
}
