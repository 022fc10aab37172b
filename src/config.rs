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

//! Correction of raw user input into values the core accepts.

use crate::generator::MAX_WORDS;

pub const DEFAULT_WORDLIST: usize = 1;
pub const DEFAULT_LENGTH: usize = 6;

/// A corrected setting and whether the user's input was replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Corrected {
    pub value: usize,
    pub defaulted: bool,
}

impl Corrected {
    fn keep(value: usize) -> Self {
        Self {
            value,
            defaulted: false,
        }
    }

    fn replaced(value: usize) -> Self {
        Self {
            value,
            defaulted: true,
        }
    }
}

/// Anything that is not a number in `1..=available` selects the first list.
pub fn correct_wordlist(input: &str, available: usize) -> Corrected {
    match input.trim().parse::<i64>() {
        Ok(n) if n >= 1 && n <= available as i64 => Corrected::keep(n as usize),
        _ => Corrected::replaced(DEFAULT_WORDLIST),
    }
}

/// Anything that is not a number in `1..=MAX_WORDS` becomes six words.
///
/// A zero is the documented way to ask for the default and is not reported
/// as a correction.
pub fn correct_length(input: &str) -> Corrected {
    match input.trim().parse::<i64>() {
        Ok(0) => Corrected::keep(DEFAULT_LENGTH),
        Ok(n) if n >= 1 && n <= MAX_WORDS as i64 => Corrected::keep(n as usize),
        _ => Corrected::replaced(DEFAULT_LENGTH),
    }
}
