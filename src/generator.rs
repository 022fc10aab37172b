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
use std::ops::Deref;

use zeroize::Zeroizing;

use crate::dice::{DiceRoller, DieRoll, RandomSource};
use crate::error::GenerationError;
use crate::index::{build_index, ROLLS_PER_WORD};
use crate::resolver::{WordlistResolver, MAX_WORD_LEN};
use crate::secure::{LockPolicy, SecureBuffer};
use crate::wordlist::VerifiedWordlist;

pub const MAX_WORDS: usize = 100;
pub const DELIMITER: &str = "-";

/// Room for the longest possible passphrase.
pub const PASSPHRASE_CAPACITY: usize = MAX_WORDS * (MAX_WORD_LEN + DELIMITER.len());

/// Words joined by [`DELIMITER`], held in protected memory and wiped on drop.
pub struct Passphrase {
    buffer: SecureBuffer,
    words: usize,
}

impl Passphrase {
    pub fn as_str(&self) -> &str {
        // Only whole `&str` values are appended, so this never falls back.
        std::str::from_utf8(self.buffer.as_bytes()).unwrap_or_default()
    }

    pub fn word_count(&self) -> usize {
        self.words
    }
}

impl Deref for Passphrase {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Passphrase")
            .field("words", &self.words)
            .finish_non_exhaustive()
    }
}

pub struct PassphraseBuilder<'a, R> {
    resolver: &'a WordlistResolver,
    source: R,
    policy: LockPolicy,
}

impl<'a, R: RandomSource> PassphraseBuilder<'a, R> {
    pub fn new(resolver: &'a WordlistResolver, source: R) -> Self {
        Self {
            resolver,
            source,
            policy: LockPolicy::default(),
        }
    }

    pub fn lock_policy(mut self, policy: LockPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Runs `length` rounds of five rolls, one index and one word lookup.
    ///
    /// The first failing round aborts the build; partial output is wiped with
    /// its buffer and never returned.
    pub fn build(&mut self, length: usize) -> Result<Passphrase, GenerationError> {
        if !(1..=MAX_WORDS).contains(&length) {
            return Err(GenerationError::InvalidLength {
                length,
                max: MAX_WORDS,
            });
        }

        let mut buffer = SecureBuffer::with_policy(PASSPHRASE_CAPACITY, self.policy)?;
        let mut rolls = Zeroizing::new([0 as DieRoll; ROLLS_PER_WORD]);

        for round in 0..length {
            for roll in rolls.iter_mut() {
                *roll = self.source.roll_die();
            }

            let index = build_index(&rolls)?;
            let word = self.resolver.resolve(index)?;

            if round > 0 {
                buffer.extend_from_slice(DELIMITER.as_bytes())?;
            }
            buffer.extend_from_slice(word.as_bytes())?;
        }

        tracing::debug!(words = length, "passphrase assembled");

        Ok(Passphrase {
            buffer,
            words: length,
        })
    }
}

/// Verified word list plus requested length in, passphrase out.
pub fn generate_passphrase(
    wordlist: &VerifiedWordlist,
    length: usize,
) -> Result<Passphrase, GenerationError> {
    let policy = wordlist.lock_policy();
    let resolver = WordlistResolver::from_verified(wordlist)?;
    let roller = DiceRoller::with_policy(policy)?;

    PassphraseBuilder::new(&resolver, roller)
        .lock_policy(policy)
        .build(length)
}
