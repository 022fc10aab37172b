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

use chacha20::cipher::{KeyIvInit, StreamCipher};
use chacha20::ChaCha20;
use zeroize::{Zeroize, Zeroizing};

use crate::error::{AllocationError, EntropyError, GenerationError};
use crate::secure::{LockPolicy, SecureBuffer};

/// One face of a six-sided die, 1..=6.
pub type DieRoll = u8;

pub const DIE_SIDES: DieRoll = 6;

const SEED_LEN: usize = 32;
const KEYSTREAM_LEN: usize = 64;

/// Largest multiple of six not above 256; bytes at or past it are rejected.
const REJECTION_THRESHOLD: u8 = (256 - 256 % DIE_SIDES as usize) as u8;

/// Source of independent, uniformly distributed die rolls.
pub trait RandomSource {
    fn roll_die(&mut self) -> DieRoll;
}

/// ChaCha20 keystream keyed from the OS, reduced to die faces by rejection sampling.
pub struct DiceRoller {
    cipher: ChaCha20,
    keystream: SecureBuffer,
    pos: usize,
}

impl DiceRoller {
    pub fn new() -> Result<Self, GenerationError> {
        Self::with_policy(LockPolicy::default())
    }

    pub fn with_policy(policy: LockPolicy) -> Result<Self, GenerationError> {
        let mut seed = Zeroizing::new([0u8; SEED_LEN]);
        getrandom::fill(seed.as_mut_slice()).map_err(EntropyError)?;

        Ok(Self::keyed(&seed, policy)?)
    }

    /// Reproducible roller for a fixed key.
    pub fn from_seed(seed: &[u8; SEED_LEN]) -> Result<Self, AllocationError> {
        Self::keyed(seed, LockPolicy::default())
    }

    fn keyed(seed: &[u8; SEED_LEN], policy: LockPolicy) -> Result<Self, AllocationError> {
        let cipher = ChaCha20::new(seed.into(), &[0u8; 12].into());
        let keystream = SecureBuffer::with_policy(KEYSTREAM_LEN, policy)?;

        let mut roller = Self {
            cipher,
            keystream,
            pos: 0,
        };
        roller.refill();
        Ok(roller)
    }

    fn refill(&mut self) {
        let region = self.keystream.as_full_mut();
        region.zeroize();
        self.cipher.apply_keystream(region);
        self.pos = 0;
    }

    fn next_byte(&mut self) -> u8 {
        if self.pos >= self.keystream.capacity() {
            self.refill();
        }

        let slot = &mut self.keystream.as_full_mut()[self.pos];
        let byte = *slot;
        *slot = 0;
        self.pos += 1;
        byte
    }
}

impl RandomSource for DiceRoller {
    fn roll_die(&mut self) -> DieRoll {
        loop {
            let byte = self.next_byte();
            if byte < REJECTION_THRESHOLD {
                return byte % DIE_SIDES + 1;
            }
        }
    }
}
