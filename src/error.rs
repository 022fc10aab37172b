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

//! Error types for every core operation. All of them are terminal for a run.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::index::LookupIndex;

/// Failures while acquiring or filling protected memory.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// The allocator could not reserve the region.
    #[error("could not allocate {size} bytes of protected memory")]
    Exhausted {
        /// Requested region size in bytes.
        size: usize,
    },

    /// The OS refused to lock the region and the policy requires a lock.
    #[error("could not lock {size} bytes of memory against swapping")]
    LockFailed {
        /// Requested region size in bytes.
        size: usize,
    },

    /// A write would overflow the fixed capacity of the region.
    #[error("protected buffer overflow: capacity {capacity}, requested {requested}")]
    CapacityExceeded {
        /// Capacity of the region.
        capacity: usize,
        /// Total length the write would have required.
        requested: usize,
    },
}

/// Failures while verifying a word list before it is trusted.
#[derive(Debug, Error)]
pub enum IntegrityError {
    /// The word list could not be opened or read in full.
    #[error("wordlist {} cannot be read", path.display())]
    ResourceUnavailable {
        /// Location of the word list.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The SHA-256 digest of the word list differs from the pinned one.
    #[error("hash for wordlist {} does not match (expected {expected}, got {actual})", path.display())]
    IntegrityMismatch {
        /// Location of the word list.
        path: PathBuf,
        /// Pinned digest.
        expected: String,
        /// Digest computed over the bytes read.
        actual: String,
    },

    /// Protected memory for the word list bytes was unavailable.
    #[error(transparent)]
    Allocation(#[from] AllocationError),
}

/// The OS entropy source failed to seed the die.
#[derive(Debug, Error)]
#[error("OS entropy source failed: {0}")]
pub struct EntropyError(pub getrandom::Error);

/// Failures while assembling a passphrase from a verified word list.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// A die roll outside 1..=6 reached the index generator.
    #[error("die roll {0} is outside 1..=6")]
    InvalidRoll(u8),

    /// The verified word list has no entry for a generated index.
    #[error("no word list entry for index {0}")]
    NoMatch(LookupIndex),

    /// The requested passphrase length is outside the supported range.
    #[error("passphrase length {length} is outside 1..={max}")]
    InvalidLength {
        /// Requested number of words.
        length: usize,
        /// Largest supported number of words.
        max: usize,
    },

    /// A word list record could not be parsed.
    #[error("malformed wordlist record at line {line}: {reason}")]
    MalformedRecord {
        /// One-based line number, or zero for whole-file problems.
        line: usize,
        /// What was wrong with the record.
        reason: &'static str,
    },

    /// The die could not be seeded.
    #[error(transparent)]
    Entropy(#[from] EntropyError),

    /// Protected memory for rolls or the passphrase was unavailable.
    #[error(transparent)]
    Allocation(#[from] AllocationError),
}
