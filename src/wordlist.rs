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

//! Word list catalog and integrity verification.
//!
//! A word list is trusted only after the SHA-256 digest of its exact bytes
//! matches the digest pinned in its [`WordlistDescriptor`]. The verified
//! bytes are kept in protected memory and are the only bytes later parsed.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::IntegrityError;
use crate::secure::{LockPolicy, SecureBuffer};

const BUILTIN_WORDLISTS: [(&str, &str, &str); 3] = [
    (
        "Diceware",
        "diceware.wordlist.txt",
        "74e3dcef458181446498d5c161a5650d01abb7e1cae3a8d8a175c9c751c1ab4e",
    ),
    (
        "Beale",
        "beale.wordlist.txt",
        "81fe9603fe49b43dccf2bb401dc5c76e90148757e075d5dbbdc4e7d5294e0c70",
    ),
    (
        "EFF Large",
        "eff.large.wordlist.txt",
        "addd35536511597a02fa0a9ff1e5284677b8883b83e986e43f15a3db996b903e",
    ),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordlistDescriptor {
    pub name: String,
    pub path: PathBuf,
    /// Lowercase hex SHA-256 of the file.
    pub sha256: String,
}

impl WordlistDescriptor {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, sha256: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            sha256: sha256.into(),
        }
    }
}

/// Ordered, immutable set of word lists offered to the user.
#[derive(Debug, Clone)]
pub struct WordlistCatalog {
    entries: Vec<WordlistDescriptor>,
}

impl WordlistCatalog {
    pub fn new(entries: Vec<WordlistDescriptor>) -> Self {
        Self { entries }
    }

    /// The three pinned lists, located in `dir`.
    pub fn builtin(dir: &Path) -> Self {
        let entries = BUILTIN_WORDLISTS
            .iter()
            .map(|(name, file, sha256)| WordlistDescriptor::new(*name, dir.join(file), *sha256))
            .collect();
        Self { entries }
    }

    /// One-based lookup, matching the numbering shown to the user.
    pub fn select(&self, selector: usize) -> Option<&WordlistDescriptor> {
        selector.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    pub fn entries(&self) -> &[WordlistDescriptor] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A word list whose bytes matched the pinned digest.
#[derive(Debug)]
pub struct VerifiedWordlist {
    descriptor: WordlistDescriptor,
    contents: SecureBuffer,
    policy: LockPolicy,
}

impl VerifiedWordlist {
    pub fn descriptor(&self) -> &WordlistDescriptor {
        &self.descriptor
    }

    pub fn contents(&self) -> &[u8] {
        self.contents.as_bytes()
    }

    pub fn lock_policy(&self) -> LockPolicy {
        self.policy
    }
}

pub fn verify_wordlist(descriptor: &WordlistDescriptor) -> Result<VerifiedWordlist, IntegrityError> {
    verify_wordlist_with_policy(descriptor, LockPolicy::default())
}

pub fn verify_wordlist_with_policy(
    descriptor: &WordlistDescriptor,
    policy: LockPolicy,
) -> Result<VerifiedWordlist, IntegrityError> {
    let unavailable = |source: io::Error| IntegrityError::ResourceUnavailable {
        path: descriptor.path.clone(),
        source,
    };

    let mut file = File::open(&descriptor.path).map_err(unavailable)?;
    let length = file.metadata().map_err(unavailable)?.len();
    let length = usize::try_from(length)
        .map_err(|_| unavailable(io::Error::other("wordlist does not fit in memory")))?;

    let mut contents = SecureBuffer::with_policy(length, policy)?;
    file.read_exact(contents.as_full_mut()).map_err(unavailable)?;

    let mut tail = [0u8; 1];
    if file.read(&mut tail).map_err(unavailable)? != 0 {
        return Err(unavailable(io::Error::other("wordlist changed while being read")));
    }

    let actual = sha256_hex(contents.as_bytes());
    if actual.as_bytes() != descriptor.sha256.as_bytes() {
        tracing::warn!(path = %descriptor.path.display(), "wordlist digest mismatch");
        return Err(IntegrityError::IntegrityMismatch {
            path: descriptor.path.clone(),
            expected: descriptor.sha256.clone(),
            actual,
        });
    }

    tracing::debug!(
        name = %descriptor.name,
        path = %descriptor.path.display(),
        bytes = length,
        "wordlist verified"
    );

    Ok(VerifiedWordlist {
        descriptor: descriptor.clone(),
        contents,
        policy,
    })
}

fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub const FULL_SHA256: &str = "d676b994ec06c27d7375b848fae8257109032e00e9c8ad0099a1d2c02a6bc3b3";
    pub const SHORT_SHA256: &str =
        "fdd46d3fa18d8326b9755f67157986ac02bafa26d40b739f4b6c4b058636dd94";

    pub fn path(file: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join(file)
    }

    pub fn full() -> WordlistDescriptor {
        WordlistDescriptor::new("Full fixture", path("full.wordlist.txt"), FULL_SHA256)
    }

    pub fn short() -> WordlistDescriptor {
        WordlistDescriptor::new("Short fixture", path("short.wordlist.txt"), SHORT_SHA256)
    }
}
