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

use crate::error::GenerationError;
use crate::index::{LookupIndex, INDEX_SPACE};
use crate::wordlist::VerifiedWordlist;

/// Longest word accepted from a word list, in bytes.
pub const MAX_WORD_LEN: usize = 16;

/// Index to word table, parsed once from a verified word list.
#[derive(Debug)]
pub struct WordlistResolver {
    words: Vec<Option<Box<str>>>,
    len: usize,
}

impl WordlistResolver {
    pub fn from_verified(wordlist: &VerifiedWordlist) -> Result<Self, GenerationError> {
        let resolver = Self::parse(wordlist.contents())?;
        tracing::debug!(
            name = %wordlist.descriptor().name,
            entries = resolver.len,
            "wordlist parsed"
        );
        Ok(resolver)
    }

    fn parse(contents: &[u8]) -> Result<Self, GenerationError> {
        let text = std::str::from_utf8(contents).map_err(|_| GenerationError::MalformedRecord {
            line: 0,
            reason: "wordlist is not valid UTF-8",
        })?;

        let mut words: Vec<Option<Box<str>>> = vec![None; INDEX_SPACE];
        let mut len = 0;

        for (number, line) in text.lines().enumerate() {
            let malformed = |reason| GenerationError::MalformedRecord {
                line: number + 1,
                reason,
            };

            if line.trim().is_empty() {
                continue;
            }

            let (index, word) = line.split_once('\t').ok_or(malformed("missing tab separator"))?;
            let index = parse_index(index).ok_or(malformed("index is not five die faces"))?;

            if word.is_empty() {
                return Err(malformed("empty word"));
            }
            if word.chars().any(char::is_whitespace) {
                return Err(malformed("word contains whitespace"));
            }
            if word.len() > MAX_WORD_LEN {
                return Err(malformed("word is too long"));
            }

            let slot = &mut words[index.ordinal()];
            if slot.is_some() {
                return Err(malformed("duplicate index"));
            }
            *slot = Some(word.into());
            len += 1;
        }

        Ok(Self { words, len })
    }

    /// The word stored under `index`; a missing entry is an error, never a blank.
    pub fn resolve(&self, index: LookupIndex) -> Result<&str, GenerationError> {
        self.words[index.ordinal()]
            .as_deref()
            .ok_or(GenerationError::NoMatch(index))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether every index has a word.
    pub fn is_complete(&self) -> bool {
        self.len == INDEX_SPACE
    }
}

fn parse_index(field: &str) -> Option<LookupIndex> {
    if field.len() != 5 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok().and_then(LookupIndex::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wordlist::{fixtures, verify_wordlist};

    fn index(value: u32) -> LookupIndex {
        LookupIndex::new(value).unwrap()
    }

    fn parse_err(text: &str) -> (usize, &'static str) {
        match WordlistResolver::parse(text.as_bytes()) {
            Err(GenerationError::MalformedRecord { line, reason }) => (line, reason),
            other => panic!("expected malformed record, got {:?}", other.map(|r| r.len())),
        }
    }

    #[test]
    fn test_resolve_short_fixture() {
        let verified = verify_wordlist(&fixtures::short()).unwrap();
        let resolver = WordlistResolver::from_verified(&verified).unwrap();

        assert_eq!(resolver.len(), 11);
        assert!(!resolver.is_complete());
        assert_eq!(resolver.resolve(index(11111)).unwrap(), "abacus");
        assert_eq!(resolver.resolve(index(35426)).unwrap(), "life");
        assert_eq!(resolver.resolve(index(66665)).unwrap(), "zone");
    }

    #[test]
    fn test_resolve_missing_index_fails() {
        let verified = verify_wordlist(&fixtures::short()).unwrap();
        let resolver = WordlistResolver::from_verified(&verified).unwrap();

        let err = resolver.resolve(index(66666)).unwrap_err();
        assert!(matches!(err, GenerationError::NoMatch(i) if i.value() == 66666));
    }

    #[test]
    fn test_full_fixture_is_complete() {
        let verified = verify_wordlist(&fixtures::full()).unwrap();
        let resolver = WordlistResolver::from_verified(&verified).unwrap();

        assert!(resolver.is_complete());
        assert_eq!(resolver.resolve(LookupIndex::MIN).unwrap(), "babae");
        assert_eq!(resolver.resolve(LookupIndex::MAX).unwrap(), "totox");
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let resolver = WordlistResolver::parse(b"11111\tcat\r\n\r\n11112\tdog\r\n\n").unwrap();
        assert_eq!(resolver.len(), 2);
        assert_eq!(resolver.resolve(index(11112)).unwrap(), "dog");
    }

    #[test]
    fn test_malformed_records() {
        assert_eq!(parse_err("11111 cat\n"), (1, "missing tab separator"));
        assert_eq!(parse_err("11111\tcat\n11170\tdog\n"), (2, "index is not five die faces"));
        assert_eq!(parse_err("1111\tcat\n"), (1, "index is not five die faces"));
        assert_eq!(parse_err("+1111\tcat\n"), (1, "index is not five die faces"));
        assert_eq!(parse_err("11111\t\n"), (1, "empty word"));
        assert_eq!(parse_err("11111\tcat dog\n"), (1, "word contains whitespace"));
        assert_eq!(parse_err("11111\tabcdefghijklmnopq\n"), (1, "word is too long"));
        assert_eq!(parse_err("11111\tcat\n\n11111\tdog\n"), (3, "duplicate index"));
    }

    #[test]
    fn test_invalid_utf8() {
        let err = WordlistResolver::parse(b"11111\t\xff\xfe\n").unwrap_err();
        assert!(matches!(err, GenerationError::MalformedRecord { line: 0, .. }));
    }
}
