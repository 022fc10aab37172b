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

use anyhow::{Context, Result};
use console::{Style, Term};
use diceware::{LockPolicy, Passphrase, SecureBuffer, WordlistCatalog};
use std::fs::File;
use std::io::{self, Write};

pub const STRONG_ENTROPY: f64 = 77.0;
pub const PARANOID_ENTROPY: f64 = 128.0;

pub const MIN_SAFE_WORD_COUNT: usize = 6;

const BANNER: [&str; 4] = [
    "*********************************",
    "* Diceware Passphrase Generator *",
    "*                               *",
    "*********************************",
];

pub struct OutputInfo<'a> {
    pub wordlist_name: &'a str,
    pub wordlist_size: usize,
    pub word_count: usize,
}

pub struct DisplayOptions {
    pub unicode_support: bool,
    pub color_support: bool,
    pub quiet: bool,
}

pub fn detect_unicode_support() -> bool {
    supports_unicode::on(supports_unicode::Stream::Stdout)
}

pub fn detect_color_support() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

pub fn get_status_symbols(unicode_support: bool) -> (&'static str, &'static str) {
    if unicode_support {
        ("✓", "!")
    } else {
        ("+", "!")
    }
}

fn tree_branches(unicode_support: bool) -> (&'static str, &'static str) {
    if unicode_support {
        ("├─", "└─")
    } else {
        ("|-", "`-")
    }
}

pub fn clear_screen() {
    Term::stdout().clear_screen().ok();
}

pub fn print_banner() {
    println!("\n");
    for line in BANNER {
        println!("{}", line);
    }
    println!();
}

fn read_answer() -> Result<String> {
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin()
        .read_line(&mut answer)
        .context("Failed to read answer")?;
    Ok(answer)
}

pub fn prompt_wordlist(catalog: &WordlistCatalog) -> Result<String> {
    println!("Choose a wordlist:\n");
    for (i, entry) in catalog.entries().iter().enumerate() {
        let file = entry
            .path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        println!("{}. {} ({})", i + 1, entry.name, file);
    }
    println!();

    read_answer()
}

pub fn prompt_length() -> Result<String> {
    println!("Enter the length of the passphrase (in words):");
    println!("Type 0 to use the default (six words)\n");

    read_answer()
}

pub fn warn_defaulted(setting: &str, value: usize) {
    let term = Term::stderr();
    term.write_line(&format!(
        "WARNING: invalid {}, using the default ({}).",
        setting, value
    ))
    .ok();
}

pub fn display_output(
    passphrase: &Passphrase,
    info: &OutputInfo,
    options: &DisplayOptions,
) -> Result<()> {
    let mut stdout = unbuffered_stdout()?;

    if options.quiet {
        return write_passphrase(&mut stdout, "", passphrase, "\n");
    }

    write_passphrase(&mut stdout, "\nPassphrase: ", passphrase, "\n\n")?;

    let entropy = info.word_count as f64 * (info.wordlist_size as f64).log2();
    display_stats(entropy, passphrase.len(), info, options);

    println!("\nWarning: remember to clear terminal and keep passphrase confidential.\n");
    Ok(())
}

/// Second handle on stdout that skips the std line buffer.
fn unbuffered_stdout() -> Result<File> {
    let mut stdout = io::stdout();
    stdout.flush()?;

    #[cfg(unix)]
    let owned = {
        use std::os::fd::AsFd;
        stdout.as_fd().try_clone_to_owned()
    };
    #[cfg(windows)]
    let owned = {
        use std::os::windows::io::AsHandle;
        stdout.as_handle().try_clone_to_owned()
    };

    Ok(File::from(owned.context("Failed to duplicate stdout")?))
}

/// Assembles the whole line in protected memory and hands it to `out` in one write.
fn write_passphrase<W: Write>(
    out: &mut W,
    prefix: &str,
    passphrase: &Passphrase,
    suffix: &str,
) -> Result<()> {
    let capacity = prefix.len() + passphrase.len() + suffix.len();
    let mut line = SecureBuffer::with_policy(capacity, LockPolicy::BestEffort)?;
    line.extend_from_slice(prefix.as_bytes())?;
    line.extend_from_slice(passphrase.as_bytes())?;
    line.extend_from_slice(suffix.as_bytes())?;

    out.write_all(line.as_bytes())
        .and_then(|()| out.flush())
        .context("Failed to write passphrase")
}

fn display_stats(entropy: f64, length: usize, info: &OutputInfo, options: &DisplayOptions) {
    let (check_ok, check_warn) = get_status_symbols(options.unicode_support);
    let (branch, last) = tree_branches(options.unicode_support);

    let plain = Style::new();
    let (status_icon, entropy_style, status_text) = if entropy >= PARANOID_ENTROPY {
        (check_ok, Style::new().green(), "Paranoid")
    } else if entropy >= STRONG_ENTROPY {
        (check_ok, Style::new().green(), "Strong")
    } else {
        (check_warn, Style::new().yellow(), "Weak")
    };
    let entropy_style = if options.color_support {
        entropy_style
    } else {
        plain.clone()
    };

    let words_secure = info.word_count >= MIN_SAFE_WORD_COUNT;
    let words_style = match (options.color_support, words_secure) {
        (false, _) => plain,
        (true, true) => Style::new().green(),
        (true, false) => Style::new().yellow(),
    };
    let words_status = if words_secure { check_ok } else { check_warn };

    println!("Stats:");
    println!(
        "  {} Entropy    {} {} bits ({})",
        branch,
        entropy_style.apply_to(format!("[{}]", status_icon)),
        entropy_style.apply_to(format!("{:.1}", entropy)),
        entropy_style.apply_to(status_text)
    );
    println!(
        "  {} Words      {} {} {}",
        branch,
        words_style.apply_to(format!("[{}]", words_status)),
        words_style.apply_to(info.word_count),
        if info.word_count == 1 { "word" } else { "words" }
    );
    println!(
        "  {} Length     {} {}",
        branch,
        length,
        if length == 1 { "char" } else { "chars" }
    );
    println!(
        "  {} Wordlist   {} ({} words, SHA-256 verified)",
        last, info.wordlist_name, info.wordlist_size
    );

    println!(
        "\n{} Security: {}",
        entropy_style.apply_to(format!("[{}]", status_icon)),
        entropy_style.apply_to(status_text)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use diceware::{
        verify_wordlist, DieRoll, PassphraseBuilder, RandomSource, WordlistDescriptor,
        WordlistResolver,
    };
    use std::io::{Read, Seek};
    use std::path::Path;

    struct AllOnes;

    impl RandomSource for AllOnes {
        fn roll_die(&mut self) -> DieRoll {
            1
        }
    }

    fn short_passphrase(words: usize) -> Passphrase {
        let descriptor = WordlistDescriptor::new(
            "Short fixture",
            Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/short.wordlist.txt"),
            "fdd46d3fa18d8326b9755f67157986ac02bafa26d40b739f4b6c4b058636dd94",
        );
        let verified = verify_wordlist(&descriptor).unwrap();
        let resolver = WordlistResolver::from_verified(&verified).unwrap();
        PassphraseBuilder::new(&resolver, AllOnes).build(words).unwrap()
    }

    #[test]
    fn test_write_passphrase_to_file() {
        let passphrase = short_passphrase(2);
        let mut file = tempfile::tempfile().unwrap();

        write_passphrase(&mut file, "\nPassphrase: ", &passphrase, "\n\n").unwrap();

        let mut written = String::new();
        file.rewind().unwrap();
        file.read_to_string(&mut written).unwrap();
        assert_eq!(written, "\nPassphrase: abacus-abacus\n\n");
    }

    #[test]
    fn test_write_passphrase_quiet_line() {
        let passphrase = short_passphrase(1);
        let mut out = Vec::new();

        write_passphrase(&mut out, "", &passphrase, "\n").unwrap();
        assert_eq!(out, b"abacus\n");
    }

    #[test]
    fn test_get_status_symbols_unicode() {
        let (ok, warn) = get_status_symbols(true);
        assert_eq!(ok, "✓");
        assert_eq!(warn, "!");
    }

    #[test]
    fn test_get_status_symbols_ascii() {
        let (ok, warn) = get_status_symbols(false);
        assert_eq!(ok, "+");
        assert_eq!(warn, "!");
    }

    #[test]
    fn test_tree_branches_ascii_only_when_requested() {
        let (branch, last) = tree_branches(false);
        assert!(branch.is_ascii() && last.is_ascii());

        let (branch, last) = tree_branches(true);
        assert!(!branch.is_ascii() && !last.is_ascii());
    }

    #[test]
    fn test_default_length_is_strong() {
        let entropy = MIN_SAFE_WORD_COUNT as f64 * 7776f64.log2();
        assert!(entropy >= STRONG_ENTROPY, "entropy {:.1}", entropy);
        assert!(entropy < PARANOID_ENTROPY);
    }

    #[test]
    fn test_banner_lines_aligned() {
        assert!(BANNER.iter().all(|line| line.len() == BANNER[0].len()));
    }
}
