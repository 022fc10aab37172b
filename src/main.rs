mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use diceware::config::{correct_length, correct_wordlist};
use diceware::dice::DiceRoller;
use diceware::wordlist::verify_wordlist_with_policy;
use diceware::{LockPolicy, PassphraseBuilder, WordlistCatalog, WordlistResolver};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "diceware",
    version,
    author,
    about = "Diceware passphrase generator with integrity-verified word lists"
)]
struct Cli {
    /// Word list number from the catalog; prompts when omitted
    #[arg(short, long)]
    wordlist: Option<String>,

    /// Passphrase length in words; prompts when omitted
    #[arg(short, long)]
    length: Option<String>,

    /// Directory holding the word list files
    #[arg(short = 'd', long, default_value = ".")]
    wordlist_dir: PathBuf,

    /// Fail instead of continuing when memory cannot be locked against swapping
    #[arg(long)]
    require_mlock: bool,

    /// Keep the terminal contents
    #[arg(long)]
    no_clear: bool,

    /// Print only the passphrase
    #[arg(short, long)]
    quiet: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let options = ui::DisplayOptions {
        unicode_support: ui::detect_unicode_support(),
        color_support: ui::detect_color_support(),
        quiet: cli.quiet,
    };

    let policy = if cli.require_mlock {
        LockPolicy::Required
    } else {
        LockPolicy::BestEffort
    };

    if !cli.quiet {
        if !cli.no_clear {
            ui::clear_screen();
        }
        ui::print_banner();
    }

    let catalog = WordlistCatalog::builtin(&cli.wordlist_dir);

    let raw_selection = match cli.wordlist {
        Some(raw) => raw,
        None if cli.quiet => String::new(),
        None => ui::prompt_wordlist(&catalog)?,
    };
    let selection = correct_wordlist(&raw_selection, catalog.len());
    if selection.defaulted && !raw_selection.trim().is_empty() {
        ui::warn_defaulted("wordlist choice", selection.value);
    }

    let descriptor = catalog
        .select(selection.value)
        .context("Wordlist catalog is empty")?;

    let verified = verify_wordlist_with_policy(descriptor, policy)
        .with_context(|| format!("Refusing to use wordlist \"{}\"", descriptor.name))?;

    let raw_length = match cli.length {
        Some(raw) => raw,
        None if cli.quiet => String::new(),
        None => ui::prompt_length()?,
    };
    let length = correct_length(&raw_length);
    if length.defaulted && !raw_length.trim().is_empty() {
        ui::warn_defaulted("passphrase length", length.value);
    }

    let resolver =
        WordlistResolver::from_verified(&verified).context("Failed to parse verified wordlist")?;
    let roller = DiceRoller::with_policy(policy).context("Failed to seed the die")?;

    let passphrase = PassphraseBuilder::new(&resolver, roller)
        .lock_policy(policy)
        .build(length.value)
        .context("Failed to generate passphrase")?;

    let info = ui::OutputInfo {
        wordlist_name: &descriptor.name,
        wordlist_size: resolver.len(),
        word_count: passphrase.word_count(),
    };
    ui::display_output(&passphrase, &info, &options)?;

    drop(passphrase);
    Ok(())
}
