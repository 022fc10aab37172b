pub mod config;
pub mod dice;
pub mod error;
pub mod generator;
pub mod index;
pub mod resolver;
pub mod secure;
pub mod wordlist;

pub use dice::{DiceRoller, DieRoll, RandomSource};
pub use error::{AllocationError, EntropyError, GenerationError, IntegrityError};
pub use generator::{generate_passphrase, Passphrase, PassphraseBuilder};
pub use index::{build_index, LookupIndex};
pub use resolver::WordlistResolver;
pub use secure::{LockPolicy, SecureBuffer};
pub use wordlist::{verify_wordlist, VerifiedWordlist, WordlistCatalog, WordlistDescriptor};
