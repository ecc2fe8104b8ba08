//! # dawgdict
//!
//! A dictionary engine storing a sorted word set in a minimized acyclic
//! automaton (DAWG — Directed Acyclic Word Graph).
//!
//! The graph is built incrementally from words supplied in strictly
//! increasing lexicographic order, using the algorithm described in:
//!
//! > Daciuk, Jan, et al. "Incremental construction of minimal acyclic
//! > finite-state automata." Computational Linguistics 26.1 (2000): 3-16.
//!
//! On top of membership and prefix queries the crate provides wildcard
//! pattern enumeration, a compact binary dump format, and a minimal perfect
//! hash mapping every accepted word to a dense rank in `1..=len` (after
//! Lucchesi & Kowaltowski, 1993).
//!
//! ## Example
//!
//! ```rust,ignore
//! use dawgdict::prelude::*;
//!
//! let dawg = Dawg::new();
//! dawg.add_word("cat")?;
//! dawg.add_word("dog")?;
//! dawg.add_word("dogs")?;
//! dawg.close();
//!
//! assert!(dawg.contains("dog"));
//! assert_eq!(dawg.longest_prefix("doge"), 3);
//!
//! let bytes = dawg.save();
//! let restored = Dawg::from_bytes(&bytes)?;
//! assert_eq!(restored.word_count(), 3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dawg;
pub mod serialization;

/// Common imports for convenient usage
pub mod prelude {
    pub use crate::dawg::iterator::{MatchKind, WordIter};
    pub use crate::dawg::{AddResult, Dawg, DawgError, DawgState, DawgStats};
    pub use crate::serialization::LoadError;
}
