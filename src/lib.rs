//! # snap
//!
//! A two-pass 6502/65C02 cross-assembler in the Apple II Merlin dialect,
//! collapsed into a single logical pass with inline forward-reference
//! back-patching.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use snap::{AssemblerCore, Config};
//! use std::path::Path;
//!
//! let config = Config::new();
//! match AssemblerCore::assemble_path(config, Path::new("game.s")) {
//!     Ok(outcome) => {
//!         println!("assembled with {} error(s)", outcome.error_count);
//!     }
//!     Err(e) => eprintln!("assembly failed: {e}"),
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod core;
pub mod directives;
pub mod error;
pub mod instructions;
pub mod output;
pub mod parsing;
pub mod symbols;
pub mod text;

pub use crate::config::Config;
pub use crate::core::{AssemblerCore, AssemblyOutcome};
pub use crate::error::{AssemblyError, AssemblyResult};
pub use crate::instructions::{AddressMode, Mnemonic, ProcessorMode};
pub use crate::symbols::{Symbol, SymbolKind, SymbolTable};

/// Library version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_version_string() {
		assert!(!VERSION.is_empty());
	}
}
