//! Shared helpers for end-to-end assembly tests.

use snap::config::Config;
use snap::core::AssemblerCore;
use snap::error::AssemblyResult;
use snap::text::{SourceKind, TextFile};

/// Assemble `source` as a standalone top-level file named `test.s`.
pub fn assemble(source: &str) -> AssemblyResult<snap::AssemblyOutcome> {
	assemble_with(Config::new(), source)
}

/// Assemble `source` under a caller-supplied `Config`.
pub fn assemble_with(config: Config, source: &str) -> AssemblyResult<snap::AssemblyOutcome> {
	let top = TextFile::new("test.s", source.to_string(), SourceKind::TopLevel);
	AssemblerCore::new(config, top).run()
}
