//! Per-line assembly record (§3 "LineInfo").

use crate::symbols::SymbolKind;

/// One processed source line. Append-only during pass construction; only the
/// `bytes` field is ever patched afterward (forward-reference back-patching).
#[derive(Debug, Clone)]
pub struct LineInfo {
	/// 1-based line number within its originating source.
	pub line_number: u32,
	/// Name of the originating source.
	pub filename: std::rc::Rc<str>,
	/// Program counter at the start of this line, if it emitted anything.
	pub address: Option<u16>,
	/// Emitted machine-code bytes (0..3 ordinarily, unbounded for `HEX`/`DS`/`ASC`).
	pub bytes: Vec<u8>,
	/// Whether this line's bytes (if any) fall inside a `DUM`/`DEND` dummy segment.
	pub in_dummy_segment: bool,
	/// Nesting depth for `PUT`/`LUP`, rendered as extra listing indent.
	pub indent_listing: u32,
	/// If this line defines a symbol, its key and display name.
	pub defines_symbol: Option<(String, SymbolKind)>,
	/// Verbatim source text, for the listing.
	pub source_text: String,
	/// Set when the line's statement sits under an inactive `DO`/`ELSE` arm:
	/// still listed, never emits bytes or defines symbols.
	pub suppressed: bool,
}

impl LineInfo {
	/// A record for a line that produced no bytes (directive, label-only, blank).
	pub fn new(
		line_number: u32,
		filename: std::rc::Rc<str>,
		source_text: String,
		indent_listing: u32,
	) -> Self {
		Self {
			line_number,
			filename,
			address: None,
			bytes: Vec::new(),
			in_dummy_segment: false,
			indent_listing,
			defines_symbol: None,
			source_text,
			suppressed: false,
		}
	}

	/// Number of machine-code bytes this line is responsible for.
	pub fn machine_code_size(&self) -> usize {
		self.bytes.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn new_line_starts_empty() {
		let line = LineInfo::new(1, "f".into(), " lda #$60".to_string(), 0);
		assert_eq!(line.machine_code_size(), 0);
		assert!(line.address.is_none());
		assert!(!line.suppressed);
	}
}
