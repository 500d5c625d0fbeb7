//! Source stacking: `TextFile`, the restartable per-source line reader, and the
//! `SourceStack` that lets `PUT` and `LUP` push a fresh source over the one in
//! progress (§4.1).
//!
//! The original reads a `PUT`-included file into one mutable buffer and splits it
//! in place, null-terminating each line within that same buffer. Rust's borrow
//! checker makes a literal self-referential "view into my own buffer" awkward, so
//! `TextFile` instead keeps a single owned `String` and a byte cursor, handing back
//! an owned line on each call; the buffer itself is still read once per source and
//! reused line-by-line, which is the property the original actually cares about.

use std::path::PathBuf;
use std::rc::Rc;

use crate::error::{AssemblyError, AssemblyResult, SourcePos};

/// How a source came to be pushed onto the stack, used to enforce "no nested
/// `PUT` within a `PUT`-included file" (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
	/// The file named on the command line.
	TopLevel,
	/// Pushed by a `PUT` directive.
	Put,
	/// An anonymous in-memory replay of a captured `LUP` block.
	Lup,
}

/// One entry on the source stack: an owned buffer plus a read cursor.
#[derive(Debug)]
pub struct TextFile {
	filename: Rc<str>,
	kind: SourceKind,
	contents: String,
	cursor: usize,
	line_number: u32,
}

impl TextFile {
	/// Wrap already-loaded text as a source.
	pub fn new(filename: impl Into<Rc<str>>, contents: String, kind: SourceKind) -> Self {
		Self {
			filename: filename.into(),
			kind,
			contents,
			cursor: 0,
			line_number: 0,
		}
	}

	/// Load a file from disk as a source. The host is expected to have already
	/// resolved the path; this just owns the buffer.
	pub fn from_disk(path: &std::path::Path, kind: SourceKind) -> AssemblyResult<Self> {
		let contents = std::fs::read_to_string(path)
			.map_err(|_| AssemblyError::file_not_found(path.to_path_buf(), kind == SourceKind::Put))?;
		let filename = path
			.file_name()
			.map(|n| n.to_string_lossy().into_owned())
			.unwrap_or_else(|| path.to_string_lossy().into_owned());
		Ok(Self::new(filename, contents, kind))
	}

	/// Name of this source as it should appear in diagnostics.
	pub fn filename(&self) -> Rc<str> {
		self.filename.clone()
	}

	/// How this source was pushed.
	pub fn kind(&self) -> SourceKind {
		self.kind
	}

	/// 1-based number of the line most recently returned by `next_line`.
	pub fn line_number(&self) -> u32 {
		self.line_number
	}

	/// True once every line has been consumed.
	pub fn end_of_input(&self) -> bool {
		self.cursor >= self.contents.len()
	}

	/// Yield the next logical line, normalizing `\r`, `\n`, `\r\n`, and `\n\r`
	/// terminators to a single break and stripping it from the returned text.
	pub fn next_line(&mut self) -> Option<String> {
		if self.end_of_input() {
			return None;
		}
		let rest = &self.contents[self.cursor..];
		let mut iter = rest.char_indices().peekable();
		let mut line_end = rest.len();
		let mut consumed_end = rest.len();
		while let Some((idx, ch)) = iter.next() {
			if ch == '\n' || ch == '\r' {
				line_end = idx;
				consumed_end = idx + ch.len_utf8();
				if let Some((next_idx, next_ch)) = iter.peek().copied() {
					let is_pair = (ch == '\r' && next_ch == '\n') || (ch == '\n' && next_ch == '\r');
					if is_pair {
						consumed_end = next_idx + next_ch.len_utf8();
					}
				}
				break;
			}
		}
		let line = rest[..line_end].to_string();
		self.cursor += consumed_end;
		self.line_number += 1;
		Some(line)
	}
}

/// A source plus the listing indent it contributes (one level per `PUT`/`LUP`
/// nesting, per §3 `LineInfo.indent_listing`).
struct StackEntry {
	file: TextFile,
	indent: u32,
}

/// Stack of in-progress sources. The top of the stack is the current line
/// producer; `PUT` and `LUP` push new entries, which are popped once exhausted.
pub struct SourceStack {
	entries: Vec<StackEntry>,
	max_depth: usize,
}

/// Default maximum nesting depth; the spec requires "implementation-defined, >= 8".
pub const DEFAULT_MAX_DEPTH: usize = 64;

impl SourceStack {
	/// Start a stack with the top-level source already loaded.
	pub fn new(top: TextFile) -> Self {
		Self {
			entries: vec![StackEntry { file: top, indent: 0 }],
			max_depth: DEFAULT_MAX_DEPTH,
		}
	}

	/// Push a new source (from `PUT` or `LUP`). Fails if the current top is
	/// itself a `PUT`-included file and `kind` is `Put` (no nested `PUT`), or if
	/// the stack is already at its maximum depth.
	pub fn push(&mut self, file: TextFile) -> AssemblyResult<()> {
		if file.kind() == SourceKind::Put {
			if let Some(top) = self.entries.last() {
				if top.file.kind() == SourceKind::Put {
					return Err(AssemblyError::Semantic {
						pos: self.current_pos(),
						message: "PUT cannot be nested within a PUT-included file.".to_string(),
					});
				}
			}
		}
		if self.entries.len() >= self.max_depth {
			return Err(AssemblyError::Semantic {
				pos: self.current_pos(),
				message: "Source nesting depth exceeded.".to_string(),
			});
		}
		let indent = self.entries.last().map(|e| e.indent).unwrap_or(0) + 1;
		self.entries.push(StackEntry { file, indent });
		Ok(())
	}

	/// Pull the next line from the top of the stack, popping exhausted sources
	/// until one yields a line or the stack empties.
	pub fn next_line(&mut self) -> Option<(String, SourcePos, u32)> {
		loop {
			let top = self.entries.last_mut()?;
			if let Some(line) = top.file.next_line() {
				let pos = SourcePos::new(top.file.filename(), top.file.line_number());
				let indent = top.indent;
				return Some((line, pos, indent));
			}
			self.entries.pop();
			if self.entries.is_empty() {
				return None;
			}
		}
	}

	/// True once every source on the stack is exhausted.
	pub fn end_of_input(&self) -> bool {
		self.entries.is_empty() || self.entries.iter().all(|e| e.file.end_of_input())
	}

	/// Source position for the current top, for diagnostics about the push
	/// itself (e.g. nesting errors) rather than a parsed line.
	pub fn current_pos(&self) -> SourcePos {
		self.entries
			.last()
			.map(|e| SourcePos::new(e.file.filename(), e.file.line_number()))
			.unwrap_or_else(SourcePos::unknown)
	}
}

/// Load a `PUT` target by trying each candidate path in turn, per the search
/// rules in [`crate::config::Config::resolve_put`].
pub fn load_put(candidates: &[PathBuf]) -> AssemblyResult<TextFile> {
	for path in candidates {
		if path.is_file() {
			return TextFile::from_disk(path, SourceKind::Put);
		}
	}
	Err(AssemblyError::file_not_found(candidates.first().cloned().unwrap_or_default(), true))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn splits_on_all_terminator_styles() {
		let mut file = TextFile::new("f", "a\nb\r\nc\rd\n\re".to_string(), SourceKind::TopLevel);
		let mut lines = Vec::new();
		while let Some(line) = file.next_line() {
			lines.push(line);
		}
		assert_eq!(lines, vec!["a", "b", "c", "d", "e"]);
	}

	#[test]
	fn line_number_increments() {
		let mut file = TextFile::new("f", "a\nb\n".to_string(), SourceKind::TopLevel);
		file.next_line();
		assert_eq!(file.line_number(), 1);
		file.next_line();
		assert_eq!(file.line_number(), 2);
	}

	#[test]
	fn stack_interleaves_put_then_resumes_parent() {
		let top = TextFile::new("top", "one\ntwo\n".to_string(), SourceKind::TopLevel);
		let mut stack = SourceStack::new(top);
		let (line, ..) = stack.next_line().unwrap();
		assert_eq!(line, "one");
		let included = TextFile::new("inc", "included\n".to_string(), SourceKind::Put);
		stack.push(included).unwrap();
		let (line, pos, indent) = stack.next_line().unwrap();
		assert_eq!(line, "included");
		assert_eq!(pos.file.as_ref(), "inc");
		assert_eq!(indent, 1);
		let (line, pos, indent) = stack.next_line().unwrap();
		assert_eq!(line, "two");
		assert_eq!(pos.file.as_ref(), "top");
		assert_eq!(indent, 0);
		assert!(stack.next_line().is_none());
	}

	#[test]
	fn rejects_put_nested_within_put() {
		let top = TextFile::new("top", "x\n".to_string(), SourceKind::TopLevel);
		let mut stack = SourceStack::new(top);
		stack
			.push(TextFile::new("a", "y\n".to_string(), SourceKind::Put))
			.unwrap();
		let result = stack.push(TextFile::new("b", "z\n".to_string(), SourceKind::Put));
        assert!(result.is_err());
	}

	#[test]
	fn missing_top_level_source_reports_open_not_put() {
		let err = TextFile::from_disk(std::path::Path::new("does-not-exist.s"), SourceKind::TopLevel).unwrap_err();
		assert!(err.to_string().contains("Failed to open 'does-not-exist.s' source file."));
	}

	#[test]
	fn missing_put_target_reports_put_wording() {
		let err = TextFile::from_disk(std::path::Path::new("does-not-exist.s"), SourceKind::Put).unwrap_err();
		assert!(err.to_string().contains("Failed to PUT 'does-not-exist.s' source file."));
	}
}
