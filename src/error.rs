//! Error handling for the assembler.
//!
//! A single [`AssemblyError`] enum covers every failure kind from spec §7, each
//! carrying a [`SourcePos`] where the spec's diagnostic format needs one. Severity
//! ordering recovers the C original's "most severe code wins" exception model
//! (`try_catch.h`) without global mutable state: callers fold results at the line
//! boundary via [`ErrorCollector`].

use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;
use thiserror::Error;

/// Result type used throughout the assembler.
pub type AssemblyResult<T> = Result<T, AssemblyError>;

/// A position in source for diagnostics and listing attribution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourcePos {
	/// Name of the originating source (as it should appear in diagnostics).
	pub file: Rc<str>,
	/// 1-based line number within that source.
	pub line: u32,
}

impl SourcePos {
	/// Create a new source position.
	pub fn new(file: impl Into<Rc<str>>, line: u32) -> Self {
		Self {
			file: file.into(),
			line,
		}
	}

	/// A placeholder position for errors not attributable to a specific line.
	pub fn unknown() -> Self {
		Self::new("<unknown>", 0)
	}
}

impl fmt::Display for SourcePos {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.file, self.line)
	}
}

/// Severity of an error, used to fold the most severe outcome across nested
/// operations the way the original's monotonic exception code does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
	/// A warning: reported, but does not increment the error count or abort the run.
	Warning,
	/// A normal per-line error: reported, increments the error count, assembly
	/// resumes at the next line.
	Error,
	/// A fatal error: aborts the entire run (flush failures, config errors).
	Fatal,
}

/// Comprehensive error type for assembly operations.
#[derive(Error, Debug, Clone)]
pub enum AssemblyError {
	/// Could not open, read, or write a file.
	#[error("{}: {message}", pos.as_ref().map(ToString::to_string).unwrap_or_else(|| "<io>".to_string()))]
	Io {
		pos: Option<SourcePos>,
		message: String,
	},

	/// `PUT` target, or the top-level source file, does not exist.
	#[error(
		"{}",
		if *via_put {
			format!("Failed to PUT '{}' source file.", path.display())
		} else {
			format!("Failed to open '{}' source file.", path.display())
		}
	)]
	FileNotFound { path: PathBuf, via_put: bool },

	/// An output file could not be opened for writing during flush.
	#[error("Failed to save output.")]
	FileOpenFailed,

	/// A line failed to parse (label/operator/operand/comment shape, unknown
	/// mnemonic, malformed expression).
	#[error("{pos}: error: {message}")]
	Parse { pos: SourcePos, message: String },

	/// A line parsed but failed a semantic check (duplicate symbol, undefined
	/// symbol at end of input, addressing-mode mismatch, range overflow).
	#[error("{pos}: error: {message}")]
	Semantic { pos: SourcePos, message: String },

	/// Misuse of a block-structured directive: unmatched `DEND`/`FIN`/`ELSE`/`--^`,
	/// a directive missing its required operand, nesting beyond the maximum depth.
	#[error("{pos}: error: {message}")]
	DirectiveMisuse { pos: SourcePos, message: String },

	/// Invalid host configuration (bad init parameters).
	#[error("Configuration error: {message}")]
	Config { message: String },

	/// Internal invariant violation; should not occur in normal operation.
	#[error("internal error: {message}")]
	Internal { message: String },

	/// Several per-line errors were collected over the course of a run.
	#[error("{} error(s) occurred during assembly", .0.len())]
	Multiple(Vec<AssemblyError>),
}

impl AssemblyError {
	/// Construct a file-not-found error. `via_put` distinguishes a failed `PUT`
	/// target from the top-level CLI-supplied source file, which uses
	/// different wording since no `PUT` directive is involved.
	pub fn file_not_found(path: PathBuf, via_put: bool) -> Self {
		Self::FileNotFound { path, via_put }
	}

	/// Construct a parse error at `pos`.
	pub fn parse(pos: SourcePos, message: impl Into<String>) -> Self {
		Self::Parse {
			pos,
			message: message.into(),
		}
	}

	/// Construct a semantic error at `pos`.
	pub fn semantic(pos: SourcePos, message: impl Into<String>) -> Self {
		Self::Semantic {
			pos,
			message: message.into(),
		}
	}

	/// Construct a directive-misuse error at `pos`.
	pub fn directive_misuse(pos: SourcePos, message: impl Into<String>) -> Self {
		Self::DirectiveMisuse {
			pos,
			message: message.into(),
		}
	}

	/// Source position this error is attributable to, if any.
	pub fn pos(&self) -> Option<&SourcePos> {
		match self {
			Self::Io { pos, .. } => pos.as_ref(),
			Self::Parse { pos, .. }
			| Self::Semantic { pos, .. }
			| Self::DirectiveMisuse { pos, .. } => Some(pos),
			Self::FileNotFound { .. }
			| Self::FileOpenFailed
			| Self::Config { .. }
			| Self::Internal { .. }
			| Self::Multiple(_) => None,
		}
	}

	/// Severity of this error, used by the most-severe-wins fold.
	pub fn severity(&self) -> Severity {
		match self {
			Self::Parse { .. } | Self::Semantic { .. } | Self::DirectiveMisuse { .. } => {
				Severity::Error
			}
			Self::Io { .. }
			| Self::FileNotFound { .. }
			| Self::FileOpenFailed
			| Self::Config { .. }
			| Self::Internal { .. } => Severity::Fatal,
			Self::Multiple(errors) => {
				errors.iter().map(AssemblyError::severity).max().unwrap_or(Severity::Error)
			}
		}
	}

	/// Whether this error should abort the entire run rather than just the
	/// current line (spec §4.9, §7).
	pub fn is_fatal(&self) -> bool {
		self.severity() == Severity::Fatal
	}

	/// Fold a list of per-line errors into a single error, the way the C
	/// original's global exception code folds to the most severe code seen.
	pub fn multiple(errors: Vec<AssemblyError>) -> Self {
		match errors.len() {
			0 => Self::Internal {
				message: "multiple() called with no errors".to_string(),
			},
			1 => errors.into_iter().next().unwrap(),
			_ => Self::Multiple(errors),
		}
	}
}

impl From<std::io::Error> for AssemblyError {
	fn from(err: std::io::Error) -> Self {
		Self::Io {
			pos: None,
			message: err.to_string(),
		}
	}
}

/// A diagnostic emitted during assembly: either a line-attributed error (which
/// increments the error count) or a warning (which does not), per spec §4.9/§7.
#[derive(Debug, Clone)]
pub enum Diagnostic {
	/// Increments the error count.
	Error(AssemblyError),
	/// `"{file}:{line}: warning: {message}"`, does not increment the error count.
	Warning { pos: SourcePos, message: String },
}

impl fmt::Display for Diagnostic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Error(err) => write!(f, "{err}"),
			Self::Warning { pos, message } => write!(f, "{pos}: warning: {message}"),
		}
	}
}

/// Collects diagnostics over an assembly run and folds them per spec §4.9/§7:
/// the write queue is discarded if any error was reported, but warnings never
/// block output.
#[derive(Debug, Default)]
pub struct ErrorCollector {
	diagnostics: Vec<Diagnostic>,
	error_count: usize,
}

impl ErrorCollector {
	/// Create an empty collector.
	pub fn new() -> Self {
		Self::default()
	}

	/// Record an error; increments the error count.
	pub fn push_error(&mut self, error: AssemblyError) {
		self.error_count += 1;
		self.diagnostics.push(Diagnostic::Error(error));
	}

	/// Record a warning; does not increment the error count.
	pub fn push_warning(&mut self, pos: SourcePos, message: impl Into<String>) {
		self.diagnostics.push(Diagnostic::Warning {
			pos,
			message: message.into(),
		});
	}

	/// Number of errors recorded (warnings excluded).
	pub fn error_count(&self) -> usize {
		self.error_count
	}

	/// Whether any error (not counting warnings) was recorded.
	pub fn has_errors(&self) -> bool {
		self.error_count > 0
	}

	/// All diagnostics in emission order.
	pub fn diagnostics(&self) -> &[Diagnostic] {
		&self.diagnostics
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn source_pos_display() {
		let pos = SourcePos::new("test.s", 42);
		assert_eq!(format!("{pos}"), "test.s:42");
	}

	#[test]
	fn parse_error_display() {
		let pos = SourcePos::new("filename", 1);
		let err = AssemblyError::parse(pos, "'foo' is not a recognized mnemonic or macro.");
		assert_eq!(format!("{err}"), "filename:1: error: 'foo' is not a recognized mnemonic or macro.");
	}

	#[test]
	fn severity_folds_to_most_severe() {
		let pos = SourcePos::new("f", 1);
		let warning = AssemblyError::parse(pos.clone(), "a");
		let fatal = AssemblyError::FileOpenFailed;
		let combined = AssemblyError::multiple(vec![warning, fatal]);
		assert_eq!(combined.severity(), Severity::Fatal);
		assert!(combined.is_fatal());
	}

	#[test]
	fn collector_tracks_errors_but_not_warnings() {
		let mut collector = ErrorCollector::new();
		collector.push_warning(SourcePos::new("f", 1), "ignoring operand as comment");
		assert!(!collector.has_errors());
		collector.push_error(AssemblyError::parse(SourcePos::new("f", 2), "bad"));
		assert!(collector.has_errors());
		assert_eq!(collector.error_count(), 1);
		assert_eq!(collector.diagnostics().len(), 2);
	}
}
