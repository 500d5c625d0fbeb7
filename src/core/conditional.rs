//! `DO`/`ELSE`/`FIN` conditional-assembly stack (§3 "ConditionalStack").

use crate::error::{AssemblyError, AssemblyResult, SourcePos};

/// Maximum nesting depth for `DO` blocks.
pub const MAX_DEPTH: usize = 8;

#[derive(Debug, Clone, Copy)]
struct Frame {
	active: bool,
	saw_else: bool,
	parent_active: bool,
}

/// Tracks nested `DO`/`ELSE`/`FIN` blocks. The effective emitting state is the
/// conjunction of `active` over the whole stack.
#[derive(Debug, Default)]
pub struct ConditionalStack {
	frames: Vec<Frame>,
}

impl ConditionalStack {
	/// An empty stack: assembly is active at top level.
	pub fn new() -> Self {
		Self::default()
	}

	/// Whether bytes should currently be emitted and symbols defined.
	pub fn is_active(&self) -> bool {
		self.frames.iter().all(|f| f.active)
	}

	/// Push a `DO condition` frame.
	pub fn push_do(&mut self, condition_nonzero: bool, pos: &SourcePos) -> AssemblyResult<()> {
		if self.frames.len() >= MAX_DEPTH {
			return Err(AssemblyError::directive_misuse(
				pos.clone(),
				"DO nested too deeply; maximum depth is 8.".to_string(),
			));
		}
		let parent_active = self.is_active();
		self.frames.push(Frame {
			active: parent_active && condition_nonzero,
			saw_else: false,
			parent_active,
		});
		Ok(())
	}

	/// Handle `ELSE`: flips the top frame's arm, erroring on a second `ELSE`
	/// or an `ELSE` with no open `DO`.
	pub fn else_arm(&mut self, pos: &SourcePos) -> AssemblyResult<()> {
		let frame = self
			.frames
			.last_mut()
			.ok_or_else(|| AssemblyError::directive_misuse(pos.clone(), "ELSE with no matching DO.".to_string()))?;
		if frame.saw_else {
			return Err(AssemblyError::directive_misuse(
				pos.clone(),
				"Multiple ELSE clauses for the same DO.".to_string(),
			));
		}
		frame.saw_else = true;
		frame.active = frame.parent_active && !was_then_active(frame);
		Ok(())
	}

	/// Handle `FIN`: pops the current frame, erroring if none is open.
	pub fn fin(&mut self, pos: &SourcePos) -> AssemblyResult<()> {
		if self.frames.pop().is_none() {
			return Err(AssemblyError::directive_misuse(pos.clone(), "FIN with no matching DO.".to_string()));
		}
		Ok(())
	}

	/// Current nesting depth, for diagnostics.
	pub fn depth(&self) -> usize {
		self.frames.len()
	}

	/// True if any `DO` is still open at end-of-input (a warning condition).
	pub fn has_open_blocks(&self) -> bool {
		!self.frames.is_empty()
	}
}

fn was_then_active(frame: &Frame) -> bool {
	// Before flipping for ELSE, `active` held the THEN arm's state relative to
	// the parent; recover whether THEN had been the active arm.
	frame.parent_active && frame.active
}

#[cfg(test)]
mod tests {
	use super::*;

	fn pos() -> SourcePos {
		SourcePos::new("f", 1)
	}

	#[test]
	fn nonzero_condition_activates_then_arm() {
		let mut stack = ConditionalStack::new();
		stack.push_do(true, &pos()).unwrap();
		assert!(stack.is_active());
	}

	#[test]
	fn zero_condition_activates_else_arm() {
		let mut stack = ConditionalStack::new();
		stack.push_do(false, &pos()).unwrap();
		assert!(!stack.is_active());
		stack.else_arm(&pos()).unwrap();
		assert!(stack.is_active());
	}

	#[test]
	fn fin_without_do_errors() {
		let mut stack = ConditionalStack::new();
		assert!(stack.fin(&pos()).is_err());
	}

	#[test]
	fn nesting_depth_enforced() {
		let mut stack = ConditionalStack::new();
		for _ in 0..MAX_DEPTH {
			stack.push_do(true, &pos()).unwrap();
		}
		assert!(stack.push_do(true, &pos()).is_err());
	}

	#[test]
	fn inactive_parent_keeps_child_inactive_regardless_of_condition() {
		let mut stack = ConditionalStack::new();
		stack.push_do(false, &pos()).unwrap();
		stack.push_do(true, &pos()).unwrap();
		assert!(!stack.is_active());
	}
}
