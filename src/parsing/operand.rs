//! Recognizes operand *shape* (addressing-mode punctuation) and strips it down
//! to the bare expression text the evaluator understands (§4.6 "Mode inference").

use crate::error::{AssemblyError, AssemblyResult, SourcePos};
use crate::instructions::OperandShape;

/// Split `operand` into its addressing-mode shape and the expression text
/// still inside it (parens/index suffixes removed, `#` left intact since the
/// expression grammar itself understands the immediate prefix).
pub fn parse_shape<'a>(operand: &'a str, pos: &SourcePos) -> AssemblyResult<(OperandShape, &'a str)> {
	let trimmed = operand.trim();
	if trimmed.is_empty() {
		return Ok((OperandShape::Implied, trimmed));
	}
	if trimmed.starts_with('#') {
		return Ok((OperandShape::Immediate, trimmed));
	}
	if let Some(inner_start) = trimmed.strip_prefix('(').map(|_| 1usize) {
		let close = trimmed
			.find(')')
			.ok_or_else(|| AssemblyError::parse(pos.clone(), format!("Unbalanced parentheses in '{trimmed}'.")))?;
		let inner = &trimmed[inner_start..close];
		let after = trimmed[close + 1..].trim();

		if after.is_empty() {
			if let Some(base) = strip_index_suffix(inner, 'x') {
				return Ok((OperandShape::IndirectCommaX, base));
			}
			if inner.contains(',') {
				return Err(malformed(trimmed, pos));
			}
			return Ok((OperandShape::IndirectPlain, inner));
		}
		if after.eq_ignore_ascii_case(",y") && !inner.contains(',') {
			return Ok((OperandShape::IndirectY, inner));
		}
		return Err(malformed(trimmed, pos));
	}

	if let Some(base) = strip_index_suffix(trimmed, 'x') {
		return Ok((OperandShape::IndexedX, base));
	}
	if let Some(base) = strip_index_suffix(trimmed, 'y') {
		return Ok((OperandShape::IndexedY, base));
	}
	Ok((OperandShape::Direct, trimmed))
}

fn strip_index_suffix(text: &str, reg: char) -> Option<&str> {
	let trimmed = text.trim_end();
	let bytes = trimmed.as_bytes();
	if bytes.len() < 2 {
		return None;
	}
	let last = trimmed.chars().last()?;
	if !last.eq_ignore_ascii_case(&reg) {
		return None;
	}
	let without_reg = &trimmed[..trimmed.len() - last.len_utf8()];
	let without_reg = without_reg.trim_end();
	without_reg.strip_suffix(',').map(|base| base.trim_end())
}

fn malformed(text: &str, pos: &SourcePos) -> AssemblyError {
	AssemblyError::parse(pos.clone(), format!("Malformed indirect operand '{text}'."))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn pos() -> SourcePos {
		SourcePos::new("f", 1)
	}

	#[test]
	fn implied_is_empty() {
		assert_eq!(parse_shape("", &pos()).unwrap().0, OperandShape::Implied);
	}

	#[test]
	fn immediate_keeps_hash() {
		let (shape, text) = parse_shape("#$60", &pos()).unwrap();
		assert_eq!(shape, OperandShape::Immediate);
		assert_eq!(text, "#$60");
	}

	#[test]
	fn indexed_x_and_y() {
		assert_eq!(parse_shape("LABEL,X", &pos()).unwrap(), (OperandShape::IndexedX, "LABEL"));
		assert_eq!(parse_shape("LABEL,Y", &pos()).unwrap(), (OperandShape::IndexedY, "LABEL"));
	}

	#[test]
	fn indirect_shapes() {
		assert_eq!(parse_shape("($20,X)", &pos()).unwrap(), (OperandShape::IndirectCommaX, "$20"));
		assert_eq!(parse_shape("($20),Y", &pos()).unwrap(), (OperandShape::IndirectY, "$20"));
		assert_eq!(parse_shape("($20)", &pos()).unwrap(), (OperandShape::IndirectPlain, "$20"));
	}

	#[test]
	fn plain_direct() {
		assert_eq!(parse_shape("$0800", &pos()).unwrap(), (OperandShape::Direct, "$0800"));
	}
}
