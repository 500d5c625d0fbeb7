//! Line parsing: splitting one logical source line into label / operator /
//! operand / comment fields (§4.2), plus the expression evaluator and operand
//! shape recognizer used while evaluating them.

pub mod expr;
pub mod operand;

pub use expr::{evaluate, ExprValue, Resolver};
pub use operand::parse_shape;

use crate::error::{AssemblyError, AssemblyResult, SourcePos};

/// A fully comment line (`* ...`) or blank line is represented with every
/// field `None` except possibly `comment`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLine {
	/// Raw label text including any `:`/`]` sigil, as written.
	pub label: Option<String>,
	/// The operator word: a directive name or mnemonic, uppercased for lookup
	/// but comparisons are done case-insensitively regardless.
	pub operator: Option<String>,
	/// Operand text, not yet shape- or expression-parsed.
	pub operand: Option<String>,
	/// Trailing comment text, without the leading `;`.
	pub comment: Option<String>,
}

impl ParsedLine {
	/// True if this line has neither label nor operator (blank or pure comment).
	pub fn is_empty_statement(&self) -> bool {
		self.label.is_none() && self.operator.is_none()
	}
}

/// Split one raw source line (terminator already stripped) into its fields.
pub fn parse_line(raw: &str, pos: &SourcePos) -> AssemblyResult<ParsedLine> {
	if raw.trim().is_empty() {
		return Ok(ParsedLine::default());
	}
	if raw.starts_with('*') {
		return Ok(ParsedLine {
			comment: Some(raw[1..].to_string()),
			..Default::default()
		});
	}
	// `--^` can appear flush left with no label column, and `-` fails
	// `read_label`'s first-character check, so it is recognized before label
	// parsing is attempted at all.
	if raw.trim_start().starts_with("--^") {
		let after = &raw.trim_start()[3..];
		let (operand, comment) = read_operand_and_comment(&after.chars().collect::<Vec<char>>(), 0, pos)?;
		return Ok(ParsedLine {
			operator: Some("--^".to_string()),
			operand,
			comment,
			..Default::default()
		});
	}

	let chars: Vec<char> = raw.chars().collect();
	let mut idx = 0usize;
	let mut label = None;

	if !chars[0].is_whitespace() {
		if chars[0] == ';' {
			return Ok(ParsedLine {
				comment: Some(raw[1..].to_string()),
				..Default::default()
			});
		}
		let start = idx;
		label = Some(read_label(&chars, &mut idx, pos)?);
		let _ = start;
	}

	skip_whitespace(&chars, &mut idx);
	let operator = if idx < chars.len() && chars[idx] != ';' {
		Some(read_word(&chars, &mut idx))
	} else {
		None
	};

	skip_whitespace(&chars, &mut idx);
	let (operand, comment) = read_operand_and_comment(&chars, idx, pos)?;

	Ok(ParsedLine {
		label,
		operator,
		operand,
		comment,
	})
}

fn skip_whitespace(chars: &[char], idx: &mut usize) {
	while chars.get(*idx).is_some_and(|c| c.is_whitespace()) {
		*idx += 1;
	}
}

fn read_word(chars: &[char], idx: &mut usize) -> String {
	let start = *idx;
	while chars.get(*idx).is_some_and(|c| !c.is_whitespace()) {
		*idx += 1;
	}
	chars[start..*idx].iter().collect()
}

fn read_label(chars: &[char], idx: &mut usize, pos: &SourcePos) -> AssemblyResult<String> {
	let start = *idx;
	if matches!(chars.get(*idx), Some(':') | Some(']')) {
		*idx += 1;
	}
	match chars.get(*idx) {
		Some(c) if c.is_ascii_alphabetic() || *c == '_' => {
			*idx += 1;
		}
		_ => {
			let bad: String = chars[start..].iter().take_while(|c| !c.is_whitespace()).collect();
			return Err(AssemblyError::parse(
				pos.clone(),
				format!("'{bad}' is not a legal label."),
			));
		}
	}
	while chars.get(*idx).is_some_and(|c| c.is_ascii_alphanumeric() || *c == '_') {
		*idx += 1;
	}
	if chars.get(*idx).is_some_and(|c| !c.is_whitespace()) {
		let bad: String = chars[start..].iter().take_while(|c| !c.is_whitespace()).collect();
		return Err(AssemblyError::parse(
			pos.clone(),
			format!("'{bad}' is not a legal label."),
		));
	}
	Ok(chars[start..*idx].iter().collect())
}

fn read_operand_and_comment(
	chars: &[char],
	mut idx: usize,
	pos: &SourcePos,
) -> AssemblyResult<(Option<String>, Option<String>)> {
	if idx >= chars.len() {
		return Ok((None, None));
	}
	if chars[idx] == ';' {
		return Ok((None, Some(chars[idx + 1..].iter().collect())));
	}

	let start = idx;
	let mut quote: Option<char> = None;
	let mut comment_start = None;
	while idx < chars.len() {
		let c = chars[idx];
		match quote {
			Some(q) => {
				if c == q {
					quote = None;
				}
			}
			None => {
				if c == '\'' || c == '"' {
					quote = Some(c);
				} else if c == ';' {
					comment_start = Some(idx);
					break;
				}
			}
		}
		idx += 1;
	}
	if quote.is_some() {
		return Err(AssemblyError::parse(pos.clone(), "Unterminated string literal in operand.".to_string()));
	}

	let (operand_end, comment) = match comment_start {
		Some(ci) => (ci, Some(chars[ci + 1..].iter().collect())),
		None => (chars.len(), None),
	};
	let operand_text: String = chars[start..operand_end].iter().collect();
	let operand_text = operand_text.trim_end();
	let operand = if operand_text.is_empty() {
		None
	} else {
		Some(operand_text.to_string())
	};
	Ok((operand, comment))
}
