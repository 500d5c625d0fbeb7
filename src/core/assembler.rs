//! Orchestrates the single logical pass over the stacked source (§4.8):
//! parses each line, resolves the operator as directive or mnemonic,
//! evaluates the operand, emits bytes, records a `LineInfo`, and formats the
//! listing. Forward references are resolved inline; anything still pending at
//! end-of-input is reported undefined.

use std::path::PathBuf;

use log::debug;

use crate::config::Config;
use crate::core::binary::BinaryBuffer;
use crate::core::conditional::ConditionalStack;
use crate::core::line_info::LineInfo;
use crate::directives::{self, Directive, DsShape};
use crate::error::{AssemblyError, AssemblyResult, Diagnostic, ErrorCollector, SourcePos};
use crate::instructions::{self, AddressMode, Mnemonic, OperandShape, ProcessorMode};
use crate::output::ListingFormatter;
use crate::parsing::{self, ExprValue, ParsedLine};
use crate::symbols::{PendingRef, RefContext, SymbolKind, SymbolScope, SymbolTable};
use crate::text::{self, SourceKind, SourceStack, TextFile};

/// Default program counter before any `ORG` is seen (§8 scenario 1).
pub const DEFAULT_ORIGIN: u16 = 0x8000;

/// Everything produced by a completed run.
#[derive(Debug)]
pub struct AssemblyOutcome {
	/// The full listing text, one line (or more, for continuations) per
	/// source line.
	pub listing: String,
	/// Paths actually written by a successful flush; empty if any error was
	/// reported (the write queue is discarded, per §4.8/§4.9).
	pub written_files: Vec<PathBuf>,
	/// Number of errors reported (warnings excluded).
	pub error_count: usize,
	/// Every diagnostic emitted, in order.
	pub diagnostics: Vec<String>,
}

/// Lines captured between `LUP n` and `--^`, waiting to be replayed.
struct LupCapture {
	lines: Vec<(String, u32)>,
	start_pos: SourcePos,
	indent: u32,
	count: u32,
}

/// Drives one assembly run over a single top-level source.
pub struct AssemblerCore {
	config: Config,
	source: SourceStack,
	symbols: SymbolTable,
	scope: SymbolScope,
	binary: BinaryBuffer,
	conditional: ConditionalStack,
	processor: ProcessorMode,
	lines: Vec<LineInfo>,
	errors: ErrorCollector,
	listing: String,
	lup_capture: Option<LupCapture>,
	pc_at_line_start: u16,
}

impl AssemblerCore {
	/// Start a run over `top`, with `config` supplying `PUT` search paths and
	/// output locations.
	pub fn new(config: Config, top: TextFile) -> Self {
		Self {
			config,
			source: SourceStack::new(top),
			symbols: SymbolTable::new(),
			scope: SymbolScope::new(),
			binary: BinaryBuffer::new(),
			conditional: ConditionalStack::new(),
			processor: ProcessorMode::default(),
			lines: Vec::new(),
			errors: ErrorCollector::new(),
			listing: String::new(),
			lup_capture: None,
			pc_at_line_start: DEFAULT_ORIGIN,
		}
	}

	/// Convenience entry point: load `path` from disk and run it to completion.
	pub fn assemble_path(config: Config, path: &std::path::Path) -> AssemblyResult<AssemblyOutcome> {
		let top = TextFile::from_disk(path, SourceKind::TopLevel)?;
		AssemblerCore::new(config, top).run()
	}

	/// Drive the run to completion: process every line, sweep for unresolved
	/// forward references, then flush queued outputs unless any error was
	/// reported.
	pub fn run(mut self) -> AssemblyResult<AssemblyOutcome> {
		self.binary.set_origin(DEFAULT_ORIGIN).expect("fresh buffer has no prior segment");
		self.pc_at_line_start = DEFAULT_ORIGIN;

		while let Some((raw, pos, indent)) = self.source.next_line() {
			self.process_line(raw, pos, indent);
		}

		if let Some(capture) = self.lup_capture.take() {
			self.errors.push_error(AssemblyError::directive_misuse(
				capture.start_pos,
				"LUP directive is missing matching --^ directive.".to_string(),
			));
		}
		if self.conditional.has_open_blocks() {
			self.errors.push_warning(
				SourcePos::unknown(),
				"DO/IF directive is missing matching FIN directive.".to_string(),
			);
		}

		self.sweep_undefined_references();

		let written_files = if self.errors.has_errors() {
			Vec::new()
		} else {
			self.binary.flush_all(&self.config.output_dir())?
		};

		Ok(AssemblyOutcome {
			listing: self.listing,
			written_files,
			error_count: self.errors.error_count(),
			diagnostics: self.errors.diagnostics().iter().map(Diagnostic::to_string).collect(),
		})
	}

	fn sweep_undefined_references(&mut self) {
		let undefined: Vec<(String, SourcePos)> = self
			.symbols
			.undefined_with_pending()
			.into_iter()
			.flat_map(|(name, pending)| pending.iter().map(move |p| (name.to_string(), p.pos.clone())))
			.collect();
		for (name, pos) in undefined {
			self.errors
				.push_error(AssemblyError::semantic(pos, format!("The '{name}' label is undefined.")));
		}
	}

	fn process_line(&mut self, raw: String, pos: SourcePos, indent: u32) {
		if self.lup_capture.is_some() {
			self.feed_lup_capture(raw, pos, indent);
			return;
		}

		self.pc_at_line_start = self.binary.current_pc();
		let line_index = self.lines.len();
		self.lines
			.push(LineInfo::new(pos.line, pos.file.clone(), raw.clone(), indent));

		let parsed = match parsing::parse_line(&raw, &pos) {
			Ok(parsed) => parsed,
			Err(err) => {
				self.errors.push_error(err);
				return;
			}
		};

		if parsed.is_empty_statement() {
			return;
		}

		if let Err(err) = self.dispatch(line_index, &parsed, &pos, indent) {
			self.errors.push_error(err);
		}

		self.emit_listing(line_index);
	}

	fn feed_lup_capture(&mut self, raw: String, pos: SourcePos, indent: u32) {
		if first_word(&raw).eq_ignore_ascii_case("--^") {
			let capture = self.lup_capture.take().expect("checked by caller");
			self.finish_lup(capture, raw, pos, indent);
		} else {
			self.lup_capture.as_mut().unwrap().lines.push((raw, pos.line));
		}
	}

	/// Replay the captured body `count` times by feeding each captured line
	/// straight back through `process_line`, one copy fully processed before
	/// the next starts. This sidesteps `SourceStack`'s depth limit entirely:
	/// there is never more than one LUP frame's worth of text in flight.
	fn finish_lup(&mut self, capture: LupCapture, raw: String, end_pos: SourcePos, end_indent: u32) {
		let line_index = self.lines.len();
		self.lines
			.push(LineInfo::new(end_pos.line, end_pos.file.clone(), raw.clone(), end_indent));
		self.emit_listing(line_index);

		if let Ok(parsed) = parsing::parse_line(&raw, &end_pos) {
			if parsed.operand.as_deref().map(str::trim).is_some_and(|s| !s.is_empty()) {
				self.errors
					.push_warning(end_pos.clone(), directives::ignored_operand_warning(Directive::LupEnd));
			}
		}

		for _ in 0..capture.count {
			for (text, line_number) in &capture.lines {
				let pos = SourcePos::new(capture.start_pos.file.clone(), *line_number);
				self.process_line(text.clone(), pos, capture.indent);
			}
		}
	}

	fn dispatch(&mut self, line_index: usize, parsed: &ParsedLine, pos: &SourcePos, indent: u32) -> AssemblyResult<()> {
		let directive = parsed.operator.as_deref().and_then(Directive::from_name);

		match directive {
			Some(Directive::Do) => return self.handle_do(line_index, parsed, pos),
			Some(Directive::Else) => return self.handle_else(parsed, pos),
			Some(Directive::Fin) => return self.handle_fin(parsed, pos),
			Some(Directive::Lup) => return self.handle_lup_start(parsed, pos, indent),
			Some(Directive::LupEnd) => {
				if parsed.operand.as_deref().map(str::trim).is_some_and(|s| !s.is_empty()) {
					self.errors
						.push_warning(pos.clone(), directives::ignored_operand_warning(Directive::LupEnd));
				}
				return Err(AssemblyError::directive_misuse(
					pos.clone(),
					"--^ directive without corresponding LUP directive.".to_string(),
				));
			}
			_ => {}
		}

		if !self.conditional.is_active() {
			self.lines[line_index].suppressed = true;
			return Ok(());
		}

		match directive {
			Some(Directive::Equ) => self.handle_equ(line_index, parsed, pos),
			Some(other) => self.handle_pseudo_op(other, line_index, parsed, pos),
			None => self.handle_statement(line_index, parsed, pos),
		}
	}

	/// A duplicate-label error must not stop the rest of the line: the
	/// instruction still assembles and still emits its bytes (§8 scenario 4),
	/// so the label error is captured rather than propagated with `?` and
	/// only returned once the instruction has had its chance to run.
	fn handle_statement(&mut self, line_index: usize, parsed: &ParsedLine, pos: &SourcePos) -> AssemblyResult<()> {
		let label_err = match &parsed.label {
			Some(label) => self
				.define_label(label, self.binary.current_pc(), SymbolKind::Label, line_index, pos)
				.err(),
			None => None,
		};

		let Some(operator) = parsed.operator.as_deref() else {
			return label_err.map_or(Ok(()), Err);
		};
		let mnemonic: Mnemonic = match operator.parse() {
			Ok(mnemonic) => mnemonic,
			Err(()) => {
				let err = AssemblyError::parse(pos.clone(), format!("'{operator}' is not a recognized mnemonic or macro."));
				return Err(label_err.unwrap_or(err));
			}
		};
		let instruction_result = self.emit_instruction(line_index, mnemonic, parsed.operand.as_deref(), pos);
		match label_err {
			Some(err) => Err(err),
			None => instruction_result,
		}
	}

	fn define_label(
		&mut self,
		label: &str,
		value: u16,
		kind: SymbolKind,
		line_index: usize,
		pos: &SourcePos,
	) -> AssemblyResult<()> {
		let key = self.resolve_key(label, pos)?;
		if !label.starts_with(':') && !label.starts_with(']') {
			self.scope.enter_global(label);
		}
		let pending = self.symbols.define(&key, label, value, kind, pos.line, pos)?;
		self.lines[line_index].defines_symbol = Some((label.to_string(), kind));
		self.patch_pending(label, value, pending)
	}

	fn handle_equ(&mut self, line_index: usize, parsed: &ParsedLine, pos: &SourcePos) -> AssemblyResult<()> {
		let Some(label) = &parsed.label else {
			return Err(AssemblyError::semantic(pos.clone(), "EQU directive requires a line label.".to_string()));
		};
		if label.starts_with(':') || label.starts_with(']') {
			return Err(AssemblyError::semantic(pos.clone(), "EQU directive requires a line label.".to_string()));
		}
		let operand = directives::require_operand(Directive::Equ, parsed.operand.as_deref(), pos)?;
		let value = self.evaluate(operand, true, None, pos)?;
		self.scope.enter_global(label);
		let pending = self.symbols.define(label, label, value.value, SymbolKind::Constant, pos.line, pos)?;
		self.lines[line_index].defines_symbol = Some((label.clone(), SymbolKind::Constant));
		self.lines[line_index].address = None;
		self.patch_pending(label, value.value, pending)
	}

	fn handle_do(&mut self, line_index: usize, parsed: &ParsedLine, pos: &SourcePos) -> AssemblyResult<()> {
		if !self.conditional.is_active() {
			self.lines[line_index].suppressed = true;
			return self.conditional.push_do(false, pos);
		}
		let operand = directives::require_operand(Directive::Do, parsed.operand.as_deref(), pos)?;
		let value = self.evaluate(operand, false, Some("DO"), pos)?;
		self.conditional.push_do(value.value != 0, pos)
	}

	fn handle_else(&mut self, parsed: &ParsedLine, pos: &SourcePos) -> AssemblyResult<()> {
		if parsed.operand.as_deref().map(str::trim).is_some_and(|s| !s.is_empty()) {
			self.errors
				.push_warning(pos.clone(), directives::ignored_operand_warning(Directive::Else));
		}
		self.conditional.else_arm(pos)
	}

	fn handle_fin(&mut self, parsed: &ParsedLine, pos: &SourcePos) -> AssemblyResult<()> {
		if parsed.operand.as_deref().map(str::trim).is_some_and(|s| !s.is_empty()) {
			self.errors
				.push_warning(pos.clone(), directives::ignored_operand_warning(Directive::Fin));
		}
		self.conditional.fin(pos)
	}

	fn handle_lup_start(&mut self, parsed: &ParsedLine, pos: &SourcePos, indent: u32) -> AssemblyResult<()> {
		let operand = directives::require_operand(Directive::Lup, parsed.operand.as_deref(), pos)?;
		let value = self.evaluate(operand, false, Some("lup"), pos)?;
		let count = if (1..=32768).contains(&value.value) {
			value.value as u32
		} else {
			self.errors.push_warning(
				pos.clone(),
				format!("LUP directive count of {} doesn't fall in valid range of 1 to 32768.", value.value),
			);
			0
		};
		self.lup_capture = Some(LupCapture {
			lines: Vec::new(),
			start_pos: pos.clone(),
			indent: indent + 1,
			count,
		});
		Ok(())
	}

	fn handle_pseudo_op(
		&mut self,
		directive: Directive,
		line_index: usize,
		parsed: &ParsedLine,
		pos: &SourcePos,
	) -> AssemblyResult<()> {
		match directive {
			Directive::Org => {
				let operand = directives::require_operand(Directive::Org, parsed.operand.as_deref(), pos)?;
				let value = self.evaluate(operand, false, Some("org"), pos)?;
				if value.immediate {
					return Err(AssemblyError::semantic(pos.clone(), format!("'{operand}' doesn't specify an absolute address.")));
				}
				self.binary.set_origin(value.value)?;
				self.lines[line_index].address = None;
				Ok(())
			}
			Directive::Hex => {
				let operand = directives::require_operand(Directive::Hex, parsed.operand.as_deref(), pos)?;
				let bytes = directives::encode_hex(operand, pos)?;
				self.emit_bytes(line_index, bytes, pos)
			}
			Directive::Ds => {
				let operand = directives::require_operand(Directive::Ds, parsed.operand.as_deref(), pos)?;
				self.handle_ds(line_index, operand, pos)
			}
			Directive::Db => {
				let operand = directives::require_operand(Directive::Db, parsed.operand.as_deref(), pos)?;
				let mut bytes = Vec::new();
				for term in operand.split(',') {
					let value = self.evaluate(term.trim(), true, None, pos)?;
					bytes.push(value.value as u8);
				}
				self.emit_bytes(line_index, bytes, pos)
			}
			Directive::Da => {
				let operand = directives::require_operand(Directive::Da, parsed.operand.as_deref(), pos)?;
				let mut bytes = Vec::new();
				for term in operand.split(',') {
					let value = self.evaluate(term.trim(), true, None, pos)?;
					bytes.extend_from_slice(&value.value.to_le_bytes());
				}
				self.emit_bytes(line_index, bytes, pos)
			}
			Directive::Asc => {
				let operand = directives::require_operand(Directive::Asc, parsed.operand.as_deref(), pos)?;
				let bytes = directives::encode_asc(operand, pos)?;
				self.emit_bytes(line_index, bytes, pos)
			}
			Directive::Rev => {
				let operand = directives::require_operand(Directive::Rev, parsed.operand.as_deref(), pos)?;
				let bytes = directives::encode_rev(operand, pos)?;
				self.emit_bytes(line_index, bytes, pos)
			}
			Directive::Dum => {
				let operand = directives::require_operand(Directive::Dum, parsed.operand.as_deref(), pos)?;
				let value = self.evaluate(operand, false, Some("dum"), pos)?;
				if value.immediate {
					return Err(AssemblyError::semantic(pos.clone(), format!("'{operand}' doesn't specify an absolute address.")));
				}
				self.binary.enter_dummy(value.value);
				self.lines[line_index].address = None;
				Ok(())
			}
			Directive::Dend => {
				if parsed.operand.as_deref().map(str::trim).is_some_and(|s| !s.is_empty()) {
					self.errors
						.push_warning(pos.clone(), directives::ignored_operand_warning(Directive::Dend));
				}
				if !self.binary.in_dummy() {
					return Err(AssemblyError::semantic(
						pos.clone(),
						"dend isn't allowed without a preceding DUM directive.".to_string(),
					));
				}
				self.binary.exit_dummy()?;
				self.lines[line_index].address = None;
				Ok(())
			}
			Directive::Sav => {
				let operand = directives::require_operand(Directive::Sav, parsed.operand.as_deref(), pos)?;
				self.binary.queue_write_sav(operand.to_string());
				self.lines[line_index].address = None;
				Ok(())
			}
			Directive::Usr => {
				let operand = directives::require_operand(Directive::Usr, parsed.operand.as_deref(), pos)?;
				let [type_text, count_text, addr_text, len_text] = directives::split_usr_operand(operand, pos)?;
				let record_type = self.evaluate(type_text, true, None, pos)?.value as u8;
				let count = self.evaluate(count_text, true, None, pos)?.value as u8;
				let address = self.evaluate(addr_text, true, None, pos)?.value;
				let length = self.evaluate(len_text, true, None, pos)?.value;
				self.binary.queue_write_rw18("usr.bin".to_string(), record_type, count, address, length);
				self.lines[line_index].address = None;
				Ok(())
			}
			Directive::Put => {
				let operand = directives::require_operand(Directive::Put, parsed.operand.as_deref(), pos)?;
				let candidates = self.config.resolve_put(operand);
				match text::load_put(&candidates) {
					Ok(file) => self.source.push(file)?,
					Err(_) => return Err(AssemblyError::semantic(pos.clone(), format!("Failed to PUT '{operand}' source file."))),
				}
				self.lines[line_index].address = None;
				Ok(())
			}
			Directive::Xc => {
				let off = parsed
					.operand
					.as_deref()
					.map(str::trim)
					.is_some_and(|s| s.eq_ignore_ascii_case("off"));
				self.processor = directives::xc_transition(self.processor, off, pos)?;
				self.lines[line_index].address = None;
				Ok(())
			}
			Directive::Tr | Directive::Mx | Directive::Lst | Directive::Lstdo => {
				self.lines[line_index].address = None;
				Ok(())
			}
			Directive::Equ | Directive::Do | Directive::Else | Directive::Fin | Directive::Lup | Directive::LupEnd => {
				unreachable!("handled before reaching handle_pseudo_op")
			}
		}
	}

	fn handle_ds(&mut self, line_index: usize, operand: &str, pos: &SourcePos) -> AssemblyResult<()> {
		match directives::parse_ds_shape(operand) {
			DsShape::Count { count_expr, fill_expr } => {
				let count = self.evaluate(count_expr, false, Some("ds"), pos)?.value;
				let fill = match fill_expr {
					Some(expr) => self.evaluate(expr, false, Some("ds"), pos)?.value as u8,
					None => 0,
				};
				self.emit_bytes(line_index, vec![fill; count as usize], pos)
			}
			DsShape::PageAlign { fill_expr } => {
				let fill = match fill_expr {
					Some(expr) => self.evaluate(expr, false, Some("ds"), pos)?.value as u8,
					None => 0,
				};
				let count = directives::page_align_fill_count(self.binary.current_pc());
				self.emit_bytes(line_index, vec![fill; count as usize], pos)
			}
		}
	}

	fn emit_instruction(
		&mut self,
		line_index: usize,
		mnemonic: Mnemonic,
		operand_text: Option<&str>,
		pos: &SourcePos,
	) -> AssemblyResult<()> {
		let operand_text = operand_text.unwrap_or("");
		let (shape, expr_text) = parsing::parse_shape(operand_text, pos)?;

		if shape == OperandShape::Implied {
			let (opcode, _) = instructions::lookup_opcode(mnemonic, AddressMode::Implied, self.processor, pos)?;
			return self.emit_bytes(line_index, vec![opcode], pos);
		}

		let value = self.evaluate(expr_text, true, None, pos)?;
		let fits_zero_page = value.value <= 0xFF && !value.immediate;
		let mode = instructions::resolve_mode(mnemonic, shape, fits_zero_page, value.forward_ref).ok_or_else(|| {
			AssemblyError::semantic(
				pos.clone(),
				format!("Addressing mode of '{mnemonic}' is not supported for '{mnemonic}' instruction."),
			)
		})?;
		let (opcode, upgraded) = instructions::lookup_opcode(mnemonic, mode, self.processor, pos)?;

		if mnemonic.is_branch() {
			return self.emit_branch(line_index, opcode, expr_text, value, pos);
		}

		let operand_len = if upgraded { 2 } else { instructions::mode_operand_len(mode) };
		let mut bytes = vec![opcode];
		match operand_len {
			0 => {}
			1 => bytes.push(value.value as u8),
			2 => bytes.extend_from_slice(&value.value.to_le_bytes()),
			_ => unreachable!(),
		}

		self.emit_bytes_reserve(line_index, &bytes, pos)?;

		if value.forward_ref {
			let context = if value.immediate {
				RefContext::ImmediateLow
			} else if operand_len == 1 {
				RefContext::ZeroPage
			} else {
				RefContext::Absolute
			};
			self.register_forward_ref(expr_text, 1, context, pos)?;
		}

		Ok(())
	}

	fn emit_branch(
		&mut self,
		line_index: usize,
		opcode: u8,
		expr_text: &str,
		value: ExprValue,
		pos: &SourcePos,
	) -> AssemblyResult<()> {
		let bytes = [opcode, 0];
		self.emit_bytes_reserve(line_index, &bytes, pos)?;
		if value.forward_ref {
			self.register_forward_ref(expr_text, 1, RefContext::RelativeBranch, pos)?;
			return Ok(());
		}
		let address = self.lines[line_index].address.expect("branch always reserves bytes");
		let offset = branch_offset(address, value.value, pos)?;
		self.binary.patch(address + 1, &[offset as u8]);
		self.lines[line_index].bytes[1] = offset as u8;
		Ok(())
	}

	fn emit_bytes(&mut self, line_index: usize, bytes: Vec<u8>, pos: &SourcePos) -> AssemblyResult<()> {
		self.emit_bytes_reserve(line_index, &bytes, pos)?;
		Ok(())
	}

	/// Reserve space for `bytes`, write them (unless inside a dummy segment),
	/// and record them on the line. Returns the address the bytes start at.
	fn emit_bytes_reserve(&mut self, line_index: usize, bytes: &[u8], pos: &SourcePos) -> AssemblyResult<u16> {
		if bytes.is_empty() {
			return Ok(self.binary.current_pc());
		}
		let address = self.binary.reserve(bytes.len()).map_err(|err| match err {
			AssemblyError::Semantic { message, .. } => AssemblyError::semantic(pos.clone(), message),
			other => other,
		})?;
		let in_dummy = self.binary.in_dummy();
		if !in_dummy {
			self.binary.write(address, bytes);
		}
		let line = &mut self.lines[line_index];
		if line.address.is_none() {
			line.address = Some(address);
		}
		line.bytes.extend_from_slice(bytes);
		line.in_dummy_segment = in_dummy;
		Ok(address)
	}

	fn register_forward_ref(&mut self, name: &str, byte_offset: usize, context: RefContext, pos: &SourcePos) -> AssemblyResult<()> {
		let key = self.resolve_key(name, pos)?;
		let line_index = self.lines.len() - 1;
		self.symbols.reference(
			&key,
			name,
			PendingRef {
				line_index,
				byte_offset,
				context,
				pos: pos.clone(),
			},
		);
		Ok(())
	}

	fn patch_pending(&mut self, name: &str, value: u16, pending: Vec<PendingRef>) -> AssemblyResult<()> {
		for reference in pending {
			let address = self.lines[reference.line_index].address.unwrap_or(0) + reference.byte_offset as u16;
			match reference.context {
				RefContext::ZeroPage => {
					if value > 0xFF {
						self.errors.push_error(AssemblyError::semantic(
							reference.pos.clone(),
							format!("Couldn't properly infer size of a forward reference in '{name}' operand."),
						));
						continue;
					}
					self.patch_line_bytes(reference.line_index, reference.byte_offset, &[value as u8], address);
				}
				RefContext::Absolute => {
					self.patch_line_bytes(reference.line_index, reference.byte_offset, &value.to_le_bytes(), address);
				}
				RefContext::ImmediateLow => {
					self.patch_line_bytes(reference.line_index, reference.byte_offset, &[(value & 0xFF) as u8], address);
				}
				RefContext::ImmediateHigh => {
					self.patch_line_bytes(reference.line_index, reference.byte_offset, &[(value >> 8) as u8], address);
				}
				RefContext::RelativeBranch => {
					let branch_addr = self.lines[reference.line_index].address.unwrap_or(0);
					match branch_offset(branch_addr, value, &reference.pos) {
						Ok(offset) => self.patch_line_bytes(reference.line_index, reference.byte_offset, &[offset as u8], address),
						Err(err) => self.errors.push_error(err),
					}
				}
			}
		}
		Ok(())
	}

	fn patch_line_bytes(&mut self, line_index: usize, byte_offset: usize, bytes: &[u8], address: u16) {
		if !self.lines[line_index].in_dummy_segment {
			self.binary.patch(address, bytes);
		}
		let line_bytes = &mut self.lines[line_index].bytes;
		for (i, &b) in bytes.iter().enumerate() {
			if let Some(slot) = line_bytes.get_mut(byte_offset + i) {
				*slot = b;
			}
		}
	}

	fn evaluate(&mut self, text: &str, allow_forward: bool, directive: Option<&str>, pos: &SourcePos) -> AssemblyResult<ExprValue> {
		let current_pc = self.pc_at_line_start;
		let current_line = pos.line;
		let symbols = &mut self.symbols;
		let scope = &self.scope;
		let mut resolver = move |name: &str| -> Option<u16> {
			let key = scope.key_for(name).ok()?;
			if name.starts_with(']') {
				return symbols.variable_value_at(&key, current_line);
			}
			symbols.find(&key).filter(|s| s.is_defined()).map(|s| s.value)
		};
		parsing::evaluate(text, current_pc, &mut resolver, allow_forward, directive, pos)
	}

	fn resolve_key(&self, name: &str, pos: &SourcePos) -> AssemblyResult<String> {
		self.scope.key_for(name).map_err(|err| match err {
			AssemblyError::Semantic { message, .. } => AssemblyError::semantic(pos.clone(), message),
			other => other,
		})
	}

	fn emit_listing(&mut self, line_index: usize) {
		let equ_value = match &self.lines[line_index].defines_symbol {
			Some((name, SymbolKind::Constant)) => self.symbols.find(name).map(|s| s.value),
			_ => None,
		};
		let line = &self.lines[line_index];
		self.listing.push_str(&ListingFormatter::format(line, equ_value));
		self.listing.push('\n');
		debug!("listed line {}", line.line_number);
	}
}

fn first_word(raw: &str) -> &str {
	raw.trim().split_whitespace().next().unwrap_or("")
}

fn branch_offset(branch_addr: u16, target: u16, pos: &SourcePos) -> AssemblyResult<i8> {
	let next = branch_addr.wrapping_add(2) as i32;
	let delta = target as i32 - next;
	if !(-128..=127).contains(&delta) {
		return Err(AssemblyError::semantic(
			pos.clone(),
			format!("Relative offset of '{target:#06X}' exceeds the allowed -128 to 127 range."),
		));
	}
	Ok(delta as i8)
}
