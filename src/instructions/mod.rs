//! Mnemonic-to-opcode resolution: addressing-mode inference from operand shape,
//! 65C02/stub gating, and final byte encoding (§4.6, §4.8 `XC` state machine).

pub mod opcodes;

pub use opcodes::{AddressMode, Mnemonic, Slot, ALL_MODES};

use crate::error::{AssemblyError, AssemblyResult, SourcePos};

/// The processor mode selected by `XC`, gating which opcode slots are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessorMode {
	/// Plain 6502: `C02Only` slots are rejected.
	#[default]
	Nmos6502,
	/// 65C02: `C02Only` slots are accepted.
	Cmos65C02,
	/// The documented "65802/65816" hack: every instruction encodes as a bare
	/// `RTS` (`0x60`) regardless of mnemonic or operand (§4.8, §9).
	Stub,
}

/// The syntactic shape of a parsed operand, independent of which mnemonic it
/// is paired with (§4.6 "Mode inference").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandShape {
	/// No operand at all.
	Implied,
	/// `#exp`.
	Immediate,
	/// `exp` alone; resolves to zero-page, absolute, or (for branches) relative.
	Direct,
	/// `(exp,x)`; resolves to zero-page-indirect-x, or 65C02 `JMP (abs,x)`.
	IndirectCommaX,
	/// `(exp),y`; zero-page-indirect-y.
	IndirectY,
	/// `(exp)` with no suffix; resolves to `JMP (abs)` or 65C02 `(zp)`.
	IndirectPlain,
	/// `exp,x`.
	IndexedX,
	/// `exp,y`.
	IndexedY,
}

/// A fully resolved addressing-mode choice plus the opcode to emit, before the
/// operand value itself has been written into the byte stream.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedInstruction {
	pub mode: AddressMode,
	pub opcode: u8,
	/// Total instruction length in bytes (1, 2, or 3).
	pub length: u8,
}

impl OperandShape {
	/// Candidate addressing modes this shape could resolve to, most specific
	/// (zero-page / single-byte) first. `resolve` picks among these.
	fn candidates(self) -> &'static [AddressMode] {
		use AddressMode::*;
		match self {
			OperandShape::Implied => &[Implied],
			OperandShape::Immediate => &[Immediate],
			OperandShape::Direct => &[ZeroPage, Relative, Absolute],
			OperandShape::IndirectCommaX => &[ZeroPageIndirectX, IndirectX],
			OperandShape::IndirectY => &[ZeroPageIndirectY],
			OperandShape::IndirectPlain => &[ZeroPageIndirect, Indirect],
			OperandShape::IndexedX => &[ZeroPageX, AbsoluteX],
			OperandShape::IndexedY => &[ZeroPageY, AbsoluteY],
		}
	}
}

/// Resolve `mnemonic` + `shape` + whether the operand value fits in a byte and
/// whether it was forward-referenced into one legal [`AddressMode`].
///
/// Zero-page is preferred over absolute when the value fits in 8 bits and the
/// mnemonic has a zero-page slot; a forward-referenced operand always prefers
/// absolute (§4.6, §9 "open question": only fail zero-page-only encoding after
/// the fact if the final value truly doesn't fit).
pub fn resolve_mode(
	mnemonic: Mnemonic,
	shape: OperandShape,
	fits_zero_page: bool,
	is_forward_ref: bool,
) -> Option<AddressMode> {
	if mnemonic.is_branch() {
		if shape == OperandShape::Direct {
			return Some(AddressMode::Relative);
		}
		return None;
	}

	let candidates = shape.candidates();
	if shape == OperandShape::Direct && candidates.contains(&AddressMode::ZeroPage) {
		let prefer_zp = fits_zero_page && !is_forward_ref;
		let zp_ok = mnemonic.slot(AddressMode::ZeroPage) != Slot::Unsupported;
		let abs_ok = mnemonic.slot(AddressMode::Absolute) != Slot::Unsupported;
		return if prefer_zp && zp_ok {
			Some(AddressMode::ZeroPage)
		} else if abs_ok {
			Some(AddressMode::Absolute)
		} else if zp_ok {
			Some(AddressMode::ZeroPage)
		} else {
			None
		};
	}
	if matches!(shape, OperandShape::IndexedX | OperandShape::IndexedY) {
		let zp_mode = candidates[0];
		let abs_mode = candidates[1];
		let prefer_zp = fits_zero_page && !is_forward_ref;
		let zp_ok = mnemonic.slot(zp_mode) != Slot::Unsupported;
		let abs_ok = mnemonic.slot(abs_mode) != Slot::Unsupported;
		return if prefer_zp && zp_ok {
			Some(zp_mode)
		} else if abs_ok {
			Some(abs_mode)
		} else if zp_ok {
			Some(zp_mode)
		} else {
			None
		};
	}

	candidates
		.iter()
		.copied()
		.find(|&mode| mnemonic.slot(mode) != Slot::Unsupported)
}

/// Look up the opcode for `mnemonic`/`mode` under `processor`, rejecting
/// 65C02-only slots outside 65C02 mode. Returns the opcode and whether the
/// mode was a zero-page-upgrade (so the caller knows to emit a 2-byte
/// absolute operand despite the operand fitting in zero page).
pub fn lookup_opcode(
	mnemonic: Mnemonic,
	mode: AddressMode,
	processor: ProcessorMode,
	pos: &SourcePos,
) -> AssemblyResult<(u8, bool)> {
	if processor == ProcessorMode::Stub {
		return Ok((0x60, false));
	}
	match mnemonic.slot(mode) {
		Slot::Unsupported => Err(AssemblyError::semantic(
			pos.clone(),
			format!(
				"Addressing mode of '{mnemonic}' is not supported for '{mnemonic}' instruction."
			),
		)),
		Slot::Op(op) => Ok((op, false)),
		Slot::ZpUpgrade(op) => Ok((op, true)),
		Slot::C02Only(op) => {
			if processor == ProcessorMode::Cmos65C02 {
				Ok((op, false))
			} else {
				Err(AssemblyError::semantic(
					pos.clone(),
					format!(
						"Addressing mode of '{mnemonic}' is not supported for '{mnemonic}' instruction."
					),
				))
			}
		}
	}
}

/// Byte length of an instruction in `mode` (opcode plus operand bytes), not
/// accounting for the `ZpUpgrade`/stub special cases handled by the caller.
pub fn mode_operand_len(mode: AddressMode) -> u8 {
	match mode {
		AddressMode::Implied => 0,
		AddressMode::Immediate
		| AddressMode::ZeroPage
		| AddressMode::ZeroPageIndirectX
		| AddressMode::ZeroPageIndirectY
		| AddressMode::ZeroPageX
		| AddressMode::ZeroPageY
		| AddressMode::Relative
		| AddressMode::ZeroPageIndirect => 1,
		AddressMode::Absolute | AddressMode::AbsoluteX | AddressMode::AbsoluteY | AddressMode::Indirect
		| AddressMode::IndirectX => 2,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn prefers_zero_page_when_it_fits() {
		let mode = resolve_mode(Mnemonic::Lda, OperandShape::Direct, true, false).unwrap();
		assert_eq!(mode, AddressMode::ZeroPage);
	}

	#[test]
	fn prefers_absolute_for_forward_reference() {
		let mode = resolve_mode(Mnemonic::Lda, OperandShape::Direct, true, true).unwrap();
		assert_eq!(mode, AddressMode::Absolute);
	}

	#[test]
	fn jmp_indirect_comma_x_only_resolves_on_65c02() {
		let mode = resolve_mode(Mnemonic::Jmp, OperandShape::IndirectCommaX, false, false).unwrap();
		assert_eq!(mode, AddressMode::IndirectX);
		let pos = SourcePos::new("f", 1);
		assert!(lookup_opcode(Mnemonic::Jmp, mode, ProcessorMode::Nmos6502, &pos).is_err());
		assert!(lookup_opcode(Mnemonic::Jmp, mode, ProcessorMode::Cmos65C02, &pos).is_ok());
	}

	#[test]
	fn jmp_zero_page_upgrades_to_absolute_opcode() {
		let pos = SourcePos::new("f", 1);
		let (op, upgraded) =
			lookup_opcode(Mnemonic::Jmp, AddressMode::ZeroPage, ProcessorMode::Nmos6502, &pos).unwrap();
		assert_eq!(op, 0x4C);
		assert!(upgraded);
	}

	#[test]
	fn stub_mode_always_encodes_rts() {
		let pos = SourcePos::new("f", 1);
		let (op, _) = lookup_opcode(Mnemonic::Lda, AddressMode::Immediate, ProcessorMode::Stub, &pos).unwrap();
		assert_eq!(op, 0x60);
	}

	#[test]
	fn branch_only_resolves_direct_shape() {
		assert_eq!(
			resolve_mode(Mnemonic::Beq, OperandShape::Direct, true, false),
			Some(AddressMode::Relative)
		);
		assert_eq!(resolve_mode(Mnemonic::Beq, OperandShape::Immediate, true, false), None);
	}
}
