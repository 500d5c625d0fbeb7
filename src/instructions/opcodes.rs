//! The 56-mnemonic x 14-addressing-mode opcode matrix (§4.6, §9).
//!
//! Built as a `match` over [`Mnemonic`] returning a fixed-size `[Slot; 14]`, which
//! the compiler resolves at compile time the way the original's matrix is parsed
//! once at startup rather than rebuilt per lookup.

use std::fmt;
use std::str::FromStr;

/// The 14 addressing-mode columns, in the canonical order from §4.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum AddressMode {
	Immediate = 0,
	Absolute = 1,
	ZeroPage = 2,
	Implied = 3,
	ZeroPageIndirectX = 4,
	ZeroPageIndirectY = 5,
	ZeroPageX = 6,
	ZeroPageY = 7,
	AbsoluteX = 8,
	AbsoluteY = 9,
	Relative = 10,
	Indirect = 11,
	IndirectX = 12,
	ZeroPageIndirect = 13,
}

/// All 14 modes in column order, for iteration.
pub const ALL_MODES: [AddressMode; 14] = [
	AddressMode::Immediate,
	AddressMode::Absolute,
	AddressMode::ZeroPage,
	AddressMode::Implied,
	AddressMode::ZeroPageIndirectX,
	AddressMode::ZeroPageIndirectY,
	AddressMode::ZeroPageX,
	AddressMode::ZeroPageY,
	AddressMode::AbsoluteX,
	AddressMode::AbsoluteY,
	AddressMode::Relative,
	AddressMode::Indirect,
	AddressMode::IndirectX,
	AddressMode::ZeroPageIndirect,
];

/// One matrix cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
	/// Mode not supported for this mnemonic.
	Unsupported,
	/// A real opcode, available on 6502 and 65C02 alike.
	Op(u8),
	/// The mode has no dedicated zero-page opcode; silently upgrade to the
	/// absolute opcode given here even when the operand fits in a byte.
	ZpUpgrade(u8),
	/// Opcode only exists on 65C02.
	C02Only(u8),
}

/// One of the 56 standard 6502 mnemonics in scope (§1 excludes 65C02-exclusive
/// new mnemonics such as `BRA`/`PHX`/`STZ`; 65C02 support here is expressed
/// purely as extra modes/opcodes on these 56).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
	Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs,
	Clc, Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny,
	Jmp, Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror,
	Rti, Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
}

impl Mnemonic {
	/// All 56 mnemonics, for diagnostics and table construction.
	pub const ALL: [Mnemonic; 56] = [
		Mnemonic::Adc, Mnemonic::And, Mnemonic::Asl, Mnemonic::Bcc, Mnemonic::Bcs,
		Mnemonic::Beq, Mnemonic::Bit, Mnemonic::Bmi, Mnemonic::Bne, Mnemonic::Bpl,
		Mnemonic::Brk, Mnemonic::Bvc, Mnemonic::Bvs, Mnemonic::Clc, Mnemonic::Cld,
		Mnemonic::Cli, Mnemonic::Clv, Mnemonic::Cmp, Mnemonic::Cpx, Mnemonic::Cpy,
		Mnemonic::Dec, Mnemonic::Dex, Mnemonic::Dey, Mnemonic::Eor, Mnemonic::Inc,
		Mnemonic::Inx, Mnemonic::Iny, Mnemonic::Jmp, Mnemonic::Jsr, Mnemonic::Lda,
		Mnemonic::Ldx, Mnemonic::Ldy, Mnemonic::Lsr, Mnemonic::Nop, Mnemonic::Ora,
		Mnemonic::Pha, Mnemonic::Php, Mnemonic::Pla, Mnemonic::Plp, Mnemonic::Rol,
		Mnemonic::Ror, Mnemonic::Rti, Mnemonic::Rts, Mnemonic::Sbc, Mnemonic::Sec,
		Mnemonic::Sed, Mnemonic::Sei, Mnemonic::Sta, Mnemonic::Stx, Mnemonic::Sty,
		Mnemonic::Tax, Mnemonic::Tay, Mnemonic::Tsx, Mnemonic::Txa, Mnemonic::Txs,
		Mnemonic::Tya,
	];

	/// Whether this is a branch mnemonic (relative mode only).
	pub fn is_branch(self) -> bool {
		matches!(
			self,
			Mnemonic::Bcc | Mnemonic::Bcs | Mnemonic::Beq | Mnemonic::Bmi
				| Mnemonic::Bne | Mnemonic::Bpl | Mnemonic::Bvc | Mnemonic::Bvs
		)
	}

	/// The 14-slot opcode row for this mnemonic.
	pub fn table_row(self) -> [Slot; 14] {
		use AddressMode::*;
		use Slot::{C02Only as C, Op, Unsupported as X, ZpUpgrade as U};
		let mut row = [X; 14];
		let mut set = |mode: AddressMode, slot: Slot| row[mode as usize] = slot;

		match self {
			Mnemonic::Adc => {
				set(Immediate, Op(0x69)); set(Absolute, Op(0x6D)); set(ZeroPage, Op(0x65));
				set(ZeroPageIndirectX, Op(0x61)); set(ZeroPageIndirectY, Op(0x71));
				set(ZeroPageX, Op(0x75)); set(AbsoluteX, Op(0x7D)); set(AbsoluteY, Op(0x79));
				set(ZeroPageIndirect, C(0x72));
			}
			Mnemonic::And => {
				set(Immediate, Op(0x29)); set(Absolute, Op(0x2D)); set(ZeroPage, Op(0x25));
				set(ZeroPageIndirectX, Op(0x21)); set(ZeroPageIndirectY, Op(0x31));
				set(ZeroPageX, Op(0x35)); set(AbsoluteX, Op(0x3D)); set(AbsoluteY, Op(0x39));
				set(ZeroPageIndirect, C(0x32));
			}
			Mnemonic::Asl => {
				set(ZeroPage, Op(0x06)); set(Absolute, Op(0x0E)); set(Implied, Op(0x0A));
				set(ZeroPageX, Op(0x16)); set(AbsoluteX, Op(0x1E));
			}
			Mnemonic::Bcc => set(Relative, Op(0x90)),
			Mnemonic::Bcs => set(Relative, Op(0xB0)),
			Mnemonic::Beq => set(Relative, Op(0xF0)),
			Mnemonic::Bit => {
				set(ZeroPage, Op(0x24)); set(Absolute, Op(0x2C));
				set(Immediate, C(0x89)); set(ZeroPageX, C(0x34)); set(AbsoluteX, C(0x3C));
			}
			Mnemonic::Bmi => set(Relative, Op(0x30)),
			Mnemonic::Bne => set(Relative, Op(0xD0)),
			Mnemonic::Bpl => set(Relative, Op(0x10)),
			Mnemonic::Brk => set(Implied, Op(0x00)),
			Mnemonic::Bvc => set(Relative, Op(0x50)),
			Mnemonic::Bvs => set(Relative, Op(0x70)),
			Mnemonic::Clc => set(Implied, Op(0x18)),
			Mnemonic::Cld => set(Implied, Op(0xD8)),
			Mnemonic::Cli => set(Implied, Op(0x58)),
			Mnemonic::Clv => set(Implied, Op(0xB8)),
			Mnemonic::Cmp => {
				set(Immediate, Op(0xC9)); set(Absolute, Op(0xCD)); set(ZeroPage, Op(0xC5));
				set(ZeroPageIndirectX, Op(0xC1)); set(ZeroPageIndirectY, Op(0xD1));
				set(ZeroPageX, Op(0xD5)); set(AbsoluteX, Op(0xDD)); set(AbsoluteY, Op(0xD9));
				set(ZeroPageIndirect, C(0xD2));
			}
			Mnemonic::Cpx => {
				set(Immediate, Op(0xE0)); set(Absolute, Op(0xEC)); set(ZeroPage, Op(0xE4));
			}
			Mnemonic::Cpy => {
				set(Immediate, Op(0xC0)); set(Absolute, Op(0xCC)); set(ZeroPage, Op(0xC4));
			}
			Mnemonic::Dec => {
				set(ZeroPage, Op(0xC6)); set(Absolute, Op(0xCE));
				set(ZeroPageX, Op(0xD6)); set(AbsoluteX, Op(0xDE)); set(Implied, C(0x3A));
			}
			Mnemonic::Dex => set(Implied, Op(0xCA)),
			Mnemonic::Dey => set(Implied, Op(0x88)),
			Mnemonic::Eor => {
				set(Immediate, Op(0x49)); set(Absolute, Op(0x4D)); set(ZeroPage, Op(0x45));
				set(ZeroPageIndirectX, Op(0x41)); set(ZeroPageIndirectY, Op(0x51));
				set(ZeroPageX, Op(0x55)); set(AbsoluteX, Op(0x5D)); set(AbsoluteY, Op(0x59));
				set(ZeroPageIndirect, C(0x52));
			}
			Mnemonic::Inc => {
				set(ZeroPage, Op(0xE6)); set(Absolute, Op(0xEE));
				set(ZeroPageX, Op(0xF6)); set(AbsoluteX, Op(0xFE)); set(Implied, C(0x1A));
			}
			Mnemonic::Inx => set(Implied, Op(0xE8)),
			Mnemonic::Iny => set(Implied, Op(0xC8)),
			Mnemonic::Jmp => {
				set(Absolute, Op(0x4C)); set(ZeroPage, U(0x4C));
				set(Indirect, Op(0x6C)); set(IndirectX, C(0x7C));
			}
			Mnemonic::Jsr => {
				set(Absolute, Op(0x20)); set(ZeroPage, U(0x20));
			}
			Mnemonic::Lda => {
				set(Immediate, Op(0xA9)); set(Absolute, Op(0xAD)); set(ZeroPage, Op(0xA5));
				set(ZeroPageIndirectX, Op(0xA1)); set(ZeroPageIndirectY, Op(0xB1));
				set(ZeroPageX, Op(0xB5)); set(AbsoluteX, Op(0xBD)); set(AbsoluteY, Op(0xB9));
				set(ZeroPageIndirect, C(0xB2));
			}
			Mnemonic::Ldx => {
				set(Immediate, Op(0xA2)); set(Absolute, Op(0xAE)); set(ZeroPage, Op(0xA6));
				set(ZeroPageY, Op(0xB6)); set(AbsoluteY, Op(0xBE));
			}
			Mnemonic::Ldy => {
				set(Immediate, Op(0xA0)); set(Absolute, Op(0xAC)); set(ZeroPage, Op(0xA4));
				set(ZeroPageX, Op(0xB4)); set(AbsoluteX, Op(0xBC));
			}
			Mnemonic::Lsr => {
				set(ZeroPage, Op(0x46)); set(Absolute, Op(0x4E)); set(Implied, Op(0x4A));
				set(ZeroPageX, Op(0x56)); set(AbsoluteX, Op(0x5E));
			}
			Mnemonic::Nop => set(Implied, Op(0xEA)),
			Mnemonic::Ora => {
				set(Immediate, Op(0x09)); set(Absolute, Op(0x0D)); set(ZeroPage, Op(0x05));
				set(ZeroPageIndirectX, Op(0x01)); set(ZeroPageIndirectY, Op(0x11));
				set(ZeroPageX, Op(0x15)); set(AbsoluteX, Op(0x1D)); set(AbsoluteY, Op(0x19));
				set(ZeroPageIndirect, C(0x12));
			}
			Mnemonic::Pha => set(Implied, Op(0x48)),
			Mnemonic::Php => set(Implied, Op(0x08)),
			Mnemonic::Pla => set(Implied, Op(0x68)),
			Mnemonic::Plp => set(Implied, Op(0x28)),
			Mnemonic::Rol => {
				set(ZeroPage, Op(0x26)); set(Absolute, Op(0x2E)); set(Implied, Op(0x2A));
				set(ZeroPageX, Op(0x36)); set(AbsoluteX, Op(0x3E));
			}
			Mnemonic::Ror => {
				set(ZeroPage, Op(0x66)); set(Absolute, Op(0x6E)); set(Implied, Op(0x6A));
				set(ZeroPageX, Op(0x76)); set(AbsoluteX, Op(0x7E));
			}
			Mnemonic::Rti => set(Implied, Op(0x40)),
			Mnemonic::Rts => set(Implied, Op(0x60)),
			Mnemonic::Sbc => {
				set(Immediate, Op(0xE9)); set(Absolute, Op(0xED)); set(ZeroPage, Op(0xE5));
				set(ZeroPageIndirectX, Op(0xE1)); set(ZeroPageIndirectY, Op(0xF1));
				set(ZeroPageX, Op(0xF5)); set(AbsoluteX, Op(0xFD)); set(AbsoluteY, Op(0xF9));
				set(ZeroPageIndirect, C(0xF2));
			}
			Mnemonic::Sec => set(Implied, Op(0x38)),
			Mnemonic::Sed => set(Implied, Op(0xF8)),
			Mnemonic::Sei => set(Implied, Op(0x78)),
			Mnemonic::Sta => {
				set(Absolute, Op(0x8D)); set(ZeroPage, Op(0x85));
				set(ZeroPageIndirectX, Op(0x81)); set(ZeroPageIndirectY, Op(0x91));
				set(ZeroPageX, Op(0x95)); set(AbsoluteX, Op(0x9D)); set(AbsoluteY, Op(0x99));
				set(ZeroPageIndirect, C(0x92));
			}
			Mnemonic::Stx => {
				set(Absolute, Op(0x8E)); set(ZeroPage, Op(0x86)); set(ZeroPageY, Op(0x96));
			}
			Mnemonic::Sty => {
				set(Absolute, Op(0x8C)); set(ZeroPage, Op(0x84)); set(ZeroPageX, Op(0x94));
			}
			Mnemonic::Tax => set(Implied, Op(0xAA)),
			Mnemonic::Tay => set(Implied, Op(0xA8)),
			Mnemonic::Tsx => set(Implied, Op(0xBA)),
			Mnemonic::Txa => set(Implied, Op(0x8A)),
			Mnemonic::Txs => set(Implied, Op(0x9A)),
			Mnemonic::Tya => set(Implied, Op(0x98)),
		}
		row
	}

	/// Opcode slot for one addressing mode.
	pub fn slot(self, mode: AddressMode) -> Slot {
		self.table_row()[mode as usize]
	}
}

impl fmt::Display for Mnemonic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl Mnemonic {
	/// The canonical uppercase spelling.
	pub fn as_str(self) -> &'static str {
		match self {
			Mnemonic::Adc => "ADC", Mnemonic::And => "AND", Mnemonic::Asl => "ASL",
			Mnemonic::Bcc => "BCC", Mnemonic::Bcs => "BCS", Mnemonic::Beq => "BEQ",
			Mnemonic::Bit => "BIT", Mnemonic::Bmi => "BMI", Mnemonic::Bne => "BNE",
			Mnemonic::Bpl => "BPL", Mnemonic::Brk => "BRK", Mnemonic::Bvc => "BVC",
			Mnemonic::Bvs => "BVS", Mnemonic::Clc => "CLC", Mnemonic::Cld => "CLD",
			Mnemonic::Cli => "CLI", Mnemonic::Clv => "CLV", Mnemonic::Cmp => "CMP",
			Mnemonic::Cpx => "CPX", Mnemonic::Cpy => "CPY", Mnemonic::Dec => "DEC",
			Mnemonic::Dex => "DEX", Mnemonic::Dey => "DEY", Mnemonic::Eor => "EOR",
			Mnemonic::Inc => "INC", Mnemonic::Inx => "INX", Mnemonic::Iny => "INY",
			Mnemonic::Jmp => "JMP", Mnemonic::Jsr => "JSR", Mnemonic::Lda => "LDA",
			Mnemonic::Ldx => "LDX", Mnemonic::Ldy => "LDY", Mnemonic::Lsr => "LSR",
			Mnemonic::Nop => "NOP", Mnemonic::Ora => "ORA", Mnemonic::Pha => "PHA",
			Mnemonic::Php => "PHP", Mnemonic::Pla => "PLA", Mnemonic::Plp => "PLP",
			Mnemonic::Rol => "ROL", Mnemonic::Ror => "ROR", Mnemonic::Rti => "RTI",
			Mnemonic::Rts => "RTS", Mnemonic::Sbc => "SBC", Mnemonic::Sec => "SEC",
			Mnemonic::Sed => "SED", Mnemonic::Sei => "SEI", Mnemonic::Sta => "STA",
			Mnemonic::Stx => "STX", Mnemonic::Sty => "STY", Mnemonic::Tax => "TAX",
			Mnemonic::Tay => "TAY", Mnemonic::Tsx => "TSX", Mnemonic::Txa => "TXA",
			Mnemonic::Txs => "TXS", Mnemonic::Tya => "TYA",
		}
	}
}

impl FromStr for Mnemonic {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, ()> {
		Mnemonic::ALL
			.iter()
			.copied()
			.find(|m| m.as_str().eq_ignore_ascii_case(s))
			.ok_or(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lda_has_full_accumulator_mode_set() {
		let row = Mnemonic::Lda.table_row();
		assert_eq!(row[AddressMode::Immediate as usize], Slot::Op(0xA9));
		assert_eq!(row[AddressMode::ZeroPage as usize], Slot::Op(0xA5));
		assert_eq!(row[AddressMode::ZeroPageIndirect as usize], Slot::C02Only(0xB2));
		assert_eq!(row[AddressMode::Relative as usize], Slot::Unsupported);
	}

	#[test]
	fn jmp_and_jsr_upgrade_zero_page_to_absolute() {
		assert_eq!(Mnemonic::Jmp.slot(AddressMode::ZeroPage), Slot::ZpUpgrade(0x4C));
		assert_eq!(Mnemonic::Jsr.slot(AddressMode::ZeroPage), Slot::ZpUpgrade(0x20));
	}

	#[test]
	fn branches_are_relative_only() {
		for &m in &[Mnemonic::Bcc, Mnemonic::Beq, Mnemonic::Bvs] {
			assert!(m.is_branch());
			assert_ne!(m.slot(AddressMode::Relative), Slot::Unsupported);
			assert_eq!(m.slot(AddressMode::Absolute), Slot::Unsupported);
		}
	}

	#[test]
	fn from_str_is_case_insensitive() {
		assert_eq!("lda".parse::<Mnemonic>().unwrap(), Mnemonic::Lda);
		assert_eq!("LDA".parse::<Mnemonic>().unwrap(), Mnemonic::Lda);
		assert!("foo".parse::<Mnemonic>().is_err());
	}

	#[test]
	fn all_56_mnemonics_present() {
		assert_eq!(Mnemonic::ALL.len(), 56);
	}
}
