//! Property-style checks for the universal invariants of spec §8 that the
//! literal-example tests in `basic_assembly.rs` don't already cover per
//! value: byte/word round-trips, the `DS \` fill-count formula, forward-
//! reference patching, `LUP` replay, and the branch-offset boundary, each
//! generated across inputs rather than hand-picked.

mod common;

use proptest::prelude::*;

use common::assemble;

proptest! {
	#[test]
	fn db_round_trips_any_byte(x in 0u8..=255) {
		let outcome = assemble(&format!(" db {x}\n")).unwrap();
		prop_assert_eq!(outcome.error_count, 0);
		prop_assert!(outcome.listing.contains(&format!("8000: {x:02X} ")));
	}

	#[test]
	fn da_round_trips_any_word(x in 0u16..=0xFFFF) {
		let outcome = assemble(&format!(" da {x}\n")).unwrap();
		prop_assert_eq!(outcome.error_count, 0);
		let lo = (x & 0xFF) as u8;
		let hi = (x >> 8) as u8;
		prop_assert!(outcome.listing.contains(&format!("8000: {lo:02X} {hi:02X}")));
	}

	#[test]
	fn ds_backslash_pads_by_the_page_align_formula(org in 0x0000u16..=0xFEFF) {
		let outcome = assemble(&format!(" org {org}\n ds \\\n nop\n")).unwrap();
		prop_assert_eq!(outcome.error_count, 0);
		let fill = (org.wrapping_add(255) & !0xFF).wrapping_sub(org);
		let next_pc = org.wrapping_add(fill);
		prop_assert!(outcome.listing.contains(&format!("{next_pc:04X}: EA")));
	}

	#[test]
	fn branch_offset_boundary_is_127_not_128(k in 0u32..160) {
		let mut source = String::from(" bne past\n");
		for _ in 0..k {
			source.push_str(" nop\n");
		}
		source.push_str("past nop\n");
		let outcome = assemble(&source).unwrap();
		if k <= 127 {
			prop_assert_eq!(outcome.error_count, 0);
		} else {
			prop_assert_eq!(outcome.error_count, 1);
		}
	}

	#[test]
	fn lup_replays_block_n_times_with_matching_pc_advance(n in 1u32..=12) {
		let outcome = assemble(&format!(" org $900\n lup {n}\n hex 11\n--^\n nop\n")).unwrap();
		prop_assert_eq!(outcome.error_count, 0);
		for i in 0..n {
			let addr = 0x900 + i;
			prop_assert!(outcome.listing.contains(&format!("{addr:04X}: 11")));
		}
		let final_addr = 0x900 + n;
		prop_assert!(outcome.listing.contains(&format!("{final_addr:04X}: EA")));
	}

	#[test]
	fn forward_reference_patches_to_the_labels_final_address(skip in 0u32..400) {
		let mut source = String::from(" org $800\n sta label\n");
		for _ in 0..skip {
			source.push_str(" nop\n");
		}
		source.push_str("label sta $2b\n");
		let outcome = assemble(&source).unwrap();
		prop_assert_eq!(outcome.error_count, 0);
		let label_addr = 0x803u32 + skip;
		let lo = (label_addr & 0xFF) as u8;
		let hi = ((label_addr >> 8) & 0xFF) as u8;
		prop_assert!(outcome.listing.contains(&format!("0800: 8D {lo:02X} {hi:02X}")));
	}
}
