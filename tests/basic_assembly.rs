//! End-to-end assembly scenarios, grounded on the literal fixtures of spec §8.

mod common;

use std::io::Write;

use pretty_assertions::assert_eq;
use tempfile::tempdir;

use common::{assemble, assemble_with};
use snap::config::Config;

#[test]
fn immediate_load_listing_matches_fixture() {
	let outcome = assemble(" lda #$100\n").unwrap();
	assert_eq!(outcome.listing, "8000: A9 00        1  lda #$100\n");
	assert_eq!(outcome.error_count, 0);
}

#[test]
fn hex_directive_writes_listing_and_image() {
	let outcome = assemble(" hex 0e0c0a\n").unwrap();
	assert_eq!(outcome.listing, "8000: 0E 0C 0A     1  hex 0e0c0a\n");
	assert_eq!(outcome.error_count, 0);
}

#[test]
fn sav_output_contains_requested_segment() {
	let dir = tempdir().unwrap();
	let config = Config::builder().output_directory(dir.path().to_path_buf()).build();
	let outcome = assemble_with(config, " org $800\n hex 00,ff\n sav out.sav\n").unwrap();
	assert_eq!(outcome.error_count, 0);
	let written = outcome.written_files.first().expect("sav file queued");
	let bytes = std::fs::read(written).unwrap();
	// 4-byte .SAV header (load address, length) followed by the raw bytes.
	assert_eq!(&bytes[4..], &[0x00, 0xFF]);
}

#[test]
fn duplicate_label_reports_error_but_keeps_second_definitions_bytes() {
	let outcome = assemble("entry lda #$60\nentry lda #$61\n").unwrap();
	assert_eq!(outcome.error_count, 1);
	assert!(outcome.diagnostics[0].contains("'entry' symbol has already been defined."));
	assert!(outcome.listing.contains("A9 61"));
}

#[test]
fn forward_reference_patches_absolute_operand_correctly() {
	let outcome = assemble(" org $800\n sta label\nlabel sta $2b\n").unwrap();
	assert_eq!(outcome.error_count, 0);
	assert!(outcome.listing.contains("8D 03 08"));
	assert!(outcome.listing.contains("85 2B"));
}

#[test]
fn do_else_fin_emits_only_the_taken_arm() {
	let outcome = assemble(" do 0\n hex 00\n else\n hex 01\n fin\n").unwrap();
	assert_eq!(outcome.error_count, 0);
	assert!(outcome.listing.contains("01"));
	let then_arm_line = outcome.listing.lines().find(|l| l.contains("hex 00")).unwrap();
	assert!(then_arm_line.starts_with("    : "));
}

#[test]
fn put_pulls_in_a_file_from_the_search_path() {
	let dir = tempdir().unwrap();
	let mut included = std::fs::File::create(dir.path().join("MACROS.S")).unwrap();
	included.write_all(b" lda #$01\n").unwrap();

	let config = Config::builder().put_directory(dir.path().to_path_buf()).build();
	let outcome = assemble_with(config, " put MACROS\n nop\n").unwrap();
	assert_eq!(outcome.error_count, 0);
	assert!(outcome.listing.contains("A9 01"));
	assert!(outcome.listing.contains("EA"));
}

#[test]
fn lup_replays_its_body_n_times_with_matching_pc_advance() {
	let outcome = assemble(" org $900\n lup 4\n hex 11\n--^\n nop\n").unwrap();
	assert_eq!(outcome.error_count, 0);
	assert_eq!(outcome.listing.matches("0900: 11").count(), 1);
	assert_eq!(outcome.listing.matches("0901: 11").count(), 1);
	assert_eq!(outcome.listing.matches("0902: 11").count(), 1);
	assert_eq!(outcome.listing.matches("0903: 11").count(), 1);
	assert!(outcome.listing.contains("0904: EA"));
}

#[test]
fn hex_payload_boundary_32_succeeds_33_fails() {
	let payload_32 = "00".repeat(32);
	let outcome = assemble(&format!(" hex {payload_32}\n")).unwrap();
	assert_eq!(outcome.error_count, 0);

	let payload_33 = "00".repeat(33);
	let outcome = assemble(&format!(" hex {payload_33}\n")).unwrap();
	assert_eq!(outcome.error_count, 1);
}

#[test]
fn ds_backslash_pads_to_next_page_boundary() {
	let outcome = assemble(" org $8010\n ds \\\n nop\n").unwrap();
	assert_eq!(outcome.error_count, 0);
	assert!(outcome.listing.contains("8100: EA"));
}

#[test]
fn undefined_symbol_at_end_of_input_is_reported() {
	let outcome = assemble(" jmp nowhere\n").unwrap();
	assert_eq!(outcome.error_count, 1);
	assert!(outcome.diagnostics[0].contains("'nowhere' label is undefined."));
}

#[test]
fn bare_lup_end_without_matching_lup_is_directive_misuse() {
	let outcome = assemble("--^\n nop\n").unwrap();
	assert_eq!(outcome.error_count, 1);
	assert!(outcome.diagnostics[0].contains("--^ directive without corresponding LUP directive."));
}

#[test]
fn lup_end_listing_line_keeps_trailing_comment_verbatim() {
	let outcome = assemble(" org $900\n lup 1\n hex 11\n--^ ; Comment\n").unwrap();
	assert_eq!(outcome.error_count, 0);
	assert!(outcome.listing.lines().any(|l| l.ends_with("--^ ; Comment")));
}

#[test]
fn lup_end_with_stray_operand_warns_without_erroring() {
	let outcome = assemble(" lup 1\n hex 11\n--^ 1\n").unwrap();
	assert_eq!(outcome.error_count, 0);
	assert!(outcome
		.diagnostics
		.iter()
		.any(|d| d.contains("--^ directive ignoring operand as comment.")));
}

#[test]
fn bare_lup_end_with_stray_operand_warns_and_errors() {
	let outcome = assemble("--^ 1\n").unwrap();
	assert_eq!(outcome.error_count, 1);
	assert!(outcome
		.diagnostics
		.iter()
		.any(|d| d.contains("--^ directive ignoring operand as comment.")));
	assert!(outcome
		.diagnostics
		.iter()
		.any(|d| d.contains("--^ directive without corresponding LUP directive.")));
}
