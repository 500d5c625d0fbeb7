//! snap CLI
//!
//! Command-line interface for the Merlin-dialect 6502/65C02 cross-assembler.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use snap::config::Config;
use snap::core::AssemblerCore;

#[derive(Parser)]
#[command(
    name = "snap",
    version = snap::VERSION,
    about = "A two-pass 6502/65C02 cross-assembler in the Merlin dialect",
    long_about = "Assembles one or more Merlin-syntax source files, emitting a listing \
                  on stdout (or --listing-file) and any SAV/USR object files the source \
                  requests under --output-dir."
)]
struct Cli {
	/// Source files to assemble, one assembler run per file
	#[arg(value_name = "SOURCEFILE", required = true)]
	sources: Vec<PathBuf>,

	/// Redirect the listing to this file instead of stdout
	#[arg(short = 'L', long, value_name = "FILE")]
	listing_file: Option<PathBuf>,

	/// Directory SAV/USR object files are written under
	#[arg(short, long, value_name = "DIR")]
	output_dir: Option<PathBuf>,

	/// Directory to search for PUT targets, may be given more than once
	#[arg(short = 'I', long = "put-dir", value_name = "DIR")]
	put_dirs: Vec<PathBuf>,

	/// Increase log verbosity (-v, -vv, -vvv)
	#[arg(short, long, action = clap::ArgAction::Count)]
	verbose: u8,
}

fn main() {
	let cli = Cli::parse();
	init_logging(cli.verbose);

	let config = Config::builder()
		.put_directories(cli.put_dirs.clone())
		.output_directory(cli.output_dir.clone().unwrap_or_else(|| PathBuf::from(".")))
		.build();

	let mut had_failure = false;
	for source in &cli.sources {
		match AssemblerCore::assemble_path(config.clone(), source) {
			Ok(outcome) => {
				emit_listing(&cli, &outcome.listing);
				for diagnostic in &outcome.diagnostics {
					eprintln!("{diagnostic}");
				}
				if outcome.error_count > 0 {
					had_failure = true;
				}
			}
			Err(err) => {
				eprintln!("{source}: {err}", source = source.display());
				had_failure = true;
			}
		}
	}

	if had_failure {
		process::exit(1);
	}
}

fn emit_listing(cli: &Cli, listing: &str) {
	match &cli.listing_file {
		Some(path) => {
			if let Err(err) = std::fs::write(path, listing) {
				eprintln!("failed to write listing to {}: {err}", path.display());
			}
		}
		None => print!("{listing}"),
	}
}

fn init_logging(verbose: u8) {
	let level = match verbose {
		0 => log::LevelFilter::Warn,
		1 => log::LevelFilter::Info,
		2 => log::LevelFilter::Debug,
		_ => log::LevelFilter::Trace,
	};
	env_logger::Builder::from_default_env().filter_level(level).init();
}
