//! Configuration for the assembler's host-supplied init parameters.
//!
//! The engine never reads a config file itself — the three fields here are exactly
//! the optional init parameters spec'd for the host to supply; everything else
//! (source reading, listing sink, output directory layout beyond this prefix) is a
//! CLI/host concern.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Host-supplied configuration for one assembly run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
	/// Redirects the listing from stdout to this file, if set.
	pub list_filename: Option<PathBuf>,

	/// Prefix directory for `SAV`/`USR` outputs. A trailing separator is added
	/// when flushing if the caller didn't include one.
	pub output_directory: Option<PathBuf>,

	/// Search path for `PUT`, in search order. Mirrors Merlin's
	/// semicolon-separated `pPutDirectories` string.
	pub put_directories: Vec<PathBuf>,
}

impl Config {
	/// An empty configuration: listing to stdout, outputs to the current
	/// directory, `PUT` resolved relative to the including file only.
	pub fn new() -> Self {
		Self::default()
	}

	/// Start building a `Config` fluently.
	pub fn builder() -> ConfigBuilder {
		ConfigBuilder::default()
	}

	/// Resolve a `PUT` target against the configured search path, trying each
	/// directory in order and appending `.S` if the name has no extension.
	pub fn resolve_put(&self, name: &str) -> Vec<PathBuf> {
		let candidate_names: Vec<String> = if Path::new(name).extension().is_some() {
			vec![name.to_string()]
		} else {
			vec![name.to_string(), format!("{name}.S")]
		};

		let mut candidates = Vec::new();
		for dir in &self.put_directories {
			for candidate_name in &candidate_names {
				candidates.push(dir.join(candidate_name));
			}
		}
		for candidate_name in &candidate_names {
			candidates.push(PathBuf::from(candidate_name));
		}
		candidates
	}

	/// The effective output directory, with a trailing separator guaranteed.
	pub fn output_dir(&self) -> PathBuf {
		self.output_directory.clone().unwrap_or_else(|| PathBuf::from("."))
	}
}

/// Fluent builder for [`Config`], in the style of the corpus's builder types.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
	list_filename: Option<PathBuf>,
	output_directory: Option<PathBuf>,
	put_directories: Vec<PathBuf>,
}

impl ConfigBuilder {
	/// Redirect the listing to `path` instead of stdout.
	pub fn list_filename(mut self, path: impl Into<PathBuf>) -> Self {
		self.list_filename = Some(path.into());
		self
	}

	/// Set the output directory prefix for `SAV`/`USR` files.
	pub fn output_directory(mut self, path: impl Into<PathBuf>) -> Self {
		self.output_directory = Some(path.into());
		self
	}

	/// Append one directory to the `PUT` search path.
	pub fn put_directory(mut self, path: impl Into<PathBuf>) -> Self {
		self.put_directories.push(path.into());
		self
	}

	/// Replace the whole `PUT` search path.
	pub fn put_directories(mut self, paths: Vec<PathBuf>) -> Self {
		self.put_directories = paths;
		self
	}

	/// Finish building.
	pub fn build(self) -> Config {
		Config {
			list_filename: self.list_filename,
			output_directory: self.output_directory,
			put_directories: self.put_directories,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn resolve_put_appends_dot_s_and_searches_each_dir() {
		let config = Config::builder()
			.put_directory("/a")
			.put_directory("/b")
			.build();
		let candidates = config.resolve_put("MACROS");
		assert_eq!(
			candidates,
			vec![
				PathBuf::from("/a/MACROS"),
				PathBuf::from("/a/MACROS.S"),
				PathBuf::from("/b/MACROS"),
				PathBuf::from("/b/MACROS.S"),
				PathBuf::from("MACROS"),
				PathBuf::from("MACROS.S"),
			]
		);
	}

	#[test]
	fn resolve_put_respects_explicit_extension() {
		let config = Config::new();
		assert_eq!(config.resolve_put("lib.inc"), vec![PathBuf::from("lib.inc")]);
	}

	#[test]
	fn output_dir_defaults_to_current_directory() {
		assert_eq!(Config::new().output_dir(), PathBuf::from("."));
	}
}
