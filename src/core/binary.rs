//! The 64 KiB image buffer, segment/origin tracking, and the write queue of
//! pending output files (§3 "BinaryBuffer", §4.5).

use std::path::{Path, PathBuf};

use crate::error::{AssemblyError, AssemblyResult};
use crate::output::sav;

/// Output container format for a queued write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFormat {
	Sav,
	Rw18,
}

/// One queued output file.
#[derive(Debug, Clone)]
pub struct WriteRecord {
	pub format: WriteFormat,
	pub filename: String,
	/// RW18 record type; unused for `Sav`.
	pub record_type: u8,
	/// RW18 record count; unused for `Sav`.
	pub count: u8,
	pub address: u16,
	pub length: u16,
}

const IMAGE_SIZE: usize = 0x1_0000;

/// The 64 KiB image plus bookkeeping for the currently open segment, dummy
/// mode, and the queue of output files to flush at the end of a run.
pub struct BinaryBuffer {
	image: Box<[u8; IMAGE_SIZE]>,
	pc: u32,
	segment_start: Option<u16>,
	segment_len: usize,
	dummy_pc: Option<u32>,
	saved_real_pc: Option<u32>,
	segments: Vec<(u16, usize)>,
	queue: Vec<WriteRecord>,
}

impl Default for BinaryBuffer {
	fn default() -> Self {
		Self {
			image: Box::new([0u8; IMAGE_SIZE]),
			pc: 0,
			segment_start: None,
			segment_len: 0,
			dummy_pc: None,
			saved_real_pc: None,
			segments: Vec::new(),
			queue: Vec::new(),
		}
	}
}

impl BinaryBuffer {
	/// An empty buffer with PC at 0 and no open segment.
	pub fn new() -> Self {
		Self::default()
	}

	/// Current program counter (dummy PC while inside `DUM`/`DEND`).
	pub fn current_pc(&self) -> u16 {
		self.dummy_pc.unwrap_or(self.pc) as u16
	}

	/// Whether a `DUM`/`DEND` dummy segment is currently open.
	pub fn in_dummy(&self) -> bool {
		self.dummy_pc.is_some()
	}

	/// Start a new segment at `addr`. Errors if `addr` falls inside a segment
	/// that already received bytes.
	pub fn set_origin(&mut self, addr: u16) -> AssemblyResult<()> {
		if self
			.segments
			.iter()
			.any(|&(start, len)| (addr as usize) >= start as usize && (addr as usize) < start as usize + len)
		{
			return Err(AssemblyError::Internal {
				message: format!("${addr:04X} is already covered by a previous segment."),
			});
		}
		self.pc = addr as u32;
		self.segment_start = Some(addr);
		self.segment_len = 0;
		Ok(())
	}

	/// Enter a `DUM` dummy segment at `addr`; the real PC is paused.
	pub fn enter_dummy(&mut self, addr: u16) {
		if self.dummy_pc.is_none() {
			self.saved_real_pc = Some(self.pc);
		}
		self.dummy_pc = Some(addr as u32);
	}

	/// Leave a dummy segment (`DEND`), resuming the real PC. Errors if no
	/// `DUM` is currently open.
	pub fn exit_dummy(&mut self) -> AssemblyResult<()> {
		if self.dummy_pc.is_none() {
			return Err(AssemblyError::Internal {
				message: "DEND without a matching DUM.".to_string(),
			});
		}
		self.dummy_pc = None;
		if let Some(saved) = self.saved_real_pc.take() {
			self.pc = saved;
		}
		Ok(())
	}

	/// Reserve `n` bytes at the current PC and advance it, failing if this
	/// would push any counter past 64 KiB. Returns the address the reservation
	/// started at. Does not touch the image; call [`write`](Self::write)
	/// separately once bytes are known (skip it while `in_dummy`).
	pub fn reserve(&mut self, n: usize) -> AssemblyResult<u16> {
		let counter = if let Some(dummy) = self.dummy_pc.as_mut() {
			dummy
		} else {
			&mut self.pc
		};
		let start = *counter;
		let end = start + n as u32;
		if end > IMAGE_SIZE as u32 {
			return Err(AssemblyError::semantic(
				crate::error::SourcePos::unknown(),
				"Exceeded the 65536 allowed bytes in the object file.".to_string(),
			));
		}
		*counter = end;
		Ok(start as u16)
	}

	/// Write `bytes` at `addr` into the image and extend the current segment's
	/// tracked length. Must not be called while `in_dummy`.
	pub fn write(&mut self, addr: u16, bytes: &[u8]) {
		debug_assert!(!self.in_dummy());
		for (offset, &byte) in bytes.iter().enumerate() {
			self.image[addr as usize + offset] = byte;
		}
		if let Some(start) = self.segment_start {
			let end = addr as usize + bytes.len();
			self.segment_len = self.segment_len.max(end.saturating_sub(start as usize));
		}
		self.segments_record(addr, bytes.len());
	}

	/// Overwrite already-reserved bytes at `addr` (forward-reference back-patching).
	/// Unlike [`write`](Self::write), does not extend segment tracking: the
	/// bytes were already accounted for when first reserved.
	pub fn patch(&mut self, addr: u16, bytes: &[u8]) {
		for (offset, &byte) in bytes.iter().enumerate() {
			self.image[addr as usize + offset] = byte;
		}
	}

	fn segments_record(&mut self, addr: u16, len: usize) {
		if let Some(last) = self.segments.last_mut() {
			if last.0 as usize + last.1 == addr as usize {
				last.1 += len;
				return;
			}
		}
		self.segments.push((addr, len));
	}

	/// `(start, length)` of the segment currently open via the last
	/// `set_origin`, for `SAV` (which has no explicit address/length operand).
	pub fn current_segment(&self) -> (u16, u16) {
		(self.segment_start.unwrap_or(0), self.segment_len as u16)
	}

	/// A read-only view of the image in `[start, start+len)`.
	pub fn image_slice(&self, start: u16, len: u16) -> &[u8] {
		&self.image[start as usize..start as usize + len as usize]
	}

	/// Queue a `.SAV` file covering the current segment.
	pub fn queue_write_sav(&mut self, filename: impl Into<String>) {
		let (address, length) = self.current_segment();
		self.queue.push(WriteRecord {
			format: WriteFormat::Sav,
			filename: filename.into(),
			record_type: 0,
			count: 0,
			address,
			length,
		});
	}

	/// Queue an RW18 record with explicit fields (`USR type,count,addr,len`).
	pub fn queue_write_rw18(
		&mut self,
		filename: impl Into<String>,
		record_type: u8,
		count: u8,
		address: u16,
		length: u16,
	) {
		self.queue.push(WriteRecord {
			format: WriteFormat::Rw18,
			filename: filename.into(),
			record_type,
			count,
			address,
			length,
		});
	}

	/// Whether any file is queued.
	pub fn has_queued_writes(&self) -> bool {
		!self.queue.is_empty()
	}

	/// Write every queued file under `output_dir`. On the first failure to
	/// open a file, the whole run is aborted per §4.5/§4.9.
	pub fn flush_all(&self, output_dir: &Path) -> AssemblyResult<Vec<PathBuf>> {
		let mut written = Vec::new();
		for record in &self.queue {
			let path = output_dir.join(&record.filename);
			let image = self.image_slice(record.address, record.length);
			let bytes = match record.format {
				WriteFormat::Sav => sav::encode_sav(record.address, image),
				WriteFormat::Rw18 => sav::encode_rw18(record.record_type, record.count, record.address, image),
			};
			std::fs::write(&path, &bytes).map_err(|_| AssemblyError::FileOpenFailed)?;
			written.push(path);
		}
		Ok(written)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reserve_advances_pc_and_returns_start() {
		let mut buffer = BinaryBuffer::new();
		buffer.set_origin(0x0800).unwrap();
		let addr = buffer.reserve(3).unwrap();
		assert_eq!(addr, 0x0800);
		assert_eq!(buffer.current_pc(), 0x0803);
	}

	#[test]
	fn reserve_past_64k_errors() {
		let mut buffer = BinaryBuffer::new();
		buffer.set_origin(0xFFFE).unwrap();
		assert!(buffer.reserve(4).is_err());
		assert!(buffer.reserve(2).is_ok());
	}

	#[test]
	fn dummy_segment_advances_pc_without_writing_image() {
		let mut buffer = BinaryBuffer::new();
		buffer.set_origin(0x0800).unwrap();
		buffer.enter_dummy(0x0300);
		assert!(buffer.in_dummy());
		let addr = buffer.reserve(2).unwrap();
		assert_eq!(addr, 0x0300);
		buffer.exit_dummy().unwrap();
		assert!(!buffer.in_dummy());
		assert_eq!(buffer.current_pc(), 0x0800);
	}

	#[test]
	fn write_and_read_back_image_slice() {
		let mut buffer = BinaryBuffer::new();
		buffer.set_origin(0x0800).unwrap();
		buffer.reserve(2).unwrap();
		buffer.write(0x0800, &[0x00, 0xFF]);
		assert_eq!(buffer.image_slice(0x0800, 2), &[0x00, 0xFF]);
		assert_eq!(buffer.current_segment(), (0x0800, 2));
	}
}
