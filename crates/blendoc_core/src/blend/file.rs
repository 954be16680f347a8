use std::cell::Cell;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::rc::{Rc, Weak};

use crate::blend::block::Directory;
use crate::blend::decoder::{DecoderCache, FieldShape, SynthesizedDecoder};
use crate::blend::factory::Factory;
use crate::blend::pointer::{PointerIndex, PointerTarget};
use crate::blend::{BlendError, BlendHeader, Dna, Result};

pub(crate) struct FileInner {
	header: BlendHeader,
	dna: Dna,
	directory: Directory,
	pointer_index: PointerIndex,
	decoder_cache: DecoderCache,
	bytes: Rc<[u8]>,
	closed: Cell<bool>,
	self_handle: Weak<FileInner>,
}

impl FileInner {
	pub(crate) fn pointer_width(&self) -> u8 {
		self.header.pointer_width
	}

	pub(crate) fn resolve_pointer(&self, addr: u64) -> Result<PointerTarget> {
		if self.closed.get() {
			return Err(BlendError::ParentClosed);
		}
		self.pointer_index.resolve_record(addr, &self.dna, &self.decoder_cache, self.header.version, self.header.endian, &self.bytes, &self.handle())
	}

	pub(crate) fn handle(&self) -> FileHandle {
		FileHandle(self.self_handle.clone())
	}
}

/// A weak, upgradeable reference to an open file, held by [`Record`](crate::blend::Record)
/// and [`Factory`] for pointer resolution. Every accessor that upgrades a
/// stale or explicitly-[`close`](File::close)d handle fails with
/// [`BlendError::ParentClosed`].
#[derive(Clone, Debug)]
pub struct FileHandle(Weak<FileInner>);

impl FileHandle {
	/// A handle with no backing file; every upgrade fails. Useful for
	/// records constructed outside of an open [`File`] (tests, fixtures).
	pub fn none() -> Self {
		Self(Weak::new())
	}

	pub(crate) fn upgrade(&self) -> Option<Rc<FileInner>> {
		let inner = self.0.upgrade()?;
		if inner.closed.get() { None } else { Some(inner) }
	}
}

/// Top-level handle over an open `.blend` file: owns the raw bytes, the
/// parsed header, block directory, and SDNA, and caches factories and
/// synthesized decoders for the file's producer version.
pub struct File {
	inner: Rc<FileInner>,
}

impl File {
	/// Open and fully parse (header, directory, SDNA) the file at `path`.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let raw = fs::read(path)?;
		Self::from_bytes(raw)
	}

	/// Parse an in-memory `.blend` byte buffer.
	pub fn from_bytes(raw: Vec<u8>) -> Result<Self> {
		let header = BlendHeader::parse(&raw)?;
		let directory = Directory::walk(&raw, BlendHeader::SIZE, header)?;
		let dna_payload = raw
			.get(directory.dna_payload_offset..directory.dna_payload_offset + directory.dna_payload_size)
			.ok_or(BlendError::Truncated {
				at: directory.dna_payload_offset,
				need: directory.dna_payload_size,
				rem: raw.len().saturating_sub(directory.dna_payload_offset),
			})?;
		let dna = Dna::parse(dna_payload, header.endian)?;
		let pointer_index = PointerIndex::build(&directory);
		let decoder_cache = DecoderCache::new(header.pointer_width);
		let bytes: Rc<[u8]> = Rc::from(raw.into_boxed_slice());

		let inner = Rc::new_cyclic(|weak| FileInner {
			header,
			dna,
			directory,
			pointer_index,
			decoder_cache,
			bytes,
			closed: Cell::new(false),
			self_handle: weak.clone(),
		});

		Ok(Self { inner })
	}

	/// Parsed file header.
	pub fn header(&self) -> BlendHeader {
		self.inner.header
	}

	/// Get or build the factory for `type_name`, caching its decoder for
	/// the life of the file.
	pub fn list(&self, type_name: &str) -> Result<Factory> {
		self.ensure_open()?;
		Factory::new(
			&self.inner.dna,
			&self.inner.decoder_cache,
			self.inner.header.version,
			type_name,
			&self.inner.directory,
			Rc::clone(&self.inner.bytes),
			self.inner.header.endian,
			self.inner.handle(),
		)
	}

	/// Alias for [`File::list`].
	pub fn find(&self, type_name: &str) -> Result<Factory> {
		self.list(type_name)
	}

	/// Render a textual field tree for `type_name`, descending into
	/// embedded struct fields when `recursive` is set, bounded by
	/// `max_depth` (default unbounded). Pure function of the file's SDNA.
	pub fn tree(&self, type_name: &str, recursive: bool, max_depth: Option<u32>) -> Result<String> {
		self.ensure_open()?;
		let decoder = self.inner.decoder_cache.get_or_synthesize(self.inner.header.version, &self.inner.dna, type_name)?;
		let mut out = String::new();
		let _ = writeln!(out, "{}", decoder.type_name);
		render_tree(&decoder, 0, recursive, max_depth.unwrap_or(u32::MAX), &mut out);
		Ok(out)
	}

	/// Sorted, deduplicated names of every struct-typed entry in SDNA.
	pub fn list_structures(&self) -> Result<Vec<String>> {
		self.ensure_open()?;
		let mut names: Vec<String> = self.inner.dna.structs.iter().map(|item| self.inner.dna.type_name(item.type_index).to_owned()).collect();
		names.sort();
		names.dedup();
		Ok(names)
	}

	/// Mark the file closed. Outstanding [`Factory`]/[`Record`](crate::blend::Record)
	/// handles subsequently fail with [`BlendError::ParentClosed`].
	pub fn close(&self) {
		self.inner.closed.set(true);
	}

	fn ensure_open(&self) -> Result<()> {
		if self.inner.closed.get() { Err(BlendError::ParentClosed) } else { Ok(()) }
	}
}

fn render_tree(decoder: &SynthesizedDecoder, depth: u32, recursive: bool, max_depth: u32, out: &mut String) {
	let indent = "  ".repeat(depth as usize + 1);
	for field in &decoder.fields {
		match &field.shape {
			FieldShape::Pointer { depth: ptr_depth, count } => {
				let stars = "*".repeat(usize::from(*ptr_depth));
				let suffix = if *count > 1 { format!("[{count}]") } else { String::new() };
				let _ = writeln!(out, "{indent}{}: {stars}void{suffix}", field.name);
			}
			FieldShape::CString { len } => {
				let _ = writeln!(out, "{indent}{}: char[{len}]", field.name);
			}
			FieldShape::Primitive { type_name, count, .. } => {
				let suffix = if *count > 1 { format!("[{count}]") } else { String::new() };
				let _ = writeln!(out, "{indent}{}: {type_name}{suffix}", field.name);
			}
			FieldShape::Struct { child, count, .. } => {
				let suffix = if *count > 1 { format!("[{count}]") } else { String::new() };
				let _ = writeln!(out, "{indent}{}: {}{suffix}", field.name, child.type_name);
				if recursive && depth + 1 < max_depth {
					render_tree(child, depth + 1, recursive, max_depth, out);
				}
			}
		}
	}
}
