use std::collections::HashMap;
use std::rc::Rc;

use crate::blend::block::{Directory, DirectoryEntry};
use crate::blend::decoder::DecoderCache;
use crate::blend::record::Record;
use crate::blend::{BHead, BlendError, Dna, Endianness, FileHandle, Result, VersionTriple};

/// Result of resolving a pointer field: null, one record, or a homogeneous
/// sequence when the target block's `count` is greater than one.
#[derive(Debug, Clone)]
pub enum PointerTarget {
	/// Raw pointer bytes were all zero.
	Null,
	/// Target block held exactly one structure instance.
	One(Record),
	/// Target block held more than one instance.
	Many(Vec<Record>),
	/// Independent per-slot resolutions for a pointer-array or
	/// pointer-to-pointer field (e.g. `*mtex[18]`). Each slot's address is
	/// resolved on its own and may itself be `Null`, `One`, or `Many`.
	Sequence(Vec<PointerTarget>),
}

#[derive(Debug, Clone, Copy)]
struct PtrEntry {
	head: BHead,
	payload_offset: usize,
}

/// Address → block index, built once at open time so pointer resolution is
/// an exact lookup rather than a linear scan of the directory. Spec.md §4.8
/// step 1 requires matching a pointer's raw address against a block's
/// `orig_address` by exact equality, not by falling inside its byte range.
#[derive(Debug)]
pub struct PointerIndex {
	by_address: HashMap<u64, PtrEntry>,
}

impl PointerIndex {
	/// Build the index from a walked block directory.
	pub fn build(directory: &Directory) -> Self {
		let by_address = directory
			.entries
			.iter()
			.filter(|entry: &&DirectoryEntry| entry.head.orig_address != 0)
			.map(|entry| {
				(
					entry.head.orig_address,
					PtrEntry {
						head: entry.head,
						payload_offset: entry.payload_offset,
					},
				)
			})
			.collect();
		Self { by_address }
	}

	/// Resolve `addr` to a [`PointerTarget`], decoding the target block with
	/// the (possibly just-synthesized) decoder for its schema type.
	#[allow(clippy::too_many_arguments)]
	pub fn resolve_record(&self, addr: u64, dna: &Dna, cache: &DecoderCache, version: VersionTriple, endian: Endianness, bytes: &Rc<[u8]>, file: &FileHandle) -> Result<PointerTarget> {
		if addr == 0 {
			return Ok(PointerTarget::Null);
		}

		let entry = *self.by_address.get(&addr).ok_or(BlendError::DanglingPointer { ptr: addr })?;

		let item = dna.struct_by_schema_index(entry.head.schema_index).ok_or_else(|| BlendError::BadSchema {
			reason: format!("block schema_index {} out of range", entry.head.schema_index),
		})?;
		let type_name = dna.type_name(item.type_index).to_owned();
		let struct_size = usize::from(dna.type_size(item.type_index));
		if struct_size == 0 {
			return Err(BlendError::FieldDecodeError {
				reason: format!("struct {type_name} has zero declared size"),
			});
		}

		let count = (entry.head.count as usize).max(1);

		let decoder = cache.get_or_synthesize(version, dna, &type_name)?;

		if count == 1 {
			let record = Record::new(decoder, Rc::clone(bytes), entry.payload_offset, endian, file.clone());
			Ok(PointerTarget::One(record))
		} else {
			let mut out = Vec::with_capacity(count);
			for index in 0..count {
				let offset = entry.payload_offset + index * struct_size;
				out.push(Record::new(Rc::clone(&decoder), Rc::clone(bytes), offset, endian, file.clone()));
			}
			Ok(PointerTarget::Many(out))
		}
	}

	/// Number of addressable blocks in the index.
	pub fn len(&self) -> usize {
		self.by_address.len()
	}

	/// Whether the index has no addressable blocks.
	pub fn is_empty(&self) -> bool {
		self.by_address.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::blend::header::VersionTriple;
	use crate::blend::{BlendHeader, Dna};

	fn header() -> BlendHeader {
		BlendHeader {
			pointer_width: 8,
			endian: Endianness::Little,
			version: VersionTriple { major: 2, minor: 7, rev: 7 },
		}
	}

	fn push_block(buf: &mut Vec<u8>, code: &[u8; 4], payload: &[u8], addr: u64, schema_index: u32, count: u32) {
		buf.extend_from_slice(code);
		buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
		buf.extend_from_slice(&addr.to_le_bytes());
		buf.extend_from_slice(&schema_index.to_le_bytes());
		buf.extend_from_slice(&count.to_le_bytes());
		buf.extend_from_slice(payload);
	}

	fn sample_dna() -> Dna {
		use crate::blend::dna::{DnaField, DnaStruct};
		let names: Vec<Box<str>> = vec!["value".into()];
		let types: Vec<Box<str>> = vec!["int".into(), "Node".into()];
		let node = DnaStruct {
			type_index: 1,
			fields: vec![DnaField { type_index: 0, name_index: 0 }],
		};
		let mut struct_for_type = vec![None; 2];
		struct_for_type[1] = Some(0);
		Dna {
			names,
			types,
			type_sizes: vec![4, 4],
			structs: vec![node],
			struct_for_type,
		}
	}

	#[test]
	fn resolves_address_to_containing_block() {
		let mut buf = Vec::new();
		push_block(&mut buf, b"OB\0\0", &4_i32.to_le_bytes(), 0x2000, 0, 1);
		push_block(&mut buf, b"DNA1", b"schema", 0, 0, 0);
		push_block(&mut buf, b"ENDB", b"", 0, 0, 0);

		let directory = Directory::walk(&buf, 0, header()).expect("walk succeeds");
		let index = PointerIndex::build(&directory);

		let dna = sample_dna();
		let cache = DecoderCache::new(8);
		let bytes: Rc<[u8]> = Rc::from(buf.into_boxed_slice());

		let target = index.resolve_record(0x2000, &dna, &cache, header().version, Endianness::Little, &bytes, &FileHandle::none()).expect("resolves");
		assert!(matches!(target, PointerTarget::One(_)));
	}

	#[test]
	fn null_address_resolves_to_null() {
		let directory = Directory {
			entries: Vec::new(),
			dna_payload_offset: 0,
			dna_payload_size: 0,
		};
		let index = PointerIndex::build(&directory);
		let dna = sample_dna();
		let cache = DecoderCache::new(8);
		let bytes: Rc<[u8]> = Rc::from(Vec::new().into_boxed_slice());
		let target = index.resolve_record(0, &dna, &cache, header().version, Endianness::Little, &bytes, &FileHandle::none()).expect("resolves");
		assert!(matches!(target, PointerTarget::Null));
	}

	#[test]
	fn unmatched_address_is_dangling() {
		let directory = Directory {
			entries: Vec::new(),
			dna_payload_offset: 0,
			dna_payload_size: 0,
		};
		let index = PointerIndex::build(&directory);
		let dna = sample_dna();
		let cache = DecoderCache::new(8);
		let bytes: Rc<[u8]> = Rc::from(Vec::new().into_boxed_slice());
		let err = index.resolve_record(0x9999, &dna, &cache, header().version, Endianness::Little, &bytes, &FileHandle::none()).expect_err("should be dangling");
		assert!(matches!(err, BlendError::DanglingPointer { .. }));
	}

	#[test]
	fn multi_element_block_resolves_to_many() {
		let mut buf = Vec::new();
		let mut payload = Vec::new();
		payload.extend_from_slice(&1_i32.to_le_bytes());
		payload.extend_from_slice(&2_i32.to_le_bytes());
		payload.extend_from_slice(&3_i32.to_le_bytes());
		push_block(&mut buf, b"OB\0\0", &payload, 0x3000, 0, 3);
		push_block(&mut buf, b"DNA1", b"schema", 0, 0, 0);
		push_block(&mut buf, b"ENDB", b"", 0, 0, 0);

		let directory = Directory::walk(&buf, 0, header()).expect("walk succeeds");
		let index = PointerIndex::build(&directory);
		let dna = sample_dna();
		let cache = DecoderCache::new(8);
		let bytes: Rc<[u8]> = Rc::from(buf.into_boxed_slice());

		let target = index.resolve_record(0x3000, &dna, &cache, header().version, Endianness::Little, &bytes, &FileHandle::none()).expect("resolves");
		match target {
			PointerTarget::Many(records) => assert_eq!(records.len(), 3),
			other => panic!("expected Many, got {other:?}"),
		}
	}

	#[test]
	fn address_inside_a_blocks_byte_range_but_not_equal_to_its_start_is_dangling() {
		// A single-element block at 0x2000 is 4 bytes wide. 0x2000 itself
		// must resolve; 0x2002, which falls inside the block's byte range
		// but is not the block's own recorded original address, must not -
		// spec.md §4.8 step 1 is exact-equality only, with no tolerance for
		// mid-block addresses.
		let mut buf = Vec::new();
		push_block(&mut buf, b"OB\0\0", &4_i32.to_le_bytes(), 0x2000, 0, 1);
		push_block(&mut buf, b"DNA1", b"schema", 0, 0, 0);
		push_block(&mut buf, b"ENDB", b"", 0, 0, 0);

		let directory = Directory::walk(&buf, 0, header()).expect("walk succeeds");
		let index = PointerIndex::build(&directory);
		let dna = sample_dna();
		let cache = DecoderCache::new(8);
		let bytes: Rc<[u8]> = Rc::from(buf.into_boxed_slice());

		let exact = index.resolve_record(0x2000, &dna, &cache, header().version, Endianness::Little, &bytes, &FileHandle::none()).expect("exact start address resolves");
		assert!(matches!(exact, PointerTarget::One(_)));

		let err = index
			.resolve_record(0x2002, &dna, &cache, header().version, Endianness::Little, &bytes, &FileHandle::none())
			.expect_err("an address strictly inside the block's byte range must not resolve");
		assert!(matches!(err, BlendError::DanglingPointer { .. }));
	}
}
