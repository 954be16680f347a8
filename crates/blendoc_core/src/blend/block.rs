use crate::blend::bytes::Cursor;
use crate::blend::{BHead, BlendError, BlendHeader, Result};

/// Borrowed view over one parsed block: header plus payload bytes.
#[derive(Debug, Clone, Copy)]
pub struct Block<'a> {
	/// Parsed block header.
	pub head: BHead,
	/// Raw payload bytes.
	pub payload: &'a [u8],
	/// Absolute byte offset of the payload within the file.
	pub payload_offset: usize,
}

/// One directory entry: a non-`DNA1`, non-`ENDB` block's header and the
/// absolute file offset of its payload. The directory preserves on-disk
/// order.
#[derive(Debug, Clone, Copy)]
pub struct DirectoryEntry {
	/// Parsed block header.
	pub head: BHead,
	/// Absolute byte offset of the payload within the file.
	pub payload_offset: usize,
}

/// Walked block directory plus the located SDNA payload bounds.
#[derive(Debug)]
pub struct Directory {
	/// Directory entries in on-disk order, excluding `DNA1` and `ENDB`.
	pub entries: Vec<DirectoryEntry>,
	/// Absolute byte offset of the `DNA1` block's payload.
	pub dna_payload_offset: usize,
	/// Byte length of the `DNA1` block's payload.
	pub dna_payload_size: usize,
}

impl Directory {
	/// Walk blocks starting at `offset`, recording every block except
	/// `DNA1` (captured separately) and `ENDB` (the terminator).
	///
	/// Fails with [`BlendError::Truncated`] on premature EOF, or
	/// [`BlendError::NoSchema`] if no `DNA1` block is found before `ENDB`.
	pub fn walk(bytes: &[u8], offset: usize, header: BlendHeader) -> Result<Self> {
		let mut cursor = Cursor::new(bytes.get(offset..).ok_or(BlendError::Truncated {
			at: bytes.len(),
			need: 0,
			rem: 0,
		})?);

		let mut entries = Vec::new();
		let mut dna: Option<(usize, usize)> = None;

		loop {
			if cursor.remaining() == 0 {
				return Err(BlendError::Truncated {
					at: offset + cursor.pos(),
					need: 1,
					rem: 0,
				});
			}

			let head = BHead::parse(&mut cursor, header)?;
			let payload_size = head.payload_size as usize;
			let payload_offset = offset + cursor.pos();
			let payload = cursor.read_exact(payload_size)?;

			if head.is_dna() {
				dna = Some((payload_offset, payload.len()));
			} else if head.is_endb() {
				let (dna_payload_offset, dna_payload_size) = dna.ok_or(BlendError::NoSchema)?;
				return Ok(Self {
					entries,
					dna_payload_offset,
					dna_payload_size,
				});
			} else {
				entries.push(DirectoryEntry { head, payload_offset });
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::blend::header::{Endianness, VersionTriple};

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

	#[test]
	fn walks_directory_and_excludes_dna1_and_endb() {
		let mut buf = Vec::new();
		push_block(&mut buf, b"OB\0\0", b"hello world!", 0x1000, 3, 1);
		push_block(&mut buf, b"DNA1", b"schema-bytes", 0, 0, 0);
		push_block(&mut buf, b"ENDB", b"", 0, 0, 0);

		let dir = Directory::walk(&buf, 0, header()).expect("walk succeeds");
		assert_eq!(dir.entries.len(), 1);
		assert_eq!(dir.entries[0].head.code, *b"OB\0\0");
		assert_eq!(dir.dna_payload_size, b"schema-bytes".len());
	}

	#[test]
	fn missing_dna1_is_no_schema() {
		let mut buf = Vec::new();
		push_block(&mut buf, b"OB\0\0", b"x", 0x1000, 0, 1);
		push_block(&mut buf, b"ENDB", b"", 0, 0, 0);

		let err = Directory::walk(&buf, 0, header()).expect_err("missing DNA1 should fail");
		assert!(matches!(err, BlendError::NoSchema));
	}

	#[test]
	fn missing_endb_is_truncated() {
		let mut buf = Vec::new();
		push_block(&mut buf, b"DNA1", b"schema", 0, 0, 0);

		let err = Directory::walk(&buf, 0, header()).expect_err("missing ENDB should fail");
		assert!(matches!(err, BlendError::Truncated { .. }));
	}

	#[test]
	fn short_payload_is_truncated() {
		let mut buf = Vec::new();
		buf.extend_from_slice(b"OB\0\0");
		buf.extend_from_slice(&100_u32.to_le_bytes());
		buf.extend_from_slice(&0x1000_u64.to_le_bytes());
		buf.extend_from_slice(&0_u32.to_le_bytes());
		buf.extend_from_slice(&1_u32.to_le_bytes());
		buf.extend_from_slice(b"short");

		let err = Directory::walk(&buf, 0, header()).expect_err("short payload should fail");
		assert!(matches!(err, BlendError::Truncated { .. }));
	}
}
