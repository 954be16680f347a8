use crate::blend::bytes::Cursor;
use crate::blend::{BlendHeader, Result};

/// Parsed block header. Layout matches the historical `"4siPii"` format
/// string: 4-byte code, `i32` payload size, pointer-width address, `u32`
/// schema index, `i32` element count - packed with no inter-field padding.
#[derive(Debug, Clone, Copy)]
pub struct BHead {
	/// Four-byte block code (e.g. `"DNA1"`, `"ENDB"`, `"OB\0\0"`).
	pub code: [u8; 4],
	/// Payload byte length.
	pub payload_size: u32,
	/// Original in-memory address recorded by the producer.
	pub orig_address: u64,
	/// SDNA structure index describing the payload layout.
	pub schema_index: u32,
	/// Number of structure instances stored in the payload.
	pub count: u32,
}

impl BHead {
	/// Parse one block header at the cursor's current position.
	pub fn parse(cursor: &mut Cursor<'_>, header: BlendHeader) -> Result<Self> {
		let code = cursor.read_code4()?;
		let payload_size = cursor.read_u32(header.endian)?;
		let orig_address = cursor.read_ptr(header.pointer_width, header.endian)?;
		let schema_index = cursor.read_u32(header.endian)?;
		let count = cursor.read_u32(header.endian)?;

		Ok(Self {
			code,
			payload_size,
			orig_address,
			schema_index,
			count,
		})
	}

	/// Return `true` when this is the `DNA1` schema block.
	pub fn is_dna(&self) -> bool {
		self.code == *b"DNA1"
	}

	/// Return `true` when this is the terminal `ENDB` block.
	pub fn is_endb(&self) -> bool {
		self.code == *b"ENDB"
	}
}
