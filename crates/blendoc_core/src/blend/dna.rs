use crate::blend::bytes::Cursor;
use crate::blend::{BlendError, Endianness, Result};

/// One field declaration within a [`DnaStruct`]: a pair of indices into
/// the parent [`Dna`]'s `types`/`names` tables.
#[derive(Debug, Clone, Copy)]
pub struct DnaField {
	/// Index into `Dna::types`.
	pub type_index: u16,
	/// Index into `Dna::names`.
	pub name_index: u16,
}

/// One structure definition: its own type index plus an ordered field list.
#[derive(Debug, Clone)]
pub struct DnaStruct {
	/// Index into `Dna::types` naming this structure.
	pub type_index: u16,
	/// Ordered `(type_index, name_index)` field declarations.
	pub fields: Vec<DnaField>,
}

/// Parsed SDNA schema: four parallel tables describing every record
/// layout known to the producer that wrote this file.
#[derive(Debug)]
pub struct Dna {
	/// Raw field declarator strings (e.g. `"*next"`, `"co[3]"`).
	pub names: Vec<Box<str>>,
	/// Type names: primitives (`"float"`, `"int"`, ...) or struct names.
	pub types: Vec<Box<str>>,
	/// Byte size per entry in `types`.
	pub type_sizes: Vec<u16>,
	/// Structure definitions, indexed by "schema index".
	pub structs: Vec<DnaStruct>,
	/// `types` index → `structs` index, for types that are structs.
	pub struct_for_type: Vec<Option<u32>>,
}

impl Dna {
	/// Parse the `DNA1` block payload.
	///
	/// The payload holds four 4-byte-aligned sections in order: `SDNA`+`NAME`
	/// (combined 8-byte header), `TYPE`, `TLEN`, `STRC`. Numeric fields
	/// within the SDNA payload use the file's own endianness.
	pub fn parse(payload: &[u8], endian: Endianness) -> Result<Self> {
		let mut cursor = Cursor::new(payload);

		expect_tag(&mut cursor, *b"SDNA")?;
		expect_tag(&mut cursor, *b"NAME")?;

		let name_count = cursor.read_u32(endian)? as usize;
		let mut names = Vec::with_capacity(name_count);
		for _ in 0..name_count {
			names.push(read_lossy_string(&mut cursor)?);
		}
		cursor.align4()?;

		expect_tag(&mut cursor, *b"TYPE")?;
		let type_count = cursor.read_u32(endian)? as usize;
		let mut types = Vec::with_capacity(type_count);
		for _ in 0..type_count {
			types.push(read_lossy_string(&mut cursor)?);
		}
		cursor.align4()?;

		expect_tag(&mut cursor, *b"TLEN")?;
		let mut type_sizes = Vec::with_capacity(type_count);
		for _ in 0..type_count {
			type_sizes.push(cursor.read_u16(endian)?);
		}
		cursor.align4()?;

		expect_tag(&mut cursor, *b"STRC")?;
		let struct_count = cursor.read_u32(endian)? as usize;
		let mut structs = Vec::with_capacity(struct_count);

		for _ in 0..struct_count {
			let type_index = cursor.read_u16(endian)?;
			check_index("struct.type_index", u32::from(type_index), types.len())?;

			let field_count = cursor.read_u16(endian)? as usize;
			let mut fields = Vec::with_capacity(field_count);
			for _ in 0..field_count {
				let field_type_index = cursor.read_u16(endian)?;
				let field_name_index = cursor.read_u16(endian)?;
				check_index("field.type_index", u32::from(field_type_index), types.len())?;
				check_index("field.name_index", u32::from(field_name_index), names.len())?;
				fields.push(DnaField {
					type_index: field_type_index,
					name_index: field_name_index,
				});
			}

			structs.push(DnaStruct { type_index, fields });
		}

		let mut struct_for_type = vec![None; types.len()];
		for (struct_index, item) in structs.iter().enumerate() {
			struct_for_type[item.type_index as usize] = Some(struct_index as u32);
		}

		Ok(Self {
			names,
			types,
			type_sizes,
			structs,
			struct_for_type,
		})
	}

	/// Look up a structure definition by schema index (its position in `structs`).
	pub fn struct_by_schema_index(&self, schema_index: u32) -> Option<&DnaStruct> {
		self.structs.get(schema_index as usize)
	}

	/// Look up a structure definition by its type name.
	pub fn struct_by_name(&self, name: &str) -> Option<(u32, &DnaStruct)> {
		let type_index = self.types.iter().position(|item| item.as_ref() == name)?;
		let schema_index = self.struct_for_type.get(type_index).copied().flatten()?;
		self.structs.get(schema_index as usize).map(|item| (schema_index, item))
	}

	/// Type name for a `types` index.
	pub fn type_name(&self, type_index: u16) -> &str {
		&self.types[type_index as usize]
	}

	/// Raw field declarator for a `names` index.
	pub fn field_name(&self, name_index: u16) -> &str {
		&self.names[name_index as usize]
	}

	/// Byte size for a `types` index (pointer fields override this at decode time).
	pub fn type_size(&self, type_index: u16) -> u16 {
		self.type_sizes[type_index as usize]
	}
}

fn expect_tag(cursor: &mut Cursor<'_>, expected: [u8; 4]) -> Result<()> {
	let at = cursor.pos();
	let got = cursor.read_code4()?;
	if got != expected {
		return Err(BlendError::BadSchema {
			reason: format!("expected tag {:?} at offset {at}, got {:?}", String::from_utf8_lossy(&expected), String::from_utf8_lossy(&got)),
		});
	}
	Ok(())
}

fn read_lossy_string(cursor: &mut Cursor<'_>) -> Result<Box<str>> {
	let bytes = cursor.read_cstring_bytes()?;
	Ok(String::from_utf8_lossy(bytes).into_owned().into_boxed_str())
}

fn check_index(kind: &'static str, idx: u32, len: usize) -> Result<()> {
	if (idx as usize) >= len {
		return Err(BlendError::BadSchema {
			reason: format!("{kind} out of range: idx={idx}, len={len}"),
		});
	}
	Ok(())
}
