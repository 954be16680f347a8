use std::rc::Rc;

use crate::blend::block::{Directory, DirectoryEntry};
use crate::blend::decoder::{DecoderCache, FieldDescriptor, SynthesizedDecoder};
use crate::blend::record::{FieldValue, Record};
use crate::blend::{BlendError, Dna, Endianness, FileHandle, Result, VersionTriple};

/// A handle bound to one struct type: enumeration and name lookup over
/// every block in the file whose `schema_index` names that type.
#[derive(Debug)]
pub struct Factory {
	type_name: Box<str>,
	decoder: Rc<SynthesizedDecoder>,
	nameable: bool,
	entries: Vec<DirectoryEntry>,
	bytes: Rc<[u8]>,
	endian: Endianness,
	file: FileHandle,
}

impl Factory {
	/// Build a factory for `type_name`: resolve its schema index, record
	/// whether its first field is an `ID` (making it nameable), get or
	/// synthesize its decoder, and collect matching directory entries.
	pub(crate) fn new(dna: &Dna, cache: &DecoderCache, version: VersionTriple, type_name: &str, directory: &Directory, bytes: Rc<[u8]>, endian: Endianness, file: FileHandle) -> Result<Self> {
		let (schema_index, item) = dna.struct_by_name(type_name).ok_or_else(|| BlendError::NotAStruct { name: type_name.to_owned() })?;
		let decoder = cache.get_or_synthesize(version, dna, type_name)?;
		let nameable = item.fields.first().is_some_and(|field| dna.type_name(field.type_index) == "ID");
		let entries: Vec<DirectoryEntry> = directory.entries.iter().filter(|entry| entry.head.schema_index == schema_index).copied().collect();

		Ok(Self {
			type_name: type_name.into(),
			decoder,
			nameable,
			entries,
			bytes,
			endian,
			file,
		})
	}

	/// Count of directory blocks whose `schema_index` names this factory's type.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether this factory matches no blocks.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Lazily yield one [`Record`] per matching block, in directory order.
	pub fn iter(&self) -> impl Iterator<Item = Record> + '_ {
		self.entries.iter().map(move |entry| Record::new(Rc::clone(&self.decoder), Rc::clone(&self.bytes), entry.payload_offset, self.endian, self.file.clone()))
	}

	/// Find the first record whose embedded `id.name`, with its 2-character
	/// producer type tag stripped, byte-equals `name`.
	pub fn find_by_name(&self, name: &str) -> Result<Record> {
		if !self.nameable {
			return Err(BlendError::Unnameable { name: self.type_name.to_string() });
		}

		for record in self.iter() {
			let Ok(FieldValue::Struct(id)) = record.field("id") else {
				continue;
			};
			let Ok(FieldValue::String(full)) = id.field("name") else {
				continue;
			};
			if full.len() >= 2 && &full[2..] == name {
				return Ok(record);
			}
		}

		Err(BlendError::NotFound {
			type_name: self.type_name.to_string(),
			name: name.to_owned(),
		})
	}

	/// This factory's decoder's flat field list.
	pub fn signature(&self) -> &[FieldDescriptor] {
		&self.decoder.fields
	}

	/// SDNA type name this factory was built for.
	pub fn type_name(&self) -> &str {
		&self.type_name
	}
}
