use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::blend::decoder::{FieldShape, SynthesizedDecoder, read_uint};
use crate::blend::{BlendError, Endianness, FileHandle, PointerTarget, Result};

/// A decoded field value. Pointer fields are exposed as raw addresses
/// until resolved through [`Record::pointer`]; embedded structs share the
/// parent's backing buffer rather than copying it.
#[derive(Debug, Clone)]
pub enum FieldValue {
	/// `float` scalar or array element.
	F32(f32),
	/// `double` scalar or array element.
	F64(f64),
	/// Signed integer scalar or array element.
	Int(i64),
	/// Unsigned integer scalar or array element (`uint*_t`, `bool`-as-u8, ...).
	UInt(u64),
	/// A `char[N]` field decoded up to its first NUL byte.
	String(Box<str>),
	/// Catch-all for primitive types this crate does not special-case.
	Bytes(Box<[u8]>),
	/// Raw pointer address(es); depth > 1 or function pointers stay opaque.
	Pointer(u64),
	/// Fixed-length sequence (primitive array or pointer array).
	Array(Vec<FieldValue>),
	/// Embedded non-pointer struct field.
	Struct(Record),
}

impl PartialEq for FieldValue {
	/// Structural comparison used by [`Record`]'s equality check. A `Struct`
	/// field recurses through `Record`'s own `PartialEq`, which in turn
	/// skips *that* struct's pointer fields, so a pointer nested arbitrarily
	/// deep never affects the result. A top-level `Pointer` value is never
	/// actually compared this way (`Record::eq` skips pointer-shaped fields
	/// before decoding them), so it always compares equal here too.
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::F32(a), Self::F32(b)) => a == b,
			(Self::F64(a), Self::F64(b)) => a == b,
			(Self::Int(a), Self::Int(b)) => a == b,
			(Self::UInt(a), Self::UInt(b)) => a == b,
			(Self::String(a), Self::String(b)) => a == b,
			(Self::Bytes(a), Self::Bytes(b)) => a == b,
			(Self::Array(a), Self::Array(b)) => a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y),
			(Self::Struct(a), Self::Struct(b)) => a == b,
			(Self::Pointer(_), Self::Pointer(_)) => true,
			_ => false,
		}
	}
}

/// A decoded record: a [`SynthesizedDecoder`] paired with the bytes it was
/// materialized from. Embedded structs are `Record`s that slice the same
/// buffer; block-level records own their buffer.
#[derive(Debug, Clone)]
pub struct Record {
	decoder: Rc<SynthesizedDecoder>,
	bytes: Rc<[u8]>,
	offset: usize,
	endian: Endianness,
	file: FileHandle,
	cache: Rc<RefCell<HashMap<Box<str>, PointerTarget>>>,
}

impl Record {
	/// Build a record view over `bytes[offset..offset+decoder.size]`.
	pub(crate) fn new(decoder: Rc<SynthesizedDecoder>, bytes: Rc<[u8]>, offset: usize, endian: Endianness, file: FileHandle) -> Self {
		Self {
			decoder,
			bytes,
			offset,
			endian,
			file,
			cache: Rc::new(RefCell::new(HashMap::new())),
		}
	}

	/// SDNA type name this record was decoded as.
	pub fn type_name(&self) -> &str {
		&self.decoder.type_name
	}

	/// The decoder's flat field list (for introspection/`signature()`).
	pub fn decoder(&self) -> &SynthesizedDecoder {
		&self.decoder
	}

	fn field_bytes(&self) -> Result<&[u8]> {
		self.bytes.get(self.offset..self.offset + self.decoder.size).ok_or_else(|| BlendError::FieldDecodeError {
			reason: format!(
				"{} needs {} bytes at offset {} but only {} are available",
				self.decoder.type_name,
				self.decoder.size,
				self.offset,
				self.bytes.len().saturating_sub(self.offset)
			),
		})
	}

	/// Read a named field's value, decoding it from the backing buffer.
	pub fn field(&self, name: &str) -> Result<FieldValue> {
		let field = self.decoder.fields.iter().find(|f| f.name.as_ref() == name).ok_or_else(|| BlendError::FieldNotFound {
			type_name: self.decoder.type_name.to_string(),
			field: name.to_owned(),
		})?;

		let base = self.field_bytes()?;
		decode_field(field, base, &self.bytes, self.offset, self.endian, &self.file)
	}

	/// Resolve a pointer-typed field against the file's pointer index.
	///
	/// Returns [`PointerTarget::Null`] for a zero address, a single record
	/// for a depth-1 pointer into a single-element block, or a sequence for
	/// a block with `count > 1`. A pointer-array or pointer-to-pointer field
	/// (`field.shape`'s `count > 1`) resolves each slot independently and
	/// returns [`PointerTarget::Sequence`], each entry its own
	/// null-or-record result. Results are memoized per field name.
	pub fn pointer(&self, name: &str) -> Result<PointerTarget> {
		if let Some(hit) = self.cache.borrow().get(name) {
			return Ok(hit.clone());
		}

		let field = self.decoder.fields.iter().find(|f| f.name.as_ref() == name).ok_or_else(|| BlendError::FieldNotFound {
			type_name: self.decoder.type_name.to_string(),
			field: name.to_owned(),
		})?;

		let FieldShape::Pointer { count, .. } = &field.shape else {
			return Err(BlendError::FieldTypeMismatch {
				type_name: self.decoder.type_name.to_string(),
				field: name.to_owned(),
				expected: "pointer",
			});
		};

		let base = self.field_bytes()?;
		let pointer_width = self.pointer_width();
		let file = self.file.upgrade().ok_or(BlendError::ParentClosed)?;

		let resolved = if *count <= 1 {
			let addr_bytes = &base[field.offset..field.offset + pointer_width];
			let address = read_uint(addr_bytes, self.endian);
			file.resolve_pointer(address)?
		} else {
			let mut slots = Vec::with_capacity(*count);
			for index in 0..*count {
				let start = field.offset + index * pointer_width;
				let address = read_uint(&base[start..start + pointer_width], self.endian);
				slots.push(file.resolve_pointer(address)?);
			}
			PointerTarget::Sequence(slots)
		};

		self.cache.borrow_mut().insert(name.into(), resolved.clone());
		Ok(resolved)
	}

	fn pointer_width(&self) -> usize {
		self.file.upgrade().map(|file| usize::from(file.pointer_width())).unwrap_or(8)
	}
}

impl PartialEq for Record {
	fn eq(&self, other: &Self) -> bool {
		if self.decoder.type_name != other.decoder.type_name {
			return false;
		}

		for field in &self.decoder.fields {
			if matches!(field.shape, FieldShape::Pointer { .. }) {
				continue;
			}

			let Ok(base) = self.field_bytes() else {
				return false;
			};
			let Ok(other_base) = other.field_bytes() else {
				return false;
			};
			let Ok(a) = decode_field(field, base, &self.bytes, self.offset, self.endian, &self.file) else {
				return false;
			};
			let Ok(b) = decode_field(field, other_base, &other.bytes, other.offset, other.endian, &other.file) else {
				return false;
			};

			if a != b {
				return false;
			}
		}

		true
	}
}

fn decode_field(field: &crate::blend::decoder::FieldDescriptor, base: &[u8], bytes: &Rc<[u8]>, record_offset: usize, endian: Endianness, file: &FileHandle) -> Result<FieldValue> {
	match &field.shape {
		FieldShape::Pointer { count, .. } => {
			if *count <= 1 {
				let pointer_width = file.upgrade().map(|f| usize::from(f.pointer_width())).unwrap_or(8);
				let raw = read_uint(&base[field.offset..field.offset + pointer_width], endian);
				Ok(FieldValue::Pointer(raw))
			} else {
				let pointer_width = file.upgrade().map(|f| usize::from(f.pointer_width())).unwrap_or(8);
				let mut out = Vec::with_capacity(*count);
				for index in 0..*count {
					let start = field.offset + index * pointer_width;
					let raw = read_uint(&base[start..start + pointer_width], endian);
					out.push(FieldValue::Pointer(raw));
				}
				Ok(FieldValue::Array(out))
			}
		}
		FieldShape::CString { len } => {
			let raw = &base[field.offset..field.offset + len];
			let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
			Ok(FieldValue::String(String::from_utf8_lossy(&raw[..end]).into_owned().into_boxed_str()))
		}
		FieldShape::Primitive { type_name, elem_size, count } => {
			if *count == 0 {
				return Ok(FieldValue::Array(Vec::new()));
			}
			let mut out = Vec::with_capacity(*count);
			for index in 0..*count {
				let start = field.offset + index * elem_size;
				let raw = &base[start..start + elem_size];
				out.push(decode_primitive(type_name, raw, endian));
			}
			if *count == 1 {
				Ok(out.pop().expect("count == 1 pushed exactly one value"))
			} else {
				Ok(FieldValue::Array(out))
			}
		}
		FieldShape::Struct { child, elem_size, count } => {
			let mut out = Vec::with_capacity(*count);
			for index in 0..*count {
				let start = record_offset + field.offset + index * elem_size;
				out.push(FieldValue::Struct(Record::new(Rc::clone(child), Rc::clone(bytes), start, endian, file.clone())));
			}
			if *count == 1 {
				Ok(out.pop().expect("count == 1 pushed exactly one value"))
			} else {
				Ok(FieldValue::Array(out))
			}
		}
	}
}

fn decode_primitive(type_name: &str, bytes: &[u8], endian: Endianness) -> FieldValue {
	match (type_name, bytes.len()) {
		("float", 4) => {
			let mut arr = [0_u8; 4];
			arr.copy_from_slice(bytes);
			FieldValue::F32(match endian {
				Endianness::Little => f32::from_le_bytes(arr),
				Endianness::Big => f32::from_be_bytes(arr),
			})
		}
		("double", 8) => {
			let mut arr = [0_u8; 8];
			arr.copy_from_slice(bytes);
			FieldValue::F64(match endian {
				Endianness::Little => f64::from_le_bytes(arr),
				Endianness::Big => f64::from_be_bytes(arr),
			})
		}
		_ => {
			let raw = read_uint(bytes, endian);
			if is_unsigned_type(type_name) {
				FieldValue::UInt(raw)
			} else {
				let signed = match bytes.len() {
					1 => (raw as u8) as i8 as i64,
					2 => (raw as u16) as i16 as i64,
					4 => (raw as u32) as i32 as i64,
					_ => raw as i64,
				};
				FieldValue::Int(signed)
			}
		}
	}
}

fn is_unsigned_type(type_name: &str) -> bool {
	type_name.starts_with('u') || type_name.contains("uint") || type_name.contains("uchar") || type_name == "char"
}
