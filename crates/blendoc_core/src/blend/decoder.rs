use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::blend::decl::parse_field_decl;
use crate::blend::{BlendError, Dna, Endianness, Result, VersionTriple};

/// Shape of one field's storage, resolved once at synthesis time so that
/// materializing a record never has to re-walk SDNA.
#[derive(Debug, Clone)]
pub enum FieldShape {
	/// A pointer (or array of pointers) stored pointer-width wide.
	Pointer {
		/// Pointer nesting depth (`*` = 1, `**` = 2, ...). Only depth 1
		/// pointers are dereferenced by the pointer resolver; deeper
		/// nesting is exposed as a raw integer.
		depth: u8,
		/// Number of pointer-sized slots.
		count: usize,
	},
	/// A `char[N]` field decoded as a NUL-terminated string.
	CString {
		/// Declared array length in bytes.
		len: usize,
	},
	/// A primitive scalar or primitive array.
	Primitive {
		/// SDNA type name (`"int"`, `"float"`, ...).
		type_name: Box<str>,
		/// Byte size of one element.
		elem_size: usize,
		/// Element count.
		count: usize,
	},
	/// An embedded (non-pointer) struct field, sized by the struct's own
	/// declared `TLEN` entry rather than the sum of its child fields.
	Struct {
		/// Decoder for the embedded struct type.
		child: Rc<SynthesizedDecoder>,
		/// Declared byte size of one element (`TLEN[type_index]`).
		elem_size: usize,
		/// Element count.
		count: usize,
	},
}

/// One field's position and shape within a synthesized struct layout.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
	/// Field identifier, stripped of pointer/array declarator syntax.
	pub name: Box<str>,
	/// Byte offset from the start of the struct instance.
	pub offset: usize,
	/// Storage shape.
	pub shape: FieldShape,
}

/// A struct layout computed once per `(version, type name)` pair: every
/// field's offset and shape, ready to slice bytes against without
/// consulting SDNA again.
#[derive(Debug)]
pub struct SynthesizedDecoder {
	/// SDNA type name this decoder materializes.
	pub type_name: Box<str>,
	/// Declared instance size (`TLEN[type_index]`).
	pub size: usize,
	/// Fields in declaration order.
	pub fields: Vec<FieldDescriptor>,
}

const MAX_SYNTHESIS_DEPTH: u32 = 32;

/// Decoders cached by `(producer version, type name)`. Two files from
/// different Blender versions may assign the same type name a different
/// layout, so the cache key includes the version. Scoped to one open file
/// (per §9's "prefer no global state"), so `pointer_width` is fixed for
/// the cache's whole lifetime.
#[derive(Debug)]
pub struct DecoderCache {
	pointer_width: usize,
	entries: RefCell<HashMap<(VersionTriple, Box<str>), Rc<SynthesizedDecoder>>>,
}

impl DecoderCache {
	/// Create an empty cache for a file with the given pointer width (4 or 8).
	pub fn new(pointer_width: u8) -> Self {
		Self {
			pointer_width: usize::from(pointer_width),
			entries: RefCell::new(HashMap::new()),
		}
	}

	/// Return the cached decoder for `type_name` under `version`, synthesizing
	/// and caching it (along with every embedded struct type it needs) on
	/// first use.
	pub fn get_or_synthesize(&self, version: VersionTriple, dna: &Dna, type_name: &str) -> Result<Rc<SynthesizedDecoder>> {
		if let Some(hit) = self.entries.borrow().get(&(version, type_name.into())) {
			return Ok(Rc::clone(hit));
		}

		let (_, item) = dna.struct_by_name(type_name).ok_or_else(|| BlendError::NotAStruct { name: type_name.to_owned() })?;
		let decoder = Rc::new(synthesize_struct(dna, item.type_index, self.pointer_width, version, self, 0)?);
		self.entries.borrow_mut().insert((version, type_name.into()), Rc::clone(&decoder));
		Ok(decoder)
	}
}

fn synthesize_struct(dna: &Dna, type_index: u16, pointer_width: usize, version: VersionTriple, cache: &DecoderCache, depth: u32) -> Result<SynthesizedDecoder> {
	if depth >= MAX_SYNTHESIS_DEPTH {
		return Err(BlendError::BadSchema {
			reason: format!("struct nesting exceeds {MAX_SYNTHESIS_DEPTH} while synthesizing {}", dna.type_name(type_index)),
		});
	}

	let schema_index = dna.struct_for_type[type_index as usize].ok_or_else(|| BlendError::NotAStruct {
		name: dna.type_name(type_index).to_owned(),
	})?;
	let item = dna.struct_by_schema_index(schema_index).expect("schema_index from struct_for_type is always in range");

	let mut fields = Vec::with_capacity(item.fields.len());
	let mut offset = 0_usize;

	for field in &item.fields {
		let field_type_name = dna.type_name(field.type_index);
		let raw_decl = dna.field_name(field.name_index);
		let decl = parse_field_decl(raw_decl);

		let shape = if decl.ptr_depth > 0 || decl.is_func_ptr {
			FieldShape::Pointer {
				depth: decl.ptr_depth.max(1),
				count: decl.inline_array.max(1),
			}
		} else if let Some(child_type_index) = dna.struct_for_type.get(field.type_index as usize).copied().flatten() {
			let _ = child_type_index;
			let child = Rc::new(synthesize_struct(dna, field.type_index, pointer_width, version, cache, depth + 1)?);
			FieldShape::Struct {
				elem_size: usize::from(dna.type_size(field.type_index)),
				count: decl.inline_array.max(1),
				child,
			}
		} else if field_type_name == "char" && decl.inline_array > 1 {
			FieldShape::CString { len: decl.inline_array }
		} else {
			FieldShape::Primitive {
				type_name: field_type_name.into(),
				elem_size: usize::from(dna.type_size(field.type_index)),
				count: decl.inline_array,
			}
		};

		let field_byte_size = field_storage_size(&shape, pointer_width);
		fields.push(FieldDescriptor {
			name: decl.ident.into(),
			offset,
			shape,
		});
		offset += field_byte_size;
	}

	Ok(SynthesizedDecoder {
		type_name: dna.type_name(type_index).into(),
		size: usize::from(dna.type_size(type_index)),
		fields,
	})
}

fn field_storage_size(shape: &FieldShape, pointer_width: usize) -> usize {
	match shape {
		FieldShape::Pointer { count, .. } => pointer_width * count,
		FieldShape::CString { len } => *len,
		FieldShape::Primitive { elem_size, count, .. } => elem_size * count,
		FieldShape::Struct { elem_size, count, .. } => elem_size * count,
	}
}

/// Read a little- or big-endian unsigned integer of `width` bytes (1, 2, 4, or 8).
pub fn read_uint(bytes: &[u8], endian: Endianness) -> u64 {
	let mut acc: u64 = 0;
	match endian {
		Endianness::Little => {
			for (index, byte) in bytes.iter().enumerate() {
				acc |= u64::from(*byte) << (8 * index);
			}
		}
		Endianness::Big => {
			for byte in bytes {
				acc = (acc << 8) | u64::from(*byte);
			}
		}
	}
	acc
}
