//! Shared test helpers for workspace crates.
//!
//! No binary `.blend` fixtures ship in this tree, so rather than pointing at
//! files that do not exist, [`FixtureBuilder`] assembles well-formed classic
//! `.blend` byte buffers in memory: header, block directory, and an `SDNA`
//! schema. [`Test1Fixture`] wires one up that mirrors the upstream Python
//! suite's `fixtures/test1.blend` (`World`/`Scene`/`Object`/`Mesh`/`rctf`).

use std::path::{Path, PathBuf};

/// Resolve the workspace root path.
pub fn workspace_root() -> PathBuf {
	let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
	manifest_dir.join("..").join("..").canonicalize().unwrap_or_else(|_| manifest_dir.join("..").join(".."))
}

/// Resolve a fixture path under `<workspace>/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
	workspace_root().join("fixtures").join(name)
}

/// Resolve the workspace target directory.
pub fn target_dir() -> PathBuf {
	std::env::var_os("CARGO_TARGET_DIR").map(PathBuf::from).unwrap_or_else(|| workspace_root().join("target"))
}

/// Byte order for an in-memory fixture. Mirrors `blendoc_core::blend::Endianness`
/// without depending on it, keeping `blendoc_testkit` a leaf crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
	/// Little-endian (header marker `v`).
	Little,
	/// Big-endian (header marker `V`).
	Big,
}

struct BlockSpec {
	code: [u8; 4],
	addr: u64,
	schema_index: u32,
	count: u32,
	payload: Vec<u8>,
}

/// Incrementally assembles a synthetic classic-format `.blend` byte buffer:
/// a 12-byte header, a sequence of blocks, and a trailing `DNA1`/`ENDB` pair.
///
/// Type and struct registration happens up front (mirroring how a producer's
/// SDNA is fixed at save time); blocks are appended in the order they should
/// appear in the directory.
pub struct FixtureBuilder {
	pointer_width: u8,
	endian: Endian,
	version: (u8, u8, u8),
	names: Vec<String>,
	types: Vec<String>,
	type_sizes: Vec<u16>,
	structs: Vec<(u16, Vec<(u16, u16)>)>,
	blocks: Vec<BlockSpec>,
}

impl FixtureBuilder {
	/// Start a builder for an 8-byte-pointer, little-endian file at `version`.
	pub fn new(version: (u8, u8, u8)) -> Self {
		Self {
			pointer_width: 8,
			endian: Endian::Little,
			version,
			names: Vec::new(),
			types: Vec::new(),
			type_sizes: Vec::new(),
			structs: Vec::new(),
			blocks: Vec::new(),
		}
	}

	/// Override the pointer width (4 or 8).
	pub fn pointer_width(mut self, width: u8) -> Self {
		self.pointer_width = width;
		self
	}

	/// Override the byte order.
	pub fn endian(mut self, endian: Endian) -> Self {
		self.endian = endian;
		self
	}

	/// Register (or reuse) a type name with a declared `TLEN` byte size.
	/// Re-registering an existing name with a different size panics: a
	/// producer's SDNA never assigns one type two sizes.
	pub fn type_id(&mut self, name: &str, size: u16) -> u16 {
		if let Some(index) = self.types.iter().position(|item| item == name) {
			assert_eq!(self.type_sizes[index], size, "type {name} registered twice with different sizes");
			return index as u16;
		}
		self.types.push(name.to_owned());
		self.type_sizes.push(size);
		(self.types.len() - 1) as u16
	}

	/// Register (or reuse) a raw field declarator string.
	pub fn name_id(&mut self, raw: &str) -> u16 {
		if let Some(index) = self.names.iter().position(|item| item == raw) {
			return index as u16;
		}
		self.names.push(raw.to_owned());
		(self.names.len() - 1) as u16
	}

	/// Define a structure: registers `type_name` at `size`, then appends a
	/// struct entry whose fields are `(field_type_name, raw_field_name)`
	/// pairs. Field types must already be registered via [`Self::type_id`]
	/// or an earlier `define_struct` call. Returns the new schema index.
	pub fn define_struct(&mut self, type_name: &str, size: u16, fields: &[(&str, &str)]) -> u32 {
		let type_index = self.type_id(type_name, size);
		let mut field_entries = Vec::with_capacity(fields.len());
		for (field_type_name, raw_field_name) in fields {
			let field_type_index = self.types.iter().position(|item| item == field_type_name).unwrap_or_else(|| panic!("field type {field_type_name} not registered before struct {type_name}")) as u16;
			let name_index = self.name_id(raw_field_name);
			field_entries.push((field_type_index, name_index));
		}
		self.structs.push((type_index, field_entries));
		(self.structs.len() - 1) as u32
	}

	/// Append a directory block with the given code, original address,
	/// schema index, element count, and raw payload bytes.
	pub fn add_block(&mut self, code: &[u8; 4], addr: u64, schema_index: u32, count: u32, payload: Vec<u8>) -> &mut Self {
		self.blocks.push(BlockSpec {
			code: *code,
			addr,
			schema_index,
			count,
			payload,
		});
		self
	}

	fn push_u16(buf: &mut Vec<u8>, value: u16, endian: Endian) {
		buf.extend_from_slice(&match endian {
			Endian::Little => value.to_le_bytes(),
			Endian::Big => value.to_be_bytes(),
		});
	}

	fn push_u32(buf: &mut Vec<u8>, value: u32, endian: Endian) {
		buf.extend_from_slice(&match endian {
			Endian::Little => value.to_le_bytes(),
			Endian::Big => value.to_be_bytes(),
		});
	}

	fn push_ptr(buf: &mut Vec<u8>, value: u64, width: u8, endian: Endian) {
		match (width, endian) {
			(4, Endian::Little) => buf.extend_from_slice(&(value as u32).to_le_bytes()),
			(4, Endian::Big) => buf.extend_from_slice(&(value as u32).to_be_bytes()),
			(_, Endian::Little) => buf.extend_from_slice(&value.to_le_bytes()),
			(_, Endian::Big) => buf.extend_from_slice(&value.to_be_bytes()),
		}
	}

	fn align4(buf: &mut Vec<u8>) {
		while buf.len() % 4 != 0 {
			buf.push(0);
		}
	}

	fn sdna_payload(&self) -> Vec<u8> {
		let mut buf = Vec::new();
		buf.extend_from_slice(b"SDNA");
		buf.extend_from_slice(b"NAME");
		Self::push_u32(&mut buf, self.names.len() as u32, self.endian);
		for name in &self.names {
			buf.extend_from_slice(name.as_bytes());
			buf.push(0);
		}
		Self::align4(&mut buf);

		buf.extend_from_slice(b"TYPE");
		Self::push_u32(&mut buf, self.types.len() as u32, self.endian);
		for ty in &self.types {
			buf.extend_from_slice(ty.as_bytes());
			buf.push(0);
		}
		Self::align4(&mut buf);

		buf.extend_from_slice(b"TLEN");
		for size in &self.type_sizes {
			Self::push_u16(&mut buf, *size, self.endian);
		}
		Self::align4(&mut buf);

		buf.extend_from_slice(b"STRC");
		Self::push_u32(&mut buf, self.structs.len() as u32, self.endian);
		for (type_index, fields) in &self.structs {
			Self::push_u16(&mut buf, *type_index, self.endian);
			Self::push_u16(&mut buf, fields.len() as u16, self.endian);
			for (field_type_index, field_name_index) in fields {
				Self::push_u16(&mut buf, *field_type_index, self.endian);
				Self::push_u16(&mut buf, *field_name_index, self.endian);
			}
		}

		buf
	}

	/// Assemble the full byte buffer: header, every added block in order,
	/// the `DNA1` schema block, and the `ENDB` terminator.
	pub fn build(&self) -> Vec<u8> {
		let mut buf = Vec::new();
		buf.extend_from_slice(b"BLENDER");
		buf.push(if self.pointer_width == 4 { b'_' } else { b'-' });
		buf.push(match self.endian {
			Endian::Little => b'v',
			Endian::Big => b'V',
		});
		buf.push(b'0' + self.version.0);
		buf.push(b'0' + self.version.1);
		buf.push(b'0' + self.version.2);

		let mut push_block = |buf: &mut Vec<u8>, code: [u8; 4], addr: u64, schema_index: u32, count: u32, payload: &[u8]| {
			buf.extend_from_slice(&code);
			Self::push_u32(buf, payload.len() as u32, self.endian);
			Self::push_ptr(buf, addr, self.pointer_width, self.endian);
			Self::push_u32(buf, schema_index, self.endian);
			Self::push_u32(buf, count, self.endian);
			buf.extend_from_slice(payload);
		};

		for block in &self.blocks {
			push_block(&mut buf, block.code, block.addr, block.schema_index, block.count, &block.payload);
		}

		let dna_payload = self.sdna_payload();
		push_block(&mut buf, *b"DNA1", 0, 0, 0, &dna_payload);
		push_block(&mut buf, *b"ENDB", 0, 0, 0, &[]);

		buf
	}
}

/// Pad or truncate `text` to exactly `len` bytes (NUL-padded) - the shape of
/// a `char[N]` field.
pub fn fixed_cstr(text: &str, len: usize) -> Vec<u8> {
	let mut out = vec![0_u8; len];
	let bytes = text.as_bytes();
	let take = bytes.len().min(len);
	out[..take].copy_from_slice(&bytes[..take]);
	out
}

/// Original in-memory addresses used by [`Test1Fixture`], exposed so tests
/// can assert on identity without re-deriving magic numbers.
pub mod test1_addr {
	/// Address of the lone `World` block.
	pub const WORLD: u64 = 0x1000;
	/// Address of the lone `Scene` block.
	pub const SCENE: u64 = 0x2000;
	/// Address of the `Object` block named `Suzanne`.
	pub const OBJECT: u64 = 0x3000;
	/// Address of `Suzanne`'s `Mesh` data block.
	pub const MESH: u64 = 0x4000;
	/// Address of the `Mesh`'s `MVert` array block.
	pub const MVERT: u64 = 0x9000;
	/// Address of the lone (unnameable) `rctf` block.
	pub const RCTF: u64 = 0x5000;
}

/// A synthetic fixture mirroring the upstream Python suite's
/// `fixtures/test1.blend`: one `World` (18-entry `mtex` pointer array, an
/// `aodist` float), one `Scene` pointing at that `World` with a null
/// `id.next`, one `Object` named `Suzanne` whose `data` pointer resolves to
/// a `Mesh` with `totvert` matching its `mvert` block's element count, and
/// one unnameable `rctf`. Built at version 2.7.7, 64-bit, little-endian -
/// matching `test_tinyblend.py`'s `test_open_blend_file` assertions.
pub struct Test1Fixture;

impl Test1Fixture {
	/// Number of `MVert` entries in `Suzanne`'s mesh (and `Mesh.totvert`).
	pub const SUZANNE_VERT_COUNT: i32 = 18;
	/// Number of `MTex` slots on `TestWorld`.
	pub const WORLD_MTEX_COUNT: usize = 18;
	/// `World.aodist` value, matching `test_tinyblend.py`'s assertion window.
	pub const WORLD_AODIST: f32 = 12.9;

	/// Build the fixture's raw byte buffer.
	pub fn build() -> Vec<u8> {
		let mut b = FixtureBuilder::new((2, 7, 7));

		b.type_id("int", 4);
		b.type_id("float", 4);
		b.type_id("char", 1);
		b.type_id("MTex", 4);

		b.define_struct("ID", 40, &[("char", "name[24]"), ("ID", "*next"), ("ID", "*prev")]);
		b.define_struct("rctf", 16, &[("float", "xmin"), ("float", "xmax"), ("float", "ymin"), ("float", "ymax")]);
		b.define_struct("World", 188, &[("ID", "id"), ("float", "aodist"), ("MTex", "*mtex[18]")]);
		b.define_struct("Scene", 48, &[("ID", "id"), ("World", "*world")]);
		b.define_struct("MVert", 12, &[("float", "co[3]")]);
		b.define_struct("Mesh", 12, &[("int", "totvert"), ("MVert", "*mvert")]);
		b.define_struct("Object", 48, &[("ID", "id"), ("Mesh", "*data")]);

		let world_schema = 2;
		let scene_schema = 3;
		let mvert_schema = 4;
		let mesh_schema = 5;
		let object_schema = 6;
		let rctf_schema = 1;

		let mut world_payload = Vec::new();
		world_payload.extend_from_slice(&fixed_cstr("WOTestWorld", 24));
		world_payload.extend_from_slice(&0_u64.to_le_bytes()); // id.next
		world_payload.extend_from_slice(&0_u64.to_le_bytes()); // id.prev
		world_payload.extend_from_slice(&Self::WORLD_AODIST.to_le_bytes());
		for _ in 0..Self::WORLD_MTEX_COUNT {
			world_payload.extend_from_slice(&0_u64.to_le_bytes());
		}
		b.add_block(b"WO\0\0", test1_addr::WORLD, world_schema, 1, world_payload);

		let mut scene_payload = Vec::new();
		scene_payload.extend_from_slice(&fixed_cstr("SCMyTestScene", 24));
		scene_payload.extend_from_slice(&0_u64.to_le_bytes()); // id.next (null)
		scene_payload.extend_from_slice(&0_u64.to_le_bytes()); // id.prev
		scene_payload.extend_from_slice(&test1_addr::WORLD.to_le_bytes());
		b.add_block(b"SC\0\0", test1_addr::SCENE, scene_schema, 1, scene_payload);

		let mut object_payload = Vec::new();
		object_payload.extend_from_slice(&fixed_cstr("OBSuzanne", 24));
		object_payload.extend_from_slice(&0_u64.to_le_bytes());
		object_payload.extend_from_slice(&0_u64.to_le_bytes());
		object_payload.extend_from_slice(&test1_addr::MESH.to_le_bytes());
		b.add_block(b"OB\0\0", test1_addr::OBJECT, object_schema, 1, object_payload);

		let mut mesh_payload = Vec::new();
		mesh_payload.extend_from_slice(&Self::SUZANNE_VERT_COUNT.to_le_bytes());
		mesh_payload.extend_from_slice(&test1_addr::MVERT.to_le_bytes());
		b.add_block(b"ME\0\0", test1_addr::MESH, mesh_schema, 1, mesh_payload);

		let mut mvert_payload = Vec::new();
		for index in 0..Self::SUZANNE_VERT_COUNT {
			mvert_payload.extend_from_slice(&(index as f32).to_le_bytes());
			mvert_payload.extend_from_slice(&0_f32.to_le_bytes());
			mvert_payload.extend_from_slice(&0_f32.to_le_bytes());
		}
		b.add_block(b"MV\0\0", test1_addr::MVERT, mvert_schema, Self::SUZANNE_VERT_COUNT as u32, mvert_payload);

		b.add_block(b"RF\0\0", test1_addr::RCTF, rctf_schema, 1, vec![0_u8; 16]);

		b.build()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builds_non_empty_fixture() {
		let bytes = Test1Fixture::build();
		assert!(bytes.starts_with(b"BLENDER-v277"));
		assert!(bytes.len() > 200);
	}
}
