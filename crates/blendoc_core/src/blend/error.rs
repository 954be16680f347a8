use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, BlendError>;

/// Errors produced while reading, decoding, and navigating `.blend` data.
#[derive(Debug, Error)]
pub enum BlendError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// File header did not match the expected magic, arch, or endian markers.
	#[error("invalid header")]
	BadHeader,
	/// Input ended before a header, block, or payload could be fully read.
	#[error("unexpected eof at offset {at}, need {need} bytes, remaining {rem}")]
	Truncated {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// No `DNA1` block was found while walking the block directory.
	#[error("DNA1 block not found")]
	NoSchema,
	/// SDNA section tag mismatch or internal count inconsistency.
	#[error("bad schema: {reason}")]
	BadSchema {
		/// Human-readable description of the mismatch.
		reason: String,
	},
	/// Requested type name does not name a struct in this file's SDNA.
	#[error("not a struct: {name}")]
	NotAStruct {
		/// Requested type name.
		name: String,
	},
	/// `find_by_name` was called on a factory for a type with no `ID` field.
	#[error("type {name} has no name field")]
	Unnameable {
		/// Struct type name.
		name: String,
	},
	/// No record matched the requested name.
	#[error("no {type_name} record named {name:?}")]
	NotFound {
		/// Struct type name searched.
		type_name: String,
		/// Requested record name.
		name: String,
	},
	/// A non-zero pointer value did not resolve to any block's original address.
	#[error("dangling pointer 0x{ptr:016x}")]
	DanglingPointer {
		/// Pointer value that failed to resolve.
		ptr: u64,
	},
	/// Operation attempted on a record or factory after its file was closed.
	#[error("parent file was closed")]
	ParentClosed,
	/// Declared field layout did not fit within the available bytes.
	#[error("field decode error: {reason}")]
	FieldDecodeError {
		/// Human-readable description of the failure.
		reason: String,
	},
	/// Requested field does not exist on this record's decoder.
	#[error("no field {field} on {type_name}")]
	FieldNotFound {
		/// Struct type name.
		type_name: String,
		/// Missing field name.
		field: String,
	},
	/// Field exists but was accessed through an accessor for the wrong shape.
	#[error("field {field} on {type_name} is not {expected}")]
	FieldTypeMismatch {
		/// Struct type name.
		type_name: String,
		/// Field name.
		field: String,
		/// Expected logical shape.
		expected: &'static str,
	},
}
