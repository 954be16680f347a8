mod bhead;
mod block;
mod bytes;
mod decl;
mod decoder;
mod dna;
mod error;
mod factory;
mod file;
mod header;
mod pointer;
mod record;

/// Parsed block header record.
pub use bhead::BHead;
/// Block directory walk output.
pub use block::{Directory, DirectoryEntry};
/// Field declarator parsing.
pub use decl::{FieldDecl, parse_field_decl};
/// Decoder synthesis: field shapes, synthesized layouts, and the per-file cache.
pub use decoder::{DecoderCache, FieldDescriptor, FieldShape, SynthesizedDecoder};
/// SDNA schema representation.
pub use dna::{Dna, DnaField, DnaStruct};
/// Error and result aliases.
pub use error::{BlendError, Result};
/// Record factory: enumeration and name lookup for one struct type.
pub use factory::Factory;
/// File facade and the weak handle records/factories resolve pointers through.
pub use file::{File, FileHandle};
/// File header representation.
pub use header::{BlendHeader, Endianness, VersionTriple};
/// Pointer index and pointer resolution result.
pub use pointer::{PointerIndex, PointerTarget};
/// Decoded record and field value types.
pub use record::{FieldValue, Record};
