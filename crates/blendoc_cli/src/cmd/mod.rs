/// Find-by-name command.
pub mod find;
/// File-level information command.
pub mod info;
/// Block enumeration command.
pub mod list;
/// Struct-name listing command.
pub mod structures;
/// Field-tree rendering command.
pub mod tree;
mod util;
