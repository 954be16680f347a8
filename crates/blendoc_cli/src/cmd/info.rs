use std::path::PathBuf;

use blendoc_core::blend::{File, Result};

use crate::cmd::util::emit_json;

#[derive(clap::Args)]
pub struct Args {
	/// Path to the `.blend` file.
	pub path: PathBuf,
	/// Emit the report as JSON instead of plain text.
	#[arg(long)]
	pub json: bool,
}

/// Print the file header and a summary of its SDNA schema.
pub fn run(args: Args) -> Result<()> {
	let Args { path, json } = args;

	let file = File::open(&path)?;
	let header = file.header();
	let structures = file.list_structures()?;

	if json {
		emit_json(&serde_json::json!({
			"path": path.display().to_string(),
			"pointer_width": header.pointer_width,
			"endian": header.endian.as_str(),
			"version": format!("{}.{}{}", header.version.major, header.version.minor, header.version.rev),
			"struct_count": structures.len(),
		}));
		return Ok(());
	}

	println!("path: {}", path.display());
	println!("pointer_width: {}", header.pointer_width);
	println!("endian: {}", header.endian.as_str());
	println!("version: {}.{}{}", header.version.major, header.version.minor, header.version.rev);
	println!("struct_count: {}", structures.len());

	Ok(())
}
