use std::path::PathBuf;

use blendoc_core::blend::{File, Result};

use crate::cmd::util::emit_json;

#[derive(clap::Args)]
pub struct Args {
	/// Path to the `.blend` file.
	pub path: PathBuf,
	/// SDNA struct type name to render.
	pub type_name: String,
	/// Descend into embedded struct fields.
	#[arg(long)]
	pub recursive: bool,
	/// Maximum recursion depth when `--recursive` is set.
	#[arg(long)]
	pub max_depth: Option<u32>,
	/// Emit the rendered tree as a single JSON string instead of plain text.
	#[arg(long)]
	pub json: bool,
}

/// Render a struct type's field layout as a textual tree.
pub fn run(args: Args) -> Result<()> {
	let Args { path, type_name, recursive, max_depth, json } = args;

	let file = File::open(&path)?;
	let rendered = file.tree(&type_name, recursive, max_depth)?;

	if json {
		emit_json(&rendered);
		return Ok(());
	}

	print!("{rendered}");
	Ok(())
}
