use std::path::PathBuf;

use blendoc_core::blend::{File, Result};

use crate::cmd::util::emit_json;

#[derive(clap::Args)]
pub struct Args {
	/// Path to the `.blend` file.
	pub path: PathBuf,
	/// Emit the list as JSON instead of plain text.
	#[arg(long)]
	pub json: bool,
}

/// List every struct type name present in the file's SDNA.
pub fn run(args: Args) -> Result<()> {
	let Args { path, json } = args;

	let file = File::open(&path)?;
	let structures = file.list_structures()?;

	if json {
		emit_json(&structures);
		return Ok(());
	}

	for name in structures {
		println!("{name}");
	}

	Ok(())
}
