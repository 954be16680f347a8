use std::path::PathBuf;

use blendoc_core::blend::{File, Result};

use crate::cmd::util::{emit_json, record_to_json, render_value};

#[derive(clap::Args)]
pub struct Args {
	/// Path to the `.blend` file.
	pub path: PathBuf,
	/// SDNA struct type name to search (must carry an `ID` field).
	pub type_name: String,
	/// Name to look up, without the 2-character producer type tag.
	pub name: String,
	/// Emit the record as JSON instead of plain text.
	#[arg(long)]
	pub json: bool,
}

/// Look up a single named record within a struct type's factory.
pub fn run(args: Args) -> Result<()> {
	let Args { path, type_name, name, json } = args;

	let file = File::open(&path)?;
	let factory = file.list(&type_name)?;
	let record = factory.find_by_name(&name)?;

	if json {
		emit_json(&record_to_json(&record));
		return Ok(());
	}

	println!("{}", record.type_name());
	for field in &record.decoder().fields {
		if let Ok(value) = record.field(&field.name) {
			println!("  {}: {}", field.name, render_value(&value));
		}
	}

	Ok(())
}
