use std::path::PathBuf;

use blendoc_core::blend::{File, Result};

use crate::cmd::util::{emit_json, record_to_json, render_value};

#[derive(clap::Args)]
pub struct Args {
	/// Path to the `.blend` file.
	pub path: PathBuf,
	/// SDNA struct type name to enumerate.
	pub type_name: String,
	/// Stop after this many records.
	#[arg(long)]
	pub limit: Option<usize>,
	/// Emit each record as JSON instead of plain text.
	#[arg(long)]
	pub json: bool,
}

/// Decode and print every block whose schema matches `type_name`.
pub fn run(args: Args) -> Result<()> {
	let Args { path, type_name, limit, json } = args;

	let file = File::open(&path)?;
	let factory = file.list(&type_name)?;

	println!("count: {}", factory.len());

	let records = factory.iter().take(limit.unwrap_or(usize::MAX));

	if json {
		let rendered: Vec<serde_json::Value> = records.map(|record| record_to_json(&record)).collect();
		emit_json(&rendered);
		return Ok(());
	}

	for (index, record) in records.enumerate() {
		println!("[{index}] {}", record.type_name());
		for field in &record.decoder().fields {
			if let Ok(value) = record.field(&field.name) {
				println!("  {}: {}", field.name, render_value(&value));
			}
		}
	}

	Ok(())
}
