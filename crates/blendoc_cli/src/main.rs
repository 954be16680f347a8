#![allow(missing_docs)]

use clap::{Parser, Subcommand};

mod cmd;

#[derive(Parser)]
#[command(name = "blendoc", about = ".blend asset container inspection tool")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	Info(cmd::info::Args),
	Structures(cmd::structures::Args),
	List(cmd::list::Args),
	Find(cmd::find::Args),
	Tree(cmd::tree::Args),
}

fn main() {
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> blendoc_core::blend::Result<()> {
	let cli = Cli::parse();

	match cli.command {
		Commands::Info(args) => cmd::info::run(args),
		Commands::Structures(args) => cmd::structures::run(args),
		Commands::List(args) => cmd::list::run(args),
		Commands::Find(args) => cmd::find::run(args),
		Commands::Tree(args) => cmd::tree::run(args),
	}
}
