mod play;

use play::*;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Clone)]
#[command(version, about)]
pub struct Cli {
	#[command(flatten)]
	log: reel::Log,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Clone)]
pub enum Command {
	/// Play the video track of a WebM file at its recorded pace.
	Play {
		/// The file to play, ending in `.webm`.
		file: PathBuf,

		/// Save the last presented frame as a PNG.
		#[arg(long)]
		snapshot: Option<PathBuf>,

		#[command(flatten)]
		config: reel::PlayerConfig,
	},
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	cli.log.init();

	match cli.command {
		Command::Play { file, snapshot, config } => play(file, snapshot, config).await,
	}
}
