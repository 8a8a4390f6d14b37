use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Logging flags, flattened into a binary's arguments.
#[derive(clap::Args, Clone, Debug)]
pub struct Log {
	/// The level to log at; `RUST_LOG` overrides it per target.
	#[arg(
		id = "log-level",
		long = "log-level",
		env = "REEL_LOG_LEVEL",
		default_value = "info",
		global = true
	)]
	pub level: Level,
}

impl Default for Log {
	fn default() -> Self {
		Self { level: Level::INFO }
	}
}

impl Log {
	pub fn new(level: Level) -> Self {
		Self { level }
	}

	/// Install a global subscriber writing to stderr.
	///
	/// Does nothing if a subscriber is already installed.
	pub fn init(&self) {
		let filter = EnvFilter::builder()
			.with_default_directive(LevelFilter::from_level(self.level).into())
			.from_env_lossy(); // Allow overriding with RUST_LOG

		let logger = tracing_subscriber::FmtSubscriber::builder()
			.with_writer(std::io::stderr)
			.with_env_filter(filter)
			.finish();

		if tracing::subscriber::set_global_default(logger).is_err() {
			tracing::debug!("logger already installed");
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::Parser;

	#[derive(Parser)]
	struct Cli {
		#[command(flatten)]
		log: Log,
	}

	#[test]
	fn test_default_level() {
		let cli = Cli::parse_from(["test"]);
		assert_eq!(cli.log.level, Level::INFO);
	}

	#[test]
	fn test_level_flag() {
		let cli = Cli::parse_from(["test", "--log-level", "debug"]);
		assert_eq!(cli.log.level, Level::DEBUG);
	}
}
