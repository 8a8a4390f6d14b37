use std::time::Duration;

use crate::{EngineConfig, VideoCodec};

/// Options for playing a file, from flags or a config file.
#[derive(Clone, Debug, PartialEq, Eq, clap::Parser, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct PlayerConfig {
	/// The width of the output surface in pixels.
	#[arg(long, env = "REEL_WIDTH", default_value_t = 640)]
	pub width: u32,

	/// The height of the output surface in pixels.
	#[arg(long, env = "REEL_HEIGHT", default_value_t = 360)]
	pub height: u32,

	/// Decode with this codec instead of the one named by the file, ex. `vp9` or `vp09.00.10.08`.
	#[arg(long, env = "REEL_CODEC")]
	#[serde(skip_serializing_if = "Option::is_none")]
	pub codec: Option<VideoCodec>,

	/// Give up if the decoder takes longer than this to produce a frame, ex. `5s`.
	#[arg(
		id = "decode-timeout",
		long = "decode-timeout",
		env = "REEL_DECODE_TIMEOUT",
		value_parser = humantime::parse_duration,
	)]
	#[serde(with = "humantime_serde")]
	#[serde(skip_serializing_if = "Option::is_none")]
	pub decode_timeout: Option<Duration>,
}

impl PlayerConfig {
	/// The engine options for a track encoded with `codec`.
	pub fn engine(&self, codec: VideoCodec) -> EngineConfig {
		EngineConfig {
			codec,
			decode_timeout: self.decode_timeout,
		}
	}
}

impl Default for PlayerConfig {
	fn default() -> Self {
		Self {
			width: 640,
			height: 360,
			codec: None,
			decode_timeout: None,
		}
	}
}
