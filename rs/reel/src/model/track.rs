use crate::{Chunk, VideoCodec};

/// A demuxed video track: its coded size, codec and every encoded chunk in decode order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VideoTrack {
	pub width: u32,
	pub height: u32,

	/// The codec, if the container's codec identifier is one we know.
	pub codec: Option<VideoCodec>,

	/// The raw codec identifier from the container, ex. `V_VP9`.
	pub codec_id: String,

	pub chunks: Vec<Chunk>,
}

impl VideoTrack {
	pub fn width(&self) -> u32 {
		self.width
	}

	pub fn height(&self) -> u32 {
		self.height
	}

	pub fn chunks(&self) -> &[Chunk] {
		&self.chunks
	}

	/// The span between the first and last chunk timestamps.
	pub fn duration(&self) -> std::time::Duration {
		let first = self.chunks.iter().map(|c| c.timestamp).min().unwrap_or_default();
		let last = self.chunks.iter().map(|c| c.timestamp).max().unwrap_or_default();
		last.checked_sub(first).unwrap_or_default().into()
	}
}
