use bytes::Bytes;

use crate::Timestamp;

/// One encoded unit of video, as produced by demuxing.
///
/// The payload is shared, so cloning a chunk is cheap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
	/// The presentation timestamp, relative to the start of the track.
	pub timestamp: Timestamp,

	/// The encoded bitstream for a single frame.
	pub payload: Bytes,

	/// Whether the chunk can be decoded without any prior chunks.
	pub keyframe: bool,
}

impl Chunk {
	pub fn new(timestamp: Timestamp, payload: impl Into<Bytes>, keyframe: bool) -> Self {
		Self {
			timestamp,
			payload: payload.into(),
			keyframe,
		}
	}
}
