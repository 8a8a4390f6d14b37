//! Turning container bytes into an ordered list of [Chunk](crate::Chunk)s.
//!
//! Only WebM is supported, via the [Webm] demuxer.

mod ebml;
mod webm;

pub use webm::*;

use bytes::Bytes;

use crate::VideoTrack;

/// Errors while demuxing a file; playback never starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
	#[error("not a WebM file")]
	NotWebm,

	#[error("unexpected end of file")]
	Truncated,

	#[error("invalid file: {0}")]
	Invalid(String),

	#[error("unsupported: {0}")]
	Unsupported(String),

	#[error("no video track")]
	NoVideoTrack,
}

/// Extracts the video track from a container.
pub trait ChunkSource {
	fn parse(&mut self, data: Bytes) -> Result<VideoTrack, SourceError>;
}
