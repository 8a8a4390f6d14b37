use crate::decode::{ConfigError, DecodeError};
use crate::import::SourceError;

/// Every way a playback can end early.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
	#[error("source error: {0}")]
	Source(#[from] SourceError),

	#[error("decode error: {0}")]
	Decode(#[from] DecodeError),

	#[error("config error: {0}")]
	Config(#[from] ConfigError),

	#[error("no chunks to play")]
	Empty,

	#[error("first chunk is not a keyframe")]
	MissingKeyframe,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
