//! Frame decoding.
//!
//! A platform decoder is treated as a black box with the same shape as WebCodecs:
//! it is configured once, accepts one [Chunk] at a time, and reports each decoded
//! frame (or a fatal error) asynchronously through an [Output] handle.
//!
//! [Lifecycle] turns that callback style into an awaitable, strictly sequential
//! `decode(chunk) -> frame` call.
//!
//! # Backends
//!
//! - FFmpeg, behind the `ffmpeg` feature.
//! - Anything else that implements [FrameDecoder].

use crate::{Chunk, Timestamp, VideoCodec};
use thiserror::Error;

#[cfg(feature = "ffmpeg")]
mod ffmpeg;
mod lifecycle;
mod output;
mod rgba;

#[cfg(feature = "ffmpeg")]
pub use ffmpeg::FfmpegDecoder;
pub use lifecycle::Lifecycle;
pub use output::Output;
pub use rgba::RgbaFrame;

/// Errors reported while decoding; all of them end the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
	#[error("failed to decode frame: {0}")]
	Decode(String),

	#[error("decoder not configured")]
	NotConfigured,

	#[error("a decoded frame is still pending")]
	Busy,

	#[error("timed out waiting for a decoded frame")]
	Timeout,

	#[error("decoder closed")]
	Closed,
}

/// Errors detected when configuring the decoder, before any chunk is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
	#[error("invalid dimensions: {width}x{height}")]
	Dimensions { width: u32, height: u32 },

	#[error("decoder already configured")]
	AlreadyConfigured,

	#[error("unsupported codec: {0}")]
	UnsupportedCodec(String),

	#[error("unsupported configuration: {0}")]
	Unsupported(String),
}

/// The parameters passed to [FrameDecoder::configure].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
	pub codec: VideoCodec,
	pub coded_width: u32,
	pub coded_height: u32,
}

/// A decoded picture.
///
/// Frames usually hold a scarce resource (a pooled GPU or decoder surface).
/// The resource is returned when the frame is dropped, so a frame is released
/// exactly once no matter how playback ends.
pub trait Frame: Send + 'static {
	/// The timestamp of the chunk that produced this frame.
	fn timestamp(&self) -> Timestamp;

	/// The native size in pixels.
	fn dimensions(&self) -> (u32, u32);

	/// Tightly packed RGBA pixels, if the frame lives in CPU memory.
	fn rgba(&self) -> Option<&[u8]> {
		None
	}
}

/// A platform decoder.
///
/// Implementations must produce exactly one frame per accepted chunk, in submission order.
pub trait FrameDecoder: Send {
	type Frame: Frame;

	/// Bind the decoder to a codec and coded size.
	///
	/// Decoded frames and fatal errors are reported to `output`, from any thread.
	fn configure(&mut self, config: &DecoderConfig, output: Output<Self::Frame>) -> Result<(), ConfigError>;

	/// Queue a chunk for decoding.
	///
	/// This should return quickly; the result arrives through [Output].
	fn decode(&mut self, chunk: &Chunk) -> Result<(), DecodeError>;

	/// Stop decoding and free resources. No output may be reported afterwards.
	fn close(&mut self);
}
