use std::time::Duration;

use tokio::time::Instant;

use crate::decode::{ConfigError, DecodeError, DecoderConfig, Frame, FrameDecoder, Lifecycle};
use crate::{Chunk, Error, Result, VideoCodec};

/// Options for a single playback.
#[derive(Debug, Clone)]
pub struct EngineConfig {
	/// The codec passed to the decoder.
	pub codec: VideoCodec,

	/// Give up if a decoded frame takes longer than this.
	pub decode_timeout: Option<Duration>,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			codec: VideoCodec::Vp9,
			decode_timeout: None,
		}
	}
}

/// Statistics for a completed playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
	/// The number of frames presented.
	pub frames: usize,

	/// Wall-clock time from the first submission until the loop ended.
	pub elapsed: Duration,

	/// The furthest a frame finished behind its scheduled time.
	pub behind: Duration,
}

/// Decodes chunks one at a time and presents each frame at the pace of its timestamp.
///
/// Playback consumes the engine; the decoder is bound to a single session.
/// Dropping the [Engine::play] future cancels playback and closes the decoder.
pub struct Engine<D: FrameDecoder> {
	decoder: D,
	config: EngineConfig,
}

impl<D: FrameDecoder> Engine<D> {
	pub fn new(decoder: D) -> Self {
		Self::with_config(decoder, EngineConfig::default())
	}

	pub fn with_config(decoder: D, config: EngineConfig) -> Self {
		Self { decoder, config }
	}

	/// Play every chunk in order, calling `present` once per decoded frame.
	///
	/// `width` and `height` are the coded dimensions of the video.
	/// The first chunk must be a keyframe.
	///
	/// Frames are never dropped to catch up: if decoding or presenting overruns a frame's slot,
	/// the next chunk is submitted right away and playback drifts behind real time.
	pub async fn play<P>(self, chunks: &[Chunk], width: u32, height: u32, mut present: P) -> Result<Summary>
	where
		P: FnMut(&D::Frame),
	{
		let first = chunks.first().ok_or(Error::Empty)?;
		if !first.keyframe {
			return Err(Error::MissingKeyframe);
		}

		let mut session = Session::start(self.decoder, &self.config, width, height)?;

		for chunk in chunks {
			session.step(chunk, &mut present).await?;
		}

		let summary = session.finish();
		tracing::info!(
			frames = summary.frames,
			elapsed = ?summary.elapsed,
			behind = ?summary.behind,
			"playback complete"
		);

		Ok(summary)
	}
}

// The state for one run over the chunks; the decoder is closed when this is dropped.
struct Session<D: FrameDecoder> {
	decoder: Lifecycle<D>,
	start: Instant,
	frames: usize,
	behind: Duration,
}

impl<D: FrameDecoder> Session<D> {
	fn start(decoder: D, config: &EngineConfig, width: u32, height: u32) -> Result<Self, ConfigError> {
		let mut decoder = Lifecycle::new(decoder).with_timeout(config.decode_timeout);
		decoder.configure(&DecoderConfig {
			codec: config.codec,
			coded_width: width,
			coded_height: height,
		})?;

		Ok(Self {
			decoder,
			start: Instant::now(),
			frames: 0,
			behind: Duration::ZERO,
		})
	}

	async fn step<P>(&mut self, chunk: &Chunk, present: &mut P) -> Result<(), DecodeError>
	where
		P: FnMut(&D::Frame),
	{
		let frame = self.decoder.decode(chunk).await?;

		present(&frame);
		self.frames += 1;

		// Keep showing this frame until the video's clock catches up with the wall clock.
		let target = self.start + Duration::from(frame.timestamp());
		let now = Instant::now();

		tracing::trace!(timestamp = %frame.timestamp(), "presented frame");
		drop(frame);

		match target.checked_duration_since(now) {
			Some(delay) if !delay.is_zero() => tokio::time::sleep(delay).await,
			_ => {
				// No catching up; just let the scheduler run before the next chunk.
				let lag = now.duration_since(target);
				self.behind = self.behind.max(lag);
				tracing::debug!(timestamp = %chunk.timestamp, ?lag, "behind schedule");
				tokio::task::yield_now().await;
			}
		}

		Ok(())
	}

	fn finish(mut self) -> Summary {
		self.decoder.close();

		Summary {
			frames: self.frames,
			elapsed: self.start.elapsed(),
			behind: self.behind,
		}
	}
}
