use std::time::Duration;

use super::{ConfigError, DecodeError, DecoderConfig, Frame, FrameDecoder, Output};
use crate::Chunk;

/// Drives a [FrameDecoder] one chunk at a time.
///
/// Each [Lifecycle::decode] registers a single-use waiter, submits the chunk, and suspends until the
/// decoder reports the matching frame. There is never more than one chunk in flight, so a queue is not
/// needed and output order can't drift from submission order.
///
/// The decoder is closed when the lifecycle is dropped.
pub struct Lifecycle<D: FrameDecoder> {
	decoder: D,
	output: Output<D::Frame>,
	timeout: Option<Duration>,
	configured: bool,
	closed: bool,
}

impl<D: FrameDecoder> Lifecycle<D> {
	pub fn new(decoder: D) -> Self {
		Self {
			decoder,
			output: Output::new(),
			timeout: None,
			configured: false,
			closed: false,
		}
	}

	/// Fail a submission if its frame doesn't arrive within `timeout`.
	pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
		self.timeout = timeout;
		self
	}

	/// Configure the decoder; allowed exactly once, before the first submission.
	pub fn configure(&mut self, config: &DecoderConfig) -> Result<(), ConfigError> {
		if self.configured {
			return Err(ConfigError::AlreadyConfigured);
		}

		if config.coded_width == 0 || config.coded_height == 0 {
			return Err(ConfigError::Dimensions {
				width: config.coded_width,
				height: config.coded_height,
			});
		}

		self.decoder.configure(config, self.output.clone())?;
		self.configured = true;

		tracing::debug!(
			codec = %config.codec,
			width = config.coded_width,
			height = config.coded_height,
			"configured decoder"
		);

		Ok(())
	}

	/// Submit a chunk and wait for its decoded frame.
	pub async fn decode(&mut self, chunk: &Chunk) -> Result<D::Frame, DecodeError> {
		if self.closed {
			return Err(DecodeError::Closed);
		}

		if !self.configured {
			return Err(DecodeError::NotConfigured);
		}

		// Register before submitting; some decoders report the frame synchronously.
		let pending = self.output.register()?;

		if let Err(err) = self.decoder.decode(chunk) {
			self.output.error(err.clone());
			return Err(err);
		}

		let res = match self.timeout {
			Some(timeout) => match tokio::time::timeout(timeout, pending).await {
				Ok(res) => res,
				Err(_) => {
					tracing::warn!(timestamp = %chunk.timestamp, ?timeout, "decoder stalled");
					self.output.error(DecodeError::Timeout);
					return Err(DecodeError::Timeout);
				}
			},
			None => pending.await,
		};

		// The waiter is only dropped unresolved when the output is closed.
		let frame = res.map_err(|_| DecodeError::Closed)??;

		if frame.timestamp() != chunk.timestamp {
			tracing::warn!(
				expected = %chunk.timestamp,
				actual = %frame.timestamp(),
				"decoder output does not match submission"
			);
		}

		Ok(frame)
	}

	/// The first fatal error reported by the decoder, if any.
	pub fn error(&self) -> Option<DecodeError> {
		self.output.failed()
	}

	/// Close the decoder. Frames reported afterwards are released immediately.
	pub fn close(&mut self) {
		if self.closed {
			return;
		}

		self.closed = true;
		self.output.close();
		self.decoder.close();

		tracing::debug!("closed decoder");
	}
}

impl<D: FrameDecoder> Drop for Lifecycle<D> {
	fn drop(&mut self) {
		self.close();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::mock::{Event, Mock};
	use crate::{Timestamp, VideoCodec};

	const CONFIG: DecoderConfig = DecoderConfig {
		codec: VideoCodec::Vp9,
		coded_width: 320,
		coded_height: 240,
	};

	fn chunk(micros: u64, keyframe: bool) -> Chunk {
		Chunk::new(Timestamp::from_micros(micros), vec![0u8; 4], keyframe)
	}

	#[tokio::test]
	async fn test_decode_in_order() {
		let mock = Mock::new();
		let mut lifecycle = Lifecycle::new(mock.decoder());
		lifecycle.configure(&CONFIG).unwrap();

		for micros in [0, 33_000, 66_000] {
			let frame = lifecycle.decode(&chunk(micros, micros == 0)).await.unwrap();
			assert_eq!(frame.timestamp(), Timestamp::from_micros(micros));
		}

		drop(lifecycle);
		assert_eq!(mock.released(), 3);
		assert_eq!(mock.events().last(), Some(&Event::Close));
	}

	#[tokio::test]
	async fn test_configure_once() {
		let mock = Mock::new();
		let mut lifecycle = Lifecycle::new(mock.decoder());
		lifecycle.configure(&CONFIG).unwrap();
		assert_eq!(lifecycle.configure(&CONFIG), Err(ConfigError::AlreadyConfigured));
	}

	#[tokio::test]
	async fn test_configure_dimensions() {
		let mock = Mock::new();
		let mut lifecycle = Lifecycle::new(mock.decoder());
		let config = DecoderConfig {
			coded_width: 0,
			..CONFIG
		};

		assert_eq!(
			lifecycle.configure(&config),
			Err(ConfigError::Dimensions { width: 0, height: 240 })
		);
		assert!(mock.events().is_empty());
	}

	#[tokio::test]
	async fn test_not_configured() {
		let mock = Mock::new();
		let mut lifecycle = Lifecycle::new(mock.decoder());
		assert_eq!(lifecycle.decode(&chunk(0, true)).await.err(), Some(DecodeError::NotConfigured));
	}

	#[tokio::test]
	async fn test_error_is_terminal() {
		let mock = Mock::new().fail_at(1);
		let mut lifecycle = Lifecycle::new(mock.decoder());
		lifecycle.configure(&CONFIG).unwrap();

		lifecycle.decode(&chunk(0, true)).await.unwrap();

		let err = lifecycle.decode(&chunk(33_000, false)).await.unwrap_err();
		assert!(matches!(err, DecodeError::Decode(_)));
		assert_eq!(lifecycle.error(), Some(err.clone()));

		// No further submissions reach the decoder.
		let submitted = mock.submitted();
		assert_eq!(lifecycle.decode(&chunk(66_000, false)).await.unwrap_err(), err);
		assert_eq!(mock.submitted(), submitted);
	}

	#[tokio::test(start_paused = true)]
	async fn test_timeout() {
		let mock = Mock::new().stall_at(0);
		let mut lifecycle = Lifecycle::new(mock.decoder()).with_timeout(Some(Duration::from_secs(1)));
		lifecycle.configure(&CONFIG).unwrap();

		assert_eq!(lifecycle.decode(&chunk(0, true)).await.err(), Some(DecodeError::Timeout));
		assert_eq!(lifecycle.decode(&chunk(33_000, false)).await.err(), Some(DecodeError::Timeout));
		assert_eq!(mock.submitted(), 1);
	}

	#[tokio::test]
	async fn test_abandoned_submission_is_busy() {
		let mock = Mock::new().stall_at(0);
		let mut lifecycle = Lifecycle::new(mock.decoder());
		lifecycle.configure(&CONFIG).unwrap();

		// Give up on the first decode without waiting for its frame.
		let res = tokio::time::timeout(Duration::from_millis(10), lifecycle.decode(&chunk(0, true))).await;
		assert!(res.is_err());

		assert_eq!(lifecycle.decode(&chunk(33_000, false)).await.err(), Some(DecodeError::Busy));
		assert_eq!(mock.submitted(), 1);
	}

	#[tokio::test]
	async fn test_late_frame_released() {
		let mock = Mock::new().stall_at(0);
		let mut lifecycle = Lifecycle::new(mock.decoder());
		lifecycle.configure(&CONFIG).unwrap();

		let res = tokio::time::timeout(Duration::from_millis(10), lifecycle.decode(&chunk(0, true))).await;
		assert!(res.is_err());

		lifecycle.close();
		mock.release_stalled();

		assert_eq!(mock.produced(), 1);
		assert_eq!(mock.released(), 1);
	}
}
