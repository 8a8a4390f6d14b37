use bytes::Bytes;

use crate::decode::{ConfigError, FrameDecoder};
use crate::import::{ChunkSource, Webm};
use crate::render::Presenter;
use crate::{Engine, PlayerConfig, Result, Summary, VideoTrack};

/// Plays WebM files onto a [Presenter].
pub struct Player<P> {
	presenter: P,
	config: PlayerConfig,
}

impl<P> Player<P> {
	pub fn new(presenter: P, config: PlayerConfig) -> Self {
		Self { presenter, config }
	}

	/// Demux a WebM file; nothing is decoded yet.
	pub fn open(&self, data: Bytes) -> Result<VideoTrack> {
		Ok(Webm::new().parse(data)?)
	}

	/// Decode and present every chunk of `track` at its recorded pace.
	///
	/// The codec comes from the config if set, otherwise from the track.
	/// Frames are drawn at the configured output size, regardless of the track's size.
	pub async fn play<D>(&mut self, decoder: D, track: &VideoTrack) -> Result<Summary>
	where
		D: FrameDecoder,
		P: Presenter<D::Frame>,
	{
		let codec = self
			.config
			.codec
			.or(track.codec)
			.ok_or_else(|| ConfigError::UnsupportedCodec(track.codec_id.clone()))?;

		tracing::info!(
			%codec,
			width = track.width(),
			height = track.height(),
			chunks = track.chunks().len(),
			duration = ?track.duration(),
			"starting playback"
		);

		let engine = Engine::with_config(decoder, self.config.engine(codec));
		let (width, height) = (self.config.width, self.config.height);
		let presenter = &mut self.presenter;

		engine
			.play(track.chunks(), track.width(), track.height(), |frame| {
				presenter.present(frame, width, height)
			})
			.await
	}

	pub fn config(&self) -> &PlayerConfig {
		&self.config
	}

	pub fn presenter(&self) -> &P {
		&self.presenter
	}

	pub fn into_presenter(self) -> P {
		self.presenter
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::decode::{DecoderConfig, Frame};
	use crate::import::SourceError;
	use crate::mock::{Event, Mock};
	use crate::{Chunk, Error, Timestamp, VideoCodec};

	// Records what would have been drawn.
	#[derive(Default)]
	struct Recorder {
		drawn: Vec<(Timestamp, u32, u32)>,
	}

	impl<F: Frame> Presenter<F> for Recorder {
		fn present(&mut self, frame: &F, width: u32, height: u32) {
			self.drawn.push((frame.timestamp(), width, height));
		}
	}

	fn track(codec: Option<VideoCodec>, codec_id: &str) -> VideoTrack {
		VideoTrack {
			width: 320,
			height: 240,
			codec,
			codec_id: codec_id.to_string(),
			chunks: vec![
				Chunk::new(Timestamp::from_micros(0), vec![1u8; 16], true),
				Chunk::new(Timestamp::from_micros(33_000), vec![2u8; 16], false),
			],
		}
	}

	#[tokio::test(start_paused = true)]
	async fn test_play() {
		let mock = Mock::new();
		let mut player = Player::new(Recorder::default(), PlayerConfig::default());

		let summary = player
			.play(mock.decoder(), &track(Some(VideoCodec::Vp9), "V_VP9"))
			.await
			.unwrap();
		assert_eq!(summary.frames, 2);

		// Drawn at the output size, decoded at the track size.
		let drawn = &player.presenter().drawn;
		assert_eq!(
			drawn,
			&vec![
				(Timestamp::from_micros(0), 640, 360),
				(Timestamp::from_micros(33_000), 640, 360)
			]
		);

		assert_eq!(
			mock.events().first(),
			Some(&Event::Configure(DecoderConfig {
				codec: VideoCodec::Vp9,
				coded_width: 320,
				coded_height: 240,
			}))
		);
		assert_eq!(mock.released(), 2);
	}

	#[tokio::test(start_paused = true)]
	async fn test_codec_override() {
		let mock = Mock::new();
		let config = PlayerConfig {
			codec: Some(VideoCodec::Vp8),
			..Default::default()
		};
		let mut player = Player::new(Recorder::default(), config);

		player
			.play(mock.decoder(), &track(Some(VideoCodec::Vp9), "V_VP9"))
			.await
			.unwrap();

		assert!(matches!(
			mock.events().first(),
			Some(Event::Configure(DecoderConfig {
				codec: VideoCodec::Vp8,
				..
			}))
		));
	}

	#[tokio::test(start_paused = true)]
	async fn test_unknown_codec() {
		let mock = Mock::new();
		let mut player = Player::new(Recorder::default(), PlayerConfig::default());

		let err = player
			.play(mock.decoder(), &track(None, "V_MPEG4/ISO/AVC"))
			.await
			.unwrap_err();

		assert_eq!(
			err,
			Error::Config(ConfigError::UnsupportedCodec("V_MPEG4/ISO/AVC".to_string()))
		);
		assert!(mock.events().is_empty());
		assert!(player.presenter().drawn.is_empty());
	}

	#[test]
	fn test_open_rejects_other_formats() {
		let player = Player::new(Recorder::default(), PlayerConfig::default());
		let err = player.open(Bytes::from_static(b"\x00\x00\x00\x18ftypmp42")).unwrap_err();
		assert_eq!(err, Error::Source(SourceError::NotWebm));
	}
}
