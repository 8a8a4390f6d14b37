//! Video decoding using FFmpeg.

use std::{sync::mpsc, thread};

use ffmpeg_next as ffmpeg;

use super::{ConfigError, DecodeError, DecoderConfig, FrameDecoder, Output, RgbaFrame};
use crate::{Chunk, Timestamp, VideoCodec};

/// Video decoder using FFmpeg.
///
/// Decoding runs on a dedicated thread; frames are converted to RGBA and reported through [Output],
/// mirroring the asynchronous contract of a platform decoder.
#[derive(Default)]
pub struct FfmpegDecoder {
	worker: Option<Worker>,
}

struct Worker {
	chunks: mpsc::Sender<Chunk>,
	handle: thread::JoinHandle<()>,
}

impl FfmpegDecoder {
	pub fn new() -> Self {
		Self::default()
	}
}

impl FrameDecoder for FfmpegDecoder {
	type Frame = RgbaFrame;

	fn configure(&mut self, config: &DecoderConfig, output: Output<RgbaFrame>) -> Result<(), ConfigError> {
		if self.worker.is_some() {
			return Err(ConfigError::AlreadyConfigured);
		}

		// Initialize FFmpeg (idempotent)
		ffmpeg::init().map_err(|e| ConfigError::Unsupported(format!("failed to initialize ffmpeg: {e}")))?;

		let codec_id = match config.codec {
			VideoCodec::Vp8 => ffmpeg::codec::Id::VP8,
			VideoCodec::Vp9 => ffmpeg::codec::Id::VP9,
			VideoCodec::Av1 => ffmpeg::codec::Id::AV1,
		};

		let codec = ffmpeg::codec::decoder::find(codec_id)
			.ok_or_else(|| ConfigError::UnsupportedCodec(config.codec.to_string()))?;

		let mut context = ffmpeg::codec::context::Context::new_with_codec(codec);

		// The coded size is a hint; the bitstream has the final say.
		unsafe {
			let context = context.as_mut_ptr();
			(*context).width = config.coded_width as i32;
			(*context).height = config.coded_height as i32;
		}

		let decoder = context
			.decoder()
			.video()
			.map_err(|e| ConfigError::Unsupported(format!("failed to open decoder: {e}")))?;

		let (chunks, queue) = mpsc::channel();
		let handle = thread::Builder::new()
			.name("reel-decoder".to_string())
			.spawn(move || run(decoder, queue, output))
			.map_err(|e| ConfigError::Unsupported(format!("failed to spawn decoder thread: {e}")))?;

		self.worker = Some(Worker { chunks, handle });

		Ok(())
	}

	fn decode(&mut self, chunk: &Chunk) -> Result<(), DecodeError> {
		let worker = self.worker.as_ref().ok_or(DecodeError::NotConfigured)?;

		// The worker only exits early after reporting an error.
		worker.chunks.send(chunk.clone()).map_err(|_| DecodeError::Closed)
	}

	fn close(&mut self) {
		let Some(worker) = self.worker.take() else {
			return;
		};

		drop(worker.chunks);
		if worker.handle.join().is_err() {
			tracing::error!("decoder thread panicked");
		}
	}
}

impl Drop for FfmpegDecoder {
	fn drop(&mut self) {
		self.close();
	}
}

fn run(mut decoder: ffmpeg::decoder::Video, queue: mpsc::Receiver<Chunk>, output: Output<RgbaFrame>) {
	let mut converter = None;

	for chunk in queue {
		match decode(&mut decoder, &mut converter, &chunk) {
			Ok(frame) => output.frame(frame),
			Err(err) => {
				output.error(err);
				return;
			}
		}
	}
}

// Converts decoded frames to RGBA, rebuilt whenever the source format or size changes.
struct Converter {
	scaler: ffmpeg::software::scaling::Context,
	format: ffmpeg::format::Pixel,
	width: u32,
	height: u32,
}

fn decode(
	decoder: &mut ffmpeg::decoder::Video,
	converter: &mut Option<Converter>,
	chunk: &Chunk,
) -> Result<RgbaFrame, DecodeError> {
	// Create FFmpeg packet from chunk data
	let mut packet = ffmpeg::codec::packet::Packet::copy(chunk.payload.as_ref());
	packet.set_pts(Some(chunk.timestamp.as_micros() as i64));
	if chunk.keyframe {
		packet.set_flags(ffmpeg::codec::packet::Flags::KEY);
	}

	decoder
		.send_packet(&packet)
		.map_err(|e| DecodeError::Decode(format!("send_packet failed: {e}")))?;

	let mut decoded = ffmpeg::frame::Video::empty();
	decoder
		.receive_frame(&mut decoded)
		.map_err(|e| DecodeError::Decode(format!("receive_frame failed: {e}")))?;

	let (format, width, height) = (decoded.format(), decoded.width(), decoded.height());

	let stale = match converter {
		Some(c) => c.format != format || c.width != width || c.height != height,
		None => true,
	};

	if stale {
		let scaler = ffmpeg::software::scaling::Context::get(
			format,
			width,
			height,
			ffmpeg::format::Pixel::RGBA,
			width,
			height,
			ffmpeg::software::scaling::Flags::BILINEAR,
		)
		.map_err(|e| DecodeError::Decode(format!("unsupported pixel format {format:?}: {e}")))?;

		*converter = Some(Converter {
			scaler,
			format,
			width,
			height,
		});
	}

	let Some(converter) = converter.as_mut() else {
		return Err(DecodeError::Decode("missing converter".to_string()));
	};

	let mut rgba = ffmpeg::frame::Video::empty();
	converter
		.scaler
		.run(&decoded, &mut rgba)
		.map_err(|e| DecodeError::Decode(format!("pixel conversion failed: {e}")))?;

	let timestamp = decoded
		.pts()
		.and_then(|pts| u64::try_from(pts).ok())
		.map(Timestamp::from_micros)
		.unwrap_or(chunk.timestamp);

	// Strip the row padding.
	RgbaFrame::from_strided(timestamp, width, height, rgba.data(0), rgba.stride(0))
		.ok_or_else(|| DecodeError::Decode("converted frame is smaller than expected".to_string()))
}
