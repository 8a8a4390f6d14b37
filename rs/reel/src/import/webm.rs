use bytes::Bytes;

use super::ebml::{self, Reader};
use super::{ChunkSource, SourceError};
use crate::{Chunk, Timestamp, VideoCodec, VideoTrack};

const EBML: u32 = 0x1a45dfa3;
const DOC_TYPE: u32 = 0x4282;

const SEGMENT: u32 = 0x18538067;
const SEEK_HEAD: u32 = 0x114d9b74;
const INFO: u32 = 0x1549a966;
const TRACKS: u32 = 0x1654ae6b;
const CLUSTER: u32 = 0x1f43b675;
const CUES: u32 = 0x1c53bb6b;
const ATTACHMENTS: u32 = 0x1941a469;
const CHAPTERS: u32 = 0x1043a770;
const TAGS: u32 = 0x1254c367;

const TIMECODE_SCALE: u32 = 0x2ad7b1;

const TRACK_ENTRY: u32 = 0xae;
const TRACK_NUMBER: u32 = 0xd7;
const TRACK_TYPE: u32 = 0x83;
const CODEC_ID: u32 = 0x86;
const VIDEO: u32 = 0xe0;
const PIXEL_WIDTH: u32 = 0xb0;
const PIXEL_HEIGHT: u32 = 0xba;

const TIMECODE: u32 = 0xe7;
const SIMPLE_BLOCK: u32 = 0xa3;
const BLOCK_GROUP: u32 = 0xa0;
const BLOCK: u32 = 0xa1;
const REFERENCE_BLOCK: u32 = 0xfb;

const TRACK_TYPE_VIDEO: u64 = 1;

// Nanoseconds per tick when the file doesn't say otherwise.
const DEFAULT_TIMECODE_SCALE: u64 = 1_000_000;

// Any of these ends a Cluster of unknown size.
const SEGMENT_CHILDREN: [u32; 8] = [SEEK_HEAD, INFO, TRACKS, CLUSTER, CUES, ATTACHMENTS, CHAPTERS, TAGS];

const FLAG_KEYFRAME: u8 = 0x80;
const FLAG_LACING: u8 = 0x06;

/// Demuxes the first video track of a WebM file.
///
/// Supports both finalized files and live recordings with unknown-size Segments and Clusters,
/// as written by MediaRecorder. Laced blocks are rejected; video encoders don't produce them.
#[derive(Debug, Default)]
pub struct Webm {}

impl Webm {
	pub fn new() -> Self {
		Self::default()
	}
}

impl ChunkSource for Webm {
	fn parse(&mut self, data: Bytes) -> Result<VideoTrack, SourceError> {
		let mut reader = Reader::new(data);

		// Anything without an EBML header of type "webm" isn't ours to judge further.
		let header = reader.header().map_err(|_| SourceError::NotWebm)?;
		if header.id != EBML {
			return Err(SourceError::NotWebm);
		}

		let body = reader.body(header.size).map_err(|_| SourceError::NotWebm)?;
		check_doc_type(body)?;

		while !reader.is_empty() {
			let header = reader.header()?;
			if header.id == SEGMENT {
				let body = reader.body(header.size)?;
				return Demuxer::default().segment(body);
			}

			reader.skip(header)?;
		}

		Err(SourceError::Invalid("missing segment".to_string()))
	}
}

fn check_doc_type(header: Bytes) -> Result<(), SourceError> {
	let mut reader = Reader::new(header);

	while !reader.is_empty() {
		let header = reader.header()?;
		if header.id == DOC_TYPE {
			let doc_type = ebml::string(&reader.data(header)?)?;
			tracing::trace!(%doc_type, "ebml header");

			return match doc_type.as_str() {
				"webm" => Ok(()),
				_ => Err(SourceError::NotWebm),
			};
		}

		reader.skip(header)?;
	}

	// The default DocType is "matroska".
	Err(SourceError::NotWebm)
}

struct Track {
	number: u64,
	codec_id: String,
	width: u32,
	height: u32,
}

struct Demuxer {
	// Nanoseconds per timecode tick.
	scale: u64,

	// The first video track, once Tracks has been parsed.
	track: Option<Track>,

	// Whether a Tracks element was seen, even one without video.
	tracks_seen: bool,

	// The timecode of the current Cluster.
	timecode: Option<u64>,

	chunks: Vec<Chunk>,

	// Blocks belonging to other tracks.
	skipped: usize,
}

impl Default for Demuxer {
	fn default() -> Self {
		Self {
			scale: DEFAULT_TIMECODE_SCALE,
			track: None,
			tracks_seen: false,
			timecode: None,
			chunks: Vec::new(),
			skipped: 0,
		}
	}
}

impl Demuxer {
	fn segment(mut self, body: Bytes) -> Result<VideoTrack, SourceError> {
		let mut reader = Reader::new(body);

		while !reader.is_empty() {
			let header = reader.header()?;

			match header.id {
				INFO => self.info(reader.body(header.size)?)?,
				TRACKS => self.tracks(reader.body(header.size)?)?,
				CLUSTER => match header.size {
					Some(size) => self.cluster(&mut Reader::new(reader.take(size)?))?,
					// Runs until the next Segment child.
					None => self.cluster(&mut reader)?,
				},
				_ => reader.skip(header)?,
			}
		}

		self.finish()
	}

	fn info(&mut self, body: Bytes) -> Result<(), SourceError> {
		let mut reader = Reader::new(body);

		while !reader.is_empty() {
			let header = reader.header()?;
			match header.id {
				TIMECODE_SCALE => {
					self.scale = ebml::uint(&reader.data(header)?)?;
					if self.scale == 0 {
						return Err(SourceError::Invalid("zero timecode scale".to_string()));
					}
				}
				_ => reader.skip(header)?,
			}
		}

		Ok(())
	}

	fn tracks(&mut self, body: Bytes) -> Result<(), SourceError> {
		self.tracks_seen = true;
		let mut reader = Reader::new(body);

		while !reader.is_empty() {
			let header = reader.header()?;
			let body = reader.data(header)?;

			if header.id != TRACK_ENTRY || self.track.is_some() {
				continue;
			}

			self.track = track_entry(body)?;
		}

		Ok(())
	}

	fn cluster(&mut self, reader: &mut Reader) -> Result<(), SourceError> {
		self.timecode = None;

		while !reader.is_empty() {
			if SEGMENT_CHILDREN.contains(&reader.peek_id()?) {
				break;
			}

			let header = reader.header()?;
			match header.id {
				TIMECODE => self.timecode = Some(ebml::uint(&reader.data(header)?)?),
				SIMPLE_BLOCK => self.block(reader.data(header)?, None)?,
				BLOCK_GROUP => self.block_group(reader.data(header)?)?,
				_ => reader.skip(header)?,
			}
		}

		Ok(())
	}

	fn block_group(&mut self, body: Bytes) -> Result<(), SourceError> {
		let mut reader = Reader::new(body);
		let mut block = None;
		let mut referenced = false;

		while !reader.is_empty() {
			let header = reader.header()?;
			let body = reader.data(header)?;

			match header.id {
				BLOCK => block = Some(body),
				REFERENCE_BLOCK => referenced = true,
				_ => {}
			}
		}

		match block {
			Some(block) => self.block(block, Some(!referenced)),
			None => Err(SourceError::Invalid("block group without a block".to_string())),
		}
	}

	// A SimpleBlock carries its own keyframe flag, a Block's comes from its group.
	fn block(&mut self, data: Bytes, keyframe: Option<bool>) -> Result<(), SourceError> {
		let Some(track) = self.track.as_ref() else {
			if !self.tracks_seen {
				return Err(SourceError::Invalid("block before tracks".to_string()));
			}

			// No video track; the file is rejected once parsing finishes.
			self.skipped += 1;
			return Ok(());
		};

		let (number, len) = ebml::vint(&data)?;
		if number != track.number {
			self.skipped += 1;
			return Ok(());
		}

		let header = data.get(len..len + 3).ok_or(SourceError::Truncated)?;
		let relative = i16::from_be_bytes([header[0], header[1]]);
		let flags = header[2];

		if flags & FLAG_LACING != 0 {
			return Err(SourceError::Unsupported("laced blocks".to_string()));
		}

		let timecode = self
			.timecode
			.ok_or_else(|| SourceError::Invalid("block before cluster timecode".to_string()))?;

		let ticks = timecode as i128 + relative as i128;
		let micros = ticks
			.checked_mul(self.scale as i128)
			.map(|nanos| nanos / 1000)
			.and_then(|micros| u64::try_from(micros).ok())
			.ok_or_else(|| SourceError::Invalid(format!("timestamp out of range: {ticks} ticks")))?;

		let keyframe = keyframe.unwrap_or(flags & FLAG_KEYFRAME != 0);
		let payload = data.slice(len + 3..);

		self.chunks.push(Chunk::new(Timestamp::from_micros(micros), payload, keyframe));

		Ok(())
	}

	fn finish(self) -> Result<VideoTrack, SourceError> {
		let track = self.track.ok_or(SourceError::NoVideoTrack)?;
		let codec = VideoCodec::from_codec_id(&track.codec_id);

		tracing::debug!(
			codec = %track.codec_id,
			width = track.width,
			height = track.height,
			chunks = self.chunks.len(),
			skipped = self.skipped,
			"parsed webm"
		);

		Ok(VideoTrack {
			width: track.width,
			height: track.height,
			codec,
			codec_id: track.codec_id,
			chunks: self.chunks,
		})
	}
}

// Returns None for anything that isn't a video track.
fn track_entry(body: Bytes) -> Result<Option<Track>, SourceError> {
	let mut reader = Reader::new(body);

	let mut number = None;
	let mut kind = None;
	let mut codec_id = String::new();
	let mut width = None;
	let mut height = None;

	while !reader.is_empty() {
		let header = reader.header()?;
		let body = reader.data(header)?;

		match header.id {
			TRACK_NUMBER => number = Some(ebml::uint(&body)?),
			TRACK_TYPE => kind = Some(ebml::uint(&body)?),
			CODEC_ID => codec_id = ebml::string(&body)?,
			VIDEO => {
				let mut video = Reader::new(body);
				while !video.is_empty() {
					let header = video.header()?;
					let body = video.data(header)?;

					match header.id {
						PIXEL_WIDTH => width = Some(pixels(&body)?),
						PIXEL_HEIGHT => height = Some(pixels(&body)?),
						_ => {}
					}
				}
			}
			_ => {}
		}
	}

	if kind != Some(TRACK_TYPE_VIDEO) {
		tracing::trace!(?number, ?kind, %codec_id, "skipping track");
		return Ok(None);
	}

	let number = number.ok_or_else(|| SourceError::Invalid("video track without a number".to_string()))?;
	let (Some(width), Some(height)) = (width, height) else {
		return Err(SourceError::Invalid("missing video dimensions".to_string()));
	};

	Ok(Some(Track {
		number,
		codec_id,
		width,
		height,
	}))
}

fn pixels(body: &[u8]) -> Result<u32, SourceError> {
	let value = ebml::uint(body)?;
	u32::try_from(value).map_err(|_| SourceError::Invalid(format!("dimension too large: {value}")))
}
