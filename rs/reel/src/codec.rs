use std::{fmt, str::FromStr};

use serde_with::{DeserializeFromStr, SerializeDisplay};

/// The video codecs that can appear in a WebM file.
///
/// The [Display] form is the codec string handed to the decoder when configuring it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum VideoCodec {
	Vp8,
	/// VP9 profile 0, level 1.0, 8-bit.
	Vp9,
	/// AV1 main profile, level 3.0, 8-bit.
	Av1,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown codec: {0}")]
pub struct UnknownCodec(pub String);

impl VideoCodec {
	/// Map a Matroska `CodecID` element, ex. `V_VP9`.
	pub fn from_codec_id(id: &str) -> Option<Self> {
		match id {
			"V_VP8" => Some(Self::Vp8),
			"V_VP9" => Some(Self::Vp9),
			"V_AV1" => Some(Self::Av1),
			_ => None,
		}
	}
}

impl fmt::Display for VideoCodec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Vp8 => write!(f, "vp8"),
			Self::Vp9 => write!(f, "vp09.00.10.08"),
			Self::Av1 => write!(f, "av01.0.04M.08"),
		}
	}
}

impl FromStr for VideoCodec {
	type Err = UnknownCodec;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"vp8" => Ok(Self::Vp8),
			"vp9" => Ok(Self::Vp9),
			"av1" => Ok(Self::Av1),
			s if s.starts_with("vp09.") => Ok(Self::Vp9),
			s if s.starts_with("av01.") => Ok(Self::Av1),
			_ => Err(UnknownCodec(s.to_string())),
		}
	}
}
