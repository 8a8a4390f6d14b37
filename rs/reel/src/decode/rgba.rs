use bytes::Bytes;

use super::Frame;
use crate::Timestamp;

/// A decoded frame in CPU memory, as tightly packed RGBA.
#[derive(Clone, Debug)]
pub struct RgbaFrame {
	timestamp: Timestamp,
	width: u32,
	height: u32,
	pixels: Bytes,
}

impl RgbaFrame {
	pub fn new(timestamp: Timestamp, width: u32, height: u32, pixels: impl Into<Bytes>) -> Self {
		Self {
			timestamp,
			width,
			height,
			pixels: pixels.into(),
		}
	}

	/// Copy `height` rows of `width` pixels out of a buffer whose rows start `stride` bytes apart.
	///
	/// Returns None if the buffer is too small for the given layout.
	pub fn from_strided(timestamp: Timestamp, width: u32, height: u32, data: &[u8], stride: usize) -> Option<Self> {
		let row = width as usize * 4;
		if stride < row {
			return None;
		}

		let mut pixels = Vec::with_capacity(row * height as usize);
		for y in 0..height as usize {
			let start = y * stride;
			pixels.extend_from_slice(data.get(start..start + row)?);
		}

		Some(Self::new(timestamp, width, height, pixels))
	}
}

impl Frame for RgbaFrame {
	fn timestamp(&self) -> Timestamp {
		self.timestamp
	}

	fn dimensions(&self) -> (u32, u32) {
		(self.width, self.height)
	}

	fn rgba(&self) -> Option<&[u8]> {
		Some(&self.pixels)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_strided_rows() {
		// Two 2-pixel rows, each followed by 4 bytes of padding.
		let mut data = Vec::new();
		data.extend_from_slice(&[1; 8]);
		data.extend_from_slice(&[0xee; 4]);
		data.extend_from_slice(&[2; 8]);
		data.extend_from_slice(&[0xee; 4]);

		let frame = RgbaFrame::from_strided(Timestamp::ZERO, 2, 2, &data, 12).unwrap();
		assert_eq!(frame.dimensions(), (2, 2));

		let mut expected = vec![1; 8];
		expected.extend_from_slice(&[2; 8]);
		assert_eq!(frame.rgba(), Some(expected.as_slice()));
	}

	#[test]
	fn test_strided_last_row_unpadded() {
		// The final row may stop right after its pixels.
		let mut data = vec![3; 8];
		data.extend_from_slice(&[0; 8]);
		data.extend_from_slice(&[4; 8]);

		let frame = RgbaFrame::from_strided(Timestamp::ZERO, 2, 2, &data, 16).unwrap();
		assert_eq!(frame.rgba().unwrap().len(), 16);
		assert_eq!(&frame.rgba().unwrap()[8..], &[4; 8]);
	}

	#[test]
	fn test_strided_too_small() {
		assert!(RgbaFrame::from_strided(Timestamp::ZERO, 2, 2, &[0; 20], 12).is_none());
		assert!(RgbaFrame::from_strided(Timestamp::ZERO, 4, 1, &[0; 64], 8).is_none());
	}
}
