//! An in-memory drawing surface.

use image::{ImageBuffer, Rgba, RgbaImage, imageops};

use super::Presenter;
use crate::decode::Frame;

const FILTER: imageops::FilterType = imageops::FilterType::Triangle;

/// A fixed-size RGBA surface that frames are stretched onto.
pub struct Canvas {
	image: RgbaImage,
	presented: usize,
}

impl Canvas {
	/// Create an opaque black canvas.
	pub fn new(width: u32, height: u32) -> Self {
		Self {
			image: RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255])),
			presented: 0,
		}
	}

	pub fn width(&self) -> u32 {
		self.image.width()
	}

	pub fn height(&self) -> u32 {
		self.image.height()
	}

	/// The current contents of the surface.
	pub fn image(&self) -> &RgbaImage {
		&self.image
	}

	/// The number of frames drawn so far.
	pub fn presented(&self) -> usize {
		self.presented
	}
}

impl Default for Canvas {
	fn default() -> Self {
		Self::new(640, 360)
	}
}

impl<F: Frame> Presenter<F> for Canvas {
	fn present(&mut self, frame: &F, width: u32, height: u32) {
		let Some(pixels) = frame.rgba() else {
			tracing::trace!(timestamp = %frame.timestamp(), "frame has no CPU pixels, skipping");
			return;
		};

		let (frame_width, frame_height) = frame.dimensions();
		let Some(source) = ImageBuffer::<Rgba<u8>, &[u8]>::from_raw(frame_width, frame_height, pixels) else {
			tracing::trace!(timestamp = %frame.timestamp(), "frame buffer too small, skipping");
			return;
		};

		// Anything outside the surface is clipped.
		let width = width.min(self.image.width());
		let height = height.min(self.image.height());
		if width == 0 || height == 0 {
			return;
		}

		if (frame_width, frame_height) == (width, height) {
			imageops::replace(&mut self.image, &source, 0, 0);
		} else {
			let scaled = imageops::resize(&source, width, height, FILTER);
			imageops::replace(&mut self.image, &scaled, 0, 0);
		}

		self.presented += 1;
	}
}
