//! Frame presentation.
//!
//! A [Presenter] draws a decoded frame onto a surface of fixed size, stretching it to fit.
//!
//! # Surfaces
//!
//! - [Canvas]: an in-memory RGBA image, behind the `render` feature.

use crate::decode::Frame;

#[cfg(feature = "render")]
mod canvas;

#[cfg(feature = "render")]
pub use canvas::Canvas;

/// Something that can display decoded frames.
pub trait Presenter<F: Frame> {
	/// Draw `frame` scaled to `width` x `height`, with its origin at (0, 0).
	///
	/// No letterboxing: the aspect ratio is not preserved.
	fn present(&mut self, frame: &F, width: u32, height: u32);
}

impl<F: Frame, P: Presenter<F> + ?Sized> Presenter<F> for &mut P {
	fn present(&mut self, frame: &F, width: u32, height: u32) {
		(**self).present(frame, width, height)
	}
}

impl<F: Frame, P: Presenter<F> + ?Sized> Presenter<F> for Box<P> {
	fn present(&mut self, frame: &F, width: u32, height: u32) {
		(**self).present(frame, width, height)
	}
}
