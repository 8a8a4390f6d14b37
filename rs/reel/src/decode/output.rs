use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

use super::{DecodeError, Frame};

type Waiter<F> = oneshot::Sender<Result<F, DecodeError>>;

struct State<F> {
	// At most one submitted chunk is waiting for its frame.
	waiter: Option<Waiter<F>>,

	// Set on the first fatal error.
	error: Option<DecodeError>,

	closed: bool,
}

/// The notification handle given to a [FrameDecoder](super::FrameDecoder).
///
/// The decoder calls [Output::frame] once per accepted chunk and [Output::error] on a fatal condition.
/// Both are safe to call from any thread, before or after the session ends.
pub struct Output<F> {
	state: Arc<Mutex<State<F>>>,
}

impl<F> Clone for Output<F> {
	fn clone(&self) -> Self {
		Self {
			state: self.state.clone(),
		}
	}
}

impl<F: Frame> Output<F> {
	pub(super) fn new() -> Self {
		Self {
			state: Arc::new(Mutex::new(State {
				waiter: None,
				error: None,
				closed: false,
			})),
		}
	}

	/// Report a decoded frame.
	///
	/// The frame resolves the pending submission. If nothing is pending, or the session already failed
	/// or closed, the frame is released immediately.
	pub fn frame(&self, frame: F) {
		let unclaimed = {
			let mut state = self.state.lock().unwrap();
			if state.closed || state.error.is_some() {
				tracing::trace!(timestamp = %frame.timestamp(), "releasing frame after session end");
				Some(frame)
			} else if let Some(waiter) = state.waiter.take() {
				// The receiver is gone if the submission was abandoned.
				waiter.send(Ok(frame)).err().and_then(Result::ok)
			} else {
				tracing::warn!(timestamp = %frame.timestamp(), "unexpected frame, nothing pending");
				Some(frame)
			}
		};

		// Released outside the lock.
		drop(unclaimed);
	}

	/// Report a fatal error; every later submission fails with it.
	pub fn error(&self, err: DecodeError) {
		let mut state = self.state.lock().unwrap();
		if state.closed || state.error.is_some() {
			tracing::debug!(%err, "ignoring error after session end");
			return;
		}

		tracing::warn!(%err, "decoder error");
		state.error = Some(err.clone());

		if let Some(waiter) = state.waiter.take() {
			let _ = waiter.send(Err(err));
		}
	}

	/// Register the single-use waiter for the next frame.
	pub(super) fn register(&self) -> Result<oneshot::Receiver<Result<F, DecodeError>>, DecodeError> {
		let mut state = self.state.lock().unwrap();
		if let Some(err) = &state.error {
			return Err(err.clone());
		}

		if state.closed {
			return Err(DecodeError::Closed);
		}

		// An abandoned submission still owes us a frame; accepting another chunk would misattribute it.
		if state.waiter.is_some() {
			return Err(DecodeError::Busy);
		}

		let (tx, rx) = oneshot::channel();
		state.waiter = Some(tx);

		Ok(rx)
	}

	/// The first fatal error, if any.
	pub(super) fn failed(&self) -> Option<DecodeError> {
		self.state.lock().unwrap().error.clone()
	}

	/// Drop the pending waiter and refuse any further frames.
	pub(super) fn close(&self) {
		let waiter = {
			let mut state = self.state.lock().unwrap();
			state.closed = true;
			state.waiter.take()
		};

		drop(waiter);
	}
}
