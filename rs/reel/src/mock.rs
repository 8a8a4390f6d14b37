//! A scripted decoder that records every call, for tests.

use std::{
	fmt,
	sync::{Arc, Mutex},
	time::Duration,
};

use crate::decode::{ConfigError, DecodeError, DecoderConfig, Frame, FrameDecoder, Output};
use crate::{Chunk, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
	Configure(DecoderConfig),
	Submit(Timestamp),
	Output(Timestamp),
	Present(Timestamp),
	Release(Timestamp),
	Close,
}

#[derive(Default)]
struct Inner {
	events: Mutex<Vec<Event>>,
	stalled: Mutex<Option<(Output<MockFrame>, Timestamp)>>,
}

/// Shared script and call log; cloned into every decoder and frame it creates.
#[derive(Clone, Default)]
pub struct Mock {
	inner: Arc<Inner>,
	fail_at: Option<usize>,
	stall_at: Option<usize>,
	delay: Option<Duration>,
	reject_config: bool,
}

impl Mock {
	pub fn new() -> Self {
		Self::default()
	}

	/// Report a decode error instead of the frame for the nth chunk.
	pub fn fail_at(mut self, index: usize) -> Self {
		self.fail_at = Some(index);
		self
	}

	/// Never report the frame for the nth chunk, until [Mock::release_stalled].
	pub fn stall_at(mut self, index: usize) -> Self {
		self.stall_at = Some(index);
		self
	}

	/// Report each output from a spawned task after `delay`, rather than synchronously.
	pub fn delay(mut self, delay: Duration) -> Self {
		self.delay = Some(delay);
		self
	}

	pub fn reject_config(mut self) -> Self {
		self.reject_config = true;
		self
	}

	pub fn decoder(&self) -> MockDecoder {
		MockDecoder {
			mock: self.clone(),
			output: None,
			size: (0, 0),
			index: 0,
		}
	}

	pub fn record(&self, event: Event) {
		self.inner.events.lock().unwrap().push(event);
	}

	pub fn events(&self) -> Vec<Event> {
		self.inner.events.lock().unwrap().clone()
	}

	fn count(&self, f: impl Fn(&Event) -> bool) -> usize {
		self.inner.events.lock().unwrap().iter().filter(|e| f(e)).count()
	}

	pub fn submitted(&self) -> usize {
		self.count(|e| matches!(e, Event::Submit(_)))
	}

	pub fn produced(&self) -> usize {
		self.count(|e| matches!(e, Event::Output(_)))
	}

	pub fn released(&self) -> usize {
		self.count(|e| matches!(e, Event::Release(_)))
	}

	/// The timestamps of presented frames, in order.
	pub fn presented(&self) -> Vec<Timestamp> {
		self.events()
			.into_iter()
			.filter_map(|e| match e {
				Event::Present(ts) => Some(ts),
				_ => None,
			})
			.collect()
	}

	/// Deliver the frame held back by [Mock::stall_at].
	pub fn release_stalled(&self) {
		let stalled = self.inner.stalled.lock().unwrap().take();
		if let Some((output, timestamp)) = stalled {
			self.record(Event::Output(timestamp));
			output.frame(MockFrame {
				timestamp,
				size: (1, 1),
				mock: self.clone(),
			});
		}
	}
}

pub struct MockFrame {
	timestamp: Timestamp,
	size: (u32, u32),
	mock: Mock,
}

impl Frame for MockFrame {
	fn timestamp(&self) -> Timestamp {
		self.timestamp
	}

	fn dimensions(&self) -> (u32, u32) {
		self.size
	}
}

impl fmt::Debug for MockFrame {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MockFrame").field("timestamp", &self.timestamp).finish()
	}
}

impl Drop for MockFrame {
	fn drop(&mut self) {
		self.mock.record(Event::Release(self.timestamp));
	}
}

pub struct MockDecoder {
	mock: Mock,
	output: Option<Output<MockFrame>>,
	size: (u32, u32),
	index: usize,
}

impl FrameDecoder for MockDecoder {
	type Frame = MockFrame;

	fn configure(&mut self, config: &DecoderConfig, output: Output<MockFrame>) -> Result<(), ConfigError> {
		self.mock.record(Event::Configure(*config));
		if self.mock.reject_config {
			return Err(ConfigError::Unsupported("mock".to_string()));
		}

		self.size = (config.coded_width, config.coded_height);
		self.output = Some(output);
		Ok(())
	}

	fn decode(&mut self, chunk: &Chunk) -> Result<(), DecodeError> {
		let output = self.output.clone().ok_or(DecodeError::NotConfigured)?;
		self.mock.record(Event::Submit(chunk.timestamp));

		let index = self.index;
		self.index += 1;

		if self.mock.stall_at == Some(index) {
			*self.mock.inner.stalled.lock().unwrap() = Some((output, chunk.timestamp));
			return Ok(());
		}

		let result = if self.mock.fail_at == Some(index) {
			Err(DecodeError::Decode(format!("corrupt chunk {index}")))
		} else {
			Ok(MockFrame {
				timestamp: chunk.timestamp,
				size: self.size,
				mock: self.mock.clone(),
			})
		};

		let mock = self.mock.clone();
		let deliver = move || match result {
			Ok(frame) => {
				mock.record(Event::Output(frame.timestamp));
				output.frame(frame);
			}
			Err(err) => output.error(err),
		};

		match self.mock.delay {
			Some(delay) => {
				tokio::spawn(async move {
					tokio::time::sleep(delay).await;
					deliver();
				});
			}
			None => deliver(),
		}

		Ok(())
	}

	fn close(&mut self) {
		self.output = None;
		self.mock.record(Event::Close);
	}
}
