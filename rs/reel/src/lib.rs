//! # reel: paced playback of WebM video
//!
//! `reel` decodes the video track of a WebM file one chunk at a time and presents each frame
//! when its timestamp comes due, so playback follows the recorded timing instead of the decoder's speed.
//!
//! ## Overview
//!
//! - **Import**: Demux a WebM file into an ordered list of encoded [Chunk]s.
//! - **Decode**: Bridge a callback-style platform decoder into an awaitable, one-in-flight [decode::Lifecycle].
//! - **Engine**: Submit, await, present, then wait for the frame's slot to pass.
//! - **Render**: Draw frames onto a fixed-size surface.
//! - **Player**: Glue the above together for one file.
//!
mod codec;
mod config;
mod engine;
mod error;
mod log;
mod model;
mod player;

pub mod decode;
pub mod import;
pub mod render;

#[cfg(test)]
mod mock;

pub use codec::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use log::*;
pub use model::*;
pub use player::*;
