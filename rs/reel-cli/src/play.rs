use std::path::{Path, PathBuf};

use anyhow::Context;
use bytes::Bytes;
use reel::decode::FfmpegDecoder;
use reel::render::Canvas;

pub async fn play(file: PathBuf, snapshot: Option<PathBuf>, config: reel::PlayerConfig) -> anyhow::Result<()> {
	// Only WebM is accepted; other containers aren't even read.
	if !is_webm(&file) {
		anyhow::bail!("not a .webm file: {}", file.display());
	}

	let data = tokio::fs::read(&file)
		.await
		.with_context(|| format!("failed to read {}", file.display()))?;

	let canvas = Canvas::new(config.width, config.height);
	let mut player = reel::Player::new(canvas, config);

	let track = player
		.open(Bytes::from(data))
		.with_context(|| format!("failed to parse {}", file.display()))?;

	tracing::info!(file = %file.display(), codec = %track.codec_id, "opened");

	let res = tokio::select! {
		res = player.play(FfmpegDecoder::new(), &track) => Some(res),
		_ = tokio::signal::ctrl_c() => None,
	};

	// Whatever was drawn stays drawn, even if playback failed.
	if let Some(path) = snapshot {
		player
			.presenter()
			.image()
			.save(&path)
			.with_context(|| format!("failed to save {}", path.display()))?;
	}

	match res {
		Some(Ok(summary)) => {
			println!(
				"played {} frames in {:.2?} ({:.2?} behind at worst)",
				summary.frames, summary.elapsed, summary.behind
			);
			Ok(())
		}
		Some(Err(reel::Error::Decode(err))) => anyhow::bail!("decoder error: {err}"),
		Some(Err(err)) => Err(err).context("playback failed"),
		None => {
			tracing::info!("interrupted");
			Ok(())
		}
	}
}

fn is_webm(path: &Path) -> bool {
	path.extension()
		.and_then(|ext| ext.to_str())
		.is_some_and(|ext| ext.eq_ignore_ascii_case("webm"))
}
