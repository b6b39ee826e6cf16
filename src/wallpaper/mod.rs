//! Wallpaper export pipeline: render the progress chart at the configured resolution, swap the
//! file into the wallpaper directory and tell the OS about it.
//! The new image is written next to its final name and renamed into place, so a refresh that
//! overlaps a previous one never leaves a half-written background.

pub mod desktop;

use std::{
    io::Cursor,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use plotters::prelude::*;
use tracing::{debug, info, warn};

use crate::{
    chart::render::{ChartStyle, ProgressChart},
    storage::habit_store::HabitStore,
    utils::clock::Clock,
};

use desktop::Desktop;

const WALLPAPER_PREFIX: &str = "wallpaper_";
const WALLPAPER_EXTENSION: &str = ".png";

pub struct WallpaperPipeline<S, D> {
    store: S,
    desktop: D,
    wallpaper_dir: PathBuf,
    width: u32,
    height: u32,
}

impl<S: HabitStore, D: Desktop> WallpaperPipeline<S, D> {
    pub fn new(store: S, desktop: D, wallpaper_dir: PathBuf, width: u32, height: u32) -> Self {
        Self {
            store,
            desktop,
            wallpaper_dir,
            width,
            height,
        }
    }

    /// Regenerates the wallpaper from all habits and applies it. Returns the written file, or
    /// `None` when there are no habits to draw.
    pub async fn refresh(&self, clock: &impl Clock) -> Result<Option<PathBuf>> {
        let habits = self.store.habits()?;
        if habits.is_empty() {
            debug!("No habits, leaving wallpaper untouched");
            return Ok(None);
        }

        let ids: Vec<_> = habits.iter().map(|h| h.id).collect();
        let chart = ProgressChart::assemble(&self.store, &ids, clock.today())?;

        let (width, height) = (self.width, self.height);
        let png = tokio::task::spawn_blocking(move || render_png(&chart, width, height))
            .await
            .context("Wallpaper render task failed")??;

        std::fs::create_dir_all(&self.wallpaper_dir)?;
        cleanup_stale(&self.wallpaper_dir);

        let file_name = format!(
            "{WALLPAPER_PREFIX}{}{WALLPAPER_EXTENSION}",
            clock.time().format("%Y%m%d_%H%M%S")
        );
        let path = self.wallpaper_dir.join(&file_name);
        let temp = self.wallpaper_dir.join(format!(".{file_name}.tmp"));

        std::fs::write(&temp, &png)
            .with_context(|| format!("Failed to write wallpaper to {temp:?}"))?;
        std::fs::rename(&temp, &path)
            .with_context(|| format!("Failed to move wallpaper into {path:?}"))?;

        self.desktop.set_background(&path)?;
        info!("Updated wallpaper at {path:?}");
        Ok(Some(path))
    }
}

/// Rasterizes the chart with the dark wallpaper styling and encodes it as png.
fn render_png(chart: &ProgressChart, width: u32, height: u32) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let area =
            BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        chart.draw(&area, &ChartStyle::dark())?;
    }

    let image = image::RgbImage::from_raw(width, height, buffer)
        .context("Rendered buffer has unexpected size")?;
    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;
    Ok(png)
}

/// Best-effort removal of previously generated wallpapers. Failures here only get logged, a
/// stale file shouldn't stop the new one from landing.
fn cleanup_stale(dir: &Path) {
    let entries = match std::fs::read_dir(dir) {
        Ok(v) => v,
        Err(e) => {
            warn!("Couldn't scan wallpaper dir {dir:?}: {e}");
            return;
        }
    };
    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(WALLPAPER_PREFIX) && name.ends_with(WALLPAPER_EXTENSION) {
            if let Err(e) = std::fs::remove_file(entry.path()) {
                warn!("Couldn't remove stale wallpaper {:?}: {e}", entry.path());
            }
        }
    }
}
