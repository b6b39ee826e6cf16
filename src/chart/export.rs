use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use plotters::prelude::*;
use tracing::info;

use super::render::{ChartStyle, ProgressChart};

/// Contract for writing an assembled chart somewhere a user can look at it.
#[async_trait]
pub trait ChartExporter {
    async fn export_png(
        &self,
        chart: ProgressChart,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<()>;
}

/// Writes the chart straight to a png file with the light interactive styling.
pub struct FileChartExporter;

#[async_trait]
impl ChartExporter for FileChartExporter {
    async fn export_png(
        &self,
        chart: ProgressChart,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let path: PathBuf = path.into();
        let target = path.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let area = BitMapBackend::new(&target, (width, height)).into_drawing_area();
            chart.draw(&area, &ChartStyle::light())
        })
        .await
        .context("Chart render task failed")??;

        info!("Wrote chart to {path:?}");
        Ok(())
    }
}
