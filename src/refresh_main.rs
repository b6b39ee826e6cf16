//! Standalone wallpaper refresh, the process cron runs on the configured schedule. It
//! regenerates the wallpaper once and exits; overlapping runs are avoided by cron's pacing and
//! by the pipeline's rename-into-place write.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use habitwall::{
    config::Config,
    storage::{habit_store::SqliteHabitStore, open_database},
    utils::{
        clock::DefaultClock,
        dir::create_application_default_path,
        logging::{enable_logging, REFRESH_PREFIX},
        runtime::single_thread_runtime,
    },
    wallpaper::{desktop::SystemDesktop, WallpaperPipeline},
};
use tracing::{error, level_filters::LevelFilter};

#[derive(Parser)]
struct RefreshArgs {
    #[arg(long)]
    dir: Option<PathBuf>,
    /// This option is for debugging purposes only.
    #[arg(long = "log-console")]
    log_console: bool,
    #[arg(long = "log-filter")]
    log: Option<LevelFilter>,
}

fn main() -> Result<()> {
    let args = RefreshArgs::parse();

    let app_dir = args.dir.map_or_else(create_application_default_path, Ok)?;
    enable_logging(REFRESH_PREFIX, &app_dir, args.log, args.log_console)?;

    single_thread_runtime()?.block_on(async move {
        let config = Config::load(&app_dir)?;
        let store = SqliteHabitStore::new(open_database(&config.database_path(&app_dir))?);
        let pipeline = WallpaperPipeline::new(
            store,
            SystemDesktop,
            config.wallpaper_dir(&app_dir),
            config.wallpaper.width,
            config.wallpaper.height,
        );
        pipeline
            .refresh(&DefaultClock)
            .await
            .inspect_err(|e| error!("Wallpaper refresh failed {e:?}"))?;
        Ok(())
    })
}
