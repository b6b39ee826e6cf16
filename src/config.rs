use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "config.json";

pub const DEFAULT_WALLPAPER_WIDTH: u32 = 3546;
pub const DEFAULT_WALLPAPER_HEIGHT: u32 = 2234;

/// Optional overrides loaded from `config.json` in the application directory. Every field has a
/// default, so an absent file is equivalent to an empty one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path to the sqlite database. Defaults to `habits.db` in the application directory.
    #[serde(default)]
    pub database: Option<PathBuf>,
    /// Directory generated wallpapers are written into. Defaults to `wallpapers` in the
    /// application directory.
    #[serde(default)]
    pub wallpaper_dir: Option<PathBuf>,
    #[serde(default)]
    pub wallpaper: WallpaperConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WallpaperConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for WallpaperConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WALLPAPER_WIDTH,
            height: DEFAULT_WALLPAPER_HEIGHT,
        }
    }
}

impl Config {
    /// Loads configuration from `config.json` inside `app_dir`. A missing file produces the
    /// defaults, a malformed one is an error.
    pub fn load(app_dir: &Path) -> Result<Self> {
        let path = app_dir.join(CONFIG_FILE_NAME);
        let content = match std::fs::read_to_string(&path) {
            Ok(v) => v,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config at {path:?}, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e).context(format!("Failed to read config at {path:?}")),
        };
        serde_json::from_str(&content).context(format!("Failed to parse config at {path:?}"))
    }

    pub fn database_path(&self, app_dir: &Path) -> PathBuf {
        self.database
            .clone()
            .unwrap_or_else(|| app_dir.join("habits.db"))
    }

    pub fn wallpaper_dir(&self, app_dir: &Path) -> PathBuf {
        self.wallpaper_dir
            .clone()
            .unwrap_or_else(|| app_dir.join("wallpapers"))
    }
}
