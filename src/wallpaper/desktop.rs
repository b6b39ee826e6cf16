use std::path::Path;

use anyhow::Result;

/// Contract for pointing the OS at a new background image. Split out so the pipeline can be
/// tested without touching the desktop.
#[cfg_attr(test, mockall::automock)]
pub trait Desktop {
    fn set_background(&self, path: &Path) -> Result<()>;
}

/// Sets the background through the platform's own command.
pub struct SystemDesktop;

impl Desktop for SystemDesktop {
    #[cfg(target_os = "macos")]
    fn set_background(&self, path: &Path) -> Result<()> {
        let script = format!(
            "tell application \"System Events\" to set picture of every desktop to \"{}\"",
            path.display()
        );
        run_command(std::process::Command::new("osascript").args(["-e", &script]))
    }

    #[cfg(target_os = "linux")]
    fn set_background(&self, path: &Path) -> Result<()> {
        let uri = format!("file://{}", path.display());
        run_command(std::process::Command::new("gsettings").args([
            "set",
            "org.gnome.desktop.background",
            "picture-uri",
            &uri,
        ]))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    fn set_background(&self, _path: &Path) -> Result<()> {
        anyhow::bail!("Setting the desktop background is not supported on this platform")
    }
}

#[cfg(any(target_os = "macos", target_os = "linux"))]
fn run_command(command: &mut std::process::Command) -> Result<()> {
    let output = command.output()?;
    if !output.status.success() {
        anyhow::bail!(
            "Background command failed with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(())
}
