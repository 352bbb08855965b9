use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::config::BridgeConfig;

/// Shell snippet that succeeds only inside a WSL-capable bash
const PROBE_SCRIPT: &str = "command -v wslpath >/dev/null";

/// The Linux-on-Windows layer, either active with a launcher or unavailable
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WslLayer {
    launcher: Option<PathBuf>,
}

impl WslLayer {
    pub fn inactive() -> Self {
        Self { launcher: None }
    }

    pub fn with_launcher(launcher: impl Into<PathBuf>) -> Self {
        Self { launcher: Some(launcher.into()) }
    }

    /// Probe the host. Any launch failure or non-zero exit means "not available".
    pub fn detect(config: &BridgeConfig) -> Self {
        if !probe_wslpath(&config.shell) {
            tracing::debug!("wslpath probe failed, running scripts natively");
            return Self::inactive();
        }
        match locate_executable(&config.launcher) {
            Some(path) => {
                tracing::info!(launcher=%path.display(), "WSL layer detected");
                Self::with_launcher(path)
            }
            None => {
                tracing::debug!(launcher=%config.launcher, "wslpath present but launcher not on PATH");
                Self::inactive()
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.launcher.is_some()
    }

    pub fn launcher(&self) -> Option<&Path> {
        self.launcher.as_deref()
    }
}

fn probe_wslpath(shell: &str) -> bool {
    let output = Command::new(shell)
        .args(["-lc", PROBE_SCRIPT])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output();

    match output {
        Ok(result) => result.status.success(),
        Err(_) => false,
    }
}

/// Resolve `name` through the platform's `where`/`which`
fn locate_executable(name: &str) -> Option<PathBuf> {
    let direct = Path::new(name);
    if direct.is_absolute() {
        return direct.is_file().then(|| direct.to_path_buf());
    }

    let which_cmd = if cfg!(windows) { "where" } else { "which" };
    let output = Command::new(which_cmd)
        .arg(name)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(PathBuf::from)
}

/// Forward-slash form of `path`; drive-letter paths become `/mnt/<drive>/...`
/// when the layer is active.
pub fn to_bridge_path(path: impl AsRef<Path>, layer: &WslLayer) -> String {
    let posix = path.as_ref().to_string_lossy().replace('\\', "/");
    if !layer.is_active() {
        return posix;
    }

    let mut chars = posix.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(drive), Some(':'), Some('/')) if drive.is_ascii_alphabetic() => {
            format!("/mnt/{}/{}", drive.to_ascii_lowercase(), &posix[3..])
        }
        _ => posix,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drive_paths_map_to_mnt_when_active() {
        let layer = WslLayer::with_launcher("/usr/bin/wsl.exe");
        assert_eq!(to_bridge_path("C:/repo/tests", &layer), "/mnt/c/repo/tests");
        assert_eq!(to_bridge_path(r"D:\work\nginx", &layer), "/mnt/d/work/nginx");
        assert_eq!(to_bridge_path("C:/", &layer), "/mnt/c/");
    }

    #[test]
    fn inactive_layer_only_normalizes_separators() {
        let layer = WslLayer::inactive();
        assert_eq!(to_bridge_path("C:/repo/tests", &layer), "C:/repo/tests");
        assert_eq!(to_bridge_path(r"C:\repo\tests", &layer), "C:/repo/tests");
    }

    #[test]
    fn non_drive_paths_pass_through() {
        let layer = WslLayer::with_launcher("wsl.exe");
        assert_eq!(to_bridge_path("/home/user/repo", &layer), "/home/user/repo");
        assert_eq!(to_bridge_path("relative/dir", &layer), "relative/dir");
        assert_eq!(to_bridge_path("1:/odd", &layer), "1:/odd");
        assert_eq!(to_bridge_path("C:", &layer), "C:");
    }

    #[test]
    fn missing_shell_means_unavailable() {
        let cfg = BridgeConfig {
            shell: "definitely-not-a-shell-7f3a".to_string(),
            ..BridgeConfig::with_root(".")
        };
        assert!(!WslLayer::detect(&cfg).is_active());
    }

    #[cfg(unix)]
    fn passing_probe_config(launcher: &str) -> BridgeConfig {
        // `true -lc ...` exits 0, standing in for a WSL-capable bash
        BridgeConfig {
            shell: "true".to_string(),
            launcher: launcher.to_string(),
            ..BridgeConfig::with_root(".")
        }
    }

    #[cfg(unix)]
    #[test]
    fn probe_ok_and_launcher_found_is_active() {
        let exe = std::env::current_exe().unwrap();
        let layer = WslLayer::detect(&passing_probe_config(&exe.to_string_lossy()));
        assert!(layer.is_active());
        assert_eq!(layer.launcher(), Some(exe.as_path()));
    }

    #[cfg(unix)]
    #[test]
    fn probe_ok_but_launcher_missing_is_inactive() {
        let layer = WslLayer::detect(&passing_probe_config("/nonexistent/dir/wsl.exe"));
        assert!(!layer.is_active());
        let layer = WslLayer::detect(&passing_probe_config("no-such-wsl-launcher-7f3a"));
        assert!(!layer.is_active());
    }

    #[test]
    fn missing_absolute_launcher_is_not_found() {
        assert_eq!(locate_executable("/nonexistent/dir/wsl.exe"), None);
    }
}
