use std::path::{Path, PathBuf};

use crate::filter::word_count::Valves;

pub const DEFAULT_SCRIPT: &str = "tests/run_all_tests.sh";
pub const DEFAULT_SHELL: &str = "bash";
pub const DEFAULT_LAUNCHER: &str = "wsl.exe";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Repository the script suite runs from
    pub repo_root: PathBuf,
    /// Script path relative to `repo_root`
    pub script_rel: String,
    pub shell: String,
    /// Executable that enters the secondary OS layer
    pub launcher: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            repo_root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            script_rel: DEFAULT_SCRIPT.to_string(),
            shell: DEFAULT_SHELL.to_string(),
            launcher: DEFAULT_LAUNCHER.to_string(),
        }
    }
}

impl BridgeConfig {
    pub fn with_root(repo_root: impl Into<PathBuf>) -> Self {
        Self { repo_root: repo_root.into(), ..Self::default() }
    }

    pub fn script_path(&self) -> PathBuf {
        self.repo_root.join(&self.script_rel)
    }
}

/// Load `.env` sitting next to the executable, if any. Missing or broken files are skipped.
pub fn load_dotenv() {
    let Ok(exe_path) = std::env::current_exe() else { return };
    let Some(exe_dir) = exe_path.parent() else { return };
    let env_file = exe_dir.join(".env");
    if env_file.exists() {
        if let Err(e) = dotenvy::from_path(&env_file) {
            tracing::warn!(path=%env_file.display(), error=%e, "Cannot load .env");
        }
    }
}

fn config_file_path() -> PathBuf {
    std::env::var("HOOKS_CONFIG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".hooks-config.json"))
}

fn read_config_json(path: &Path) -> Option<serde_json::Value> {
    let text = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::warn!(path=%path.display(), error=%e, "Ignoring malformed hooks config");
            None
        }
    }
}

pub fn load_bridge_config() -> BridgeConfig {
    let mut cfg = BridgeConfig::default();

    if let Ok(val) = std::env::var("BRIDGE_REPO_ROOT") {
        if !val.trim().is_empty() {
            cfg.repo_root = PathBuf::from(val);
        }
    }
    if let Ok(val) = std::env::var("BRIDGE_SCRIPT") {
        if !val.trim().is_empty() {
            cfg.script_rel = val;
        }
    }
    if let Ok(val) = std::env::var("BRIDGE_SHELL") {
        if !val.trim().is_empty() {
            cfg.shell = val;
        }
    }
    if let Ok(val) = std::env::var("BRIDGE_WSL_LAUNCHER") {
        if !val.trim().is_empty() {
            cfg.launcher = val;
        }
    }

    // Optional JSON config file: path from HOOKS_CONFIG_FILE or .hooks-config.json in CWD
    if let Some(json) = read_config_json(&config_file_path()) {
        apply_bridge_json(&mut cfg, &json);
    }

    cfg
}

/// Overlay the `"bridge"` section of a hooks config document onto `cfg`
pub fn apply_bridge_json(cfg: &mut BridgeConfig, json: &serde_json::Value) {
    let Some(bridge) = json.get("bridge") else { return };
    let field = |name: &str| {
        bridge
            .get(name)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    if let Some(root) = field("repo_root") {
        cfg.repo_root = PathBuf::from(root);
    }
    if let Some(script) = field("script_rel") {
        cfg.script_rel = script;
    }
    if let Some(shell) = field("shell") {
        cfg.shell = shell;
    }
    if let Some(launcher) = field("launcher") {
        cfg.launcher = launcher;
    }
}

/// Word-count filter settings from the `"word_count"` section, defaults otherwise
pub fn load_valves() -> Valves {
    read_config_json(&config_file_path())
        .and_then(|json| json.get("word_count").cloned())
        .and_then(|section| serde_json::from_value(section).ok())
        .unwrap_or_default()
}
