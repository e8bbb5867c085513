/// Core types for building launch scripts
use crate::game::instance::settings::{keys, SettingsStore};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::watch;

/// Name used in window titles
pub const LAUNCHER_NAME: &str = "Anvil";

/// Default window geometry when the settings store has nothing usable
pub const DEFAULT_WINDOW_WIDTH: u32 = 854;
pub const DEFAULT_WINDOW_HEIGHT: u32 = 480;

/// Default number of concurrent asset copies
pub const DEFAULT_ASSET_CONCURRENCY: usize = 8;

/// Authenticated session handed in by the caller. Read-only to this crate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    /// Account login name
    pub username: String,

    /// Legacy session id ("token:<access>:<uuid>" for yggdrasil accounts)
    pub session_token: String,

    /// Access token for authentication
    pub access_token: String,

    /// In-game player name
    pub player_name: String,

    /// Player UUID
    pub uuid: String,

    /// User type ("mojang", "legacy", "msa")
    pub user_type: String,

    /// User properties already serialized to JSON by the session owner
    pub serialized_user_properties: String,
}

/// Window and copy settings for a single launch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    /// When set, no width/height parameters are emitted at all
    pub maximized: bool,

    pub window_width: u32,

    pub window_height: u32,

    /// Number of concurrent asset copies during reconstruction
    pub asset_concurrency: usize,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            maximized: false,
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            asset_concurrency: DEFAULT_ASSET_CONCURRENCY,
        }
    }
}

impl LaunchConfig {
    /// Read the launch configuration from a settings store, falling back to
    /// defaults for missing or mistyped values.
    pub fn from_settings(settings: &dyn SettingsStore) -> Self {
        let defaults = Self::default();

        let dimension = |key: &str, default: u32| {
            settings
                .get(key)
                .and_then(|v| v.as_u32())
                .filter(|v| *v > 0)
                .unwrap_or(default)
        };

        Self {
            maximized: settings
                .get(keys::LAUNCH_MAXIMIZED)
                .and_then(|v| v.as_bool())
                .unwrap_or(defaults.maximized),
            window_width: dimension(keys::WINDOW_WIDTH, defaults.window_width),
            window_height: dimension(keys::WINDOW_HEIGHT, defaults.window_height),
            asset_concurrency: settings
                .get(keys::ASSET_CONCURRENCY)
                .and_then(|v| v.as_u32())
                .map(|v| v.max(1) as usize)
                .unwrap_or(defaults.asset_concurrency),
        }
    }
}

/// Shared launcher data layout: libraries, assets and version jars
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherPaths {
    pub data_dir: PathBuf,
}

impl LauncherPaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Get the path to the libraries directory
    pub fn libraries_dir(&self) -> PathBuf {
        self.data_dir.join("libraries")
    }

    /// Get the path to the assets directory (the content-addressed store root)
    pub fn assets_dir(&self) -> PathBuf {
        self.data_dir.join("assets")
    }

    /// Get the base directory virtual asset roots are reconstructed under
    pub fn virtual_assets_dir(&self) -> PathBuf {
        self.assets_dir().join("virtual")
    }

    /// Get the path to the versions directory
    pub fn versions_dir(&self) -> PathBuf {
        self.data_dir.join("versions")
    }

    /// Main game jar for a version id: versions/<id>/<id>.jar
    pub fn version_jar(&self, version_id: &str) -> PathBuf {
        self.versions_dir()
            .join(version_id)
            .join(format!("{}.jar", version_id))
    }
}

/// Everything the script builder needs besides the descriptor and session
#[derive(Debug, Clone)]
pub struct LaunchContext {
    pub paths: LauncherPaths,

    /// Working directory of the game (the instance's minecraft root)
    pub game_dir: PathBuf,

    /// Directory natives get extracted into by the executor
    pub natives_dir: PathBuf,

    /// Instance display name, bound to ${profile_name}
    pub profile_name: String,

    pub window_title: String,

    /// Platform libraries and rules are evaluated against
    pub platform: Platform,

    pub config: LaunchConfig,
}

/// Cancellation token wrapper
#[derive(Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn new(rx: watch::Receiver<bool>) -> Self {
        Self { rx }
    }

    /// A token that is never cancelled
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Operating system types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsType {
    Windows,
    MacOS,
    Linux,
}

impl OsType {
    /// Detect the current OS
    pub fn current() -> Self {
        #[cfg(target_os = "windows")]
        return OsType::Windows;

        #[cfg(target_os = "macos")]
        return OsType::MacOS;

        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        return OsType::Linux;
    }

    /// Get the OS name as a string (for rule matching and native classifiers)
    pub fn as_str(&self) -> &'static str {
        match self {
            OsType::Windows => "windows",
            OsType::Linux => "linux",
            OsType::MacOS => "osx",
        }
    }
}

/// Architecture types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X86,
    X64,
    Arm32,
    Arm64,
}

impl Arch {
    /// Detect the current architecture
    pub fn current() -> Self {
        #[cfg(target_arch = "x86")]
        return Arch::X86;

        #[cfg(target_arch = "aarch64")]
        return Arch::Arm64;

        #[cfg(target_arch = "arm")]
        return Arch::Arm32;

        #[cfg(not(any(target_arch = "x86", target_arch = "aarch64", target_arch = "arm")))]
        return Arch::X64;
    }

    /// Name used by `os.arch` in library rules
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X86 => "x86",
            Arch::X64 => "x86_64",
            Arch::Arm32 => "arm",
            Arch::Arm64 => "aarch64",
        }
    }

    /// Bit width substituted for ${arch} in native classifiers
    pub fn bits(&self) -> &'static str {
        match self {
            Arch::X86 | Arch::Arm32 => "32",
            Arch::X64 | Arch::Arm64 => "64",
        }
    }
}

/// Target platform for library rule evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub os: OsType,
    pub arch: Arch,
}

impl Platform {
    pub fn new(os: OsType, arch: Arch) -> Self {
        Self { os, arch }
    }

    pub fn current() -> Self {
        Self::new(OsType::current(), Arch::current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::instance::settings::{MemorySettings, SettingValue};

    #[test]
    fn launch_config_defaults_when_settings_empty() {
        let settings = MemorySettings::new();
        assert_eq!(LaunchConfig::from_settings(&settings), LaunchConfig::default());
    }

    #[test]
    fn launch_config_reads_settings() {
        let mut settings = MemorySettings::new();
        settings.set(keys::LAUNCH_MAXIMIZED, SettingValue::Bool(true));
        settings.set(keys::WINDOW_WIDTH, SettingValue::Int(1280));
        settings.set(keys::WINDOW_HEIGHT, SettingValue::String("720".to_string()));
        settings.set(keys::ASSET_CONCURRENCY, SettingValue::Int(0));

        let config = LaunchConfig::from_settings(&settings);
        assert!(config.maximized);
        assert_eq!(config.window_width, 1280);
        assert_eq!(config.window_height, 720);
        assert_eq!(config.asset_concurrency, 1);
    }

    #[test]
    fn launch_config_ignores_mistyped_geometry() {
        let mut settings = MemorySettings::new();
        settings.set(keys::WINDOW_WIDTH, SettingValue::String("wide".to_string()));
        settings.set(keys::WINDOW_HEIGHT, SettingValue::Int(-5));

        let config = LaunchConfig::from_settings(&settings);
        assert_eq!(config.window_width, DEFAULT_WINDOW_WIDTH);
        assert_eq!(config.window_height, DEFAULT_WINDOW_HEIGHT);
    }

    #[test]
    fn launcher_paths_layout() {
        let paths = LauncherPaths::new("/data");
        assert_eq!(paths.libraries_dir(), PathBuf::from("/data/libraries"));
        assert_eq!(paths.virtual_assets_dir(), PathBuf::from("/data/assets/virtual"));
        assert_eq!(
            paths.version_jar("1.6.4"),
            PathBuf::from("/data/versions/1.6.4/1.6.4.jar")
        );
    }

    #[test]
    fn cancel_token_follows_sender() {
        let (tx, rx) = watch::channel(false);
        let token = CancelToken::new(rx);
        assert!(!token.is_cancelled());
        tx.send(true).unwrap();
        assert!(token.is_cancelled());
        assert!(!CancelToken::never().is_cancelled());
    }

    #[test]
    fn arch_bits() {
        assert_eq!(Arch::X86.bits(), "32");
        assert_eq!(Arch::X64.bits(), "64");
        assert_eq!(Arch::Arm64.bits(), "64");
    }
}
