//! A single game instance: its root directory, version state and launch entry point.
//!
//! The instance owns a [`VersionResolver`] for its root and reads/writes
//! persisted state through a caller-supplied [`SettingsStore`]. Operations are
//! expected to be driven sequentially by one owner.

pub mod resolver;
pub mod settings;

use crate::game::error::InstanceError;
use crate::game::launcher::natives::{cleanup_natives, get_natives_dir};
use crate::game::launcher::script::{build_launch_script, LaunchScript};
use crate::game::launcher::types::{
    AuthSession, CancelToken, LaunchConfig, LaunchContext, LauncherPaths, Platform, LAUNCHER_NAME,
};
use crate::game::launcher::version_parser::VersionDescriptor;
use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub use resolver::{resolve_active_path, VersionResolver};
pub use settings::{keys, MemorySettings, SettingValue, SettingsStore};

/// Snapshot of the persisted and derived version state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceState {
    pub intended_version_id: String,
    pub should_update: bool,
    pub has_custom_overlay: bool,
}

pub struct Instance {
    root: PathBuf,
    name: String,
    paths: LauncherPaths,
    settings: Box<dyn SettingsStore>,
    resolver: VersionResolver,
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("root", &self.root)
            .field("name", &self.name)
            .field("paths", &self.paths)
            .field("resolver", &self.resolver)
            .finish()
    }
}

impl Instance {
    /// Open an instance rooted at `root`, using `data_dir` as the shared
    /// launcher data layout. The active descriptor is loaded immediately;
    /// a missing or malformed one leaves the instance without a descriptor.
    pub fn new(
        root: impl Into<PathBuf>,
        name: impl Into<String>,
        data_dir: impl Into<PathBuf>,
        settings: Box<dyn SettingsStore>,
    ) -> Self {
        let root = root.into();
        let mut instance = Self {
            resolver: VersionResolver::new(root.clone()),
            root,
            name: name.into(),
            paths: LauncherPaths::new(data_dir),
            settings,
        };

        if instance.resolver.reload().is_err() {
            log::info!(
                "[instance:{}] no usable version descriptor yet",
                instance.root.display()
            );
        }

        instance
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn paths(&self) -> &LauncherPaths {
        &self.paths
    }

    pub fn settings(&self) -> &dyn SettingsStore {
        self.settings.as_ref()
    }

    pub fn settings_mut(&mut self) -> &mut dyn SettingsStore {
        self.settings.as_mut()
    }

    /// Currently loaded descriptor, if any
    pub fn descriptor(&self) -> Option<&VersionDescriptor> {
        self.resolver.descriptor()
    }

    // ---- version state ----

    /// Version the user asked for; empty when never set
    pub fn intended_version_id(&self) -> String {
        self.settings
            .get(keys::INTENDED_VERSION)
            .map(|v| v.to_string_value())
            .unwrap_or_default()
    }

    /// Switch the intended version.
    ///
    /// Forces an update and deletes both descriptor files, so the instance has
    /// no descriptor until the updater writes a new canonical one.
    pub fn set_intended_version_id(&mut self, version_id: &str) -> Result<()> {
        log::info!(
            "[instance:{}] intended version -> {}",
            self.root.display(),
            version_id
        );

        self.settings
            .set(keys::INTENDED_VERSION, SettingValue::from(version_id));
        self.settings.set(keys::SHOULD_UPDATE, SettingValue::Bool(true));
        self.resolver.discard_version_files()
    }

    /// Store the explicit update flag. Clearing it does not hide a version mismatch.
    pub fn set_should_update(&mut self, value: bool) {
        self.settings.set(keys::SHOULD_UPDATE, SettingValue::Bool(value));
    }

    /// True when explicitly flagged or when the loaded version differs from
    /// the intended one.
    pub fn should_update(&self) -> bool {
        let flagged = self
            .settings
            .get(keys::SHOULD_UPDATE)
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        flagged || self.intended_version_id() != self.current_version_id()
    }

    /// Id of the loaded descriptor, or the intended id when none is loaded
    pub fn current_version_id(&self) -> String {
        match self.resolver.descriptor() {
            Some(descriptor) => descriptor.id.clone(),
            None => self.intended_version_id(),
        }
    }

    pub fn version_is_custom(&self) -> bool {
        self.resolver.is_custom()
    }

    pub fn state(&self) -> InstanceState {
        InstanceState {
            intended_version_id: self.intended_version_id(),
            should_update: self.should_update(),
            has_custom_overlay: self.version_is_custom(),
        }
    }

    /// Copy the canonical descriptor into an editable overlay
    pub fn customize_version(&mut self) -> Result<()> {
        self.resolver.customize()
    }

    /// Drop the overlay and go back to the canonical descriptor
    pub fn revert_custom_version(&mut self) -> Result<()> {
        self.resolver.revert()
    }

    /// Re-read the active descriptor, e.g. after the updater replaced it
    pub fn reload_version(&mut self) -> Result<()> {
        self.resolver.reload()
    }

    // ---- directories ----

    /// Game working directory
    pub fn minecraft_root(&self) -> PathBuf {
        self.root.join("minecraft")
    }

    pub fn loader_mods_dir(&self) -> PathBuf {
        self.minecraft_root().join("mods")
    }

    pub fn resource_packs_dir(&self) -> PathBuf {
        self.minecraft_root().join("resourcepacks")
    }

    pub fn instance_config_dir(&self) -> PathBuf {
        self.minecraft_root().join("config")
    }

    pub fn natives_dir(&self) -> PathBuf {
        get_natives_dir(&self.root)
    }

    /// Shared jar for the intended version
    pub fn default_base_jar(&self) -> PathBuf {
        self.paths.version_jar(&self.intended_version_id())
    }

    pub fn default_custom_base_jar(&self) -> PathBuf {
        self.root.join("custom.jar")
    }

    // ---- launch ----

    /// Short human-readable description, e.g. `One Six : 1.6.4 (custom)`
    pub fn status_description(&self) -> String {
        let mut description = format!("One Six : {}", self.intended_version_id());
        if self.version_is_custom() {
            description.push_str(" (custom)");
        }
        description
    }

    pub fn window_title(&self) -> String {
        format!("{}: {}", LAUNCHER_NAME, self.name)
    }

    /// Launch context for the host platform with settings-derived window config
    pub fn launch_context(&self) -> LaunchContext {
        LaunchContext {
            paths: self.paths.clone(),
            game_dir: self.minecraft_root(),
            natives_dir: self.natives_dir(),
            profile_name: self.name.clone(),
            window_title: self.window_title(),
            platform: Platform::current(),
            config: LaunchConfig::from_settings(self.settings.as_ref()),
        }
    }

    /// Build the launch script for the loaded descriptor.
    /// Fails with [`InstanceError::NoDescriptor`] when none is loaded.
    pub async fn prepare_for_launch(
        &self,
        session: &AuthSession,
        cancel: &CancelToken,
    ) -> Result<LaunchScript> {
        let descriptor = self.descriptor().ok_or(InstanceError::NoDescriptor)?;
        build_launch_script(descriptor, session, &self.launch_context(), cancel).await
    }

    /// Remove extracted natives once the game has exited
    pub async fn cleanup_after_run(&self) -> Result<()> {
        cleanup_natives(&self.natives_dir()).await
    }
}
