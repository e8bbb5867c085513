/// Version descriptor resolution with custom overlays
use crate::game::error::InstanceError;
use crate::game::launcher::version_parser::{parse_version_json, VersionDescriptor};
use anyhow::Result;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Descriptor file written by the updater
pub const CANONICAL_FILE: &str = "version.json";

/// User-customized descriptor that takes precedence over the canonical one
pub const OVERLAY_FILE: &str = "custom.json";

pub fn canonical_path(instance_root: &Path) -> PathBuf {
    instance_root.join(CANONICAL_FILE)
}

pub fn overlay_path(instance_root: &Path) -> PathBuf {
    instance_root.join(OVERLAY_FILE)
}

/// The descriptor file currently in effect: the overlay if it exists,
/// otherwise the canonical file.
pub fn resolve_active_path(instance_root: &Path) -> PathBuf {
    let overlay = overlay_path(instance_root);
    if overlay.exists() {
        overlay
    } else {
        canonical_path(instance_root)
    }
}

/// Tracks the active version descriptor of one instance root.
///
/// Holds either a complete descriptor or none at all. A failed reload clears
/// the previous descriptor rather than keeping a stale one.
#[derive(Debug)]
pub struct VersionResolver {
    instance_root: PathBuf,
    descriptor: Option<VersionDescriptor>,
}

impl VersionResolver {
    /// Create a resolver without loading anything yet
    pub fn new(instance_root: impl Into<PathBuf>) -> Self {
        Self {
            instance_root: instance_root.into(),
            descriptor: None,
        }
    }

    /// Parse a descriptor file
    pub fn load(path: &Path) -> Result<VersionDescriptor> {
        parse_version_json(path)
    }

    pub fn instance_root(&self) -> &Path {
        &self.instance_root
    }

    /// Currently loaded descriptor, if any
    pub fn descriptor(&self) -> Option<&VersionDescriptor> {
        self.descriptor.as_ref()
    }

    /// Whether a custom overlay exists
    pub fn is_custom(&self) -> bool {
        overlay_path(&self.instance_root).exists()
    }

    /// Re-read the active descriptor file.
    /// On failure the held descriptor is cleared.
    pub fn reload(&mut self) -> Result<()> {
        let path = resolve_active_path(&self.instance_root);

        match Self::load(&path) {
            Ok(descriptor) => {
                log::debug!(
                    "[instance:{}] loaded version {} from {:?}",
                    self.instance_root.display(),
                    descriptor.id,
                    path
                );
                self.descriptor = Some(descriptor);
                Ok(())
            }
            Err(e) => {
                log::warn!(
                    "[instance:{}] failed to load version descriptor: {:#}",
                    self.instance_root.display(),
                    e
                );
                self.descriptor = None;
                Err(e)
            }
        }
    }

    /// Copy the canonical descriptor to a custom overlay and reload from it.
    /// Does nothing when an overlay already exists.
    pub fn customize(&mut self) -> Result<()> {
        if self.is_custom() {
            return Ok(());
        }

        let from = canonical_path(&self.instance_root);
        let to = overlay_path(&self.instance_root);
        log::info!(
            "[instance:{}] customizing version: {:?} -> {:?}",
            self.instance_root.display(),
            from,
            to
        );

        // Copy next to the overlay and rename it into place, so a failed
        // copy never leaves a partial overlay that would become authoritative.
        let tmp = self.instance_root.join(format!("{}.part", OVERLAY_FILE));
        let copied = std::fs::copy(&from, &tmp).and_then(|_| std::fs::rename(&tmp, &to));
        if let Err(source) = copied {
            let _ = std::fs::remove_file(&tmp);
            return Err(InstanceError::OverlayCopy { from, to, source }.into());
        }

        self.reload()
    }

    /// Delete the custom overlay and reload from the canonical descriptor.
    /// Does nothing when no overlay exists.
    pub fn revert(&mut self) -> Result<()> {
        if !self.is_custom() {
            return Ok(());
        }

        let path = overlay_path(&self.instance_root);
        log::info!(
            "[instance:{}] reverting custom version {:?}",
            self.instance_root.display(),
            path
        );

        if let Err(source) = std::fs::remove_file(&path) {
            return Err(InstanceError::OverlayRemove { path, source }.into());
        }

        self.reload()
    }

    /// Delete both descriptor files and drop the loaded descriptor.
    /// Used when the intended version changes and the updater must fetch a new one.
    pub fn discard_version_files(&mut self) -> Result<()> {
        self.descriptor = None;

        for path in [
            overlay_path(&self.instance_root),
            canonical_path(&self.instance_root),
        ] {
            match std::fs::remove_file(&path) {
                Ok(()) => log::debug!(
                    "[instance:{}] removed {:?}",
                    self.instance_root.display(),
                    path
                ),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(source) => return Err(InstanceError::OverlayRemove { path, source }.into()),
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_descriptor(path: &Path, id: &str) {
        std::fs::write(
            path,
            format!(
                r#"{{"id": "{}", "mainClass": "net.minecraft.client.main.Main", "minecraftArguments": "--username ${{auth_player_name}}"}}"#,
                id
            ),
        )
        .unwrap();
    }

    #[test]
    fn active_path_prefers_overlay() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(resolve_active_path(tmp.path()), canonical_path(tmp.path()));

        write_descriptor(&overlay_path(tmp.path()), "custom");
        assert_eq!(resolve_active_path(tmp.path()), overlay_path(tmp.path()));
    }

    #[test]
    fn reload_failure_clears_descriptor() {
        let tmp = tempfile::tempdir().unwrap();
        write_descriptor(&canonical_path(tmp.path()), "1.6.4");

        let mut resolver = VersionResolver::new(tmp.path());
        resolver.reload().unwrap();
        assert_eq!(resolver.descriptor().map(|d| d.id.as_str()), Some("1.6.4"));

        std::fs::write(canonical_path(tmp.path()), "garbage").unwrap();
        assert!(resolver.reload().is_err());
        assert!(resolver.descriptor().is_none());

        write_descriptor(&canonical_path(tmp.path()), "1.6.4");
        resolver.reload().unwrap();
        assert!(resolver.descriptor().is_some());
    }

    #[test]
    fn customize_without_canonical_fails_cleanly() {
        let tmp = tempfile::tempdir().unwrap();
        let mut resolver = VersionResolver::new(tmp.path());

        let err = resolver.customize().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InstanceError>(),
            Some(InstanceError::OverlayCopy { .. })
        ));
        assert!(!resolver.is_custom());
        assert!(!tmp.path().join("custom.json.part").exists());
    }

    #[test]
    fn customize_and_revert_are_noops_in_target_state() {
        let tmp = tempfile::tempdir().unwrap();
        write_descriptor(&canonical_path(tmp.path()), "1.6.4");
        let mut resolver = VersionResolver::new(tmp.path());

        // revert without overlay: success, nothing touched, nothing loaded
        resolver.revert().unwrap();
        assert!(resolver.descriptor().is_none());

        resolver.customize().unwrap();
        assert!(resolver.is_custom());

        // second customize must not re-copy over a hand-edited overlay
        write_descriptor(&overlay_path(tmp.path()), "edited");
        resolver.customize().unwrap();
        resolver.reload().unwrap();
        assert_eq!(resolver.descriptor().map(|d| d.id.as_str()), Some("edited"));
    }

    #[test]
    fn discard_removes_both_files() {
        let tmp = tempfile::tempdir().unwrap();
        write_descriptor(&canonical_path(tmp.path()), "1.6.4");
        let mut resolver = VersionResolver::new(tmp.path());
        resolver.customize().unwrap();

        resolver.discard_version_files().unwrap();
        assert!(resolver.descriptor().is_none());
        assert!(!canonical_path(tmp.path()).exists());
        assert!(!overlay_path(tmp.path()).exists());

        // idempotent
        resolver.discard_version_files().unwrap();
    }
}
