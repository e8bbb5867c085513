/// Native library handling for launch scripts.
///
/// Extraction itself is done by the executor; the script only names the jars
/// (`ext`) and the target directory (`natives`).
use crate::game::launcher::types::{LauncherPaths, Platform};
use crate::game::launcher::version_parser::VersionDescriptor;
use crate::utils::paths::absolute_path;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Natives directory of an instance
pub fn get_natives_dir(instance_root: &Path) -> PathBuf {
    instance_root.join("natives")
}

/// Absolute paths of the native jars to extract for the platform
pub fn native_jars(
    descriptor: &VersionDescriptor,
    paths: &LauncherPaths,
    platform: &Platform,
) -> Result<Vec<PathBuf>> {
    let libraries_dir = paths.libraries_dir();

    descriptor
        .active_native_libs(platform)
        .map(|library| {
            let relative = library
                .storage_path(platform)
                .with_context(|| format!("Resolve native jar for {}", library.name))?;
            Ok(absolute_path(&libraries_dir.join(relative)))
        })
        .collect()
}

/// Remove extracted natives after the game exits.
/// A natives directory that does not exist is not an error.
pub async fn cleanup_natives(natives_dir: &Path) -> Result<()> {
    match tokio::fs::remove_dir_all(natives_dir).await {
        Ok(()) => {
            log::debug!("Removed natives directory {:?}", natives_dir);
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Remove natives directory {:?}", natives_dir)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::launcher::types::{Arch, OsType};
    use crate::game::launcher::version_parser::parse_version_str;

    #[test]
    fn native_jars_for_platform() {
        let d = parse_version_str(
            r#"{
                "id": "1.5.2",
                "mainClass": "net.minecraft.launchwrapper.Launch",
                "libraries": [
                    { "name": "net.java.jinput:jinput-platform:2.0.5",
                      "natives": { "linux": "natives-linux", "windows": "natives-windows" } },
                    { "name": "com.example:osx-only:1.0", "natives": { "osx": "natives-osx" } },
                    { "name": "com.example:plain:1.0" }
                ]
            }"#,
        )
        .unwrap();

        let tmp = tempfile::tempdir().unwrap();
        let paths = LauncherPaths::new(tmp.path());
        let jars = native_jars(&d, &paths, &Platform::new(OsType::Linux, Arch::X64)).unwrap();
        assert_eq!(jars.len(), 1);
        assert!(jars[0].is_absolute());
        assert!(jars[0].ends_with(
            "libraries/net/java/jinput/jinput-platform/2.0.5/jinput-platform-2.0.5-natives-linux.jar"
        ));
    }

    #[tokio::test]
    async fn cleanup_removes_directory_and_tolerates_absence() {
        let tmp = tempfile::tempdir().unwrap();
        let natives = get_natives_dir(tmp.path());
        std::fs::create_dir_all(natives.join("sub")).unwrap();
        std::fs::write(natives.join("sub").join("liblwjgl.so"), b"elf").unwrap();

        cleanup_natives(&natives).await.unwrap();
        assert!(!natives.exists());

        cleanup_natives(&natives).await.unwrap();
    }
}
