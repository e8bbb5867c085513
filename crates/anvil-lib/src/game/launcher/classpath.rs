/// Classpath construction for launch scripts
use crate::game::launcher::types::{LauncherPaths, Platform};
use crate::game::launcher::version_parser::VersionDescriptor;
use crate::utils::paths::absolute_path;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Build the ordered classpath: every active non-native library, then the
/// version's main jar. Paths are absolute; existence is not checked here.
pub fn build_classpath(
    descriptor: &VersionDescriptor,
    paths: &LauncherPaths,
    platform: &Platform,
) -> Result<Vec<PathBuf>> {
    let libraries_dir = paths.libraries_dir();
    let mut entries = Vec::new();

    for library in descriptor.active_normal_libs(platform) {
        let relative = library
            .storage_path(platform)
            .with_context(|| format!("Resolve storage path for {}", library.name))?;
        entries.push(absolute_path(&libraries_dir.join(relative)));
    }

    entries.push(absolute_path(&paths.version_jar(&descriptor.id)));

    log::debug!(
        "Classpath for {} has {} entries",
        descriptor.id,
        entries.len()
    );

    Ok(entries)
}

/// Convert Maven coordinates to file path
/// Format: group:artifact:version[:classifier][@extension]
/// Example: "com.google.guava:guava:21.0" -> "com/google/guava/guava/21.0/guava-21.0.jar"
pub fn maven_to_path(coords: &str) -> Result<String> {
    let parts: Vec<&str> = coords.split(':').collect();

    if parts.len() < 3 || parts.iter().any(|p| p.is_empty()) {
        anyhow::bail!("Invalid Maven coordinates: {}", coords);
    }

    let group = parts[0].replace('.', "/");
    let artifact = parts[1];
    let mut version = parts[2];
    let mut classifier = None;
    let mut extension = "jar";

    if parts.len() == 3 {
        // group:artifact:version@extension
        if let Some((v, ext)) = version.split_once('@') {
            version = v;
            extension = ext;
        }
    } else {
        // group:artifact:version:classifier[@extension]
        if let Some((clf, ext)) = parts[3].split_once('@') {
            classifier = Some(clf);
            extension = ext;
        } else {
            classifier = Some(parts[3]);
        }
    }

    let filename = if let Some(clf) = classifier {
        format!("{}-{}-{}.{}", artifact, version, clf, extension)
    } else {
        format!("{}-{}.{}", artifact, version, extension)
    };

    Ok(format!("{}/{}/{}/{}", group, artifact, version, filename))
}
