/// Version descriptor (version.json / custom.json) parser
use crate::game::error::InstanceError;
use crate::game::launcher::classpath::maven_to_path;
use crate::game::launcher::rules::{rules_allow, Rule};
use crate::game::launcher::types::Platform;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Assets id used by descriptors that do not name one
pub const LEGACY_ASSETS_ID: &str = "legacy";

fn default_assets_id() -> String {
    LEGACY_ASSETS_ID.to_string()
}

/// Fully parsed version descriptor.
/// Never mutated after loading; a reload replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionDescriptor {
    /// Version ID (e.g., "1.6.4")
    pub id: String,

    /// Main class to execute
    pub main_class: String,

    /// Space-separated argument template with ${token} placeholders
    #[serde(rename = "minecraftArguments", default)]
    pub argument_template: String,

    /// Asset index id
    #[serde(rename = "assets", default = "default_assets_id")]
    pub assets_id: String,

    /// Libraries required for this version
    #[serde(default)]
    pub libraries: Vec<Library>,

    /// Version type (release, snapshot, etc.)
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "type")]
    pub version_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_launcher_version: Option<u32>,
}

/// Library definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
    /// Maven coordinates
    pub name: String,

    /// Rules for conditional inclusion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<Rule>>,

    /// Native classifiers keyed by OS name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natives: Option<BTreeMap<String, String>>,

    /// Explicit storage paths, when the descriptor carries them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloads: Option<LibraryDownloads>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryDownloads {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<Artifact>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifiers: Option<BTreeMap<String, Artifact>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Library {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// True when this library ships native code to extract rather than classes
    pub fn is_native(&self) -> bool {
        self.natives.as_ref().is_some_and(|n| !n.is_empty())
    }

    /// Native classifier for the platform, with ${arch} replaced by the bit width
    pub fn native_classifier(&self, platform: &Platform) -> Option<String> {
        self.natives
            .as_ref()?
            .get(platform.os.as_str())
            .map(|c| c.replace("${arch}", platform.arch.bits()))
    }

    /// Whether the library applies to the platform: its rules allow it and,
    /// for natives, a classifier exists for the platform's OS.
    pub fn is_active(&self, platform: &Platform) -> bool {
        let rules = self.rules.as_deref().unwrap_or(&[]);
        if !rules_allow(rules, platform) {
            return false;
        }
        !self.is_native() || self.native_classifier(platform).is_some()
    }

    /// Path of the library jar relative to the libraries directory
    pub fn storage_path(&self, platform: &Platform) -> Result<String> {
        let downloads = self.downloads.as_ref();

        if self.is_native() {
            let classifier = self.native_classifier(platform).ok_or_else(|| {
                anyhow::anyhow!(
                    "Library {} has no native classifier for {}",
                    self.name,
                    platform.os.as_str()
                )
            })?;

            if let Some(path) = downloads
                .and_then(|d| d.classifiers.as_ref())
                .and_then(|c| c.get(&classifier))
                .and_then(|a| a.path.clone())
            {
                return Ok(path);
            }

            return maven_to_path(&format!("{}:{}", self.name, classifier));
        }

        if let Some(path) = downloads
            .and_then(|d| d.artifact.as_ref())
            .and_then(|a| a.path.clone())
        {
            return Ok(path);
        }

        maven_to_path(&self.name)
    }
}

impl VersionDescriptor {
    /// Libraries active on the platform that go on the classpath
    pub fn active_normal_libs(&self, platform: &Platform) -> impl Iterator<Item = &Library> + '_ {
        let platform = *platform;
        self.libraries
            .iter()
            .filter(move |l| !l.is_native() && l.is_active(&platform))
    }

    /// Libraries active on the platform whose natives get extracted
    pub fn active_native_libs(&self, platform: &Platform) -> impl Iterator<Item = &Library> + '_ {
        let platform = *platform;
        self.libraries
            .iter()
            .filter(move |l| l.is_native() && l.is_active(&platform))
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("missing version id".to_string());
        }
        if self.main_class.trim().is_empty() {
            return Err("missing main class".to_string());
        }
        if let Some(lib) = self.libraries.iter().find(|l| l.name.trim().is_empty()) {
            return Err(format!("library without a name: {:?}", lib));
        }
        Ok(())
    }
}

/// Parse a version descriptor from JSON text
pub fn parse_version_str(content: &str) -> Result<VersionDescriptor> {
    let descriptor: VersionDescriptor =
        serde_json::from_str(content).context("Failed to parse version descriptor")?;
    descriptor.validate().map_err(|reason| anyhow::anyhow!(reason))?;
    Ok(descriptor)
}

/// Parse a version descriptor file.
///
/// Any read or parse problem is reported as [`InstanceError::InvalidDescriptor`];
/// no partially populated descriptor is ever returned.
pub fn parse_version_json(path: &Path) -> Result<VersionDescriptor> {
    let content = std::fs::read_to_string(path).map_err(|e| InstanceError::InvalidDescriptor {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    parse_version_str(&content).map_err(|e| {
        InstanceError::InvalidDescriptor {
            path: path.to_path_buf(),
            reason: format!("{:#}", e),
        }
        .into()
    })
}
