/// Asset index files and the content-addressed object layout
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Parsed `indexes/<assets id>.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetIndex {
    /// Whether the runtime expects a flat virtual directory instead of the object store
    #[serde(default, rename = "virtual")]
    pub is_virtual: bool,

    /// Virtual path -> stored object
    #[serde(default)]
    pub objects: BTreeMap<String, AssetObject>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetObject {
    pub hash: String,
    pub size: u64,
}

impl AssetObject {
    /// Hashes must be hex and long enough to have a two-character bucket
    pub fn has_valid_hash(&self) -> bool {
        self.hash.len() >= 2 && self.hash.bytes().all(|b| b.is_ascii_hexdigit())
    }

    /// Location of the blob: objects/<first two hex chars>/<hash>
    pub fn object_path(&self, objects_dir: &Path) -> PathBuf {
        objects_dir.join(&self.hash[..2]).join(&self.hash)
    }
}

/// Path of the index file for an assets id under the store root
pub fn index_path(store_root: &Path, assets_id: &str) -> PathBuf {
    store_root
        .join("indexes")
        .join(format!("{}.json", assets_id))
}

/// Object directory under the store root
pub fn objects_dir(store_root: &Path) -> PathBuf {
    store_root.join("objects")
}

/// Read and parse an asset index file
pub async fn load_asset_index(path: &Path) -> Result<AssetIndex> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read asset index {:?}", path))?;
    serde_json::from_slice(&bytes).with_context(|| format!("Failed to parse asset index {:?}", path))
}

/// Relative path for a virtual asset name, or None when the name would
/// escape the virtual root (absolute paths, `..`, drive prefixes).
pub fn safe_virtual_path(name: &str) -> Option<PathBuf> {
    let path = Path::new(name);
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if out.as_os_str().is_empty() {
        None
    } else {
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_virtual_index() {
        let index: AssetIndex = serde_json::from_str(
            r#"{
                "virtual": true,
                "objects": {
                    "sounds/click.ogg": { "hash": "abc1230000000000000000000000000000000000", "size": 10 },
                    "lang/en_US.lang": { "hash": "ff00000000000000000000000000000000000000", "size": 3 }
                }
            }"#,
        )
        .unwrap();

        assert!(index.is_virtual);
        assert_eq!(index.objects.len(), 2);
        assert_eq!(index.objects["sounds/click.ogg"].size, 10);
    }

    #[test]
    fn virtual_defaults_to_false() {
        let index: AssetIndex = serde_json::from_str(r#"{"objects": {}}"#).unwrap();
        assert!(!index.is_virtual);
    }

    #[test]
    fn object_path_uses_hash_bucket() {
        let object = AssetObject {
            hash: "abc123".to_string(),
            size: 1,
        };
        assert_eq!(
            object.object_path(Path::new("store/objects")),
            PathBuf::from("store/objects/ab/abc123")
        );
    }

    #[test]
    fn hash_validation() {
        let valid = AssetObject { hash: "0a".to_string(), size: 0 };
        let short = AssetObject { hash: "a".to_string(), size: 0 };
        let escape = AssetObject { hash: "../etc".to_string(), size: 0 };
        assert!(valid.has_valid_hash());
        assert!(!short.has_valid_hash());
        assert!(!escape.has_valid_hash());
    }

    #[test]
    fn virtual_paths_cannot_escape() {
        assert_eq!(
            safe_virtual_path("sounds/./click.ogg"),
            Some(PathBuf::from("sounds/click.ogg"))
        );
        assert_eq!(safe_virtual_path("../outside.txt"), None);
        assert_eq!(safe_virtual_path("sounds/../../x"), None);
        assert_eq!(safe_virtual_path("/etc/passwd"), None);
        assert_eq!(safe_virtual_path(""), None);
    }

    #[test]
    fn index_location() {
        assert_eq!(
            index_path(Path::new("assets"), "legacy"),
            PathBuf::from("assets/indexes/legacy.json")
        );
    }
}
