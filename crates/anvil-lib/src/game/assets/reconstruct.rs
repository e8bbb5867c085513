//! Legacy virtual asset directory reconstruction.
//!
//! Older runtimes read assets from a flat directory keyed by virtual path.
//! The launcher keeps assets in a content-addressed store instead, so the
//! flat layout is rebuilt on demand by copying blobs out of the store.
//!
//! Targets that already exist are never checked against their hash: a blob's
//! name is its content hash, so a file copied from it once stays correct.

use crate::game::assets::index::{
    index_path, load_asset_index, objects_dir, safe_virtual_path,
};
use crate::game::launcher::types::{CancelToken, LauncherPaths, DEFAULT_ASSET_CONCURRENCY};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// How a reconstruction run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconstructOutcome {
    /// No index file for the assets id; nothing was prepared
    NoIndex,
    /// The index could not be parsed; nothing was written
    InvalidIndex,
    /// The index is not virtual; assets are read from the store directly
    NotVirtual,
    /// Every entry was processed
    Reconstructed,
    /// Cancelled between copies; the tree is partially populated
    Cancelled,
}

/// Result of a reconstruction run. None of these conditions are fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructReport {
    /// Virtual root for the assets id, whether or not it was populated
    pub virtual_root: PathBuf,
    pub outcome: ReconstructOutcome,
    /// Files copied from the store in this run
    pub copied: usize,
    /// Targets that already existed and were left alone
    pub existing: usize,
    /// Entries whose blob is not in the store
    pub missing_blobs: usize,
    /// Entries with an unusable hash or path
    pub invalid_entries: usize,
    /// Entries whose path resolves to a target another entry already claimed
    pub duplicate_entries: usize,
    /// Entries whose copy failed
    pub failed: usize,
}

impl ReconstructReport {
    fn new(virtual_root: PathBuf, outcome: ReconstructOutcome) -> Self {
        Self {
            virtual_root,
            outcome,
            copied: 0,
            existing: 0,
            missing_blobs: 0,
            invalid_entries: 0,
            duplicate_entries: 0,
            failed: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryResult {
    Copied,
    Existing,
    MissingBlob,
    Failed,
    Cancelled,
}

/// Rebuilds `<virtual base>/<assets id>/` from `<store>/objects`.
#[derive(Debug, Clone)]
pub struct AssetReconstructor {
    store_root: PathBuf,
    virtual_base: PathBuf,
    concurrency: usize,
    cancel: CancelToken,
}

impl AssetReconstructor {
    pub fn new(store_root: impl Into<PathBuf>, virtual_base: impl Into<PathBuf>) -> Self {
        Self {
            store_root: store_root.into(),
            virtual_base: virtual_base.into(),
            concurrency: DEFAULT_ASSET_CONCURRENCY,
            cancel: CancelToken::never(),
        }
    }

    /// Reconstructor over the launcher's shared assets directory
    pub fn from_paths(paths: &LauncherPaths) -> Self {
        Self::new(paths.assets_dir(), paths.virtual_assets_dir())
    }

    /// Number of copies allowed in flight at once
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Token checked before every copy
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Virtual root for an assets id
    pub fn virtual_root(&self, assets_id: &str) -> PathBuf {
        self.virtual_base.join(assets_id)
    }

    /// Reconstruct the virtual directory for `assets_id`.
    ///
    /// Always returns the virtual root; the outcome and counters describe
    /// how much of it was prepared.
    pub async fn reconstruct(&self, assets_id: &str) -> ReconstructReport {
        let virtual_root = self.virtual_root(assets_id);
        let index_file = index_path(&self.store_root, assets_id);

        if !tokio::fs::try_exists(&index_file).await.unwrap_or(false) {
            log::error!(
                "[assets:{}] No assets index file {:?}; can't reconstruct assets",
                assets_id,
                index_file
            );
            return ReconstructReport::new(virtual_root, ReconstructOutcome::NoIndex);
        }

        let index = match load_asset_index(&index_file).await {
            Ok(index) => index,
            Err(e) => {
                log::warn!("[assets:{}] {:#}", assets_id, e);
                return ReconstructReport::new(virtual_root, ReconstructOutcome::InvalidIndex);
            }
        };

        if !index.is_virtual {
            log::debug!(
                "[assets:{}] Index is not virtual; no reconstruction needed",
                assets_id
            );
            return ReconstructReport::new(virtual_root, ReconstructOutcome::NotVirtual);
        }

        log::info!(
            "[assets:{}] Reconstructing virtual assets folder at {:?} ({} objects)",
            assets_id,
            virtual_root,
            index.objects.len()
        );

        let mut report = ReconstructReport::new(virtual_root.clone(), ReconstructOutcome::Reconstructed);
        let objects = objects_dir(&self.store_root);

        let mut jobs = Vec::with_capacity(index.objects.len());
        let mut claimed = HashSet::new();
        for (name, object) in index.objects {
            let relative = match safe_virtual_path(&name) {
                Some(p) if object.has_valid_hash() => p,
                _ => {
                    log::warn!(
                        "[assets:{}] Skipping invalid entry {:?} (hash {:?})",
                        assets_id,
                        name,
                        object.hash
                    );
                    report.invalid_entries += 1;
                    continue;
                }
            };
            // `a/./b` and `a/b` name the same file; only one job may write it
            let target = virtual_root.join(relative);
            if !claimed.insert(target.clone()) {
                log::debug!("[assets:{}] Skipping duplicate entry {:?}", assets_id, name);
                report.duplicate_entries += 1;
                continue;
            }
            jobs.push((object.object_path(&objects), target));
        }

        let results: Vec<EntryResult> = stream::iter(jobs)
            .map(|(blob, target)| {
                let cancel = self.cancel.clone();
                async move { materialize(assets_id, &blob, &target, &cancel).await }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        for result in results {
            match result {
                EntryResult::Copied => report.copied += 1,
                EntryResult::Existing => report.existing += 1,
                EntryResult::MissingBlob => report.missing_blobs += 1,
                EntryResult::Failed => report.failed += 1,
                EntryResult::Cancelled => report.outcome = ReconstructOutcome::Cancelled,
            }
        }

        if report.outcome == ReconstructOutcome::Cancelled {
            log::warn!(
                "[assets:{}] Reconstruction cancelled after {} copies",
                assets_id,
                report.copied
            );
            return report;
        }

        self.mark_last_used(assets_id).await;

        log::info!(
            "[assets:{}] Reconstruction done: {} copied, {} existing, {} missing blobs, {} failed",
            assets_id,
            report.copied,
            report.existing,
            report.missing_blobs,
            report.failed
        );

        report
    }

    /// Marker recording when a virtual root was last prepared.
    /// Kept beside the root so the reconstructed tree itself is unchanged.
    pub fn last_used_marker(&self, assets_id: &str) -> PathBuf {
        self.virtual_base.join(format!("{}.lastused", assets_id))
    }

    async fn mark_last_used(&self, assets_id: &str) {
        let marker = self.last_used_marker(assets_id);
        let stamp = chrono::Utc::now().to_rfc3339();

        let written = async {
            tokio::fs::create_dir_all(&self.virtual_base).await?;
            tokio::fs::write(&marker, stamp).await
        }
        .await;

        if let Err(e) = written {
            log::debug!("[assets:{}] Could not write {:?}: {}", assets_id, marker, e);
        }
    }
}

/// Copy one blob to its virtual target unless the target exists already
async fn materialize(
    assets_id: &str,
    blob: &Path,
    target: &Path,
    cancel: &CancelToken,
) -> EntryResult {
    if cancel.is_cancelled() {
        return EntryResult::Cancelled;
    }

    if !tokio::fs::try_exists(blob).await.unwrap_or(false) {
        log::debug!("[assets:{}] Asset blob missing from store: {:?}", assets_id, blob);
        return EntryResult::MissingBlob;
    }

    if tokio::fs::try_exists(target).await.unwrap_or(false) {
        return EntryResult::Existing;
    }

    if let Some(parent) = target.parent() {
        // create_dir_all treats a directory created concurrently as success
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            log::warn!(
                "[assets:{}] Failed to create asset directory {:?}: {}",
                assets_id,
                parent,
                e
            );
            return EntryResult::Failed;
        }
    }

    match copy_into_place(blob, target).await {
        Ok(()) => {
            log::debug!("[assets:{}] Copied {:?} to {:?}", assets_id, blob, target);
            EntryResult::Copied
        }
        Err(e) => {
            log::warn!(
                "[assets:{}] Failed to copy {:?} to {:?}: {}",
                assets_id,
                blob,
                target,
                e
            );
            EntryResult::Failed
        }
    }
}

/// Copy to a sibling `.part` file, then rename it over the target so an
/// interrupted copy never leaves a truncated target behind.
async fn copy_into_place(blob: &Path, target: &Path) -> std::io::Result<()> {
    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let tmp_path = target.with_file_name(format!("{}.part", file_name));

    if let Err(e) = tokio::fs::copy(blob, &tmp_path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(e);
    }

    if let Err(e) = tokio::fs::rename(&tmp_path, target).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(e);
    }

    Ok(())
}
