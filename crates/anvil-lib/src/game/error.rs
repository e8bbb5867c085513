use std::path::PathBuf;

/// Conditions callers of the instance and launch APIs branch on.
///
/// These are returned wrapped in `anyhow::Error`; use
/// `err.downcast_ref::<InstanceError>()` to inspect them.
#[derive(Debug, thiserror::Error)]
pub enum InstanceError {
    #[error("No version descriptor is loaded for this instance")]
    NoDescriptor,

    #[error("Invalid version descriptor {path:?}: {reason}")]
    InvalidDescriptor { path: PathBuf, reason: String },

    #[error("Failed to create version overlay {to:?} from {from:?}: {source}")]
    OverlayCopy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to remove version overlay {path:?}: {source}")]
    OverlayRemove {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Launch preparation cancelled")]
    Cancelled,

    #[error("Value for `{verb}` instruction contains a line break")]
    MultilineValue { verb: &'static str },
}
