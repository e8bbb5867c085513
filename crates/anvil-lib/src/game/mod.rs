pub mod assets;
pub mod error;
pub mod instance;
pub mod launcher;

// Re-export commonly used types
pub use error::InstanceError;
pub use instance::{Instance, InstanceState, MemorySettings, SettingValue, SettingsStore};
pub use launcher::{AuthSession, CancelToken, LaunchScript, VersionDescriptor};
