pub mod arguments;
pub mod classpath;
pub mod natives;
pub mod rules;
pub mod script;
/// Launch script construction for legacy (pre-1.13) game versions
pub mod types;
pub mod version_parser;

// Re-export commonly used types
pub use arguments::{expand_arguments, substitute_variables};
pub use classpath::{build_classpath, maven_to_path};
pub use natives::{cleanup_natives, get_natives_dir};
pub use rules::{rules_allow, Rule, RuleAction};
pub use script::{build_launch_script, Instruction, LaunchMode, LaunchScript};
pub use types::{
    Arch, AuthSession, CancelToken, LaunchConfig, LaunchContext, LauncherPaths, OsType, Platform,
};
pub use version_parser::{parse_version_json, Library, VersionDescriptor};
