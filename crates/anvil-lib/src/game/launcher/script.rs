//! Launch script assembly.
//!
//! The script is the complete contract with the external executor: it is an
//! ordered list of instructions, serialized one per line as `<verb> <value>`.
//! The verbs and their order are a stable wire format.

use crate::game::assets::{AssetReconstructor, ReconstructOutcome};
use crate::game::error::InstanceError;
use crate::game::launcher::arguments::{
    build_game_variables, expand_arguments, template_tokens, GAME_ASSETS_TOKEN,
};
use crate::game::launcher::classpath::build_classpath;
use crate::game::launcher::natives::native_jars;
use crate::game::launcher::types::{AuthSession, CancelToken, LaunchContext};
use crate::game::launcher::version_parser::VersionDescriptor;
use crate::utils::paths::absolute_path;
use anyhow::Result;
use std::fmt;
use std::path::PathBuf;

/// Launch mode named by the terminal `launch` instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    OneSix,
}

impl LaunchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LaunchMode::OneSix => "onesix",
        }
    }
}

/// A single launch script instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// `cp <path>`: classpath entry
    ClassPath(PathBuf),
    /// `mainClass <name>`
    MainClass(String),
    /// `param <value>`: one game argument
    Param(String),
    /// `windowTitle <title>`
    WindowTitle(String),
    /// `ext <path>`: jar whose natives get extracted
    Extract(PathBuf),
    /// `natives <path>`: extraction target directory
    Natives(PathBuf),
    /// `launch <mode>`: terminal marker
    Launch(LaunchMode),
}

impl Instruction {
    pub fn verb(&self) -> &'static str {
        match self {
            Instruction::ClassPath(_) => "cp",
            Instruction::MainClass(_) => "mainClass",
            Instruction::Param(_) => "param",
            Instruction::WindowTitle(_) => "windowTitle",
            Instruction::Extract(_) => "ext",
            Instruction::Natives(_) => "natives",
            Instruction::Launch(_) => "launch",
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = self.verb();
        match self {
            Instruction::ClassPath(p) | Instruction::Extract(p) | Instruction::Natives(p) => {
                write!(f, "{} {}", verb, p.display())
            }
            Instruction::MainClass(s) | Instruction::Param(s) | Instruction::WindowTitle(s) => {
                write!(f, "{} {}", verb, s)
            }
            Instruction::Launch(mode) => write!(f, "{} {}", verb, mode.as_str()),
        }
    }
}

/// Ordered instruction sequence handed to the executor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchScript {
    pub instructions: Vec<Instruction>,
}

impl LaunchScript {
    /// Values of every `param` instruction, in order
    pub fn params(&self) -> Vec<&str> {
        self.instructions
            .iter()
            .filter_map(|i| match i {
                Instruction::Param(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Classpath entries, in order
    pub fn classpath(&self) -> Vec<&PathBuf> {
        self.instructions
            .iter()
            .filter_map(|i| match i {
                Instruction::ClassPath(p) => Some(p),
                _ => None,
            })
            .collect()
    }
}

/// Serializes to the line-oriented wire format, one `\n`-terminated line per instruction
impl fmt::Display for LaunchScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instruction in &self.instructions {
            writeln!(f, "{}", instruction)?;
        }
        Ok(())
    }
}

/// Build the launch script for a resolved descriptor.
///
/// Order: classpath, main class, game arguments, window geometry (omitted
/// entirely when maximized), window title, native jars, natives directory,
/// launch marker. The virtual asset root is reconstructed first when the
/// argument template refers to it. Nothing is returned on failure, including
/// when a value would span more than one line.
pub async fn build_launch_script(
    descriptor: &VersionDescriptor,
    session: &AuthSession,
    ctx: &LaunchContext,
    cancel: &CancelToken,
) -> Result<LaunchScript> {
    log::info!(
        "[launch_script] building for version {} ({})",
        descriptor.id,
        ctx.profile_name
    );

    let mut instructions = Vec::new();

    // 1. Classpath and main class
    for entry in build_classpath(descriptor, &ctx.paths, &ctx.platform)? {
        instructions.push(Instruction::ClassPath(entry));
    }
    instructions.push(Instruction::MainClass(descriptor.main_class.clone()));

    // 2. Game arguments
    let needs_assets = template_tokens(&descriptor.argument_template).contains(&GAME_ASSETS_TOKEN);
    let game_assets = if needs_assets {
        let report = AssetReconstructor::from_paths(&ctx.paths)
            .with_concurrency(ctx.config.asset_concurrency)
            .with_cancel_token(cancel.clone())
            .reconstruct(&descriptor.assets_id)
            .await;
        if report.outcome == ReconstructOutcome::Cancelled {
            return Err(InstanceError::Cancelled.into());
        }
        Some(report.virtual_root)
    } else {
        None
    };

    if cancel.is_cancelled() {
        return Err(InstanceError::Cancelled.into());
    }

    let variables = build_game_variables(session, descriptor, ctx, game_assets.as_deref());
    for arg in expand_arguments(&descriptor.argument_template, &variables) {
        instructions.push(Instruction::Param(arg));
    }

    // 3. Window geometry; maximized launches get no replacement flag
    if !ctx.config.maximized {
        instructions.push(Instruction::Param("--width".to_string()));
        instructions.push(Instruction::Param(ctx.config.window_width.to_string()));
        instructions.push(Instruction::Param("--height".to_string()));
        instructions.push(Instruction::Param(ctx.config.window_height.to_string()));
    }

    instructions.push(Instruction::WindowTitle(ctx.window_title.clone()));

    // 4. Natives
    for jar in native_jars(descriptor, &ctx.paths, &ctx.platform)? {
        instructions.push(Instruction::Extract(jar));
    }
    instructions.push(Instruction::Natives(absolute_path(&ctx.natives_dir)));

    instructions.push(Instruction::Launch(LaunchMode::OneSix));

    ensure_single_line(&instructions)?;

    log::debug!(
        "[launch_script] {} instructions for {}",
        instructions.len(),
        descriptor.id
    );

    Ok(LaunchScript { instructions })
}

/// Every instruction must serialize to exactly one line; a value carrying a
/// line break would be read by the executor as extra instructions.
fn ensure_single_line(instructions: &[Instruction]) -> Result<()> {
    for instruction in instructions {
        if instruction
            .to_string()
            .contains(|c: char| c == '\n' || c == '\r')
        {
            return Err(InstanceError::MultilineValue {
                verb: instruction.verb(),
            }
            .into());
        }
    }
    Ok(())
}
