//! Launch core for legacy game instances: version descriptor resolution with
//! custom overlays, `${token}` argument expansion, virtual asset
//! reconstruction and launch script assembly.

pub mod game;
pub mod utils;
