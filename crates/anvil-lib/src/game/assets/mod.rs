/// Asset indexes and legacy virtual asset reconstruction
pub mod index;
pub mod reconstruct;

pub use index::{load_asset_index, AssetIndex, AssetObject};
pub use reconstruct::{AssetReconstructor, ReconstructOutcome, ReconstructReport};
