// Asset loading: fetch, glTF import and the post-load pipeline

pub mod fetch;
pub mod import;
pub mod pipeline;

pub use fetch::{AssetLoadResult, DEFAULT_ASSET, fetch_asset, load_asset, spawn_load};
pub use import::{ImportError, LoadedAsset, import_glb};
pub use pipeline::{LoadSummary, enhance_material, on_load};
