use std::path::Path;

use log::{info, warn};
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;

use super::import::{LoadedAsset, import_glb};
use crate::error::ViewerError;

pub const DEFAULT_ASSET: &str = "model.glb";

pub enum AssetLoadResult {
    Loaded { source: String, asset: LoadedAsset },
    Failed { source: String, error: String },
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Reads the raw asset bytes from a local path or an http(s) URL.
pub async fn fetch_asset(source: &str) -> Result<Vec<u8>, ViewerError> {
    if !is_remote(source) {
        let data = tokio::fs::read(Path::new(source))
            .await
            .map_err(|e| ViewerError::new("asset-read").with_arg("path", source).push_std(e))?;
        return Ok(data);
    }

    let response = reqwest::get(source).await?;
    if !response.status().is_success() {
        return Err(ViewerError::new("asset-http-status")
            .with_arg("url", source)
            .with_arg("status", response.status()));
    }
    let bytes = response.bytes().await?;
    Ok(bytes.to_vec())
}

/// Fetches and parses one asset. Parsing runs on the blocking pool.
pub async fn load_asset(source: &str) -> Result<LoadedAsset, ViewerError> {
    let bytes = fetch_asset(source).await?;
    info!("Fetched '{}' ({} bytes)", source, bytes.len());
    let asset = tokio::task::spawn_blocking(move || import_glb(&bytes)).await??;
    Ok(asset)
}

/// Starts a background load; the result arrives on `sender` exactly once.
pub fn spawn_load(handle: &Handle, source: String, sender: UnboundedSender<AssetLoadResult>) {
    handle.spawn(async move {
        let result = match load_asset(&source).await {
            Ok(asset) => AssetLoadResult::Loaded { source, asset },
            Err(e) => {
                warn!("Failed to load '{}': {}", source, e);
                AssetLoadResult::Failed {
                    source,
                    error: e.to_string(),
                }
            }
        };
        let _ = sender.send(result);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_remote_paths_are_not() {
        assert!(is_remote("https://example.com/a.glb"));
        assert!(is_remote("http://localhost/a.glb"));
        assert!(!is_remote("model.glb"));
        assert!(!is_remote("assets/http.glb"));
    }

    #[tokio::test]
    async fn missing_file_reports_path() {
        let err = fetch_asset("does/not/exist.glb").await.err().unwrap();
        assert_eq!(err.key, "asset-read");
        assert_eq!(err.args["path"], "does/not/exist.glb");
    }

    #[tokio::test]
    async fn spawned_load_reports_failure_on_channel() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        spawn_load(&Handle::current(), "missing.glb".to_owned(), tx);
        match rx.recv().await {
            Some(AssetLoadResult::Failed { source, .. }) => assert_eq!(source, "missing.glb"),
            _ => panic!("expected a failure"),
        }
    }
}
