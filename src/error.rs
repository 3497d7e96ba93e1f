use std::{collections::BTreeMap, fmt, sync::Arc};

use crate::loader::ImportError;

#[derive(Debug, Clone)]
pub struct ViewerError {
    pub key: &'static str,
    pub args: BTreeMap<&'static str, String>,
    pub causes: Vec<ViewerCause>,
}

#[derive(Debug, Clone)]
pub struct ViewerCause(Arc<dyn std::error::Error + Send + Sync>);

impl ViewerError {
    pub fn new(key: &'static str) -> Self {
        Self {
            key,
            args: BTreeMap::new(),
            causes: Vec::new(),
        }
    }

    pub fn with_arg(mut self, k: &'static str, v: impl ToString) -> Self {
        self.args.insert(k, v.to_string());
        self
    }

    pub fn push_std(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.causes.push(ViewerCause(Arc::new(cause)));
        self
    }
}

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.key)?;
        let mut first = true;
        for (k, v) in &self.args {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{k}={v}")?;
        }
        write!(f, ")")?;
        for ViewerCause(cause) in &self.causes {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ViewerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.causes
            .first()
            .map(|ViewerCause(e)| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<reqwest::Error> for ViewerError {
    fn from(err: reqwest::Error) -> Self {
        ViewerError::new("reqwest::Error").push_std(err)
    }
}

impl From<ImportError> for ViewerError {
    fn from(err: ImportError) -> Self {
        ViewerError::new("import-error").push_std(err)
    }
}

impl From<tokio::task::JoinError> for ViewerError {
    fn from(err: tokio::task::JoinError) -> Self {
        ViewerError::new("tokio::JoinError").push_std(err)
    }
}

impl From<wgpu::CreateSurfaceError> for ViewerError {
    fn from(err: wgpu::CreateSurfaceError) -> Self {
        ViewerError::new("wgpu::CreateSurfaceError").push_std(err)
    }
}

impl From<wgpu::RequestAdapterError> for ViewerError {
    fn from(err: wgpu::RequestAdapterError) -> Self {
        ViewerError::new("wgpu::RequestAdapterError").push_std(err)
    }
}

impl From<wgpu::RequestDeviceError> for ViewerError {
    fn from(err: wgpu::RequestDeviceError) -> Self {
        ViewerError::new("wgpu::RequestDeviceError").push_std(err)
    }
}

impl From<winit::error::OsError> for ViewerError {
    fn from(err: winit::error::OsError) -> Self {
        ViewerError::new("winit::error::OsError").push_std(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_args_in_key_order() {
        let err = ViewerError::new("viewport-empty")
            .with_arg("width", 0)
            .with_arg("height", 600);
        assert_eq!(err.to_string(), "viewport-empty(height=600, width=0)");
    }

    #[test]
    fn first_cause_is_exposed_as_source() {
        let err = ViewerError::new("asset-read")
            .with_arg("path", "model.glb")
            .push_std(std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"));
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("no such file"));
        assert_eq!(err.to_string(), "asset-read(path=model.glb): no such file");
    }
}
