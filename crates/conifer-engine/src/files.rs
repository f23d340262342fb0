//! URL file-service collaborator
//!
//! copy-config, delete-config, validate and edit-config may name a `url`
//! source or target. Those pass through this service, which enforces an
//! allow-list of readable and writable directories. Payloads are
//! JSON-serialized configuration trees.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use conifer_core::errors::{ErrorTag, ErrorType, RpcError};
use conifer_core::model::DataNode;

/// Result type alias for file-service operations
pub type Result<T> = std::result::Result<T, FileServiceError>;

/// File-service failure taxonomy
///
/// All of these project onto `operation-failed` (application) at the
/// protocol boundary, with the message distinguishing not-allowed from
/// not-found.
#[derive(Debug, Error)]
pub enum FileServiceError {
    /// The url is empty
    #[error("url is empty")]
    EmptyUrl,

    /// The path escapes the configured allow-list
    #[error("path '{path}' is not allowed")]
    NotAllowed { path: String },

    /// The file does not exist
    #[error("file '{path}' was not found")]
    NotFound { path: String },

    /// Underlying filesystem failure
    #[error("i/o failure on '{path}': {message}")]
    Io { path: String, message: String },

    /// The payload is not a valid configuration tree
    #[error("config payload decode failed: {message}")]
    Decode { message: String },
}

impl From<FileServiceError> for RpcError {
    fn from(err: FileServiceError) -> Self {
        RpcError::new(ErrorType::Application, ErrorTag::OperationFailed)
            .with_message(err.to_string())
    }
}

/// Allow-list-gated file access for URL-backed configuration
///
/// Writable directories are implicitly readable.
#[derive(Debug, Clone)]
pub struct FileService {
    read_dirs: Vec<PathBuf>,
    write_dirs: Vec<PathBuf>,
}

impl FileService {
    /// Create a service over explicit allow-lists
    pub fn new(read_dirs: Vec<PathBuf>, write_dirs: Vec<PathBuf>) -> Self {
        Self {
            read_dirs,
            write_dirs,
        }
    }

    /// A service that allows nothing (the default posture)
    pub fn deny_all() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    /// Resolve a url to a readable path inside the allow-list
    ///
    /// # Errors
    ///
    /// `EmptyUrl`, `NotFound` for absent files, `NotAllowed` for paths
    /// outside every readable or writable directory.
    pub fn resolve_readable(&self, url: &str) -> Result<PathBuf> {
        let path = strip_url(url)?;
        let canonical = std::fs::canonicalize(&path).map_err(|_| FileServiceError::NotFound {
            path: path.display().to_string(),
        })?;
        let allowed = self
            .read_dirs
            .iter()
            .chain(self.write_dirs.iter())
            .any(|dir| under_dir(&canonical, dir));
        if !allowed {
            return Err(FileServiceError::NotAllowed {
                path: canonical.display().to_string(),
            });
        }
        Ok(canonical)
    }

    /// Resolve a url to a writable path inside the allow-list
    ///
    /// The file itself may not exist yet; its parent directory must.
    ///
    /// # Errors
    ///
    /// `EmptyUrl`, `NotFound` for absent parent directories, `NotAllowed`
    /// for paths outside every writable directory.
    pub fn resolve_writable(&self, url: &str) -> Result<PathBuf> {
        let path = strip_url(url)?;
        let parent = path.parent().ok_or_else(|| FileServiceError::NotAllowed {
            path: path.display().to_string(),
        })?;
        let file_name = path.file_name().ok_or_else(|| FileServiceError::NotAllowed {
            path: path.display().to_string(),
        })?;
        let canonical_parent =
            std::fs::canonicalize(parent).map_err(|_| FileServiceError::NotFound {
                path: parent.display().to_string(),
            })?;
        let candidate = canonical_parent.join(file_name);
        let allowed = self.write_dirs.iter().any(|dir| under_dir(&candidate, dir));
        if !allowed {
            return Err(FileServiceError::NotAllowed {
                path: candidate.display().to_string(),
            });
        }
        Ok(candidate)
    }

    /// Load a configuration tree from a readable url
    pub async fn load_config(&self, url: &str) -> Result<DataNode> {
        let path = self.resolve_readable(url)?;
        let bytes = tokio::fs::read(&path).await.map_err(|err| FileServiceError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        let node = serde_json::from_slice(&bytes).map_err(|err| FileServiceError::Decode {
            message: err.to_string(),
        })?;
        debug!(path = %path.display(), "loaded url-backed config");
        Ok(node)
    }

    /// Store a configuration tree at a writable url
    pub async fn store_config(&self, url: &str, node: &DataNode) -> Result<()> {
        let path = self.resolve_writable(url)?;
        let bytes =
            serde_json::to_vec_pretty(node).map_err(|err| FileServiceError::Decode {
                message: err.to_string(),
            })?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|err| FileServiceError::Io {
                path: path.display().to_string(),
                message: err.to_string(),
            })?;
        debug!(path = %path.display(), "stored url-backed config");
        Ok(())
    }

    /// Delete the file behind a writable url
    pub async fn delete_config(&self, url: &str) -> Result<()> {
        let path = self.resolve_writable(url)?;
        if !path.exists() {
            return Err(FileServiceError::NotFound {
                path: path.display().to_string(),
            });
        }
        tokio::fs::remove_file(&path)
            .await
            .map_err(|err| FileServiceError::Io {
                path: path.display().to_string(),
                message: err.to_string(),
            })?;
        debug!(path = %path.display(), "deleted url-backed config");
        Ok(())
    }
}

fn strip_url(url: &str) -> Result<PathBuf> {
    let trimmed = url.trim();
    let path = trimmed.strip_prefix("file://").unwrap_or(trimmed);
    if path.is_empty() {
        return Err(FileServiceError::EmptyUrl);
    }
    Ok(PathBuf::from(path))
}

fn under_dir(path: &Path, dir: &Path) -> bool {
    match std::fs::canonicalize(dir) {
        Ok(canonical_dir) => path.starts_with(&canonical_dir),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_url_rejected() {
        let files = FileService::deny_all();
        assert!(matches!(
            files.resolve_readable(""),
            Err(FileServiceError::EmptyUrl)
        ));
        assert!(matches!(
            files.resolve_readable("file://"),
            Err(FileServiceError::EmptyUrl)
        ));
    }

    #[test]
    fn test_file_scheme_prefix_is_optional() {
        let path = strip_url("file:///etc/example.json").unwrap();
        assert_eq!(path, PathBuf::from("/etc/example.json"));
        let path = strip_url("/etc/example.json").unwrap();
        assert_eq!(path, PathBuf::from("/etc/example.json"));
    }
}
