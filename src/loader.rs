//! Document Loader - existence, size and JSON decoding

use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::validation::Finding;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("The OpenAPI document is not valid JSON. Please correct the document and try again.")]
    InvalidJson(#[source] serde_json::Error),
}

/// A parsed document plus what was learned while reading it.
#[derive(Debug)]
pub struct LoadedDocument {
    pub document: Value,
    pub size_kb: f64,
    /// Non-fatal findings from loading (size limit).
    pub findings: Vec<Finding>,
}

/// Bytes to kilobytes, one decimal place.
pub fn size_in_kb(bytes: u64) -> f64 {
    (bytes as f64 / 1024.0 * 10.0).round() / 10.0
}

pub fn check_size(size_kb: f64, max_size_kb: f64) -> Option<Finding> {
    if size_kb <= max_size_kb {
        return None;
    }
    Some(
        Finding::error(
            "",
            format!(
                "File size {}KB exceeds the ~{}KB upload limit. Split or subset the document to reduce it.",
                size_kb, max_size_kb
            ),
        )
        .with_code("document-size-limit"),
    )
}

pub fn load_document(path: &Path, max_size_kb: f64) -> Result<LoadedDocument, LoadError> {
    let metadata = fs::metadata(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Read { path: path.to_path_buf(), source },
    })?;

    let size_kb = size_in_kb(metadata.len());
    let findings: Vec<_> = check_size(size_kb, max_size_kb).into_iter().collect();
    if !findings.is_empty() {
        tracing::debug!(size_kb, max_size_kb, "document over size limit");
    }

    let content = fs::read(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let document = serde_json::from_slice(&content).map_err(LoadError::InvalidJson)?;

    Ok(LoadedDocument { document, size_kb, findings })
}
