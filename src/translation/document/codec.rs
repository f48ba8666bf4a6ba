/*!
 * Document codecs.
 *
 * A codec turns container bytes into a `Document` and back. Loading and
 * saving live here too: saving always goes through a temporary file in the
 * destination directory that is persisted over the target in one rename, so
 * a failed save never leaves a partial output file behind.
 */

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use log::debug;
use tempfile::NamedTempFile;

use super::model::Document;
use crate::errors::DocumentError;

/// Encoder/decoder for one container format
pub trait DocumentCodec: Send + Sync {
    /// File extension this codec reads and writes, without the dot
    fn extension(&self) -> &'static str;

    /// Decode container bytes into a document
    fn decode(&self, bytes: &[u8]) -> anyhow::Result<Document>;

    /// Encode a document into container bytes
    fn encode(&self, document: &Document) -> anyhow::Result<Vec<u8>>;
}

/// JSON serialization of the document model
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    /// Pretty-print the output
    pub pretty: bool,
}

impl JsonCodec {
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl DocumentCodec for JsonCodec {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn decode(&self, bytes: &[u8]) -> anyhow::Result<Document> {
        serde_json::from_slice(bytes).context("Invalid JSON document")
    }

    fn encode(&self, document: &Document) -> anyhow::Result<Vec<u8>> {
        let encoded = if self.pretty {
            serde_json::to_vec_pretty(document)
        } else {
            serde_json::to_vec(document)
        };
        encoded.context("Failed to serialize document as JSON")
    }
}

/// Read and decode a document from disk
pub fn load_document(codec: &dyn DocumentCodec, path: &Path) -> Result<Document, DocumentError> {
    let load_error = |message: String| DocumentError::Load {
        path: path.to_path_buf(),
        message,
    };

    let bytes = fs::read(path).map_err(|e| load_error(e.to_string()))?;
    let document = codec
        .decode(&bytes)
        .map_err(|e| load_error(format!("{:#}", e)))?;

    debug!("Loaded {:?} with {} blocks", path, document.block_count());
    Ok(document)
}

/// Encode and atomically write a document to disk
pub fn save_document(
    codec: &dyn DocumentCodec,
    document: &Document,
    path: &Path,
) -> Result<(), DocumentError> {
    let save_error = |message: String| DocumentError::Save {
        path: path.to_path_buf(),
        message,
    };

    let bytes = codec
        .encode(document)
        .map_err(|e| save_error(format!("{:#}", e)))?;

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| save_error(e.to_string()))?;

    // The temp file is removed on drop if anything below fails
    let mut temp_file = NamedTempFile::new_in(parent).map_err(|e| save_error(e.to_string()))?;
    temp_file
        .write_all(&bytes)
        .and_then(|_| temp_file.as_file().sync_all())
        .map_err(|e| save_error(e.to_string()))?;
    temp_file
        .persist(path)
        .map_err(|e| save_error(e.error.to_string()))?;

    debug!("Saved {:?} ({} bytes)", path, bytes.len());
    Ok(())
}
