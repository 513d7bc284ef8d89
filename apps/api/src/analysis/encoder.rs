//! File Encoder — turns an uploaded résumé into a base64 payload plus media type.

#[cfg(test)]
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_PNG: &str = "image/png";
pub const MIME_JPEG: &str = "image/jpeg";

/// Media types the upload surface accepts.
pub const ACCEPTED_MIME_TYPES: &[&str] = &[MIME_PDF, MIME_PNG, MIME_JPEG];

#[derive(Debug, Clone)]
enum Contents {
    InMemory(Bytes),
    /// Read lazily when the file is encoded.
    #[cfg(test)]
    OnDisk(PathBuf),
}

/// A user-supplied résumé file.
#[derive(Debug, Clone)]
pub struct ResumeFile {
    filename: String,
    declared_mime: Option<String>,
    contents: Contents,
}

impl ResumeFile {
    pub fn from_bytes(filename: impl Into<String>, declared_mime: Option<String>, bytes: Bytes) -> Self {
        Self {
            filename: filename.into(),
            declared_mime,
            contents: Contents::InMemory(bytes),
        }
    }

    /// Lazily-read file, so tests can exercise read failures.
    #[cfg(test)]
    pub fn from_path(path: impl Into<PathBuf>, declared_mime: Option<String>) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            filename,
            declared_mime,
            contents: Contents::OnDisk(path),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn mime_type(&self) -> String {
        resolve_mime_type(self.declared_mime.as_deref(), &self.filename)
    }

    async fn read(&self) -> std::io::Result<Bytes> {
        match &self.contents {
            Contents::InMemory(bytes) => Ok(bytes.clone()),
            #[cfg(test)]
            Contents::OnDisk(path) => tokio::fs::read(path).await.map(Bytes::from),
        }
    }
}

/// Transport-safe form of a [`ResumeFile`].
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFile {
    /// Standard base64, no `data:` prefix.
    pub data: String,
    pub mime_type: String,
    pub size_bytes: usize,
}

/// Reads and base64-encodes a résumé file. Read failures propagate unchanged.
pub async fn encode(file: &ResumeFile) -> std::io::Result<EncodedFile> {
    let bytes = file.read().await?;
    Ok(EncodedFile {
        data: BASE64.encode(&bytes),
        mime_type: file.mime_type(),
        size_bytes: bytes.len(),
    })
}

/// Declared type wins; otherwise the extension decides; otherwise PDF.
///
/// The declared type is not validated here, only passed through.
pub fn resolve_mime_type(declared: Option<&str>, filename: &str) -> String {
    match declared.map(str::trim).filter(|d| !d.is_empty()) {
        Some(declared) => declared.to_string(),
        None => mime_from_extension(filename).unwrap_or(MIME_PDF).to_string(),
    }
}

/// Text after the last dot, so a bare `.png` still counts as PNG.
fn mime_from_extension(filename: &str) -> Option<&'static str> {
    let (_, ext) = filename.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some(MIME_PDF),
        "png" => Some(MIME_PNG),
        "jpg" | "jpeg" => Some(MIME_JPEG),
        _ => None,
    }
}
