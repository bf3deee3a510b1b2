// lib/src/controller/attachments.rs

// The file list of an incident form that hasn't been submitted yet. Files
// are embedded as base64 data URIs; nothing reaches the store until the
// incident itself is saved.

use std::path::Path;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use log::{debug, warn};
use models::errors::{ValidationError, ValidationResult};
use models::Attachment;

use crate::config::DEFAULT_MAX_FILE_SIZE_BYTES;
use crate::errors::Result;

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq)]
pub enum AttachOutcome {
    Attached { index: usize },
    /// The file was not added; `warning` is meant for the user.
    Rejected { name: String, warning: String },
}

impl AttachOutcome {
    pub fn is_attached(&self) -> bool {
        matches!(self, AttachOutcome::Attached { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentDraft {
    files: Vec<Attachment>,
    max_file_size: u64,
}

impl Default for AttachmentDraft {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE_BYTES)
    }
}

impl AttachmentDraft {
    pub fn new(max_file_size: u64) -> Self {
        AttachmentDraft { files: Vec::new(), max_file_size }
    }

    /// Starts from the files an existing incident already carries.
    pub fn from_files(files: Vec<Attachment>, max_file_size: u64) -> Self {
        AttachmentDraft { files, max_file_size }
    }

    pub fn files(&self) -> &[Attachment] {
        &self.files
    }

    pub fn into_files(self) -> Vec<Attachment> {
        self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn too_large(&self, name: &str, size: u64) -> Option<AttachOutcome> {
        if size <= self.max_file_size {
            return None;
        }
        warn!("Rejected attachment '{}' ({} bytes, limit {})", name, size, self.max_file_size);
        Some(AttachOutcome::Rejected {
            name: name.to_string(),
            warning: format!(
                "File \"{}\" is {} and exceeds the {} limit; it was not attached.",
                name,
                human_size(size),
                human_size(self.max_file_size)
            ),
        })
    }

    /// Encodes `bytes` and appends them, unless they exceed the size limit.
    pub fn attach_bytes(&mut self, name: &str, mime_type: &str, bytes: &[u8]) -> AttachOutcome {
        let size = bytes.len() as u64;
        if let Some(rejected) = self.too_large(name, size) {
            return rejected;
        }
        let mime_type = if mime_type.trim().is_empty() { guess_mime_type(name) } else { mime_type };
        self.files.push(Attachment {
            name: name.to_string(),
            url: encode_data_uri(mime_type, bytes),
            mime_type: mime_type.to_string(),
            size,
        });
        debug!("Attached '{}' ({} bytes)", name, size);
        AttachOutcome::Attached { index: self.files.len() - 1 }
    }

    /// Reads a file from disk and attaches it. Oversized files are rejected
    /// from their metadata, before any bytes are read.
    pub async fn attach_path(&mut self, path: &Path) -> Result<AttachOutcome> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let metadata = tokio::fs::metadata(path).await?;
        if let Some(rejected) = self.too_large(&name, metadata.len()) {
            return Ok(rejected);
        }
        let bytes = tokio::fs::read(path).await?;
        Ok(self.attach_bytes(&name, guess_mime_type(&name), &bytes))
    }

    /// Attaches each path independently; one failure doesn't stop the rest.
    pub async fn attach_paths<P: AsRef<Path>>(&mut self, paths: &[P]) -> Vec<Result<AttachOutcome>> {
        let mut outcomes = Vec::with_capacity(paths.len());
        for path in paths {
            outcomes.push(self.attach_path(path.as_ref()).await);
        }
        outcomes
    }

    /// Drops the file at `index`, if there is one.
    pub fn remove(&mut self, index: usize) -> Option<Attachment> {
        if index < self.files.len() {
            Some(self.files.remove(index))
        } else {
            None
        }
    }
}

pub fn encode_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, B64.encode(bytes))
}

/// Splits a `data:<mime>;base64,<payload>` URI into its MIME type and bytes.
pub fn decode_data_uri(url: &str) -> ValidationResult<(String, Vec<u8>)> {
    let malformed = || ValidationError::MalformedDataUri(url.chars().take(48).collect());
    let rest = url.strip_prefix("data:").ok_or_else(malformed)?;
    let (header, payload) = rest.split_once(',').ok_or_else(malformed)?;
    let mime_type = header.strip_suffix(";base64").ok_or_else(malformed)?;
    let bytes = B64.decode(payload.trim()).map_err(|_| malformed())?;
    let mime_type = if mime_type.is_empty() { FALLBACK_MIME_TYPE } else { mime_type };
    Ok((mime_type.to_string(), bytes))
}

pub fn guess_mime_type(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "dcm" => "application/dicom",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => FALLBACK_MIME_TYPE,
    }
}

fn human_size(bytes: u64) -> String {
    const MB: f64 = 1024.0 * 1024.0;
    if bytes as f64 >= MB {
        format!("{:.1} MB", bytes as f64 / MB)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: usize = 1024 * 1024;

    #[test]
    fn oversized_file_is_rejected_with_warning() {
        let mut draft = AttachmentDraft::default();

        let big = vec![0u8; 12 * MB];
        let outcome = draft.attach_bytes("scan.dcm", "application/dicom", &big);
        match outcome {
            AttachOutcome::Rejected { name, warning } => {
                assert_eq!(name, "scan.dcm");
                assert!(warning.contains("scan.dcm"));
                assert!(warning.contains("10.0 MB"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        assert!(draft.is_empty());

        let small = vec![7u8; 2 * MB];
        let outcome = draft.attach_bytes("xray.png", "image/png", &small);
        assert_eq!(outcome, AttachOutcome::Attached { index: 0 });
        let file = &draft.files()[0];
        assert_eq!(file.name, "xray.png");
        assert_eq!(file.mime_type, "image/png");
        assert_eq!(file.size, (2 * MB) as u64);
        assert!(file.url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn file_at_exact_limit_is_accepted() {
        let mut draft = AttachmentDraft::new(4);
        assert!(draft.attach_bytes("a.txt", "", b"1234").is_attached());
        assert!(!draft.attach_bytes("b.txt", "", b"12345").is_attached());
        assert_eq!(draft.files()[0].mime_type, "text/plain");
    }

    #[test]
    fn remove_by_position() {
        let mut draft = AttachmentDraft::default();
        draft.attach_bytes("a.txt", "text/plain", b"a");
        draft.attach_bytes("b.txt", "text/plain", b"b");
        draft.attach_bytes("c.txt", "text/plain", b"c");

        let removed = draft.remove(1).unwrap();
        assert_eq!(removed.name, "b.txt");
        let names: Vec<&str> = draft.files().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "c.txt"]);
        assert!(draft.remove(5).is_none());
    }

    #[test]
    fn data_uri_decodes_back_to_bytes() {
        let url = encode_data_uri("application/pdf", b"%PDF-1.4");
        let (mime, bytes) = decode_data_uri(&url).unwrap();
        assert_eq!(mime, "application/pdf");
        assert_eq!(bytes, b"%PDF-1.4");

        assert!(decode_data_uri("base64string-or-blob-url").is_err());
        assert!(decode_data_uri("data:text/plain,hello").is_err());
    }

    #[tokio::test]
    async fn batch_continues_past_oversized_and_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let ok = dir.path().join("invoice.pdf");
        let big = dir.path().join("huge.png");
        std::fs::write(&ok, b"%PDF").unwrap();
        std::fs::write(&big, vec![1u8; 64]).unwrap();
        let missing = dir.path().join("gone.txt");

        let mut draft = AttachmentDraft::new(16);
        let outcomes = draft.attach_paths(&[big.clone(), missing, ok.clone()]).await;

        assert!(matches!(outcomes[0], Ok(AttachOutcome::Rejected { .. })));
        assert!(outcomes[1].is_err());
        assert!(matches!(outcomes[2], Ok(AttachOutcome::Attached { index: 0 })));
        assert_eq!(draft.files()[0].name, "invoice.pdf");
        assert_eq!(draft.files()[0].mime_type, "application/pdf");
        assert_eq!(draft.files()[0].size, 4);
    }
}
