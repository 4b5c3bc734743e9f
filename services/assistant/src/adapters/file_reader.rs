//! services/assistant/src/adapters/file_reader.rs
//!
//! This module contains the document reader adapter. It implements the
//! `DocumentReader` port from the `core` crate by reading raw bytes and decoding
//! them as text, plus the advisory file-selection filter.

use async_trait::async_trait;
use bytes::Bytes;
use records_assistant_core::{
    domain::{FileSource, IncomingFile},
    ports::{DocumentReader, PortResult},
};
use tracing::debug;

use crate::config::Config;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// Reads any file as text. Invalid UTF-8 is replaced rather than rejected, so
/// binary formats (PDF, DOC) come back as garbled but "successful" text.
#[derive(Clone, Default)]
pub struct TextFileReader;

impl TextFileReader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentReader for TextFileReader {
    async fn read_text(&self, file: &IncomingFile) -> PortResult<String> {
        let raw: Bytes = match &file.source {
            FileSource::Bytes(data) => data.clone(),
            FileSource::Path(path) => tokio::fs::read(path).await?.into(),
        };
        debug!("Read {} bytes from '{}'", raw.len(), file.name);
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }
}

//=========================================================================================
// File Selection Hints
//=========================================================================================

/// The filter hint offered to the file-selection collaborator.
///
/// Nothing here rejects a file; it only produces warnings for the front end.
#[derive(Clone, Debug)]
pub struct FileFilter {
    accepted_extensions: Vec<String>,
    max_file_size_bytes: u64,
}

impl FileFilter {
    pub fn from_config(config: &Config) -> Self {
        Self {
            accepted_extensions: config.accepted_extensions.clone(),
            max_file_size_bytes: config.max_file_size_bytes,
        }
    }

    /// The `accept` attribute form of the hint, e.g. `.pdf,.txt,.doc,.docx`.
    pub fn accept_hint(&self) -> String {
        self.accepted_extensions.join(",")
    }

    pub fn matches(&self, file: &IncomingFile) -> bool {
        let name = file.name.to_lowercase();
        self.accepted_extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }

    /// Returns a warning for files outside the hint, or `None` if the file fits it.
    pub fn advisory(&self, file: &IncomingFile) -> Option<String> {
        if !self.matches(file) {
            return Some(format!(
                "'{}' is not one of {}; it will be read as plain text",
                file.name,
                self.accept_hint()
            ));
        }
        if file.size_bytes > self.max_file_size_bytes {
            return Some(format!(
                "'{}' is {}, above the {} hint",
                file.name,
                format_file_size(file.size_bytes),
                format_file_size(self.max_file_size_bytes)
            ));
        }
        None
    }
}

/// Renders a byte count as `B`, `KB` or `MB` with one decimal.
pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_in_memory_text() {
        let file = IncomingFile::from_bytes("notes.txt", "Patient reports mild headache.");
        let text = TextFileReader::new().read_text(&file).await.unwrap();
        assert_eq!(text, "Patient reports mild headache.");
    }

    #[tokio::test]
    async fn binary_content_is_read_lossily() {
        let file = IncomingFile::from_bytes("scan.pdf", vec![0x25, 0x50, 0x44, 0x46, 0xff, 0xfe]);
        let text = TextFileReader::new().read_text(&file).await.unwrap();
        assert!(text.starts_with("%PDF"));
        assert!(text.contains('\u{FFFD}'));
    }

    #[tokio::test]
    async fn missing_path_is_an_error() {
        let file = IncomingFile::from_path("/definitely/not/here/records.txt", 0);
        assert!(TextFileReader::new().read_text(&file).await.is_err());
    }

    #[tokio::test]
    async fn reads_from_disk() {
        let path = std::env::temp_dir().join(format!("records-{}.txt", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, "cholesterol 180 mg/dL").await.unwrap();

        let file = IncomingFile::from_path(&path, 21);
        let text = TextFileReader::new().read_text(&file).await.unwrap();
        tokio::fs::remove_file(&path).await.ok();

        assert_eq!(text, "cholesterol 180 mg/dL");
    }

    #[test]
    fn file_sizes_render_with_units() {
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn filter_only_advises() {
        let filter = FileFilter::from_config(&Config::default());

        let report = IncomingFile::from_bytes("Report.PDF", "x");
        assert!(filter.matches(&report));
        assert!(filter.advisory(&report).is_none());

        let image = IncomingFile::from_bytes("xray.png", "x");
        assert!(!filter.matches(&image));
        assert!(filter.advisory(&image).unwrap().contains(".pdf,.txt,.doc,.docx"));

        let mut huge = IncomingFile::from_bytes("huge.txt", "x");
        huge.size_bytes = 11 * 1024 * 1024;
        assert!(filter.advisory(&huge).unwrap().contains("10.0 MB"));
    }
}
