use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::Utc;

use super::domain::{DocumentType, UploadFormat, UploadedDocument, MAX_UPLOAD_BYTES};

/// Holds raw upload bytes keyed by the opaque reference stored on the record.
pub trait UploadStore: Send + Sync {
    fn put(&self, bytes: Vec<u8>) -> Result<String, UploadError>;
    fn fetch(&self, reference: &str) -> Result<Vec<u8>, UploadError>;
    /// Drops the bytes behind `reference`. Unknown references are ignored.
    fn remove(&self, reference: &str) -> Result<(), UploadError>;
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("file is empty")]
    Empty,
    #[error("file is {size} bytes; the limit is {MAX_UPLOAD_BYTES}")]
    TooLarge { size: u64 },
    #[error("unsupported file type `{0}`; expected PDF, JPG, or PNG")]
    UnsupportedFormat(String),
    #[error("file name is missing")]
    MissingName,
    #[error("no upload stored under `{0}`")]
    Missing(String),
    #[error("upload store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Default)]
pub struct InMemoryUploadStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
    sequence: AtomicU64,
}

impl InMemoryUploadStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UploadStore for InMemoryUploadStore {
    fn put(&self, bytes: Vec<u8>) -> Result<String, UploadError> {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let reference = format!("upload-{id:06}");
        let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        files.insert(reference.clone(), bytes);
        Ok(reference)
    }

    fn fetch(&self, reference: &str) -> Result<Vec<u8>, UploadError> {
        let files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        files
            .get(reference)
            .cloned()
            .ok_or_else(|| UploadError::Missing(reference.to_string()))
    }

    fn remove(&self, reference: &str) -> Result<(), UploadError> {
        let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        files.remove(reference);
        Ok(())
    }
}

impl InMemoryUploadStore {
    pub fn len(&self) -> usize {
        self.files.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Upload bytes kept as files under one directory; the reference is the file name.
#[derive(Debug)]
pub struct DirectoryUploadStore {
    root: PathBuf,
    sequence: AtomicU64,
}

impl DirectoryUploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, reference: &str) -> Result<PathBuf, UploadError> {
        let safe = !reference.is_empty()
            && !reference.starts_with('.')
            && reference
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !safe {
            return Err(UploadError::Missing(reference.to_string()));
        }
        Ok(self.root.join(reference))
    }
}

fn unavailable(error: io::Error) -> UploadError {
    UploadError::Unavailable(error.to_string())
}

impl UploadStore for DirectoryUploadStore {
    fn put(&self, bytes: Vec<u8>) -> Result<String, UploadError> {
        fs::create_dir_all(&self.root).map_err(unavailable)?;
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let reference = format!("upload-{}-{id:04}", Utc::now().timestamp_millis());
        fs::write(self.root.join(&reference), bytes).map_err(unavailable)?;
        Ok(reference)
    }

    fn fetch(&self, reference: &str) -> Result<Vec<u8>, UploadError> {
        let path = self.path_for(reference)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                Err(UploadError::Missing(reference.to_string()))
            }
            Err(error) => Err(unavailable(error)),
        }
    }

    fn remove(&self, reference: &str) -> Result<(), UploadError> {
        let path = self.path_for(reference)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(unavailable(error)),
        }
    }
}

/// Checks an incoming file, stores its bytes, and returns the record to attach
/// to the intake.
pub fn accept_upload<U: UploadStore + ?Sized>(
    store: &U,
    document_type: DocumentType,
    file_name: &str,
    mime_type: &str,
    bytes: Vec<u8>,
) -> Result<UploadedDocument, UploadError> {
    let file_name = file_name.trim();
    if file_name.is_empty() {
        return Err(UploadError::MissingName);
    }
    let format = UploadFormat::from_mime(mime_type)
        .ok_or_else(|| UploadError::UnsupportedFormat(mime_type.to_string()))?;
    let size = bytes.len() as u64;
    if size == 0 {
        return Err(UploadError::Empty);
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge { size });
    }

    let file_reference = store.put(bytes)?;
    Ok(UploadedDocument {
        document_type,
        file_name: file_name.to_string(),
        file_size: size,
        format,
        uploaded_at: Utc::now(),
        file_reference,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_upload_is_retrievable_by_reference() {
        let store = InMemoryUploadStore::new();
        let document = accept_upload(
            &store,
            DocumentType::AuthorityLetter,
            " mc-authority.pdf ",
            "application/pdf",
            b"%PDF-1.4 letter".to_vec(),
        )
        .expect("accepted");

        assert_eq!(document.file_name, "mc-authority.pdf");
        assert_eq!(document.format, UploadFormat::Pdf);
        assert_eq!(document.file_size, 15);
        assert_eq!(
            store.fetch(&document.file_reference).expect("stored"),
            b"%PDF-1.4 letter".to_vec()
        );
    }

    #[test]
    fn rejects_unsupported_empty_and_oversized_files() {
        let store = InMemoryUploadStore::new();
        match accept_upload(&store, DocumentType::LossRuns, "runs.gif", "image/gif", vec![1]) {
            Err(UploadError::UnsupportedFormat(mime)) => assert_eq!(mime, "image/gif"),
            other => panic!("expected unsupported format, got {other:?}"),
        }
        match accept_upload(&store, DocumentType::LossRuns, "runs.pdf", "application/pdf", Vec::new()) {
            Err(UploadError::Empty) => {}
            other => panic!("expected empty file, got {other:?}"),
        }
        let oversized = vec![0u8; (MAX_UPLOAD_BYTES + 1) as usize];
        match accept_upload(&store, DocumentType::LossRuns, "runs.png", "image/png", oversized) {
            Err(UploadError::TooLarge { size }) => assert_eq!(size, MAX_UPLOAD_BYTES + 1),
            other => panic!("expected too large, got {other:?}"),
        }
    }

    #[test]
    fn directory_store_reads_back_and_refuses_escaping_references() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = DirectoryUploadStore::new(dir.path().join("uploads"));
        let reference = store.put(b"%PDF-1.4 runs".to_vec()).expect("stored");
        assert_eq!(store.fetch(&reference).expect("read back"), b"%PDF-1.4 runs".to_vec());

        for reference in ["../secrets", ".hidden", "nested/file.pdf", ""] {
            match store.fetch(reference) {
                Err(UploadError::Missing(_)) => {}
                other => panic!("expected missing for {reference:?}, got {other:?}"),
            }
        }
        match store.fetch("never-written.pdf") {
            Err(UploadError::Missing(reference)) => assert_eq!(reference, "never-written.pdf"),
            other => panic!("expected missing upload, got {other:?}"),
        }
    }

    #[test]
    fn removed_uploads_are_gone_from_both_stores() {
        let memory = InMemoryUploadStore::new();
        let reference = memory.put(b"%PDF-1.4 letter".to_vec()).expect("stored");
        assert_eq!(memory.len(), 1);
        memory.remove(&reference).expect("removed");
        memory.remove(&reference).expect("second remove is a no-op");
        assert!(memory.is_empty());

        let dir = tempfile::tempdir().expect("tempdir");
        let directory = DirectoryUploadStore::new(dir.path());
        let reference = directory.put(b"%PDF-1.4 runs".to_vec()).expect("stored");
        directory.remove(&reference).expect("removed");
        assert!(matches!(directory.fetch(&reference), Err(UploadError::Missing(_))));
        assert!(directory.remove("../outside").is_err());
    }
}
