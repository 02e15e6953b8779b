use std::collections::HashSet;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::documents::{DocumentCompiler, DocumentRenderer, RenderError};
use super::domain::{IntakeData, UploadedDocument};
use super::mapping::format::{date, sanitize_name};
use super::mapping::{project, DocumentKind, SUPPLEMENT_CAPACITY};
use super::uploads::{UploadError, UploadStore};

pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Named buffer placed in the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Capability that bundles named buffers into one compressed stream.
pub trait ArchiveWriter: Send + Sync {
    fn pack(&self, entries: &[ArchiveEntry]) -> Result<Vec<u8>, ArchiveError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("package has no entries")]
    Empty,
    #[error("duplicate package entry `{0}`")]
    DuplicateEntry(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Gzip-compressed tar with zeroed timestamps and fixed permissions.
#[derive(Debug, Clone, Copy)]
pub struct TarGzArchive {
    level: u32,
}

impl TarGzArchive {
    pub fn new(level: u32) -> Self {
        Self {
            level: level.min(9),
        }
    }
}

impl Default for TarGzArchive {
    fn default() -> Self {
        Self::new(DEFAULT_COMPRESSION_LEVEL)
    }
}

impl ArchiveWriter for TarGzArchive {
    fn pack(&self, entries: &[ArchiveEntry]) -> Result<Vec<u8>, ArchiveError> {
        if entries.is_empty() {
            return Err(ArchiveError::Empty);
        }
        let mut seen = HashSet::new();
        for entry in entries {
            if !seen.insert(entry.name.as_str()) {
                return Err(ArchiveError::DuplicateEntry(entry.name.clone()));
            }
        }

        let encoder = GzEncoder::new(Vec::new(), Compression::new(self.level));
        let mut builder = tar::Builder::new(encoder);
        for entry in entries {
            let mut header = tar::Header::new_gnu();
            header.set_entry_type(tar::EntryType::Regular);
            header.set_size(entry.bytes.len() as u64);
            header.set_mode(0o644);
            header.set_mtime(0);
            builder.append_data(&mut header, &entry.name, entry.bytes.as_slice())?;
        }
        let encoder = builder.into_inner()?;
        Ok(encoder.finish()?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    #[error("an assembly is already in progress for this session")]
    Busy,
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error("assembly worker failed: {0}")]
    Worker(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPackage {
    pub file_name: String,
    pub entries: Vec<String>,
    pub document_count: usize,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// Rendered documents plus uploads: primary, supplement, the continuation when
/// vehicles overflow, then every upload.
pub fn document_count(data: &IntakeData) -> usize {
    let continuation = usize::from(data.vehicles.len() > SUPPLEMENT_CAPACITY);
    2 + continuation + data.documents.len()
}

pub fn suggested_file_name(data: &IntakeData, today: NaiveDate) -> String {
    format!(
        "Intake_Submission_{}_{}.tar.gz",
        sanitize_name(&data.business.legal_name),
        date(today)
    )
}

fn rendered_entry_name(kind: DocumentKind, business: &str) -> String {
    format!("ACORD_{}_{business}.pdf", kind.form_number())
}

fn upload_entry_name(document: &UploadedDocument, business: &str) -> String {
    let extension = Path::new(&document.file_name)
        .extension()
        .and_then(|extension| extension.to_str())
        .filter(|extension| !extension.is_empty() && extension.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| document.format.extension().to_string());
    format!("{}_{business}.{extension}", document.document_type.package_prefix())
}

/// Appends `_2`, `_3`, ... before the extension until the name is unused.
fn unique_name(name: String, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.clone()) {
        return name;
    }
    let (stem, extension) = match name.rfind('.') {
        Some(dot) => (&name[..dot], &name[dot..]),
        None => (name.as_str(), ""),
    };
    let mut counter = 2;
    loop {
        let candidate = format!("{stem}_{counter}{extension}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}

struct InFlight(Arc<AtomicBool>);

impl InFlight {
    fn acquire(flag: &Arc<AtomicBool>) -> Result<Self, AssemblyError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| AssemblyError::Busy)?;
        Ok(Self(Arc::clone(flag)))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Compiles every document for an intake snapshot and bundles them with the
/// uploads. At most one assembly runs at a time.
pub struct PackageAssembler<R, A, U> {
    compiler: DocumentCompiler<R>,
    archive: A,
    uploads: Arc<U>,
    in_flight: Arc<AtomicBool>,
}

impl<R, A, U> PackageAssembler<R, A, U>
where
    R: DocumentRenderer,
    A: ArchiveWriter,
    U: UploadStore,
{
    pub fn new(compiler: DocumentCompiler<R>, archive: A, uploads: Arc<U>) -> Self {
        Self {
            compiler,
            archive,
            uploads,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn uploads(&self) -> &Arc<U> {
        &self.uploads
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Builds the package from `data` as it is now. Any failure aborts the
    /// whole package.
    pub fn assemble(&self, data: &IntakeData, today: NaiveDate) -> Result<SubmissionPackage, AssemblyError> {
        let _in_flight = InFlight::acquire(&self.in_flight)?;
        self.build(data, today)
    }

    fn build(&self, data: &IntakeData, today: NaiveDate) -> Result<SubmissionPackage, AssemblyError> {
        let business = sanitize_name(&data.business.legal_name);
        info!(
            business = %business,
            vehicles = data.vehicles.len(),
            uploads = data.documents.len(),
            "assembling submission package"
        );

        let result = self.collect_entries(data, today, &business).and_then(|entries| {
            let names = entries.iter().map(|entry| entry.name.clone()).collect::<Vec<_>>();
            let bytes = self.archive.pack(&entries)?;
            Ok((names, bytes))
        });

        match result {
            Ok((entries, bytes)) => {
                info!(entries = entries.len(), bytes = bytes.len(), "submission package ready");
                Ok(SubmissionPackage {
                    file_name: suggested_file_name(data, today),
                    document_count: entries.len(),
                    entries,
                    bytes,
                })
            }
            Err(error) => {
                warn!(%error, "submission package assembly failed");
                Err(error)
            }
        }
    }

    fn collect_entries(
        &self,
        data: &IntakeData,
        today: NaiveDate,
        business: &str,
    ) -> Result<Vec<ArchiveEntry>, AssemblyError> {
        let mut taken = HashSet::new();
        let mut entries = Vec::with_capacity(document_count(data));

        for kind in DocumentKind::required_for(data) {
            let fields = project(data, kind, today);
            let rendered = self.compiler.compile(kind, &fields, today)?;
            entries.push(ArchiveEntry {
                name: unique_name(rendered_entry_name(kind, business), &mut taken),
                bytes: rendered.bytes,
            });
        }

        for document in &data.documents {
            let bytes = self.uploads.fetch(&document.file_reference)?;
            entries.push(ArchiveEntry {
                name: unique_name(upload_entry_name(document, business), &mut taken),
                bytes,
            });
        }

        Ok(entries)
    }
}

impl<R, A, U> PackageAssembler<R, A, U>
where
    R: DocumentRenderer + 'static,
    A: ArchiveWriter + 'static,
    U: UploadStore + 'static,
{
    /// Runs the assembly on the blocking pool. The busy check happens before
    /// this returns, so a second call while one is running fails immediately.
    pub fn assemble_in_background(
        self: &Arc<Self>,
        data: IntakeData,
        today: NaiveDate,
    ) -> Result<JoinHandle<Result<SubmissionPackage, AssemblyError>>, AssemblyError> {
        let handle = Handle::try_current()
            .map_err(|error| AssemblyError::Worker(error.to_string()))?;
        let in_flight = InFlight::acquire(&self.in_flight)?;
        let assembler = Arc::clone(self);
        Ok(handle.spawn_blocking(move || {
            let _in_flight = in_flight;
            assembler.build(&data, today)
        }))
    }
}
