//! Stage-gated trucking insurance intake: validation, navigation, persistence,
//! and assembly of the ACORD submission package.

pub mod documents;
pub mod domain;
pub mod gate;
pub mod mapping;
pub mod package;
pub mod persistence;
pub mod router;
pub mod service;
pub mod session;
pub mod uploads;
pub mod validation;

#[cfg(test)]
mod tests;

pub use documents::{DocumentCompiler, DocumentRenderer, PdfRenderer, RenderError, RenderedDocument};
pub use domain::{DocumentType, IntakeData, KnockoutQuestion, UploadedDocument};
pub use gate::{GateStatus, NavigationError, Stage, StageGate, Transition};
pub use mapping::{project, DocumentKind, FieldList, FieldValue};
pub use package::{
    document_count, suggested_file_name, ArchiveEntry, ArchiveError, ArchiveWriter, AssemblyError,
    PackageAssembler, SubmissionPackage, TarGzArchive,
};
pub use persistence::{FileStore, InMemoryStore, PersistenceAdapter, SnapshotStore, StoreError};
pub use router::intake_router;
pub use service::{IntakeService, IntakeServiceError, IntakeView, StageView};
pub use session::{FieldAccessError, IntakeSession, ResumeChoice, SessionBootstrap};
pub use uploads::{accept_upload, DirectoryUploadStore, InMemoryUploadStore, UploadError, UploadStore};
pub use validation::{validate, FieldError, FieldPath, ValidationContext, ValidationReport};
