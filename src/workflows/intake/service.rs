use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use super::documents::{DocumentCompiler, PdfRenderer};
use super::domain::{DocumentType, IntakeData, UploadedDocument};
use super::gate::{verify_submission, GateStatus, NavigationError, Transition};
use super::package::{document_count, AssemblyError, PackageAssembler, SubmissionPackage, TarGzArchive};
use super::persistence::SnapshotStore;
use super::session::{FieldAccessError, IntakeSession};
use super::uploads::{accept_upload, UploadError, UploadStore};
use super::validation::FieldError;

pub type SubmissionAssembler<U> = PackageAssembler<PdfRenderer, TarGzArchive, U>;

/// Serializes access to one intake session and owns its packaging pipeline.
pub struct IntakeService<S: SnapshotStore, U> {
    session: Mutex<IntakeSession<S>>,
    uploads: Arc<U>,
    assembler: Arc<SubmissionAssembler<U>>,
}

/// Navigation summary returned alongside every session read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageView {
    pub current: u8,
    pub label: &'static str,
    pub highest: u8,
    pub status: GateStatus,
    pub restored: bool,
    pub document_count: usize,
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeView {
    pub data: IntakeData,
    pub stage: StageView,
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeServiceError {
    #[error(transparent)]
    Field(#[from] FieldAccessError),
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error("unknown document type `{0}`")]
    UnknownDocumentType(String),
    #[error("intake must be submitted before the package can be assembled")]
    NotSubmitted,
}

impl<S, U> IntakeService<S, U>
where
    S: SnapshotStore + 'static,
    U: UploadStore + 'static,
{
    pub fn new(session: IntakeSession<S>, uploads: Arc<U>) -> Self {
        let assembler = PackageAssembler::new(
            DocumentCompiler::default(),
            TarGzArchive::default(),
            Arc::clone(&uploads),
        );
        Self {
            session: Mutex::new(session),
            uploads,
            assembler: Arc::new(assembler),
        }
    }

    fn session(&self) -> MutexGuard<'_, IntakeSession<S>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn assembler(&self) -> &Arc<SubmissionAssembler<U>> {
        &self.assembler
    }

    pub fn view(&self) -> IntakeView {
        let session = self.session();
        IntakeView {
            data: session.snapshot(),
            stage: stage_view(&session),
        }
    }

    pub fn stage(&self) -> StageView {
        stage_view(&self.session())
    }

    pub fn field(&self, path: &str) -> Result<Value, IntakeServiceError> {
        Ok(self.session().field(path)?)
    }

    pub fn set_field(&self, path: &str, value: Value) -> Result<StageView, IntakeServiceError> {
        let mut session = self.session();
        session.set_field(path, value)?;
        Ok(stage_view(&session))
    }

    pub fn advance(&self) -> Result<(Transition, StageView), IntakeServiceError> {
        let mut session = self.session();
        let transition = session.advance()?;
        Ok((transition, stage_view(&session)))
    }

    pub fn retreat(&self) -> Result<StageView, IntakeServiceError> {
        let mut session = self.session();
        session.retreat()?;
        Ok(stage_view(&session))
    }

    pub fn jump_to(&self, stage: u8) -> Result<StageView, IntakeServiceError> {
        let mut session = self.session();
        session.jump_to(stage)?;
        Ok(stage_view(&session))
    }

    /// Recorded errors from the last failed advance, or a live check of the
    /// current stage when none are recorded.
    pub fn errors(&self) -> Vec<FieldError> {
        let session = self.session();
        if session.stage_errors().is_empty() {
            session.check_current_stage().errors
        } else {
            session.stage_errors().to_vec()
        }
    }

    /// Stores upload bytes and attaches the resulting record to the intake.
    pub fn register_upload(
        &self,
        document_type: &str,
        file_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedDocument, IntakeServiceError> {
        let document_type = DocumentType::parse(document_type)
            .ok_or_else(|| IntakeServiceError::UnknownDocumentType(document_type.to_string()))?;
        let mut session = self.session();
        if session.is_submitted() {
            return Err(NavigationError::Submitted.into());
        }
        let document = accept_upload(self.uploads.as_ref(), document_type, file_name, mime_type, bytes)?;
        session.attach_document(document.clone())?;
        Ok(document)
    }

    /// Assembles the package from a snapshot taken now, after checking every
    /// stage of that snapshot again. Edits made while the worker runs are not
    /// observed.
    pub async fn package(&self) -> Result<SubmissionPackage, IntakeServiceError> {
        let (snapshot, today) = {
            let session = self.session();
            if session.status() != GateStatus::Submitted {
                return Err(IntakeServiceError::NotSubmitted);
            }
            let ctx = session.validation_context();
            let snapshot = session.snapshot();
            verify_submission(&snapshot, &ctx)?;
            (snapshot, ctx.today)
        };
        let worker = self.assembler.assemble_in_background(snapshot, today)?;
        let package = worker
            .await
            .map_err(|error| AssemblyError::Worker(error.to_string()))??;
        Ok(package)
    }

    /// Starts over and evicts the bytes of every document the old record held.
    pub fn restart(&self) -> StageView {
        let mut session = self.session();
        let references: Vec<String> = session
            .data()
            .documents
            .iter()
            .map(|document| document.file_reference.clone())
            .collect();
        session.restart();
        for reference in &references {
            if let Err(error) = self.uploads.remove(reference) {
                warn!(%reference, %error, "failed to evict upload on restart");
            }
        }
        stage_view(&session)
    }
}

fn stage_view<S: SnapshotStore + 'static>(session: &IntakeSession<S>) -> StageView {
    let current = session.current_stage();
    StageView {
        current: current.number(),
        label: current.label(),
        highest: session.highest_stage().number(),
        status: session.status(),
        restored: session.is_restored(),
        document_count: document_count(session.data()),
        errors: session.stage_errors().to_vec(),
    }
}
