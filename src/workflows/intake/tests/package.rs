use super::common::*;
use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};

use crate::workflows::intake::documents::LaidOutDocument;
use crate::workflows::intake::domain::DocumentType;
use crate::workflows::intake::uploads::UploadError;
use crate::workflows::intake::{
    document_count, suggested_file_name, AssemblyError, DocumentCompiler, DocumentKind,
    DocumentRenderer, InMemoryUploadStore, PackageAssembler, PdfRenderer, RenderError,
    TarGzArchive,
};

fn assembler(
    uploads: Arc<InMemoryUploadStore>,
) -> PackageAssembler<PdfRenderer, TarGzArchive, InMemoryUploadStore> {
    PackageAssembler::new(DocumentCompiler::default(), TarGzArchive::default(), uploads)
}

/// Blocks the first render until the test releases it.
struct GatedRenderer {
    release: Mutex<Option<mpsc::Receiver<()>>>,
}

impl DocumentRenderer for GatedRenderer {
    fn render(&self, document: &LaidOutDocument) -> Result<Vec<u8>, RenderError> {
        let waiting = self
            .release
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(receiver) = waiting {
            receiver
                .recv()
                .map_err(|error| RenderError::Encoding(error.to_string()))?;
        }
        PdfRenderer.render(document)
    }
}

struct FailingRenderer;

impl DocumentRenderer for FailingRenderer {
    fn render(&self, document: &LaidOutDocument) -> Result<Vec<u8>, RenderError> {
        if document.title.contains("127") {
            return Err(RenderError::Encoding("font table unavailable".to_string()));
        }
        PdfRenderer.render(document)
    }
}

#[test]
fn package_orders_rendered_documents_before_uploads() {
    let uploads = Arc::new(InMemoryUploadStore::new());
    let mut data = complete_intake(5);
    data.documents.push(stored_upload(&uploads, DocumentType::LossRuns, "runs-2024.pdf"));
    data.documents.push(stored_upload(&uploads, DocumentType::AuthorityLetter, "authority.pdf"));

    let package = assembler(Arc::clone(&uploads))
        .assemble(&data, today())
        .expect("package assembles");

    assert_eq!(
        package.entries,
        vec![
            "ACORD_125_Prairie_Line_Freight_LLC.pdf",
            "ACORD_127_Prairie_Line_Freight_LLC.pdf",
            "ACORD_129_Prairie_Line_Freight_LLC.pdf",
            "Loss_Runs_Prairie_Line_Freight_LLC.pdf",
            "MC_DOT_Authority_Letter_Prairie_Line_Freight_LLC.pdf",
        ]
    );
    assert_eq!(package.document_count, document_count(&data));
    assert_eq!(document_count(&data), 5);
    assert_eq!(
        package.file_name,
        "Intake_Submission_Prairie_Line_Freight_LLC_2025-06-15.tar.gz"
    );
    assert_eq!(package.file_name, suggested_file_name(&data, today()));

    let unpacked = unpack(&package.bytes);
    let names: Vec<&str> = unpacked.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, package.entries);
    for (name, bytes) in &unpacked[..3] {
        assert!(bytes.starts_with(b"%PDF-1.4"), "{name} is not a PDF");
    }
    assert_eq!(unpacked[4].1, b"%PDF-1.4 authority.pdf".to_vec());
}

#[test]
fn continuation_document_carries_only_overflow_vehicles() {
    let uploads = Arc::new(InMemoryUploadStore::new());
    let data = complete_intake(5);

    let package = assembler(uploads).assemble(&data, today()).expect("package assembles");
    let unpacked = unpack(&package.bytes);
    let (_, continuation) = unpacked
        .iter()
        .find(|(name, _)| name.starts_with("ACORD_129"))
        .expect("continuation present");

    assert!(contains(continuation, &vin(5)));
    for number in 1..=4 {
        assert!(!contains(continuation, &vin(number)), "vehicle {number} leaked");
    }
}

#[test]
fn four_vehicles_produce_no_continuation() {
    let uploads = Arc::new(InMemoryUploadStore::new());
    let data = complete_intake(4);

    let package = assembler(uploads).assemble(&data, today()).expect("package assembles");
    assert_eq!(package.entries.len(), 2);
    assert!(!package.entries.iter().any(|name| name.starts_with("ACORD_129")));
    assert_eq!(document_count(&data), 2);
}

#[test]
fn repeated_upload_types_get_numbered_names() {
    let uploads = Arc::new(InMemoryUploadStore::new());
    let mut data = complete_intake(1);
    data.business.legal_name = "  ".to_string();
    data.documents.push(stored_upload(&uploads, DocumentType::LossRuns, "runs-2023.PDF"));
    data.documents.push(stored_upload(&uploads, DocumentType::LossRuns, "runs-2024.pdf"));

    let package = assembler(uploads).assemble(&data, today()).expect("package assembles");
    assert_eq!(
        package.entries[2..],
        ["Loss_Runs_Business.pdf", "Loss_Runs_Business_2.pdf"]
    );
    assert_eq!(package.file_name, "Intake_Submission_Business_2025-06-15.tar.gz");
}

#[test]
fn missing_upload_aborts_the_whole_package() {
    let uploads = Arc::new(InMemoryUploadStore::new());
    let mut data = complete_intake(1);
    data.documents.push(upload(DocumentType::AuthorityLetter, "authority.pdf", "upload-999999"));

    let assembler = assembler(uploads);
    match assembler.assemble(&data, today()) {
        Err(AssemblyError::Upload(UploadError::Missing(reference))) => {
            assert_eq!(reference, "upload-999999")
        }
        other => panic!("expected missing upload, got {other:?}"),
    }
    assert!(!assembler.is_busy());
}

#[test]
fn render_failure_aborts_and_releases_the_guard() {
    let uploads = Arc::new(InMemoryUploadStore::new());
    let assembler = PackageAssembler::new(
        DocumentCompiler::new(FailingRenderer),
        TarGzArchive::default(),
        uploads,
    );

    match assembler.assemble(&complete_intake(1), today()) {
        Err(AssemblyError::Render(RenderError::Encoding(message))) => {
            assert_eq!(message, "font table unavailable")
        }
        other => panic!("expected render failure, got {other:?}"),
    }
    assert!(!assembler.is_busy());
}

#[tokio::test]
async fn second_assembly_is_rejected_while_one_is_running() {
    let (release, receiver) = mpsc::channel();
    let uploads = Arc::new(InMemoryUploadStore::new());
    let assembler = Arc::new(PackageAssembler::new(
        DocumentCompiler::new(GatedRenderer {
            release: Mutex::new(Some(receiver)),
        }),
        TarGzArchive::default(),
        uploads,
    ));
    let data = complete_intake(2);

    let running = assembler
        .assemble_in_background(data.clone(), today())
        .expect("first assembly starts");
    assert!(assembler.is_busy());

    match assembler.assemble(&data, today()) {
        Err(AssemblyError::Busy) => {}
        other => panic!("expected busy, got {other:?}"),
    }
    match assembler.assemble_in_background(data.clone(), today()) {
        Err(AssemblyError::Busy) => {}
        Err(other) => panic!("expected busy, got {other:?}"),
        Ok(_) => panic!("expected busy, got a second worker"),
    }

    release.send(()).expect("renderer waiting");
    let package = running
        .await
        .expect("worker joined")
        .expect("first assembly completes");
    assert_eq!(package.entries.len(), 2);

    assert!(!assembler.is_busy());
    assembler.assemble(&data, today()).expect("guard released");
}

#[test]
fn compiled_documents_paginate_and_title_each_form() {
    let data = complete_intake(9);
    let compiler = DocumentCompiler::default();

    let application = compiler
        .compile(
            DocumentKind::Application,
            &crate::workflows::intake::project(&data, DocumentKind::Application, today()),
            today(),
        )
        .expect("application renders");
    assert!(application.page_count >= 2);
    assert!(contains(&application.bytes, "ACORD 125 - Page 1 of"));

    let continuation = compiler
        .compile(
            DocumentKind::VehicleContinuation,
            &crate::workflows::intake::project(&data, DocumentKind::VehicleContinuation, today()),
            today(),
        )
        .expect("continuation renders");
    assert!(contains(&continuation.bytes, "Generated: 2025-06-15"));
    assert!(contains(&continuation.bytes, &vin(9)));
}

#[test]
fn template_rejects_projections_missing_a_field() {
    let data = complete_intake(1);
    let mut fields = crate::workflows::intake::project(&data, DocumentKind::TruckingSupplement, today());
    fields.retain(|(name, _)| name != "Q6_FleetSize");

    match DocumentCompiler::default().compile(DocumentKind::TruckingSupplement, &fields, today()) {
        Err(RenderError::MissingField { kind, field }) => {
            assert_eq!(kind, DocumentKind::TruckingSupplement);
            assert_eq!(field, "Q6_FleetSize");
        }
        other => panic!("expected missing field, got {other:?}"),
    }
}
