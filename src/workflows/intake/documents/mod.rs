//! Turns projected field lists into paginated documents.

pub mod layout;
mod pdf;
mod templates;

use chrono::NaiveDate;

use super::mapping::{DocumentKind, FieldList};

pub use layout::{DrawOp, LaidOutDocument, Page};
pub use pdf::PdfRenderer;
pub use templates::lay_out;

/// Capability that serializes laid-out pages into a document byte stream.
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, document: &LaidOutDocument) -> Result<Vec<u8>, RenderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("{kind:?} template references `{field}`, which the projection did not provide")]
    MissingField { kind: DocumentKind, field: String },
    #[error("document `{0}` has no pages")]
    EmptyDocument(String),
    #[error("failed to encode document content: {0}")]
    Encoding(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub kind: DocumentKind,
    pub page_count: usize,
    pub bytes: Vec<u8>,
}

pub struct DocumentCompiler<R> {
    renderer: R,
}

impl<R: DocumentRenderer> DocumentCompiler<R> {
    pub fn new(renderer: R) -> Self {
        Self { renderer }
    }

    pub fn compile(
        &self,
        kind: DocumentKind,
        fields: &FieldList,
        generated_on: NaiveDate,
    ) -> Result<RenderedDocument, RenderError> {
        let document = lay_out(kind, fields, generated_on)?;
        let page_count = document.pages.len();
        let bytes = self.renderer.render(&document)?;
        Ok(RenderedDocument {
            kind,
            page_count,
            bytes,
        })
    }
}

impl Default for DocumentCompiler<PdfRenderer> {
    fn default() -> Self {
        Self::new(PdfRenderer)
    }
}
