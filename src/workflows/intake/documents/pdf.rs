use std::fmt::Write as _;

use super::layout::{DrawOp, LaidOutDocument, PAGE_HEIGHT, PAGE_WIDTH};
use super::{DocumentRenderer, RenderError};

/// Writes laid-out pages as an uncompressed PDF 1.4 file using the built-in
/// Helvetica faces. Output is a pure function of the input pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfRenderer;

const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const REGULAR_FONT_ID: usize = 3;
const BOLD_FONT_ID: usize = 4;
const INFO_ID: usize = 5;
const FIRST_PAGE_ID: usize = 6;

impl DocumentRenderer for PdfRenderer {
    fn render(&self, document: &LaidOutDocument) -> Result<Vec<u8>, RenderError> {
        if document.pages.is_empty() {
            return Err(RenderError::EmptyDocument(document.title.clone()));
        }

        let page_ids: Vec<usize> = (0..document.pages.len())
            .map(|index| FIRST_PAGE_ID + index * 2)
            .collect();
        let mut objects: Vec<(usize, Vec<u8>)> = Vec::new();

        objects.push((
            CATALOG_ID,
            format!("<< /Type /Catalog /Pages {PAGES_ID} 0 R >>").into_bytes(),
        ));
        let kids = page_ids
            .iter()
            .map(|id| format!("{id} 0 R"))
            .collect::<Vec<_>>()
            .join(" ");
        objects.push((
            PAGES_ID,
            format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", page_ids.len()).into_bytes(),
        ));
        objects.push((
            REGULAR_FONT_ID,
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_vec(),
        ));
        objects.push((
            BOLD_FONT_ID,
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
                .to_vec(),
        ));
        objects.push((
            INFO_ID,
            format!(
                "<< /Title ({}) /Producer (fleet-intake) >>",
                escape_text(&document.title)
            )
            .into_bytes(),
        ));

        for (page, page_id) in document.pages.iter().zip(&page_ids) {
            let content_id = page_id + 1;
            objects.push((
                *page_id,
                format!(
                    "<< /Type /Page /Parent {PAGES_ID} 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                     /Resources << /Font << /F1 {REGULAR_FONT_ID} 0 R /F2 {BOLD_FONT_ID} 0 R >> >> \
                     /Contents {content_id} 0 R >>"
                )
                .into_bytes(),
            ));
            let stream = content_stream(&page.ops)?;
            let mut body = format!("<< /Length {} >>\nstream\n", stream.len()).into_bytes();
            body.extend_from_slice(stream.as_bytes());
            body.extend_from_slice(b"\nendstream");
            objects.push((content_id, body));
        }

        objects.sort_by_key(|(id, _)| *id);
        Ok(serialize(&objects))
    }
}

fn content_stream(ops: &[DrawOp]) -> Result<String, RenderError> {
    let mut stream = String::new();
    for op in ops {
        let written = match op {
            DrawOp::Text {
                x,
                y,
                size,
                bold,
                text,
            } => {
                let font = if *bold { "F2" } else { "F1" };
                writeln!(
                    stream,
                    "BT /{font} {size} Tf {x} {y} Td ({}) Tj ET",
                    escape_text(text)
                )
            }
            DrawOp::Rule {
                x1,
                x2,
                y,
                thickness,
            } => writeln!(stream, "{thickness} w {x1} {y} m {x2} {y} l S"),
        };
        written.map_err(|error| RenderError::Encoding(error.to_string()))?;
    }
    Ok(stream)
}

/// Escapes PDF string delimiters and writes non-ASCII text as WinAnsi octal
/// escapes. Characters the encoding lacks become `?`.
fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '(' | ')' => {
                escaped.push('\\');
                escaped.push(c);
            }
            ' '..='~' => escaped.push(c),
            _ => match win_ansi_code(c) {
                Some(code) => escaped.push_str(&format!("\\{code:03o}")),
                None => escaped.push('?'),
            },
        }
    }
    escaped
}

/// WinAnsiEncoding byte for a non-ASCII character.
fn win_ansi_code(c: char) -> Option<u8> {
    match c {
        '\u{a0}'..='\u{ff}' => u8::try_from(u32::from(c)).ok(),
        '€' => Some(0x80),
        '‚' => Some(0x82),
        '„' => Some(0x84),
        '…' => Some(0x85),
        '‘' => Some(0x91),
        '’' => Some(0x92),
        '“' => Some(0x93),
        '”' => Some(0x94),
        '•' => Some(0x95),
        '–' => Some(0x96),
        '—' => Some(0x97),
        '™' => Some(0x99),
        _ => None,
    }
}

fn serialize(objects: &[(usize, Vec<u8>)]) -> Vec<u8> {
    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (id, body) in objects {
        offsets.push(out.len());
        out.extend_from_slice(format!("{id} 0 obj\n").as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_offset = out.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        xref.push_str(&format!("{offset:010} 00000 n \n"));
    }
    xref.push_str(&format!(
        "trailer\n<< /Size {} /Root {CATALOG_ID} 0 R /Info {INFO_ID} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
        objects.len() + 1
    ));
    out.extend_from_slice(xref.as_bytes());
    out
}
