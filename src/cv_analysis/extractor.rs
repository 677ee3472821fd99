// src/cv_analysis/extractor.rs
use crate::app_log;
use crate::error::ExtractionError;
use crate::utils::get_file_extension;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};

/// Shortest extracted text still worth sending to the model.
pub const MIN_CV_TEXT_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Text,
}

impl DocumentKind {
    pub fn from_filename(filename: &str) -> Result<Self, ExtractionError> {
        match get_file_extension(filename).as_deref() {
            Some("pdf") => Ok(Self::Pdf),
            Some("docx") | Some("doc") => Ok(Self::Docx),
            Some("txt") => Ok(Self::Text),
            _ => Err(ExtractionError::UnsupportedFormat),
        }
    }
}

pub fn extract_text(bytes: &[u8], kind: DocumentKind) -> Result<String, ExtractionError> {
    match kind {
        DocumentKind::Pdf => extract_pdf(bytes),
        DocumentKind::Docx => extract_docx(bytes),
        DocumentKind::Text => Ok(String::from_utf8(bytes.to_vec())?),
    }
}

/// Run [`extract_text`] on the blocking pool. PDF and DOCX parsing is
/// CPU-bound and must not stall the async workers.
pub async fn extract_text_blocking(
    bytes: Vec<u8>,
    kind: DocumentKind,
) -> Result<String, ExtractionError> {
    let span = tracing::Span::current();
    tokio::task::spawn_blocking(move || span.in_scope(|| extract_text(&bytes, kind)))
        .await
        .map_err(|e| ExtractionError::Interrupted(e.to_string()))?
}

/// Extract by extension; files without a known extension are tried as PDF,
/// then as DOCX.
pub fn extract_text_guessing(bytes: &[u8], filename: &str) -> Result<String, ExtractionError> {
    match DocumentKind::from_filename(filename) {
        Ok(kind) => extract_text(bytes, kind),
        Err(_) => extract_pdf(bytes).or_else(|pdf_err| {
            app_log!(info, "{} is not a PDF ({}), trying DOCX", filename, pdf_err);
            extract_docx(bytes)
        }),
    }
}

/// Reject text too short to analyze.
pub fn ensure_enough_text(text: &str) -> Result<(), ExtractionError> {
    if text.trim().chars().count() < MIN_CV_TEXT_CHARS {
        return Err(ExtractionError::InsufficientText);
    }
    Ok(())
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    // pdf-extract panics on some malformed documents instead of returning an error
    let text = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
        .map_err(|_| ExtractionError::Pdf("malformed PDF document".to_string()))?
        .map_err(|e| ExtractionError::Pdf(e.to_string()))?;

    // pdf-extract separates pages with form feeds
    let pages: Vec<&str> = text
        .split('\x0c')
        .map(str::trim)
        .filter(|page| !page.is_empty())
        .collect();
    Ok(pages.join("\n"))
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractionError::Docx(format!("not a DOCX archive: {}", e)))?;

    let mut doc_xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|_| ExtractionError::Docx("missing word/document.xml".to_string()))?
        .read_to_string(&mut doc_xml)
        .map_err(|e| ExtractionError::Docx(e.to_string()))?;

    let mut reader = Reader::from_str(&doc_xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"p" => current.clear(),
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" => current.push('\t'),
                b"br" => current.push('\n'),
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"p" => {
                    if !current.trim().is_empty() {
                        paragraphs.push(std::mem::take(&mut current));
                    }
                }
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                let text = e
                    .unescape()
                    .map_err(|err| ExtractionError::Docx(format!("XML parse error: {}", err)))?;
                current.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractionError::Docx(format!("XML parse error: {}", e))),
            _ => {}
        }
    }

    Ok(paragraphs.join("\n"))
}
