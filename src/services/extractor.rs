use std::io::{Cursor, Read};
use std::time::Instant;

use anyhow::{anyhow, bail, Context};
use lopdf::Document;
use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use crate::error::{AppError, AppResult};
use crate::models::{DocumentKind, UploadedDocument};

const DOCX_BODY_PART: &str = "word/document.xml";
const DEFAULT_MAX_DOCUMENT_BYTES: usize = 80 * 1024 * 1024;

pub struct TextExtractor {
    max_document_bytes: usize,
}

#[derive(Debug)]
pub struct ExtractionResult {
    pub text: String,
    pub kind: DocumentKind,
    pub pages: Option<usize>,
    pub processing_time_ms: u64,
}

impl TextExtractor {
    pub fn new() -> Self {
        Self {
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
        }
    }

    /// Caps how far a compressed document part may expand while being read.
    pub fn with_max_document_bytes(mut self, max_document_bytes: usize) -> Self {
        self.max_document_bytes = max_document_bytes;
        self
    }

    /// Extracts raw text, dispatching on the filename suffix. Unsupported
    /// names are rejected before any parser sees the bytes.
    pub async fn extract_text(&self, file: UploadedDocument) -> AppResult<ExtractionResult> {
        let start = Instant::now();

        let kind = file.kind().ok_or(AppError::UnsupportedFormat)?;

        tracing::info!(
            "Starting {} text extraction for file: {} ({} bytes)",
            kind,
            file.name,
            file.size
        );

        let content = file.content;
        let max_document_bytes = self.max_document_bytes;
        // pdf-extract can panic on malformed input; the blocking pool turns that into a JoinError.
        let outcome = tokio::task::spawn_blocking(move || {
            let text = match kind {
                DocumentKind::Docx => extract_docx(&content, max_document_bytes),
                DocumentKind::Pdf => extract_pdf(&content),
            };
            let pages = match kind {
                DocumentKind::Pdf => count_pdf_pages(&content),
                DocumentKind::Docx => None,
            };
            text.map(|text| (text, pages))
        })
        .await;

        let (text, pages) = match outcome {
            Ok(Ok(extracted)) => extracted,
            Ok(Err(e)) => {
                tracing::warn!("{} extraction failed for {}: {:#}", kind, file.name, e);
                return Err(AppError::extraction(kind, format!("{:#}", e)));
            }
            Err(e) if e.is_panic() => {
                tracing::warn!("{} parser panicked on {}", kind, file.name);
                return Err(AppError::extraction(kind, "parser panicked on malformed input"));
            }
            Err(e) => return Err(e.into()),
        };

        let processing_time = start.elapsed().as_millis() as u64;

        tracing::info!(
            "{} extraction completed in {}ms, extracted {} characters",
            kind,
            processing_time,
            text.len()
        );

        Ok(ExtractionResult {
            text,
            kind,
            pages,
            processing_time_ms: processing_time,
        })
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn extract_pdf(content: &[u8]) -> anyhow::Result<String> {
    pdf_extract::extract_text_from_mem(content).context("pdf-extract could not read the document")
}

fn count_pdf_pages(content: &[u8]) -> Option<usize> {
    Document::load_mem(content).ok().map(|doc| doc.get_pages().len())
}

/// Reads the main document part of a .docx and emits the text of its runs.
/// Paragraphs end with a blank line, tabs and breaks are kept.
fn extract_docx(content: &[u8], max_bytes: usize) -> anyhow::Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(content)).context("not a zip container")?;

    let part = archive
        .by_name(DOCX_BODY_PART)
        .with_context(|| format!("missing {}", DOCX_BODY_PART))?;
    let limit = max_bytes as u64;
    if part.size() > limit {
        bail!("{} declares {} bytes, over the {} byte limit", DOCX_BODY_PART, part.size(), limit);
    }

    // The declared size is not trusted; the read itself stops past the limit.
    let mut xml = String::new();
    part.take(limit.saturating_add(1))
        .read_to_string(&mut xml)
        .with_context(|| format!("unreadable {}", DOCX_BODY_PART))?;
    if xml.len() as u64 > limit {
        bail!("{} expands past the {} byte limit", DOCX_BODY_PART, limit);
    }

    let mut reader = Reader::from_str(&xml);
    let mut text = String::new();
    let mut in_run_text = false;
    let mut saw_body = false;

    loop {
        match reader.read_event().context("malformed document XML")? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:t" => in_run_text = true,
                b"w:body" => saw_body = true,
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_run_text = false,
                b"w:p" => text.push_str("\n\n"),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                b"w:p" => text.push_str("\n\n"),
                b"w:body" => saw_body = true,
                _ => {}
            },
            Event::Text(t) if in_run_text => {
                text.push_str(&t.unescape().context("bad character reference")?);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_body {
        return Err(anyhow!("document part has no body"));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    const NO_LIMIT: usize = 1 << 30;

    fn docx(body: &str) -> Vec<u8> {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            body
        );
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file(DOCX_BODY_PART, SimpleFileOptions::default()).unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    fn one_page_pdf(line: &str) -> Vec<u8> {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(line)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_docx_paragraphs_and_runs() {
        let bytes = docx(
            r#"<w:p><w:r><w:t>Senior </w:t></w:r><w:r><w:t xml:space="preserve">Engineer </w:t></w:r></w:p><w:p><w:r><w:t>Rust</w:t><w:tab/><w:t>Go</w:t><w:br/><w:t>AT&amp;T</w:t></w:r></w:p>"#,
        );
        let text = extract_docx(&bytes, NO_LIMIT).unwrap();
        assert_eq!(text, "Senior Engineer \n\nRust\tGo\nAT&T\n\n");
    }

    #[test]
    fn test_docx_ignores_non_run_text() {
        let bytes = docx(r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Title</w:t></w:r></w:p>"#);
        assert_eq!(extract_docx(&bytes, NO_LIMIT).unwrap(), "Title\n\n");
    }

    #[test]
    fn test_docx_rejects_non_zip() {
        assert!(extract_docx(b"definitely not a zip", NO_LIMIT).is_err());
    }

    #[test]
    fn test_docx_rejects_archive_without_body() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file("readme.txt", SimpleFileOptions::default()).unwrap();
        writer.write_all(b"hello").unwrap();
        let bytes = writer.finish().unwrap().into_inner();
        assert!(extract_docx(&bytes, NO_LIMIT).is_err());
    }

    #[test]
    fn test_docx_expansion_over_limit_rejected() {
        let filler = "a".repeat(64 * 1024);
        let bytes = docx(&format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", filler));
        assert!(bytes.len() < 16 * 1024);

        let err = extract_docx(&bytes, 16 * 1024).unwrap_err();
        assert!(format!("{:#}", err).contains("byte limit"));
        assert!(extract_docx(&bytes, 128 * 1024).is_ok());
    }

    #[tokio::test]
    async fn test_docx_expansion_maps_to_extraction_error() {
        let filler = "a".repeat(64 * 1024);
        let bytes = docx(&format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", filler));
        let err = TextExtractor::new()
            .with_max_document_bytes(16 * 1024)
            .extract_text(UploadedDocument::new("bomb.docx".to_string(), bytes))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ExtractionFailed { kind: DocumentKind::Docx, .. }));
    }

    #[tokio::test]
    async fn test_pdf_text_and_page_count() {
        let bytes = one_page_pdf("React and MongoDB developer");
        let extractor = TextExtractor::new();
        let first = extractor
            .extract_text(UploadedDocument::new("cv.pdf".to_string(), bytes.clone()))
            .await
            .unwrap();
        let second = extractor
            .extract_text(UploadedDocument::new("CV.PDF".to_string(), bytes))
            .await
            .unwrap();

        assert!(first.text.contains("React and MongoDB developer"));
        assert_eq!(first.kind, DocumentKind::Pdf);
        assert_eq!(first.pages, Some(1));
        assert_eq!(first.text, second.text);
    }

    #[tokio::test]
    async fn test_extraction_is_deterministic() {
        let bytes = docx(r#"<w:p><w:r><w:t>React and MongoDB</w:t></w:r></w:p>"#);
        let extractor = TextExtractor::new();
        let first = extractor
            .extract_text(UploadedDocument::new("cv.docx".to_string(), bytes.clone()))
            .await
            .unwrap();
        let second = extractor
            .extract_text(UploadedDocument::new("CV.DOCX".to_string(), bytes))
            .await
            .unwrap();
        assert_eq!(first.text, second.text);
        assert_eq!(first.kind, DocumentKind::Docx);
        assert_eq!(first.pages, None);
    }

    #[tokio::test]
    async fn test_unsupported_suffix_rejected_before_parsing() {
        let extractor = TextExtractor::new();
        let err = extractor
            .extract_text(UploadedDocument::new("resume.txt".to_string(), b"plain".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat));
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_extraction_error() {
        let extractor = TextExtractor::new();
        let err = extractor
            .extract_text(UploadedDocument::new("resume.pdf".to_string(), b"%PDF-1.4 garbage".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ExtractionFailed { kind: DocumentKind::Pdf, .. }));
    }
}
