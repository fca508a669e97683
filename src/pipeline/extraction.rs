//! PDF text extraction for uploaded order templates.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),
}

/// Text extraction abstraction (allows mocking the PDF step).
pub trait PdfExtractor {
    /// Extract the document text: per-page text concatenated in page
    /// order. Quality is opaque; empty or partial text is passed through
    /// as-is.
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// PDF text extractor using the pdf-extract crate.
/// Handles digital PDFs with embedded text layers.
pub struct PdfTextExtractor;

impl PdfExtractor for PdfTextExtractor {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
        let page_texts = pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
            .map_err(|e| ExtractionError::PdfParsing(e.to_string()))?;

        tracing::debug!(pages = page_texts.len(), "extracted pdf text");
        Ok(page_texts.join("\n"))
    }
}

/// Generate a valid PDF with one page per text using lopdf (the
/// library that pdf-extract uses internally). Shared with the API
/// router tests, which need real PDF bytes for upload requests.
#[cfg(test)]
pub(crate) fn make_test_pdf(page_texts: &[&str]) -> Vec<u8> {
    use lopdf::dictionary;
    use lopdf::{Document, Object, Stream};

    let mut doc = Document::with_version("1.4");

    // Font dictionary
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut page_ids: Vec<Object> = Vec::new();
    for text in page_texts {
        // Page content stream: BT /F1 12 Tf (text) Tj ET
        let content = format!("BT /F1 12 Tf 100 700 Td ({text}) Tj ET");
        let content_stream = Stream::new(dictionary! {}, content.into_bytes());
        let content_id = doc.add_object(content_stream);

        let resources = dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        };

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => resources,
        });
        page_ids.push(page_id.into());
    }

    let kids_count = page_ids.len() as i64;
    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => page_ids.clone(),
        "Count" => kids_count,
    });

    // Update page parents
    for page_ref in &page_ids {
        if let Object::Reference(id) = page_ref {
            if let Ok(Object::Dictionary(ref mut dict)) = doc.get_object_mut(*id) {
                dict.set("Parent", pages_id);
            }
        }
    }

    // Catalog
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });

    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
