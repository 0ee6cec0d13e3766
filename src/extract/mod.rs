//! Text extraction for uploaded documents.
//!
//! The upload declares a format (from its filename or content type) and the
//! blob is sniffed before parsing; a mismatch fails fast instead of handing
//! garbled bytes to the wrong parser.

mod docx;
mod pdf;

use crate::types::{AppError, AppResult};

const PDF_MAGIC: &[u8] = b"%PDF-";
// DOCX is a ZIP container; the local-file header is enough to tell it apart.
const ZIP_MAGIC: &[u8] = &[0x50, 0x4b, 0x03, 0x04];

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Docx => "docx",
        }
    }

    /// Resolve the declared format from the upload's filename, falling back
    /// to the multipart content type.
    pub fn from_upload(filename: &str, content_type: Option<&str>) -> AppResult<Self> {
        let guessed = mime_guess::from_path(filename).first_raw();
        if let Some(kind) = guessed.and_then(Self::from_mime).or_else(|| {
            content_type.and_then(Self::from_mime)
        }) {
            return Ok(kind);
        }
        Err(AppError::InvalidRequest(format!(
            "unsupported document type: {} (expected a .pdf or .docx file)",
            filename
        )))
    }

    fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "application/pdf" => Some(DocumentKind::Pdf),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Some(DocumentKind::Docx)
            }
            _ => None,
        }
    }
}

fn sniff(bytes: &[u8]) -> Option<DocumentKind> {
    if bytes.starts_with(PDF_MAGIC) {
        Some(DocumentKind::Pdf)
    } else if bytes.starts_with(ZIP_MAGIC) {
        Some(DocumentKind::Docx)
    } else {
        None
    }
}

/// Extract the plain text of an uploaded blob, in document order.
pub fn extract_text(kind: DocumentKind, bytes: &[u8]) -> AppResult<String> {
    match sniff(bytes) {
        Some(actual) if actual == kind => {}
        Some(actual) => {
            return Err(AppError::Extraction(format!(
                "file was uploaded as {} but its content looks like {}",
                kind.as_str(),
                actual.as_str()
            )));
        }
        None => {
            return Err(AppError::Extraction(format!(
                "file content does not match any supported format (expected {})",
                kind.as_str()
            )));
        }
    }

    match kind {
        DocumentKind::Pdf => pdf::extract(bytes),
        DocumentKind::Docx => docx::extract(bytes),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_filename() {
        assert_eq!(
            DocumentKind::from_upload("report.pdf", None).unwrap(),
            DocumentKind::Pdf
        );
        assert_eq!(
            DocumentKind::from_upload("notes.docx", None).unwrap(),
            DocumentKind::Docx
        );
    }

    #[test]
    fn test_kind_falls_back_to_content_type() {
        let kind = DocumentKind::from_upload("upload.bin", Some("application/pdf")).unwrap();
        assert_eq!(kind, DocumentKind::Pdf);
    }

    #[test]
    fn test_unsupported_kind_is_rejected() {
        let err = DocumentKind::from_upload("image.png", None).unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[test]
    fn test_pdf_extraction_produces_text() {
        let bytes = testdata::one_page_pdf("Hello World");
        let text = extract_text(DocumentKind::Pdf, &bytes).unwrap();
        assert!(text.contains("Hello World"), "got: {:?}", text);
    }

    #[test]
    fn test_docx_extraction_produces_text() {
        let bytes = testdata::one_paragraph_docx("Hello World");
        let text = extract_text(DocumentKind::Docx, &bytes).unwrap();
        assert!(text.contains("Hello World"), "got: {:?}", text);
    }

    #[test]
    fn test_declared_kind_must_match_signature() {
        let pdf_bytes = testdata::one_page_pdf("Hello World");
        let err = extract_text(DocumentKind::Docx, &pdf_bytes).unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
        assert!(err.to_string().contains("looks like pdf"));
    }

    #[test]
    fn test_unrecognized_signature_is_rejected() {
        let err = extract_text(DocumentKind::Pdf, b"not a document at all").unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
    }

    #[test]
    fn test_corrupt_pdf_fails_with_extraction_error() {
        // Valid magic, garbage body.
        let mut bytes = b"%PDF-1.5\n".to_vec();
        bytes.extend_from_slice(&[0u8; 64]);
        let err = extract_text(DocumentKind::Pdf, &bytes).unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
    }
}
