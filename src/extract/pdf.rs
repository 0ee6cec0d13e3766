use lopdf::Document;

use crate::types::{AppError, AppResult};

/// Concatenate the text of every page, in page order.
pub fn extract(bytes: &[u8]) -> AppResult<String> {
    let doc = Document::load_mem(bytes)
        .map_err(|e| AppError::Extraction(format!("failed to parse PDF: {}", e)))?;

    let mut out = String::new();
    // get_pages is keyed by page number, so iteration order is page order.
    for page_number in doc.get_pages().keys() {
        let text = doc.extract_text(&[*page_number]).map_err(|e| {
            AppError::Extraction(format!(
                "failed to extract text from page {}: {}",
                page_number, e
            ))
        })?;
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(text.trim_end());
    }
    Ok(out)
}
