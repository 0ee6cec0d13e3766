use std::io::Cursor;

use docx_rust::document::{BodyContent, ParagraphContent, RunContent};
use docx_rust::DocxFile;

use crate::types::{AppError, AppResult};

/// Concatenate body paragraphs, one line per paragraph.
pub fn extract(bytes: &[u8]) -> AppResult<String> {
    let file = DocxFile::from_reader(Cursor::new(bytes.to_vec()))
        .map_err(|e| AppError::Extraction(format!("failed to open DOCX file: {:?}", e)))?;
    let docx = file
        .parse()
        .map_err(|e| AppError::Extraction(format!("failed to parse DOCX file: {:?}", e)))?;

    let mut out = String::new();
    for content in &docx.document.body.content {
        let BodyContent::Paragraph(paragraph) = content else {
            continue;
        };
        let mut line = String::new();
        for para_content in &paragraph.content {
            if let ParagraphContent::Run(run) = para_content {
                for run_content in &run.content {
                    if let RunContent::Text(text) = run_content {
                        line.push_str(text.text.as_ref());
                    }
                }
            }
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&line);
    }
    Ok(out)
}
