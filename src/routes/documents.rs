use axum::extract::multipart::MultipartError;
use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use tracing::info;

use crate::extract::{self, DocumentKind};
use crate::models::{AppState, AskResponse, ExtractResponse};
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/documents/ask", post(ask_document))
        .route("/api/documents/extract", post(extract_document))
        .with_state(state)
}

struct DocumentUpload {
    filename: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

fn bad_multipart(e: MultipartError) -> AppError {
    AppError::InvalidRequest(format!("invalid multipart payload: {}", e))
}

/// Pull the `file` part and an optional `prompt` part out of the upload.
async fn read_upload(
    multipart: &mut Multipart,
) -> AppResult<(Option<DocumentUpload>, Option<String>)> {
    let mut upload = None;
    let mut prompt = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(|c| c.to_string());
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                upload = Some(DocumentUpload {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            Some("prompt") => {
                prompt = Some(field.text().await.map_err(bad_multipart)?);
            }
            _ => {}
        }
    }

    Ok((upload, prompt))
}

/// The whole document-query flow in one request: the upload never outlives
/// the handler. Extraction must yield text before the model is called.
async fn ask_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<AskResponse>> {
    let (upload, prompt) = read_upload(&mut multipart).await?;

    let upload = upload
        .ok_or_else(|| AppError::InvalidRequest("missing file field".to_string()))?;
    let prompt = prompt
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::InvalidRequest("prompt must not be empty".to_string()))?;

    let kind = DocumentKind::from_upload(&upload.filename, upload.content_type.as_deref())?;
    let text = extract::extract_text(kind, &upload.bytes)?;
    if text.trim().is_empty() {
        return Err(AppError::Extraction(
            "document contains no extractable text".to_string(),
        ));
    }

    info!(
        filename = %upload.filename,
        kind = kind.as_str(),
        characters = text.len(),
        "Document question received"
    );

    let response = state.llm.ask_document(&text, &prompt).await?;

    Ok(Json(AskResponse {
        answer: response.content,
        model: state.llm.model().to_string(),
        document_kind: kind,
        extracted_characters: text.len(),
        usage: response.usage,
    }))
}

async fn extract_document(
    State(_state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<ExtractResponse>> {
    let (upload, _) = read_upload(&mut multipart).await?;
    let upload = upload
        .ok_or_else(|| AppError::InvalidRequest("missing file field".to_string()))?;

    let kind = DocumentKind::from_upload(&upload.filename, upload.content_type.as_deref())?;
    let text = extract::extract_text(kind, &upload.bytes)?;

    info!(filename = %upload.filename, kind = kind.as_str(), "Document extracted");

    Ok(Json(ExtractResponse {
        characters: text.len(),
        document_kind: kind,
        text,
    }))
}
