use std::sync::Arc;

use crate::config::Config;
use crate::extract::DocumentKind;
use crate::grid::{Worksheet, WorksheetRegistry};
use crate::llm::Llm;
use crate::sheets::SheetsClient;
use crate::types::TokenUsage;

/// Request-scoped context handed to every handler. `sheets` is populated by
/// the startup capability check; `None` means local-only mode for the life of
/// the process.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub llm: Arc<Llm>,
    pub sheets: Option<Arc<SheetsClient>>,
    pub worksheets: WorksheetRegistry,
}

impl AppState {
    pub fn remote_sync_enabled(&self) -> bool {
        self.sheets.is_some()
    }
}

// API Request/Response types

#[derive(Debug, serde::Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub model: String,
    pub document_kind: DocumentKind,
    pub extracted_characters: usize,
    pub usage: TokenUsage,
}

#[derive(Debug, serde::Serialize)]
pub struct ExtractResponse {
    pub document_kind: DocumentKind,
    pub text: String,
    pub characters: usize,
}

#[derive(Debug, serde::Deserialize)]
pub struct LoadRowsRequest {
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, serde::Deserialize)]
pub struct CellEditRequest {
    pub row: usize,
    pub column: String,
    pub value: String,
}

/// Outcome of the optional remote push that follows an edit. The in-memory
/// edit has already been committed whichever variant this is.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SyncStatus {
    Synced { updated_cells: u32 },
    Disabled,
    Failed { message: String },
}

#[derive(Debug, serde::Serialize)]
pub struct WorksheetResponse {
    pub worksheet: Worksheet,
    pub remote_sync_enabled: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct CellEditResponse {
    pub worksheet: Worksheet,
    pub sync: SyncStatus,
}

#[derive(Debug, serde::Serialize)]
pub struct PushResponse {
    pub sync: SyncStatus,
}

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub remote_sync: String,
}
