use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::auth::{ServiceAccountKey, TokenProvider};
use crate::config::SheetsConfig;
use crate::types::{AppError, AppResult};

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

pub struct SheetsClient {
    http: Client,
    tokens: TokenProvider,
    spreadsheet_id: String,
    worksheet_tab: String,
    base_url: String,
}

#[derive(Serialize)]
struct ValueRange {
    range: String,
    #[serde(rename = "majorDimension")]
    major_dimension: &'static str,
    values: Vec<Vec<String>>,
}

#[derive(Deserialize)]
struct UpdateValuesResponse {
    #[serde(rename = "updatedCells", default)]
    updated_cells: u32,
}

#[derive(Deserialize)]
struct SheetsErrorResponse {
    error: SheetsError,
}

#[derive(Deserialize)]
struct SheetsError {
    message: String,
}

/// Spreadsheet column letter for a zero-based index: 0 -> A, 25 -> Z, 26 -> AA.
fn column_letter(mut index: usize) -> String {
    let mut letters: Vec<char> = Vec::new();
    loop {
        letters.push((b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().collect()
}

impl SheetsClient {
    /// Startup capability check. `Ok(None)` means remote sync is simply not
    /// configured; `Err` means it was configured but the key is unusable.
    pub async fn from_config(config: &SheetsConfig) -> AppResult<Option<Self>> {
        let (Some(path), Some(spreadsheet_id)) =
            (&config.credentials_path, &config.spreadsheet_id)
        else {
            return Ok(None);
        };

        let key = ServiceAccountKey::from_file(path).await?;
        Ok(Some(Self::new(key, spreadsheet_id, &config.worksheet_tab)))
    }

    pub fn new(key: ServiceAccountKey, spreadsheet_id: &str, worksheet_tab: &str) -> Self {
        Self {
            http: Client::new(),
            tokens: TokenProvider::new(key),
            spreadsheet_id: spreadsheet_id.to_string(),
            worksheet_tab: worksheet_tab.to_string(),
            base_url: SHEETS_API_BASE.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn for_tests(base_url: &str, token: &str) -> Self {
        Self {
            http: Client::new(),
            tokens: TokenProvider::with_static_token(token),
            spreadsheet_id: "sheet-1".to_string(),
            worksheet_tab: "Sheet1".to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// A1 range of a single data cell. Row 1 on the remote sheet holds the
    /// header, so data row `i` lives on sheet row `i + 2`.
    fn cell_range(&self, row_index: usize, column_index: usize) -> String {
        format!(
            "{}!{}{}",
            self.worksheet_tab,
            column_letter(column_index),
            row_index + 2
        )
    }

    /// A1 range covering `rows` full rows starting at the header cell.
    fn sheet_range(&self, rows: usize, columns: usize) -> String {
        format!(
            "{}!A1:{}{}",
            self.worksheet_tab,
            column_letter(columns.saturating_sub(1)),
            rows.max(1)
        )
    }

    /// Write a single edited cell to the remote sheet.
    pub async fn push_cell(
        &self,
        row_index: usize,
        column_index: usize,
        value: &str,
    ) -> AppResult<u32> {
        let range = self.cell_range(row_index, column_index);
        self.put_values(&range, vec![vec![value.to_string()]]).await
    }

    /// Replace the remote sheet contents with the given rows (header first).
    pub async fn push_rows(&self, rows: &[Vec<String>]) -> AppResult<u32> {
        let columns = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let range = self.sheet_range(rows.len(), columns);
        self.put_values(&range, rows.to_vec()).await
    }

    async fn put_values(&self, range: &str, values: Vec<Vec<String>>) -> AppResult<u32> {
        let token = self.tokens.bearer_token().await?;
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.base_url, self.spreadsheet_id, range
        );
        let body = ValueRange {
            range: range.to_string(),
            major_dimension: "ROWS",
            values,
        };

        let response = self
            .http
            .put(&url)
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Sync(format!("Sheets request failed: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            if let Ok(error_response) = serde_json::from_str::<SheetsErrorResponse>(&error_text) {
                return Err(AppError::Sync(format!(
                    "Sheets API error ({}): {}",
                    status, error_response.error.message
                )));
            }

            return Err(AppError::Sync(format!(
                "Sheets API error ({}): {}",
                status, error_text
            )));
        }

        let update: UpdateValuesResponse = response
            .json()
            .await
            .map_err(|e| AppError::Sync(format!("failed to parse Sheets response: {}", e)))?;

        Ok(update.updated_cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(2), "C");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(column_letter(701), "ZZ");
    }

    #[test]
    fn test_cell_range_skips_header_row() {
        let client = SheetsClient::for_tests("http://localhost", "t");
        // Data row 1, column index 2 -> third column, sheet row 3.
        assert_eq!(client.cell_range(1, 2), "Sheet1!C3");
    }

    #[test]
    fn test_sheet_range_covers_header_and_rows() {
        let client = SheetsClient::for_tests("http://localhost", "t");
        assert_eq!(client.sheet_range(4, 3), "Sheet1!A1:C4");
    }

    #[tokio::test]
    async fn test_push_cell_hits_values_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/v4/spreadsheets/sheet-1/values/Sheet1!C3")
            .match_query(mockito::Matcher::UrlEncoded(
                "valueInputOption".into(),
                "RAW".into(),
            ))
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"spreadsheetId": "sheet-1", "updatedRange": "Sheet1!C3", "updatedCells": 1}"#)
            .create_async()
            .await;

        let client = SheetsClient::for_tests(&server.url(), "test-token");
        let updated = client.push_cell(1, 2, "approved").await.unwrap();

        mock.assert_async().await;
        assert_eq!(updated, 1);
    }

    #[tokio::test]
    async fn test_remote_error_is_a_sync_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("PUT", mockito::Matcher::Any)
            .with_status(403)
            .with_body(r#"{"error": {"code": 403, "message": "The caller does not have permission", "status": "PERMISSION_DENIED"}}"#)
            .create_async()
            .await;

        let client = SheetsClient::for_tests(&server.url(), "test-token");
        let err = client.push_cell(0, 0, "x").await.unwrap_err();

        assert!(matches!(err, AppError::Sync(_)));
        assert!(err.to_string().contains("does not have permission"));
    }

    #[tokio::test]
    async fn test_capability_check_without_config() {
        let config = SheetsConfig {
            credentials_path: None,
            spreadsheet_id: None,
            worksheet_tab: "Sheet1".to_string(),
        };
        let client = SheetsClient::from_config(&config).await.unwrap();
        assert!(client.is_none());
    }

    #[tokio::test]
    async fn test_capability_check_reads_key_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"client_email": "svc@project.iam.gserviceaccount.com", "private_key": "pem"}}"#
        )
        .unwrap();

        let config = SheetsConfig {
            credentials_path: Some(file.path().to_string_lossy().to_string()),
            spreadsheet_id: Some("sheet-1".to_string()),
            worksheet_tab: "Sheet1".to_string(),
        };
        let client = SheetsClient::from_config(&config).await.unwrap();
        assert!(client.is_some());
    }
}
