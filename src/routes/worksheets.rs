use axum::extract::multipart::MultipartError;
use axum::{
    extract::{Multipart, Path, State},
    routing::{get, patch, post},
    Json, Router,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::grid::{self, Worksheet};
use crate::models::{
    AppState, CellEditRequest, CellEditResponse, LoadRowsRequest, PushResponse, SyncStatus,
    WorksheetResponse,
};
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/worksheets", post(load_worksheet))
        .route("/api/worksheets/sample", post(load_sample))
        .route("/api/worksheets/rows", post(load_rows))
        .route("/api/worksheets/{id}", get(get_worksheet))
        .route("/api/worksheets/{id}/cells", patch(edit_cell))
        .route("/api/worksheets/{id}/push", post(push_worksheet))
        .with_state(state)
}

fn bad_multipart(e: MultipartError) -> AppError {
    AppError::InvalidRequest(format!("invalid multipart payload: {}", e))
}

fn respond(state: &AppState, worksheet: Worksheet) -> Json<WorksheetResponse> {
    Json(WorksheetResponse {
        worksheet,
        remote_sync_enabled: state.remote_sync_enabled(),
    })
}

/// Load a worksheet from an uploaded CSV or XLSX file.
async fn load_worksheet(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<WorksheetResponse>> {
    let mut parsed: Option<Worksheet> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().map(|n| n.to_string());
        if name.as_deref() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let bytes = field.bytes().await.map_err(bad_multipart)?;

        let lower = filename.to_lowercase();
        let worksheet = if lower.ends_with(".csv") {
            grid::worksheet_from_csv(&filename, &bytes)?
        } else if lower.ends_with(".xlsx") {
            grid::worksheet_from_xlsx(&filename, &bytes)?
        } else {
            return Err(AppError::InvalidRequest(format!(
                "unsupported worksheet type: {} (expected a .csv or .xlsx file)",
                filename
            )));
        };
        parsed = Some(worksheet);
    }

    let worksheet =
        parsed.ok_or_else(|| AppError::InvalidRequest("missing file field".to_string()))?;
    info!(
        worksheet = %worksheet.id,
        rows = worksheet.row_count(),
        "Worksheet loaded from upload"
    );

    state.worksheets.insert(worksheet.clone()).await;
    Ok(respond(&state, worksheet))
}

/// Open the grid without any source: a generated starter dataset.
async fn load_sample(State(state): State<AppState>) -> AppResult<Json<WorksheetResponse>> {
    let worksheet = grid::sample_worksheet();
    state.worksheets.insert(worksheet.clone()).await;
    Ok(respond(&state, worksheet))
}

/// Load a worksheet from explicit columns and rows.
async fn load_rows(
    State(state): State<AppState>,
    Json(request): Json<LoadRowsRequest>,
) -> AppResult<Json<WorksheetResponse>> {
    let name = request.name.unwrap_or_else(|| "worksheet".to_string());
    let worksheet = grid::worksheet_from_rows(&name, request.columns, request.rows)?;
    state.worksheets.insert(worksheet.clone()).await;
    Ok(respond(&state, worksheet))
}

async fn get_worksheet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<WorksheetResponse>> {
    let worksheet = state
        .worksheets
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("worksheet {}", id)))?;
    Ok(respond(&state, worksheet))
}

/// Apply a cell edit. The in-memory collection is updated first; the remote
/// push (when a handle exists) reports its outcome without ever undoing the
/// local edit.
async fn edit_cell(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CellEditRequest>,
) -> AppResult<Json<CellEditResponse>> {
    let worksheet = state
        .worksheets
        .update_cell(id, request.row, &request.column, request.value.clone())
        .await?;

    let sync = match &state.sheets {
        None => SyncStatus::Disabled,
        Some(client) => {
            let column_index = worksheet
                .column_index(&request.column)
                .ok_or_else(|| AppError::Internal("edited column is missing".to_string()))?;
            match client
                .push_cell(request.row, column_index, &request.value)
                .await
            {
                Ok(updated_cells) => SyncStatus::Synced { updated_cells },
                Err(e) => {
                    warn!(worksheet = %id, "Remote push failed: {}", e);
                    SyncStatus::Failed {
                        message: e.to_string(),
                    }
                }
            }
        }
    };

    Ok(Json(CellEditResponse { worksheet, sync }))
}

/// Push the whole worksheet (header row first) to the remote sheet.
async fn push_worksheet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PushResponse>> {
    let worksheet = state
        .worksheets
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("worksheet {}", id)))?;

    let Some(client) = &state.sheets else {
        return Ok(Json(PushResponse {
            sync: SyncStatus::Disabled,
        }));
    };

    let updated_cells = client.push_rows(&worksheet.rows_with_header()).await?;
    info!(worksheet = %id, updated_cells, "Worksheet pushed to remote sheet");

    Ok(Json(PushResponse {
        sync: SyncStatus::Synced { updated_cells },
    }))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::routes::test_support;

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_edit_without_remote_handle_stays_local() {
        let state = test_support::state();
        let app = crate::routes::create_router(state.clone());

        // Load the generated 3-row sample.
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/worksheets/sample")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let loaded = json_body(response).await;
        assert_eq!(loaded["remote_sync_enabled"], false);
        assert_eq!(loaded["worksheet"]["rows"].as_array().unwrap().len(), 3);
        let id = loaded["worksheet"]["id"].as_str().unwrap().to_string();

        // Edit row 1 (the second row).
        let response = app
            .clone()
            .oneshot(json_request(
                "PATCH",
                &format!("/api/worksheets/{id}/cells"),
                serde_json::json!({"row": 1, "column": "status", "value": "approved"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let edited = json_body(response).await;
        assert_eq!(edited["sync"]["state"], "disabled");
        assert_eq!(edited["worksheet"]["rows"][1][2], "approved");

        // The registry reflects the edit; no remote handle ever existed, so
        // no remote write could have been attempted.
        assert!(!state.remote_sync_enabled());
        let fetched = state
            .worksheets
            .get(id.parse().unwrap())
            .await
            .unwrap();
        assert_eq!(fetched.rows[1][2], "approved");
    }

    #[tokio::test]
    async fn test_edit_survives_remote_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("PUT", mockito::Matcher::Any)
            .with_status(401)
            .with_body(r#"{"error": {"code": 401, "message": "Request had invalid authentication credentials", "status": "UNAUTHENTICATED"}}"#)
            .create_async()
            .await;

        let state = test_support::state_with_sheets(&server.url());
        let app = crate::routes::create_router(state.clone());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/worksheets/sample")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let loaded = json_body(response).await;
        assert_eq!(loaded["remote_sync_enabled"], true);
        let id = loaded["worksheet"]["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(json_request(
                "PATCH",
                &format!("/api/worksheets/{id}/cells"),
                serde_json::json!({"row": 0, "column": "status", "value": "rejected"}),
            ))
            .await
            .unwrap();

        // The push failed but the edit is committed and reported as such.
        assert_eq!(response.status(), StatusCode::OK);
        let edited = json_body(response).await;
        assert_eq!(edited["sync"]["state"], "failed");
        assert!(edited["sync"]["message"]
            .as_str()
            .unwrap()
            .contains("invalid authentication"));
        assert_eq!(edited["worksheet"]["rows"][0][2], "rejected");

        let fetched = state
            .worksheets
            .get(id.parse().unwrap())
            .await
            .unwrap();
        assert_eq!(fetched.rows[0][2], "rejected");
    }

    #[tokio::test]
    async fn test_edit_pushes_single_cell_when_remote_configured() {
        let mut server = mockito::Server::new_async().await;
        // status is the third column; row 1 lands on sheet row 3.
        let mock = server
            .mock("PUT", "/v4/spreadsheets/sheet-1/values/Sheet1!C3")
            .match_query(mockito::Matcher::UrlEncoded(
                "valueInputOption".into(),
                "RAW".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"updatedCells": 1}"#)
            .create_async()
            .await;

        let state = test_support::state_with_sheets(&server.url());
        let app = crate::routes::create_router(state);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/worksheets/sample")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let loaded = json_body(response).await;
        let id = loaded["worksheet"]["id"].as_str().unwrap().to_string();

        let response = app
            .oneshot(json_request(
                "PATCH",
                &format!("/api/worksheets/{id}/cells"),
                serde_json::json!({"row": 1, "column": "status", "value": "shipped"}),
            ))
            .await
            .unwrap();

        let edited = json_body(response).await;
        assert_eq!(edited["sync"]["state"], "synced");
        assert_eq!(edited["sync"]["updated_cells"], 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_load_rows_and_fetch() {
        let state = test_support::state();
        let app = crate::routes::create_router(state);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/worksheets/rows",
                serde_json::json!({
                    "name": "expenses",
                    "columns": ["month", "total"],
                    "rows": [["January", "1200"], ["February", "980"]]
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let loaded = json_body(response).await;
        let id = loaded["worksheet"]["id"].as_str().unwrap().to_string();

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/worksheets/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let fetched = json_body(response).await;
        assert_eq!(fetched["worksheet"]["name"], "expenses");
        assert_eq!(fetched["worksheet"]["rows"][1][0], "February");
    }

    #[tokio::test]
    async fn test_unknown_worksheet_is_404() {
        let state = test_support::state();
        let app = crate::routes::create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/worksheets/{}", uuid::Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_push_without_remote_handle_reports_disabled() {
        let state = test_support::state();
        let app = crate::routes::create_router(state);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/worksheets/sample")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let loaded = json_body(response).await;
        let id = loaded["worksheet"]["id"].as_str().unwrap().to_string();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/worksheets/{id}/push"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let pushed = json_body(response).await;
        assert_eq!(pushed["sync"]["state"], "disabled");
    }
}
