//! Selected day and record editing endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch, post, put},
};
use dayplan_core::{DateKey, Timetable};
use dayplan_core::auth::AuthProvider;
use dayplan_core::planner::{LoadOutcome, PlannerView};
use dayplan_core::store::DocumentStore;
use serde::{Deserialize, Serialize};

use crate::routes::AppError;
use crate::state::AppState;

pub const SAVED_MESSAGE: &str = "✅ 저장되었습니다!";

pub fn router<A, S>() -> Router<AppState<A, S>>
where
    A: AuthProvider + 'static,
    S: DocumentStore + 'static,
{
    Router::new()
        .route("/state", get(view::<A, S>))
        .route("/date", put(select_date::<A, S>))
        .route("/record", patch(edit_record::<A, S>))
        .route("/record/slots/{index}", put(edit_slot::<A, S>))
        .route("/record/save", post(save::<A, S>))
}

/// GET /state - Everything the UI renders
async fn view<A: AuthProvider, S: DocumentStore>(
    State(state): State<AppState<A, S>>,
) -> Json<PlannerView> {
    Json(state.planner.view().await)
}

#[derive(Deserialize)]
pub struct SelectDateRequest {
    pub date: DateKey,
}

#[derive(Serialize)]
pub struct SelectDateResponse {
    pub load: LoadOutcome,
    pub view: PlannerView,
}

/// PUT /date - Select a day; loads its record when signed in
async fn select_date<A: AuthProvider, S: DocumentStore>(
    State(state): State<AppState<A, S>>,
    Json(req): Json<SelectDateRequest>,
) -> Result<Json<SelectDateResponse>, AppError> {
    let load = state.planner.select_date(req.date).await?;
    let view = state.planner.view().await;

    Ok(Json(SelectDateResponse { load, view }))
}

/// Request body for editing the in-memory record. Omitted fields are kept.
#[derive(Deserialize)]
pub struct EditRecordRequest {
    pub note: Option<String>,
    pub timetable: Option<Vec<String>>,
}

/// PATCH /record - Edit the note and/or the whole timetable
async fn edit_record<A: AuthProvider, S: DocumentStore>(
    State(state): State<AppState<A, S>>,
    Json(req): Json<EditRecordRequest>,
) -> Result<Json<PlannerView>, AppError> {
    // Validate before touching anything so a bad timetable leaves the note as is
    let timetable = req.timetable.map(Timetable::try_from).transpose()?;

    if let Some(note) = req.note {
        state.planner.set_note(note).await;
    }
    if let Some(timetable) = timetable {
        state.planner.set_timetable(timetable).await;
    }

    Ok(Json(state.planner.view().await))
}

#[derive(Deserialize)]
pub struct EditSlotRequest {
    pub value: String,
}

/// PUT /record/slots/:index - Edit one timetable slot (0-based)
async fn edit_slot<A: AuthProvider, S: DocumentStore>(
    State(state): State<AppState<A, S>>,
    Path(index): Path<usize>,
    Json(req): Json<EditSlotRequest>,
) -> Result<Json<PlannerView>, AppError> {
    state.planner.set_slot(index, req.value).await?;
    Ok(Json(state.planner.view().await))
}

#[derive(Serialize)]
pub struct SaveResponse {
    pub message: &'static str,
    pub date: DateKey,
}

/// POST /record/save - Persist the current note and timetable for the selected day
async fn save<A: AuthProvider, S: DocumentStore>(
    State(state): State<AppState<A, S>>,
) -> Result<Json<SaveResponse>, AppError> {
    let date = state.planner.save_required().await?;

    Ok(Json(SaveResponse {
        message: SAVED_MESSAGE,
        date,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use super::SAVED_MESSAGE;
    use crate::offline::OFFLINE_MESSAGE;
    use crate::routes::test_support::{send, sign_in, test_app};

    #[tokio::test]
    async fn test_edit_save_and_reload_roundtrip() {
        let (app, _) = test_app();
        sign_in(&app, "alice").await;

        let response = send(
            &app,
            Method::PATCH,
            "/record",
            Some(json!({
                "note": "시험 준비",
                "timetable": ["국어", "수학", "", "", "", "", ""],
            })),
        )
        .await;
        assert_eq!(response.status, StatusCode::OK);

        let response = send(&app, Method::POST, "/record/save", None).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json()["message"], SAVED_MESSAGE);
        assert_eq!(response.json()["date"], "2024-03-05");

        // Move away and back: the view must come from the store.
        let away = send(&app, Method::PUT, "/date", Some(json!({ "date": "2024-12-25" }))).await;
        assert_eq!(away.json()["view"]["note"], "");

        let back = send(&app, Method::PUT, "/date", Some(json!({ "date": "2024-03-05" }))).await;
        let body = back.json();
        assert_eq!(body["load"]["status"], "applied");
        assert_eq!(body["view"]["note"], "시험 준비");
        assert_eq!(
            body["view"]["timetable"],
            json!(["국어", "수학", "", "", "", "", ""])
        );
    }

    #[tokio::test]
    async fn test_select_date_without_session_skips_load() {
        let (app, state) = test_app();

        let response = send(&app, Method::PUT, "/date", Some(json!({ "date": "2024-12-25" }))).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json()["load"]["status"], "no_session");
        assert_eq!(response.json()["view"]["selected_date"], "2024-12-25");
        assert_eq!(state.planner.days().store().read_count(), 0);
    }

    #[tokio::test]
    async fn test_select_date_rejects_non_canonical_date() {
        let (app, _) = test_app();

        let response = send(&app, Method::PUT, "/date", Some(json!({ "date": "2024-3-5" }))).await;
        assert!(response.status.is_client_error());
    }

    #[tokio::test]
    async fn test_edit_slot() {
        let (app, _) = test_app();

        let response = send(
            &app,
            Method::PUT,
            "/record/slots/6",
            Some(json!({ "value": "체육" })),
        )
        .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json()["timetable"][6], "체육");

        let response = send(
            &app,
            Method::PUT,
            "/record/slots/7",
            Some(json!({ "value": "x" })),
        )
        .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_wrong_length_timetable_is_rejected_and_note_kept() {
        let (app, state) = test_app();

        let response = send(
            &app,
            Method::PATCH,
            "/record",
            Some(json!({ "note": "new", "timetable": ["국어"] })),
        )
        .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(state.planner.view().await.note, "");
    }

    #[tokio::test]
    async fn test_save_without_session_is_unauthorized() {
        let (app, state) = test_app();

        let response = send(&app, Method::POST, "/record/save", None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.json()["error"], "No active session, sign in first");
        assert_eq!(state.planner.days().store().read_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_date_change_keeps_previous_selection() {
        let (app, state) = test_app();
        sign_in(&app, "alice").await;
        send(&app, Method::PATCH, "/record", Some(json!({ "note": "3월 5일" }))).await;

        state.planner.days().store().set_online(false);
        let response = send(&app, Method::PUT, "/date", Some(json!({ "date": "2024-12-25" }))).await;
        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
        state.planner.days().store().set_online(true);

        let view = send(&app, Method::GET, "/state", None).await.json();
        assert_eq!(view["selected_date"], "2024-03-05");
        assert_eq!(view["note"], "3월 5일");

        let saved = send(&app, Method::POST, "/record/save", None).await;
        assert_eq!(saved.status, StatusCode::OK);
        assert_eq!(saved.json()["date"], "2024-03-05");
    }

    #[tokio::test]
    async fn test_unreachable_store_serves_offline_text() {
        let (app, state) = test_app();
        sign_in(&app, "alice").await;
        state.planner.days().store().set_online(false);

        let response = send(&app, Method::POST, "/record/save", None).await;
        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.body, OFFLINE_MESSAGE);
        assert_eq!(
            response.content_type.as_deref(),
            Some("text/plain; charset=utf-8")
        );

        // Requests that never touch the store pass straight through.
        let response = send(&app, Method::GET, "/state", None).await;
        assert_eq!(response.status, StatusCode::OK);
    }
}
