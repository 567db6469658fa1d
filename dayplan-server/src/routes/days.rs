//! Read-only access to any day without changing the selection

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use dayplan_core::auth::AuthProvider;
use dayplan_core::error::PlannerError;
use dayplan_core::store::DocumentStore;
use dayplan_core::{DateKey, DayRecord};

use crate::routes::AppError;
use crate::state::AppState;

pub fn router<A, S>() -> Router<AppState<A, S>>
where
    A: AuthProvider + 'static,
    S: DocumentStore + 'static,
{
    Router::new().route("/days/{date}", get(get_day::<A, S>))
}

/// GET /days/:date - Stored record for a day (empty if nothing was saved)
async fn get_day<A: AuthProvider, S: DocumentStore>(
    State(state): State<AppState<A, S>>,
    Path(date): Path<DateKey>,
) -> Result<Json<DayRecord>, AppError> {
    let record = state
        .planner
        .peek(date)
        .await?
        .ok_or(PlannerError::NoSession)?;

    Ok(Json(record))
}
