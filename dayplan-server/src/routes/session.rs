//! Sign-in and sign-out endpoints

use axum::{Json, Router, extract::State, routing::post};
use dayplan_core::auth::{AuthProvider, Credentials, Identity};
use dayplan_core::error::{PlannerError, StoreError};
use dayplan_core::planner::{LoadOutcome, PlannerView};
use dayplan_core::store::DocumentStore;
use serde::{Deserialize, Serialize};

use crate::offline::OFFLINE_MESSAGE;
use crate::routes::AppError;
use crate::state::AppState;

pub fn router<A, S>() -> Router<AppState<A, S>>
where
    A: AuthProvider + 'static,
    S: DocumentStore + 'static,
{
    Router::new().route("/session", post(sign_in::<A, S>).delete(sign_out::<A, S>))
}

/// Request body for signing in
#[derive(Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub credentials: Credentials,
}

/// A successful sign-in. `load` is absent and `load_error` set when the
/// selected day could not be read; the session is active either way.
#[derive(Serialize)]
pub struct SignInResponse {
    pub identity: Identity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load: Option<LoadOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_error: Option<String>,
    pub view: PlannerView,
}

#[derive(Serialize)]
pub struct SignOutResponse {
    pub signed_out: Option<Identity>,
    pub view: PlannerView,
}

/// POST /session - Run the provider's sign-in flow, then load the selected day
async fn sign_in<A: AuthProvider, S: DocumentStore>(
    State(state): State<AppState<A, S>>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<SignInResponse>, AppError> {
    let (identity, load) = state.planner.sign_in(req.credentials).await?;
    let (load, load_error) = match load {
        Ok(outcome) => (Some(outcome), None),
        Err(PlannerError::Store(StoreError::Unavailable(_))) => {
            (None, Some(OFFLINE_MESSAGE.to_string()))
        }
        Err(e) => (None, Some(e.to_string())),
    };
    let view = state.planner.view().await;

    Ok(Json(SignInResponse {
        identity,
        load,
        load_error,
        view,
    }))
}

/// DELETE /session - Sign out and clear the record being edited
async fn sign_out<A: AuthProvider, S: DocumentStore>(
    State(state): State<AppState<A, S>>,
) -> Json<SignOutResponse> {
    let signed_out = state.planner.sign_out().await;
    let view = state.planner.view().await;

    Json(SignOutResponse { signed_out, view })
}
