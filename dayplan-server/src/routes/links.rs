//! Quick links to external school services

use axum::{Json, Router, extract::State, routing::get};
use dayplan_core::auth::AuthProvider;
use dayplan_core::links::QuickLink;
use dayplan_core::store::DocumentStore;

use crate::state::AppState;

pub fn router<A, S>() -> Router<AppState<A, S>>
where
    A: AuthProvider + 'static,
    S: DocumentStore + 'static,
{
    Router::new().route("/links", get(list_links::<A, S>))
}

/// GET /links - Links the UI opens in a new browsing context
async fn list_links<A: AuthProvider, S: DocumentStore>(
    State(state): State<AppState<A, S>>,
) -> Json<Vec<QuickLink>> {
    Json(state.links.as_ref().clone())
}
