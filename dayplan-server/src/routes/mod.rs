pub mod days;
pub mod links;
pub mod record;
pub mod session;

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use dayplan_core::auth::AuthProvider;
use dayplan_core::error::{PlannerError, StoreError};
use dayplan_core::store::DocumentStore;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use crate::offline::{self, StoreUnavailable};
use crate::state::AppState;

/// Shown when the identity provider flow fails (usually a blocked popup).
pub const SIGN_IN_FAILED_MESSAGE: &str = "❌ 로그인 실패: 팝업 차단을 해제했는지 확인해주세요.";

/// Full application: every route, CORS and the offline fallback.
pub fn app<A, S>(state: AppState<A, S>) -> Router
where
    A: AuthProvider + 'static,
    S: DocumentStore + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(session::router())
        .merge(record::router())
        .merge(days::router())
        .merge(links::router())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(cors)
                .layer(middleware::from_fn(offline::offline_fallback)),
        )
}

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Convert errors to HTTP responses, picking the status from the error kind
pub struct AppError(anyhow::Error);

impl AppError {
    fn status(&self) -> StatusCode {
        let Some(err) = self.0.downcast_ref::<PlannerError>() else {
            return StatusCode::INTERNAL_SERVER_ERROR;
        };

        match err {
            PlannerError::Auth(_) | PlannerError::NoSession => StatusCode::UNAUTHORIZED,
            PlannerError::NotLoaded(_) => StatusCode::CONFLICT,
            PlannerError::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            PlannerError::Store(StoreError::InvalidPath(_))
            | PlannerError::InvalidDate(_)
            | PlannerError::SlotOutOfRange(_)
            | PlannerError::InvalidTimetable(_) => StatusCode::BAD_REQUEST,
            PlannerError::Store(_) | PlannerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let planner_err = self.0.downcast_ref::<PlannerError>();

        let body = match planner_err {
            Some(PlannerError::Auth(e)) => ErrorResponse {
                error: SIGN_IN_FAILED_MESSAGE.to_string(),
                detail: Some(e.to_string()),
            },
            _ => ErrorResponse {
                error: self.0.to_string(),
                detail: None,
            },
        };

        let mut response = (status, Json(body)).into_response();
        if matches!(planner_err, Some(PlannerError::Store(StoreError::Unavailable(_)))) {
            response.extensions_mut().insert(StoreUnavailable);
        }
        response
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode, header},
    };
    use dayplan_core::DateKey;
    use dayplan_core::auth::{AuthProvider, Credentials, Identity};
    use dayplan_core::error::{AuthError, AuthResult};
    use dayplan_core::links::default_links;
    use dayplan_core::planner::Planner;
    use dayplan_core::store::MemoryStore;
    use tower::ServiceExt;

    use crate::state::AppState;

    /// Signs in whoever passes `{"uid": ...}`.
    pub struct FakeProvider;

    impl AuthProvider for FakeProvider {
        fn name(&self) -> &str {
            "fake"
        }

        async fn sign_in(&self, credentials: Credentials) -> AuthResult<Identity> {
            credentials
                .get("uid")
                .and_then(|v| v.as_str())
                .map(Identity::new)
                .ok_or_else(|| AuthError::Rejected("popup blocked".into()))
        }

        async fn sign_out(&self, _identity: &Identity) -> AuthResult<()> {
            Ok(())
        }
    }

    pub type TestState = AppState<FakeProvider, MemoryStore>;

    pub fn test_app() -> (Router, TestState) {
        let selected: DateKey = "2024-03-05".parse().unwrap();
        let planner = Planner::with_date(FakeProvider, MemoryStore::new(), selected);
        let state = AppState::new(planner, default_links());
        (super::app(state.clone()), state)
    }

    pub struct TestResponse {
        pub status: StatusCode,
        pub content_type: Option<String>,
        pub body: String,
    }

    impl TestResponse {
        pub fn json(&self) -> serde_json::Value {
            serde_json::from_str(&self.body)
                .unwrap_or_else(|e| panic!("invalid JSON ({e}): {}", self.body))
        }
    }

    pub async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> TestResponse {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        TestResponse {
            status,
            content_type,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    pub async fn sign_in(app: &Router, uid: &str) -> TestResponse {
        send(
            app,
            Method::POST,
            "/session",
            Some(serde_json::json!({ "credentials": { "uid": uid } })),
        )
        .await
    }
}
