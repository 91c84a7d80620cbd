use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, MethodRouter},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, SecurityConfig};
use crate::database::store::{MemberStore, StoreError};
use crate::handlers::{health, members};
use crate::middleware::{EditKey, EDIT_KEY_HEADER};
use crate::roster::Planner;

/// Process-scoped dependencies, built once at start-up and cloned into
/// every request
#[derive(Clone)]
pub struct AppState {
    pub planner: Planner,
    pub edit_key: Option<EditKey>,
}

impl AppState {
    pub fn new(store: Arc<dyn MemberStore>, config: &AppConfig) -> Result<Self, StoreError> {
        Ok(Self {
            planner: Planner::new(store, config.database.table.clone())?,
            edit_key: config.security.edit_key.clone(),
        })
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        .route("/health", get(health::get))
        .route("/api/members", members_without_event())
        .route("/api/members/", members_without_event())
        .route(
            "/api/members/:event",
            get(members::get)
                .post(members::post)
                .fallback(members::method_not_allowed),
        )
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(&config.security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn members_without_event() -> MethodRouter<AppState> {
    get(members::missing_event)
        .post(members::missing_event)
        .fallback(members::method_not_allowed)
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(EDIT_KEY_HEADER)]);

    if security.cors_origins.iter().any(|o| o == "*") {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = security
            .cors_origins
            .iter()
            .filter_map(|o| HeaderValue::from_str(o).ok())
            .collect();
        layer.allow_origin(AllowOrigin::list(origins))
    }
}
