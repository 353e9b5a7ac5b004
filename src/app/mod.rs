//! 应用层：路由与共享状态

pub mod catalog;
pub mod pages;

use axum::{
    error_handling::HandleErrorLayer,
    extract::State,
    http::Uri,
    middleware,
    response::Json,
    routing::get,
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{Config, RegressionConfig};
use crate::core::{
    error::CoreError,
    middleware::{handle_timeout_error, request_logging_middleware},
};
use catalog::CatalogService;

#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub regression: RegressionConfig,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            catalog: CatalogService::from_config(&config.catalog),
            regression: config.regression.clone(),
        }
    }
}

/// 构建完整路由
pub fn router(state: AppState, timeout: Duration) -> Router {
    Router::new()
        .route("/", get(pages::handler::landing))
        .route("/products", get(pages::handler::products))
        .route("/about", get(pages::handler::about))
        .route(catalog::PRODUCTS_PATH, get(catalog::handler::list_products))
        .route("/health", get(health_check))
        .fallback(not_found)
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout_error))
                .timeout(timeout),
        )
        .with_state(state)
}

/// 健康检查，顺带报告当前注入的延迟与回归开关
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "catalog": {
            "delay_ms": u64::try_from(state.catalog.delay().as_millis()).unwrap_or(u64::MAX),
            "record_count": state.catalog.record_count()
        },
        "regression": {
            "blocking_delay": state.regression.blocking_delay,
            "bulk_render": state.regression.bulk_render
        }
    }))
}

async fn not_found(uri: Uri) -> CoreError {
    CoreError::NotFound(format!("路径 {} 不存在", uri.path()))
}
