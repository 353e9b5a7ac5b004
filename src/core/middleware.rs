//! 核心中间件模块

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
    BoxError,
};
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use super::error::CoreError;

/// 响应中携带的请求 ID 头
pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// 请求日志中间件
///
/// 记录方法、路径、状态码和耗时，并给每个响应加上 `x-request-id`。
/// 耗时包含模拟接口的人为延迟，日志即是最直接的延迟观测点。
pub async fn request_logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4().to_string();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let user_agent = req
        .headers()
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());

    let mut response = next.run(req).await;
    let status = response.status();
    let duration = start.elapsed();

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(REQUEST_ID_HEADER.clone(), value);
    }

    info!(
        "{} {} - {} - {}ms - request_id: {} - User-Agent: {:?}",
        method,
        uri,
        status,
        duration.as_millis(),
        request_id,
        user_agent
    );

    response
}

/// 处理 tower 超时层抛出的错误
pub async fn handle_timeout_error(err: BoxError) -> CoreError {
    if err.is::<tower::timeout::error::Elapsed>() {
        warn!("请求处理超时");
        CoreError::Timeout
    } else {
        CoreError::InternalServerError(format!("未处理的内部错误: {}", err))
    }
}
