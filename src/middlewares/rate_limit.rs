/*!
 * 速率限制中间件
 *
 * 固定窗口计数：已认证请求按用户 ID 计数，匿名请求按客户端 IP 计数。
 * 超过限制返回 429，并带上 `Retry-After`。
 *
 * ```rust,ignore
 * web::resource("/login")
 *     .wrap(RateLimit::login())
 *     .route(web::post().to(login))
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    http::header::CONTENT_TYPE,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::models::{ApiResponse, ErrorCode};

/// 全局计数窗口，键为 `前缀:user:ID` 或 `前缀:ip:地址`
static RATE_LIMIT_CACHE: Lazy<Cache<String, Window>> = Lazy::new(|| {
    Cache::builder()
        .time_to_idle(Duration::from_secs(3600))
        .max_capacity(100_000)
        .build()
});

/// 一个计数窗口
#[derive(Debug, Clone, Copy, PartialEq)]
struct Window {
    started_at: Instant,
    count: u32,
}

/// 计数结果
#[derive(Debug, Clone, Copy, PartialEq)]
enum Decision {
    Allowed { remaining: u32 },
    Limited { retry_after: u64 },
}

/// 根据已有窗口计算本次请求的结果与新窗口
fn next_window(
    existing: Option<Window>,
    now: Instant,
    max_requests: u32,
    window_secs: u64,
) -> (Window, Decision) {
    let window = Duration::from_secs(window_secs);
    let current = match existing {
        Some(w) if now.duration_since(w.started_at) < window => w,
        _ => Window {
            started_at: now,
            count: 0,
        },
    };

    if current.count >= max_requests {
        let elapsed = now.duration_since(current.started_at);
        let retry_after = window.saturating_sub(elapsed).as_secs().max(1);
        return (current, Decision::Limited { retry_after });
    }

    let updated = Window {
        count: current.count + 1,
        ..current
    };
    (
        updated,
        Decision::Allowed {
            remaining: max_requests - updated.count,
        },
    )
}

/// 速率限制配置
#[derive(Clone)]
pub struct RateLimit {
    /// 时间窗口内允许的最大请求数
    max_requests: u32,
    /// 时间窗口（秒）
    window_secs: u64,
    /// 限制键前缀（用于区分不同端点）
    key_prefix: String,
}

impl RateLimit {
    /// 创建新的速率限制器
    ///
    /// # 参数
    /// - `max_requests`: 时间窗口内允许的最大请求数
    /// - `window_secs`: 时间窗口（秒）
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs,
            key_prefix: String::new(),
        }
    }

    /// 设置限制键前缀
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.key_prefix = prefix.to_string();
        self
    }

    /// 登录：5次/分钟/IP
    pub fn login() -> Self {
        Self::new(5, 60).with_prefix("login")
    }

    /// 注册：3次/分钟/IP
    pub fn register() -> Self {
        Self::new(3, 60).with_prefix("register")
    }

    /// 刷新令牌：10次/分钟/IP
    pub fn refresh_token() -> Self {
        Self::new(10, 60).with_prefix("refresh")
    }

    /// 忘记密码与重置密码：3次/10分钟/IP
    pub fn password_reset() -> Self {
        Self::new(3, 600).with_prefix("password_reset")
    }

    /// 文件上传：10次/分钟/用户
    pub fn file_upload() -> Self {
        Self::new(10, 60).with_prefix("upload")
    }
}

/// 从请求中提取客户端 IP
///
/// 优先使用连接信息，其次是 X-Forwarded-For 的第一个地址和 X-Real-IP。
/// 服务直接暴露在公网时转发头可以被伪造。
fn extract_client_ip(req: &ServiceRequest) -> String {
    let connection_ip = req
        .connection_info()
        .realip_remote_addr()
        .map(|s| s.to_string());

    if let Some(ref ip) = connection_ip
        && is_valid_ip(ip)
    {
        return ip.clone();
    }

    if let Some(forwarded) = req.headers().get("X-Forwarded-For")
        && let Ok(value) = forwarded.to_str()
        && let Some(ip) = value.split(',').next()
    {
        let ip = ip.trim();
        if is_valid_ip(ip) {
            return ip.to_string();
        }
    }

    if let Some(real_ip) = req.headers().get("X-Real-IP")
        && let Ok(ip) = real_ip.to_str()
    {
        let ip = ip.trim();
        if is_valid_ip(ip) {
            return ip.to_string();
        }
    }

    connection_ip.unwrap_or_else(|| "unknown".to_string())
}

/// 验证 IP 地址格式是否有效
fn is_valid_ip(ip: &str) -> bool {
    use std::net::IpAddr;
    ip.parse::<IpAddr>().is_ok()
}

/// 从请求中提取用户 ID（如果已认证）
fn extract_user_id(req: &ServiceRequest) -> Option<i64> {
    use crate::models::users::entities::User;
    req.extensions().get::<User>().map(|user| user.id)
}

/// 创建速率限制错误响应
fn create_rate_limit_response(retry_after: u64) -> HttpResponse {
    HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
        .insert_header(("Retry-After", retry_after.to_string()))
        .insert_header(("X-RateLimit-Remaining", "0"))
        .json(ApiResponse::<()>::error_empty(
            ErrorCode::RateLimitExceeded,
            "Too many requests, please try again later",
        ))
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            max_requests: self.max_requests,
            window_secs: self.window_secs,
            key_prefix: self.key_prefix.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    max_requests: u32,
    window_secs: u64,
    key_prefix: String,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let max_requests = self.max_requests;
        let window_secs = self.window_secs;
        let key_prefix = self.key_prefix.clone();

        Box::pin(async move {
            let identifier = extract_user_id(&req)
                .map(|id| format!("user:{}", id))
                .unwrap_or_else(|| format!("ip:{}", extract_client_ip(&req)));

            let cache_key = if key_prefix.is_empty() {
                identifier
            } else {
                format!("{}:{}", key_prefix, identifier)
            };

            let existing = RATE_LIMIT_CACHE.get(&cache_key).await;
            let (window, decision) =
                next_window(existing, Instant::now(), max_requests, window_secs);
            RATE_LIMIT_CACHE.insert(cache_key.clone(), window).await;

            let remaining = match decision {
                Decision::Allowed { remaining } => remaining,
                Decision::Limited { retry_after } => {
                    warn!(
                        "Rate limit exceeded for key: {} ({}/{})",
                        cache_key, window.count, max_requests
                    );
                    return Ok(req.into_response(
                        create_rate_limit_response(retry_after).map_into_right_body(),
                    ));
                }
            };

            req.extensions_mut().insert(RateLimitInfo {
                remaining,
                limit: max_requests,
                reset: window_secs,
            });

            let res = srv.call(req).await?.map_into_left_body();
            Ok(res)
        })
    }
}

/// 本次请求的限额信息，放在请求扩展中
#[derive(Clone)]
pub struct RateLimitInfo {
    pub remaining: u32,
    pub limit: u32,
    pub reset: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_presets() {
        let login = RateLimit::login();
        assert_eq!(login.max_requests, 5);
        assert_eq!(login.window_secs, 60);
        assert_eq!(login.key_prefix, "login");

        let reset = RateLimit::password_reset();
        assert_eq!(reset.max_requests, 3);
        assert_eq!(reset.window_secs, 600);

        assert_eq!(RateLimit::file_upload().max_requests, 10);
    }

    #[test]
    fn test_window_counts_up_to_limit() {
        let now = Instant::now();
        let (w1, d1) = next_window(None, now, 2, 60);
        assert_eq!(d1, Decision::Allowed { remaining: 1 });
        let (w2, d2) = next_window(Some(w1), now, 2, 60);
        assert_eq!(d2, Decision::Allowed { remaining: 0 });
        let (_, d3) = next_window(Some(w2), now + Duration::from_secs(10), 2, 60);
        assert_eq!(d3, Decision::Limited { retry_after: 50 });
    }

    #[test]
    fn test_window_resets_after_expiry() {
        let now = Instant::now();
        let full = Window {
            started_at: now,
            count: 5,
        };
        let (w, d) = next_window(Some(full), now + Duration::from_secs(61), 5, 60);
        assert_eq!(d, Decision::Allowed { remaining: 4 });
        assert_eq!(w.count, 1);
    }

    #[test]
    fn test_ip_validation() {
        assert!(is_valid_ip("10.0.0.1"));
        assert!(is_valid_ip("::1"));
        assert!(!is_valid_ip("not-an-ip"));
    }
}
