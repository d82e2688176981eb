use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;
use crate::models::{
    ApiResponse, AppStartTime, ErrorCode,
    system::responses::{HealthResponse, ServiceInfoResponse},
};
use crate::services::app_cache;
use crate::storage::Storage;

const HEALTH_PROBE_KEY: &str = "health:probe";

pub struct SystemService {
    storage: Option<Arc<dyn Storage>>,
}

impl SystemService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    // 服务信息
    pub async fn service_info(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let config = AppConfig::get();
        let started_at = request
            .app_data::<web::Data<AppStartTime>>()
            .map(|t| t.start_datetime)
            .unwrap_or_else(chrono::Utc::now);

        let info = ServiceInfoResponse {
            name: config.app.system_name.clone(),
            version: config.app.version.clone(),
            status: "active".to_string(),
            environment: config.app.environment.clone(),
            uptime_seconds: uptime_seconds(started_at, chrono::Utc::now()),
            started_at,
        };

        Ok(HttpResponse::Ok().json(ApiResponse::success(info, "Service is running")))
    }

    /// 健康检查：数据库连通性与缓存状态
    pub async fn health(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);

        let database = match storage.ping().await {
            Ok(()) => "ok".to_string(),
            Err(e) => {
                tracing::error!("Database health check failed: {}", e);
                "unavailable".to_string()
            }
        };
        let cache = cache_status(app_cache(request)).await;

        let healthy = database == "ok";
        let body = HealthResponse {
            status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
            database,
            cache,
            checked_at: chrono::Utc::now(),
        };

        if healthy {
            Ok(HttpResponse::Ok().json(ApiResponse::success(body, "Service is healthy")))
        } else {
            Ok(HttpResponse::ServiceUnavailable().json(ApiResponse::error(
                ErrorCode::InternalServerError,
                body,
                "Service is unhealthy",
            )))
        }
    }
}

async fn cache_status(cache: Option<Arc<dyn ObjectCache>>) -> String {
    let Some(cache) = cache else {
        return "disabled".to_string();
    };
    match cache.get_raw(HEALTH_PROBE_KEY).await {
        CacheResult::Found(_) | CacheResult::NotFound => "ok".to_string(),
        CacheResult::ExistsButNoValue => "degraded".to_string(),
    }
}

fn uptime_seconds(started_at: chrono::DateTime<chrono::Utc>, now: chrono::DateTime<chrono::Utc>) -> i64 {
    now.signed_duration_since(started_at).num_seconds().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_uptime_never_negative() {
        let now = Utc::now();
        assert_eq!(uptime_seconds(now - Duration::seconds(90), now), 90);
        assert_eq!(uptime_seconds(now + Duration::seconds(5), now), 0);
    }
}
