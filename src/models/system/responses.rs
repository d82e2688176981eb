use serde::Serialize;
use ts_rs::TS;

/// 服务信息（根路径）
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "system.ts")]
pub struct ServiceInfoResponse {
    pub name: String,
    pub version: String,
    pub status: String,
    pub environment: String,
    pub uptime_seconds: i64,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

/// 健康检查结果
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "system.ts")]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub cache: String,
    pub checked_at: chrono::DateTime<chrono::Utc>,
}
