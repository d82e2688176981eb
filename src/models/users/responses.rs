use super::entities::User;
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

// 用户响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "user.ts")]
pub struct UserResponse {
    pub user: User,
}

// 用户列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "user.ts")]
pub struct UserListResponse {
    pub items: Vec<User>,
    pub pagination: PaginationInfo,
}

// 用户统计
#[derive(Debug, Default, Serialize, TS)]
#[ts(export, export_to = "user.ts")]
pub struct UserStatsResponse {
    pub total: i64,
    pub active: i64,
    pub admins: i64,
    pub professors: i64,
    pub associate_teachers: i64,
    pub students: i64,
}
