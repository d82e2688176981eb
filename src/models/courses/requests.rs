use serde::Deserialize;
use ts_rs::TS;

use super::entities::{CourseType, OfferingStatus};
use crate::models::common::PaginationQuery;
use crate::models::common::pagination::deserialize_optional_i64;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CourseListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    /// 按课程代码或名称搜索
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CreateCourseRequest {
    pub course_code: String,
    pub course_name: String,
    pub credits: i32,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct UpdateCourseRequest {
    pub course_name: Option<String>,
    pub credits: Option<i32>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct OfferingListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub course_code: Option<String>,
    pub session: Option<String>,
    pub status: Option<OfferingStatus>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub professor_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CreateOfferingRequest {
    pub course_code: String,
    pub session: String,
    pub professor_id: i64,
    pub course_type: CourseType,
    pub status: Option<OfferingStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct UpdateOfferingRequest {
    pub session: Option<String>,
    pub professor_id: Option<i64>,
    pub course_type: Option<CourseType>,
    pub status: Option<OfferingStatus>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct FinalGradeRequest {
    pub final_grade: f64,
}

// 存储层使用的结构

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub course_code: String,
    pub course_name: String,
    pub credits: i32,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CourseChanges {
    pub course_name: Option<String>,
    pub credits: Option<i32>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CourseListQuery {
    pub page: u64,
    pub size: u64,
    pub search: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewOffering {
    pub course_code: String,
    pub session: String,
    pub professor_id: i64,
    pub course_type: CourseType,
    pub status: OfferingStatus,
}

#[derive(Debug, Clone, Default)]
pub struct OfferingChanges {
    pub session: Option<String>,
    pub professor_id: Option<i64>,
    pub course_type: Option<CourseType>,
    pub status: Option<OfferingStatus>,
}

#[derive(Debug, Clone)]
pub struct OfferingListQuery {
    pub page: u64,
    pub size: u64,
    pub course_code: Option<String>,
    pub session: Option<String>,
    pub status: Option<OfferingStatus>,
    pub professor_id: Option<i64>,
}
