use serde::Serialize;
use ts_rs::TS;

use super::entities::{Course, CourseOffering, Enrollment};
use crate::models::common::PaginationInfo;
use crate::models::users::entities::User;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CourseListResponse {
    pub items: Vec<Course>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct OfferingListResponse {
    pub items: Vec<CourseOffering>,
    pub pagination: PaginationInfo,
}

/// 开课下的学生及其选课记录
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct EnrolledStudent {
    pub user: User,
    pub enrollment: Enrollment,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct EnrolledStudentsResponse {
    pub offering: CourseOffering,
    pub items: Vec<EnrolledStudent>,
}

/// 学生视角的选课记录
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct MyEnrollment {
    pub enrollment: Enrollment,
    pub offering: CourseOffering,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct MyEnrollmentsResponse {
    pub items: Vec<MyEnrollment>,
}
