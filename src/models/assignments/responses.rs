use serde::Serialize;
use ts_rs::TS;

use super::entities::{Assignment, AssignmentGrade, AssignmentSubmission};
use crate::models::common::PaginationInfo;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct AssignmentListResponse {
    pub items: Vec<Assignment>,
    pub pagination: PaginationInfo,
}

/// 作业详情，学生会附带自己的提交与成绩
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct AssignmentDetailResponse {
    pub assignment: Assignment,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub my_submission: Option<AssignmentSubmission>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub my_grade: Option<AssignmentGrade>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct SubmissionWithGrade {
    pub submission: AssignmentSubmission,
    pub grade: Option<AssignmentGrade>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct SubmissionListResponse {
    pub items: Vec<SubmissionWithGrade>,
}

/// 待批改的提交
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct PendingSubmission {
    pub assignment: Assignment,
    pub submission: AssignmentSubmission,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct PendingSubmissionsResponse {
    pub items: Vec<PendingSubmission>,
}
