use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::PaginationQuery;
use crate::models::common::pagination::deserialize_optional_i64;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct AssignmentListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub offering_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct CreateAssignmentRequest {
    pub offering_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub reference_file_id: Option<i64>,
    pub deadline: chrono::DateTime<chrono::Utc>,
    pub total_marks: f64,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct UpdateAssignmentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub reference_file_id: Option<i64>,
    pub deadline: Option<chrono::DateTime<chrono::Utc>>,
    pub total_marks: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct SubmitAssignmentRequest {
    pub file_id: i64,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct GradeSubmissionRequest {
    pub final_score: f64,
    pub feedback_text: Option<String>,
    pub feedback_file_id: Option<i64>,
}

// 存储层使用的结构

#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub offering_id: i64,
    pub created_by: i64,
    pub title: String,
    pub description: Option<String>,
    pub reference_file_id: Option<i64>,
    pub deadline: chrono::DateTime<chrono::Utc>,
    pub total_marks: f64,
}

#[derive(Debug, Clone, Default)]
pub struct AssignmentChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub reference_file_id: Option<i64>,
    pub deadline: Option<chrono::DateTime<chrono::Utc>>,
    pub total_marks: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct AssignmentListQuery {
    pub page: u64,
    pub size: u64,
    pub offering_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub assignment_id: i64,
    pub student_id: i64,
    pub file_id: i64,
    pub is_late: bool,
}

#[derive(Debug, Clone)]
pub struct NewAssignmentGrade {
    pub submission_id: i64,
    pub graded_by: i64,
    pub final_score: f64,
    pub feedback_text: Option<String>,
    pub feedback_file_id: Option<i64>,
}
