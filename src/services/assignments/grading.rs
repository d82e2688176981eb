use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AssignmentService, ensure_manages_offering, load_assignment};
use crate::models::{
    ApiResponse, ErrorCode,
    assignments::{
        requests::{GradeSubmissionRequest, NewAssignmentGrade},
        responses::{PendingSubmissionsResponse, SubmissionListResponse},
    },
};
use crate::services::files::load_owned_file;
use crate::services::{current_user, storage_failure};

/// 分数须在 0..=total_marks
fn score_in_range(score: f64, total_marks: f64) -> bool {
    score.is_finite() && (0.0..=total_marks).contains(&score)
}

pub async fn list_submissions(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let assignment = match load_assignment(&storage, assignment_id).await {
        Ok(assignment) => assignment,
        Err(resp) => return Ok(resp),
    };

    if let Err(resp) = ensure_manages_offering(&storage, assignment.offering_id, &user).await {
        return Ok(resp);
    }

    match storage.list_submissions_for_assignment(assignment.id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            SubmissionListResponse { items },
            "Submissions retrieved successfully",
        ))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Failed to retrieve submissions",
        )),
    }
}

/// 当前用户所布置作业中尚未评分的提交；管理员看到全部
pub async fn list_pending(
    service: &AssignmentService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let creator = if user.is_admin() { None } else { Some(user.id) };

    match storage.list_pending_submissions(creator).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            PendingSubmissionsResponse { items },
            "Pending submissions retrieved successfully",
        ))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Failed to retrieve pending submissions",
        )),
    }
}

pub async fn grade_submission(
    service: &AssignmentService,
    request: &HttpRequest,
    submission_id: i64,
    req: GradeSubmissionRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let submission = match storage.get_submission_by_id(submission_id).await {
        Ok(Some(submission)) => submission,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::SubmissionNotFound,
                "Submission not found",
            )));
        }
        Err(e) => {
            return Ok(storage_failure(
                e,
                ErrorCode::InternalServerError,
                "Failed to load submission",
            ));
        }
    };

    let assignment = match load_assignment(&storage, submission.assignment_id).await {
        Ok(assignment) => assignment,
        Err(resp) => return Ok(resp),
    };

    if let Err(resp) = ensure_manages_offering(&storage, assignment.offering_id, &user).await {
        return Ok(resp);
    }

    if !score_in_range(req.final_score, assignment.total_marks) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::InvalidScore,
            format!("Score must be between 0 and {}", assignment.total_marks),
        )));
    }

    match storage.get_grade_for_submission(submission.id).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::AlreadyGraded,
                "This submission has already been graded",
            )));
        }
        Ok(None) => {}
        Err(e) => {
            return Ok(storage_failure(
                e,
                ErrorCode::InternalServerError,
                "Failed to check existing grade",
            ));
        }
    }

    // 反馈文件必须由评分人上传
    if let Some(file_id) = req.feedback_file_id
        && let Err(resp) = load_owned_file(&storage, file_id, &user).await
    {
        return Ok(resp);
    }

    let grade = NewAssignmentGrade {
        submission_id: submission.id,
        graded_by: user.id,
        final_score: req.final_score,
        feedback_text: req.feedback_text,
        feedback_file_id: req.feedback_file_id,
    };

    match storage.grade_submission(grade).await {
        Ok(grade) => {
            tracing::info!(
                "Submission {} graded {} by user {}",
                submission.id,
                grade.final_score,
                user.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                grade,
                "Submission graded successfully",
            )))
        }
        Err(e) if e.is_conflict() => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::AlreadyGraded,
            "This submission has already been graded",
        ))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Failed to grade submission",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_range() {
        assert!(score_in_range(0.0, 100.0));
        assert!(score_in_range(100.0, 100.0));
        assert!(score_in_range(42.5, 50.0));
        assert!(!score_in_range(-0.5, 100.0));
        assert!(!score_in_range(100.5, 100.0));
        assert!(!score_in_range(f64::NAN, 100.0));
    }
}
