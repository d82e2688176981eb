use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AssignmentService, load_assignment};
use crate::models::{
    ApiResponse, ErrorCode,
    assignments::requests::{NewSubmission, SubmitAssignmentRequest},
};
use crate::services::courses::ensure_enrolled;
use crate::services::files::load_owned_file;
use crate::services::{current_user, storage_failure};

pub async fn submit_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_id: i64,
    req: SubmitAssignmentRequest,
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

    if let Err(resp) = ensure_enrolled(&storage, user.id, assignment.offering_id).await {
        return Ok(resp);
    }

    let now = chrono::Utc::now();
    if assignment.is_past_deadline(now) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::AssignmentDeadlinePassed,
            "Assignment deadline has passed",
        )));
    }

    match storage.get_student_submission(assignment.id, user.id).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::AlreadySubmitted,
                "You have already submitted this assignment",
            )));
        }
        Ok(None) => {}
        Err(e) => {
            return Ok(storage_failure(
                e,
                ErrorCode::InternalServerError,
                "Failed to check existing submission",
            ));
        }
    }

    if let Err(resp) = load_owned_file(&storage, req.file_id, &user).await {
        return Ok(resp);
    }

    let new_submission = NewSubmission {
        assignment_id: assignment.id,
        student_id: user.id,
        file_id: req.file_id,
        is_late: assignment.is_past_deadline(chrono::Utc::now()),
    };

    match storage.create_submission(new_submission).await {
        Ok(submission) => {
            tracing::info!(
                "Student {} submitted assignment {} (late: {})",
                user.id,
                assignment.id,
                submission.is_late
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                submission,
                "Assignment submitted successfully",
            )))
        }
        // 并发重复提交由唯一约束兜底
        Err(e) if e.is_conflict() => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::AlreadySubmitted,
            "You have already submitted this assignment",
        ))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Failed to submit assignment",
        )),
    }
}
