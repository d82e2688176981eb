use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{DateTime, Utc};

use super::{AssignmentService, ensure_manages_offering, load_assignment};
use crate::models::{
    ApiResponse, ErrorCode,
    assignments::requests::{
        AssignmentChanges, CreateAssignmentRequest, NewAssignment, UpdateAssignmentRequest,
    },
};
use crate::services::files::load_owned_file;
use crate::services::{current_user, storage_failure};
use crate::utils::validate::validate_title;

fn validate_total_marks(total_marks: f64) -> Result<(), &'static str> {
    if !total_marks.is_finite() || total_marks <= 0.0 {
        return Err("Total marks must be greater than 0");
    }
    Ok(())
}

fn validate_deadline(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), &'static str> {
    if deadline <= now {
        return Err("Deadline must be in the future");
    }
    Ok(())
}

fn invalid(msg: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::AssignmentInvalid, msg))
}

pub async fn create_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    req: CreateAssignmentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    if let Err(msg) = validate_title(&req.title)
        .and_then(|_| validate_total_marks(req.total_marks))
        .and_then(|_| validate_deadline(req.deadline, Utc::now()))
    {
        return Ok(invalid(msg));
    }

    if let Err(resp) = ensure_manages_offering(&storage, req.offering_id, &user).await {
        return Ok(resp);
    }

    // 参考文件必须由创建者上传
    if let Some(file_id) = req.reference_file_id
        && let Err(resp) = load_owned_file(&storage, file_id, &user).await
    {
        return Ok(resp);
    }

    let new_assignment = NewAssignment {
        offering_id: req.offering_id,
        created_by: user.id,
        title: req.title.trim().to_string(),
        description: req.description,
        reference_file_id: req.reference_file_id,
        deadline: req.deadline,
        total_marks: req.total_marks,
    };

    match storage.create_assignment(new_assignment).await {
        Ok(assignment) => {
            tracing::info!(
                "Assignment {} created for offering {} by user {}",
                assignment.id,
                assignment.offering_id,
                user.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                assignment,
                "Assignment created successfully",
            )))
        }
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Failed to create assignment",
        )),
    }
}

/// 仅创建者可修改
pub async fn update_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_id: i64,
    req: UpdateAssignmentRequest,
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

    if assignment.created_by != user.id {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "You can only edit your own assignments",
        )));
    }

    if let Some(ref title) = req.title
        && let Err(msg) = validate_title(title)
    {
        return Ok(invalid(msg));
    }
    if let Some(total_marks) = req.total_marks
        && let Err(msg) = validate_total_marks(total_marks)
    {
        return Ok(invalid(msg));
    }
    if let Some(deadline) = req.deadline
        && let Err(msg) = validate_deadline(deadline, Utc::now())
    {
        return Ok(invalid(msg));
    }
    if let Some(file_id) = req.reference_file_id
        && let Err(resp) = load_owned_file(&storage, file_id, &user).await
    {
        return Ok(resp);
    }

    let changes = AssignmentChanges {
        title: req.title.map(|t| t.trim().to_string()),
        description: req.description,
        reference_file_id: req.reference_file_id,
        deadline: req.deadline,
        total_marks: req.total_marks,
    };

    match storage.update_assignment(assignment_id, changes).await {
        Ok(Some(updated)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            updated,
            "Assignment updated successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::AssignmentNotFound,
            "Assignment not found",
        ))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Failed to update assignment",
        )),
    }
}

/// 创建者或管理员可删除（软删除）
pub async fn delete_assignment(
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

    if assignment.created_by != user.id && !user.is_admin() {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "You can only delete your own assignments",
        )));
    }

    match storage.deactivate_assignment(assignment_id).await {
        Ok(true) => {
            tracing::info!("Assignment {} deleted by user {}", assignment_id, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty(
                "Assignment deleted successfully",
            )))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::AssignmentNotFound,
            "Assignment not found",
        ))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Failed to delete assignment",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_total_marks_must_be_positive() {
        assert!(validate_total_marks(100.0).is_ok());
        assert!(validate_total_marks(0.5).is_ok());
        assert!(validate_total_marks(0.0).is_err());
        assert!(validate_total_marks(-5.0).is_err());
        assert!(validate_total_marks(f64::NAN).is_err());
        assert!(validate_total_marks(f64::INFINITY).is_err());
    }

    #[test]
    fn test_deadline_must_be_future() {
        let now = Utc::now();
        assert!(validate_deadline(now + Duration::hours(1), now).is_ok());
        assert!(validate_deadline(now, now).is_err());
        assert!(validate_deadline(now - Duration::seconds(1), now).is_err());
    }
}
