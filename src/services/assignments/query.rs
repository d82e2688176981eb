use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AssignmentService, ensure_manages_offering, load_assignment};
use crate::models::{
    ApiResponse, ErrorCode,
    assignments::{
        requests::{AssignmentListParams, AssignmentListQuery},
        responses::AssignmentDetailResponse,
    },
    users::entities::UserRole,
};
use crate::services::courses::ensure_enrolled;
use crate::services::{current_user, storage_failure};

/// 按开课列出作业；学生必须指定已选的开课
pub async fn list_assignments(
    service: &AssignmentService,
    request: &HttpRequest,
    query: AssignmentListParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    if user.role == UserRole::Student {
        let Some(offering_id) = query.offering_id else {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                "offering_id is required",
            )));
        };
        if let Err(resp) = ensure_enrolled(&storage, user.id, offering_id).await {
            return Ok(resp);
        }
    }

    let list_query = AssignmentListQuery {
        page: query.pagination.page(),
        size: query.pagination.size(),
        offering_id: query.offering_id,
    };

    match storage.list_assignments_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Assignments retrieved successfully",
        ))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Failed to retrieve assignments",
        )),
    }
}

pub async fn get_assignment(
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

    if user.role != UserRole::Student {
        if let Err(resp) = ensure_manages_offering(&storage, assignment.offering_id, &user).await
        {
            return Ok(resp);
        }
        return Ok(HttpResponse::Ok().json(ApiResponse::success(
            AssignmentDetailResponse {
                assignment,
                my_submission: None,
                my_grade: None,
            },
            "Assignment retrieved successfully",
        )));
    }

    if let Err(resp) = ensure_enrolled(&storage, user.id, assignment.offering_id).await {
        return Ok(resp);
    }

    // 学生附带自己的提交与成绩
    let my_submission = match storage.get_student_submission(assignment.id, user.id).await {
        Ok(submission) => submission,
        Err(e) => {
            return Ok(storage_failure(
                e,
                ErrorCode::InternalServerError,
                "Failed to load submission",
            ));
        }
    };

    let my_grade = match &my_submission {
        Some(submission) => match storage.get_grade_for_submission(submission.id).await {
            Ok(grade) => grade,
            Err(e) => {
                return Ok(storage_failure(
                    e,
                    ErrorCode::InternalServerError,
                    "Failed to load grade",
                ));
            }
        },
        None => None,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        AssignmentDetailResponse {
            assignment,
            my_submission,
            my_grade,
        },
        "Assignment retrieved successfully",
    )))
}
