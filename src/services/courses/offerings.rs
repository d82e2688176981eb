use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use super::{CourseService, load_offering};
use crate::models::{
    ApiResponse, ErrorCode,
    courses::{
        entities::OfferingStatus,
        requests::{
            CreateOfferingRequest, NewOffering, OfferingChanges, OfferingListParams,
            OfferingListQuery, UpdateOfferingRequest,
        },
    },
    users::entities::UserRole,
};
use crate::services::storage_failure;
use crate::storage::Storage;
use crate::utils::validate::validate_session;

/// 授课教师必须是在职的 professor
async fn check_professor(
    storage: &Arc<dyn Storage>,
    professor_id: i64,
) -> Result<(), HttpResponse> {
    match storage.get_user_by_id(professor_id).await {
        Ok(Some(user)) if user.role == UserRole::Professor && user.is_active() => Ok(()),
        Ok(_) => Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::InvalidProfessor,
            "professor_id must reference an active professor",
        ))),
        Err(e) => Err(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Failed to verify professor",
        )),
    }
}

fn offering_conflict() -> HttpResponse {
    HttpResponse::Conflict().json(ApiResponse::error_empty(
        ErrorCode::OfferingAlreadyExists,
        "This course is already offered in the given session",
    ))
}

pub async fn list_offerings(
    service: &CourseService,
    query: OfferingListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let list_query = OfferingListQuery {
        page: query.pagination.page(),
        size: query.pagination.size(),
        course_code: query.course_code,
        session: query.session,
        status: query.status,
        professor_id: query.professor_id,
    };

    match storage.list_offerings_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Offering list retrieved successfully",
        ))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Failed to retrieve offering list",
        )),
    }
}

pub async fn get_offering(
    service: &CourseService,
    offering_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match load_offering(&storage, offering_id).await {
        Ok(offering) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            offering,
            "Offering retrieved successfully",
        ))),
        Err(resp) => Ok(resp),
    }
}

pub async fn create_offering(
    service: &CourseService,
    offering_data: CreateOfferingRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let course_code = offering_data.course_code.trim().to_uppercase();

    match storage.get_course(&course_code).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::CourseNotFound,
                "Course not found",
            )));
        }
        Err(e) => {
            return Ok(storage_failure(
                e,
                ErrorCode::InternalServerError,
                "Offering creation failed",
            ));
        }
    }

    let session = offering_data.session.trim().to_string();
    if let Err(msg) = validate_session(&session) {
        return Ok(
            HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::CourseInvalid, msg))
        );
    }

    if let Err(resp) = check_professor(&storage, offering_data.professor_id).await {
        return Ok(resp);
    }

    let new_offering = NewOffering {
        course_code,
        session,
        professor_id: offering_data.professor_id,
        course_type: offering_data.course_type,
        status: offering_data.status.unwrap_or(OfferingStatus::Planned),
    };

    match storage.create_offering(new_offering).await {
        Ok(offering) => {
            tracing::info!(
                "Offering {} created for {} {}",
                offering.id,
                offering.course_code,
                offering.session
            );
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(offering, "Offering created successfully")))
        }
        Err(e) if e.is_conflict() => Ok(offering_conflict()),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Offering creation failed",
        )),
    }
}

pub async fn update_offering(
    service: &CourseService,
    offering_id: i64,
    update_data: UpdateOfferingRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let session = match update_data.session {
        Some(session) => {
            let session = session.trim().to_string();
            if let Err(msg) = validate_session(&session) {
                return Ok(HttpResponse::BadRequest()
                    .json(ApiResponse::error_empty(ErrorCode::CourseInvalid, msg)));
            }
            Some(session)
        }
        None => None,
    };

    if let Some(professor_id) = update_data.professor_id
        && let Err(resp) = check_professor(&storage, professor_id).await
    {
        return Ok(resp);
    }

    let changes = OfferingChanges {
        session,
        professor_id: update_data.professor_id,
        course_type: update_data.course_type,
        status: update_data.status,
    };

    match storage.update_offering(offering_id, changes).await {
        Ok(Some(offering)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            offering,
            "Offering updated successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::OfferingNotFound,
            "Course offering not found",
        ))),
        Err(e) if e.is_conflict() => Ok(offering_conflict()),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Offering update failed",
        )),
    }
}

/// 已有学生选课时拒绝删除
pub async fn delete_offering(
    service: &CourseService,
    offering_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.count_enrollments_for_offering(offering_id).await {
        Ok(0) => {}
        Ok(count) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::CourseInUse,
                format!("Offering still has {count} enrolled student(s)"),
            )));
        }
        Err(e) => {
            return Ok(storage_failure(
                e,
                ErrorCode::InternalServerError,
                "Offering deletion failed",
            ));
        }
    }

    match storage.delete_offering(offering_id).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty(
            "Offering deleted successfully",
        ))),
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::OfferingNotFound,
            "Course offering not found",
        ))),
        // 仍有作业或测验引用时外键拒绝删除
        Err(e) => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::CourseInUse,
            format!("Offering deletion failed: {e}"),
        ))),
    }
}
