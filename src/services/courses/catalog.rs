use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::models::{
    ApiResponse, ErrorCode,
    courses::requests::{
        CourseChanges, CourseListParams, CourseListQuery, CreateCourseRequest, NewCourse,
        UpdateCourseRequest,
    },
};
use crate::services::storage_failure;
use crate::utils::validate::{validate_course_code, validate_credits};

pub async fn list_courses(
    service: &CourseService,
    query: CourseListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let list_query = CourseListQuery {
        page: query.pagination.page(),
        size: query.pagination.size(),
        search: query.search,
    };

    match storage.list_courses_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Course list retrieved successfully",
        ))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Failed to retrieve course list",
        )),
    }
}

pub async fn get_course(
    service: &CourseService,
    code: &str,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_course(code).await {
        Ok(Some(course)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            course,
            "Course retrieved successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::CourseNotFound,
            "Course not found",
        ))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Failed to retrieve course",
        )),
    }
}

fn validate_course_name(name: &str) -> Result<(), &'static str> {
    let len = name.chars().count();
    if len == 0 || len > 255 {
        return Err("Course name must be between 1 and 255 characters");
    }
    Ok(())
}

pub async fn create_course(
    service: &CourseService,
    course_data: CreateCourseRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let course_code = course_data.course_code.trim().to_uppercase();
    if let Err(msg) = validate_course_code(&course_code) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::CourseCodeInvalid, msg)));
    }

    let course_name = course_data.course_name.trim().to_string();
    if let Err(msg) = validate_course_name(&course_name) {
        return Ok(
            HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::CourseInvalid, msg))
        );
    }

    if let Err(msg) = validate_credits(course_data.credits) {
        return Ok(
            HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::CourseInvalid, msg))
        );
    }

    let new_course = NewCourse {
        course_code,
        course_name,
        credits: course_data.credits,
        description: course_data.description,
    };

    match storage.create_course(new_course).await {
        Ok(course) => {
            tracing::info!("Course {} created", course.course_code);
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(course, "Course created successfully")))
        }
        Err(e) if e.is_conflict() => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::CourseAlreadyExists,
            "Course code already exists",
        ))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Course creation failed",
        )),
    }
}

pub async fn update_course(
    service: &CourseService,
    code: &str,
    update_data: UpdateCourseRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let course_name = match update_data.course_name {
        Some(name) => {
            let name = name.trim().to_string();
            if let Err(msg) = validate_course_name(&name) {
                return Ok(HttpResponse::BadRequest()
                    .json(ApiResponse::error_empty(ErrorCode::CourseInvalid, msg)));
            }
            Some(name)
        }
        None => None,
    };

    if let Some(credits) = update_data.credits
        && let Err(msg) = validate_credits(credits)
    {
        return Ok(
            HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::CourseInvalid, msg))
        );
    }

    let changes = CourseChanges {
        course_name,
        credits: update_data.credits,
        description: update_data.description,
    };

    match storage.update_course(code, changes).await {
        Ok(Some(course)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            course,
            "Course updated successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::CourseNotFound,
            "Course not found",
        ))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Course update failed",
        )),
    }
}

/// 存在开课记录时拒绝删除
pub async fn delete_course(
    service: &CourseService,
    code: &str,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.count_offerings_for_course(code).await {
        Ok(0) => {}
        Ok(count) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::CourseInUse,
                format!("Course still has {count} offering(s)"),
            )));
        }
        Err(e) => {
            return Ok(storage_failure(
                e,
                ErrorCode::InternalServerError,
                "Course deletion failed",
            ));
        }
    }

    match storage.delete_course(code).await {
        Ok(true) => {
            tracing::info!("Course {} deleted", code);
            Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty(
                "Course deleted successfully",
            )))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::CourseNotFound,
            "Course not found",
        ))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Course deletion failed",
        )),
    }
}
