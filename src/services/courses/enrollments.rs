use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{CourseService, load_offering};
use crate::models::{
    ApiResponse, ErrorCode,
    courses::{
        requests::FinalGradeRequest,
        responses::{EnrolledStudentsResponse, MyEnrollmentsResponse},
    },
};
use crate::services::{current_user, storage_failure};

pub async fn enroll(
    service: &CourseService,
    offering_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let offering = match load_offering(&storage, offering_id).await {
        Ok(offering) => offering,
        Err(resp) => return Ok(resp),
    };

    if !offering.status.accepts_enrollment() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::OfferingClosed,
            format!("Offering is {} and not open for enrollment", offering.status),
        )));
    }

    match storage.create_enrollment(user.id, offering_id).await {
        Ok(enrollment) => {
            tracing::info!("Student {} enrolled in offering {}", user.id, offering_id);
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(enrollment, "Enrolled successfully")))
        }
        Err(e) if e.is_conflict() => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::AlreadyEnrolled,
            "Already enrolled in this offering",
        ))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Enrollment failed",
        )),
    }
}

/// 学生退课；已有期末成绩时不可退
pub async fn drop_enrollment(
    service: &CourseService,
    offering_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let enrollment = match storage.get_enrollment(user.id, offering_id).await {
        Ok(Some(enrollment)) => enrollment,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::NotEnrolled,
                "You are not enrolled in this course offering",
            )));
        }
        Err(e) => {
            return Ok(storage_failure(
                e,
                ErrorCode::InternalServerError,
                "Failed to drop enrollment",
            ));
        }
    };

    if enrollment.final_grade.is_some() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::EnrollmentLocked,
            "Cannot drop a course that already has a final grade",
        )));
    }

    match storage.delete_enrollment(enrollment.id).await {
        Ok(_) => {
            tracing::info!("Student {} dropped offering {}", user.id, offering_id);
            Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty(
                "Enrollment dropped successfully",
            )))
        }
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Failed to drop enrollment",
        )),
    }
}

pub async fn list_students(
    service: &CourseService,
    offering_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let offering = match load_offering(&storage, offering_id).await {
        Ok(offering) => offering,
        Err(resp) => return Ok(resp),
    };

    if !offering.is_managed_by(&user) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "You do not teach this course offering",
        )));
    }

    match storage.list_offering_students(offering_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            EnrolledStudentsResponse { offering, items },
            "Enrolled students retrieved successfully",
        ))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Failed to retrieve enrolled students",
        )),
    }
}

/// 期末成绩只能由该开课的教授或管理员登记
pub async fn set_final_grade(
    service: &CourseService,
    offering_id: i64,
    student_id: i64,
    grade_data: FinalGradeRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let offering = match load_offering(&storage, offering_id).await {
        Ok(offering) => offering,
        Err(resp) => return Ok(resp),
    };

    if !(user.is_admin() || offering.professor_id == user.id) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "Only the offering professor or an admin can set final grades",
        )));
    }

    let grade = grade_data.final_grade;
    if !grade.is_finite() || !(0.0..=100.0).contains(&grade) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::InvalidFinalGrade,
            "Final grade must be between 0 and 100",
        )));
    }

    let enrollment = match storage.get_enrollment(student_id, offering_id).await {
        Ok(Some(enrollment)) => enrollment,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::EnrollmentNotFound,
                "Student is not enrolled in this offering",
            )));
        }
        Err(e) => {
            return Ok(storage_failure(
                e,
                ErrorCode::InternalServerError,
                "Failed to set final grade",
            ));
        }
    };

    match storage.set_final_grade(enrollment.id, grade).await {
        Ok(Some(enrollment)) => {
            tracing::info!(
                "Final grade for student {} in offering {} set by {}",
                student_id,
                offering_id,
                user.id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                enrollment,
                "Final grade saved successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::EnrollmentNotFound,
            "Enrollment not found",
        ))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Failed to set final grade",
        )),
    }
}

pub async fn my_enrollments(
    service: &CourseService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    match storage.list_student_enrollments(user.id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            MyEnrollmentsResponse { items },
            "Enrollments retrieved successfully",
        ))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Failed to retrieve enrollments",
        )),
    }
}
