//! 课程目录、开课与选课

pub mod catalog;
pub mod enrollments;
pub mod offerings;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{
    ApiResponse, ErrorCode,
    courses::{
        entities::CourseOffering,
        requests::{
            CourseListParams, CreateCourseRequest, CreateOfferingRequest, FinalGradeRequest,
            OfferingListParams, UpdateCourseRequest, UpdateOfferingRequest,
        },
    },
};
use crate::services::storage_failure;
use crate::storage::Storage;

pub struct CourseService {
    storage: Option<Arc<dyn Storage>>,
}

impl CourseService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    // 课程目录
    pub async fn list_courses(
        &self,
        query: CourseListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        catalog::list_courses(self, query, request).await
    }

    pub async fn get_course(&self, code: &str, request: &HttpRequest) -> ActixResult<HttpResponse> {
        catalog::get_course(self, code, request).await
    }

    pub async fn create_course(
        &self,
        course_data: CreateCourseRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        catalog::create_course(self, course_data, request).await
    }

    pub async fn update_course(
        &self,
        code: &str,
        update_data: UpdateCourseRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        catalog::update_course(self, code, update_data, request).await
    }

    pub async fn delete_course(
        &self,
        code: &str,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        catalog::delete_course(self, code, request).await
    }

    // 开课
    pub async fn list_offerings(
        &self,
        query: OfferingListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        offerings::list_offerings(self, query, request).await
    }

    pub async fn get_offering(
        &self,
        offering_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        offerings::get_offering(self, offering_id, request).await
    }

    pub async fn create_offering(
        &self,
        offering_data: CreateOfferingRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        offerings::create_offering(self, offering_data, request).await
    }

    pub async fn update_offering(
        &self,
        offering_id: i64,
        update_data: UpdateOfferingRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        offerings::update_offering(self, offering_id, update_data, request).await
    }

    pub async fn delete_offering(
        &self,
        offering_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        offerings::delete_offering(self, offering_id, request).await
    }

    // 选课
    pub async fn enroll(&self, offering_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        enrollments::enroll(self, offering_id, request).await
    }

    pub async fn drop_enrollment(
        &self,
        offering_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        enrollments::drop_enrollment(self, offering_id, request).await
    }

    pub async fn list_students(
        &self,
        offering_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        enrollments::list_students(self, offering_id, request).await
    }

    pub async fn set_final_grade(
        &self,
        offering_id: i64,
        student_id: i64,
        grade_data: FinalGradeRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        enrollments::set_final_grade(self, offering_id, student_id, grade_data, request).await
    }

    pub async fn my_enrollments(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        enrollments::my_enrollments(self, request).await
    }
}

/// 读取开课，不存在时返回 404 响应
pub(crate) async fn load_offering(
    storage: &Arc<dyn Storage>,
    offering_id: i64,
) -> Result<CourseOffering, HttpResponse> {
    match storage.get_offering_by_id(offering_id).await {
        Ok(Some(offering)) => Ok(offering),
        Ok(None) => Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::OfferingNotFound,
            "Course offering not found",
        ))),
        Err(e) => Err(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Failed to load course offering",
        )),
    }
}

/// 学生是否已选该开课
pub(crate) async fn ensure_enrolled(
    storage: &Arc<dyn Storage>,
    student_id: i64,
    offering_id: i64,
) -> Result<(), HttpResponse> {
    match storage.get_enrollment(student_id, offering_id).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::NotEnrolled,
            "You are not enrolled in this course offering",
        ))),
        Err(e) => Err(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Failed to check enrollment",
        )),
    }
}
