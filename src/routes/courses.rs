use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::courses::requests::{
    CourseListParams, CreateCourseRequest, CreateOfferingRequest, FinalGradeRequest,
    OfferingListParams, UpdateCourseRequest, UpdateOfferingRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::CourseService;
use crate::utils::{SafeCourseCode, SafeIDI64, SafeStudentIdI64};

// 懒加载的全局 CourseService 实例
static COURSE_SERVICE: Lazy<CourseService> = Lazy::new(CourseService::new_lazy);

// 课程目录
pub async fn list_courses(
    req: HttpRequest,
    query: web::Query<CourseListParams>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.list_courses(query.into_inner(), &req).await
}

pub async fn get_course(req: HttpRequest, code: SafeCourseCode) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.get_course(&code.0, &req).await
}

pub async fn create_course(
    req: HttpRequest,
    course_data: web::Json<CreateCourseRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .create_course(course_data.into_inner(), &req)
        .await
}

pub async fn update_course(
    req: HttpRequest,
    code: SafeCourseCode,
    update_data: web::Json<UpdateCourseRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .update_course(&code.0, update_data.into_inner(), &req)
        .await
}

pub async fn delete_course(req: HttpRequest, code: SafeCourseCode) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.delete_course(&code.0, &req).await
}

// 开课
pub async fn list_offerings(
    req: HttpRequest,
    query: web::Query<OfferingListParams>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.list_offerings(query.into_inner(), &req).await
}

pub async fn get_offering(req: HttpRequest, offering_id: SafeIDI64) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.get_offering(offering_id.0, &req).await
}

pub async fn create_offering(
    req: HttpRequest,
    offering_data: web::Json<CreateOfferingRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .create_offering(offering_data.into_inner(), &req)
        .await
}

pub async fn update_offering(
    req: HttpRequest,
    offering_id: SafeIDI64,
    update_data: web::Json<UpdateOfferingRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .update_offering(offering_id.0, update_data.into_inner(), &req)
        .await
}

pub async fn delete_offering(
    req: HttpRequest,
    offering_id: SafeIDI64,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.delete_offering(offering_id.0, &req).await
}

// 选课
pub async fn enroll(req: HttpRequest, offering_id: SafeIDI64) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.enroll(offering_id.0, &req).await
}

pub async fn drop_enrollment(
    req: HttpRequest,
    offering_id: SafeIDI64,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.drop_enrollment(offering_id.0, &req).await
}

pub async fn list_students(req: HttpRequest, offering_id: SafeIDI64) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.list_students(offering_id.0, &req).await
}

pub async fn set_final_grade(
    req: HttpRequest,
    offering_id: SafeIDI64,
    student_id: SafeStudentIdI64,
    grade_data: web::Json<FinalGradeRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .set_final_grade(offering_id.0, student_id.0, grade_data.into_inner(), &req)
        .await
}

pub async fn my_enrollments(req: HttpRequest) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.my_enrollments(&req).await
}

// 配置路由
pub fn configure_course_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/courses")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_courses))
                    .route(
                        web::post()
                            .to(create_course)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    ),
            )
            .service(
                web::resource("/{code}")
                    .route(web::get().to(get_course))
                    .route(
                        web::put()
                            .to(update_course)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_course)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    ),
            ),
    );
}

pub fn configure_offering_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/offerings")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_offerings))
                    .route(
                        web::post()
                            .to(create_offering)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    ),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_offering))
                    .route(
                        web::put()
                            .to(update_offering)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_offering)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    ),
            )
            // 选课与退课 - 仅学生
            .service(
                web::resource("/{id}/enroll")
                    .wrap(middlewares::RequireRole::new_any(UserRole::student_roles()))
                    .route(web::post().to(enroll))
                    .route(web::delete().to(drop_enrollment)),
            )
            // 业务层校验是否负责该开课
            .service(
                web::resource("/{id}/students")
                    .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles()))
                    .route(web::get().to(list_students)),
            )
            .service(
                web::resource("/{id}/students/{student_id}/grade")
                    .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles()))
                    .route(web::put().to(set_final_grade)),
            ),
    );
}

pub fn configure_enrollment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/enrollments")
            .wrap(middlewares::RequireRole::new_any(UserRole::student_roles()))
            .wrap(middlewares::RequireJWT)
            .route("/me", web::get().to(my_enrollments)),
    );
}
