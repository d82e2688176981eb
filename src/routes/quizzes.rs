use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::quizzes::requests::{
    CreateQuestionRequest, CreateQuizRequest, GradeQuizRequest, QuizFileSubmitRequest,
    QuizListParams, SubmitAnswersRequest, UpdateQuizRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::QuizService;
use crate::utils::SafeIDI64;

// 懒加载的全局 QuizService 实例
static QUIZ_SERVICE: Lazy<QuizService> = Lazy::new(QuizService::new_lazy);

pub async fn list_quizzes(
    req: HttpRequest,
    query: web::Query<QuizListParams>,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.list_quizzes(&req, query.into_inner()).await
}

pub async fn create_quiz(
    req: HttpRequest,
    quiz_data: web::Json<CreateQuizRequest>,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.create_quiz(&req, quiz_data.into_inner()).await
}

pub async fn get_quiz(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.get_quiz(&req, id.0).await
}

pub async fn update_quiz(
    req: HttpRequest,
    id: SafeIDI64,
    update_data: web::Json<UpdateQuizRequest>,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE
        .update_quiz(&req, id.0, update_data.into_inner())
        .await
}

pub async fn delete_quiz(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.delete_quiz(&req, id.0).await
}

pub async fn publish_quiz(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.publish_quiz(&req, id.0).await
}

pub async fn add_question(
    req: HttpRequest,
    id: SafeIDI64,
    question_data: web::Json<CreateQuestionRequest>,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE
        .add_question(&req, id.0, question_data.into_inner())
        .await
}

pub async fn list_questions(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.list_questions(&req, id.0).await
}

pub async fn start_attempt(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.start_attempt(&req, id.0).await
}

pub async fn submit_attempt(
    req: HttpRequest,
    attempt_id: SafeIDI64,
    answers: web::Json<SubmitAnswersRequest>,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE
        .submit_attempt(&req, attempt_id.0, answers.into_inner())
        .await
}

pub async fn submit_file(
    req: HttpRequest,
    id: SafeIDI64,
    submit_data: web::Json<QuizFileSubmitRequest>,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE
        .submit_file(&req, id.0, submit_data.into_inner())
        .await
}

pub async fn grade_quiz(
    req: HttpRequest,
    id: SafeIDI64,
    grade_data: web::Json<GradeQuizRequest>,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE
        .grade_quiz(&req, id.0, grade_data.into_inner())
        .await
}

pub async fn student_view(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.student_view(&req, id.0).await
}

pub async fn my_attempts(req: HttpRequest) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.my_attempts(&req).await
}

// 配置路由
pub fn configure_quiz_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/quizzes")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_quizzes))
                    .route(
                        web::post()
                            .to(create_quiz)
                            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                    ),
            )
            // 学生作答
            .service(
                web::resource("/attempts/me")
                    .wrap(middlewares::RequireRole::new_any(UserRole::student_roles()))
                    .route(web::get().to(my_attempts)),
            )
            .service(
                web::resource("/attempts/{id}/submit")
                    .wrap(middlewares::RequireRole::new_any(UserRole::student_roles()))
                    .route(web::post().to(submit_attempt)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_quiz))
                    .route(
                        web::put()
                            .to(update_quiz)
                            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_quiz)
                            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                    ),
            )
            .service(
                web::resource("/{id}/publish")
                    .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles()))
                    .route(web::post().to(publish_quiz)),
            )
            .service(
                web::resource("/{id}/questions")
                    // 学生视角隐藏答案
                    .route(web::get().to(list_questions))
                    .route(
                        web::post()
                            .to(add_question)
                            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                    ),
            )
            .service(
                web::resource("/{id}/attempts")
                    .wrap(middlewares::RequireRole::new_any(UserRole::student_roles()))
                    .route(web::post().to(start_attempt)),
            )
            .service(
                web::resource("/{id}/submit-file")
                    .wrap(middlewares::RequireRole::new_any(UserRole::student_roles()))
                    .route(web::post().to(submit_file)),
            )
            .service(
                web::resource("/{id}/grade")
                    .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles()))
                    .route(web::post().to(grade_quiz)),
            )
            .service(
                web::resource("/{id}/student-view")
                    .wrap(middlewares::RequireRole::new_any(UserRole::student_roles()))
                    .route(web::get().to(student_view)),
            ),
    );
}
