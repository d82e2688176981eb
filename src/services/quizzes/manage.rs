use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;

use super::rules::{QuizSettings, validate_settings};
use super::{QuizService, ensure_creator, load_quiz};
use crate::models::{
    ApiResponse, ErrorCode,
    quizzes::{
        entities::{Quiz, QuizType},
        requests::{CreateQuizRequest, NewQuiz, QuizChanges, UpdateQuizRequest},
    },
};
use crate::services::assignments::ensure_manages_offering;
use crate::services::files::load_owned_file;
use crate::services::{current_user, storage_failure};

fn invalid(msg: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::QuizInvalid, msg))
}

/// 发布前检查：在线测验至少需要一道题
async fn ensure_publishable(
    storage: &std::sync::Arc<dyn crate::storage::Storage>,
    quiz: &Quiz,
) -> Result<(), HttpResponse> {
    if quiz.quiz_type != QuizType::Digital {
        return Ok(());
    }
    match storage.quiz_question_summary(quiz.id).await {
        Ok((0, _)) => Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::QuizHasNoQuestions,
            "Cannot publish a quiz with no questions",
        ))),
        Ok(_) => Ok(()),
        Err(e) => Err(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Failed to count quiz questions",
        )),
    }
}

pub async fn create_quiz(
    service: &QuizService,
    request: &HttpRequest,
    req: CreateQuizRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let max_attempts = req.max_attempts.unwrap_or(1);
    let settings = QuizSettings {
        title: &req.title,
        start_time: req.start_time,
        deadline: req.deadline,
        time_limit_minutes: req.time_limit_minutes,
        max_attempts,
    };
    if let Err(msg) = validate_settings(&settings) {
        return Ok(invalid(msg));
    }
    if req.deadline <= Utc::now() {
        return Ok(invalid("Deadline must be in the future"));
    }

    if let Err(resp) = ensure_manages_offering(&storage, req.offering_id, &user).await {
        return Ok(resp);
    }

    if let Some(file_id) = req.instructions_file_id
        && let Err(resp) = load_owned_file(&storage, file_id, &user).await
    {
        return Ok(resp);
    }

    let new_quiz = NewQuiz {
        offering_id: req.offering_id,
        created_by: user.id,
        title: req.title.trim().to_string(),
        description: req.description,
        instructions_file_id: req.instructions_file_id,
        quiz_type: req.quiz_type,
        start_time: req.start_time,
        deadline: req.deadline,
        time_limit_minutes: req.time_limit_minutes,
        max_attempts,
        show_results_after: req.show_results_after.unwrap_or(true),
    };

    match storage.create_quiz(new_quiz).await {
        Ok(quiz) => {
            tracing::info!(
                "Quiz {} ({}) created for offering {} by user {}",
                quiz.id,
                quiz.quiz_type,
                quiz.offering_id,
                user.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(quiz, "Quiz created successfully")))
        }
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Failed to create quiz",
        )),
    }
}

pub async fn update_quiz(
    service: &QuizService,
    request: &HttpRequest,
    quiz_id: i64,
    req: UpdateQuizRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let quiz = match load_quiz(&storage, quiz_id).await {
        Ok(quiz) => quiz,
        Err(resp) => return Ok(resp),
    };

    if let Err(resp) = ensure_creator(&quiz, &user) {
        return Ok(resp);
    }

    if quiz.is_published && req.is_published == Some(false) {
        return Ok(invalid("Cannot unpublish a published quiz"));
    }
    if quiz.is_published
        && let Some(quiz_type) = req.quiz_type
        && quiz_type != quiz.quiz_type
    {
        return Ok(invalid("Cannot change the type of a published quiz"));
    }

    // 校验合并后的设置
    let settings = QuizSettings {
        title: req.title.as_deref().unwrap_or(&quiz.title),
        start_time: req.start_time.or(quiz.start_time),
        deadline: req.deadline.unwrap_or(quiz.deadline),
        time_limit_minutes: req.time_limit_minutes.or(quiz.time_limit_minutes),
        max_attempts: req.max_attempts.unwrap_or(quiz.max_attempts),
    };
    if let Err(msg) = validate_settings(&settings) {
        return Ok(invalid(msg));
    }
    if let Some(deadline) = req.deadline
        && deadline <= Utc::now()
    {
        return Ok(invalid("Deadline must be in the future"));
    }

    if let Some(file_id) = req.instructions_file_id
        && let Err(resp) = load_owned_file(&storage, file_id, &user).await
    {
        return Ok(resp);
    }

    let publishing = !quiz.is_published && req.is_published == Some(true);
    if publishing {
        let mut target = quiz.clone();
        if let Some(quiz_type) = req.quiz_type {
            target.quiz_type = quiz_type;
        }
        if let Err(resp) = ensure_publishable(&storage, &target).await {
            return Ok(resp);
        }
    }

    let changes = QuizChanges {
        title: req.title.map(|t| t.trim().to_string()),
        description: req.description,
        instructions_file_id: req.instructions_file_id,
        quiz_type: req.quiz_type,
        start_time: req.start_time,
        deadline: req.deadline,
        time_limit_minutes: req.time_limit_minutes,
        max_attempts: req.max_attempts,
        show_results_after: req.show_results_after,
        is_published: publishing.then_some(true),
    };

    match storage.update_quiz(quiz_id, changes).await {
        Ok(Some(updated)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            updated,
            "Quiz updated successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::QuizNotFound,
            "Quiz not found",
        ))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Failed to update quiz",
        )),
    }
}

pub async fn publish_quiz(
    service: &QuizService,
    request: &HttpRequest,
    quiz_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let quiz = match load_quiz(&storage, quiz_id).await {
        Ok(quiz) => quiz,
        Err(resp) => return Ok(resp),
    };

    if let Err(resp) = ensure_creator(&quiz, &user) {
        return Ok(resp);
    }

    if quiz.is_published {
        return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::QuizAlreadyPublished,
            "Quiz is already published",
        )));
    }

    if let Err(resp) = ensure_publishable(&storage, &quiz).await {
        return Ok(resp);
    }

    let changes = QuizChanges {
        is_published: Some(true),
        ..Default::default()
    };

    match storage.update_quiz(quiz_id, changes).await {
        Ok(Some(published)) => {
            tracing::info!("Quiz {} published by user {}", quiz_id, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                published,
                "Quiz published successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::QuizNotFound,
            "Quiz not found",
        ))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Failed to publish quiz",
        )),
    }
}

/// 创建者或管理员可删除（软删除）
pub async fn delete_quiz(
    service: &QuizService,
    request: &HttpRequest,
    quiz_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let quiz = match load_quiz(&storage, quiz_id).await {
        Ok(quiz) => quiz,
        Err(resp) => return Ok(resp),
    };

    if !user.is_admin()
        && let Err(resp) = ensure_creator(&quiz, &user)
    {
        return Ok(resp);
    }

    match storage.deactivate_quiz(quiz_id).await {
        Ok(true) => {
            tracing::info!("Quiz {} deleted by user {}", quiz_id, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty("Quiz deleted successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::QuizNotFound,
            "Quiz not found",
        ))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Failed to delete quiz",
        )),
    }
}
