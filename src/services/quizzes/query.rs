use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;

use super::rules::can_submit;
use super::scoring::best_score;
use super::{QuizService, ensure_can_view, load_quiz};
use crate::models::{
    ApiResponse, ErrorCode,
    quizzes::{
        requests::{QuizListParams, QuizListQuery},
        responses::{MyAttemptsResponse, QuizDetailResponse, QuizStudentView},
    },
    users::entities::UserRole,
};
use crate::services::courses::ensure_enrolled;
use crate::services::{current_user, storage_failure};

/// 按开课列出测验；学生只能看到已选开课中已发布的测验
pub async fn list_quizzes(
    service: &QuizService,
    request: &HttpRequest,
    query: QuizListParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let is_student = user.role == UserRole::Student;
    if is_student {
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

    let list_query = QuizListQuery {
        page: query.pagination.page(),
        size: query.pagination.size(),
        offering_id: query.offering_id,
        published_only: is_student,
    };

    match storage.list_quizzes_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Quizzes retrieved successfully",
        ))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Failed to retrieve quizzes",
        )),
    }
}

pub async fn get_quiz(
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

    if let Err(resp) = ensure_can_view(&storage, &quiz, &user).await {
        return Ok(resp);
    }

    let (question_count, total_marks) = match storage.quiz_question_summary(quiz.id).await {
        Ok(summary) => summary,
        Err(e) => {
            return Ok(storage_failure(
                e,
                ErrorCode::InternalServerError,
                "Failed to summarize quiz",
            ));
        }
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        QuizDetailResponse {
            quiz,
            question_count,
            total_marks,
        },
        "Quiz retrieved successfully",
    )))
}

/// 学生视角：作答次数、最高分、能否继续作答
pub async fn student_view(
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

    if let Err(resp) = ensure_can_view(&storage, &quiz, &user).await {
        return Ok(resp);
    }

    let attempts = match storage.list_student_attempts(user.id, Some(quiz.id)).await {
        Ok(attempts) => attempts,
        Err(e) => {
            return Ok(storage_failure(
                e,
                ErrorCode::InternalServerError,
                "Failed to load attempts",
            ));
        }
    };

    let file_submission = match storage
        .get_student_quiz_file_submission(quiz.id, user.id)
        .await
    {
        Ok(submission) => submission,
        Err(e) => {
            return Ok(storage_failure(
                e,
                ErrorCode::InternalServerError,
                "Failed to load file submission",
            ));
        }
    };

    let grade = match storage.get_student_quiz_grade(quiz.id, user.id).await {
        Ok(grade) => grade,
        Err(e) => {
            return Ok(storage_failure(
                e,
                ErrorCode::InternalServerError,
                "Failed to load quiz grade",
            ));
        }
    };

    let can_attempt = can_submit(
        &quiz,
        attempts.len(),
        file_submission.is_some(),
        Utc::now(),
    );
    let view = QuizStudentView {
        has_attempted: !attempts.is_empty() || file_submission.is_some(),
        attempts_used: attempts.len() as i32,
        best_score: best_score(&attempts),
        can_attempt,
        file_submission,
        grade,
        quiz,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        view,
        "Quiz view retrieved successfully",
    )))
}

pub async fn my_attempts(service: &QuizService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    match storage.list_student_attempts(user.id, None).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            MyAttemptsResponse { items },
            "Attempts retrieved successfully",
        ))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Failed to retrieve attempts",
        )),
    }
}
