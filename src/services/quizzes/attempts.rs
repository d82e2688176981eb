use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;
use dashmap::{DashMap, mapref::entry::Entry};
use once_cell::sync::Lazy;

use super::rules::{self, check_can_attempt, check_open};
use super::scoring::grade_answers;
use super::{QuizService, load_quiz};
use crate::models::{
    ApiResponse, ErrorCode,
    quizzes::{
        entities::QuizType,
        requests::{NewQuizFileSubmission, QuizFileSubmitRequest, SubmitAnswersRequest},
        responses::{AttemptResultResponse, AttemptStartResponse, QuestionView},
    },
};
use crate::services::courses::ensure_enrolled;
use crate::services::files::load_owned_file;
use crate::services::{current_user, storage_failure};

/// 正在提交中的作答
static SUBMITTING: Lazy<DashMap<i64, ()>> = Lazy::new(DashMap::new);

/// 提交期间占用作答，离开作用域时释放
struct SubmitGuard(i64);

impl SubmitGuard {
    fn acquire(attempt_id: i64) -> Option<Self> {
        match SUBMITTING.entry(attempt_id) {
            Entry::Occupied(_) => None,
            Entry::Vacant(entry) => {
                entry.insert(());
                Some(Self(attempt_id))
            }
        }
    }
}

impl Drop for SubmitGuard {
    fn drop(&mut self) {
        SUBMITTING.remove(&self.0);
    }
}

fn already_submitted() -> HttpResponse {
    HttpResponse::Conflict().json(ApiResponse::error_empty(
        ErrorCode::AttemptAlreadySubmitted,
        "This attempt has already been submitted",
    ))
}

pub async fn start_attempt(
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

    if let Err(resp) = ensure_enrolled(&storage, user.id, quiz.offering_id).await {
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

    if let Err(reason) = check_can_attempt(&quiz, attempts.len(), Utc::now()) {
        let status = match reason {
            rules::Ineligible::MaxAttemptsReached => actix_web::http::StatusCode::CONFLICT,
            _ => actix_web::http::StatusCode::BAD_REQUEST,
        };
        return Ok(HttpResponse::build(status)
            .json(ApiResponse::error_empty(reason.error_code(), reason.message())));
    }

    let questions = match storage.list_questions(quiz.id).await {
        Ok(questions) => questions,
        Err(e) => {
            return Ok(storage_failure(
                e,
                ErrorCode::InternalServerError,
                "Failed to load questions",
            ));
        }
    };

    match storage.create_attempt(quiz.id, user.id).await {
        Ok(attempt) => {
            tracing::info!(
                "Student {} started attempt #{} of quiz {}",
                user.id,
                attempt.attempt_number,
                quiz.id
            );
            let questions = questions
                .into_iter()
                .map(|(q, options)| QuestionView::new(q, options, false))
                .collect();
            Ok(HttpResponse::Created().json(ApiResponse::success(
                AttemptStartResponse { attempt, questions },
                "Attempt started",
            )))
        }
        Err(e) if e.is_conflict() => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::MaxAttemptsReached,
            "Another attempt was started at the same time",
        ))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Failed to start attempt",
        )),
    }
}

/// 提交在线答案，选择题与判断题自动评分
pub async fn submit_attempt(
    service: &QuizService,
    request: &HttpRequest,
    attempt_id: i64,
    req: SubmitAnswersRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let Some(_guard) = SubmitGuard::acquire(attempt_id) else {
        return Ok(already_submitted());
    };

    let attempt = match storage.get_attempt_by_id(attempt_id).await {
        Ok(Some(attempt)) => attempt,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::AttemptNotFound,
                "Attempt not found",
            )));
        }
        Err(e) => {
            return Ok(storage_failure(
                e,
                ErrorCode::InternalServerError,
                "Failed to load attempt",
            ));
        }
    };

    if attempt.student_id != user.id {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "This attempt does not belong to you",
        )));
    }
    if attempt.is_completed {
        return Ok(already_submitted());
    }

    let quiz = match load_quiz(&storage, attempt.quiz_id).await {
        Ok(quiz) => quiz,
        Err(resp) => return Ok(resp),
    };

    if rules::attempt_expired(attempt.started_at, quiz.time_limit_minutes, Utc::now()) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::AttemptTimeExpired,
            "Time limit for this attempt has expired",
        )));
    }

    let questions = match storage.list_questions(quiz.id).await {
        Ok(questions) => questions,
        Err(e) => {
            return Ok(storage_failure(
                e,
                ErrorCode::InternalServerError,
                "Failed to load questions",
            ));
        }
    };
    let max_score: f64 = questions.iter().map(|(q, _)| q.marks).sum();

    let (graded, score) = match grade_answers(&questions, &req.answers) {
        Ok(result) => result,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
        }
    };

    let attempt = match storage.submit_attempt(attempt.id, graded, score).await {
        Ok(attempt) => attempt,
        Err(e) if e.is_conflict() => return Ok(already_submitted()),
        Err(e) => {
            return Ok(storage_failure(
                e,
                ErrorCode::InternalServerError,
                "Failed to submit attempt",
            ));
        }
    };

    tracing::info!(
        "Student {} submitted attempt {} of quiz {} with score {}/{}",
        user.id,
        attempt.id,
        quiz.id,
        score,
        max_score
    );

    // 测验允许时返回逐题结果
    let answers = if quiz.show_results_after {
        match storage.list_attempt_answers(attempt.id).await {
            Ok(answers) => Some(answers),
            Err(e) => {
                tracing::warn!("Failed to load answers for attempt {}: {}", attempt.id, e);
                None
            }
        }
    } else {
        None
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        AttemptResultResponse {
            attempt,
            max_score,
            answers,
        },
        "Quiz submitted successfully",
    )))
}

/// 上传答卷型测验的提交
pub async fn submit_file(
    service: &QuizService,
    request: &HttpRequest,
    quiz_id: i64,
    req: QuizFileSubmitRequest,
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

    if quiz.quiz_type != QuizType::FileUpload {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::QuizInvalidType,
            "This quiz does not accept file submissions",
        )));
    }

    if let Err(resp) = ensure_enrolled(&storage, user.id, quiz.offering_id).await {
        return Ok(resp);
    }

    if let Err(reason) = check_open(&quiz, Utc::now()) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(reason.error_code(), reason.message())));
    }

    match storage
        .get_student_quiz_file_submission(quiz.id, user.id)
        .await
    {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::QuizFileAlreadySubmitted,
                "You have already submitted a file for this quiz",
            )));
        }
        Ok(None) => {}
        Err(e) => {
            return Ok(storage_failure(
                e,
                ErrorCode::InternalServerError,
                "Failed to check existing submission",
            ));
        }
    }

    if let Err(resp) = load_owned_file(&storage, req.file_id, &user).await {
        return Ok(resp);
    }

    let submission = NewQuizFileSubmission {
        quiz_id: quiz.id,
        student_id: user.id,
        file_id: req.file_id,
        is_late: rules::is_late(Utc::now(), quiz.deadline),
    };

    match storage.create_quiz_file_submission(submission).await {
        Ok(submission) => {
            tracing::info!(
                "Student {} submitted file {} for quiz {}",
                user.id,
                submission.file_id,
                quiz.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                submission,
                "File submitted successfully",
            )))
        }
        Err(e) if e.is_conflict() => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::QuizFileAlreadySubmitted,
            "You have already submitted a file for this quiz",
        ))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Failed to submit file",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_guard_is_exclusive() {
        let first = SubmitGuard::acquire(-42);
        assert!(first.is_some());
        assert!(SubmitGuard::acquire(-42).is_none());
        drop(first);
        assert!(SubmitGuard::acquire(-42).is_some());
    }
}
