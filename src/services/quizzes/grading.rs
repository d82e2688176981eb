use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{QuizService, load_quiz};
use crate::models::{
    ApiResponse, ErrorCode,
    quizzes::requests::{GradeQuizRequest, NewQuizGrade, QuizGradeTarget},
};
use crate::services::assignments::ensure_manages_offering;
use crate::services::files::load_owned_file;
use crate::services::{current_user, storage_failure};

/// attempt_id 与 file_submission_id 必须恰有其一
fn resolve_target(req: &GradeQuizRequest) -> Option<QuizGradeTarget> {
    match (req.attempt_id, req.file_submission_id) {
        (Some(id), None) => Some(QuizGradeTarget::Attempt(id)),
        (None, Some(id)) => Some(QuizGradeTarget::FileSubmission(id)),
        _ => None,
    }
}

fn target_invalid(msg: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::QuizGradeTargetInvalid, msg))
}

pub async fn grade_quiz(
    service: &QuizService,
    request: &HttpRequest,
    quiz_id: i64,
    req: GradeQuizRequest,
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

    if let Err(resp) = ensure_manages_offering(&storage, quiz.offering_id, &user).await {
        return Ok(resp);
    }

    let Some(target) = resolve_target(&req) else {
        return Ok(target_invalid(
            "Exactly one of attempt_id or file_submission_id is required",
        ));
    };

    if !req.final_score.is_finite() || req.final_score < 0.0 {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::InvalidScore,
            "Score must be a non-negative number",
        )));
    }

    // 评分对象必须属于该测验
    match target {
        QuizGradeTarget::Attempt(attempt_id) => {
            let attempt = match storage.get_attempt_by_id(attempt_id).await {
                Ok(Some(attempt)) if attempt.quiz_id == quiz.id => attempt,
                Ok(_) => return Ok(target_invalid("Attempt does not belong to this quiz")),
                Err(e) => {
                    return Ok(storage_failure(
                        e,
                        ErrorCode::InternalServerError,
                        "Failed to load attempt",
                    ));
                }
            };
            if !attempt.is_completed {
                return Ok(target_invalid("Attempt has not been submitted yet"));
            }

            let max_score = match storage.quiz_question_summary(quiz.id).await {
                Ok((_, total)) => total,
                Err(e) => {
                    return Ok(storage_failure(
                        e,
                        ErrorCode::InternalServerError,
                        "Failed to summarize quiz",
                    ));
                }
            };
            if req.final_score > max_score {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::InvalidScore,
                    format!("Score must be between 0 and {max_score}"),
                )));
            }
        }
        QuizGradeTarget::FileSubmission(submission_id) => {
            match storage.get_quiz_file_submission_by_id(submission_id).await {
                Ok(Some(submission)) if submission.quiz_id == quiz.id => {}
                Ok(_) => {
                    return Ok(target_invalid("File submission does not belong to this quiz"));
                }
                Err(e) => {
                    return Ok(storage_failure(
                        e,
                        ErrorCode::InternalServerError,
                        "Failed to load file submission",
                    ));
                }
            }
        }
    }

    match storage.get_quiz_grade_for_target(target).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::QuizAlreadyGraded,
                "This quiz submission has already been graded",
            )));
        }
        Ok(None) => {}
        Err(e) => {
            return Ok(storage_failure(
                e,
                ErrorCode::InternalServerError,
                "Failed to check existing grade",
            ));
        }
    }

    if let Some(file_id) = req.feedback_file_id
        && let Err(resp) = load_owned_file(&storage, file_id, &user).await
    {
        return Ok(resp);
    }

    let grade = NewQuizGrade {
        quiz_id: quiz.id,
        target,
        graded_by: user.id,
        final_score: req.final_score,
        feedback_text: req.feedback_text,
        feedback_file_id: req.feedback_file_id,
    };

    match storage.create_quiz_grade(grade).await {
        Ok(grade) => {
            tracing::info!("Quiz {} graded ({:?}) by user {}", quiz.id, target, user.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(grade, "Quiz graded successfully")))
        }
        Err(e) if e.is_conflict() => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::QuizAlreadyGraded,
            "This quiz submission has already been graded",
        ))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Failed to grade quiz",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(attempt: Option<i64>, file: Option<i64>) -> GradeQuizRequest {
        GradeQuizRequest {
            attempt_id: attempt,
            file_submission_id: file,
            final_score: 8.0,
            feedback_text: None,
            feedback_file_id: None,
        }
    }

    #[test]
    fn test_exactly_one_target() {
        assert_eq!(
            resolve_target(&request(Some(3), None)),
            Some(QuizGradeTarget::Attempt(3))
        );
        assert_eq!(
            resolve_target(&request(None, Some(9))),
            Some(QuizGradeTarget::FileSubmission(9))
        );
        assert_eq!(resolve_target(&request(Some(3), Some(9))), None);
        assert_eq!(resolve_target(&request(None, None)), None);
    }
}
